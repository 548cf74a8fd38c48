// Library interface for mystery-guess
// This allows integration tests to access internal modules

pub mod cli;
pub mod config;
pub mod evaluator;
pub mod game_state;
pub mod logging;
pub mod roster;
pub mod schema;
pub mod search;
pub mod session;
pub mod share;
pub mod storage;
pub mod tui;
pub mod variant;

// Re-export commonly used items for easier testing
pub use evaluator::{Verdict, evaluate};
pub use game_state::{GameInterface, GameSetup, UserAction, game_loop};
pub use roster::{ParseError, Roster, RosterError, load_roster_from_file, load_roster_from_str};
pub use schema::{Attribute, AttributeKind, AttributeSchema, Entity, Value};
pub use search::{best_match, search};
pub use session::{
    FixedSecret, GameSession, Guess, InvalidGuessError, InvalidStateError, RngSource,
    SecretSource, Status, new_session,
};
pub use share::{ShareFormat, encode_result, outcome_message};
pub use variant::Variant;
