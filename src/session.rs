//! Game session state machine.
//!
//! A session owns the secret, the ordered guess history and the lifecycle
//! status. It is only changed through [`GameSession::submit_guess`] and
//! [`GameSession::give_up`]; both check every precondition before touching
//! state, so a rejected call leaves the session exactly as it was.
//!
//! # State Machine
//! - `Playing` → `Won` (guessed the secret)
//! - `Playing` → `Lost` (used the last guess without winning)
//! - `Playing` → `GaveUp` (player gave up after at least one guess)
//!
//! `Won`, `Lost` and `GaveUp` are terminal. A new game replaces the session.

use crate::evaluator::{Verdict, evaluate};
use crate::roster::Roster;
use crate::schema::Entity;
use crate::{debug_log, info_log};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;

/// Guess budget used by the published game.
pub const DEFAULT_MAX_GUESSES: NonZeroUsize = match NonZeroUsize::new(8) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Playing,
    Won,
    Lost,
    GaveUp,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        self != Self::Playing
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Playing => "playing",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::GaveUp => "gave up",
        };
        f.write_str(label)
    }
}

/// A submitted entity and its verdicts, fixed at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    entity: Entity,
    verdicts: Vec<Verdict>,
}

impl Guess {
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn identity(&self) -> &str {
        self.entity.identity()
    }

    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGuessError {
    #[error("the game is over ({0})")]
    Finished(Status),
    #[error("'{0}' has already been guessed")]
    AlreadyGuessed(String),
    #[error("'{0}' is not in the roster")]
    NotInRoster(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStateError {
    #[error("the game is over ({0})")]
    Finished(Status),
    #[error("make at least one guess before giving up")]
    NoGuesses,
}

/// Source of the secret index. Implementations must return a value below
/// `len`; out-of-range values are wrapped.
pub trait SecretSource {
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform draw from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> SecretSource for RngSource<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

impl RngSource<rand::rngs::ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded with the calendar day, so every player gets the same
    /// first secret on a given date.
    pub fn daily(date: NaiveDate) -> Self {
        Self::seeded(u64::from(date.num_days_from_ce().unsigned_abs()))
    }
}

/// Always picks the same index. Intended for tests and replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSecret(pub usize);

impl SecretSource for FixedSecret {
    fn pick(&mut self, _len: usize) -> usize {
        self.0
    }
}

/// Picks the listed indices in order, then repeats the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedSecrets {
    picks: Vec<usize>,
    next: usize,
}

impl ScriptedSecrets {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, next: 0 }
    }
}

impl SecretSource for ScriptedSecrets {
    fn pick(&mut self, _len: usize) -> usize {
        let pick = self
            .picks
            .get(self.next)
            .or_else(|| self.picks.last())
            .copied()
            .unwrap_or(0);
        self.next += 1;
        pick
    }
}

/// One round of the game.
#[derive(Debug, Clone)]
pub struct GameSession {
    roster: Arc<Roster>,
    secret: Entity,
    guesses: Vec<Guess>,
    max_guesses: NonZeroUsize,
    status: Status,
}

impl GameSession {
    /// Start a round with a secret drawn from `source`.
    pub fn new<S: SecretSource + ?Sized>(
        roster: Arc<Roster>,
        max_guesses: NonZeroUsize,
        source: &mut S,
    ) -> Self {
        let index = source.pick(roster.len()) % roster.len();
        let secret = roster.entities()[index].clone();
        info_log!(
            "New session: {} candidates, {} guesses allowed",
            roster.len(),
            max_guesses
        );
        debug_log!("Secret drawn at index {}: '{}'", index, secret.identity());
        Self {
            roster,
            secret,
            guesses: Vec::new(),
            max_guesses,
            status: Status::Playing,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Shared handle for starting the next round on the same roster.
    pub fn roster_handle(&self) -> Arc<Roster> {
        Arc::clone(&self.roster)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn guesses(&self) -> &[Guess] {
        &self.guesses
    }

    pub fn max_guesses(&self) -> usize {
        self.max_guesses.get()
    }

    pub fn remaining_guesses(&self) -> usize {
        self.max_guesses.get() - self.guesses.len()
    }

    /// The secret, revealed only once the round is over.
    pub fn revealed_secret(&self) -> Option<&Entity> {
        self.status.is_terminal().then_some(&self.secret)
    }

    /// The secret regardless of status. Presentation code should prefer
    /// [`GameSession::revealed_secret`].
    pub fn secret(&self) -> &Entity {
        &self.secret
    }

    pub fn has_guessed(&self, identity: &str) -> bool {
        self.guesses.iter().any(|g| g.identity() == identity)
    }

    pub fn can_give_up(&self) -> bool {
        self.status == Status::Playing && !self.guesses.is_empty()
    }

    /// Score `entity` against the secret and record it.
    ///
    /// The entity is matched to the roster by identity; roster values are
    /// used for scoring.
    pub fn submit_guess(&mut self, entity: &Entity) -> Result<&Guess, InvalidGuessError> {
        self.submit_by_identity(entity.identity())
    }

    /// Same as [`GameSession::submit_guess`], looking the entity up by name.
    pub fn submit_by_identity(&mut self, identity: &str) -> Result<&Guess, InvalidGuessError> {
        if self.status.is_terminal() {
            return Err(InvalidGuessError::Finished(self.status));
        }
        if self.has_guessed(identity) {
            return Err(InvalidGuessError::AlreadyGuessed(identity.to_string()));
        }
        let entity = self
            .roster
            .find(identity)
            .ok_or_else(|| InvalidGuessError::NotInRoster(identity.to_string()))?
            .clone();

        let verdicts = evaluate(&entity, &self.secret, self.roster.schema());
        let won = entity.identity() == self.secret.identity();
        self.guesses.push(Guess { entity, verdicts });

        if won {
            self.status = Status::Won;
        } else if self.guesses.len() >= self.max_guesses.get() {
            self.status = Status::Lost;
        }
        info_log!(
            "Guess {}/{} '{}' accepted, status: {}",
            self.guesses.len(),
            self.max_guesses,
            identity,
            self.status
        );

        let last = self.guesses.len() - 1;
        Ok(&self.guesses[last])
    }

    pub fn give_up(&mut self) -> Result<(), InvalidStateError> {
        if self.status.is_terminal() {
            return Err(InvalidStateError::Finished(self.status));
        }
        if self.guesses.is_empty() {
            return Err(InvalidStateError::NoGuesses);
        }
        self.status = Status::GaveUp;
        info_log!("Player gave up after {} guesses", self.guesses.len());
        Ok(())
    }
}

/// Replace a session wholesale with a fresh one on the same roster.
pub fn new_session<S: SecretSource + ?Sized>(
    roster: Arc<Roster>,
    max_guesses: NonZeroUsize,
    source: &mut S,
) -> GameSession {
    GameSession::new(roster, max_guesses, source)
}
