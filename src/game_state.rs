use crate::evaluator::Verdict;
use crate::roster::Roster;
use crate::schema::{Entity, Value};
use crate::search::{best_match, same_identity, search};
use crate::session::{GameSession, SecretSource, new_session};
use crate::share::{ShareFormat, encode_result, write_share_file};
use crate::storage::{KeyValueStore, should_show_instructions};
use crate::{debug_log, info_log};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

pub const SHARE_FAILED_NOTICE: &str = "Failed to copy results. Please try again.";

/// What the player asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// List matches for a query without guessing.
    Search(String),
    /// Guess the entity a query resolves to.
    Guess(String),
    /// Guess the entity with exactly this identity, e.g. picked from a list.
    Select(String),
    GiveUp,
    Share,
    NewGame,
    Exit,
}

/// Presentation side of the game. The loop owns the session; interfaces
/// only render it and report what the player did.
pub trait GameInterface {
    fn display_instructions(&mut self, lines: &[String]);
    fn display_new_game(&mut self, session: &GameSession);
    /// `None` means the input was unusable and the loop should ask again.
    fn read_action(&mut self, session: &GameSession) -> Option<UserAction>;
    fn display_matches(&mut self, matches: &[&Entity]);
    fn display_board(&mut self, session: &GameSession);
    fn display_rejection(&mut self, message: &str);
    fn display_game_over(&mut self, session: &GameSession);
    fn display_share(&mut self, text: &str);
    fn display_notice(&mut self, message: &str);
    fn display_exit_message(&mut self);
}

/// Everything the loop needs besides the interface and injected sources.
#[derive(Debug, Clone)]
pub struct GameSetup {
    pub roster: Arc<Roster>,
    pub max_guesses: NonZeroUsize,
    pub noun: String,
    pub share_format: ShareFormat,
    pub share_path: Option<PathBuf>,
}

pub fn instructions(noun: &str, max_guesses: usize) -> Vec<String> {
    vec![
        format!("Guess the mystery {noun} in {max_guesses} tries or less!"),
        format!("Green cells indicate a match with the mystery {noun}."),
        format!(
            "For numeric values, arrows indicate if the mystery {noun}'s value is higher (↑) or lower (↓)."
        ),
    ]
}

/// Text of one table cell: the value plus a directional arrow when there is one.
pub fn cell_text(value: &Value, verdict: Verdict) -> String {
    match verdict.hint() {
        Some(arrow) => format!("{value} {arrow}"),
        None => value.to_string(),
    }
}

pub fn game_loop<I, S, K>(setup: &GameSetup, interface: &mut I, source: &mut S, store: &mut K)
where
    I: GameInterface + ?Sized,
    S: SecretSource + ?Sized,
    K: KeyValueStore + ?Sized,
{
    if should_show_instructions(store) {
        interface.display_instructions(&instructions(&setup.noun, setup.max_guesses.get()));
    }

    let mut session = GameSession::new(Arc::clone(&setup.roster), setup.max_guesses, source);
    interface.display_new_game(&session);

    loop {
        let Some(action) = interface.read_action(&session) else {
            continue;
        };
        debug_log!("game_loop() - action: {:?}", action);

        match action {
            UserAction::Exit => {
                interface.display_exit_message();
                break;
            }
            UserAction::NewGame => {
                session = new_session(session.roster_handle(), setup.max_guesses, source);
                interface.display_new_game(&session);
            }
            UserAction::Search(query) => {
                let matches: Vec<&Entity> =
                    search(session.roster(), session.guesses(), &query).collect();
                interface.display_matches(&matches);
            }
            UserAction::Guess(query) => handle_guess(setup, interface, &mut session, &query),
            UserAction::Select(name) => submit_named(interface, &mut session, &name),
            UserAction::GiveUp => match session.give_up() {
                Ok(()) => {
                    interface.display_board(&session);
                    interface.display_game_over(&session);
                }
                Err(e) => interface.display_rejection(&e.to_string()),
            },
            UserAction::Share => handle_share(setup, interface, &session),
        }
    }
}

fn handle_guess<I: GameInterface + ?Sized>(
    setup: &GameSetup,
    interface: &mut I,
    session: &mut GameSession,
    query: &str,
) {
    let Some(name) = best_match(session.roster(), session.guesses(), query)
        .map(|entity| entity.identity().to_string())
    else {
        let already_guessed = session
            .guesses()
            .iter()
            .any(|g| same_identity(g.identity(), query));
        let reason = if already_guessed {
            format!("'{query}' has already been guessed")
        } else {
            format!("No {} matches '{query}'", setup.noun)
        };
        interface.display_rejection(&reason);
        return;
    };

    submit_named(interface, session, &name);
}

fn submit_named<I: GameInterface + ?Sized>(
    interface: &mut I,
    session: &mut GameSession,
    name: &str,
) {
    match session.submit_by_identity(name) {
        Ok(_) => {
            interface.display_board(session);
            if session.status().is_terminal() {
                interface.display_game_over(session);
            }
        }
        Err(e) => interface.display_rejection(&e.to_string()),
    }
}

fn handle_share<I: GameInterface + ?Sized>(
    setup: &GameSetup,
    interface: &mut I,
    session: &GameSession,
) {
    let Some(text) = encode_result(session, &setup.share_format) else {
        interface.display_rejection("Finish the game before sharing");
        return;
    };
    interface.display_share(&text);

    if let Some(path) = &setup.share_path {
        match write_share_file(path, &text) {
            Ok(()) => {
                info_log!("Share text written to {}", path.display());
                interface.display_notice(&format!("Results copied to {}", path.display()));
            }
            Err(e) => {
                log::warn!("Could not write share text to {}: {e}", path.display());
                interface.display_notice(SHARE_FAILED_NOTICE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, AttributeKind, AttributeSchema};
    use crate::session::{FixedSecret, Status};
    use crate::storage::MemoryStore;
    use std::collections::VecDeque;

    /// Scripted interface that records what the loop showed.
    #[derive(Default)]
    struct Recorder {
        actions: VecDeque<Option<UserAction>>,
        instructions: usize,
        new_games: Vec<String>,
        matches: Vec<Vec<String>>,
        rejections: Vec<String>,
        game_overs: Vec<Status>,
        shares: Vec<String>,
        notices: Vec<String>,
        boards: usize,
        exited: bool,
    }

    impl Recorder {
        fn new(actions: Vec<UserAction>) -> Self {
            Self {
                actions: actions.into_iter().map(Some).collect(),
                ..Self::default()
            }
        }
    }

    impl GameInterface for Recorder {
        fn display_instructions(&mut self, _lines: &[String]) {
            self.instructions += 1;
        }

        fn display_new_game(&mut self, session: &GameSession) {
            self.new_games.push(session.secret().identity().to_string());
        }

        fn read_action(&mut self, _session: &GameSession) -> Option<UserAction> {
            self.actions.pop_front().unwrap_or(Some(UserAction::Exit))
        }

        fn display_matches(&mut self, matches: &[&Entity]) {
            self.matches
                .push(matches.iter().map(|e| e.identity().to_string()).collect());
        }

        fn display_board(&mut self, _session: &GameSession) {
            self.boards += 1;
        }

        fn display_rejection(&mut self, message: &str) {
            self.rejections.push(message.to_string());
        }

        fn display_game_over(&mut self, session: &GameSession) {
            self.game_overs.push(session.status());
        }

        fn display_share(&mut self, text: &str) {
            self.shares.push(text.to_string());
        }

        fn display_notice(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }

        fn display_exit_message(&mut self) {
            self.exited = true;
        }
    }

    fn setup(max: usize) -> GameSetup {
        let schema = AttributeSchema::new(vec![
            Attribute::new("name", AttributeKind::Identity),
            Attribute::new("age", AttributeKind::OrderedNumeric),
        ])
        .unwrap();
        let entities = vec![
            Entity::new("Tom Hanks", vec![Value::Number(67)]),
            Entity::new("Taylor Swift", vec![Value::Number(34)]),
            Entity::new("Tom Holland", vec![Value::Number(28)]),
        ];
        GameSetup {
            roster: Arc::new(Roster::new(schema, entities).unwrap()),
            max_guesses: NonZeroUsize::new(max).unwrap(),
            noun: "celebrity".to_string(),
            share_format: ShareFormat::new("Celeb Wordle", "Play at: https://celebwordle.me"),
            share_path: None,
        }
    }

    fn run(setup: &GameSetup, secret: usize, actions: Vec<UserAction>) -> Recorder {
        let mut ui = Recorder::new(actions);
        let mut store = MemoryStore::new();
        game_loop(setup, &mut ui, &mut FixedSecret(secret), &mut store);
        ui
    }

    fn guess(q: &str) -> UserAction {
        UserAction::Guess(q.to_string())
    }

    #[test]
    fn test_immediate_exit() {
        let ui = run(&setup(8), 0, vec![UserAction::Exit]);
        assert!(ui.exited);
        assert_eq!(ui.instructions, 1);
        assert_eq!(ui.new_games, vec!["Tom Hanks"]);
    }

    #[test]
    fn test_instructions_only_on_first_run() {
        let setup = setup(8);
        let mut store = MemoryStore::new();
        let mut first = Recorder::new(vec![UserAction::Exit]);
        game_loop(&setup, &mut first, &mut FixedSecret(0), &mut store);
        let mut second = Recorder::new(vec![UserAction::Exit]);
        game_loop(&setup, &mut second, &mut FixedSecret(0), &mut store);
        assert_eq!(first.instructions, 1);
        assert_eq!(second.instructions, 0);
    }

    #[test]
    fn test_invalid_input_is_skipped() {
        let mut ui = Recorder::new(vec![]);
        ui.actions = vec![None, None, Some(UserAction::Exit)].into();
        game_loop(&setup(8), &mut ui, &mut FixedSecret(0), &mut MemoryStore::new());
        assert!(ui.exited);
    }

    #[test]
    fn test_search_lists_matches() {
        let ui = run(
            &setup(8),
            1,
            vec![UserAction::Search("tom".to_string()), UserAction::Search(String::new())],
        );
        assert_eq!(
            ui.matches,
            vec![vec!["Tom Hanks".to_string(), "Tom Holland".to_string()], vec![]]
        );
    }

    #[test]
    fn test_guess_first_match_then_win() {
        let ui = run(&setup(8), 2, vec![guess("tom"), guess("holl"), UserAction::Share]);
        assert_eq!(ui.boards, 2);
        assert_eq!(ui.game_overs, vec![Status::Won]);
        assert_eq!(ui.shares.len(), 1);
        assert!(ui.shares[0].starts_with("Celeb Wordle - Tom Holland\nI got it in 2/8 guesses!"));
        assert!(ui.notices.is_empty());
    }

    #[test]
    fn test_unknown_and_repeated_queries_rejected() {
        let ui = run(&setup(8), 2, vec![guess("zzz"), guess("Tom Hanks"), guess("Tom Hanks")]);
        assert_eq!(ui.boards, 1);
        assert_eq!(
            ui.rejections,
            vec![
                "No celebrity matches 'zzz'".to_string(),
                "'Tom Hanks' has already been guessed".to_string(),
            ]
        );
    }

    #[test]
    fn test_repeat_in_other_case_reported_as_guessed() {
        let ui = run(&setup(8), 2, vec![guess("Tom Hanks"), guess("TOM HANKS")]);
        assert_eq!(
            ui.rejections,
            vec!["'TOM HANKS' has already been guessed".to_string()]
        );
    }

    fn case_twins() -> GameSetup {
        let schema = AttributeSchema::new(vec![
            Attribute::new("name", AttributeKind::Identity),
            Attribute::new("age", AttributeKind::OrderedNumeric),
        ])
        .unwrap();
        let entities = vec![
            Entity::new("Ed", vec![Value::Number(30)]),
            Entity::new("ED", vec![Value::Number(40)]),
        ];
        GameSetup {
            roster: Arc::new(Roster::new(schema, entities).unwrap()),
            ..setup(8)
        }
    }

    #[test]
    fn test_select_scores_the_picked_entity() {
        let ui = run(&case_twins(), 1, vec![UserAction::Select("ED".to_string())]);
        assert_eq!(ui.game_overs, vec![Status::Won]);
        assert!(ui.rejections.is_empty());
    }

    #[test]
    fn test_select_unknown_or_repeated_rejected() {
        let ui = run(
            &case_twins(),
            1,
            vec![
                UserAction::Select("Eddie".to_string()),
                UserAction::Select("Ed".to_string()),
                UserAction::Select("Ed".to_string()),
            ],
        );
        assert_eq!(ui.boards, 1);
        assert_eq!(ui.rejections.len(), 2);
        assert!(ui.game_overs.is_empty());
    }

    #[test]
    fn test_running_out_of_guesses() {
        let ui = run(&setup(2), 2, vec![guess("hanks"), guess("swift"), guess("holland")]);
        assert_eq!(ui.game_overs, vec![Status::Lost]);
        assert_eq!(ui.rejections, vec!["the game is over (lost)".to_string()]);
    }

    #[test]
    fn test_give_up_rules() {
        let ui = run(
            &setup(8),
            2,
            vec![UserAction::GiveUp, UserAction::Share, guess("swift"), UserAction::GiveUp],
        );
        assert_eq!(
            ui.rejections,
            vec![
                "make at least one guess before giving up".to_string(),
                "Finish the game before sharing".to_string(),
            ]
        );
        assert_eq!(ui.game_overs, vec![Status::GaveUp]);
    }

    #[test]
    fn test_new_game_draws_again() {
        let setup = setup(8);
        let mut ui = Recorder::new(vec![guess("swift"), UserAction::NewGame, guess("swift")]);
        let mut source = crate::session::ScriptedSecrets::new(vec![1, 0]);
        game_loop(&setup, &mut ui, &mut source, &mut MemoryStore::new());
        assert_eq!(ui.new_games, vec!["Taylor Swift", "Tom Hanks"]);
        assert_eq!(ui.game_overs, vec![Status::Won]);
        assert_eq!(ui.boards, 2);
    }

    #[test]
    fn test_share_file_written_and_failure_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut good = setup(8);
        good.share_path = Some(dir.path().join("share.txt"));
        let ui = run(&good, 0, vec![guess("hanks"), UserAction::Share]);
        let written = std::fs::read_to_string(dir.path().join("share.txt")).unwrap();
        assert_eq!(written, ui.shares[0]);
        assert_eq!(ui.notices.len(), 1);

        let mut bad = setup(8);
        bad.share_path = Some(dir.path().to_path_buf());
        let ui = run(&bad, 0, vec![guess("hanks"), UserAction::Share, UserAction::NewGame]);
        assert_eq!(ui.notices, vec![SHARE_FAILED_NOTICE.to_string()]);
        assert_eq!(ui.new_games.len(), 2);
    }

    #[test]
    fn test_cell_text_arrows() {
        assert_eq!(cell_text(&Value::Number(30), Verdict::MismatchHigher), "30 ↑");
        assert_eq!(cell_text(&Value::Number(30), Verdict::MismatchLower), "30 ↓");
        assert_eq!(cell_text(&Value::Number(30), Verdict::Exact), "30");
    }

    #[test]
    fn test_instructions_mention_budget() {
        let lines = instructions("player", 8);
        assert_eq!(lines[0], "Guess the mystery player in 8 tries or less!");
        assert_eq!(lines.len(), 3);
    }
}
