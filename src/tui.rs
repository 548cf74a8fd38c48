//! TUI (Terminal User Interface) for the guessing game
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # Architecture
//! - `TuiInterface`: renders the search box, match list, guess table and
//!   status panels, and turns key presses into [`UserAction`]s
//! - The game loop in [`crate::game_state`] owns the session; the TUI keeps
//!   only a rendering snapshot of it
//!
//! # State Machine
//! - `Instructions` → `Searching` (any key)
//! - `Searching` → `GameOver` (session reached a terminal status)
//! - `GameOver` → `Searching` (N: new game)

use crate::evaluator::Verdict;
use crate::game_state::{GameInterface, UserAction, cell_text};
use crate::schema::Entity;
use crate::search::search;
use crate::session::GameSession;
use crate::share::outcome_message;
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};
use std::io;

const MAX_MATCHES_DISPLAY: usize = 10;
const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;

const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const SELECTED_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Cyan);
const MATCH_CELL_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Green);
const MISS_CELL_STYLE: Style = Style::new().fg(Color::White);

#[derive(Debug, Clone, PartialEq, Eq)]
enum TuiState {
    Instructions,
    Searching,
    GameOver,
}

/// Rendering copy of one guess.
#[derive(Debug, Clone)]
struct GuessRow {
    identity: String,
    cells: Vec<(String, Verdict)>,
}

impl GuessRow {
    fn from_session(session: &GameSession) -> Vec<Self> {
        session
            .guesses()
            .iter()
            .map(|guess| Self {
                identity: guess.identity().to_string(),
                cells: guess
                    .entity()
                    .values()
                    .iter()
                    .zip(guess.verdicts())
                    .map(|(value, &verdict)| (cell_text(value, verdict), verdict))
                    .collect(),
            })
            .collect()
    }
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    title: &'a str,
    state: &'a TuiState,
    query: &'a str,
    matches: &'a [String],
    selected: usize,
    columns: &'a [String],
    board: &'a [GuessRow],
    guess_count: usize,
    max_guesses: usize,
    instructions: &'a [String],
    reveal: &'a [String],
    share_text: &'a str,
    message: &'a str,
    error_message: &'a str,
    status: &'a str,
}

/// Main TUI interface component.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    title: String,
    state: TuiState,
    query: String,
    matches: Vec<String>,
    selected: usize,
    columns: Vec<String>,
    board: Vec<GuessRow>,
    guess_count: usize,
    max_guesses: usize,
    can_give_up: bool,
    instructions: Vec<String>,
    reveal: Vec<String>,
    share_text: String,
    message: String,
    error_message: String,
    status: String,
}

impl TuiInterface {
    pub fn new(title: &str) -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let terminal = match Self::open_terminal() {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(e);
            }
        };
        info_log!("Terminal backend created");

        Ok(Self {
            terminal,
            title: title.to_string(),
            state: TuiState::Searching,
            query: String::new(),
            matches: Vec::new(),
            selected: 0,
            columns: Vec::new(),
            board: Vec::new(),
            guess_count: 0,
            max_guesses: 0,
            can_give_up: false,
            instructions: Vec::new(),
            reveal: Vec::new(),
            share_text: String::new(),
            message: String::new(),
            error_message: String::new(),
            status: "Ready to start".to_string(),
        })
    }

    fn open_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        Terminal::new(CrosstermBackend::new(stdout))
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let ctx = RenderContext {
            title: &self.title,
            state: &self.state,
            query: &self.query,
            matches: &self.matches,
            selected: self.selected,
            columns: &self.columns,
            board: &self.board,
            guess_count: self.guess_count,
            max_guesses: self.max_guesses,
            instructions: &self.instructions,
            reveal: &self.reveal,
            share_text: &self.share_text,
            message: &self.message,
            error_message: &self.error_message,
            status: &self.status,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Search box
                Constraint::Min(8),    // Board + side panel
                Constraint::Length(3), // Status line
                Constraint::Length(3), // Key help
            ])
            .split(f.area());

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
            .split(chunks[2]);

        Self::render_title(f, chunks[0], ctx.title);
        Self::render_search(f, chunks[1], ctx.query, ctx.state);
        Self::render_board(f, middle[0], ctx);
        Self::render_side_panel(f, middle[1], ctx);
        Self::render_status(f, chunks[3], ctx.status);
        Self::render_key_help(f, chunks[4], ctx.state);
    }

    fn render_title(f: &mut Frame, area: Rect, title: &str) {
        let title = Paragraph::new(title.to_uppercase())
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_search(f: &mut Frame, area: Rect, query: &str, state: &TuiState) {
        let text = match state {
            TuiState::Searching if query.is_empty() => {
                Line::from(Span::styled("Start typing to guess...", MISS_CELL_STYLE))
            }
            TuiState::Searching => Line::from(vec![Span::raw(query), Span::raw("▏")]),
            _ => Line::from(""),
        };
        let paragraph =
            Paragraph::new(text).block(Block::default().title("Search").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_board(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let block = Block::default()
            .title(format!("Guesses: {}/{}", ctx.guess_count, ctx.max_guesses))
            .borders(Borders::ALL);

        if ctx.board.is_empty() {
            f.render_widget(block, area);
            return;
        }

        let header = Row::new(ctx.columns.iter().map(|c| Cell::from(c.as_str()))).style(INFO_STYLE);
        let rows = ctx.board.iter().map(|guess| {
            let mut cells = vec![Cell::from(guess.identity.as_str())];
            cells.extend(guess.cells.iter().map(|(text, verdict)| {
                let style = if verdict.is_match() {
                    MATCH_CELL_STYLE
                } else {
                    MISS_CELL_STYLE
                };
                Cell::from(text.as_str()).style(style)
            }));
            Row::new(cells)
        });

        let widths = std::iter::once(Constraint::Min(18))
            .chain(ctx.columns.iter().skip(1).map(|_| Constraint::Min(8)));
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .block(block);
        f.render_widget(table, area);
    }

    fn render_side_panel(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let mut lines = Vec::new();

        match ctx.state {
            TuiState::Instructions => {
                lines.push(Line::from(Span::styled("How to play", HEADER_STYLE)));
                for line in ctx.instructions {
                    lines.push(Line::from(line.as_str()));
                }
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Press any key: Got it!", SUCCESS_STYLE)));
            }
            TuiState::Searching => {
                if !ctx.matches.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("Matches ({}):", ctx.matches.len()),
                        INFO_STYLE,
                    )));
                    for (i, name) in ctx.matches.iter().take(MAX_MATCHES_DISPLAY).enumerate() {
                        let style = if i == ctx.selected {
                            SELECTED_STYLE
                        } else {
                            Style::default()
                        };
                        lines.push(Line::from(Span::styled(format!("  {name}"), style)));
                    }
                    if ctx.matches.len() > MAX_MATCHES_DISPLAY {
                        lines.push(Line::from(format!(
                            "  ... and {} more",
                            ctx.matches.len() - MAX_MATCHES_DISPLAY
                        )));
                    }
                    lines.push(Line::from(""));
                }
            }
            TuiState::GameOver => {
                for (i, line) in ctx.reveal.iter().enumerate() {
                    let style = if i == 1 { SUCCESS_STYLE } else { Style::default() };
                    lines.push(Line::from(Span::styled(line.as_str(), style)));
                }
                lines.push(Line::from(""));
                for line in ctx.share_text.lines() {
                    lines.push(Line::from(line));
                }
            }
        }

        if !ctx.message.is_empty() {
            lines.push(Line::from(Span::styled(ctx.message, MESSAGE_STYLE)));
        }
        if !ctx.error_message.is_empty() {
            lines.push(Line::from(Span::styled(ctx.error_message, ERROR_STYLE)));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Information").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_key_help(f: &mut Frame, area: Rect, state: &TuiState) {
        let text = match state {
            TuiState::Instructions => "Any key: Start playing | ESC: Quit",
            TuiState::Searching => {
                "Type to search | UP/DOWN: Pick | ENTER: Guess | CTRL+G: Give up | ESC: Quit"
            }
            TuiState::GameOver => "S: Share results | N: New Game | ESC: Quit",
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let status_text = if status.is_empty() { "Ready" } else { status };
        let paragraph = Paragraph::new(status_text)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    /// Recompute the dropdown for the current query.
    fn refresh_matches(&mut self, session: &GameSession) {
        self.matches = search(session.roster(), session.guesses(), &self.query)
            .map(|e| e.identity().to_string())
            .collect();
        if self.selected >= self.matches.len() {
            self.selected = 0;
        }
    }

    fn snapshot(&mut self, session: &GameSession) {
        let schema = session.roster().schema();
        self.columns = std::iter::once(schema.identity().key.clone())
            .chain(schema.scored().map(|a| a.key.clone()))
            .collect();
        self.board = GuessRow::from_session(session);
        self.guess_count = session.guesses().len();
        self.max_guesses = session.max_guesses();
        self.can_give_up = session.can_give_up();
    }

    fn handle_input(&mut self) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }

        let event = event::read()?;
        let Event::Key(key) = event else {
            debug_log!("handle_input() - Ignoring non-key event: {:?}", event);
            return Ok(None);
        };
        // Only process Press events, ignore Release and Repeat to avoid double input
        if key.kind != event::KeyEventKind::Press {
            return Ok(None);
        }
        // Garbage from escape sequences when alt-tabbing
        if let KeyCode::Char(c) = key.code
            && (c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD)
        {
            debug_log!("handle_input() - Ignoring invalid character: {:?}", c);
            return Ok(None);
        }

        debug_log!(
            "handle_input() - Key event: code={:?}, modifiers={:?}, state={:?}",
            key.code,
            key.modifiers,
            self.state
        );
        Ok(match self.state {
            TuiState::Instructions => self.handle_instructions_input(key),
            TuiState::Searching => self.handle_search_input(key),
            TuiState::GameOver => Self::handle_game_over_input(key),
        })
    }

    fn handle_instructions_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        if key.code == KeyCode::Esc {
            return Some(UserAction::Exit);
        }
        info_log!("handle_instructions_input() - Instructions dismissed");
        self.instructions.clear();
        self.state = TuiState::Searching;
        None
    }

    fn handle_search_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        self.error_message.clear();
        let has_ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let has_alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Esc => {
                info_log!("handle_search_input() - ESC pressed, returning Exit");
                return Some(UserAction::Exit);
            }
            KeyCode::Char('g' | 'G') if has_ctrl => {
                if self.can_give_up {
                    return Some(UserAction::GiveUp);
                }
                self.error_message = "Make at least one guess before giving up".to_string();
            }
            KeyCode::Char(c) if !has_ctrl && !has_alt => {
                self.query.push(c);
                self.selected = 0;
            }
            KeyCode::Backspace => {
                self.query.pop();
                self.selected = 0;
            }
            KeyCode::Down if self.selected + 1 < self.matches.len().min(MAX_MATCHES_DISPLAY) => {
                self.selected += 1;
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Enter => match self.matches.get(self.selected) {
                Some(name) => {
                    let name = name.clone();
                    info_log!("handle_search_input() - Guessing '{}'", name);
                    self.query.clear();
                    self.matches.clear();
                    self.selected = 0;
                    return Some(UserAction::Select(name));
                }
                None => {
                    self.error_message = "Nothing to guess - type part of a name".to_string();
                }
            },
            _ => {
                debug_log!("handle_search_input() - Ignoring key: {:?}", key.code);
            }
        }
        None
    }

    fn handle_game_over_input(key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Char('s' | 'S') => Some(UserAction::Share),
            KeyCode::Char('n' | 'N') => Some(UserAction::NewGame),
            KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(UserAction::Exit),
            _ => None,
        }
    }
}

impl GameInterface for TuiInterface {
    fn display_instructions(&mut self, lines: &[String]) {
        self.instructions = lines.to_vec();
        self.state = TuiState::Instructions;
        self.status = "Welcome!".to_string();
        self.draw_or_log();
    }

    fn display_new_game(&mut self, session: &GameSession) {
        self.snapshot(session);
        self.query.clear();
        self.matches.clear();
        self.selected = 0;
        self.reveal.clear();
        self.share_text.clear();
        self.error_message.clear();
        if self.state != TuiState::Instructions {
            self.state = TuiState::Searching;
        }
        self.message = format!(
            "New game started. {} candidates loaded.",
            session.roster().len()
        );
        self.status = "Enter your first guess".to_string();
        self.draw_or_log();
    }

    fn read_action(&mut self, session: &GameSession) -> Option<UserAction> {
        loop {
            if self.state == TuiState::Searching {
                self.refresh_matches(session);
            }
            if self.draw().is_err() {
                info_log!("read_action() - Draw failed, returning Exit");
                return Some(UserAction::Exit);
            }
            match self.handle_input() {
                Ok(Some(action)) => {
                    info_log!("read_action() - Action received: {:?}", action);
                    self.message.clear();
                    return Some(action);
                }
                Ok(None) => {}
                Err(e) => {
                    debug_log!("read_action() - Input error: {}", e);
                    return Some(UserAction::Exit);
                }
            }
        }
    }

    fn display_matches(&mut self, matches: &[&Entity]) {
        self.matches = matches.iter().map(|e| e.identity().to_string()).collect();
        self.selected = 0;
        self.draw_or_log();
    }

    fn display_board(&mut self, session: &GameSession) {
        self.snapshot(session);
        if let Some(last) = session.guesses().last() {
            self.status = format!(
                "Guessed {} - {} guesses left",
                last.identity(),
                session.remaining_guesses()
            );
        }
        self.draw_or_log();
    }

    fn display_rejection(&mut self, message: &str) {
        self.error_message = message.to_string();
        self.draw_or_log();
    }

    fn display_game_over(&mut self, session: &GameSession) {
        self.snapshot(session);
        self.state = TuiState::GameOver;
        self.reveal.clear();
        if let Some(secret) = session.revealed_secret() {
            self.reveal.push("The mystery was:".to_string());
            self.reveal.push(secret.identity().to_string());
        }
        if let Some(outcome) = outcome_message(session) {
            self.status = outcome.clone();
            self.reveal.push(outcome);
        }
        self.draw_or_log();
    }

    fn display_share(&mut self, text: &str) {
        self.share_text = text.to_string();
        self.draw_or_log();
    }

    fn display_notice(&mut self, message: &str) {
        self.message = message.to_string();
        self.draw_or_log();
    }

    fn display_exit_message(&mut self) {
        self.status = "Exiting application...".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
