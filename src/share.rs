//! Shareable result text.
//!
//! The share block is a pure function of a finished session and its
//! [`ShareFormat`]: the same input always yields the same bytes.

use crate::session::{GameSession, Status};
use std::fs;
use std::io;
use std::path::Path;

pub const FILLED_GLYPH: &str = "🟩";
pub const EMPTY_GLYPH: &str = "⬜";

/// Title and footer wrapped around the emoji grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareFormat {
    title: String,
    footer: String,
}

impl ShareFormat {
    pub fn new(title: impl Into<String>, footer: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            footer: footer.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }
}

/// Render a finished session as share text, or `None` while it is still
/// being played.
///
/// Layout: `"<title> - <secret>"`, the outcome line, a blank line, one glyph
/// row per guess, a blank line, the footer.
pub fn encode_result(session: &GameSession, format: &ShareFormat) -> Option<String> {
    let secret = session.revealed_secret()?;
    let outcome = match session.status() {
        Status::Won => format!(
            "I got it in {}/{} guesses!",
            session.guesses().len(),
            session.max_guesses()
        ),
        Status::GaveUp => "I gave up!".to_string(),
        Status::Lost => "I ran out of guesses!".to_string(),
        Status::Playing => return None,
    };

    let mut text = format!("{} - {}\n{outcome}\n\n", format.title, secret.identity());
    for guess in session.guesses() {
        for verdict in guess.verdicts() {
            text.push_str(if verdict.is_match() {
                FILLED_GLYPH
            } else {
                EMPTY_GLYPH
            });
        }
        text.push('\n');
    }
    text.push('\n');
    text.push_str(&format.footer);
    Some(text)
}

/// The outcome sentence shown on the game-over screen.
pub fn outcome_message(session: &GameSession) -> Option<String> {
    let count = session.guesses().len();
    match session.status() {
        Status::Playing => None,
        Status::Won => Some(format!("You got it in {count} tries!")),
        Status::GaveUp => Some(format!("You gave up after {count} guesses.")),
        Status::Lost => Some(format!("You ran out of guesses after {count} guesses.")),
    }
}

/// Stand-in for the clipboard: write the share text to a file.
pub fn write_share_file<P: AsRef<Path>>(path: P, text: &str) -> io::Result<()> {
    if let Some(parent) = path.as_ref().parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)
}
