//! Built-in game variants.
//!
//! Each variant is a schema plus an embedded roster and share wording; the
//! engine itself is shared.

use crate::schema::{Attribute, AttributeKind, AttributeSchema};
use crate::share::ShareFormat;

pub const EMBEDDED_CELEBRITIES: &str = include_str!("resources/celebrities.csv");
pub const EMBEDDED_LEAGUE: &str = include_str!("resources/league.csv");

pub const SHARE_FOOTER: &str = "Play at: https://celebwordle.me";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Variant {
    /// Celebrities: profession, age, country, oscars, grammys
    Celebrity,
    /// League players: position, conference, age, jersey, teams
    League,
    /// Schema given with --schema, roster given with --input
    Custom,
}

impl Variant {
    /// Schema for the built-in variants; `None` for [`Variant::Custom`].
    pub fn builtin_schema(self) -> Option<AttributeSchema> {
        use AttributeKind::{ExactMatch, Identity, OrderedNumeric, SetOverlap};
        let columns: &[(&str, AttributeKind)] = match self {
            Self::Celebrity => &[
                ("name", Identity),
                ("profession", ExactMatch),
                ("age", OrderedNumeric),
                ("country", ExactMatch),
                ("oscars", OrderedNumeric),
                ("grammys", OrderedNumeric),
            ],
            Self::League => &[
                ("name", Identity),
                ("position", ExactMatch),
                ("conference", ExactMatch),
                ("age", OrderedNumeric),
                ("jersey", OrderedNumeric),
                ("teams", SetOverlap),
            ],
            Self::Custom => return None,
        };
        AttributeSchema::new(
            columns
                .iter()
                .map(|&(key, kind)| Attribute::new(key, kind))
                .collect(),
        )
        .ok()
    }

    pub fn embedded_roster(self) -> Option<&'static str> {
        match self {
            Self::Celebrity => Some(EMBEDDED_CELEBRITIES),
            Self::League => Some(EMBEDDED_LEAGUE),
            Self::Custom => None,
        }
    }

    /// What the mystery entity is called in prompts.
    pub fn noun(self) -> &'static str {
        match self {
            Self::Celebrity => "celebrity",
            Self::League => "player",
            Self::Custom => "entity",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Celebrity => "Celeb Wordle",
            Self::League => "League Wordle",
            Self::Custom => "Mystery Wordle",
        }
    }

    pub fn share_format(self) -> ShareFormat {
        ShareFormat::new(self.title(), SHARE_FOOTER)
    }
}
