use crate::schema::{AttributeKind, AttributeSchema, Entity, Value};

/// Outcome of comparing one attribute of a guess against the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Exact,
    Mismatch,
    /// The secret's value is higher than the guess.
    MismatchHigher,
    /// The secret's value is lower than the guess.
    MismatchLower,
    OverlapMatch,
    OverlapMismatch,
}

impl Verdict {
    /// True for verdicts rendered as a matched cell.
    pub fn is_match(self) -> bool {
        matches!(self, Self::Exact | Self::OverlapMatch)
    }

    /// Directional arrow for numeric mismatches.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::MismatchHigher => Some("↑"),
            Self::MismatchLower => Some("↓"),
            _ => None,
        }
    }
}

/// Compare `guess` to `secret` on every scored attribute of `schema`.
///
/// The result has one verdict per non-identity attribute, in schema order.
/// Values whose type does not fit the attribute kind never match.
pub fn evaluate(guess: &Entity, secret: &Entity, schema: &AttributeSchema) -> Vec<Verdict> {
    schema
        .scored()
        .enumerate()
        .map(|(i, attr)| compare(attr.kind, guess.values().get(i), secret.values().get(i)))
        .collect()
}

fn compare(kind: AttributeKind, guess: Option<&Value>, secret: Option<&Value>) -> Verdict {
    match kind {
        AttributeKind::OrderedNumeric => match (guess, secret) {
            (Some(Value::Number(g)), Some(Value::Number(s))) => {
                if g < s {
                    Verdict::MismatchHigher
                } else if g > s {
                    Verdict::MismatchLower
                } else {
                    Verdict::Exact
                }
            }
            _ => Verdict::Mismatch,
        },
        AttributeKind::SetOverlap => match (guess, secret) {
            (Some(Value::Set(g)), Some(Value::Set(s))) if !g.is_disjoint(s) => {
                Verdict::OverlapMatch
            }
            _ => Verdict::OverlapMismatch,
        },
        // identity never reaches here through `scored`
        AttributeKind::ExactMatch | AttributeKind::Identity => match (guess, secret) {
            (Some(g), Some(s)) if g == s => Verdict::Exact,
            _ => Verdict::Mismatch,
        },
    }
}
