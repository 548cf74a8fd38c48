use crate::roster::Roster;
use crate::schema::Entity;
use crate::session::Guess;

/// Lazy, cloneable sequence of roster entities matching a query.
///
/// Clone it (or call [`search`] again) to restart from the beginning.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    entities: std::slice::Iter<'a, Entity>,
    guesses: &'a [Guess],
    needle: Option<String>,
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = self.needle.as_deref()?;
        let guesses = self.guesses;
        self.entities.by_ref().find(|entity| {
            entity.identity().to_lowercase().contains(needle)
                && !guesses.iter().any(|g| g.identity() == entity.identity())
        })
    }
}

/// Roster entities whose identity contains `query` (case-insensitive),
/// in roster order, minus anything already guessed.
///
/// An empty query matches nothing.
pub fn search<'a>(roster: &'a Roster, guesses: &'a [Guess], query: &str) -> Matches<'a> {
    let needle = (!query.is_empty()).then(|| query.to_lowercase());
    Matches {
        entities: roster.entities().iter(),
        guesses,
        needle,
    }
}

/// Case-insensitive name comparison using the same folding as [`search`].
pub fn same_identity(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// The entity a typed query resolves to when the player presses "guess":
/// the identity spelled exactly as typed, then a case-insensitive identity
/// match, otherwise the first match.
pub fn best_match<'a>(roster: &'a Roster, guesses: &'a [Guess], query: &str) -> Option<&'a Entity> {
    let matches = search(roster, guesses, query);
    matches
        .clone()
        .find(|e| e.identity() == query)
        .or_else(|| matches.clone().find(|e| same_identity(e.identity(), query)))
        .or_else(|| matches.clone().next())
}
