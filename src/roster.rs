//! Roster loading.
//!
//! A roster is parsed from delimited text with a header row. Header names are
//! matched to schema keys case-insensitively and may appear in any order;
//! unknown columns are ignored. Malformed rows are logged and skipped so a
//! single bad line never aborts the load.

use crate::debug_log;
use crate::schema::{AttributeKind, AttributeSchema, Entity, Value};
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

/// Separator between members of a set-valued field.
pub const SET_SEPARATOR: char = ';';

/// A row that could not be turned into an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: field '{column}' is not a number: '{value}'")]
    NotNumeric {
        line: u64,
        column: String,
        value: String,
    },
    #[error("line {line}: identity field is empty")]
    EmptyIdentity { line: u64 },
    #[error("line {line}: duplicate identity '{name}'")]
    DuplicateIdentity { line: u64, name: String },
    #[error("line {line}: unreadable row: {reason}")]
    Malformed { line: u64, reason: String },
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster: {0}")]
    Io(#[from] io::Error),
    #[error("failed to read roster: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster header has no column for attribute '{0}'")]
    MissingColumn(String),
    #[error("roster contains no playable entities")]
    Empty,
    #[error("roster lists '{0}' more than once")]
    DuplicateIdentity(String),
}

/// Immutable, non-empty candidate list sharing one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    schema: AttributeSchema,
    entities: Vec<Entity>,
}

impl Roster {
    /// Fails with [`RosterError::Empty`] when `entities` is empty, or when
    /// two entities share an identity.
    pub fn new(schema: AttributeSchema, entities: Vec<Entity>) -> Result<Self, RosterError> {
        if entities.is_empty() {
            return Err(RosterError::Empty);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = entities.iter().find(|e| !seen.insert(e.identity())) {
            return Err(RosterError::DuplicateIdentity(dup.identity().to_string()));
        }
        Ok(Self { schema, entities })
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    /// Exact identity lookup.
    pub fn find(&self, identity: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.identity() == identity)
    }
}

/// Parse a roster, returning it together with every row that was skipped.
pub fn parse_roster<R: Read>(
    schema: &AttributeSchema,
    reader: R,
) -> Result<(Roster, Vec<ParseError>), RosterError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = schema
        .attributes()
        .iter()
        .map(|attr| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(&attr.key))
                .ok_or_else(|| RosterError::MissingColumn(attr.key.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut entities = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        // header occupies line 1
        let fallback_line = i as u64 + 2;
        let parsed = match result {
            Ok(record) => {
                let line = record.position().map_or(fallback_line, csv::Position::line);
                parse_row(schema, &columns, headers.len(), &record, line).and_then(|entity| {
                    if seen.insert(entity.identity().to_string()) {
                        Ok(entity)
                    } else {
                        Err(ParseError::DuplicateIdentity {
                            line,
                            name: entity.identity().to_string(),
                        })
                    }
                })
            }
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => Err(ParseError::Malformed {
                line: e.position().map_or(fallback_line, csv::Position::line),
                reason: e.to_string(),
            }),
        };

        match parsed {
            Ok(entity) => {
                debug_log!("Loaded roster entity '{}'", entity.identity());
                entities.push(entity);
            }
            Err(e) => {
                log::warn!("Skipping roster row: {e}");
                skipped.push(e);
            }
        }
    }

    log::info!(
        "Roster loaded: {} entities, {} rows skipped",
        entities.len(),
        skipped.len()
    );
    let roster = Roster::new(schema.clone(), entities)?;
    Ok((roster, skipped))
}

fn parse_row(
    schema: &AttributeSchema,
    columns: &[usize],
    expected: usize,
    record: &csv::StringRecord,
    line: u64,
) -> Result<Entity, ParseError> {
    if record.len() != expected {
        return Err(ParseError::FieldCount {
            line,
            expected,
            found: record.len(),
        });
    }

    let mut identity = String::new();
    let mut values = Vec::with_capacity(schema.scored_len());
    for (attr, &col) in schema.attributes().iter().zip(columns) {
        let raw = record.get(col).unwrap_or_default();
        match attr.kind {
            AttributeKind::Identity => {
                if raw.is_empty() {
                    return Err(ParseError::EmptyIdentity { line });
                }
                identity = raw.to_string();
            }
            AttributeKind::ExactMatch => values.push(Value::Text(raw.to_string())),
            AttributeKind::OrderedNumeric => {
                let n = raw.parse::<i64>().map_err(|_| ParseError::NotNumeric {
                    line,
                    column: attr.key.clone(),
                    value: raw.to_string(),
                })?;
                values.push(Value::Number(n));
            }
            AttributeKind::SetOverlap => values.push(Value::Set(parse_set(raw))),
        }
    }
    Ok(Entity::new(identity, values))
}

fn parse_set(raw: &str) -> BTreeSet<String> {
    raw.split(SET_SEPARATOR)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn load_roster_from_str(schema: &AttributeSchema, data: &str) -> Result<Roster, RosterError> {
    parse_roster(schema, data.as_bytes()).map(|(roster, _)| roster)
}

pub fn load_roster_from_file<P: AsRef<Path>>(
    schema: &AttributeSchema,
    path: P,
) -> Result<Roster, RosterError> {
    let file = File::open(path)?;
    parse_roster(schema, io::BufReader::new(file)).map(|(roster, _)| roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;
    use std::io::Write;

    fn schema() -> AttributeSchema {
        AttributeSchema::new(vec![
            Attribute::new("name", AttributeKind::Identity),
            Attribute::new("country", AttributeKind::ExactMatch),
            Attribute::new("age", AttributeKind::OrderedNumeric),
            Attribute::new("teams", AttributeKind::SetOverlap),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_typed_values() {
        let data = "name,country,age,teams\nAda,UK,36,\" Heat ; Lakers;;\"\n";
        let roster = load_roster_from_str(&schema(), data).unwrap();
        assert_eq!(roster.len(), 1);
        let ada = roster.find("Ada").unwrap();
        assert_eq!(ada.values()[0], Value::Text("UK".to_string()));
        assert_eq!(ada.values()[1], Value::Number(36));
        let teams: BTreeSet<String> = ["Heat", "Lakers"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ada.values()[2], Value::Set(teams));
    }

    #[test]
    fn test_header_order_and_case_do_not_matter() {
        let data = "Teams,AGE,extra,Name,Country\nA;B,40,ignored,Bo,USA\n";
        let roster = load_roster_from_str(&schema(), data).unwrap();
        let bo = roster.find("Bo").unwrap();
        assert_eq!(bo.get(roster.schema(), "age"), Some(&Value::Number(40)));
        assert_eq!(
            bo.get(roster.schema(), "country"),
            Some(&Value::Text("USA".to_string()))
        );
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let data = "name,country,age,teams\n\
                    Ada,UK,36,Heat\n\
                    Bo,USA\n\
                    Cy,USA,old,Heat\n\
                    ,USA,20,Heat\n\
                    Ada,FR,50,Nets\n\
                    Di,UK,28,\n";
        let (roster, skipped) = parse_roster(&schema(), data.as_bytes()).unwrap();
        let names: Vec<&str> = roster.entities().iter().map(Entity::identity).collect();
        assert_eq!(names, vec!["Ada", "Di"]);
        assert_eq!(
            skipped,
            vec![
                ParseError::FieldCount {
                    line: 3,
                    expected: 4,
                    found: 2
                },
                ParseError::NotNumeric {
                    line: 4,
                    column: "age".to_string(),
                    value: "old".to_string()
                },
                ParseError::EmptyIdentity { line: 5 },
                ParseError::DuplicateIdentity {
                    line: 6,
                    name: "Ada".to_string()
                },
            ]
        );
        assert_eq!(roster.find("Di").unwrap().values()[2], Value::Set(BTreeSet::new()));
    }

    #[test]
    fn test_all_rows_bad_is_empty_roster() {
        let data = "name,country,age,teams\nBo,USA\n";
        let err = load_roster_from_str(&schema(), data).unwrap_err();
        assert!(matches!(err, RosterError::Empty));
    }

    #[test]
    fn test_header_only_is_empty_roster() {
        let err = load_roster_from_str(&schema(), "name,country,age,teams\n").unwrap_err();
        assert!(matches!(err, RosterError::Empty));
    }

    #[test]
    fn test_missing_column() {
        let err = load_roster_from_str(&schema(), "name,country,age\nBo,USA,3\n").unwrap_err();
        match err {
            RosterError::MissingColumn(col) => assert_eq!(col, "teams"),
            other => panic!("Expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,country,age,teams").unwrap();
        writeln!(file, "Ada,UK,36,Heat").unwrap();
        let roster = load_roster_from_file(&schema(), file.path()).unwrap();
        assert_eq!(roster.len(), 1);
        assert!(!roster.is_empty());
        assert_eq!(roster.get(0).unwrap().identity(), "Ada");
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = load_roster_from_file(&schema(), "/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, RosterError::Io(_)));
    }

    #[test]
    fn test_roster_new_rejects_duplicates() {
        let entities = vec![
            Entity::new("Ada", vec![]),
            Entity::new("Ada", vec![]),
        ];
        match Roster::new(schema(), entities) {
            Err(RosterError::DuplicateIdentity(name)) => assert_eq!(name, "Ada"),
            other => panic!("Expected DuplicateIdentity, got {other:?}"),
        }
    }

    #[test]
    fn test_roster_new_rejects_empty() {
        assert!(matches!(
            Roster::new(schema(), Vec::new()),
            Err(RosterError::Empty)
        ));
    }
}
