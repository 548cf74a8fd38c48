//! Attribute schema and entity model.
//!
//! A schema is an ordered list of attributes, exactly one of which is the
//! identity (the display name). Every other attribute is scored against the
//! secret according to its [`AttributeKind`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How an attribute is parsed and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Unique display key, never scored.
    Identity,
    /// Text compared for equality.
    ExactMatch,
    /// Integer compared with a directional hint on mismatch.
    OrderedNumeric,
    /// Set of tokens; any shared member counts as a match.
    SetOverlap,
}

impl AttributeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::ExactMatch => "exact",
            Self::OrderedNumeric => "numeric",
            Self::SetOverlap => "set",
        }
    }
}

impl FromStr for AttributeKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "id" | "name" => Ok(Self::Identity),
            "exact" | "exactmatch" | "text" => Ok(Self::ExactMatch),
            "numeric" | "orderednumeric" | "number" | "int" => Ok(Self::OrderedNumeric),
            "set" | "setoverlap" | "list" => Ok(Self::SetOverlap),
            other => Err(SchemaError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema has no identity attribute")]
    NoIdentity,
    #[error("schema has more than one identity attribute ('{0}' and '{1}')")]
    MultipleIdentity(String, String),
    #[error("attribute '{0}' is declared twice")]
    DuplicateKey(String),
    #[error("unknown attribute kind '{0}' (expected identity, exact, numeric or set)")]
    UnknownKind(String),
    #[error("malformed attribute declaration '{0}' (expected key=kind)")]
    MalformedDeclaration(String),
}

/// One column of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub kind: AttributeKind,
}

impl Attribute {
    pub fn new(key: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }
}

/// Ordered, validated attribute list for one game variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    attributes: Vec<Attribute>,
    identity: usize,
}

impl AttributeSchema {
    /// Build a schema, checking for exactly one identity and unique keys.
    pub fn new(attributes: Vec<Attribute>) -> Result<Self, SchemaError> {
        let mut identity: Option<usize> = None;
        for (i, attr) in attributes.iter().enumerate() {
            if attributes[..i]
                .iter()
                .any(|a| a.key.eq_ignore_ascii_case(&attr.key))
            {
                return Err(SchemaError::DuplicateKey(attr.key.clone()));
            }
            if attr.kind == AttributeKind::Identity {
                if let Some(first) = identity {
                    return Err(SchemaError::MultipleIdentity(
                        attributes[first].key.clone(),
                        attr.key.clone(),
                    ));
                }
                identity = Some(i);
            }
        }
        let identity = identity.ok_or(SchemaError::NoIdentity)?;
        Ok(Self {
            attributes,
            identity,
        })
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn identity(&self) -> &Attribute {
        &self.attributes[self.identity]
    }

    /// Non-identity attributes in schema order. Verdict vectors and entity
    /// values are both indexed by position in this sequence.
    pub fn scored(&self) -> impl Iterator<Item = &Attribute> + Clone + '_ {
        self.attributes
            .iter()
            .filter(|a| a.kind != AttributeKind::Identity)
    }

    pub fn scored_len(&self) -> usize {
        self.attributes.len() - 1
    }

    /// Position of `key` among the scored attributes.
    pub fn scored_index(&self, key: &str) -> Option<usize> {
        self.scored().position(|a| a.key.eq_ignore_ascii_case(key))
    }
}

/// Parses `name=identity,age=numeric,teams=set`.
impl FromStr for AttributeSchema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let attributes = s
            .split(',')
            .filter(|decl| !decl.trim().is_empty())
            .map(|decl| {
                let (key, kind) = decl
                    .split_once('=')
                    .ok_or_else(|| SchemaError::MalformedDeclaration(decl.trim().to_string()))?;
                let key = key.trim();
                if key.is_empty() {
                    return Err(SchemaError::MalformedDeclaration(decl.trim().to_string()));
                }
                Ok(Attribute::new(key, kind.parse()?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(attributes)
    }
}

impl fmt::Display for AttributeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", attr.key, attr.kind.label())?;
        }
        Ok(())
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Number(i64),
    Set(BTreeSet<String>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Set(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(item)?;
                }
                Ok(())
            }
        }
    }
}

/// One roster record. `values` is aligned with [`AttributeSchema::scored`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    identity: String,
    values: Vec<Value>,
}

impl Entity {
    pub fn new(identity: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            identity: identity.into(),
            values,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Look up a scored attribute by key.
    pub fn get(&self, schema: &AttributeSchema, key: &str) -> Option<&Value> {
        schema.scored_index(key).and_then(|i| self.values.get(i))
    }
}
