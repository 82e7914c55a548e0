//! Population source contract and built-in implementations.
//!
//! # Responsibility
//! - Define the single capability a population source implements.
//! - Carry raw member descriptors from a source into a collection.
//!
//! # Invariants
//! - A source streams descriptors in any order; final ordering belongs to
//!   the collection's comparer.
//! - A sink rejection must abort the pass; sources propagate it with `?`.

mod memory;
mod sqlite;

pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;

use crate::error::CollectionError;
use crate::urn::{AttributeMap, AttributeValue, Urn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors produced while a source enumerates members.
#[derive(Debug)]
pub enum SourceError {
    /// The source does not know how to enumerate this member type.
    UnsupportedType(String),
    /// The parent path lacks the attributes needed to scope the query.
    InvalidParent(String),
    /// Underlying SQLite catalog error.
    Sqlite(rusqlite::Error),
    /// The collection refused one of the streamed members.
    Rejected(Box<CollectionError>),
    /// The source kept streaming after the collection refused a member.
    IgnoredRejection(String),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedType(type_name) => {
                write!(f, "source cannot enumerate `{type_name}` members")
            }
            Self::InvalidParent(parent) => write!(f, "invalid parent path for source: {parent}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Rejected(err) => write!(f, "member rejected: {err}"),
            Self::IgnoredRejection(message) => {
                write!(f, "source ignored a member rejection: {message}")
            }
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnsupportedType(_) => None,
            Self::InvalidParent(_) => None,
            Self::Sqlite(err) => Some(err),
            Self::Rejected(err) => Some(err.as_ref()),
            Self::IgnoredRejection(_) => None,
        }
    }
}

impl From<rusqlite::Error> for SourceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<CollectionError> for SourceError {
    fn from(value: CollectionError) -> Self {
        Self::Rejected(Box::new(value))
    }
}

/// Raw description of one discovered member: its key attributes plus any
/// further properties the source reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    attributes: AttributeMap,
}

impl MemberDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn into_attributes(self) -> AttributeMap {
        self.attributes
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(AttributeValue::as_text)
    }

    pub fn number(&self, name: &str) -> Option<i64> {
        self.attributes.get(name).and_then(AttributeValue::as_number)
    }
}

/// Identity of the collection being populated.
#[derive(Debug, Clone, Copy)]
pub struct PopulationRequest<'a> {
    /// Path of the parent object that owns the collection.
    pub parent: &'a Urn,
    /// Member type name, as used in path segments (e.g. `Table`).
    pub type_name: &'a str,
}

/// Receiver of streamed descriptors.
pub trait MemberSink {
    fn add_existing(&mut self, descriptor: MemberDescriptor) -> Result<(), CollectionError>;
}

/// External collaborator that discovers the members of one collection.
pub trait PopulationSource {
    fn populate(
        &self,
        request: &PopulationRequest<'_>,
        sink: &mut dyn MemberSink,
    ) -> Result<(), SourceError>;
}
