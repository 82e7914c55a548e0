//! Failure taxonomy shared by keys, storage and collections.
//!
//! # Responsibility
//! - Name every way an identity, lookup or population can fail.
//! - Keep failures matchable so callers can branch on the variant.
//!
//! # Invariants
//! - The engine never recovers locally; the only conversion of `NotFound`
//!   into an absent value happens in the explicit no-fault operations.
//! - `Population` always leaves the owning collection uninitialized.

use crate::source::SourceError;
use crate::urn::UrnError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CollectionResult<T> = Result<T, CollectionError>;

/// Errors from key construction, keyed storage and collection operations.
#[derive(Debug)]
pub enum CollectionError {
    /// A null/unbound key was used where identity is required.
    InvalidKey(String),
    /// Insert collided with an equal key already present.
    DuplicateKey(String),
    /// Lookup or removal missed where absence was not expected.
    NotFound(String),
    /// Positional access outside `[0, count)`.
    IndexOutOfRange { index: usize, count: usize },
    /// Path or attribute set could not be turned into a key.
    MalformedKey(String),
    /// The population source failed or produced inconsistent members.
    Population {
        type_name: &'static str,
        parent: String,
        cause: SourceError,
    },
    /// Storage changed while a detached traversal was in progress.
    ConcurrentModification { expected_version: u64, actual_version: u64 },
    /// A cursor was advanced on storage other than the one that issued it.
    ForeignCursor { cursor_storage: u64, storage: u64 },
}

impl CollectionError {
    /// Stable, metadata-only code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidKey(_) => "invalid_key",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::NotFound(_) => "not_found",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::MalformedKey(_) => "malformed_key",
            Self::Population { .. } => "population_failed",
            Self::ConcurrentModification { .. } => "concurrent_modification",
            Self::ForeignCursor { .. } => "foreign_cursor",
        }
    }
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "key is null or unbound: {key}"),
            Self::DuplicateKey(key) => write!(f, "duplicate key: {key}"),
            Self::NotFound(key) => write!(f, "object not found: {key}"),
            Self::IndexOutOfRange { index, count } => {
                write!(f, "index {index} is out of range for {count} members")
            }
            Self::MalformedKey(message) => write!(f, "malformed key: {message}"),
            Self::Population {
                type_name,
                parent,
                cause,
            } => write!(
                f,
                "failed to populate `{type_name}` collection under `{parent}`: {cause}"
            ),
            Self::ConcurrentModification {
                expected_version,
                actual_version,
            } => write!(
                f,
                "collection modified during traversal \
                 (expected version {expected_version}, found {actual_version})"
            ),
            Self::ForeignCursor {
                cursor_storage,
                storage,
            } => write!(
                f,
                "cursor issued by storage {cursor_storage} used on storage {storage}"
            ),
        }
    }
}

impl Error for CollectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Population { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

impl From<UrnError> for CollectionError {
    fn from(value: UrnError) -> Self {
        Self::MalformedKey(value.to_string())
    }
}
