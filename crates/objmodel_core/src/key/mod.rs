//! Polymorphic identity values for collection members.
//!
//! # Responsibility
//! - Define the `ObjectKey` contract every concrete key kind implements.
//! - Provide the attribute codec shared by path expressions and population
//!   descriptors.
//!
//! # Invariants
//! - Keys are immutable after construction; `Clone` yields a detached copy.
//! - `equals` agrees with `compare == Equal` under the same comparer.
//! - `to_filter_expression` is injective and reversible through
//!   `from_attributes`.
//! - A null key is never stored.

pub mod comparer;
mod numeric;
mod schema;
mod simple;

pub use comparer::{KeyComparer, ObjectComparer};
pub use numeric::{IdObjectKey, MessageObjectKey};
pub use schema::SchemaObjectKey;
pub use simple::SimpleObjectKey;

use crate::config::StringComparer;
use crate::error::{CollectionError, CollectionResult};
use crate::urn::{render_filter, AttributeMap, AttributeValue, UrnSegment};
use std::cmp::Ordering;
use std::fmt::{Debug, Display};

pub(crate) const NAME_ATTRIBUTE: &str = "Name";
pub(crate) const SCHEMA_ATTRIBUTE: &str = "Schema";
pub(crate) const ID_ATTRIBUTE: &str = "ID";
pub(crate) const LANGUAGE_ATTRIBUTE: &str = "Language";

/// Identity of one member within one collection.
pub trait ObjectKey: Clone + Debug + Display {
    /// Total order over keys of this kind.
    ///
    /// String fields use `strings`; numeric fields use numeric order.
    /// Composite keys compare field by field in declaration order.
    fn compare(&self, other: &Self, strings: &StringComparer) -> Ordering;

    fn equals(&self, other: &Self, strings: &StringComparer) -> bool {
        self.compare(other, strings) == Ordering::Equal
    }

    /// True when a required field is unset; such keys identify nothing.
    fn is_null(&self) -> bool;

    /// Field values keyed by attribute name.
    fn attributes(&self) -> AttributeMap;

    /// Canonical filter body that re-selects this member.
    fn to_filter_expression(&self) -> String {
        render_filter(&self.attributes())
    }

    /// Builds a key from an attribute set (descriptor or path segment).
    fn from_attributes(attributes: &AttributeMap) -> CollectionResult<Self>
    where
        Self: Sized;

    /// Builds a key from the trailing segment of a path expression.
    fn from_path_expression(segment: &UrnSegment) -> CollectionResult<Self>
    where
        Self: Sized,
    {
        Self::from_attributes(segment.attributes())
    }
}

pub(crate) fn required_text(attributes: &AttributeMap, name: &str) -> CollectionResult<String> {
    match attributes.get(name) {
        Some(AttributeValue::Text(value)) => Ok(value.clone()),
        Some(AttributeValue::Number(_)) => Err(CollectionError::MalformedKey(format!(
            "attribute `@{name}` must be text"
        ))),
        None => Err(CollectionError::MalformedKey(format!(
            "missing required attribute `@{name}`"
        ))),
    }
}

pub(crate) fn required_id(attributes: &AttributeMap, name: &str) -> CollectionResult<i32> {
    match attributes.get(name) {
        Some(AttributeValue::Number(value)) => i32::try_from(*value).map_err(|_| {
            CollectionError::MalformedKey(format!("attribute `@{name}` is out of range: {value}"))
        }),
        Some(AttributeValue::Text(_)) => Err(CollectionError::MalformedKey(format!(
            "attribute `@{name}` must be numeric"
        ))),
        None => Err(CollectionError::MalformedKey(format!(
            "missing required attribute `@{name}`"
        ))),
    }
}

/// Bracket-quotes a server identifier for display, doubling `]`.
pub(crate) fn quote_identifier(value: &str) -> String {
    format!("[{}]", value.replace(']', "]]"))
}
