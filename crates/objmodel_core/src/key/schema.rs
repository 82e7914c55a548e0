use crate::config::StringComparer;
use crate::error::CollectionResult;
use crate::key::{quote_identifier, required_text, ObjectKey, NAME_ATTRIBUTE, SCHEMA_ATTRIBUTE};
use crate::urn::{AttributeMap, AttributeValue};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Schema-qualified identity (tables, views).
///
/// Declaration order is `schema`, then `name`; ordering follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaObjectKey {
    schema: String,
    name: String,
}

impl SchemaObjectKey {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ObjectKey for SchemaObjectKey {
    fn compare(&self, other: &Self, strings: &StringComparer) -> Ordering {
        strings
            .compare(&self.schema, &other.schema)
            .then_with(|| strings.compare(&self.name, &other.name))
    }

    fn is_null(&self) -> bool {
        self.schema.is_empty() || self.name.is_empty()
    }

    fn attributes(&self) -> AttributeMap {
        AttributeMap::from([
            (
                NAME_ATTRIBUTE.to_string(),
                AttributeValue::Text(self.name.clone()),
            ),
            (
                SCHEMA_ATTRIBUTE.to_string(),
                AttributeValue::Text(self.schema.clone()),
            ),
        ])
    }

    fn from_attributes(attributes: &AttributeMap) -> CollectionResult<Self> {
        let name = required_text(attributes, NAME_ATTRIBUTE)?;
        let schema = required_text(attributes, SCHEMA_ATTRIBUTE)?;
        Ok(Self::new(schema, name))
    }
}

impl Display for SchemaObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}",
            quote_identifier(&self.schema),
            quote_identifier(&self.name)
        )
    }
}
