use crate::config::StringComparer;
use crate::error::CollectionResult;
use crate::key::{quote_identifier, required_text, ObjectKey, NAME_ATTRIBUTE};
use crate::urn::{AttributeMap, AttributeValue};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Name-only identity (logins, columns, endpoints).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleObjectKey {
    name: String,
}

impl SimpleObjectKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ObjectKey for SimpleObjectKey {
    fn compare(&self, other: &Self, strings: &StringComparer) -> Ordering {
        strings.compare(&self.name, &other.name)
    }

    fn is_null(&self) -> bool {
        self.name.is_empty()
    }

    fn attributes(&self) -> AttributeMap {
        AttributeMap::from([(
            NAME_ATTRIBUTE.to_string(),
            AttributeValue::Text(self.name.clone()),
        )])
    }

    fn from_attributes(attributes: &AttributeMap) -> CollectionResult<Self> {
        Ok(Self::new(required_text(attributes, NAME_ATTRIBUTE)?))
    }
}

impl Display for SimpleObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", quote_identifier(&self.name))
    }
}
