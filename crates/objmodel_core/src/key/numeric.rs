use crate::config::StringComparer;
use crate::error::CollectionResult;
use crate::key::{required_id, required_text, ObjectKey, ID_ATTRIBUTE, LANGUAGE_ATTRIBUTE};
use crate::urn::{AttributeMap, AttributeValue};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Numeric identity. Ids are positive; `0` and below are null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdObjectKey {
    id: i32,
}

impl IdObjectKey {
    pub const fn new(id: i32) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i32 {
        self.id
    }
}

impl ObjectKey for IdObjectKey {
    fn compare(&self, other: &Self, _strings: &StringComparer) -> Ordering {
        self.id.cmp(&other.id)
    }

    fn is_null(&self) -> bool {
        self.id <= 0
    }

    fn attributes(&self) -> AttributeMap {
        AttributeMap::from([(ID_ATTRIBUTE.to_string(), AttributeValue::from(self.id))])
    }

    fn from_attributes(attributes: &AttributeMap) -> CollectionResult<Self> {
        Ok(Self::new(required_id(attributes, ID_ATTRIBUTE)?))
    }
}

impl Display for IdObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Composite numeric + text identity (user-defined messages).
///
/// Declaration order is `id`, then `language`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageObjectKey {
    id: i32,
    language: String,
}

impl MessageObjectKey {
    pub fn new(id: i32, language: impl Into<String>) -> Self {
        Self {
            id,
            language: language.into(),
        }
    }

    pub const fn id(&self) -> i32 {
        self.id
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl ObjectKey for MessageObjectKey {
    fn compare(&self, other: &Self, strings: &StringComparer) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| strings.compare(&self.language, &other.language))
    }

    fn is_null(&self) -> bool {
        self.id <= 0 || self.language.is_empty()
    }

    fn attributes(&self) -> AttributeMap {
        AttributeMap::from([
            (ID_ATTRIBUTE.to_string(), AttributeValue::from(self.id)),
            (
                LANGUAGE_ATTRIBUTE.to_string(),
                AttributeValue::Text(self.language.clone()),
            ),
        ])
    }

    fn from_attributes(attributes: &AttributeMap) -> CollectionResult<Self> {
        let id = required_id(attributes, ID_ATTRIBUTE)?;
        let language = required_text(attributes, LANGUAGE_ATTRIBUTE)?;
        Ok(Self::new(id, language))
    }
}

impl Display for MessageObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.id, self.language)
    }
}

#[cfg(test)]
mod tests {
    use super::{IdObjectKey, MessageObjectKey};
    use crate::config::StringComparer;
    use crate::error::CollectionError;
    use crate::key::ObjectKey;
    use crate::urn::{AttributeMap, AttributeValue};
    use std::cmp::Ordering;

    #[test]
    fn ids_order_numerically_not_lexically() {
        let strings = StringComparer::default();
        assert_eq!(
            IdObjectKey::new(9).compare(&IdObjectKey::new(10), &strings),
            Ordering::Less
        );
    }

    #[test]
    fn non_positive_ids_are_null() {
        assert!(IdObjectKey::new(0).is_null());
        assert!(IdObjectKey::new(-3).is_null());
        assert!(MessageObjectKey::new(50001, "").is_null());
    }

    #[test]
    fn message_key_compares_id_first_then_language() {
        let strings = StringComparer::case_insensitive();
        let a = MessageObjectKey::new(50001, "us_english");
        let b = MessageObjectKey::new(50001, "Deutsch");
        let c = MessageObjectKey::new(50000, "us_english");
        assert_eq!(b.compare(&a, &strings), Ordering::Less);
        assert_eq!(c.compare(&b, &strings), Ordering::Less);
        assert!(a.equals(&MessageObjectKey::new(50001, "US_ENGLISH"), &strings));
    }

    #[test]
    fn textual_id_is_malformed() {
        let attributes = AttributeMap::from([
            ("ID".to_string(), AttributeValue::Text("7".to_string())),
            ("Language".to_string(), AttributeValue::Text("x".to_string())),
        ]);
        assert!(matches!(
            MessageObjectKey::from_attributes(&attributes),
            Err(CollectionError::MalformedKey(_))
        ));
    }

    #[test]
    fn oversized_id_is_malformed() {
        let attributes =
            AttributeMap::from([("ID".to_string(), AttributeValue::Number(i64::MAX))]);
        assert!(matches!(
            IdObjectKey::from_attributes(&attributes),
            Err(CollectionError::MalformedKey(_))
        ));
    }
}
