use crate::source::MemberDescriptor;
use crate::urn::{AttributeMap, AttributeValue, Urn};

/// Whether an object mirrors a server-side entity or was created locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Discovered by population.
    Existing,
    /// Created in memory; not yet present server-side.
    Creating,
}

/// Identity, location and property bag shared by every mirrored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectCore<K> {
    key: K,
    urn: Urn,
    properties: AttributeMap,
    state: ObjectState,
}

impl<K> ObjectCore<K> {
    /// Core for a discovered object; properties come from its descriptor.
    pub fn existing(key: K, urn: Urn, descriptor: MemberDescriptor) -> Self {
        Self {
            key,
            urn,
            properties: descriptor.into_attributes(),
            state: ObjectState::Existing,
        }
    }

    /// Core for a locally created object with no properties yet.
    pub fn creating(key: K, urn: Urn) -> Self {
        Self {
            key,
            urn,
            properties: AttributeMap::new(),
            state: ObjectState::Creating,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn property(&self, name: &str) -> Option<&AttributeValue> {
        self.properties.get(name)
    }

    pub fn text_property(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(AttributeValue::as_text)
    }

    pub fn number_property(&self, name: &str) -> Option<i64> {
        self.property(name).and_then(AttributeValue::as_number)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.properties.insert(name.into(), value.into());
    }
}
