use crate::collection::{CollectionContext, CollectionSchema, ObjectCollection};
use crate::entity::object::{ObjectCore, ObjectState};
use crate::error::CollectionResult;
use crate::key::{KeyComparer, MessageObjectKey, ObjectKey};
use crate::source::MemberDescriptor;
use crate::urn::Urn;

const TEXT_PROPERTY: &str = "Text";
const SEVERITY_PROPERTY: &str = "Severity";

/// User-defined error message, identified by id and language.
#[derive(Debug, Clone)]
pub struct UserDefinedMessage {
    core: ObjectCore<MessageObjectKey>,
}

impl UserDefinedMessage {
    pub fn new(
        messages: &UserDefinedMessageCollection,
        id: i32,
        language: &str,
        text: &str,
        severity: i64,
    ) -> Self {
        let key = MessageObjectKey::new(id, language);
        let mut core = ObjectCore::creating(key.clone(), messages.urn_for(&key));
        core.set_property(TEXT_PROPERTY, text);
        core.set_property(SEVERITY_PROPERTY, severity);
        Self { core }
    }

    pub fn id(&self) -> i32 {
        self.core.key().id()
    }

    pub fn language(&self) -> &str {
        self.core.key().language()
    }

    pub fn urn(&self) -> &Urn {
        self.core.urn()
    }

    pub fn state(&self) -> ObjectState {
        self.core.state()
    }

    pub fn text(&self) -> Option<&str> {
        self.core.text_property(TEXT_PROPERTY)
    }

    pub fn severity(&self) -> Option<i64> {
        self.core.number_property(SEVERITY_PROPERTY)
    }
}

#[derive(Debug)]
pub struct UserDefinedMessageSchema;

impl CollectionSchema for UserDefinedMessageSchema {
    type Key = MessageObjectKey;
    type Member = UserDefinedMessage;
    type Comparer = KeyComparer;

    const TYPE_NAME: &'static str = "UserDefinedMessage";

    fn key_of(member: &UserDefinedMessage) -> &MessageObjectKey {
        member.core.key()
    }

    fn retain_unreported(member: &UserDefinedMessage) -> bool {
        member.state() == ObjectState::Creating
    }

    fn create_member(
        context: &CollectionContext,
        key: MessageObjectKey,
        descriptor: MemberDescriptor,
    ) -> CollectionResult<UserDefinedMessage> {
        let urn = context.parent().child(Self::TYPE_NAME, key.attributes());
        Ok(UserDefinedMessage {
            core: ObjectCore::existing(key, urn, descriptor),
        })
    }
}

pub type UserDefinedMessageCollection = ObjectCollection<UserDefinedMessageSchema>;

impl ObjectCollection<UserDefinedMessageSchema> {
    pub fn get_by_id_language(
        &mut self,
        id: i32,
        language: &str,
    ) -> CollectionResult<&UserDefinedMessage> {
        self.get(&MessageObjectKey::new(id, language))
    }
}
