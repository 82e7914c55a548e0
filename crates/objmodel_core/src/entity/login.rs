use crate::collection::{CollectionContext, CollectionSchema, ObjectCollection};
use crate::entity::object::{ObjectCore, ObjectState};
use crate::error::CollectionResult;
use crate::key::{KeyComparer, ObjectKey, SimpleObjectKey};
use crate::source::MemberDescriptor;
use crate::urn::Urn;

const LOGIN_TYPE_PROPERTY: &str = "LoginType";
const DISABLED_PROPERTY: &str = "IsDisabled";

/// Server-level login.
#[derive(Debug, Clone)]
pub struct Login {
    core: ObjectCore<SimpleObjectKey>,
}

impl Login {
    pub fn new(logins: &LoginCollection, name: &str) -> Self {
        let key = SimpleObjectKey::new(name);
        let urn = logins.urn_for(&key);
        Self {
            core: ObjectCore::creating(key, urn),
        }
    }

    pub fn name(&self) -> &str {
        self.core.key().name()
    }

    pub fn urn(&self) -> &Urn {
        self.core.urn()
    }

    pub fn state(&self) -> ObjectState {
        self.core.state()
    }

    pub fn login_type(&self) -> Option<&str> {
        self.core.text_property(LOGIN_TYPE_PROPERTY)
    }

    pub fn is_disabled(&self) -> bool {
        self.core.number_property(DISABLED_PROPERTY) == Some(1)
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.core.set_property(DISABLED_PROPERTY, i64::from(disabled));
    }
}

#[derive(Debug)]
pub struct LoginSchema;

impl CollectionSchema for LoginSchema {
    type Key = SimpleObjectKey;
    type Member = Login;
    type Comparer = KeyComparer;

    const TYPE_NAME: &'static str = "Login";

    fn key_of(member: &Login) -> &SimpleObjectKey {
        member.core.key()
    }

    /// Locally created members are kept until the server reports them.
    fn retain_unreported(member: &Login) -> bool {
        member.state() == ObjectState::Creating
    }

    fn create_member(
        context: &CollectionContext,
        key: SimpleObjectKey,
        descriptor: MemberDescriptor,
    ) -> CollectionResult<Login> {
        let urn = context.parent().child(Self::TYPE_NAME, key.attributes());
        Ok(Login {
            core: ObjectCore::existing(key, urn, descriptor),
        })
    }
}

pub type LoginCollection = ObjectCollection<LoginSchema>;

impl ObjectCollection<LoginSchema> {
    pub fn get_by_name(&mut self, name: &str) -> CollectionResult<&Login> {
        self.get(&SimpleObjectKey::new(name))
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> CollectionResult<&mut Login> {
        self.get_mut(&SimpleObjectKey::new(name))
    }
}
