use crate::collection::{CollectionContext, CollectionSchema, ObjectCollection};
use crate::entity::object::{ObjectCore, ObjectState};
use crate::error::CollectionResult;
use crate::key::{KeyComparer, ObjectKey, SimpleObjectKey};
use crate::source::MemberDescriptor;
use crate::urn::Urn;

const DATA_TYPE_PROPERTY: &str = "DataType";
const NULLABLE_PROPERTY: &str = "Nullable";
const IN_PRIMARY_KEY_PROPERTY: &str = "InPrimaryKey";
const ORDINAL_PROPERTY: &str = "ID";

/// Mirrored column of a table.
#[derive(Debug, Clone)]
pub struct Column {
    core: ObjectCore<SimpleObjectKey>,
}

impl Column {
    /// Creates a column in memory under the table owning `columns`.
    pub fn new(columns: &ColumnCollection, name: &str, data_type: &str) -> Self {
        let key = SimpleObjectKey::new(name);
        let mut core = ObjectCore::creating(key.clone(), columns.urn_for(&key));
        core.set_property(DATA_TYPE_PROPERTY, data_type);
        core.set_property(NULLABLE_PROPERTY, 1i64);
        Self { core }
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

    pub fn data_type(&self) -> Option<&str> {
        self.core.text_property(DATA_TYPE_PROPERTY)
    }

    pub fn nullable(&self) -> bool {
        self.core.number_property(NULLABLE_PROPERTY) != Some(0)
    }

    pub fn in_primary_key(&self) -> bool {
        self.core.number_property(IN_PRIMARY_KEY_PROPERTY) == Some(1)
    }

    /// 1-based position within the table, when reported by the source.
    pub fn ordinal(&self) -> Option<i64> {
        self.core.number_property(ORDINAL_PROPERTY)
    }
}

#[derive(Debug)]
pub struct ColumnSchema;

impl CollectionSchema for ColumnSchema {
    type Key = SimpleObjectKey;
    type Member = Column;
    type Comparer = KeyComparer;

    const TYPE_NAME: &'static str = "Column";

    fn key_of(member: &Column) -> &SimpleObjectKey {
        member.core.key()
    }

    fn retain_unreported(member: &Column) -> bool {
        member.state() == ObjectState::Creating
    }

    fn create_member(
        context: &CollectionContext,
        key: SimpleObjectKey,
        descriptor: MemberDescriptor,
    ) -> CollectionResult<Column> {
        let urn = context.parent().child(Self::TYPE_NAME, key.attributes());
        Ok(Column {
            core: ObjectCore::existing(key, urn, descriptor),
        })
    }
}

pub type ColumnCollection = ObjectCollection<ColumnSchema>;

impl ObjectCollection<ColumnSchema> {
    pub fn get_by_name(&mut self, name: &str) -> CollectionResult<&Column> {
        self.get(&SimpleObjectKey::new(name))
    }
}
