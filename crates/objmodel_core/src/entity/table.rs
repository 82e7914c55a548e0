use crate::collection::{CollectionContext, CollectionSchema, ObjectCollection};
use crate::entity::column::ColumnCollection;
use crate::entity::object::{ObjectCore, ObjectState};
use crate::error::CollectionResult;
use crate::key::{KeyComparer, ObjectKey, SchemaObjectKey};
use crate::source::MemberDescriptor;
use crate::urn::Urn;

/// Mirrored table. Owns its column collection.
#[derive(Debug)]
pub struct Table {
    core: ObjectCore<SchemaObjectKey>,
    columns: ColumnCollection,
}

impl Table {
    /// Creates a table in memory, addressed under `tables`' parent.
    pub fn new(tables: &TableCollection, schema: &str, name: &str) -> Self {
        let key = SchemaObjectKey::new(schema, name);
        let urn = tables.urn_for(&key);
        let columns = ColumnCollection::new(tables.context().for_child(urn.clone()));
        Self {
            core: ObjectCore::creating(key, urn),
            columns,
        }
    }

    fn existing(
        context: &CollectionContext,
        key: SchemaObjectKey,
        descriptor: MemberDescriptor,
    ) -> Self {
        let urn = context.parent().child(TableSchema::TYPE_NAME, key.attributes());
        let columns = ColumnCollection::new(context.for_child(urn.clone()));
        Self {
            core: ObjectCore::existing(key, urn, descriptor),
            columns,
        }
    }

    pub fn name(&self) -> &str {
        self.core.key().name()
    }

    pub fn schema(&self) -> &str {
        self.core.key().schema()
    }

    pub fn urn(&self) -> &Urn {
        self.core.urn()
    }

    pub fn state(&self) -> ObjectState {
        self.core.state()
    }

    pub fn core(&self) -> &ObjectCore<SchemaObjectKey> {
        &self.core
    }

    pub fn columns(&mut self) -> &mut ColumnCollection {
        &mut self.columns
    }
}

/// Binds the collection engine to `Table` members.
#[derive(Debug)]
pub struct TableSchema;

impl CollectionSchema for TableSchema {
    type Key = SchemaObjectKey;
    type Member = Table;
    type Comparer = KeyComparer;

    const TYPE_NAME: &'static str = "Table";

    fn key_of(member: &Table) -> &SchemaObjectKey {
        member.core.key()
    }

    /// Locally created members are kept until the server reports them.
    fn retain_unreported(member: &Table) -> bool {
        member.state() == ObjectState::Creating
    }

    fn create_member(
        context: &CollectionContext,
        key: SchemaObjectKey,
        descriptor: MemberDescriptor,
    ) -> CollectionResult<Table> {
        Ok(Table::existing(context, key, descriptor))
    }
}

pub type TableCollection = ObjectCollection<TableSchema>;

impl ObjectCollection<TableSchema> {
    pub fn get_by_name_schema(&mut self, name: &str, schema: &str) -> CollectionResult<&Table> {
        self.get(&SchemaObjectKey::new(schema, name))
    }

    pub fn get_by_name_schema_mut(
        &mut self,
        name: &str,
        schema: &str,
    ) -> CollectionResult<&mut Table> {
        self.get_mut(&SchemaObjectKey::new(schema, name))
    }
}

/// Mirrored view.
#[derive(Debug)]
pub struct View {
    core: ObjectCore<SchemaObjectKey>,
}

impl View {
    pub fn name(&self) -> &str {
        self.core.key().name()
    }

    pub fn schema(&self) -> &str {
        self.core.key().schema()
    }

    pub fn urn(&self) -> &Urn {
        self.core.urn()
    }

    pub fn core(&self) -> &ObjectCore<SchemaObjectKey> {
        &self.core
    }
}

#[derive(Debug)]
pub struct ViewSchema;

impl CollectionSchema for ViewSchema {
    type Key = SchemaObjectKey;
    type Member = View;
    type Comparer = KeyComparer;

    const TYPE_NAME: &'static str = "View";

    fn key_of(member: &View) -> &SchemaObjectKey {
        member.core.key()
    }

    fn create_member(
        context: &CollectionContext,
        key: SchemaObjectKey,
        descriptor: MemberDescriptor,
    ) -> CollectionResult<View> {
        let urn = context.parent().child(Self::TYPE_NAME, key.attributes());
        Ok(View {
            core: ObjectCore::existing(key, urn, descriptor),
        })
    }
}

pub type ViewCollection = ObjectCollection<ViewSchema>;

impl ObjectCollection<ViewSchema> {
    pub fn get_by_name_schema(&mut self, name: &str, schema: &str) -> CollectionResult<&View> {
        self.get(&SchemaObjectKey::new(schema, name))
    }
}
