use crate::collection::CollectionContext;
use crate::config::{ConfigError, StringComparer};
use crate::entity::login::LoginCollection;
use crate::entity::message::UserDefinedMessageCollection;
use crate::entity::table::{TableCollection, ViewCollection};
use crate::key::NAME_ATTRIBUTE;
use crate::source::PopulationSource;
use crate::urn::{AttributeMap, AttributeValue, Urn, UrnSegment};
use log::info;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Root entity; owns server-level collections.
#[derive(Debug)]
pub struct Server {
    urn: Urn,
    logins: LoginCollection,
    messages: UserDefinedMessageCollection,
}

impl Server {
    pub fn new(name: &str, comparer: StringComparer, source: Rc<dyn PopulationSource>) -> Self {
        let urn = Urn::root(UrnSegment::new("Server", name_attributes(name)));
        let context = CollectionContext::new(urn.clone(), comparer, source);
        Self {
            logins: LoginCollection::new(context.clone()),
            messages: UserDefinedMessageCollection::new(context),
            urn,
        }
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    pub fn logins(&mut self) -> &mut LoginCollection {
        &mut self.logins
    }

    pub fn user_defined_messages(&mut self) -> &mut UserDefinedMessageCollection {
        &mut self.messages
    }

    /// Invalidates every server-level collection.
    pub fn mark_out_of_sync(&mut self) {
        self.logins.mark_out_of_sync();
        self.messages.mark_out_of_sync();
    }
}

/// Database entity; owns schema-scoped collections.
///
/// The database collation decides how its children compare names.
pub struct Database {
    urn: Urn,
    comparer: StringComparer,
    source: Rc<dyn PopulationSource>,
    tables: TableCollection,
    views: ViewCollection,
}

impl Database {
    pub fn new(
        parent: &Urn,
        name: &str,
        comparer: StringComparer,
        source: Rc<dyn PopulationSource>,
    ) -> Self {
        let urn = parent.child("Database", name_attributes(name));
        let context = CollectionContext::new(urn.clone(), comparer, Rc::clone(&source));
        Self {
            tables: TableCollection::new(context.clone()),
            views: ViewCollection::new(context),
            urn,
            comparer,
            source,
        }
    }

    /// Builds a database whose comparison policy comes from `collation`.
    pub fn with_collation(
        parent: &Urn,
        name: &str,
        collation: &str,
        source: Rc<dyn PopulationSource>,
    ) -> Result<Self, ConfigError> {
        let comparer = StringComparer::from_collation(collation)?;
        Ok(Self::new(parent, name, comparer, source))
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    pub fn comparer(&self) -> &StringComparer {
        &self.comparer
    }

    pub fn tables(&mut self) -> &mut TableCollection {
        &mut self.tables
    }

    pub fn views(&mut self) -> &mut ViewCollection {
        &mut self.views
    }

    /// Invalidates every database-level collection.
    pub fn mark_out_of_sync(&mut self) {
        self.tables.mark_out_of_sync();
        self.views.mark_out_of_sync();
    }

    /// Switches the collation. Child ordering depends on it, so the child
    /// collections are rebuilt empty and repopulate on next access.
    pub fn set_collation(&mut self, collation: &str) -> Result<(), ConfigError> {
        let comparer = StringComparer::from_collation(collation)?;
        if comparer == self.comparer {
            return Ok(());
        }

        let context = CollectionContext::new(self.urn.clone(), comparer, Rc::clone(&self.source));
        self.tables = TableCollection::new(context.clone());
        self.views = ViewCollection::new(context);
        self.comparer = comparer;
        info!("event=collation_change module=entity status=ok type=Database");
        Ok(())
    }
}

impl Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("urn", &self.urn.to_string())
            .field("comparer", &self.comparer)
            .field("tables", &self.tables)
            .field("views", &self.views)
            .finish_non_exhaustive()
    }
}

fn name_attributes(name: &str) -> AttributeMap {
    AttributeMap::from([(
        NAME_ATTRIBUTE.to_string(),
        AttributeValue::Text(name.to_string()),
    )])
}
