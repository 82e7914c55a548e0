//! Lazily populated object model over a database server catalog.
//! Collections mirror server-side entities and load them on first access.

pub mod collection;
pub mod config;
pub mod entity;
pub mod error;
pub mod key;
pub mod logging;
pub mod source;
pub mod storage;
pub mod urn;

pub use collection::{CollectionContext, CollectionSchema, CollectionState, ObjectCollection};
pub use config::{CaseSensitivity, ConfigError, StringComparer};
pub use entity::{
    Column, ColumnCollection, Database, Login, LoginCollection, ObjectState, Server, Table,
    TableCollection, UserDefinedMessage, UserDefinedMessageCollection, View, ViewCollection,
};
pub use error::{CollectionError, CollectionResult};
pub use key::{
    IdObjectKey, KeyComparer, MessageObjectKey, ObjectComparer, ObjectKey, SchemaObjectKey,
    SimpleObjectKey,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use source::{
    MemberDescriptor, MemberSink, MemoryCatalog, PopulationRequest, PopulationSource,
    SourceError, SqliteCatalog,
};
pub use storage::{Cursor, KeyedStorage};
pub use urn::{AttributeMap, AttributeValue, Urn, UrnError, UrnSegment};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
