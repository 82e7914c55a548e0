//! SQLite catalog source.
//!
//! # Responsibility
//! - Mirror SQLite catalog entities (tables, views, columns) as descriptors.
//! - Keep SQL details inside the source boundary.
//!
//! # Invariants
//! - The catalog is read-only; no statement here mutates the database.
//! - Internal `sqlite_*` objects are never reported.
//! - The parent path's trailing segment scopes every query.

use crate::key::{ID_ATTRIBUTE, NAME_ATTRIBUTE, SCHEMA_ATTRIBUTE};
use crate::source::{MemberDescriptor, MemberSink, PopulationRequest, PopulationSource, SourceError};
use crate::urn::{AttributeValue, Urn};
use log::{error, info};
use rusqlite::{params, Connection};
use std::path::Path;
use std::time::Instant;

const SCHEMA_OBJECTS_SQL: &str = "SELECT name FROM {schema}.sqlite_master
WHERE type = ?1
  AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\';";
const COLUMNS_SQL: &str = "SELECT cid, name, type, \"notnull\", pk
FROM pragma_table_info(?1, ?2);";

/// Population source reading the catalog of one SQLite connection.
///
/// Path shapes served:
/// - `.../Database[@Name='main']` -> `Table`, `View`
/// - `.../Table[@Name='t' and @Schema='main']` -> `Column`
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Opens a database file as a catalog source.
    ///
    /// # Side effects
    /// - Emits `catalog_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let started_at = Instant::now();
        info!("event=catalog_open module=source status=start mode=file");

        match Connection::open(path) {
            Ok(conn) => {
                info!(
                    "event=catalog_open module=source status=ok mode=file duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self { conn })
            }
            Err(err) => {
                error!(
                    "event=catalog_open module=source status=error mode=file duration_ms={} \
                     error_code=catalog_open_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Opens an empty in-memory database as a catalog source.
    pub fn open_in_memory() -> Result<Self, SourceError> {
        let conn = Connection::open_in_memory()?;
        info!("event=catalog_open module=source status=ok mode=memory");
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn populate_schema_objects(
        &self,
        parent: &Urn,
        object_type: &str,
        sink: &mut dyn MemberSink,
    ) -> Result<(), SourceError> {
        let database = require_text(parent, "Database", NAME_ATTRIBUTE)?;
        let sql = SCHEMA_OBJECTS_SQL.replace("{schema}", &quote_sql_identifier(database));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![object_type])?;
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            sink.add_existing(
                MemberDescriptor::new()
                    .with(NAME_ATTRIBUTE, name)
                    .with(SCHEMA_ATTRIBUTE, database),
            )?;
        }
        Ok(())
    }

    fn populate_columns(&self, parent: &Urn, sink: &mut dyn MemberSink) -> Result<(), SourceError> {
        let table = require_text(parent, parent.last().type_name(), NAME_ATTRIBUTE)?;
        let schema = require_text(parent, parent.last().type_name(), SCHEMA_ATTRIBUTE)?;

        let mut stmt = self.conn.prepare(COLUMNS_SQL)?;
        let mut rows = stmt.query(params![table, schema])?;
        while let Some(row) = rows.next()? {
            let cid: i64 = row.get(0)?;
            let name: String = row.get(1)?;
            let data_type: String = row.get(2)?;
            let not_null: i64 = row.get(3)?;
            let pk: i64 = row.get(4)?;
            sink.add_existing(
                MemberDescriptor::new()
                    .with(NAME_ATTRIBUTE, name)
                    .with(ID_ATTRIBUTE, cid + 1)
                    .with("DataType", data_type)
                    .with("Nullable", i64::from(not_null == 0))
                    .with("InPrimaryKey", i64::from(pk > 0)),
            )?;
        }
        Ok(())
    }
}

impl PopulationSource for SqliteCatalog {
    fn populate(
        &self,
        request: &PopulationRequest<'_>,
        sink: &mut dyn MemberSink,
    ) -> Result<(), SourceError> {
        match request.type_name {
            "Table" => self.populate_schema_objects(request.parent, "table", sink),
            "View" => self.populate_schema_objects(request.parent, "view", sink),
            "Column" => self.populate_columns(request.parent, sink),
            other => Err(SourceError::UnsupportedType(other.to_string())),
        }
    }
}

fn require_text<'u>(
    parent: &'u Urn,
    expected_type: &str,
    attribute: &str,
) -> Result<&'u str, SourceError> {
    let segment = parent.last();
    if segment.type_name() != expected_type {
        return Err(SourceError::InvalidParent(parent.to_string()));
    }
    segment
        .attribute(attribute)
        .and_then(AttributeValue::as_text)
        .ok_or_else(|| SourceError::InvalidParent(parent.to_string()))
}

fn quote_sql_identifier(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
