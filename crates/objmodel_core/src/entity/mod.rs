//! Concrete entity kinds built on the collection engine.
//!
//! # Responsibility
//! - Instantiate `ObjectCollection` once per member type through a small
//!   `CollectionSchema` (key type, type name, member factory).
//! - Model parents that create and invalidate their child collections.
//!
//! # Invariants
//! - Parents own children; children only know their parent's path.
//! - Every member's URN is its parent's URN plus its own key segment.

mod column;
mod login;
mod message;
mod object;
mod server;
mod table;

pub use column::{Column, ColumnCollection, ColumnSchema};
pub use login::{Login, LoginCollection, LoginSchema};
pub use message::{UserDefinedMessage, UserDefinedMessageCollection, UserDefinedMessageSchema};
pub use object::{ObjectCore, ObjectState};
pub use server::{Database, Server};
pub use table::{Table, TableCollection, TableSchema, View, ViewCollection, ViewSchema};
