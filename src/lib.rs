//! Relational session persistence behind the classic save-handler lifecycle.
//!
//! A [`DbTableStore`] maps the open/close/read/write/destroy/gc operations a
//! session subsystem expects onto four calls against a table handle
//! ([`TableGateway`]); [`SqliteGateway`] is the bundled rusqlite backend.
//! Column names are configurable per deployment via [`SchemaConfig`].
//!
//! # Example
//!
//! ```rust,ignore
//! use dbsession::{DbTableStore, SaveHandler, SchemaConfig, SqliteGateway};
//!
//! let gateway = SqliteGateway::new("sessions.db", "sessions", SchemaConfig::default())?;
//! let mut store = DbTableStore::new(gateway, 1440);
//!
//! store.open("/tmp", "PHPSESSID").await?;
//! store.write("abc123", "foo=1").await?;
//! let payload = store.read("abc123").await?;
//! ```

pub mod config;
pub mod error;
pub mod store;

pub use config::{SchemaConfig, StoreConfig};
pub use error::StoreError;
pub use store::{
    DbTableStore, RowFilter, RowUpdate, SaveHandler, SessionRow, SqliteGateway, TableGateway,
};
