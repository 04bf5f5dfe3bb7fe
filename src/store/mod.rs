mod gateway;
mod handler;
mod row;
mod sqlite;
mod table_store;

pub use gateway::TableGateway;
pub use handler::SaveHandler;
pub use row::{RowFilter, RowUpdate, SessionRow};
pub use sqlite::SqliteGateway;
pub use table_store::DbTableStore;
