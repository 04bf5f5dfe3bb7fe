use anyhow::Result;
use async_trait::async_trait;

use super::{RowFilter, RowUpdate, SessionRow};

/// Table-access handle the store writes through.
///
/// Implementations are already bound to one table; the store never creates,
/// closes, or reconfigures the handle. All methods return the number of
/// affected rows where the underlying operation reports one.
#[async_trait]
pub trait TableGateway: Send + Sync {
    /// Fetch the rows matching a `(id, name)` filter.
    async fn select(&self, filter: &RowFilter) -> Result<Vec<SessionRow>>;

    /// Insert a new row.
    async fn insert(&self, row: &SessionRow) -> Result<usize>;

    /// Update data and modified timestamp on the rows matching the filter.
    async fn update(&self, update: &RowUpdate, filter: &RowFilter) -> Result<usize>;

    /// Delete the rows matching a `(id, name)` filter.
    async fn delete(&self, filter: &RowFilter) -> Result<usize>;

    /// Delete every row whose modified timestamp is strictly older than
    /// `cutoff`.
    async fn delete_modified_before(&self, cutoff: i64) -> Result<usize>;
}
