use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::{RowFilter, RowUpdate, SaveHandler, SessionRow, TableGateway};

fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Session save handler backed by a relational table.
///
/// Holds an externally owned [`TableGateway`] plus the per-cycle state the
/// lifecycle methods share: the session namespace and the lifetime snapshot
/// taken at [`open`](SaveHandler::open). The server-wide max lifetime is an
/// explicit constructor input rather than something read from global runtime
/// configuration.
///
/// Concurrent writers to the same `(id, name)` pair race at the database;
/// the store adds no locking of its own and relies on row-level
/// last-write-wins.
pub struct DbTableStore<G> {
    gateway: G,

    /// Server-configured max session lifetime in seconds.
    max_lifetime: i64,

    /// Namespace recorded by the last open().
    session_name: String,

    /// Save path recorded by the last open(). Kept for interface parity;
    /// the table backend has no use for it.
    save_path: String,

    /// Lifetime snapshot taken at open(), used by write() and gc().
    lifetime: i64,
}

impl<G: TableGateway> DbTableStore<G> {
    /// Create a store around an already-bound table handle.
    ///
    /// Until `open` is called, operations run against the empty namespace
    /// with `max_lifetime` as the effective lifetime.
    pub fn new(gateway: G, max_lifetime: i64) -> Self {
        Self {
            gateway,
            max_lifetime,
            session_name: String::new(),
            save_path: String::new(),
            lifetime: max_lifetime,
        }
    }

    /// The injected table handle.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The save path recorded by the last `open`.
    pub fn save_path(&self) -> &str {
        &self.save_path
    }

    /// Read a session payload, controlling what happens to expired rows.
    ///
    /// A live row returns its payload verbatim. An expired row reads as an
    /// empty string and is deleted when `destroy_expired` is true, left in
    /// place otherwise. A missing row reads as an empty string and touches
    /// nothing.
    pub async fn read_with(&self, id: &str, destroy_expired: bool) -> Result<String> {
        let filter = RowFilter::new(id, self.session_name.clone());
        let row = self.gateway.select(&filter).await?.into_iter().next();

        if let Some(row) = row {
            if !row.is_expired(unix_now()) {
                return Ok(row.data);
            }
            if destroy_expired {
                debug!(id, "destroying expired session");
                self.gateway.delete(&filter).await?;
            }
        }

        Ok(String::new())
    }
}

#[async_trait]
impl<G: TableGateway> SaveHandler for DbTableStore<G> {
    async fn open(&mut self, save_path: &str, name: &str) -> Result<bool> {
        self.save_path = save_path.to_string();
        self.session_name = name.to_string();
        self.lifetime = self.max_lifetime;

        debug!(name, lifetime = self.lifetime, "opened session store");

        Ok(true)
    }

    async fn close(&mut self) -> Result<bool> {
        Ok(true)
    }

    async fn read(&mut self, id: &str) -> Result<String> {
        self.read_with(id, true).await
    }

    async fn write(&mut self, id: &str, data: &str) -> Result<bool> {
        let now = unix_now();
        let filter = RowFilter::new(id, self.session_name.clone());

        let existing = self.gateway.select(&filter).await?;
        if existing.is_empty() {
            let row = SessionRow {
                id: id.to_string(),
                name: self.session_name.clone(),
                data: data.to_string(),
                modified: now,
                lifetime: self.lifetime,
            };
            let inserted = self.gateway.insert(&row).await?;
            debug!(id, "inserted session");
            return Ok(inserted > 0);
        }

        // Lifetime stays as it was when the row was created.
        let update = RowUpdate {
            data: data.to_string(),
            modified: now,
        };
        let updated = self.gateway.update(&update, &filter).await?;
        debug!(id, "updated session");
        Ok(updated > 0)
    }

    async fn destroy(&mut self, id: &str) -> Result<bool> {
        let filter = RowFilter::new(id, self.session_name.clone());
        self.gateway.delete(&filter).await?;
        debug!(id, "destroyed session");

        Ok(true)
    }

    /// Sweeps with the lifetime captured at `open`. The `max_lifetime`
    /// argument is accepted for interface compatibility and not used;
    /// changing that would change which rows a sweep removes.
    async fn gc(&mut self, _max_lifetime: i64) -> Result<bool> {
        let cutoff = unix_now() - self.lifetime;
        let removed = self.gateway.delete_modified_before(cutoff).await?;
        debug!(removed, cutoff, "swept expired sessions");

        Ok(true)
    }
}
