#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use dbsession::{RowFilter, RowUpdate, SessionRow, TableGateway};

/// An in-memory table gateway for exercising store logic without a database.
pub struct MemoryGateway {
    rows: Mutex<Vec<SessionRow>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of every stored row.
    pub fn rows(&self) -> Vec<SessionRow> {
        self.rows.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Test hook: rewrite the stored lifetime of a row. The production
    /// update path never touches lifetime, so tests need a side door.
    pub fn set_lifetime(&self, filter: &RowFilter, lifetime: i64) {
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.id == filter.id && row.name == filter.name {
                row.lifetime = lifetime;
            }
        }
    }
}

#[async_trait]
impl TableGateway for MemoryGateway {
    async fn select(&self, filter: &RowFilter) -> Result<Vec<SessionRow>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| row.id == filter.id && row.name == filter.name)
            .cloned()
            .collect())
    }

    async fn insert(&self, row: &SessionRow) -> Result<usize> {
        self.rows.lock().unwrap().push(row.clone());
        Ok(1)
    }

    async fn update(&self, update: &RowUpdate, filter: &RowFilter) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        let mut affected = 0;
        for row in rows.iter_mut() {
            if row.id == filter.id && row.name == filter.name {
                row.data = update.data.clone();
                row.modified = update.modified;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete(&self, filter: &RowFilter) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| !(row.id == filter.id && row.name == filter.name));
        Ok(before - rows.len())
    }

    async fn delete_modified_before(&self, cutoff: i64) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.modified >= cutoff);
        Ok(before - rows.len())
    }
}
