use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::task;
use tracing::debug;

use crate::config::SchemaConfig;

use super::{RowFilter, RowUpdate, SessionRow, TableGateway};

/// Quote an identifier for interpolation into SQL.
///
/// Configured table and column names are the only identifiers that reach
/// SQL text; values always travel as bound parameters.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Open a SQLite connection with standard pragmas (busy_timeout).
fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open database: {}", db_path.display()))?;
    conn.execute_batch("PRAGMA busy_timeout=5000;")
        .context("failed to set busy_timeout")?;
    Ok(conn)
}

/// The SQL statements a gateway runs, rendered once from the validated
/// column mapping.
#[derive(Debug, Clone)]
struct Statements {
    select: String,
    insert: String,
    update: String,
    delete: String,
    sweep: String,
}

impl Statements {
    fn build(table: &str, schema: &SchemaConfig) -> Self {
        let table = quote_ident(table);
        let [id, name, data, modified, lifetime] = schema.columns().map(quote_ident);

        Self {
            select: format!(
                "SELECT {id}, {name}, {data}, {modified}, {lifetime} FROM {table} \
                 WHERE {id} = ?1 AND {name} = ?2"
            ),
            insert: format!(
                "INSERT INTO {table} ({id}, {name}, {data}, {modified}, {lifetime}) \
                 VALUES (?1, ?2, ?3, ?4, ?5)"
            ),
            update: format!(
                "UPDATE {table} SET {data} = ?1, {modified} = ?2 \
                 WHERE {id} = ?3 AND {name} = ?4"
            ),
            delete: format!("DELETE FROM {table} WHERE {id} = ?1 AND {name} = ?2"),
            sweep: format!("DELETE FROM {table} WHERE {modified} < ?1"),
        }
    }
}

/// SQLite-backed table gateway, bound to one file, table, and column
/// mapping.
pub struct SqliteGateway {
    /// Path to the SQLite database file
    db_path: PathBuf,
    table: String,
    schema: SchemaConfig,
    sql: Statements,
}

impl SqliteGateway {
    /// Create a gateway for the given database file and table.
    ///
    /// Validates the column mapping, creates parent directories, and makes
    /// sure the table and its indexes exist.
    pub fn new(
        db_path: impl Into<PathBuf>,
        table: impl Into<String>,
        schema: SchemaConfig,
    ) -> Result<Self> {
        schema.validate()?;

        let db_path = db_path.into();
        let table = table.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        let sql = Statements::build(&table, &schema);
        let gateway = Self {
            db_path,
            table,
            schema,
            sql,
        };
        gateway.init_schema()?;

        Ok(gateway)
    }

    /// The column mapping this gateway was built with.
    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = open_connection(&self.db_path)?;

        // Enable WAL mode for better concurrent read/write performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("failed to set WAL mode")?;

        let table = quote_ident(&self.table);
        let [id, name, data, modified, lifetime] = self.schema.columns().map(quote_ident);

        // No declared primary key: one row per (id, name) is enforced by the
        // store's lookup-before-insert, not by a constraint.
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    {id} TEXT NOT NULL,
                    {name} TEXT NOT NULL,
                    {data} TEXT NOT NULL,
                    {modified} INTEGER NOT NULL,
                    {lifetime} INTEGER NOT NULL
                )"
            ),
            [],
        )
        .with_context(|| format!("failed to create table {}", self.table))?;

        // Index for (id, name) lookups
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS {} ON {table}({id}, {name})",
                quote_ident(&format!("idx_{}_key", self.table))
            ),
            [],
        )
        .context("failed to create lookup index")?;

        // Index for the gc sweep over modified
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS {} ON {table}({modified})",
                quote_ident(&format!("idx_{}_modified", self.table))
            ),
            [],
        )
        .context("failed to create sweep index")?;

        debug!(path = %self.db_path.display(), table = %self.table, "initialized SQLite session table");

        Ok(())
    }
}

#[async_trait]
impl TableGateway for SqliteGateway {
    async fn select(&self, filter: &RowFilter) -> Result<Vec<SessionRow>> {
        let filter = filter.clone();
        let db_path = self.db_path.clone();
        let sql = self.sql.select.clone();

        task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;
            let mut stmt = conn.prepare(&sql)?;

            let rows = stmt
                .query_map(rusqlite::params![filter.id, filter.name], |row| {
                    Ok(SessionRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        data: row.get(2)?,
                        modified: row.get(3)?,
                        lifetime: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
        .await
        .context("spawn_blocking failed")?
    }

    async fn insert(&self, row: &SessionRow) -> Result<usize> {
        let row = row.clone();
        let db_path = self.db_path.clone();
        let sql = self.sql.insert.clone();

        task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;
            let affected = conn.execute(
                &sql,
                rusqlite::params![row.id, row.name, row.data, row.modified, row.lifetime],
            )?;

            debug!(id = %row.id, "inserted session row");

            Ok(affected)
        })
        .await
        .context("spawn_blocking failed")?
    }

    async fn update(&self, update: &RowUpdate, filter: &RowFilter) -> Result<usize> {
        let update = update.clone();
        let filter = filter.clone();
        let db_path = self.db_path.clone();
        let sql = self.sql.update.clone();

        task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;
            let affected = conn.execute(
                &sql,
                rusqlite::params![update.data, update.modified, filter.id, filter.name],
            )?;

            debug!(id = %filter.id, "updated session row");

            Ok(affected)
        })
        .await
        .context("spawn_blocking failed")?
    }

    async fn delete(&self, filter: &RowFilter) -> Result<usize> {
        let filter = filter.clone();
        let db_path = self.db_path.clone();
        let sql = self.sql.delete.clone();

        task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;
            let affected = conn.execute(&sql, rusqlite::params![filter.id, filter.name])?;

            debug!(id = %filter.id, affected, "deleted session rows");

            Ok(affected)
        })
        .await
        .context("spawn_blocking failed")?
    }

    async fn delete_modified_before(&self, cutoff: i64) -> Result<usize> {
        let db_path = self.db_path.clone();
        let sql = self.sql.sweep.clone();

        task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;
            let affected = conn.execute(&sql, rusqlite::params![cutoff])?;

            debug!(cutoff, affected, "swept session rows");

            Ok(affected)
        })
        .await
        .context("spawn_blocking failed")?
    }
}
