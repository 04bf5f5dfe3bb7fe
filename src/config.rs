//! Store configuration: the column mapping for the backing table and the
//! handful of server-level settings the store needs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Column mapping for the backing session table.
///
/// Every deployment gets to name its own columns; the mapping is applied
/// once, when a gateway is built, and everything above works with the fixed
/// [`SessionRow`](crate::SessionRow) fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Column holding the session identifier.
    pub id_column: String,

    /// Column holding the session namespace.
    pub name_column: String,

    /// Column holding the serialized payload.
    pub data_column: String,

    /// Column holding the last-write unix timestamp.
    pub modified_column: String,

    /// Column holding the per-row lifetime in seconds.
    pub lifetime_column: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            name_column: "name".to_string(),
            data_column: "data".to_string(),
            modified_column: "modified".to_string(),
            lifetime_column: "lifetime".to_string(),
        }
    }
}

impl SchemaConfig {
    /// All five configured column names, in row-field order.
    pub fn columns(&self) -> [&str; 5] {
        [
            &self.id_column,
            &self.name_column,
            &self.data_column,
            &self.modified_column,
            &self.lifetime_column,
        ]
    }

    /// Check that every column name is non-empty and that no two columns
    /// share a name.
    pub fn validate(&self) -> Result<(), StoreError> {
        let columns = self.columns();

        for column in columns {
            if column.is_empty() {
                return Err(StoreError::Config(
                    "schema column names must be non-empty".to_string(),
                ));
            }
        }

        for (i, a) in columns.iter().enumerate() {
            for b in &columns[i + 1..] {
                if a == b {
                    return Err(StoreError::Config(format!(
                        "schema column name '{}' is used more than once",
                        a
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Top-level store configuration, loadable from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name of the backing table.
    pub table: String,

    /// Server-wide max session lifetime in seconds, snapshotted into the
    /// store at open().
    pub max_lifetime_secs: i64,

    /// Column mapping for the backing table.
    pub schema: SchemaConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: "sessions".to_string(),
            // The classic php.ini session.gc_maxlifetime default.
            max_lifetime_secs: 1440,
            schema: SchemaConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from a TOML file. Missing keys fall back to
    /// defaults.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::Storage(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content).map_err(|e| StoreError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_columns() {
        let schema = SchemaConfig::default();
        assert_eq!(
            schema.columns(),
            ["id", "name", "data", "modified", "lifetime"]
        );
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_column() {
        let schema = SchemaConfig {
            data_column: String::new(),
            ..SchemaConfig::default()
        };
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_columns() {
        let schema = SchemaConfig {
            id_column: "sess".to_string(),
            name_column: "sess".to_string(),
            ..SchemaConfig::default()
        };
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("sess"));
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.table, "sessions");
        assert_eq!(config.max_lifetime_secs, 1440);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_content = r#"
max_lifetime_secs = 3600

[schema]
id_column = "sess_id"
"#;

        let config: StoreConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.max_lifetime_secs, 3600);
        assert_eq!(config.schema.id_column, "sess_id");
        // Unspecified fields keep their defaults
        assert_eq!(config.table, "sessions");
        assert_eq!(config.schema.data_column, "data");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.toml");
        fs::write(&path, "table = \"web_sessions\"\n").unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.table, "web_sessions");
        assert_eq!(config.max_lifetime_secs, 1440);
    }

    #[test]
    fn test_load_missing_file() {
        let result = StoreConfig::load(Path::new("/nonexistent/store.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        assert!(StoreConfig::load(&path).is_err());
    }
}
