use crate::error::StoreError;
use crate::row::{COLUMNS, StyleRow};
use folio_core::{EditorConfig, StyleRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize)]
struct StyleTable {
    columns: Vec<String>,
    rows: Vec<StyleRow>,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
/// The durable `styles` table.
///
/// Holds only the file location; every operation opens, reads and (for writes) rewrites the file.
/// A missing file reads as an empty table.
pub struct StyleStore {
    path: PathBuf,
}

impl StyleStore {
    /// A store backed by the table file at `path`. No I/O happens until the first operation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store configured in `config`.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::open(config.style_store_path.clone())
    }

    /// Location of the table file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty table unless one already exists.
    pub fn create(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        self.write_table(&StyleTable::default())
    }

    /// Append a row for `record`.
    ///
    /// Names are not required to be unique; saving a name twice stores two rows.
    pub fn save(&self, record: &StyleRecord) -> Result<(), StoreError> {
        record.validate()?;
        let mut table = self.read_table()?;
        table.rows.push(StyleRow::from_record(record));
        self.write_table(&table)?;
        info!(name = %record.name, path = %self.path.display(), "style saved");
        Ok(())
    }

    /// Every stored name, in insertion order (duplicates included).
    pub fn list_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read_table()?
            .rows
            .into_iter()
            .map(|row| row.name)
            .collect())
    }

    /// The first row stored under `name`.
    pub fn fetch(&self, name: &str) -> Result<Option<StyleRecord>, StoreError> {
        let table = self.read_table()?;
        let Some(row) = table.rows.iter().find(|row| row.name == name) else {
            debug!(name, "style not found");
            return Ok(None);
        };
        row.to_record().map(Some)
    }

    fn read_table(&self) -> Result<StyleTable, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(StyleTable::default()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let table: StyleTable =
            serde_json::from_str(&text).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;
        if table.columns != COLUMNS {
            return Err(StoreError::Schema(table.columns));
        }
        Ok(table)
    }

    fn write_table(&self, table: &StyleTable) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(table).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
