//! # Filesystem Table Store
//!
//! A [`TableStore`] that keeps one JSON document per table under a root
//! directory: `<root>/<table-id>.json`. Documents are replaced atomically
//! by writing a sibling temporary file and renaming it into place.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TableStoreError;
use crate::projection::AnnotationRow;
use crate::store::{TableId, TableSpec, TableStore};

/// Environment variable overriding the store root.
pub const STORE_ROOT_ENV: &str = "DCCV_STORE_ROOT";

/// Store root used when nothing else is configured.
pub const DEFAULT_STORE_ROOT: &str = ".dccv/tables";

/// Where the filesystem store keeps its tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub root: PathBuf,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load configuration from the environment.
    ///
    /// Variables:
    /// - `DCCV_STORE_ROOT` (default: `.dccv/tables`)
    pub fn from_env() -> Self {
        Self::new(env_root(STORE_ROOT_ENV))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_ROOT)
    }
}

fn env_root(var: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_ROOT))
}

/// One stored row with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredRow {
    row_id: u64,
    #[serde(flatten)]
    row: AnnotationRow,
}

/// On-disk table document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredTable {
    id: TableId,
    spec: TableSpec,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    next_row_id: u64,
    rows: Vec<StoredRow>,
}

impl StoredTable {
    fn append(&mut self, rows: &[AnnotationRow]) -> usize {
        for row in rows {
            self.rows.push(StoredRow {
                row_id: self.next_row_id,
                row: row.clone(),
            });
            self.next_row_id += 1;
        }
        self.modified_at = Utc::now();
        rows.len()
    }
}

/// Filesystem-backed table store.
#[derive(Debug, Clone)]
pub struct LocalTableStore {
    root: PathBuf,
}

impl LocalTableStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, TableStoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| TableStoreError::io(&root, e))?;
        Ok(Self { root })
    }

    /// Returns the root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stored rows of a table, in insertion order.
    pub fn rows(&self, id: &TableId) -> Result<Vec<AnnotationRow>, TableStoreError> {
        Ok(self.load(id)?.rows.into_iter().map(|r| r.row).collect())
    }

    fn table_path(&self, id: &TableId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn load(&self, id: &TableId) -> Result<StoredTable, TableStoreError> {
        let path = self.table_path(id);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TableStoreError::NotFound {
                    id: id.to_string(),
                })
            }
            Err(e) => return Err(TableStoreError::io(&path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| TableStoreError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn save(&self, table: &StoredTable) -> Result<(), TableStoreError> {
        let path = self.table_path(&table.id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(table).map_err(|e| TableStoreError::io(&path, e))?;
        std::fs::write(&tmp, bytes).map_err(|e| TableStoreError::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| TableStoreError::io(&path, e))
    }
}

fn check_rows(rows: &[AnnotationRow]) -> Result<(), TableStoreError> {
    rows.iter()
        .enumerate()
        .try_for_each(|(index, row)| row.check_limits(index))
}

impl TableStore for LocalTableStore {
    fn create(&mut self, spec: &TableSpec, rows: &[AnnotationRow]) -> Result<TableId, TableStoreError> {
        spec.check()?;
        check_rows(rows)?;

        let id = TableId::new(format!("tbl-{}", Uuid::new_v4()));
        let now = Utc::now();
        let mut table = StoredTable {
            id: id.clone(),
            spec: spec.clone(),
            created_at: now,
            modified_at: now,
            next_row_id: 1,
            rows: Vec::with_capacity(rows.len()),
        };
        let stored = table.append(rows);
        self.save(&table)?;

        tracing::info!(table = %id, name = %spec.name, parent = %spec.parent, rows = stored, "created table");
        Ok(id)
    }

    fn describe(&self, id: &TableId) -> Result<TableSpec, TableStoreError> {
        Ok(self.load(id)?.spec)
    }

    fn query_row_ids(&self, id: &TableId) -> Result<Vec<u64>, TableStoreError> {
        Ok(self.load(id)?.rows.iter().map(|r| r.row_id).collect())
    }

    fn delete_rows(&mut self, id: &TableId, row_ids: &[u64]) -> Result<usize, TableStoreError> {
        let mut table = self.load(id)?;
        let before = table.rows.len();
        table.rows.retain(|r| !row_ids.contains(&r.row_id));
        let deleted = before - table.rows.len();
        table.modified_at = Utc::now();
        self.save(&table)?;
        tracing::debug!(table = %id, deleted, "deleted rows");
        Ok(deleted)
    }

    fn append_rows(&mut self, id: &TableId, rows: &[AnnotationRow]) -> Result<usize, TableStoreError> {
        check_rows(rows)?;
        let mut table = self.load(id)?;
        let stored = table.append(rows);
        self.save(&table)?;
        tracing::debug!(table = %id, stored, "appended rows");
        Ok(stored)
    }
}

/// A store handle opened once per process and passed to whatever needs it.
#[derive(Debug)]
pub struct StoreSession {
    store: LocalTableStore,
    opened_at: DateTime<Utc>,
}

impl StoreSession {
    /// Open the store described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self, TableStoreError> {
        let store = LocalTableStore::open(&config.root)?;
        tracing::debug!(root = %config.root.display(), "opened table store session");
        Ok(Self {
            store,
            opened_at: Utc::now(),
        })
    }

    /// The underlying store.
    pub fn store(&mut self) -> &mut LocalTableStore {
        &mut self.store
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}
