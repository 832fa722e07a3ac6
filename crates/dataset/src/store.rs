use crate::error::DatasetError;
use crate::loader::load_table;
use crate::table::CanonicalTable;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A process-wide, load-once handle to the canonical table.
///
/// The file is read on the first successful call to `table` and the same
/// `Arc` is handed out afterwards. A failed load leaves the store empty, so the
/// next call tries again.
#[derive(Debug)]
pub struct DatasetStore {
    path: PathBuf,
    table: OnceCell<Arc<CanonicalTable>>,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceCell::new(),
        }
    }

    /// Wraps an already-built table. `path` is only reported, never read.
    pub fn from_table(path: impl Into<PathBuf>, table: CanonicalTable) -> Self {
        Self {
            path: path.into(),
            table: OnceCell::with_value(Arc::new(table)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    /// Returns the canonical table, reading the file if it has not been read yet.
    pub fn table(&self) -> Result<Arc<CanonicalTable>, DatasetError> {
        self.table
            .get_or_try_init(|| {
                tracing::info!(path = %self.path.display(), "Loading dataset.");
                load_table(&self.path).map(Arc::new)
            })
            .cloned()
    }
}
