//! # MarketLens Dataset Crate
//!
//! This crate owns the stock dataset. It is the system's only source of data:
//! a single tabular file read once and kept in memory, read-only, for the
//! lifetime of the process.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Adapter:** All file- and format-specific logic lives here. The
//!   rest of the application only ever sees `core_types::Record`.
//! - **Fixed Schema:** Raw column names are mapped onto the `Record` struct
//!   once at load time. A missing required column fails the load immediately.
//! - **Load Once:** `DatasetStore` memoizes the canonical table behind a
//!   once-cell. Concurrent first requests cannot trigger a double read.
//!
//! ## Public API
//!
//! - `load_table`: Reads and validates a file into a `CanonicalTable`.
//! - `CanonicalTable`: The ordered, immutable set of records, with `filter`.
//! - `DatasetStore`: The process-wide, load-once handle to the table.
//! - `DatasetError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod loader;
pub mod store;
pub mod table;

// Re-export the key components to create a clean, public-facing API.
pub use error::DatasetError;
pub use loader::{load_table, OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
pub use store::DatasetStore;
pub use table::CanonicalTable;
