//! Function-level change detection for C sources.
//!
//! Line-based diffs over-report: whitespace, comments, and reordering show
//! up as churn, while the unit that matters for regression triage and
//! diagnostic attribution is the function body. This crate resolves
//! textual change between two versions of a file down to the functions
//! whose bodies actually differ:
//!
//! - Extent discovery (`extents`): the structural-analyzer boundary and a
//!   bundled tree-sitter C analyzer
//! - Function catalogs (`catalog`): body extraction and content hashing
//! - Line change sets (`linediff`): sequence alignment and unified-diff
//!   hunk parsing
//! - Change resolution (`resolver`): hash comparison and line-to-function
//!   attribution
//! - Durable change records (`store`): mergeable on-disk accumulation of
//!   observed hashes
//!
//! Feature flags:
//! - `c-extents` (default): bundled tree-sitter based C analyzer

pub mod catalog;
pub mod error;
pub mod extents;
pub mod linediff;
pub mod resolver;
pub mod store;

// Re-export commonly used types
pub use catalog::{build_catalog, catalog_file, CatalogOptions, FunctionCatalog, FunctionRecord};
pub use error::{Error, Result};
pub use extents::{ExtentSource, FunctionExtent};
pub use linediff::{changed_lines, changed_lines_in_hunks, LineChangeSet};
pub use resolver::{diff_catalogs, diff_sources, enclosing_function, resolve_changed_lines};
pub use store::{ChangeRecord, ChangeStore};
