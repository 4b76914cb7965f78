//! Function extents and the structural-analyzer boundary.
//!
//! The catalog builder never parses C itself. It consumes `(name, start,
//! end)` extents from an [`ExtentSource`], so any structural analyzer — a
//! bundled tree-sitter grammar, a compiler front end run as a subprocess,
//! or a hand-rolled scanner for a restricted grammar — can supply them.

#[cfg(feature = "c-extents")]
pub mod c_source;

use serde::{Deserialize, Serialize};

/// One function definition's location, as reported by a structural analyzer.
///
/// Line numbers are 1-based and inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionExtent {
    pub name: String,
    /// The file the definition originates in — not a file it was included
    /// into. Analyzers that see through inclusion must filter on this.
    pub file: String,
    #[serde(rename = "startLine")]
    pub start_line: u32,
    #[serde(rename = "endLine")]
    pub end_line: u32,
}

impl FunctionExtent {
    pub fn new(name: impl Into<String>, file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            start_line,
            end_line,
        }
    }
}

/// Trait for structural analyzers - abstracts over tree-sitter, subprocess
/// AST dumps, etc.
pub trait ExtentSource {
    type Error: std::error::Error;

    /// List the function definitions whose defining range lies in `file`
    /// itself, in source order. Functions pulled in transitively from other
    /// files must be excluded.
    fn function_extents(
        &self,
        source: &str,
        file: &str,
    ) -> Result<Vec<FunctionExtent>, Self::Error>;
}
