//! Function catalogs: body extraction and content hashing.
//!
//! A catalog is built once per (file, revision) pair from the raw source
//! text and analyzer-supplied extents. Bodies are sliced by line rather
//! than byte offset, and hashed Sha256 so two revisions can be compared by
//! digest alone.

use crate::error::{Error, Result};
use crate::extents::FunctionExtent;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Options controlling catalog construction.
#[derive(Debug, Clone, Copy)]
pub struct CatalogOptions {
    /// Prefix identities with the file label (`"file.c/name"`), keeping
    /// same-named statics from different files distinct when catalogs are
    /// combined downstream. Leave off when callers guarantee single-file
    /// scope.
    pub qualify_with_file: bool,
    /// Retain body text on each record alongside its hash.
    pub keep_bodies: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            qualify_with_file: true,
            keep_bodies: false,
        }
    }
}

/// One function's extent and content hash within a single file version.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionRecord {
    /// Correlation key across revisions (optionally file-qualified).
    pub identity: String,
    /// Bare function name as the analyzer reported it.
    pub name: String,
    #[serde(rename = "startLine")]
    pub start_line: u32,
    #[serde(rename = "endLine")]
    pub end_line: u32,
    /// Exact source slice spanning `[start_line, end_line]`, when retained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Lowercase hex Sha256 of the body text's UTF-8 bytes.
    pub hash: String,
}

/// All function records extracted from one parse of one file version.
///
/// Keys are unique within the catalog; iteration order is the identity's
/// lexicographic order, so output derived from a catalog is deterministic.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FunctionCatalog {
    records: BTreeMap<String, FunctionRecord>,
}

impl FunctionCatalog {
    pub fn get(&self, identity: &str) -> Option<&FunctionRecord> {
        self.records.get(identity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FunctionRecord)> {
        self.records.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &FunctionRecord> {
        self.records.values()
    }
}

/// Compute the lowercase hex Sha256 of a body's UTF-8 bytes.
pub fn content_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build a catalog from source text and analyzer-supplied extents.
///
/// Bodies are sliced by line (1-based, inclusive) and re-joined with `\n`,
/// so hashes do not depend on the checkout's line-ending style. Extents
/// reaching past the end of the text are clipped to it; extents starting
/// past the end, or with an inverted range, are dropped. Both degradations
/// are logged rather than failing the whole catalog.
///
/// Empty `extents` is not an error — the result is a valid empty catalog.
pub fn build_catalog(
    source: &str,
    extents: &[FunctionExtent],
    file_label: &str,
    options: CatalogOptions,
) -> FunctionCatalog {
    let lines: Vec<&str> = source.lines().collect();
    let mut catalog = FunctionCatalog::default();

    for extent in extents {
        let Some((body, end_line)) = slice_extent(&lines, extent, file_label) else {
            continue;
        };

        let identity = if options.qualify_with_file {
            format!("{file_label}/{}", extent.name)
        } else {
            extent.name.clone()
        };
        let hash = content_hash(&body);

        catalog.records.insert(
            identity.clone(),
            FunctionRecord {
                identity,
                name: extent.name.clone(),
                start_line: extent.start_line,
                end_line,
                body: options.keep_bodies.then_some(body),
                hash,
            },
        );
    }

    catalog
}

/// Build a catalog for an on-disk file, reading its text first.
///
/// The file label is the file's basename, matching how analyzers report
/// originating files. A missing file is `Error::NotFound`.
pub fn catalog_file(
    path: &Path,
    extents: &[FunctionExtent],
    options: CatalogOptions,
) -> Result<FunctionCatalog> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::not_found(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(build_catalog(&source, extents, &label, options))
}

/// Slice the lines covered by `extent`, returning the body and the
/// (possibly clipped) end line. `None` when the extent is unusable.
fn slice_extent(
    lines: &[&str],
    extent: &FunctionExtent,
    file_label: &str,
) -> Option<(String, u32)> {
    let total = lines.len() as u32;

    if extent.start_line == 0 || extent.start_line > extent.end_line {
        log::warn!(
            "[catalog] dropping malformed extent {} ({}..{}) in {file_label}",
            extent.name,
            extent.start_line,
            extent.end_line
        );
        return None;
    }
    if extent.start_line > total {
        log::warn!(
            "[catalog] dropping extent {} starting past EOF (line {} of {total}) in {file_label}",
            extent.name,
            extent.start_line
        );
        return None;
    }

    let end_line = extent.end_line.min(total);
    if end_line < extent.end_line {
        log::warn!(
            "[catalog] clipping extent {} to EOF ({} -> {end_line}) in {file_label}",
            extent.name,
            extent.end_line
        );
    }

    let body = lines[(extent.start_line - 1) as usize..end_line as usize].join("\n");
    Some((body, end_line))
}
