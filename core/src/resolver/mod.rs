//! Resolution of changed lines and catalog pairs to changed functions.

use crate::catalog::{build_catalog, CatalogOptions, FunctionCatalog, FunctionRecord};
use crate::extents::ExtentSource;
use crate::linediff::LineChangeSet;
use crate::store::ChangeRecord;
use std::collections::BTreeMap;

/// Functions present in both catalogs whose content hashes differ.
///
/// Identities present in only one catalog are additions or removals, not
/// modifications, and are deliberately not reported here. Empty catalogs
/// yield an empty result.
pub fn diff_catalogs(
    old: &FunctionCatalog,
    new: &FunctionCatalog,
) -> BTreeMap<String, ChangeRecord> {
    let mut changed = BTreeMap::new();

    for (identity, new_record) in new.iter() {
        let Some(old_record) = old.get(identity) else {
            continue;
        };
        if old_record.hash != new_record.hash {
            changed.insert(
                identity.clone(),
                ChangeRecord::new([old_record.hash.as_str(), new_record.hash.as_str()]),
            );
        }
    }

    changed
}

/// Functions of `catalog` whose extent contains at least one changed line.
///
/// Used when only one catalog is available — e.g. attributing a compiler
/// diagnostic's line to its containing function. Emitted records carry the
/// function's current hash. Lines outside every function (headers, globals,
/// blank space) contribute nothing.
pub fn resolve_changed_lines(
    catalog: &FunctionCatalog,
    changed: &LineChangeSet,
) -> BTreeMap<String, ChangeRecord> {
    let mut result: BTreeMap<String, ChangeRecord> = BTreeMap::new();

    for record in catalog.records() {
        let mut touched = changed.range(record.start_line..=record.end_line);
        if touched.next().is_some() {
            result
                .entry(record.identity.clone())
                .or_default()
                .observe(&record.hash);
        }
    }

    result
}

/// The innermost function whose extent contains `line`.
///
/// Nested or overlapping extents prefer the smallest range; remaining ties
/// break on start line, then identity, so attribution is deterministic.
/// `None` when no extent contains the line — callers report "no enclosing
/// function" rather than guessing a neighbor.
pub fn enclosing_function(catalog: &FunctionCatalog, line: u32) -> Option<&FunctionRecord> {
    catalog
        .records()
        .filter(|record| record.start_line <= line && line <= record.end_line)
        .min_by_key(|record| {
            (
                record.end_line - record.start_line,
                record.start_line,
                record.identity.as_str(),
            )
        })
}

/// Build catalogs for two versions of one file through `analyzer` and
/// report the functions whose bodies differ.
pub fn diff_sources<S: ExtentSource>(
    old_source: &str,
    new_source: &str,
    analyzer: &S,
    file_label: &str,
    options: CatalogOptions,
) -> Result<BTreeMap<String, ChangeRecord>, S::Error> {
    let old_extents = analyzer.function_extents(old_source, file_label)?;
    let new_extents = analyzer.function_extents(new_source, file_label)?;

    let old_catalog = build_catalog(old_source, &old_extents, file_label, options);
    let new_catalog = build_catalog(new_source, &new_extents, file_label, options);

    Ok(diff_catalogs(&old_catalog, &new_catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::content_hash;
    use crate::extents::FunctionExtent;
    use crate::linediff::changed_lines;

    fn catalog(source: &str, extents: &[FunctionExtent]) -> FunctionCatalog {
        build_catalog(source, extents, "a.c", CatalogOptions::default())
    }

    const OLD: &str = "\
#include <stdio.h>

int add(int a,int b){return a+b;}

int sub(int a, int b) {
    return a - b;
}
";

    const NEW: &str = "\
#include <stdio.h>

int add(int a,int b){return a+b+1;}

int sub(int a, int b) {
    return a - b;
}
";

    fn extents() -> Vec<FunctionExtent> {
        vec![
            FunctionExtent::new("add", "a.c", 3, 3),
            FunctionExtent::new("sub", "a.c", 5, 7),
        ]
    }

    #[test]
    fn test_diff_catalogs_reports_exactly_the_changed_function() {
        let changed = diff_catalogs(&catalog(OLD, &extents()), &catalog(NEW, &extents()));

        assert_eq!(changed.len(), 1);
        let record = changed.get("a.c/add").unwrap();
        assert_eq!(record.len(), 2);
        assert!(record.contains(&content_hash("int add(int a,int b){return a+b;}")));
        assert!(record.contains(&content_hash("int add(int a,int b){return a+b+1;}")));
    }

    #[test]
    fn test_diff_catalogs_identical_is_empty() {
        let changed = diff_catalogs(&catalog(OLD, &extents()), &catalog(OLD, &extents()));
        assert!(changed.is_empty());
    }

    #[test]
    fn test_diff_catalogs_ignores_added_and_removed() {
        let only_add = vec![FunctionExtent::new("add", "a.c", 3, 3)];
        let changed = diff_catalogs(&catalog(OLD, &only_add), &catalog(OLD, &extents()));
        // "sub" exists only in the new catalog: an addition, not a change.
        assert!(changed.is_empty());
    }

    #[test]
    fn test_diff_catalogs_empty_inputs() {
        let empty = FunctionCatalog::default();
        assert!(diff_catalogs(&empty, &catalog(NEW, &extents())).is_empty());
        assert!(diff_catalogs(&catalog(OLD, &extents()), &empty).is_empty());
    }

    #[test]
    fn test_resolve_changed_lines_by_containment() {
        let new_catalog = catalog(NEW, &extents());
        let changed = changed_lines(OLD, NEW);
        assert_eq!(changed.iter().copied().collect::<Vec<_>>(), vec![3]);

        let resolved = resolve_changed_lines(&new_catalog, &changed);
        assert_eq!(resolved.len(), 1);
        assert!(resolved.contains_key("a.c/add"));
    }

    #[test]
    fn test_resolve_changed_lines_empty_set() {
        let resolved = resolve_changed_lines(&catalog(NEW, &extents()), &LineChangeSet::new());
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_resolve_changed_lines_outside_every_function() {
        let changed = LineChangeSet::from([1]);
        let resolved = resolve_changed_lines(&catalog(NEW, &extents()), &changed);
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_resolve_changed_lines_spanning_two_functions() {
        let changed = LineChangeSet::from([3, 6]);
        let resolved = resolve_changed_lines(&catalog(NEW, &extents()), &changed);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_enclosing_function_attribution() {
        let source: String = (1..=20).map(|n| format!("line {n}\n")).collect();
        let extents = vec![
            FunctionExtent::new("helper", "a.c", 1, 7),
            FunctionExtent::new("main", "a.c", 9, 15),
        ];
        let catalog = catalog(&source, &extents);

        assert_eq!(enclosing_function(&catalog, 13).unwrap().name, "main");
        assert_eq!(enclosing_function(&catalog, 7).unwrap().name, "helper");
        assert!(enclosing_function(&catalog, 8).is_none());
        assert!(enclosing_function(&catalog, 20).is_none());
    }

    #[test]
    fn test_enclosing_function_prefers_innermost() {
        let source: String = (1..=12).map(|n| format!("line {n}\n")).collect();
        let extents = vec![
            FunctionExtent::new("outer", "a.c", 1, 12),
            FunctionExtent::new("inner", "a.c", 4, 6),
        ];
        let catalog = catalog(&source, &extents);

        assert_eq!(enclosing_function(&catalog, 5).unwrap().name, "inner");
        assert_eq!(enclosing_function(&catalog, 2).unwrap().name, "outer");
    }

    #[test]
    fn test_diff_sources_end_to_end() {
        struct FixedExtents(Vec<FunctionExtent>);

        impl ExtentSource for FixedExtents {
            type Error = crate::error::Error;

            fn function_extents(
                &self,
                _source: &str,
                _file: &str,
            ) -> Result<Vec<FunctionExtent>, Self::Error> {
                Ok(self.0.clone())
            }
        }

        let analyzer = FixedExtents(extents());
        let changed =
            diff_sources(OLD, NEW, &analyzer, "a.c", CatalogOptions::default()).unwrap();
        assert_eq!(changed.len(), 1);
        assert!(changed.contains_key("a.c/add"));
    }
}
