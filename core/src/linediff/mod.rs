//! Line-level change sets between two texts.
//!
//! Two entry points produce the same answer for the same logical diff:
//! [`changed_lines`] aligns the texts directly, and
//! [`hunks::changed_lines_in_hunks`] consumes a precomputed unified diff.

pub mod hunks;
pub mod opcodes;

pub use hunks::{changed_lines_in_hunks, parse_hunks, unified_diff, Hunk, HunkLine};

use opcodes::{align, OpTag};
use std::collections::BTreeSet;

/// Line numbers in the newer text that were added or modified.
///
/// 1-based, ascending, deduplicated. Pure deletions contribute nothing —
/// a removed line has no line number in the newer text.
pub type LineChangeSet = BTreeSet<u32>;

/// Compute the lines of `new` that were added or modified relative to `old`.
///
/// `insert` and `replace` blocks of the alignment contribute every covered
/// new-side line; `delete` and `equal` blocks contribute nothing. Callers
/// that need deletion-adjacency signals should inspect the opcode alignment
/// directly rather than reading them out of this set.
pub fn changed_lines(old: &str, new: &str) -> LineChangeSet {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let mut changed = LineChangeSet::new();
    for op in align(&old_lines, &new_lines) {
        match op.tag {
            OpTag::Insert | OpTag::Replace => {
                for j in op.new_start..op.new_end {
                    changed.insert(j as u32 + 1);
                }
            }
            OpTag::Delete | OpTag::Equal => {}
        }
    }

    changed
}
