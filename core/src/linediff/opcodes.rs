//! Opcode alignment between two line sequences.
//!
//! Longest-common-subsequence matching over lines, reported as
//! `equal`/`replace`/`delete`/`insert` blocks covering both sequences end
//! to end. The alignment is deterministic: ties between equally long
//! matches prefer the earliest old-side start, then the earliest new-side
//! start.

use std::collections::HashMap;

/// How an aligned block maps old-side lines to new-side lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    /// Lines identical on both sides.
    Equal,
    /// Old lines replaced by different new lines.
    Replace,
    /// Old lines with no counterpart in the new sequence.
    Delete,
    /// New lines with no counterpart in the old sequence.
    Insert,
}

/// One aligned block, over half-open 0-based index ranges.
///
/// `Delete` blocks have an empty new range; `Insert` blocks an empty old
/// range. Concatenating the old ranges of all opcodes covers the old
/// sequence exactly, and likewise for the new side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: OpTag,
    pub old_start: usize,
    pub old_end: usize,
    pub new_start: usize,
    pub new_end: usize,
}

/// Compute the opcode alignment of two line slices.
pub fn align(old: &[&str], new: &[&str]) -> Vec<Opcode> {
    let blocks = matching_blocks(old, new);
    let mut opcodes = Vec::new();
    let mut i = 0;
    let mut j = 0;

    for &(block_i, block_j, len) in &blocks {
        let tag = match (i < block_i, j < block_j) {
            (true, true) => Some(OpTag::Replace),
            (true, false) => Some(OpTag::Delete),
            (false, true) => Some(OpTag::Insert),
            (false, false) => None,
        };
        if let Some(tag) = tag {
            opcodes.push(Opcode {
                tag,
                old_start: i,
                old_end: block_i,
                new_start: j,
                new_end: block_j,
            });
        }
        if len > 0 {
            opcodes.push(Opcode {
                tag: OpTag::Equal,
                old_start: block_i,
                old_end: block_i + len,
                new_start: block_j,
                new_end: block_j + len,
            });
        }
        i = block_i + len;
        j = block_j + len;
    }

    opcodes
}

/// Maximal matching blocks `(old_index, new_index, length)` in ascending
/// order, terminated by a zero-length sentinel at the sequence ends.
fn matching_blocks(old: &[&str], new: &[&str]) -> Vec<(usize, usize, usize)> {
    // Index every new-side line by content; position lists stay ascending.
    let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (j, &line) in new.iter().enumerate() {
        positions.entry(line).or_default().push(j);
    }

    let mut blocks = Vec::new();
    let mut pending = vec![(0, old.len(), 0, new.len())];
    while let Some((old_lo, old_hi, new_lo, new_hi)) = pending.pop() {
        let (i, j, len) = longest_match(old, &positions, old_lo, old_hi, new_lo, new_hi);
        if len > 0 {
            blocks.push((i, j, len));
            if old_lo < i && new_lo < j {
                pending.push((old_lo, i, new_lo, j));
            }
            if i + len < old_hi && j + len < new_hi {
                pending.push((i + len, old_hi, j + len, new_hi));
            }
        }
    }

    blocks.sort_unstable();
    blocks.push((old.len(), new.len(), 0));
    blocks
}

/// Longest run of lines equal in `old[old_lo..old_hi]` and
/// `new[new_lo..new_hi]`.
fn longest_match(
    old: &[&str],
    positions: &HashMap<&str, Vec<usize>>,
    old_lo: usize,
    old_hi: usize,
    new_lo: usize,
    new_hi: usize,
) -> (usize, usize, usize) {
    let mut best_i = old_lo;
    let mut best_j = new_lo;
    let mut best_len = 0;

    // run_ending_at[j] = length of the match ending at old[i], new[j];
    // rebuilt per old-side line from the previous line's runs.
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();
    for i in old_lo..old_hi {
        let mut next_runs: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = positions.get(old[i]) {
            for &j in js {
                if j < new_lo {
                    continue;
                }
                if j >= new_hi {
                    break;
                }
                let len = if j == 0 {
                    1
                } else {
                    run_ending_at.get(&(j - 1)).copied().unwrap_or(0) + 1
                };
                next_runs.insert(j, len);
                if len > best_len {
                    best_i = i + 1 - len;
                    best_j = j + 1 - len;
                    best_len = len;
                }
            }
        }
        run_ending_at = next_runs;
    }

    (best_i, best_j, best_len)
}
