//! Unified-diff hunks: parsing, changed-line extraction, rendering.
//!
//! The hunk path exists for callers that already hold a diff (e.g. from a
//! version-control command) and must produce the same changed-line sets as
//! the sequence-alignment path for the same logical diff.

use super::opcodes::{align, OpTag, Opcode};
use super::LineChangeSet;
use crate::error::Error;

/// One contiguous region of change from a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub lines: Vec<HunkLine>,
}

/// One marker-prefixed line within a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    Context(String),
    Added(String),
    Removed(String),
}

/// Parse unified-diff text into hunks.
///
/// `---`/`+++` file headers and `\ No newline at end of file` markers are
/// ignored. A `@@` line that does not match the header grammar invalidates
/// only its own hunk: its lines are skipped with a warning and parsing
/// resumes at the next header.
pub fn parse_hunks(diff_text: &str) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current: Option<Hunk> = None;

    for line in diff_text.lines() {
        if line.starts_with("@@") {
            if let Some(hunk) = current.take() {
                hunks.push(hunk);
            }
            match parse_hunk_header(line) {
                Ok((old_start, old_count, new_start, new_count)) => {
                    current = Some(Hunk {
                        old_start,
                        old_count,
                        new_start,
                        new_count,
                        lines: Vec::new(),
                    });
                }
                Err(e) => {
                    log::warn!("[linediff] skipping hunk: {e}");
                }
            }
        } else if let Some(ref mut hunk) = current {
            if line.starts_with("+++") || line.starts_with("---") {
                continue;
            }
            if let Some(rest) = line.strip_prefix('+') {
                hunk.lines.push(HunkLine::Added(rest.to_owned()));
            } else if let Some(rest) = line.strip_prefix('-') {
                hunk.lines.push(HunkLine::Removed(rest.to_owned()));
            } else if let Some(rest) = line.strip_prefix(' ') {
                hunk.lines.push(HunkLine::Context(rest.to_owned()));
            } else if line.is_empty() {
                hunk.lines.push(HunkLine::Context(String::new()));
            }
            // Anything else ("\ No newline...", "diff --git", "index ...")
            // carries no line content.
        }
    }
    if let Some(hunk) = current {
        hunks.push(hunk);
    }

    hunks
}

/// Parse `@@ -old_start[,old_count] +new_start[,new_count] @@`; a missing
/// count means 1.
fn parse_hunk_header(line: &str) -> Result<(u32, u32, u32, u32), Error> {
    let body = line.trim_start_matches("@@ ");
    let mut parts = body.split(' ');
    let old = parts.next().and_then(|p| p.strip_prefix('-'));
    let new = parts.next().and_then(|p| p.strip_prefix('+'));
    let (Some(old), Some(new)) = (old, new) else {
        return Err(Error::invalid_diff(line));
    };

    let (old_start, old_count) =
        parse_range(old).ok_or_else(|| Error::invalid_diff(line))?;
    let (new_start, new_count) =
        parse_range(new).ok_or_else(|| Error::invalid_diff(line))?;

    Ok((old_start, old_count, new_start, new_count))
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = range.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        // Single line: "5" means line 5, count 1
        Some((range.parse().ok()?, 1))
    }
}

/// Changed lines of the newer text described by `diff_text`.
///
/// Equivalent to [`super::changed_lines`] computed over the texts the diff
/// was generated from: `+` lines count at their new-side position, `-`
/// lines contribute nothing, context advances the counter.
pub fn changed_lines_in_hunks(diff_text: &str) -> LineChangeSet {
    let mut changed = LineChangeSet::new();

    for hunk in parse_hunks(diff_text) {
        let mut new_line = hunk.new_start;
        for line in &hunk.lines {
            match line {
                HunkLine::Added(_) => {
                    changed.insert(new_line);
                    new_line += 1;
                }
                HunkLine::Context(_) => {
                    new_line += 1;
                }
                HunkLine::Removed(_) => {}
            }
        }
    }

    changed
}

/// Render the alignment of `old` and `new` as minimal unified-diff hunks
/// (no context lines, no file headers).
pub fn unified_diff(old: &str, new: &str) -> String {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let mut out = String::new();
    let mut run: Vec<Opcode> = Vec::new();
    for op in align(&old_lines, &new_lines) {
        if op.tag == OpTag::Equal {
            flush_hunk(&mut out, &run, &old_lines, &new_lines);
            run.clear();
        } else {
            run.push(op);
        }
    }
    flush_hunk(&mut out, &run, &old_lines, &new_lines);

    out
}

fn flush_hunk(out: &mut String, run: &[Opcode], old_lines: &[&str], new_lines: &[&str]) {
    let (Some(first), Some(last)) = (run.first(), run.last()) else {
        return;
    };

    let old_count = (last.old_end - first.old_start) as u32;
    let new_count = (last.new_end - first.new_start) as u32;
    // Zero-count ranges name the line before the change, per diff convention.
    let old_start = first.old_start as u32 + u32::from(old_count > 0);
    let new_start = first.new_start as u32 + u32::from(new_count > 0);

    out.push_str(&format!(
        "@@ -{old_start},{old_count} +{new_start},{new_count} @@\n"
    ));
    for op in run {
        for line in &old_lines[op.old_start..op.old_end] {
            out.push_str(&format!("-{line}\n"));
        }
        for line in &new_lines[op.new_start..op.new_end] {
            out.push_str(&format!("+{line}\n"));
        }
    }
}
