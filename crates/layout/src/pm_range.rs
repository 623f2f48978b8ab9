//! Mapping measured lines back to document positions, for cursor and
//! selection placement over a finished layout.

use crate::flow::FlowBlock;
use crate::text::Line;
use serde::{Deserialize, Serialize};

/// A half-open document position range `[start, end)`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct PmRange {
    pub start: usize,
    pub end: usize,
}

impl PmRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// The document range covered by `line` within `block`.
///
/// Text runs map to `[src_start + from_char, src_start + to_char)`; a declared
/// `src_end` is never trusted, since edits can leave it stale. Atomic runs
/// always cover exactly one position. `None` when the block is not a
/// paragraph, the line refers to runs the block does not have, or the first
/// referenced run carries no start offset.
pub fn compute_line_pm_range(block: &FlowBlock, line: &Line) -> Option<PmRange> {
    let paragraph = block.as_paragraph()?;
    if line.from_run > line.to_run {
        return None;
    }
    let runs = paragraph.runs.get(line.from_run..=line.to_run)?;
    let first = runs.first()?;
    let first_start = first.src_start()?;

    let mut range: Option<PmRange> = None;
    for (offset, run) in runs.iter().enumerate() {
        let idx = line.from_run + offset;
        let len = run.char_len();
        let from = if idx == line.from_run { line.from_char.min(len) } else { 0 };
        let to = if idx == line.to_run { line.to_char.min(len) } else { len };
        if from >= to {
            continue;
        }
        let Some(src_start) = run.src_start() else {
            continue;
        };
        let (start, end) = if run.is_atomic() {
            (src_start, src_start + 1)
        } else {
            (src_start + from, src_start + to)
        };
        match range.as_mut() {
            Some(r) => r.end = r.end.max(end),
            None => range = Some(PmRange { start, end }),
        }
    }

    // A line with no characters (an empty paragraph, or the line after a
    // trailing break) is a caret position.
    Some(range.unwrap_or_else(|| {
        let position = first_start + line.from_char.min(first.char_len());
        PmRange {
            start: position,
            end: position,
        }
    }))
}

/// The union of the ranges of `lines[from..to]`. Lines without a range are
/// skipped rather than ending the union.
pub fn compute_fragment_pm_range(
    block: &FlowBlock,
    lines: &[Line],
    from: usize,
    to: usize,
) -> Option<PmRange> {
    let lines = lines.get(from..to.min(lines.len()))?;
    lines
        .iter()
        .filter_map(|line| compute_line_pm_range(block, line))
        .reduce(|acc, r| PmRange {
            start: acc.start,
            end: acc.end.max(r.end),
        })
}
