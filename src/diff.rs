//! Two-pane line diff between an original buffer and a proposed replacement.

use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::style::Style;
use crate::text::{pad_to_width, visible_width};

const PANE_SEPARATOR: &str = " ┃ ";

/// One side of a diff row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSide {
    /// 1-based line number within its own text.
    pub line_no: usize,
    pub text: String,
    pub changed: bool,
}

/// A row of the split view; a missing side renders as blank filler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRow {
    pub left: Option<DiffSide>,
    pub right: Option<DiffSide>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDiff {
    rows: Vec<DiffRow>,
    removed: usize,
    added: usize,
}

impl SplitDiff {
    pub fn new(original: &str, proposed: &str) -> Self {
        let old: Vec<&str> = original.lines().collect();
        let new: Vec<&str> = proposed.lines().collect();
        let side = |lines: &[&str], index: usize, changed: bool| DiffSide {
            line_no: index + 1,
            text: lines[index].to_string(),
            changed,
        };

        let mut rows = Vec::new();
        let (mut removed, mut added) = (0, 0);
        for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
            match op {
                DiffOp::Equal {
                    old_index,
                    new_index,
                    len,
                } => rows.extend((0..len).map(|offset| DiffRow {
                    left: Some(side(&old, old_index + offset, false)),
                    right: Some(side(&new, new_index + offset, false)),
                })),
                DiffOp::Delete {
                    old_index, old_len, ..
                } => {
                    removed += old_len;
                    rows.extend((0..old_len).map(|offset| DiffRow {
                        left: Some(side(&old, old_index + offset, true)),
                        right: None,
                    }));
                }
                DiffOp::Insert {
                    new_index, new_len, ..
                } => {
                    added += new_len;
                    rows.extend((0..new_len).map(|offset| DiffRow {
                        left: None,
                        right: Some(side(&new, new_index + offset, true)),
                    }));
                }
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => {
                    removed += old_len;
                    added += new_len;
                    rows.extend((0..old_len.max(new_len)).map(|offset| DiffRow {
                        left: (offset < old_len).then(|| side(&old, old_index + offset, true)),
                        right: (offset < new_len).then(|| side(&new, new_index + offset, true)),
                    }));
                }
            }
        }

        Self {
            rows,
            removed,
            added,
        }
    }

    pub fn rows(&self) -> &[DiffRow] {
        &self.rows
    }

    /// Number of removed and added lines.
    pub fn stats(&self) -> (usize, usize) {
        (self.removed, self.added)
    }

    pub fn is_unchanged(&self) -> bool {
        self.removed == 0 && self.added == 0
    }
}

/// Renders `diff` as two panes of equal width separated by a rule.
pub fn render_split_diff(
    diff: &SplitDiff,
    headers: (&str, &str),
    width: usize,
    style: Style,
) -> Vec<String> {
    let separator_width = visible_width(PANE_SEPARATOR);
    let pane = width.saturating_sub(separator_width) / 2;
    let digits = diff
        .rows
        .iter()
        .flat_map(|row| [row.left.as_ref(), row.right.as_ref()])
        .flatten()
        .map(|side| side.line_no)
        .max()
        .unwrap_or(1)
        .to_string()
        .len();

    let mut lines = Vec::with_capacity(diff.rows.len() + 1);
    lines.push(format!(
        "{}{}{}",
        pad_to_width(&style.bold(headers.0), pane),
        style.dim(PANE_SEPARATOR),
        pad_to_width(&style.bold(headers.1), pane)
    ));

    for row in &diff.rows {
        let left = render_side(row.left.as_ref(), '-', digits, pane, style, false);
        let right = render_side(row.right.as_ref(), '+', digits, pane, style, true);
        lines.push(format!("{left}{}{right}", style.dim(PANE_SEPARATOR)));
    }

    lines
}

fn render_side(
    side: Option<&DiffSide>,
    marker: char,
    digits: usize,
    pane: usize,
    style: Style,
    added: bool,
) -> String {
    let Some(side) = side else {
        return " ".repeat(pane);
    };

    let marker = if side.changed { marker } else { ' ' };
    let cell = pad_to_width(
        &format!("{:>digits$} {marker} {}", side.line_no, side.text),
        pane,
    );
    match (side.changed, added) {
        (false, _) => cell,
        (true, false) => style.removed_bg(&cell),
        (true, true) => style.added_bg(&cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaced_line_is_paired_side_by_side() {
        let diff = SplitDiff::new(
            "low = 0\nhigh = len(arr)\nwhile low <= high:",
            "low = 0\nhigh = len(arr) - 1\nwhile low <= high:",
        );

        assert_eq!(diff.stats(), (1, 1));
        assert_eq!(diff.rows().len(), 3);
        let changed = &diff.rows()[1];
        assert_eq!(
            changed.left.as_ref().map(|side| side.text.as_str()),
            Some("high = len(arr)")
        );
        assert_eq!(
            changed.right.as_ref().map(|side| side.text.as_str()),
            Some("high = len(arr) - 1")
        );
        assert!(!diff.is_unchanged());
    }

    #[test]
    fn insertions_leave_the_left_pane_blank() {
        let diff = SplitDiff::new("a\nc", "a\nb\nc");
        assert_eq!(diff.stats(), (0, 1));
        assert_eq!(diff.rows()[1].left, None);
        assert_eq!(diff.rows()[1].right.as_ref().map(|side| side.line_no), Some(2));
    }

    #[test]
    fn trailing_newline_difference_is_not_a_change() {
        assert!(SplitDiff::new("a\nb", "a\nb\n").is_unchanged());
    }

    #[test]
    fn rendered_rows_are_exactly_as_wide_as_requested() {
        let diff = SplitDiff::new("x = 1\ny = 2", "x = 1\ny = 3");
        let lines = render_split_diff(&diff, ("Original", "Proposed"), 41, Style::plain());

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Original"));
        assert!(lines[2].contains("2 - y = 2"));
        assert!(lines[2].contains("2 + y = 3"));
        for line in &lines {
            assert_eq!(visible_width(line), 41);
        }
    }
}
