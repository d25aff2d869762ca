use unicode_segmentation::UnicodeSegmentation;

use super::ansi::{ansi_sequence_len, ANSI_RESET};
use super::width::{grapheme_width, visible_width};

enum Segment<'a> {
    Ansi(&'a str),
    Grapheme(&'a str),
}

fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < text.len() {
        if let Some(len) = ansi_sequence_len(text, idx) {
            out.push(Segment::Ansi(&text[idx..idx + len]));
            idx += len;
            continue;
        }

        let mut end = idx;
        while end < text.len() && ansi_sequence_len(text, end).is_none() {
            end += text[end..].chars().next().map_or(1, char::len_utf8);
        }
        out.extend(text[idx..end].graphemes(true).map(Segment::Grapheme));
        idx = end;
    }
    out
}

/// Cuts `text` to at most `max_width` columns, appending `ellipsis` when cut.
///
/// Escape sequences are preserved and a reset is emitted before the ellipsis
/// so styles never bleed into it.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if max_width == 0 {
        return String::new();
    }
    if visible_width(text) <= max_width {
        return text.to_string();
    }

    let target = max_width.saturating_sub(visible_width(ellipsis));
    if target == 0 {
        return ellipsis.chars().take(max_width).collect();
    }

    let mut out = String::with_capacity(text.len());
    let mut used = 0;
    for segment in segments(text) {
        match segment {
            Segment::Ansi(code) => out.push_str(code),
            Segment::Grapheme(grapheme) => {
                let width = grapheme_width(grapheme);
                if used + width > target {
                    break;
                }
                out.push_str(grapheme);
                used += width;
            }
        }
    }
    out.push_str(ANSI_RESET);
    out.push_str(ellipsis);
    out
}

/// Right-pads `text` with spaces to exactly `width` columns, truncating if longer.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let text = truncate_to_width(text, width, "…");
    let used = visible_width(&text);
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

/// Hard-wraps one logical line into rows of at most `width` columns.
///
/// Breaks at the last space when one exists on the row, otherwise mid-word.
/// Escape sequences are kept on the row where they appear. An empty line
/// yields a single empty row.
pub fn wrap_to_width(line: &str, width: usize) -> Vec<String> {
    if width == 0 || visible_width(line) <= width {
        return vec![line.to_string()];
    }

    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut last_space: Option<(usize, usize)> = None;

    for segment in segments(line) {
        let grapheme = match segment {
            Segment::Ansi(code) => {
                current.push_str(code);
                continue;
            }
            Segment::Grapheme(grapheme) => grapheme,
        };

        let width_of = grapheme_width(grapheme);
        if current_width + width_of > width {
            match last_space.take() {
                Some((byte_idx, width_before)) if width_before > 0 => {
                    let rest = current.split_off(byte_idx + 1);
                    rows.push(current.trim_end().to_string());
                    current_width = visible_width(&rest);
                    current = rest;
                }
                _ => {
                    rows.push(std::mem::take(&mut current));
                    current_width = 0;
                }
            }
        }

        if grapheme == " " {
            last_space = Some((current.len(), current_width));
        }
        current.push_str(grapheme);
        current_width += width_of;
    }

    rows.push(current);
    rows
}

/// A horizontal rule of `width` columns with an optional inline title.
pub fn rule(title: Option<&str>, width: usize) -> String {
    match title {
        Some(title) if width > visible_width(title) + 4 => {
            let title = format!("── {title} ");
            let used = visible_width(&title);
            format!("{title}{}", "─".repeat(width - used))
        }
        _ => "─".repeat(width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_returns_original_when_it_fits() {
        assert_eq!(truncate_to_width("hello", 6, "..."), "hello");
    }

    #[test]
    fn truncate_adds_reset_before_ellipsis() {
        let truncated = truncate_to_width("\x1b[31mhello", 4, "...");
        assert_eq!(truncated, "\x1b[31mh\x1b[0m...");
        assert_eq!(visible_width(&truncated), 4);
    }

    #[test]
    fn truncate_handles_tiny_widths() {
        assert_eq!(truncate_to_width("hello", 2, "..."), "..");
        assert_eq!(truncate_to_width("hello", 0, "..."), "");
    }

    #[test]
    fn pad_fills_to_exact_width() {
        assert_eq!(pad_to_width("hi", 4), "hi  ");
        assert_eq!(visible_width(&pad_to_width("a long line", 5)), 5);
    }

    #[test]
    fn wrap_prefers_spaces_and_falls_back_to_hard_breaks() {
        assert_eq!(
            wrap_to_width("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_to_width("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_to_width("", 3), vec![""]);
    }

    #[test]
    fn rule_embeds_title_when_there_is_room() {
        assert_eq!(rule(Some("Output"), 14), "── Output ────");
        assert_eq!(rule(Some("Output"), 6), "──────");
        assert_eq!(rule(None, 3), "───");
    }
}
