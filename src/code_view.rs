//! Code surface with a line-number gutter kept in step with the text.

use crate::highlight::Highlighter;
use crate::style::Style;
use crate::text::{truncate_to_width, visible_width};

const GUTTER_SEPARATOR: &str = " │ ";

#[derive(Debug, Clone, Copy)]
pub struct CodeViewOptions<'a> {
    pub width: usize,
    pub style: Style,
    /// Highlighter and file extension; plain text when absent.
    pub highlight: Option<(&'a Highlighter, &'a str)>,
    /// Text shown dimmed in place of line 1 when the buffer is empty.
    pub placeholder: Option<&'a str>,
}

impl<'a> CodeViewOptions<'a> {
    pub fn plain(width: usize) -> Self {
        Self {
            width,
            style: Style::plain(),
            highlight: None,
            placeholder: None,
        }
    }
}

/// Width of the number column for a buffer of `line_count` lines.
pub fn gutter_width(line_count: usize) -> usize {
    line_count.max(1).to_string().len().max(2)
}

/// Renders `code` with one numbered row per source line.
///
/// Long lines are truncated rather than wrapped so row `n` always shows
/// source line `n`. An empty buffer still renders line 1.
pub fn render_code(code: &str, options: &CodeViewOptions<'_>) -> Vec<String> {
    let source: Vec<&str> = if code.is_empty() {
        vec![""]
    } else {
        code.lines().collect()
    };
    let digits = gutter_width(source.len());
    let text_width = options
        .width
        .saturating_sub(digits + visible_width(GUTTER_SEPARATOR))
        .max(1);

    let highlighted = options
        .highlight
        .filter(|_| options.style.is_enabled() && !code.is_empty())
        .and_then(|(highlighter, extension)| highlighter.highlight(code, extension))
        .filter(|lines| lines.len() == source.len());

    source
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let number = options.style.dim(&format!("{:>digits$}", index + 1));
            let body = match (&highlighted, options.placeholder) {
                (_, Some(placeholder)) if code.is_empty() => options.style.dim(placeholder),
                (Some(lines), _) => lines[index].clone(),
                (None, _) => line.to_string(),
            };
            format!(
                "{number}{}{}",
                options.style.dim(GUTTER_SEPARATOR),
                truncate_to_width(&body, text_width, "…")
            )
        })
        .collect()
}
