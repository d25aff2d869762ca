//! Syntax highlighting backed by syntect's bundled grammars.

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;

const THEME_NAME: &str = "base16-ocean.dark";

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Loads grammars and themes ahead of the first render.
pub fn prewarm_highlighting() {
    Lazy::force(&SYNTAX_SET);
    Lazy::force(&THEME_SET);
}

#[derive(Debug, Clone, Copy)]
pub struct Highlighter {
    theme: &'static Theme,
}

impl Highlighter {
    /// Returns `None` when the bundled theme is missing.
    pub fn new() -> Option<Self> {
        THEME_SET
            .themes
            .get(THEME_NAME)
            .map(|theme| Self { theme })
    }

    /// Highlights `code` line by line for a file with `extension`.
    ///
    /// Returns one escaped string per input line, or `None` when the extension
    /// is unknown or a line fails to highlight.
    pub fn highlight(&self, code: &str, extension: &str) -> Option<Vec<String>> {
        let syntax = SYNTAX_SET.find_syntax_by_extension(extension)?;
        let mut highlighter = HighlightLines::new(syntax, self.theme);

        let mut lines = Vec::new();
        for line in code.lines() {
            let with_newline = format!("{line}\n");
            let ranges = highlighter
                .highlight_line(&with_newline, &SYNTAX_SET)
                .ok()?;
            let escaped = as_24_bit_terminal_escaped(&ranges, false);
            lines.push(format!("{}\x1b[0m", escaped.trim_end_matches('\n')));
        }
        Some(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::strip_ansi;

    #[test]
    fn highlighting_preserves_line_text() {
        let highlighter = Highlighter::new().expect("bundled theme");
        let lines = highlighter
            .highlight("def f(x):\n    return x", "py")
            .expect("python grammar");

        assert_eq!(lines.len(), 2);
        assert_eq!(strip_ansi(&lines[0]), "def f(x):");
        assert_eq!(strip_ansi(&lines[1]), "    return x");
        assert!(lines[0].contains("\x1b["));
    }

    #[test]
    fn unknown_extension_is_not_highlighted() {
        let highlighter = Highlighter::new().expect("bundled theme");
        assert_eq!(highlighter.highlight("x", "nope"), None);
    }
}
