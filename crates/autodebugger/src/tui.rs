//! Draws a [`View`] as a full screen of terminal lines.

use forge_tui::{
    pad_to_width, render_code, render_markdown, render_split_diff, rule, truncate_to_width,
    visible_width, wrap_to_width, CodeViewOptions, Highlighter, SplitDiff, Style,
};

use crate::app::Tab;
use crate::view::{Controls, EditorSurface, PanelContent, StatusBar, View, NO_CHANGES_LABEL};

pub const EDITOR_PLACEHOLDER: &str = "Type your code here... (/edit to enter code, /sample for a demo)";
const MIN_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub width: usize,
    pub style: Style,
    pub highlighter: Option<&'a Highlighter>,
}

impl<'a> RenderOptions<'a> {
    pub fn plain(width: usize) -> Self {
        Self {
            width,
            style: Style::plain(),
            highlighter: None,
        }
    }
}

pub fn render_view(view: &View, options: &RenderOptions<'_>) -> Vec<String> {
    let width = options.width.max(MIN_WIDTH);
    let style = options.style;
    let mut lines = Vec::new();

    lines.push(render_header(view, width, style));
    lines.extend(render_editor(&view.editor, width, options));
    lines.push(render_controls(view.controls, view.busy_label, width, style));
    lines.push(render_tabs(view.active_tab, width, style));
    lines.extend(render_panel(&view.panel, width, style));
    lines.push(style.dim(&rule(None, width)));
    lines.push(render_status_footer(&view.status, width, style));
    if let Some(hint) = view.language_hint.as_deref() {
        lines.push(truncate_to_width(&style.yellow(hint), width, "…"));
    }

    lines
}

fn render_header(view: &View, width: usize, style: Style) -> String {
    let left = style.bold(view.title);
    let right = match view.mode_label {
        Some(label) => style.inverse(&format!(" {label} ")),
        None => style.dim(&format!("{} mode", view.mode)),
    };
    align_left_right(&left, &right, width)
}

fn render_editor(editor: &EditorSurface, width: usize, options: &RenderOptions<'_>) -> Vec<String> {
    let style = options.style;
    match editor {
        EditorSurface::Buffer { text, language } => {
            let mut lines = vec![style.dim(&rule(Some(language.file_name()), width))];
            let code_options = CodeViewOptions {
                width,
                style,
                highlight: options
                    .highlighter
                    .map(|highlighter| (highlighter, language.extension())),
                placeholder: Some(EDITOR_PLACEHOLDER),
            };
            lines.extend(render_code(text, &code_options));
            lines
        }
        EditorSurface::Diff {
            original,
            proposed,
            language,
            unchanged,
        } => {
            let title = format!("{} (review)", language.file_name());
            let mut lines = vec![style.dim(&rule(Some(title.as_str()), width))];
            if *unchanged {
                lines.push(style.yellow(NO_CHANGES_LABEL));
            }
            let diff = SplitDiff::new(original, proposed);
            lines.extend(render_split_diff(
                &diff,
                ("Original", "Proposed Fix"),
                width,
                style,
            ));
            let (removed, added) = diff.stats();
            lines.push(style.dim(&format!("-{removed} +{added} lines")));
            lines
        }
    }
}

fn render_controls(
    controls: Controls,
    busy_label: Option<&str>,
    width: usize,
    style: Style,
) -> String {
    let control = |enabled: bool, label: &str| {
        if enabled {
            style.cyan(label)
        } else {
            style.dim(label)
        }
    };
    let left = [
        control(controls.run, "/run"),
        control(controls.debug, "/debug"),
        control(controls.apply, "/apply"),
        control(controls.reject, "/reject"),
    ]
    .join(" ");
    let right = busy_label
        .map(|label| style.yellow(label))
        .unwrap_or_default();
    align_left_right(&left, &right, width)
}

fn render_tabs(active: Tab, width: usize, style: Style) -> String {
    let tab = |tab: Tab| {
        if tab == active {
            style.bold(&format!("[{}]", tab.title()))
        } else {
            style.dim(&format!(" {} ", tab.title()))
        }
    };
    let tabs = format!("{} {}", tab(Tab::Output), tab(Tab::Diagnosis));
    truncate_to_width(&tabs, width, "…")
}

fn render_panel(panel: &PanelContent, width: usize, style: Style) -> Vec<String> {
    match panel {
        PanelContent::Empty { hint } => vec![style.dim(&style.italic(hint))],
        PanelContent::Output { text, exit_code } => {
            let mut lines: Vec<String> = text
                .lines()
                .flat_map(|line| wrap_to_width(line, width))
                .collect();
            match exit_code {
                Some(0) => lines.push(style.green("exit code 0")),
                Some(code) => lines.push(style.red(&format!("exit code {code}"))),
                None => {}
            }
            lines
        }
        PanelContent::Diagnosis {
            markdown,
            review_tip,
        } => {
            let mut lines = render_markdown(markdown, width, style);
            if let Some(tip) = review_tip {
                lines.push(String::new());
                lines.extend(
                    wrap_to_width(tip, width)
                        .into_iter()
                        .map(|line| style.blue(&line)),
                );
            }
            lines
        }
    }
}

fn render_status_footer(status: &StatusBar, width: usize, style: Style) -> String {
    let left = format!(
        "{} {} {}",
        status.file_name,
        style.dim("|"),
        status.language_label
    );
    let right = style.dim(&format!(
        "{} lines | {}",
        status.line_count, status.backend
    ));
    align_left_right(&left, &right, width)
}

fn align_left_right(left: &str, right: &str, width: usize) -> String {
    let left_width = visible_width(left);
    let right_width = visible_width(right);
    if left_width + right_width + 1 > width {
        return pad_to_width(left, width);
    }
    format!(
        "{left}{}{right}",
        " ".repeat(width - left_width - right_width)
    )
}
