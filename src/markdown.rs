//! Markdown prose rendering for diagnosis panels and help text.

use markdown::{mdast, to_mdast, ParseOptions};

use crate::style::Style;
use crate::text::wrap_to_width;

const CODE_INDENT: &str = "  ";

/// Renders `text` as wrapped terminal lines no wider than `width`.
///
/// Blocks are separated by one blank line. Input the parser rejects is
/// rendered as plain wrapped text.
pub fn render_markdown(text: &str, width: usize, style: Style) -> Vec<String> {
    let root = match to_mdast(text, &ParseOptions::default()) {
        Ok(mdast::Node::Root(root)) => root,
        _ => {
            return text
                .lines()
                .flat_map(|line| wrap_to_width(line, width))
                .collect()
        }
    };

    let renderer = Renderer { width, style };
    let mut lines = Vec::new();
    for block in &root.children {
        let rendered = renderer.render_block(block, 0);
        if rendered.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(rendered);
    }
    lines
}

struct Renderer {
    width: usize,
    style: Style,
}

impl Renderer {
    fn render_block(&self, node: &mdast::Node, depth: usize) -> Vec<String> {
        let width = self.width.saturating_sub(depth * 2).max(1);
        match node {
            mdast::Node::Heading(heading) => {
                let text = self.render_inline(&heading.children);
                wrap_lines(&text, width)
                    .into_iter()
                    .map(|line| self.style.bold(&self.style.cyan(&line)))
                    .collect()
            }
            mdast::Node::Paragraph(paragraph) => {
                wrap_lines(&self.render_inline(&paragraph.children), width)
            }
            mdast::Node::List(list) => self.render_list(list, depth),
            mdast::Node::Code(code) => {
                let mut lines = vec![self
                    .style
                    .dim(&format!("```{}", code.lang.as_deref().unwrap_or_default()))];
                lines.extend(
                    code.value
                        .split('\n')
                        .map(|line| format!("{CODE_INDENT}{}", self.style.yellow(line))),
                );
                lines.push(self.style.dim("```"));
                lines
            }
            mdast::Node::Blockquote(quote) => quote
                .children
                .iter()
                .flat_map(|child| self.render_block(child, depth + 1))
                .map(|line| format!("{}{}", self.style.dim("│ "), self.style.italic(&line)))
                .collect(),
            mdast::Node::ThematicBreak(_) => vec![self.style.dim(&"─".repeat(width))],
            other => {
                let text = self.render_inline(std::slice::from_ref(other));
                if text.is_empty() {
                    Vec::new()
                } else {
                    wrap_lines(&text, width)
                }
            }
        }
    }

    fn render_list(&self, list: &mdast::List, depth: usize) -> Vec<String> {
        let start = list.start.unwrap_or(1);
        let mut lines = Vec::new();

        for (index, node) in list.children.iter().enumerate() {
            let mdast::Node::ListItem(item) = node else {
                continue;
            };
            let bullet = if list.ordered {
                format!("{}. ", start + index as u32)
            } else {
                "- ".to_string()
            };
            let hanging = " ".repeat(bullet.len());

            let mut first = true;
            for child in &item.children {
                for line in self.render_block(child, depth + 1) {
                    if first {
                        lines.push(format!("{}{line}", self.style.dim(&bullet)));
                        first = false;
                    } else {
                        lines.push(format!("{hanging}{line}"));
                    }
                }
            }
            if first {
                lines.push(self.style.dim(&bullet));
            }
        }

        lines
    }

    fn render_inline(&self, nodes: &[mdast::Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                mdast::Node::Text(text) => out.push_str(&text.value),
                mdast::Node::Strong(strong) => {
                    out.push_str(&self.style.bold(&self.render_inline(&strong.children)));
                }
                mdast::Node::Emphasis(emphasis) => {
                    out.push_str(&self.style.italic(&self.render_inline(&emphasis.children)));
                }
                mdast::Node::Delete(delete) => out.push_str(&self.render_inline(&delete.children)),
                mdast::Node::InlineCode(code) => out.push_str(&self.style.yellow(&code.value)),
                mdast::Node::Link(link) => {
                    let label = self.render_inline(&link.children);
                    out.push_str(&self.style.blue(&label));
                    if label != link.url {
                        out.push_str(&self.style.dim(&format!(" ({})", link.url)));
                    }
                }
                mdast::Node::Break(_) => out.push('\n'),
                mdast::Node::Html(html) => out.push_str(&html.value),
                mdast::Node::Paragraph(paragraph) => {
                    out.push_str(&self.render_inline(&paragraph.children));
                }
                _ => {}
            }
        }
        out
    }
}

fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    text.split('\n')
        .flat_map(|line| wrap_to_width(line, width))
        .collect()
}
