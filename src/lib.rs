//! Line-oriented rendering primitives for terminal front ends.
//!
//! Every renderer here is a pure function from text to a `Vec<String>` of
//! terminal lines, each no wider than the requested width. Nothing in this
//! crate writes to the terminal; callers decide when to print.
//!
//! # Overview
//! - [`render_code`]: a code surface with a synchronized line-number gutter.
//! - [`render_split_diff`]: a two-pane original/proposed diff.
//! - [`render_markdown`]: markdown prose for diagnoses and help text.
//! - [`Highlighter`]: syntect-backed syntax highlighting.
//! - [`terminal_columns`] and [`ResizeFlag`]: terminal size plumbing.

pub mod code_view;
pub mod config;
pub mod diff;
pub mod highlight;
pub mod markdown;
pub mod style;
pub mod terminal;
pub mod text;

pub use crate::code_view::{render_code, CodeViewOptions};
pub use crate::config::EnvConfig;
pub use crate::diff::{render_split_diff, DiffRow, DiffSide, SplitDiff};
pub use crate::highlight::{prewarm_highlighting, Highlighter};
pub use crate::markdown::render_markdown;
pub use crate::style::Style;
pub use crate::terminal::{terminal_columns, ResizeFlag};
pub use crate::text::{
    pad_to_width, rule, strip_ansi, truncate_to_width, visible_width, wrap_to_width,
};
