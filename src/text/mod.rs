//! ANSI-aware text measurement and layout.

mod ansi;
mod layout;
mod width;

pub use ansi::{ansi_sequence_len, strip_ansi, ANSI_RESET};
pub use layout::{pad_to_width, rule, truncate_to_width, wrap_to_width};
pub use width::{grapheme_width, visible_width};
