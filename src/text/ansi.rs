pub const ANSI_RESET: &str = "\x1b[0m";

/// Length in bytes of the escape sequence starting at `pos`, if any.
///
/// Recognizes CSI (`ESC [ ... final`) and OSC (`ESC ] ... BEL` or
/// `ESC ] ... ESC \`). Unterminated sequences are not treated as escapes.
pub fn ansi_sequence_len(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&0x1b) {
        return None;
    }

    match bytes.get(pos + 1)? {
        b'[' => bytes[pos + 2..]
            .iter()
            .position(|byte| (0x40..=0x7e).contains(byte))
            .map(|offset| offset + 3),
        b']' => {
            let mut idx = pos + 2;
            while idx < bytes.len() {
                if bytes[idx] == 0x07 {
                    return Some(idx + 1 - pos);
                }
                if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
                    return Some(idx + 2 - pos);
                }
                idx += 1;
            }
            None
        }
        _ => None,
    }
}

/// Removes every recognized escape sequence from `input`.
pub fn strip_ansi(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(len) = ansi_sequence_len(input, idx) {
            idx += len;
            continue;
        }

        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        clean.push(ch);
        idx += ch.len_utf8();
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csi_and_osc_sequences_are_measured() {
        assert_eq!(ansi_sequence_len("\x1b[31mred", 0), Some(5));
        assert_eq!(ansi_sequence_len("\x1b[38;2;1;2;3m", 0), Some(13));
        assert_eq!(ansi_sequence_len("\x1b]8;;x\x07", 0), Some(7));
        assert_eq!(ansi_sequence_len("\x1b]8;;x\x1b\\", 0), Some(8));
    }

    #[test]
    fn plain_text_and_unterminated_sequences_are_not_escapes() {
        assert_eq!(ansi_sequence_len("abc", 0), None);
        assert_eq!(ansi_sequence_len("\x1b[12", 0), None);
        assert_eq!(ansi_sequence_len("\x1b", 0), None);
    }

    #[test]
    fn strip_removes_styles_only() {
        assert_eq!(strip_ansi("\x1b[1mbold\x1b[0m and plain"), "bold and plain");
    }
}
