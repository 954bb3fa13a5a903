//! Byte-stream decoder: escape sequences and UTF-8 in, logical keys out.
//!
//! Partial sequences (a CSI cut mid-read, a multi-byte glyph split across
//! reads) are held in `pending` and resumed on the next `consume_bytes`,
//! never turned into a spurious event. A lone ESC at the end of a read is
//! resolved by `flush_pending` as a real Escape keypress, since terminals
//! deliver arrow/function sequences atomically within one read.

use crate::input::event::{Direction, KeyKind, Shortcut};

#[derive(Debug, Default)]
pub struct InputParser {
    pending: Vec<u8>,
}

#[inline]
fn map_arrow_final(byte: u8) -> Option<Direction> {
    match byte {
        b'A' => Some(Direction::Up),
        b'B' => Some(Direction::Down),
        b'C' => Some(Direction::Right),
        b'D' => Some(Direction::Left),
        _ => None,
    }
}

#[inline]
fn is_csi_final(byte: u8) -> bool {
    (0x40..=0x7e).contains(&byte)
}

#[inline]
fn utf8_len(lead: u8) -> usize {
    match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}

enum Step {
    Emit(KeyKind, usize),
    Skip(usize),
    /// Not enough bytes yet; keep everything from the current index.
    Hold,
}

impl InputParser {
    pub fn new() -> InputParser {
        InputParser::default()
    }

    /// Decode as much of `bytes` as possible, appending events to `out`.
    /// Undecodable tails are buffered for the next call.
    pub fn consume_bytes(&mut self, bytes: &[u8], out: &mut Vec<KeyKind>) {
        self.pending.extend_from_slice(bytes);
        let mut idx = 0usize;
        while idx < self.pending.len() {
            match self.step(idx) {
                Step::Emit(kind, consumed) => {
                    out.push(kind);
                    idx += consumed;
                }
                Step::Skip(consumed) => idx += consumed,
                Step::Hold => break,
            }
        }
        self.pending.drain(0..idx);
    }

    /// Resolve end-of-read ambiguity: a lone buffered ESC is a real Escape
    /// (Cancel). Longer partials (`ESC [`, a split UTF-8 glyph) stay held.
    pub fn flush_pending(&mut self, out: &mut Vec<KeyKind>) {
        if self.pending.as_slice() == [0x1b] {
            self.pending.clear();
            out.push(KeyKind::Cancel);
        }
    }

    /// Drop any held bytes; called on a context switch so a stale partial
    /// from the old context cannot leak into the new one.
    pub fn flush(&mut self) {
        self.pending.clear();
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn step(&self, idx: usize) -> Step {
        let bytes = &self.pending[idx..];
        let lead = bytes[0];
        match lead {
            0x1b => self.step_escape(bytes),
            b'\r' | b'\n' => Step::Emit(KeyKind::Confirm, 1),
            0x03 => Step::Emit(KeyKind::Shortcut(Shortcut::Quit), 1),
            0x0c => Step::Emit(KeyKind::Shortcut(Shortcut::Lock), 1),
            0x7f | 0x08 => Step::Emit(KeyKind::Shortcut(Shortcut::Erase), 1),
            0x00..=0x1f => Step::Skip(1),
            0x20..=0x7e => Step::Emit(KeyKind::Char(lead as char), 1),
            _ => {
                let len = utf8_len(lead);
                if bytes.len() < len {
                    return Step::Hold;
                }
                match std::str::from_utf8(&bytes[..len]) {
                    Ok(s) => match s.chars().next() {
                        Some(ch) => Step::Emit(KeyKind::Char(ch), len),
                        None => Step::Skip(len),
                    },
                    // invalid sequence: drop the lead byte and resync
                    Err(_) => Step::Skip(1),
                }
            }
        }
    }

    fn step_escape(&self, bytes: &[u8]) -> Step {
        if bytes.len() < 2 {
            return Step::Hold;
        }
        match bytes[1] {
            b'O' => {
                // SS3: arrows on application-mode terminals, F1 for help
                let Some(&final_byte) = bytes.get(2) else {
                    return Step::Hold;
                };
                if let Some(dir) = map_arrow_final(final_byte) {
                    return Step::Emit(KeyKind::Direction(dir), 3);
                }
                if final_byte == b'P' {
                    return Step::Emit(KeyKind::Shortcut(Shortcut::Help), 3);
                }
                Step::Skip(3)
            }
            b'[' => self.step_csi(bytes),
            // ESC-prefixed ordinary byte: treat the ESC as a bare Escape and
            // let the next byte decode on its own
            _ => Step::Emit(KeyKind::Cancel, 1),
        }
    }

    fn step_csi(&self, bytes: &[u8]) -> Step {
        let mut idx = 2usize;
        while idx < bytes.len() {
            let byte = bytes[idx];
            if byte.is_ascii_digit() || byte == b';' {
                idx += 1;
                continue;
            }
            if !is_csi_final(byte) {
                // malformed sequence; drop what we scanned
                return Step::Skip(idx + 1);
            }
            let consumed = idx + 1;
            let params = &bytes[2..idx];
            if let Some(dir) = map_arrow_final(byte) {
                return Step::Emit(KeyKind::Direction(dir), consumed);
            }
            return match byte {
                b'~' => match params {
                    b"5" => Step::Emit(KeyKind::Shortcut(Shortcut::PageUp), consumed),
                    b"6" => Step::Emit(KeyKind::Shortcut(Shortcut::PageDown), consumed),
                    b"11" => Step::Emit(KeyKind::Shortcut(Shortcut::Help), consumed),
                    _ => Step::Skip(consumed),
                },
                _ => Step::Skip(consumed),
            };
        }
        Step::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(parser: &mut InputParser, bytes: &[u8]) -> Vec<KeyKind> {
        let mut out = Vec::new();
        parser.consume_bytes(bytes, &mut out);
        parser.flush_pending(&mut out);
        out
    }

    #[test]
    fn decodes_arrow_sequences() {
        let mut parser = InputParser::new();
        let keys = decode(&mut parser, b"\x1b[A\x1b[B\x1bOC\x1b[D");
        assert_eq!(
            keys,
            vec![
                KeyKind::Direction(Direction::Up),
                KeyKind::Direction(Direction::Down),
                KeyKind::Direction(Direction::Right),
                KeyKind::Direction(Direction::Left),
            ]
        );
    }

    #[test]
    fn decodes_parameterized_csi_arrows() {
        let mut parser = InputParser::new();
        let keys = decode(&mut parser, b"\x1b[1;2A\x1b[1;5D");
        assert_eq!(
            keys,
            vec![
                KeyKind::Direction(Direction::Up),
                KeyKind::Direction(Direction::Left),
            ]
        );
    }

    #[test]
    fn partial_csi_is_held_across_reads() {
        let mut parser = InputParser::new();
        let mut out = Vec::new();
        parser.consume_bytes(b"\x1b[1;", &mut out);
        parser.flush_pending(&mut out);
        assert!(out.is_empty());
        assert!(parser.has_pending());

        parser.consume_bytes(b"2B", &mut out);
        assert_eq!(out, vec![KeyKind::Direction(Direction::Down)]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn lone_escape_flushes_to_cancel() {
        let mut parser = InputParser::new();
        let keys = decode(&mut parser, b"\x1b");
        assert_eq!(keys, vec![KeyKind::Cancel]);
    }

    #[test]
    fn split_utf8_glyph_reassembles() {
        let mut parser = InputParser::new();
        let bytes = "é".as_bytes();
        let mut out = Vec::new();
        parser.consume_bytes(&bytes[..1], &mut out);
        assert!(out.is_empty());
        parser.consume_bytes(&bytes[1..], &mut out);
        assert_eq!(out, vec![KeyKind::Char('é')]);
    }

    #[test]
    fn control_and_page_keys_map_to_shortcuts() {
        let mut parser = InputParser::new();
        let keys = decode(&mut parser, b"\x03\x0c\x7f\x1b[5~\x1b[6~");
        assert_eq!(
            keys,
            vec![
                KeyKind::Shortcut(Shortcut::Quit),
                KeyKind::Shortcut(Shortcut::Lock),
                KeyKind::Shortcut(Shortcut::Erase),
                KeyKind::Shortcut(Shortcut::PageUp),
                KeyKind::Shortcut(Shortcut::PageDown),
            ]
        );
    }

    #[test]
    fn printable_text_decodes_as_chars() {
        let mut parser = InputParser::new();
        let keys = decode(&mut parser, b"hi");
        assert_eq!(keys, vec![KeyKind::Char('h'), KeyKind::Char('i')]);
    }

    #[test]
    fn enter_decodes_as_confirm() {
        let mut parser = InputParser::new();
        assert_eq!(decode(&mut parser, b"\r"), vec![KeyKind::Confirm]);
    }

    #[test]
    fn flush_drops_stale_partials() {
        let mut parser = InputParser::new();
        let mut out = Vec::new();
        parser.consume_bytes(b"\x1b[1", &mut out);
        assert!(parser.has_pending());
        parser.flush();
        assert!(!parser.has_pending());
        // bytes after the flush decode cleanly
        parser.consume_bytes(b"x", &mut out);
        assert_eq!(out, vec![KeyKind::Char('x')]);
    }

    #[test]
    fn unknown_csi_sequences_are_dropped_silently() {
        let mut parser = InputParser::new();
        let keys = decode(&mut parser, b"\x1b[31mred");
        assert_eq!(
            keys,
            vec![
                KeyKind::Char('r'),
                KeyKind::Char('e'),
                KeyKind::Char('d'),
            ]
        );
    }
}
