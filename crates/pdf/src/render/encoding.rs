//! WinAnsiEncoding in both directions.
//!
//! The base-14 fonts are written with `/Encoding /WinAnsiEncoding`.  The code
//! table is lopdf's, read through the encoding it resolves for such a font.

use std::sync::OnceLock;

use lopdf::{dictionary, Document};

/// Byte substituted for characters WinAnsi cannot represent.
pub const UNMAPPABLE: u8 = b'?';

/// Codes WinAnsi leaves unassigned.  lopdf renders them as bullets; here they
/// decode to U+FFFD so that a bullet encodes to 0x95.
const UNASSIGNED: [u8; 6] = [0x7F, 0x81, 0x8D, 0x8F, 0x90, 0x9D];

fn table() -> &'static [Option<char>; 256] {
    static TABLE: OnceLock<[Option<char>; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [None; 256];
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "Encoding" => "WinAnsiEncoding",
        };
        let encoding = match font.get_font_encoding(&Document::new()) {
            Ok(encoding) => encoding,
            Err(e) => {
                log::warn!("WinAnsi table unavailable: {e}");
                return table;
            }
        };

        for (byte, slot) in (0u8..=255).zip(table.iter_mut()) {
            if UNASSIGNED.contains(&byte) {
                continue;
            }
            let decoded = encoding.bytes_to_string(&[byte]).unwrap_or_default();
            let mut chars = decoded.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                *slot = Some(c);
            }
        }
        table
    })
}

/// Decode one WinAnsi byte.  Undefined codes map to U+FFFD.
pub fn win_ansi_char(byte: u8) -> char {
    table()[usize::from(byte)].unwrap_or('\u{FFFD}')
}

/// Encode one character, `None` when WinAnsi has no code for it.  When two
/// codes share a glyph the lower one wins.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    table()
        .iter()
        .position(|slot| *slot == Some(c))
        .and_then(|i| u8::try_from(i).ok())
}

/// Encode a string for a `Tj` operand.  Tabs and no-break spaces become
/// spaces; anything else without a code becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' | '\u{00A0}' => b' ',
            c => win_ansi_byte(c).unwrap_or(UNMAPPABLE),
        })
        .collect()
}
