use unicode_normalization::UnicodeNormalization;

/// Clean up the text of one extracted word.
///
/// Applies unicode NFC normalization, ligature expansion, and removal of
/// control and replacement characters left behind by undecodable codes.
pub fn clean_word_text(text: &str) -> String {
    // 1. Unicode NFC normalization.
    let mut result: String = text.nfc().collect();

    // 2. Fix ligatures (ff, fi, fl, ffi, ffl, st).
    let ligatures = [
        ("\u{FB00}", "ff"),
        ("\u{FB01}", "fi"),
        ("\u{FB02}", "fl"),
        ("\u{FB03}", "ffi"),
        ("\u{FB04}", "ffl"),
        ("\u{FB06}", "st"),
    ];
    for (lig, replacement) in &ligatures {
        if result.contains(lig) {
            result = result.replace(lig, replacement);
        }
    }

    // 3. Drop control characters, soft hyphens and U+FFFD.
    result.retain(|c| !c.is_control() && c != '\u{FFFD}' && c != '\u{00AD}');

    result.trim().to_string()
}
