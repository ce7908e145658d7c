//! Base-14 font selection for rebuilt text.

use std::fmt;

/// One of the standard fonts every PDF viewer provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

impl BaseFont {
    /// The `/BaseFont` name.
    pub fn postscript_name(&self) -> &'static str {
        match self {
            BaseFont::Helvetica => "Helvetica",
            BaseFont::HelveticaBold => "Helvetica-Bold",
            BaseFont::HelveticaOblique => "Helvetica-Oblique",
            BaseFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            BaseFont::TimesRoman => "Times-Roman",
            BaseFont::TimesBold => "Times-Bold",
            BaseFont::TimesItalic => "Times-Italic",
            BaseFont::TimesBoldItalic => "Times-BoldItalic",
            BaseFont::Courier => "Courier",
            BaseFont::CourierBold => "Courier-Bold",
            BaseFont::CourierOblique => "Courier-Oblique",
            BaseFont::CourierBoldOblique => "Courier-BoldOblique",
            BaseFont::Symbol => "Symbol",
            BaseFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Symbolic fonts carry their own built-in encoding.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, BaseFont::Symbol | BaseFont::ZapfDingbats)
    }
}

impl fmt::Display for BaseFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.postscript_name())
    }
}

/// Pick the closest base-14 font for an embedded font name.
///
/// Matching is by family substring (`helvetica`, `times`, `courier`,
/// `symbol`, `zapf`/`dingbat`) plus bold / italic markers.  Anything
/// unrecognised, and `None`, falls back to Helvetica.
pub fn match_font(font_name: Option<&str>) -> BaseFont {
    let Some(name) = font_name else {
        return BaseFont::Helvetica;
    };
    // Subset fonts are named `ABCDEF+Family-Style`.
    let name = name.rsplit('+').next().unwrap_or(name).to_lowercase();

    let bold = name.contains("bold");
    let slanted = name.contains("italic") || name.contains("oblique");

    if name.contains("times") {
        match (bold, slanted) {
            (true, true) => BaseFont::TimesBoldItalic,
            (true, false) => BaseFont::TimesBold,
            (false, true) => BaseFont::TimesItalic,
            (false, false) => BaseFont::TimesRoman,
        }
    } else if name.contains("courier") {
        match (bold, slanted) {
            (true, true) => BaseFont::CourierBoldOblique,
            (true, false) => BaseFont::CourierBold,
            (false, true) => BaseFont::CourierOblique,
            (false, false) => BaseFont::Courier,
        }
    } else if name.contains("symbol") {
        BaseFont::Symbol
    } else if name.contains("zapf") || name.contains("dingbat") {
        BaseFont::ZapfDingbats
    } else if name.contains("helvetica") {
        match (bold, slanted) {
            (true, true) => BaseFont::HelveticaBoldOblique,
            (true, false) => BaseFont::HelveticaBold,
            (false, true) => BaseFont::HelveticaOblique,
            (false, false) => BaseFont::Helvetica,
        }
    } else {
        BaseFont::Helvetica
    }
}
