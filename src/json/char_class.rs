//! Unicode character classes used by the dialect grammar
//!
//! Every class is a pure predicate over a code point. ASCII answers come
//! from a bitmap built once on first use; everything else comes from
//! `unicode-ident` (identifiers), `char` methods (White_Space) or the
//! constant ranges below (C0 controls, private use, non-characters).

use std::sync::OnceLock;

/// A character class the grammar gates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// C0 controls, U+0000..=U+001F
    ///
    /// DEL and the C1 block are ordinary characters inside JSON strings.
    Control,
    /// U+D800..=U+DFFF
    Surrogate,
    /// Private use areas of the BMP and planes 15/16
    PrivateUse,
    /// The 66 permanently reserved non-characters
    NonCharacter,
    /// `$`, `_` or XID_Start
    IdentifierStart,
    /// `$`, ZWNJ, ZWJ or XID_Continue
    IdentifierPart,
    /// Space, tab, CR, LF
    AnsiWhitespace,
    /// ECMAScript WhiteSpace and LineTerminator
    UnicodeWhitespace,
    /// LF, CR, LS, PS
    LineTerminator,
    /// `0-9`
    DecimalDigit,
    /// `0-9a-fA-F`
    HexDigit,
}

const PRIVATE_USE: [(u32, u32); 3] = [
    (0xE000, 0xF8FF),
    (0xF_0000, 0xF_FFFD),
    (0x10_0000, 0x10_FFFD),
];

const NON_CHARACTER_BLOCK: (u32, u32) = (0xFDD0, 0xFDEF);

const ALL_CLASSES: [CharClass; 11] = [
    CharClass::Control,
    CharClass::Surrogate,
    CharClass::PrivateUse,
    CharClass::NonCharacter,
    CharClass::IdentifierStart,
    CharClass::IdentifierPart,
    CharClass::AnsiWhitespace,
    CharClass::UnicodeWhitespace,
    CharClass::LineTerminator,
    CharClass::DecimalDigit,
    CharClass::HexDigit,
];

/// Bitmap of class membership for ASCII, one `u16` per code point
static ASCII_TABLE: OnceLock<[u16; 128]> = OnceLock::new();

fn ascii_table() -> &'static [u16; 128] {
    ASCII_TABLE.get_or_init(|| {
        let mut table = [0u16; 128];
        for (cp, bits) in table.iter_mut().enumerate() {
            for class in ALL_CLASSES {
                if class.classify(cp as u32) {
                    *bits |= class.bit();
                }
            }
        }
        table
    })
}

impl CharClass {
    #[inline]
    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Whether the code point belongs to this class
    #[inline]
    pub fn contains(self, cp: u32) -> bool {
        if cp < 128 {
            ascii_table()[cp as usize] & self.bit() != 0
        } else {
            self.classify(cp)
        }
    }

    /// Whether the character belongs to this class
    #[inline]
    pub fn contains_char(self, c: char) -> bool {
        self.contains(c as u32)
    }

    fn classify(self, cp: u32) -> bool {
        match self {
            CharClass::Control => cp <= 0x1F,
            CharClass::Surrogate => (0xD800..=0xDFFF).contains(&cp),
            CharClass::PrivateUse => PRIVATE_USE
                .iter()
                .any(|&(lo, hi)| (lo..=hi).contains(&cp)),
            CharClass::NonCharacter => {
                (NON_CHARACTER_BLOCK.0..=NON_CHARACTER_BLOCK.1).contains(&cp)
                    || (cp <= 0x10_FFFF && cp & 0xFFFE == 0xFFFE)
            }
            CharClass::DecimalDigit => (0x30..=0x39).contains(&cp),
            CharClass::HexDigit => char::from_u32(cp).is_some_and(|c| c.is_ascii_hexdigit()),
            // Remaining classes are only defined on scalar values.
            _ => char::from_u32(cp).is_some_and(|c| self.classify_char(c)),
        }
    }

    fn classify_char(self, c: char) -> bool {
        match self {
            CharClass::IdentifierStart => {
                c == '$' || c == '_' || unicode_ident::is_xid_start(c)
            }
            CharClass::IdentifierPart => {
                c == '$'
                    || c == '\u{200C}'
                    || c == '\u{200D}'
                    || unicode_ident::is_xid_continue(c)
            }
            CharClass::AnsiWhitespace => matches!(c, ' ' | '\t' | '\r' | '\n'),
            // White_Space minus NEL, plus BOM
            CharClass::UnicodeWhitespace => {
                c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{85}')
            }
            CharClass::LineTerminator => matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'),
            _ => false,
        }
    }
}

/// Whether a raw (unescaped) string character is allowed under the
/// given permissions
pub fn raw_char_permitted(
    c: char,
    allow_control: bool,
    allow_private_use: bool,
    allow_non_characters: bool,
) -> bool {
    (allow_control || !CharClass::Control.contains_char(c))
        && (allow_private_use || !CharClass::PrivateUse.contains_char(c))
        && (allow_non_characters || !CharClass::NonCharacter.contains_char(c))
}
