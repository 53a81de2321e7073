//! Dialect flags
//!
//! [`ParseFlags`] selects which extensions to standard JSON a dialect
//! grammar accepts. Values are immutable: every `with_*` method returns an
//! updated copy. Two presets cover the common cases:
//!
//! | Flag | `standard()` | `json5()` |
//! |---|---|---|
//! | comments | off | on |
//! | escapes | [`EscapeLevel::Standard`] | [`EscapeLevel::Any`] |
//! | single-quoted strings | off | on |
//! | unquoted keys | off | on |
//! | trailing commas | off | on |
//! | whitespace | [`WhitespaceLevel::Ansi`] | [`WhitespaceLevel::Unicode`] |
//! | extended numbers | off | on |
//! | control / surrogate / private-use / non-character | off | on |
//! | exact integers | off | off |
//!
//! Flags can also be loaded from JSON; missing fields take the
//! `standard()` value:
//!
//! ```rust
//! use pegjson::json::{EscapeLevel, ParseFlags};
//!
//! let flags = ParseFlags::from_json(r#"{"comments": true, "escapes": "extended"}"#).unwrap();
//! assert!(flags.comments());
//! assert_eq!(flags.escapes(), EscapeLevel::Extended);
//! assert!(!flags.trailing_commas());
//! ```

use crate::peg::ParseError;
use serde::{Deserialize, Serialize};

/// Which backslash escapes strings accept; each level includes the ones
/// below it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeLevel {
    /// `\" \\ \/ \b \f \n \r \t \uXXXX`
    Standard,
    /// Adds `\'`
    SingleQuote,
    /// Adds `\xXX`, `\u{...}`, `\v`, `\0` and line continuations
    Extended,
    /// Adds any other character escaping itself
    Any,
}

impl EscapeLevel {
    /// Level from its ordinal, `0..=3`
    pub fn from_ordinal(level: u8) -> Option<Self> {
        match level {
            0 => Some(EscapeLevel::Standard),
            1 => Some(EscapeLevel::SingleQuote),
            2 => Some(EscapeLevel::Extended),
            3 => Some(EscapeLevel::Any),
            _ => None,
        }
    }

    /// Ordinal of the level
    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

/// Which characters count as insignificant whitespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitespaceLevel {
    /// None at all
    None,
    /// Space, tab, CR, LF
    Ansi,
    /// ECMAScript whitespace and line terminators
    Unicode,
}

impl WhitespaceLevel {
    /// Level from its ordinal, `0..=2`
    pub fn from_ordinal(level: u8) -> Option<Self> {
        match level {
            0 => Some(WhitespaceLevel::None),
            1 => Some(WhitespaceLevel::Ansi),
            2 => Some(WhitespaceLevel::Unicode),
            _ => None,
        }
    }

    /// Ordinal of the level
    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

/// Immutable set of dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseFlags {
    comments: bool,
    escapes: EscapeLevel,
    single_quotes: bool,
    unquoted_keys: bool,
    trailing_commas: bool,
    whitespace: WhitespaceLevel,
    extended_numbers: bool,
    allow_control: bool,
    allow_surrogates: bool,
    allow_private_use: bool,
    allow_non_characters: bool,
    exact_integers: bool,
}

impl Default for ParseFlags {
    fn default() -> Self {
        Self::standard()
    }
}

impl ParseFlags {
    /// Strict JSON: no extensions, ANSI whitespace
    pub const fn standard() -> Self {
        Self {
            comments: false,
            escapes: EscapeLevel::Standard,
            single_quotes: false,
            unquoted_keys: false,
            trailing_commas: false,
            whitespace: WhitespaceLevel::Ansi,
            extended_numbers: false,
            allow_control: false,
            allow_surrogates: false,
            allow_private_use: false,
            allow_non_characters: false,
            exact_integers: false,
        }
    }

    /// Every extension on
    pub const fn json5() -> Self {
        Self {
            comments: true,
            escapes: EscapeLevel::Any,
            single_quotes: true,
            unquoted_keys: true,
            trailing_commas: true,
            whitespace: WhitespaceLevel::Unicode,
            extended_numbers: true,
            allow_control: true,
            allow_surrogates: true,
            allow_private_use: true,
            allow_non_characters: true,
            exact_integers: false,
        }
    }

    /// Load flags from a JSON object; absent fields keep `standard()` values
    pub fn from_json(text: &str) -> Result<Self, ParseError> {
        serde_json::from_str(text).map_err(|err| ParseError::Config {
            reason: err.to_string(),
        })
    }

    /// Serialize to a JSON object
    pub fn to_json(&self) -> String {
        // Plain struct of bools and unit enums; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// `//` and `/* */` comments
    pub fn comments(&self) -> bool {
        self.comments
    }

    /// Accepted escape sequences
    pub fn escapes(&self) -> EscapeLevel {
        self.escapes
    }

    /// `'...'` strings
    pub fn single_quotes(&self) -> bool {
        self.single_quotes
    }

    /// Identifier object keys
    pub fn unquoted_keys(&self) -> bool {
        self.unquoted_keys
    }

    /// One trailing comma in objects and arrays
    pub fn trailing_commas(&self) -> bool {
        self.trailing_commas
    }

    /// Recognized whitespace
    pub fn whitespace(&self) -> WhitespaceLevel {
        self.whitespace
    }

    /// Hex, leading/trailing dot, `+` sign, `Infinity`, `NaN`
    pub fn extended_numbers(&self) -> bool {
        self.extended_numbers
    }

    /// Raw C0 control characters (U+0000..=U+001F) inside strings
    pub fn allow_control(&self) -> bool {
        self.allow_control
    }

    /// Unpaired surrogate escapes (decoded as U+FFFD)
    pub fn allow_surrogates(&self) -> bool {
        self.allow_surrogates
    }

    /// Private-use code points inside strings
    pub fn allow_private_use(&self) -> bool {
        self.allow_private_use
    }

    /// Non-character code points inside strings
    pub fn allow_non_characters(&self) -> bool {
        self.allow_non_characters
    }

    /// Integral numbers as exact big integers
    pub fn exact_integers(&self) -> bool {
        self.exact_integers
    }

    /// Copy with `comments` set
    pub fn with_comments(mut self, on: bool) -> Self {
        self.comments = on;
        self
    }

    /// Copy with `escapes` set
    pub fn with_escapes(mut self, level: EscapeLevel) -> Self {
        self.escapes = level;
        self
    }

    /// Copy with `single_quotes` set
    pub fn with_single_quotes(mut self, on: bool) -> Self {
        self.single_quotes = on;
        self
    }

    /// Copy with `unquoted_keys` set
    pub fn with_unquoted_keys(mut self, on: bool) -> Self {
        self.unquoted_keys = on;
        self
    }

    /// Copy with `trailing_commas` set
    pub fn with_trailing_commas(mut self, on: bool) -> Self {
        self.trailing_commas = on;
        self
    }

    /// Copy with `whitespace` set
    pub fn with_whitespace(mut self, level: WhitespaceLevel) -> Self {
        self.whitespace = level;
        self
    }

    /// Copy with `extended_numbers` set
    pub fn with_extended_numbers(mut self, on: bool) -> Self {
        self.extended_numbers = on;
        self
    }

    /// Copy with `allow_control` set
    pub fn with_allow_control(mut self, on: bool) -> Self {
        self.allow_control = on;
        self
    }

    /// Copy with `allow_surrogates` set
    pub fn with_allow_surrogates(mut self, on: bool) -> Self {
        self.allow_surrogates = on;
        self
    }

    /// Copy with `allow_private_use` set
    pub fn with_allow_private_use(mut self, on: bool) -> Self {
        self.allow_private_use = on;
        self
    }

    /// Copy with `allow_non_characters` set
    pub fn with_allow_non_characters(mut self, on: bool) -> Self {
        self.allow_non_characters = on;
        self
    }

    /// Copy with `exact_integers` set
    pub fn with_exact_integers(mut self, on: bool) -> Self {
        self.exact_integers = on;
        self
    }
}
