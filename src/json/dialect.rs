//! Dialects and the preset registry
//!
//! A [`Dialect`] pairs a [`ParseFlags`] value with the grammar built from
//! it. Building a grammar walks the whole production graph, so the two
//! presets are built once per process on first use and shared through a
//! static registry. [`parser`] hands out the shared preset whenever the
//! requested flags equal one of them and builds a fresh dialect otherwise.
//!
//! # Example
//!
//! ```rust
//! use pegjson::json::{parse, parse_json5, parser, ParseFlags, Value};
//!
//! assert_eq!(parse("[1, 2]").unwrap(), Value::from(vec![Value::from(1.0), Value::from(2.0)]));
//! assert!(parse("[1, 2,]").is_err());
//! assert!(parse_json5("[1, 2,]").is_ok());
//!
//! let lenient = parser(ParseFlags::standard().with_trailing_commas(true)).unwrap();
//! assert!(lenient("[1, 2,]").is_ok());
//! ```

use super::flags::ParseFlags;
use super::grammar::{build_grammar, Syntax};
use super::value::Value;
use crate::peg::parser::log_debug;
use crate::peg::{
    Grammar, GrammarError, ParseContext, ParseError, ParseTrace, Parsed, ParserConfig, Source,
    Warning,
};
use std::sync::{Arc, OnceLock};

/// A dialect grammar ready to parse documents
///
/// Immutable after construction; share it freely across threads.
#[derive(Debug)]
pub struct Dialect {
    flags: ParseFlags,
    grammar: Grammar<char, Syntax>,
}

impl Dialect {
    /// Build the grammar for `flags`
    pub fn new(flags: ParseFlags) -> Result<Self, GrammarError> {
        let grammar = build_grammar(flags)?;
        Ok(Self { flags, grammar })
    }

    /// Flags this dialect was built from
    pub fn flags(&self) -> &ParseFlags {
        &self.flags
    }

    /// Underlying grammar
    pub fn grammar(&self) -> &Grammar<char, Syntax> {
        &self.grammar
    }

    /// Parse a document
    pub fn parse(&self, text: &str) -> Result<Value, ParseError> {
        self.parse_with_config(text, ParserConfig::default())
            .map(|(value, _)| value)
    }

    /// Parse a document, also returning warnings such as duplicate keys
    pub fn parse_with_warnings(&self, text: &str) -> Result<(Value, Vec<Warning>), ParseError> {
        self.parse_with_config(text, ParserConfig::default())
    }

    /// Parse a document with explicit resource limits
    pub fn parse_with_config(
        &self,
        text: &str,
        config: ParserConfig,
    ) -> Result<(Value, Vec<Warning>), ParseError> {
        let source = Source::from(text);
        let mut ctx = ParseContext::with_config(&self.grammar, &source, config);
        let (content, warnings) = ctx.parse().map(Parsed::into_parts)?;
        Ok((content.into_value(), warnings))
    }

    /// Parse a document and record the call tree
    pub fn parse_traced(&self, text: &str) -> (Result<Value, ParseError>, ParseTrace) {
        let source = Source::from(text);
        let config = ParserConfig::default().with_trace(true);
        let mut ctx = ParseContext::with_config(&self.grammar, &source, config);
        let result = ctx
            .parse()
            .map(|parsed| parsed.into_content().into_value());
        (result, ctx.take_trace().unwrap_or_default())
    }
}

// ============================================================================
// Preset registry
// ============================================================================

struct Presets {
    standard: Arc<Dialect>,
    json5: Arc<Dialect>,
}

static PRESETS: OnceLock<Result<Presets, GrammarError>> = OnceLock::new();

fn presets() -> Result<&'static Presets, GrammarError> {
    PRESETS
        .get_or_init(|| {
            log_debug!("Building preset dialects");
            Ok(Presets {
                standard: Arc::new(Dialect::new(ParseFlags::standard())?),
                json5: Arc::new(Dialect::new(ParseFlags::json5())?),
            })
        })
        .as_ref()
        .map_err(Clone::clone)
}

/// Dialect for `flags`, shared with the registry when it is a preset
pub fn dialect(flags: ParseFlags) -> Result<Arc<Dialect>, GrammarError> {
    let presets = presets()?;
    if flags == ParseFlags::standard() {
        Ok(Arc::clone(&presets.standard))
    } else if flags == ParseFlags::json5() {
        Ok(Arc::clone(&presets.json5))
    } else {
        log_debug!("Building custom dialect {}", flags.to_json());
        Dialect::new(flags).map(Arc::new)
    }
}

/// Parsing function bound to `flags`
pub fn parser(
    flags: ParseFlags,
) -> Result<impl Fn(&str) -> Result<Value, ParseError> + Send + Sync, GrammarError> {
    let dialect = dialect(flags)?;
    Ok(move |text: &str| dialect.parse(text))
}

/// Parse standard JSON
pub fn parse(text: &str) -> Result<Value, ParseError> {
    presets()?.standard.parse(text)
}

/// Parse JSON5
pub fn parse_json5(text: &str) -> Result<Value, ParseError> {
    presets()?.json5.parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_shared() {
        let a = dialect(ParseFlags::standard()).unwrap();
        let b = dialect(ParseFlags::default()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let c = dialect(ParseFlags::json5()).unwrap();
        assert!(Arc::ptr_eq(&c, &dialect(ParseFlags::json5()).unwrap()));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_custom_flags_build_fresh() {
        let flags = ParseFlags::standard().with_comments(true);
        let a = dialect(flags).unwrap();
        let b = dialect(flags).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.flags(), &flags);
    }

    #[test]
    fn test_parser_closure() {
        let parse_commented = parser(ParseFlags::standard().with_comments(true)).unwrap();
        assert_eq!(parse_commented("/* x */ true").unwrap(), Value::Bool(true));
        assert!(parse("/* x */ true").is_err());
    }

    #[test]
    fn test_warnings() {
        let dialect = Dialect::new(ParseFlags::standard()).unwrap();
        let (value, warnings) = dialect
            .parse_with_warnings(r#"{"a": {"b": 1, "b": 2}, "c": 3}"#)
            .unwrap();
        assert_eq!(value.get("a").and_then(|a| a.get("b")), Some(&Value::Number(2.0)));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].position, 6);

        let (_, warnings) = dialect.parse_with_warnings(r#"{"a": 1}"#).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_nesting_limit() {
        let dialect = Dialect::new(ParseFlags::standard()).unwrap();
        let deep = format!("{}{}", "[".repeat(10), "]".repeat(10));
        assert!(dialect.parse(&deep).is_ok());
        let config = ParserConfig::default().with_max_recursion_depth(5);
        assert!(matches!(
            dialect.parse_with_config(&deep, config),
            Err(ParseError::RecursionLimitExceeded { max_depth: 5, .. })
        ));
    }

    #[test]
    fn test_trace() {
        let dialect = Dialect::new(ParseFlags::standard()).unwrap();
        let (result, trace) = dialect.parse_traced("[]");
        assert!(result.is_ok());
        assert!(!trace.is_empty());
        assert!(trace.format(dialect.grammar()).contains("Document @0: match 0..2"));
    }
}
