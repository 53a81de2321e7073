//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from pegjson.
//! Importing this module with a wildcard import brings the core types into scope:
//!
//! ```
//! use pegjson::prelude::*;
//!
//! let value = parse("[1]").unwrap();
//! assert_eq!(value, Value::Array(vec![Value::Number(1.0)]));
//! ```
//!
//! # Re-exported Items
//!
//! ## Engine
//! - [`GrammarBuilder`] - Combinator factory
//! - [`Grammar`] - Validated production graph
//! - [`ParseContext`] - One parse call
//! - [`ParserConfig`] - Resource limits, memoization and tracing
//! - [`Source`] - Input sequence
//! - [`Content`] / [`Element`] - Traits for content and input types
//!
//! ## Errors
//! - [`ParseError`] - Error returned by parse calls
//! - [`GrammarError`] - Grammar construction error
//!
//! ## JSON
//! - [`parse()`] / [`parse_json5()`] / [`parser()`] - Entry points
//! - [`ParseFlags`] - Dialect options
//! - [`Value`] - Parsed document

// ============================================================================
// Engine
// ============================================================================

pub use crate::peg::{
    Content, Element, Grammar, GrammarBuilder, ParseContext, ParserConfig, ProductionId, Source,
};

// ============================================================================
// Errors
// ============================================================================

pub use crate::peg::{GrammarError, ParseError};

// ============================================================================
// JSON
// ============================================================================

pub use crate::json::{parse, parse_json5, parser, Dialect, EscapeLevel, ParseFlags, Value, WhitespaceLevel};
