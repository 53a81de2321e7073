//! pegjson - Packrat PEG combinators with a flag-driven JSON/JSON5 grammar
//!
//! This crate has two layers:
//! - [`peg`]: a generic packrat PEG engine. Grammars are production graphs
//!   built with [`GrammarBuilder`] and evaluated with per-call memoization,
//!   ordered choice, lookahead, late binding for recursion and
//!   production-level failure attribution.
//! - [`json`]: a JSON dialect family built on that engine. [`ParseFlags`]
//!   toggles comments, extra escapes, single quotes, unquoted keys,
//!   trailing commas, whitespace sets, extended numbers, character-class
//!   permissions and exact integer output.
//!
//! ## Quick Start
//!
//! ```rust
//! use pegjson::json::{parse, parse_json5, Value};
//!
//! let doc = parse(r#"{"a": 1, "b": [true, null]}"#).unwrap();
//! assert_eq!(doc.get("a"), Some(&Value::Number(1.0)));
//!
//! let relaxed = parse_json5("{a: 'x', b: [0x10, .5,], // done\n}").unwrap();
//! assert_eq!(relaxed.get("a").and_then(Value::as_str), Some("x"));
//! ```
//!
//! ## Building a Grammar
//!
//! ```rust
//! use pegjson::peg::GrammarBuilder;
//!
//! let mut b: GrammarBuilder<char, String> = GrammarBuilder::new();
//! let digit = b.text("1").unwrap();
//! let digits = b.plus(digit);
//! let eof = b.eof();
//! let root = b.sequence("Ones", vec![digits, eof]).unwrap();
//! let grammar = b.build(root).unwrap();
//!
//! assert_eq!(grammar.parse_str("111").unwrap(), "111");
//! assert!(grammar.parse_str("112").is_err());
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug logging using the `log` crate
//! - `parallel` - Parse document batches on rayon's thread pool

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]
// Allow some pedantic lints that are too noisy
#![allow(clippy::module_inception)]
#![allow(clippy::redundant_closure)]

// Prelude module for convenient imports
pub mod prelude;

// Packrat engine
pub mod peg;

// JSON dialects on top of the engine
pub mod json;

/// Re-export commonly used types for convenience
pub use peg::{
    // Debug tools
    debug::{ParseTrace, TraceAction},
    // Errors
    ast::{Failure, GrammarError, ParseError, Warning},
    // Construction
    parser_dsl::GrammarBuilder,
    // Evaluation
    parser::{ParseContext, ParserConfig},
    Grammar,
    ProductionId,
    Source,
};

pub use json::{parse, parse_json5, parser, Dialect, ParseFlags, Value};
