//! JSON and JSON5 dialects
//!
//! # Module Organization
//!
//! ## Configuration
//! - [`ParseFlags`] - Dialect options and the two presets
//!
//! ## Parsing
//! - [`Dialect`] - Grammar built from a flag set
//! - [`parse`] / [`parse_json5`] / [`parser`] - Entry points
//! - [`parse_batch`] - Many documents at once
//!
//! ## Output
//! - [`Value`] / [`Map`] - Parsed documents
//!
//! ## Building Blocks
//! - [`char_class`] - Unicode predicates
//! - [`number`] - Numeric literal reconstruction
//! - [`grammar`] - Production graph assembly

// ============================================================================
// Module Declarations
// ============================================================================

pub mod char_class;
pub mod dialect;
pub mod flags;
pub mod grammar;
pub mod number;
pub mod parallel;
pub mod value;

// ============================================================================
// Configuration
// ============================================================================

pub use flags::{EscapeLevel, ParseFlags, WhitespaceLevel};

// ============================================================================
// Parsing
// ============================================================================

pub use dialect::{dialect, parse, parse_json5, parser, Dialect};
pub use grammar::{build_grammar, Syntax};
pub use parallel::{parse_batch, parse_batch_owned};

// ============================================================================
// Output
// ============================================================================

pub use number::{Digits, NumberLiteral, MAX_EXACT_SCALE};
pub use value::{Map, Value};
