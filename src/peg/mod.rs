//! Packrat PEG engine
//!
//! # Module Organization
//!
//! ## Core Types
//! - [`Source`] / [`Position`] - Input view and cursor
//! - [`Parsed`] - Matched span with content
//! - [`Grammar`] - Validated production graph
//! - [`ParseContext`] - State of one parse call
//!
//! ## Grammar Construction
//! - [`parser_dsl`] - Combinator factory ([`GrammarBuilder`])
//!
//! ## Caching
//! - [`Memory`] - Per-call memo table
//!
//! ## Debugging
//! - [`debug`] - Call-tree tracing
//! - [`source_location`] - Line/column tracking

// ============================================================================
// Module Declarations
// ============================================================================

pub mod ast;
pub mod cache;
pub mod debug;
pub mod grammar;
pub mod parser;
pub mod parser_dsl;
pub mod source;
pub mod source_location;

// ============================================================================
// Core Types
// ============================================================================

pub use ast::{Failure, GrammarError, ParseError, Parsed, Warning};
pub use grammar::{Content, Element, Grammar, Production, ProductionId};
pub use parser::{
    ParseContext, ParserConfig, DEFAULT_MAX_INPUT_SIZE, DEFAULT_MAX_RECURSION_DEPTH,
};
pub use source::{Position, PositionError, Source};

// ============================================================================
// Grammar Construction
// ============================================================================

pub use parser_dsl::GrammarBuilder;

// ============================================================================
// Caching
// ============================================================================

pub use cache::{CacheStats, Memory};

// ============================================================================
// Debugging
// ============================================================================

pub use debug::{ParseTrace, TraceAction, TraceEntry};
pub use source_location::SourcePosition;
