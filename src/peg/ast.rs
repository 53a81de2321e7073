//! Parse results and errors
//!
//! - [`Parsed`] is a matched span with its semantic content.
//! - [`Failure`] is the "no match here" signal that drives backtracking.
//! - [`ParseError`] is what a caller sees when a parse cannot succeed.
//! - [`GrammarError`] reports malformed grammar wiring at build time.

use super::grammar::ProductionId;
use super::source::{Position, PositionError};
use super::source_location::SourcePosition;
use std::fmt;
use std::rc::Rc;

// ============================================================================
// Parsed spans
// ============================================================================

/// A diagnostic raised by a `Warn` production on an accepted match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Offset of the match that raised the warning
    pub position: usize,
    /// Human-readable message
    pub message: String,
}

impl Warning {
    /// Create a warning at `position`
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

/// A successfully matched region of the source
///
/// Invariant: `from <= to`, both in the same source.
#[derive(Debug, Clone)]
pub struct Parsed<'s, T, V> {
    pub(crate) from: Position<'s, T>,
    pub(crate) to: Position<'s, T>,
    pub(crate) content: V,
    pub(crate) warnings: Vec<Warning>,
    pub(crate) stalled: Option<Failure>,
}

impl<'s, T, V> Parsed<'s, T, V> {
    /// Create a span, checking that both ends share a source and are ordered
    pub fn new(from: Position<'s, T>, to: Position<'s, T>, content: V) -> Result<Self, PositionError> {
        if !from.same_source(&to) {
            return Err(PositionError::ForeignSource);
        }
        if to.offset() < from.offset() {
            return Err(PositionError::Inverted {
                from: from.offset(),
                to: to.offset(),
            });
        }
        Ok(Self::spanning(from, to, content))
    }

    #[inline]
    pub(crate) fn spanning(from: Position<'s, T>, to: Position<'s, T>, content: V) -> Self {
        Self {
            from,
            to,
            content,
            warnings: Vec::new(),
            stalled: None,
        }
    }

    /// Start of the span
    #[inline]
    pub fn from(&self) -> Position<'s, T> {
        self.from
    }

    /// End of the span (exclusive)
    #[inline]
    pub fn to(&self) -> Position<'s, T> {
        self.to
    }

    /// Semantic content
    #[inline]
    pub fn content(&self) -> &V {
        &self.content
    }

    /// Consume the span, keeping only its content
    #[inline]
    pub fn into_content(self) -> V {
        self.content
    }

    /// Warnings raised while matching this span
    #[inline]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// The furthest-reaching failure backtracked over inside this span
    ///
    /// A repetition or option that stops early still succeeds, but the
    /// failure that stopped it may lie beyond the span. An enclosing
    /// sequence that fails later reports this one instead when it got
    /// further.
    #[inline]
    pub fn stalled(&self) -> Option<&Failure> {
        self.stalled.as_ref()
    }

    /// Keep `failure` as the stall when it reaches further
    pub(crate) fn stall(&mut self, failure: Failure) {
        if self
            .stalled
            .as_ref()
            .map_or(true, |current| failure.furthest() > current.furthest())
        {
            self.stalled = Some(failure);
        }
    }

    /// Split into content and warnings
    pub fn into_parts(self) -> (V, Vec<Warning>) {
        (self.content, self.warnings)
    }

    /// Number of elements covered
    #[inline]
    pub fn len(&self) -> usize {
        self.to.offset() - self.from.offset()
    }

    /// Whether the span is zero-width
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The matched elements
    pub fn matched(&self) -> &'s [T] {
        self.from.slice(self.len())
    }

    /// Same span with different content
    pub fn with_content<U>(self, content: U) -> Parsed<'s, T, U> {
        Parsed {
            from: self.from,
            to: self.to,
            content,
            warnings: self.warnings,
            stalled: self.stalled,
        }
    }
}

// ============================================================================
// Failure signal
// ============================================================================

/// "No match for this production at this offset"
///
/// Failures form a chain: a composite that gives up records the failure
/// that made it give up as its cause. `furthest` is the largest offset any
/// failure in the chain was raised at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    production: ProductionId,
    position: usize,
    furthest: usize,
    cause: Option<Rc<Failure>>,
}

impl Failure {
    /// A failure with no underlying cause
    pub fn new(production: ProductionId, position: usize) -> Self {
        Self {
            production,
            position,
            furthest: position,
            cause: None,
        }
    }

    /// A failure attributed to `production` because `cause` failed
    pub fn caused(production: ProductionId, position: usize, cause: Failure) -> Self {
        Self {
            production,
            position,
            furthest: position.max(cause.furthest),
            cause: Some(Rc::new(cause)),
        }
    }

    /// Production that failed
    #[inline]
    pub fn production(&self) -> ProductionId {
        self.production
    }

    /// Offset at which the production was entered
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Deepest offset reached along the cause chain
    #[inline]
    pub fn furthest(&self) -> usize {
        self.furthest
    }

    /// The failure this one was caused by
    pub fn cause(&self) -> Option<&Failure> {
        self.cause.as_deref()
    }

    /// The innermost failure of the chain
    pub fn root_cause(&self) -> &Failure {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }

    /// The deepest failure in the chain that still has a cause
    ///
    /// This is the composite production that ultimately gave up, which
    /// makes a better diagnostic than the leaf token it was looking for.
    pub fn attributed(&self) -> &Failure {
        let mut current = self;
        while let Some(cause) = current.cause() {
            if cause.cause.is_none() {
                break;
            }
            current = cause;
        }
        current
    }

    /// Number of failures in the chain, this one included
    pub fn depth(&self) -> usize {
        1 + self.cause().map_or(0, Failure::depth)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Malformed grammar wiring, detected while building
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A literal must match at least one element
    EmptyLiteral,
    /// Sequence, choice or regroup with fewer than two members
    TooFewItems {
        /// Combinator kind
        kind: &'static str,
        /// Display name given to the combinator
        name: String,
        /// Number of members supplied
        count: usize,
    },
    /// The id does not belong to this builder
    UnknownProduction {
        /// Offending id
        id: ProductionId,
    },
    /// `bind` called on a production that is not late bound
    NotLateBound {
        /// Offending id
        id: ProductionId,
    },
    /// A late-bound production was bound a second time
    AlreadyBound {
        /// Offending id
        id: ProductionId,
    },
    /// A reachable late-bound production was never bound
    Unbound {
        /// Offending id
        id: ProductionId,
    },
    /// Two distinct reachable productions share a display name
    DuplicateName {
        /// The shared name
        name: String,
    },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::EmptyLiteral => write!(f, "empty literal; use an empty production"),
            GrammarError::TooFewItems { kind, name, count } => {
                write!(f, "{} '{}' needs at least 2 members, got {}", kind, name, count)
            }
            GrammarError::UnknownProduction { id } => write!(f, "unknown production {}", id),
            GrammarError::NotLateBound { id } => {
                write!(f, "production {} is not late bound", id)
            }
            GrammarError::AlreadyBound { id } => {
                write!(f, "late-bound production {} is already bound", id)
            }
            GrammarError::Unbound { id } => {
                write!(f, "late-bound production {} was never bound", id)
            }
            GrammarError::DuplicateName { name } => {
                write!(f, "two distinct productions are named '{}'", name)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// Error returned by a parse call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The root production did not match
    NoMatch {
        /// Name of the production that gave up
        production: String,
        /// Offset at which that production was entered
        position: usize,
        /// Name of the innermost production that failed
        expected: String,
        /// Offset where the innermost failure happened
        furthest: usize,
    },

    /// Input exceeds maximum allowed size
    InputTooLarge {
        /// Size of the input in elements
        input_size: usize,
        /// Maximum allowed size
        max_size: usize,
    },

    /// Nesting through late-bound productions went too deep
    RecursionLimitExceeded {
        /// Depth reached
        depth: usize,
        /// Maximum allowed depth
        max_depth: usize,
    },

    /// The grammar could not be built
    InvalidGrammar(GrammarError),

    /// Internal misuse of positions
    Position(PositionError),

    /// Configuration could not be loaded
    Config {
        /// Reason the configuration was rejected
        reason: String,
    },
}

impl ParseError {
    /// Offset most relevant to the error, if it has one
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::NoMatch { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Add line/column information to the error message
    pub fn format_with_position(&self, input: &str) -> String {
        match self {
            ParseError::NoMatch {
                production,
                position,
                expected,
                furthest,
            } => {
                let at = SourcePosition::from_offset(input, *position);
                let deepest = SourcePosition::from_offset(input, *furthest);
                format!(
                    "{} not found at {} (offset {}); expected {} at {}\n{}",
                    production,
                    at,
                    position,
                    expected,
                    deepest,
                    deepest.line_text(input)
                )
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NoMatch {
                production,
                position,
                expected,
                furthest,
            } => write!(
                f,
                "{} not found at {} (expected {} at {})",
                production, position, expected, furthest
            ),
            ParseError::InputTooLarge {
                input_size,
                max_size,
            } => write!(
                f,
                "Input too large: {} elements exceeds limit of {}",
                input_size, max_size
            ),
            ParseError::RecursionLimitExceeded { depth, max_depth } => write!(
                f,
                "Recursion limit exceeded: depth {} exceeds limit of {}",
                depth, max_depth
            ),
            ParseError::InvalidGrammar(err) => write!(f, "Invalid grammar: {}", err),
            ParseError::Position(err) => write!(f, "Position error: {}", err),
            ParseError::Config { reason } => write!(f, "Invalid configuration: {}", reason),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::InvalidGrammar(err) => Some(err),
            ParseError::Position(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GrammarError> for ParseError {
    fn from(err: GrammarError) -> Self {
        ParseError::InvalidGrammar(err)
    }
}

impl From<PositionError> for ParseError {
    fn from(err: PositionError) -> Self {
        ParseError::Position(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peg::source::Source;

    fn id(n: usize) -> ProductionId {
        ProductionId::from_index(n)
    }

    #[test]
    fn test_parsed_new_checks_order() {
        let source = Source::from("abc");
        let a = source.at(1).unwrap();
        let b = source.at(2).unwrap();
        assert!(Parsed::new(a, b, ()).is_ok());
        assert!(Parsed::new(b, a, ()).is_err());

        let other = Source::from("abc");
        assert_eq!(
            Parsed::new(a, other.at(2).unwrap(), ()).unwrap_err(),
            PositionError::ForeignSource
        );
    }

    #[test]
    fn test_with_content_keeps_span() {
        let source = Source::from("hello");
        let parsed = Parsed::new(source.at(1).unwrap(), source.at(4).unwrap(), 1).unwrap();
        let mapped = parsed.with_content("ell");
        assert_eq!(mapped.from().offset(), 1);
        assert_eq!(mapped.to().offset(), 4);
        assert_eq!(mapped.matched(), &['e', 'l', 'l']);
        assert_eq!(*mapped.content(), "ell");
    }

    #[test]
    fn test_failure_chain() {
        let leaf = Failure::new(id(3), 7);
        let mid = Failure::caused(id(2), 2, leaf.clone());
        let top = Failure::caused(id(1), 0, mid);

        assert_eq!(top.furthest(), 7);
        assert_eq!(top.depth(), 3);
        assert_eq!(top.root_cause(), &leaf);
        assert_eq!(top.attributed().production(), id(2));
        assert_eq!(leaf.attributed().production(), id(3));
    }

    #[test]
    fn test_format_with_position() {
        let err = ParseError::NoMatch {
            production: "Object".into(),
            position: 0,
            expected: "Literal \"}\"".into(),
            furthest: 4,
        };
        let text = err.format_with_position("{\n  x");
        assert!(text.contains("line 1, column 1"));
        assert!(text.contains("line 2, column 3"));
    }

    #[test]
    fn test_error_source() {
        use std::error::Error;
        let err = ParseError::from(GrammarError::EmptyLiteral);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Invalid grammar"));
    }
}
