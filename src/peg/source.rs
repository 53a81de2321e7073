//! Input sources and positions
//!
//! A [`Source`] is an immutable view over the input elements of one parse
//! call. A [`Position`] is a cursor into exactly one source; positions from
//! different sources are never compared with each other.
//!
//! Offsets count elements, not bytes: for text input a `Source<char>` is
//! built from the decoded characters, so offset `n` is the `n`th char.

use std::cmp::Ordering;
use std::fmt;
use std::ptr;

/// Errors raised by position arithmetic on internal misuse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    /// Offset lies outside `0..=length`
    OutOfRange {
        /// Requested offset
        offset: usize,
        /// Length of the source
        length: usize,
    },
    /// Two positions belong to different sources
    ForeignSource,
    /// A span was requested with its end before its start
    Inverted {
        /// Start offset
        from: usize,
        /// End offset
        to: usize,
    },
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionError::OutOfRange { offset, length } => {
                write!(f, "offset {} out of range 0..={}", offset, length)
            }
            PositionError::ForeignSource => {
                write!(f, "positions belong to different sources")
            }
            PositionError::Inverted { from, to } => {
                write!(f, "span end {} precedes start {}", to, from)
            }
        }
    }
}

impl std::error::Error for PositionError {}

/// Immutable input for a single parse call
#[derive(Debug, Clone, PartialEq)]
pub struct Source<T> {
    raw: Box<[T]>,
}

impl<T> Source<T> {
    /// Create a source that owns the given elements
    pub fn new(raw: Vec<T>) -> Self {
        Self {
            raw: raw.into_boxed_slice(),
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the source has no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The underlying elements
    #[inline]
    pub fn raw(&self) -> &[T] {
        &self.raw
    }

    /// Position at offset 0
    #[inline]
    pub fn start(&self) -> Position<'_, T> {
        Position {
            source: self,
            offset: 0,
        }
    }

    /// Position at `offset`, failing if it lies outside `0..=len`
    pub fn at(&self, offset: usize) -> Result<Position<'_, T>, PositionError> {
        if offset > self.raw.len() {
            return Err(PositionError::OutOfRange {
                offset,
                length: self.raw.len(),
            });
        }
        Ok(Position {
            source: self,
            offset,
        })
    }
}

impl<T: Clone> Source<T> {
    /// Create a source by copying a slice
    pub fn from_slice(items: &[T]) -> Self {
        Self::new(items.to_vec())
    }
}

impl From<&str> for Source<char> {
    fn from(text: &str) -> Self {
        Self::new(text.chars().collect())
    }
}

impl From<&[u8]> for Source<u8> {
    fn from(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}

/// A cursor into a [`Source`]
pub struct Position<'s, T> {
    source: &'s Source<T>,
    offset: usize,
}

// Manual impls: a position is copyable regardless of `T`.
impl<T> Clone for Position<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Position<'_, T> {}

impl<'s, T> Position<'s, T> {
    /// Zero-based element offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The source this position points into
    #[inline]
    pub fn source(&self) -> &'s Source<T> {
        self.source
    }

    /// Whether this is the start of the source
    #[inline]
    pub fn begin(&self) -> bool {
        self.offset == 0
    }

    /// Whether this is the end of the source
    #[inline]
    pub fn end(&self) -> bool {
        self.offset == self.source.len()
    }

    /// Number of elements left after this position
    #[inline]
    pub fn remaining(&self) -> usize {
        self.source.len() - self.offset
    }

    /// Position `n` elements away, clamped into `0..=len`
    pub fn moved(&self, n: isize) -> Self {
        let offset = if n < 0 {
            self.offset.saturating_sub(n.unsigned_abs())
        } else {
            self.offset.saturating_add(n as usize).min(self.source.len())
        };
        Self {
            source: self.source,
            offset,
        }
    }

    /// Position `n` elements further on, clamped to the end
    #[inline]
    pub fn advanced(&self, n: usize) -> Self {
        Self {
            source: self.source,
            offset: self.offset.saturating_add(n).min(self.source.len()),
        }
    }

    /// Elements between this position and its advance by `length`
    pub fn slice(&self, length: usize) -> &'s [T] {
        let end = self.offset.saturating_add(length).min(self.source.len());
        &self.source.raw[self.offset..end]
    }

    /// Element at this position, if any
    #[inline]
    pub fn item(&self) -> Option<&'s T> {
        self.source.raw.get(self.offset)
    }

    /// Whether both positions point into the same source
    #[inline]
    pub fn same_source(&self, other: &Position<'_, T>) -> bool {
        ptr::eq(self.source, other.source)
    }

    /// Compare offsets, failing fast across sources
    pub fn checked_cmp(&self, other: &Position<'_, T>) -> Result<Ordering, PositionError> {
        if !self.same_source(other) {
            return Err(PositionError::ForeignSource);
        }
        Ok(self.offset.cmp(&other.offset))
    }

    /// Elements from this position up to `to`
    pub fn span_to(&self, to: &Position<'s, T>) -> Result<&'s [T], PositionError> {
        if !self.same_source(to) {
            return Err(PositionError::ForeignSource);
        }
        if to.offset < self.offset {
            return Err(PositionError::Inverted {
                from: self.offset,
                to: to.offset,
            });
        }
        Ok(&self.source.raw[self.offset..to.offset])
    }
}

impl<T> PartialEq for Position<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.same_source(other) && self.offset == other.offset
    }
}

impl<T> fmt::Debug for Position<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({}/{})", self.offset, self.source.len())
    }
}

impl<T> fmt::Display for Position<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.offset)
    }
}
