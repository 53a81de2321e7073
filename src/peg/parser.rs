//! Packrat evaluator
//!
//! [`ParseContext`] runs a [`Grammar`] over one [`Source`]. Every attempt
//! goes through [`ParseContext::apply`], which
//!
//! 1. answers memoized productions from the [`Memory`] when it can,
//! 2. otherwise dispatches on the production kind,
//! 3. re-attributes a failure that escaped from a child to the production
//!    itself at its entry offset, keeping the child as the cause,
//! 4. stores the outcome for memoized productions.
//!
//! Failures are ordinary `Err` values that only Star, Plus, Choice, Opt,
//! HasNot, Alternation and Regroup look at. Those that swallow a failure
//! and still succeed keep it on the result as a stall; a Sequence that
//! fails afterwards reports the stall instead when it reached further, so
//! the error points at the real break rather than at the closing token.
//! Resource-limit violations use a separate abort path that no combinator
//! intercepts.

use super::ast::{Failure, GrammarError, ParseError, Parsed, Warning};
use super::cache::{CacheStats, Memory};
use super::debug::{ParseTrace, TraceAction, TraceRecorder};
use super::grammar::{Content, Element, Grammar, Production, ProductionId};
use super::source::{Position, PositionError, Source};

/// Logging macros - no-op when logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Logging macros - use log crate when logging feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

pub(crate) use log_debug;

/// Default maximum input size (100M elements)
pub const DEFAULT_MAX_INPUT_SIZE: usize = 100 * 1024 * 1024;

/// Default maximum nesting through late-bound productions
///
/// Each level costs several native stack frames, so this stays well
/// inside a 2 MiB thread stack even in debug builds.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 128;

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of input elements
    pub max_input_size: usize,
    /// Maximum nesting through late-bound productions
    pub max_recursion_depth: usize,
    /// Use the memo table
    pub memoize: bool,
    /// Record a call tree
    pub trace: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            memoize: true,
            trace: false,
        }
    }
}

impl ParserConfig {
    /// Create a new config with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum input size
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// Set maximum nesting depth
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Turn the memo table on or off
    pub fn with_memoization(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Turn call-tree recording on or off
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// Why an attempt produced no span
#[derive(Debug)]
pub(crate) enum Fault {
    /// No match; combinators may backtrack
    Failure(Failure),
    /// Fatal for the whole parse
    Abort(ParseError),
}

impl From<ParseError> for Fault {
    fn from(err: ParseError) -> Self {
        Fault::Abort(err)
    }
}

type Outcome<'s, T, V> = Result<Parsed<'s, T, V>, Fault>;

/// State of one parse call
pub struct ParseContext<'g, 's, T, V> {
    grammar: &'g Grammar<T, V>,
    source: &'s Source<T>,
    memory: Memory<'s, T, V>,
    config: ParserConfig,
    depth: usize,
    trace: Option<TraceRecorder>,
}

impl<'g, 's, T: Element, V: Content<T>> ParseContext<'g, 's, T, V> {
    /// Context with the default configuration
    pub fn new(grammar: &'g Grammar<T, V>, source: &'s Source<T>) -> Self {
        Self::with_config(grammar, source, ParserConfig::default())
    }

    /// Context with an explicit configuration
    pub fn with_config(
        grammar: &'g Grammar<T, V>,
        source: &'s Source<T>,
        config: ParserConfig,
    ) -> Self {
        let trace = config.trace.then(TraceRecorder::default);
        Self {
            grammar,
            source,
            memory: Memory::new(source),
            config,
            depth: 0,
            trace,
        }
    }

    /// Run the grammar's root at offset 0
    pub fn parse(&mut self) -> Result<Parsed<'s, T, V>, ParseError> {
        let root = self.grammar.root();
        self.parse_at(root, self.source.start())
    }

    /// Run one production at a given position
    pub fn parse_at(
        &mut self,
        production: ProductionId,
        pos: Position<'s, T>,
    ) -> Result<Parsed<'s, T, V>, ParseError> {
        if self.source.len() > self.config.max_input_size {
            return Err(ParseError::InputTooLarge {
                input_size: self.source.len(),
                max_size: self.config.max_input_size,
            });
        }
        if !pos.same_source(&self.source.start()) {
            return Err(PositionError::ForeignSource.into());
        }

        log_debug!(
            "Parsing {} elements from {} with {}",
            self.source.len(),
            pos.offset(),
            self.grammar.name(production)
        );

        let result = match self.apply(production, pos) {
            Ok(parsed) => Ok(parsed),
            Err(Fault::Failure(failure)) => Err(self.no_match(&failure)),
            Err(Fault::Abort(err)) => Err(err),
        };

        log_debug!(
            "Parse {}: {:?}",
            if result.is_ok() { "succeeded" } else { "failed" },
            self.memory.stats()
        );
        result
    }

    /// Memo table statistics so far
    pub fn cache_stats(&self) -> CacheStats {
        self.memory.stats()
    }

    /// Take the recorded call tree, if tracing was enabled
    pub fn take_trace(&mut self) -> Option<ParseTrace> {
        self.trace.take().map(TraceRecorder::finish)
    }

    fn no_match(&self, failure: &Failure) -> ParseError {
        let attributed = failure.attributed();
        let leaf = failure.root_cause();
        ParseError::NoMatch {
            production: self.grammar.name(attributed.production()).to_string(),
            position: attributed.position(),
            expected: self.grammar.name(leaf.production()).to_string(),
            furthest: leaf.position(),
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Attempt `id` at `pos`
    fn apply(&mut self, id: ProductionId, pos: Position<'s, T>) -> Outcome<'s, T, V> {
        if let Some(trace) = self.trace.as_mut() {
            trace.enter(id, pos.offset());
        }

        let memoized = self.config.memoize && self.grammar.node(id).memoized;
        if memoized {
            match self.memory.load(id, pos) {
                Ok(Some(outcome)) => {
                    if let Some(trace) = self.trace.as_mut() {
                        trace.exit(TraceAction::CacheHit {
                            matched: outcome.is_ok(),
                        });
                    }
                    return outcome.map_err(Fault::Failure);
                }
                Ok(None) => {}
                Err(err) => {
                    if let Some(trace) = self.trace.as_mut() {
                        trace.exit(TraceAction::Abort);
                    }
                    return Err(Fault::Abort(err.into()));
                }
            }
        }

        let outcome = match self.evaluate(id, pos) {
            Err(Fault::Failure(failure))
                if failure.production() != id || failure.position() != pos.offset() =>
            {
                Err(Fault::Failure(Failure::caused(id, pos.offset(), failure)))
            }
            other => other,
        };

        let outcome = if memoized {
            self.remember(id, pos, outcome)
        } else {
            outcome
        };

        if let Some(trace) = self.trace.as_mut() {
            trace.exit(match &outcome {
                Ok(parsed) => TraceAction::Match {
                    end: parsed.to().offset(),
                },
                Err(Fault::Failure(_)) => TraceAction::Fail,
                Err(Fault::Abort(_)) => TraceAction::Abort,
            });
        }
        outcome
    }

    fn remember(
        &mut self,
        id: ProductionId,
        pos: Position<'s, T>,
        outcome: Outcome<'s, T, V>,
    ) -> Outcome<'s, T, V> {
        let stored = match &outcome {
            Ok(parsed) => self.memory.save(id, parsed),
            Err(Fault::Failure(failure)) => self.memory.save_failure(id, pos, failure),
            Err(Fault::Abort(_)) => Ok(()),
        };
        match stored {
            Ok(()) => outcome,
            Err(err) => Err(Fault::Abort(err.into())),
        }
    }

    fn fail(id: ProductionId, pos: Position<'s, T>) -> Outcome<'s, T, V> {
        Err(Fault::Failure(Failure::new(id, pos.offset())))
    }

    fn evaluate(&mut self, id: ProductionId, pos: Position<'s, T>) -> Outcome<'s, T, V> {
        let grammar = self.grammar;
        match &grammar.node(id).production {
            Production::Literal { value, output } => {
                if pos.slice(value.len()) == value.as_slice() {
                    Ok(Parsed::spanning(pos, pos.advanced(value.len()), output.clone()))
                } else {
                    Self::fail(id, pos)
                }
            }
            Production::AnyItem => match pos.item() {
                Some(item) => Ok(Parsed::spanning(
                    pos,
                    pos.advanced(1),
                    V::from_items(std::slice::from_ref(item)),
                )),
                None => Self::fail(id, pos),
            },
            Production::Bof => {
                if pos.begin() {
                    Ok(Parsed::spanning(pos, pos, V::default()))
                } else {
                    Self::fail(id, pos)
                }
            }
            Production::Eof => {
                if pos.end() {
                    Ok(Parsed::spanning(pos, pos, V::default()))
                } else {
                    Self::fail(id, pos)
                }
            }
            Production::Empty => Ok(Parsed::spanning(pos, pos, V::default())),
            Production::Rejects => Self::fail(id, pos),
            Production::Sequence { items, reduce, .. } => {
                let mut cursor = pos;
                let mut contents = Vec::with_capacity(items.len());
                let mut residue = Residue::default();
                for &item in items {
                    match self.apply(item, cursor) {
                        Ok(parsed) => {
                            cursor = parsed.to;
                            contents.push(residue.absorb(parsed));
                        }
                        Err(Fault::Failure(failure)) => {
                            return Err(Fault::Failure(residue.deepest(failure)))
                        }
                        Err(abort) => return Err(abort),
                    }
                }
                let content = match reduce {
                    Some(f) => f(contents),
                    None => V::from_list(contents),
                };
                Ok(residue.attach(Parsed::spanning(pos, cursor, content)))
            }
            Production::Star { item, reduce } => {
                let (cursor, contents, residue) = self.repeat(*item, pos)?;
                let content = match reduce {
                    Some(f) => f(contents),
                    None => V::from_list(contents),
                };
                Ok(residue.attach(Parsed::spanning(pos, cursor, content)))
            }
            Production::Plus { item, reduce } => {
                let (cursor, contents, residue) = self.repeat(*item, pos)?;
                if contents.is_empty() {
                    return Err(Fault::Failure(match residue.stalled {
                        Some(failure) => Failure::caused(id, pos.offset(), failure),
                        None => Failure::new(id, pos.offset()),
                    }));
                }
                let content = match reduce {
                    Some(f) => f(contents),
                    None => V::from_list(contents),
                };
                Ok(residue.attach(Parsed::spanning(pos, cursor, content)))
            }
            Production::Choice { options, map, .. } => {
                let mut best: Option<Failure> = None;
                for &option in options {
                    match self.apply(option, pos) {
                        Ok(mut parsed) => {
                            if let Some(failure) = best {
                                parsed.stall(failure);
                            }
                            let Some(f) = map else {
                                return Ok(parsed);
                            };
                            let mut residue = Residue::default();
                            let (to, content) = (parsed.to, residue.absorb(parsed));
                            return Ok(residue.attach(Parsed::spanning(pos, to, f(content))));
                        }
                        Err(Fault::Failure(failure)) => {
                            if best
                                .as_ref()
                                .map_or(true, |b| failure.furthest() > b.furthest())
                            {
                                best = Some(failure);
                            }
                        }
                        Err(abort) => return Err(abort),
                    }
                }
                Err(Fault::Failure(match best {
                    Some(failure) => Failure::caused(id, pos.offset(), failure),
                    None => Failure::new(id, pos.offset()),
                }))
            }
            Production::Opt { item, fallback } => match self.apply(*item, pos) {
                Ok(parsed) => Ok(parsed),
                Err(Fault::Failure(failure)) => {
                    let mut parsed = Parsed::spanning(pos, pos, fallback.clone());
                    parsed.stall(failure);
                    Ok(parsed)
                }
                Err(abort) => Err(abort),
            },
            Production::Has { item } => self
                .apply(*item, pos)
                .map(|parsed| Parsed::spanning(pos, pos, parsed.content)),
            Production::HasNot { item } => match self.apply(*item, pos) {
                Ok(_) => Self::fail(id, pos),
                Err(Fault::Failure(_)) => Ok(Parsed::spanning(pos, pos, V::default())),
                Err(abort) => Err(abort),
            },
            Production::Xform { item, map, .. } => {
                let parsed = self.apply(*item, pos)?;
                let mut residue = Residue::default();
                let (to, content) = (parsed.to, residue.absorb(parsed));
                Ok(residue.attach(Parsed::spanning(pos, to, map(content))))
            }
            Production::Test {
                item, predicate, ..
            } => {
                let parsed = self.apply(*item, pos)?;
                if predicate(&parsed.content) {
                    Ok(parsed)
                } else {
                    Self::fail(id, pos)
                }
            }
            Production::Warn { item, check, .. } => {
                let mut parsed = self.apply(*item, pos)?;
                if let Some(message) = check(&parsed.content) {
                    parsed.warnings.push(Warning::new(pos.offset(), message));
                }
                Ok(parsed)
            }
            Production::LateBound { target } => {
                let Some(target) = *target else {
                    return Err(Fault::Abort(GrammarError::Unbound { id }.into()));
                };
                self.depth += 1;
                if self.depth > self.config.max_recursion_depth {
                    let depth = self.depth;
                    self.depth -= 1;
                    return Err(Fault::Abort(ParseError::RecursionLimitExceeded {
                        depth,
                        max_depth: self.config.max_recursion_depth,
                    }));
                }
                let outcome = self.apply(target, pos);
                self.depth -= 1;
                outcome
            }
            Production::Alternation {
                item,
                separator,
                split,
            } => {
                let first = self.apply(*item, pos)?;
                let mut cursor = first.to;
                let mut residue = Residue::default();
                let mut items = vec![residue.absorb(first)];
                let mut separators = Vec::new();
                loop {
                    let sep = match self.apply(*separator, cursor) {
                        Ok(sep) => sep,
                        Err(Fault::Failure(failure)) => {
                            residue.stall(failure);
                            break;
                        }
                        Err(abort) => return Err(abort),
                    };
                    let next = match self.apply(*item, sep.to) {
                        Ok(next) => next,
                        Err(Fault::Failure(failure)) => {
                            residue.stall(failure);
                            break;
                        }
                        Err(abort) => return Err(abort),
                    };
                    let advanced = next.to.offset() > cursor.offset();
                    cursor = next.to;
                    separators.push(residue.absorb(sep));
                    items.push(residue.absorb(next));
                    if !advanced {
                        break;
                    }
                }
                let content = match split {
                    Some(f) => f(items, separators),
                    None => V::from_list(vec![V::from_list(items), V::from_list(separators)]),
                };
                Ok(residue.attach(Parsed::spanning(pos, cursor, content)))
            }
            Production::Regroup {
                items, transpose, ..
            } => {
                let mut columns: Vec<Vec<V>> = items.iter().map(|_| Vec::new()).collect();
                let mut cursor = pos;
                let mut residue = Residue::default();
                'rows: loop {
                    let mut row_cursor = cursor;
                    let mut row = Vec::with_capacity(items.len());
                    for &item in items {
                        match self.apply(item, row_cursor) {
                            Ok(parsed) => {
                                row_cursor = parsed.to;
                                row.push(parsed);
                            }
                            Err(Fault::Failure(failure)) => {
                                residue.stall(failure);
                                break 'rows;
                            }
                            Err(abort) => return Err(abort),
                        }
                    }
                    let advanced = row_cursor.offset() > cursor.offset();
                    for (column, parsed) in columns.iter_mut().zip(row) {
                        column.push(residue.absorb(parsed));
                    }
                    cursor = row_cursor;
                    if !advanced {
                        break;
                    }
                }
                let content = match transpose {
                    Some(f) => f(columns),
                    None => V::from_list(columns.into_iter().map(V::from_list).collect()),
                };
                Ok(residue.attach(Parsed::spanning(pos, cursor, content)))
            }
        }
    }

    /// Greedy repetition shared by Star and Plus
    ///
    /// Stops at the first failure, or after a repetition that consumed
    /// nothing (which would otherwise repeat forever). The stopping
    /// failure is kept as a stall.
    #[allow(clippy::type_complexity)]
    fn repeat(
        &mut self,
        item: ProductionId,
        pos: Position<'s, T>,
    ) -> Result<(Position<'s, T>, Vec<V>, Residue), Fault> {
        let mut cursor = pos;
        let mut contents = Vec::new();
        let mut residue = Residue::default();
        loop {
            match self.apply(item, cursor) {
                Ok(parsed) => {
                    let advanced = parsed.to.offset() > cursor.offset();
                    cursor = parsed.to;
                    contents.push(residue.absorb(parsed));
                    if !advanced {
                        return Ok((cursor, contents, residue));
                    }
                }
                Err(Fault::Failure(failure)) => {
                    residue.stall(failure);
                    return Ok((cursor, contents, residue));
                }
                Err(abort) => return Err(abort),
            }
        }
    }
}

/// Side channels collected from the children of a composite match
#[derive(Default)]
struct Residue {
    warnings: Vec<Warning>,
    stalled: Option<Failure>,
}

impl Residue {
    /// Take over a child's side channels, returning its content
    fn absorb<T, V>(&mut self, parsed: Parsed<'_, T, V>) -> V {
        self.warnings.extend(parsed.warnings);
        if let Some(failure) = parsed.stalled {
            self.stall(failure);
        }
        parsed.content
    }

    fn stall(&mut self, failure: Failure) {
        if self
            .stalled
            .as_ref()
            .map_or(true, |current| failure.furthest() > current.furthest())
        {
            self.stalled = Some(failure);
        }
    }

    /// The failure to report when a later child fails: the stall if it
    /// got further, `failure` otherwise
    fn deepest(self, failure: Failure) -> Failure {
        match self.stalled {
            Some(stalled) if stalled.furthest() > failure.furthest() => stalled,
            _ => failure,
        }
    }

    fn attach<'s, T, V>(self, mut parsed: Parsed<'s, T, V>) -> Parsed<'s, T, V> {
        parsed.warnings = self.warnings;
        parsed.stalled = self.stalled;
        parsed
    }
}

// ============================================================================
// Convenience entry points
// ============================================================================

impl<T: Element, V: Content<T>> Grammar<T, V> {
    /// Parse a source with the default configuration
    pub fn parse_source(&self, source: &Source<T>) -> Result<V, ParseError> {
        ParseContext::new(self, source)
            .parse()
            .map(Parsed::into_content)
    }

    /// Parse a slice of elements
    pub fn parse_items(&self, items: &[T]) -> Result<V, ParseError> {
        self.parse_source(&Source::from_slice(items))
    }
}

impl<V: Content<char>> Grammar<char, V> {
    /// Parse text; offsets in errors count characters
    pub fn parse_str(&self, text: &str) -> Result<V, ParseError> {
        self.parse_source(&Source::from(text))
    }
}
