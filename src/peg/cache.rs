//! Packrat memo table
//!
//! One [`Memory`] serves one parse call. It maps `(production, offset)` to
//! the outcome of running that production there: either the matched span
//! (end offset, content, warnings, stall) or the failure it raised. A lookup that
//! finds nothing is a cache miss, reported as `None` and never surfaced as
//! a parse outcome.
//!
//! Entries only exist for pairs that were actually evaluated, so memory
//! grows with the work done rather than with `productions × input length`.

use super::ast::{Failure, Parsed, Warning};
use super::grammar::ProductionId;
use super::source::{Position, PositionError, Source};
use ahash::RandomState;
use hashbrown::HashMap;
use std::ptr;

/// Outcome recorded for one `(production, offset)` pair
#[derive(Debug, Clone)]
enum Memo<V> {
    Matched {
        end: usize,
        content: V,
        warnings: Vec<Warning>,
        stalled: Option<Failure>,
    },
    Failed(Failure),
}

/// Memo table statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the table
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Entries currently stored
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the table
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Memo table bound to a single source
pub struct Memory<'s, T, V> {
    source: &'s Source<T>,
    table: HashMap<(ProductionId, usize), Memo<V>, RandomState>,
    hits: u64,
    misses: u64,
}

impl<'s, T, V: Clone> Memory<'s, T, V> {
    /// Empty table for `source`
    pub fn new(source: &'s Source<T>) -> Self {
        Self {
            source,
            table: HashMap::with_hasher(RandomState::new()),
            hits: 0,
            misses: 0,
        }
    }

    fn check(&self, pos: &Position<'s, T>) -> Result<(), PositionError> {
        if ptr::eq(self.source, pos.source()) {
            Ok(())
        } else {
            Err(PositionError::ForeignSource)
        }
    }

    /// Replay a stored outcome, or `None` on a miss
    #[allow(clippy::type_complexity)]
    pub fn load(
        &mut self,
        production: ProductionId,
        pos: Position<'s, T>,
    ) -> Result<Option<Result<Parsed<'s, T, V>, Failure>>, PositionError> {
        self.check(&pos)?;
        let Some(memo) = self.table.get(&(production, pos.offset())) else {
            self.misses += 1;
            return Ok(None);
        };
        self.hits += 1;

        let outcome = match memo {
            Memo::Matched {
                end,
                content,
                warnings,
                stalled,
            } => {
                let to = self.source.at(*end)?;
                let mut parsed = Parsed::spanning(pos, to, content.clone());
                parsed.warnings.clone_from(warnings);
                parsed.stalled.clone_from(stalled);
                Ok(parsed)
            }
            Memo::Failed(failure) => Err(failure.clone()),
        };
        Ok(Some(outcome))
    }

    /// Record a successful match of `production` starting at `parsed.from()`
    pub fn save(
        &mut self,
        production: ProductionId,
        parsed: &Parsed<'s, T, V>,
    ) -> Result<(), PositionError> {
        self.check(&parsed.from)?;
        self.table.insert(
            (production, parsed.from.offset()),
            Memo::Matched {
                end: parsed.to.offset(),
                content: parsed.content.clone(),
                warnings: parsed.warnings.clone(),
                stalled: parsed.stalled.clone(),
            },
        );
        Ok(())
    }

    /// Record that `production` fails at `pos`
    pub fn save_failure(
        &mut self,
        production: ProductionId,
        pos: Position<'s, T>,
        failure: &Failure,
    ) -> Result<(), PositionError> {
        self.check(&pos)?;
        self.table
            .insert((production, pos.offset()), Memo::Failed(failure.clone()));
        Ok(())
    }

    /// Whether an outcome is stored for the pair
    pub fn contains(&self, production: ProductionId, offset: usize) -> bool {
        self.table.contains_key(&(production, offset))
    }

    /// Current statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.table.len(),
        }
    }

    /// Drop all entries and reset statistics
    pub fn clear(&mut self) {
        self.table.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> ProductionId {
        ProductionId::from_index(n)
    }

    #[test]
    fn test_miss_then_hit() {
        let source = Source::from("abc");
        let mut memory: Memory<'_, char, String> = Memory::new(&source);
        let start = source.start();

        assert!(memory.load(id(0), start).unwrap().is_none());

        let parsed = Parsed::spanning(start, source.at(2).unwrap(), "ab".to_string());
        memory.save(id(0), &parsed).unwrap();

        let replay = memory.load(id(0), start).unwrap().unwrap().unwrap();
        assert_eq!(replay.to().offset(), 2);
        assert_eq!(replay.content(), "ab");

        let stats = memory.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failure_replayed() {
        let source = Source::from("abc");
        let mut memory: Memory<'_, char, String> = Memory::new(&source);
        let pos = source.at(1).unwrap();
        let failure = Failure::caused(id(2), 1, Failure::new(id(3), 2));
        memory.save_failure(id(2), pos, &failure).unwrap();

        let replay = memory.load(id(2), pos).unwrap().unwrap().unwrap_err();
        assert_eq!(replay, failure);
        assert!(memory.load(id(2), source.start()).unwrap().is_none());
    }

    #[test]
    fn test_keys_are_per_production() {
        let source = Source::from("x");
        let mut memory: Memory<'_, char, String> = Memory::new(&source);
        let start = source.start();
        memory
            .save_failure(id(1), start, &Failure::new(id(1), 0))
            .unwrap();
        assert!(memory.contains(id(1), 0));
        assert!(!memory.contains(id(2), 0));
    }

    #[test]
    fn test_side_channels_replayed() {
        let source = Source::from("ab");
        let mut memory: Memory<'_, char, String> = Memory::new(&source);
        let start = source.start();
        let mut parsed = Parsed::spanning(start, source.at(1).unwrap(), "a".to_string());
        parsed.warnings.push(Warning::new(0, "odd"));
        parsed.stall(Failure::new(id(4), 2));
        memory.save(id(0), &parsed).unwrap();

        let replay = memory.load(id(0), start).unwrap().unwrap().unwrap();
        assert_eq!(replay.warnings(), &[Warning::new(0, "odd")]);
        assert_eq!(replay.stalled(), Some(&Failure::new(id(4), 2)));
    }

    #[test]
    fn test_foreign_source_rejected() {
        let source = Source::from("ab");
        let other = Source::from("ab");
        let mut memory: Memory<'_, char, String> = Memory::new(&source);
        assert_eq!(
            memory.load(id(0), other.start()).unwrap_err(),
            PositionError::ForeignSource
        );
    }

    #[test]
    fn test_clear() {
        let source = Source::from("a");
        let mut memory: Memory<'_, char, String> = Memory::new(&source);
        memory
            .save_failure(id(0), source.start(), &Failure::new(id(0), 0))
            .unwrap();
        memory.clear();
        assert_eq!(memory.stats(), CacheStats::default());
    }
}
