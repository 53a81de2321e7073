//! Parse tracing
//!
//! With tracing enabled, the evaluator records every production it
//! attempts as a tree: each entry holds the production, the offset it was
//! tried at, what happened, and the attempts it made on the way. Calls
//! that return to an empty stack are kept as finished roots, so a trace of
//! a failed parse still shows every abandoned branch.

use super::grammar::{Grammar, ProductionId};
use std::fmt::Write;

/// What happened to an attempted production
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceAction {
    /// Still running (only seen if a trace is read mid-parse)
    Pending,
    /// Matched up to the given end offset
    Match {
        /// End offset
        end: usize,
    },
    /// Failed
    Fail,
    /// Aborted by a resource limit
    Abort,
    /// Answered from the memo table
    CacheHit {
        /// Whether the stored outcome was a match
        matched: bool,
    },
}

/// One attempted production
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Production attempted
    pub production: ProductionId,
    /// Offset it was attempted at
    pub position: usize,
    /// Outcome
    pub action: TraceAction,
    /// Attempts made while evaluating it
    pub children: Vec<TraceEntry>,
}

impl TraceEntry {
    /// Number of entries in this subtree
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TraceEntry::size).sum::<usize>()
    }

    fn visit<'a>(&'a self, out: &mut Vec<&'a TraceEntry>) {
        out.push(self);
        for child in &self.children {
            child.visit(out);
        }
    }
}

/// A recorded call tree
#[derive(Debug, Clone, Default)]
pub struct ParseTrace {
    /// Finished top-level calls
    pub roots: Vec<TraceEntry>,
}

impl ParseTrace {
    /// Create a new empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of recorded attempts
    pub fn len(&self) -> usize {
        self.roots.iter().map(TraceEntry::size).sum()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// All entries in depth-first order
    pub fn entries(&self) -> Vec<&TraceEntry> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.visit(&mut out);
        }
        out
    }

    /// Attempts of one production, in depth-first order
    pub fn attempts_of(&self, production: ProductionId) -> Vec<&TraceEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.production == production)
            .collect()
    }

    /// Render as an indented tree using the grammar's display names
    pub fn format<T, V>(&self, grammar: &Grammar<T, V>) -> String {
        let mut output = String::new();
        for root in &self.roots {
            Self::format_entry(root, grammar, 0, &mut output);
        }
        output
    }

    fn format_entry<T, V>(
        entry: &TraceEntry,
        grammar: &Grammar<T, V>,
        depth: usize,
        output: &mut String,
    ) {
        let indent = "  ".repeat(depth);
        let name = grammar.name(entry.production);
        let outcome = match entry.action {
            TraceAction::Pending => "...".to_string(),
            TraceAction::Match { end } => format!("match {}..{}", entry.position, end),
            TraceAction::Fail => "fail".to_string(),
            TraceAction::Abort => "abort".to_string(),
            TraceAction::CacheHit { matched: true } => "cached match".to_string(),
            TraceAction::CacheHit { matched: false } => "cached fail".to_string(),
        };
        // Writing into a String cannot fail.
        let _ = writeln!(output, "{}{} @{}: {}", indent, name, entry.position, outcome);
        for child in &entry.children {
            Self::format_entry(child, grammar, depth + 1, output);
        }
    }
}

/// Builds a [`ParseTrace`] from enter/exit events
#[derive(Debug, Default)]
pub(crate) struct TraceRecorder {
    stack: Vec<TraceEntry>,
    finished: Vec<TraceEntry>,
}

impl TraceRecorder {
    pub(crate) fn enter(&mut self, production: ProductionId, position: usize) {
        self.stack.push(TraceEntry {
            production,
            position,
            action: TraceAction::Pending,
            children: Vec::new(),
        });
    }

    pub(crate) fn exit(&mut self, action: TraceAction) {
        let Some(mut entry) = self.stack.pop() else {
            return;
        };
        entry.action = action;
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(entry),
            None => self.finished.push(entry),
        }
    }

    pub(crate) fn finish(mut self) -> ParseTrace {
        while !self.stack.is_empty() {
            self.exit(TraceAction::Pending);
        }
        ParseTrace {
            roots: self.finished,
        }
    }
}
