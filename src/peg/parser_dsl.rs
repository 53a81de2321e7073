//! Grammar construction
//!
//! [`GrammarBuilder`] is the combinator factory: each method allocates a
//! production in the arena and returns its [`ProductionId`]. Recursive
//! grammars allocate a placeholder with [`GrammarBuilder::late_bound`],
//! reference it freely, then [`GrammarBuilder::bind`] it exactly once.
//!
//! # Example
//!
//! ```rust
//! use pegjson::peg::GrammarBuilder;
//!
//! let mut b: GrammarBuilder<char, String> = GrammarBuilder::new();
//! let a = b.text("a").unwrap();
//! let comma = b.text(",").unwrap();
//! let list = b.alternation(a, comma);
//! let eof = b.eof();
//! let root = b.sequence("List", vec![list, eof]).unwrap();
//! let grammar = b.build(root).unwrap();
//!
//! assert_eq!(grammar.parse_str("a,a,a").unwrap(), "aaa,,");
//! ```
//!
//! Terminals without parameters (`any`, `bof`, `eof`, `empty`, `rejects`)
//! are allocated once per builder. Derived combinators using the default
//! reducer (`star`, `plus`, `opt`, `has`, `has_not`, `alternation`) are
//! interned per child, so asking twice yields the same node. Everything
//! else, literals included, is a fresh node on every call.

use super::ast::GrammarError;
use super::grammar::{Content, Element, Grammar, Node, Production, ProductionId};
use ahash::RandomState;
use hashbrown::HashMap;
use std::sync::Arc;

/// Key for nodes the builder hands out more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Interned {
    AnyItem,
    Bof,
    Eof,
    Empty,
    Rejects,
    Star(ProductionId),
    Plus(ProductionId),
    Opt(ProductionId),
    Has(ProductionId),
    HasNot(ProductionId),
    Alternation(ProductionId, ProductionId),
}

/// Builder for production graphs
pub struct GrammarBuilder<T, V> {
    /// All productions, indexed by id
    nodes: Vec<Node<T, V>>,

    /// Shared terminals and default-reducer combinators
    interned: HashMap<Interned, ProductionId, RandomState>,
}

impl<T: Element, V: Content<T>> GrammarBuilder<T, V> {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            interned: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Number of productions allocated so far
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing has been allocated yet
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a production
    pub fn add(&mut self, production: Production<T, V>) -> ProductionId {
        let id = ProductionId::from_index(self.nodes.len());
        let memoized = production.memoized_by_default();
        self.nodes.push(Node {
            production,
            memoized,
        });
        id
    }

    fn intern(&mut self, key: Interned, make: impl FnOnce() -> Production<T, V>) -> ProductionId {
        if let Some(&id) = self.interned.get(&key) {
            return id;
        }
        let id = self.add(make());
        self.interned.insert(key, id);
        id
    }

    fn at_least_two(kind: &'static str, name: &str, count: usize) -> Result<(), GrammarError> {
        if count < 2 {
            return Err(GrammarError::TooFewItems {
                kind,
                name: name.to_string(),
                count,
            });
        }
        Ok(())
    }

    /// Evaluate `id` without the memo table
    ///
    /// Worth it for cheap single-element wrappers that are tried at many
    /// offsets; a memo entry would cost more than re-running them.
    pub fn unmemoized(&mut self, id: ProductionId) -> ProductionId {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.memoized = false;
        }
        id
    }

    // ========================================================================
    // Terminals
    // ========================================================================

    /// Match `value` exactly; content is the matched elements
    pub fn literal(&mut self, value: &[T]) -> Result<ProductionId, GrammarError> {
        let output = V::from_items(value);
        self.literal_as(value, output)
    }

    /// Match `value` exactly; content is `output`
    pub fn literal_as(&mut self, value: &[T], output: V) -> Result<ProductionId, GrammarError> {
        if value.is_empty() {
            return Err(GrammarError::EmptyLiteral);
        }
        Ok(self.add(Production::Literal {
            value: value.to_vec(),
            output,
        }))
    }

    /// Any single element
    pub fn any(&mut self) -> ProductionId {
        self.intern(Interned::AnyItem, || Production::AnyItem)
    }

    /// Start of input
    pub fn bof(&mut self) -> ProductionId {
        self.intern(Interned::Bof, || Production::Bof)
    }

    /// End of input
    pub fn eof(&mut self) -> ProductionId {
        self.intern(Interned::Eof, || Production::Eof)
    }

    /// Zero-width unconditional match
    pub fn empty(&mut self) -> ProductionId {
        self.intern(Interned::Empty, || Production::Empty)
    }

    /// Never matches
    pub fn rejects(&mut self) -> ProductionId {
        self.intern(Interned::Rejects, || Production::Rejects)
    }

    // ========================================================================
    // Composites
    // ========================================================================

    /// Members in order; content is the list of member contents
    pub fn sequence(
        &mut self,
        name: &str,
        items: Vec<ProductionId>,
    ) -> Result<ProductionId, GrammarError> {
        Self::at_least_two("sequence", name, items.len())?;
        Ok(self.add(Production::Sequence {
            name: name.to_string(),
            items,
            reduce: None,
        }))
    }

    /// Members in order, contents reduced by `f`
    pub fn sequence_with<F>(
        &mut self,
        name: &str,
        items: Vec<ProductionId>,
        f: F,
    ) -> Result<ProductionId, GrammarError>
    where
        F: Fn(Vec<V>) -> V + Send + Sync + 'static,
    {
        Self::at_least_two("sequence", name, items.len())?;
        Ok(self.add(Production::Sequence {
            name: name.to_string(),
            items,
            reduce: Some(Arc::new(f)),
        }))
    }

    /// Zero or more repetitions
    pub fn star(&mut self, item: ProductionId) -> ProductionId {
        self.intern(Interned::Star(item), || Production::Star { item, reduce: None })
    }

    /// Zero or more repetitions, contents reduced by `f`
    pub fn star_with<F>(&mut self, item: ProductionId, f: F) -> ProductionId
    where
        F: Fn(Vec<V>) -> V + Send + Sync + 'static,
    {
        self.add(Production::Star {
            item,
            reduce: Some(Arc::new(f)),
        })
    }

    /// One or more repetitions
    pub fn plus(&mut self, item: ProductionId) -> ProductionId {
        self.intern(Interned::Plus(item), || Production::Plus { item, reduce: None })
    }

    /// One or more repetitions, contents reduced by `f`
    pub fn plus_with<F>(&mut self, item: ProductionId, f: F) -> ProductionId
    where
        F: Fn(Vec<V>) -> V + Send + Sync + 'static,
    {
        self.add(Production::Plus {
            item,
            reduce: Some(Arc::new(f)),
        })
    }

    /// Ordered choice; content is the winner's content
    pub fn choice(
        &mut self,
        name: &str,
        options: Vec<ProductionId>,
    ) -> Result<ProductionId, GrammarError> {
        Self::at_least_two("choice", name, options.len())?;
        Ok(self.add(Production::Choice {
            name: name.to_string(),
            options,
            map: None,
        }))
    }

    /// Ordered choice, winning content rewritten by `f`
    pub fn choice_with<F>(
        &mut self,
        name: &str,
        options: Vec<ProductionId>,
        f: F,
    ) -> Result<ProductionId, GrammarError>
    where
        F: Fn(V) -> V + Send + Sync + 'static,
    {
        Self::at_least_two("choice", name, options.len())?;
        Ok(self.add(Production::Choice {
            name: name.to_string(),
            options,
            map: Some(Arc::new(f)),
        }))
    }

    /// `item` or nothing; content defaults to `V::default()`
    pub fn opt(&mut self, item: ProductionId) -> ProductionId {
        self.intern(Interned::Opt(item), || Production::Opt {
            item,
            fallback: V::default(),
        })
    }

    /// `item` or nothing; content defaults to `fallback`
    pub fn opt_or(&mut self, item: ProductionId, fallback: V) -> ProductionId {
        self.add(Production::Opt { item, fallback })
    }

    /// Positive lookahead
    pub fn has(&mut self, item: ProductionId) -> ProductionId {
        self.intern(Interned::Has(item), || Production::Has { item })
    }

    /// Negative lookahead
    pub fn has_not(&mut self, item: ProductionId) -> ProductionId {
        self.intern(Interned::HasNot(item), || Production::HasNot { item })
    }

    /// Rewrite the content of `item`
    pub fn xform<F>(&mut self, name: &str, item: ProductionId, f: F) -> ProductionId
    where
        F: Fn(V) -> V + Send + Sync + 'static,
    {
        self.add(Production::Xform {
            name: name.to_string(),
            item,
            map: Arc::new(f),
        })
    }

    /// Accept `item` only when `predicate` holds for its content
    pub fn test<F>(&mut self, name: &str, item: ProductionId, predicate: F) -> ProductionId
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        self.add(Production::Test {
            name: name.to_string(),
            item,
            predicate: Arc::new(predicate),
        })
    }

    /// Attach a warning to matches of `item` when `check` returns a message
    pub fn warn<F>(&mut self, name: &str, item: ProductionId, check: F) -> ProductionId
    where
        F: Fn(&V) -> Option<String> + Send + Sync + 'static,
    {
        self.add(Production::Warn {
            name: name.to_string(),
            item,
            check: Arc::new(check),
        })
    }

    /// `item (separator item)*`; content is `[items, separators]`
    pub fn alternation(&mut self, item: ProductionId, separator: ProductionId) -> ProductionId {
        self.intern(Interned::Alternation(item, separator), || {
            Production::Alternation {
                item,
                separator,
                split: None,
            }
        })
    }

    /// `item (separator item)*`, items and separators reduced by `f`
    pub fn alternation_with<F>(
        &mut self,
        item: ProductionId,
        separator: ProductionId,
        f: F,
    ) -> ProductionId
    where
        F: Fn(Vec<V>, Vec<V>) -> V + Send + Sync + 'static,
    {
        self.add(Production::Alternation {
            item,
            separator,
            split: Some(Arc::new(f)),
        })
    }

    /// `(p1 .. pk)*`; content is one list per member
    pub fn regroup(
        &mut self,
        name: &str,
        items: Vec<ProductionId>,
    ) -> Result<ProductionId, GrammarError> {
        Self::at_least_two("regroup", name, items.len())?;
        Ok(self.add(Production::Regroup {
            name: name.to_string(),
            items,
            transpose: None,
        }))
    }

    /// `(p1 .. pk)*`, columns reduced by `f`
    pub fn regroup_with<F>(
        &mut self,
        name: &str,
        items: Vec<ProductionId>,
        f: F,
    ) -> Result<ProductionId, GrammarError>
    where
        F: Fn(Vec<Vec<V>>) -> V + Send + Sync + 'static,
    {
        Self::at_least_two("regroup", name, items.len())?;
        Ok(self.add(Production::Regroup {
            name: name.to_string(),
            items,
            transpose: Some(Arc::new(f)),
        }))
    }

    // ========================================================================
    // Recursion
    // ========================================================================

    /// Placeholder to be bound later with [`GrammarBuilder::bind`]
    pub fn late_bound(&mut self) -> ProductionId {
        self.add(Production::LateBound { target: None })
    }

    /// Bind a placeholder to its target, exactly once
    pub fn bind(&mut self, late: ProductionId, target: ProductionId) -> Result<(), GrammarError> {
        if target.index() >= self.nodes.len() {
            return Err(GrammarError::UnknownProduction { id: target });
        }
        let node = self
            .nodes
            .get_mut(late.index())
            .ok_or(GrammarError::UnknownProduction { id: late })?;
        match &mut node.production {
            Production::LateBound { target: slot @ None } => {
                *slot = Some(target);
                Ok(())
            }
            Production::LateBound { target: Some(_) } => {
                Err(GrammarError::AlreadyBound { id: late })
            }
            _ => Err(GrammarError::NotLateBound { id: late }),
        }
    }

    /// Freeze the arena into a validated grammar rooted at `root`
    pub fn build(self, root: ProductionId) -> Result<Grammar<T, V>, GrammarError> {
        Grammar::from_nodes(self.nodes, root)
    }
}

impl<V: Content<char>> GrammarBuilder<char, V> {
    /// Match a string exactly; content is the matched text
    pub fn text(&mut self, value: &str) -> Result<ProductionId, GrammarError> {
        let chars: Vec<char> = value.chars().collect();
        self.literal(&chars)
    }

    /// Match a string exactly; content is `output`
    pub fn text_as(&mut self, value: &str, output: V) -> Result<ProductionId, GrammarError> {
        let chars: Vec<char> = value.chars().collect();
        self.literal_as(&chars, output)
    }
}

impl<T: Element, V: Content<T>> Default for GrammarBuilder<T, V> {
    fn default() -> Self {
        Self::new()
    }
}
