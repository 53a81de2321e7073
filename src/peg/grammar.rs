//! Production graph and grammar validation
//!
//! Productions are stored in an arena and addressed by [`ProductionId`].
//! The id is the production's identity: memo entries are keyed by it, and
//! two structurally identical productions are still distinct nodes unless
//! the builder hands out the same id twice.
//!
//! A [`Grammar`] freezes an arena together with a root. Building one walks
//! everything reachable from the root and rejects the graph if a late-bound
//! placeholder was never bound, or if two distinct productions share a
//! display name.

use super::ast::GrammarError;
use ahash::RandomState;
use hashbrown::HashMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Element and content traits
// ============================================================================

/// An input element the engine can match against
pub trait Element: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Render a run of elements for display names
    fn describe(items: &[Self]) -> String {
        format!("{:?}", items)
    }
}

impl Element for char {
    fn describe(items: &[Self]) -> String {
        format!("{:?}", items.iter().collect::<String>())
    }
}

impl Element for u8 {
    fn describe(items: &[Self]) -> String {
        format!("b\"{}\"", items.escape_ascii())
    }
}

/// Semantic content carried by matched spans
///
/// `Default` is the content of zero-width matches (`Bof`, `Eof`, `Empty`,
/// `HasNot`, and the fallback of `opt`).
pub trait Content<T>: Clone + Default + Send + Sync + 'static {
    /// Content of a literal or single-element match
    fn from_items(items: &[T]) -> Self;

    /// Default reducer for sequences and repetitions
    fn from_list(list: Vec<Self>) -> Self;
}

impl Content<char> for String {
    fn from_items(items: &[char]) -> Self {
        items.iter().collect()
    }

    fn from_list(list: Vec<Self>) -> Self {
        list.concat()
    }
}

impl Content<u8> for Vec<u8> {
    fn from_items(items: &[u8]) -> Self {
        items.to_vec()
    }

    fn from_list(list: Vec<Self>) -> Self {
        list.concat()
    }
}

// ============================================================================
// Productions
// ============================================================================

/// Identity of a production within its grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionId(usize);

impl ProductionId {
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProductionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reducer over the contents of a sequence or repetition
pub type Reducer<V> = Arc<dyn Fn(Vec<V>) -> V + Send + Sync>;
/// Content rewrite
pub type Mapper<V> = Arc<dyn Fn(V) -> V + Send + Sync>;
/// Content predicate
pub type Predicate<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;
/// Content check returning a warning message
pub type Checker<V> = Arc<dyn Fn(&V) -> Option<String> + Send + Sync>;
/// Reducer over the items and separators of an alternation
pub type Splitter<V> = Arc<dyn Fn(Vec<V>, Vec<V>) -> V + Send + Sync>;
/// Reducer over the columns of a regroup
pub type Transposer<V> = Arc<dyn Fn(Vec<Vec<V>>) -> V + Send + Sync>;

/// A node of the production graph
pub enum Production<T, V> {
    /// Exact run of elements
    Literal {
        /// Elements to match
        value: Vec<T>,
        /// Content produced on a match
        output: V,
    },
    /// Any single element
    AnyItem,
    /// Start of input
    Bof,
    /// End of input
    Eof,
    /// Always matches, consuming nothing
    Empty,
    /// Never matches
    Rejects,
    /// Members in order
    Sequence {
        /// Display name
        name: String,
        /// Members
        items: Vec<ProductionId>,
        /// Reducer, `Content::from_list` when absent
        reduce: Option<Reducer<V>>,
    },
    /// Zero or more repetitions
    Star {
        /// Repeated production
        item: ProductionId,
        /// Reducer, `Content::from_list` when absent
        reduce: Option<Reducer<V>>,
    },
    /// One or more repetitions
    Plus {
        /// Repeated production
        item: ProductionId,
        /// Reducer, `Content::from_list` when absent
        reduce: Option<Reducer<V>>,
    },
    /// Ordered choice
    Choice {
        /// Display name
        name: String,
        /// Alternatives in priority order
        options: Vec<ProductionId>,
        /// Rewrite of the winning content
        map: Option<Mapper<V>>,
    },
    /// Optional match with a fallback
    Opt {
        /// Production tried first
        item: ProductionId,
        /// Content when `item` does not match
        fallback: V,
    },
    /// Positive lookahead
    Has {
        /// Production looked for
        item: ProductionId,
    },
    /// Negative lookahead
    HasNot {
        /// Production that must not match
        item: ProductionId,
    },
    /// Content rewrite
    Xform {
        /// Display name
        name: String,
        /// Inner production
        item: ProductionId,
        /// Rewrite
        map: Mapper<V>,
    },
    /// Content filter
    Test {
        /// Display name
        name: String,
        /// Inner production
        item: ProductionId,
        /// Acceptance predicate
        predicate: Predicate<V>,
    },
    /// Content check that attaches a warning instead of failing
    Warn {
        /// Display name
        name: String,
        /// Inner production
        item: ProductionId,
        /// Returns a message to record
        check: Checker<V>,
    },
    /// Placeholder for recursive references
    LateBound {
        /// Bound target
        target: Option<ProductionId>,
    },
    /// `item (separator item)*`
    Alternation {
        /// Repeated production
        item: ProductionId,
        /// Separator production
        separator: ProductionId,
        /// Reducer over items and separators
        split: Option<Splitter<V>>,
    },
    /// `(p1 .. pk)*`, transposed into columns
    Regroup {
        /// Display name
        name: String,
        /// Row members
        items: Vec<ProductionId>,
        /// Reducer over columns
        transpose: Option<Transposer<V>>,
    },
}

impl<T, V> Production<T, V> {
    /// Short kind label
    pub fn kind(&self) -> &'static str {
        match self {
            Production::Literal { .. } => "Literal",
            Production::AnyItem => "AnyItem",
            Production::Bof => "Bof",
            Production::Eof => "Eof",
            Production::Empty => "Empty",
            Production::Rejects => "Rejects",
            Production::Sequence { .. } => "Sequence",
            Production::Star { .. } => "Star",
            Production::Plus { .. } => "Plus",
            Production::Choice { .. } => "Choice",
            Production::Opt { .. } => "Opt",
            Production::Has { .. } => "Has",
            Production::HasNot { .. } => "HasNot",
            Production::Xform { .. } => "Xform",
            Production::Test { .. } => "Test",
            Production::Warn { .. } => "Warn",
            Production::LateBound { .. } => "LateBound",
            Production::Alternation { .. } => "Alternation",
            Production::Regroup { .. } => "Regroup",
        }
    }

    /// Direct children, in evaluation order
    pub fn children(&self) -> Vec<ProductionId> {
        match self {
            Production::Literal { .. }
            | Production::AnyItem
            | Production::Bof
            | Production::Eof
            | Production::Empty
            | Production::Rejects => Vec::new(),
            Production::Sequence { items, .. } | Production::Regroup { items, .. } => {
                items.clone()
            }
            Production::Choice { options, .. } => options.clone(),
            Production::Star { item, .. }
            | Production::Plus { item, .. }
            | Production::Opt { item, .. }
            | Production::Has { item }
            | Production::HasNot { item }
            | Production::Xform { item, .. }
            | Production::Test { item, .. }
            | Production::Warn { item, .. } => vec![*item],
            Production::LateBound { target } => target.iter().copied().collect(),
            Production::Alternation {
                item, separator, ..
            } => vec![*item, *separator],
        }
    }

    /// Whether results are memoized by default
    ///
    /// Terminals do no sub-parsing and late-bound nodes only forward to
    /// their target, so caching them buys nothing.
    pub fn memoized_by_default(&self) -> bool {
        !matches!(
            self,
            Production::Literal { .. }
                | Production::AnyItem
                | Production::Bof
                | Production::Eof
                | Production::Empty
                | Production::Rejects
                | Production::LateBound { .. }
        )
    }
}

impl<T: fmt::Debug, V> fmt::Debug for Production<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Production::Literal { value, .. } => f.debug_tuple("Literal").field(value).finish(),
            Production::Sequence { name, items, .. } => {
                f.debug_tuple("Sequence").field(name).field(items).finish()
            }
            Production::Choice { name, options, .. } => {
                f.debug_tuple("Choice").field(name).field(options).finish()
            }
            Production::Regroup { name, items, .. } => {
                f.debug_tuple("Regroup").field(name).field(items).finish()
            }
            Production::Xform { name, item, .. }
            | Production::Test { name, item, .. }
            | Production::Warn { name, item, .. } => {
                f.debug_tuple(self.kind()).field(name).field(item).finish()
            }
            Production::LateBound { target } => f.debug_tuple("LateBound").field(target).finish(),
            other => f.debug_tuple(other.kind()).field(&other.children()).finish(),
        }
    }
}

/// Arena slot: a production plus its memoization switch
#[derive(Debug)]
pub(crate) struct Node<T, V> {
    pub(crate) production: Production<T, V>,
    pub(crate) memoized: bool,
}

// ============================================================================
// Grammar
// ============================================================================

/// A validated production graph with a root
pub struct Grammar<T, V> {
    nodes: Vec<Node<T, V>>,
    names: Vec<String>,
    root: ProductionId,
    reachable: HashMap<String, ProductionId, RandomState>,
}

impl<T: Element, V> Grammar<T, V> {
    pub(crate) fn from_nodes(
        nodes: Vec<Node<T, V>>,
        root: ProductionId,
    ) -> Result<Self, GrammarError> {
        if root.index() >= nodes.len() {
            return Err(GrammarError::UnknownProduction { id: root });
        }
        let names = resolve_names(&nodes);

        let mut reachable: HashMap<String, ProductionId, RandomState> =
            HashMap::with_hasher(RandomState::new());
        let mut seen = vec![false; nodes.len()];
        let mut stack = vec![root];
        seen[root.index()] = true;

        while let Some(id) = stack.pop() {
            let production = &nodes[id.index()].production;
            if let Production::LateBound { target: None } = production {
                return Err(GrammarError::Unbound { id });
            }

            let name = &names[id.index()];
            if let Some(existing) = reachable.insert(name.clone(), id) {
                if existing != id {
                    return Err(GrammarError::DuplicateName { name: name.clone() });
                }
            }

            for child in production.children() {
                if child.index() >= nodes.len() {
                    return Err(GrammarError::UnknownProduction { id: child });
                }
                if !seen[child.index()] {
                    seen[child.index()] = true;
                    stack.push(child);
                }
            }
        }

        Ok(Self {
            nodes,
            names,
            root,
            reachable,
        })
    }
}

impl<T, V> Grammar<T, V> {
    /// Root production
    #[inline]
    pub fn root(&self) -> ProductionId {
        self.root
    }

    /// Display name of a production
    pub fn name(&self, id: ProductionId) -> &str {
        self.names.get(id.index()).map_or("<unknown>", String::as_str)
    }

    /// Look up a reachable production by display name
    pub fn production(&self, name: &str) -> Option<ProductionId> {
        self.reachable.get(name).copied()
    }

    /// Production definition
    pub fn get(&self, id: ProductionId) -> Option<&Production<T, V>> {
        self.nodes.get(id.index()).map(|node| &node.production)
    }

    /// Whether results of `id` go through the memo table
    pub fn is_memoized(&self, id: ProductionId) -> bool {
        self.nodes.get(id.index()).is_some_and(|node| node.memoized)
    }

    /// Number of productions reachable from the root
    pub fn len(&self) -> usize {
        self.reachable.len()
    }

    /// Whether the grammar has no reachable productions (never true)
    pub fn is_empty(&self) -> bool {
        self.reachable.is_empty()
    }

    /// Reachable display names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.reachable.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[inline]
    pub(crate) fn node(&self, id: ProductionId) -> &Node<T, V> {
        &self.nodes[id.index()]
    }
}

impl<T: fmt::Debug, V> fmt::Debug for Grammar<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("root", &self.name(self.root))
            .field("productions", &self.reachable.len())
            .finish()
    }
}

/// Compute display names for every node in the arena
fn resolve_names<T: Element, V>(nodes: &[Node<T, V>]) -> Vec<String> {
    let mut names: Vec<Option<String>> = vec![None; nodes.len()];
    let mut in_progress = vec![false; nodes.len()];
    for index in 0..nodes.len() {
        name_of(nodes, ProductionId(index), &mut names, &mut in_progress);
    }
    names.into_iter().map(Option::unwrap_or_default).collect()
}

fn name_of<T: Element, V>(
    nodes: &[Node<T, V>],
    id: ProductionId,
    names: &mut [Option<String>],
    in_progress: &mut [bool],
) -> String {
    if let Some(name) = &names[id.index()] {
        return name.clone();
    }
    // Derived names of a cycle with no explicit name anywhere on it.
    if in_progress[id.index()] {
        return format!("<recursive {}>", id);
    }
    in_progress[id.index()] = true;

    let mut derived = |child: ProductionId| name_of(nodes, child, names, in_progress);
    let name = match &nodes[id.index()].production {
        Production::Literal { value, .. } => format!("Literal {}", T::describe(value)),
        Production::AnyItem => "AnyItem".to_string(),
        Production::Bof => "Bof".to_string(),
        Production::Eof => "Eof".to_string(),
        Production::Empty => "Empty".to_string(),
        Production::Rejects => "Rejects".to_string(),
        Production::Sequence { name, .. }
        | Production::Choice { name, .. }
        | Production::Xform { name, .. }
        | Production::Test { name, .. }
        | Production::Warn { name, .. }
        | Production::Regroup { name, .. } => name.clone(),
        Production::Star { item, .. } => format!("{}*", derived(*item)),
        Production::Plus { item, .. } => format!("{}+", derived(*item)),
        Production::Opt { item, .. } => format!("{}?", derived(*item)),
        Production::Has { item } => format!("&{}", derived(*item)),
        Production::HasNot { item } => format!("!{}", derived(*item)),
        Production::LateBound { target: Some(target) } => {
            format!("{} (late bound)", derived(*target))
        }
        Production::LateBound { target: None } => "<NOT BOUND> (late bound)".to_string(),
        Production::Alternation {
            item, separator, ..
        } => format!("alternating<{}, {}>", derived(*item), derived(*separator)),
    };

    in_progress[id.index()] = false;
    names[id.index()] = Some(name.clone());
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peg::parser_dsl::GrammarBuilder;

    #[test]
    fn test_derived_names() {
        let mut b: GrammarBuilder<char, String> = GrammarBuilder::new();
        let a = b.text("a").unwrap();
        let comma = b.text(",").unwrap();
        let star = b.star(a);
        let plus = b.plus(a);
        let has = b.has(a);
        let not = b.has_not(a);
        let alt = b.alternation(a, comma);
        let root = b.sequence("Root", vec![star, plus, has, not, alt]).unwrap();
        let g = b.build(root).unwrap();

        assert_eq!(g.name(a), "Literal \"a\"");
        assert_eq!(g.name(star), "Literal \"a\"*");
        assert_eq!(g.name(plus), "Literal \"a\"+");
        assert_eq!(g.name(has), "&Literal \"a\"");
        assert_eq!(g.name(not), "!Literal \"a\"");
        assert_eq!(g.name(alt), "alternating<Literal \"a\", Literal \",\">");
        assert_eq!(g.production("Root"), Some(root));
    }

    #[test]
    fn test_late_bound_name_follows_target() {
        let mut b: GrammarBuilder<char, String> = GrammarBuilder::new();
        let late = b.late_bound();
        let x = b.text("x").unwrap();
        let nested = b.sequence("Nested", vec![x, late]).unwrap();
        let root = b.choice("Item", vec![nested, x]).unwrap();
        b.bind(late, root).unwrap();
        let g = b.build(root).unwrap();
        assert_eq!(g.name(late), "Item (late bound)");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut b: GrammarBuilder<char, String> = GrammarBuilder::new();
        let a1 = b.text("a").unwrap();
        let a2 = b.text("a").unwrap();
        let root = b.sequence("Root", vec![a1, a2]).unwrap();
        assert_eq!(
            b.build(root).unwrap_err(),
            GrammarError::DuplicateName {
                name: "Literal \"a\"".to_string()
            }
        );
    }

    #[test]
    fn test_unreachable_duplicates_allowed() {
        let mut b: GrammarBuilder<char, String> = GrammarBuilder::new();
        let a1 = b.text("a").unwrap();
        let _a2 = b.text("a").unwrap();
        let eof = b.eof();
        let root = b.sequence("Root", vec![a1, eof]).unwrap();
        assert!(b.build(root).is_ok());
    }

    #[test]
    fn test_shared_node_is_not_duplicate() {
        let mut b: GrammarBuilder<char, String> = GrammarBuilder::new();
        let a = b.text("a").unwrap();
        let root = b.sequence("Root", vec![a, a, a]).unwrap();
        let g = b.build(root).unwrap();
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_unbound_rejected() {
        let mut b: GrammarBuilder<char, String> = GrammarBuilder::new();
        let late = b.late_bound();
        let x = b.text("x").unwrap();
        let root = b.sequence("Root", vec![x, late]).unwrap();
        assert_eq!(b.build(root).unwrap_err(), GrammarError::Unbound { id: late });
    }

    #[test]
    fn test_memoization_defaults() {
        let mut b: GrammarBuilder<char, String> = GrammarBuilder::new();
        let x = b.text("x").unwrap();
        let star = b.star(x);
        let root = b.sequence("Root", vec![star, x]).unwrap();
        let g = b.build(root).unwrap();
        assert!(!g.is_memoized(x));
        assert!(g.is_memoized(star));
        assert!(g.is_memoized(root));
    }

    #[test]
    fn test_byte_literal_name() {
        let mut b: GrammarBuilder<u8, Vec<u8>> = GrammarBuilder::new();
        let lit = b.literal(b"\x00ok").unwrap();
        let eof = b.eof();
        let root = b.sequence("Root", vec![lit, eof]).unwrap();
        let g = b.build(root).unwrap();
        assert_eq!(g.name(lit), "Literal b\"\\x00ok\"");
    }
}
