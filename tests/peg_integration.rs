//! Integration tests for the packrat engine
//!
//! These tests cover the fundamental operations through the public API:
//! - Literal, sequence and choice combinators
//! - Repetition and lookahead
//! - Recursive grammars through late binding
//! - Grammar validation
//! - Memoization statistics and tracing

use pegjson::peg::{
    Content, GrammarBuilder, GrammarError, ParseContext, ParseError, ParserConfig, Source,
};

type Builder = GrammarBuilder<char, String>;

// ============================================================================
// Combinators
// ============================================================================

#[test]
fn test_sequence_with_reducer() {
    let mut b = Builder::new();
    let hello = b.text("hello").unwrap();
    let space = b.text(" ").unwrap();
    let world = b.text("world").unwrap();
    let root = b
        .sequence_with("Greeting", vec![hello, space, world], |parts| parts.join("|"))
        .unwrap();
    let grammar = b.build(root).unwrap();

    assert_eq!(grammar.parse_str("hello world").unwrap(), "hello| |world");
    assert!(grammar.parse_str("hello").is_err());
}

#[test]
fn test_parse_stops_without_eof() {
    let mut b = Builder::new();
    let a = b.text("a").unwrap();
    let root = b.plus(a);
    let grammar = b.build(root).unwrap();

    let source = Source::from("aab");
    let mut ctx = ParseContext::new(&grammar, &source);
    let parsed = ctx.parse().unwrap();
    assert_eq!(parsed.to().offset(), 2);
    assert_eq!(parsed.matched(), &['a', 'a']);
}

#[test]
fn test_ordered_choice_prefers_first() {
    let mut b = Builder::new();
    let short = b.text_as("a", "short".to_string()).unwrap();
    let long = b.text_as("ab", "long".to_string()).unwrap();
    let choice = b.choice("Pick", vec![short, long]).unwrap();
    let grammar = b.build(choice).unwrap();

    assert_eq!(grammar.parse_str("ab").unwrap(), "short");
}

#[test]
fn test_negative_lookahead_keyword() {
    let mut b = Builder::new();
    let keyword = b.text("if").unwrap();
    let any = b.any();
    let letter = b.test("Letter", any, |s: &String| {
        s.chars().all(|c| c.is_ascii_alphabetic())
    });
    let not_letter = b.has_not(letter);
    let eof = b.eof();
    let root = b
        .sequence("Keyword", vec![keyword, not_letter, eof])
        .unwrap();
    let grammar = b.build(root).unwrap();

    assert_eq!(grammar.parse_str("if").unwrap(), "if");
    assert!(grammar.parse_str("iff").is_err());
}

#[test]
fn test_byte_input() {
    let mut b: GrammarBuilder<u8, Vec<u8>> = GrammarBuilder::new();
    let magic = b.literal(b"\x89PNG").unwrap();
    let any = b.any();
    let rest = b.star(any);
    let root = b.sequence("Header", vec![magic, rest]).unwrap();
    let grammar = b.build(root).unwrap();

    assert_eq!(grammar.parse_items(b"\x89PNGxyz").unwrap(), b"\x89PNGxyz".to_vec());
    assert!(grammar.parse_items(b"GIF89a").is_err());
}

// ============================================================================
// Recursion
// ============================================================================

fn parens() -> pegjson::peg::Grammar<char, String> {
    let mut b = Builder::new();
    let group = b.late_bound();
    let open = b.text("(").unwrap();
    let close = b.text(")").unwrap();
    let inner = b.star(group);
    let nested = b
        .sequence_with("Group", vec![open, inner, close], |parts| {
            format!("[{}]", parts[1])
        })
        .unwrap();
    b.bind(group, nested).unwrap();
    let all = b.star(group);
    let eof = b.eof();
    let root = b.sequence("Groups", vec![all, eof]).unwrap();
    b.build(root).unwrap()
}

#[test]
fn test_recursive_groups() {
    let grammar = parens();
    assert_eq!(grammar.parse_str("(()())").unwrap(), "[[][]]");
    assert_eq!(grammar.parse_str("").unwrap(), "");
    assert!(grammar.parse_str("(()").is_err());
}

#[test]
fn test_recursion_limit_configurable() {
    let grammar = parens();
    let source = Source::from("((((()))))");
    let config = ParserConfig::default().with_max_recursion_depth(3);
    let mut ctx = ParseContext::with_config(&grammar, &source, config);
    assert!(matches!(
        ctx.parse(),
        Err(ParseError::RecursionLimitExceeded { max_depth: 3, .. })
    ));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_duplicate_names_rejected() {
    let mut b = Builder::new();
    let x = b.text("x").unwrap();
    let first = b.xform("Same", x, |s| s);
    let second = b.xform("Same", x, |s| s.repeat(2));
    let root = b.sequence("Root", vec![first, second]).unwrap();
    assert_eq!(
        b.build(root).unwrap_err(),
        GrammarError::DuplicateName {
            name: "Same".to_string()
        }
    );
}

#[test]
fn test_identical_literals_collide() {
    let mut b = Builder::new();
    let x1 = b.text("x").unwrap();
    let x2 = b.text("x").unwrap();
    let root = b.sequence("Root", vec![x1, x2]).unwrap();
    assert!(matches!(
        b.build(root),
        Err(GrammarError::DuplicateName { .. })
    ));
}

#[test]
fn test_unreachable_duplicates_allowed() {
    let mut b = Builder::new();
    let x = b.text("x").unwrap();
    let _unused = b.text("x").unwrap();
    let eof = b.eof();
    let root = b.sequence("Root", vec![x, eof]).unwrap();
    assert!(b.build(root).is_ok());
}

#[test]
fn test_unbound_rejected() {
    let mut b = Builder::new();
    let late = b.late_bound();
    let eof = b.eof();
    let root = b.sequence("Root", vec![late, eof]).unwrap();
    assert_eq!(
        b.build(root).unwrap_err(),
        GrammarError::Unbound { id: late }
    );
}

// ============================================================================
// Memoization and tracing
// ============================================================================

#[test]
fn test_memo_replays_shared_prefix() {
    let mut b = Builder::new();
    let word = b.text("abc").unwrap();
    let word = b.xform("Word", word, |s| s.to_uppercase());
    let bang = b.text("!").unwrap();
    let query = b.text("?").unwrap();
    let first = b.sequence("Exclaim", vec![word, bang]).unwrap();
    let second = b.sequence("Ask", vec![word, query]).unwrap();
    let root = b.choice("Sentence", vec![first, second]).unwrap();
    let grammar = b.build(root).unwrap();

    let source = Source::from("abc?");
    let mut ctx = ParseContext::new(&grammar, &source);
    assert_eq!(ctx.parse().unwrap().into_content(), "ABC?");
    assert!(ctx.cache_stats().hits >= 1);

    let mut plain = ParseContext::with_config(
        &grammar,
        &source,
        ParserConfig::default().with_memoization(false),
    );
    assert_eq!(plain.parse().unwrap().into_content(), "ABC?");
    assert_eq!(plain.cache_stats().hits, 0);
}

#[test]
fn test_trace_lists_attempts() {
    let mut b = Builder::new();
    let a = b.text("a").unwrap();
    let c = b.text("c").unwrap();
    let root = b.choice("AorC", vec![a, c]).unwrap();
    let grammar = b.build(root).unwrap();

    let source = Source::from("c");
    let mut ctx =
        ParseContext::with_config(&grammar, &source, ParserConfig::default().with_trace(true));
    ctx.parse().unwrap();
    let trace = ctx.take_trace().unwrap();
    let text = trace.format(&grammar);
    assert!(text.contains("AorC @0: match 0..1"), "{}", text);
    assert!(text.contains("Literal \"a\" @0: fail"), "{}", text);
    assert_eq!(trace.attempts_of(c).len(), 1);
}

#[test]
fn test_content_defaults() {
    assert_eq!(String::from_items(&['a', 'b'][..]), "ab");
    assert_eq!(String::from_list(vec!["x".into(), "y".into()]), "xy");
    assert_eq!(<Vec<u8> as Content<u8>>::from_items(b"hi"), b"hi".to_vec());
}
