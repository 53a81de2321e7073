//! Property-based tests using proptest
//!
//! These tests verify engine and dialect behavior across a wide range of
//! generated inputs.

use pegjson::json::{parse, parse_json5, parser, Dialect, ParseFlags, Value};
use pegjson::peg::{GrammarBuilder, ParseContext, ParserConfig, Source};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

/// Standard JSON documents as text
fn json_text() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("null".to_string()),
        any::<bool>().prop_map(|b| b.to_string()),
        (-1_000_000i64..1_000_000).prop_map(|n| n.to_string()),
        (-1000i32..1000, 0u32..1000).prop_map(|(i, f)| format!("{}.{}", i, f)),
        "[a-z ]{0,8}".prop_map(|s| format!("\"{}\"", s)),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|items| format!("[{}]", items.join(", "))),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4).prop_map(|members| {
                let body: Vec<String> = members
                    .into_iter()
                    .map(|(k, v)| format!("\"{}\": {}", k, v))
                    .collect();
                format!("{{{}}}", body.join(", "))
            }),
        ]
    })
}

// =============================================================================
// Engine properties
// =============================================================================

proptest! {
    /// The same grammar parses the same text to the same result every time
    #[test]
    fn test_idempotence(text in json_text()) {
        let first = parse(&text);
        let second = parse(&text);
        prop_assert!(first.is_ok(), "{:?}: {:?}", text, first);
        prop_assert_eq!(first, second);
    }

    /// Generated documents survive serialization and reparsing
    #[test]
    fn test_serialize_reparse(text in json_text()) {
        let value = parse(&text).unwrap();
        let again = parse(&value.to_string()).unwrap();
        prop_assert_eq!(value, again);
    }

    /// Turning memoization off changes neither results nor failure positions
    #[test]
    fn test_memoization_transparency(text in json_text(), cut in 0usize..64) {
        let dialect = Dialect::new(ParseFlags::json5()).unwrap();
        let truncated: String = text.chars().take(cut).collect();
        for input in [text.as_str(), truncated.as_str()] {
            let memo = dialect.parse_with_config(input, ParserConfig::default());
            let plain = dialect.parse_with_config(input, ParserConfig::default().with_memoization(false));
            prop_assert_eq!(memo, plain);
        }
    }

    /// A matching first alternative always wins, whatever the others match
    #[test]
    fn test_ordered_choice(word in "[a-c]{1,6}") {
        let mut b: GrammarBuilder<char, String> = GrammarBuilder::new();
        let first = b.text_as(&word[..1], "first".to_string()).unwrap();
        let second = b.text_as(&word, "second".to_string()).unwrap();
        let root = b.choice("Either", vec![first, second]).unwrap();
        let grammar = b.build(root).unwrap();
        prop_assert_eq!(grammar.parse_str(&word).unwrap(), "first");
    }

    /// Lookahead never consumes input
    #[test]
    fn test_lookahead_purity(text in "[ab]{0,10}") {
        let mut b: GrammarBuilder<char, String> = GrammarBuilder::new();
        let a = b.text("a").unwrap();
        let has_a = b.has(a);
        let not_a = b.has_not(a);
        let bof = b.bof();
        let look = b.choice("Look", vec![has_a, not_a]).unwrap();
        let root = b.sequence("Peek", vec![bof, look]).unwrap();
        let grammar = b.build(root).unwrap();

        let source = Source::from(text.as_str());
        let mut ctx = ParseContext::new(&grammar, &source);
        let parsed = ctx.parse().unwrap();
        prop_assert_eq!(parsed.len(), 0);
    }
}

// =============================================================================
// Dialect properties
// =============================================================================

proptest! {
    /// JSON5 accepts everything standard JSON accepts, with the same value
    #[test]
    fn test_json5_superset(text in json_text()) {
        let standard = parse(&text).unwrap();
        prop_assert_eq!(parse_json5(&text).unwrap(), standard);
    }

    /// Standard JSON never accepts a trailing comma
    #[test]
    fn test_trailing_comma_rejected(items in prop::collection::vec(0u32..100, 1..5)) {
        let list: Vec<String> = items.iter().map(u32::to_string).collect();
        let text = format!("[{},]", list.join(","));
        prop_assert!(parse(&text).is_err());
        prop_assert_eq!(parse_json5(&text).unwrap().as_array().map(<[Value]>::len), Some(items.len()));
    }

    /// Long digit runs are exact with exact integers and rounded otherwise
    #[test]
    fn test_numeric_exactness(digits in "[1-9][0-9]{15,40}") {
        let exact = parser(ParseFlags::standard().with_exact_integers(true)).unwrap();
        let value = exact(&digits).unwrap();
        let integer = value.as_integer().map(ToString::to_string);
        prop_assert_eq!(integer.as_deref(), Some(digits.as_str()));

        let nearest: f64 = digits.parse().unwrap();
        prop_assert_eq!(parse(&digits).unwrap(), Value::Number(nearest));
    }

    /// Any string of printable ASCII round-trips through an escaped literal
    #[test]
    fn test_string_escapes(s in "[ -~]{0,20}") {
        let literal = serde_json::to_string(&s).unwrap();
        prop_assert_eq!(parse(&literal).unwrap(), Value::String(s));
    }
}
