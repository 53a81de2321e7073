//! Batch parsing of independent documents
//!
//! Each document gets its own memo table, so documents never share
//! mutable state and the dialect is only read. With the `parallel`
//! feature the batch is spread over rayon's thread pool; without it the
//! documents are parsed one after another. Results keep input order
//! either way.
//!
//! ```rust
//! use pegjson::json::{dialect, parse_batch, ParseFlags};
//!
//! let json = dialect(ParseFlags::standard()).unwrap();
//! let results = parse_batch(&json, &["[1]", "{", "null"]);
//! assert!(results[0].is_ok());
//! assert!(results[1].is_err());
//! assert!(results[2].is_ok());
//! ```

use super::dialect::Dialect;
use super::value::Value;
use crate::peg::ParseError;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Parse every document in `docs`, in parallel when enabled
#[cfg(feature = "rayon")]
pub fn parse_batch(dialect: &Dialect, docs: &[&str]) -> Vec<Result<Value, ParseError>> {
    docs.par_iter().map(|doc| dialect.parse(doc)).collect()
}

/// Parse every document in `docs` (sequential fallback)
#[cfg(not(feature = "rayon"))]
pub fn parse_batch(dialect: &Dialect, docs: &[&str]) -> Vec<Result<Value, ParseError>> {
    docs.iter().map(|doc| dialect.parse(doc)).collect()
}

/// Parse owned documents, in parallel when enabled
#[cfg(feature = "rayon")]
pub fn parse_batch_owned(dialect: &Dialect, docs: Vec<String>) -> Vec<Result<Value, ParseError>> {
    docs.into_par_iter().map(|doc| dialect.parse(&doc)).collect()
}

/// Parse owned documents (sequential fallback)
#[cfg(not(feature = "rayon"))]
pub fn parse_batch_owned(dialect: &Dialect, docs: Vec<String>) -> Vec<Result<Value, ParseError>> {
    docs.into_iter().map(|doc| dialect.parse(&doc)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::ParseFlags;

    #[test]
    fn test_batch_keeps_order() {
        let dialect = Dialect::new(ParseFlags::standard()).unwrap();
        let docs: Vec<String> = (0..50).map(|i| format!("[{}]", i)).collect();
        let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
        let results = parse_batch(&dialect, &refs);
        assert_eq!(results.len(), 50);
        for (i, result) in results.iter().enumerate() {
            let value = result.as_ref().unwrap();
            assert_eq!(value.at(0).and_then(Value::as_i64), Some(i as i64));
        }
    }

    #[test]
    fn test_batch_with_failures() {
        let dialect = Dialect::new(ParseFlags::standard()).unwrap();
        let results = parse_batch_owned(
            &dialect,
            vec!["{}".to_string(), "[1,]".to_string(), "\"x\"".to_string()],
        );
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ParseError::NoMatch { .. })));
        assert_eq!(results[2].as_ref().unwrap(), &Value::string("x"));
    }

    #[test]
    fn test_empty_batch() {
        let dialect = Dialect::new(ParseFlags::json5()).unwrap();
        assert!(parse_batch(&dialect, &[]).is_empty());
    }
}
