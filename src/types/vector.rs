//! # Dense Float Vectors
//!
//! A vector is a fixed dimension plus a contiguous `f32` sequence. All
//! distance computation lives in [`crate::hnsw::distance`]; this module
//! holds the value representation and the literal parser.
//!
//! ## Literal Syntax
//!
//! ```text
//! [0.1, 0.2, 0.3]
//! ARRAY[0.1, 0.2, 0.3]
//! ```
//!
//! Whitespace between elements is ignored. Anything that does not parse as
//! a float rejects the whole literal with `InvalidArgument`.

use crate::error::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    values: Vec<f32>,
}

impl Vector {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Parses `[v1, v2, ...]` with an optional `ARRAY` prefix.
    pub fn parse(input: &str) -> Result<Self> {
        let mut s = input.trim();
        if let Some(rest) = s.strip_prefix("ARRAY") {
            s = rest.trim_start();
        }

        let inner = s
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .ok_or_else(|| {
                Error::InvalidArgument("invalid vector format: must be [v1, v2, ...]".into())
            })?;

        let mut values = Vec::new();
        for part in inner.split(',') {
            let token: String = part.chars().filter(|c| !c.is_whitespace()).collect();
            if token.is_empty() {
                continue;
            }
            let v: f32 = token
                .parse()
                .map_err(|_| Error::InvalidArgument(format!("invalid vector value: {token}")))?;
            values.push(v);
        }

        Ok(Self::new(values))
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_literal() {
        let v = Vector::parse("[0.1, 0.2, 0.3]").unwrap();
        assert_eq!(v.dimensions(), 3);
        assert_eq!(v.values(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn parses_array_prefix_and_whitespace() {
        let v = Vector::parse("ARRAY[ 1 ,  2,3 ]").unwrap();
        assert_eq!(v.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn parses_empty_literal() {
        let v = Vector::parse("[]").unwrap();
        assert_eq!(v.dimensions(), 0);
    }

    #[test]
    fn rejects_missing_brackets() {
        assert!(matches!(
            Vector::parse("0.1, 0.2"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_bad_token() {
        assert!(matches!(
            Vector::parse("[0.1, zap]"),
            Err(Error::InvalidArgument(_))
        ));
    }
}
