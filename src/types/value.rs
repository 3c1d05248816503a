//! # Runtime Value Representation
//!
//! `Value` is the tagged union held in rows: one variant per column type
//! plus `Null`. Rows mix arbitrary value types at runtime, so ordering,
//! filtering, grouping, and key-uniqueness checks all funnel through the
//! single [`Value::compare`] below — there is exactly one cross-type
//! comparison rule in the system.
//!
//! ## Comparison Rule
//!
//! If both operands are numeric-ish (Int, BigInt, or Float), both convert
//! to `i64` (floats truncate toward zero) and compare numerically.
//! Otherwise both render to their canonical string form and compare
//! lexicographically. The truncating integer/float tie-break is a
//! documented limitation of the format; changing it to f64 promotion
//! would have to happen everywhere at once.

use super::Vector;
use std::cmp::Ordering;
use std::fmt;

/// A single runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i32),
    BigInt(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Vector(Vector),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the numeric view used by cross-type comparison, or None for
    /// non-numeric variants.
    fn as_comparable_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i as i64),
            Value::BigInt(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// The one comparison operator: numeric when both sides are
    /// numeric-ish, canonical-string lexicographic otherwise.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self.as_comparable_i64(), other.as_comparable_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.canonical_string().cmp(&other.canonical_string()),
        }
    }

    /// Canonical textual form, used for string comparison, group keys,
    /// and TEXT coercion in the row codec.
    pub fn canonical_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(i) => i.to_string(),
            Value::BigInt(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Text(s) => s.clone(),
            Value::Vector(v) => v.to_string(),
        }
    }

    /// Truncating conversion for INT column encoding.
    pub fn to_i32(&self) -> i32 {
        match self {
            Value::Int(i) => *i,
            Value::BigInt(i) => *i as i32,
            Value::Float(f) => *f as i32,
            Value::Bool(b) => *b as i32,
            _ => 0,
        }
    }

    /// Truncating conversion for BIGINT column encoding.
    pub fn to_i64(&self) -> i64 {
        match self {
            Value::Int(i) => *i as i64,
            Value::BigInt(i) => *i,
            Value::Float(f) => *f as i64,
            Value::Bool(b) => *b as i64,
            _ => 0,
        }
    }

    /// Numeric widening for FLOAT encoding and SUM/AVG; None when the
    /// value is not numeric.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::BigInt(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn to_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::BigInt(i) => *i != 0,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_pairs_compare_as_i64() {
        assert_eq!(Value::Int(2).compare(&Value::BigInt(10)), Ordering::Less);
        assert_eq!(Value::Float(2.9).compare(&Value::Int(2)), Ordering::Equal);
        assert_eq!(Value::BigInt(3).compare(&Value::Float(2.1)), Ordering::Greater);
    }

    #[test]
    fn mixed_pairs_compare_as_strings() {
        // "10" < "9" lexicographically once a text operand is involved
        assert_eq!(
            Value::Int(10).compare(&Value::Text("9".into())),
            Ordering::Less
        );
        assert_eq!(
            Value::Text("abc".into()).compare(&Value::Text("abd".into())),
            Ordering::Less
        );
    }

    #[test]
    fn float_canonical_form_drops_trailing_zero() {
        assert_eq!(Value::Float(10.0).canonical_string(), "10");
        assert_eq!(Value::Float(10.5).canonical_string(), "10.5");
    }

    #[test]
    fn truncating_conversions() {
        assert_eq!(Value::Float(3.9).to_i64(), 3);
        assert_eq!(Value::Float(-3.9).to_i32(), -3);
        assert_eq!(Value::Text("x".into()).to_f64(), None);
    }
}
