//! # Distance Functions
//!
//! The three metrics used by vector search. All return `f64` with `f64`
//! accumulation, and all require equal dimensions. Inner product is
//! negated so "smaller = closer" holds uniformly across metrics — result
//! lists can then always sort ascending.
//!
//! | Metric | Definition | Identical vectors |
//! |--------|------------|-------------------|
//! | Cosine | 1 - dot(a,b) / (|a| * |b|) | 0 (2 for opposite) |
//! | L2 | sqrt(sum((a_i - b_i)^2)) | 0 |
//! | InnerProduct | -dot(a,b) | -|v|^2 |
//!
//! Zero-norm vectors have cosine similarity 0 by convention, so their
//! cosine distance is 1.

use crate::error::{Error, Result};
use crate::types::Vector;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    Cosine,
    L2,
    InnerProduct,
}

impl DistanceMetric {
    /// Distance between `a` and `b` under this metric.
    pub fn distance(&self, a: &Vector, b: &Vector) -> Result<f64> {
        check_dimensions(a, b)?;
        Ok(match self {
            DistanceMetric::Cosine => cosine_distance_unchecked(a, b),
            DistanceMetric::L2 => l2_distance_unchecked(a, b),
            DistanceMetric::InnerProduct => -dot_product(a, b),
        })
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Cosine => f.write_str("COSINE"),
            DistanceMetric::L2 => f.write_str("L2"),
            DistanceMetric::InnerProduct => f.write_str("INNER_PRODUCT"),
        }
    }
}

fn check_dimensions(a: &Vector, b: &Vector) -> Result<()> {
    if a.dimensions() != b.dimensions() {
        return Err(Error::InvalidArgument(format!(
            "vector dimension mismatch: {} vs {}",
            a.dimensions(),
            b.dimensions()
        )));
    }
    Ok(())
}

/// Cosine similarity in [-1, 1]; 0 when either norm is zero.
pub fn cosine_similarity(a: &Vector, b: &Vector) -> Result<f64> {
    check_dimensions(a, b)?;

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.values().iter().zip(b.values()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norms = norm_a.sqrt() * norm_b.sqrt();
    if norms == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / norms)
}

fn cosine_distance_unchecked(a: &Vector, b: &Vector) -> f64 {
    // dimensions already checked by the caller
    1.0 - cosine_similarity(a, b).unwrap_or(0.0)
}

fn l2_distance_unchecked(a: &Vector, b: &Vector) -> f64 {
    let mut sum = 0.0f64;
    for (x, y) in a.values().iter().zip(b.values()) {
        let diff = *x as f64 - *y as f64;
        sum += diff * diff;
    }
    sum.sqrt()
}

fn dot_product(a: &Vector, b: &Vector) -> f64 {
    a.values()
        .iter()
        .zip(b.values())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(values: &[f32]) -> Vector {
        Vector::new(values.to_vec())
    }

    #[test]
    fn cosine_identity_and_opposite() {
        let a = v(&[1.0, 2.0, 3.0]);
        let neg = v(&[-1.0, -2.0, -3.0]);

        let same = DistanceMetric::Cosine.distance(&a, &a).unwrap();
        assert!(same.abs() < 1e-9);

        let opposite = DistanceMetric::Cosine.distance(&a, &neg).unwrap();
        assert!((opposite - 2.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_zero_vector_is_one() {
        let zero = v(&[0.0, 0.0]);
        let b = v(&[1.0, 0.0]);
        assert_eq!(DistanceMetric::Cosine.distance(&zero, &b).unwrap(), 1.0);
    }

    #[test]
    fn l2_distance_is_euclidean() {
        let a = v(&[0.0, 0.0]);
        let b = v(&[3.0, 4.0]);
        assert!((DistanceMetric::L2.distance(&a, &b).unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(DistanceMetric::L2.distance(&b, &b).unwrap(), 0.0);
    }

    #[test]
    fn inner_product_is_negated() {
        let a = v(&[1.0, 2.0]);
        let b = v(&[3.0, 4.0]);
        assert!((DistanceMetric::InnerProduct.distance(&a, &b).unwrap() + 11.0).abs() < 1e-9);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let a = v(&[1.0]);
        let b = v(&[1.0, 2.0]);
        for metric in [
            DistanceMetric::Cosine,
            DistanceMetric::L2,
            DistanceMetric::InnerProduct,
        ] {
            assert!(matches!(
                metric.distance(&a, &b),
                Err(Error::InvalidArgument(_))
            ));
        }
    }
}
