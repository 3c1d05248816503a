//! # Aggregates and Grouping
//!
//! COUNT / SUM / AVG / MIN / MAX over row sets, plus the GROUP BY
//! partitioner. SUM and AVG accumulate f64 and fail when a non-null value
//! is not numeric; MIN/MAX use the shared cross-type comparison; COUNT
//! distinguishes `*` (row count) from `col` (non-null count).
//!
//! Group keys are the canonical string forms of the grouping columns
//! joined by `|`. Groups keep first-seen order so results are stable with
//! respect to insertion order.

use super::ast::{AggregateExpr, AggregateFunction};
use crate::error::{Error, Result};
use crate::types::{Row, Value};
use hashbrown::HashMap;
use std::cmp::Ordering;

/// Computes every aggregate over `rows`, returning `(alias, value)` pairs
/// in declaration order.
pub fn compute_aggregates(
    rows: &[Row],
    aggregates: &[AggregateExpr],
) -> Result<Vec<(String, Value)>> {
    aggregates
        .iter()
        .map(|agg| {
            let value = match agg.function {
                AggregateFunction::Count => compute_count(rows, &agg.column),
                AggregateFunction::Sum => Value::Float(compute_sum(rows, &agg.column)?),
                AggregateFunction::Avg => Value::Float(compute_avg(rows, &agg.column)?),
                AggregateFunction::Min => compute_extreme(rows, &agg.column, Ordering::Less)?,
                AggregateFunction::Max => compute_extreme(rows, &agg.column, Ordering::Greater)?,
            };
            Ok((agg.alias.clone(), value))
        })
        .collect()
}

fn compute_count(rows: &[Row], column: &str) -> Value {
    let count = if column == "*" {
        rows.len()
    } else {
        rows.iter()
            .filter(|row| row.get(column).is_some_and(|v| !v.is_null()))
            .count()
    };
    Value::BigInt(count as i64)
}

fn numeric_values<'a>(
    rows: &'a [Row],
    column: &'a str,
    function: &'static str,
) -> impl Iterator<Item = Result<f64>> + 'a {
    rows.iter()
        .filter_map(move |row| row.get(column).filter(|v| !v.is_null()))
        .map(move |value| {
            value.to_f64().ok_or_else(|| {
                Error::InvalidArgument(format!("{function} requires numeric values"))
            })
        })
}

fn compute_sum(rows: &[Row], column: &str) -> Result<f64> {
    if column == "*" {
        return Err(Error::InvalidArgument("SUM(*) is not supported".into()));
    }
    numeric_values(rows, column, "SUM").sum()
}

fn compute_avg(rows: &[Row], column: &str) -> Result<f64> {
    if column == "*" {
        return Err(Error::InvalidArgument("AVG(*) is not supported".into()));
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    for value in numeric_values(rows, column, "AVG") {
        sum += value?;
        count += 1;
    }
    if count == 0 {
        return Ok(0.0);
    }
    Ok(sum / count as f64)
}

fn compute_extreme(rows: &[Row], column: &str, keep: Ordering) -> Result<Value> {
    if column == "*" {
        return Err(Error::InvalidArgument(format!(
            "{}(*) is not supported",
            if keep == Ordering::Less { "MIN" } else { "MAX" }
        )));
    }

    let mut best: Option<&Value> = None;
    for row in rows {
        let Some(value) = row.get(column).filter(|v| !v.is_null()) else {
            continue;
        };
        match best {
            None => best = Some(value),
            Some(current) if value.compare(current) == keep => best = Some(value),
            Some(_) => {}
        }
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}

/// One GROUP BY partition: the grouping values in declaration order, plus
/// the member rows in insertion order.
pub struct RowGroup {
    pub key_values: Vec<(String, Value)>,
    pub rows: Vec<Row>,
}

/// Partitions rows by the canonical-string tuple of `group_by` columns.
pub fn group_rows(rows: &[Row], group_by: &[String]) -> Vec<RowGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, RowGroup> = HashMap::new();

    for row in rows {
        let key = group_by
            .iter()
            .map(|col| row.get(col).map_or("NULL".to_string(), Value::canonical_string))
            .collect::<Vec<_>>()
            .join("|");

        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            RowGroup {
                key_values: group_by
                    .iter()
                    .map(|col| {
                        (col.clone(), row.get(col).cloned().unwrap_or(Value::Null))
                    })
                    .collect(),
                rows: Vec::new(),
            }
        });
        group.rows.push(row.clone());
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .collect()
}
