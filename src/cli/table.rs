//! # ASCII Table Formatter
//!
//! Renders result sets MySQL-style:
//!
//! ```text
//! +----+-------+
//! | id | name  |
//! +----+-------+
//! | 1  | Alice |
//! +----+-------+
//! ```
//!
//! Two passes: measure column widths, then render. Long values are
//! truncated with an ellipsis; vectors render through their bracketed
//! display form.

use crate::sql::QueryResult;
use crate::types::Value;
use std::fmt::Write;

const MAX_COLUMN_WIDTH: usize = 50;

pub struct TableFormatter<'a> {
    result: &'a QueryResult,
    widths: Vec<usize>,
}

impl<'a> TableFormatter<'a> {
    pub fn new(result: &'a QueryResult) -> Self {
        let mut widths: Vec<usize> = result.columns.iter().map(|c| c.len()).collect();
        for row in &result.rows {
            for (i, column) in result.columns.iter().enumerate() {
                let text = cell_text(row.get(column));
                widths[i] = widths[i].max(text.len()).min(MAX_COLUMN_WIDTH);
            }
        }
        Self { result, widths }
    }

    pub fn row_count(&self) -> usize {
        self.result.rows.len()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_separator(&mut out);

        out.push('|');
        for (column, width) in self.result.columns.iter().zip(&self.widths) {
            let _ = write!(out, " {:<width$} |", truncate(column), width = width);
        }
        out.push('\n');
        self.render_separator(&mut out);

        for row in &self.result.rows {
            out.push('|');
            for (column, width) in self.result.columns.iter().zip(&self.widths) {
                let text = cell_text(row.get(column));
                let _ = write!(out, " {:<width$} |", truncate(&text), width = width);
            }
            out.push('\n');
        }
        self.render_separator(&mut out);
        out
    }

    fn render_separator(&self, out: &mut String) {
        out.push('+');
        for width in &self.widths {
            for _ in 0..width + 2 {
                out.push('-');
            }
            out.push('+');
        }
        out.push('\n');
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(v) => v.canonical_string(),
        None => "NULL".to_string(),
    }
}

fn truncate(text: &str) -> String {
    if text.len() <= MAX_COLUMN_WIDTH {
        text.to_string()
    } else {
        format!("{}...", &text[..MAX_COLUMN_WIDTH - 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Row;

    #[test]
    fn renders_header_and_rows() {
        let mut row = Row::new();
        row.insert("id".into(), Value::Int(1));
        row.insert("name".into(), Value::Text("Alice".into()));

        let result = QueryResult {
            message: None,
            rows: vec![row],
            columns: vec!["id".into(), "name".into()],
        };

        let rendered = TableFormatter::new(&result).render();
        assert!(rendered.contains("| id | name  |"));
        assert!(rendered.contains("| 1  | Alice |"));
        assert!(rendered.starts_with("+----+-------+"));
    }

    #[test]
    fn missing_cells_render_as_null() {
        let result = QueryResult {
            message: None,
            rows: vec![Row::new()],
            columns: vec!["x".into()],
        };
        assert!(TableFormatter::new(&result).render().contains("NULL"));
    }
}
