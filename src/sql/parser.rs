//! # SQL Parser
//!
//! Recursive-descent parser over the lexer's token stream with one token
//! of lookahead. Each call parses exactly one statement; a trailing
//! semicolon is accepted and anything after it is rejected.
//!
//! Column constraints (NOT NULL, PRIMARY KEY, REFERENCES) are captured
//! into the column definition — the executor enforces them, so dropping
//! them here would silently weaken the schema.

use super::ast::*;
use super::lexer::Lexer;
use super::token::{Keyword, Token};
use crate::error::{Error, Result};
use crate::hnsw::DistanceMetric;
use crate::storage::{CompareOp, WhereClause};
use crate::types::{DataType, ForeignKey, Value, Vector};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self { lexer, current, peek }
    }

    /// Parses one statement from the input.
    pub fn parse(mut self) -> Result<Statement> {
        let stmt = match &self.current {
            Token::Keyword(Keyword::Create) => self.parse_create()?,
            Token::Keyword(Keyword::Use) => self.parse_use()?,
            Token::Keyword(Keyword::Show) => self.parse_show()?,
            Token::Keyword(Keyword::Insert) => self.parse_insert()?,
            Token::Keyword(Keyword::Select) => Statement::Select(self.parse_select()?),
            Token::Keyword(Keyword::Update) => self.parse_update()?,
            Token::Keyword(Keyword::Delete) => self.parse_delete()?,
            Token::Keyword(Keyword::Drop) => self.parse_drop()?,
            Token::Keyword(Keyword::Truncate) => self.parse_truncate()?,
            Token::Keyword(Keyword::Alter) => self.parse_alter()?,
            Token::Keyword(Keyword::Comment) => self.parse_comment()?,
            other => {
                return Err(Error::InvalidArgument(format!(
                    "unexpected start of statement: {other}"
                )))
            }
        };

        if self.current == Token::Semicolon {
            self.advance();
        }
        if self.current != Token::Eof {
            return Err(Error::InvalidArgument(format!(
                "unexpected trailing input: {}",
                self.current
            )));
        }
        Ok(stmt)
    }

    fn advance(&mut self) {
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.current == Token::Keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "expected {keyword:?}, got {}",
                self.current
            )))
        }
    }

    fn expect_token(&mut self, token: Token) -> Result<()> {
        if self.current == token {
            self.advance();
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "expected {token}, got {}",
                self.current
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match std::mem::replace(&mut self.current, Token::Eof) {
            Token::Ident(name) => {
                self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
                Ok(name)
            }
            other => {
                self.current = other;
                Err(Error::InvalidArgument(format!(
                    "expected identifier, got {}",
                    self.current
                )))
            }
        }
    }

    /// `name` or `table.name`, returned as a single dotted string.
    fn expect_qualified_name(&mut self) -> Result<String> {
        let mut name = self.expect_ident()?;
        if self.current == Token::Dot {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    fn expect_number(&mut self) -> Result<String> {
        match std::mem::replace(&mut self.current, Token::Eof) {
            Token::Number(n) => {
                self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
                Ok(n)
            }
            other => {
                self.current = other;
                Err(Error::InvalidArgument(format!(
                    "expected number, got {}",
                    self.current
                )))
            }
        }
    }

    fn expect_usize(&mut self) -> Result<usize> {
        let n = self.expect_number()?;
        n.parse()
            .map_err(|_| Error::InvalidArgument(format!("expected non-negative integer, got {n}")))
    }

    fn expect_string(&mut self) -> Result<String> {
        match std::mem::replace(&mut self.current, Token::Eof) {
            Token::Str(s) => {
                self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
                Ok(s)
            }
            other => {
                self.current = other;
                Err(Error::InvalidArgument(format!(
                    "expected string literal, got {}",
                    self.current
                )))
            }
        }
    }

    fn parse_create(&mut self) -> Result<Statement> {
        self.advance();
        match &self.current {
            Token::Keyword(Keyword::Database) => self.parse_create_database(),
            Token::Keyword(Keyword::Table) => self.parse_create_table(),
            Token::Keyword(Keyword::Index) => self.parse_create_index(),
            other => Err(Error::InvalidArgument(format!(
                "expected DATABASE, TABLE, or INDEX after CREATE, got {other}"
            ))),
        }
    }

    fn parse_create_database(&mut self) -> Result<Statement> {
        self.advance();
        let name = self.expect_ident()?;
        let metadata = self.parse_metadata_block()?;
        Ok(Statement::CreateDatabase { name, metadata })
    }

    fn parse_create_table(&mut self) -> Result<Statement> {
        self.advance();
        let name = self.expect_ident()?;
        self.expect_token(Token::LParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            if self.current == Token::Comma {
                self.advance();
                continue;
            }
            break;
        }
        self.expect_token(Token::RParen)?;

        let metadata = self.parse_metadata_block()?;
        Ok(Statement::CreateTable { name, columns, metadata })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_ident()?;
        let type_name = self.expect_ident()?.to_ascii_uppercase();
        let data_type = DataType::from_name(&type_name)?;

        let mut length = match data_type {
            DataType::Varchar => crate::config::VARCHAR_DEFAULT_LENGTH,
            _ => 0,
        };
        if matches!(data_type, DataType::Varchar | DataType::Vector)
            && self.current == Token::LParen
        {
            self.advance();
            length = self.expect_usize()?;
            self.expect_token(Token::RParen)?;
        }

        let mut def = ColumnDef {
            name,
            data_type,
            length,
            nullable: true,
            is_primary: false,
            foreign_key: None,
        };

        loop {
            match &self.current {
                Token::Keyword(Keyword::Not) => {
                    self.advance();
                    self.expect_keyword(Keyword::Null)?;
                    def.nullable = false;
                }
                Token::Keyword(Keyword::Null) => {
                    self.advance();
                    def.nullable = true;
                }
                Token::Keyword(Keyword::Primary) => {
                    self.advance();
                    self.expect_keyword(Keyword::Key)?;
                    def.is_primary = true;
                    def.nullable = false;
                }
                Token::Keyword(Keyword::References) => {
                    self.advance();
                    let ref_table = self.expect_ident()?;
                    self.expect_token(Token::LParen)?;
                    let ref_column = self.expect_ident()?;
                    self.expect_token(Token::RParen)?;
                    def.foreign_key = Some(ForeignKey { ref_table, ref_column });
                }
                _ => break,
            }
        }

        Ok(def)
    }

    fn parse_metadata_block(&mut self) -> Result<Vec<String>> {
        if !self.eat_keyword(Keyword::Metadata) {
            return Ok(Vec::new());
        }
        self.expect_token(Token::LBracket)?;

        let mut entries = vec![self.expect_string()?];
        if self.current == Token::Comma {
            self.advance();
            entries.push(self.expect_string()?);
        }
        self.expect_token(Token::RBracket)?;
        Ok(entries)
    }

    fn parse_use(&mut self) -> Result<Statement> {
        self.advance();
        let name = self.expect_ident()?;
        Ok(Statement::UseDatabase { name })
    }

    fn parse_show(&mut self) -> Result<Statement> {
        self.advance();
        let kind = match &self.current {
            Token::Keyword(Keyword::Databases) => {
                self.advance();
                ShowKind::Databases
            }
            Token::Keyword(Keyword::Tables) => {
                self.advance();
                ShowKind::Tables
            }
            Token::Keyword(Keyword::Columns) => {
                self.advance();
                self.expect_keyword(Keyword::From)?;
                ShowKind::Columns {
                    table: self.expect_ident()?,
                }
            }
            other => {
                return Err(Error::InvalidArgument(format!(
                    "expected DATABASES, TABLES, or COLUMNS after SHOW, got {other}"
                )))
            }
        };
        Ok(Statement::Show(kind))
    }

    fn parse_insert(&mut self) -> Result<Statement> {
        self.advance();
        self.expect_keyword(Keyword::Into)?;
        let table = self.expect_ident()?;

        let mut columns = Vec::new();
        if self.current == Token::LParen {
            self.advance();
            loop {
                columns.push(self.expect_ident()?);
                if self.current == Token::Comma {
                    self.advance();
                    continue;
                }
                break;
            }
            self.expect_token(Token::RParen)?;
        }

        self.expect_keyword(Keyword::Values)?;

        let mut values = Vec::new();
        loop {
            self.expect_token(Token::LParen)?;
            let mut tuple = Vec::new();
            if self.current != Token::RParen {
                loop {
                    tuple.push(self.parse_value_literal()?);
                    if self.current == Token::Comma {
                        self.advance();
                        continue;
                    }
                    break;
                }
            }
            self.expect_token(Token::RParen)?;
            values.push(tuple);

            if self.current == Token::Comma {
                self.advance();
                continue;
            }
            break;
        }

        Ok(Statement::Insert { table, columns, values })
    }

    /// One literal: number, string, TRUE/FALSE, NULL, or a bracketed
    /// vector (kept as its source text and parsed by the insert path).
    fn parse_value_literal(&mut self) -> Result<Value> {
        match &self.current {
            Token::Number(_) => {
                let n = self.expect_number()?;
                Ok(number_to_value(&n))
            }
            Token::Str(_) => Ok(Value::Text(self.expect_string()?)),
            Token::Keyword(Keyword::True) => {
                self.advance();
                Ok(Value::Bool(true))
            }
            Token::Keyword(Keyword::False) => {
                self.advance();
                Ok(Value::Bool(false))
            }
            Token::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Value::Null)
            }
            Token::LBracket => {
                let mut literal = String::from("[");
                self.advance();
                let mut first = true;
                while self.current != Token::RBracket {
                    let n = self.expect_number()?;
                    if !first {
                        literal.push(',');
                    }
                    literal.push_str(&n);
                    first = false;
                    if self.current == Token::Comma {
                        self.advance();
                    }
                }
                self.advance();
                literal.push(']');
                Ok(Value::Text(literal))
            }
            other => Err(Error::InvalidArgument(format!(
                "expected value literal, got {other}"
            ))),
        }
    }

    fn parse_select(&mut self) -> Result<SelectStmt> {
        self.advance();

        let mut columns = Vec::new();
        let mut aggregates = Vec::new();
        loop {
            match &self.current {
                Token::Asterisk => {
                    self.advance();
                    columns.push("*".to_string());
                }
                Token::Keyword(_) if current_aggregate(&self.current).is_some() => {
                    aggregates.push(self.parse_aggregate()?);
                }
                Token::Ident(_) => columns.push(self.expect_qualified_name()?),
                other => {
                    return Err(Error::InvalidArgument(format!(
                        "expected column, aggregate, or * in SELECT list, got {other}"
                    )))
                }
            }
            if self.current == Token::Comma {
                self.advance();
                continue;
            }
            break;
        }

        self.expect_keyword(Keyword::From)?;
        let table = self.expect_ident()?;

        let mut stmt = SelectStmt {
            columns,
            aggregates,
            table,
            joins: Vec::new(),
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            vector_order_by: None,
            limit: None,
            offset: None,
        };

        while let Some(join) = self.parse_join_clause()? {
            stmt.joins.push(join);
        }

        if self.eat_keyword(Keyword::Where) {
            stmt.where_clause = Some(self.parse_where(false)?);
        }

        if self.eat_keyword(Keyword::Group) {
            self.expect_keyword(Keyword::By)?;
            loop {
                stmt.group_by.push(self.expect_qualified_name()?);
                if self.current == Token::Comma {
                    self.advance();
                    continue;
                }
                break;
            }
        }

        if self.eat_keyword(Keyword::Having) {
            stmt.having = Some(self.parse_where(true)?);
        }

        if self.eat_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            match &self.current {
                Token::Keyword(Keyword::CosineDistance) => {
                    stmt.vector_order_by = Some(self.parse_vector_order_by(DistanceMetric::Cosine)?)
                }
                Token::Keyword(Keyword::L2Distance) => {
                    stmt.vector_order_by = Some(self.parse_vector_order_by(DistanceMetric::L2)?)
                }
                _ => loop {
                    let column = self.expect_qualified_name()?;
                    let mut descending = false;
                    if self.eat_keyword(Keyword::Desc) {
                        descending = true;
                    } else {
                        self.eat_keyword(Keyword::Asc);
                    }
                    stmt.order_by.push(OrderByExpr { column, descending });
                    if self.current == Token::Comma {
                        self.advance();
                        continue;
                    }
                    break;
                },
            }
        }

        if self.eat_keyword(Keyword::Limit) {
            stmt.limit = Some(self.expect_usize()?);
        }
        if self.eat_keyword(Keyword::Offset) {
            stmt.offset = Some(self.expect_usize()?);
        }

        Ok(stmt)
    }

    fn parse_join_clause(&mut self) -> Result<Option<JoinClause>> {
        let join_type = match &self.current {
            Token::Keyword(Keyword::Join) => JoinType::Inner,
            Token::Keyword(Keyword::Inner) => JoinType::Inner,
            Token::Keyword(Keyword::Left) => JoinType::Left,
            Token::Keyword(Keyword::Right) => JoinType::Right,
            Token::Keyword(Keyword::Full) => JoinType::Full,
            Token::Keyword(Keyword::Cross) => JoinType::Cross,
            _ => return Ok(None),
        };

        if self.current != Token::Keyword(Keyword::Join) {
            self.advance();
            self.eat_keyword(Keyword::Outer);
        }
        self.expect_keyword(Keyword::Join)?;
        let table = self.expect_ident()?;

        let mut condition = None;
        if join_type != JoinType::Cross && self.eat_keyword(Keyword::On) {
            let left = self.expect_qualified_name()?;
            let op = self.parse_compare_op(false)?;
            let right = self.expect_qualified_name()?;
            condition = Some(JoinCondition {
                left_column: unqualify(&left),
                op,
                right_column: unqualify(&right),
            });
        }

        Ok(Some(JoinClause {
            join_type,
            table,
            condition,
        }))
    }

    fn parse_compare_op(&mut self, allow_like: bool) -> Result<CompareOp> {
        let op = match &self.current {
            Token::Eq => CompareOp::Eq,
            Token::Ne => CompareOp::Ne,
            Token::Lt => CompareOp::Lt,
            Token::Le => CompareOp::Le,
            Token::Gt => CompareOp::Gt,
            Token::Ge => CompareOp::Ge,
            Token::Keyword(Keyword::Like) if allow_like => CompareOp::Like,
            other => {
                return Err(Error::InvalidArgument(format!(
                    "expected comparison operator, got {other}"
                )))
            }
        };
        self.advance();
        Ok(op)
    }

    /// WHERE / HAVING chain. With `allow_aggregate_leaf`, a leaf may be an
    /// aggregate call like `COUNT(*)`, recorded as its canonical text so
    /// the executor can resolve it against the SELECT aggregates.
    fn parse_where(&mut self, allow_aggregate_leaf: bool) -> Result<WhereClause> {
        let aggregate_leaf = allow_aggregate_leaf.then(|| current_aggregate(&self.current)).flatten();
        let column = match aggregate_leaf {
            Some(function) => {
                self.advance();
                self.expect_token(Token::LParen)?;
                let target = if self.current == Token::Asterisk {
                    self.advance();
                    "*".to_string()
                } else {
                    self.expect_ident()?
                };
                self.expect_token(Token::RParen)?;
                format!("{}({})", function.name(), target)
            }
            None => self.expect_qualified_name()?,
        };

        let op = self.parse_compare_op(true)?;
        let value = self.parse_value_literal()?;

        let mut clause = WhereClause::leaf(column, op, value);
        if self.eat_keyword(Keyword::And) {
            clause.and = Some(Box::new(self.parse_where(allow_aggregate_leaf)?));
        } else if self.eat_keyword(Keyword::Or) {
            clause.or = Some(Box::new(self.parse_where(allow_aggregate_leaf)?));
        }
        Ok(clause)
    }

    fn parse_aggregate(&mut self) -> Result<AggregateExpr> {
        let function = current_aggregate(&self.current)
            .ok_or_else(|| Error::Internal("aggregate dispatch mismatch".into()))?;
        self.advance();

        self.expect_token(Token::LParen)?;
        let column = if self.current == Token::Asterisk {
            self.advance();
            "*".to_string()
        } else {
            self.expect_ident()?
        };
        self.expect_token(Token::RParen)?;

        let alias = if self.eat_keyword(Keyword::As) {
            self.expect_ident()?
        } else {
            function.default_alias(&column)
        };

        Ok(AggregateExpr { function, column, alias })
    }

    fn parse_vector_order_by(&mut self, metric: DistanceMetric) -> Result<VectorOrderBy> {
        self.advance();
        self.expect_token(Token::LParen)?;
        let column = self.expect_ident()?;
        self.expect_token(Token::Comma)?;

        let query = match &self.current {
            Token::LBracket => {
                self.advance();
                let mut values = Vec::new();
                while self.current != Token::RBracket {
                    let n = self.expect_number()?;
                    let v: f32 = n.parse().map_err(|_| {
                        Error::InvalidArgument(format!("invalid vector value: {n}"))
                    })?;
                    values.push(v);
                    if self.current == Token::Comma {
                        self.advance();
                    }
                }
                self.advance();
                values
            }
            Token::Str(_) => {
                let literal = self.expect_string()?;
                Vector::parse(&literal)?.values().to_vec()
            }
            other => {
                return Err(Error::InvalidArgument(format!(
                    "expected vector literal, got {other}"
                )))
            }
        };

        self.expect_token(Token::RParen)?;

        let mut descending = false;
        if self.eat_keyword(Keyword::Desc) {
            descending = true;
        } else {
            self.eat_keyword(Keyword::Asc);
        }

        Ok(VectorOrderBy {
            metric,
            column,
            query,
            descending,
        })
    }

    fn parse_update(&mut self) -> Result<Statement> {
        self.advance();
        let table = self.expect_ident()?;
        self.expect_keyword(Keyword::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_ident()?;
            self.expect_token(Token::Eq)?;
            let value = self.parse_value_literal()?;
            assignments.push((column, value));
            if self.current == Token::Comma {
                self.advance();
                continue;
            }
            break;
        }

        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_where(false)?)
        } else {
            None
        };

        Ok(Statement::Update {
            table,
            assignments,
            where_clause,
        })
    }

    fn parse_delete(&mut self) -> Result<Statement> {
        self.advance();
        self.expect_keyword(Keyword::From)?;
        let table = self.expect_ident()?;

        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_where(false)?)
        } else {
            None
        };

        Ok(Statement::Delete { table, where_clause })
    }

    fn parse_drop(&mut self) -> Result<Statement> {
        self.advance();
        match &self.current {
            Token::Keyword(Keyword::Table) => {
                self.advance();
                Ok(Statement::DropTable {
                    table: self.expect_ident()?,
                })
            }
            Token::Keyword(Keyword::Database) => {
                self.advance();
                Ok(Statement::DropDatabase {
                    name: self.expect_ident()?,
                })
            }
            Token::Keyword(Keyword::Index) => {
                self.advance();
                Ok(Statement::DropIndex {
                    name: self.expect_ident()?,
                })
            }
            other => Err(Error::InvalidArgument(format!(
                "expected TABLE, DATABASE, or INDEX after DROP, got {other}"
            ))),
        }
    }

    fn parse_truncate(&mut self) -> Result<Statement> {
        self.advance();
        self.eat_keyword(Keyword::Table);
        Ok(Statement::Truncate {
            table: self.expect_ident()?,
        })
    }

    fn parse_alter(&mut self) -> Result<Statement> {
        self.advance();
        self.expect_keyword(Keyword::Table)?;
        let table = self.expect_ident()?;
        self.expect_keyword(Keyword::Add)?;
        self.eat_keyword(Keyword::Column);
        let column = self.parse_column_def()?;
        Ok(Statement::AlterTableAddColumn { table, column })
    }

    fn parse_comment(&mut self) -> Result<Statement> {
        self.advance();
        self.expect_keyword(Keyword::On)?;

        let target = match &self.current {
            Token::Keyword(Keyword::Database) => {
                self.advance();
                CommentTarget::Database(self.expect_ident()?)
            }
            Token::Keyword(Keyword::Table) => {
                self.advance();
                CommentTarget::Table(self.expect_ident()?)
            }
            Token::Keyword(Keyword::Column) => {
                self.advance();
                let table = self.expect_ident()?;
                self.expect_token(Token::Dot)?;
                let column = self.expect_ident()?;
                CommentTarget::Column { table, column }
            }
            other => {
                return Err(Error::InvalidArgument(format!(
                    "expected DATABASE, TABLE, or COLUMN after ON, got {other}"
                )))
            }
        };

        self.expect_keyword(Keyword::Is)?;
        let comment = self.expect_string()?;
        Ok(Statement::Comment { target, comment })
    }

    fn parse_create_index(&mut self) -> Result<Statement> {
        self.advance();
        let name = self.expect_ident()?;
        self.expect_keyword(Keyword::On)?;
        let table = self.expect_ident()?;

        let index_type = if self.eat_keyword(Keyword::Using) {
            match &self.current {
                Token::Keyword(Keyword::Hnsw) => {
                    self.advance();
                    IndexType::Hnsw
                }
                Token::Keyword(Keyword::Btree) => {
                    self.advance();
                    IndexType::Btree
                }
                other => {
                    return Err(Error::InvalidArgument(format!(
                        "expected HNSW or BTREE, got {other}"
                    )))
                }
            }
        } else {
            IndexType::Btree
        };

        self.expect_token(Token::LParen)?;
        let column = self.expect_ident()?;
        self.expect_token(Token::RParen)?;

        let mut m = crate::config::HNSW_DEFAULT_M;
        let mut ef_construction = crate::config::HNSW_DEFAULT_EF_CONSTRUCTION;

        if self.eat_keyword(Keyword::With) {
            self.expect_token(Token::LParen)?;
            loop {
                let option = self.expect_ident()?;
                self.expect_token(Token::Eq)?;
                let value = self.expect_usize()?;
                match option.as_str() {
                    "m" => m = value,
                    "ef_construction" => ef_construction = value,
                    other => {
                        return Err(Error::InvalidArgument(format!(
                            "unknown index option: {other}"
                        )))
                    }
                }
                if self.current == Token::Comma {
                    self.advance();
                    continue;
                }
                break;
            }
            self.expect_token(Token::RParen)?;
        }

        Ok(Statement::CreateIndex(CreateIndexStmt {
            name,
            table,
            column,
            index_type,
            m,
            ef_construction,
        }))
    }
}

fn current_aggregate(token: &Token) -> Option<AggregateFunction> {
    match token {
        Token::Keyword(Keyword::Count) => Some(AggregateFunction::Count),
        Token::Keyword(Keyword::Sum) => Some(AggregateFunction::Sum),
        Token::Keyword(Keyword::Avg) => Some(AggregateFunction::Avg),
        Token::Keyword(Keyword::Max) => Some(AggregateFunction::Max),
        Token::Keyword(Keyword::Min) => Some(AggregateFunction::Min),
        _ => None,
    }
}

/// Numbers without a decimal point become integers (INT when they fit,
/// BIGINT otherwise); everything else is a float.
fn number_to_value(text: &str) -> Value {
    if !text.contains('.') {
        if let Ok(i) = text.parse::<i64>() {
            return match i32::try_from(i) {
                Ok(small) => Value::Int(small),
                Err(_) => Value::BigInt(i),
            };
        }
    }
    Value::Float(text.parse().unwrap_or(0.0))
}

/// Strips a `table.` prefix; join conditions address columns unprefixed.
fn unqualify(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, column)) => column.to_string(),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Statement {
        Parser::new(input).parse().unwrap()
    }

    #[test]
    fn parses_create_table_with_constraints() {
        let stmt = parse(
            "CREATE TABLE emp (id INT PRIMARY KEY, name VARCHAR(10) NOT NULL, \
             dept_id INT REFERENCES departments (id), v VECTOR(4))",
        );
        let Statement::CreateTable { name, columns, .. } = stmt else {
            panic!("expected CreateTable");
        };
        assert_eq!(name, "emp");
        assert_eq!(columns.len(), 4);

        assert!(columns[0].is_primary);
        assert!(!columns[0].nullable);

        assert_eq!(columns[1].data_type, DataType::Varchar);
        assert_eq!(columns[1].length, 10);
        assert!(!columns[1].nullable);

        let fk = columns[2].foreign_key.as_ref().unwrap();
        assert_eq!(fk.ref_table, "departments");
        assert_eq!(fk.ref_column, "id");

        assert_eq!(columns[3].data_type, DataType::Vector);
        assert_eq!(columns[3].length, 4);
    }

    #[test]
    fn varchar_defaults_to_255() {
        let Statement::CreateTable { columns, .. } = parse("CREATE TABLE t (s VARCHAR)") else {
            panic!();
        };
        assert_eq!(columns[0].length, 255);
    }

    #[test]
    fn parses_insert_with_vector_and_null() {
        let Statement::Insert { table, columns, values } =
            parse("INSERT INTO e (id, v, note) VALUES (1, [1, 0.5, -2], NULL)")
        else {
            panic!();
        };
        assert_eq!(table, "e");
        assert_eq!(columns, vec!["id", "v", "note"]);
        assert_eq!(values.len(), 1);
        assert_eq!(values[0][0], Value::Int(1));
        assert_eq!(values[0][1], Value::Text("[1,0.5,-2]".into()));
        assert_eq!(values[0][2], Value::Null);
    }

    #[test]
    fn parses_multi_row_insert() {
        let Statement::Insert { values, .. } = parse("INSERT INTO t VALUES (1, 'a'), (2, 'b')")
        else {
            panic!();
        };
        assert_eq!(values.len(), 2);
        assert_eq!(values[1][1], Value::Text("b".into()));
    }

    #[test]
    fn parses_where_chain() {
        let Statement::Select(stmt) = parse("SELECT a FROM t WHERE b >= 20 AND a != 2") else {
            panic!();
        };
        let clause = stmt.where_clause.unwrap();
        assert_eq!(clause.column, "b");
        assert_eq!(clause.op, CompareOp::Ge);
        assert_eq!(clause.value, Value::Int(20));
        let and = clause.and.unwrap();
        assert_eq!(and.column, "a");
        assert_eq!(and.op, CompareOp::Ne);
    }

    #[test]
    fn parses_join_with_qualified_condition() {
        let Statement::Select(stmt) = parse(
            "SELECT employees.name, departments.name FROM employees \
             INNER JOIN departments ON employees.dept_id = departments.id",
        ) else {
            panic!();
        };
        assert_eq!(stmt.columns, vec!["employees.name", "departments.name"]);
        assert_eq!(stmt.joins.len(), 1);
        let join = &stmt.joins[0];
        assert_eq!(join.join_type, JoinType::Inner);
        assert_eq!(join.table, "departments");
        let cond = join.condition.as_ref().unwrap();
        assert_eq!(cond.left_column, "dept_id");
        assert_eq!(cond.right_column, "id");
    }

    #[test]
    fn parses_left_outer_and_cross_joins() {
        let Statement::Select(stmt) =
            parse("SELECT * FROM a LEFT OUTER JOIN b ON a.x = b.y CROSS JOIN c")
        else {
            panic!();
        };
        assert_eq!(stmt.joins[0].join_type, JoinType::Left);
        assert_eq!(stmt.joins[1].join_type, JoinType::Cross);
        assert!(stmt.joins[1].condition.is_none());
    }

    #[test]
    fn parses_group_by_having_with_aggregate_leaf() {
        let Statement::Select(stmt) = parse(
            "SELECT dept_id, COUNT(*) AS n FROM employees \
             GROUP BY dept_id HAVING COUNT(*) > 1 ORDER BY n DESC LIMIT 5 OFFSET 1",
        ) else {
            panic!();
        };
        assert_eq!(stmt.group_by, vec!["dept_id"]);
        assert_eq!(stmt.aggregates.len(), 1);
        assert_eq!(stmt.aggregates[0].alias, "n");

        let having = stmt.having.unwrap();
        assert_eq!(having.column, "COUNT(*)");
        assert_eq!(having.op, CompareOp::Gt);

        assert_eq!(stmt.order_by[0].column, "n");
        assert!(stmt.order_by[0].descending);
        assert_eq!(stmt.limit, Some(5));
        assert_eq!(stmt.offset, Some(1));
    }

    #[test]
    fn default_aggregate_alias_is_lowercased() {
        let Statement::Select(stmt) = parse("SELECT SUM(salary) FROM emp") else {
            panic!();
        };
        assert_eq!(stmt.aggregates[0].alias, "sum_salary");
    }

    #[test]
    fn parses_vector_order_by() {
        let Statement::Select(stmt) =
            parse("SELECT id FROM e ORDER BY COSINE_DISTANCE(v, [1, 0, 0, 0]) LIMIT 2")
        else {
            panic!();
        };
        let vo = stmt.vector_order_by.unwrap();
        assert_eq!(vo.metric, DistanceMetric::Cosine);
        assert_eq!(vo.column, "v");
        assert_eq!(vo.query, vec![1.0, 0.0, 0.0, 0.0]);
        assert!(!vo.descending);
        assert_eq!(stmt.limit, Some(2));
    }

    #[test]
    fn parses_vector_order_by_from_string_literal() {
        let Statement::Select(stmt) =
            parse("SELECT id FROM e ORDER BY L2_DISTANCE(v, '[1, 2]') DESC")
        else {
            panic!();
        };
        let vo = stmt.vector_order_by.unwrap();
        assert_eq!(vo.metric, DistanceMetric::L2);
        assert_eq!(vo.query, vec![1.0, 2.0]);
        assert!(vo.descending);
    }

    #[test]
    fn parses_update_delete_truncate_drop() {
        assert!(matches!(
            parse("UPDATE t SET a = 1, b = 'x' WHERE c = 2"),
            Statement::Update { assignments, .. } if assignments.len() == 2
        ));
        assert!(matches!(
            parse("DELETE FROM t WHERE a = 1"),
            Statement::Delete { .. }
        ));
        assert!(matches!(
            parse("TRUNCATE TABLE t"),
            Statement::Truncate { .. }
        ));
        assert!(matches!(parse("TRUNCATE t"), Statement::Truncate { .. }));
        assert!(matches!(parse("DROP TABLE t"), Statement::DropTable { .. }));
        assert!(matches!(
            parse("DROP DATABASE d"),
            Statement::DropDatabase { .. }
        ));
    }

    #[test]
    fn parses_create_index_with_options() {
        let Statement::CreateIndex(stmt) =
            parse("CREATE INDEX ex ON e USING HNSW (v) WITH (m = 8, ef_construction = 50)")
        else {
            panic!();
        };
        assert_eq!(stmt.name, "ex");
        assert_eq!(stmt.index_type, IndexType::Hnsw);
        assert_eq!(stmt.column, "v");
        assert_eq!(stmt.m, 8);
        assert_eq!(stmt.ef_construction, 50);
    }

    #[test]
    fn create_index_defaults() {
        let Statement::CreateIndex(stmt) = parse("CREATE INDEX ex ON e USING HNSW (v)") else {
            panic!();
        };
        assert_eq!(stmt.m, 16);
        assert_eq!(stmt.ef_construction, 200);
    }

    #[test]
    fn parses_comment_statements() {
        assert!(matches!(
            parse("COMMENT ON TABLE t IS 'users live here'"),
            Statement::Comment {
                target: CommentTarget::Table(_),
                ..
            }
        ));
        let Statement::Comment { target, comment } = parse("COMMENT ON COLUMN t.c IS 'the c'")
        else {
            panic!();
        };
        assert_eq!(
            target,
            CommentTarget::Column {
                table: "t".into(),
                column: "c".into()
            }
        );
        assert_eq!(comment, "the c");
    }

    #[test]
    fn parses_alter_add_column() {
        let Statement::AlterTableAddColumn { table, column } =
            parse("ALTER TABLE t ADD COLUMN age INT")
        else {
            panic!();
        };
        assert_eq!(table, "t");
        assert_eq!(column.name, "age");
        assert_eq!(column.data_type, DataType::Int);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Parser::new("FLY ME TO THE MOON").parse().is_err());
        assert!(Parser::new("SELECT FROM").parse().is_err());
        assert!(Parser::new("SELECT a FROM t garbage").parse().is_err());
        assert!(Parser::new("CREATE TABLE t (a BLOB)").parse().is_err());
    }
}
