//! # SQL Tokens
//!
//! The token set produced by the lexer. Keywords are resolved through a
//! compile-time perfect-hash map after uppercasing, so keyword matching is
//! O(1) and case-insensitive without allocating per lookup beyond the
//! uppercase buffer.
//!
//! Type names (INT, VECTOR, ...) are deliberately *not* keywords: they
//! reach the parser as identifiers and are resolved against the closed
//! type set only where a type is grammatically expected.

use phf::phf_map;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Create,
    Table,
    Database,
    Databases,
    Tables,
    Columns,
    Use,
    Show,
    Insert,
    Into,
    Values,
    Select,
    From,
    Where,
    Update,
    Set,
    Delete,
    Drop,
    Truncate,
    Alter,
    Add,
    Column,
    Order,
    By,
    Limit,
    Offset,
    And,
    Or,
    Like,
    Comment,
    On,
    Is,
    Group,
    Having,
    Count,
    Sum,
    Avg,
    Max,
    Min,
    As,
    Index,
    Using,
    Hnsw,
    Btree,
    With,
    Null,
    Not,
    Primary,
    Key,
    References,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    Asc,
    Desc,
    True,
    False,
    Metadata,
    CosineDistance,
    L2Distance,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "CREATE" => Keyword::Create,
    "TABLE" => Keyword::Table,
    "DATABASE" => Keyword::Database,
    "DATABASES" => Keyword::Databases,
    "TABLES" => Keyword::Tables,
    "COLUMNS" => Keyword::Columns,
    "USE" => Keyword::Use,
    "SHOW" => Keyword::Show,
    "INSERT" => Keyword::Insert,
    "INTO" => Keyword::Into,
    "VALUES" => Keyword::Values,
    "SELECT" => Keyword::Select,
    "FROM" => Keyword::From,
    "WHERE" => Keyword::Where,
    "UPDATE" => Keyword::Update,
    "SET" => Keyword::Set,
    "DELETE" => Keyword::Delete,
    "DROP" => Keyword::Drop,
    "TRUNCATE" => Keyword::Truncate,
    "ALTER" => Keyword::Alter,
    "ADD" => Keyword::Add,
    "COLUMN" => Keyword::Column,
    "ORDER" => Keyword::Order,
    "BY" => Keyword::By,
    "LIMIT" => Keyword::Limit,
    "OFFSET" => Keyword::Offset,
    "AND" => Keyword::And,
    "OR" => Keyword::Or,
    "LIKE" => Keyword::Like,
    "COMMENT" => Keyword::Comment,
    "ON" => Keyword::On,
    "IS" => Keyword::Is,
    "GROUP" => Keyword::Group,
    "HAVING" => Keyword::Having,
    "COUNT" => Keyword::Count,
    "SUM" => Keyword::Sum,
    "AVG" => Keyword::Avg,
    "MAX" => Keyword::Max,
    "MIN" => Keyword::Min,
    "AS" => Keyword::As,
    "INDEX" => Keyword::Index,
    "USING" => Keyword::Using,
    "HNSW" => Keyword::Hnsw,
    "BTREE" => Keyword::Btree,
    "WITH" => Keyword::With,
    "NULL" => Keyword::Null,
    "NOT" => Keyword::Not,
    "PRIMARY" => Keyword::Primary,
    "KEY" => Keyword::Key,
    "REFERENCES" => Keyword::References,
    "JOIN" => Keyword::Join,
    "INNER" => Keyword::Inner,
    "LEFT" => Keyword::Left,
    "RIGHT" => Keyword::Right,
    "FULL" => Keyword::Full,
    "OUTER" => Keyword::Outer,
    "CROSS" => Keyword::Cross,
    "ASC" => Keyword::Asc,
    "DESC" => Keyword::Desc,
    "TRUE" => Keyword::True,
    "FALSE" => Keyword::False,
    "METADATA" => Keyword::Metadata,
    "COSINE_DISTANCE" => Keyword::CosineDistance,
    "L2_DISTANCE" => Keyword::L2Distance,
};

/// Looks up a keyword by its uppercased spelling.
pub fn lookup_keyword(upper: &str) -> Option<Keyword> {
    KEYWORDS.get(upper).copied()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    Ident(String),
    Number(String),
    Str(String),
    Comma,
    Semicolon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Asterisk,
    Dot,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Illegal(char),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(k) => write!(f, "{k:?}"),
            Token::Ident(s) => write!(f, "identifier {s}"),
            Token::Number(n) => write!(f, "number {n}"),
            Token::Str(s) => write!(f, "string '{s}'"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::Asterisk => f.write_str("*"),
            Token::Dot => f.write_str("."),
            Token::Eq => f.write_str("="),
            Token::Ne => f.write_str("!="),
            Token::Lt => f.write_str("<"),
            Token::Le => f.write_str("<="),
            Token::Gt => f.write_str(">"),
            Token::Ge => f.write_str(">="),
            Token::Illegal(c) => write!(f, "illegal character '{c}'"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}
