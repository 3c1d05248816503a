//! # Error Taxonomy
//!
//! Every fallible operation in the crate returns [`Result<T>`] with the
//! single [`Error`] enum below. Errors bubble unchanged to the caller of
//! `Executor::execute`; the shell prints them and continues.
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | NotFound | database, table, column, or index absent |
//! | AlreadyExists | duplicate database, table, or column on ADD |
//! | InvalidArgument | malformed vector literal, unknown type, bad operator, dimension mismatch |
//! | ConstraintViolation | NULL in NOT NULL, VARCHAR overflow, duplicate PK, FK miss |
//! | Io | any filesystem error |
//! | Corrupted | bad magic, unsupported version, truncated or inconsistent buffer |
//! | Internal | unreachable defaults (unsupported statement at dispatch, full page after space check) |

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted: {0}")]
    Corrupted(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_via_from() {
        fn read_missing() -> Result<Vec<u8>> {
            Ok(std::fs::read("/definitely/not/a/real/path")?)
        }
        assert!(matches!(read_missing(), Err(Error::Io(_))));
    }

    #[test]
    fn display_carries_the_variant_prefix() {
        let err = Error::ConstraintViolation("column id cannot be NULL".into());
        assert_eq!(
            err.to_string(),
            "constraint violation: column id cannot be NULL"
        );
        assert!(Error::NotFound("table t does not exist".into())
            .to_string()
            .starts_with("not found:"));
    }
}
