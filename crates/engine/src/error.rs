//! The module contains the errors the engine can return.
//!
//! - [`Validation`] malformed or missing input, nothing reached the store.
//! - [`InvalidCredentials`] and [`Unauthorized`] are deliberately terse so a
//!   caller cannot tell which check failed.
//! - [`Constraint`] the store rejected a write (unique or foreign key).
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidCredentials`]: EngineError::InvalidCredentials
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`Constraint`]: EngineError::Constraint
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::Constraint(msg),
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::Unauthorized, Self::Unauthorized) => true,
            (Self::Constraint(a), Self::Constraint(b)) => a == b,
            (Self::Hashing(a), Self::Hashing(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
