//! Errors for parsing and validating shared types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid protocol parameters: {0}")]
    InvalidParams(String),
}
