//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation failures
//! carry a [`ValidationError`] so callers can show the first violation to the
//! user; storage failures wrap the underlying `DbErr` unchanged.

use crate::core::{ids::DraftId, validation::ValidationError};
use sea_orm::DbErr;
use thiserror::Error;

/// Application error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// The storage layer failed; the cascade was rolled back
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// The visit draft is incomplete or invalid
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A stored record (visit, client, catalog entry) does not exist for this owner
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record that was looked up
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A mixing ratio with a zero, negative or non-finite part
    #[error("Invalid mixing ratio {material_parts}:{oxidant_parts}")]
    InvalidRatio {
        /// Material side of the ratio
        material_parts: f64,
        /// Oxidant side of the ratio
        oxidant_parts: f64,
    },

    /// A required text field was empty or malformed
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Human-readable description of the problem
        message: String,
    },

    /// A price, quantity or gram amount outside its allowed range
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// An editor operation referenced a draft node that is not in the tree
    #[error("Draft {kind} {id} not found")]
    DraftNodeNotFound {
        /// Node kind ("service", "bowl", ...)
        kind: &'static str,
        /// The missing draft id
        id: DraftId,
    },

    /// A stored column held a value that does not map onto a domain type
    #[error("Invalid stored value for {field}: {value}")]
    InvalidStoredValue {
        /// Column name
        field: &'static str,
        /// Raw stored value
        value: String,
    },

    /// Numeric conversion overflow (ordinals, quantities)
    #[error("Numeric conversion error: {0}")]
    Conversion(#[from] std::num::TryFromIntError),
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true for the distinct "record does not exist" state.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
