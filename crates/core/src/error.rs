//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (workflow
/// violations, stock invariants, validation). Infrastructure concerns belong
/// elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A workflow state machine was asked for an illegal transition.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A ledger decrement would drive an on-hand quantity below zero.
    #[error("insufficient stock: {0}")]
    InsufficientStock(String),

    /// A consumption line referenced a recipe that does not exist.
    #[error("recipe not found: {0}")]
    RecipeNotFound(String),

    /// A document sequence number collided with an already-persisted one.
    #[error("duplicate sequence number: {0}")]
    DuplicateSequenceNumber(String),

    /// A requested document was not found by id.
    #[error("not found")]
    NotFound,

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn insufficient_stock(msg: impl Into<String>) -> Self {
        Self::InsufficientStock(msg.into())
    }

    pub fn recipe_not_found(msg: impl Into<String>) -> Self {
        Self::RecipeNotFound(msg.into())
    }

    pub fn duplicate_sequence_number(msg: impl Into<String>) -> Self {
        Self::DuplicateSequenceNumber(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
