//! Error types for folio_core

use thiserror::Error;

/// Errors raised by the document model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The element id does not refer to a live element
    #[error("Unknown element")]
    UnknownElement,

    /// Selector text could not be parsed
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Appending would make an element its own ancestor
    #[error("Cannot append an element into its own subtree")]
    Cycle,
}

/// Errors raised while parsing an observer root margin
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarginError {
    /// Wrong number of components (must be 1 to 4)
    #[error("Root margin must have 1 to 4 components, got {0}")]
    Arity(usize),

    /// A component was not a `px` or `%` length
    #[error("Invalid root margin component: {0}")]
    Component(String),
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DomError>;
