//! Catalog error types.

use thiserror::Error;

/// Errors that can occur in catalog and ranking operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Ad not found.
    #[error("Ad not found: {0}")]
    AdNotFound(String),

    /// Re-parenting would make a category its own ancestor.
    #[error("Cannot move category {category} under {parent}: would create a cycle")]
    InvalidReparent { category: String, parent: String },

    /// A sibling with the same name already exists in the country.
    #[error("There is already a category named {name} attached to the parent")]
    DuplicateCategoryName { name: String },

    /// Users cannot report their own ads.
    #[error("You cannot report your own ad: {0}")]
    OwnAdReport(String),

    /// The user already reported this ad.
    #[error("You have already reported this ad: {0}")]
    AlreadyReported(String),

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<market_db::DbError> for CatalogError {
    fn from(e: market_db::DbError) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::SerializationError(e.to_string())
    }
}
