//! Transactional in-process row store for the marketplace core.
//!
//! Provides the persistence primitives the catalog layer builds on: named
//! tables of typed rows, predicate queries with automatic deserialization,
//! and all-or-nothing transactions.
//!
//! # Example
//!
//! ```rust,ignore
//! use market_db::{Db, DbError};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Ad {
//!     id: String,
//!     category_id: String,
//! }
//!
//! let db = Db::open_in_memory();
//!
//! db.transaction(|tx| {
//!     tx.insert("ads", "ad-1", &Ad { id: "ad-1".into(), category_id: "cars".into() })?;
//!     Ok::<_, DbError>(())
//! })?;
//!
//! let cars: Vec<Ad> = db.select_as("ads", |row| row.text("category_id") == Some("cars"))?;
//! ```

mod db;
mod error;
mod types;

pub use db::{Db, Transaction};
pub use error::DbError;
pub use types::{QueryResult, Row, Value};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Db, DbError, QueryResult, Row, Transaction, Value};
}
