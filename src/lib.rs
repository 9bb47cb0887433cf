//! # dexgraph - Reference store for creatures, moves and types
//!
//! dexgraph keeps a read-mostly reference dataset in SQLite and exposes it
//! as ordered records ready for an API layer.
//!
//! dexgraph provides:
//! - Entity store for Pokémon, moves and types
//! - Six directed type-effectiveness relations (double/half/no damage, to/from)
//! - Query-time relationship graph with membership counts
//! - Full and summary serialization views (`dictify` / `min_dictify`)
//! - JSON dataset loader with a duality consistency check

pub mod entity;
pub mod relation;
pub mod storage;
pub mod graph;
pub mod dictify;
pub mod dataset;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use entity::{BaseStats, DamageClass, Move, Pokemon, Type};
pub use relation::{RelationKind, TypeEdge};
pub use graph::{DualityViolation, RelationshipGraph, TypeMembership, TypeRelations};
pub use dictify::{Dictify, title_case, to_ordered_map};
pub use dataset::{Dataset, LoadOptions, LoadReport};
pub use storage::SqliteStore;

/// Result type alias for dexgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for dexgraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Duplicate {entity}: {key}")]
    DuplicateKey { entity: &'static str, key: String },

    #[error("Duplicate association in {table}: ({left}, {right})")]
    DuplicateAssociation {
        table: &'static str,
        left: i64,
        right: i64,
    },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Dataset error: {0}")]
    Dataset(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Error::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Check if this is a `NotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
