//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - types(id, name, generation)
//! - pokemon(id, name, hp, attack, defense, special_attack, special_defense, speed, average_stats, primary_type_id, secondary_type_id)
//! - moves(id, name, accuracy, pp, priority, power, damage_class, type_id)
//! - pokemon_move(id, pokemon_id, move_id)
//! - one table per relation kind: <kind>(id, origin, opposing)

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SqliteStore};
