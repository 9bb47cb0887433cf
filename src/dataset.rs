//! Reference dataset import
//!
//! A dataset is one JSON document holding types (with their relation id
//! lists), moves and pokemon (with their move id lists). Loading runs in a
//! single transaction and finishes with a duality check of the type chart.

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::{Error, Result};
use crate::entity::{BaseStats, DamageClass, Move, Pokemon, Type};
use crate::graph::{DualityViolation, RelationshipGraph};
use crate::relation::RelationKind;
use crate::storage::SqliteStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub id: i64,
    pub name: String,
    pub generation: i64,
    #[serde(default)]
    pub double_damage_to: Vec<i64>,
    #[serde(default)]
    pub double_damage_from: Vec<i64>,
    #[serde(default)]
    pub half_damage_to: Vec<i64>,
    #[serde(default)]
    pub half_damage_from: Vec<i64>,
    #[serde(default)]
    pub no_damage_to: Vec<i64>,
    #[serde(default)]
    pub no_damage_from: Vec<i64>,
}

impl TypeEntry {
    /// Opposing ids listed for one relation kind
    pub fn relation(&self, kind: RelationKind) -> &[i64] {
        match kind {
            RelationKind::DoubleDamageTo => &self.double_damage_to,
            RelationKind::DoubleDamageFrom => &self.double_damage_from,
            RelationKind::HalfDamageTo => &self.half_damage_to,
            RelationKind::HalfDamageFrom => &self.half_damage_from,
            RelationKind::NoDamageTo => &self.no_damage_to,
            RelationKind::NoDamageFrom => &self.no_damage_from,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEntry {
    pub id: i64,
    pub name: String,
    pub accuracy: Option<i64>,
    pub pp: Option<i64>,
    pub priority: Option<i64>,
    pub power: Option<i64>,
    pub damage_class: DamageClass,
    #[serde(rename = "type")]
    pub type_id: i64,
}

impl From<&MoveEntry> for Move {
    fn from(entry: &MoveEntry) -> Self {
        Move {
            id: entry.id,
            name: entry.name.clone(),
            accuracy: entry.accuracy,
            pp: entry.pp,
            priority: entry.priority,
            power: entry.power,
            damage_class: entry.damage_class,
            type_id: entry.type_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonEntry {
    pub id: i64,
    pub name: String,
    pub hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub special_attack: i64,
    pub special_defense: i64,
    pub speed: i64,
    /// Computed from the stats when absent
    pub average_stats: Option<i64>,
    pub primary_type: i64,
    pub secondary_type: Option<i64>,
    #[serde(default)]
    pub moves: Vec<i64>,
}

impl PokemonEntry {
    /// Convert to a `Pokemon`, rejecting stats outside the valid range
    pub fn to_pokemon(&self) -> Result<Pokemon> {
        let stats = BaseStats::new(
            self.hp,
            self.attack,
            self.defense,
            self.special_attack,
            self.special_defense,
            self.speed,
        );
        stats.validate()?;
        let mut pokemon = Pokemon::new(self.id, self.name.clone(), stats, self.primary_type);
        pokemon.secondary_type_id = self.secondary_type;
        if let Some(average) = self.average_stats {
            pokemon = pokemon.with_average_stats(average);
        }
        Ok(pokemon)
    }
}

/// A complete reference dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub types: Vec<TypeEntry>,
    #[serde(default)]
    pub moves: Vec<MoveEntry>,
    #[serde(default)]
    pub pokemon: Vec<PokemonEntry>,
}

/// Options controlling a dataset load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fail and roll back when the type chart breaks duality
    pub strict_duality: bool,
}

/// What a load wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub types: usize,
    pub moves: usize,
    pub pokemon: usize,
    pub pokemon_moves: usize,
    pub relations: usize,
    /// Duality problems found after the load (non-strict loads only)
    pub violations: Vec<DualityViolation>,
}

impl std::fmt::Display for LoadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Load Summary:")?;
        writeln!(f, "  Types: {}", self.types)?;
        writeln!(f, "  Moves: {}", self.moves)?;
        writeln!(f, "  Pokemon: {}", self.pokemon)?;
        writeln!(f, "  Pokemon moves: {}", self.pokemon_moves)?;
        writeln!(f, "  Type relations: {}", self.relations)?;
        writeln!(f, "  Duality violations: {}", self.violations.len())
    }
}

impl Dataset {
    /// Parse a dataset from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a dataset file
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load the dataset into `store` in one transaction.
    ///
    /// Any failed insert rolls the whole load back. With
    /// `strict_duality` a broken type chart also rolls back.
    pub fn load_into(&self, store: &mut SqliteStore, options: LoadOptions) -> Result<LoadReport> {
        store.begin_transaction()?;

        let result = self.insert_all(store).and_then(|mut report| {
            let violations = RelationshipGraph::new(&*store).check_duality()?;
            if options.strict_duality && !violations.is_empty() {
                return Err(Error::ConstraintViolation(format!(
                    "{} type relations lack their dual edge, first: {}",
                    violations.len(),
                    violations[0]
                )));
            }
            for violation in &violations {
                tracing::warn!("Duality violation: {}", violation);
            }
            report.violations = violations;
            Ok(report)
        });

        match result {
            Ok(report) => {
                store.commit()?;
                tracing::info!(
                    "Loaded {} types, {} moves, {} pokemon",
                    report.types,
                    report.moves,
                    report.pokemon
                );
                Ok(report)
            }
            Err(e) => {
                store.rollback()?;
                tracing::debug!("Dataset load rolled back: {}", e);
                Err(e)
            }
        }
    }

    fn insert_all(&self, store: &SqliteStore) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        // Types first so every relation and foreign key can resolve
        for entry in &self.types {
            store.insert_type(&Type::new(entry.id, entry.name.clone(), entry.generation))?;
            report.types += 1;
        }

        for entry in &self.types {
            for kind in RelationKind::all() {
                for opposing in entry.relation(*kind) {
                    store.insert_relation(*kind, entry.id, *opposing)?;
                    report.relations += 1;
                }
            }
        }

        for entry in &self.moves {
            store.insert_move(&Move::from(entry))?;
            report.moves += 1;
        }

        for entry in &self.pokemon {
            let pokemon = entry.to_pokemon()?;
            if !pokemon.has_consistent_average() {
                tracing::warn!(
                    "{} has average_stats {} but its stats average to {}",
                    pokemon.name,
                    pokemon.average_stats,
                    pokemon.stats.average()
                );
            }
            store.insert_pokemon(&pokemon)?;
            report.pokemon += 1;

            for move_id in &entry.moves {
                store.add_move(entry.id, *move_id)?;
                report.pokemon_moves += 1;
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_DATASET: &str = r#"
    {
        "types": [
            { "id": 10, "name": "fire", "generation": 1,
              "double_damage_to": [12], "half_damage_from": [12] },
            { "id": 12, "name": "grass", "generation": 1,
              "double_damage_from": [10], "half_damage_to": [10] }
        ],
        "moves": [
            { "id": 52, "name": "ember", "accuracy": 100, "pp": 25, "priority": 0,
              "power": 40, "damage_class": "special", "type": 10 }
        ],
        "pokemon": [
            { "id": 4, "name": "charmander", "hp": 39, "attack": 52, "defense": 43,
              "special_attack": 60, "special_defense": 50, "speed": 65,
              "primary_type": 10, "moves": [52] }
        ]
    }
    "#;

    #[test]
    fn test_parse_defaults() {
        let dataset = Dataset::from_json(SMALL_DATASET).unwrap();
        assert_eq!(dataset.types.len(), 2);
        assert!(dataset.types[0].no_damage_to.is_empty());
        assert_eq!(dataset.pokemon[0].average_stats, None);
        assert_eq!(dataset.pokemon[0].secondary_type, None);
        assert_eq!(dataset.moves[0].damage_class, DamageClass::Special);
    }

    #[test]
    fn test_load_small_dataset() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let dataset = Dataset::from_json(SMALL_DATASET).unwrap();

        let report = dataset.load_into(&mut store, LoadOptions::default()).unwrap();
        assert_eq!(report.types, 2);
        assert_eq!(report.relations, 4);
        assert_eq!(report.pokemon_moves, 1);
        assert!(report.violations.is_empty());

        let charmander = store.get_pokemon(4).unwrap();
        assert_eq!(charmander.average_stats, 51);
        assert_eq!(store.moves_of(4).unwrap()[0].name, "ember");
    }

    #[test]
    fn test_failed_insert_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut dataset = Dataset::from_json(SMALL_DATASET).unwrap();
        dataset.pokemon[0].moves = vec![52, 52];

        let err = dataset.load_into(&mut store, LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateAssociation { .. }));
        assert_eq!(store.stats().unwrap().types, 0);
    }

    #[test]
    fn test_duality_violation_strict_and_lenient() {
        let mut dataset = Dataset::from_json(SMALL_DATASET).unwrap();
        dataset.types[1].half_damage_to.clear();

        let mut strict_store = SqliteStore::open_in_memory().unwrap();
        let err = dataset
            .load_into(&mut strict_store, LoadOptions { strict_duality: true })
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));
        assert_eq!(strict_store.stats().unwrap().relations, 0);

        let mut lenient_store = SqliteStore::open_in_memory().unwrap();
        let report = dataset
            .load_into(&mut lenient_store, LoadOptions::default())
            .unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].edge.kind, RelationKind::HalfDamageFrom);
        assert_eq!(lenient_store.stats().unwrap().relations, 3);
    }

    #[test]
    fn test_out_of_range_stat_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut dataset = Dataset::from_json(SMALL_DATASET).unwrap();
        dataset.pokemon[0].hp = i64::MAX;

        let err = dataset.load_into(&mut store, LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidValue(ref msg) if msg.contains("hp")));
        let stats = store.stats().unwrap();
        assert_eq!((stats.types, stats.moves, stats.pokemon), (0, 0, 0));
    }
}
