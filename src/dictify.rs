//! Record shaping - full (`dictify`) and summary (`min_dictify`) views
//!
//! Each entity has two record structs. Field order in the struct is the
//! order of keys in the serialized output; `to_ordered_map` keeps it.
//! Names are title-cased here and never in storage.

use serde::Serialize;
use serde_json::{Map, Value};
use crate::{Error, Result};
use crate::entity::{DamageClass, Move, Pokemon, Type};
use crate::graph::RelationshipGraph;
use crate::relation::RelationKind;
use crate::storage::SqliteStore;

/// Title-case a stored name.
///
/// The first letter of every alphabetic run is upper-cased and the rest
/// lower-cased, so `"ho-oh"` becomes `"Ho-Oh"`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

/// Convert a record into a JSON object with keys in field order
pub fn to_ordered_map<T: Serialize>(record: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidValue(format!("record is not an object: {}", other))),
    }
}

/// Full and summary views of an entity.
pub trait Dictify {
    type Full: Serialize;
    type Min: Serialize;

    /// Exhaustive view including every traversed relationship
    fn dictify(&self, store: &SqliteStore) -> Result<Self::Full>;

    /// Identifying fields and counts only
    fn min_dictify(&self, store: &SqliteStore) -> Result<Self::Min>;
}

/// One entry of `PokemonRecord::stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatEntry {
    pub base_stat: i64,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PokemonRecord {
    pub id: i64,
    pub name: String,
    /// speed, special_defense, special_attack, defense, attack, hp
    pub stats: Vec<StatEntry>,
    pub primary_type: i64,
    pub secondary_type: Option<i64>,
    pub average_stats: i64,
    pub moves: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PokemonSummary {
    pub id: i64,
    pub name: String,
    pub primary_type: i64,
    pub secondary_type: Option<i64>,
    pub average_stats: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub id: i64,
    pub name: String,
    pub accuracy: Option<i64>,
    pub pp: Option<i64>,
    pub priority: Option<i64>,
    pub power: Option<i64>,
    pub damage_class: DamageClass,
    pub move_type: i64,
    pub pokemon: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveSummary {
    pub id: i64,
    pub name: String,
    pub accuracy: Option<i64>,
    pub pp: Option<i64>,
    pub power: Option<i64>,
    pub move_type: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRecord {
    pub id: i64,
    pub name: String,
    pub generation: i64,
    pub double_damage_to: Vec<i64>,
    pub double_damage_from: Vec<i64>,
    pub half_damage_to: Vec<i64>,
    pub half_damage_from: Vec<i64>,
    pub no_damage_to: Vec<i64>,
    pub no_damage_from: Vec<i64>,
    pub moves: Vec<i64>,
    pub num_primary_type: usize,
    pub num_secondary_type: usize,
}

/// Summary view of a type. Key names differ from `TypeRecord` and are
/// kept as-is for existing consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    pub id: i64,
    pub name: String,
    pub generation: i64,
    pub num_primary: usize,
    pub num_secondary: usize,
    pub num_moves: usize,
}

/// Stats in serialized order
fn stat_entries(pokemon: &Pokemon) -> Vec<StatEntry> {
    let s = &pokemon.stats;
    [
        (s.speed, "speed"),
        (s.special_defense, "special_defense"),
        (s.special_attack, "special_attack"),
        (s.defense, "defense"),
        (s.attack, "attack"),
        (s.hp, "hp"),
    ]
    .into_iter()
    .map(|(base_stat, name)| StatEntry { base_stat, name })
    .collect()
}

impl Dictify for Pokemon {
    type Full = PokemonRecord;
    type Min = PokemonSummary;

    fn dictify(&self, store: &SqliteStore) -> Result<PokemonRecord> {
        let moves = store.moves_of(self.id)?.iter().map(|m| m.id).collect();

        Ok(PokemonRecord {
            id: self.id,
            name: title_case(&self.name),
            stats: stat_entries(self),
            primary_type: self.primary_type_id,
            secondary_type: self.secondary_type_id,
            average_stats: self.average_stats,
            moves,
        })
    }

    fn min_dictify(&self, _store: &SqliteStore) -> Result<PokemonSummary> {
        Ok(PokemonSummary {
            id: self.id,
            name: title_case(&self.name),
            primary_type: self.primary_type_id,
            secondary_type: self.secondary_type_id,
            average_stats: self.average_stats,
        })
    }
}

impl Dictify for Move {
    type Full = MoveRecord;
    type Min = MoveSummary;

    fn dictify(&self, store: &SqliteStore) -> Result<MoveRecord> {
        let pokemon = store.pokemon_with(self.id)?.iter().map(|p| p.id).collect();

        Ok(MoveRecord {
            id: self.id,
            name: title_case(&self.name),
            accuracy: self.accuracy,
            pp: self.pp,
            priority: self.priority,
            power: self.power,
            damage_class: self.damage_class,
            move_type: self.type_id,
            pokemon,
        })
    }

    fn min_dictify(&self, _store: &SqliteStore) -> Result<MoveSummary> {
        Ok(MoveSummary {
            id: self.id,
            name: title_case(&self.name),
            accuracy: self.accuracy,
            pp: self.pp,
            power: self.power,
            move_type: self.type_id,
        })
    }
}

impl Dictify for Type {
    type Full = TypeRecord;
    type Min = TypeSummary;

    fn dictify(&self, store: &SqliteStore) -> Result<TypeRecord> {
        let graph = RelationshipGraph::new(store);
        let relations = graph.relations(self.id)?;
        let membership = graph.membership(self.id)?;
        let moves = store.moves_of_type(self.id)?.iter().map(|m| m.id).collect();

        Ok(TypeRecord {
            id: self.id,
            name: title_case(&self.name),
            generation: self.generation,
            double_damage_to: relations.ids(RelationKind::DoubleDamageTo),
            double_damage_from: relations.ids(RelationKind::DoubleDamageFrom),
            half_damage_to: relations.ids(RelationKind::HalfDamageTo),
            half_damage_from: relations.ids(RelationKind::HalfDamageFrom),
            no_damage_to: relations.ids(RelationKind::NoDamageTo),
            no_damage_from: relations.ids(RelationKind::NoDamageFrom),
            moves,
            num_primary_type: membership.num_primary_type,
            num_secondary_type: membership.num_secondary_type,
        })
    }

    fn min_dictify(&self, store: &SqliteStore) -> Result<TypeSummary> {
        let membership = RelationshipGraph::new(store).membership(self.id)?;

        Ok(TypeSummary {
            id: self.id,
            name: title_case(&self.name),
            generation: self.generation,
            num_primary: membership.num_primary_type,
            num_secondary: membership.num_secondary_type,
            num_moves: membership.num_moves,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::BaseStats;

    fn keys(map: &Map<String, Value>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    fn store_with_bulbasaur() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_type(&Type::new(4, "poison", 1)).unwrap();
        store.insert_type(&Type::new(12, "grass", 1)).unwrap();
        store.insert_type(&Type::new(18, "fairy", 6)).unwrap();

        let bulbasaur = Pokemon::new(1, "bulbasaur", BaseStats::new(45, 49, 49, 65, 65, 45), 12)
            .with_secondary_type(4)
            .with_average_stats(53);
        store.insert_pokemon(&bulbasaur).unwrap();
        store
            .insert_pokemon(&Pokemon::new(25, "pikachu", BaseStats::new(35, 55, 40, 50, 50, 90), 12))
            .unwrap();

        store
            .insert_move(
                &Move::new(22, "vine-whip", DamageClass::Physical, 12)
                    .with_accuracy(100)
                    .with_pp(25)
                    .with_priority(0)
                    .with_power(45),
            )
            .unwrap();
        store
            .insert_move(&Move::new(77, "poison-powder", DamageClass::Status, 4).with_accuracy(75))
            .unwrap();
        store.add_move(1, 77).unwrap();
        store.add_move(1, 22).unwrap();
        store.insert_matchup(RelationKind::HalfDamageTo, 12, 4).unwrap();
        store
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("pikachu"), "Pikachu");
        assert_eq!(title_case("ho-oh"), "Ho-Oh");
        assert_eq!(title_case("mr. mime"), "Mr. Mime");
        assert_eq!(title_case("PORYGON2"), "Porygon2");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_pokemon_stats_in_reverse_order() {
        let store = store_with_bulbasaur();
        let record = store.get_pokemon(1).unwrap().dictify(&store).unwrap();

        let values: Vec<i64> = record.stats.iter().map(|s| s.base_stat).collect();
        assert_eq!(values, vec![45, 65, 65, 49, 49, 45]);
        let names: Vec<&str> = record.stats.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["speed", "special_defense", "special_attack", "defense", "attack", "hp"]
        );
        assert_eq!(record.average_stats, 53);
        assert_eq!(record.moves, vec![77, 22]);
    }

    #[test]
    fn test_pokemon_key_order_and_null_secondary() {
        let store = store_with_bulbasaur();
        let pikachu = store.get_pokemon(25).unwrap();

        let full = to_ordered_map(&pikachu.dictify(&store).unwrap()).unwrap();
        assert_eq!(
            keys(&full),
            vec!["id", "name", "stats", "primary_type", "secondary_type", "average_stats", "moves"]
        );
        assert_eq!(full["secondary_type"], Value::Null);
        assert_eq!(full["moves"], serde_json::json!([]));

        let min = to_ordered_map(&pikachu.min_dictify(&store).unwrap()).unwrap();
        assert_eq!(
            keys(&min),
            vec!["id", "name", "primary_type", "secondary_type", "average_stats"]
        );
    }

    #[test]
    fn test_name_is_title_cased_only_on_output() {
        let store = store_with_bulbasaur();
        let pikachu = store.get_pokemon(25).unwrap();

        for _ in 0..2 {
            assert_eq!(pikachu.dictify(&store).unwrap().name, "Pikachu");
        }
        assert_eq!(store.get_pokemon(25).unwrap().name, "pikachu");
    }

    #[test]
    fn test_move_views() {
        let store = store_with_bulbasaur();
        let vine_whip = store.get_move(22).unwrap();

        let full = to_ordered_map(&vine_whip.dictify(&store).unwrap()).unwrap();
        assert_eq!(
            keys(&full),
            vec![
                "id", "name", "accuracy", "pp", "priority", "power", "damage_class", "move_type",
                "pokemon"
            ]
        );
        assert_eq!(full["name"], "Vine-Whip");
        assert_eq!(full["damage_class"], "physical");
        assert_eq!(full["pokemon"], serde_json::json!([1]));

        let min = to_ordered_map(&store.get_move(77).unwrap().min_dictify(&store).unwrap()).unwrap();
        assert_eq!(keys(&min), vec!["id", "name", "accuracy", "pp", "power", "move_type"]);
        assert_eq!(min["power"], Value::Null);
    }

    #[test]
    fn test_type_views() {
        let store = store_with_bulbasaur();
        let grass = store.get_type(12).unwrap();

        let record = grass.dictify(&store).unwrap();
        assert_eq!(record.half_damage_to, vec![4]);
        assert_eq!(record.moves, vec![22]);
        assert_eq!(record.num_primary_type, 2);
        assert_eq!(record.num_secondary_type, 0);

        let full = to_ordered_map(&record).unwrap();
        assert_eq!(
            keys(&full),
            vec![
                "id",
                "name",
                "generation",
                "double_damage_to",
                "double_damage_from",
                "half_damage_to",
                "half_damage_from",
                "no_damage_to",
                "no_damage_from",
                "moves",
                "num_primary_type",
                "num_secondary_type"
            ]
        );

        let min = to_ordered_map(&grass.min_dictify(&store).unwrap()).unwrap();
        assert_eq!(
            keys(&min),
            vec!["id", "name", "generation", "num_primary", "num_secondary", "num_moves"]
        );
        assert_eq!(min["num_primary"], 2);
        assert_eq!(min["num_moves"], 1);
    }

    #[test]
    fn test_type_without_edges_has_empty_lists() {
        let store = store_with_bulbasaur();
        let fairy = store.get_type(18).unwrap();

        let full = to_ordered_map(&fairy.dictify(&store).unwrap()).unwrap();
        for kind in RelationKind::all() {
            assert_eq!(full[kind.as_str()], serde_json::json!([]), "{}", kind);
        }
        assert_eq!(full["num_primary_type"], 0);
    }
}
