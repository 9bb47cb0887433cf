//! End-to-end checks against the bundled reference dataset

use dexgraph::{
    Dataset, Dictify, Error, LoadOptions, RelationKind, RelationshipGraph, SqliteStore,
    to_ordered_map,
};
use std::path::Path;
use tempfile::TempDir;

const REFERENCE_DATASET: &str = include_str!("../data/reference_dataset.json");

fn loaded_store(dir: &TempDir) -> SqliteStore {
    let db_path = dir.path().join("dex.db");
    let mut store = SqliteStore::open(&db_path).unwrap();
    let dataset = Dataset::from_json(REFERENCE_DATASET).unwrap();
    dataset
        .load_into(&mut store, LoadOptions { strict_duality: true })
        .unwrap();
    store
}

#[test]
fn test_reference_dataset_loads_and_persists() {
    let dir = TempDir::new().unwrap();
    drop(loaded_store(&dir));

    let reopened = SqliteStore::open(&dir.path().join("dex.db")).unwrap();
    let stats = reopened.stats().unwrap();
    assert_eq!(stats.types, 10);
    assert_eq!(stats.moves, 12);
    assert_eq!(stats.pokemon, 8);
    assert_eq!(stats.relations, 70);
}

#[test]
fn test_reference_dataset_satisfies_duality() {
    let dir = TempDir::new().unwrap();
    let store = loaded_store(&dir);
    let graph = RelationshipGraph::new(&store);

    assert!(graph.check_duality().unwrap().is_empty());

    for ty in store.list_types().unwrap() {
        for target in graph.related(ty.id, RelationKind::DoubleDamageTo).unwrap() {
            let back = graph.related(target.id, RelationKind::DoubleDamageFrom).unwrap();
            assert!(back.iter().any(|t| t.id == ty.id), "{} -> {}", ty.name, target.name);
        }
    }
}

#[test]
fn test_backward_edges_match_inverse_kinds() {
    let dir = TempDir::new().unwrap();
    let store = loaded_store(&dir);
    let graph = RelationshipGraph::new(&store);

    for ty in store.list_types().unwrap() {
        for kind in RelationKind::all() {
            assert_eq!(
                graph.referenced_by(ty.id, *kind).unwrap(),
                graph.related(ty.id, kind.inverse()).unwrap(),
                "{} {}",
                ty.name,
                kind
            );
        }
    }
}

#[test]
fn test_num_primary_matches_direct_count() {
    let dir = TempDir::new().unwrap();
    let store = loaded_store(&dir);
    let pokemon = store.list_pokemon().unwrap();

    for ty in store.list_types().unwrap() {
        let summary = ty.min_dictify(&store).unwrap();
        let primary = pokemon.iter().filter(|p| p.primary_type_id == ty.id).count();
        let secondary = pokemon.iter().filter(|p| p.secondary_type_id == Some(ty.id)).count();
        assert_eq!(summary.num_primary, primary, "{}", ty.name);
        assert_eq!(summary.num_secondary, secondary, "{}", ty.name);
    }

    let poison = store.find_type_by_name("poison").unwrap().min_dictify(&store).unwrap();
    assert_eq!((poison.num_primary, poison.num_secondary, poison.num_moves), (0, 2, 1));
}

#[test]
fn test_type_record_for_fire() {
    let dir = TempDir::new().unwrap();
    let store = loaded_store(&dir);

    let fire = store.find_type_by_name("Fire").unwrap();
    let first = fire.dictify(&store).unwrap();
    let second = fire.dictify(&store).unwrap();
    assert_eq!(first, second);

    assert_eq!(first.name, "Fire");
    assert_eq!(first.double_damage_to, vec![12]);
    assert_eq!(first.double_damage_from, vec![5, 11]);
    assert_eq!(first.half_damage_to, vec![10, 11]);
    assert_eq!(first.half_damage_from, vec![10, 12, 18]);
    assert!(first.no_damage_to.is_empty());
    assert!(first.no_damage_from.is_empty());
    assert_eq!(first.moves, vec![52]);
    assert_eq!(first.num_primary_type, 1);
}

#[test]
fn test_pokemon_record_for_bulbasaur() {
    let dir = TempDir::new().unwrap();
    let store = loaded_store(&dir);

    let bulbasaur = store.get_pokemon(1).unwrap();
    let map = to_ordered_map(&bulbasaur.dictify(&store).unwrap()).unwrap();

    assert_eq!(map["name"], "Bulbasaur");
    assert_eq!(
        map["stats"],
        serde_json::json!([
            { "base_stat": 45, "name": "speed" },
            { "base_stat": 65, "name": "special_defense" },
            { "base_stat": 65, "name": "special_attack" },
            { "base_stat": 49, "name": "defense" },
            { "base_stat": 49, "name": "attack" },
            { "base_stat": 45, "name": "hp" }
        ])
    );
    assert_eq!(map["primary_type"], 12);
    assert_eq!(map["secondary_type"], 4);
    assert_eq!(map["average_stats"], 53);
    assert_eq!(map["moves"], serde_json::json!([33, 45, 22, 77]));
}

#[test]
fn test_missing_average_is_computed() {
    let dir = TempDir::new().unwrap();
    let store = loaded_store(&dir);

    let squirtle = store.find_pokemon_by_name("squirtle").unwrap();
    assert_eq!(squirtle.average_stats, 52);
    assert!(squirtle.has_consistent_average());
}

#[test]
fn test_duplicate_association_keeps_single_row() {
    let dir = TempDir::new().unwrap();
    let store = loaded_store(&dir);

    let err = store.add_move(1, 33).unwrap_err();
    assert!(matches!(err, Error::DuplicateAssociation { left: 1, right: 33, .. }));

    let tackles = store.moves_of(1).unwrap().into_iter().filter(|m| m.id == 33).count();
    assert_eq!(tackles, 1);
}

#[test]
fn test_move_learners_in_association_order() {
    let dir = TempDir::new().unwrap();
    let store = loaded_store(&dir);

    let growl = store.find_move_by_name("growl").unwrap();
    let record = growl.dictify(&store).unwrap();
    assert_eq!(record.pokemon, vec![1, 4, 25, 35]);
    assert_eq!(record.power, None);
}

#[test]
fn test_reloading_fails_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let mut store = loaded_store(&dir);
    let before = store.stats().unwrap();

    let dataset = Dataset::from_path(Path::new("data/reference_dataset.json")).unwrap();
    let err = dataset.load_into(&mut store, LoadOptions::default()).unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { entity: "type", .. }));
    assert_eq!(store.stats().unwrap(), before);
}
