//! Database schema definitions

use crate::relation::RelationKind;

/// SQL to create the types table
pub const CREATE_TYPES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS types (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(name) > 0),
    name_key TEXT NOT NULL UNIQUE,
    generation INTEGER NOT NULL
)
"#;

/// SQL to create the pokemon table
pub const CREATE_POKEMON_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS pokemon (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(name) > 0),
    name_key TEXT NOT NULL UNIQUE,
    hp INTEGER NOT NULL,
    attack INTEGER NOT NULL,
    defense INTEGER NOT NULL,
    special_attack INTEGER NOT NULL,
    special_defense INTEGER NOT NULL,
    speed INTEGER NOT NULL,
    average_stats INTEGER NOT NULL,
    primary_type_id INTEGER NOT NULL REFERENCES types(id),
    secondary_type_id INTEGER REFERENCES types(id)
)
"#;

/// SQL to create the moves table
pub const CREATE_MOVES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS moves (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(name) > 0),
    name_key TEXT NOT NULL UNIQUE,
    accuracy INTEGER,
    pp INTEGER,
    priority INTEGER,
    power INTEGER,
    damage_class TEXT NOT NULL CHECK (damage_class IN ('physical', 'special', 'status')),
    type_id INTEGER NOT NULL REFERENCES types(id)
)
"#;

/// SQL to create the pokemon_move junction table
/// Rows are kept in insertion order via the autoincrement id
pub const CREATE_POKEMON_MOVE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS pokemon_move (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pokemon_id INTEGER NOT NULL REFERENCES pokemon(id),
    move_id INTEGER NOT NULL REFERENCES moves(id),
    CONSTRAINT pokemon_move_pair UNIQUE (pokemon_id, move_id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_pokemon_primary_type ON pokemon(primary_type_id)",
    "CREATE INDEX IF NOT EXISTS idx_pokemon_secondary_type ON pokemon(secondary_type_id)",
    "CREATE INDEX IF NOT EXISTS idx_moves_type ON moves(type_id)",
    "CREATE INDEX IF NOT EXISTS idx_pokemon_move_move ON pokemon_move(move_id)",
];

/// SQL to create the table backing one relation kind.
///
/// Every table carries its own uniquely named pair constraint.
pub fn create_relation_table(kind: RelationKind) -> String {
    let table = kind.table_name();
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {table} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    origin INTEGER NOT NULL REFERENCES types(id),
    opposing INTEGER NOT NULL REFERENCES types(id),
    CONSTRAINT {table}_pair UNIQUE (origin, opposing)
)
"#
    )
}

/// SQL to index the reverse side of a relation table
pub fn create_relation_index(kind: RelationKind) -> String {
    let table = kind.table_name();
    format!("CREATE INDEX IF NOT EXISTS idx_{table}_opposing ON {table}(opposing)")
}

/// All schema creation statements, parents before children
pub fn all_schema_statements() -> Vec<String> {
    let mut stmts: Vec<String> = [
        CREATE_TYPES_TABLE,
        CREATE_POKEMON_TABLE,
        CREATE_MOVES_TABLE,
        CREATE_POKEMON_MOVE_TABLE,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    stmts.extend(RelationKind::all().iter().map(|k| create_relation_table(*k)));
    stmts.extend(CREATE_INDEXES.iter().map(|s| s.to_string()));
    stmts.extend(RelationKind::all().iter().map(|k| create_relation_index(*k)));
    stmts
}
