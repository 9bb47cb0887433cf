//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, ErrorCode, OptionalExtension, ffi, params};
use crate::{Error, Result};
use crate::entity::{BaseStats, DamageClass, Move, Pokemon, Type};
use crate::relation::{RelationKind, TypeEdge};
use super::schema;

const TYPE_COLUMNS: &str = "t.id, t.name, t.generation";

const POKEMON_COLUMNS: &str = "p.id, p.name, p.hp, p.attack, p.defense, p.special_attack, \
     p.special_defense, p.speed, p.average_stats, p.primary_type_id, p.secondary_type_id";

const MOVE_COLUMNS: &str =
    "m.id, m.name, m.accuracy, m.pp, m.priority, m.power, m.damage_class, m.type_id";

/// Lookup key for a name: Unicode lowercase, so `Flabébé` and `FLABÉBÉ` collide
fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Kind of constraint a failed statement tripped over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstraintFailure {
    /// UNIQUE or PRIMARY KEY
    Unique,
    ForeignKey,
    /// CHECK, NOT NULL
    Other,
}

fn constraint_failure(err: &rusqlite::Error) -> Option<ConstraintFailure> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            Some(match e.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    ConstraintFailure::Unique
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintFailure::ForeignKey,
                _ => ConstraintFailure::Other,
            })
        }
        _ => None,
    }
}

/// Map a failed entity insert onto the error taxonomy
fn insert_error(err: rusqlite::Error, entity: &'static str, key: String) -> Error {
    match constraint_failure(&err) {
        Some(ConstraintFailure::Unique) => Error::DuplicateKey { entity, key },
        Some(_) => Error::ConstraintViolation(format!("{} {}: {}", entity, key, err)),
        None => Error::Storage(err),
    }
}

/// Map a failed junction insert onto the error taxonomy
fn association_error(err: rusqlite::Error, table: &'static str, left: i64, right: i64) -> Error {
    match constraint_failure(&err) {
        Some(ConstraintFailure::Unique) => Error::DuplicateAssociation { table, left, right },
        Some(_) => Error::ConstraintViolation(format!("{} ({}, {}): {}", table, left, right, err)),
        None => Error::Storage(err),
    }
}

fn delete_error(err: rusqlite::Error, entity: &'static str, id: i64) -> Error {
    match constraint_failure(&err) {
        Some(_) => Error::ConstraintViolation(format!("{} {} is still referenced", entity, id)),
        None => Error::Storage(err),
    }
}

/// SQLite-backed storage for the reference dataset
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        // Foreign keys are off by default and must be enabled per connection
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(&stmt, [])?;
        }
        Ok(())
    }

    fn exists(&self, table: &str, id: i64) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(&format!("SELECT id FROM {} WHERE id = ?1", table), [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn delete_row(&self, table: &str, entity: &'static str, id: i64) -> Result<()> {
        let affected = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", table), [id])
            .map_err(|e| delete_error(e, entity, id))?;
        if affected == 0 {
            return Err(Error::not_found(entity, id));
        }
        tracing::debug!("Deleted {} {}", entity, id);
        Ok(())
    }

    fn count(&self, sql: &str, id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [id], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_table(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Type Operations ==========

    /// Insert a type; fails with `DuplicateKey` if the id or name is taken
    pub fn insert_type(&self, ty: &Type) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO types (id, name, name_key, generation) VALUES (?1, ?2, ?3, ?4)",
                params![ty.id, ty.name, name_key(&ty.name), ty.generation],
            )
            .map_err(|e| insert_error(e, "type", format!("{} ({})", ty.id, ty.name)))?;
        tracing::debug!("Inserted type {} ({})", ty.id, ty.name);
        Ok(())
    }

    /// Get a type by id
    pub fn get_type(&self, id: i64) -> Result<Type> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM types t WHERE t.id = ?1", TYPE_COLUMNS),
                [id],
                |row| self.row_to_type(row),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("type", id))
    }

    /// Find a type by name (case-insensitive)
    pub fn find_type_by_name(&self, name: &str) -> Result<Type> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM types t WHERE t.name_key = ?1", TYPE_COLUMNS),
                [name_key(name)],
                |row| self.row_to_type(row),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("type", name))
    }

    /// List all types ordered by id
    pub fn list_types(&self) -> Result<Vec<Type>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM types t ORDER BY t.id", TYPE_COLUMNS))?;
        let types = stmt
            .query_map([], |row| self.row_to_type(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(types)
    }

    /// Delete a type; fails while anything still references it
    pub fn delete_type(&self, id: i64) -> Result<()> {
        self.delete_row("types", "type", id)
    }

    fn row_to_type(&self, row: &rusqlite::Row) -> rusqlite::Result<Type> {
        Ok(Type {
            id: row.get(0)?,
            name: row.get(1)?,
            generation: row.get(2)?,
        })
    }

    // ========== Pokemon Operations ==========

    /// Insert a pokemon; both type ids must already exist
    pub fn insert_pokemon(&self, pokemon: &Pokemon) -> Result<()> {
        let stats = &pokemon.stats;
        self.conn
            .execute(
                r#"
                INSERT INTO pokemon (id, name, name_key, hp, attack, defense, special_attack,
                                     special_defense, speed, average_stats, primary_type_id,
                                     secondary_type_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    pokemon.id,
                    pokemon.name,
                    name_key(&pokemon.name),
                    stats.hp,
                    stats.attack,
                    stats.defense,
                    stats.special_attack,
                    stats.special_defense,
                    stats.speed,
                    pokemon.average_stats,
                    pokemon.primary_type_id,
                    pokemon.secondary_type_id,
                ],
            )
            .map_err(|e| insert_error(e, "pokemon", format!("{} ({})", pokemon.id, pokemon.name)))?;
        tracing::debug!("Inserted pokemon {} ({})", pokemon.id, pokemon.name);
        Ok(())
    }

    /// Get a pokemon by id
    pub fn get_pokemon(&self, id: i64) -> Result<Pokemon> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM pokemon p WHERE p.id = ?1", POKEMON_COLUMNS),
                [id],
                |row| self.row_to_pokemon(row),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("pokemon", id))
    }

    /// Find a pokemon by name (case-insensitive)
    pub fn find_pokemon_by_name(&self, name: &str) -> Result<Pokemon> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM pokemon p WHERE p.name_key = ?1", POKEMON_COLUMNS),
                [name_key(name)],
                |row| self.row_to_pokemon(row),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("pokemon", name))
    }

    /// List all pokemon ordered by id
    pub fn list_pokemon(&self) -> Result<Vec<Pokemon>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM pokemon p ORDER BY p.id", POKEMON_COLUMNS))?;
        let pokemon = stmt
            .query_map([], |row| self.row_to_pokemon(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pokemon)
    }

    /// Delete a pokemon; fails while it still has moves
    pub fn delete_pokemon(&self, id: i64) -> Result<()> {
        self.delete_row("pokemon", "pokemon", id)
    }

    /// Count pokemon whose primary type is `type_id`
    pub fn count_pokemon_by_primary_type(&self, type_id: i64) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM pokemon WHERE primary_type_id = ?1", type_id)
    }

    /// Count pokemon whose secondary type is `type_id`
    pub fn count_pokemon_by_secondary_type(&self, type_id: i64) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM pokemon WHERE secondary_type_id = ?1", type_id)
    }

    fn row_to_pokemon(&self, row: &rusqlite::Row) -> rusqlite::Result<Pokemon> {
        Ok(Pokemon {
            id: row.get(0)?,
            name: row.get(1)?,
            stats: BaseStats {
                hp: row.get(2)?,
                attack: row.get(3)?,
                defense: row.get(4)?,
                special_attack: row.get(5)?,
                special_defense: row.get(6)?,
                speed: row.get(7)?,
            },
            average_stats: row.get(8)?,
            primary_type_id: row.get(9)?,
            secondary_type_id: row.get(10)?,
        })
    }

    // ========== Move Operations ==========

    /// Insert a move; its type must already exist
    pub fn insert_move(&self, mv: &Move) -> Result<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO moves (id, name, name_key, accuracy, pp, priority, power, damage_class,
                                   type_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    mv.id,
                    mv.name,
                    name_key(&mv.name),
                    mv.accuracy,
                    mv.pp,
                    mv.priority,
                    mv.power,
                    mv.damage_class.as_str(),
                    mv.type_id,
                ],
            )
            .map_err(|e| insert_error(e, "move", format!("{} ({})", mv.id, mv.name)))?;
        tracing::debug!("Inserted move {} ({})", mv.id, mv.name);
        Ok(())
    }

    /// Get a move by id
    pub fn get_move(&self, id: i64) -> Result<Move> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM moves m WHERE m.id = ?1", MOVE_COLUMNS),
                [id],
                |row| self.row_to_move(row),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("move", id))
    }

    /// Find a move by name (case-insensitive)
    pub fn find_move_by_name(&self, name: &str) -> Result<Move> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM moves m WHERE m.name_key = ?1", MOVE_COLUMNS),
                [name_key(name)],
                |row| self.row_to_move(row),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("move", name))
    }

    /// List all moves ordered by id
    pub fn list_moves(&self) -> Result<Vec<Move>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM moves m ORDER BY m.id", MOVE_COLUMNS))?;
        let moves = stmt
            .query_map([], |row| self.row_to_move(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(moves)
    }

    /// All moves of a type, ordered by id
    pub fn moves_of_type(&self, type_id: i64) -> Result<Vec<Move>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM moves m WHERE m.type_id = ?1 ORDER BY m.id",
            MOVE_COLUMNS
        ))?;
        let moves = stmt
            .query_map([type_id], |row| self.row_to_move(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(moves)
    }

    /// Count moves of a type
    pub fn count_moves_by_type(&self, type_id: i64) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM moves WHERE type_id = ?1", type_id)
    }

    /// Delete a move; fails while any pokemon still learns it
    pub fn delete_move(&self, id: i64) -> Result<()> {
        self.delete_row("moves", "move", id)
    }

    fn row_to_move(&self, row: &rusqlite::Row) -> rusqlite::Result<Move> {
        let class_str: String = row.get(6)?;
        let damage_class: DamageClass = class_str.parse().map_err(|e: Error| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Move {
            id: row.get(0)?,
            name: row.get(1)?,
            accuracy: row.get(2)?,
            pp: row.get(3)?,
            priority: row.get(4)?,
            power: row.get(5)?,
            damage_class,
            type_id: row.get(7)?,
        })
    }

    // ========== Pokemon <-> Move Operations ==========

    /// Associate a move with a pokemon
    ///
    /// Fails with `DuplicateAssociation` if the pair already exists and with
    /// `ConstraintViolation` if either side does not exist.
    pub fn add_move(&self, pokemon_id: i64, move_id: i64) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO pokemon_move (pokemon_id, move_id) VALUES (?1, ?2)",
                params![pokemon_id, move_id],
            )
            .map_err(|e| association_error(e, "pokemon_move", pokemon_id, move_id))?;
        tracing::debug!("Associated move {} with pokemon {}", move_id, pokemon_id);
        Ok(())
    }

    /// Moves of a pokemon in association order
    pub fn moves_of(&self, pokemon_id: i64) -> Result<Vec<Move>> {
        if !self.exists("pokemon", pokemon_id)? {
            return Err(Error::not_found("pokemon", pokemon_id));
        }

        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM pokemon_move pm JOIN moves m ON m.id = pm.move_id \
             WHERE pm.pokemon_id = ?1 ORDER BY pm.id",
            MOVE_COLUMNS
        ))?;
        let moves = stmt
            .query_map([pokemon_id], |row| self.row_to_move(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(moves)
    }

    /// Pokemon that learn a move, in association order
    pub fn pokemon_with(&self, move_id: i64) -> Result<Vec<Pokemon>> {
        if !self.exists("moves", move_id)? {
            return Err(Error::not_found("move", move_id));
        }

        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM pokemon_move pm JOIN pokemon p ON p.id = pm.pokemon_id \
             WHERE pm.move_id = ?1 ORDER BY pm.id",
            POKEMON_COLUMNS
        ))?;
        let pokemon = stmt
            .query_map([move_id], |row| self.row_to_pokemon(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pokemon)
    }

    // ========== Type Relation Operations ==========

    /// Insert one directed relation row
    pub fn insert_relation(&self, kind: RelationKind, origin: i64, opposing: i64) -> Result<()> {
        insert_relation_on(&self.conn, kind, origin, opposing)
    }

    /// Insert a relation row together with its dual, atomically.
    ///
    /// Either both rows are written or neither is. Safe to call inside an
    /// open transaction.
    pub fn insert_matchup(&self, kind: RelationKind, origin: i64, opposing: i64) -> Result<()> {
        self.conn.execute_batch("SAVEPOINT matchup")?;

        let dual = TypeEdge::new(kind, origin, opposing).dual();
        let result = insert_relation_on(&self.conn, kind, origin, opposing)
            .and_then(|_| insert_relation_on(&self.conn, dual.kind, dual.origin, dual.opposing));

        match result {
            Ok(()) => {
                self.conn.execute_batch("RELEASE matchup")?;
                Ok(())
            }
            Err(e) => {
                self.conn.execute_batch("ROLLBACK TO matchup; RELEASE matchup")?;
                Err(e)
            }
        }
    }

    /// Types related to `origin` by `kind`, ordered by id
    pub fn related_types(&self, kind: RelationKind, origin: i64) -> Result<Vec<Type>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM {} r JOIN types t ON t.id = r.opposing WHERE r.origin = ?1 ORDER BY t.id",
            TYPE_COLUMNS,
            kind.table_name()
        ))?;
        let types = stmt
            .query_map([origin], |row| self.row_to_type(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(types)
    }

    /// Types whose `kind` set contains `opposing`, ordered by id
    pub fn referencing_types(&self, kind: RelationKind, opposing: i64) -> Result<Vec<Type>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM {} r JOIN types t ON t.id = r.origin WHERE r.opposing = ?1 ORDER BY t.id",
            TYPE_COLUMNS,
            kind.table_name()
        ))?;
        let types = stmt
            .query_map([opposing], |row| self.row_to_type(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(types)
    }

    /// Every row of a relation kind, ordered by (origin, opposing)
    pub fn relation_edges(&self, kind: RelationKind) -> Result<Vec<TypeEdge>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT origin, opposing FROM {} ORDER BY origin, opposing",
            kind.table_name()
        ))?;
        let edges = stmt
            .query_map([], |row| Ok(TypeEdge::new(kind, row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    /// Count rows across all six relation tables
    pub fn count_relations(&self) -> Result<usize> {
        let mut total = 0;
        for kind in RelationKind::all() {
            total += self.count_table(kind.table_name())?;
        }
        Ok(total)
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    /// Delete all data, children first
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM pokemon_move", [])?;
        for kind in RelationKind::all() {
            self.conn.execute(&format!("DELETE FROM {}", kind.table_name()), [])?;
        }
        self.conn.execute("DELETE FROM pokemon", [])?;
        self.conn.execute("DELETE FROM moves", [])?;
        self.conn.execute("DELETE FROM types", [])?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            types: self.count_table("types")?,
            pokemon: self.count_table("pokemon")?,
            moves: self.count_table("moves")?,
            pokemon_moves: self.count_table("pokemon_move")?,
            relations: self.count_relations()?,
        })
    }
}

fn insert_relation_on(conn: &Connection, kind: RelationKind, origin: i64, opposing: i64) -> Result<()> {
    conn.execute(
        &format!("INSERT INTO {} (origin, opposing) VALUES (?1, ?2)", kind.table_name()),
        params![origin, opposing],
    )
    .map_err(|e| association_error(e, kind.table_name(), origin, opposing))?;
    tracing::debug!("Inserted {} edge {} -> {}", kind, origin, opposing);
    Ok(())
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbStats {
    pub types: usize,
    pub pokemon: usize,
    pub moves: usize,
    pub pokemon_moves: usize,
    pub relations: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Types: {}", self.types)?;
        writeln!(f, "  Pokemon: {}", self.pokemon)?;
        writeln!(f, "  Moves: {}", self.moves)?;
        writeln!(f, "  Pokemon moves: {}", self.pokemon_moves)?;
        writeln!(f, "  Type relations: {}", self.relations)
    }
}
