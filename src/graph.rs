//! Relationship Graph - query-time traversal of the type chart
//!
//! Resolves a type's six directed edge sets and its reverse membership
//! (pokemon with it as primary/secondary type, moves of it). Nothing is
//! cached; every call reads the store.

use std::collections::HashSet;
use crate::Result;
use crate::entity::Type;
use crate::relation::{RelationKind, TypeEdge};
use crate::storage::SqliteStore;

/// The six resolved edge sets of one type, each ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRelations {
    pub origin: Type,
    pub double_damage_to: Vec<Type>,
    pub double_damage_from: Vec<Type>,
    pub half_damage_to: Vec<Type>,
    pub half_damage_from: Vec<Type>,
    pub no_damage_to: Vec<Type>,
    pub no_damage_from: Vec<Type>,
}

impl TypeRelations {
    /// Get the edge set for one kind
    pub fn get(&self, kind: RelationKind) -> &[Type] {
        match kind {
            RelationKind::DoubleDamageTo => &self.double_damage_to,
            RelationKind::DoubleDamageFrom => &self.double_damage_from,
            RelationKind::HalfDamageTo => &self.half_damage_to,
            RelationKind::HalfDamageFrom => &self.half_damage_from,
            RelationKind::NoDamageTo => &self.no_damage_to,
            RelationKind::NoDamageFrom => &self.no_damage_from,
        }
    }

    /// Opposing type ids for one kind
    pub fn ids(&self, kind: RelationKind) -> Vec<i64> {
        self.get(kind).iter().map(|t| t.id).collect()
    }

    /// Check if the type has no edges at all
    pub fn is_empty(&self) -> bool {
        RelationKind::all().iter().all(|k| self.get(*k).is_empty())
    }
}

/// Reverse membership counts of one type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeMembership {
    pub num_primary_type: usize,
    pub num_secondary_type: usize,
    pub num_moves: usize,
}

/// An edge whose dual edge is missing from the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DualityViolation {
    /// Edge that exists
    pub edge: TypeEdge,
    /// Edge that should exist alongside it
    pub missing: TypeEdge,
}

impl std::fmt::Display for DualityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} -> {} has no matching {} {} -> {}",
            self.edge.kind,
            self.edge.origin,
            self.edge.opposing,
            self.missing.kind,
            self.missing.origin,
            self.missing.opposing
        )
    }
}

/// Query-time view over the type relations held by a store
pub struct RelationshipGraph<'a> {
    store: &'a SqliteStore,
}

impl<'a> RelationshipGraph<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Types related to `type_id` by `kind`, ordered by id
    ///
    /// Fails with `NotFound` if the origin type does not exist.
    pub fn related(&self, type_id: i64, kind: RelationKind) -> Result<Vec<Type>> {
        self.store.get_type(type_id)?;
        self.store.related_types(kind, type_id)
    }

    /// Types that list `type_id` in their `kind` set, ordered by id
    ///
    /// Reads the stored edges backwards, so the answer does not depend on
    /// the dual edges being present.
    pub fn referenced_by(&self, type_id: i64, kind: RelationKind) -> Result<Vec<Type>> {
        self.store.get_type(type_id)?;
        self.store.referencing_types(kind, type_id)
    }

    /// Resolve all six edge sets of a type
    pub fn relations(&self, type_id: i64) -> Result<TypeRelations> {
        let origin = self.store.get_type(type_id)?;
        let resolve = |kind| self.store.related_types(kind, type_id);

        Ok(TypeRelations {
            double_damage_to: resolve(RelationKind::DoubleDamageTo)?,
            double_damage_from: resolve(RelationKind::DoubleDamageFrom)?,
            half_damage_to: resolve(RelationKind::HalfDamageTo)?,
            half_damage_from: resolve(RelationKind::HalfDamageFrom)?,
            no_damage_to: resolve(RelationKind::NoDamageTo)?,
            no_damage_from: resolve(RelationKind::NoDamageFrom)?,
            origin,
        })
    }

    /// Count pokemon with this type as primary type
    pub fn num_primary_type(&self, type_id: i64) -> Result<usize> {
        self.store.get_type(type_id)?;
        self.store.count_pokemon_by_primary_type(type_id)
    }

    /// Count pokemon with this type as secondary type
    pub fn num_secondary_type(&self, type_id: i64) -> Result<usize> {
        self.store.get_type(type_id)?;
        self.store.count_pokemon_by_secondary_type(type_id)
    }

    /// Count moves of this type
    pub fn num_moves(&self, type_id: i64) -> Result<usize> {
        self.store.get_type(type_id)?;
        self.store.count_moves_by_type(type_id)
    }

    /// All three reverse counts at once
    pub fn membership(&self, type_id: i64) -> Result<TypeMembership> {
        self.store.get_type(type_id)?;
        Ok(TypeMembership {
            num_primary_type: self.store.count_pokemon_by_primary_type(type_id)?,
            num_secondary_type: self.store.count_pokemon_by_secondary_type(type_id)?,
            num_moves: self.store.count_moves_by_type(type_id)?,
        })
    }

    /// Find every edge whose dual edge is missing.
    ///
    /// For each edge A `x_to` B the chart should also hold B `x_from` A, and
    /// the other way round. Results are sorted by edge.
    pub fn check_duality(&self) -> Result<Vec<DualityViolation>> {
        let mut all_edges = Vec::new();
        for kind in RelationKind::all() {
            all_edges.extend(self.store.relation_edges(*kind)?);
        }

        let present: HashSet<TypeEdge> = all_edges.iter().copied().collect();
        let mut violations: Vec<DualityViolation> = all_edges
            .into_iter()
            .filter_map(|edge| {
                let dual = edge.dual();
                (!present.contains(&dual)).then_some(DualityViolation { edge, missing: dual })
            })
            .collect();

        violations.sort();
        if !violations.is_empty() {
            tracing::debug!("Duality check found {} violations", violations.len());
        }
        Ok(violations)
    }
}
