//! Relation kinds - directed type-effectiveness edges
//!
//! Every type-to-type relationship falls into one of six directed kinds:
//! - `DoubleDamageTo` / `DoubleDamageFrom`
//! - `HalfDamageTo` / `HalfDamageFrom`
//! - `NoDamageTo` / `NoDamageFrom`
//!
//! Each kind is stored in its own table with `(origin, opposing)` columns.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The six directed type-effectiveness relations.
///
/// Variant order is the canonical serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// origin deals double damage to opposing
    DoubleDamageTo,
    /// origin takes double damage from opposing
    DoubleDamageFrom,
    /// origin deals half damage to opposing
    HalfDamageTo,
    /// origin takes half damage from opposing
    HalfDamageFrom,
    /// origin deals no damage to opposing
    NoDamageTo,
    /// origin takes no damage from opposing
    NoDamageFrom,
}

impl RelationKind {
    /// Get the string representation, which is also the table name
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::DoubleDamageTo => "double_damage_to",
            RelationKind::DoubleDamageFrom => "double_damage_from",
            RelationKind::HalfDamageTo => "half_damage_to",
            RelationKind::HalfDamageFrom => "half_damage_from",
            RelationKind::NoDamageTo => "no_damage_to",
            RelationKind::NoDamageFrom => "no_damage_from",
        }
    }

    /// Name of the junction table backing this relation
    pub fn table_name(&self) -> &'static str {
        self.as_str()
    }

    /// Get all relation kinds in canonical order
    pub fn all() -> &'static [RelationKind] {
        &[
            RelationKind::DoubleDamageTo,
            RelationKind::DoubleDamageFrom,
            RelationKind::HalfDamageTo,
            RelationKind::HalfDamageFrom,
            RelationKind::NoDamageTo,
            RelationKind::NoDamageFrom,
        ]
    }

    /// Check if this kind describes damage dealt (the "to" direction)
    pub fn is_outgoing(&self) -> bool {
        matches!(
            self,
            RelationKind::DoubleDamageTo | RelationKind::HalfDamageTo | RelationKind::NoDamageTo
        )
    }

    /// Damage multiplier this relation represents
    pub fn multiplier(&self) -> f32 {
        match self {
            RelationKind::DoubleDamageTo | RelationKind::DoubleDamageFrom => 2.0,
            RelationKind::HalfDamageTo | RelationKind::HalfDamageFrom => 0.5,
            RelationKind::NoDamageTo | RelationKind::NoDamageFrom => 0.0,
        }
    }

    /// Get the dual kind: A `x_to` B holds exactly when B `x_from` A does
    pub fn inverse(&self) -> RelationKind {
        match self {
            RelationKind::DoubleDamageTo => RelationKind::DoubleDamageFrom,
            RelationKind::DoubleDamageFrom => RelationKind::DoubleDamageTo,
            RelationKind::HalfDamageTo => RelationKind::HalfDamageFrom,
            RelationKind::HalfDamageFrom => RelationKind::HalfDamageTo,
            RelationKind::NoDamageTo => RelationKind::NoDamageFrom,
            RelationKind::NoDamageFrom => RelationKind::NoDamageTo,
        }
    }
}

impl FromStr for RelationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "double_damage_to" => Ok(RelationKind::DoubleDamageTo),
            "double_damage_from" => Ok(RelationKind::DoubleDamageFrom),
            "half_damage_to" => Ok(RelationKind::HalfDamageTo),
            "half_damage_from" => Ok(RelationKind::HalfDamageFrom),
            "no_damage_to" => Ok(RelationKind::NoDamageTo),
            "no_damage_from" => Ok(RelationKind::NoDamageFrom),
            _ => Err(Error::InvalidValue(format!("Unknown relation kind: {}", s))),
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single row of a relation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeEdge {
    pub kind: RelationKind,
    /// Type the relation belongs to
    pub origin: i64,
    /// Type on the other end
    pub opposing: i64,
}

impl TypeEdge {
    pub fn new(kind: RelationKind, origin: i64, opposing: i64) -> Self {
        Self {
            kind,
            origin,
            opposing,
        }
    }

    /// The edge that must also exist for the chart to be consistent
    pub fn dual(&self) -> Self {
        Self {
            kind: self.kind.inverse(),
            origin: self.opposing,
            opposing: self.origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_relation_kind_roundtrip() {
        for kind in RelationKind::all() {
            let parsed: RelationKind = kind.as_str().parse().unwrap();
            assert_eq!(*kind, parsed);
        }
        assert_eq!(
            RelationKind::from_str("Half-Damage-From").unwrap(),
            RelationKind::HalfDamageFrom
        );
    }

    #[test]
    fn test_inverse_is_involution() {
        for kind in RelationKind::all() {
            assert_ne!(kind.inverse(), *kind);
            assert_eq!(kind.inverse().inverse(), *kind);
            assert_ne!(kind.is_outgoing(), kind.inverse().is_outgoing());
            assert_eq!(kind.multiplier(), kind.inverse().multiplier());
        }
    }

    #[test]
    fn test_table_names_are_distinct() {
        let names: HashSet<_> = RelationKind::all().iter().map(|k| k.table_name()).collect();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_edge_dual() {
        let edge = TypeEdge::new(RelationKind::DoubleDamageTo, 10, 12);
        let dual = edge.dual();

        assert_eq!(dual, TypeEdge::new(RelationKind::DoubleDamageFrom, 12, 10));
        assert_eq!(dual.dual(), edge);
    }
}
