//! Entity types - the three record kinds of the reference dataset
//!
//! - `Type`: elemental type (fire, water, ...)
//! - `Pokemon`: species with six base stats and one or two types
//! - `Move`: battle move with optional stats and a damage class

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Damage class of a move - a small closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageClass {
    /// Contact-style damage computed from attack/defense
    Physical,
    /// Ranged damage computed from special attack/special defense
    Special,
    /// No direct damage
    Status,
}

impl DamageClass {
    /// Get the string representation of the damage class
    pub fn as_str(&self) -> &'static str {
        match self {
            DamageClass::Physical => "physical",
            DamageClass::Special => "special",
            DamageClass::Status => "status",
        }
    }

    /// Get all damage classes
    pub fn all() -> &'static [DamageClass] {
        &[DamageClass::Physical, DamageClass::Special, DamageClass::Status]
    }
}

impl FromStr for DamageClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "physical" => Ok(DamageClass::Physical),
            "special" => Ok(DamageClass::Special),
            "status" => Ok(DamageClass::Status),
            _ => Err(Error::InvalidValue(format!("Unknown damage class: {}", s))),
        }
    }
}

impl std::fmt::Display for DamageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An elemental type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
    pub id: i64,
    /// Stored verbatim; title-cased only when serialized
    pub name: String,
    pub generation: i64,
}

impl Type {
    pub fn new(id: i64, name: impl Into<String>, generation: i64) -> Self {
        Self {
            id,
            name: name.into(),
            generation,
        }
    }
}

/// Largest base stat a species can carry.
pub const MAX_BASE_STAT: i64 = 255;

/// The six base stats of a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub special_attack: i64,
    pub special_defense: i64,
    pub speed: i64,
}

impl BaseStats {
    pub fn new(
        hp: i64,
        attack: i64,
        defense: i64,
        special_attack: i64,
        special_defense: i64,
        speed: i64,
    ) -> Self {
        Self {
            hp,
            attack,
            defense,
            special_attack,
            special_defense,
            speed,
        }
    }

    fn named(&self) -> [(&'static str, i64); 6] {
        [
            ("hp", self.hp),
            ("attack", self.attack),
            ("defense", self.defense),
            ("special_attack", self.special_attack),
            ("special_defense", self.special_defense),
            ("speed", self.speed),
        ]
    }

    /// Sum of all six stats; widened so any six `i64` values fit
    pub fn total(&self) -> i128 {
        self.named().iter().map(|(_, v)| i128::from(*v)).sum()
    }

    /// Integer mean of the six stats (rounded down)
    pub fn average(&self) -> i64 {
        // A floored mean of i64 values always lies within i64
        self.total().div_euclid(6) as i64
    }

    /// Check that every stat lies in `1..=MAX_BASE_STAT`
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.named() {
            if !(1..=MAX_BASE_STAT).contains(&value) {
                return Err(Error::InvalidValue(format!(
                    "base stat {} = {} is outside 1..={}",
                    name, value, MAX_BASE_STAT
                )));
            }
        }
        Ok(())
    }
}

/// A species in the reference dataset.
///
/// `average_stats` is expected to equal `stats.average()`. Storage does not
/// enforce this; `Pokemon::new` derives it and imported data may override it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: i64,
    pub name: String,
    pub stats: BaseStats,
    pub average_stats: i64,
    pub primary_type_id: i64,
    pub secondary_type_id: Option<i64>,
}

impl Pokemon {
    /// Create a single-typed species; `average_stats` is derived from `stats`
    pub fn new(id: i64, name: impl Into<String>, stats: BaseStats, primary_type_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            average_stats: stats.average(),
            stats,
            primary_type_id,
            secondary_type_id: None,
        }
    }

    pub fn with_secondary_type(mut self, type_id: i64) -> Self {
        self.secondary_type_id = Some(type_id);
        self
    }

    /// Override the stored average (reference data carries its own value)
    pub fn with_average_stats(mut self, average_stats: i64) -> Self {
        self.average_stats = average_stats;
        self
    }

    /// Check whether the stored average matches the stats
    pub fn has_consistent_average(&self) -> bool {
        self.average_stats == self.stats.average()
    }
}

/// A battle move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub id: i64,
    pub name: String,
    pub accuracy: Option<i64>,
    pub pp: Option<i64>,
    pub priority: Option<i64>,
    /// `None` for moves without a power value (most status moves)
    pub power: Option<i64>,
    pub damage_class: DamageClass,
    pub type_id: i64,
}

impl Move {
    /// Create a move with no optional stats set
    pub fn new(id: i64, name: impl Into<String>, damage_class: DamageClass, type_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            accuracy: None,
            pp: None,
            priority: None,
            power: None,
            damage_class,
            type_id,
        }
    }

    pub fn with_accuracy(mut self, accuracy: i64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn with_pp(mut self, pp: i64) -> Self {
        self.pp = Some(pp);
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_power(mut self, power: i64) -> Self {
        self.power = Some(power);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_class_roundtrip() {
        for class in DamageClass::all() {
            let parsed: DamageClass = class.as_str().parse().unwrap();
            assert_eq!(*class, parsed);
        }
    }

    #[test]
    fn test_damage_class_rejects_unknown() {
        let err = DamageClass::from_str("psychic").unwrap_err();
        assert!(matches!(err, Error::InvalidValue(_)));
        assert_eq!(DamageClass::from_str(" Status ").unwrap(), DamageClass::Status);
    }

    #[test]
    fn test_average_is_floored_mean() {
        let bulbasaur = BaseStats::new(45, 49, 49, 65, 65, 45);
        assert_eq!(bulbasaur.total(), 318);
        assert_eq!(bulbasaur.average(), 53);

        let pikachu = BaseStats::new(35, 55, 40, 50, 50, 90);
        assert_eq!(pikachu.average(), 53);
    }

    #[test]
    fn test_extreme_stats_do_not_overflow() {
        let huge = BaseStats::new(i64::MAX, 1, 1, 1, 1, 1);
        assert_eq!(huge.total(), i128::from(i64::MAX) + 5);
        assert_eq!(huge.average(), (i128::from(i64::MAX) + 5).div_euclid(6) as i64);

        let negative = BaseStats::new(i64::MIN, i64::MIN, 0, 0, 0, 0);
        assert_eq!(negative.average(), (2 * i128::from(i64::MIN)).div_euclid(6) as i64);
    }

    #[test]
    fn test_stat_range_validation() {
        assert!(BaseStats::new(45, 49, 49, 65, 65, 45).validate().is_ok());
        assert!(BaseStats::new(1, 1, 1, 1, 1, MAX_BASE_STAT).validate().is_ok());

        let err = BaseStats::new(45, 49, 49, 65, 65, 256).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidValue(ref msg) if msg.contains("speed")));
        assert!(BaseStats::new(0, 49, 49, 65, 65, 45).validate().is_err());
        assert!(BaseStats::new(i64::MAX, 1, 1, 1, 1, 1).validate().is_err());
    }

    #[test]
    fn test_pokemon_creation() {
        let stats = BaseStats::new(45, 49, 49, 65, 65, 45);
        let pokemon = Pokemon::new(1, "bulbasaur", stats, 12).with_secondary_type(4);

        assert_eq!(pokemon.average_stats, 53);
        assert_eq!(pokemon.secondary_type_id, Some(4));
        assert!(pokemon.has_consistent_average());
        assert!(!pokemon.with_average_stats(60).has_consistent_average());
    }

    #[test]
    fn test_move_builder() {
        let growl = Move::new(45, "growl", DamageClass::Status, 1)
            .with_accuracy(100)
            .with_pp(40)
            .with_priority(0);

        assert_eq!(growl.power, None);
        assert_eq!(growl.accuracy, Some(100));
        assert_eq!(growl.damage_class, DamageClass::Status);
    }
}
