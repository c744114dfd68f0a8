//! Card definitions - static card data.
//!
//! `CharacterCard` and `MissionCard` hold the immutable properties of a
//! card. Instance-specific data (face, power tokens, lane) is stored
//! separately in `BoardCard`.
//!
//! ## Version families
//!
//! Cosmetic variants and upgrade versions of one character share a
//! *base version*. A card with no explicit base version is its own base.
//! The base version drives deck copy limits and upgrade legality.

use serde::{Deserialize, Serialize};

use crate::effects::{CardEffect, EffectKind};

/// Unique identifier for a card definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Display names of a card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardNames {
    /// Character or mission name; effect references match against it.
    pub name: String,

    /// Epithet shown under the name.
    #[serde(default)]
    pub title: Option<String>,
}

impl CardNames {
    /// Names with no title.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
        }
    }

    /// Case-insensitive name comparison.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

/// Mission rank, ordered `D < C < B < A`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MissionRank {
    D,
    C,
    B,
    A,
}

/// Static character card.
///
/// ## Example
///
/// ```
/// use mission_ccg::cards::{CardId, CharacterCard};
/// use mission_ccg::effects::CardEffect;
///
/// let naruto = CharacterCard::new(CardId::new(1), "Naruto Uzumaki", 3, 3)
///     .with_effect(CardEffect::main("POWERUP 1"));
///
/// assert_eq!(naruto.base_version(), CardId::new(1));
/// assert_eq!(naruto.effects.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterCard {
    pub id: CardId,

    /// Version family this card belongs to, if not its own.
    #[serde(default)]
    pub base_version: Option<CardId>,

    pub names: CardNames,

    /// Chakra cost to play face-up or reveal.
    pub cost: u32,

    /// Printed power.
    pub power: i64,

    #[serde(default)]
    pub effects: Vec<CardEffect>,

    /// Alternate-art flag; has no rules meaning.
    #[serde(default)]
    pub visual: bool,
}

impl CharacterCard {
    /// Create a character with no effects.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, cost: u32, power: i64) -> Self {
        Self {
            id,
            base_version: None,
            names: CardNames::new(name),
            cost,
            power,
            effects: Vec::new(),
            visual: false,
        }
    }

    /// Set the version family (builder pattern).
    #[must_use]
    pub fn with_base_version(mut self, base: CardId) -> Self {
        self.base_version = Some(base);
        self
    }

    /// Add an effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: CardEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Set the title (builder pattern).
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.names.title = Some(title.into());
        self
    }

    /// The version family id.
    #[must_use]
    pub fn base_version(&self) -> CardId {
        self.base_version.unwrap_or(self.id)
    }

    /// Whether two cards belong to the same version family.
    #[must_use]
    pub fn same_family(&self, other: &CharacterCard) -> bool {
        self.base_version() == other.base_version()
    }

    /// Effects of one kind, in printed order.
    pub fn effects_of(&self, kind: EffectKind) -> impl Iterator<Item = &CardEffect> {
        self.effects.iter().filter(move |e| e.kind == kind)
    }
}

/// Static mission card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionCard {
    pub id: CardId,
    pub names: CardNames,

    /// Base points awarded to the lane winner.
    pub points: u32,

    #[serde(default)]
    pub effects: Vec<CardEffect>,
}

impl MissionCard {
    /// Create a mission with no effects.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, points: u32) -> Self {
        Self {
            id,
            names: CardNames::new(name),
            points,
            effects: Vec::new(),
        }
    }

    /// Add an effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: CardEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Extra points from fixed `POWERUP` values on SCORE effects.
    ///
    /// Contextual amounts never count here.
    #[must_use]
    pub fn score_bonus(&self) -> u32 {
        self.effects
            .iter()
            .filter(|e| e.is_score_trigger())
            .filter_map(|e| e.parsed().powerup_value())
            .filter(|&v| v > 0)
            .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
            .fold(0, u32::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id() {
        let id = CardId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Card(42)");
    }

    #[test]
    fn test_rank_order() {
        assert!(MissionRank::D < MissionRank::C);
        assert!(MissionRank::C < MissionRank::B);
        assert!(MissionRank::B < MissionRank::A);
    }

    #[test]
    fn test_version_family() {
        let common = CharacterCard::new(CardId::new(10), "Sakura Haruno", 2, 2);
        let rare = CharacterCard::new(CardId::new(11), "Sakura Haruno", 4, 4)
            .with_base_version(CardId::new(10));
        let other = CharacterCard::new(CardId::new(12), "Rock Lee", 2, 3);

        assert!(common.same_family(&rare));
        assert!(!common.same_family(&other));
        assert_eq!(rare.base_version(), CardId::new(10));
    }

    #[test]
    fn test_names_match_case_insensitive() {
        let names = CardNames::new("Kakashi Hatake");
        assert!(names.matches("kakashi hatake"));
        assert!(names.matches("  KAKASHI HATAKE "));
        assert!(!names.matches("Kakashi"));
    }

    #[test]
    fn test_mission_score_bonus() {
        let mission = MissionCard::new(CardId::new(100), "Escort", 3)
            .with_effect(CardEffect::score("POWERUP 2"))
            .with_effect(CardEffect::main("POWERUP 5"))
            .with_effect(CardEffect::score("POWERUP X"));
        assert_eq!(mission.score_bonus(), 2);
    }

    #[test]
    fn test_character_serialization() {
        let card = CharacterCard::new(CardId::new(1), "Test", 2, 3)
            .with_effect(CardEffect::ambush("POWERUP 2"));

        let json = serde_json::to_string(&card).unwrap();
        let deserialized: CharacterCard = serde_json::from_str(&json).unwrap();

        assert_eq!(card, deserialized);
        assert_eq!(deserialized.effects[0].parsed().powerup_value(), Some(2));
    }
}
