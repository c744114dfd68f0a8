//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores the reference card pool. Hosts that receive
//! decks as id lists resolve them here into a `Deck`. Registration primes
//! every effect's parse cache, so each distinct description is parsed once
//! for the whole pool.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use super::definition::{CardId, CharacterCard, MissionCard};
use crate::core::{ConfigError, Deck, DeckList};
use crate::effects::EffectCache;

/// Registry of character and mission definitions.
///
/// ## Example
///
/// ```
/// use mission_ccg::cards::{CardRegistry, CharacterCard, CardId};
///
/// let mut registry = CardRegistry::new();
/// registry.register_character(CharacterCard::new(CardId::new(1), "Hinata Hyuga", 2, 2)).unwrap();
///
/// let found = registry.character(CardId::new(1)).unwrap();
/// assert_eq!(found.names.name, "Hinata Hyuga");
/// ```
#[derive(Debug, Default)]
pub struct CardRegistry {
    characters: FxHashMap<CardId, CharacterCard>,
    missions: FxHashMap<CardId, MissionCard>,
    parse_cache: EffectCache,
}

/// Registration failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("card {0} is already registered")]
pub struct DuplicateCard(pub CardId);

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a character definition.
    pub fn register_character(&mut self, card: CharacterCard) -> Result<(), DuplicateCard> {
        if self.missions.contains_key(&card.id) {
            return Err(DuplicateCard(card.id));
        }
        match self.characters.entry(card.id) {
            Entry::Occupied(_) => Err(DuplicateCard(card.id)),
            Entry::Vacant(slot) => {
                for effect in &card.effects {
                    effect.prime(self.parse_cache.get_or_parse(&effect.description));
                }
                slot.insert(card);
                Ok(())
            }
        }
    }

    /// Register a mission definition.
    pub fn register_mission(&mut self, card: MissionCard) -> Result<(), DuplicateCard> {
        if self.characters.contains_key(&card.id) {
            return Err(DuplicateCard(card.id));
        }
        match self.missions.entry(card.id) {
            Entry::Occupied(_) => Err(DuplicateCard(card.id)),
            Entry::Vacant(slot) => {
                for effect in &card.effects {
                    effect.prime(self.parse_cache.get_or_parse(&effect.description));
                }
                slot.insert(card);
                Ok(())
            }
        }
    }

    /// Get a character definition by ID.
    #[must_use]
    pub fn character(&self, id: CardId) -> Option<&CharacterCard> {
        self.characters.get(&id)
    }

    /// Get a mission definition by ID.
    #[must_use]
    pub fn mission(&self, id: CardId) -> Option<&MissionCard> {
        self.missions.get(&id)
    }

    /// All versions of a family, cheapest first.
    #[must_use]
    pub fn family(&self, base: CardId) -> Vec<&CharacterCard> {
        let mut versions: Vec<_> = self
            .characters
            .values()
            .filter(|c| c.base_version() == base)
            .collect();
        versions.sort_by_key(|c| (c.cost, c.id));
        versions
    }

    /// Number of registered cards of both kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.characters.len() + self.missions.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct effect descriptions parsed so far.
    #[must_use]
    pub fn parsed_descriptions(&self) -> usize {
        self.parse_cache.len()
    }

    /// Build a `Deck` from an id list.
    ///
    /// Size and copy limits are checked later by `GameConfig::validate`.
    pub fn resolve_deck(&self, list: &DeckList) -> Result<Deck, ConfigError> {
        let characters = list
            .characters
            .iter()
            .map(|&id| self.character(id).cloned().ok_or(ConfigError::UnknownCard(id)))
            .collect::<Result<Vec<_>, _>>()?;
        let missions = list
            .missions
            .iter()
            .map(|&id| self.mission(id).cloned().ok_or(ConfigError::UnknownCard(id)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Deck {
            characters,
            missions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::CardEffect;

    #[test]
    fn test_register_and_get() {
        let mut registry = CardRegistry::new();
        registry
            .register_character(CharacterCard::new(CardId::new(1), "Test Card", 1, 1))
            .unwrap();

        assert!(registry.character(CardId::new(1)).is_some());
        assert!(registry.character(CardId::new(99)).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = CardRegistry::new();
        registry
            .register_character(CharacterCard::new(CardId::new(1), "A", 1, 1))
            .unwrap();

        assert_eq!(
            registry.register_character(CharacterCard::new(CardId::new(1), "B", 1, 1)),
            Err(DuplicateCard(CardId::new(1)))
        );
        assert_eq!(
            registry.register_mission(MissionCard::new(CardId::new(1), "M", 1)),
            Err(DuplicateCard(CardId::new(1)))
        );
    }

    #[test]
    fn test_shared_descriptions_parsed_once() {
        let mut registry = CardRegistry::new();
        for i in 0..5 {
            registry
                .register_character(
                    CharacterCard::new(CardId::new(i), format!("Genin {i}"), 1, 1)
                        .with_effect(CardEffect::main("POWERUP 1")),
                )
                .unwrap();
        }
        assert_eq!(registry.parsed_descriptions(), 1);
    }

    #[test]
    fn test_family_sorted_by_cost() {
        let mut registry = CardRegistry::new();
        registry
            .register_character(
                CharacterCard::new(CardId::new(3), "Itachi", 6, 6).with_base_version(CardId::new(1)),
            )
            .unwrap();
        registry
            .register_character(CharacterCard::new(CardId::new(1), "Itachi", 3, 3))
            .unwrap();
        registry
            .register_character(CharacterCard::new(CardId::new(2), "Kisame", 3, 4))
            .unwrap();

        let ids: Vec<_> = registry.family(CardId::new(1)).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![CardId::new(1), CardId::new(3)]);
    }

    #[test]
    fn test_resolve_deck() {
        let mut registry = CardRegistry::new();
        registry
            .register_character(CharacterCard::new(CardId::new(1), "A", 1, 1))
            .unwrap();
        registry.register_mission(MissionCard::new(CardId::new(50), "M", 2)).unwrap();

        let list = DeckList {
            characters: vec![CardId::new(1), CardId::new(1)],
            missions: vec![CardId::new(50)],
        };
        let deck = registry.resolve_deck(&list).unwrap();
        assert_eq!(deck.characters.len(), 2);
        assert_eq!(deck.missions.len(), 1);

        let bad = DeckList {
            characters: vec![CardId::new(7)],
            missions: vec![],
        };
        assert_eq!(registry.resolve_deck(&bad).unwrap_err(), ConfigError::UnknownCard(CardId::new(7)));
    }
}
