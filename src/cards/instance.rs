//! Board cards - characters in play.
//!
//! A `BoardCard` is a character instance placed in one of the three mission
//! lanes. It tracks mutable state: face, power tokens, the versions it was
//! upgraded through, and the MAIN effects layered on it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::definition::{CardId, CharacterCard};
use crate::core::{InstanceId, PlayerId};
use crate::effects::{CardEffect, EffectKind};

/// Number of mission lanes on the board.
pub const LANE_COUNT: usize = 3;

/// Face state of a board card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Up,
    Down,
}

/// A character in play.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardCard {
    /// Stable id while in play.
    pub instance: InstanceId,

    pub owner: PlayerId,

    /// Current (top) version.
    pub card: Arc<CharacterCard>,

    pub face: Face,

    /// Persistent power from POWERUP effects.
    pub power_tokens: i64,

    /// Card ids this instance has been, oldest first; the last is `card.id`.
    pub versions: Vec<CardId>,

    /// MAIN effects currently layered on this card.
    pub main_chain: Vec<CardEffect>,

    /// Lane index, `0..LANE_COUNT`.
    pub lane: usize,

    /// Global play order; earlier entries resolve SCORE effects first.
    pub entered_seq: u32,
}

impl BoardCard {
    /// Create a board card from a freshly played character.
    #[must_use]
    pub fn new(
        instance: InstanceId,
        owner: PlayerId,
        card: Arc<CharacterCard>,
        face: Face,
        lane: usize,
        entered_seq: u32,
    ) -> Self {
        let main_chain = card.effects_of(EffectKind::Main).cloned().collect();
        let versions = vec![card.id];
        Self {
            instance,
            owner,
            card,
            face,
            power_tokens: 0,
            versions,
            main_chain,
            lane,
            entered_seq,
        }
    }

    /// Whether the card is face-up.
    #[must_use]
    pub fn is_face_up(&self) -> bool {
        self.face == Face::Up
    }

    /// Printed power plus tokens, before continuous modifiers.
    ///
    /// Face-down cards contribute nothing.
    #[must_use]
    pub fn base_power(&self) -> i64 {
        match self.face {
            Face::Up => self.card.power.saturating_add(self.power_tokens),
            Face::Down => 0,
        }
    }

    /// Flip face-up.
    pub fn reveal(&mut self) {
        self.face = Face::Up;
    }

    /// Place power tokens.
    pub fn add_tokens(&mut self, amount: i64) {
        self.power_tokens = self.power_tokens.saturating_add(amount);
    }

    /// Replace the top version, layering or replacing the MAIN chain.
    ///
    /// Returns the previous top version.
    pub fn upgrade_to(&mut self, card: Arc<CharacterCard>) -> Arc<CharacterCard> {
        let new_mains: Vec<CardEffect> = card.effects_of(EffectKind::Main).cloned().collect();
        if new_mains.iter().any(|e| e.parsed().is_effect_modifier) {
            self.main_chain.extend(new_mains);
        } else {
            self.main_chain = new_mains;
        }
        self.versions.push(card.id);
        std::mem::replace(&mut self.card, card)
    }

    /// Effects currently in force: the MAIN chain plus the top version's
    /// other effects.
    pub fn active_effects(&self) -> impl Iterator<Item = &CardEffect> {
        self.main_chain
            .iter()
            .chain(self.card.effects.iter().filter(|e| e.kind != EffectKind::Main))
    }

    /// Active `CHAKRA +n` total; face-down cards grant nothing.
    #[must_use]
    pub fn chakra_bonus(&self) -> i64 {
        if !self.is_face_up() {
            return 0;
        }
        self.active_effects()
            .filter_map(|e| e.parsed().chakra_bonus)
            .fold(0, i64::saturating_add)
    }
}
