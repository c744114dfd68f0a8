//! Structured match log.
//!
//! Every committed action yields a list of `MatchEvent`s describing what
//! happened, in order. The log exists for animation and history UIs; the
//! engine never reads it back.
//!
//! Events are safe to send to both seats: a face-down play carries no card
//! identity, draws carry only a count.

use serde::{Deserialize, Serialize};

use super::entity::InstanceId;
use super::player::PlayerId;
use super::state::Phase;
use crate::cards::CardId;
use crate::effects::EffectResolution;
use crate::rules::{LaneScore, MatchResult};

/// One entry of the match log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A phase began.
    PhaseEntered { turn: u32, phase: Phase },

    MulliganDecided { player: PlayerId, redraw: bool },

    /// Start Phase chakra gain, split into base and card bonuses.
    ChakraGained {
        player: PlayerId,
        base: u32,
        bonus: u32,
    },

    CardsDrawn { player: PlayerId, count: u32 },

    /// A character entered a lane. `card` is `None` for face-down plays.
    CharacterPlayed {
        player: PlayerId,
        instance: InstanceId,
        lane: usize,
        card: Option<CardId>,
        chakra_paid: u32,
    },

    CharacterRevealed {
        player: PlayerId,
        instance: InstanceId,
        card: CardId,
        chakra_paid: u32,
    },

    CharacterUpgraded {
        player: PlayerId,
        instance: InstanceId,
        from: CardId,
        to: CardId,
        chakra_paid: u32,
    },

    /// A pass; `took_edge` is set for the first pass of an Action Phase.
    Passed { player: PlayerId, took_edge: bool },

    EffectResolved(EffectResolution),

    LaneScored(LaneScore),

    GameOver(MatchResult),
}

impl MatchEvent {
    /// Whether this event reports an effect that could not resolve.
    #[must_use]
    pub fn is_miss(&self) -> bool {
        matches!(self, MatchEvent::EffectResolved(r) if r.is_miss())
    }
}
