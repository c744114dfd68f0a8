//! Error taxonomy for match creation and action application.
//!
//! - `IllegalAction`: validation failure, reported to the submitter; the
//!   state is unchanged.
//! - `ConfigError`: a deck or rule table is malformed; no match is created.
//! - `MatchError::InvariantViolation`: the match itself is inconsistent and
//!   must be terminated by its driver.
//!
//! Effect targets that cannot be resolved are not errors at all; see
//! `effects::MissReason`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entity::InstanceId;
use super::player::PlayerId;
use crate::cards::CardId;

/// Why a proposed action was rejected.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IllegalAction {
    #[error("the match is over")]
    MatchOver,

    #[error("{0} does not have priority")]
    NotYourPriority(PlayerId),

    #[error("{action} is not allowed during the {phase} phase")]
    WrongPhase { action: String, phase: String },

    #[error("lane {0} does not exist")]
    InvalidLane(usize),

    #[error("card {0} is not in hand")]
    CardNotInHand(InstanceId),

    #[error("card {0} is not in play")]
    CardNotOnBoard(InstanceId),

    #[error("card {0} is not owned by {1}")]
    NotOwner(InstanceId, PlayerId),

    #[error("insufficient chakra: need {needed}, have {available}")]
    InsufficientChakra { needed: u32, available: u32 },

    #[error("card {0} is not face-down")]
    NotFaceDown(InstanceId),

    #[error("card {0} is not face-up")]
    NotFaceUp(InstanceId),

    #[error("upgrade must share a version family with card {0}")]
    UpgradeFamilyMismatch(InstanceId),

    #[error("upgrade target {target} is in lane {actual}, not lane {requested}")]
    UpgradeLaneMismatch {
        target: InstanceId,
        requested: usize,
        actual: usize,
    },

    #[error("upgrade would cost {new_cost} - {old_cost} < 0")]
    NegativeUpgradeCost { new_cost: u32, old_cost: u32 },

    #[error("a face-up version of this character is already in lane {0}")]
    DuplicateFamilyInLane(usize),

    #[error("deck holds {available} cards, {needed} required")]
    DeckTooSmall { needed: usize, available: usize },

    #[error("{0} has already made a mulligan decision")]
    AlreadyMulliganed(PlayerId),
}

/// Why a `GameConfig` was refused.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("{player} deck has {count} characters, at least {min} required")]
    TooFewCharacters {
        player: PlayerId,
        count: usize,
        min: usize,
    },

    #[error("{player} deck has {count} missions, exactly {expected} required")]
    WrongMissionCount {
        player: PlayerId,
        count: usize,
        expected: usize,
    },

    #[error("{player} deck has {count} copies of version {version}, at most {max} allowed")]
    TooManyCopies {
        player: PlayerId,
        version: CardId,
        count: usize,
        max: usize,
    },

    #[error("unknown card {0}")]
    UnknownCard(CardId),

    #[error("lane table invalid: {0}")]
    InvalidLaneTable(String),

    #[error("deck limits invalid: {0}")]
    InvalidDeckRules(String),
}

/// Any failure surfaced by the rules engine.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum MatchError {
    #[error("illegal action: {0}")]
    Illegal(#[from] IllegalAction),

    #[error("malformed config: {0}")]
    MalformedConfig(#[from] ConfigError),

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl MatchError {
    /// Whether the match can continue after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, MatchError::InvariantViolation(_))
    }
}
