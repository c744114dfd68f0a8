//! Action representation.
//!
//! Actions are a closed set of verbs, each carrying the instance ids and
//! lane it refers to. They arrive either from a remote client or from the
//! AI; both go through `rules::apply` unchanged.

use serde::{Deserialize, Serialize};

use super::entity::InstanceId;
use super::player::PlayerId;

/// A proposed move.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Pay a hand card's cost and put it face-up into a lane.
    PlayFaceUp { card: InstanceId, lane: usize },

    /// Pay the flat hidden cost and put a hand card face-down into a lane.
    PlayFaceDown { card: InstanceId, lane: usize },

    /// Pay a face-down card's full cost and turn it face-up.
    Reveal { target: InstanceId },

    /// Replace a face-up board card with a same-family hand card.
    Upgrade {
        card: InstanceId,
        target: InstanceId,
        lane: usize,
    },

    /// Give up priority.
    Pass,

    /// Keep (`redraw: false`) or redraw the opening hand.
    Mulligan { redraw: bool },
}

/// Discriminant of an `Action`, for phase checks and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    PlayFaceUp,
    PlayFaceDown,
    Reveal,
    Upgrade,
    Pass,
    Mulligan,
}

impl Action {
    /// The kind of this action.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::PlayFaceUp { .. } => ActionKind::PlayFaceUp,
            Action::PlayFaceDown { .. } => ActionKind::PlayFaceDown,
            Action::Reveal { .. } => ActionKind::Reveal,
            Action::Upgrade { .. } => ActionKind::Upgrade,
            Action::Pass => ActionKind::Pass,
            Action::Mulligan { .. } => ActionKind::Mulligan,
        }
    }

    /// Whether this action resets the consecutive-pass counter.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Action::Pass)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActionKind::PlayFaceUp => "play face-up",
            ActionKind::PlayFaceDown => "play face-down",
            ActionKind::Reveal => "reveal",
            ActionKind::Upgrade => "upgrade",
            ActionKind::Pass => "pass",
            ActionKind::Mulligan => "mulligan",
        };
        f.write_str(name)
    }
}

/// A committed action with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: Action,

    /// Turn number when action was taken.
    pub turn: u32,

    /// Sequence number within the match.
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, action: Action, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            action,
            turn,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind() {
        let play = Action::PlayFaceUp {
            card: InstanceId(3),
            lane: 1,
        };
        assert_eq!(play.kind(), ActionKind::PlayFaceUp);
        assert!(!play.is_pass());
        assert!(Action::Pass.is_pass());
        assert_eq!(ActionKind::PlayFaceDown.to_string(), "play face-down");
    }

    #[test]
    fn test_action_serialization() {
        let action = Action::Upgrade {
            card: InstanceId(5),
            target: InstanceId(2),
            lane: 0,
        };
        let json = serde_json::to_string(&action).unwrap();
        let deserialized: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, deserialized);
    }

    #[test]
    fn test_action_record() {
        let record = ActionRecord::new(PlayerId::TWO, Action::Pass, 3, 5);
        assert_eq!(record.player, PlayerId::TWO);
        assert_eq!(record.turn, 3);
        assert_eq!(record.sequence, 5);
    }
}
