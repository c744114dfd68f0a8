//! Per-player projection of a match.
//!
//! `project` is the only way match data leaves the engine for a client.
//! The viewer sees
//! - their own hand in full, the opponent's as a count
//! - their own face-down cards with identity, the opponent's as an opaque
//!   placeholder carrying only the instance id
//! - chakra, mission points, Edge, turn and phase of both seats
//!
//! Deck order is never exposed, only deck sizes.

use serde::{Deserialize, Serialize};

use crate::cards::{BoardCard, CardId, CharacterCard, MissionRank, LANE_COUNT};
use crate::core::{InstanceId, MatchState, MulliganStatus, Phase, PlayerId, PlayerMatchState};
use crate::rules::{card_power, lane_powers, MatchResult};

/// A card in the viewer's own hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibleHandCard {
    pub instance: InstanceId,
    pub card: CharacterCard,
}

/// A card in play as seen by the viewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum VisibleBoardCard {
    /// Face-up, either side.
    FaceUp {
        instance: InstanceId,
        owner: PlayerId,
        card: CharacterCard,
        power: i64,
        power_tokens: i64,
        versions: Vec<CardId>,
    },
    /// The viewer's own face-down card.
    OwnHidden {
        instance: InstanceId,
        card: CharacterCard,
    },
    /// An opponent's face-down card.
    Hidden { instance: InstanceId },
}

impl VisibleBoardCard {
    /// Instance id of the card.
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        match self {
            VisibleBoardCard::FaceUp { instance, .. }
            | VisibleBoardCard::OwnHidden { instance, .. }
            | VisibleBoardCard::Hidden { instance } => *instance,
        }
    }

    /// Whether this is an opponent's face-down placeholder.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        matches!(self, VisibleBoardCard::Hidden { .. })
    }
}

/// A mission lane as seen by the viewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibleLane {
    pub index: usize,
    pub mission: CardId,
    pub mission_name: String,
    pub rank: MissionRank,
    pub points: u32,
    pub winner: Option<PlayerId>,
    /// Whether the lane can be scored this turn.
    pub unlocked: bool,
    pub yours: Vec<VisibleBoardCard>,
    pub theirs: Vec<VisibleBoardCard>,
    pub your_power: i64,
    pub their_power: i64,
}

/// The viewer's own seat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OwnSeat {
    pub hand: Vec<VisibleHandCard>,
    pub deck_count: usize,
    pub discard_count: usize,
    pub chakra: u32,
    pub mission_points: u32,
    pub mulligan: MulliganStatus,
}

/// The opponent's seat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpponentSeat {
    pub hand_count: usize,
    pub deck_count: usize,
    pub discard_count: usize,
    pub chakra: u32,
    pub mission_points: u32,
    pub mulligan_decided: bool,
}

/// Read-only view of a match for one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibleMatchState {
    pub viewer: PlayerId,
    pub turn: u32,
    pub max_turns: u32,
    pub phase: Phase,
    pub edge: PlayerId,
    pub active_player: PlayerId,
    /// Whether the viewer may submit an action now.
    pub can_act: bool,
    pub you: OwnSeat,
    pub opponent: OpponentSeat,
    pub lanes: Vec<VisibleLane>,
    pub result: Option<MatchResult>,
}

/// Project `state` for `viewer`. Pure.
#[must_use]
pub fn project(state: &MatchState, viewer: PlayerId) -> VisibleMatchState {
    let opponent = viewer.opponent();
    let mine = &state.players[viewer];
    let theirs = &state.players[opponent];

    let lanes = (0..LANE_COUNT.min(state.lanes.len()))
        .map(|index| {
            let slot = &state.lanes[index];
            let powers = lane_powers(state, index);
            VisibleLane {
                index,
                mission: slot.mission.id,
                mission_name: slot.mission.names.name.clone(),
                rank: slot.rank,
                points: slot.points(),
                winner: slot.winner,
                unlocked: state.turn >= state.rules.lane_unlock_turns[index],
                yours: board_view(state, mine, viewer, index),
                theirs: board_view(state, theirs, viewer, index),
                your_power: powers[viewer],
                their_power: powers[opponent],
            }
        })
        .collect();

    VisibleMatchState {
        viewer,
        turn: state.turn,
        max_turns: state.rules.max_turns,
        phase: state.phase,
        edge: state.edge,
        active_player: state.active_player,
        can_act: state.can_act(viewer),
        you: OwnSeat {
            hand: mine
                .hand
                .iter()
                .map(|c| VisibleHandCard {
                    instance: c.instance,
                    card: (*c.card).clone(),
                })
                .collect(),
            deck_count: mine.deck.len(),
            discard_count: mine.discard.len(),
            chakra: mine.chakra,
            mission_points: mine.mission_points,
            mulligan: mine.mulligan,
        },
        opponent: OpponentSeat {
            hand_count: theirs.hand.len(),
            deck_count: theirs.deck.len(),
            discard_count: theirs.discard.len(),
            chakra: theirs.chakra,
            mission_points: theirs.mission_points,
            mulligan_decided: theirs.mulligan != MulliganStatus::Pending,
        },
        lanes,
        result: state.result.clone(),
    }
}

fn board_view(
    state: &MatchState,
    side: &PlayerMatchState,
    viewer: PlayerId,
    lane: usize,
) -> Vec<VisibleBoardCard> {
    side.lane_cards(lane)
        .map(|card| card_view(state, card, viewer))
        .collect()
}

fn card_view(state: &MatchState, card: &BoardCard, viewer: PlayerId) -> VisibleBoardCard {
    if card.is_face_up() {
        VisibleBoardCard::FaceUp {
            instance: card.instance,
            owner: card.owner,
            card: (*card.card).clone(),
            power: card_power(state, card),
            power_tokens: card.power_tokens,
            versions: card.versions.clone(),
        }
    } else if card.owner == viewer {
        VisibleBoardCard::OwnHidden {
            instance: card.instance,
            card: (*card.card).clone(),
        }
    } else {
        VisibleBoardCard::Hidden {
            instance: card.instance,
        }
    }
}
