//! Match state: the single canonical record of one game.
//!
//! ## PlayerMatchState
//!
//! One seat's hand, deck, chakra, board and mission points. Hand and deck
//! contents are secret to the opponent; only `view::project` decides what
//! leaves the engine.
//!
//! ## MatchState
//!
//! Turn, phase, Edge holder, priority, both seats, the three mission lanes,
//! and the RNG. Every collection is an `im` persistent structure and all
//! card data sits behind `Arc`, so cloning is cheap. `rules::apply` clones,
//! mutates the clone, and hands it back only when the whole action has
//! resolved. AI search clones freely.

use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::action::{Action, ActionRecord};
use super::config::{GameConfig, SharedRules};
use super::entity::{InstanceAllocator, InstanceId};
use super::error::{IllegalAction, MatchError};
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::cards::{BoardCard, CharacterCard, MissionCard, MissionRank, LANE_COUNT};
use crate::rules::MatchResult;

/// Phase of the match.
///
/// `Start`, `Mission` and `End` run to completion inside a single `apply`
/// call, so a committed state is always in `Mulligan`, `Action` or
/// `GameOver`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Mulligan,
    Start,
    Action,
    Mission,
    End,
    GameOver,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Setup => "Setup",
            Phase::Mulligan => "Mulligan",
            Phase::Start => "Start",
            Phase::Action => "Action",
            Phase::Mission => "Mission",
            Phase::End => "End",
            Phase::GameOver => "Game Over",
        };
        f.write_str(name)
    }
}

/// A seat's mulligan decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MulliganStatus {
    Pending,
    Kept,
    Redrawn,
}

/// A character card in hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandCard {
    pub instance: InstanceId,
    pub card: Arc<CharacterCard>,
}

/// One of the three mission lanes.
#[derive(Clone, Debug, PartialEq)]
pub struct MissionLane {
    pub mission: Arc<MissionCard>,
    pub rank: MissionRank,
    pub rank_bonus: u32,
    /// Set once, when the lane is scored; never changes afterwards.
    pub winner: Option<PlayerId>,
    pub decided_turn: Option<u32>,
}

impl MissionLane {
    /// Points awarded to the lane winner.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.mission
            .points
            .saturating_add(self.rank_bonus)
            .saturating_add(self.mission.score_bonus())
    }

    /// Whether the lane has been scored.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }
}

/// One seat's side of the match.
#[derive(Clone, Debug, Default)]
pub struct PlayerMatchState {
    pub hand: Vector<HandCard>,

    /// Top of deck = back of the vector.
    pub deck: Vector<Arc<CharacterCard>>,

    /// Versions replaced by upgrades.
    pub discard: Vector<Arc<CharacterCard>>,

    pub chakra: u32,

    pub board: Vector<BoardCard>,

    pub mission_points: u32,

    /// Reveals committed during the current turn.
    pub revealed_this_turn: u32,

    pub mulligan: MulliganStatus,
}

impl Default for MulliganStatus {
    fn default() -> Self {
        MulliganStatus::Pending
    }
}

impl PlayerMatchState {
    /// Find a hand card by instance.
    #[must_use]
    pub fn hand_card(&self, instance: InstanceId) -> Option<&HandCard> {
        self.hand.iter().find(|c| c.instance == instance)
    }

    /// Remove a hand card by instance.
    pub fn take_from_hand(&mut self, instance: InstanceId) -> Option<HandCard> {
        let index = self.hand.iter().position(|c| c.instance == instance)?;
        Some(self.hand.remove(index))
    }

    /// This seat's cards in one lane.
    pub fn lane_cards(&self, lane: usize) -> impl Iterator<Item = &BoardCard> {
        self.board.iter().filter(move |c| c.lane == lane)
    }
}

/// Canonical state of one match.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Turn number, `1..=max_turns`.
    pub turn: u32,

    pub phase: Phase,

    /// Edge token holder: acts first and wins tied lanes.
    pub edge: PlayerId,

    /// Player with priority during the Action phase.
    pub active_player: PlayerId,

    pub players: PlayerMap<PlayerMatchState>,

    /// Exactly `LANE_COUNT` lanes.
    pub lanes: Vec<MissionLane>,

    /// Passes in a row during the current Action phase.
    pub consecutive_passes: u32,

    /// First player to pass this Action phase.
    pub first_passer: Option<PlayerId>,

    pub rng: GameRng,

    pub rules: SharedRules,

    pub result: Option<MatchResult>,

    instances: InstanceAllocator,

    next_entry_seq: u32,

    pub action_history: Vector<ActionRecord>,
}

impl MatchState {
    /// Create a match from a validated config.
    ///
    /// Shuffles both decks, deals opening hands, assigns missions to lanes
    /// and picks the first Edge holder. The returned state waits for both
    /// mulligan decisions.
    pub fn new(config: &GameConfig) -> Result<Self, MatchError> {
        config.validate()?;

        let rules = Arc::new(config.rules.clone());
        let mut rng = GameRng::new(config.seed);

        let mut decks = PlayerMap::new(|p| {
            config
                .player(p)
                .deck
                .characters
                .iter()
                .cloned()
                .map(Arc::new)
                .collect::<Vector<_>>()
        });
        for player in PlayerId::both() {
            rng.shuffle_vector(&mut decks[player]);
        }

        let mut missions: Vec<Arc<MissionCard>> = PlayerId::both()
            .flat_map(|p| config.player(p).deck.missions.iter().cloned().map(Arc::new))
            .collect();
        rng.shuffle(&mut missions);
        let lanes: Vec<MissionLane> = missions
            .into_iter()
            .take(LANE_COUNT)
            .zip(rules.lane_ranks)
            .map(|(mission, rank)| MissionLane {
                mission,
                rank,
                rank_bonus: rules.rank_bonus.bonus(rank),
                winner: None,
                decided_turn: None,
            })
            .collect();
        if lanes.len() != LANE_COUNT {
            return Err(MatchError::InvariantViolation(format!(
                "{} missions for {} lanes",
                lanes.len(),
                LANE_COUNT
            )));
        }

        let edge = rng.coin_flip();

        let mut state = Self {
            turn: 1,
            phase: Phase::Setup,
            edge,
            active_player: edge,
            players: PlayerMap::new(|p| PlayerMatchState {
                deck: decks[p].clone(),
                ..PlayerMatchState::default()
            }),
            lanes,
            consecutive_passes: 0,
            first_passer: None,
            rng,
            rules,
            result: None,
            instances: InstanceAllocator::new(),
            next_entry_seq: 0,
            action_history: Vector::new(),
        };

        let hand_size = state.rules.opening_hand_size;
        for player in PlayerId::both() {
            let drawn = state.draw_cards(player, hand_size);
            if drawn < hand_size {
                return Err(IllegalAction::DeckTooSmall {
                    needed: hand_size,
                    available: drawn,
                }
                .into());
            }
        }
        state.phase = Phase::Mulligan;

        info!(seed = config.seed, edge = %edge, "match created");
        Ok(state)
    }

    /// Whether the match has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Players who may act now.
    ///
    /// Both seats during the mulligan (until they decide), the active
    /// player during the Action phase, nobody otherwise.
    #[must_use]
    pub fn can_act(&self, player: PlayerId) -> bool {
        match self.phase {
            Phase::Mulligan => self.players[player].mulligan == MulliganStatus::Pending,
            Phase::Action => self.active_player == player,
            _ => false,
        }
    }

    /// Draw up to `count` cards; returns how many were drawn.
    ///
    /// Instance ids are allocated here, in draw order.
    pub fn draw_cards(&mut self, player: PlayerId, count: usize) -> usize {
        let mut drawn = 0;
        while drawn < count {
            let Some(card) = self.players[player].deck.pop_back() else {
                break;
            };
            let instance = self.instances.alloc();
            self.players[player].hand.push_back(HandCard { instance, card });
            drawn += 1;
        }
        drawn
    }

    /// Sequence number for a card entering play.
    pub fn next_entry_seq(&mut self) -> u32 {
        let seq = self.next_entry_seq;
        self.next_entry_seq += 1;
        seq
    }

    /// Every card in play, seat one first.
    pub fn board_cards(&self) -> impl Iterator<Item = &BoardCard> {
        self.players.iter().flat_map(|(_, p)| p.board.iter())
    }

    /// Cards in one lane, both seats.
    pub fn lane_cards(&self, lane: usize) -> impl Iterator<Item = &BoardCard> {
        self.board_cards().filter(move |c| c.lane == lane)
    }

    /// Find a card in play.
    #[must_use]
    pub fn find_board_card(&self, instance: InstanceId) -> Option<&BoardCard> {
        self.board_cards().find(|c| c.instance == instance)
    }

    /// Find a card in play, mutably.
    pub fn find_board_card_mut(&mut self, instance: InstanceId) -> Option<&mut BoardCard> {
        self.players
            .iter_mut()
            .flat_map(|(_, p)| p.board.iter_mut())
            .find(|c| c.instance == instance)
    }

    /// Record a committed action.
    pub fn record_action(&mut self, player: PlayerId, action: Action) {
        let sequence = self.action_history.len() as u32;
        self.action_history
            .push_back(ActionRecord::new(player, action, self.turn, sequence));
    }

    /// A copy consistent with what `viewer` knows.
    ///
    /// The opponent's hand, deck and face-down identities are pooled and
    /// dealt back at random; `viewer`'s own deck order is reshuffled; the
    /// RNG is replaced by a fork of `rng`. Counts, instance ids, lanes and
    /// every face-up card stay as they are.
    #[must_use]
    pub fn determinize(&self, viewer: PlayerId, rng: &mut GameRng) -> Self {
        let mut sampled = self.clone();
        let opponent = viewer.opponent();

        let theirs = &self.players[opponent];
        let mut pool: Vec<Arc<CharacterCard>> = theirs
            .hand
            .iter()
            .map(|c| Arc::clone(&c.card))
            .chain(theirs.deck.iter().cloned())
            .chain(theirs.board.iter().filter(|c| !c.is_face_up()).map(|c| Arc::clone(&c.card)))
            .collect();
        rng.shuffle(&mut pool);
        let mut pool = pool.into_iter();

        let side = &mut sampled.players[opponent];
        for hand_card in side.hand.iter_mut() {
            if let Some(card) = pool.next() {
                hand_card.card = card;
            }
        }
        for board_card in side.board.iter_mut().filter(|c| !c.is_face_up()) {
            if let Some(card) = pool.next() {
                *board_card = BoardCard::new(
                    board_card.instance,
                    board_card.owner,
                    card,
                    board_card.face,
                    board_card.lane,
                    board_card.entered_seq,
                );
            }
        }
        side.deck = pool.collect();

        rng.shuffle_vector(&mut sampled.players[viewer].deck);
        sampled.rng = rng.fork();
        sampled
    }
}
