//! Action validation and application.
//!
//! `apply` is the only mutator of `MatchState`. It validates in a fixed
//! order:
//!
//! 1. the match is live and the player has priority
//! 2. the phase permits the action kind
//! 3. lane, card and ownership requirements
//! 4. chakra
//! 5. deck and hand preconditions
//!
//! It then works on a clone of the input state. The caller only ever sees
//! the input (on rejection) or the fully resolved result, including any
//! automatic phases the action set off.
//!
//! `legal_actions` enumerates exactly the actions `apply` accepts. The AI
//! picks from it and submits through `apply` like any remote player.

use std::sync::Arc;

use tracing::debug;

use crate::cards::{BoardCard, CharacterCard, Face, LANE_COUNT};
use crate::core::{
    Action, ActionKind, IllegalAction, InstanceId, MatchError, MatchEvent, MatchState,
    MulliganStatus, Phase, PlayerId,
};
use crate::effects::{EffectResolution, EffectResolver, TriggerKind};

use super::phases::{finish_action_phase, run_start};

/// A committed action: the new state and what happened, in order.
#[derive(Clone, Debug)]
pub struct Applied {
    pub state: MatchState,
    pub events: Vec<MatchEvent>,
}

impl Applied {
    /// Effect resolutions triggered by the action.
    pub fn resolutions(&self) -> impl Iterator<Item = &EffectResolution> {
        self.events.iter().filter_map(|e| match e {
            MatchEvent::EffectResolved(r) => Some(r),
            _ => None,
        })
    }
}

/// Validate and apply one action.
///
/// Checks run in a fixed order: priority, phase, lane, chakra, then hand
/// and board preconditions. A face-up play or an upgrade has to look the
/// card up first because its cost is printed on it.
///
/// ```
/// # use mission_ccg::core::{Action, PlayerId, MatchState, GameConfig, PlayerSpec, Deck};
/// # use mission_ccg::cards::{CardId, CharacterCard, MissionCard};
/// # fn deck(o: u32) -> Deck {
/// #     Deck {
/// #         characters: (0..30).map(|i| CharacterCard::new(CardId::new(o + i), "Genin", 1, 1)).collect(),
/// #         missions: (0..3).map(|i| MissionCard::new(CardId::new(o + 100 + i), "Patrol", 1)).collect(),
/// #     }
/// # }
/// use mission_ccg::rules::apply;
///
/// let config = GameConfig::new(PlayerSpec::human("a", deck(0)), PlayerSpec::human("b", deck(500)), 1);
/// let state = MatchState::new(&config).unwrap();
///
/// // Nobody may pass before the mulligan is over.
/// assert!(apply(&state, PlayerId::ONE, &Action::Pass).is_err());
///
/// let state = apply(&state, PlayerId::ONE, &Action::Mulligan { redraw: false }).unwrap().state;
/// let state = apply(&state, PlayerId::TWO, &Action::Mulligan { redraw: false }).unwrap().state;
/// assert_eq!(state.players[PlayerId::ONE].chakra, 5);
/// ```
pub fn apply(state: &MatchState, player: PlayerId, action: &Action) -> Result<Applied, MatchError> {
    check_priority(state, player)?;
    check_phase(state, action.kind())?;

    let mut next = state.clone();
    let mut events = Vec::new();

    match *action {
        Action::Mulligan { redraw } => mulligan(&mut next, player, redraw, &mut events)?,
        Action::PlayFaceUp { card, lane } => play_face_up(&mut next, player, card, lane, &mut events)?,
        Action::PlayFaceDown { card, lane } => {
            play_face_down(&mut next, player, card, lane, &mut events)?
        }
        Action::Reveal { target } => reveal(&mut next, player, target, &mut events)?,
        Action::Upgrade { card, target, lane } => {
            upgrade(&mut next, player, card, target, lane, &mut events)?
        }
        Action::Pass => pass(&mut next, player, &mut events)?,
    }

    if !matches!(action, Action::Pass | Action::Mulligan { .. }) {
        next.consecutive_passes = 0;
        next.active_player = player.opponent();
    }

    debug!(%player, kind = %action.kind(), turn = state.turn, events = events.len(), "action committed");
    next.record_action(player, action.clone());
    Ok(Applied {
        state: next,
        events,
    })
}

fn check_priority(state: &MatchState, player: PlayerId) -> Result<(), IllegalAction> {
    if state.is_over() {
        return Err(IllegalAction::MatchOver);
    }
    if state.can_act(player) {
        return Ok(());
    }
    if state.phase == Phase::Mulligan {
        Err(IllegalAction::AlreadyMulliganed(player))
    } else {
        Err(IllegalAction::NotYourPriority(player))
    }
}

fn check_phase(state: &MatchState, kind: ActionKind) -> Result<(), IllegalAction> {
    let allowed = match kind {
        ActionKind::Mulligan => state.phase == Phase::Mulligan,
        _ => state.phase == Phase::Action,
    };
    if allowed {
        Ok(())
    } else {
        Err(IllegalAction::WrongPhase {
            action: kind.to_string(),
            phase: state.phase.to_string(),
        })
    }
}

fn check_lane(lane: usize) -> Result<(), IllegalAction> {
    if lane < LANE_COUNT {
        Ok(())
    } else {
        Err(IllegalAction::InvalidLane(lane))
    }
}

fn check_chakra(state: &MatchState, player: PlayerId, needed: u32) -> Result<(), IllegalAction> {
    let available = state.players[player].chakra;
    if available >= needed {
        Ok(())
    } else {
        Err(IllegalAction::InsufficientChakra { needed, available })
    }
}

fn hand_card(
    state: &MatchState,
    player: PlayerId,
    card: InstanceId,
) -> Result<Arc<CharacterCard>, IllegalAction> {
    state.players[player]
        .hand_card(card)
        .map(|c| Arc::clone(&c.card))
        .ok_or(IllegalAction::CardNotInHand(card))
}

fn owned_board_card(
    state: &MatchState,
    player: PlayerId,
    target: InstanceId,
) -> Result<&BoardCard, IllegalAction> {
    let card = state
        .find_board_card(target)
        .ok_or(IllegalAction::CardNotOnBoard(target))?;
    if card.owner != player {
        return Err(IllegalAction::NotOwner(target, player));
    }
    Ok(card)
}

/// Whether `player` already shows a face-up version of this family in `lane`.
fn family_in_lane(state: &MatchState, player: PlayerId, card: &CharacterCard, lane: usize) -> bool {
    state.players[player]
        .lane_cards(lane)
        .any(|c| c.is_face_up() && c.card.same_family(card))
}

fn enter_play(
    state: &mut MatchState,
    player: PlayerId,
    card: InstanceId,
    lane: usize,
    face: Face,
) -> Result<InstanceId, MatchError> {
    let hand_card = state.players[player]
        .take_from_hand(card)
        .ok_or(IllegalAction::CardNotInHand(card))?;
    let seq = state.next_entry_seq();
    let board_card = BoardCard::new(hand_card.instance, player, hand_card.card, face, lane, seq);
    state.players[player].board.push_back(board_card);
    Ok(hand_card.instance)
}

fn dispatch(
    state: &mut MatchState,
    source: InstanceId,
    triggers: &[TriggerKind],
    events: &mut Vec<MatchEvent>,
) {
    let resolutions = EffectResolver::dispatch(state, source, triggers);
    events.extend(resolutions.into_iter().map(MatchEvent::EffectResolved));
}

fn mulligan(
    state: &mut MatchState,
    player: PlayerId,
    redraw: bool,
    events: &mut Vec<MatchEvent>,
) -> Result<(), MatchError> {
    if redraw {
        let count = state.players[player].hand.len();
        let returned: Vec<_> = state.players[player].hand.iter().map(|c| Arc::clone(&c.card)).collect();
        let side = &mut state.players[player];
        side.hand.clear();
        side.deck.extend(returned);
        if side.deck.len() < count {
            return Err(IllegalAction::DeckTooSmall {
                needed: count,
                available: side.deck.len(),
            }
            .into());
        }
        state.rng.shuffle_vector(&mut state.players[player].deck);
        state.draw_cards(player, count);
    }

    state.players[player].mulligan = if redraw {
        MulliganStatus::Redrawn
    } else {
        MulliganStatus::Kept
    };
    events.push(MatchEvent::MulliganDecided { player, redraw });

    let all_decided = state
        .players
        .iter()
        .all(|(_, p)| p.mulligan != MulliganStatus::Pending);
    if all_decided {
        run_start(state, events);
    }
    Ok(())
}

fn play_face_up(
    state: &mut MatchState,
    player: PlayerId,
    card: InstanceId,
    lane: usize,
    events: &mut Vec<MatchEvent>,
) -> Result<(), MatchError> {
    check_lane(lane)?;
    let definition = hand_card(state, player, card)?;
    check_chakra(state, player, definition.cost)?;
    if family_in_lane(state, player, &definition, lane) {
        return Err(IllegalAction::DuplicateFamilyInLane(lane).into());
    }

    state.players[player].chakra -= definition.cost;
    let instance = enter_play(state, player, card, lane, Face::Up)?;
    events.push(MatchEvent::CharacterPlayed {
        player,
        instance,
        lane,
        card: Some(definition.id),
        chakra_paid: definition.cost,
    });
    dispatch(state, instance, &[TriggerKind::Main], events);
    Ok(())
}

fn play_face_down(
    state: &mut MatchState,
    player: PlayerId,
    card: InstanceId,
    lane: usize,
    events: &mut Vec<MatchEvent>,
) -> Result<(), MatchError> {
    check_lane(lane)?;
    let cost = state.rules.hidden_play_cost;
    check_chakra(state, player, cost)?;
    hand_card(state, player, card)?;

    state.players[player].chakra -= cost;
    let instance = enter_play(state, player, card, lane, Face::Down)?;
    events.push(MatchEvent::CharacterPlayed {
        player,
        instance,
        lane,
        card: None,
        chakra_paid: cost,
    });
    Ok(())
}

fn reveal(
    state: &mut MatchState,
    player: PlayerId,
    target: InstanceId,
    events: &mut Vec<MatchEvent>,
) -> Result<(), MatchError> {
    let board_card = owned_board_card(state, player, target)?;
    if board_card.is_face_up() {
        return Err(IllegalAction::NotFaceDown(target).into());
    }
    let cost = board_card.card.cost;
    let card_id = board_card.card.id;
    check_chakra(state, player, cost)?;

    state.players[player].chakra -= cost;
    state.players[player].revealed_this_turn += 1;
    if let Some(board_card) = state.find_board_card_mut(target) {
        board_card.reveal();
    }
    events.push(MatchEvent::CharacterRevealed {
        player,
        instance: target,
        card: card_id,
        chakra_paid: cost,
    });
    dispatch(state, target, &[TriggerKind::Main, TriggerKind::Ambush], events);
    Ok(())
}

fn upgrade(
    state: &mut MatchState,
    player: PlayerId,
    card: InstanceId,
    target: InstanceId,
    lane: usize,
    events: &mut Vec<MatchEvent>,
) -> Result<(), MatchError> {
    check_lane(lane)?;
    let definition = hand_card(state, player, card)?;
    let board_card = owned_board_card(state, player, target)?;
    if !board_card.is_face_up() {
        return Err(IllegalAction::NotFaceUp(target).into());
    }
    if !board_card.card.same_family(&definition) {
        return Err(IllegalAction::UpgradeFamilyMismatch(target).into());
    }
    if board_card.lane != lane {
        return Err(IllegalAction::UpgradeLaneMismatch {
            target,
            requested: lane,
            actual: board_card.lane,
        }
        .into());
    }
    let old_cost = board_card.card.cost;
    let cost = definition
        .cost
        .checked_sub(old_cost)
        .ok_or(IllegalAction::NegativeUpgradeCost {
            new_cost: definition.cost,
            old_cost,
        })?;
    check_chakra(state, player, cost)?;

    state.players[player].chakra -= cost;
    state.players[player].take_from_hand(card);
    let previous = match state.find_board_card_mut(target) {
        Some(board_card) => board_card.upgrade_to(Arc::clone(&definition)),
        None => return Err(IllegalAction::CardNotOnBoard(target).into()),
    };
    let from = previous.id;
    state.players[player].discard.push_back(previous);
    events.push(MatchEvent::CharacterUpgraded {
        player,
        instance: target,
        from,
        to: definition.id,
        chakra_paid: cost,
    });
    dispatch(state, target, &[TriggerKind::Main, TriggerKind::Upgrade], events);
    Ok(())
}

fn pass(state: &mut MatchState, player: PlayerId, events: &mut Vec<MatchEvent>) -> Result<(), MatchError> {
    state.consecutive_passes += 1;
    let took_edge = state.first_passer.is_none();
    if took_edge {
        state.first_passer = Some(player);
        state.edge = player;
    }
    events.push(MatchEvent::Passed { player, took_edge });

    if state.consecutive_passes >= 2 {
        finish_action_phase(state, events)
    } else {
        state.active_player = player.opponent();
        Ok(())
    }
}

/// Every action `player` may legally submit now.
#[must_use]
pub fn legal_actions(state: &MatchState, player: PlayerId) -> Vec<Action> {
    if !state.can_act(player) {
        return Vec::new();
    }
    if state.phase == Phase::Mulligan {
        return vec![Action::Mulligan { redraw: false }, Action::Mulligan { redraw: true }];
    }

    let side = &state.players[player];
    let chakra = side.chakra;
    let mut actions = vec![Action::Pass];

    for hand_card in side.hand.iter() {
        let definition = &hand_card.card;
        for lane in 0..LANE_COUNT {
            if chakra >= definition.cost && !family_in_lane(state, player, definition, lane) {
                actions.push(Action::PlayFaceUp {
                    card: hand_card.instance,
                    lane,
                });
            }
            if chakra >= state.rules.hidden_play_cost {
                actions.push(Action::PlayFaceDown {
                    card: hand_card.instance,
                    lane,
                });
            }
        }

        for target in side.board.iter().filter(|c| c.is_face_up()) {
            if !target.card.same_family(definition) {
                continue;
            }
            match definition.cost.checked_sub(target.card.cost) {
                Some(cost) if cost <= chakra => actions.push(Action::Upgrade {
                    card: hand_card.instance,
                    target: target.instance,
                    lane: target.lane,
                }),
                _ => {}
            }
        }
    }

    for hidden in side.board.iter().filter(|c| !c.is_face_up()) {
        if chakra >= hidden.card.cost {
            actions.push(Action::Reveal {
                target: hidden.instance,
            });
        }
    }

    actions
}
