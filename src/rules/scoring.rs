//! Mission scoring.
//!
//! At each Mission phase every open lane is considered on its own:
//!
//! 1. A lane is open once the turn reaches its unlock turn and it has no
//!    winner yet. An open lane is scored even when empty; 0 to 0 is a tie.
//! 2. SCORE effects of the lane's face-up cards resolve, in play order.
//! 3. Each side's power is summed over its face-up cards (printed power,
//!    tokens, continuous modifiers). Face-down cards count 0.
//! 4. Strictly greater power wins; a tie goes to the Edge holder.
//! 5. The winner gains the lane's points and the lane is closed for good.
//!
//! `evaluate_lane` performs steps 3 and 4 without touching the state.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::cards::{BoardCard, CardId, LANE_COUNT};
use crate::core::{InstanceId, MatchError, MatchEvent, MatchState, PlayerId, PlayerMap};
use crate::effects::{EffectResolver, TriggerKind};

/// Outcome of scoring one lane.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneScore {
    pub lane: usize,
    pub mission: CardId,
    pub powers: PlayerMap<i64>,
    pub winner: PlayerId,
    pub points: u32,
    pub turn: u32,
    /// Whether the winner took the lane on a tie.
    pub by_edge: bool,
}

/// Final result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    Winner(PlayerId),
    Draw,
}

impl MatchOutcome {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, MatchOutcome::Winner(p) if *p == player)
    }
}

/// Terminal record handed to downstream collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    /// Cumulative mission points.
    pub points: PlayerMap<u32>,
    /// Winner of each lane; `None` only for lanes never scored.
    pub lane_winners: Vec<Option<PlayerId>>,
}

impl MatchResult {
    /// Build the result from a finished state.
    #[must_use]
    pub fn from_state(state: &MatchState) -> Self {
        let points = state.players.map(|_, p| p.mission_points);
        let (one, two) = (points[PlayerId::ONE], points[PlayerId::TWO]);
        let outcome = match one.cmp(&two) {
            std::cmp::Ordering::Greater => MatchOutcome::Winner(PlayerId::ONE),
            std::cmp::Ordering::Less => MatchOutcome::Winner(PlayerId::TWO),
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        };
        Self {
            outcome,
            points,
            lane_winners: state.lanes.iter().map(|l| l.winner).collect(),
        }
    }
}

/// Current power of a card: printed power plus tokens plus continuous
/// modifiers, or 0 while face-down.
#[must_use]
pub fn card_power(state: &MatchState, card: &BoardCard) -> i64 {
    if !card.is_face_up() {
        return 0;
    }
    card.base_power()
        .saturating_add(EffectResolver::continuous_modifier(state, card))
}

/// Each side's power in a lane.
#[must_use]
pub fn lane_powers(state: &MatchState, lane: usize) -> PlayerMap<i64> {
    let mut powers = PlayerMap::with_value(0i64);
    for card in state.lane_cards(lane) {
        powers[card.owner] = powers[card.owner].saturating_add(card_power(state, card));
    }
    powers
}

/// Compare a lane as it stands. Pure; the Edge holder wins ties.
#[must_use]
pub fn evaluate_lane(state: &MatchState, lane: usize) -> LaneScore {
    let powers = lane_powers(state, lane);
    let (one, two) = (powers[PlayerId::ONE], powers[PlayerId::TWO]);
    let (winner, by_edge) = match one.cmp(&two) {
        std::cmp::Ordering::Greater => (PlayerId::ONE, false),
        std::cmp::Ordering::Less => (PlayerId::TWO, false),
        std::cmp::Ordering::Equal => (state.edge, true),
    };
    LaneScore {
        lane,
        mission: state.lanes[lane].mission.id,
        powers,
        winner,
        points: state.lanes[lane].points(),
        turn: state.turn,
        by_edge,
    }
}

/// Check the board for cards outside the lane range.
pub fn check_lanes(state: &MatchState) -> Result<(), MatchError> {
    if state.lanes.len() != LANE_COUNT {
        return Err(MatchError::InvariantViolation(format!(
            "{} lanes on the board",
            state.lanes.len()
        )));
    }
    if let Some(card) = state.board_cards().find(|c| c.lane >= LANE_COUNT) {
        error!(instance = %card.instance, lane = card.lane, "board card outside lane range");
        return Err(MatchError::InvariantViolation(format!(
            "card {} is in lane {}",
            card.instance, card.lane
        )));
    }
    Ok(())
}

/// Whether a lane is scored at the current Mission phase.
#[must_use]
pub fn lane_is_due(state: &MatchState, lane: usize) -> bool {
    !state.lanes[lane].is_decided() && state.turn >= state.rules.lane_unlock_turns[lane]
}

/// Run the Mission phase: score every due lane.
pub fn score_mission_phase(
    state: &mut MatchState,
    events: &mut Vec<MatchEvent>,
) -> Result<(), MatchError> {
    check_lanes(state)?;

    for lane in 0..LANE_COUNT {
        if !lane_is_due(state, lane) {
            continue;
        }

        let mut scorers: Vec<(u32, InstanceId)> = state
            .lane_cards(lane)
            .filter(|c| c.is_face_up())
            .map(|c| (c.entered_seq, c.instance))
            .collect();
        scorers.sort_unstable();
        for (_, source) in scorers {
            let resolutions = EffectResolver::dispatch(state, source, &[TriggerKind::Score]);
            events.extend(resolutions.into_iter().map(MatchEvent::EffectResolved));
        }

        let score = evaluate_lane(state, lane);
        debug!(
            lane,
            winner = %score.winner,
            points = score.points,
            by_edge = score.by_edge,
            "lane scored"
        );
        state.lanes[lane].winner = Some(score.winner);
        state.lanes[lane].decided_turn = Some(state.turn);
        let side = &mut state.players[score.winner];
        side.mission_points = side.mission_points.saturating_add(score.points);
        events.push(MatchEvent::LaneScored(score));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_is_winner() {
        assert!(MatchOutcome::Winner(PlayerId::TWO).is_winner(PlayerId::TWO));
        assert!(!MatchOutcome::Winner(PlayerId::TWO).is_winner(PlayerId::ONE));
        assert!(!MatchOutcome::Draw.is_winner(PlayerId::ONE));
    }
}
