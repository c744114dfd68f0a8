//! Automatic phases.
//!
//! Start, Mission and End need no player input. They run back to back
//! inside the `apply` call that closes the previous phase:
//!
//! - both mulligans decided → Start (turn 1) → Action
//! - second consecutive pass → Mission → End → Start (next turn) → Action,
//!   or → GameOver after the final turn

use tracing::{debug, info};

use crate::core::{MatchError, MatchEvent, MatchState, Phase, PlayerId};

use super::scoring::{score_mission_phase, MatchResult};

fn enter(state: &mut MatchState, phase: Phase, events: &mut Vec<MatchEvent>) {
    debug!(turn = state.turn, %phase, "phase entered");
    state.phase = phase;
    events.push(MatchEvent::PhaseEntered {
        turn: state.turn,
        phase,
    });
}

/// Start phase: chakra, draws, then hand priority to the Edge holder.
pub fn run_start(state: &mut MatchState, events: &mut Vec<MatchEvent>) {
    enter(state, Phase::Start, events);

    let base = state.rules.base_chakra;
    let draws = if state.turn > 1 || state.rules.draw_on_first_turn {
        state.rules.cards_drawn_per_turn
    } else {
        0
    };

    for player in PlayerId::both() {
        let bonus: i64 = state.players[player]
            .board
            .iter()
            .map(|c| c.chakra_bonus())
            .fold(0, i64::saturating_add);
        let bonus = u32::try_from(bonus.max(0)).unwrap_or(u32::MAX);
        let side = &mut state.players[player];
        side.chakra = side.chakra.saturating_add(base).saturating_add(bonus);
        side.revealed_this_turn = 0;
        events.push(MatchEvent::ChakraGained { player, base, bonus });

        if draws > 0 {
            let count = state.draw_cards(player, draws);
            events.push(MatchEvent::CardsDrawn {
                player,
                count: count as u32,
            });
        }
    }

    state.consecutive_passes = 0;
    state.first_passer = None;
    state.active_player = state.edge;
    enter(state, Phase::Action, events);
}

/// Close the Action phase: score, clean up, and advance the turn.
pub fn finish_action_phase(
    state: &mut MatchState,
    events: &mut Vec<MatchEvent>,
) -> Result<(), MatchError> {
    enter(state, Phase::Mission, events);
    score_mission_phase(state, events)?;

    enter(state, Phase::End, events);
    if !state.rules.chakra_carries_over {
        for player in PlayerId::both() {
            state.players[player].chakra = 0;
        }
    }

    if state.turn >= state.rules.max_turns {
        let result = MatchResult::from_state(state);
        info!(outcome = ?result.outcome, points = ?result.points, "match over");
        state.result = Some(result.clone());
        enter(state, Phase::GameOver, events);
        events.push(MatchEvent::GameOver(result));
    } else {
        state.turn += 1;
        run_start(state, events);
    }
    Ok(())
}
