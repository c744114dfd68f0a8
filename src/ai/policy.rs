//! Decision sources for computer-controlled seats.
//!
//! A `DecisionSource` picks one action from `rules::legal_actions` for the
//! seat it plays. It never mutates the match: the driver submits the choice
//! through `rules::apply` like any remote action.
//!
//! - `RandomPolicy` (Easy): uniform over legal actions
//! - `GreedyPolicy` (Medium): one-ply lookahead with `heuristic_eval`
//! - `MonteCarloPolicy` (Hard, see `search`): UCB1 over root actions with
//!   random rollouts
//!
//! Policies that look past the legal set first call
//! `MatchState::determinize` from their own seat, so no decision depends on
//! the opponent's hidden cards.

use crate::cards::LANE_COUNT;
use crate::core::{Action, AiDifficulty, GameRng, MatchState, PlayerId, PlayerMap};
use crate::rules::{apply, lane_powers, legal_actions, MatchOutcome, MatchResult};

use super::config::AiConfig;
use super::search::MonteCarloPolicy;

/// Something that chooses actions for one seat.
pub trait DecisionSource: Send {
    /// Choose an action for `player`, or `None` if it cannot act.
    fn choose(&mut self, state: &MatchState, player: PlayerId) -> Option<Action>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Build the decision source for a difficulty.
#[must_use]
pub fn policy_for(difficulty: AiDifficulty, config: AiConfig) -> Box<dyn DecisionSource> {
    match difficulty {
        AiDifficulty::Easy => Box::new(RandomPolicy::new(config.seed)),
        AiDifficulty::Medium => Box::new(GreedyPolicy::new(config.seed)),
        AiDifficulty::Hard => Box::new(MonteCarloPolicy::new(config)),
    }
}

/// The seat expected to act next, if any.
///
/// During the mulligan the first undecided seat; during the Action phase
/// the active player.
#[must_use]
pub fn next_actor(state: &MatchState) -> Option<PlayerId> {
    PlayerId::both().find(|&p| state.can_act(p))
}

// =============================================================================
// Random
// =============================================================================

/// Uniformly random legal actions.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    rng: GameRng,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }
}

impl DecisionSource for RandomPolicy {
    fn choose(&mut self, state: &MatchState, player: PlayerId) -> Option<Action> {
        let actions = legal_actions(state, player);
        self.rng.choose(&actions).cloned()
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

// =============================================================================
// Greedy
// =============================================================================

/// One-ply lookahead: the action whose result scores best under
/// `heuristic_eval`. Ties are broken at random.
#[derive(Clone, Debug)]
pub struct GreedyPolicy {
    rng: GameRng,
}

impl GreedyPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }
}

impl DecisionSource for GreedyPolicy {
    fn choose(&mut self, state: &MatchState, player: PlayerId) -> Option<Action> {
        let actions = legal_actions(state, player);
        if actions.len() <= 1 {
            return actions.into_iter().next();
        }

        let world = state.determinize(player, &mut self.rng);
        let mut best: Vec<&Action> = Vec::new();
        let mut best_value = f64::NEG_INFINITY;
        for action in &actions {
            let Ok(applied) = apply(&world, player, action) else {
                continue;
            };
            let value = heuristic_eval(&applied.state)[player];
            if value > best_value + 1e-9 {
                best_value = value;
                best.clear();
                best.push(action);
            } else if (value - best_value).abs() <= 1e-9 {
                best.push(action);
            }
        }

        self.rng.choose(&best).map(|a| (*a).clone())
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

// =============================================================================
// Rollouts
// =============================================================================

/// Outcome of one random playout.
#[derive(Clone, Debug)]
pub struct Rollout {
    pub rewards: PlayerMap<f64>,
    /// Actions played.
    pub depth: u32,
    /// Whether the depth limit stopped the playout.
    pub truncated: bool,
}

/// Play random legal actions until the match ends or `max_depth` actions
/// have been played (0 = no limit).
pub fn random_rollout(mut state: MatchState, rng: &mut GameRng, max_depth: u32) -> Rollout {
    let mut depth = 0;

    loop {
        if let Some(result) = &state.result {
            return Rollout {
                rewards: result_to_rewards(result),
                depth,
                truncated: false,
            };
        }
        if max_depth > 0 && depth >= max_depth {
            return Rollout {
                rewards: heuristic_eval(&state),
                depth,
                truncated: true,
            };
        }

        let Some(player) = next_actor(&state) else {
            return Rollout {
                rewards: heuristic_eval(&state),
                depth,
                truncated: true,
            };
        };
        let actions = legal_actions(&state, player);
        let action = rng.choose(&actions).cloned().unwrap_or(Action::Pass);
        match apply(&state, player, &action) {
            Ok(applied) => state = applied.state,
            Err(_) => {
                return Rollout {
                    rewards: heuristic_eval(&state),
                    depth,
                    truncated: true,
                }
            }
        }
        depth += 1;
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Convert a match result to per-player rewards.
#[must_use]
pub fn result_to_rewards(result: &MatchResult) -> PlayerMap<f64> {
    PlayerMap::new(|player| match result.outcome {
        MatchOutcome::Winner(winner) if winner == player => 1.0,
        MatchOutcome::Winner(_) => 0.0,
        MatchOutcome::Draw => 0.5,
    })
}

/// Heuristic value of a position in `[0, 1]` for each seat.
///
/// Counts banked mission points, plus half the points of every open lane
/// the seat currently leads (ties count for the Edge holder), plus a small
/// bonus for holding the Edge. Only public power is read.
#[must_use]
pub fn heuristic_eval(state: &MatchState) -> PlayerMap<f64> {
    if let Some(result) = &state.result {
        return result_to_rewards(result);
    }

    let mut score = PlayerMap::new(|p| f64::from(state.players[p].mission_points));
    for lane in 0..LANE_COUNT.min(state.lanes.len()) {
        let slot = &state.lanes[lane];
        if slot.is_decided() {
            continue;
        }
        let powers = lane_powers(state, lane);
        let leader = match powers[PlayerId::ONE].cmp(&powers[PlayerId::TWO]) {
            std::cmp::Ordering::Greater => PlayerId::ONE,
            std::cmp::Ordering::Less => PlayerId::TWO,
            std::cmp::Ordering::Equal => state.edge,
        };
        score[leader] += 0.5 * f64::from(slot.points());
    }
    score[state.edge] += 0.25;

    let margin = score[PlayerId::ONE] - score[PlayerId::TWO];
    let one = 0.5 + 0.5 * (margin / 4.0).tanh();
    PlayerMap::from_pair(one, 1.0 - one)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_to_rewards_winner() {
        let result = MatchResult {
            outcome: MatchOutcome::Winner(PlayerId::TWO),
            points: PlayerMap::from_pair(1, 4),
            lane_winners: vec![],
        };
        let rewards = result_to_rewards(&result);

        assert_eq!(rewards[PlayerId::ONE], 0.0);
        assert_eq!(rewards[PlayerId::TWO], 1.0);
    }

    #[test]
    fn test_result_to_rewards_draw() {
        let result = MatchResult {
            outcome: MatchOutcome::Draw,
            points: PlayerMap::from_pair(3, 3),
            lane_winners: vec![],
        };
        let rewards = result_to_rewards(&result);

        assert_eq!(rewards[PlayerId::ONE], 0.5);
        assert_eq!(rewards[PlayerId::TWO], 0.5);
    }
}
