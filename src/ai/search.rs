//! Monte Carlo search over the root actions.
//!
//! Each iteration picks a root action with UCB1, samples a world consistent
//! with what the searching seat knows (`MatchState::determinize`), applies
//! the action there, and plays the rest of the match out at random. The
//! action with the most visits is chosen.
//!
//! Sampling a fresh world per iteration keeps the search from exploiting
//! the true contents of the opponent's hand or face-down cards.

use std::time::Instant;

use tracing::debug;

use crate::core::{Action, GameRng, MatchState, PlayerId};
use crate::rules::{apply, legal_actions};

use super::config::AiConfig;
use super::policy::{random_rollout, DecisionSource};
use super::stats::SearchStats;

/// Visit and reward totals for one root action.
#[derive(Clone, Debug)]
pub struct Arm {
    pub action: Action,
    pub visits: u32,
    pub total_reward: f64,
}

impl Arm {
    fn new(action: Action) -> Self {
        Self {
            action,
            visits: 0,
            total_reward: 0.0,
        }
    }

    /// Mean reward, 0 if unvisited.
    #[must_use]
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward / f64::from(self.visits)
        }
    }
}

/// UCB1 (Upper Confidence Bound) arm selection.
///
/// Formula: Q(a) + c * sqrt(ln(N) / n(a)); unvisited arms first.
#[must_use]
pub fn ucb1_select(arms: &[Arm], total_visits: u32, exploration: f64) -> usize {
    let ln_parent = f64::from(total_visits.max(1)).ln();

    arms.iter()
        .enumerate()
        .map(|(i, arm)| {
            let exploration = if arm.visits == 0 {
                f64::INFINITY
            } else {
                exploration * (ln_parent / f64::from(arm.visits)).sqrt()
            };
            (i, arm.mean_reward() + exploration)
        })
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Hard AI: flat Monte Carlo search with UCB1.
#[derive(Clone, Debug)]
pub struct MonteCarloPolicy {
    config: AiConfig,
    rng: GameRng,
    stats: SearchStats,
}

impl MonteCarloPolicy {
    /// Create a search policy.
    #[must_use]
    pub fn new(config: AiConfig) -> Self {
        let rng = GameRng::new(config.seed);
        Self {
            config,
            rng,
            stats: SearchStats::default(),
        }
    }

    /// Statistics of the last search.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Search from `state` for `player` and return the arms.
    pub fn search(&mut self, state: &MatchState, player: PlayerId) -> Vec<Arm> {
        let start = Instant::now();
        self.stats = SearchStats::default();

        let mut arms: Vec<Arm> = legal_actions(state, player).into_iter().map(Arm::new).collect();
        self.stats.candidates = arms.len() as u32;
        if arms.len() <= 1 {
            return arms;
        }

        for iteration in 0..self.config.iterations {
            let index = ucb1_select(&arms, iteration, self.config.exploration_constant);
            let world = state.determinize(player, &mut self.rng);
            self.stats.worlds_sampled += 1;

            let reward = match apply(&world, player, &arms[index].action) {
                Ok(applied) => {
                    let mut playout_rng = self.rng.fork();
                    let rollout =
                        random_rollout(applied.state, &mut playout_rng, self.config.rollout_depth);
                    self.stats.record_playout(rollout.depth, rollout.truncated);
                    rollout.rewards[player]
                }
                // Unreachable for actions enumerated from the same seat.
                Err(_) => 0.0,
            };

            arms[index].visits += 1;
            arms[index].total_reward += reward;
        }

        self.stats.elapsed = start.elapsed();
        arms
    }
}

impl DecisionSource for MonteCarloPolicy {
    fn choose(&mut self, state: &MatchState, player: PlayerId) -> Option<Action> {
        let arms = self.search(state, player);
        let best = arms
            .iter()
            .max_by(|a, b| {
                a.visits
                    .cmp(&b.visits)
                    .then(a.mean_reward().partial_cmp(&b.mean_reward()).unwrap_or(std::cmp::Ordering::Equal))
            })
            .map(|arm| arm.action.clone());

        debug!(
            %player,
            candidates = self.stats.candidates,
            playouts = self.stats.playouts(),
            elapsed_ms = self.stats.elapsed.as_millis() as u64,
            "search finished"
        );
        best
    }

    fn name(&self) -> &'static str {
        "monte-carlo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm(visits: u32, total: f64) -> Arm {
        Arm {
            action: Action::Pass,
            visits,
            total_reward: total,
        }
    }

    #[test]
    fn test_ucb1_selects_unvisited() {
        let arms = vec![arm(100, 80.0), arm(10, 7.0), arm(0, 0.0)];
        assert_eq!(ucb1_select(&arms, 110, std::f64::consts::SQRT_2), 2);
    }

    #[test]
    fn test_ucb1_exploits_without_exploration() {
        let arms = vec![arm(10, 2.0), arm(10, 9.0), arm(10, 5.0)];
        assert_eq!(ucb1_select(&arms, 30, 0.0), 1);
    }

    #[test]
    fn test_search_samples_one_world_per_iteration() {
        use crate::cards::{CardId, CharacterCard, MissionCard};
        use crate::core::{Deck, GameConfig, PlayerSpec};

        let deck = |offset: u32| Deck {
            characters: (0..30)
                .map(|i| CharacterCard::new(CardId::new(offset + i), format!("Ninja {i}"), 1, 1))
                .collect(),
            missions: (0..3)
                .map(|i| MissionCard::new(CardId::new(offset + 100 + i), format!("Mission {i}"), 1))
                .collect(),
        };
        let config = GameConfig::new(PlayerSpec::human("a", deck(0)), PlayerSpec::human("b", deck(1000)), 4);
        let state = MatchState::new(&config).unwrap();
        let mut search = MonteCarloPolicy::new(AiConfig::default().with_iterations(24).with_seed(8));

        // Keep or redraw.
        let arms = search.search(&state, PlayerId::ONE);

        assert_eq!(arms.len(), 2);
        assert_eq!(arms.iter().map(|a| a.visits).sum::<u32>(), 24);
        let stats = search.stats();
        assert_eq!(stats.candidates, 2);
        assert_eq!(stats.worlds_sampled, 24);
        assert_eq!(stats.playouts(), 24);
        assert_eq!(stats.truncated_playouts, 0);
    }

    #[test]
    fn test_mean_reward() {
        assert_eq!(arm(0, 0.0).mean_reward(), 0.0);
        assert_eq!(arm(4, 3.0).mean_reward(), 0.75);
    }
}
