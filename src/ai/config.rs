//! AI search configuration.

use serde::{Deserialize, Serialize};

use crate::core::AiDifficulty;

/// Parameters of the computer players.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AiConfig {
    /// UCB1 exploration weight. Larger values spread playouts more evenly
    /// over the candidate actions.
    pub exploration_constant: f64,

    /// Rollouts per decision for the search policy.
    pub iterations: u32,

    /// Actions per rollout before falling back to the heuristic (0 = play
    /// to the end of the match).
    pub rollout_depth: u32,

    /// Seed of the policy's private RNG; a fixed seed and state give a
    /// fixed decision.
    pub seed: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            iterations: 400,
            rollout_depth: 0,
            seed: 42,
        }
    }
}

impl AiConfig {
    /// Preset for a seat difficulty. Only `Hard` searches, so the other
    /// presets carry no iteration budget.
    #[must_use]
    pub fn for_difficulty(difficulty: AiDifficulty) -> Self {
        match difficulty {
            AiDifficulty::Easy | AiDifficulty::Medium => Self::default().with_iterations(0),
            AiDifficulty::Hard => Self::default(),
        }
    }

    #[must_use]
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Cap playouts at `depth` actions; 0 plays every playout out.
    #[must_use]
    pub fn with_rollout_depth(mut self, depth: u32) -> Self {
        self.rollout_depth = depth;
        self
    }
}
