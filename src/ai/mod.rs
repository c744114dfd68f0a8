//! Computer opponents.
//!
//! ## Overview
//!
//! Every AI seat is a `DecisionSource`. It reads a committed `MatchState`,
//! chooses from `rules::legal_actions`, and returns the action to its
//! driver, which submits it through the same queue as a remote player.
//!
//! | Difficulty | Source             | Idea                              |
//! |------------|--------------------|-----------------------------------|
//! | Easy       | `RandomPolicy`     | uniform legal action              |
//! | Medium     | `GreedyPolicy`     | best heuristic after one action   |
//! | Hard       | `MonteCarloPolicy` | UCB1 + random playouts            |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mission_ccg::ai::{policy_for, AiConfig};
//! use mission_ccg::core::AiDifficulty;
//!
//! let mut ai = policy_for(AiDifficulty::Hard, AiConfig::default().with_iterations(200));
//! if let Some(action) = ai.choose(&state, seat) {
//!     driver.submit(seat, action);
//! }
//! ```

pub mod config;
pub mod policy;
pub mod search;
pub mod stats;

pub use config::AiConfig;
pub use policy::{
    heuristic_eval, next_actor, policy_for, random_rollout, result_to_rewards, DecisionSource,
    GreedyPolicy, RandomPolicy, Rollout,
};
pub use search::{ucb1_select, Arm, MonteCarloPolicy};
pub use stats::SearchStats;
