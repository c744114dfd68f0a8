//! Match rules: action application, the phase machine, and scoring.
//!
//! - `engine`: `apply` (the only state mutator) and `legal_actions`
//! - `phases`: Start, Mission and End, run automatically inside `apply`
//! - `scoring`: lane evaluation, tie-breaks, and the match result

pub mod engine;
pub mod phases;
pub mod scoring;

pub use engine::{apply, legal_actions, Applied};
pub use scoring::{
    card_power, evaluate_lane, lane_powers, score_mission_phase, LaneScore, MatchOutcome,
    MatchResult,
};
