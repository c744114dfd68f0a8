//! # mission-ccg
//!
//! Server-side engine for a two-player card game played over three mission
//! lanes, with hidden information and per-player projections.
//!
//! ## Design Principles
//!
//! 1. **One Mutator**: `rules::apply` is the only function that changes a
//!    `MatchState`. It works on a clone and returns the new state only when
//!    the whole action has resolved.
//!
//! 2. **Hidden Until Projected**: Hands, decks and face-down identities
//!    never leave the engine except through `view::project`.
//!
//! 3. **Parse Once**: Effect text is parsed into a `ParsedEffect` the first
//!    time it is seen and dispatched by a closed `TriggerKind` match.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs`, so atomic
//!   commit and AI search both clone freely.
//!
//! - **Deterministic RNG**: ChaCha8 seeded per match; the same seed and
//!   action sequence always replay to the same state.
//!
//! - **Single Writer per Match**: `driver::MatchDriver` applies actions in
//!   arrival order from one queue; AI seats think on a worker thread and
//!   submit through the same queue.
//!
//! ## Modules
//!
//! - `core`: ids, players, state, actions, events, errors, RNG, configuration
//! - `cards`: card definitions, board instances, and the registry
//! - `effects`: effect markup, parse cache, targeting and resolution
//! - `rules`: `apply`, the phase machine, and scoring
//! - `view`: per-player projection of a match
//! - `ai`: computer opponents
//! - `driver`: per-match driver and its message protocol

pub mod ai;
pub mod cards;
pub mod core;
pub mod driver;
pub mod effects;
pub mod rules;
pub mod view;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord, ConfigError, Deck, DeckList, GameConfig, GameRng, IllegalAction,
    InstanceId, MatchError, MatchEvent, MatchRules, MatchState, Phase, PlayerId, PlayerMap,
    PlayerSpec,
};

pub use crate::cards::{BoardCard, CardId, CardRegistry, CharacterCard, MissionCard, MissionRank};

pub use crate::effects::{CardEffect, EffectKind, EffectResolution, TriggerKind};

pub use crate::rules::{apply, legal_actions, Applied, MatchOutcome, MatchResult};

pub use crate::view::{project, VisibleMatchState};

pub use crate::ai::{policy_for, AiConfig, DecisionSource, MonteCarloPolicy};

pub use crate::driver::{ClientMessage, MatchDriver, MatchHandle, Outbound, ServerMessage};
