//! Core engine types: ids, players, state, actions, RNG, configuration.
//!
//! Everything a match is made of lives here. The rules that change it live
//! in `rules`; what a player may see of it is decided in `view`.

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionKind, ActionRecord};
pub use config::{
    AiDifficulty, Deck, DeckList, GameConfig, MatchRules, PlayerSpec, RankBonusTable, SharedRules,
    MIN_DECK_SIZE, MISSIONS_PER_DECK,
};
pub use entity::{InstanceAllocator, InstanceId};
pub use error::{ConfigError, IllegalAction, MatchError};
pub use event::MatchEvent;
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::{GameRng, RngCheckpoint};
pub use state::{HandCard, MatchState, MissionLane, MulliganStatus, Phase, PlayerMatchState};
