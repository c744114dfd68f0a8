//! Card system: definitions, board instances, and registry.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `CharacterCard` / `MissionCard`: Static card data
//! - `MissionRank`: D < C < B < A
//! - `BoardCard`: A character in play (face, tokens, lane, version chain)
//! - `CardRegistry`: Definition lookup and deck resolution

pub mod definition;
pub mod instance;
pub mod registry;

pub use definition::{CardId, CardNames, CharacterCard, MissionCard, MissionRank};
pub use instance::{BoardCard, Face, LANE_COUNT};
pub use registry::{CardRegistry, DuplicateCard};
