//! Effect targeting.
//!
//! Effects name their targets by character name (`[Name]`), or name none and
//! act on their source. Names are not unique, so a named target is chosen
//! from the board at resolution time: the nearest face-up card with that
//! name, never the source itself.
//!
//! ## Nearest match
//!
//! Candidates are ordered by
//! 1. lane distance from the source (same lane first),
//! 2. friendly before enemy,
//! 3. play order (earlier first).

use serde::{Deserialize, Serialize};

use crate::cards::BoardCard;
use crate::core::InstanceId;

use super::effect::ParsedEffect;

/// What an effect acts on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSpec {
    /// The card the effect is printed on.
    SelfCard,
    /// The nearest face-up character with this name.
    Named(String),
}

impl TargetSpec {
    /// Target of a parsed effect: its first reference, else its source.
    #[must_use]
    pub fn from_parsed(parsed: &ParsedEffect) -> Self {
        match parsed.primary_reference() {
            Some(name) => TargetSpec::Named(name.to_string()),
            None => TargetSpec::SelfCard,
        }
    }
}

/// Resolve a target against the cards in play.
///
/// `SelfCard` resolves to the source while it is face-up. Returns `None`
/// when nothing matches; callers treat that as a miss.
pub fn resolve_target<'a>(
    board: impl IntoIterator<Item = &'a BoardCard>,
    source: &BoardCard,
    spec: &TargetSpec,
) -> Option<InstanceId> {
    match spec {
        TargetSpec::SelfCard => source.is_face_up().then_some(source.instance),
        TargetSpec::Named(name) => nearest_named(board, source, name),
    }
}

/// Nearest face-up card named `name`, excluding `source`.
pub fn nearest_named<'a>(
    board: impl IntoIterator<Item = &'a BoardCard>,
    source: &BoardCard,
    name: &str,
) -> Option<InstanceId> {
    board
        .into_iter()
        .filter(|c| c.instance != source.instance)
        .filter(|c| c.is_face_up() && c.card.names.matches(name))
        .min_by_key(|c| {
            (
                c.lane.abs_diff(source.lane),
                c.owner != source.owner,
                c.entered_seq,
            )
        })
        .map(|c| c.instance)
}
