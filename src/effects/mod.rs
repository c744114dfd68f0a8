//! Effect system for card abilities.
//!
//! - `effect`: the effect markup, its parser, and the parse cache
//! - `targeting`: name-based target resolution on the board
//! - `resolver`: trigger dispatch and token placement
//!
//! ## Design Philosophy
//!
//! Effect text stays the source of truth on the card, but the engine never
//! compares strings at resolution time: text is parsed once into a
//! `ParsedEffect` and dispatch is a closed match over `TriggerKind`.

mod effect;
mod resolver;
mod targeting;

pub use effect::{
    parse_effect, CardEffect, ContextAmount, EffectAmount, EffectCache, EffectKind, ParsedEffect,
    CONTINUOUS_MARKER, SCORE_MARKER,
};
pub use resolver::{
    EffectInstance, EffectResolution, EffectResolver, MissReason, ResolutionOutcome, TriggerKind,
};
pub use targeting::{nearest_named, resolve_target, TargetSpec};
