//! Hidden-information projection.
//!
//! A `VisibleMatchState` is what a client is allowed to know. It is derived
//! from a committed `MatchState` by a pure function, once per viewer.

pub mod projector;

pub use projector::{
    project, OpponentSeat, OwnSeat, VisibleBoardCard, VisibleHandCard, VisibleLane,
    VisibleMatchState,
};
