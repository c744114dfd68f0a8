//! Per-match driver and its message protocol.
//!
//! - `protocol`: client and server messages plus their `bincode` framing
//! - `driver`: `MatchDriver`, the single writer of a match, and
//!   `MatchHandle` for a driver running on its own thread

mod driver;
pub mod protocol;

pub use driver::{DriverGone, DriverStatus, MatchDriver, MatchHandle};
pub use protocol::{decode, encode, ClientMessage, Outbound, ProtocolError, ServerMessage};
