//! Messages at the driver boundary and their wire encoding.
//!
//! The transport is external; it moves opaque frames. `encode` and `decode`
//! turn messages into frames with `bincode`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Action, IllegalAction, MatchEvent, PlayerId};
use crate::rules::MatchResult;
use crate::view::VisibleMatchState;

/// Client → driver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Submit an action for a seat.
    Act { player: PlayerId, action: Action },
    /// The seat leaves the match.
    Abandon { player: PlayerId },
}

/// Driver → client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Sent to each seat after every commit.
    State {
        view: VisibleMatchState,
        events: Vec<MatchEvent>,
    },
    /// Sent to the submitter of a refused action.
    Rejected { reason: IllegalAction },
    /// Final result; sent to both seats once.
    GameOver { result: MatchResult },
    /// The match was stopped and accepts no more actions.
    Terminated { reason: String },
}

/// A message addressed to one seat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outbound {
    pub recipient: PlayerId,
    pub message: ServerMessage,
}

impl Outbound {
    #[must_use]
    pub fn new(recipient: PlayerId, message: ServerMessage) -> Self {
        Self { recipient, message }
    }
}

/// Frame could not be encoded or decoded.
#[derive(Debug, Error)]
#[error("protocol error: {0}")]
pub struct ProtocolError(#[from] bincode::Error);

/// Encode a message into a frame.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(bincode::serialize(message)?)
}

/// Decode a frame.
pub fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<T, ProtocolError> {
    Ok(bincode::deserialize(frame)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InstanceId;

    #[test]
    fn test_client_frame() {
        let message = ClientMessage::Act {
            player: PlayerId::TWO,
            action: Action::Reveal {
                target: InstanceId(12),
            },
        };
        let frame = encode(&message).unwrap();
        let back: ClientMessage = decode(&frame).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_rejection_frame() {
        let message = ServerMessage::Rejected {
            reason: IllegalAction::InsufficientChakra {
                needed: 3,
                available: 1,
            },
        };
        let back: ServerMessage = decode(&encode(&message).unwrap()).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_garbage_frame() {
        assert!(decode::<ClientMessage>(&[0xff, 0xff, 0xff, 0xff, 0xff]).is_err());
    }
}
