// P2PFour wire protocol definition
// Messages exchanged over the WebRTC data channel

use crate::game::board::COLS;
use serde::{Deserialize, Serialize};

/// Messages exchanged between peers during gameplay.
///
/// Serialized as tagged JSON objects, e.g. `{"type":"move","col":3,"player":1}`.
/// Tags this build does not know deserialize to `Unknown` and are dropped at
/// the transport boundary instead of raising an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    /// A piece dropped into `col` by player slot 1 or 2
    Move { col: u8, player: u8 },

    /// Both peers clear the board and restart in lock-step
    Restart,

    /// Any unrecognized message type
    #[serde(other)]
    Unknown,
}

impl WireMessage {
    /// Serialize message to JSON bytes for transmission
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize message from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Check that the payload is a message this build can act on.
    /// `Unknown` and out-of-range fields fail validation and get dropped.
    pub fn is_valid(&self) -> bool {
        match self {
            WireMessage::Move { col, player } => {
                (*col as usize) < COLS && (*player == 1 || *player == 2)
            }
            WireMessage::Restart => true,
            WireMessage::Unknown => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_wire_format() {
        let msg = WireMessage::Move { col: 3, player: 1 };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"move","col":3,"player":1}"#);
    }

    #[test]
    fn test_restart_wire_format() {
        let msg = WireMessage::Restart;
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"restart"}"#);
    }

    #[test]
    fn test_message_round_trip() {
        let msg = WireMessage::Move { col: 6, player: 2 };
        let bytes = msg.to_bytes().unwrap();
        let decoded = WireMessage::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_unknown_type_is_tolerated() {
        // A future message type must not raise an error
        let decoded = WireMessage::from_bytes(br#"{"type":"emote","id":4}"#).unwrap();
        assert_eq!(decoded, WireMessage::Unknown);
        assert!(!decoded.is_valid());
    }

    #[test]
    fn test_out_of_range_fields_fail_validation() {
        assert!(!WireMessage::Move { col: 7, player: 1 }.is_valid());
        assert!(!WireMessage::Move { col: 3, player: 0 }.is_valid());
        assert!(!WireMessage::Move { col: 3, player: 3 }.is_valid());
        assert!(WireMessage::Move { col: 0, player: 2 }.is_valid());
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(WireMessage::from_bytes(b"not json").is_err());
        assert!(WireMessage::from_bytes(br#"{"col":3}"#).is_err());
    }
}
