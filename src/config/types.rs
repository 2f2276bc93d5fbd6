// P2PFour configuration types
// All settings with sensible defaults matching current hardcoded values

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub keybindings: KeyBindings,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keybindings: KeyBindings::default(),
            network: NetworkConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyBindings {
    // In-game controls
    pub move_left: String,
    pub move_right: String,
    pub drop: String,
    pub restart: String,
    pub quit: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: "Left".to_string(),
            move_right: "Right".to_string(),
            drop: "Down".to_string(),
            restart: "R".to_string(),
            quit: "Q".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    // Signaling server WebSocket URL
    pub signaling_server: String,

    // Seconds to wait for the peer channel to open when joining a room
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            signaling_server: "ws://127.0.0.1:8765".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    // Target frames per second
    pub target_fps: u64,

    // Piece colors (RGB values 0-255)
    pub slot1_color: [u8; 3],
    pub slot2_color: [u8; 3],

    // Board frame color
    pub board_color: [u8; 3],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            slot1_color: [220, 60, 50],  // Red
            slot2_color: [235, 200, 50], // Yellow
            board_color: [60, 110, 200], // Blue
        }
    }
}
