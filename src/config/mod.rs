// Configuration module for P2PFour

pub mod loader;
pub mod types;

pub use loader::{get_config_path, load_config};
pub use types::{Config, DisplayConfig, KeyBindings, NetworkConfig};
