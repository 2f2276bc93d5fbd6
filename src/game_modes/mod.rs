mod common;
mod local;
mod network;

pub use local::run_game_local;
pub use network::{run_game_network_host, run_game_network_join};
