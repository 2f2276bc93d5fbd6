// P2P networking module for P2PFour
// Rendezvous through the signaling broker, then a direct WebRTC data channel

pub mod client;
pub mod error;
pub mod protocol;
pub mod room;
pub mod runtime;

pub use client::{ConnectionMode, NetworkClient, NetworkEvent};
pub use error::NetworkError;
pub use protocol::WireMessage;
pub use room::RoomId;

use std::io;
use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};
use std::time::Duration;

/// Initialize and start the network layer.
/// Returns a NetworkClient handle for the game loop to communicate with.
pub fn start_network(
    mode: ConnectionMode,
    signaling_server: String,
    connect_timeout: Duration,
) -> io::Result<NetworkClient> {
    // Create channels for bidirectional communication
    let (event_tx, event_rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();

    // Shared connection state flag
    let connected = Arc::new(AtomicBool::new(false));

    runtime::spawn_network_thread(
        mode,
        event_tx,
        cmd_rx,
        connected.clone(),
        signaling_server,
        connect_timeout,
    )?;

    Ok(NetworkClient::new(cmd_tx, event_rx, connected))
}
