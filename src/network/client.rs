// Network client interface for the game loop
// Provides channels to communicate with the background network thread

use std::io;
use std::sync::mpsc;

use super::error::NetworkError;
use super::protocol::WireMessage;
use super::room::RoomId;

/// Connection mode for the network layer
#[derive(Debug, Clone)]
pub enum ConnectionMode {
    /// Register the room with the broker and wait for one guest (slot 1)
    Host { room_id: RoomId },

    /// Dial an existing room (slot 2)
    Join { room_id: RoomId },
}

/// Handle for the game loop to communicate with the network.
/// Uses channels to send/receive messages to/from the network thread.
pub struct NetworkClient {
    /// Send commands TO the network thread
    tx: mpsc::Sender<NetworkCommand>,

    /// Receive events FROM the network thread
    rx: mpsc::Receiver<NetworkEvent>,

    /// Connection state
    connected: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

/// Commands the game loop sends to the network thread
#[derive(Debug)]
pub enum NetworkCommand {
    /// Send a wire message to the peer.
    /// A no-op if no channel is open; delivery is never confirmed.
    Send(WireMessage),

    /// Gracefully shut the connection down
    Disconnect,
}

/// Events the network thread sends to the game loop
#[derive(Debug)]
pub enum NetworkEvent {
    /// The broker accepted our room registration (host only)
    RoomRegistered { room_id: String },

    /// ICE + DTLS established with the peer
    PeerConnected,

    /// The data channel is open; the session may go active
    ChannelOpen,

    /// A validated wire message arrived from the peer
    Received(WireMessage),

    /// The peer channel closed
    Disconnected,

    /// Rendezvous or transport failed
    Error(NetworkError),
}

impl NetworkClient {
    /// Create a new network client (called by start_network)
    pub fn new(
        tx: mpsc::Sender<NetworkCommand>,
        rx: mpsc::Receiver<NetworkEvent>,
        connected: std::sync::Arc<std::sync::atomic::AtomicBool>,
    ) -> Self {
        Self { tx, rx, connected }
    }

    /// Check if a peer channel is currently open
    pub fn is_connected(&self) -> bool {
        self.connected.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Queue a wire message for the peer
    pub fn send(&self, msg: WireMessage) -> io::Result<()> {
        self.tx
            .send(NetworkCommand::Send(msg))
            .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))
    }

    /// Try to receive a network event (non-blocking).
    /// Returns None if no events are available.
    pub fn try_recv_event(&self) -> Option<NetworkEvent> {
        self.rx.try_recv().ok()
    }

    /// Gracefully disconnect from the peer
    pub fn disconnect(&self) -> io::Result<()> {
        self.tx
            .send(NetworkCommand::Disconnect)
            .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))
    }
}
