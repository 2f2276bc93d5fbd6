// Network error taxonomy
// Every variant is an expected networking outcome, surfaced to the UI as a
// status message rather than a fault.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The broker already has a registration for this room code
    #[error("room code already in use")]
    IdTaken,

    /// The broker has no room registered under the dialed code
    #[error("no room found with that code")]
    RoomNotFound,

    /// The signaling server could not be reached or misbehaved
    #[error("signaling server unavailable")]
    BrokerUnavailable,

    /// No open acknowledgment from the peer within the connect window
    #[error("connection attempt timed out")]
    Timeout,

    /// The peer channel closed or the transport failed mid-session
    #[error("connection to peer closed")]
    ChannelClosed,
}
