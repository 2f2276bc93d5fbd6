// P2PFour signaling broker
// Resolves room codes to peers: a host registers a code, exactly one guest
// joins it, and the broker relays the SDP offer/answer pair between them.
// Rooms die with the host's connection.
//
// Usage: cargo run --bin signaling-server

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

type RoomId = String;
type Tx = tokio::sync::mpsc::UnboundedSender<Message>;

/// One registered room: the host's outbound queue, and the guest's once
/// somebody joined. A room never holds more than one guest.
struct Room {
    host: Tx,
    guest: Option<Tx>,
}

type Rooms = Arc<RwLock<HashMap<RoomId, Room>>>;

/// What this connection turned out to be, for cleanup on disconnect
enum Role {
    Host(RoomId),
    Guest(RoomId),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SignalMessage {
    /// Host claims a room code
    Register { room_id: RoomId },

    /// Broker accepted the registration
    RegisterOk { room_id: RoomId },

    /// Guest asks to join a room
    Join { room_id: RoomId },

    /// Broker attached the guest to the room
    JoinOk { room_id: RoomId },

    /// SDP offer, relayed guest -> host
    Offer { room_id: RoomId, sdp: String },

    /// SDP answer, relayed host -> guest
    Answer { room_id: RoomId, sdp: String },

    /// Refusal; kind is one of id_taken, room_not_found, room_busy
    Error { kind: String, message: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let addr = "0.0.0.0:8765";
    let listener = TcpListener::bind(&addr).await?;
    info!("Signaling broker listening on {}", addr);

    let rooms: Rooms = Arc::new(RwLock::new(HashMap::new()));

    while let Ok((stream, addr)) = listener.accept().await {
        let rooms = rooms.clone();
        tokio::spawn(handle_connection(stream, addr, rooms));
    }

    Ok(())
}

async fn handle_connection(stream: TcpStream, addr: SocketAddr, rooms: Rooms) {
    info!("New connection from {}", addr);

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            error!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut role: Option<Role> = None;

    // Outbound pump for this peer
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Error receiving from {}: {}", addr, e);
                break;
            }
        };

        if let Message::Text(text) = msg {
            match serde_json::from_str::<SignalMessage>(&text) {
                Ok(signal) => {
                    let keep_open =
                        handle_signal(signal, &mut role, &tx, &rooms, addr).await;
                    if !keep_open {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Unparseable message from {}: {}", addr, e);
                    send_error(&tx, "bad_message", &format!("invalid message: {}", e));
                }
            }
        }
    }

    // Clean up on disconnect: a host takes its room down with it, a guest
    // frees the slot it held
    match role {
        Some(Role::Host(room_id)) => {
            rooms.write().await.remove(&room_id);
            info!("Host left, room {} closed", room_id);
        }
        Some(Role::Guest(room_id)) => {
            if let Some(room) = rooms.write().await.get_mut(&room_id) {
                room.guest = None;
            }
            info!("Guest left room {}", room_id);
        }
        None => {}
    }

    send_task.abort();
}

/// Handle one parsed message. Returns false when the connection should be
/// closed (used to refuse joins to occupied rooms).
async fn handle_signal(
    msg: SignalMessage,
    role: &mut Option<Role>,
    tx: &Tx,
    rooms: &Rooms,
    addr: SocketAddr,
) -> bool {
    match msg {
        SignalMessage::Register { room_id } => {
            let mut rooms = rooms.write().await;
            if rooms.contains_key(&room_id) {
                warn!("Registration refused, {} already taken", room_id);
                send_error(tx, "id_taken", "room code already registered");
                return true;
            }

            rooms.insert(
                room_id.clone(),
                Room {
                    host: tx.clone(),
                    guest: None,
                },
            );
            *role = Some(Role::Host(room_id.clone()));
            info!("Room {} registered by {}", room_id, addr);

            send_json(tx, &SignalMessage::RegisterOk { room_id });
            true
        }

        SignalMessage::Join { room_id } => {
            let mut rooms = rooms.write().await;
            let Some(room) = rooms.get_mut(&room_id) else {
                info!("Join refused, no room {}", room_id);
                send_error(tx, "room_not_found", "no room with that code");
                return false;
            };

            // The two-party invariant: a second guest is refused and the
            // connection closed, without the room ever noticing
            if room.guest.is_some() {
                warn!("Join refused, room {} already has a guest", room_id);
                send_error(tx, "room_busy", "room already has a player");
                return false;
            }

            room.guest = Some(tx.clone());
            *role = Some(Role::Guest(room_id.clone()));
            info!("Guest {} joined room {}", addr, room_id);

            send_json(tx, &SignalMessage::JoinOk { room_id });
            true
        }

        SignalMessage::Offer { room_id, sdp } => {
            let rooms = rooms.read().await;
            match rooms.get(&room_id) {
                Some(room) => {
                    info!("Relaying offer to host of {}", room_id);
                    send_json(&room.host, &SignalMessage::Offer { room_id: room_id.clone(), sdp });
                }
                None => {
                    send_error(tx, "room_not_found", "no room with that code");
                }
            }
            true
        }

        SignalMessage::Answer { room_id, sdp } => {
            let rooms = rooms.read().await;
            match rooms.get(&room_id).and_then(|room| room.guest.as_ref()) {
                Some(guest) => {
                    info!("Relaying answer to guest of {}", room_id);
                    send_json(guest, &SignalMessage::Answer { room_id: room_id.clone(), sdp });
                }
                None => {
                    warn!("Answer for {} but no guest attached", room_id);
                }
            }
            true
        }

        other => {
            warn!("Unhandled message type from {}: {:?}", addr, other);
            true
        }
    }
}

fn send_json(tx: &Tx, msg: &SignalMessage) {
    if let Ok(json) = serde_json::to_string(msg) {
        let _ = tx.send(Message::Text(json));
    }
}

fn send_error(tx: &Tx, kind: &str, message: &str) {
    send_json(
        tx,
        &SignalMessage::Error {
            kind: kind.to_string(),
            message: message.to_string(),
        },
    );
}
