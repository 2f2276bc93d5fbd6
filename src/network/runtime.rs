// WebRTC network runtime using str0m Sans-I/O implementation
// Runs the rendezvous (signaling) phase on a short-lived tokio runtime, then
// drives the peer connection from a synchronous polling loop.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc,
};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};

use str0m::change::{SdpAnswer, SdpOffer};
use str0m::channel::{ChannelConfig, ChannelId, Reliability};
use str0m::net::{Protocol, Receive};
use str0m::{Candidate, Event, IceConnectionState, Input, Output, Rtc};

use super::client::{ConnectionMode, NetworkCommand, NetworkEvent};
use super::error::NetworkError;
use super::protocol::WireMessage;
use crate::debug;

type WsTransport = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;
type WsSink = futures::stream::SplitSink<WsTransport, Message>;
type WsStream = futures::stream::SplitStream<WsTransport>;

// STUN server for NAT traversal (Cloudflare public STUN server)
const STUN_SERVER: &str = "stun.cloudflare.com:3478";

// Label for the single game data channel
const CHANNEL_LABEL: &str = "four";

/// Messages exchanged with the signaling broker during rendezvous
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SignalMessage {
    Register { room_id: String },
    RegisterOk { room_id: String },
    Join { room_id: String },
    JoinOk { room_id: String },
    Offer { room_id: String, sdp: String },
    Answer { room_id: String, sdp: String },
    Error { kind: String, message: String },
}

/// What the signaling phase hands to the polling loop.
/// Guest mode knows its channel id from add_channel(); host mode learns it
/// from Event::ChannelOpen when the remote opens the channel.
struct Negotiated {
    rtc: Rtc,
    udp_socket: UdpSocket,
    channel_id: Option<ChannelId>,
}

/// Initialize and run the network in a background thread
pub fn spawn_network_thread(
    mode: ConnectionMode,
    event_tx: mpsc::Sender<NetworkEvent>,
    cmd_rx: mpsc::Receiver<NetworkCommand>,
    connected: Arc<AtomicBool>,
    signaling_server: String,
    connect_timeout: Duration,
) -> std::io::Result<()> {
    thread::spawn(move || {
        debug::log("NET_THREAD", "Network thread started");

        let dial_deadline = match mode {
            ConnectionMode::Join { .. } => Some(Instant::now() + connect_timeout),
            ConnectionMode::Host { .. } => None,
        };

        // Tokio runtime is only needed for the signaling phase
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                debug::log("NET_THREAD", &format!("tokio runtime failed: {}", e));
                let _ = event_tx.send(NetworkEvent::Error(NetworkError::BrokerUnavailable));
                return;
            }
        };

        let setup = rt.block_on(run_signaling(
            mode,
            &event_tx,
            &signaling_server,
            connect_timeout,
        ));
        drop(rt);

        match setup {
            Ok(negotiated) => {
                debug::log("NET_SETUP", "Rendezvous complete, entering polling loop");
                if let Err(e) = run_rtc_loop(
                    negotiated,
                    dial_deadline,
                    &event_tx,
                    &cmd_rx,
                    &connected,
                ) {
                    debug::log("NET_LOOP", &format!("Polling loop error: {}", e));
                    let _ = event_tx.send(NetworkEvent::Disconnected);
                }
            }
            Err(err) => {
                debug::log("NET_SETUP", &format!("Rendezvous failed: {}", err));
                let _ = event_tx.send(NetworkEvent::Error(err));
            }
        }

        connected.store(false, Ordering::Relaxed);
        debug::log("NET_THREAD", "Network thread ending");
    });

    Ok(())
}

/// Run the signaling phase: register or dial, exchange SDP, close the broker
/// connection. The guest's entire rendezvous is bounded by `connect_timeout`;
/// on expiry the adapter reports `Timeout` and never retries.
async fn run_signaling(
    mode: ConnectionMode,
    event_tx: &mpsc::Sender<NetworkEvent>,
    signaling_server: &str,
    connect_timeout: Duration,
) -> Result<Negotiated, NetworkError> {
    match mode {
        ConnectionMode::Host { room_id } => {
            signal_as_host(room_id.as_str(), event_tx, signaling_server).await
        }
        ConnectionMode::Join { room_id } => {
            match tokio::time::timeout(
                connect_timeout,
                signal_as_guest(room_id.as_str(), signaling_server),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(NetworkError::Timeout),
            }
        }
    }
}

/// Prepare an Rtc instance with host and (best effort) server-reflexive
/// candidates on a freshly bound UDP socket.
async fn build_rtc() -> Result<(Rtc, UdpSocket)> {
    let mut rtc = Rtc::builder().set_rtp_mode(false).build();

    // Bind to a specific local IP so local_addr() matches what str0m expects
    // when pairing received packets with candidates
    let local_ip = discover_local_ip();
    let udp_socket = UdpSocket::bind(SocketAddr::new(local_ip, 0))?;
    udp_socket.set_nonblocking(false)?;
    let host_addr = udp_socket.local_addr()?;

    let host_cand = Candidate::host(host_addr, "udp")
        .map_err(|e| anyhow!("host candidate: {}", e))?;
    rtc.add_local_candidate(host_cand)
        .ok_or_else(|| anyhow!("failed to add host candidate"))?;
    info!("Bound UDP socket, host candidate {}", host_addr);

    // STUN is best effort; without it, same-network peers still connect
    match query_stun(&udp_socket).await {
        Ok(public_addr) => {
            match Candidate::server_reflexive(public_addr, host_addr, "udp") {
                Ok(srflx) => {
                    if rtc.add_local_candidate(srflx).is_some() {
                        info!("Added server reflexive candidate {}", public_addr);
                    }
                }
                Err(e) => warn!("srflx candidate rejected: {}", e),
            }
        }
        Err(e) => {
            warn!("STUN query failed: {}", e);
            debug::log("STUN", &format!("query failed, host candidate only: {}", e));
        }
    }

    Ok((rtc, udp_socket))
}

/// Pick a local interface address for ICE. First non-loopback IPv4 wins;
/// falls back to loopback for single-machine testing.
fn discover_local_ip() -> IpAddr {
    if let Ok(interfaces) = if_addrs::get_if_addrs() {
        for iface in interfaces {
            if let IpAddr::V4(v4) = iface.addr.ip() {
                if !v4.is_loopback() {
                    return IpAddr::V4(v4);
                }
            }
        }
    }
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

/// Query the STUN server for our public address.
/// Must use the same socket that ICE will use, otherwise the NAT mapping
/// the server reports will not match the one peers can actually reach.
async fn query_stun(udp_socket: &UdpSocket) -> Result<SocketAddr> {
    let stun_addr = tokio::net::lookup_host(STUN_SERVER)
        .await?
        .find(|addr| addr.is_ipv4())
        .ok_or_else(|| anyhow!("no IPv4 address for STUN server"))?;

    let socket = udp_socket.try_clone()?;
    let public_addr = tokio::task::spawn_blocking(
        move || -> Result<SocketAddr, Box<dyn std::error::Error + Send + Sync>> {
            socket.set_read_timeout(Some(Duration::from_secs(2)))?;
            let client = stunclient::StunClient::new(stun_addr);
            let addr = client.query_external_address(&socket)?;
            socket.set_read_timeout(None)?;
            Ok(addr)
        },
    )
    .await?
    .map_err(|e| anyhow!("STUN query: {}", e))?;

    Ok(public_addr)
}

/// Host mode: claim the room with the broker, then wait for exactly one
/// guest offer and answer it. The broker registration closes as soon as the
/// answer is sent, which is what ends the room code's lifetime.
async fn signal_as_host(
    room_id: &str,
    event_tx: &mpsc::Sender<NetworkEvent>,
    signaling_server: &str,
) -> Result<Negotiated, NetworkError> {
    let (ws_stream, _) = connect_async(signaling_server).await.map_err(|e| {
        debug::log("SIGNAL", &format!("broker connect failed: {}", e));
        NetworkError::BrokerUnavailable
    })?;
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    send_signal(
        &mut ws_sink,
        &SignalMessage::Register {
            room_id: room_id.to_string(),
        },
    )
    .await?;

    // Registration outcome decides whether the room code is ours
    match recv_signal(&mut ws_stream).await? {
        SignalMessage::RegisterOk { .. } => {
            info!("Registered room {}", room_id);
            let _ = event_tx.send(NetworkEvent::RoomRegistered {
                room_id: room_id.to_string(),
            });
        }
        SignalMessage::Error { kind, message } => {
            debug::log("SIGNAL", &format!("register refused: {} ({})", kind, message));
            return Err(if kind == "id_taken" {
                NetworkError::IdTaken
            } else {
                NetworkError::BrokerUnavailable
            });
        }
        other => {
            debug::log("SIGNAL", &format!("unexpected reply: {:?}", other));
            return Err(NetworkError::BrokerUnavailable);
        }
    }

    let (mut rtc, udp_socket) = build_rtc().await.map_err(|e| {
        debug::log("SIGNAL", &format!("rtc setup failed: {}", e));
        NetworkError::BrokerUnavailable
    })?;

    // Exactly one guest gets answered. The broker refuses further joins
    // while this one is attached, and the registration closes below.
    let offer_sdp = loop {
        match recv_signal(&mut ws_stream).await? {
            SignalMessage::Offer { sdp, .. } => break sdp,
            other => debug::log("SIGNAL", &format!("ignoring while waiting for offer: {:?}", other)),
        }
    };

    let offer = SdpOffer::from_sdp_string(&offer_sdp).map_err(|e| {
        debug::log("SIGNAL", &format!("bad offer SDP: {}", e));
        NetworkError::BrokerUnavailable
    })?;
    let answer = rtc.sdp_api().accept_offer(offer).map_err(|e| {
        debug::log("SIGNAL", &format!("accept_offer failed: {}", e));
        NetworkError::BrokerUnavailable
    })?;

    send_signal(
        &mut ws_sink,
        &SignalMessage::Answer {
            room_id: room_id.to_string(),
            sdp: answer.to_sdp_string(),
        },
    )
    .await?;

    info!("Answer sent, closing broker registration");
    let _ = ws_sink.close().await;

    Ok(Negotiated {
        rtc,
        udp_socket,
        channel_id: None,
    })
}

/// Guest mode: dial the room, send an offer with the game channel, apply the
/// host's answer.
async fn signal_as_guest(
    room_id: &str,
    signaling_server: &str,
) -> Result<Negotiated, NetworkError> {
    let (ws_stream, _) = connect_async(signaling_server).await.map_err(|e| {
        debug::log("SIGNAL", &format!("broker connect failed: {}", e));
        NetworkError::BrokerUnavailable
    })?;
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    send_signal(
        &mut ws_sink,
        &SignalMessage::Join {
            room_id: room_id.to_string(),
        },
    )
    .await?;

    match recv_signal(&mut ws_stream).await? {
        SignalMessage::JoinOk { .. } => {}
        SignalMessage::Error { kind, message } => {
            debug::log("SIGNAL", &format!("join refused: {} ({})", kind, message));
            return Err(if kind == "room_not_found" {
                NetworkError::RoomNotFound
            } else {
                NetworkError::BrokerUnavailable
            });
        }
        other => {
            debug::log("SIGNAL", &format!("unexpected reply: {:?}", other));
            return Err(NetworkError::BrokerUnavailable);
        }
    }

    let (mut rtc, udp_socket) = build_rtc().await.map_err(|e| {
        debug::log("SIGNAL", &format!("rtc setup failed: {}", e));
        NetworkError::BrokerUnavailable
    })?;

    // The game depends on in-order delivery, so the channel is created
    // reliable and ordered
    let mut change = rtc.sdp_api();
    let channel_id = change.add_channel_with_config(ChannelConfig {
        label: CHANNEL_LABEL.to_string(),
        ordered: true,
        reliability: Reliability::Reliable,
        negotiated: None,
        protocol: String::new(),
    });
    let (offer, pending) = change
        .apply()
        .ok_or(NetworkError::BrokerUnavailable)?;

    send_signal(
        &mut ws_sink,
        &SignalMessage::Offer {
            room_id: room_id.to_string(),
            sdp: offer.to_sdp_string(),
        },
    )
    .await?;

    let answer_sdp = loop {
        match recv_signal(&mut ws_stream).await? {
            SignalMessage::Answer { sdp, .. } => break sdp,
            SignalMessage::Error { kind, message } => {
                debug::log("SIGNAL", &format!("dial failed: {} ({})", kind, message));
                return Err(if kind == "room_not_found" {
                    NetworkError::RoomNotFound
                } else {
                    NetworkError::BrokerUnavailable
                });
            }
            other => debug::log("SIGNAL", &format!("ignoring while waiting for answer: {:?}", other)),
        }
    };

    let answer = SdpAnswer::from_sdp_string(&answer_sdp).map_err(|e| {
        debug::log("SIGNAL", &format!("bad answer SDP: {}", e));
        NetworkError::BrokerUnavailable
    })?;
    rtc.sdp_api().accept_answer(pending, answer).map_err(|e| {
        debug::log("SIGNAL", &format!("accept_answer failed: {}", e));
        NetworkError::BrokerUnavailable
    })?;

    info!("SDP negotiation complete, closing broker connection");
    let _ = ws_sink.close().await;

    Ok(Negotiated {
        rtc,
        udp_socket,
        channel_id: Some(channel_id),
    })
}

async fn send_signal(ws_sink: &mut WsSink, msg: &SignalMessage) -> Result<(), NetworkError> {
    let json = serde_json::to_string(msg).map_err(|_| NetworkError::BrokerUnavailable)?;
    ws_sink.send(Message::Text(json)).await.map_err(|e| {
        debug::log("SIGNAL", &format!("broker send failed: {}", e));
        NetworkError::BrokerUnavailable
    })
}

async fn recv_signal(ws_stream: &mut WsStream) -> Result<SignalMessage, NetworkError> {
    loop {
        match ws_stream.next().await {
            Some(Ok(Message::Text(text))) => {
                match serde_json::from_str::<SignalMessage>(&text) {
                    Ok(msg) => return Ok(msg),
                    Err(e) => {
                        debug::log("SIGNAL", &format!("unparseable broker message: {}", e));
                    }
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                debug::log("SIGNAL", "broker closed the connection");
                return Err(NetworkError::BrokerUnavailable);
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                debug::log("SIGNAL", &format!("broker receive failed: {}", e));
                return Err(NetworkError::BrokerUnavailable);
            }
        }
    }
}

/// Main synchronous polling loop for str0m.
///
/// Three phases per iteration: drain rtc outputs, wait briefly for UDP input,
/// drain game-loop commands. `dial_deadline` bounds the guest's wait for the
/// channel-open acknowledgment.
fn run_rtc_loop(
    negotiated: Negotiated,
    mut dial_deadline: Option<Instant>,
    event_tx: &mpsc::Sender<NetworkEvent>,
    cmd_rx: &mpsc::Receiver<NetworkCommand>,
    connected: &Arc<AtomicBool>,
) -> Result<()> {
    let Negotiated {
        mut rtc,
        udp_socket,
        channel_id,
    } = negotiated;

    let mut buf = vec![0u8; 8192];
    let mut active_channel_id: Option<ChannelId> = channel_id;
    let mut channel_open = false;

    // str0m's requested deadline is tracked separately from the short socket
    // timeout so commands keep draining while ICE keepalives stay on schedule
    let mut rtc_deadline: Option<Instant> = None;

    loop {
        // Phase 1: poll rtc for outputs
        loop {
            match rtc.poll_output()? {
                Output::Transmit(transmit) => {
                    if let Err(e) = udp_socket.send_to(&transmit.contents, transmit.destination) {
                        warn!("UDP send failed: {}", e);
                    }
                }
                Output::Timeout(deadline) => {
                    rtc_deadline = Some(deadline);
                    udp_socket.set_read_timeout(Some(Duration::from_millis(10)))?;
                    break;
                }
                Output::Event(event) => {
                    if !handle_rtc_event(
                        event,
                        event_tx,
                        connected,
                        &mut active_channel_id,
                        &mut channel_open,
                        &mut dial_deadline,
                    ) {
                        return Ok(());
                    }
                }
            }
        }

        // Phase 2: wait for UDP input or timeout
        match udp_socket.recv_from(&mut buf) {
            Ok((n, source)) => {
                let receive = Receive {
                    proto: Protocol::Udp,
                    source,
                    destination: udp_socket.local_addr()?,
                    contents: buf[..n].try_into()?,
                };
                rtc.handle_input(Input::Receive(Instant::now(), receive))?;
                rtc_deadline = None;
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                let now = Instant::now();
                match rtc_deadline {
                    Some(deadline) if now >= deadline => {
                        rtc.handle_input(Input::Timeout(now))?;
                        rtc_deadline = None;
                    }
                    Some(_) => {}
                    None => rtc.handle_input(Input::Timeout(now))?,
                }
            }
            Err(e) => {
                debug::log("NET_LOOP", &format!("UDP socket error: {}", e));
                let _ = event_tx.send(NetworkEvent::Disconnected);
                return Ok(());
            }
        }

        // Guest side: no channel-open acknowledgment inside the window means
        // the dial failed; report Timeout and stop without retrying
        if let Some(deadline) = dial_deadline {
            if !channel_open && Instant::now() >= deadline {
                debug::log("NET_LOOP", "connect deadline passed without channel open");
                let _ = event_tx.send(NetworkEvent::Error(NetworkError::Timeout));
                return Ok(());
            }
        }

        // Phase 3: process commands from the game loop (non-blocking)
        loop {
            match cmd_rx.try_recv() {
                Ok(NetworkCommand::Send(msg)) => {
                    // No open channel: drop silently, callers never rely on
                    // delivery confirmation
                    if !channel_open {
                        debug::log("NET_SEND", "no open channel, message dropped");
                        continue;
                    }
                    let Some(cid) = active_channel_id else {
                        continue;
                    };
                    match msg.to_bytes() {
                        Ok(bytes) => {
                            if let Some(mut channel) = rtc.channel(cid) {
                                if let Err(e) = channel.write(false, &bytes) {
                                    warn!("channel write failed: {}", e);
                                }
                            }
                        }
                        Err(e) => debug::log("NET_SEND", &format!("encode failed: {}", e)),
                    }
                }
                Ok(NetworkCommand::Disconnect) => {
                    debug::log("NET_LOOP", "disconnect requested by game loop");
                    rtc.disconnect();
                    return Ok(());
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    // Game loop dropped its handle; nothing left to serve
                    rtc.disconnect();
                    return Ok(());
                }
            }
        }
    }
}

/// Handle a single str0m event. Returns false when the loop should stop.
fn handle_rtc_event(
    event: Event,
    event_tx: &mpsc::Sender<NetworkEvent>,
    connected: &Arc<AtomicBool>,
    active_channel_id: &mut Option<ChannelId>,
    channel_open: &mut bool,
    dial_deadline: &mut Option<Instant>,
) -> bool {
    match event {
        Event::Connected => {
            // ICE + DTLS both ready
            info!("Peer connection established");
            connected.store(true, Ordering::Relaxed);
            let _ = event_tx.send(NetworkEvent::PeerConnected);
        }
        Event::IceConnectionStateChange(state) => {
            debug::log("ICE_STATE", &format!("{:?}", state));
            if matches!(state, IceConnectionState::Disconnected) {
                connected.store(false, Ordering::Relaxed);
                *channel_open = false;
                let _ = event_tx.send(NetworkEvent::Disconnected);
                return false;
            }
        }
        Event::ChannelOpen(cid, label) => {
            info!("Data channel open: {}", label);
            *active_channel_id = Some(cid);
            *channel_open = true;
            *dial_deadline = None;
            let _ = event_tx.send(NetworkEvent::ChannelOpen);
        }
        Event::ChannelClose(_) => {
            debug::log("CHANNEL", "data channel closed by peer");
            connected.store(false, Ordering::Relaxed);
            *channel_open = false;
            let _ = event_tx.send(NetworkEvent::Disconnected);
            return false;
        }
        Event::ChannelData(channel_data) => match WireMessage::from_bytes(&channel_data.data) {
            Ok(msg) if msg.is_valid() => {
                let _ = event_tx.send(NetworkEvent::Received(msg));
            }
            Ok(msg) => {
                // Unknown or out-of-range payloads are dropped, not errors
                debug::log("RECV", &format!("dropping invalid message: {:?}", msg));
            }
            Err(e) => {
                debug::log("RECV", &format!("dropping undecodable message: {}", e));
            }
        },
        _ => {}
    }

    true
}
