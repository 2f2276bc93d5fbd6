// Networked mode: host or join a room, then drive one GameSession against
// the remote peer

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::Terminal;

use crate::config::Config;
use crate::debug;
use crate::game::{
    poll_input, GameOutcome, GameSession, InputAction, PlayerSlot, SessionEvent, SessionState,
    COLS,
};
use crate::menu;
use crate::network::{self, ConnectionMode, NetworkClient, NetworkEvent, RoomId, WireMessage};
use crate::ui::{self, GameView, OverlayMessage};

use super::common::{frame_duration, limit_frame_rate};

/// Which waiting screen to draw while rendezvous runs
enum WaitScreen<'a> {
    Host { room_id: &'a RoomId },
    Guest { room_id: &'a RoomId },
}

/// Host a room and play as Slot1
pub fn run_game_network_host<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: &Config,
) -> Result<(), io::Error> {
    let room_id = RoomId::generate();
    debug::log("GAME_START", &format!("Network host mode, room {}", room_id));

    let client = network::start_network(
        ConnectionMode::Host {
            room_id: room_id.clone(),
        },
        config.network.signaling_server.clone(),
        Duration::from_secs(config.network.connect_timeout_secs),
    )?;

    let mut session = GameSession::new();
    session.select_role(PlayerSlot::Slot1);

    if wait_for_connection_tui(terminal, &client, &WaitScreen::Host { room_id: &room_id })? {
        run_session(terminal, client, session, config)
    } else {
        // User cancelled or rendezvous failed, back to menu
        Ok(())
    }
}

/// Join an existing room and play as Slot2
pub fn run_game_network_join<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: &Config,
    code: &str,
) -> Result<(), io::Error> {
    let Some(room_id) = RoomId::parse(code) else {
        debug::log("GAME_START", &format!("Rejected malformed room code {:?}", code));
        return acknowledge_error(
            terminal,
            code,
            &OverlayMessage::error(vec![
                "Not a valid room code".to_string(),
                String::new(),
                "Codes look like C4-7K9QWM".to_string(),
                String::new(),
                "Press Q to return to menu".to_string(),
            ]),
        );
    };

    debug::log("GAME_START", &format!("Network join mode, room {}", room_id));

    let client = network::start_network(
        ConnectionMode::Join {
            room_id: room_id.clone(),
        },
        config.network.signaling_server.clone(),
        Duration::from_secs(config.network.connect_timeout_secs),
    )?;

    let mut session = GameSession::new();
    session.select_role(PlayerSlot::Slot2);

    if wait_for_connection_tui(terminal, &client, &WaitScreen::Guest { room_id: &room_id })? {
        run_session(terminal, client, session, config)
    } else {
        Ok(())
    }
}

/// Wait for the peer channel to open, drawing the appropriate screen.
/// Returns true once the channel is up, false if the user cancelled or the
/// rendezvous failed (after the user acknowledged the error).
fn wait_for_connection_tui<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    client: &NetworkClient,
    screen: &WaitScreen<'_>,
) -> Result<bool, io::Error> {
    let mut registered = false;
    let mut copy_feedback = String::new();

    loop {
        // Check for user input (Q to cancel, C to copy the room code)
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            debug::log("WAIT", "User cancelled connection wait");
                            let _ = client.disconnect();
                            return Ok(false);
                        }
                        KeyCode::Char('c') | KeyCode::Char('C') => {
                            if let WaitScreen::Host { room_id } = screen {
                                copy_feedback = copy_room_code(room_id);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        // Drain network events
        while let Some(net_event) = client.try_recv_event() {
            match net_event {
                NetworkEvent::RoomRegistered { room_id } => {
                    registered = true;
                    debug::log("WAIT", &format!("Room registered: {}", room_id));
                }
                NetworkEvent::PeerConnected => {
                    debug::log("WAIT", "Peer connected, waiting for data channel");
                }
                NetworkEvent::ChannelOpen => {
                    debug::log("WAIT", "Data channel open, starting session");
                    return Ok(true);
                }
                NetworkEvent::Disconnected => {
                    let overlay = connection_failed_overlay("Connection closed during setup");
                    draw_wait_screen(terminal, screen, registered, &copy_feedback, Some(&overlay))?;
                    wait_for_ack()?;
                    return Ok(false);
                }
                NetworkEvent::Error(err) => {
                    debug::log("WAIT", &format!("Rendezvous failed: {}", err));
                    let overlay = connection_failed_overlay(&err.to_string());
                    draw_wait_screen(terminal, screen, registered, &copy_feedback, Some(&overlay))?;
                    wait_for_ack()?;
                    return Ok(false);
                }
                NetworkEvent::Received(_) => {}
            }
        }

        draw_wait_screen(terminal, screen, registered, &copy_feedback, None)?;
    }
}

fn draw_wait_screen<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    screen: &WaitScreen<'_>,
    registered: bool,
    copy_feedback: &str,
    overlay: Option<&OverlayMessage>,
) -> Result<(), io::Error> {
    terminal.draw(|f| match screen {
        WaitScreen::Host { room_id } => {
            let code = if registered {
                room_id.as_str()
            } else {
                "registering..."
            };
            menu::render_waiting_for_connection(f, code, copy_feedback, overlay);
        }
        WaitScreen::Guest { room_id } => {
            menu::render_connecting_to_peer(f, room_id.as_str(), overlay);
        }
    })?;
    Ok(())
}

fn connection_failed_overlay(detail: &str) -> OverlayMessage {
    OverlayMessage::error(vec![
        "Connection Failed".to_string(),
        String::new(),
        detail.to_string(),
        String::new(),
        "Press Q to return to menu".to_string(),
    ])
}

/// Block until the user presses Q/Esc
fn wait_for_ack() -> Result<(), io::Error> {
    loop {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(
                        key.code,
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
                    )
                {
                    return Ok(());
                }
            }
        }
    }
}

/// Show an error overlay on the guest connecting screen until acknowledged
fn acknowledge_error<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    code: &str,
    overlay: &OverlayMessage,
) -> Result<(), io::Error> {
    terminal.draw(|f| menu::render_connecting_to_peer(f, code, Some(overlay)))?;
    wait_for_ack()
}

fn copy_room_code(room_id: &RoomId) -> String {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(room_id.as_str()) {
            Ok(_) => {
                debug::log("WAIT", &format!("Copied room code {}", room_id));
                "Copied to clipboard!".to_string()
            }
            Err(e) => format!("Copy failed: {}", e),
        },
        Err(e) => format!("Clipboard unavailable: {}", e),
    }
}

/// The in-game loop once the channel is open
fn run_session<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    client: NetworkClient,
    mut session: GameSession,
    config: &Config,
) -> Result<(), io::Error> {
    session.channel_opened();

    let frame_budget = frame_duration(config);
    let mut cursor: usize = COLS / 2;

    loop {
        let now = Instant::now();

        // Local input
        for action in poll_input(&config.keybindings)? {
            match action {
                InputAction::Quit => {
                    let _ = client.disconnect();
                    return Ok(());
                }
                InputAction::Restart => session.request_reset(),
                InputAction::MoveLeft => cursor = cursor.saturating_sub(1),
                InputAction::MoveRight => {
                    if cursor + 1 < COLS {
                        cursor += 1;
                    }
                }
                InputAction::Drop => session.attempt_local_move(cursor),
            }
        }

        // Remote messages and transport state
        while let Some(net_event) = client.try_recv_event() {
            match net_event {
                NetworkEvent::Received(WireMessage::Move { col, player }) => {
                    match PlayerSlot::from_wire(player) {
                        Some(slot) => session.apply_remote_move(col as usize, slot),
                        None => debug::log("SESSION", "dropped move with invalid player"),
                    }
                }
                NetworkEvent::Received(WireMessage::Restart) => session.apply_remote_reset(),
                NetworkEvent::Received(WireMessage::Unknown) => {}
                NetworkEvent::Disconnected => session.channel_closed(),
                NetworkEvent::Error(err) => {
                    debug::log("SESSION", &format!("Transport error: {}", err));
                    session.channel_closed();
                }
                NetworkEvent::RoomRegistered { .. }
                | NetworkEvent::PeerConnected
                | NetworkEvent::ChannelOpen => {}
            }
        }

        // Everything the session queued this frame goes to the peer
        for msg in session.drain_outgoing() {
            let _ = client.send(msg);
        }

        for session_event in session.drain_events() {
            match session_event {
                SessionEvent::MoveApplied { row, col, slot } => {
                    debug::log(
                        "SESSION",
                        &format!("Move applied: row={} col={} slot={:?}", row, col, slot),
                    );
                }
                SessionEvent::GameEnded { outcome } => {
                    debug::log("SESSION", &format!("Game ended: {:?}", outcome));
                }
                SessionEvent::SessionEnded => {
                    debug::log("SESSION", "Session ended (channel closed)");
                }
            }
        }

        let mut status = session_status(&session);
        if session.state() == SessionState::Active && !client.is_connected() {
            status.push_str("  (link unstable)");
        }

        let view = GameView {
            board: session.board(),
            turn: session.turn(),
            you: session.my_slot(),
            cursor_col: cursor,
            status,
        };
        let overlay = session_overlay(&session);
        terminal.draw(|f| ui::render(f, &view, &config.display, overlay.as_ref()))?;

        limit_frame_rate(now, frame_budget);
    }
}

fn session_status(session: &GameSession) -> String {
    let you = match session.my_slot() {
        Some(slot) => format!("You are {}", ui::slot_name(slot)),
        None => String::new(),
    };
    match session.state() {
        SessionState::Active => {
            if session.is_my_turn() {
                format!("{} | Your turn", you)
            } else {
                format!("{} | Opponent's turn", you)
            }
        }
        _ => you,
    }
}

fn session_overlay(session: &GameSession) -> Option<OverlayMessage> {
    if session.state() != SessionState::Ended {
        return None;
    }

    match session.end_reason() {
        Some(crate::game::EndReason::ChannelClosed) => Some(OverlayMessage::error(vec![
            "Opponent disconnected".to_string(),
            String::new(),
            "Press Q to return to menu".to_string(),
        ])),
        Some(crate::game::EndReason::GameOver) => {
            let won = matches!(
                (session.outcome(), session.my_slot()),
                (Some(GameOutcome::Winner(winner)), Some(me)) if winner == me
            );
            let headline = match session.outcome() {
                Some(GameOutcome::Winner(_)) if won => "YOU WIN!".to_string(),
                Some(GameOutcome::Winner(_)) => "YOU LOSE".to_string(),
                _ => "It's a draw".to_string(),
            };
            let lines = vec![
                headline,
                String::new(),
                "R: Rematch  Q: Quit".to_string(),
            ];
            Some(if won {
                OverlayMessage::success(lines)
            } else {
                OverlayMessage::info(lines)
            })
        }
        None => None,
    }
}
