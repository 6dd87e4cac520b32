//! Online versus client.
//!
//! Connects to a relay, creates or joins a room and plays against the peer.
//! The local board is simulated here; the opponent's board is drawn from the
//! snapshots the peer sends.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use duel_tetris::core::GameSnapshot;
use duel_tetris::input::{should_quit, InputHandler, KeyMap};
use duel_tetris::net::{
    countdown_label, ClientConfig, ClientMessage, LinkEvent, MatchPhase, MatchResult, MatchSession,
    PeerLink,
};
use duel_tetris::term::{BoardPanel, FrameBuffer, GameView, TerminalRenderer, Viewport};
use duel_tetris::types::TICK_MS;

/// Play Duel Tetris against someone over a relay
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Display name shown to the opponent
    #[arg(short, long, default_value = "Player")]
    name: String,

    /// Join the room with this code instead of creating one
    #[arg(short, long)]
    join: Option<String>,

    /// Relay address, host:port (overrides DUEL_TETRIS_SERVER)
    #[arg(short, long)]
    server: Option<String>,

    /// Append logs to this file (the terminal is busy drawing the game)
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_ref())?;

    let mut config = ClientConfig::from_env();
    if let Some(server) = args.server.clone() {
        config.addr = server;
    }

    // Connect before taking over the terminal so failures print normally.
    let link = PeerLink::connect(&config)
        .with_context(|| format!("connecting to relay at {}", config.addr))?;
    let session = MatchSession::new(config);

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, link, session, &args);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Sends outgoing messages, marking the session lost when the link is gone.
fn send_all(link: &PeerLink, session: &mut MatchSession, msgs: Vec<ClientMessage>) {
    for msg in msgs {
        if let Err(e) = link.send(msg) {
            warn!("send failed: {}", e);
            session.connection_lost();
            return;
        }
    }
}

fn run(
    term: &mut TerminalRenderer,
    mut link: PeerLink,
    mut session: MatchSession,
    args: &Args,
) -> Result<()> {
    let first = match args.join.as_deref() {
        Some(code) => session.join_room(&args.name, code),
        None => session.create_room(&args.name),
    };
    send_all(&link, &mut session, vec![first]);

    let view = GameView::default();
    let mut input = InputHandler::new(KeyMap::Solo);
    if term.has_release_events() {
        // Release events end held keys; no timeout needed.
        input = input.with_key_release_timeout_ms(u32::MAX);
    }
    let mut fb = FrameBuffer::new(0, 0);
    let mut mine = GameSnapshot::default();
    let mut link_closed = false;

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        while let Some(event) = link.try_recv() {
            match event {
                LinkEvent::Message(msg) => session.handle(msg),
                LinkEvent::Closed => {
                    if !link_closed {
                        info!("relay connection closed");
                    }
                    link_closed = true;
                    session.connection_lost();
                }
            }
        }

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        match session.phase().clone() {
            MatchPhase::Lobby => {
                let mut lines = vec!["DUEL TETRIS".to_string()];
                match session.last_error() {
                    Some(err) => lines.push(format!("Error: {err}")),
                    None if link_closed => lines.push("Disconnected from relay".to_string()),
                    None => lines.push("Contacting relay...".to_string()),
                }
                lines.push("Esc: quit".to_string());
                view.render_message_into(&lines, viewport, &mut fb);
            }
            MatchPhase::Waiting { code } => {
                let lines = [
                    format!("ROOM {code}"),
                    "Waiting for an opponent...".to_string(),
                    format!("Share the code: --join {code}"),
                    "Esc: quit".to_string(),
                ];
                view.render_message_into(&lines, viewport, &mut fb);
            }
            MatchPhase::Matched => {
                let lines = [
                    format!("VS {}", session.opponent_name().unwrap_or("Player")),
                    "Get ready...".to_string(),
                ];
                view.render_message_into(&lines, viewport, &mut fb);
            }
            phase => {
                match session.game() {
                    Some(game) => game.snapshot_into(&mut mine),
                    None => mine = GameSnapshot::default(),
                }
                let banner = banner_for(&phase, &session, link_closed);
                let (my_overlay, their_overlay) = match phase {
                    MatchPhase::Finished(MatchResult::Won) => (Some("WINNER"), Some("GAME OVER")),
                    MatchPhase::Finished(MatchResult::Lost) => (Some("GAME OVER"), Some("WINNER")),
                    _ => (None, None),
                };
                view.render_versus_into(
                    BoardPanel::new(session.my_name().unwrap_or(&args.name), &mine)
                        .with_overlay(my_overlay),
                    BoardPanel::new(
                        session.opponent_name().unwrap_or("Opponent"),
                        session.opponent().snapshot(),
                    )
                    .with_overlay(their_overlay),
                    Some(banner.as_str()),
                    viewport,
                    &mut fb,
                );
            }
        }
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press => {
                        if should_quit(key) {
                            return Ok(());
                        }
                        if matches!(session.phase(), MatchPhase::Finished(_))
                            && matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R'))
                        {
                            if let Some(msg) = session.request_rematch() {
                                input.reset();
                                send_all(&link, &mut session, vec![msg]);
                            }
                        } else if let Some(action) = input.handle_key_press(key.code) {
                            session.apply_action(action);
                        }
                    }
                    KeyEventKind::Repeat => {}
                    KeyEventKind::Release => input.handle_key_release(key.code),
                },
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            let elapsed_ms = last_tick.elapsed().as_millis().min(u32::MAX as u128) as u32;
            last_tick = Instant::now();

            for action in input.update(elapsed_ms) {
                session.apply_action(action);
            }
            let out = session.step(elapsed_ms);
            if !link_closed {
                send_all(&link, &mut session, out);
            }
        }
    }
}

fn banner_for(phase: &MatchPhase, session: &MatchSession, link_closed: bool) -> String {
    match phase {
        MatchPhase::Countdown { remaining_ms, .. } => countdown_label(*remaining_ms).to_string(),
        MatchPhase::Finished(result) => {
            let headline = match result {
                MatchResult::Won if session.opponent_left() => "OPPONENT LEFT - YOU WIN!",
                MatchResult::Won => "YOU WIN!",
                MatchResult::Lost => "YOU LOSE",
            };
            if link_closed || session.opponent_left() {
                format!("{headline}  Esc: quit")
            } else if session.opponent_wants_rematch() {
                format!("{headline}  Opponent wants a rematch! R: accept  Esc: quit")
            } else {
                format!("{headline}  R: rematch  Esc: quit")
            }
        }
        _ => match session.room_code() {
            Some(code) => format!("Room {code}  Esc: quit"),
            None => "Esc: quit".to_string(),
        },
    }
}
