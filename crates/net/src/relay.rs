//! TCP relay server
//!
//! Accepts client connections, reads newline-delimited JSON messages and routes
//! them through the [`Lobby`]. Each client gets a writer task fed by an
//! unbounded channel, so delivering a message never blocks the lobby lock.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::error::{NetError, Result};
use crate::protocol::{encode_into, parse_client, ParsedMessage, ServerMessage};
use crate::rooms::{ClientId, Lobby, Outgoing, PendingStart};

/// Shared relay state
struct RelayState {
    config: RelayConfig,
    lobby: Lobby,
    clients: HashMap<ClientId, mpsc::UnboundedSender<ServerMessage>>,
}

impl RelayState {
    fn deliver(&self, out: Vec<Outgoing>) {
        for Outgoing { to, msg } in out {
            if let Some(tx) = self.clients.get(&to) {
                let _ = tx.send(msg);
            }
        }
    }
}

type Shared = Arc<Mutex<RelayState>>;

/// Run the relay until the listener fails.
///
/// `ready_tx` receives the bound address once the listener is up, which lets
/// callers bind port 0 and learn the real port.
pub async fn run_relay(
    config: RelayConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    info!("relay listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state: Shared = Arc::new(Mutex::new(RelayState {
        lobby: Lobby::new(config.max_name_len),
        config,
        clients: HashMap::new(),
    }));
    let mut client_id_counter: ClientId = 0;

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!("client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, Arc::clone(&state)).await {
                warn!("client {} error: {}", client_id, e);
            }
            let mut guard = state.lock().await;
            guard.clients.remove(&client_id);
            let out = guard.lobby.leave(client_id);
            guard.deliver(out);
            info!("client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(socket: TcpStream, client_id: ClientId, state: Shared) -> Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    // Channel to send messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.lock().await.clients.insert(client_id, tx.clone());

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            if encode_into(&mut buf, &msg).is_err() {
                continue;
            }
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    let result = loop {
        line.clear();
        let bytes_read = match reader.read_line(&mut line).await {
            Ok(n) => n,
            Err(e) => break Err(e.into()),
        };
        if bytes_read == 0 {
            break Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_client(trimmed) {
            Ok(ParsedMessage::Message(msg)) => {
                let mut guard = state.lock().await;
                let dispatch = guard.lobby.handle(client_id, msg);
                guard.deliver(dispatch.out);
                if let Some(start) = dispatch.start {
                    schedule_start(Arc::clone(&state), start, guard.config.start_delay_ms);
                }
            }
            Ok(ParsedMessage::Unknown(action)) => {
                let err = NetError::UnknownAction(action);
                warn!("client {}: {}", client_id, err);
                let _ = tx.send(ServerMessage::error(err.to_string()));
            }
            Err(e) => {
                warn!("client {} sent malformed message: {}", client_id, e);
                let _ = tx.send(ServerMessage::error("Malformed message"));
            }
        }
    };

    // Closing our sender lets the writer drain what is queued and exit.
    state.lock().await.clients.remove(&client_id);
    drop(tx);
    let _ = write_task.await;
    result
}

/// Send `game_start` to the room after the configured pause.
fn schedule_start(state: Shared, start: PendingStart, delay_ms: u64) {
    debug!("room {} starts in {}ms", start.code, delay_ms);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        let guard = state.lock().await;
        let out = guard.lobby.start_game(&start);
        guard.deliver(out);
    });
}
