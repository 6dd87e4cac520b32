//! Client link runtime.
//!
//! Bridges the synchronous game loop with an async connection to the relay.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::{NetError, Result};
use crate::protocol::{encode_into, parse_server, ClientMessage, ParsedMessage, ServerMessage};

/// Something that happened on the link, delivered to the game loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Message(ServerMessage),
    /// The relay closed the connection or it failed
    Closed,
}

/// Running connection to the relay.
pub struct PeerLink {
    _rt: Runtime,
    in_rx: mpsc::UnboundedReceiver<LinkEvent>,
    out_tx: mpsc::UnboundedSender<ClientMessage>,
}

impl PeerLink {
    /// Connect to the relay named in `config`.
    ///
    /// Blocks until the TCP connection is established or refused.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let rt = Runtime::new()?;
        let stream = rt.block_on(TcpStream::connect(config.addr.as_str()))?;
        info!("connected to relay at {}", config.addr);

        let (in_tx, in_rx) = mpsc::unbounded_channel::<LinkEvent>();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (reader, mut writer) = stream.into_split();

        rt.spawn(async move {
            let mut buf: Vec<u8> = Vec::with_capacity(4096);
            while let Some(msg) = out_rx.recv().await {
                if encode_into(&mut buf, &msg).is_err() {
                    continue;
                }
                if writer.write_all(&buf).await.is_err() {
                    break;
                }
            }
        });

        rt.spawn(async move {
            if let Err(e) = read_loop(reader, &in_tx).await {
                warn!("relay link failed: {}", e);
            }
            let _ = in_tx.send(LinkEvent::Closed);
        });

        Ok(Self {
            _rt: rt,
            in_rx,
            out_tx,
        })
    }

    pub fn try_recv(&mut self) -> Option<LinkEvent> {
        self.in_rx.try_recv().ok()
    }

    pub fn send(&self, msg: ClientMessage) -> Result<()> {
        self.out_tx.send(msg).map_err(|_| NetError::ConnectionClosed)
    }
}

async fn read_loop(
    reader: tokio::net::tcp::OwnedReadHalf,
    in_tx: &mpsc::UnboundedSender<LinkEvent>,
) -> Result<()> {
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_server(trimmed) {
            Ok(ParsedMessage::Message(msg)) => {
                if in_tx.send(LinkEvent::Message(msg)).is_err() {
                    return Ok(());
                }
            }
            Ok(ParsedMessage::Unknown(action)) => {
                warn!("ignoring unknown relay action {:?}", action);
            }
            Err(e) => {
                warn!("ignoring malformed relay message: {}", e);
            }
        }
    }
}
