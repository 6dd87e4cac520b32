use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use duel_tetris::net::{
    run_relay, ClientConfig, ClientMessage, LinkEvent, PeerLink, RelayConfig, ServerMessage,
};
use serde_json::Value;

fn test_config() -> RelayConfig {
    RelayConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        start_delay_ms: 10,
        ..RelayConfig::default()
    }
}

async fn start_relay() -> SocketAddr {
    let (ready_tx, ready_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = run_relay(test_config(), Some(ready_tx)).await;
    });
    tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("relay did not signal ready")
        .expect("ready channel dropped")
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send_raw(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for relay")
            .unwrap()
            .expect("relay closed the connection");
        serde_json::from_str(&line).unwrap()
    }
}

#[tokio::test]
async fn relay_matches_two_clients_and_forwards_garbage() {
    let addr = start_relay().await;
    let mut ada = Client::connect(addr).await;
    let mut bob = Client::connect(addr).await;

    ada.send_raw(r#"{"action":"create_room","name":"ada"}"#).await;
    let created = ada.recv().await;
    assert_eq!(created["action"], "room_created");
    assert_eq!(created["name"], "ada");
    let code = created["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 4);

    bob.send_raw(&format!(r#"{{"action":"join_room","name":"bob","code":"{code}"}}"#))
        .await;
    let joined = bob.recv().await;
    assert_eq!(joined["action"], "room_joined");
    assert_eq!(joined["code"], code.as_str());

    let ada_matched = ada.recv().await;
    assert_eq!(ada_matched["action"], "opponent_joined");
    assert_eq!(ada_matched["opponent"], "bob");
    assert_eq!(ada_matched["playerIndex"], 0);
    let bob_matched = bob.recv().await;
    assert_eq!(bob_matched["opponent"], "ada");
    assert_eq!(bob_matched["playerIndex"], 1);

    let ada_start = ada.recv().await;
    let bob_start = bob.recv().await;
    assert_eq!(ada_start["action"], "game_start");
    assert_eq!(ada_start["seed"], bob_start["seed"]);

    ada.send_raw(r#"{"action":"send_garbage","count":2}"#).await;
    let garbage = bob.recv().await;
    assert_eq!(garbage["action"], "receive_garbage");
    assert_eq!(garbage["count"], 2);

    bob.send_raw(r#"{"action":"game_over"}"#).await;
    let won = ada.recv().await;
    assert_eq!(won["action"], "opponent_lost");
    assert_eq!(won["winner"], "ada");
    let lost = bob.recv().await;
    assert_eq!(lost["action"], "you_lost");
    assert_eq!(lost["winner"], "ada");

    drop(bob);
    let left = ada.recv().await;
    assert_eq!(left["action"], "opponent_disconnected");
}

#[tokio::test]
async fn relay_answers_bad_lines_with_errors() {
    let addr = start_relay().await;
    let mut client = Client::connect(addr).await;

    client.send_raw("this is not json").await;
    let reply = client.recv().await;
    assert_eq!(reply["action"], "error");
    assert_eq!(reply["message"], "Malformed message");

    client.send_raw(r#"{"action":"teleport"}"#).await;
    let reply = client.recv().await;
    assert_eq!(reply["action"], "error");
    assert_eq!(reply["message"], "Unknown action: teleport");

    client.send_raw(r#"{"action":"join_room","code":"0000"}"#).await;
    let reply = client.recv().await;
    assert_eq!(reply["action"], "error");
    assert_eq!(reply["message"], "Room not found");

    // The connection survives all of the above.
    client.send_raw(r#"{"action":"create_room"}"#).await;
    let reply = client.recv().await;
    assert_eq!(reply["action"], "room_created");
    assert_eq!(reply["name"], "Player");
}

fn wait_for(link: &mut PeerLink, pred: impl Fn(&LinkEvent) -> bool) -> LinkEvent {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(event) = link.try_recv() {
            if pred(&event) {
                return event;
            }
        } else {
            std::thread::sleep(Duration::from_millis(5));
        }
    }
    panic!("no matching link event");
}

#[test]
fn peer_link_talks_to_the_relay() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let addr = rt.block_on(async { start_relay().await });

    let config = ClientConfig {
        addr: addr.to_string(),
        ..ClientConfig::default()
    };
    let mut link = PeerLink::connect(&config).unwrap();
    link.send(ClientMessage::CreateRoom {
        name: Some("ada".into()),
    })
    .unwrap();

    let event = wait_for(&mut link, |e| matches!(e, LinkEvent::Message(_)));
    match event {
        LinkEvent::Message(ServerMessage::RoomCreated { name, code }) => {
            assert_eq!(name, "ada");
            assert_eq!(code.len(), 4);
        }
        other => panic!("unexpected {other:?}"),
    }

    // Shutting the relay down closes the link.
    drop(rt);
    let event = wait_for(&mut link, |e| *e == LinkEvent::Closed);
    assert_eq!(event, LinkEvent::Closed);
}
