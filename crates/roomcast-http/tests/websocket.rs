//! End-to-end WebSocket tests against a server on an ephemeral port

use futures_util::{SinkExt, StreamExt};
use roomcast_core::{Message, MessageDraft, RoomHub};
use roomcast_http::{router, serve, AppState, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    hub: Arc<RoomHub>,
    stop: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let hub = Arc::new(RoomHub::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(AppState::new(hub.clone(), None), &ServerConfig::default());

        let (stop, stopped) = oneshot::channel::<()>();
        tokio::spawn(serve(
            listener,
            app,
            async move {
                let _ = stopped.await;
            },
            Duration::from_millis(200),
        ));

        Self {
            addr,
            hub,
            stop: Some(stop),
        }
    }

    async fn connect(&self) -> Client {
        let (client, _) = connect_async(format!("ws://{}/ws", self.addr))
            .await
            .unwrap();
        client
    }

    /// Wait until `room` has `count` members
    async fn wait_for_members(&self, room: &str, count: usize) {
        timeout(Duration::from_secs(5), async {
            while self.hub.members_of(room).await.unwrap().len() != count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

async fn next_message(client: &mut Client) -> Message {
    loop {
        let frame = timeout(Duration::from_secs(5), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let WsMessage::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn subscribed_clients_receive_published_messages() {
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    alice.send(WsMessage::Text("SUBSCRIBE lobby".into())).await.unwrap();
    bob.send(WsMessage::Text("SUBSCRIBE lobby".into())).await.unwrap();
    server.wait_for_members("lobby", 2).await;

    alice
        .send(WsMessage::Text(r#"{"sender":"alice","text":"hi bob"}"#.into()))
        .await
        .unwrap();

    let to_bob = next_message(&mut bob).await;
    assert_eq!(to_bob.sender, "alice");
    assert_eq!(to_bob.text, "hi bob");
    assert_eq!(to_bob.room_id.as_str(), "lobby");

    // The publisher is a member too and gets its own message back
    let to_alice = next_message(&mut alice).await;
    assert_eq!(to_alice.message_id, to_bob.message_id);

    assert_eq!(server.hub.count_messages("lobby").await.unwrap(), 1);
}

#[tokio::test]
async fn external_publish_reaches_socket_members() {
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    client.send(WsMessage::Text("SUBSCRIBE news".into())).await.unwrap();
    server.wait_for_members("news", 1).await;

    server
        .hub
        .publish("news", MessageDraft::new("feed").with_data("{\"n\":1}"))
        .await
        .unwrap();

    let message = next_message(&mut client).await;
    assert_eq!(message.sender, "feed");
    assert_eq!(message.data, "{\"n\":1}");
}

#[tokio::test]
async fn unsubscribe_stops_delivery() {
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    client.send(WsMessage::Text("SUBSCRIBE a".into())).await.unwrap();
    server.wait_for_members("a", 1).await;
    client.send(WsMessage::Text("UNSUBSCRIBE".into())).await.unwrap();
    server.wait_for_members("a", 0).await;

    server
        .hub
        .publish("a", MessageDraft::new("s").with_text("missed"))
        .await
        .unwrap();
    client.send(WsMessage::Text("SUBSCRIBE b".into())).await.unwrap();
    server.wait_for_members("b", 1).await;
    server
        .hub
        .publish("b", MessageDraft::new("s").with_text("seen"))
        .await
        .unwrap();

    assert_eq!(next_message(&mut client).await.text, "seen");
}

#[tokio::test]
async fn invalid_subscribe_closes_the_socket() {
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    client
        .send(WsMessage::Text("SUBSCRIBE no/slashes".into()))
        .await
        .unwrap();

    let closed = timeout(Duration::from_secs(5), async {
        loop {
            match client.next().await {
                Some(Ok(WsMessage::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok());
    assert_eq!(server.hub.info().await.room_stats.len(), 0);
}

#[tokio::test]
async fn disconnect_releases_membership() {
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    client.send(WsMessage::Text("SUBSCRIBE lobby".into())).await.unwrap();
    server.wait_for_members("lobby", 1).await;

    client.close(None).await.unwrap();
    drop(client);
    server.wait_for_members("lobby", 0).await;

    timeout(Duration::from_secs(5), async {
        while server.hub.connection_count().await != 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}
