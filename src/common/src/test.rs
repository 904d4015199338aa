use std::{fmt::Debug, time::Duration};

use futures_util::{FutureExt, SinkExt, StreamExt, TryStreamExt};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::{
    net::{TcpListener, TcpStream},
    time::timeout,
};
use tokio_tungstenite::{
    accept_async,
    tungstenite::{
        protocol::{frame::coding::CloseCode, CloseFrame},
        Message,
    },
    WebSocketStream,
};
use tracing::{debug, Level};

const TIMEOUT: Duration = Duration::from_millis(1000);

/// Init logging for tests, ignore error if already set
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_line_number(true)
        .with_file(true)
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Stand-in game server for client tests. Binds a random local port and accepts websocket
/// clients one at a time.
pub struct MockServer {
    pub address: String,
    listener: TcpListener,
}

impl MockServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let address = listener
            .local_addr()
            .expect("Failed to unwrap local address")
            .to_string();
        debug!("Mock server listening on {}", address);
        MockServer { address, listener }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.address)
    }

    pub async fn accept(&self) -> MockConnection {
        let (stream, peer) = timeout(TIMEOUT, self.listener.accept())
            .await
            .expect("Timeout waiting for client")
            .expect("Failed to accept client");
        debug!("Mock server accepted {}", peer);
        let stream = accept_async(stream)
            .await
            .expect("Websocket handshake failed");
        MockConnection { stream }
    }
}

/// Server side of one client connection.
pub struct MockConnection {
    stream: WebSocketStream<TcpStream>,
}

impl MockConnection {
    pub async fn push(&mut self, body: impl ToString) {
        timeout(TIMEOUT, self.stream.send(Message::text(body.to_string())))
            .await
            .expect("Timeout sending message")
            .expect("Failed to send message");
    }

    pub async fn push_json(&mut self, body: &Value) {
        self.push(body).await
    }

    /// Next text frame from the client, deserialized.
    pub async fn expect_request<RQ>(&mut self) -> RQ
    where
        RQ: DeserializeOwned,
    {
        let body = self.next_text().await;
        serde_json::from_str(&body)
            .unwrap_or_else(|e| panic!("Failed to deserialize request {}: {}", body, e))
    }

    /// Next frame from the client must equal `expected` once both are turned into JSON.
    pub async fn expect_json<RQ>(&mut self, expected: &RQ)
    where
        RQ: Serialize + Debug,
    {
        let body = self.next_text().await;
        let actual: Value = serde_json::from_str(&body).expect("Client sent invalid JSON");
        let expected_value = serde_json::to_value(expected).expect("Failed to serialize");
        assert_eq!(expected_value, actual, "expected {:?}", expected);
    }

    /// Client must not have sent anything.
    pub fn expect_silence(&mut self) {
        if let Some(msg) = self.stream.try_next().now_or_never() {
            panic!("Expected no incoming message, got {:?}", msg);
        }
    }

    pub async fn close(&mut self) {
        let _ = self
            .stream
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "Mock server closing".into(),
            })))
            .await;
    }

    async fn next_text(&mut self) -> String {
        loop {
            let msg = timeout(TIMEOUT, self.stream.next())
                .await
                .expect("Timeout waiting for client message")
                .expect("No message found")
                .expect("Failed to read message");
            if msg.is_text() {
                return msg
                    .into_text()
                    .expect("Failed to convert message to text");
            }
        }
    }
}
