//! Small in-process test harness: bind a real `TcpListener`, serve the
//! actual `axum` router on it, and drive it over real WebSocket
//! connections rather than calling handlers directly.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use server::auth::NullAuth;
use server::state::AppState;
use server::stats::NullStats;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub struct TestServer {
    pub base_url: String,
}

impl TestServer {
    pub async fn start() -> Self {
        let state = Arc::new(AppState::new(Arc::new(NullAuth), Arc::new(NullStats)));
        let app = server::app_router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("ws://127.0.0.1:{port}") }
    }

    pub async fn connect(&self, path: &str) -> WsClient {
        let (stream, _response) = connect_async(format!("{}{}", self.base_url, path)).await.unwrap();
        WsClient { stream }
    }
}

pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl WsClient {
    pub async fn send_json(&mut self, value: Value) {
        self.stream.send(Message::Text(value.to_string().into())).await.unwrap();
    }

    /// Reads the next text frame and parses it as JSON. Panics if the
    /// connection closes or a non-text frame arrives first; every
    /// scenario below knows exactly what frame shape to expect next.
    pub async fn recv_json(&mut self) -> Value {
        loop {
            match self.stream.next().await.expect("connection closed unexpectedly").unwrap() {
                Message::Text(text) => return serde_json::from_str(&text).unwrap(),
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("expected a text frame, got {other:?}"),
            }
        }
    }

    pub async fn expect_close(&mut self) -> Option<u16> {
        loop {
            match self.stream.next().await {
                None => return None,
                Some(Ok(Message::Close(frame))) => return frame.map(|f| f.code.into()),
                Some(Ok(_)) => continue,
                Some(Err(_)) => return None,
            }
        }
    }
}
