//! Common test utilities for feedsocket integration tests
//!
//! A scripted WebSocket server plus small polling helpers.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Notify};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// What the server does right after the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Keep the connection open, record inbound text, relay pushes
    Serve,
    /// Drop the TCP stream without a close frame
    DropAfterHandshake,
    /// Send a close frame with this code
    CloseWith(u16),
}

#[derive(Debug, Clone)]
enum ServerPush {
    Text(String),
    Close(u16),
}

/// A simple mock WebSocket server for testing
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    connections: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
    close_codes: Arc<Mutex<Vec<Option<u16>>>>,
    push_tx: broadcast::Sender<ServerPush>,
}

impl MockWsServer {
    /// Create and start a new mock WebSocket server
    pub async fn start(behavior: Behavior) -> Self {
        Self::start_with_greeting(behavior, Vec::new()).await
    }

    /// Like `start`, sending `greeting` frames on every new connection
    pub async fn start_with_greeting(behavior: Behavior, greeting: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let connections = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(Vec::new()));
        let close_codes = Arc::new(Mutex::new(Vec::new()));
        let (push_tx, _) = broadcast::channel(64);

        let server = Self {
            addr,
            shutdown: Arc::clone(&shutdown),
            connections: Arc::clone(&connections),
            received: Arc::clone(&received),
            close_codes: Arc::clone(&close_codes),
            push_tx: push_tx.clone(),
        };

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let conn = Connection {
                                    behavior,
                                    greeting: greeting.clone(),
                                    shutdown: Arc::clone(&shutdown),
                                    connections: Arc::clone(&connections),
                                    received: Arc::clone(&received),
                                    close_codes: Arc::clone(&close_codes),
                                    push_rx: push_tx.subscribe(),
                                };
                                tokio::spawn(conn.run(stream));
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown.notified() => {
                        break;
                    }
                }
            }
        });

        server
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Number of completed handshakes so far
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Text frames received from clients, in arrival order
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Close codes sent by clients (`None` for a close frame without payload)
    pub fn close_codes(&self) -> Vec<Option<u16>> {
        self.close_codes.lock().unwrap().clone()
    }

    /// Send a text frame on every open connection
    pub fn push_text(&self, text: impl Into<String>) {
        let _ = self.push_tx.send(ServerPush::Text(text.into()));
    }

    /// Close every open connection with `code`
    pub fn close_all(&self, code: u16) {
        let _ = self.push_tx.send(ServerPush::Close(code));
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Connection {
    behavior: Behavior,
    greeting: Vec<String>,
    shutdown: Arc<Notify>,
    connections: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
    close_codes: Arc<Mutex<Vec<Option<u16>>>>,
    push_rx: broadcast::Receiver<ServerPush>,
}

impl Connection {
    async fn run(mut self, stream: tokio::net::TcpStream) {
        let mut ws_stream = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };
        self.connections.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            Behavior::Serve => {}
            Behavior::DropAfterHandshake => {
                drop(ws_stream);
                return;
            }
            Behavior::CloseWith(code) => {
                let _ = ws_stream
                    .close(Some(CloseFrame {
                        code: CloseCode::from(code),
                        reason: "server close".into(),
                    }))
                    .await;
                return;
            }
        }

        let (mut write, mut read) = ws_stream.split();

        for frame in &self.greeting {
            if write.send(Message::Text(frame.clone())).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.received.lock().unwrap().push(text);
                        }
                        Some(Ok(Message::Close(frame))) => {
                            self.close_codes
                                .lock()
                                .unwrap()
                                .push(frame.map(|f| u16::from(f.code)));
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(_)) | None => break,
                    }
                }
                push = self.push_rx.recv() => {
                    match push {
                        Ok(ServerPush::Text(text)) => {
                            if write.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        Ok(ServerPush::Close(code)) => {
                            let _ = write
                                .send(Message::Close(Some(CloseFrame {
                                    code: CloseCode::from(code),
                                    reason: "server close".into(),
                                })))
                                .await;
                            break;
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = self.shutdown.notified() => {
                    break;
                }
            }
        }
    }
}

/// Poll `condition` every 10ms until it holds or `timeout` elapses
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// A local port with nothing listening on it
pub async fn unused_ws_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}", addr)
}
