//! Common test utilities for livenews integration tests
//!
//! A scripted news server plus helpers to build clients against it and wait
//! for events.

#![allow(dead_code)]

use crossbeam_channel::Receiver;
use futures::{SinkExt, StreamExt};
use livenews::{LiveNewsConfig, NewsEvent};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Notify};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

pub const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
enum ServerPush {
    Text(String),
    Close(u16),
}

/// Mock live news server
///
/// Sends `greeting` frames on every new connection, records what clients
/// send and relays pushes to all open connections.
pub struct MockNewsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    connections: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
    received: Arc<Mutex<Vec<String>>>,
    close_codes: Arc<Mutex<Vec<Option<u16>>>>,
    push_tx: broadcast::Sender<ServerPush>,
}

impl MockNewsServer {
    pub async fn start(greeting: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (push_tx, _) = broadcast::channel(64);

        let server = Self {
            addr,
            shutdown: Arc::new(Notify::new()),
            connections: Arc::new(AtomicUsize::new(0)),
            paths: Arc::new(Mutex::new(Vec::new())),
            received: Arc::new(Mutex::new(Vec::new())),
            close_codes: Arc::new(Mutex::new(Vec::new())),
            push_tx,
        };

        let shutdown = Arc::clone(&server.shutdown);
        let connections = Arc::clone(&server.connections);
        let paths = Arc::clone(&server.paths);
        let received = Arc::clone(&server.received);
        let close_codes = Arc::clone(&server.close_codes);
        let push_tx = server.push_tx.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        let Ok((stream, _)) = result else { break };
                        tokio::spawn(handle_connection(
                            stream,
                            greeting.clone(),
                            Arc::clone(&shutdown),
                            Arc::clone(&connections),
                            Arc::clone(&paths),
                            Arc::clone(&received),
                            Arc::clone(&close_codes),
                            push_tx.subscribe(),
                        ));
                    }
                    _ = shutdown.notified() => break,
                }
            }
        });

        server
    }

    /// Client config pointing at this server with fast retries
    pub fn config(&self) -> LiveNewsConfig {
        LiveNewsConfig {
            host: self.addr.to_string(),
            reconnect_base_delay_ms: 10,
            ..Default::default()
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Request paths of every handshake, in order
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn close_codes(&self) -> Vec<Option<u16>> {
        self.close_codes.lock().unwrap().clone()
    }

    pub fn push_text(&self, text: impl Into<String>) {
        let _ = self.push_tx.send(ServerPush::Text(text.into()));
    }

    pub fn close_all(&self, code: u16) {
        let _ = self.push_tx.send(ServerPush::Close(code));
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockNewsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_connection(
    stream: tokio::net::TcpStream,
    greeting: Vec<String>,
    shutdown: Arc<Notify>,
    connections: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
    received: Arc<Mutex<Vec<String>>>,
    close_codes: Arc<Mutex<Vec<Option<u16>>>>,
    mut push_rx: broadcast::Receiver<ServerPush>,
) {
    let record_path = {
        let paths = Arc::clone(&paths);
        move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            paths.lock().unwrap().push(request.uri().path().to_string());
            Ok(response)
        }
    };

    let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, record_path).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };
    connections.fetch_add(1, Ordering::SeqCst);

    let (mut write, mut read) = ws_stream.split();
    for frame in greeting {
        if write.send(Message::Text(frame)).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => received.lock().unwrap().push(text),
                    Some(Ok(Message::Close(frame))) => {
                        close_codes.lock().unwrap().push(frame.map(|f| u16::from(f.code)));
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
            push = push_rx.recv() => {
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
            _ = shutdown.notified() => break,
        }
    }
}

/// A host:port with nothing listening on it
pub async fn unused_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

pub fn article_json(title: &str, category: &str, priority: i64) -> String {
    format!(
        r#"{{"title":"{title}","description":"{title} story","url":"https://news.example/{priority}","source":"Wire","publishedAt":"2024-05-01T12:00:00Z","category":"{category}","sentiment":"neutral","relevance_score":0.5,"isBreaking":false,"priority":{priority}}}"#
    )
}

/// Poll the event tap until `predicate` matches, collecting everything seen
///
/// Returns the matching event, or `None` on timeout. Events seen before the
/// match are appended to `seen`.
pub async fn wait_for_event(
    rx: &Receiver<NewsEvent>,
    seen: &mut Vec<NewsEvent>,
    mut predicate: impl FnMut(&NewsEvent) -> bool,
) -> Option<NewsEvent> {
    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        while let Ok(event) = rx.try_recv() {
            if predicate(&event) {
                return Some(event);
            }
            seen.push(event);
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Let the session task run for `duration`, then drain the tap
pub async fn settle(rx: &Receiver<NewsEvent>, duration: Duration) -> Vec<NewsEvent> {
    tokio::time::sleep(duration).await;
    rx.try_iter().collect()
}

pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
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
