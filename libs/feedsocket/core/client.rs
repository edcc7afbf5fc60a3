use crate::config::{ClientConfig, RouteTable};
use crate::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::heartbeat::Heartbeat;
use crate::traits::*;
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type WsSink = futures::stream::SplitSink<WsStream, Message>;
type WsSource = futures::stream::SplitStream<WsStream>;

/// Close code of an intentional, orderly close
pub const NORMAL_CLOSE_CODE: u16 = 1000;

/// Internal command messages for client control
#[derive(Debug)]
enum ClientCommand {
    /// Send a message to the WebSocket
    Send(WsMessage),
    /// Close the socket normally and stop the session
    Shutdown,
}

/// Lifecycle events delivered to the [`LifecycleHandler`]
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Handshake completed, the socket is open
    Connected,
    /// An open connection ended
    ///
    /// `code` is the peer's close code, `None` when the stream ended without
    /// a close frame or on a transport error.
    Disconnected { code: Option<u16>, reason: String },
    /// A reconnect attempt is scheduled after `delay`
    Reconnecting { attempt: usize, delay: Duration },
    /// Transport-level failure (handshake, read/write error, abnormal close)
    Error(String),
    /// The reconnection strategy gave up after `attempts` reconnect attempts
    Failed { attempts: usize },
}

impl ClientEvent {
    /// True for a `Disconnected` event carrying the normal close code
    pub fn is_normal_close(&self) -> bool {
        matches!(
            self,
            ClientEvent::Disconnected {
                code: Some(NORMAL_CLOSE_CODE),
                ..
            }
        )
    }
}

/// Client metrics snapshot
#[derive(Debug, Clone)]
pub struct Metrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}

/// How a single connection ended
#[derive(Debug)]
enum ConnectionEnd {
    /// Local shutdown, socket closed with the normal code
    Shutdown,
    /// Peer closed or the stream ended
    Closed { code: Option<u16>, reason: String },
}

/// Handle to a running WebSocket session
///
/// The session runs on its own tokio task: it connects, dispatches every
/// inbound frame through the router, sends keep-alive payloads and reconnects
/// according to the configured strategy. The handle only carries the command
/// channel and shared atomics.
///
/// Dropping the handle stops the session.
pub struct WebSocketClient {
    url: String,
    /// Atomic connection state
    state: Arc<AtomicConnectionState>,
    /// Atomic metrics
    metrics: Arc<AtomicMetrics>,
    /// Command channel sender
    command_tx: UnboundedSender<ClientCommand>,
    /// Session task handle
    task_handle: Option<JoinHandle<()>>,
    /// Shutdown flag reference (shared with the session task)
    shutdown_flag: Arc<AtomicBool>,
}

impl WebSocketClient {
    /// Spawn the session task on the current tokio runtime
    ///
    /// This is called by the builder's `build()` method.
    /// Use `feedsocket::builder()` to create a client.
    pub(crate) fn spawn<R>(config: ClientConfig<R>, routes: RouteTable<R>) -> Result<Self>
    where
        R: MessageRouter,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| FeedSocketError::Configuration(format!("no tokio runtime: {e}")))?;

        let url = config.url.clone();
        let shutdown_flag = Arc::clone(&config.shutdown_flag);
        let state = Arc::new(AtomicConnectionState::new(ConnectionState::Connecting));
        let metrics = Arc::new(AtomicMetrics::new());
        let (command_tx, command_rx) = unbounded_channel();

        let task_handle = {
            let state = Arc::clone(&state);
            let metrics = Arc::clone(&metrics);
            runtime.spawn(run_client(config, routes, state, metrics, command_rx))
        };

        Ok(Self {
            url,
            state,
            metrics,
            command_tx,
            task_handle: Some(task_handle),
            shutdown_flag,
        })
    }

    /// Queue a message for the open connection
    ///
    /// Messages queued while the session is not connected are discarded, not
    /// replayed on the next connection.
    pub fn send(&self, message: WsMessage) -> Result<()> {
        self.command_tx
            .send(ClientCommand::Send(message))
            .map_err(|e| FeedSocketError::ChannelSend(e.to_string()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get current connection state
    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Check if connected
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// True once the session task has exited
    pub fn is_finished(&self) -> bool {
        self.task_handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    /// Get current metrics
    pub fn metrics(&self) -> Metrics {
        Metrics {
            messages_sent: self.metrics.messages_sent(),
            messages_received: self.metrics.messages_received(),
            reconnect_count: self.metrics.reconnect_count(),
            connection_state: self.state.get(),
        }
    }

    /// Get a reference to the shutdown flag
    ///
    /// The flag is checked before every dispatch and reconnection attempt.
    /// Storing `false` stops the session at the next check.
    pub fn shutdown_flag(&self) -> &Arc<AtomicBool> {
        &self.shutdown_flag
    }

    /// Ask the session to stop without waiting for it
    ///
    /// Idempotent. An open socket is closed with the normal close code.
    pub fn stop(&self) {
        let was_running = self.shutdown_flag.swap(false, Ordering::AcqRel);
        if !was_running {
            return;
        }

        debug!(url = %self.url, "Stopping WebSocket session");
        if !self.state.is_failed() {
            self.state.set(ConnectionState::ShuttingDown);
        }
        // The task may already be gone (failed or closed normally)
        let _ = self.command_tx.send(ClientCommand::Shutdown);
    }

    /// Stop the session and wait for its task to finish
    pub async fn shutdown(mut self) -> Result<()> {
        info!(url = %self.url, "Shutting down WebSocket client");
        self.stop();

        if let Some(handle) = self.task_handle.take() {
            handle
                .await
                .map_err(|e| FeedSocketError::Other(format!("session task failed: {e}")))?;
        }
        Ok(())
    }
}

impl Drop for WebSocketClient {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Main session loop: connect, serve, back off, repeat
async fn run_client<R>(
    config: ClientConfig<R>,
    mut routes: RouteTable<R>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    mut command_rx: UnboundedReceiver<ClientCommand>,
) where
    R: MessageRouter,
{
    let mut reconnect_attempt: usize = 0;

    loop {
        if !config.is_running() {
            debug!("Shutdown flag is false, exiting main loop");
            break;
        }

        state.set(ConnectionState::Connecting);

        match connect_async(config.url.as_str()).await {
            Ok((ws_stream, _response)) => {
                let (mut write, mut read) = ws_stream.split();

                // Anything queued before the handshake belongs to no connection
                if discard_stale_commands(&mut command_rx) || !config.is_running() {
                    close_normally(&mut write).await;
                    break;
                }

                info!(url = %config.url, "Connected");
                reconnect_attempt = 0;
                state.set(ConnectionState::Connected);
                notify(&config, ClientEvent::Connected);

                let end = message_loop(
                    &mut write,
                    &mut read,
                    &config,
                    &mut routes,
                    &metrics,
                    &mut command_rx,
                )
                .await;

                match end {
                    Ok(ConnectionEnd::Shutdown) => {
                        debug!("Connection closed by local shutdown");
                        break;
                    }
                    Ok(ConnectionEnd::Closed { code, reason }) => {
                        let event = ClientEvent::Disconnected { code, reason };
                        if event.is_normal_close() {
                            info!("Server closed the connection normally");
                            state.set(ConnectionState::Disconnected);
                            notify(&config, event);
                            break;
                        }
                        warn!(?code, "Connection closed abnormally");
                        notify(
                            &config,
                            ClientEvent::Error(format!("connection closed abnormally (code {code:?})")),
                        );
                        notify(&config, event);
                    }
                    Err(e) => {
                        error!("Connection error: {}", e);
                        notify(&config, ClientEvent::Error(e.to_string()));
                        notify(
                            &config,
                            ClientEvent::Disconnected {
                                code: None,
                                reason: e.to_string(),
                            },
                        );
                    }
                }
            }
            Err(e) => {
                error!("Failed to connect: {}", e);
                notify(&config, ClientEvent::Error(e.to_string()));
            }
        }

        if !config.is_running() {
            debug!("Shutdown flag set during connection, stopping reconnection");
            break;
        }

        reconnect_attempt += 1;
        match config.reconnect_strategy.next_delay(reconnect_attempt) {
            Some(delay) => {
                state.set(ConnectionState::Reconnecting);
                metrics.increment_reconnects();
                info!("Reconnecting in {:?} (attempt {})", delay, reconnect_attempt);
                notify(
                    &config,
                    ClientEvent::Reconnecting {
                        attempt: reconnect_attempt,
                        delay,
                    },
                );

                if !wait_for_retry(delay, &config, &mut command_rx).await {
                    debug!("Shutdown requested during reconnection delay");
                    break;
                }
            }
            None => {
                let attempts = reconnect_attempt - 1;
                warn!(attempts, "Reconnection strategy exhausted, stopping");
                state.set(ConnectionState::Failed);
                notify(&config, ClientEvent::Failed { attempts });
                break;
            }
        }
    }

    if !state.is_failed() {
        state.set(ConnectionState::Disconnected);
    }
    info!("Client task exiting");
}

/// Serve one open connection until it closes or the session is stopped
async fn message_loop<R>(
    write: &mut WsSink,
    read: &mut WsSource,
    config: &ClientConfig<R>,
    routes: &mut RouteTable<R>,
    metrics: &AtomicMetrics,
    command_rx: &mut UnboundedReceiver<ClientCommand>,
) -> Result<ConnectionEnd>
where
    R: MessageRouter,
{
    // Fresh keep-alive timer per connection, dropped with the loop
    let mut heartbeat = config
        .heartbeat
        .as_ref()
        .map(|(interval, payload)| Heartbeat::new(*interval, payload.clone()));

    loop {
        if !config.is_running() {
            debug!("Shutdown flag detected in message loop, closing connection");
            close_normally(write).await;
            return Ok(ConnectionEnd::Shutdown);
        }

        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (Some(u16::from(f.code)), f.reason.into_owned()))
                            .unwrap_or((None, String::new()));
                        debug!(?code, %reason, "Close frame received");
                        return Ok(ConnectionEnd::Closed { code, reason });
                    }
                    Some(Ok(msg)) => {
                        if let Some(ws_msg) = tungstenite_to_ws_message(msg) {
                            metrics.increment_received();
                            dispatch(config, routes, ws_msg).await;
                        }
                    }
                    Some(Err(e)) => {
                        return Err(FeedSocketError::WebSocket(e.to_string()));
                    }
                    None => {
                        warn!("WebSocket stream closed");
                        return Ok(ConnectionEnd::Closed {
                            code: None,
                            reason: "stream ended".to_string(),
                        });
                    }
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(ClientCommand::Send(msg)) => {
                        write.send(ws_message_to_tungstenite(&msg)).await.map_err(|e| {
                            FeedSocketError::WebSocket(e.to_string())
                        })?;
                        metrics.increment_sent();
                    }
                    Some(ClientCommand::Shutdown) | None => {
                        info!("Received shutdown command");
                        close_normally(write).await;
                        return Ok(ConnectionEnd::Shutdown);
                    }
                }
            }

            payload = next_heartbeat(&mut heartbeat) => {
                debug!("Heartbeat tick - sending payload");
                write.send(ws_message_to_tungstenite(&payload)).await.map_err(|e| {
                    FeedSocketError::WebSocket(format!("Failed to send heartbeat: {}", e))
                })?;
                metrics.increment_sent();
            }
        }
    }
}

/// Parse a frame and hand it to the handler registered for its route
async fn dispatch<R>(config: &ClientConfig<R>, routes: &mut RouteTable<R>, message: WsMessage)
where
    R: MessageRouter,
{
    if !config.is_running() {
        debug!("Shutdown detected, skipping message parsing");
        return;
    }

    match config.router.parse(message).await {
        Ok(parsed) => {
            let route_key = config.router.route_key(&parsed);
            match routes.get_mut(&route_key) {
                Some(handler) => {
                    if let Err(e) = handler.handle(parsed) {
                        error!("Handler error for route {:?}: {}", route_key, e);
                    }
                }
                None => warn!("No handler configured for route key: {:?}", route_key),
            }
        }
        Err(e) => warn!("Parse error: {}", e),
    }
}

/// Wait out a reconnection delay; false if the session was stopped meanwhile
async fn wait_for_retry<R>(
    delay: Duration,
    config: &ClientConfig<R>,
    command_rx: &mut UnboundedReceiver<ClientCommand>,
) -> bool
where
    R: MessageRouter,
{
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return config.is_running(),
            cmd = command_rx.recv() => match cmd {
                Some(ClientCommand::Send(_)) => {
                    debug!("Dropping outbound message while reconnecting");
                }
                Some(ClientCommand::Shutdown) | None => return false,
            }
        }
    }
}

/// Drop queued sends; true if a shutdown was among them
fn discard_stale_commands(command_rx: &mut UnboundedReceiver<ClientCommand>) -> bool {
    let mut shutdown = false;
    while let Ok(cmd) = command_rx.try_recv() {
        match cmd {
            ClientCommand::Send(_) => debug!("Discarding message queued while disconnected"),
            ClientCommand::Shutdown => shutdown = true,
        }
    }
    shutdown
}

async fn next_heartbeat(heartbeat: &mut Option<Heartbeat>) -> WsMessage {
    match heartbeat {
        Some(heartbeat) => heartbeat.tick().await,
        None => std::future::pending().await,
    }
}

async fn close_normally(write: &mut WsSink) {
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: "client disconnect".into(),
    };
    if let Err(e) = write.send(Message::Close(Some(frame))).await {
        debug!("Close frame not sent: {}", e);
    }
    let _ = write.close().await;
}

fn notify<R>(config: &ClientConfig<R>, event: ClientEvent)
where
    R: MessageRouter,
{
    if config.is_running() {
        config.lifecycle.on_event(&event);
    } else {
        debug!(?event, "Session stopping, lifecycle event dropped");
    }
}

/// Convert WsMessage to tungstenite Message
fn ws_message_to_tungstenite(msg: &WsMessage) -> Message {
    match msg {
        WsMessage::Text(text) => Message::Text(text.clone()),
        WsMessage::Binary(data) => Message::Binary(data.clone()),
    }
}

/// Convert tungstenite Message to WsMessage
fn tungstenite_to_ws_message(msg: Message) -> Option<WsMessage> {
    match msg {
        Message::Text(text) => Some(WsMessage::Text(text)),
        Message::Binary(data) => Some(WsMessage::Binary(data)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}
