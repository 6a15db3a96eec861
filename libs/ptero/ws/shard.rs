use super::connection_state::{AtomicConnectionState, ConnectionState};
use super::events::{ShardEvent, WsPayload};
use super::handler::{ShardHandler, TokenSource};
use crate::client::types::PowerSignal;
use crate::error::{PteroError, Result};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWrite = SplitSink<WsStream, Message>;
type WsRead = SplitStream<WsStream>;

/// Commands from the shard handle to its socket task
#[derive(Debug)]
enum ShardCommand {
    Send(WsPayload),
    Close(u16),
}

/// One live socket and the task driving it
struct Connection {
    commands: mpsc::UnboundedSender<ShardCommand>,
    state: Arc<AtomicConnectionState>,
}

/// Console socket for a single server
///
/// Holds at most one live connection. There is no automatic reconnection:
/// once the socket closes, call [`Shard::connect`] again.
pub struct Shard {
    id: String,
    origin: String,
    tokens: Arc<dyn TokenSource>,
    connection: Mutex<Option<Connection>>,
}

impl Shard {
    /// `origin` is the panel URL; the daemon checks it against its allowed origins
    pub fn new(id: impl Into<String>, origin: impl Into<String>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            id: id.into(),
            origin: origin.into(),
            tokens,
            connection: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.connection
            .lock()
            .as_ref()
            .map(|c| c.state.get())
            .unwrap_or(ConnectionState::Disconnected)
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Open the socket, authenticate, and start dispatching to `handler`
    ///
    /// An existing connection is closed and replaced.
    pub async fn connect(&self, handler: Arc<dyn ShardHandler>) -> Result<()> {
        let previous = self.connection.lock().take();
        if let Some(old) = previous {
            debug!("Replacing existing connection for shard {}", self.id);
            old.state.set(ConnectionState::ShuttingDown);
            let _ = old.commands.send(ShardCommand::Close(1000));
        }

        let state = Arc::new(AtomicConnectionState::new(ConnectionState::Connecting));

        let auth = self.tokens.websocket_auth(&self.id).await?;

        let mut request = auth
            .socket
            .as_str()
            .into_client_request()
            .map_err(|e| PteroError::WebSocket(format!("Invalid socket URL: {}", e)))?;
        match HeaderValue::from_str(&self.origin) {
            Ok(origin) => {
                request.headers_mut().insert("Origin", origin);
            }
            Err(_) => warn!("Panel URL is not a valid Origin header: {}", self.origin),
        }

        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| PteroError::WebSocket(format!("Failed to connect: {}", e)))?;
        info!("Connected shard {} to {}", self.id, auth.socket);

        let (mut write, read) = stream.split();

        handler.on_debug(&format!("authenticating shard {}", self.id));
        send_payload(&mut write, &WsPayload::auth(auth.token)).await?;
        state.set(ConnectionState::Connected);

        let (tx, rx) = mpsc::unbounded_channel();
        let task = ShardTask {
            id: self.id.clone(),
            tokens: Arc::clone(&self.tokens),
            handler,
            state: Arc::clone(&state),
        };
        tokio::spawn(task.run(write, read, rx));

        *self.connection.lock() = Some(Connection {
            commands: tx,
            state,
        });
        Ok(())
    }

    fn send(&self, payload: WsPayload) -> Result<()> {
        let guard = self.connection.lock();
        match guard.as_ref() {
            Some(conn) if conn.state.is_connected() => conn
                .commands
                .send(ShardCommand::Send(payload))
                .map_err(|_| PteroError::NotConnected),
            _ => Err(PteroError::NotConnected),
        }
    }

    pub fn request_logs(&self) -> Result<()> {
        self.send(WsPayload::new("send logs", Vec::new()))
    }

    pub fn request_stats(&self) -> Result<()> {
        self.send(WsPayload::new("send stats", Vec::new()))
    }

    pub fn send_command(&self, command: impl Into<String>) -> Result<()> {
        self.send(WsPayload::new("send command", vec![command.into()]))
    }

    pub fn set_power_state(&self, signal: PowerSignal) -> Result<()> {
        self.send(WsPayload::new("set state", vec![signal.to_string()]))
    }

    /// Close the socket with a normal closure (1000)
    pub fn destroy(&self) {
        if let Some(conn) = self.connection.lock().take() {
            info!("Destroying shard {}", self.id);
            conn.state.set(ConnectionState::ShuttingDown);
            let _ = conn.commands.send(ShardCommand::Close(1000));
        }
    }
}

impl Drop for Shard {
    fn drop(&mut self) {
        self.destroy();
    }
}

async fn send_payload(write: &mut WsWrite, payload: &WsPayload) -> Result<()> {
    let text = serde_json::to_string(payload)?;
    write
        .send(Message::Text(text))
        .await
        .map_err(|e| PteroError::WebSocket(format!("Failed to send '{}': {}", payload.event, e)))
}

struct ShardTask {
    id: String,
    tokens: Arc<dyn TokenSource>,
    handler: Arc<dyn ShardHandler>,
    state: Arc<AtomicConnectionState>,
}

impl ShardTask {
    async fn run(
        self,
        mut write: WsWrite,
        mut read: WsRead,
        mut commands: mpsc::UnboundedReceiver<ShardCommand>,
    ) {
        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if !self.on_frame(&mut write, &text).await {
                                let _ = write.close().await;
                                break;
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            debug!("Shard {} closed by daemon: {:?}", self.id, frame);
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!("Shard {} socket error: {}", self.id, e);
                            self.handler.on_error(&PteroError::WebSocket(e.to_string()));
                            break;
                        }
                        None => {
                            debug!("Shard {} stream ended", self.id);
                            break;
                        }
                    }
                }

                cmd = commands.recv() => {
                    match cmd {
                        Some(ShardCommand::Send(payload)) => {
                            if let Err(e) = send_payload(&mut write, &payload).await {
                                self.handler.on_error(&e);
                                break;
                            }
                        }
                        Some(ShardCommand::Close(code)) => {
                            let frame = CloseFrame {
                                code: CloseCode::from(code),
                                reason: "".into(),
                            };
                            let _ = write.send(Message::Close(Some(frame))).await;
                            break;
                        }
                        None => {
                            let _ = write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        self.state.set(ConnectionState::Disconnected);
        info!("Shard {} disconnected", self.id);
    }

    /// Handle one text frame; `false` ends the connection
    async fn on_frame(&self, write: &mut WsWrite, text: &str) -> bool {
        let payload: WsPayload = match serde_json::from_str(text) {
            Ok(p) => p,
            Err(e) => {
                warn!("Shard {} received an undecodable frame", self.id);
                self.handler.on_error(&PteroError::DeserializeFailed(e.to_string()));
                return true;
            }
        };

        self.handler.on_raw(&payload);

        let event = match ShardEvent::parse(&payload) {
            Ok(event) => event,
            Err(e) => {
                self.handler.on_error(&e);
                return true;
            }
        };

        match event {
            ShardEvent::TokenExpiring => {
                self.reauthenticate(write).await;
                true
            }
            ShardEvent::TokenExpired => {
                info!("Token expired for shard {}, disconnecting", self.id);
                false
            }
            other => {
                dispatch(self.handler.as_ref(), other);
                true
            }
        }
    }

    async fn reauthenticate(&self, write: &mut WsWrite) {
        self.handler.on_debug(&format!("reauthenticating shard {}", self.id));

        let result = match self.tokens.websocket_auth(&self.id).await {
            Ok(auth) => send_payload(write, &WsPayload::auth(auth.token)).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Failed to reauthenticate shard {}: {}", self.id, e);
            self.handler.on_error(&e);
        }
    }
}

/// Route a decoded event to its callback
pub fn dispatch(handler: &dyn ShardHandler, event: ShardEvent) {
    match event {
        ShardEvent::AuthSuccess => handler.on_ready(),
        ShardEvent::BackupCompleted(backup) => handler.on_backup_complete(&backup),
        ShardEvent::ConsoleOutput(lines) => handler.on_console_output(&lines),
        ShardEvent::DaemonMessage(lines) => handler.on_daemon_output(&lines),
        ShardEvent::DaemonError(message) => handler.on_daemon_error(&message),
        ShardEvent::InstallStarted => handler.on_install_start(),
        ShardEvent::InstallOutput(lines) => handler.on_install_output(&lines),
        ShardEvent::InstallCompleted => handler.on_install_complete(),
        ShardEvent::JwtError(message) => handler.on_jwt_error(&message),
        ShardEvent::Stats(stats) => handler.on_stats_update(&stats),
        ShardEvent::Status(status) => handler.on_status_update(&status),
        ShardEvent::TransferLogs(lines) => handler.on_transfer_output(&lines),
        ShardEvent::TransferStatus(status) => handler.on_transfer_status(&status),
        ShardEvent::Unknown(name) => handler.on_error(&PteroError::UnknownEvent(name)),
        // Token lifecycle is handled by the socket task
        ShardEvent::TokenExpiring | ShardEvent::TokenExpired => {}
    }
}
