//! ConnectionManager: owns the single channel and its lifecycle
//!
//! All lifecycle work runs on one actor task, so state transitions are
//! serialized by construction: a `disconnect` command cancels the retry
//! timer and pins the attempt counter in the same synchronous step, leaving
//! no window for a stale timer to reopen the channel.
//!
//! Socket I/O lives in a separate task per connection attempt, tagged with
//! a generation number. Events from a replaced socket are dropped, which is
//! what makes `connect()` safe to call while a channel is already live:
//! exactly one socket is ever current.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::backoff::ReconnectPolicy;
use super::machine::{ConnectionMachine, ConnectionState, Directive, CLOSE_ABNORMAL};

/// Commands accepted by the connection actor
enum Command {
    Connect,
    Disconnect,
    Send(String),
}

/// Event reported by a socket task, tagged with its generation
struct SocketEvent {
    generation: u64,
    kind: SocketEventKind,
}

enum SocketEventKind {
    Opened,
    Frame(String),
    Closed { code: u16 },
}

/// Outbound traffic handed to the socket task
enum Outbound {
    Text(String),
    Close { code: u16 },
}

/// Handle to the connection actor
///
/// Cheap to clone; the actor shuts its channel down and exits once every
/// handle is dropped.
#[derive(Clone)]
pub struct ConnectionManager {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<ConnectionState>,
}

impl ConnectionManager {
    /// Spawn the actor for `url`. Inbound text frames are forwarded
    /// verbatim into `frames`; decoding is the router's job.
    ///
    /// Must be called from within a tokio runtime. The channel stays idle
    /// until [`ConnectionManager::connect`] is called.
    pub fn spawn(
        url: String,
        policy: ReconnectPolicy,
        frames: mpsc::UnboundedSender<String>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(ConnectionState::Idle);
        let (socket_events_tx, socket_events_rx) = mpsc::unbounded_channel();
        let actor = ConnectionActor {
            url,
            machine: ConnectionMachine::new(policy),
            status_tx,
            frames,
            socket_events_tx,
            socket: None,
            generation: 0,
            retry_deadline: None,
        };
        tokio::spawn(actor.run(command_rx, socket_events_rx));
        Self { commands, status }
    }

    /// Open the channel, replacing any live socket and pending retry
    pub fn connect(&self) {
        let _ = self.commands.send(Command::Connect);
    }

    /// Close the channel intentionally; no reconnect will follow
    pub fn disconnect(&self) {
        let _ = self.commands.send(Command::Disconnect);
    }

    /// Send a diagnostic text frame; dropped with a warning unless open
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.commands.send(Command::Send(text.into()));
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.status.borrow().clone()
    }

    /// Subscribe to lifecycle transitions
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.status.clone()
    }
}

/// A live (or opening) socket task
struct Socket {
    generation: u64,
    outbound: mpsc::UnboundedSender<Outbound>,
    task: JoinHandle<()>,
}

struct ConnectionActor {
    url: String,
    machine: ConnectionMachine,
    status_tx: watch::Sender<ConnectionState>,
    frames: mpsc::UnboundedSender<String>,
    socket_events_tx: mpsc::UnboundedSender<SocketEvent>,
    socket: Option<Socket>,
    generation: u64,
    retry_deadline: Option<Instant>,
}

impl ConnectionActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut socket_events: mpsc::UnboundedReceiver<SocketEvent>,
    ) {
        loop {
            let retry_at = self.retry_deadline;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Connect) => {
                        info!(url = %self.url, "connect requested");
                        let directives = self.machine.connect();
                        self.apply(directives);
                    }
                    Some(Command::Disconnect) => {
                        info!("disconnect requested");
                        let directives = self.machine.disconnect();
                        self.apply(directives);
                    }
                    Some(Command::Send(text)) => self.send_text(text),
                    None => {
                        // Every handle is gone; tear the channel down.
                        let directives = self.machine.disconnect();
                        self.apply(directives);
                        break;
                    }
                },
                Some(event) = socket_events.recv() => self.handle_socket_event(event),
                _ = tokio::time::sleep_until(retry_at.unwrap_or_else(far_future)),
                    if retry_at.is_some() =>
                {
                    self.retry_deadline = None;
                    if let Some(directive) = self.machine.retry_due() {
                        self.apply_one(directive);
                    }
                }
            }
            self.publish_state();
        }
    }

    fn apply(&mut self, directives: Vec<Directive>) {
        for directive in directives {
            self.apply_one(directive);
        }
    }

    fn apply_one(&mut self, directive: Directive) {
        match directive {
            Directive::CancelRetry => self.retry_deadline = None,
            Directive::ScheduleRetry { delay } => {
                self.retry_deadline = Some(Instant::now() + delay);
            }
            Directive::CloseSocket { code } => {
                if let Some(socket) = &self.socket {
                    let _ = socket.outbound.send(Outbound::Close { code });
                }
            }
            Directive::OpenSocket => self.open_socket(),
        }
    }

    fn open_socket(&mut self) {
        // Replacing the socket aborts its task; dropping the stream tears
        // the previous connection down before the new one is dialed.
        if let Some(old) = self.socket.take() {
            old.task.abort();
            debug!(generation = old.generation, "replaced previous socket");
        }
        self.generation += 1;
        let generation = self.generation;
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let events = self.socket_events_tx.clone();
        let url = self.url.clone();
        let task = tokio::spawn(run_socket(url, generation, outbound_rx, events));
        self.socket = Some(Socket {
            generation,
            outbound,
            task,
        });
    }

    fn handle_socket_event(&mut self, event: SocketEvent) {
        let current = self.socket.as_ref().map(|socket| socket.generation);
        if current != Some(event.generation) {
            debug!(generation = event.generation, "ignoring event from replaced socket");
            return;
        }
        match event.kind {
            SocketEventKind::Opened => {
                info!(url = %self.url, "channel open");
                self.machine.opened();
            }
            SocketEventKind::Frame(text) => {
                // Forwarded verbatim; parsing happens in the router.
                if self.machine.state().is_open() {
                    let _ = self.frames.send(text);
                }
            }
            SocketEventKind::Closed { code } => {
                self.socket = None;
                match self.machine.closed(code) {
                    Some(directive) => {
                        if let ConnectionState::Reconnecting { attempt, delay_ms } =
                            self.machine.state()
                        {
                            warn!(code, attempt, delay_ms, "channel lost; retry scheduled");
                        }
                        self.apply_one(directive);
                    }
                    None => match self.machine.state() {
                        ConnectionState::Terminated => {
                            warn!(code, "reconnect attempts exhausted; channel terminated");
                        }
                        _ => info!(code, "channel closed"),
                    },
                }
            }
        }
    }

    fn send_text(&mut self, text: String) {
        match &self.socket {
            Some(socket) if self.machine.state().is_open() => {
                let _ = socket.outbound.send(Outbound::Text(text));
            }
            _ => warn!("channel is not open; dropping outbound frame"),
        }
    }

    fn publish_state(&self) {
        let state = self.machine.state().clone();
        self.status_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}

/// One sleep slot is reserved in the actor's select loop even when no retry
/// is armed; park it far enough out that it never fires on its own.
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(24 * 60 * 60)
}

/// Socket task: dial, pump, report. Runs until the stream ends or the
/// actor drops its handle.
async fn run_socket(
    url: String,
    generation: u64,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<SocketEvent>,
) {
    let mut stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            debug!(error = %err, url = %url, "websocket connect failed");
            let _ = events.send(SocketEvent {
                generation,
                kind: SocketEventKind::Closed {
                    code: CLOSE_ABNORMAL,
                },
            });
            return;
        }
    };
    let _ = events.send(SocketEvent {
        generation,
        kind: SocketEventKind::Opened,
    });

    loop {
        tokio::select! {
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(SocketEvent {
                        generation,
                        kind: SocketEventKind::Frame(text.as_str().to_string()),
                    });
                }
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.map(|f| u16::from(f.code)).unwrap_or(CLOSE_ABNORMAL);
                    let _ = events.send(SocketEvent {
                        generation,
                        kind: SocketEventKind::Closed { code },
                    });
                    return;
                }
                Some(Ok(Message::Ping(payload))) => {
                    let _ = stream.send(Message::Pong(payload)).await;
                }
                // Binary and pong frames are not part of the protocol.
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!(error = %err, "websocket stream error");
                    let _ = events.send(SocketEvent {
                        generation,
                        kind: SocketEventKind::Closed {
                            code: CLOSE_ABNORMAL,
                        },
                    });
                    return;
                }
                None => {
                    let _ = events.send(SocketEvent {
                        generation,
                        kind: SocketEventKind::Closed {
                            code: CLOSE_ABNORMAL,
                        },
                    });
                    return;
                }
            },
            directive = outbound.recv() => match directive {
                Some(Outbound::Text(text)) => {
                    if stream.send(Message::text(text)).await.is_err() {
                        let _ = events.send(SocketEvent {
                            generation,
                            kind: SocketEventKind::Closed {
                                code: CLOSE_ABNORMAL,
                            },
                        });
                        return;
                    }
                }
                Some(Outbound::Close { code }) => {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: "client disconnect".into(),
                    };
                    let _ = stream.send(Message::Close(Some(frame))).await;
                    // Keep draining; the close handshake completes through
                    // the inbound arm.
                }
                None => return,
            },
        }
    }
}
