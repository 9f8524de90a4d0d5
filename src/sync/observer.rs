//! Connection status surface for display layers

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use super::connection::ConnectionManager;
use super::machine::ConnectionState;
use crate::rest::ApiClient;

/// What a display layer needs to render the channel: the local lifecycle
/// state plus the server's live channel count
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub active_channels: u64,
}

/// Watches the manager's state and keeps the server-side channel count
/// fresh
///
/// The count comes from the collaborator's `GET /ws/connections` endpoint,
/// not from the channel itself, and is refreshed on every transition to
/// `Open`. A failed refresh keeps the last known count.
pub struct ConnectionObserver {
    manager: ConnectionManager,
    status: watch::Receiver<ConnectionStatus>,
    task: JoinHandle<()>,
}

impl ConnectionObserver {
    pub fn spawn(manager: ConnectionManager, api: ApiClient) -> Self {
        let mut states = manager.subscribe();
        let initial = ConnectionStatus {
            state: states.borrow().clone(),
            active_channels: 0,
        };
        let (status_tx, status) = watch::channel(initial);
        let task = tokio::spawn(async move {
            let mut active_channels = 0u64;
            loop {
                let state = states.borrow_and_update().clone();
                if state.is_open() {
                    match api.active_connections().await {
                        Ok(count) => active_channels = count,
                        Err(err) => {
                            warn!(error = %err, "could not refresh active channel count");
                        }
                    }
                }
                let published = status_tx.send(ConnectionStatus {
                    state,
                    active_channels,
                });
                if published.is_err() {
                    break;
                }
                if states.changed().await.is_err() {
                    break;
                }
            }
        });
        Self {
            manager,
            status,
            task,
        }
    }

    /// Current status snapshot
    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status transitions
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Re-exported manager control: open (or reopen) the channel
    pub fn reconnect(&self) {
        self.manager.connect();
    }

    /// Re-exported manager control: close the channel for good
    pub fn disconnect(&self) {
        self.manager.disconnect();
    }
}

impl Drop for ConnectionObserver {
    fn drop(&mut self) {
        self.task.abort();
    }
}
