//! Wiring of the sync pipeline: channel → router → store

use std::sync::Arc;

use tokio::sync::mpsc;

use super::connection::ConnectionManager;
use super::observer::ConnectionObserver;
use super::router::route_frame;
use super::store::InventoryStore;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::rest::ApiClient;

/// The assembled synchronization client
///
/// Owns the channel lifecycle, the decode step and the reconciled
/// collection. Display layers read snapshots from
/// [`SyncClient::inventory`] and status from [`SyncClient::observer`];
/// they never touch the socket or the collection directly.
pub struct SyncClient {
    manager: ConnectionManager,
    observer: ConnectionObserver,
    store: Arc<InventoryStore>,
    api: ApiClient,
}

impl SyncClient {
    /// Assemble the pipeline. Must be called from within a tokio runtime;
    /// the channel stays idle until [`SyncClient::connect`].
    pub fn new(config: SyncConfig) -> Self {
        let api = ApiClient::new(&config);
        let store = Arc::new(InventoryStore::new());

        let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<String>();
        let manager = ConnectionManager::spawn(config.ws_url, config.reconnect, frame_tx);

        // Frames fold strictly in arrival order; the task ends when the
        // manager drops the frame sender.
        let fold_store = Arc::clone(&store);
        tokio::spawn(async move {
            while let Some(frame) = frame_rx.recv().await {
                if let Some(event) = route_frame(&frame) {
                    fold_store.apply(event);
                }
            }
        });

        let observer = ConnectionObserver::spawn(manager.clone(), api.clone());
        Self {
            manager,
            observer,
            store,
            api,
        }
    }

    /// Replace the collection wholesale from the REST collaborator; done
    /// once at startup before live events start folding in. Returns the
    /// number of records loaded.
    pub async fn load_initial(&self, skip: usize, limit: usize) -> SyncResult<usize> {
        let records = self.api.list(skip, limit).await?;
        let count = records.len();
        self.store.replace_all(records);
        Ok(count)
    }

    /// Open the channel
    pub fn connect(&self) {
        self.manager.connect();
    }

    /// Close the channel; no reconnect will follow
    pub fn disconnect(&self) {
        self.manager.disconnect();
    }

    /// Send an arbitrary diagnostic text frame over the channel
    pub fn send_diagnostic(&self, text: impl Into<String>) {
        self.manager.send_text(text);
    }

    /// The reconciled collection
    pub fn inventory(&self) -> &InventoryStore {
        &self.store
    }

    /// Connection status for display
    pub fn observer(&self) -> &ConnectionObserver {
        &self.observer
    }

    /// The REST collaborator client (mutations, search, health)
    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}
