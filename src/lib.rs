//! Real-time Inventory Synchronization Client
//!
//! Keeps a locally held, ordered collection of product records consistent
//! with a server by folding in change events pushed over a single
//! persistent WebSocket channel; no full reloads after the initial fetch.
//!
//! # Features
//!
//! - **One logical channel**: exactly one socket live at a time, replaced
//!   atomically on reconnect
//! - **Bounded backoff**: abnormal closes retry at 2s, 4s, 8s, 16s, 30s,
//!   then give up; close code 1000 never retries
//! - **Decode-or-discard routing**: frames that aren't valid change events
//!   are dropped silently, never fatal
//! - **Idempotent reconciliation**: duplicate delivery after a reconnect
//!   cannot corrupt the collection
//! - **Snapshot reads**: consumers subscribe to immutable collection and
//!   status snapshots via watch channels
//!
//! # Modules
//!
//! - `types`: Product record and REST payloads
//! - `sync`: connection manager, frame router, reconciler, observer
//! - `rest`: collaborator REST client (bulk load, mutations, channel count)
//! - `config`: environment-driven configuration
//! - `error`: crate-wide error type
//!
//! # Example
//!
//! ```no_run
//! use inventory_sync::{SyncClient, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = SyncClient::new(SyncConfig::from_env());
//!     if let Err(err) = client.load_initial(0, 100).await {
//!         eprintln!("bulk load failed: {err}");
//!     }
//!     client.connect();
//!
//!     let mut inventory = client.inventory().subscribe();
//!     while inventory.changed().await.is_ok() {
//!         println!("{} records", inventory.borrow_and_update().len());
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod rest;
pub mod sync;
pub mod types;

// Re-export commonly used items at crate root
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use rest::{ApiClient, ChannelStats, HealthStatus};
pub use sync::{
    apply_change, route_frame, ChangeEvent, ConnectionManager, ConnectionObserver,
    ConnectionState, ConnectionStatus, InventoryStore, ReconnectPolicy, SyncClient,
};
pub use types::{NewProduct, Product, ProductPatch};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
