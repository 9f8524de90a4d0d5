//! The synchronization core
//!
//! One persistent duplex channel, one ordered collection, and the plumbing
//! between them:
//!
//! - [`ConnectionManager`] owns the channel lifecycle and the reconnect
//!   state machine (bounded exponential backoff, default 5 attempts).
//! - [`route_frame`] decodes raw inbound frames into [`ChangeEvent`]s,
//!   silently discarding anything malformed.
//! - [`InventoryStore`] folds events into the collection and hands out
//!   immutable snapshots.
//! - [`ConnectionObserver`] exposes `{state, active_channels}` for display.
//!
//! Frames are processed in delivery order; the fold rules are idempotent so
//! duplicate delivery after a reconnect cannot corrupt the collection.

pub mod backoff;
pub mod connection;
pub mod events;
pub mod machine;
pub mod observer;
pub mod reconciler;
pub mod router;
pub mod store;

mod client;

pub use backoff::ReconnectPolicy;
pub use client::SyncClient;
pub use connection::ConnectionManager;
pub use events::ChangeEvent;
pub use machine::ConnectionState;
pub use observer::{ConnectionObserver, ConnectionStatus};
pub use reconciler::apply_change;
pub use router::route_frame;
pub use store::InventoryStore;
