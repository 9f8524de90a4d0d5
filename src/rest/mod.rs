//! REST collaborator client
//!
//! The sync core itself only needs the bulk initial load and the
//! active-channel count; the mutation calls exist for hosting UIs. The
//! server answers a mutation with a broadcast [`ChangeEvent`], so the
//! client never patches its own collection after a POST/PUT/DELETE.
//!
//! [`ChangeEvent`]: crate::sync::ChangeEvent

mod client;

pub use client::{ApiClient, ChannelStats, HealthStatus};
