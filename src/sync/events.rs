//! Wire-level change events pushed over the channel
//!
//! Inbound frames are JSON objects tagged by an `action` field:
//!
//! ```json
//! {"action":"create","record":{"id":5,"name":"Widget","quantity":3,"price":9.99,"createdAt":"2024-01-01T00:00:00Z"}}
//! {"action":"update","record":{...}}
//! {"action":"delete","recordId":5}
//! ```
//!
//! Anything outside this closed set fails to decode and is discarded by the
//! router.

use serde::{Deserialize, Serialize};

use crate::types::Product;

/// A validated create/update/delete notification from the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ChangeEvent {
    /// A record was created server-side; carries the full record
    Create { record: Product },
    /// A record was replaced server-side; carries the full new record
    Update { record: Product },
    /// A record was removed server-side; carries only its id
    Delete {
        #[serde(rename = "recordId")]
        record_id: i64,
    },
}

impl ChangeEvent {
    /// Id of the record this event touches
    pub fn record_id(&self) -> i64 {
        match self {
            ChangeEvent::Create { record } | ChangeEvent::Update { record } => record.id,
            ChangeEvent::Delete { record_id } => *record_id,
        }
    }
}
