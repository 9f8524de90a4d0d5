//! Inbound frame routing: decode or discard
//!
//! The channel may carry non-JSON diagnostic traffic alongside change
//! notifications, so a frame that fails to decode is not a protocol error.
//! It is logged at debug level and dropped; nothing downstream ever sees
//! it.

use tracing::debug;

use super::events::ChangeEvent;

/// Decode one raw text frame into at most one [`ChangeEvent`]
///
/// Never blocks, never panics: malformed JSON, unknown actions and missing
/// payload fields all resolve to `None`.
pub fn route_frame(frame: &str) -> Option<ChangeEvent> {
    match serde_json::from_str::<ChangeEvent>(frame) {
        Ok(event) => Some(event),
        Err(err) => {
            debug!(error = %err, frame_len = frame.len(), "discarding unroutable frame");
            None
        }
    }
}
