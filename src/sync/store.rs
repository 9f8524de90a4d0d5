//! Snapshot store for the reconciled collection
//!
//! Owns the live record list behind a `watch` channel: folds happen under
//! `send_modify`, so they apply strictly in arrival order and observers
//! only ever see complete snapshots, never a half-applied mutation.

use tokio::sync::watch;

use super::events::ChangeEvent;
use super::reconciler::apply_change;
use crate::types::Product;

/// Owner of the synchronized collection
///
/// Created empty; replaced wholesale once by the initial bulk load; then
/// mutated only incrementally through [`InventoryStore::apply`].
pub struct InventoryStore {
    records: watch::Sender<Vec<Product>>,
}

impl InventoryStore {
    pub fn new() -> Self {
        let (records, _) = watch::channel(Vec::new());
        Self { records }
    }

    /// One-time wholesale replacement from the initial bulk load
    pub fn replace_all(&self, records: Vec<Product>) {
        self.records.send_replace(records);
    }

    /// Fold one validated event into the collection
    pub fn apply(&self, event: ChangeEvent) {
        self.records.send_modify(|records| apply_change(records, event));
    }

    /// Current snapshot; the live collection itself never escapes
    pub fn snapshot(&self) -> Vec<Product> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Subscribe to collection changes
    pub fn subscribe(&self) -> watch::Receiver<Vec<Product>> {
        self.records.subscribe()
    }
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn product(id: i64) -> Product {
        Product {
            id,
            name: format!("P{id}"),
            quantity: 1,
            price: 1.0,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_replace_then_apply() {
        let store = InventoryStore::new();
        assert!(store.is_empty());

        store.replace_all(vec![product(1), product(2)]);
        assert_eq!(store.len(), 2);

        store.apply(ChangeEvent::Delete { record_id: 1 });
        let ids: Vec<i64> = store.snapshot().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[tokio::test]
    async fn test_subscribers_see_snapshots() {
        let store = InventoryStore::new();
        let mut rx = store.subscribe();

        store.apply(ChangeEvent::Create { record: product(7) });
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, 7);
    }
}
