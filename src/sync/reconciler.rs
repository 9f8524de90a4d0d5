//! Folding change events into the ordered record collection
//!
//! The collection is kept newest-first, so a create prepends while an
//! update replaces the record wherever it already sits. The fold must stay
//! idempotent: the channel only
//! guarantees at-least-once delivery, so a redelivered event after a
//! reconnect has to leave the collection unchanged.

use super::events::ChangeEvent;
use crate::types::Product;

/// Apply one event to the collection, in place
///
/// A create whose id already exists overwrites that record where it sits
/// instead of inserting a duplicate; updates and deletes for absent ids are
/// no-ops. Events must be applied in arrival order.
pub fn apply_change(records: &mut Vec<Product>, event: ChangeEvent) {
    match event {
        ChangeEvent::Create { record } => {
            match records.iter_mut().find(|existing| existing.id == record.id) {
                Some(existing) => *existing = record,
                None => records.insert(0, record),
            }
        }
        ChangeEvent::Update { record } => {
            if let Some(existing) = records.iter_mut().find(|existing| existing.id == record.id) {
                *existing = record;
            }
        }
        ChangeEvent::Delete { record_id } => {
            records.retain(|existing| existing.id != record_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn product(id: i64, name: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            quantity: 3,
            price: 9.99,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn create(id: i64, name: &str) -> ChangeEvent {
        ChangeEvent::Create {
            record: product(id, name),
        }
    }

    #[test]
    fn test_create_into_empty_collection() {
        let mut records = Vec::new();
        apply_change(&mut records, create(5, "Widget"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 5);
    }

    #[test]
    fn test_create_prepends_newest_first() {
        let mut records = vec![product(1, "Old")];
        apply_change(&mut records, create(2, "New"));
        let ids: Vec<i64> = records.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_duplicate_create_replaces_in_place() {
        let mut records = vec![product(2, "Top"), product(1, "Widget")];
        apply_change(&mut records, create(1, "Widget v2"));
        // Same length, same position, new content.
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, 1);
        assert_eq!(records[1].name, "Widget v2");
    }

    #[test]
    fn test_redelivered_create_is_idempotent() {
        let mut records = Vec::new();
        apply_change(&mut records, create(1, "Widget"));
        apply_change(&mut records, create(1, "Widget"));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_update_replaces_preserving_position() {
        let mut records = vec![product(3, "C"), product(5, "Widget"), product(9, "A")];
        apply_change(
            &mut records,
            ChangeEvent::Update {
                record: product(5, "Widget2"),
            },
        );
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].id, 5);
        assert_eq!(records[1].name, "Widget2");
    }

    #[test]
    fn test_update_for_absent_id_is_noop() {
        let mut records = vec![product(1, "Only")];
        apply_change(
            &mut records,
            ChangeEvent::Update {
                record: product(4, "Ghost"),
            },
        );
        assert_eq!(records, vec![product(1, "Only")]);
    }

    #[test]
    fn test_delete_removes_matching_record() {
        let mut records = vec![product(2, "B"), product(1, "A")];
        apply_change(&mut records, ChangeEvent::Delete { record_id: 2 });
        let ids: Vec<i64> = records.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_delete_for_absent_id_is_noop() {
        let mut records = vec![product(1, "Only")];
        apply_change(&mut records, ChangeEvent::Delete { record_id: 2 });
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_burst_converges_in_arrival_order() {
        let mut records = Vec::new();
        apply_change(&mut records, create(1, "Widget"));
        apply_change(
            &mut records,
            ChangeEvent::Update {
                record: product(1, "Widget v2"),
            },
        );
        apply_change(&mut records, ChangeEvent::Delete { record_id: 1 });
        assert!(records.is_empty());
    }
}
