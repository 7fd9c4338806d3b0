//! Per-shop log of cancelled orders and items. The remote API offers no way
//! to read back a cancellation, so the client remembers its own and overlays
//! a "CAN" status until the order drops off the active list.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::orders::GROUP_CANCEL_UID;

/// Most recent records kept per shop; the oldest is evicted first.
pub const MAX_CANCELLED_RECORDS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelledItemRecord {
    pub location_number: String,
    pub shipper_number: String,
    /// `GROUP_CANCEL_UID` (−1) marks a whole-order cancellation that covers
    /// every item in the (location, shipper) group.
    pub item_uid_number: i64,
    pub part_description: String,
    pub cancelled_at_ms: u64,
}

impl CancelledItemRecord {
    #[must_use]
    pub const fn is_group_cancel(&self) -> bool {
        self.item_uid_number == GROUP_CANCEL_UID
    }
}

/// Log keyed by shop id. Survives logout on purpose: the scope is the shop,
/// not the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancellationLog {
    records: HashMap<String, Vec<CancelledItemRecord>>,
}

impl CancellationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record for the shop, evicting from the front once the cap
    /// is exceeded.
    pub fn add(&mut self, shop_id: &str, record: CancelledItemRecord) {
        let entries = self.records.entry(shop_id.to_string()).or_default();
        entries.push(record);
        while entries.len() > MAX_CANCELLED_RECORDS {
            entries.remove(0);
        }
    }

    /// True when the item itself was cancelled or its whole group was.
    /// Linear scan; the per-shop cap keeps it trivial.
    #[must_use]
    pub fn is_item_cancelled(
        &self,
        shop_id: &str,
        location_number: &str,
        shipper_number: &str,
        item_uid_number: i64,
    ) -> bool {
        self.records.get(shop_id).is_some_and(|entries| {
            entries.iter().any(|r| {
                r.location_number == location_number
                    && r.shipper_number == shipper_number
                    && (r.item_uid_number == item_uid_number || r.is_group_cancel())
            })
        })
    }

    pub fn clear_shop(&mut self, shop_id: &str) {
        self.records.remove(shop_id);
    }

    #[must_use]
    pub fn records_for(&self, shop_id: &str) -> &[CancelledItemRecord] {
        self.records.get(shop_id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(loc: &str, shipper: &str, uid: i64) -> CancelledItemRecord {
        CancelledItemRecord {
            location_number: loc.into(),
            shipper_number: shipper.into(),
            item_uid_number: uid,
            part_description: "FW02995 GREEN TINT".into(),
            cancelled_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn item_cancel_only_covers_that_item() {
        let mut log = CancellationLog::new();
        log.add("shop-1", record("100", "A", 42));

        assert!(log.is_item_cancelled("shop-1", "100", "A", 42));
        assert!(!log.is_item_cancelled("shop-1", "100", "A", 43));
        assert!(!log.is_item_cancelled("shop-2", "100", "A", 42));
    }

    #[test]
    fn group_cancel_covers_every_item_in_the_group() {
        let mut log = CancellationLog::new();
        log.add("shop-1", record("100", "A", GROUP_CANCEL_UID));

        assert!(log.is_item_cancelled("shop-1", "100", "A", 7));
        assert!(log.is_item_cancelled("shop-1", "100", "A", 9999));
        assert!(!log.is_item_cancelled("shop-1", "100", "B", 7));
        assert!(!log.is_item_cancelled("shop-1", "200", "A", 7));
    }

    #[test]
    fn cap_evicts_oldest_first() {
        let mut log = CancellationLog::new();
        for uid in 0..21 {
            log.add("shop-1", record("100", "A", uid));
        }

        let entries = log.records_for("shop-1");
        assert_eq!(entries.len(), MAX_CANCELLED_RECORDS);
        assert_eq!(entries[0].item_uid_number, 1);
        assert_eq!(entries.last().unwrap().item_uid_number, 20);
        assert!(!log.is_item_cancelled("shop-1", "100", "A", 0));
    }

    #[test]
    fn cap_is_per_shop() {
        let mut log = CancellationLog::new();
        for uid in 0..25 {
            log.add("shop-1", record("100", "A", uid));
            log.add("shop-2", record("100", "A", uid));
        }
        assert_eq!(log.records_for("shop-1").len(), MAX_CANCELLED_RECORDS);
        assert_eq!(log.records_for("shop-2").len(), MAX_CANCELLED_RECORDS);
    }

    #[test]
    fn clear_shop_removes_only_that_shop() {
        let mut log = CancellationLog::new();
        log.add("shop-1", record("100", "A", 1));
        log.add("shop-2", record("100", "A", 1));

        log.clear_shop("shop-1");

        assert!(log.records_for("shop-1").is_empty());
        assert!(log.is_item_cancelled("shop-2", "100", "A", 1));
    }

    #[test]
    fn log_round_trips_through_json() {
        let mut log = CancellationLog::new();
        log.add("shop-1", record("100", "A", GROUP_CANCEL_UID));

        let json = serde_json::to_string(&log).unwrap();
        let restored: CancellationLog = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, log);
    }
}
