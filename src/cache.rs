//! Per-shop cache for the three order query kinds. One slot per kind, one
//! tracked shop at a time; switching shops clears everything. Responses are
//! fenced by a per-kind generation counter so an overlapping refresh cannot
//! clobber a newer one.

use serde::{Deserialize, Serialize};

use crate::orders::OrderLineItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    ActiveOrders,
    ActiveReturns,
    OrderHistory,
}

impl CacheKind {
    pub const ALL: [Self; 3] = [Self::ActiveOrders, Self::ActiveReturns, Self::OrderHistory];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActiveOrders => "active_orders",
            Self::ActiveReturns => "active_returns",
            Self::OrderHistory => "order_history",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Empty,
    Loading,
    Loaded,
}

/// Cache slot for one query kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSlot {
    pub items: Vec<OrderLineItem>,
    pub loaded: bool,
    pub state: LoadState,
    /// Generation of the most recently issued request. Responses carrying an
    /// older generation are dropped on arrival.
    pub generation: u64,
}

impl CacheSlot {
    /// Cache hit requires a completed load with at least one item. A fetch
    /// that succeeded with zero items is deliberately not a hit; see the
    /// cache notes in DESIGN.md.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.loaded && !self.items.is_empty()
    }

    /// Marks the slot loading and returns the generation the new request
    /// must carry.
    pub fn begin_load(&mut self) -> u64 {
        self.state = LoadState::Loading;
        self.generation += 1;
        self.generation
    }

    /// Applies a successful response if it is still current. Returns whether
    /// it was applied.
    pub fn complete(&mut self, generation: u64, items: Vec<OrderLineItem>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.items = items;
        self.loaded = true;
        self.state = LoadState::Loaded;
        true
    }

    /// Rolls a failed load back to empty, clearing prior items. Stale
    /// failures are ignored. Returns whether the failure was applied.
    pub fn fail(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.clear();
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.loaded = false;
        self.state = LoadState::Empty;
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }
}

/// All three slots plus the shop id they were filled for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderContext {
    pub active_orders: CacheSlot,
    pub active_returns: CacheSlot,
    pub order_history: CacheSlot,
    tracked_shop_id: Option<String>,
}

impl OrderContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn slot(&self, kind: CacheKind) -> &CacheSlot {
        match kind {
            CacheKind::ActiveOrders => &self.active_orders,
            CacheKind::ActiveReturns => &self.active_returns,
            CacheKind::OrderHistory => &self.order_history,
        }
    }

    pub fn slot_mut(&mut self, kind: CacheKind) -> &mut CacheSlot {
        match kind {
            CacheKind::ActiveOrders => &mut self.active_orders,
            CacheKind::ActiveReturns => &mut self.active_returns,
            CacheKind::OrderHistory => &mut self.order_history,
        }
    }

    #[must_use]
    pub fn tracked_shop_id(&self) -> Option<&str> {
        self.tracked_shop_id.as_deref()
    }

    /// Invalidation gate. Clears all three slots only when the shop actually
    /// changed from a previously tracked one; the first tracked shop starts
    /// with whatever is already cached (nothing). Returns whether a clear
    /// happened.
    pub fn check_and_clear(&mut self, new_shop_id: &str) -> bool {
        let changed = match self.tracked_shop_id.as_deref() {
            Some(tracked) => tracked != new_shop_id,
            None => false,
        };

        if changed {
            for kind in CacheKind::ALL {
                self.slot_mut(kind).clear();
            }
        }
        self.tracked_shop_id = Some(new_shop_id.to_string());
        changed
    }

    /// Full reset, used on logout.
    pub fn reset(&mut self) {
        for kind in CacheKind::ALL {
            self.slot_mut(kind).clear();
        }
        self.tracked_shop_id = None;
    }
}
