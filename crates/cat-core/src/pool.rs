//! The item-pool view: a pure read over the calibrated item catalogue.
//!
//! Storage access is kept behind a capability trait so the engine is
//! testable with an in-memory pool and deployable against a persistent one
//! without the engine knowing which it's talking to.

use crate::item::Item;
use cat_common::{ItemId, UserId};
use std::collections::{HashMap, HashSet};

/// Polymorphic interface over item-pool storage.
pub trait ItemProvider {
    /// Items eligible for CAT selection for a given user: active,
    /// `quality == Normal`, well-formed IRT parameters, and not previously
    /// seen by this user in any prior session.
    fn list_eligible_for_user(&self, user_id: &UserId) -> Vec<Item>;

    /// Look up a single item by id, for calibration-parameter resolution
    /// during response processing and replay.
    fn get_by_id(&self, item_id: &ItemId) -> Option<Item>;

    /// Record that an item has been administered to a user, so it is
    /// excluded from that user's eligible pool in any future session.
    /// Called by the engine once a response to the item is recorded, not
    /// when it is merely selected as a candidate. A collaborator backed by
    /// real persistence derives this from its own response log instead and
    /// may leave this a no-op; the default does nothing.
    fn mark_seen(&mut self, _user_id: &UserId, _item_id: &ItemId) {}
}

/// A simple in-memory item pool, used by tests and the simulation harness.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemPool {
    items: HashMap<ItemId, Item>,
    seen_by_user: HashMap<UserId, HashSet<ItemId>>,
}

impl InMemoryItemPool {
    pub fn new(items: Vec<Item>) -> Self {
        let items = items.into_iter().map(|i| (i.id.clone(), i)).collect();
        InMemoryItemPool {
            items,
            seen_by_user: HashMap::new(),
        }
    }
}

impl ItemProvider for InMemoryItemPool {
    fn list_eligible_for_user(&self, user_id: &UserId) -> Vec<Item> {
        let seen = self.seen_by_user.get(user_id);
        self.items
            .values()
            .filter(|item| item.is_eligible_params())
            .filter(|item| seen.map(|s| !s.contains(&item.id)).unwrap_or(true))
            .cloned()
            .collect()
    }

    fn get_by_id(&self, item_id: &ItemId) -> Option<Item> {
        self.items.get(item_id).cloned()
    }

    /// Mark an item as previously seen by a user, excluding it from future
    /// `list_eligible_for_user` calls for that user.
    fn mark_seen(&mut self, user_id: &UserId, item_id: &ItemId) {
        self.seen_by_user
            .entry(user_id.clone())
            .or_default()
            .insert(item_id.clone());
    }
}
