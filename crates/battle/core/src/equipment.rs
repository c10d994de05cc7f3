//! Equipment seam.
//!
//! The engine knows only that an item contributes bus handlers while it is
//! worn. Item behavior lives with the catalog that defines it.
use std::fmt;
use std::sync::Arc;

use crate::bus::{EventBus, EventHandler, SubscriptionId, Topic};
use crate::state::{CharacterId, EquipmentId};

/// An item that intercepts battle events on behalf of its owner.
pub trait Equipment: Send + Sync {
    fn id(&self) -> &EquipmentId;

    fn name(&self) -> &str;

    /// Handlers to subscribe while `owner` wears this item.
    fn handlers(&self, owner: &CharacterId) -> Vec<(Topic, Arc<dyn EventHandler>)>;

    fn on_equip(&self, owner: &CharacterId, bus: &EventBus) -> Vec<(Topic, SubscriptionId)> {
        self.handlers(owner)
            .into_iter()
            .map(|(topic, handler)| {
                let id = bus.on(topic.clone(), handler);
                (topic, id)
            })
            .collect()
    }

    fn on_unequip(&self, bus: &EventBus, subscriptions: &[(Topic, SubscriptionId)]) {
        for (topic, id) in subscriptions {
            bus.off(topic, *id);
        }
    }
}

/// An item on a character plus the subscriptions it made.
#[derive(Clone)]
pub struct EquippedItem {
    pub item: Arc<dyn Equipment>,
    pub subscriptions: Vec<(Topic, SubscriptionId)>,
}

impl EquippedItem {
    pub(crate) fn detached(item: Arc<dyn Equipment>) -> Self {
        Self {
            item,
            subscriptions: Vec::new(),
        }
    }

    pub(crate) fn attached(item: Arc<dyn Equipment>, subscriptions: Vec<(Topic, SubscriptionId)>) -> Self {
        Self { item, subscriptions }
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }
}

impl PartialEq for EquippedItem {
    fn eq(&self, other: &Self) -> bool {
        self.item.id() == other.item.id() && self.subscriptions == other.subscriptions
    }
}

impl fmt::Debug for EquippedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EquippedItem")
            .field("item", self.item.id())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
