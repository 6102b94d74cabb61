//! Event entity and per-category ticket inventory.

use crate::types::{EventId, TicketCategory};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Remaining count, issued-seat counter and price for a single category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInventory {
    /// Tickets still available for primary purchase. Never goes negative:
    /// decremented only through the repository's conditional decrement.
    pub remaining: u32,
    /// Seats handed out so far; drives the deterministic seat labels.
    /// Monotonic, even across failed purchases.
    pub issued: u32,
    /// Primary sale price in minor currency units.
    pub price: u64,
}

/// Per-event inventory, keyed by category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketInventory {
    /// VVIP tier.
    #[serde(rename = "VVIP")]
    pub vvip: CategoryInventory,
    /// VIP tier.
    #[serde(rename = "VIP")]
    pub vip: CategoryInventory,
    /// Standard tier.
    #[serde(rename = "Standard")]
    pub standard: CategoryInventory,
}

impl TicketInventory {
    /// Inventory slot for `category`.
    #[must_use]
    pub const fn category(&self, category: TicketCategory) -> &CategoryInventory {
        match category {
            TicketCategory::Vvip => &self.vvip,
            TicketCategory::Vip => &self.vip,
            TicketCategory::Standard => &self.standard,
        }
    }

    /// Mutable inventory slot for `category`.
    pub fn category_mut(&mut self, category: TicketCategory) -> &mut CategoryInventory {
        match category {
            TicketCategory::Vvip => &mut self.vvip,
            TicketCategory::Vip => &mut self.vip,
            TicketCategory::Standard => &mut self.standard,
        }
    }

    /// Remaining count for `category`.
    #[must_use]
    pub const fn remaining(&self, category: TicketCategory) -> u32 {
        self.category(category).remaining
    }

    /// Primary price for `category`.
    #[must_use]
    pub const fn price(&self, category: TicketCategory) -> u64 {
        self.category(category).price
    }
}

/// An event with tiered ticket inventory.
///
/// Event CRUD belongs to the catalog service; this core reads the whole
/// record but only ever mutates the `inventory` sub-field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event id.
    pub id: EventId,
    /// Unique event name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Calendar date of the event.
    pub date: NaiveDate,
    /// Start time, `HH:MM` 24-hour format as the catalog stores it.
    pub time: String,
    /// Venue.
    pub location: String,
    /// Promotional image reference.
    pub image_url: Option<String>,
    /// Per-category counts, seat counters and prices.
    pub inventory: TicketInventory,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}
