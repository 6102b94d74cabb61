//! Event endpoints.
//!
//! - `GET /api/events/:id/availability` - remaining counts and prices (public)
//! - `PUT /api/events/:id/inventory` - set counts and prices (admin)

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use eventease_core::event::TicketInventory;
use eventease_core::types::{EventId, TicketCategory};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-category availability as shown to buyers.
#[derive(Debug, Serialize)]
pub struct CategoryAvailability {
    /// Tickets still available for primary purchase.
    pub remaining: u32,
    /// Primary sale price in minor currency units.
    pub price: u64,
}

/// Availability for all three tiers of an event.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Event id.
    pub event_id: Uuid,
    /// VVIP tier.
    #[serde(rename = "VVIP")]
    pub vvip: CategoryAvailability,
    /// VIP tier.
    #[serde(rename = "VIP")]
    pub vip: CategoryAvailability,
    /// Standard tier.
    #[serde(rename = "Standard")]
    pub standard: CategoryAvailability,
}

/// Per-category counts and prices for an inventory update.
#[derive(Debug, Deserialize)]
pub struct InventoryUpdate {
    /// New remaining count.
    pub remaining: u32,
    /// New primary price.
    pub price: u64,
}

/// Request to replace an event's inventory counts and prices.
///
/// Issued-seat counters are preserved so seat labels stay unique even
/// after an admin tops inventory back up.
#[derive(Debug, Deserialize)]
pub struct SetInventoryRequest {
    /// VVIP tier.
    #[serde(rename = "VVIP")]
    pub vvip: InventoryUpdate,
    /// VIP tier.
    #[serde(rename = "VIP")]
    pub vip: InventoryUpdate,
    /// Standard tier.
    #[serde(rename = "Standard")]
    pub standard: InventoryUpdate,
}

impl SetInventoryRequest {
    fn slot(&self, category: TicketCategory) -> &InventoryUpdate {
        match category {
            TicketCategory::Vvip => &self.vvip,
            TicketCategory::Vip => &self.vip,
            TicketCategory::Standard => &self.standard,
        }
    }
}

fn availability(event_id: Uuid, inventory: &TicketInventory) -> AvailabilityResponse {
    let slot = |category| {
        let slot = inventory.category(category);
        CategoryAvailability {
            remaining: slot.remaining,
            price: slot.price,
        }
    };
    AvailabilityResponse {
        event_id,
        vvip: slot(TicketCategory::Vvip),
        vip: slot(TicketCategory::Vip),
        standard: slot(TicketCategory::Standard),
    }
}

/// GET /api/events/:id/availability
pub async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let event = state.repository.get_event(EventId::from_uuid(id)).await?;
    Ok(Json(availability(id, &event.inventory)))
}

/// PUT /api/events/:id/inventory
pub async fn set_inventory(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(request): Json<SetInventoryRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let event_id = EventId::from_uuid(id);
    let event = state.repository.get_event(event_id).await?;

    let mut inventory = event.inventory;
    for category in TicketCategory::ALL {
        let update = request.slot(category);
        let slot = inventory.category_mut(category);
        slot.remaining = update.remaining;
        slot.price = update.price;
    }

    let updated = state.repository.set_inventory(event_id, inventory).await?;
    Ok(Json(availability(id, &updated.inventory)))
}
