//! Waitlist entries: category-scoped interest in a sold-out event.

use crate::types::{EventId, TicketCategory, UserId, WaitlistEntryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's place in line for one category of one event.
///
/// The (event, user, category) tuple is unique; the join timestamp gives
/// FIFO ordering for assignment fairness. The entry is deleted when its
/// user receives an assigned ticket or independently purchases a resold
/// ticket for the event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// Unique entry id.
    pub id: WaitlistEntryId,
    /// Event of interest.
    pub event_id: EventId,
    /// Waiting user.
    pub user_id: UserId,
    /// Category of interest.
    pub category: TicketCategory,
    /// When the user joined the waitlist.
    pub joined_at: DateTime<Utc>,
}

impl WaitlistEntry {
    /// Creates a new entry joining `user_id` to the waitlist now.
    #[must_use]
    pub fn new(
        event_id: EventId,
        user_id: UserId,
        category: TicketCategory,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: WaitlistEntryId::new(),
            event_id,
            user_id,
            category,
            joined_at,
        }
    }
}
