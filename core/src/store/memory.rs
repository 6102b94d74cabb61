//! In-memory repository.
//!
//! Backs unit and integration tests and the dev server when no database is
//! configured. One mutex per table keeps locking scoped to a single entity
//! kind; the conditional operations perform their check and write under
//! the same lock, which gives them the required atomicity.

use crate::error::{Result, TicketingError};
use crate::event::{Event, TicketInventory};
use crate::store::{InventoryReservation, TicketingRepository};
use crate::ticket::{Ticket, TicketStatus};
use crate::types::{EventId, TicketCategory, TicketId, UserId, WaitlistEntryId};
use crate::user::User;
use crate::waitlist::WaitlistEntry;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory implementation of [`TicketingRepository`].
#[derive(Clone, Default)]
pub struct MemoryRepository {
    events: Arc<Mutex<HashMap<EventId, Event>>>,
    users: Arc<Mutex<HashMap<UserId, User>>>,
    tickets: Arc<Mutex<HashMap<TicketId, Ticket>>>,
    waitlist: Arc<Mutex<HashMap<WaitlistEntryId, WaitlistEntry>>>,
    ticket_sequence: Arc<AtomicU64>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| TicketingError::Storage("lock poisoned".to_string()))
}

#[async_trait]
impl TicketingRepository for MemoryRepository {
    async fn insert_event(&self, event: &Event) -> Result<()> {
        lock(&self.events)?.insert(event.id, event.clone());
        Ok(())
    }

    async fn get_event(&self, event_id: EventId) -> Result<Event> {
        lock(&self.events)?
            .get(&event_id)
            .cloned()
            .ok_or_else(|| TicketingError::not_found("event", event_id))
    }

    async fn set_inventory(&self, event_id: EventId, inventory: TicketInventory) -> Result<Event> {
        let mut events = lock(&self.events)?;
        let event = events
            .get_mut(&event_id)
            .ok_or_else(|| TicketingError::not_found("event", event_id))?;
        event.inventory = inventory;
        Ok(event.clone())
    }

    async fn reserve_inventory(
        &self,
        event_id: EventId,
        category: TicketCategory,
        quantity: u32,
    ) -> Result<InventoryReservation> {
        let mut events = lock(&self.events)?;
        let event = events
            .get_mut(&event_id)
            .ok_or_else(|| TicketingError::not_found("event", event_id))?;
        let slot = event.inventory.category_mut(category);
        if slot.remaining < quantity {
            return Err(TicketingError::InsufficientInventory {
                category,
                remaining: slot.remaining,
            });
        }
        slot.remaining -= quantity;
        let first_seat = slot.issued + 1;
        slot.issued += quantity;
        Ok(InventoryReservation {
            remaining: slot.remaining,
            first_seat,
        })
    }

    async fn restore_inventory(
        &self,
        event_id: EventId,
        category: TicketCategory,
        quantity: u32,
    ) -> Result<()> {
        let mut events = lock(&self.events)?;
        let event = events
            .get_mut(&event_id)
            .ok_or_else(|| TicketingError::not_found("event", event_id))?;
        event.inventory.category_mut(category).remaining += quantity;
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        lock(&self.users)?.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: UserId) -> Result<User> {
        lock(&self.users)?
            .get(&user_id)
            .cloned()
            .ok_or_else(|| TicketingError::not_found("user", user_id))
    }

    async fn debit_wallet(&self, user_id: UserId, amount: u64) -> Result<u64> {
        let mut users = lock(&self.users)?;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| TicketingError::not_found("user", user_id))?;
        if user.wallet < amount {
            return Err(TicketingError::InsufficientFunds {
                required: amount,
                available: user.wallet,
            });
        }
        user.wallet -= amount;
        Ok(user.wallet)
    }

    async fn credit_wallet(&self, user_id: UserId, amount: u64) -> Result<u64> {
        let mut users = lock(&self.users)?;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| TicketingError::not_found("user", user_id))?;
        user.wallet = user.wallet.saturating_add(amount);
        Ok(user.wallet)
    }

    async fn attach_tickets(&self, user_id: UserId, tickets: &[TicketId]) -> Result<()> {
        let mut users = lock(&self.users)?;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| TicketingError::not_found("user", user_id))?;
        user.tickets.extend_from_slice(tickets);
        Ok(())
    }

    async fn detach_ticket(&self, user_id: UserId, ticket: TicketId) -> Result<()> {
        let mut users = lock(&self.users)?;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| TicketingError::not_found("user", user_id))?;
        user.tickets.retain(|id| *id != ticket);
        Ok(())
    }

    async fn next_ticket_numbers(&self, count: u32) -> Result<u64> {
        let end = self
            .ticket_sequence
            .fetch_add(u64::from(count), Ordering::SeqCst);
        Ok(end + 1)
    }

    async fn insert_tickets(&self, tickets: &[Ticket]) -> Result<()> {
        let mut table = lock(&self.tickets)?;
        for ticket in tickets {
            table.insert(ticket.id, ticket.clone());
        }
        Ok(())
    }

    async fn get_ticket(&self, ticket_id: TicketId) -> Result<Ticket> {
        lock(&self.tickets)?
            .get(&ticket_id)
            .cloned()
            .ok_or_else(|| TicketingError::not_found("ticket", ticket_id))
    }

    async fn list_tickets_for_user(&self, user_id: UserId) -> Result<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = lock(&self.tickets)?
            .values()
            .filter(|ticket| ticket.owner_id == user_id)
            .cloned()
            .collect();
        tickets.sort_by_key(|ticket| ticket.number);
        Ok(tickets)
    }

    async fn list_resale_tickets(&self) -> Result<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = lock(&self.tickets)?
            .values()
            .filter(|ticket| ticket.status == TicketStatus::ListedForResale)
            .cloned()
            .collect();
        tickets.sort_by_key(|ticket| ticket.number);
        Ok(tickets)
    }

    async fn update_ticket_guarded(&self, ticket: &Ticket, expected: TicketStatus) -> Result<()> {
        let mut table = lock(&self.tickets)?;
        let stored = table
            .get_mut(&ticket.id)
            .ok_or_else(|| TicketingError::not_found("ticket", ticket.id))?;
        if stored.status != expected {
            return Err(TicketingError::ConcurrencyConflict);
        }
        *stored = ticket.clone();
        Ok(())
    }

    async fn delete_ticket(&self, ticket_id: TicketId) -> Result<()> {
        lock(&self.tickets)?
            .remove(&ticket_id)
            .map(|_| ())
            .ok_or_else(|| TicketingError::not_found("ticket", ticket_id))
    }

    async fn insert_waitlist_entry(&self, entry: &WaitlistEntry) -> Result<()> {
        let mut waitlist = lock(&self.waitlist)?;
        let duplicate = waitlist.values().any(|existing| {
            existing.event_id == entry.event_id
                && existing.user_id == entry.user_id
                && existing.category == entry.category
        });
        if duplicate {
            return Err(TicketingError::DuplicateWaitlistEntry);
        }
        waitlist.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn get_waitlist_entry(&self, entry_id: WaitlistEntryId) -> Result<WaitlistEntry> {
        lock(&self.waitlist)?
            .get(&entry_id)
            .cloned()
            .ok_or_else(|| TicketingError::not_found("waitlist entry", entry_id))
    }

    async fn list_waitlist_for_event(&self, event_id: EventId) -> Result<Vec<WaitlistEntry>> {
        let mut entries: Vec<WaitlistEntry> = lock(&self.waitlist)?
            .values()
            .filter(|entry| entry.event_id == event_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.joined_at);
        Ok(entries)
    }

    async fn list_waitlist_for_user(&self, user_id: UserId) -> Result<Vec<WaitlistEntry>> {
        let mut entries: Vec<WaitlistEntry> = lock(&self.waitlist)?
            .values()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.joined_at);
        Ok(entries)
    }

    async fn delete_waitlist_entry(&self, entry_id: WaitlistEntryId) -> Result<()> {
        lock(&self.waitlist)?
            .remove(&entry_id)
            .map(|_| ())
            .ok_or_else(|| TicketingError::not_found("waitlist entry", entry_id))
    }

    async fn delete_waitlist_entries_for(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<u64> {
        let mut waitlist = lock(&self.waitlist)?;
        let before = waitlist.len();
        waitlist.retain(|_, entry| !(entry.user_id == user_id && entry.event_id == event_id));
        Ok((before - waitlist.len()) as u64)
    }
}
