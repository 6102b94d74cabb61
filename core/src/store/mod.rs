//! Repository abstraction over the durable store.
//!
//! The trait exposes plain reads/writes plus the three atomic conditional
//! primitives the concurrency model requires: per-(event, category)
//! inventory decrement, per-user wallet debit, and per-ticket guarded
//! status update. Engines never mutate contended state any other way.

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::MemoryRepository;
#[cfg(feature = "postgres")]
pub use postgres::PostgresRepository;

use crate::error::Result;
use crate::event::{Event, TicketInventory};
use crate::ticket::{Ticket, TicketStatus};
use crate::types::{EventId, TicketCategory, TicketId, UserId, WaitlistEntryId};
use crate::user::User;
use crate::waitlist::WaitlistEntry;
use async_trait::async_trait;

/// Outcome of a successful atomic inventory reservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InventoryReservation {
    /// Remaining count for the category after the decrement.
    pub remaining: u32,
    /// First seat sequence number in the reserved contiguous block.
    pub first_seat: u32,
}

/// Durable store for events, users, tickets and waitlist entries.
///
/// Implementations must make the conditional operations atomic per entity
/// instance; no cross-entity locking is required (purchase atomicity is
/// restored by compensating actions in the engines).
#[async_trait]
pub trait TicketingRepository: Send + Sync {
    // ═══════════════════════════════════════════════════════════
    // Events & inventory
    // ═══════════════════════════════════════════════════════════

    /// Stores a new event record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    async fn insert_event(&self, event: &Event) -> Result<()>;

    /// Fetches an event by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event does not exist.
    async fn get_event(&self, event_id: EventId) -> Result<Event>;

    /// Replaces an event's inventory wholesale (admin edit).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event does not exist.
    async fn set_inventory(&self, event_id: EventId, inventory: TicketInventory) -> Result<Event>;

    /// Atomically decrements `remaining` and bumps the issued-seat counter
    /// for `(event_id, category)` by `quantity`.
    ///
    /// This is the conditional decrement that keeps inventory from going
    /// negative under concurrent purchases: the check and the decrement
    /// happen as one operation against the store.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event does not exist, or
    /// `InsufficientInventory` (with the exact remaining count) if fewer
    /// than `quantity` tickets remain.
    async fn reserve_inventory(
        &self,
        event_id: EventId,
        category: TicketCategory,
        quantity: u32,
    ) -> Result<InventoryReservation>;

    /// Returns previously reserved inventory (compensating action for a
    /// purchase that failed after the decrement). The issued-seat counter
    /// is not rewound; seat labels may skip on failed purchases.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event does not exist.
    async fn restore_inventory(
        &self,
        event_id: EventId,
        category: TicketCategory,
        quantity: u32,
    ) -> Result<()>;

    // ═══════════════════════════════════════════════════════════
    // Users & wallets
    // ═══════════════════════════════════════════════════════════

    /// Stores a new user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Fetches a user by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    async fn get_user(&self, user_id: UserId) -> Result<User>;

    /// Atomically debits `amount` from the user's wallet, returning the new
    /// balance. The balance check and the debit are one operation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist, or
    /// `InsufficientFunds` if the balance is below `amount`.
    async fn debit_wallet(&self, user_id: UserId, amount: u64) -> Result<u64>;

    /// Credits `amount` to the user's wallet, returning the new balance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    async fn credit_wallet(&self, user_id: UserId, amount: u64) -> Result<u64>;

    /// Appends ticket references to a user's owned-tickets list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    async fn attach_tickets(&self, user_id: UserId, tickets: &[TicketId]) -> Result<()>;

    /// Removes a ticket reference from a user's owned-tickets list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    async fn detach_ticket(&self, user_id: UserId, ticket: TicketId) -> Result<()>;

    // ═══════════════════════════════════════════════════════════
    // Tickets
    // ═══════════════════════════════════════════════════════════

    /// Allocates a contiguous block of `count` sequential ticket numbers,
    /// returning the first number in the block.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    async fn next_ticket_numbers(&self, count: u32) -> Result<u64>;

    /// Stores a batch of ticket records, all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails; on error no ticket from
    /// the batch is visible.
    async fn insert_tickets(&self, tickets: &[Ticket]) -> Result<()>;

    /// Fetches a ticket by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the ticket does not exist.
    async fn get_ticket(&self, ticket_id: TicketId) -> Result<Ticket>;

    /// All tickets currently owned by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    async fn list_tickets_for_user(&self, user_id: UserId) -> Result<Vec<Ticket>>;

    /// All tickets currently listed for resale.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    async fn list_resale_tickets(&self) -> Result<Vec<Ticket>>;

    /// Replaces a ticket record if and only if the stored status still
    /// equals `expected` (compare-and-swap on the state field). Of two
    /// racing transitions on one ticket, exactly one wins.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the ticket does not exist, or
    /// `ConcurrencyConflict` if the stored status no longer matches
    /// `expected`.
    async fn update_ticket_guarded(&self, ticket: &Ticket, expected: TicketStatus) -> Result<()>;

    /// Deletes a ticket record (admin escape hatch; never part of the
    /// normal lifecycle).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the ticket does not exist.
    async fn delete_ticket(&self, ticket_id: TicketId) -> Result<()>;

    // ═══════════════════════════════════════════════════════════
    // Waitlist
    // ═══════════════════════════════════════════════════════════

    /// Stores a waitlist entry, enforcing (event, user, category)
    /// uniqueness.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateWaitlistEntry` if an entry for the same tuple
    /// already exists.
    async fn insert_waitlist_entry(&self, entry: &WaitlistEntry) -> Result<()>;

    /// Fetches a waitlist entry by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist.
    async fn get_waitlist_entry(&self, entry_id: WaitlistEntryId) -> Result<WaitlistEntry>;

    /// All entries for an event, ordered by join time ascending (FIFO).
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    async fn list_waitlist_for_event(&self, event_id: EventId) -> Result<Vec<WaitlistEntry>>;

    /// All entries created by a user, ordered by join time ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    async fn list_waitlist_for_user(&self, user_id: UserId) -> Result<Vec<WaitlistEntry>>;

    /// Deletes a waitlist entry by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist.
    async fn delete_waitlist_entry(&self, entry_id: WaitlistEntryId) -> Result<()>;

    /// Deletes every waitlist entry a user holds for an event (all
    /// categories), returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    async fn delete_waitlist_entries_for(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<u64>;
}
