//! Primary ticket purchase.

use crate::error::{Result, TicketingError};
use crate::store::TicketingRepository;
use crate::ticket::{Ticket, TicketStatus};
use crate::types::{EventId, PaymentMethod, TicketCategory, TicketId, TicketNumber, UserId};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Executes primary ticket sales against inventory and payment method.
///
/// The operation is all-or-nothing: wallet debit, inventory decrement and
/// ticket creation either all take effect or are all undone by
/// compensating actions, so a failure partway leaves no partial mutation
/// visible.
#[derive(Clone)]
pub struct PurchaseEngine {
    repository: Arc<dyn TicketingRepository>,
}

impl PurchaseEngine {
    /// Creates an engine over the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn TicketingRepository>) -> Self {
        Self { repository }
    }

    /// Purchases `quantity` tickets in `category` for `buyer_id`.
    ///
    /// Wallet payment requires sufficient balance and debits it; card
    /// payment is a simulated success with no balance check. Each created
    /// ticket gets a sequential ticket number and a deterministic
    /// `{CATEGORY}-{seat}` label from the per-event seat counter.
    ///
    /// # Errors
    ///
    /// - `Validation` if `quantity` is zero or the total cost overflows.
    /// - `NotFound` if the event or buyer does not exist.
    /// - `InsufficientInventory` (with the exact remaining count) if fewer
    ///   than `quantity` tickets remain in the category.
    /// - `InsufficientFunds` for a wallet payment the balance cannot cover.
    /// - `Storage` if the store fails.
    pub async fn purchase(
        &self,
        event_id: EventId,
        category: TicketCategory,
        quantity: u32,
        payment_method: PaymentMethod,
        buyer_id: UserId,
    ) -> Result<Vec<Ticket>> {
        if quantity == 0 {
            return Err(TicketingError::validation("quantity must be at least 1"));
        }

        let event = self.repository.get_event(event_id).await?;
        let buyer = self.repository.get_user(buyer_id).await?;

        // Fast-path availability check against the snapshot; the
        // authoritative check is the conditional decrement below.
        let remaining = event.inventory.remaining(category);
        if remaining < quantity {
            return Err(TicketingError::InsufficientInventory {
                category,
                remaining,
            });
        }

        let unit_price = event.inventory.price(category);
        let cost = unit_price
            .checked_mul(u64::from(quantity))
            .ok_or_else(|| TicketingError::validation("total cost overflows"))?;

        let debited = match payment_method {
            PaymentMethod::Wallet => {
                self.repository.debit_wallet(buyer.id, cost).await?;
                true
            }
            PaymentMethod::Card => {
                info!(buyer = %buyer.id, cost, "simulating card payment success");
                false
            }
        };

        let reservation = match self
            .repository
            .reserve_inventory(event_id, category, quantity)
            .await
        {
            Ok(reservation) => reservation,
            Err(err) => {
                self.refund(debited, buyer_id, cost).await;
                return Err(err);
            }
        };

        let first_number = match self.repository.next_ticket_numbers(quantity).await {
            Ok(first) => first,
            Err(err) => {
                self.restore(event_id, category, quantity).await;
                self.refund(debited, buyer_id, cost).await;
                return Err(err);
            }
        };

        let purchased_at = Utc::now();
        let tickets: Vec<Ticket> = (0..quantity)
            .map(|offset| Ticket {
                id: TicketId::new(),
                number: TicketNumber(first_number + u64::from(offset)),
                event_id,
                owner_id: buyer.id,
                category,
                seat_label: format!("{}-{}", category, reservation.first_seat + offset),
                price_paid: unit_price,
                purchased_at,
                status: TicketStatus::Active,
                resale: None,
                buyer_id: None,
            })
            .collect();

        if let Err(err) = self.repository.insert_tickets(&tickets).await {
            self.restore(event_id, category, quantity).await;
            self.refund(debited, buyer_id, cost).await;
            return Err(err);
        }

        let ids: Vec<TicketId> = tickets.iter().map(|ticket| ticket.id).collect();
        self.repository.attach_tickets(buyer.id, &ids).await?;

        info!(
            event = %event_id,
            buyer = %buyer_id,
            %category,
            quantity,
            cost,
            remaining = reservation.remaining,
            "tickets purchased"
        );
        Ok(tickets)
    }

    /// Compensating action: return a wallet debit.
    async fn refund(&self, debited: bool, buyer_id: UserId, cost: u64) {
        if !debited {
            return;
        }
        if let Err(err) = self.repository.credit_wallet(buyer_id, cost).await {
            warn!(buyer = %buyer_id, cost, %err, "failed to refund wallet after aborted purchase");
        }
    }

    /// Compensating action: return reserved inventory.
    async fn restore(&self, event_id: EventId, category: TicketCategory, quantity: u32) {
        if let Err(err) = self
            .repository
            .restore_inventory(event_id, category, quantity)
            .await
        {
            warn!(event = %event_id, %category, quantity, %err, "failed to restore inventory after aborted purchase");
        }
    }
}
