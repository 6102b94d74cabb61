//! Waitlist and assignment engine integration tests.

#![allow(clippy::unwrap_used)]

mod common;

use common::{event_with, repository, seed, user_with_wallet};
use eventease_core::store::{MemoryRepository, TicketingRepository};
use eventease_core::ticket::{Ticket, TicketStatus};
use eventease_core::types::{EventId, PaymentMethod, TicketCategory, TicketId, UserId, WaitlistEntryId};
use eventease_core::{PurchaseEngine, ResaleEngine, TicketingError, WaitlistEngine};
use std::sync::Arc;

async fn listed_ticket(
    repo: &Arc<MemoryRepository>,
    event_id: EventId,
    owner: UserId,
    category: TicketCategory,
) -> Ticket {
    let purchase = PurchaseEngine::new(repo.clone());
    let ticket = purchase
        .purchase(event_id, category, 1, PaymentMethod::Card, owner)
        .await
        .unwrap()
        .remove(0);
    ResaleEngine::new(repo.clone())
        .list_for_resale(ticket.id, 800, None, owner)
        .await
        .unwrap()
}

#[tokio::test]
async fn joining_twice_is_idempotent_per_tuple() {
    let repo = repository();
    let event = event_with(TicketCategory::Vip, 0, 1000);
    let user = user_with_wallet(0);
    seed(&repo, &event, &[&user]).await;
    let engine = WaitlistEngine::new(repo.clone());

    engine
        .join_waitlist(event.id, TicketCategory::Vip, user.id)
        .await
        .unwrap();
    let err = engine
        .join_waitlist(event.id, TicketCategory::Vip, user.id)
        .await
        .unwrap_err();
    assert_eq!(err, TicketingError::DuplicateWaitlistEntry);

    // Exactly one persisted entry.
    assert_eq!(
        engine.list_waitlist_for_event(event.id).await.unwrap().len(),
        1
    );

    // A different category is a different tuple.
    engine
        .join_waitlist(event.id, TicketCategory::Standard, user.id)
        .await
        .unwrap();
    assert_eq!(
        engine.list_waitlist_for_event(event.id).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn event_waitlist_is_fifo_by_join_time() {
    let repo = repository();
    let event = event_with(TicketCategory::Vip, 0, 1000);
    let first = user_with_wallet(0);
    let second = user_with_wallet(0);
    let third = user_with_wallet(0);
    seed(&repo, &event, &[&first, &second, &third]).await;
    let engine = WaitlistEngine::new(repo.clone());

    for user in [&first, &second, &third] {
        engine
            .join_waitlist(event.id, TicketCategory::Vip, user.id)
            .await
            .unwrap();
        // Join timestamps must be strictly ordered for the assertion.
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let entries = engine.list_waitlist_for_event(event.id).await.unwrap();
    let order: Vec<UserId> = entries.iter().map(|entry| entry.user_id).collect();
    assert_eq!(order, vec![first.id, second.id, third.id]);
}

#[tokio::test]
async fn assignment_transfers_ownership_and_consumes_the_entry() {
    let repo = repository();
    let event = event_with(TicketCategory::Vip, 5, 1000);
    let seller = user_with_wallet(0);
    let waiter = user_with_wallet(0);
    seed(&repo, &event, &[&seller, &waiter]).await;
    let ticket = listed_ticket(&repo, event.id, seller.id, TicketCategory::Vip).await;
    let engine = WaitlistEngine::new(repo.clone());

    let entry = engine
        .join_waitlist(event.id, TicketCategory::Vip, waiter.id)
        .await
        .unwrap();
    let assigned = engine
        .assign_resale_ticket(ticket.id, entry.id)
        .await
        .unwrap();

    assert_eq!(assigned.owner_id, waiter.id);
    assert_eq!(assigned.status, TicketStatus::Resold);

    // Entry no longer appears in the event waitlist.
    assert!(engine
        .list_waitlist_for_event(event.id)
        .await
        .unwrap()
        .is_empty());

    // Owned-ticket lists reconciled.
    assert!(repo.get_user(seller.id).await.unwrap().tickets.is_empty());
    assert_eq!(repo.get_user(waiter.id).await.unwrap().tickets, vec![ticket.id]);
}

#[tokio::test]
async fn assignment_enforces_category_match() {
    let repo = repository();
    let mut event = event_with(TicketCategory::Vip, 5, 1000);
    event.inventory.category_mut(TicketCategory::Standard).price = 200;
    let seller = user_with_wallet(0);
    let waiter = user_with_wallet(0);
    seed(&repo, &event, &[&seller, &waiter]).await;
    let ticket = listed_ticket(&repo, event.id, seller.id, TicketCategory::Vip).await;
    let engine = WaitlistEngine::new(repo.clone());

    let entry = engine
        .join_waitlist(event.id, TicketCategory::Standard, waiter.id)
        .await
        .unwrap();
    let err = engine
        .assign_resale_ticket(ticket.id, entry.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TicketingError::CategoryMismatch {
            ticket: TicketCategory::Vip,
            requested: TicketCategory::Standard
        }
    );

    // Nothing moved.
    assert_eq!(
        repo.get_ticket(ticket.id).await.unwrap().status,
        TicketStatus::ListedForResale
    );
    assert_eq!(
        engine.list_waitlist_for_event(event.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn assignment_rejects_entries_from_other_events() {
    let repo = repository();
    let event = event_with(TicketCategory::Vip, 5, 1000);
    let other_event = event_with(TicketCategory::Vip, 0, 1000);
    let seller = user_with_wallet(0);
    let waiter = user_with_wallet(0);
    seed(&repo, &event, &[&seller, &waiter]).await;
    repo.insert_event(&other_event).await.unwrap();
    let ticket = listed_ticket(&repo, event.id, seller.id, TicketCategory::Vip).await;
    let engine = WaitlistEngine::new(repo.clone());

    let entry = engine
        .join_waitlist(other_event.id, TicketCategory::Vip, waiter.id)
        .await
        .unwrap();
    let err = engine
        .assign_resale_ticket(ticket.id, entry.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Validation { .. }));
}

#[tokio::test]
async fn assignment_requires_every_party_to_resolve() {
    let repo = repository();
    let event = event_with(TicketCategory::Vip, 5, 1000);
    let seller = user_with_wallet(0);
    let waiter = user_with_wallet(0);
    seed(&repo, &event, &[&seller, &waiter]).await;
    let ticket = listed_ticket(&repo, event.id, seller.id, TicketCategory::Vip).await;
    let engine = WaitlistEngine::new(repo.clone());

    let entry = engine
        .join_waitlist(event.id, TicketCategory::Vip, waiter.id)
        .await
        .unwrap();

    let err = engine
        .assign_resale_ticket(TicketId::new(), entry.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::NotFound { resource: "ticket", .. }));

    let err = engine
        .assign_resale_ticket(ticket.id, WaitlistEntryId::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TicketingError::NotFound {
            resource: "waitlist entry",
            ..
        }
    ));
}

#[tokio::test]
async fn resold_ticket_cannot_be_assigned_again() {
    let repo = repository();
    let event = event_with(TicketCategory::Vip, 5, 1000);
    let seller = user_with_wallet(0);
    let first = user_with_wallet(0);
    let second = user_with_wallet(0);
    seed(&repo, &event, &[&seller, &first, &second]).await;
    let ticket = listed_ticket(&repo, event.id, seller.id, TicketCategory::Vip).await;
    let engine = WaitlistEngine::new(repo.clone());

    let first_entry = engine
        .join_waitlist(event.id, TicketCategory::Vip, first.id)
        .await
        .unwrap();
    let second_entry = engine
        .join_waitlist(event.id, TicketCategory::Vip, second.id)
        .await
        .unwrap();

    engine
        .assign_resale_ticket(ticket.id, first_entry.id)
        .await
        .unwrap();
    let err = engine
        .assign_resale_ticket(ticket.id, second_entry.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TicketingError::NotEligibleForResale {
            status: TicketStatus::Resold
        }
    );
}

#[tokio::test]
async fn user_waitlist_lists_own_entries_across_events() {
    let repo = repository();
    let event_a = event_with(TicketCategory::Vip, 0, 1000);
    let event_b = event_with(TicketCategory::Standard, 0, 200);
    let user = user_with_wallet(0);
    seed(&repo, &event_a, &[&user]).await;
    repo.insert_event(&event_b).await.unwrap();
    let engine = WaitlistEngine::new(repo.clone());

    engine
        .join_waitlist(event_a.id, TicketCategory::Vip, user.id)
        .await
        .unwrap();
    engine
        .join_waitlist(event_b.id, TicketCategory::Standard, user.id)
        .await
        .unwrap();

    let entries = engine.list_waitlist_for_user(user.id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|entry| entry.user_id == user.id));
}
