//! Purchase engine integration tests against the in-memory repository.
//!
//! Covers inventory decrement, conservation, payment methods, and the
//! all-or-nothing guarantee.

#![allow(clippy::unwrap_used)]

mod common;

use common::{event_with, repository, seed, user_with_wallet};
use eventease_core::store::TicketingRepository;
use eventease_core::ticket::TicketStatus;
use eventease_core::types::{PaymentMethod, TicketCategory};
use eventease_core::{PurchaseEngine, TicketingError};

#[tokio::test]
async fn card_purchase_decrements_inventory_and_creates_tickets() {
    let repo = repository();
    let event = event_with(TicketCategory::Vip, 2, 1000);
    let buyer = user_with_wallet(0);
    seed(&repo, &event, &[&buyer]).await;
    let engine = PurchaseEngine::new(repo.clone());

    let tickets = engine
        .purchase(event.id, TicketCategory::Vip, 2, PaymentMethod::Card, buyer.id)
        .await
        .unwrap();

    assert_eq!(tickets.len(), 2);
    for ticket in &tickets {
        assert_eq!(ticket.status, TicketStatus::Active);
        assert_eq!(ticket.price_paid, 1000);
        assert_eq!(ticket.owner_id, buyer.id);
    }

    // Exactly q new rows, inventory down by exactly q.
    let stored = repo.get_event(event.id).await.unwrap();
    assert_eq!(stored.inventory.remaining(TicketCategory::Vip), 0);
    let owned = repo.list_tickets_for_user(buyer.id).await.unwrap();
    assert_eq!(owned.len(), 2);

    // Third request fails with the exact remaining count.
    let err = engine
        .purchase(event.id, TicketCategory::Vip, 1, PaymentMethod::Card, buyer.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TicketingError::InsufficientInventory {
            category: TicketCategory::Vip,
            remaining: 0
        }
    );
}

#[tokio::test]
async fn wallet_purchase_debits_balance() {
    let repo = repository();
    let event = event_with(TicketCategory::Standard, 10, 250);
    let buyer = user_with_wallet(1000);
    seed(&repo, &event, &[&buyer]).await;
    let engine = PurchaseEngine::new(repo.clone());

    engine
        .purchase(
            event.id,
            TicketCategory::Standard,
            3,
            PaymentMethod::Wallet,
            buyer.id,
        )
        .await
        .unwrap();

    let stored = repo.get_user(buyer.id).await.unwrap();
    assert_eq!(stored.wallet, 250);
    assert_eq!(stored.tickets.len(), 3);
}

#[tokio::test]
async fn insufficient_funds_leaves_no_trace() {
    let repo = repository();
    let event = event_with(TicketCategory::Vip, 5, 1000);
    let buyer = user_with_wallet(500);
    seed(&repo, &event, &[&buyer]).await;
    let engine = PurchaseEngine::new(repo.clone());

    let err = engine
        .purchase(event.id, TicketCategory::Vip, 1, PaymentMethod::Wallet, buyer.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TicketingError::InsufficientFunds {
            required: 1000,
            available: 500
        }
    );

    // Balance unchanged, no ticket row created, inventory untouched.
    let stored = repo.get_user(buyer.id).await.unwrap();
    assert_eq!(stored.wallet, 500);
    assert!(repo.list_tickets_for_user(buyer.id).await.unwrap().is_empty());
    let stored_event = repo.get_event(event.id).await.unwrap();
    assert_eq!(stored_event.inventory.remaining(TicketCategory::Vip), 5);
}

#[tokio::test]
async fn zero_quantity_is_rejected() {
    let repo = repository();
    let event = event_with(TicketCategory::Vip, 5, 1000);
    let buyer = user_with_wallet(0);
    seed(&repo, &event, &[&buyer]).await;
    let engine = PurchaseEngine::new(repo.clone());

    let err = engine
        .purchase(event.id, TicketCategory::Vip, 0, PaymentMethod::Card, buyer.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Validation { .. }));
}

#[tokio::test]
async fn unknown_event_and_buyer_are_not_found() {
    let repo = repository();
    let event = event_with(TicketCategory::Vip, 5, 1000);
    let buyer = user_with_wallet(0);
    seed(&repo, &event, &[&buyer]).await;
    let engine = PurchaseEngine::new(repo.clone());

    let missing_event = engine
        .purchase(
            eventease_core::types::EventId::new(),
            TicketCategory::Vip,
            1,
            PaymentMethod::Card,
            buyer.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(missing_event, TicketingError::NotFound { resource: "event", .. }));

    let missing_buyer = engine
        .purchase(
            event.id,
            TicketCategory::Vip,
            1,
            PaymentMethod::Card,
            eventease_core::types::UserId::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(missing_buyer, TicketingError::NotFound { resource: "user", .. }));
}

#[tokio::test]
async fn ticket_numbers_are_sequential_and_seat_labels_deterministic() {
    let repo = repository();
    let event = event_with(TicketCategory::Vvip, 4, 5000);
    let buyer = user_with_wallet(0);
    seed(&repo, &event, &[&buyer]).await;
    let engine = PurchaseEngine::new(repo.clone());

    let first = engine
        .purchase(event.id, TicketCategory::Vvip, 2, PaymentMethod::Card, buyer.id)
        .await
        .unwrap();
    let second = engine
        .purchase(event.id, TicketCategory::Vvip, 2, PaymentMethod::Card, buyer.id)
        .await
        .unwrap();

    assert_eq!(first[0].number.0 + 1, first[1].number.0);
    assert_eq!(first[1].number.0 + 1, second[0].number.0);

    let labels: Vec<&str> = first
        .iter()
        .chain(second.iter())
        .map(|ticket| ticket.seat_label.as_str())
        .collect();
    assert_eq!(labels, vec!["VVIP-1", "VVIP-2", "VVIP-3", "VVIP-4"]);
}

#[tokio::test]
async fn cost_overflow_is_rejected_before_any_mutation() {
    let repo = repository();
    let event = event_with(TicketCategory::Vip, 5, u64::MAX);
    let buyer = user_with_wallet(0);
    seed(&repo, &event, &[&buyer]).await;
    let engine = PurchaseEngine::new(repo.clone());

    let err = engine
        .purchase(event.id, TicketCategory::Vip, 2, PaymentMethod::Card, buyer.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Validation { .. }));

    // No debit, no decrement, no ticket rows.
    let stored = repo.get_event(event.id).await.unwrap();
    assert_eq!(stored.inventory.remaining(TicketCategory::Vip), 5);
    assert!(repo.list_tickets_for_user(buyer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_purchases_never_oversell() {
    let repo = repository();
    let event = event_with(TicketCategory::Standard, 5, 100);
    let buyer = user_with_wallet(0);
    seed(&repo, &event, &[&buyer]).await;
    let engine = PurchaseEngine::new(repo.clone());

    // Ten racing single-ticket purchases against five remaining tickets:
    // exactly five succeed.
    let mut handles = Vec::new();
    for _ in 0..10 {
        let engine = engine.clone();
        let event_id = event.id;
        let buyer_id = buyer.id;
        handles.push(tokio::spawn(async move {
            engine
                .purchase(
                    event_id,
                    TicketCategory::Standard,
                    1,
                    PaymentMethod::Card,
                    buyer_id,
                )
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 5);
    let stored = repo.get_event(event.id).await.unwrap();
    assert_eq!(stored.inventory.remaining(TicketCategory::Standard), 0);
    assert_eq!(repo.list_tickets_for_user(buyer.id).await.unwrap().len(), 5);
}
