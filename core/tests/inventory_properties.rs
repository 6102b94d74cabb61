//! Property tests for inventory safety under arbitrary purchase sequences.

#![allow(clippy::unwrap_used)]

mod common;

use common::{repository, seed, user_with_wallet};
use chrono::{NaiveDate, Utc};
use eventease_core::event::{CategoryInventory, Event, TicketInventory};
use eventease_core::store::TicketingRepository;
use eventease_core::types::{EventId, PaymentMethod, TicketCategory};
use eventease_core::{PurchaseEngine, TicketingError};
use proptest::prelude::*;

fn event_with_counts(vvip: u32, vip: u32, standard: u32) -> Event {
    Event {
        id: EventId::new(),
        name: format!("Prop Event {}", EventId::new()),
        description: "Property test event".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 11, 14).unwrap(),
        time: "20:00".to_string(),
        location: "Hall B".to_string(),
        image_url: None,
        inventory: TicketInventory {
            vvip: CategoryInventory { remaining: vvip, issued: 0, price: 5000 },
            vip: CategoryInventory { remaining: vip, issued: 0, price: 1000 },
            standard: CategoryInventory { remaining: standard, issued: 0, price: 200 },
        },
        created_at: Utc::now(),
    }
}

fn category_strategy() -> impl Strategy<Value = TicketCategory> {
    prop_oneof![
        Just(TicketCategory::Vvip),
        Just(TicketCategory::Vip),
        Just(TicketCategory::Standard),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Inventory never goes negative and every successful purchase of `q`
    /// tickets removes exactly `q` from the category count while creating
    /// exactly `q` ticket rows.
    #[test]
    fn inventory_never_negative_and_conserved(
        (vvip, vip, standard) in (0u32..8, 0u32..8, 0u32..8),
        ops in prop::collection::vec((category_strategy(), 1u32..4), 1..24),
    ) {
        tokio_test::block_on(async move {
            let repo = repository();
            let event = event_with_counts(vvip, vip, standard);
            let buyer = user_with_wallet(0);
            seed(&repo, &event, &[&buyer]).await;
            let engine = PurchaseEngine::new(repo.clone());

            let mut expected = [vvip, vip, standard];
            let mut created = 0usize;

            for (category, quantity) in ops {
                let slot = match category {
                    TicketCategory::Vvip => 0,
                    TicketCategory::Vip => 1,
                    TicketCategory::Standard => 2,
                };
                let result = engine
                    .purchase(event.id, category, quantity, PaymentMethod::Card, buyer.id)
                    .await;

                match result {
                    Ok(tickets) => {
                        prop_assert!(expected[slot] >= quantity);
                        expected[slot] -= quantity;
                        prop_assert_eq!(tickets.len(), quantity as usize);
                        created += tickets.len();
                    }
                    Err(TicketingError::InsufficientInventory { remaining, .. }) => {
                        prop_assert_eq!(remaining, expected[slot]);
                        prop_assert!(expected[slot] < quantity);
                    }
                    Err(other) => return Err(TestCaseError::fail(format!("unexpected error: {other}"))),
                }

                let stored = repo.get_event(event.id).await.map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(stored.inventory.remaining(TicketCategory::Vvip), expected[0]);
                prop_assert_eq!(stored.inventory.remaining(TicketCategory::Vip), expected[1]);
                prop_assert_eq!(stored.inventory.remaining(TicketCategory::Standard), expected[2]);
            }

            let owned = repo
                .list_tickets_for_user(buyer.id)
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(owned.len(), created);
            Ok(())
        })?;
    }
}
