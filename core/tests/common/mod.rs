//! Shared fixtures for engine integration tests.

#![allow(clippy::unwrap_used)]
#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use eventease_core::event::{CategoryInventory, Event, TicketInventory};
use eventease_core::store::MemoryRepository;
use eventease_core::types::{EventId, TicketCategory, UserId};
use eventease_core::user::{User, UserRole};
use std::sync::Arc;

pub fn repository() -> Arc<MemoryRepository> {
    Arc::new(MemoryRepository::new())
}

/// Event with `count` tickets at `price` in the given category and empty
/// inventory elsewhere.
pub fn event_with(category: TicketCategory, count: u32, price: u64) -> Event {
    let mut inventory = TicketInventory::default();
    *inventory.category_mut(category) = CategoryInventory {
        remaining: count,
        issued: 0,
        price,
    };
    Event {
        id: EventId::new(),
        name: format!("Test Event {}", EventId::new()),
        description: "An event for tests".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 11, 14).unwrap(),
        time: "19:30".to_string(),
        location: "Main Arena".to_string(),
        image_url: None,
        inventory,
        created_at: Utc::now(),
    }
}

pub fn user_with_wallet(balance: u64) -> User {
    let id = UserId::new();
    User::new(id, "Test User", format!("{id}@example.com")).with_wallet(balance)
}

pub fn admin() -> User {
    let id = UserId::new();
    User::new(id, "Admin", format!("{id}@example.com")).with_role(UserRole::Admin)
}

pub async fn seed(repo: &Arc<MemoryRepository>, event: &Event, users: &[&User]) {
    use eventease_core::store::TicketingRepository;
    repo.insert_event(event).await.unwrap();
    for user in users {
        repo.insert_user(user).await.unwrap();
    }
}
