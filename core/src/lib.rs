//! EventEase ticketing core.
//!
//! Domain model and engines for the ticket lifecycle: tiered inventory,
//! primary purchase, resale market and category-scoped waitlists. The
//! [`store::TicketingRepository`] trait abstracts the durable store; an
//! in-memory implementation backs tests and development, and a PostgreSQL
//! implementation (feature `postgres`) backs production.

pub mod engine;
pub mod error;
pub mod event;
pub mod store;
pub mod ticket;
pub mod types;
pub mod user;
pub mod waitlist;

pub use engine::{PurchaseEngine, ResaleEngine, WaitlistEngine};
pub use error::{Result, TicketingError};
