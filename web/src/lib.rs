//! EventEase HTTP server.
//!
//! Axum front end over the `eventease-core` ticketing engines:
//!
//! - **Tickets**: tiered primary purchase with wallet or simulated card
//!   payment, deterministic seat labels, sequential ticket numbers
//! - **Resale**: owner-listed tickets, direct resale purchase, and
//!   admin-mediated assignment to waitlisted users
//! - **Waitlist**: per-category FIFO queues that backfill resold tickets
//!
//! Storage is selected at startup: PostgreSQL when `DATABASE_URL` is set,
//! in-memory otherwise. Authentication rides on a pluggable
//! [`auth::SessionProvider`]; the bundled static-token provider serves
//! development and tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;
