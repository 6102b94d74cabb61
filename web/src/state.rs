//! Application state shared across HTTP handlers.

use crate::auth::SessionProvider;
use eventease_core::store::TicketingRepository;
use eventease_core::{PurchaseEngine, ResaleEngine, WaitlistEngine};
use std::sync::Arc;

/// Shared dependencies for the API endpoints, cloned (cheaply via `Arc`)
/// for each request.
#[derive(Clone)]
pub struct AppState {
    /// Primary purchase operations.
    pub purchase: PurchaseEngine,
    /// Resale market operations.
    pub resale: ResaleEngine,
    /// Waitlist and assignment operations.
    pub waitlist: WaitlistEngine,
    /// Direct store access for reads outside the engines.
    pub repository: Arc<dyn TicketingRepository>,
    /// External session-provider boundary.
    pub sessions: Arc<dyn SessionProvider>,
}

impl AppState {
    /// Wires the engines over a repository and a session provider.
    #[must_use]
    pub fn new(
        repository: Arc<dyn TicketingRepository>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            purchase: PurchaseEngine::new(repository.clone()),
            resale: ResaleEngine::new(repository.clone()),
            waitlist: WaitlistEngine::new(repository.clone()),
            repository,
            sessions,
        }
    }
}
