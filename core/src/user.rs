//! User entity: role, wallet balance and owned tickets.
//!
//! Account creation, credentials and sessions live in the external identity
//! provider; this core only needs the wallet and the owned-ticket list.

use crate::types::{TicketId, UserId};
use serde::{Deserialize, Serialize};

/// Access role attached to an authenticated identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular attendee.
    User,
    /// Organizer/operator with access to waitlist assignment and resale
    /// oversight.
    Admin,
}

/// A user account as seen by the ticketing core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Access role.
    pub role: UserRole,
    /// Wallet balance in minor currency units. Never goes negative:
    /// debited only through the repository's conditional debit.
    pub wallet: u64,
    /// Tickets currently referenced by this user's account.
    pub tickets: Vec<TicketId>,
}

impl User {
    /// Creates a regular user with an empty wallet and no tickets.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role: UserRole::User,
            wallet: 0,
            tickets: Vec::new(),
        }
    }

    /// Sets the role, builder-style.
    #[must_use]
    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    /// Sets the wallet balance, builder-style.
    #[must_use]
    pub fn with_wallet(mut self, balance: u64) -> Self {
        self.wallet = balance;
        self
    }
}
