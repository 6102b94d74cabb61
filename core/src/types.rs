//! Identifier and value types shared across the ticketing domain.
//!
//! Every entity gets a Uuid-backed newtype id so that an event id can never
//! be passed where a user id is expected. Ticket numbers are sequential and
//! allocated by the repository, not random.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing `Uuid`.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner `Uuid`.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for an event.
    EventId
}

uuid_id! {
    /// Unique identifier for a ticket.
    TicketId
}

uuid_id! {
    /// Unique identifier for a user.
    UserId
}

uuid_id! {
    /// Unique identifier for a waitlist entry.
    WaitlistEntryId
}

// ============================================================================
// Value types
// ============================================================================

/// Ticket tier. Each category carries independent inventory and pricing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketCategory {
    /// Top tier.
    #[serde(rename = "VVIP")]
    Vvip,
    /// Middle tier.
    #[serde(rename = "VIP")]
    Vip,
    /// Base tier.
    Standard,
}

impl TicketCategory {
    /// All categories, in tier order.
    pub const ALL: [Self; 3] = [Self::Vvip, Self::Vip, Self::Standard];

    /// Canonical uppercase label, used in seat labels and storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vvip => "VVIP",
            Self::Vip => "VIP",
            Self::Standard => "Standard",
        }
    }

    /// Parses the canonical label back into a category.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "VVIP" => Some(Self::Vvip),
            "VIP" => Some(Self::Vip),
            "Standard" => Some(Self::Standard),
            _ => None,
        }
    }
}

impl fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a primary purchase is paid for.
///
/// Card payment is a simulated success with no balance check and no external
/// call. Unrecognized tokens are rejected at the API boundary before they
/// reach this enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Debit the buyer's wallet balance.
    Wallet,
    /// Simulated card payment.
    Card,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wallet => f.write_str("wallet"),
            Self::Card => f.write_str("card"),
        }
    }
}

/// Sequential ticket number, unique and monotonically assigned by the
/// repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TicketNumber(pub u64);

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for category in TicketCategory::ALL {
            assert_eq!(TicketCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(TicketCategory::parse("vip"), None);
    }

    #[test]
    fn category_serde_uses_canonical_labels() {
        let json = serde_json::to_string(&TicketCategory::Vvip).unwrap();
        assert_eq!(json, "\"VVIP\"");
        let parsed: TicketCategory = serde_json::from_str("\"Standard\"").unwrap();
        assert_eq!(parsed, TicketCategory::Standard);
    }

    #[test]
    fn payment_method_serde_is_lowercase() {
        let json = serde_json::to_string(&PaymentMethod::Wallet).unwrap();
        assert_eq!(json, "\"wallet\"");
    }
}
