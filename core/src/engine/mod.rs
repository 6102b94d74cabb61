//! Operation engines for the ticket lifecycle.
//!
//! Each engine orchestrates one family of operations against the
//! repository: primary purchase, resale, and waitlist/assignment. Engines
//! hold no state of their own; every request is an independent unit of
//! work against the shared durable store.

mod purchase;
mod resale;
mod waitlist;

pub use purchase::PurchaseEngine;
pub use resale::ResaleEngine;
pub use waitlist::WaitlistEngine;
