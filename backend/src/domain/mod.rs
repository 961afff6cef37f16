//! Domain layer: the business rules of the gym dashboard.
//!
//! Services in this module own no data; they orchestrate the storage
//! traits and keep every date/time read behind the injected [`clock::Clock`]
//! so the rules are deterministic under test.

pub mod checkin;
pub mod checkin_flow;
pub mod clock;
pub mod errors;
pub mod ledger;
pub mod membership;

pub use errors::DomainError;
