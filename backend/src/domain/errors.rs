//! Domain error taxonomy.
//!
//! Three failure classes: bad input caught before any network call, a data
//! integrity violation found in the store, and a failed store round trip.
//! "No matching member" is a normal negative result and is NOT an error
//! here; operations that require the member to exist use `NotFound`.

use crate::storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid input, rejected before touching the store.
    #[error("{0}")]
    Validation(String),

    /// The operation targeted a row that does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The store violates an invariant this service relies on, e.g. two
    /// member rows sharing one DNI.
    #[error("data integrity error: {0}")]
    Integrity(String),

    /// A store round trip failed; nothing was applied locally.
    #[error(transparent)]
    Store(#[from] StoreError),
}
