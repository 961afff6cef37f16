//! Storage abstraction over the hosted table-store.
//!
//! The traits here define the row operations the domain needs per table
//! family. The production backend ([`remote`]) is a thin wrapper over the
//! store's REST interface; a second, in-memory backend backs the tests.
//! All operations are async because every one of them is a network round
//! trip in production — there is no local persistence.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use shared::{CheckIn, ClassType, Employee, Member, Plan, Transaction};
use thiserror::Error;

pub mod remote;

#[cfg(test)]
pub mod memory;

use crate::domain::ledger::TransactionFilter;

/// A failed round trip to the store. The caller's in-memory state is left
/// untouched; the store remains the source of truth and the next fetch
/// reconciles.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode store response: {0}")]
    Decode(String),
}

/// Row operations on the `members` table.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// All members, newest registration first.
    async fn list_members(&self) -> Result<Vec<Member>, StoreError>;

    /// Every row matching the DNI. More than one is a data-quality defect
    /// the domain layer rejects; the store query itself does not assume
    /// uniqueness.
    async fn find_by_dni(&self, dni: &str) -> Result<Vec<Member>, StoreError>;

    /// Insert a new row; returns the row as stored (with id/timestamps).
    async fn insert_member(&self, member: &Member) -> Result<Member, StoreError>;

    /// Update all fields of the row(s) matching the DNI; returns the
    /// updated row.
    async fn update_by_dni(&self, dni: &str, member: &Member) -> Result<Member, StoreError>;

    /// Hard delete by DNI; returns the number of rows removed.
    async fn delete_by_dni(&self, dni: &str) -> Result<u64, StoreError>;
}

/// Row operations on the `transactions` table. Rows are never updated.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert_transaction(&self, tx: &Transaction) -> Result<Transaction, StoreError>;

    /// Entries matching the filter, in store order (the domain re-sorts for
    /// display).
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// Hard delete by id; returns the number of rows removed.
    async fn delete_transaction(&self, id: i64) -> Result<u64, StoreError>;
}

/// Row operations on the append-only `checkins` table.
#[async_trait]
pub trait CheckInStore: Send + Sync {
    async fn append_check_in(&self, check_in: &CheckIn) -> Result<CheckIn, StoreError>;

    /// Check-ins with `check_in_time` inside the inclusive range, newest
    /// first.
    async fn list_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CheckIn>, StoreError>;
}

/// Read-only access to the admin-configured lookup tables. Soft-deleted
/// rows (`is_active = false`) are filtered at the store.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn active_plans(&self) -> Result<Vec<Plan>, StoreError>;

    async fn active_employees(&self) -> Result<Vec<Employee>, StoreError>;

    async fn active_class_types(&self) -> Result<Vec<ClassType>, StoreError>;
}
