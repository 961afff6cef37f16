//! Petty-cash ledger: validation, filtering and aggregation.
//!
//! Entries are immutable once written; the only mutations are insert and
//! explicit delete. Display order is newest first by (date, time), which
//! for the zero-padded store columns is the same as their lexicographic
//! order.

use std::sync::Arc;

use chrono::{NaiveDate, Timelike};
use shared::{CreateTransactionRequest, LedgerSummary, Transaction, TransactionType};
use tracing::info;

use crate::domain::clock::Clock;
use crate::domain::errors::DomainError;
use crate::storage::TransactionStore;

/// Inclusive date-range and type filter over the ledger.
///
/// `start`/`end` bound the entry date; both set to the same day selects
/// exactly that day. `kind` of `None` keeps both directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub kind: Option<TransactionType>,
}

impl TransactionFilter {
    /// Filter matching exactly one calendar day.
    pub fn on_day(day: NaiveDate) -> Self {
        Self {
            start: Some(day),
            end: Some(day),
            kind: None,
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(start) = self.start {
            if tx.date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if tx.date > end {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if tx.kind != kind {
                return false;
            }
        }
        true
    }
}

/// Sum a slice of entries into income/expense totals and their balance.
pub fn summarize(entries: &[Transaction]) -> LedgerSummary {
    let mut income = 0.0;
    let mut expense = 0.0;
    for entry in entries {
        match entry.kind {
            TransactionType::Income => income += entry.amount,
            TransactionType::Expense => expense += entry.amount,
        }
    }
    LedgerSummary {
        income,
        expense,
        balance: income - expense,
        count: entries.len(),
    }
}

/// Sort entries for display: descending by (date, time), newest first.
pub fn sort_for_display(entries: &mut [Transaction]) {
    entries.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
}

/// Service for the cash ledger.
#[derive(Clone)]
pub struct LedgerService {
    transactions: Arc<dyn TransactionStore>,
    clock: Arc<dyn Clock>,
}

impl LedgerService {
    pub fn new(transactions: Arc<dyn TransactionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transactions,
            clock,
        }
    }

    /// Record a new ledger entry. Date and time default to "now"; the time
    /// is truncated to the minute to match the HH:MM store column.
    pub async fn add_transaction(
        &self,
        request: CreateTransactionRequest,
    ) -> Result<Transaction, DomainError> {
        if request.amount <= 0.0 || !request.amount.is_finite() {
            return Err(DomainError::Validation(
                "amount must be a positive number".to_string(),
            ));
        }
        let concept = request.concept.trim().to_string();
        if concept.is_empty() {
            return Err(DomainError::Validation("concept is required".to_string()));
        }

        let time = request.time.unwrap_or_else(|| self.clock.now_time());
        let entry = Transaction {
            id: None,
            kind: request.kind,
            amount: request.amount,
            concept,
            date: request.date.unwrap_or_else(|| self.clock.today()),
            time: time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time),
            created_at: None,
        };

        let stored = self.transactions.insert_transaction(&entry).await?;
        info!(
            "Recorded {:?} of {:.2}: {}",
            stored.kind, stored.amount, stored.concept
        );
        Ok(stored)
    }

    /// Entries matching the filter, newest first.
    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, DomainError> {
        let mut entries = self.transactions.list_transactions(filter).await?;
        sort_for_display(&mut entries);
        Ok(entries)
    }

    /// Totals for the filtered slice of the ledger.
    pub async fn summary(&self, filter: &TransactionFilter) -> Result<LedgerSummary, DomainError> {
        let entries = self.transactions.list_transactions(filter).await?;
        Ok(summarize(&entries))
    }

    /// Today's entries and totals in one fetch.
    pub async fn today(&self) -> Result<(Vec<Transaction>, LedgerSummary), DomainError> {
        let filter = TransactionFilter::on_day(self.clock.today());
        let mut entries = self.transactions.list_transactions(&filter).await?;
        let summary = summarize(&entries);
        sort_for_display(&mut entries);
        Ok((entries, summary))
    }

    /// Remove one entry by id.
    pub async fn delete_transaction(&self, id: i64) -> Result<(), DomainError> {
        let deleted = self.transactions.delete_transaction(id).await?;
        if deleted == 0 {
            return Err(DomainError::NotFound(format!("no transaction with id {id}")));
        }
        info!("Deleted transaction {id}");
        Ok(())
    }
}
