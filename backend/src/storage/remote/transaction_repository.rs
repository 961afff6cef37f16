//! `transactions` table access.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use shared::{Transaction, TransactionType};

use super::RemoteConnection;
use crate::domain::ledger::TransactionFilter;
use crate::storage::{StoreError, TransactionStore};

const TABLE: &str = "transactions";

#[derive(Clone)]
pub struct TransactionRepository {
    connection: Arc<RemoteConnection>,
}

impl TransactionRepository {
    pub fn new(connection: Arc<RemoteConnection>) -> Self {
        Self { connection }
    }
}

/// Wire payload for inserts: the writable columns only.
#[derive(Serialize)]
struct TransactionRow<'a> {
    #[serde(rename = "type")]
    kind: TransactionType,
    amount: f64,
    concept: &'a str,
    date: NaiveDate,
    #[serde(with = "shared::hhmm")]
    time: NaiveTime,
}

#[async_trait]
impl TransactionStore for TransactionRepository {
    async fn insert_transaction(&self, tx: &Transaction) -> Result<Transaction, StoreError> {
        let row = TransactionRow {
            kind: tx.kind,
            amount: tx.amount,
            concept: &tx.concept,
            date: tx.date,
            time: tx.time,
        };
        self.connection.insert(TABLE, &row).await
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "date.desc,time.desc".to_string()),
        ];
        match (filter.start, filter.end) {
            // Exact-day filters hit the store as a single equality.
            (Some(start), Some(end)) if start == end => query.push(("date", format!("eq.{start}"))),
            (start, end) => {
                if let Some(start) = start {
                    query.push(("date", format!("gte.{start}")));
                }
                if let Some(end) = end {
                    query.push(("date", format!("lte.{end}")));
                }
            }
        }
        if let Some(kind) = filter.kind {
            let value = match kind {
                TransactionType::Income => "eq.income",
                TransactionType::Expense => "eq.expense",
            };
            query.push(("type", value.to_string()));
        }
        self.connection.select(TABLE, &query).await
    }

    async fn delete_transaction(&self, id: i64) -> Result<u64, StoreError> {
        self.connection
            .delete(TABLE, &[("id", format!("eq.{id}"))])
            .await
    }
}
