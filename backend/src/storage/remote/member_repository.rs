//! `members` table access.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use shared::Member;

use super::RemoteConnection;
use crate::storage::{MemberStore, StoreError};

const TABLE: &str = "members";

#[derive(Clone)]
pub struct MemberRepository {
    connection: Arc<RemoteConnection>,
}

impl MemberRepository {
    pub fn new(connection: Arc<RemoteConnection>) -> Self {
        Self { connection }
    }
}

/// Wire payload for inserts and updates: the writable columns only. Id and
/// timestamps belong to the store.
#[derive(Serialize)]
struct MemberRow<'a> {
    dni: &'a str,
    name: &'a str,
    phone: Option<&'a str>,
    membership_type: &'a str,
    start_date: NaiveDate,
    expiry_date: NaiveDate,
}

impl<'a> From<&'a Member> for MemberRow<'a> {
    fn from(member: &'a Member) -> Self {
        Self {
            dni: &member.dni,
            name: &member.name,
            phone: member.phone.as_deref(),
            membership_type: &member.membership_type,
            start_date: member.start_date,
            expiry_date: member.expiry_date,
        }
    }
}

#[async_trait]
impl MemberStore for MemberRepository {
    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        self.connection
            .select(
                TABLE,
                &[
                    ("select", "*".to_string()),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    async fn find_by_dni(&self, dni: &str) -> Result<Vec<Member>, StoreError> {
        self.connection
            .select(
                TABLE,
                &[("select", "*".to_string()), ("dni", format!("eq.{dni}"))],
            )
            .await
    }

    async fn insert_member(&self, member: &Member) -> Result<Member, StoreError> {
        self.connection
            .insert(TABLE, &MemberRow::from(member))
            .await
    }

    async fn update_by_dni(&self, dni: &str, member: &Member) -> Result<Member, StoreError> {
        let rows: Vec<Member> = self
            .connection
            .update(TABLE, &[("dni", format!("eq.{dni}"))], &MemberRow::from(member))
            .await?;
        rows.into_iter().next().ok_or(StoreError::Status {
            status: 404,
            body: format!("no member row with dni {dni}"),
        })
    }

    async fn delete_by_dni(&self, dni: &str) -> Result<u64, StoreError> {
        self.connection
            .delete(TABLE, &[("dni", format!("eq.{dni}"))])
            .await
    }
}
