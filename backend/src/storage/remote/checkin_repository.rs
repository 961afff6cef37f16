//! `checkins` table access (append-only).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use shared::CheckIn;

use super::RemoteConnection;
use crate::storage::{CheckInStore, StoreError};

const TABLE: &str = "checkins";

#[derive(Clone)]
pub struct CheckInRepository {
    connection: Arc<RemoteConnection>,
}

impl CheckInRepository {
    pub fn new(connection: Arc<RemoteConnection>) -> Self {
        Self { connection }
    }
}

#[derive(Serialize)]
struct CheckInRow<'a> {
    member_dni: &'a str,
    member_name: &'a str,
    check_in_time: DateTime<Utc>,
    membership_status: &'a str,
}

#[async_trait]
impl CheckInStore for CheckInRepository {
    async fn append_check_in(&self, check_in: &CheckIn) -> Result<CheckIn, StoreError> {
        let row = CheckInRow {
            member_dni: &check_in.member_dni,
            member_name: &check_in.member_name,
            check_in_time: check_in.check_in_time,
            membership_status: &check_in.membership_status,
        };
        self.connection.insert(TABLE, &row).await
    }

    async fn list_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CheckIn>, StoreError> {
        let fmt = "%Y-%m-%dT%H:%M:%S";
        self.connection
            .select(
                TABLE,
                &[
                    ("select", "*".to_string()),
                    ("check_in_time", format!("gte.{}", start.format(fmt))),
                    ("check_in_time", format!("lte.{}", end.format(fmt))),
                    ("order", "check_in_time.desc".to_string()),
                ],
            )
            .await
    }
}
