//! Read-only access to the admin-configured lookup tables.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shared::{ClassType, Employee, Plan};

use super::RemoteConnection;
use crate::storage::{CatalogStore, StoreError};

#[derive(Clone)]
pub struct CatalogRepository {
    connection: Arc<RemoteConnection>,
}

impl CatalogRepository {
    pub fn new(connection: Arc<RemoteConnection>) -> Self {
        Self { connection }
    }

    /// Active rows of a lookup table, oldest first so the admin's ordering
    /// is stable in the UI.
    async fn active_rows<R: DeserializeOwned>(&self, table: &str) -> Result<Vec<R>, StoreError> {
        self.connection
            .select(
                table,
                &[
                    ("select", "*".to_string()),
                    ("is_active", "eq.true".to_string()),
                    ("order", "created_at.asc".to_string()),
                ],
            )
            .await
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn active_plans(&self) -> Result<Vec<Plan>, StoreError> {
        self.active_rows("membership_types").await
    }

    async fn active_employees(&self) -> Result<Vec<Employee>, StoreError> {
        self.active_rows("employees").await
    }

    async fn active_class_types(&self) -> Result<Vec<ClassType>, StoreError> {
        self.active_rows("class_types").await
    }
}
