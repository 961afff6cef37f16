//! In-memory storage backend used by the tests.
//!
//! Implements the same traits as the remote backend over plain `Vec`s, so
//! domain and router tests run without a network. Row ids are assigned from
//! a counter the way the store's identity columns would.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use shared::{CheckIn, ClassType, Employee, Member, Plan, Transaction};

use super::{CatalogStore, CheckInStore, MemberStore, StoreError, TransactionStore};
use crate::domain::ledger::TransactionFilter;

#[derive(Default)]
struct Tables {
    members: Vec<Member>,
    transactions: Vec<Transaction>,
    check_ins: Vec<CheckIn>,
    plans: Vec<Plan>,
    employees: Vec<Employee>,
    class_types: Vec<ClassType>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_check_in_appends: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_plans(&self, plans: Vec<Plan>) {
        self.tables.lock().unwrap().plans = plans;
    }

    pub fn set_employees(&self, employees: Vec<Employee>) {
        self.tables.lock().unwrap().employees = employees;
    }

    pub fn set_class_types(&self, class_types: Vec<ClassType>) {
        self.tables.lock().unwrap().class_types = class_types;
    }

    /// Make every check-in append fail, to exercise the "log and keep the
    /// lookup result" path.
    pub fn fail_check_in_appends(&self) {
        self.fail_check_in_appends.store(true, Ordering::SeqCst);
    }

    /// Push a raw member row without going through the upsert, to seed the
    /// duplicate-DNI defect the domain must refuse.
    pub fn insert_duplicate_member(&self, dni: &str, name: &str) {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        tables.members.push(Member {
            id: Some(id),
            dni: dni.to_string(),
            name: name.to_string(),
            phone: None,
            membership_type: "mensual".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            created_at: None,
            updated_at: None,
        });
    }

    pub fn members(&self) -> Vec<Member> {
        self.tables.lock().unwrap().members.clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.tables.lock().unwrap().transactions.clone()
    }

    pub fn check_ins(&self) -> Vec<CheckIn> {
        self.tables.lock().unwrap().check_ins.clone()
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        // Newest registration first, like the store's created_at ordering.
        let mut members = self.tables.lock().unwrap().members.clone();
        members.reverse();
        Ok(members)
    }

    async fn find_by_dni(&self, dni: &str) -> Result<Vec<Member>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .members
            .iter()
            .filter(|m| m.dni == dni)
            .cloned()
            .collect())
    }

    async fn insert_member(&self, member: &Member) -> Result<Member, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let mut stored = member.clone();
        stored.id = Some(tables.next_id());
        tables.members.push(stored.clone());
        Ok(stored)
    }

    async fn update_by_dni(&self, dni: &str, member: &Member) -> Result<Member, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let mut updated = None;
        for row in tables.members.iter_mut().filter(|m| m.dni == dni) {
            let id = row.id;
            *row = member.clone();
            row.id = id;
            updated = Some(row.clone());
        }
        updated.ok_or_else(|| StoreError::Status {
            status: 404,
            body: format!("no member row with dni {dni}"),
        })
    }

    async fn delete_by_dni(&self, dni: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.members.len();
        tables.members.retain(|m| m.dni != dni);
        Ok((before - tables.members.len()) as u64)
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn insert_transaction(&self, tx: &Transaction) -> Result<Transaction, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let mut stored = tx.clone();
        stored.id = Some(tables.next_id());
        tables.transactions.push(stored.clone());
        Ok(stored)
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .transactions
            .iter()
            .filter(|tx| filter.matches(tx))
            .cloned()
            .collect())
    }

    async fn delete_transaction(&self, id: i64) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.transactions.len();
        tables.transactions.retain(|tx| tx.id != Some(id));
        Ok((before - tables.transactions.len()) as u64)
    }
}

#[async_trait]
impl CheckInStore for MemoryStore {
    async fn append_check_in(&self, check_in: &CheckIn) -> Result<CheckIn, StoreError> {
        if self.fail_check_in_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: 500,
                body: "checkins table unavailable".to_string(),
            });
        }
        let mut tables = self.tables.lock().unwrap();
        let mut stored = check_in.clone();
        stored.id = Some(tables.next_id());
        tables.check_ins.push(stored.clone());
        Ok(stored)
    }

    async fn list_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CheckIn>, StoreError> {
        let mut rows: Vec<CheckIn> = self
            .tables
            .lock()
            .unwrap()
            .check_ins
            .iter()
            .filter(|c| {
                let t = c.check_in_time.naive_utc();
                t >= start && t <= end
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.check_in_time.cmp(&a.check_in_time));
        Ok(rows)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn active_plans(&self) -> Result<Vec<Plan>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .plans
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }

    async fn active_employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .employees
            .iter()
            .filter(|e| e.is_active)
            .cloned()
            .collect())
    }

    async fn active_class_types(&self) -> Result<Vec<ClassType>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .class_types
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect())
    }
}
