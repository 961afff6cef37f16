//! Membership rules: plan catalog, expiry arithmetic, registration and
//! renewal.
//!
//! Expiry is a pure function of (start date, plan): start plus the plan's
//! fixed day count. All arithmetic is on calendar dates, so results cannot
//! drift with the time of day or the timezone of the machine running the
//! service.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Timelike};
use shared::{
    Member, MembershipStatus, Plan, SaveMemberRequest, SaveMemberResponse, Transaction,
    TransactionType,
};
use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::errors::DomainError;
use crate::storage::{CatalogStore, MemberStore, TransactionStore};

/// Plan used when a member references a key the catalog does not know.
pub const DEFAULT_PLAN_KEY: &str = "mensual";

/// Memberships within this many days of expiry (inclusive) are "expiring
/// soon"; zero days left means it expires today and still counts as soon.
pub const EXPIRES_SOON_WINDOW_DAYS: i64 = 7;

/// The built-in plan catalog, used when the store has no active plans
/// configured. Prices are in the gym's local currency.
pub fn default_catalog() -> Vec<Plan> {
    [
        ("mensual", "Mensual", 30, 15000.0),
        ("trimestral", "Trimestral", 90, 40000.0),
        ("semestral", "Semestral", 180, 75000.0),
        ("anual", "Anual", 365, 140000.0),
    ]
    .into_iter()
    .map(|(key, name, duration_days, price)| Plan {
        id: None,
        key: key.to_string(),
        name: name.to_string(),
        duration_days,
        price,
        is_active: true,
    })
    .collect()
}

/// The unified plan catalog. One source of truth for duration and price;
/// members reference plans by stable key only.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    /// Build a catalog from the store's active plans, falling back to the
    /// built-in defaults when none are configured.
    pub fn from_store(plans: Vec<Plan>) -> Self {
        if plans.is_empty() {
            Self {
                plans: default_catalog(),
            }
        } else {
            Self { plans }
        }
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn resolve(&self, key: &str) -> Option<&Plan> {
        let key = key.trim();
        self.plans.iter().find(|p| p.key.eq_ignore_ascii_case(key))
    }

    /// Resolve a plan key, logging a warning and substituting the 30-day
    /// default plan when the key is unknown.
    pub fn resolve_or_default(&self, key: &str) -> Plan {
        if let Some(plan) = self.resolve(key) {
            return plan.clone();
        }
        warn!("Unknown plan key {key:?}, falling back to the {DEFAULT_PLAN_KEY} default");
        self.resolve(DEFAULT_PLAN_KEY)
            .cloned()
            .unwrap_or_else(|| default_catalog().swap_remove(0))
    }
}

/// Expiry date for a membership starting on `start`: the start date plus
/// the plan's day count. Always strictly after `start`.
pub fn calculate_expiry_date(start: NaiveDate, plan: &Plan) -> NaiveDate {
    start + Duration::days(plan.duration_days.max(1))
}

/// Status bucket for a membership expiring on `expiry`, seen from `today`.
pub fn membership_status(today: NaiveDate, expiry: NaiveDate) -> MembershipStatus {
    let days_left = (expiry - today).num_days();
    if days_left < 0 {
        MembershipStatus::Expired {
            days_overdue: -days_left,
        }
    } else if days_left <= EXPIRES_SOON_WINDOW_DAYS {
        MembershipStatus::ExpiresSoon { days_left }
    } else {
        MembershipStatus::Active { days_left }
    }
}

/// Service for the member registry: registration, renewal, deletion.
#[derive(Clone)]
pub struct MemberService {
    members: Arc<dyn MemberStore>,
    transactions: Arc<dyn TransactionStore>,
    catalog: Arc<dyn CatalogStore>,
    clock: Arc<dyn Clock>,
}

impl MemberService {
    pub fn new(
        members: Arc<dyn MemberStore>,
        transactions: Arc<dyn TransactionStore>,
        catalog: Arc<dyn CatalogStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            members,
            transactions,
            catalog,
            clock,
        }
    }

    /// The current plan catalog. A failed catalog fetch degrades to the
    /// built-in defaults so the front desk keeps working.
    pub async fn plan_catalog(&self) -> PlanCatalog {
        match self.catalog.active_plans().await {
            Ok(plans) => PlanCatalog::from_store(plans),
            Err(e) => {
                warn!("Could not load plans from the store, using built-in catalog: {e}");
                PlanCatalog::from_store(Vec::new())
            }
        }
    }

    pub async fn list_plans(&self) -> Vec<Plan> {
        self.plan_catalog().await.plans().to_vec()
    }

    /// All members, newest registration first (store order).
    pub async fn list_members(&self) -> Result<Vec<Member>, DomainError> {
        Ok(self.members.list_members().await?)
    }

    /// Register a new member or update an existing one, matched by DNI.
    ///
    /// The expiry date is always recomputed from the request's start date
    /// and plan. A brand-new registration also records the plan price as
    /// income in the ledger; an update does not.
    pub async fn save_member(
        &self,
        request: SaveMemberRequest,
    ) -> Result<SaveMemberResponse, DomainError> {
        let dni = request.dni.trim().to_string();
        if dni.is_empty() {
            return Err(DomainError::Validation("dni is required".to_string()));
        }
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation("name is required".to_string()));
        }
        if request.membership_type.trim().is_empty() {
            return Err(DomainError::Validation(
                "membership plan is required".to_string(),
            ));
        }

        let catalog = self.plan_catalog().await;
        let plan = catalog.resolve_or_default(&request.membership_type);
        let expiry_date = calculate_expiry_date(request.start_date, &plan);

        let phone = request
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let record = Member {
            id: None,
            dni: dni.clone(),
            name: name.clone(),
            phone,
            membership_type: plan.key.clone(),
            start_date: request.start_date,
            expiry_date,
            created_at: None,
            updated_at: None,
        };

        let existing = self.members.find_by_dni(&dni).await?;
        if existing.is_empty() {
            let stored = self.members.insert_member(&record).await?;
            info!("Registered member {name} (dni {dni}) on plan {}", plan.key);
            self.record_membership_income(
                format!("Membership {} - {}", plan.name, name),
                plan.price,
            )
            .await;
            Ok(SaveMemberResponse {
                member: stored,
                created: true,
            })
        } else {
            if existing.len() > 1 {
                warn!(
                    "{} member rows share dni {dni}; updating all of them",
                    existing.len()
                );
            }
            let stored = self.members.update_by_dni(&dni, &record).await?;
            info!("Updated member {name} (dni {dni})");
            Ok(SaveMemberResponse {
                member: stored,
                created: false,
            })
        }
    }

    /// Renew a membership: start date becomes today, expiry is recomputed
    /// from the member's current plan, and the plan price is recorded as
    /// income. Recomputing from today makes renewal idempotent with respect
    /// to the previous expiry.
    pub async fn renew(&self, dni: &str) -> Result<Member, DomainError> {
        let dni = dni.trim();
        let mut rows = self.members.find_by_dni(dni).await?;
        let member = match rows.len() {
            0 => {
                return Err(DomainError::NotFound(format!("no member with dni {dni}")));
            }
            1 => rows.remove(0),
            n => {
                return Err(DomainError::Integrity(format!(
                    "{n} member rows share dni {dni}"
                )));
            }
        };

        let catalog = self.plan_catalog().await;
        let plan = catalog.resolve_or_default(&member.membership_type);
        let today = self.clock.today();
        let updated = Member {
            start_date: today,
            expiry_date: calculate_expiry_date(today, &plan),
            ..member
        };

        let stored = self.members.update_by_dni(dni, &updated).await?;
        info!(
            "Renewed {} (dni {dni}) until {}",
            stored.name, stored.expiry_date
        );
        self.record_membership_income(
            format!("Renewal {} - {}", plan.name, stored.name),
            plan.price,
        )
        .await;
        Ok(stored)
    }

    /// Hard-delete a member row.
    pub async fn delete_member(&self, dni: &str) -> Result<(), DomainError> {
        let deleted = self.members.delete_by_dni(dni.trim()).await?;
        if deleted == 0 {
            return Err(DomainError::NotFound(format!("no member with dni {dni}")));
        }
        info!("Deleted member with dni {dni}");
        Ok(())
    }

    /// Record a membership payment in the ledger. A failed insert is logged
    /// and swallowed: the membership change already happened and must not
    /// be rolled back over a bookkeeping miss.
    async fn record_membership_income(&self, concept: String, amount: f64) {
        let time = self.clock.now_time();
        let entry = Transaction {
            id: None,
            kind: TransactionType::Income,
            amount,
            concept,
            date: self.clock.today(),
            time: time
                .with_second(0)
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(time),
            created_at: None,
        };
        if let Err(e) = self.transactions.insert_transaction(&entry).await {
            warn!("Could not record membership income {:?}: {e}", entry.concept);
        }
    }
}
