//! Front-desk check-in: member lookup, status snapshot, append-only log.

use std::sync::Arc;

use chrono::{Duration, NaiveTime};
use shared::{CheckIn, CheckInOutcome, CheckInResponse};
use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::errors::DomainError;
use crate::domain::membership::membership_status;
use crate::storage::{CheckInStore, MemberStore};

/// Service for front-desk lookups.
#[derive(Clone)]
pub struct CheckInService {
    members: Arc<dyn MemberStore>,
    check_ins: Arc<dyn CheckInStore>,
    clock: Arc<dyn Clock>,
}

impl CheckInService {
    pub fn new(
        members: Arc<dyn MemberStore>,
        check_ins: Arc<dyn CheckInStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            members,
            check_ins,
            clock,
        }
    }

    /// Look up a member by DNI and record the visit.
    ///
    /// An unknown DNI is a normal negative outcome. Two or more rows
    /// sharing the DNI is a data integrity error: the registry promises
    /// uniqueness, and silently picking the first row would hide real
    /// drift between duplicates. The appended log row snapshots the status
    /// text as of this lookup; if the append itself fails the lookup
    /// result is still returned, since the front desk needs the answer
    /// more than the log needs the row.
    pub async fn check_in(&self, dni: &str) -> Result<CheckInResponse, DomainError> {
        let dni = dni.trim();
        if dni.is_empty() {
            return Err(DomainError::Validation("dni is required".to_string()));
        }

        let mut rows = self.members.find_by_dni(dni).await?;
        let member = match rows.len() {
            0 => {
                info!("Check-in for unknown dni {dni}");
                return Ok(CheckInResponse {
                    outcome: CheckInOutcome::NotFound,
                });
            }
            1 => rows.remove(0),
            n => {
                return Err(DomainError::Integrity(format!(
                    "{n} member rows share dni {dni}"
                )));
            }
        };

        let today = self.clock.today();
        let status = membership_status(today, member.expiry_date);
        let days_until_expiry = (member.expiry_date - today).num_days();
        info!(
            "Check-in: {} (dni {dni}) is {} ({days_until_expiry} days to expiry)",
            member.name,
            status.label()
        );

        let record = CheckIn {
            id: None,
            member_dni: member.dni.clone(),
            member_name: member.name.clone(),
            check_in_time: self.clock.now_utc(),
            membership_status: status.label().to_string(),
            created_at: None,
        };
        if let Err(e) = self.check_ins.append_check_in(&record).await {
            warn!("Could not append check-in for dni {dni}: {e}");
        }

        Ok(CheckInResponse {
            outcome: CheckInOutcome::Found {
                member,
                status,
                days_until_expiry,
            },
        })
    }

    /// Today's check-in log, newest first.
    pub async fn today_check_ins(&self) -> Result<Vec<CheckIn>, DomainError> {
        let today = self.clock.today();
        let start = today.and_time(NaiveTime::MIN);
        let end = start + Duration::hours(24) - Duration::seconds(1);
        Ok(self.check_ins.list_between(start, end).await?)
    }
}
