use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered gym member.
///
/// Members are keyed by DNI (national identity number), which is unique in
/// the store. `expiry_date` is always derived: start date plus the duration
/// of the referenced plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Row id assigned by the store; absent until the row is persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// National identity number, unique per member.
    pub dni: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Stable key of the plan this member is on (see [`Plan::key`]).
    pub membership_type: String,
    /// First day the current membership period is valid.
    pub start_date: NaiveDate,
    /// Last day the current membership period is valid (inclusive).
    pub expiry_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Where a membership stands relative to a given calendar day.
///
/// `days_left` counts whole calendar days from today to the expiry date;
/// expiring today is "soon" (zero days left), one day past is expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MembershipStatus {
    Active { days_left: i64 },
    ExpiresSoon { days_left: i64 },
    Expired { days_overdue: i64 },
}

impl MembershipStatus {
    /// Short text used for the check-in log snapshot and status badges.
    pub fn label(&self) -> &'static str {
        match self {
            MembershipStatus::Active { .. } => "Active",
            MembershipStatus::ExpiresSoon { .. } => "Expires soon",
            MembershipStatus::Expired { .. } => "Expired",
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, MembershipStatus::Expired { .. })
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A membership plan: a named offering with a price and a duration in days.
///
/// Plans live in the `membership_types` table and are referenced from
/// members by their stable `key`. Retired plans are soft-deleted via
/// `is_active` and never returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Store-assigned id; absent for the built-in fallback catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Stable lowercase key, e.g. "mensual" or "anual".
    pub key: String,
    /// Display name, e.g. "Mensual".
    pub name: String,
    /// Membership duration as a fixed day count.
    pub duration_days: i64,
    /// Price charged on registration and on every renewal.
    pub price: f64,
    pub is_active: bool,
}

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

/// A single petty-cash ledger entry. Entries are never edited; a mistaken
/// entry is deleted and re-created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Always positive; the sign is carried by `kind`.
    pub amount: f64,
    /// Free-text description, e.g. "Membership Mensual - Ana Gomez".
    pub concept: String,
    pub date: NaiveDate,
    /// Wall-clock time of day, stored as zero-padded HH:MM.
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One front-desk lookup event. The log is append-only: rows are never
/// updated or deleted by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub member_dni: String,
    pub member_name: String,
    pub check_in_time: DateTime<Utc>,
    /// Point-in-time snapshot of the membership status text at lookup.
    pub membership_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Staff lookup row, maintained outside this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub email: String,
    pub salary: f64,
    pub hire_date: NaiveDate,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Class offering lookup row, maintained outside this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub duration_minutes: i64,
    pub price: f64,
    pub max_participants: i64,
    pub requires_trainer: bool,
    pub is_active: bool,
}

/// Request to register a new member or update an existing one (matched by
/// DNI). `start_date` is the first day of the membership period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveMemberRequest {
    pub dni: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Plan key; unknown keys fall back to the 30-day default plan.
    pub membership_type: String,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveMemberResponse {
    pub member: Member,
    /// True when a new row was inserted, false when an existing member was
    /// updated in place.
    pub created: bool,
}

/// Request to record a front-desk check-in by DNI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub dni: String,
}

/// Result of a front-desk lookup. "No such member" is a normal negative
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckInOutcome {
    Found {
        member: Member,
        status: MembershipStatus,
        days_until_expiry: i64,
    },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInResponse {
    #[serde(flatten)]
    pub outcome: CheckInOutcome,
}

/// Request to add a ledger entry. Date and time default to "now" when
/// omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Must be strictly positive.
    pub amount: f64,
    pub concept: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(with = "hhmm_opt", default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
}

/// Today's ledger entries together with their totals, fetched in one call
/// so the dashboard never shows a list and a summary from different
/// snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerDayResponse {
    pub transactions: Vec<Transaction>,
    pub summary: LedgerSummary,
}

/// Totals over a filtered slice of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub income: f64,
    pub expense: f64,
    /// income - expense
    pub balance: f64,
    pub count: usize,
}

/// Serde adapter for times stored as zero-padded "HH:MM" strings.
///
/// The fixed width matters: the store sorts these lexicographically, and
/// zero-padding is what makes that ordering chronological.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        // Accept HH:MM:SS too; some store columns carry seconds.
        NaiveTime::parse_from_str(&s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&s, FORMAT))
            .map_err(serde::de::Error::custom)
    }
}

/// Optional-field variant of [`hhmm`].
pub mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => super::hhmm::serialize(t, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        match s {
            Some(s) => NaiveTime::parse_from_str(&s, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M"))
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn transaction_time_round_trips_as_hhmm() {
        let tx = Transaction {
            id: None,
            kind: TransactionType::Income,
            amount: 15000.0,
            concept: "Membership Mensual - Ana Gomez".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            time: NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
            created_at: None,
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["time"], "09:05");
        assert_eq!(json["type"], "income");

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn transaction_time_accepts_seconds_from_store() {
        let json = serde_json::json!({
            "id": 7,
            "type": "expense",
            "amount": 500.0,
            "concept": "Cleaning supplies",
            "date": "2024-03-02",
            "time": "18:30:45"
        });
        let tx: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.time, NaiveTime::from_hms_opt(18, 30, 45).unwrap());
    }

    #[test]
    fn check_in_outcome_tags_not_found() {
        let response = CheckInResponse {
            outcome: CheckInOutcome::NotFound,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["outcome"], "not_found");
    }

    #[test]
    fn membership_status_labels() {
        assert_eq!(MembershipStatus::Active { days_left: 20 }.label(), "Active");
        assert_eq!(
            MembershipStatus::ExpiresSoon { days_left: 0 }.label(),
            "Expires soon"
        );
        assert!(MembershipStatus::Expired { days_overdue: 3 }.is_expired());
    }
}
