//! HTTP API over the domain services.
//!
//! Error mapping follows the domain taxonomy: validation 400, missing row
//! 404, integrity violation 409, failed store round trip 502. A check-in
//! that finds nobody is a 200 with a `not_found` outcome body — it is a
//! normal answer, not an error.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::{
    CheckIn, CheckInRequest, CheckInResponse, ClassType, CreateTransactionRequest, Employee,
    LedgerDayResponse, LedgerSummary, Member, Plan, SaveMemberRequest, SaveMemberResponse,
    Transaction, TransactionType,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::checkin::CheckInService;
use crate::domain::ledger::{LedgerService, TransactionFilter};
use crate::domain::membership::MemberService;
use crate::domain::DomainError;
use crate::storage::CatalogStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub members: MemberService,
    pub check_ins: CheckInService,
    pub ledger: LedgerService,
    pub catalog: Arc<dyn CatalogStore>,
}

/// Domain error dressed up as an HTTP response.
pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DomainError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            DomainError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            DomainError::Integrity(msg) => (StatusCode::CONFLICT, msg.clone()),
            DomainError::Store(e) => {
                error!("Store round trip failed: {e}");
                (StatusCode::BAD_GATEWAY, "store request failed".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Date-range and type filter accepted by the ledger endpoints.
#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
}

impl From<LedgerQuery> for TransactionFilter {
    fn from(query: LedgerQuery) -> Self {
        TransactionFilter {
            start: query.start_date,
            end: query.end_date,
            kind: query.kind,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/members", get(list_members).post(save_member))
        .route("/api/members/:dni", delete(delete_member))
        .route("/api/members/:dni/renew", post(renew_member))
        .route("/api/plans", get(list_plans))
        .route("/api/employees", get(list_employees))
        .route("/api/classes", get(list_class_types))
        .route("/api/checkins", post(check_in))
        .route("/api/checkins/today", get(today_check_ins))
        .route(
            "/api/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/api/transactions/today", get(today_ledger))
        .route("/api/transactions/summary", get(ledger_summary))
        .route("/api/transactions/:id", delete(delete_transaction))
        .with_state(state)
}

async fn list_members(State(state): State<AppState>) -> Result<Json<Vec<Member>>, ApiError> {
    Ok(Json(state.members.list_members().await?))
}

async fn save_member(
    State(state): State<AppState>,
    Json(request): Json<SaveMemberRequest>,
) -> Result<(StatusCode, Json<SaveMemberResponse>), ApiError> {
    info!("POST /api/members - dni: {}", request.dni);
    let response = state.members.save_member(request).await?;
    let status = if response.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(response)))
}

async fn delete_member(
    State(state): State<AppState>,
    Path(dni): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!("DELETE /api/members/{dni}");
    state.members.delete_member(&dni).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn renew_member(
    State(state): State<AppState>,
    Path(dni): Path<String>,
) -> Result<Json<Member>, ApiError> {
    info!("POST /api/members/{dni}/renew");
    Ok(Json(state.members.renew(&dni).await?))
}

async fn list_plans(State(state): State<AppState>) -> Json<Vec<Plan>> {
    Json(state.members.list_plans().await)
}

async fn list_employees(State(state): State<AppState>) -> Result<Json<Vec<Employee>>, ApiError> {
    let employees = state
        .catalog
        .active_employees()
        .await
        .map_err(DomainError::from)?;
    Ok(Json(employees))
}

async fn list_class_types(State(state): State<AppState>) -> Result<Json<Vec<ClassType>>, ApiError> {
    let classes = state
        .catalog
        .active_class_types()
        .await
        .map_err(DomainError::from)?;
    Ok(Json(classes))
}

async fn check_in(
    State(state): State<AppState>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, ApiError> {
    info!("POST /api/checkins - dni: {}", request.dni);
    Ok(Json(state.check_ins.check_in(&request.dni).await?))
}

async fn today_check_ins(State(state): State<AppState>) -> Result<Json<Vec<CheckIn>>, ApiError> {
    Ok(Json(state.check_ins.today_check_ins().await?))
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let filter = TransactionFilter::from(query);
    Ok(Json(state.ledger.list_transactions(&filter).await?))
}

async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    info!("POST /api/transactions - concept: {}", request.concept);
    let stored = state.ledger.add_transaction(request).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn today_ledger(State(state): State<AppState>) -> Result<Json<LedgerDayResponse>, ApiError> {
    let (transactions, summary) = state.ledger.today().await?;
    Ok(Json(LedgerDayResponse {
        transactions,
        summary,
    }))
}

async fn ledger_summary(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<LedgerSummary>, ApiError> {
    let filter = TransactionFilter::from(query);
    Ok(Json(state.ledger.summary(&filter).await?))
}

async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    info!("DELETE /api/transactions/{id}");
    state.ledger.delete_transaction(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::storage::memory::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router_on(day: NaiveDate) -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::on(day));
        let state = AppState {
            members: MemberService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                clock.clone(),
            ),
            check_ins: CheckInService::new(store.clone(), store.clone(), clock.clone()),
            ledger: LedgerService::new(store.clone(), clock),
            catalog: store.clone(),
        };
        (router(state), store)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn save_request() -> serde_json::Value {
        serde_json::json!({
            "dni": "123",
            "name": "Ana Gomez",
            "membership_type": "mensual",
            "start_date": "2024-01-15"
        })
    }

    #[tokio::test]
    async fn saving_a_new_member_returns_created_with_derived_expiry() {
        let (router, _store) = test_router_on(day());

        let (status, body) = send(&router, post_json("/api/members", save_request())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["created"], true);
        assert_eq!(body["member"]["expiry_date"], "2024-02-14");

        // Saving the same DNI again is an update, not a second registration.
        let (status, body) = send(&router, post_json("/api/members", save_request())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["created"], false);
    }

    #[tokio::test]
    async fn blank_dni_is_a_bad_request() {
        let (router, _store) = test_router_on(day());
        let mut request = save_request();
        request["dni"] = serde_json::json!("   ");

        let (status, body) = send(&router, post_json("/api/members", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "dni is required");
    }

    #[tokio::test]
    async fn check_in_for_unknown_member_is_a_normal_negative_answer() {
        let (router, _store) = test_router_on(day());

        let (status, body) = send(
            &router,
            post_json("/api/checkins", serde_json::json!({ "dni": "999" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "not_found");
    }

    #[tokio::test]
    async fn check_in_against_duplicated_dni_is_a_conflict() {
        let (router, store) = test_router_on(day());
        store.insert_duplicate_member("123", "Ana Gomez");
        store.insert_duplicate_member("123", "Ana G.");

        let (status, _body) = send(
            &router,
            post_json("/api/checkins", serde_json::json!({ "dni": "123" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn check_in_after_registration_reports_active_and_logs_it() {
        let (router, store) = test_router_on(day());
        send(&router, post_json("/api/members", save_request())).await;

        let (status, body) = send(
            &router,
            post_json("/api/checkins", serde_json::json!({ "dni": "123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "found");
        assert_eq!(body["status"]["state"], "active");
        assert_eq!(store.check_ins().len(), 1);

        let (status, body) = send(
            &router,
            Request::get("/api/checkins/today")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn registration_income_shows_up_in_the_day_summary() {
        let (router, _store) = test_router_on(day());
        send(&router, post_json("/api/members", save_request())).await;
        send(
            &router,
            post_json(
                "/api/transactions",
                serde_json::json!({
                    "type": "expense",
                    "amount": 40.0,
                    "concept": "Water refill"
                }),
            ),
        )
        .await;

        let (status, body) = send(
            &router,
            Request::get("/api/transactions/today")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["income"], 15000.0);
        assert_eq!(body["summary"]["expense"], 40.0);
        assert_eq!(body["summary"]["balance"], 14960.0);
        assert_eq!(body["summary"]["count"], 2);
    }

    #[tokio::test]
    async fn ledger_summary_honours_type_filter() {
        let (router, _store) = test_router_on(day());
        for (kind, amount) in [("income", 100.0), ("expense", 40.0), ("income", 25.0)] {
            send(
                &router,
                post_json(
                    "/api/transactions",
                    serde_json::json!({ "type": kind, "amount": amount, "concept": "x" }),
                ),
            )
            .await;
        }

        let (status, body) = send(
            &router,
            Request::get("/api/transactions/summary?type=income")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["income"], 125.0);
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn deleting_a_missing_transaction_is_not_found() {
        let (router, _store) = test_router_on(day());
        let (status, _body) = send(
            &router,
            Request::delete("/api/transactions/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn plans_endpoint_serves_the_default_catalog_when_unconfigured() {
        let (router, _store) = test_router_on(day());
        let (status, body) = send(
            &router,
            Request::get("/api/plans").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let plans = body.as_array().unwrap();
        assert_eq!(plans.len(), 4);
        assert_eq!(plans[0]["key"], "mensual");
        assert_eq!(plans[3]["duration_days"], 365);
    }

    #[tokio::test]
    async fn renewing_an_unknown_member_is_not_found() {
        let (router, _store) = test_router_on(day());
        let (status, _body) = send(
            &router,
            Request::post("/api/members/999/renew")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
