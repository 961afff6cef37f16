use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gym_desk_backend::config::Config;
use gym_desk_backend::domain::checkin::CheckInService;
use gym_desk_backend::domain::clock::SystemClock;
use gym_desk_backend::domain::ledger::LedgerService;
use gym_desk_backend::domain::membership::MemberService;
use gym_desk_backend::rest::{self, AppState};
use gym_desk_backend::storage::remote::{
    CatalogRepository, CheckInRepository, MemberRepository, RemoteConnection,
    TransactionRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    info!("Connecting to table store at {}", config.store_url);
    let connection = Arc::new(RemoteConnection::new(&config)?);

    let members = Arc::new(MemberRepository::new(connection.clone()));
    let transactions = Arc::new(TransactionRepository::new(connection.clone()));
    let check_ins = Arc::new(CheckInRepository::new(connection.clone()));
    let catalog = Arc::new(CatalogRepository::new(connection));
    let clock = Arc::new(SystemClock);

    let state = AppState {
        members: MemberService::new(
            members.clone(),
            transactions.clone(),
            catalog.clone(),
            clock.clone(),
        ),
        check_ins: CheckInService::new(members, check_ins, clock.clone()),
        ledger: LedgerService::new(transactions, clock),
        catalog,
    };

    // CORS so the dashboard frontend can talk to us from its own origin.
    let cors = CorsLayer::new()
        .allow_origin(config.dashboard_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = rest::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
