use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::tracker::{AatTracker, FixSlot, LogActuator, LogDisplay, Millis, TrackerStatus};

use super::api::gps as gps_handlers;
use super::api::tracker as tracker_handlers;
use super::api_doc::ApiDoc;
use super::auth::AppState;

const CONTROL_TICK: Duration = Duration::from_millis(20);

/// Free-running millisecond counter, truncated so it wraps like a
/// microcontroller tick counter would.
fn millis_since(start: Instant) -> Millis {
    Millis(start.elapsed().as_millis() as u32)
}

/// Owns the tracker and polls it at a fixed cadence, publishing a status
/// snapshot after every tick.
async fn run_control_loop(
    mut tracker: AatTracker,
    slot: FixSlot,
    status: Arc<RwLock<TrackerStatus>>,
    start: Instant,
) {
    let mut ticker = interval(CONTROL_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut mode = tracker.mode();

    loop {
        ticker.tick().await;
        let now = millis_since(start);
        let next = tracker.tick(now, &slot);
        if next != mode {
            log::info!("Tracker mode {} -> {}", mode, next);
            mode = next;
        }
        *status.write().await = tracker.status(now);
    }
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let start = Instant::now();

    let tracker = AatTracker::new(
        &config.tracker,
        Box::new(LogActuator),
        Box::new(LogDisplay),
        millis_since(start),
    );
    let slot = FixSlot::new();
    let status = Arc::new(RwLock::new(tracker.status(millis_since(start))));

    tokio::spawn(run_control_loop(
        tracker,
        slot.clone(),
        status.clone(),
        start,
    ));

    if config.api_keys.is_empty() {
        log::warn!("No API keys configured, every API request will be rejected");
    }

    let state = AppState {
        config: Arc::new(config),
        slot,
        status,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // GPS ingest
        .route("/api/gps", post(gps_handlers::ingest))
        .route("/api/gps/raw", post(gps_handlers::ingest_raw))
        // Tracker API endpoints
        .route("/api/tracker/mode", get(tracker_handlers::mode))
        .route("/api/tracker/status", get(tracker_handlers::status))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
