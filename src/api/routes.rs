use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::health::HealthState;
use crate::api::latency::{LatencySnapshot, LatencyStats};
use crate::error::{AppError, Result};
use crate::league::League;
use crate::render::{render_page, Flash, FormView, Scoreboard};
use crate::render::page::format_money;
use crate::store::{RecordCache, RecordStore};
use crate::submit::{SaleForm, SaleSubmission, SubmissionHandler, SubmitRequest};
use crate::types::SaleRecord;

pub struct ApiState<S> {
    pub league: Arc<League>,
    pub store: Arc<S>,
    pub cache: Arc<RecordCache>,
    pub submitter: SubmissionHandler<S>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
    pub admin_password: Option<Arc<str>>,
}

impl<S> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            league: Arc::clone(&self.league),
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            submitter: self.submitter.clone(),
            health: Arc::clone(&self.health),
            latency: Arc::clone(&self.latency),
            admin_password: self.admin_password.clone(),
        }
    }
}

impl<S: RecordStore> ApiState<S> {
    pub fn new(
        league: Arc<League>,
        store: Arc<S>,
        cache: Arc<RecordCache>,
        admin_password: Option<String>,
    ) -> Self {
        let submitter = SubmissionHandler::new(
            Arc::clone(&league),
            Arc::clone(&store),
            Arc::clone(&cache),
        );
        Self {
            league,
            store,
            cache,
            submitter,
            health: Arc::new(HealthState::new()),
            latency: Arc::new(LatencyStats::new()),
            admin_password: admin_password.map(Arc::from),
        }
    }

    /// Load (through the cache) and aggregate. Never fails: a backend error
    /// yields an empty board carrying a notice.
    async fn scoreboard(&self) -> Scoreboard {
        let snapshot = self.cache.load(self.store.as_ref()).await;
        if !snapshot.from_cache {
            self.health
                .record_load(!snapshot.load_failed(), snapshot.records.len());
        }
        Scoreboard::build(&self.league, &snapshot.records, snapshot.notice)
    }

    fn form_view(&self) -> FormView<'_> {
        FormView {
            league: &self.league,
            gated: self.admin_password.is_some(),
        }
    }

    async fn render(&self, flash: Option<Flash>) -> String {
        let started = Instant::now();
        let board = self.scoreboard().await;
        let html = render_page(&board, &self.form_view(), flash.as_ref());
        self.latency.record(started.elapsed());
        html
    }
}

pub fn router<S: RecordStore>(state: ApiState<S>) -> Router {
    Router::new()
        .route("/", get(index::<S>))
        .route("/sales", post(submit_sale_form::<S>))
        .route("/api/scoreboard", get(get_scoreboard::<S>))
        .route("/api/sales", post(post_sale::<S>))
        .route("/health", get(get_health::<S>))
        .route("/stats/latency", get(get_stats_latency::<S>))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub backend: String,
    pub last_load_ok: bool,
    pub records_loaded: u64,
    pub appends_total: u64,
    pub append_failures: u64,
    pub last_append_at_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index<S: RecordStore>(State(state): State<ApiState<S>>) -> Html<String> {
    Html(state.render(None).await)
}

/// Form post from the page. Always answers with the full page; the outcome is
/// shown inline and reflected in the status code.
async fn submit_sale_form<S: RecordStore>(
    State(state): State<ApiState<S>>,
    Form(form): Form<SaleForm>,
) -> Response {
    let request = form.into_request(state.admin_password.as_deref());
    let (status, flash) = match record_sale(&state, request).await {
        Ok(record) => (
            StatusCode::OK,
            Flash::Success(format!(
                "Sale recorded for {} ({}) - {} runs, {}",
                record.player,
                record.category,
                record.score,
                format_money(record.amount)
            )),
        ),
        Err(e) => (e.status(), Flash::Error(format!("Sale was not saved: {e}"))),
    };
    (status, Html(state.render(Some(flash)).await)).into_response()
}

async fn get_scoreboard<S: RecordStore>(State(state): State<ApiState<S>>) -> Json<Scoreboard> {
    let started = Instant::now();
    let board = state.scoreboard().await;
    state.latency.record(started.elapsed());
    Json(board)
}

async fn post_sale<S: RecordStore>(
    State(state): State<ApiState<S>>,
    Json(body): Json<SaleSubmission>,
) -> Result<(StatusCode, Json<SaleRecord>)> {
    let request = body.into_request(state.admin_password.as_deref());
    let record = record_sale(&state, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_health<S: RecordStore>(State(state): State<ApiState<S>>) -> Json<HealthResponse> {
    let last_append = state.health.last_append_at_secs();
    Json(HealthResponse {
        backend: state.store.kind().to_string(),
        last_load_ok: state.health.last_load_ok(),
        records_loaded: state.health.records_loaded(),
        appends_total: state.health.appends_total(),
        append_failures: state.health.append_failures(),
        last_append_at_secs: (last_append > 0).then_some(last_append),
    })
}

async fn get_stats_latency<S: RecordStore>(
    State(state): State<ApiState<S>>,
) -> Json<LatencySnapshot> {
    Json(state.latency.snapshot())
}

/// Shared tail of both submission routes: append through the handler and
/// keep the health counters in step.
async fn record_sale<S: RecordStore>(
    state: &ApiState<S>,
    request: Result<SubmitRequest>,
) -> Result<SaleRecord> {
    let request = request?;
    match state.submitter.submit(request).await {
        Ok(record) => {
            state.health.record_append();
            Ok(record)
        }
        Err(e) => {
            warn!("Append to {} failed: {e}", state.store.kind());
            state.health.record_append_failure();
            // Anything the backend raises on append is reported as unavailable.
            Err(if e.status() == StatusCode::SERVICE_UNAVAILABLE {
                e
            } else {
                AppError::Backend(e.to_string())
            })
        }
    }
}
