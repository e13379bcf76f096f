use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use server_api::{ApiContext, WorkflowSettings};
use shared::{
    domain::{MemberNo, MemberRecord, RequestId, SearchKey, SessionId, UpdateRequest},
    error::{ApiError, ErrorCode},
    protocol::{
        ActionResponse, AddMemberRequest, FinancialSummaryView, LoginRequest, LoginResponse,
        MemberDetailView, MemberListResponse, Notification, RequestInbox,
        UpdateRequestSubmission,
    },
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

const MAX_BODY_BYTES: usize = 64 * 1024;

type HttpError = (StatusCode, Json<ApiError>);
type HttpResult<T> = Result<Json<T>, HttpError>;

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MemberListQuery {
    session: Option<String>,
    #[serde(default)]
    key: SearchKey,
    term: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let storage = if settings.seed_members {
        Storage::seeded()
    } else {
        Storage::new()
    };
    let api = ApiContext::new(
        storage,
        WorkflowSettings {
            submit_delay: settings.submit_delay(),
        },
    );
    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(
        %addr,
        seed_members = settings.seed_members,
        submit_delay_ms = settings.submit_delay_ms,
        "register server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/members", get(list_members).post(add_member))
        .route("/members/:member_no", get(member_detail))
        .route("/members/:member_no/financials", get(financial_summary))
        .route(
            "/members/:member_no/update-requests",
            post(submit_update_request),
        )
        .route("/update-requests", get(request_inbox))
        .route("/update-requests/:request_id", get(get_update_request))
        .route("/update-requests/:request_id/approve", post(approve_request))
        .route("/update-requests/:request_id/reject", post(reject_request))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn http_error(err: ApiError) -> HttpError {
    (status_for(err.code), Json(err))
}

/// A missing or malformed token is treated the same as an expired one.
fn session_id(raw: Option<&str>) -> Result<SessionId, HttpError> {
    raw.and_then(|raw| raw.parse().ok()).ok_or_else(|| {
        http_error(ApiError::new(
            ErrorCode::Unauthorized,
            "Please log in to continue.",
        ))
    })
}

async fn healthz() -> &'static str {
    "ok"
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> HttpResult<LoginResponse> {
    server_api::login(&state.api, &req.username, &req.password, req.role)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn logout(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SessionQuery>,
) -> HttpResult<Notification> {
    let session = session_id(q.session.as_deref())?;
    server_api::logout(&state.api, session)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn list_members(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MemberListQuery>,
) -> HttpResult<MemberListResponse> {
    let session = session_id(q.session.as_deref())?;
    server_api::member_dashboard(&state.api, session, q.key, q.term.as_deref())
        .await
        .map(Json)
        .map_err(http_error)
}

async fn add_member(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SessionQuery>,
    Json(req): Json<AddMemberRequest>,
) -> HttpResult<ActionResponse<MemberRecord>> {
    let session = session_id(q.session.as_deref())?;
    server_api::add_member(&state.api, session, &req.fields)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn member_detail(
    State(state): State<Arc<AppState>>,
    Path(member_no): Path<String>,
    Query(q): Query<SessionQuery>,
) -> HttpResult<MemberDetailView> {
    let session = session_id(q.session.as_deref())?;
    server_api::member_detail(&state.api, session, &MemberNo::from(member_no))
        .await
        .map(Json)
        .map_err(http_error)
}

async fn financial_summary(
    State(state): State<Arc<AppState>>,
    Path(member_no): Path<String>,
    Query(q): Query<SessionQuery>,
) -> HttpResult<FinancialSummaryView> {
    let session = session_id(q.session.as_deref())?;
    server_api::financial_summary(&state.api, session, &MemberNo::from(member_no))
        .await
        .map(Json)
        .map_err(http_error)
}

async fn submit_update_request(
    State(state): State<Arc<AppState>>,
    Path(member_no): Path<String>,
    Query(q): Query<SessionQuery>,
    Json(req): Json<UpdateRequestSubmission>,
) -> HttpResult<ActionResponse<UpdateRequest>> {
    let session = session_id(q.session.as_deref())?;
    server_api::submit_update_request(
        &state.api,
        session,
        &MemberNo::from(member_no),
        &req.draft,
        &req.reason,
    )
    .await
    .map(Json)
    .map_err(http_error)
}

async fn request_inbox(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SessionQuery>,
) -> HttpResult<RequestInbox> {
    let session = session_id(q.session.as_deref())?;
    server_api::request_inbox(&state.api, session)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn get_update_request(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<String>,
    Query(q): Query<SessionQuery>,
) -> HttpResult<UpdateRequest> {
    let session = session_id(q.session.as_deref())?;
    server_api::get_update_request(&state.api, session, &RequestId::from(request_id))
        .await
        .map(Json)
        .map_err(http_error)
}

async fn approve_request(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<String>,
    Query(q): Query<SessionQuery>,
) -> HttpResult<ActionResponse<UpdateRequest>> {
    let session = session_id(q.session.as_deref())?;
    server_api::approve_request(&state.api, session, &RequestId::from(request_id))
        .await
        .map(Json)
        .map_err(http_error)
}

async fn reject_request(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<String>,
    Query(q): Query<SessionQuery>,
) -> HttpResult<ActionResponse<UpdateRequest>> {
    let session = session_id(q.session.as_deref())?;
    server_api::reject_request(&state.api, session, &RequestId::from(request_id))
        .await
        .map(Json)
        .map_err(http_error)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
