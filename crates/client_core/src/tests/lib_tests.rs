use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::{MemberField, RequestStatus},
    error::ErrorCode,
};
use tokio::{net::TcpListener, sync::Mutex};

const SESSION: &str = "6f1c2f0e-3f5b-4d0e-9a55-1d2b3c4d5e6f";

#[derive(Clone, Default)]
struct ServerState {
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    submissions: Arc<Mutex<Vec<(String, UpdateRequestSubmission)>>>,
}

async fn handle_login(Json(req): Json<LoginRequest>) -> (StatusCode, Json<serde_json::Value>) {
    if req.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "code": "validation",
                "title": "Login Failed",
                "message": "Please enter both username and password."
            })),
        );
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "session_id": SESSION,
            "username": req.username,
            "role": req.role,
        })),
    )
}

async fn handle_list(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    state.queries.lock().await.push(query);
    Json(serde_json::json!({
        "members": [{
            "memberNo": "010",
            "memberName": "Sunita Singh",
            "memberType": "Premium",
            "siteNo": "4",
            "contactDetails": "9876543220",
            "totalAmount": "150000",
            "paidAmount": "150000",
            "remainingAmount": "0",
            "modeOfPayment": "Online"
        }],
        "total_records": 1
    }))
}

async fn handle_submit(
    State(state): State<ServerState>,
    Path(member_no): Path<String>,
    Json(req): Json<UpdateRequestSubmission>,
) -> Json<serde_json::Value> {
    let changes: Vec<serde_json::Value> = req
        .draft
        .iter()
        .map(|(field, value)| {
            serde_json::json!({ "field": field, "oldValue": "", "newValue": value })
        })
        .collect();
    let response = serde_json::json!({
        "notification": {
            "title": "Update Request Submitted",
            "description": "Request ID: UPD-123456 has been sent to Head for approval.",
        },
        "data": {
            "id": "UPD-123456",
            "memberNo": member_no,
            "memberName": "Rajesh Kumar",
            "requestedBy": "admin1",
            "requestedAt": "2024-01-15T10:30:00Z",
            "reason": req.reason,
            "changes": changes,
            "status": "pending"
        }
    });
    state.submissions.lock().await.push((member_no, req));
    Json(response)
}

async fn handle_approve(Path(request_id): Path<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::CONFLICT,
        Json(
            ApiError::new(
                ErrorCode::Conflict,
                format!("update request {request_id} is already approved"),
            )
            .with_title("Request Already Processed"),
        ),
    )
}

async fn handle_logout(Query(query): Query<HashMap<String, String>>) -> Json<Notification> {
    Json(Notification::success(
        "Logged Out",
        format!("session {} closed", query.get("session").cloned().unwrap_or_default()),
    ))
}

async fn spawn_register_server() -> Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/members", get(handle_list))
        .route("/members/:member_no/update-requests", post(handle_submit))
        .route("/update-requests/:request_id/approve", post(handle_approve))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

#[tokio::test]
async fn login_stores_session_for_later_calls() {
    let (server_url, state) = spawn_register_server().await.expect("spawn server");
    let mut client = RegisterClient::new(&server_url).expect("client");
    assert!(client.healthz().await.expect("healthz"));

    let login = client
        .login("admin1", "secret", Role::Admin)
        .await
        .expect("login");
    assert_eq!(login.session_id.to_string(), SESSION);
    assert_eq!(client.session(), Some(login.session_id));

    let list = client
        .list_members(SearchKey::MemberNo, Some("01"))
        .await
        .expect("list");
    assert_eq!(list.total_records, 1);
    assert_eq!(list.members[0].member_no.as_str(), "010");

    let queries = state.queries.lock().await;
    assert_eq!(queries[0].get("session").map(String::as_str), Some(SESSION));
    assert_eq!(queries[0].get("key").map(String::as_str), Some("memberNo"));
    assert_eq!(queries[0].get("term").map(String::as_str), Some("01"));
}

#[tokio::test]
async fn calls_without_session_fail_before_sending() {
    let (server_url, state) = spawn_register_server().await.expect("spawn server");
    let client = RegisterClient::new(&server_url).expect("client");
    let err = client
        .list_members(SearchKey::SiteNo, None)
        .await
        .expect_err("not logged in");
    assert!(matches!(
        err.downcast_ref::<ClientError>(),
        Some(ClientError::NotLoggedIn)
    ));
    assert!(state.queries.lock().await.is_empty());
}

#[tokio::test]
async fn server_errors_surface_as_api_exceptions() {
    let (server_url, _state) = spawn_register_server().await.expect("spawn server");
    let mut client = RegisterClient::new(&server_url).expect("client");

    let err = client
        .login("admin1", "", Role::Admin)
        .await
        .expect_err("blank password");
    let exception = api_exception(&err).expect("api exception");
    assert_eq!(exception.code, ErrorCode::Validation);
    assert_eq!(exception.title, "Login Failed");
    assert!(client.session().is_none());

    client
        .login("head1", "secret", Role::Head)
        .await
        .expect("login");
    let err = client
        .approve_request(&RequestId::from("UPD-123456"))
        .await
        .expect_err("conflict");
    let exception = api_exception(&err).expect("api exception");
    assert_eq!(exception.code, ErrorCode::Conflict);
    assert_eq!(exception.title, "Request Already Processed");
}

#[tokio::test]
async fn submission_posts_draft_and_reason() {
    let (server_url, state) = spawn_register_server().await.expect("spawn server");
    let mut client = RegisterClient::new(&format!("{server_url}/")).expect("client");
    client
        .login("admin1", "secret", Role::Admin)
        .await
        .expect("login");

    let draft: MemberDraft = [(MemberField::ContactDetails, "9876543999".to_string())]
        .into_iter()
        .collect();
    let response = client
        .submit_update_request(&MemberNo::from("001"), draft, "phone change")
        .await
        .expect("submit");
    assert_eq!(response.data.status, RequestStatus::Pending);
    assert_eq!(response.data.changes.len(), 1);
    assert_eq!(response.data.changes[0].field, MemberField::ContactDetails);
    assert_eq!(response.notification.title, "Update Request Submitted");

    let submissions = state.submissions.lock().await;
    let (member_no, body) = &submissions[0];
    assert_eq!(member_no, "001");
    assert_eq!(body.reason, "phone change");
    assert_eq!(
        body.draft.get(&MemberField::ContactDetails).map(String::as_str),
        Some("9876543999")
    );
}

#[tokio::test]
async fn logout_clears_session() {
    let (server_url, _state) = spawn_register_server().await.expect("spawn server");
    let mut client = RegisterClient::new(&server_url).expect("client");
    client
        .login("admin1", "secret", Role::Admin)
        .await
        .expect("login");
    let notification = client.logout().await.expect("logout");
    assert!(notification.description.contains(SESSION));
    assert!(client.session().is_none());
}

#[test]
fn rejects_urls_that_cannot_be_a_base() {
    assert!(RegisterClient::new("mailto:register@example.com").is_err());
    assert!(RegisterClient::new("not a url").is_err());
}
