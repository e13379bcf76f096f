use std::time::Duration;

use shared::{
    domain::{
        DraftError, MemberDraft, MemberNo, MemberRecord, RequestId, Role, SearchKey, Session,
        SessionId, UpdateRequest,
    },
    error::{ApiError, ErrorCode},
    protocol::{
        ActionResponse, FinancialSummaryView, LoginResponse, MemberDetailView, MemberListResponse,
        Notification, RequestInbox, SearchEcho,
    },
};
use storage::{NewUpdateRequest, Storage, StoreError};
use tracing::{info, warn};

pub mod views;
pub mod workflow;

use workflow::prepare_submission;

pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy)]
pub struct WorkflowSettings {
    /// Simulated latency between accepting an update request and queueing it.
    pub submit_delay: Duration,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            submit_delay: DEFAULT_SUBMIT_DELAY,
        }
    }
}

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub workflow: WorkflowSettings,
}

impl ApiContext {
    pub fn new(storage: Storage, workflow: WorkflowSettings) -> Self {
        Self { storage, workflow }
    }
}

pub async fn login(
    ctx: &ApiContext,
    username: &str,
    password: &str,
    role: Role,
) -> Result<LoginResponse, ApiError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "Please enter both username and password.",
        )
        .with_title("Login Failed"));
    }

    let session = ctx.storage.open_session(username, role).await;
    info!(username, role = role.label(), "session opened");
    Ok(LoginResponse {
        session_id: session.session_id,
        username: session.username,
        role: session.role,
    })
}

pub async fn logout(ctx: &ApiContext, session_id: SessionId) -> Result<Notification, ApiError> {
    let session = ensure_session(ctx, session_id).await?;
    ctx.storage.close_session(&session_id).await;
    info!(username = %session.username, "session closed");
    Ok(Notification::success(
        "Logged Out",
        format!("{} has been signed out.", session.username),
    ))
}

/// The member list screen: every record, or the subset matching a search.
/// An empty term is the "clear search" action.
pub async fn member_dashboard(
    ctx: &ApiContext,
    session_id: SessionId,
    key: SearchKey,
    term: Option<&str>,
) -> Result<MemberListResponse, ApiError> {
    let session = ensure_session(ctx, session_id).await?;

    let (records, search) = match term.filter(|term| !term.trim().is_empty()) {
        Some(term) => (
            ctx.storage.find_members(key, term).await,
            Some(SearchEcho {
                key,
                term: term.to_string(),
            }),
        ),
        None => (ctx.storage.list_members().await, None),
    };

    let pending_requests = match session.role {
        Role::Head => Some(ctx.storage.pending_request_count().await),
        Role::Admin => None,
    };

    Ok(MemberListResponse {
        total_records: records.len(),
        members: records.iter().map(views::member_row).collect(),
        search,
        pending_requests,
    })
}

pub async fn member_detail(
    ctx: &ApiContext,
    session_id: SessionId,
    member_no: &MemberNo,
) -> Result<MemberDetailView, ApiError> {
    let session = ensure_session(ctx, session_id).await?;
    let record = load_member(ctx, member_no).await?;
    Ok(views::member_detail_view(&record, session.role))
}

pub async fn financial_summary(
    ctx: &ApiContext,
    session_id: SessionId,
    member_no: &MemberNo,
) -> Result<FinancialSummaryView, ApiError> {
    ensure_session(ctx, session_id).await?;
    let record = load_member(ctx, member_no).await?;
    Ok(views::financial_summary_view(&record))
}

/// Both roles may add members.
pub async fn add_member(
    ctx: &ApiContext,
    session_id: SessionId,
    fields: &MemberDraft,
) -> Result<ActionResponse<MemberRecord>, ApiError> {
    let session = ensure_session(ctx, session_id).await?;

    let record = MemberRecord::from_draft(fields).map_err(|err| {
        warn!(username = %session.username, error = %err, "add member refused");
        match err {
            DraftError::MissingRequired(_) => ApiError::new(
                ErrorCode::Validation,
                "Please fill in all required fields (Member No, Name, Type, Site No, Contact Details).",
            )
            .with_title("Missing Required Fields"),
            DraftError::Field(err) => {
                ApiError::new(ErrorCode::Validation, err.to_string())
                    .with_title("Invalid Field Value")
            }
        }
    })?;

    ctx.storage
        .add_member(record.clone())
        .await
        .map_err(store_error)?;
    info!(
        username = %session.username,
        member_no = %record.member_no,
        "member added"
    );

    Ok(ActionResponse {
        notification: Notification::success(
            "Member Added Successfully",
            format!("Member {} has been added to the system.", record.member_name),
        ),
        data: record,
    })
}

/// Packages the differences between `draft` and the stored record into a
/// pending update request. Only the proposer role may submit.
pub async fn submit_update_request(
    ctx: &ApiContext,
    session_id: SessionId,
    member_no: &MemberNo,
    draft: &MemberDraft,
    reason: &str,
) -> Result<ActionResponse<UpdateRequest>, ApiError> {
    let session = ensure_role(ctx, session_id, Role::Admin).await?;
    let record = load_member(ctx, member_no).await?;

    let changes = prepare_submission(&record, draft, reason).map_err(|err| {
        warn!(
            username = %session.username,
            %member_no,
            error = %err,
            "update request refused"
        );
        ApiError::from(err)
    })?;

    if !ctx.workflow.submit_delay.is_zero() {
        tokio::time::sleep(ctx.workflow.submit_delay).await;
    }

    let request = ctx
        .storage
        .insert_request(NewUpdateRequest {
            member_no: member_no.clone(),
            requested_by: session.username.clone(),
            reason: reason.trim().to_string(),
            changes,
        })
        .await
        .map_err(store_error)?;
    info!(
        username = %session.username,
        request_id = %request.id,
        %member_no,
        changes = request.changes.len(),
        "update request submitted"
    );

    Ok(ActionResponse {
        notification: Notification::success(
            "Update Request Submitted",
            format!(
                "Request ID: {} has been sent to {} for approval. You will be notified once processed.",
                request.id,
                Role::Head.label()
            ),
        ),
        data: request,
    })
}

pub async fn request_inbox(
    ctx: &ApiContext,
    session_id: SessionId,
) -> Result<RequestInbox, ApiError> {
    ensure_role(ctx, session_id, Role::Head).await?;
    Ok(views::request_inbox(ctx.storage.list_requests().await))
}

pub async fn get_update_request(
    ctx: &ApiContext,
    session_id: SessionId,
    request_id: &RequestId,
) -> Result<UpdateRequest, ApiError> {
    ensure_role(ctx, session_id, Role::Head).await?;
    ctx.storage
        .get_request(request_id)
        .await
        .ok_or_else(|| store_error(StoreError::RequestNotFound(request_id.clone())))
}

/// Approves a pending request and writes its new values into the record.
pub async fn approve_request(
    ctx: &ApiContext,
    session_id: SessionId,
    request_id: &RequestId,
) -> Result<ActionResponse<UpdateRequest>, ApiError> {
    let session = ensure_role(ctx, session_id, Role::Head).await?;
    let approved = ctx
        .storage
        .approve_request(request_id, &session.username)
        .await
        .map_err(|err| {
            warn!(username = %session.username, %request_id, error = %err, "approval refused");
            store_error(err)
        })?;
    info!(
        username = %session.username,
        %request_id,
        member_no = %approved.member.member_no,
        "update request approved"
    );

    Ok(ActionResponse {
        notification: Notification::success(
            "Request Approved",
            format!(
                "Update request {request_id} has been approved and member data has been updated."
            ),
        ),
        data: approved.request,
    })
}

pub async fn reject_request(
    ctx: &ApiContext,
    session_id: SessionId,
    request_id: &RequestId,
) -> Result<ActionResponse<UpdateRequest>, ApiError> {
    let session = ensure_role(ctx, session_id, Role::Head).await?;
    let rejected = ctx
        .storage
        .reject_request(request_id, &session.username)
        .await
        .map_err(|err| {
            warn!(username = %session.username, %request_id, error = %err, "rejection refused");
            store_error(err)
        })?;
    info!(username = %session.username, %request_id, "update request rejected");

    Ok(ActionResponse {
        notification: Notification::destructive(
            "Request Rejected",
            format!("Update request {request_id} has been rejected."),
        ),
        data: rejected,
    })
}

async fn ensure_session(ctx: &ApiContext, session_id: SessionId) -> Result<Session, ApiError> {
    ctx.storage.session(&session_id).await.ok_or_else(|| {
        ApiError::new(ErrorCode::Unauthorized, "Please log in to continue.")
    })
}

async fn ensure_role(
    ctx: &ApiContext,
    session_id: SessionId,
    required: Role,
) -> Result<Session, ApiError> {
    let session = ensure_session(ctx, session_id).await?;
    if session.role != required {
        warn!(
            username = %session.username,
            role = session.role.label(),
            required = required.label(),
            "operation refused for role"
        );
        return Err(ApiError::new(
            ErrorCode::Forbidden,
            format!("This action is reserved for the {} role.", required.label()),
        ));
    }
    Ok(session)
}

async fn load_member(ctx: &ApiContext, member_no: &MemberNo) -> Result<MemberRecord, ApiError> {
    ctx.storage
        .get_member(member_no)
        .await
        .ok_or_else(|| store_error(StoreError::MemberNotFound(member_no.clone())))
}

fn store_error(err: StoreError) -> ApiError {
    let (code, title) = match &err {
        StoreError::DuplicateMember(_) => (ErrorCode::Conflict, "Duplicate Member Number"),
        StoreError::MemberNotFound(_) => (ErrorCode::NotFound, "Member Not Found"),
        StoreError::RequestNotFound(_) => (ErrorCode::NotFound, "Request Not Found"),
        StoreError::InvalidTransition { .. } => (ErrorCode::Conflict, "Request Already Processed"),
        StoreError::StaleRequest { .. } => (ErrorCode::Conflict, "Stale Request"),
        StoreError::InvalidChange(_) => (ErrorCode::Validation, "Invalid Field Value"),
        StoreError::RequestIdsExhausted => (ErrorCode::Internal, "Request Queue Full"),
    };
    ApiError::new(code, err.to_string()).with_title(title)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
