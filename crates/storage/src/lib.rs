use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use shared::domain::{
    FieldChange, FieldValueError, MemberField, MemberNo, MemberRecord, RequestId, RequestStatus,
    Role, SearchKey, Session, SessionId, UpdateRequest,
};
use thiserror::Error;
use tokio::sync::RwLock;

pub mod search;
pub mod seed;

pub use search::filter_members;

const REQUEST_ID_PREFIX: &str = "UPD-";
const REQUEST_ID_SPACE: u32 = 1_000_000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("member {0} already exists")]
    DuplicateMember(MemberNo),
    #[error("member {0} not found")]
    MemberNotFound(MemberNo),
    #[error("update request {0} not found")]
    RequestNotFound(RequestId),
    #[error("update request {id} is already {status}")]
    InvalidTransition { id: RequestId, status: RequestStatus },
    #[error("update request {id} is stale: {field} is now '{actual}', expected '{expected}'")]
    StaleRequest {
        id: RequestId,
        field: MemberField,
        expected: String,
        actual: String,
    },
    #[error(transparent)]
    InvalidChange(#[from] FieldValueError),
    #[error("no free update request identifiers remain")]
    RequestIdsExhausted,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// An update request as handed over by the workflow, before the store
/// assigns it an identifier.
#[derive(Debug, Clone)]
pub struct NewUpdateRequest {
    pub member_no: MemberNo,
    pub requested_by: String,
    pub reason: String,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Clone)]
pub struct ApprovedRequest {
    pub request: UpdateRequest,
    pub member: MemberRecord,
}

#[derive(Default)]
struct RegisterState {
    members: Vec<MemberRecord>,
    requests: Vec<UpdateRequest>,
    sessions: HashMap<SessionId, Session>,
}

impl RegisterState {
    fn member_index(&self, member_no: &MemberNo) -> Option<usize> {
        self.members.iter().position(|m| &m.member_no == member_no)
    }

    fn request_index(&self, id: &RequestId) -> Option<usize> {
        self.requests.iter().position(|r| &r.id == id)
    }

    fn next_request_id(&self, now: DateTime<Utc>) -> StoreResult<RequestId> {
        let start = request_suffix(now);
        for offset in 0..REQUEST_ID_SPACE {
            let candidate = format_request_id((start + offset) % REQUEST_ID_SPACE);
            if self.request_index(&candidate).is_none() {
                return Ok(candidate);
            }
        }
        Err(StoreError::RequestIdsExhausted)
    }

    fn pending_request_mut(&mut self, id: &RequestId) -> StoreResult<&mut UpdateRequest> {
        let index = self
            .request_index(id)
            .ok_or_else(|| StoreError::RequestNotFound(id.clone()))?;
        let request = &mut self.requests[index];
        if !request.is_pending() {
            return Err(StoreError::InvalidTransition {
                id: id.clone(),
                status: request.status,
            });
        }
        Ok(request)
    }
}

/// The six low-order decimal digits of the timestamp in milliseconds.
pub fn request_suffix(now: DateTime<Utc>) -> u32 {
    now.timestamp_millis().rem_euclid(REQUEST_ID_SPACE as i64) as u32
}

pub fn format_request_id(suffix: u32) -> RequestId {
    RequestId(format!("{REQUEST_ID_PREFIX}{suffix:06}"))
}

/// Process-local register: member records, the update-request queue and the
/// login sessions. Clones share the same state.
#[derive(Clone, Default)]
pub struct Storage {
    state: Arc<RwLock<RegisterState>>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members(members: Vec<MemberRecord>) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegisterState {
                members,
                ..RegisterState::default()
            })),
        }
    }

    pub fn seeded() -> Self {
        Self::with_members(seed::seed_members())
    }

    pub async fn list_members(&self) -> Vec<MemberRecord> {
        self.state.read().await.members.clone()
    }

    pub async fn member_count(&self) -> usize {
        self.state.read().await.members.len()
    }

    pub async fn find_members(&self, key: SearchKey, term: &str) -> Vec<MemberRecord> {
        let state = self.state.read().await;
        filter_members(&state.members, key, term)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn get_member(&self, member_no: &MemberNo) -> Option<MemberRecord> {
        let state = self.state.read().await;
        state
            .member_index(member_no)
            .map(|index| state.members[index].clone())
    }

    pub async fn add_member(&self, record: MemberRecord) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.member_index(&record.member_no).is_some() {
            return Err(StoreError::DuplicateMember(record.member_no));
        }
        state.members.push(record);
        Ok(())
    }

    pub async fn insert_request(&self, new: NewUpdateRequest) -> StoreResult<UpdateRequest> {
        self.insert_request_at(new, Utc::now()).await
    }

    pub async fn insert_request_at(
        &self,
        new: NewUpdateRequest,
        now: DateTime<Utc>,
    ) -> StoreResult<UpdateRequest> {
        let mut state = self.state.write().await;
        let index = state
            .member_index(&new.member_no)
            .ok_or_else(|| StoreError::MemberNotFound(new.member_no.clone()))?;
        let member_name = state.members[index].member_name.clone();
        let id = state.next_request_id(now)?;

        let request = UpdateRequest {
            id,
            member_no: new.member_no,
            member_name,
            requested_by: new.requested_by,
            requested_at: now,
            reason: new.reason,
            changes: new.changes,
            status: RequestStatus::Pending,
            resolved_by: None,
            resolved_at: None,
        };
        state.requests.push(request.clone());
        Ok(request)
    }

    pub async fn get_request(&self, id: &RequestId) -> Option<UpdateRequest> {
        let state = self.state.read().await;
        state
            .request_index(id)
            .map(|index| state.requests[index].clone())
    }

    /// Every request in submission order.
    pub async fn list_requests(&self) -> Vec<UpdateRequest> {
        self.state.read().await.requests.clone()
    }

    pub async fn pending_request_count(&self) -> usize {
        self.state
            .read()
            .await
            .requests
            .iter()
            .filter(|r| r.is_pending())
            .count()
    }

    /// Moves a pending request to approved and writes its new values into
    /// the target record, both under one write lock. Nothing changes unless
    /// every recorded old value still matches the record.
    pub async fn approve_request(
        &self,
        id: &RequestId,
        approver: &str,
    ) -> StoreResult<ApprovedRequest> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let request = state.pending_request_mut(id)?.clone();
        let member_index = state
            .member_index(&request.member_no)
            .ok_or_else(|| StoreError::MemberNotFound(request.member_no.clone()))?;

        let mut updated = state.members[member_index].clone();
        for change in &request.changes {
            let actual = updated.field_value(change.field);
            if actual != change.old_value {
                return Err(StoreError::StaleRequest {
                    id: id.clone(),
                    field: change.field,
                    expected: change.old_value.clone(),
                    actual,
                });
            }
            updated.set_field(change.field, &change.new_value)?;
        }

        state.members[member_index] = updated.clone();
        let stored = state.pending_request_mut(id)?;
        stored.status = RequestStatus::Approved;
        stored.resolved_by = Some(approver.to_string());
        stored.resolved_at = Some(Utc::now());

        Ok(ApprovedRequest {
            request: stored.clone(),
            member: updated,
        })
    }

    pub async fn reject_request(
        &self,
        id: &RequestId,
        approver: &str,
    ) -> StoreResult<UpdateRequest> {
        let mut state = self.state.write().await;
        let stored = state.pending_request_mut(id)?;
        stored.status = RequestStatus::Rejected;
        stored.resolved_by = Some(approver.to_string());
        stored.resolved_at = Some(Utc::now());
        Ok(stored.clone())
    }

    pub async fn open_session(&self, username: &str, role: Role) -> Session {
        let session = Session {
            session_id: SessionId::generate(),
            username: username.to_string(),
            role,
            started_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .sessions
            .insert(session.session_id, session.clone());
        session
    }

    pub async fn session(&self, session_id: &SessionId) -> Option<Session> {
        self.state.read().await.sessions.get(session_id).cloned()
    }

    /// Returns whether a session was actually closed.
    pub async fn close_session(&self, session_id: &SessionId) -> bool {
        self.state
            .write()
            .await
            .sessions
            .remove(session_id)
            .is_some()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
