//! HTTP client for the member register service.

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{
        MemberDraft, MemberNo, MemberRecord, RequestId, Role, SearchKey, SessionId, UpdateRequest,
    },
    error::{ApiError, ApiException},
    protocol::{
        ActionResponse, AddMemberRequest, FinancialSummaryView, LoginRequest, LoginResponse,
        MemberDetailView, MemberListResponse, Notification, RequestInbox,
        UpdateRequestSubmission,
    },
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not logged in: run `login` first or pass a session token")]
    NotLoggedIn,
    #[error("server url '{0}' cannot carry a path")]
    InvalidBaseUrl(String),
}

/// Returns the structured server error carried by `err`, if any.
pub fn api_exception(err: &anyhow::Error) -> Option<&ApiException> {
    err.downcast_ref::<ApiException>()
}

pub struct RegisterClient {
    http: Client,
    base_url: Url,
    session: Option<SessionId>,
}

impl RegisterClient {
    pub fn new(server_url: &str) -> Result<Self> {
        let base_url = Url::parse(server_url)
            .with_context(|| format!("invalid server url '{server_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(server_url.to_string()).into());
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            session: None,
        })
    }

    pub fn with_session(mut self, session: Option<SessionId>) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub async fn healthz(&self) -> Result<bool> {
        let body = self
            .http
            .get(self.endpoint(&["healthz"])?)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body == "ok")
    }

    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<LoginResponse> {
        let request = self.http.post(self.endpoint(&["login"])?).json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            role,
        });
        let response: LoginResponse = send(request).await?;
        info!(username = %response.username, role = response.role.label(), "logged in");
        self.session = Some(response.session_id);
        Ok(response)
    }

    pub async fn logout(&mut self) -> Result<Notification> {
        let request = self.authed(self.http.post(self.endpoint(&["logout"])?))?;
        let notification = send(request).await?;
        self.session = None;
        Ok(notification)
    }

    /// Lists every member, or those matching `term` under `key`.
    pub async fn list_members(
        &self,
        key: SearchKey,
        term: Option<&str>,
    ) -> Result<MemberListResponse> {
        let mut url = self.endpoint(&["members"])?;
        if let Some(term) = term {
            url.query_pairs_mut()
                .append_pair("key", key.as_str())
                .append_pair("term", term);
        }
        send(self.authed(self.http.get(url))?).await
    }

    pub async fn member_detail(&self, member_no: &MemberNo) -> Result<MemberDetailView> {
        let url = self.endpoint(&["members", member_no.as_str()])?;
        send(self.authed(self.http.get(url))?).await
    }

    pub async fn financial_summary(&self, member_no: &MemberNo) -> Result<FinancialSummaryView> {
        let url = self.endpoint(&["members", member_no.as_str(), "financials"])?;
        send(self.authed(self.http.get(url))?).await
    }

    pub async fn add_member(&self, fields: MemberDraft) -> Result<ActionResponse<MemberRecord>> {
        let request = self
            .authed(self.http.post(self.endpoint(&["members"])?))?
            .json(&AddMemberRequest { fields });
        send(request).await
    }

    pub async fn submit_update_request(
        &self,
        member_no: &MemberNo,
        draft: MemberDraft,
        reason: &str,
    ) -> Result<ActionResponse<UpdateRequest>> {
        let url = self.endpoint(&["members", member_no.as_str(), "update-requests"])?;
        let request = self.authed(self.http.post(url))?.json(&UpdateRequestSubmission {
            draft,
            reason: reason.to_string(),
        });
        send(request).await
    }

    pub async fn request_inbox(&self) -> Result<RequestInbox> {
        let url = self.endpoint(&["update-requests"])?;
        send(self.authed(self.http.get(url))?).await
    }

    pub async fn get_update_request(&self, request_id: &RequestId) -> Result<UpdateRequest> {
        let url = self.endpoint(&["update-requests", request_id.as_str()])?;
        send(self.authed(self.http.get(url))?).await
    }

    pub async fn approve_request(
        &self,
        request_id: &RequestId,
    ) -> Result<ActionResponse<UpdateRequest>> {
        let url = self.endpoint(&["update-requests", request_id.as_str(), "approve"])?;
        send(self.authed(self.http.post(url))?).await
    }

    pub async fn reject_request(
        &self,
        request_id: &RequestId,
    ) -> Result<ActionResponse<UpdateRequest>> {
        let url = self.endpoint(&["update-requests", request_id.as_str(), "reject"])?;
        send(self.authed(self.http.post(url))?).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let session = self.session.ok_or(ClientError::NotLoggedIn)?;
        Ok(request.query(&[("session", session.to_string())]))
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    decode(response).await
}

/// Error bodies are surfaced as [`ApiException`] so callers can show the
/// server's title and message.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .context("failed to decode server response");
    }

    let body = response.bytes().await?;
    debug!(%status, "server returned an error");
    match serde_json::from_slice::<ApiError>(&body) {
        Ok(err) => Err(ApiException::from(err).into()),
        Err(_) => Err(anyhow!(
            "server returned {status}: {}",
            String::from_utf8_lossy(&body)
        )),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
