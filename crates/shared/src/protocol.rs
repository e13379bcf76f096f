use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        MemberClass, MemberDraft, MemberNo, MemberType, Role, SearchKey, SessionId, UpdateRequest,
    },
    error::ApiException,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub session_id: SessionId,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    #[default]
    Default,
    Destructive,
}

/// Transient acknowledgement surfaced for every mutating action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }
}

impl From<&ApiException> for Notification {
    fn from(value: &ApiException) -> Self {
        Self::destructive(value.title.clone(), value.message.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub notification: Notification,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMemberRequest {
    pub fields: MemberDraft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequestSubmission {
    pub draft: MemberDraft,
    pub reason: String,
}

/// One row of the member dataset table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRow {
    pub member_no: MemberNo,
    pub member_name: String,
    pub member_type: MemberType,
    pub site_no: String,
    pub contact_details: String,
    pub total_amount: String,
    pub paid_amount: String,
    pub remaining_amount: String,
    pub mode_of_payment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEcho {
    pub key: SearchKey,
    pub term: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberListResponse {
    pub members: Vec<MemberRow>,
    pub total_records: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchEcho>,
    /// Present only for the approver role: the inbox badge count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_requests: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoSection {
    pub title: String,
    pub entries: Vec<InfoEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailHeader {
    pub initial: String,
    pub member_name: String,
    pub member_no: MemberNo,
    pub member_type: MemberType,
    pub site_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_class: Option<MemberClass>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDetailView {
    pub header: DetailHeader,
    pub sections: Vec<InfoSection>,
    /// Whether the viewing role may open the update-request form.
    pub can_request_update: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    FullyPaid,
    PartiallyPaid,
    Unpaid,
    Unknown,
}

impl PaymentStatus {
    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::FullyPaid => "Fully Paid",
            PaymentStatus::PartiallyPaid => "Partially Paid",
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSummary {
    pub share_no: String,
    pub no_of_share: String,
    pub share_capital_amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummaryView {
    pub member_no: MemberNo,
    pub member_name: String,
    pub member_type: MemberType,
    pub payment_status: PaymentStatus,
    pub total_amount: String,
    pub paid_amount: String,
    pub remaining_amount: String,
    pub mode_of_payment: String,
    pub admission_fee_paid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<ShareSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInbox {
    pub pending: Vec<UpdateRequest>,
    pub processed: Vec<UpdateRequest>,
}

impl RequestInbox {
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
