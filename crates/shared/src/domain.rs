use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(MemberNo);
id_newtype!(RequestId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Error returned when a string does not name a variant of one of the
/// register's enumerated fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labelled_enum {
    ($name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

labelled_enum!(MemberType, "member type" {
    Regular => "Regular",
    Associate => "Associate",
    Premium => "Premium",
});

labelled_enum!(MemberClass, "member class" {
    A => "A",
    B => "B",
    APlus => "A+",
});

labelled_enum!(PaymentMode, "payment mode" {
    Cash => "Cash",
    Cheque => "Cheque",
    BankTransfer => "Bank Transfer",
    Online => "Online",
});

/// Values offered by the add form for the free-form demographic fields.
pub const GENDER_OPTIONS: &[&str] = &["Male", "Female", "Other"];
pub const CASTE_OPTIONS: &[&str] = &["General", "OBC", "SC", "ST"];

macro_rules! member_fields {
    ($($variant:ident => $wire:literal, $label:literal;)+) => {
        /// Every field of a member record, in declaration order. The wire
        /// name doubles as the field name recorded in change lists.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum MemberField {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl MemberField {
            pub const ALL: &'static [MemberField] = &[$(MemberField::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(MemberField::$variant => $wire,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $(MemberField::$variant => $label,)+
                }
            }
        }
    };
}

member_fields! {
    MemberNo => "memberNo", "Member No";
    MemberName => "memberName", "Member Name";
    MemberType => "memberType", "Member Type";
    SiteNo => "siteNo", "Site No";
    ContactDetails => "contactDetails", "Contact Details";
    MemberClass => "memberClass", "Member Class";
    AdmissionDate => "admissionDate", "Admission Date";
    Address => "address", "Address";
    ShareNo => "shareNo", "Share No";
    NoOfShare => "noOfShare", "No Of Share";
    ShareCapitalAmount => "shareCapitalAmount", "Share Capital Amount";
    Gender => "gender", "Gender";
    Caste => "caste", "Caste";
    Aadhaar => "aadhaar", "Aadhaar";
    FamilyCard => "familyCard", "Family Card";
    VoterId => "voterID", "Voter ID";
    Pan => "pan", "PAN";
    AdmissionFeePaid => "admissionFeePaid", "Admission Fee Paid";
    NomineeName => "nomineeName", "Nominee Name";
    Relationship => "relationship", "Relationship";
    TotalAmount => "totalAmount", "Total Amount";
    PaidAmount => "paidAmount", "Paid Amount";
    RemainingAmount => "remainingAmount", "Remaining Amount";
    ModeOfPayment => "modeOfPayment", "Mode of Payment";
}

impl MemberField {
    pub const REQUIRED: &'static [MemberField] = &[
        MemberField::MemberNo,
        MemberField::MemberName,
        MemberField::MemberType,
        MemberField::SiteNo,
        MemberField::ContactDetails,
    ];

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for MemberField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "member field",
                value: s.to_string(),
            })
    }
}

/// Field name to proposed value, as collected by the add and update forms.
pub type MemberDraft = BTreeMap<MemberField, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldValueError {
    #[error("{0} is required and cannot be empty")]
    RequiredEmpty(MemberField),
    #[error("invalid value for {field}: {source}")]
    Invalid {
        field: MemberField,
        #[source]
        source: UnknownVariant,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("missing required fields: {}", join_fields(.0))]
    MissingRequired(Vec<MemberField>),
    #[error(transparent)]
    Field(#[from] FieldValueError),
}

fn join_fields(fields: &[MemberField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub member_no: MemberNo,
    pub member_name: String,
    pub member_type: MemberType,
    pub site_no: String,
    pub contact_details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_class: Option<MemberClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_of_share: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_capital_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caste: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhaar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_card: Option<String>,
    #[serde(default, rename = "voterID", skip_serializing_if = "Option::is_none")]
    pub voter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_fee_paid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominee_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_of_payment: Option<PaymentMode>,
}

impl MemberRecord {
    /// A record carrying only the required fields.
    pub fn new(
        member_no: impl Into<MemberNo>,
        member_name: impl Into<String>,
        member_type: MemberType,
        site_no: impl Into<String>,
        contact_details: impl Into<String>,
    ) -> Self {
        Self {
            member_no: member_no.into(),
            member_name: member_name.into(),
            member_type,
            site_no: site_no.into(),
            contact_details: contact_details.into(),
            member_class: None,
            admission_date: None,
            address: None,
            share_no: None,
            no_of_share: None,
            share_capital_amount: None,
            gender: None,
            caste: None,
            aadhaar: None,
            family_card: None,
            voter_id: None,
            pan: None,
            admission_fee_paid: None,
            nominee_name: None,
            relationship: None,
            total_amount: None,
            paid_amount: None,
            remaining_amount: None,
            mode_of_payment: None,
        }
    }

    /// Builds a record from an add-form draft. All five required fields must
    /// be present and non-blank; blank optional fields are left unset.
    pub fn from_draft(draft: &MemberDraft) -> Result<Self, DraftError> {
        let value_of = |field: MemberField| draft.get(&field).map(|v| v.trim()).unwrap_or("");

        let missing: Vec<MemberField> = MemberField::REQUIRED
            .iter()
            .copied()
            .filter(|field| value_of(*field).is_empty())
            .collect();
        if !missing.is_empty() {
            return Err(DraftError::MissingRequired(missing));
        }

        let member_type =
            value_of(MemberField::MemberType)
                .parse()
                .map_err(|source| FieldValueError::Invalid {
                    field: MemberField::MemberType,
                    source,
                })?;
        let mut record = Self::new(
            value_of(MemberField::MemberNo),
            value_of(MemberField::MemberName),
            member_type,
            value_of(MemberField::SiteNo),
            value_of(MemberField::ContactDetails),
        );
        for (field, value) in draft {
            if !field.is_required() {
                record.set_field(*field, value)?;
            }
        }
        Ok(record)
    }

    /// The field rendered as a string; unset optional fields read as "".
    pub fn field_value(&self, field: MemberField) -> String {
        fn opt(value: &Option<String>) -> String {
            value.clone().unwrap_or_default()
        }

        match field {
            MemberField::MemberNo => self.member_no.0.clone(),
            MemberField::MemberName => self.member_name.clone(),
            MemberField::MemberType => self.member_type.as_str().to_string(),
            MemberField::SiteNo => self.site_no.clone(),
            MemberField::ContactDetails => self.contact_details.clone(),
            MemberField::MemberClass => self
                .member_class
                .map(|class| class.as_str().to_string())
                .unwrap_or_default(),
            MemberField::AdmissionDate => opt(&self.admission_date),
            MemberField::Address => opt(&self.address),
            MemberField::ShareNo => opt(&self.share_no),
            MemberField::NoOfShare => opt(&self.no_of_share),
            MemberField::ShareCapitalAmount => opt(&self.share_capital_amount),
            MemberField::Gender => opt(&self.gender),
            MemberField::Caste => opt(&self.caste),
            MemberField::Aadhaar => opt(&self.aadhaar),
            MemberField::FamilyCard => opt(&self.family_card),
            MemberField::VoterId => opt(&self.voter_id),
            MemberField::Pan => opt(&self.pan),
            MemberField::AdmissionFeePaid => opt(&self.admission_fee_paid),
            MemberField::NomineeName => opt(&self.nominee_name),
            MemberField::Relationship => opt(&self.relationship),
            MemberField::TotalAmount => opt(&self.total_amount),
            MemberField::PaidAmount => opt(&self.paid_amount),
            MemberField::RemainingAmount => opt(&self.remaining_amount),
            MemberField::ModeOfPayment => self
                .mode_of_payment
                .map(|mode| mode.as_str().to_string())
                .unwrap_or_default(),
        }
    }

    /// Overwrites one field from its string form. A blank value clears an
    /// optional field and is refused for a required one.
    pub fn set_field(&mut self, field: MemberField, value: &str) -> Result<(), FieldValueError> {
        fn opt(value: &str) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| value.to_string())
        }

        fn parse_opt<T: FromStr<Err = UnknownVariant>>(
            field: MemberField,
            value: &str,
        ) -> Result<Option<T>, FieldValueError> {
            if value.trim().is_empty() {
                return Ok(None);
            }
            value
                .parse()
                .map(Some)
                .map_err(|source| FieldValueError::Invalid { field, source })
        }

        if field.is_required() && value.trim().is_empty() {
            return Err(FieldValueError::RequiredEmpty(field));
        }

        match field {
            MemberField::MemberNo => self.member_no = MemberNo(value.to_string()),
            MemberField::MemberName => self.member_name = value.to_string(),
            MemberField::MemberType => {
                self.member_type = value
                    .parse()
                    .map_err(|source| FieldValueError::Invalid { field, source })?
            }
            MemberField::SiteNo => self.site_no = value.to_string(),
            MemberField::ContactDetails => self.contact_details = value.to_string(),
            MemberField::MemberClass => self.member_class = parse_opt(field, value)?,
            MemberField::AdmissionDate => self.admission_date = opt(value),
            MemberField::Address => self.address = opt(value),
            MemberField::ShareNo => self.share_no = opt(value),
            MemberField::NoOfShare => self.no_of_share = opt(value),
            MemberField::ShareCapitalAmount => self.share_capital_amount = opt(value),
            MemberField::Gender => self.gender = opt(value),
            MemberField::Caste => self.caste = opt(value),
            MemberField::Aadhaar => self.aadhaar = opt(value),
            MemberField::FamilyCard => self.family_card = opt(value),
            MemberField::VoterId => self.voter_id = opt(value),
            MemberField::Pan => self.pan = opt(value),
            MemberField::AdmissionFeePaid => self.admission_fee_paid = opt(value),
            MemberField::NomineeName => self.nominee_name = opt(value),
            MemberField::Relationship => self.relationship = opt(value),
            MemberField::TotalAmount => self.total_amount = opt(value),
            MemberField::PaidAmount => self.paid_amount = opt(value),
            MemberField::RemainingAmount => self.remaining_amount = opt(value),
            MemberField::ModeOfPayment => self.mode_of_payment = parse_opt(field, value)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchKey {
    #[default]
    #[serde(rename = "memberNo", alias = "member_no")]
    MemberNo,
    #[serde(rename = "siteNo", alias = "site_no")]
    SiteNo,
}

impl SearchKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchKey::MemberNo => "memberNo",
            SearchKey::SiteNo => "siteNo",
        }
    }
}

impl FromStr for SearchKey {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "memberNo" | "member_no" | "member-no" => Ok(Self::MemberNo),
            "siteNo" | "site_no" | "site-no" => Ok(Self::SiteNo),
            other => Err(UnknownVariant {
                kind: "search key",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Proposes edits through update requests.
    #[serde(alias = "admin1")]
    Admin,
    /// Approves or rejects update requests.
    #[serde(alias = "head1")]
    Head,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Head => "Head",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "admin1" => Ok(Self::Admin),
            "head" | "head1" => Ok(Self::Head),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub username: String,
    pub role: Role,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: MemberField,
    pub old_value: String,
    pub new_value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub id: RequestId,
    pub member_no: MemberNo,
    pub member_name: String,
    pub requested_by: String,
    pub requested_at: DateTime<Utc>,
    pub reason: String,
    pub changes: Vec<FieldChange>,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl UpdateRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
