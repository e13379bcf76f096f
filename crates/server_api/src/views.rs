//! Read-only projections of member records. Unset fields render as a
//! placeholder so every slot stays visible.

use shared::{
    domain::{MemberField, MemberRecord, RequestStatus, Role, UpdateRequest},
    protocol::{
        DetailHeader, FinancialSummaryView, InfoEntry, InfoSection, MemberDetailView, MemberRow,
        PaymentStatus, RequestInbox, ShareSummary,
    },
};

pub const NOT_PROVIDED: &str = "Not provided";
pub const NOT_SPECIFIED: &str = "Not specified";
pub const NOT_ASSIGNED: &str = "Not assigned";
pub const NOT_AVAILABLE: &str = "N/A";
const CURRENCY_SYMBOL: &str = "₹";

const DETAIL_SECTIONS: &[(&str, &[MemberField])] = &[
    (
        "Personal Information",
        &[
            MemberField::MemberNo,
            MemberField::MemberName,
            MemberField::MemberClass,
            MemberField::MemberType,
            MemberField::Gender,
            MemberField::Caste,
        ],
    ),
    (
        "Contact Information",
        &[
            MemberField::ContactDetails,
            MemberField::Address,
            MemberField::SiteNo,
        ],
    ),
    (
        "Document Information",
        &[
            MemberField::Aadhaar,
            MemberField::FamilyCard,
            MemberField::VoterId,
            MemberField::Pan,
        ],
    ),
    (
        "Financial Information",
        &[
            MemberField::ShareNo,
            MemberField::NoOfShare,
            MemberField::ShareCapitalAmount,
            MemberField::AdmissionFeePaid,
            MemberField::TotalAmount,
            MemberField::PaidAmount,
            MemberField::RemainingAmount,
            MemberField::ModeOfPayment,
        ],
    ),
    (
        "Nominee & Additional Information",
        &[
            MemberField::NomineeName,
            MemberField::Relationship,
            MemberField::AdmissionDate,
        ],
    ),
];

fn is_money(field: MemberField) -> bool {
    matches!(
        field,
        MemberField::ShareCapitalAmount
            | MemberField::AdmissionFeePaid
            | MemberField::TotalAmount
            | MemberField::PaidAmount
            | MemberField::RemainingAmount
    )
}

pub fn member_row(record: &MemberRecord) -> MemberRow {
    MemberRow {
        member_no: record.member_no.clone(),
        member_name: record.member_name.clone(),
        member_type: record.member_type,
        site_no: record.site_no.clone(),
        contact_details: record.contact_details.clone(),
        total_amount: format_amount(record.total_amount.as_deref()),
        paid_amount: format_amount(record.paid_amount.as_deref()),
        remaining_amount: format_amount(record.remaining_amount.as_deref()),
        mode_of_payment: record
            .mode_of_payment
            .map(|mode| mode.as_str().to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}

pub fn member_detail_view(record: &MemberRecord, viewer: Role) -> MemberDetailView {
    let sections = DETAIL_SECTIONS
        .iter()
        .map(|(title, fields)| InfoSection {
            title: title.to_string(),
            entries: fields
                .iter()
                .map(|field| InfoEntry {
                    label: field.label().to_string(),
                    value: detail_value(record, *field),
                })
                .collect(),
        })
        .collect();

    MemberDetailView {
        header: DetailHeader {
            initial: record
                .member_name
                .chars()
                .next()
                .map(String::from)
                .unwrap_or_default(),
            member_name: record.member_name.clone(),
            member_no: record.member_no.clone(),
            member_type: record.member_type,
            site_no: record.site_no.clone(),
            member_class: record.member_class,
        },
        sections,
        can_request_update: viewer == Role::Admin,
    }
}

fn detail_value(record: &MemberRecord, field: MemberField) -> String {
    let raw = record.field_value(field);
    if raw.is_empty() {
        NOT_PROVIDED.to_string()
    } else if is_money(field) {
        format_amount(Some(&raw))
    } else {
        raw
    }
}

pub fn financial_summary_view(record: &MemberRecord) -> FinancialSummaryView {
    let has_share_info = record.share_no.is_some()
        || record.no_of_share.is_some()
        || record.share_capital_amount.is_some();
    let share = has_share_info.then(|| ShareSummary {
        share_no: record
            .share_no
            .clone()
            .unwrap_or_else(|| NOT_ASSIGNED.to_string()),
        no_of_share: record.no_of_share.clone().unwrap_or_else(|| "0".to_string()),
        share_capital_amount: format_amount(record.share_capital_amount.as_deref()),
    });

    FinancialSummaryView {
        member_no: record.member_no.clone(),
        member_name: record.member_name.clone(),
        member_type: record.member_type,
        payment_status: payment_status(
            record.paid_amount.as_deref(),
            record.remaining_amount.as_deref(),
        ),
        total_amount: format_amount(record.total_amount.as_deref()),
        paid_amount: format_amount(record.paid_amount.as_deref()),
        remaining_amount: format_amount(record.remaining_amount.as_deref()),
        mode_of_payment: record
            .mode_of_payment
            .map(|mode| mode.as_str().to_string())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        admission_fee_paid: format_amount(record.admission_fee_paid.as_deref()),
        share,
    }
}

/// Absent amounts count as zero; unparsable ones leave the status unknown.
pub fn payment_status(paid: Option<&str>, remaining: Option<&str>) -> PaymentStatus {
    let (Some(paid), Some(remaining)) = (parse_amount(paid), parse_amount(remaining)) else {
        return PaymentStatus::Unknown;
    };

    if remaining == 0.0 && paid > 0.0 {
        PaymentStatus::FullyPaid
    } else if paid > 0.0 && remaining > 0.0 {
        PaymentStatus::PartiallyPaid
    } else if paid == 0.0 {
        PaymentStatus::Unpaid
    } else {
        PaymentStatus::Unknown
    }
}

fn parse_amount(raw: Option<&str>) -> Option<f64> {
    match raw.map(str::trim) {
        None | Some("") => Some(0.0),
        Some(value) => value.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

/// Renders an amount as rupees with thousands separators and at most three
/// fraction digits: `Some("100000")` becomes `₹100,000`, `None` becomes `₹0`.
/// Values that are not numbers are shown as entered.
pub fn format_amount(raw: Option<&str>) -> String {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return format!("{CURRENCY_SYMBOL}0");
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => format!("{CURRENCY_SYMBOL}{}", group_thousands(value)),
        _ => format!("{CURRENCY_SYMBOL}{raw}"),
    }
}

fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let mut out = String::new();
    if value < 0.0 && (integer != "0" || !fraction.is_empty()) {
        out.push('-');
    }
    out.push_str(&grouped);
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Splits the queue into the inbox's two lists, keeping submission order.
pub fn request_inbox(requests: Vec<UpdateRequest>) -> RequestInbox {
    let (pending, processed) = requests
        .into_iter()
        .partition(|request| request.status == RequestStatus::Pending);
    RequestInbox { pending, processed }
}
