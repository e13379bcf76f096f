//! Plain-text rendering of server views for the terminal.

use std::fmt::Write;

use shared::{
    domain::{
        MemberClass, MemberField, MemberType, PaymentMode, UpdateRequest, CASTE_OPTIONS,
        GENDER_OPTIONS,
    },
    protocol::{
        FinancialSummaryView, MemberDetailView, MemberListResponse, Notification,
        NotificationVariant, RequestInbox,
    },
};

const EMPTY_VALUE: &str = "(empty)";

pub fn notification(notification: &Notification) -> String {
    let marker = match notification.variant {
        NotificationVariant::Default => "",
        NotificationVariant::Destructive => "! ",
    };
    format!(
        "{marker}[{}] {}",
        notification.title, notification.description
    )
}

pub fn member_table(list: &MemberListResponse) -> String {
    let mut rows = vec![[
        "Member No".to_string(),
        "Name".to_string(),
        "Type".to_string(),
        "Site No".to_string(),
        "Contact".to_string(),
        "Total".to_string(),
        "Paid".to_string(),
        "Remaining".to_string(),
        "Payment Mode".to_string(),
    ]];
    rows.extend(list.members.iter().map(|member| {
        [
            member.member_no.to_string(),
            member.member_name.clone(),
            member.member_type.to_string(),
            member.site_no.clone(),
            member.contact_details.clone(),
            member.total_amount.clone(),
            member.paid_amount.clone(),
            member.remaining_amount.clone(),
            member.mode_of_payment.clone(),
        ]
    }));

    let mut widths = [0usize; 9];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    if let Some(search) = &list.search {
        let _ = writeln!(out, "Search: {} contains \"{}\"", search.key.as_str(), search.term);
    }
    for row in &rows {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    if list.members.is_empty() {
        let _ = writeln!(out, "No members found.");
    }
    let _ = writeln!(out, "Total records: {}", list.total_records);
    if let Some(pending) = list.pending_requests {
        let _ = writeln!(out, "Pending requests: {pending}");
    }
    out
}

pub fn member_detail(view: &MemberDetailView) -> String {
    let header = &view.header;
    let mut out = String::new();
    let _ = writeln!(out, "({}) {}", header.initial, header.member_name);
    let mut badges = vec![
        format!("Member No: {}", header.member_no),
        header.member_type.to_string(),
        format!("Site {}", header.site_no),
    ];
    if let Some(class) = header.member_class {
        badges.push(format!("Class {class}"));
    }
    let _ = writeln!(out, "{}", badges.join(" | "));

    for section in &view.sections {
        let _ = writeln!(out);
        let _ = writeln!(out, "== {} ==", section.title);
        for entry in &section.entries {
            let _ = writeln!(out, "  {}: {}", entry.label, entry.value);
        }
    }

    if view.can_request_update {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "To propose changes: request-update {} --set <field>=<value> --reason <text>",
            header.member_no
        );
    }
    out
}

pub fn financial_summary(view: &FinancialSummaryView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}, {})",
        view.member_name, view.member_no, view.member_type
    );
    let _ = writeln!(out, "Payment status: {}", view.payment_status.label());
    let _ = writeln!(out, "  Total amount:       {}", view.total_amount);
    let _ = writeln!(out, "  Paid amount:        {}", view.paid_amount);
    let _ = writeln!(out, "  Remaining amount:   {}", view.remaining_amount);
    let _ = writeln!(out, "  Mode of payment:    {}", view.mode_of_payment);
    let _ = writeln!(out, "  Admission fee paid: {}", view.admission_fee_paid);
    if let Some(share) = &view.share {
        let _ = writeln!(out, "Share information:");
        let _ = writeln!(out, "  Share No:             {}", share.share_no);
        let _ = writeln!(out, "  No of shares:         {}", share.no_of_share);
        let _ = writeln!(out, "  Share capital amount: {}", share.share_capital_amount);
    }
    out
}

pub fn update_request(request: &UpdateRequest) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  member {} ({})  {}",
        request.id, request.member_no, request.member_name, request.status
    );
    let _ = writeln!(
        out,
        "  requested by {} at {}",
        request.requested_by,
        request.requested_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let (Some(by), Some(at)) = (&request.resolved_by, request.resolved_at) {
        let _ = writeln!(
            out,
            "  {} by {by} at {}",
            request.status,
            at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    let _ = writeln!(out, "  reason: {}", request.reason);
    for change in &request.changes {
        let _ = writeln!(
            out,
            "  {}: {} -> {}",
            change.field.label(),
            or_empty(&change.old_value),
            or_empty(&change.new_value)
        );
    }
    out
}

fn or_empty(value: &str) -> &str {
    if value.is_empty() {
        EMPTY_VALUE
    } else {
        value
    }
}

pub fn request_inbox(inbox: &RequestInbox) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Pending ({})", inbox.pending_count());
    for request in &inbox.pending {
        out.push_str(&update_request(request));
    }
    let _ = writeln!(out, "Processed ({})", inbox.processed.len());
    for request in &inbox.processed {
        out.push_str(&update_request(request));
    }
    out
}

pub fn field_reference() -> String {
    let mut out = String::new();
    for field in MemberField::ALL {
        let mut line = format!("{:<20} {}", field.as_str(), field.label());
        if field.is_required() {
            line.push_str(" (required)");
        }
        if let Some(options) = field_options(*field) {
            let _ = write!(line, ": {}", options.join(", "));
        }
        let _ = writeln!(out, "{line}");
    }
    out
}

fn field_options(field: MemberField) -> Option<Vec<&'static str>> {
    match field {
        MemberField::MemberType => Some(MemberType::ALL.iter().map(|v| v.as_str()).collect()),
        MemberField::MemberClass => Some(MemberClass::ALL.iter().map(|v| v.as_str()).collect()),
        MemberField::ModeOfPayment => Some(PaymentMode::ALL.iter().map(|v| v.as_str()).collect()),
        MemberField::Gender => Some(GENDER_OPTIONS.to_vec()),
        MemberField::Caste => Some(CASTE_OPTIONS.to_vec()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
