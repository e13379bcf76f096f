use super::*;
use shared::domain::{MemberField, RequestStatus};

struct Fixture {
    ctx: ApiContext,
    admin: SessionId,
    head: SessionId,
}

async fn setup_with_delay(submit_delay: Duration) -> Fixture {
    let ctx = ApiContext::new(Storage::seeded(), WorkflowSettings { submit_delay });
    let admin = login(&ctx, "admin1", "secret", Role::Admin)
        .await
        .expect("admin login")
        .session_id;
    let head = login(&ctx, "head1", "secret", Role::Head)
        .await
        .expect("head login")
        .session_id;
    Fixture { ctx, admin, head }
}

async fn setup() -> Fixture {
    setup_with_delay(Duration::ZERO).await
}

fn draft(entries: &[(MemberField, &str)]) -> MemberDraft {
    entries
        .iter()
        .map(|(field, value)| (*field, value.to_string()))
        .collect()
}

fn new_member_draft() -> MemberDraft {
    draft(&[
        (MemberField::MemberNo, "011"),
        (MemberField::MemberName, "Kavya Rao"),
        (MemberField::MemberType, "Associate"),
        (MemberField::SiteNo, "5"),
        (MemberField::ContactDetails, "9000000001"),
    ])
}

fn numbers(list: &MemberListResponse) -> Vec<&str> {
    list.members.iter().map(|m| m.member_no.as_str()).collect()
}

#[tokio::test]
async fn login_requires_username_and_password() {
    let ctx = ApiContext::new(Storage::new(), WorkflowSettings::default());
    let err = login(&ctx, "  ", "secret", Role::Admin)
        .await
        .expect_err("blank username");
    assert_eq!(err.code, ErrorCode::Validation);
    let err = login(&ctx, "clerk", "", Role::Admin)
        .await
        .expect_err("blank password");
    assert_eq!(err.title, "Login Failed");
}

#[tokio::test]
async fn unknown_or_closed_session_is_unauthorized() {
    let fx = setup().await;
    let stranger = SessionId::generate();
    let err = member_dashboard(&fx.ctx, stranger, SearchKey::MemberNo, None)
        .await
        .expect_err("unknown session");
    assert_eq!(err.code, ErrorCode::Unauthorized);

    logout(&fx.ctx, fx.admin).await.expect("logout");
    let err = member_dashboard(&fx.ctx, fx.admin, SearchKey::MemberNo, None)
        .await
        .expect_err("closed session");
    assert_eq!(err.code, ErrorCode::Unauthorized);
}

#[tokio::test]
async fn adding_a_complete_member_lists_it() {
    let fx = setup().await;
    let added = add_member(&fx.ctx, fx.admin, &new_member_draft())
        .await
        .expect("add");
    assert_eq!(added.notification.title, "Member Added Successfully");
    assert_eq!(
        added.notification.description,
        "Member Kavya Rao has been added to the system."
    );

    let list = member_dashboard(&fx.ctx, fx.admin, SearchKey::MemberNo, None)
        .await
        .expect("list");
    assert_eq!(numbers(&list), vec!["001", "002", "003", "010", "011"]);

    let seeded = &list.members[0];
    assert_eq!(seeded.total_amount, "₹100,000");
    assert_eq!(seeded.remaining_amount, "₹25,000");
    assert_eq!(seeded.mode_of_payment, "Bank Transfer");
    let added = &list.members[4];
    assert_eq!(added.total_amount, "₹0");
    assert_eq!(added.paid_amount, "₹0");
    assert_eq!(added.mode_of_payment, "N/A");
}

#[tokio::test]
async fn head_role_may_add_members_too() {
    let fx = setup().await;
    add_member(&fx.ctx, fx.head, &new_member_draft())
        .await
        .expect("add");
    assert_eq!(fx.ctx.storage.member_count().await, 5);
}

#[tokio::test]
async fn omitting_any_required_field_adds_nothing() {
    let fx = setup().await;
    for field in MemberField::REQUIRED {
        let mut fields = new_member_draft();
        fields.remove(field);
        let err = add_member(&fx.ctx, fx.admin, &fields)
            .await
            .expect_err("missing field");
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.title, "Missing Required Fields");
    }
    assert_eq!(fx.ctx.storage.member_count().await, 4);
}

#[tokio::test]
async fn duplicate_member_number_conflicts() {
    let fx = setup().await;
    let mut fields = new_member_draft();
    fields.insert(MemberField::MemberNo, "002".into());
    let err = add_member(&fx.ctx, fx.admin, &fields)
        .await
        .expect_err("duplicate");
    assert_eq!(err.code, ErrorCode::Conflict);
    assert_eq!(fx.ctx.storage.member_count().await, 4);
}

#[tokio::test]
async fn dashboard_search_and_clear() {
    let fx = setup().await;
    let hits = member_dashboard(&fx.ctx, fx.admin, SearchKey::MemberNo, Some("01"))
        .await
        .expect("search");
    assert_eq!(numbers(&hits), vec!["001", "010"]);
    assert_eq!(hits.total_records, 2);
    assert_eq!(hits.search.as_ref().map(|s| s.term.as_str()), Some("01"));

    let cleared = member_dashboard(&fx.ctx, fx.admin, SearchKey::MemberNo, Some(""))
        .await
        .expect("clear");
    assert_eq!(numbers(&cleared), vec!["001", "002", "003", "010"]);
    assert!(cleared.search.is_none());
    assert!(cleared.pending_requests.is_none());
}

#[tokio::test]
async fn identical_draft_is_never_submitted() {
    let fx = setup().await;
    let member_no = MemberNo::from("001");
    let unchanged = draft(&[
        (MemberField::ContactDetails, "9876543210"),
        (MemberField::MemberName, "Rajesh Kumar"),
    ]);
    for reason in ["", "phone change"] {
        let err = submit_update_request(&fx.ctx, fx.admin, &member_no, &unchanged, reason)
            .await
            .expect_err("no changes");
        assert_eq!(err.title, "No Changes Detected");
    }
    assert!(fx.ctx.storage.list_requests().await.is_empty());
}

#[tokio::test]
async fn blank_reason_is_refused() {
    let fx = setup().await;
    let err = submit_update_request(
        &fx.ctx,
        fx.admin,
        &MemberNo::from("001"),
        &draft(&[(MemberField::Address, "456 New Address, Delhi")]),
        " \n\t",
    )
    .await
    .expect_err("reason required");
    assert_eq!(err.title, "Reason Required");
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn proposer_change_is_queued_and_applied_on_approval() {
    let fx = setup().await;
    let submitted = submit_update_request(
        &fx.ctx,
        fx.admin,
        &MemberNo::from("001"),
        &draft(&[(MemberField::ContactDetails, "9876543999")]),
        "phone change",
    )
    .await
    .expect("submit");

    let request = submitted.data;
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.requested_by, "admin1");
    assert_eq!(request.changes.len(), 1);
    assert_eq!(request.changes[0].field, MemberField::ContactDetails);
    assert_eq!(request.changes[0].old_value, "9876543210");
    assert_eq!(request.changes[0].new_value, "9876543999");
    assert!(submitted
        .notification
        .description
        .contains(request.id.as_str()));

    let inbox = request_inbox(&fx.ctx, fx.head).await.expect("inbox");
    assert_eq!(inbox.pending_count(), 1);
    let list = member_dashboard(&fx.ctx, fx.head, SearchKey::MemberNo, None)
        .await
        .expect("list");
    assert_eq!(list.pending_requests, Some(1));

    let approved = approve_request(&fx.ctx, fx.head, &request.id)
        .await
        .expect("approve");
    assert_eq!(approved.data.status, RequestStatus::Approved);
    assert_eq!(approved.notification.title, "Request Approved");

    let detail = member_detail(&fx.ctx, fx.admin, &MemberNo::from("001"))
        .await
        .expect("detail");
    let contact = detail.sections[1]
        .entries
        .iter()
        .find(|entry| entry.label == "Contact Details")
        .expect("contact entry");
    assert_eq!(contact.value, "9876543999");

    let err = approve_request(&fx.ctx, fx.head, &request.id)
        .await
        .expect_err("second approval");
    assert_eq!(err.code, ErrorCode::Conflict);
    assert_eq!(err.title, "Request Already Processed");
}

#[tokio::test]
async fn rejected_request_cannot_be_approved_later() {
    let fx = setup().await;
    let request = submit_update_request(
        &fx.ctx,
        fx.admin,
        &MemberNo::from("002"),
        &draft(&[(MemberField::PaidAmount, "65000")]),
        "Correction needed in payment amount after bank verification",
    )
    .await
    .expect("submit")
    .data;

    let rejected = reject_request(&fx.ctx, fx.head, &request.id)
        .await
        .expect("reject");
    assert_eq!(rejected.data.status, RequestStatus::Rejected);

    let err = approve_request(&fx.ctx, fx.head, &request.id)
        .await
        .expect_err("already rejected");
    assert_eq!(err.code, ErrorCode::Conflict);

    let summary = financial_summary(&fx.ctx, fx.head, &MemberNo::from("002"))
        .await
        .expect("summary");
    assert_eq!(summary.paid_amount, "₹60,000");

    let inbox = request_inbox(&fx.ctx, fx.head).await.expect("inbox");
    assert!(inbox.pending.is_empty());
    assert_eq!(inbox.processed.len(), 1);
}

#[tokio::test]
async fn roles_are_enforced_at_the_operation_boundary() {
    let fx = setup().await;
    let member_no = MemberNo::from("003");
    let change = draft(&[(MemberField::Address, "12 Lake View, Pune")]);

    let err = submit_update_request(&fx.ctx, fx.head, &member_no, &change, "moved")
        .await
        .expect_err("head cannot submit");
    assert_eq!(err.code, ErrorCode::Forbidden);

    let request = submit_update_request(&fx.ctx, fx.admin, &member_no, &change, "moved")
        .await
        .expect("submit")
        .data;

    for result in [
        approve_request(&fx.ctx, fx.admin, &request.id).await.map(|_| ()),
        reject_request(&fx.ctx, fx.admin, &request.id).await.map(|_| ()),
        request_inbox(&fx.ctx, fx.admin).await.map(|_| ()),
        get_update_request(&fx.ctx, fx.admin, &request.id)
            .await
            .map(|_| ()),
    ] {
        let err = result.expect_err("admin cannot resolve");
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    let stored = get_update_request(&fx.ctx, fx.head, &request.id)
        .await
        .expect("head can read");
    assert!(stored.is_pending());
}

#[tokio::test]
async fn invalid_values_and_member_number_edits_are_refused() {
    let fx = setup().await;
    let member_no = MemberNo::from("001");

    let err = submit_update_request(
        &fx.ctx,
        fx.admin,
        &member_no,
        &draft(&[(MemberField::MemberType, "Gold")]),
        "upgrade",
    )
    .await
    .expect_err("invalid type");
    assert_eq!(err.title, "Invalid Field Value");

    let err = submit_update_request(
        &fx.ctx,
        fx.admin,
        &member_no,
        &draft(&[(MemberField::MemberNo, "099")]),
        "renumber",
    )
    .await
    .expect_err("member number locked");
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(fx.ctx.storage.list_requests().await.is_empty());
}

#[tokio::test]
async fn submitting_for_unknown_member_is_not_found() {
    let fx = setup().await;
    let err = submit_update_request(
        &fx.ctx,
        fx.admin,
        &MemberNo::from("404"),
        &draft(&[(MemberField::Address, "nowhere")]),
        "typo",
    )
    .await
    .expect_err("missing member");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test(start_paused = true)]
async fn submission_delay_does_not_block_other_operations() {
    let fx = setup_with_delay(DEFAULT_SUBMIT_DELAY).await;
    let ctx = fx.ctx.clone();
    let admin = fx.admin;
    let submission = tokio::spawn(async move {
        submit_update_request(
            &ctx,
            admin,
            &MemberNo::from("010"),
            &draft(&[(MemberField::ContactDetails, "9876543000")]),
            "new number",
        )
        .await
    });
    tokio::task::yield_now().await;

    let list = member_dashboard(&fx.ctx, fx.head, SearchKey::MemberNo, None)
        .await
        .expect("list while submitting");
    assert_eq!(list.pending_requests, Some(0));
    assert!(!submission.is_finished());

    let submitted = submission.await.expect("join").expect("submit");
    assert!(submitted.data.is_pending());
    assert_eq!(fx.ctx.storage.pending_request_count().await, 1);
}
