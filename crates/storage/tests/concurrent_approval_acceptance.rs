use shared::domain::{FieldChange, MemberField, MemberNo, RequestStatus};
use storage::{NewUpdateRequest, StoreError, Storage};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_approvals_resolve_a_request_exactly_once() {
    let storage = Storage::seeded();
    let request = storage
        .insert_request(NewUpdateRequest {
            member_no: MemberNo::from("002"),
            requested_by: "clerk".into(),
            reason: "Correction needed in payment amount after bank verification".into(),
            changes: vec![FieldChange {
                field: MemberField::PaidAmount,
                old_value: "60000".into(),
                new_value: "65000".into(),
            }],
        })
        .await
        .expect("insert");

    let mut handles = Vec::new();
    for approver in ["head-a", "head-b", "head-c", "head-d"] {
        let storage = storage.clone();
        let id = request.id.clone();
        handles.push(tokio::spawn(async move {
            storage.approve_request(&id, approver).await
        }));
    }

    let mut approved = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.expect("join") {
            Ok(_) => approved += 1,
            Err(StoreError::InvalidTransition { .. }) => refused += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(approved, 1);
    assert_eq!(refused, 3);

    let stored = storage.get_request(&request.id).await.expect("request");
    assert_eq!(stored.status, RequestStatus::Approved);
    let member = storage
        .get_member(&MemberNo::from("002"))
        .await
        .expect("member");
    assert_eq!(member.paid_amount.as_deref(), Some("65000"));
}

#[tokio::test]
async fn clones_share_one_register() {
    let storage = Storage::seeded();
    let other = storage.clone();
    let session = other.open_session("clerk", shared::domain::Role::Admin).await;
    assert!(storage.session(&session.session_id).await.is_some());
}
