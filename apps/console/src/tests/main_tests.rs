use super::*;
use shared::error::ErrorCode;

#[test]
fn assignments_use_wire_field_names() {
    let (field, value) = parse_assignment("contactDetails=9876543999").expect("parse");
    assert_eq!(field, MemberField::ContactDetails);
    assert_eq!(value, "9876543999");

    let (field, value) = parse_assignment("address=12 Lake View, Pune=East").expect("parse");
    assert_eq!(field, MemberField::Address);
    assert_eq!(value, "12 Lake View, Pune=East");

    assert!(parse_assignment("contactDetails").is_err());
    assert!(parse_assignment("favouriteColour=blue").is_err());
}

#[test]
fn request_update_parses_repeated_sets() {
    let cli = Cli::try_parse_from([
        "register_console",
        "--session",
        "6f1c2f0e-3f5b-4d0e-9a55-1d2b3c4d5e6f",
        "request-update",
        "001",
        "--set",
        "contactDetails=9876543999",
        "--set",
        "address=",
        "--reason",
        "phone change",
    ])
    .expect("parse");
    assert!(cli.session.is_some());
    match cli.command {
        Command::RequestUpdate {
            member_no,
            changes,
            reason,
        } => {
            assert_eq!(member_no, "001");
            assert_eq!(changes.len(), 2);
            assert_eq!(changes[1], (MemberField::Address, String::new()));
            assert_eq!(reason, "phone change");
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn login_accepts_role_names() {
    let cli = Cli::try_parse_from([
        "register_console",
        "login",
        "head1",
        "--password",
        "secret",
        "--role",
        "head",
    ])
    .expect("parse");
    assert!(matches!(cli.command, Command::Login { role: Role::Head, .. }));
}

#[test]
fn server_errors_print_as_destructive_notifications() {
    let exception = ApiException {
        code: ErrorCode::Conflict,
        title: "Request Already Processed".into(),
        message: "update request UPD-123456 is already approved".into(),
    };
    assert_eq!(
        failure_line(&exception),
        "! [Request Already Processed] update request UPD-123456 is already approved"
    );
}
