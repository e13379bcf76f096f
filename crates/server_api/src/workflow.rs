use shared::{
    domain::{
        FieldChange, FieldValueError, MemberClass, MemberDraft, MemberField, MemberRecord,
        MemberType, PaymentMode,
    },
    error::{ApiError, ErrorCode},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Please make at least one change before submitting the request.")]
    NoChanges,
    #[error("Please provide a reason for this update request.")]
    ReasonRequired,
    #[error("{0} identifies the record and cannot be changed through an update request.")]
    ImmutableField(MemberField),
    #[error("{0}")]
    InvalidValue(#[from] FieldValueError),
}

impl From<SubmissionError> for ApiError {
    fn from(value: SubmissionError) -> Self {
        let title = match &value {
            SubmissionError::NoChanges => "No Changes Detected",
            SubmissionError::ReasonRequired => "Reason Required",
            SubmissionError::ImmutableField(_) | SubmissionError::InvalidValue(_) => {
                "Invalid Field Value"
            }
        };
        ApiError::new(ErrorCode::Validation, value.to_string()).with_title(title)
    }
}

/// Every draft entry whose value differs from the record's current value,
/// in field declaration order. Unset record fields compare as "".
pub fn compute_changes(record: &MemberRecord, draft: &MemberDraft) -> Vec<FieldChange> {
    draft
        .iter()
        .filter_map(|(field, raw)| {
            let old_value = record.field_value(*field);
            let new_value = canonical_value(*field, raw);
            (new_value != old_value).then(|| FieldChange {
                field: *field,
                old_value,
                new_value,
            })
        })
        .collect()
}

/// The form a draft value takes once stored: choice fields use their listed
/// spelling and a blank optional field is "". Unparseable values stay as
/// typed so validation can report them.
fn canonical_value(field: MemberField, raw: &str) -> String {
    if !field.is_required() && raw.trim().is_empty() {
        return String::new();
    }
    let listed = match field {
        MemberField::MemberType => raw.parse::<MemberType>().ok().map(MemberType::as_str),
        MemberField::MemberClass => raw.parse::<MemberClass>().ok().map(MemberClass::as_str),
        MemberField::ModeOfPayment => raw.parse::<PaymentMode>().ok().map(PaymentMode::as_str),
        _ => None,
    };
    listed.map_or_else(|| raw.to_string(), str::to_string)
}

/// Validates a draft against the stored record and returns the change list
/// to enqueue. The checks run in the order the form reports them: changes
/// first, then the reason, then the values themselves.
pub fn prepare_submission(
    record: &MemberRecord,
    draft: &MemberDraft,
    reason: &str,
) -> Result<Vec<FieldChange>, SubmissionError> {
    let changes = compute_changes(record, draft);
    if changes.is_empty() {
        return Err(SubmissionError::NoChanges);
    }
    if reason.trim().is_empty() {
        return Err(SubmissionError::ReasonRequired);
    }

    let mut preview = record.clone();
    for change in &changes {
        if change.field == MemberField::MemberNo {
            return Err(SubmissionError::ImmutableField(change.field));
        }
        preview.set_field(change.field, &change.new_value)?;
    }
    Ok(changes)
}
