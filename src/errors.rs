use serde::Serialize;
use uuid::Uuid;

/// Error type for receiving-session operations.
///
/// Free-typed quantities are clamped upstream and never surface here; what
/// remains is contract misuse (resolving a pending action that does not
/// exist, editing past an unresolved one) and lookup or collaborator
/// failures.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum ReceivingError {
    #[error("Transfer line {0} not found in this session")]
    LineNotFound(Uuid),

    #[error("Serial {serial_id} is not on the roster of line {line_id}")]
    SerialNotFound { line_id: Uuid, serial_id: Uuid },

    #[error("A pending action is awaiting confirmation; confirm or cancel it first")]
    PendingActionOutstanding,

    #[error("No pending action to resolve")]
    NoPendingAction,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transfer fetch failed: {0}")]
    FetchError(String),

    #[error("Submission error: {0}")]
    SubmissionError(String),
}

impl From<validator::ValidationErrors> for ReceivingError {
    fn from(err: validator::ValidationErrors) -> Self {
        ReceivingError::ValidationError(err.to_string())
    }
}

impl ReceivingError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ReceivingError::InvalidInput(message.into())
    }

    pub fn submission(message: impl Into<String>) -> Self {
        ReceivingError::SubmissionError(message.into())
    }

    /// True when the failure is a misuse of the session protocol rather
    /// than bad data or a collaborator fault. Caller errors indicate a bug
    /// in the embedding form, not something to surface to the operator.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::LineNotFound(_)
                | Self::SerialNotFound { .. }
                | Self::PendingActionOutstanding
                | Self::NoPendingAction
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_ids() {
        let line_id = Uuid::new_v4();
        let serial_id = Uuid::new_v4();

        assert!(ReceivingError::LineNotFound(line_id)
            .to_string()
            .contains(&line_id.to_string()));

        let err = ReceivingError::SerialNotFound { line_id, serial_id };
        let message = err.to_string();
        assert!(message.contains(&line_id.to_string()));
        assert!(message.contains(&serial_id.to_string()));
    }

    #[test]
    fn constructor_helpers_wrap_their_messages() {
        let err = ReceivingError::invalid_input("duplicate line id");
        assert!(matches!(err, ReceivingError::InvalidInput(ref msg) if msg == "duplicate line id"));

        let err = ReceivingError::submission("inventory service unavailable");
        assert!(
            matches!(err, ReceivingError::SubmissionError(ref msg) if msg == "inventory service unavailable")
        );
    }

    #[test]
    fn protocol_misuse_is_classified_as_caller_error() {
        assert!(ReceivingError::PendingActionOutstanding.is_caller_error());
        assert!(ReceivingError::NoPendingAction.is_caller_error());
        assert!(ReceivingError::LineNotFound(Uuid::new_v4()).is_caller_error());
        assert!(!ReceivingError::ValidationError("bad".into()).is_caller_error());
        assert!(!ReceivingError::SubmissionError("down".into()).is_caller_error());
    }

    #[test]
    fn validation_errors_convert_with_field_context() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(range(min = 1))]
            quantity: i32,
        }

        let err: ReceivingError = Probe { quantity: 0 }.validate().unwrap_err().into();
        assert!(matches!(err, ReceivingError::ValidationError(_)));
        assert!(err.to_string().contains("quantity"));
    }
}
