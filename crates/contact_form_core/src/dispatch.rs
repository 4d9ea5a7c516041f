use crate::collaborators::EmailSender;
use crate::contract::{EmailMessage, InvocationOutcome};
use crate::error::StageError;

pub async fn send_email(
    sender: &dyn EmailSender,
    message: &EmailMessage,
) -> Result<InvocationOutcome, StageError> {
    let outcome = sender.send(message).await.map_err(StageError::EmailSend)?;
    interpret_send_outcome(outcome)
}

/// Mail functions may legitimately return nothing, so only an explicit error
/// report counts as failure.
pub fn interpret_send_outcome(outcome: InvocationOutcome) -> Result<InvocationOutcome, StageError> {
    match outcome.error_indicator() {
        Some(message) => Err(StageError::EmailReported(message)),
        None => Ok(outcome),
    }
}
