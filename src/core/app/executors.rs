use crate::core::app::{AppAction, ValidationRequest};
use crate::core::validator::CredentialValidator;

pub const VALIDATION_ABORTED: &str = "An unknown error occurred during initialization.";

/// Runs one validation request and reports the result as an action.
pub async fn validate_credential(
    validator: &dyn CredentialValidator,
    request: ValidationRequest,
) -> AppAction {
    let valid = validator.validate(&request.credential).await;
    AppAction::ValidationCompleted {
        request_id: request.request_id,
        valid,
    }
}
