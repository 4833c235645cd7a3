use std::collections::BTreeMap;

use thiserror::Error;

/// Field name to the messages raised against it. Non-field errors use `__all__`.
pub type FormErrors = BTreeMap<String, Vec<String>>;

pub const NON_FIELD_ERRORS: &str = "__all__";

#[derive(Debug, Error)]
pub enum PollError {
    #[error("Poll question {0} does not exist.")]
    NotFound(String),
    #[error("Poll question {0} does not allow voting.")]
    NotVotable(String),
    #[error("Poll question {0} has not been opened yet.")]
    NotOpened(String),
    #[error("Please select choice")]
    NoChoiceSelected,
    #[error("Authentication required")]
    Unauthorized,
    #[error("You do not have permission to perform this action.")]
    Forbidden,
    #[error("Invalid form submission")]
    Validation(FormErrors),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub fn add_error(errors: &mut FormErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}
