use thiserror::Error;
use validator::ValidationErrors;

pub mod board;
pub mod router;
pub mod session;
pub mod todo;
pub mod user;

#[cfg(test)]
pub(crate) mod test_util;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input was invalid: {0}")]
    Invalid(ValidationErrors),
    #[error("this view is not allowed to {action}")]
    Forbidden { action: &'static str },
    #[error("requested data does not exist")]
    DoesNotExist,
    #[error("the session is no longer authorized")]
    Unauthorized,
    #[error("the backend rejected the request: {0}")]
    Rejected(RejectionDetail),
    #[error("failed to {action} due to a communication failure: {cause}")]
    RetrieveFailure {
        action: String,
        #[source]
        cause: anyhow::Error,
    },
}

#[derive(Error, Debug)]
pub enum DrivenPortError {
    #[error("a communication failure occurred: {0}")]
    CommsFailure(anyhow::Error),
    #[error("the request was not authorized")]
    Unauthorized,
    #[error("the requested data does not exist")]
    DoesNotExist,
    #[error("the request was rejected: {0}")]
    Rejected(RejectionDetail),
}

impl DrivenPortError {
    /// Converts this DrivenPortError to a domain error with some extra info on the [action]
    /// being taken when communicating over the port
    fn into_error_trying_to(self, action: &str) -> Error {
        match self {
            Self::DoesNotExist => Error::DoesNotExist,
            Self::Unauthorized => Error::Unauthorized,
            Self::Rejected(detail) => Error::Rejected(detail),
            Self::CommsFailure(err) => Error::RetrieveFailure {
                action: action.into(),
                cause: err,
            },
        }
    }
}

impl From<anyhow::Error> for DrivenPortError {
    fn from(value: anyhow::Error) -> Self {
        Self::CommsFailure(value)
    }
}

#[cfg(test)]
#[allow(clippy::items_after_test_module)]
mod driven_port_error_clone {
    use super::DrivenPortError;
    use anyhow::anyhow;

    impl Clone for DrivenPortError {
        fn clone(&self) -> Self {
            match self {
                Self::CommsFailure(err) => Self::CommsFailure(anyhow!(format!("{}", err))),
                Self::Unauthorized => Self::Unauthorized,
                Self::DoesNotExist => Self::DoesNotExist,
                Self::Rejected(detail) => Self::Rejected(detail.clone()),
            }
        }
    }
}

/// A single field-level complaint from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Explanation the backend attached to a rejected request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionDetail {
    Message(String),
    FieldIssues(Vec<FieldIssue>),
    Unexplained,
}

impl RejectionDetail {
    /// Produces one line describing the rejection, or [None] if the backend gave no usable reason
    pub fn summary(&self) -> Option<String> {
        match self {
            Self::Message(message) if !message.trim().is_empty() => Some(message.clone()),
            Self::FieldIssues(issues) if !issues.is_empty() => Some(
                issues
                    .iter()
                    .map(|issue| format!("{}: {}", issue.field, issue.message))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }
}

impl std::fmt::Display for RejectionDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.summary() {
            Some(summary) => write!(f, "{summary}"),
            None => write!(f, "no reason given"),
        }
    }
}

/// Flattens client-side validation failures into the same shape the backend uses
pub fn validation_issues(errors: &ValidationErrors) -> Vec<FieldIssue> {
    let mut issues: Vec<FieldIssue> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |err| FieldIssue {
                field: field.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| err.code.to_string()),
            })
        })
        .collect();
    issues.sort_by(|a, b| a.field.cmp(&b.field));

    issues
}
