use crate::domain::{FieldIssue, RejectionDetail};
use serde::Deserialize;

/// Body the backend sends along with a rejected request
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Detail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Detail {
    Message(String),
    Fields(Vec<FieldError>),
    Other(serde_json::Value),
}

/// One entry of a field-level validation failure. `loc` is the path to the offending field,
/// e.g. `["body", "email"]`.
#[derive(Debug, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
}

impl FieldError {
    fn field_name(&self) -> String {
        match self.loc.last() {
            Some(serde_json::Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

impl From<ErrorBody> for RejectionDetail {
    fn from(value: ErrorBody) -> Self {
        match value.detail {
            Some(Detail::Message(message)) => RejectionDetail::Message(message),
            Some(Detail::Fields(errors)) => RejectionDetail::FieldIssues(
                errors
                    .into_iter()
                    .map(|err| FieldIssue {
                        field: err.field_name(),
                        message: err.msg,
                    })
                    .collect(),
            ),
            Some(Detail::Other(_)) | None => RejectionDetail::Unexplained,
        }
    }
}

/// Makes sense of whatever the backend put in an error response body
pub fn rejection_from_body(body: &str) -> RejectionDetail {
    serde_json::from_str::<ErrorBody>(body)
        .map(RejectionDetail::from)
        .unwrap_or(RejectionDetail::Unexplained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[test]
    fn field_errors_use_last_location_segment() {
        let detail = rejection_from_body(
            r#"{"detail": [
                {"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"},
                {"loc": ["body", "password"], "msg": "field required", "type": "missing"}
            ]}"#,
        );

        assert_that!(detail.summary()).is_some().is_equal_to(
            "email: value is not a valid email address, password: field required".to_owned(),
        );
    }

    #[test]
    fn flat_message_is_kept() {
        let detail = rejection_from_body(r#"{"detail": "Email already registered"}"#);
        assert_eq!(
            RejectionDetail::Message("Email already registered".to_owned()),
            detail
        );
    }

    #[test]
    fn unusable_bodies_are_unexplained() {
        assert_eq!(RejectionDetail::Unexplained, rejection_from_body("<html>oops</html>"));
        assert_eq!(RejectionDetail::Unexplained, rejection_from_body(r#"{"detail": 42}"#));
        assert_eq!(RejectionDetail::Unexplained, rejection_from_body("{}"));
    }
}
