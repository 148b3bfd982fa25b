//! Mutation results
//!
//! Resolvers produce a typed [`MutationOutcome`]; only at the wire boundary
//! is it flattened into the `{isSuccessful, responseMessage, data}` record
//! that clients already consume.

use async_graphql::SimpleObject;
use serde::Serialize;

use crate::validation::ValidationError;

/// `data` value of every failed mutation
pub const NO_DATA: &str = "N/A";

/// Wire shape shared by all mutations
#[derive(SimpleObject, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub is_successful: bool,
    pub response_message: String,
    /// JSON-encoded affected record, or `"N/A"`
    pub data: String,
}

/// Why a mutation did not happen
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// Payload rejected before anything was written
    Invalid(ValidationError),
    /// Target record does not exist
    NotFound { entity: &'static str, id: String },
    /// No verifiable actor behind the request
    Unauthorized,
    /// Store failure; detail has already been logged where allowed
    Persistence,
}

impl FailureReason {
    /// Client-safe explanation appended to the failure message
    pub fn detail(&self) -> String {
        match self {
            Self::Invalid(e) => format!("Invalid input: {}.", e),
            Self::NotFound { entity, id } => format!("No {} exists with id `{}`.", entity, id),
            Self::Unauthorized => "Authentication failed.".to_string(),
            Self::Persistence => "Please try again later.".to_string(),
        }
    }
}

impl From<ValidationError> for FailureReason {
    fn from(error: ValidationError) -> Self {
        Self::Invalid(error)
    }
}

/// Typed result of a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<T> {
    Success { message: String, record: T },
    Failure { message: String, reason: FailureReason },
}

impl<T> MutationOutcome<T> {
    pub fn success(message: impl Into<String>, record: T) -> Self {
        Self::Success {
            message: message.into(),
            record,
        }
    }

    pub fn failure(message: impl Into<String>, reason: FailureReason) -> Self {
        Self::Failure {
            message: message.into(),
            reason,
        }
    }

    /// Pick the success or failure message for `result`
    pub fn settle(
        result: Result<T, FailureReason>,
        success_message: &str,
        failure_message: &str,
    ) -> Self {
        match result {
            Ok(record) => Self::success(success_message, record),
            Err(reason) => Self::failure(failure_message, reason),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl<T: Serialize> MutationOutcome<T> {
    /// Flatten into the wire record
    pub fn into_response(self) -> MutationResponse {
        self.into_response_with(|_| tracing::error!("mutation record could not be encoded"))
    }

    /// Flatten into the wire record, handing any encode error to `on_encode_error`
    pub fn into_response_with(
        self,
        on_encode_error: impl FnOnce(&serde_json::Error),
    ) -> MutationResponse {
        match self {
            Self::Success { message, record } => match serde_json::to_string(&record) {
                Ok(data) => MutationResponse {
                    is_successful: true,
                    response_message: message,
                    data,
                },
                Err(e) => {
                    on_encode_error(&e);
                    MutationResponse {
                        is_successful: false,
                        response_message: format!("{} {}", message, FailureReason::Persistence.detail()),
                        data: NO_DATA.to_string(),
                    }
                }
            },
            Self::Failure { message, reason } => MutationResponse {
                is_successful: false,
                response_message: format!("{} {}", message, reason.detail()),
                data: NO_DATA.to_string(),
            },
        }
    }
}

impl<T: Serialize> From<MutationOutcome<T>> for MutationResponse {
    fn from(outcome: MutationOutcome<T>) -> Self {
        outcome.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Record {
        record_id: String,
    }

    #[test]
    fn test_success_carries_encoded_record() {
        let response = MutationOutcome::success(
            "Banner was successfully deleted!",
            Record { record_id: "b1".into() },
        )
        .into_response();

        assert!(response.is_successful);
        assert_eq!(response.response_message, "Banner was successfully deleted!");
        let data: serde_json::Value = serde_json::from_str(&response.data).unwrap();
        assert_eq!(data, json!({"recordId": "b1"}));
    }

    #[test]
    fn test_failure_has_no_data() {
        let response: MutationResponse = MutationOutcome::<Record>::failure(
            "Failed to delete Banner!",
            FailureReason::NotFound {
                entity: "banner",
                id: "b9".into(),
            },
        )
        .into();

        assert!(!response.is_successful);
        assert_eq!(response.data, NO_DATA);
        assert_eq!(
            response.response_message,
            "Failed to delete Banner! No banner exists with id `b9`."
        );
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("token=abc123"))
        }
    }

    #[test]
    fn test_encode_failure_becomes_generic_failure() {
        let mut seen = None;
        let response = MutationOutcome::success("Product was successfully added!", Unencodable)
            .into_response_with(|e| seen = Some(e.to_string()));

        assert!(!response.is_successful);
        assert_eq!(response.data, NO_DATA);
        assert_eq!(
            response.response_message,
            "Product was successfully added! Please try again later."
        );
        assert!(seen.is_some_and(|detail| detail.contains("abc123")));
        assert!(!response.response_message.contains("abc123"));
    }

    #[test]
    fn test_invalid_failure_names_field() {
        let response = MutationOutcome::<Record>::failure(
            "Failed to add product!",
            FailureReason::Invalid(ValidationError::InvalidLink {
                field: "productImageLinks[0]".into(),
                value: "ftp://bad".into(),
            }),
        )
        .into_response();
        assert!(response.response_message.contains("productImageLinks[0]"));
        assert!(!response.response_message.contains("ftp://bad"));
    }

    #[test]
    fn test_persistence_failure_is_generic() {
        let response = MutationOutcome::<Record>::failure("Failed to add banner!", FailureReason::Persistence)
            .into_response();
        assert_eq!(response.response_message, "Failed to add banner! Please try again later.");
        assert!(!MutationOutcome::<Record>::failure("x", FailureReason::Unauthorized).is_success());
    }
}
