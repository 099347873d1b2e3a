use thiserror::Error;
use uuid::Uuid;

use shared_models::AppError;

pub const PATIENT_NOT_FOUND_MESSAGE: &str = "Patient not found. Please check the search criteria.";
pub const SEARCH_ERROR_MESSAGE: &str = "Error searching patient. Please try again.";
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a UID, phone number, or name.";
pub const RECORD_NOT_FOUND_MESSAGE: &str = "Medical record not found for this patient.";
pub const EXPORT_ERROR_MESSAGE: &str = "Could not export the prescription. Please try again.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("No patient matched the search")]
    NotFound,

    #[error("Patient query failed: {0}")]
    QueryFailure(String),

    #[error("Failed to load patient records: {0}")]
    AggregationFailure(String),

    #[error("Medical record {0} not found")]
    RecordNotFound(Uuid),

    #[error("Export failed: {0}")]
    Export(String),
}

impl LookupError {
    /// Operator-facing text. `NotFound` and `QueryFailure` deliberately share one message.
    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::EmptyQuery => EMPTY_QUERY_MESSAGE,
            LookupError::NotFound | LookupError::QueryFailure(_) => PATIENT_NOT_FOUND_MESSAGE,
            LookupError::AggregationFailure(_) => SEARCH_ERROR_MESSAGE,
            LookupError::RecordNotFound(_) => RECORD_NOT_FOUND_MESSAGE,
            LookupError::Export(_) => EXPORT_ERROR_MESSAGE,
        }
    }

    /// True when the store or transport failed, as opposed to an empty result.
    pub fn is_diagnostic_failure(&self) -> bool {
        matches!(
            self,
            LookupError::QueryFailure(_) | LookupError::AggregationFailure(_) | LookupError::Export(_)
        )
    }
}

impl From<LookupError> for AppError {
    fn from(error: LookupError) -> Self {
        let message = error.user_message().to_string();
        match error {
            LookupError::EmptyQuery => AppError::BadRequest(message),
            LookupError::NotFound
            | LookupError::QueryFailure(_)
            | LookupError::RecordNotFound(_) => AppError::NotFound(message),
            LookupError::AggregationFailure(_) => AppError::ExternalService(message),
            LookupError::Export(_) => AppError::Internal(message),
        }
    }
}
