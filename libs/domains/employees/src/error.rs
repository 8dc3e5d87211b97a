use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// MongoDB server code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum EmployeeError {
    #[error("Employee not found: {0}")]
    NotFound(String),

    #[error("employee_id '{0}' already exists")]
    DuplicateKey(String),

    #[error("joining_date must be a valid date string (e.g. 2023-01-15), got '{0}'")]
    InvalidDate(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type EmployeeResult<T> = Result<T, EmployeeError>;

/// Convert EmployeeError to AppError for standardized error responses
impl From<EmployeeError> for AppError {
    fn from(err: EmployeeError) -> Self {
        match err {
            EmployeeError::NotFound(_) => AppError::NotFound("Employee not found".to_string()),
            err @ EmployeeError::DuplicateKey(_) => AppError::BadRequest(err.to_string()),
            err @ EmployeeError::InvalidDate(_) => AppError::BadRequest(err.to_string()),
            EmployeeError::Validation(msg) => AppError::BadRequest(msg),
            EmployeeError::Database(msg) => AppError::Database(msg),
            EmployeeError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for EmployeeError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for EmployeeError {
    fn from(err: mongodb::error::Error) -> Self {
        EmployeeError::Database(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for EmployeeError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        EmployeeError::Internal(format!("Malformed employee document: {}", err))
    }
}

/// True when `err` is a write rejected by a unique index
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_codes() {
        let cases = [
            (EmployeeError::NotFound("E1".into()), StatusCode::NOT_FOUND),
            (EmployeeError::DuplicateKey("E1".into()), StatusCode::BAD_REQUEST),
            (EmployeeError::InvalidDate("soon".into()), StatusCode::BAD_REQUEST),
            (EmployeeError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (EmployeeError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (EmployeeError::Internal("oops".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_duplicate_key_message_names_the_id() {
        let err = EmployeeError::DuplicateKey("E001".into());
        assert_eq!(err.to_string(), "employee_id 'E001' already exists");
    }

    #[test]
    fn test_non_write_error_is_not_duplicate() {
        let err = mongodb::error::Error::from(std::io::Error::other("connection reset"));
        assert!(!is_duplicate_key(&err));
    }
}
