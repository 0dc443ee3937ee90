use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use database::error::RegistrationError;
use log::error;
use sea_orm::DbErr;
use serde::Serialize;
use utoipa::ToSchema;

/// Error payload returned by every endpoint. Carries the message and
/// nothing else; stack traces and SQL never leak to the caller.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP-facing error: a status code plus a human-readable message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "user identity not found".to_string(),
        }
    }

    pub fn forbidden(required_roles: &str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: format!("Access denied. Required roles: {required_roles}"),
        }
    }

    pub fn conflict(message: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.to_string(),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        let status = match &err {
            RegistrationError::Unauthenticated => StatusCode::UNAUTHORIZED,
            RegistrationError::Forbidden => StatusCode::FORBIDDEN,
            RegistrationError::StudentNotFound
            | RegistrationError::InstructorNotFound
            | RegistrationError::CourseNotFound
            | RegistrationError::EnrollmentNotFound => StatusCode::NOT_FOUND,
            RegistrationError::DuplicateEnrollment => StatusCode::CONFLICT,
            RegistrationError::InsufficientCredit { .. }
            | RegistrationError::CourseFull { .. }
            | RegistrationError::InvalidGrade { .. } => StatusCode::BAD_REQUEST,
            RegistrationError::InternalInconsistency { .. } | RegistrationError::Db(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &err {
            RegistrationError::Db(e) => {
                error!("database error: {e}");
                "internal server error".to_string()
            }
            RegistrationError::InternalInconsistency { course_id, source } => {
                // Detected inconsistent state: the write committed but the
                // recount did not. Loud in the log, retriable by the caller.
                error!("enrolled count recalculation failed for course {course_id}: {source}");
                err.to_string()
            }
            other => other.to_string(),
        };

        Self { status, message }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        RegistrationError::Db(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
