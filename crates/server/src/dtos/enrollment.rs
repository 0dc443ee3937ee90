use chrono::NaiveDateTime;
use database::entities::enrollments;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentResponse {
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
    /// Always derived from the grade, never accepted from the client.
    pub status: String,
    pub grade: Option<f64>,
    pub enrollment_date: NaiveDateTime,
}

impl From<enrollments::Model> for EnrollmentResponse {
    fn from(e: enrollments::Model) -> Self {
        Self {
            id: e.id,
            student_id: e.student_id,
            course_id: e.course_id,
            status: e.status.to_string(),
            grade: e.grade,
            enrollment_date: e.enrollment_date,
        }
    }
}

/// Student-surface enroll request. The student is inferred from the caller
/// identity, so only the course is named.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollRequest {
    #[serde(rename = "course_ID")]
    pub course_id: i32,
}

/// Admin-surface enroll override; goes through the same engine validation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminEnrollRequest {
    #[serde(rename = "student_ID")]
    pub student_id: i32,
    #[serde(rename = "course_ID")]
    pub course_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GradeRequest {
    /// 0–20, or null to clear the grade and revert the status to ENROLLED.
    /// A grade of 0 is a failing grade, not a clear.
    pub grade: Option<f64>,
}
