use sea_orm::DbErr;
use thiserror::Error;

/// Failure taxonomy for registration operations. Every engine rejection is
/// typed and user-facing; the server maps each variant to its HTTP status
/// class. Validation messages carry the numbers the caller needs to act.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("user identity not found")]
    Unauthenticated,

    #[error("access denied")]
    Forbidden,

    #[error("student not found")]
    StudentNotFound,

    #[error("instructor not found")]
    InstructorNotFound,

    #[error("course not found")]
    CourseNotFound,

    #[error("enrollment not found")]
    EnrollmentNotFound,

    #[error("this student is already enrolled in this course")]
    DuplicateEnrollment,

    #[error("insufficient ECTS: you need {needed} ECTS but only have {available} available")]
    InsufficientCredit { needed: i32, available: i32 },

    #[error("this course is full ({enrolled}/{quota})")]
    CourseFull { enrolled: u64, quota: i32 },

    #[error("invalid grade {value}: grades must be between 0 and 20")]
    InvalidGrade { value: f64 },

    /// The primary write committed but the enrolled-count recomputation
    /// failed. The write is never rolled back for this; recomputation is
    /// idempotent and must be retried by the caller or a reconciliation job.
    #[error("enrolled count recalculation failed for course {course_id}")]
    InternalInconsistency {
        course_id: i32,
        #[source]
        source: DbErr,
    },

    #[error(transparent)]
    Db(#[from] DbErr),
}
