use crate::dtos::course::CourseResponse;
use crate::dtos::enrollment::{EnrollRequest, EnrollmentResponse};
use crate::dtos::student::StudentResponse;
use crate::error::ApiError;
use crate::identity::Identity;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use database::error::RegistrationError;
use database::services::{EnrollmentService, ScopeService};
use log::info;
use sea_orm::DatabaseConnection;

/// Get the calling student's profile
#[utoipa::path(
    get,
    path = "/student/profile",
    responses(
        (status = 200, description = "Student profile", body = StudentResponse),
        (status = 401, description = "No resolvable identity"),
        (status = 404, description = "Identity matches no student record")
    ),
    security(("jwt" = [])),
    tag = "Student"
)]
pub async fn profile(
    State(db): State<DatabaseConnection>,
    identity: Identity,
) -> Result<Json<StudentResponse>, ApiError> {
    let email = identity.email.as_deref().ok_or_else(ApiError::unauthenticated)?;

    let student = ScopeService::find_student_by_email(&db, email)
        .await?
        .ok_or(RegistrationError::StudentNotFound)?;

    Ok(Json(student.into()))
}

/// Get the calling student's enrollments
#[utoipa::path(
    get,
    path = "/student/enrollments",
    responses(
        (status = 200, description = "Enrollments of the calling student", body = [EnrollmentResponse]),
        (status = 401, description = "No resolvable identity")
    ),
    security(("jwt" = [])),
    tag = "Student"
)]
pub async fn my_enrollments(
    State(db): State<DatabaseConnection>,
    identity: Identity,
) -> Result<Json<Vec<EnrollmentResponse>>, ApiError> {
    let email = identity.email.as_deref().ok_or_else(ApiError::unauthenticated)?;

    // An identity with no student record sees an empty list, not an error.
    let Some(student) = ScopeService::find_student_by_email(&db, email).await? else {
        return Ok(Json(Vec::new()));
    };

    let enrollments = ScopeService::student_enrollments(&db, student.id).await?;
    Ok(Json(enrollments.into_iter().map(Into::into).collect()))
}

/// Get the courses the calling student can still enroll in
#[utoipa::path(
    get,
    path = "/student/courses/available",
    responses(
        (status = 200, description = "Active courses not yet enrolled or passed", body = [CourseResponse]),
        (status = 401, description = "No resolvable identity")
    ),
    security(("jwt" = [])),
    tag = "Student"
)]
pub async fn available_courses(
    State(db): State<DatabaseConnection>,
    identity: Identity,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let email = identity.email.as_deref().ok_or_else(ApiError::unauthenticated)?;

    let Some(student) = ScopeService::find_student_by_email(&db, email).await? else {
        return Ok(Json(Vec::new()));
    };

    let courses = ScopeService::available_courses(&db, student.id).await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

/// Enroll the calling student in a course
#[utoipa::path(
    post,
    path = "/student/enrollments",
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Enrollment created", body = EnrollmentResponse),
        (status = 400, description = "Insufficient ECTS or course full"),
        (status = 401, description = "No resolvable identity"),
        (status = 404, description = "Student or course not found"),
        (status = 409, description = "Already enrolled in this course")
    ),
    security(("jwt" = [])),
    tag = "Student"
)]
pub async fn enroll(
    State(db): State<DatabaseConnection>,
    identity: Identity,
    Json(body): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    let email = identity.email.as_deref().ok_or_else(ApiError::unauthenticated)?;

    let enrollment = EnrollmentService::enroll_by_email(&db, email, body.course_id).await?;
    info!("student {email} enrolled in course {}", body.course_id);

    Ok((StatusCode::CREATED, Json(enrollment.into())))
}
