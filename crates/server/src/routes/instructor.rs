use crate::dtos::course::CourseResponse;
use crate::dtos::enrollment::{EnrollmentResponse, GradeRequest};
use crate::dtos::instructor::InstructorResponse;
use crate::error::ApiError;
use crate::identity::Identity;
use axum::Json;
use axum::extract::{Path, State};
use database::entities::{courses, enrollments};
use database::error::RegistrationError;
use database::services::{EnrollmentService, ScopeService};
use models::role::Role;
use sea_orm::{DatabaseConnection, EntityTrait};

/// Get the calling instructor's profile
#[utoipa::path(
    get,
    path = "/instructor/profile",
    responses(
        (status = 200, description = "Instructor profile", body = InstructorResponse),
        (status = 401, description = "No resolvable identity"),
        (status = 404, description = "Identity matches no instructor record")
    ),
    security(("jwt" = [])),
    tag = "Instructor"
)]
pub async fn profile(
    State(db): State<DatabaseConnection>,
    identity: Identity,
) -> Result<Json<InstructorResponse>, ApiError> {
    let email = identity.email.as_deref().ok_or_else(ApiError::unauthenticated)?;

    let instructor = ScopeService::find_instructor_by_email(&db, email)
        .await?
        .ok_or(RegistrationError::InstructorNotFound)?;

    Ok(Json(instructor.into()))
}

/// Get the courses taught by the calling instructor (admins see all)
#[utoipa::path(
    get,
    path = "/instructor/courses",
    responses(
        (status = 200, description = "Courses in the caller's scope", body = [CourseResponse]),
        (status = 401, description = "No resolvable identity")
    ),
    security(("jwt" = [])),
    tag = "Instructor"
)]
pub async fn courses(
    State(db): State<DatabaseConnection>,
    identity: Identity,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    // Admins see all courses, no narrowing applied
    if identity.role == Some(Role::Admin) {
        let all = courses::Entity::find().all(&db).await?;
        return Ok(Json(all.into_iter().map(Into::into).collect()));
    }

    let email = identity.email.as_deref().ok_or_else(ApiError::unauthenticated)?;
    let own = ScopeService::instructor_courses(&db, email).await?;
    Ok(Json(own.into_iter().map(Into::into).collect()))
}

/// Get enrollments in the calling instructor's courses (admins see all)
#[utoipa::path(
    get,
    path = "/instructor/enrollments",
    responses(
        (status = 200, description = "Enrollments in the caller's scope", body = [EnrollmentResponse]),
        (status = 401, description = "No resolvable identity")
    ),
    security(("jwt" = [])),
    tag = "Instructor"
)]
pub async fn enrollments(
    State(db): State<DatabaseConnection>,
    identity: Identity,
) -> Result<Json<Vec<EnrollmentResponse>>, ApiError> {
    if identity.role == Some(Role::Admin) {
        let all = enrollments::Entity::find().all(&db).await?;
        return Ok(Json(all.into_iter().map(Into::into).collect()));
    }

    let email = identity.email.as_deref().ok_or_else(ApiError::unauthenticated)?;
    let own = ScopeService::instructor_enrollments(&db, email).await?;
    Ok(Json(own.into_iter().map(Into::into).collect()))
}

/// Set or clear the grade on an enrollment in one of the caller's courses
#[utoipa::path(
    put,
    path = "/instructor/enrollments/{id}/grade",
    params(("id" = i32, Path, description = "Enrollment ID")),
    request_body = GradeRequest,
    responses(
        (status = 200, description = "Updated enrollment with derived status", body = EnrollmentResponse),
        (status = 400, description = "Grade out of range"),
        (status = 401, description = "No resolvable identity"),
        (status = 403, description = "Enrollment belongs to another instructor's course"),
        (status = 404, description = "Enrollment not found")
    ),
    security(("jwt" = [])),
    tag = "Instructor"
)]
pub async fn update_grade(
    State(db): State<DatabaseConnection>,
    identity: Identity,
    Path(id): Path<i32>,
    Json(body): Json<GradeRequest>,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    // Instructors may only grade enrollments in their own courses
    if identity.role != Some(Role::Admin) {
        let email = identity.email.as_deref().ok_or_else(ApiError::unauthenticated)?;

        let enrollment = enrollments::Entity::find_by_id(id)
            .one(&db)
            .await?
            .ok_or(RegistrationError::EnrollmentNotFound)?;

        if !ScopeService::instructor_owns_enrollment(&db, email, &enrollment).await? {
            return Err(RegistrationError::Forbidden.into());
        }
    }

    let updated = EnrollmentService::assign_grade(&db, id, body.grade).await?;
    Ok(Json(updated.into()))
}
