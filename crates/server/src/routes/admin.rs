use crate::dtos::course::{CourseResponse, CreateCourseRequest, UpdateCourseRequest};
use crate::dtos::enrollment::{AdminEnrollRequest, EnrollmentResponse, GradeRequest};
use crate::dtos::instructor::{CreateInstructorRequest, InstructorResponse};
use crate::dtos::student::{CreateStudentRequest, StudentResponse};
use crate::error::ApiError;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use database::entities::{courses, enrollments, instructors, students};
use database::error::RegistrationError;
use database::services::EnrollmentService;
use log::info;
use models::identity::normalize_email;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, SqlErr,
};

/// List all students
#[utoipa::path(
    get,
    path = "/admin/students",
    responses((status = 200, description = "All students", body = [StudentResponse])),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn list_students(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let all = students::Entity::find().all(&db).await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// Create a student
#[utoipa::path(
    post,
    path = "/admin/students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 409, description = "Email already registered")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_student(
    State(db): State<DatabaseConnection>,
    Json(body): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    let now = Utc::now().naive_utc();
    let row = students::ActiveModel {
        email: Set(normalize_email(&body.email)),
        student_number: Set(body.student_number),
        first_name: Set(body.first_name),
        last_name: Set(body.last_name),
        ects_limit: Set(body.ects_limit),
        department_id: Set(body.department_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ApiError::conflict("a student with this email already exists")
        }
        _ => e.into(),
    })?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Delete a student, their enrollments, and recompute affected courses
#[utoipa::path(
    delete,
    path = "/admin/students/{id}",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 404, description = "Student not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_student(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let student = students::Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or(RegistrationError::StudentNotFound)?;

    let affected = EnrollmentService::remove_all_for_student(&db, student.id).await?;
    students::Entity::delete_by_id(student.id).exec(&db).await?;

    info!("deleted student {id}, recomputed {} courses", affected.len());
    Ok(StatusCode::NO_CONTENT)
}

/// List all instructors
#[utoipa::path(
    get,
    path = "/admin/instructors",
    responses((status = 200, description = "All instructors", body = [InstructorResponse])),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn list_instructors(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Vec<InstructorResponse>>, ApiError> {
    let all = instructors::Entity::find().all(&db).await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// Create an instructor
#[utoipa::path(
    post,
    path = "/admin/instructors",
    request_body = CreateInstructorRequest,
    responses(
        (status = 201, description = "Instructor created", body = InstructorResponse),
        (status = 409, description = "Email already registered")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_instructor(
    State(db): State<DatabaseConnection>,
    Json(body): Json<CreateInstructorRequest>,
) -> Result<(StatusCode, Json<InstructorResponse>), ApiError> {
    let now = Utc::now().naive_utc();
    let row = instructors::ActiveModel {
        email: Set(normalize_email(&body.email)),
        instructor_id: Set(body.instructor_id),
        first_name: Set(body.first_name),
        last_name: Set(body.last_name),
        department_id: Set(body.department_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ApiError::conflict("an instructor with this email already exists")
        }
        _ => e.into(),
    })?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Delete an instructor; their courses are kept with no instructor
#[utoipa::path(
    delete,
    path = "/admin/instructors/{id}",
    params(("id" = i32, Path, description = "Instructor ID")),
    responses(
        (status = 204, description = "Instructor deleted"),
        (status = 404, description = "Instructor not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_instructor(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let instructor = instructors::Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or(RegistrationError::InstructorNotFound)?;

    courses::Entity::update_many()
        .col_expr(courses::Column::InstructorId, Expr::value(None::<i32>))
        .filter(courses::Column::InstructorId.eq(instructor.id))
        .exec(&db)
        .await?;
    instructors::Entity::delete_by_id(instructor.id)
        .exec(&db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List all courses (served from the cached enrolled counts)
#[utoipa::path(
    get,
    path = "/admin/courses",
    responses((status = 200, description = "All courses", body = [CourseResponse])),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn list_courses(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let all = courses::Entity::find().all(&db).await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// Create a course
#[utoipa::path(
    post,
    path = "/admin/courses",
    request_body = CreateCourseRequest,
    responses((status = 201, description = "Course created", body = CourseResponse)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_course(
    State(db): State<DatabaseConnection>,
    Json(body): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    let now = Utc::now().naive_utc();
    let row = courses::ActiveModel {
        course_code: Set(body.course_code),
        course_name: Set(body.course_name),
        ects: Set(body.ects),
        quota: Set(body.quota),
        // A new course has no enrollments; the count is never client-supplied.
        enrolled: Set(0),
        is_active: Set(body.is_active),
        department_id: Set(body.department_id),
        instructor_id: Set(body.instructor_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Update a course's catalog fields
#[utoipa::path(
    put,
    path = "/admin/courses/{id}",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated course", body = CourseResponse),
        (status = 404, description = "Course not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn update_course(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = courses::Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or(RegistrationError::CourseNotFound)?;

    let mut active: courses::ActiveModel = course.into();
    if let Some(v) = body.course_code {
        active.course_code = Set(v);
    }
    if let Some(v) = body.course_name {
        active.course_name = Set(v);
    }
    if let Some(v) = body.ects {
        active.ects = Set(v);
    }
    if let Some(v) = body.quota {
        active.quota = Set(v);
    }
    if let Some(v) = body.is_active {
        active.is_active = Set(v);
    }
    if let Some(v) = body.instructor_id {
        active.instructor_id = Set(Some(v));
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let updated = active.update(&db).await?;
    Ok(Json(updated.into()))
}

/// Delete a course and its enrollments
#[utoipa::path(
    delete,
    path = "/admin/courses/{id}",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 404, description = "Course not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_course(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let course = courses::Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or(RegistrationError::CourseNotFound)?;

    EnrollmentService::remove_all_for_course(&db, course.id).await?;
    courses::Entity::delete_by_id(course.id).exec(&db).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List all enrollments
#[utoipa::path(
    get,
    path = "/admin/enrollments",
    responses((status = 200, description = "All enrollments", body = [EnrollmentResponse])),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn list_enrollments(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Vec<EnrollmentResponse>>, ApiError> {
    let all = enrollments::Entity::find().all(&db).await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// Enroll a named student (admin override, same engine validation)
#[utoipa::path(
    post,
    path = "/admin/enrollments",
    request_body = AdminEnrollRequest,
    responses(
        (status = 201, description = "Enrollment created", body = EnrollmentResponse),
        (status = 400, description = "Insufficient ECTS or course full"),
        (status = 404, description = "Student or course not found"),
        (status = 409, description = "Student already enrolled in this course")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_enrollment(
    State(db): State<DatabaseConnection>,
    Json(body): Json<AdminEnrollRequest>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    let enrollment = EnrollmentService::enroll(&db, body.student_id, body.course_id).await?;
    Ok((StatusCode::CREATED, Json(enrollment.into())))
}

/// Set or clear the grade on any enrollment
#[utoipa::path(
    put,
    path = "/admin/enrollments/{id}/grade",
    params(("id" = i32, Path, description = "Enrollment ID")),
    request_body = GradeRequest,
    responses(
        (status = 200, description = "Updated enrollment with derived status", body = EnrollmentResponse),
        (status = 400, description = "Grade out of range"),
        (status = 404, description = "Enrollment not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn update_enrollment_grade(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(body): Json<GradeRequest>,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    let updated = EnrollmentService::assign_grade(&db, id, body.grade).await?;
    Ok(Json(updated.into()))
}

/// Delete an enrollment and recompute the course's enrolled count
#[utoipa::path(
    delete,
    path = "/admin/enrollments/{id}",
    params(("id" = i32, Path, description = "Enrollment ID")),
    responses(
        (status = 204, description = "Enrollment deleted"),
        (status = 404, description = "Enrollment not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_enrollment(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    EnrollmentService::remove(&db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
