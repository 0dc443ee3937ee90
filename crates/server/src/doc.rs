use crate::dtos::course::{CourseResponse, CreateCourseRequest, UpdateCourseRequest};
use crate::dtos::enrollment::{AdminEnrollRequest, EnrollRequest, EnrollmentResponse, GradeRequest};
use crate::dtos::instructor::{CreateInstructorRequest, InstructorResponse};
use crate::dtos::student::{CreateStudentRequest, StudentResponse};
use crate::error::ErrorBody;
use crate::routes::{admin, health, instructor, root, student};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        student::profile,
        student::my_enrollments,
        student::available_courses,
        student::enroll,
        instructor::profile,
        instructor::courses,
        instructor::enrollments,
        instructor::update_grade,
        admin::list_students,
        admin::create_student,
        admin::delete_student,
        admin::list_instructors,
        admin::create_instructor,
        admin::delete_instructor,
        admin::list_courses,
        admin::create_course,
        admin::update_course,
        admin::delete_course,
        admin::list_enrollments,
        admin::create_enrollment,
        admin::update_enrollment_grade,
        admin::delete_enrollment
    ),
    components(schemas(
        CourseResponse,
        CreateCourseRequest,
        UpdateCourseRequest,
        EnrollRequest,
        AdminEnrollRequest,
        GradeRequest,
        EnrollmentResponse,
        CreateInstructorRequest,
        InstructorResponse,
        CreateStudentRequest,
        StudentResponse,
        ErrorBody
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Student", description = "Self-service endpoints for students"),
        (name = "Instructor", description = "Course and grading endpoints for instructors"),
        (name = "Admin", description = "Catalog and enrollment management"),
        (name = "Health", description = "Liveness endpoints"),
    ),
    info(
        title = "Course Registration API",
        version = "1.0.0",
        description = "University course registration backend",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
