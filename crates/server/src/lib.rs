pub mod doc;
pub mod dtos;
pub mod error;
pub mod guard;
pub mod identity;
pub mod routes;
pub mod utils;

use axum::{
    Router, middleware,
    routing::{delete, get, put},
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Assembles the application router. Each surface is a sub-router with its
/// access guard layered on top, so the guard -> scope filter -> engine
/// pipeline is explicit per operation.
pub fn app(db: DatabaseConnection) -> Router {
    let student = Router::new()
        .route("/profile", get(routes::student::profile))
        .route(
            "/enrollments",
            get(routes::student::my_enrollments).post(routes::student::enroll),
        )
        .route("/courses/available", get(routes::student::available_courses))
        .layer(middleware::from_fn(guard::student_surface));

    let instructor = Router::new()
        .route("/profile", get(routes::instructor::profile))
        .route("/courses", get(routes::instructor::courses))
        .route("/enrollments", get(routes::instructor::enrollments))
        .route(
            "/enrollments/{id}/grade",
            put(routes::instructor::update_grade),
        )
        .layer(middleware::from_fn(guard::instructor_surface));

    let admin = Router::new()
        .route(
            "/students",
            get(routes::admin::list_students).post(routes::admin::create_student),
        )
        .route("/students/{id}", delete(routes::admin::delete_student))
        .route(
            "/instructors",
            get(routes::admin::list_instructors).post(routes::admin::create_instructor),
        )
        .route("/instructors/{id}", delete(routes::admin::delete_instructor))
        .route(
            "/courses",
            get(routes::admin::list_courses).post(routes::admin::create_course),
        )
        .route(
            "/courses/{id}",
            put(routes::admin::update_course).delete(routes::admin::delete_course),
        )
        .route(
            "/enrollments",
            get(routes::admin::list_enrollments).post(routes::admin::create_enrollment),
        )
        .route(
            "/enrollments/{id}/grade",
            put(routes::admin::update_enrollment_grade),
        )
        .route("/enrollments/{id}", delete(routes::admin::delete_enrollment))
        .layer(middleware::from_fn(guard::admin_surface));

    Router::new()
        .route("/", get(routes::root::root))
        .route("/health", get(routes::health::health))
        .nest("/student", student)
        .nest("/instructor", instructor)
        .nest("/admin", admin)
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::ApiDoc::openapi()),
        )
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()))
        .with_state(db)
}
