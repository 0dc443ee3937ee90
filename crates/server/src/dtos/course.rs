use database::entities::courses;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    pub id: i32,
    pub course_code: String,
    pub course_name: String,
    pub ects: i32,
    pub quota: i32,
    /// Cached ENROLLED headcount, refreshed after every enrollment mutation.
    pub enrolled: i32,
    pub is_active: bool,
    pub department_id: Option<i32>,
    pub instructor_id: Option<i32>,
}

impl From<courses::Model> for CourseResponse {
    fn from(c: courses::Model) -> Self {
        Self {
            id: c.id,
            course_code: c.course_code,
            course_name: c.course_name,
            ects: c.ects,
            quota: c.quota,
            enrolled: c.enrolled,
            is_active: c.is_active,
            department_id: c.department_id,
            instructor_id: c.instructor_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    pub course_code: String,
    pub course_name: String,
    pub ects: i32,
    pub quota: i32,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    pub department_id: Option<i32>,
    pub instructor_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub ects: Option<i32>,
    pub quota: Option<i32>,
    pub is_active: Option<bool>,
    pub instructor_id: Option<i32>,
}

fn default_is_active() -> bool {
    true
}
