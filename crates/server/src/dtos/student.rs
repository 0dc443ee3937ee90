use database::entities::students;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentResponse {
    pub id: i32,
    pub email: String,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub ects_limit: i32,
    pub department_id: Option<i32>,
}

impl From<students::Model> for StudentResponse {
    fn from(s: students::Model) -> Self {
        Self {
            id: s.id,
            email: s.email,
            student_number: s.student_number,
            first_name: s.first_name,
            last_name: s.last_name,
            ects_limit: s.ects_limit,
            department_id: s.department_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    pub email: String,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub ects_limit: i32,
    pub department_id: Option<i32>,
}
