use database::entities::instructors;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct InstructorResponse {
    pub id: i32,
    pub email: String,
    pub instructor_id: String,
    pub first_name: String,
    pub last_name: String,
    pub department_id: Option<i32>,
}

impl From<instructors::Model> for InstructorResponse {
    fn from(i: instructors::Model) -> Self {
        Self {
            id: i.id,
            email: i.email,
            instructor_id: i.instructor_id,
            first_name: i.first_name,
            last_name: i.last_name,
            department_id: i.department_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInstructorRequest {
    pub email: String,
    pub instructor_id: String,
    pub first_name: String,
    pub last_name: String,
    pub department_id: Option<i32>,
}
