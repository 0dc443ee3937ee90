use models::status::EnrollmentStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One (student, course) registration. At most one row may exist per pair;
/// the migration enforces this with a unique index so concurrent creates
/// cannot slip past the engine's duplicate check.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
    pub status: EnrollmentStatus,
    /// 0–20 scale; `None` means not yet graded, never "grade zero".
    #[sea_orm(column_type = "Double", nullable)]
    pub grade: Option<f64>,
    pub enrollment_date: DateTime,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
