use sea_orm_migration::prelude::*;

use crate::m20250801_create_all_tables::{Courses, Enrollments, Instructors, Students};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One enrollment per (student, course). This is what makes the
        // engine's duplicate check safe under concurrent creates.
        manager
            .create_index(
                Index::create()
                    .name("idx-enrollments-student-course")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .col(Enrollments::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Lookup indexes for the recount and scope-filter paths
        manager
            .create_index(
                Index::create()
                    .name("idx-enrollments-course")
                    .table(Enrollments::Table)
                    .col(Enrollments::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-courses-instructor")
                    .table(Courses::Table)
                    .col(Courses::InstructorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-students-email")
                    .table(Students::Table)
                    .col(Students::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-instructors-email")
                    .table(Instructors::Table)
                    .col(Instructors::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-instructors-email")
                    .table(Instructors::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-students-email")
                    .table(Students::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-courses-instructor")
                    .table(Courses::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-enrollments-course")
                    .table(Enrollments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-enrollments-student-course")
                    .table(Enrollments::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
