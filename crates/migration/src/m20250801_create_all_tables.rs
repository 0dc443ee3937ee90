use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create departments table
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Departments::DepartmentName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Departments::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Departments::UpdatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        // Create students table
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::Email).string().not_null())
                    .col(ColumnDef::new(Students::StudentNumber).string().not_null())
                    .col(ColumnDef::new(Students::FirstName).string().not_null())
                    .col(ColumnDef::new(Students::LastName).string().not_null())
                    .col(ColumnDef::new(Students::EctsLimit).integer().not_null())
                    .col(ColumnDef::new(Students::DepartmentId).integer())
                    .col(ColumnDef::new(Students::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Students::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-students-department_id")
                            .from(Students::Table, Students::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create instructors table
        manager
            .create_table(
                Table::create()
                    .table(Instructors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Instructors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Instructors::Email).string().not_null())
                    .col(ColumnDef::new(Instructors::InstructorId).string().not_null())
                    .col(ColumnDef::new(Instructors::FirstName).string().not_null())
                    .col(ColumnDef::new(Instructors::LastName).string().not_null())
                    .col(ColumnDef::new(Instructors::DepartmentId).integer())
                    .col(ColumnDef::new(Instructors::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Instructors::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-instructors-department_id")
                            .from(Instructors::Table, Instructors::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::CourseCode).string().not_null())
                    .col(ColumnDef::new(Courses::CourseName).string().not_null())
                    .col(ColumnDef::new(Courses::Ects).integer().not_null())
                    .col(ColumnDef::new(Courses::Quota).integer().not_null())
                    .col(
                        ColumnDef::new(Courses::Enrolled)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Courses::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Courses::DepartmentId).integer())
                    .col(ColumnDef::new(Courses::InstructorId).integer())
                    .col(ColumnDef::new(Courses::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-courses-department_id")
                            .from(Courses::Table, Courses::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-courses-instructor_id")
                            .from(Courses::Table, Courses::InstructorId)
                            .to(Instructors::Table, Instructors::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create enrollments table
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollments::StudentId).integer().not_null())
                    .col(ColumnDef::new(Enrollments::CourseId).integer().not_null())
                    .col(ColumnDef::new(Enrollments::Status).string().not_null())
                    .col(ColumnDef::new(Enrollments::Grade).double())
                    .col(
                        ColumnDef::new(Enrollments::EnrollmentDate)
                            .date_time()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enrollments::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Enrollments::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-student_id")
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-course_id")
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Instructors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Departments {
    Table,
    Id,
    DepartmentName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Students {
    Table,
    Id,
    Email,
    StudentNumber,
    FirstName,
    LastName,
    EctsLimit,
    DepartmentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Instructors {
    Table,
    Id,
    Email,
    InstructorId,
    FirstName,
    LastName,
    DepartmentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Courses {
    Table,
    Id,
    CourseCode,
    CourseName,
    Ects,
    Quota,
    Enrolled,
    IsActive,
    DepartmentId,
    InstructorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Enrollments {
    Table,
    Id,
    StudentId,
    CourseId,
    Status,
    Grade,
    EnrollmentDate,
    CreatedAt,
    UpdatedAt,
}
