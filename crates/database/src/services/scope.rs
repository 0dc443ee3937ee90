use crate::entities::{courses, enrollments, instructors, students};
use log::warn;
use models::identity::normalize_email;
use models::status::EnrollmentStatus;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
};

/// Row-level narrowing for non-admin callers. Every lookup is by normalized
/// email, compared case-insensitively against the stored value. An identity
/// that matches no record degrades to an empty result — never an error,
/// never "all rows".
pub struct ScopeService;

impl ScopeService {
    pub async fn find_student_by_email<C: ConnectionTrait>(
        conn: &C,
        email: &str,
    ) -> Result<Option<students::Model>, DbErr> {
        let email = normalize_email(email);
        students::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col(students::Column::Email))).eq(email))
            .one(conn)
            .await
    }

    pub async fn find_instructor_by_email<C: ConnectionTrait>(
        conn: &C,
        email: &str,
    ) -> Result<Option<instructors::Model>, DbErr> {
        let email = normalize_email(email);
        instructors::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col(instructors::Column::Email))).eq(email))
            .one(conn)
            .await
    }

    /// Ids of the courses taught by the instructor with this email.
    pub async fn instructor_course_ids<C: ConnectionTrait>(
        conn: &C,
        email: &str,
    ) -> Result<Vec<i32>, DbErr> {
        let Some(instructor) = Self::find_instructor_by_email(conn, email).await? else {
            warn!("no instructor record matches {}, returning empty scope", normalize_email(email));
            return Ok(Vec::new());
        };

        courses::Entity::find()
            .select_only()
            .column(courses::Column::Id)
            .filter(courses::Column::InstructorId.eq(instructor.id))
            .into_tuple::<i32>()
            .all(conn)
            .await
    }

    pub async fn instructor_courses<C: ConnectionTrait>(
        conn: &C,
        email: &str,
    ) -> Result<Vec<courses::Model>, DbErr> {
        let Some(instructor) = Self::find_instructor_by_email(conn, email).await? else {
            return Ok(Vec::new());
        };

        courses::Entity::find()
            .filter(courses::Column::InstructorId.eq(instructor.id))
            .all(conn)
            .await
    }

    /// Enrollments in the instructor's courses. An instructor with no
    /// courses (or no record) sees an empty list.
    pub async fn instructor_enrollments<C: ConnectionTrait>(
        conn: &C,
        email: &str,
    ) -> Result<Vec<enrollments::Model>, DbErr> {
        let course_ids = Self::instructor_course_ids(conn, email).await?;
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        enrollments::Entity::find()
            .filter(enrollments::Column::CourseId.is_in(course_ids))
            .all(conn)
            .await
    }

    /// Whether the enrollment's course is taught by the instructor with
    /// this email. Used to gate grade assignment on the instructor surface.
    pub async fn instructor_owns_enrollment<C: ConnectionTrait>(
        conn: &C,
        email: &str,
        enrollment: &enrollments::Model,
    ) -> Result<bool, DbErr> {
        let Some(instructor) = Self::find_instructor_by_email(conn, email).await? else {
            return Ok(false);
        };

        let course = courses::Entity::find_by_id(enrollment.course_id)
            .one(conn)
            .await?;
        Ok(course.is_some_and(|c| c.instructor_id == Some(instructor.id)))
    }

    pub async fn student_enrollments<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
    ) -> Result<Vec<enrollments::Model>, DbErr> {
        enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .all(conn)
            .await
    }

    /// Active courses the student may still enroll in. Excludes courses the
    /// student is currently enrolled in or has completed, and courses
    /// already passed (grade >= 10 under any graded status). Failed or
    /// dropped courses stay available for a retake.
    pub async fn available_courses<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
    ) -> Result<Vec<courses::Model>, DbErr> {
        let enrollments = Self::student_enrollments(conn, student_id).await?;

        let excluded: Vec<i32> = enrollments
            .iter()
            .filter(|e| {
                matches!(
                    e.status,
                    EnrollmentStatus::Enrolled | EnrollmentStatus::Completed
                ) || e.grade.is_some_and(|g| g >= 10.0)
            })
            .map(|e| e.course_id)
            .collect();

        let mut query = courses::Entity::find().filter(courses::Column::IsActive.eq(true));
        if !excluded.is_empty() {
            query = query.filter(courses::Column::Id.is_not_in(excluded));
        }
        query.all(conn).await
    }
}
