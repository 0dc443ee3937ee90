use crate::entities::{courses, enrollments};
use crate::error::RegistrationError;
use futures::future::try_join_all;
use log::info;
use models::status::EnrollmentStatus;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};

/// The single reconciliation point for `courses.enrolled`. No other code
/// path writes that column.
pub struct CapacityService;

impl CapacityService {
    /// Counts ENROLLED-status rows for a course.
    pub async fn enrolled_count<C: ConnectionTrait>(
        conn: &C,
        course_id: i32,
    ) -> Result<u64, DbErr> {
        enrollments::Entity::find()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .filter(enrollments::Column::Status.eq(EnrollmentStatus::Enrolled))
            .count(conn)
            .await
    }

    /// Recomputes `courses.enrolled` from the enrollment rows. Idempotent;
    /// safe to retry after a failure.
    pub async fn recompute<C: ConnectionTrait>(conn: &C, course_id: i32) -> Result<u64, DbErr> {
        let count = Self::enrolled_count(conn, course_id).await?;

        courses::Entity::update_many()
            .col_expr(courses::Column::Enrolled, Expr::value(count as i32))
            .filter(courses::Column::Id.eq(course_id))
            .exec(conn)
            .await?;

        info!("course {course_id} enrolled count updated to {count}");
        Ok(count)
    }

    /// Recomputes a set of courses after a bulk mutation (e.g. deleting a
    /// student cascades over every course they were enrolled in).
    pub async fn recompute_many<C: ConnectionTrait>(
        conn: &C,
        course_ids: Vec<i32>,
    ) -> Result<(), RegistrationError> {
        try_join_all(course_ids.into_iter().map(|course_id| async move {
            Self::recompute(conn, course_id)
                .await
                .map_err(|source| RegistrationError::InternalInconsistency { course_id, source })
        }))
        .await?;
        Ok(())
    }
}
