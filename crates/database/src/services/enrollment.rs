use crate::entities::{courses, enrollments, students};
use crate::error::RegistrationError;
use crate::services::capacity::CapacityService;
use crate::services::scope::ScopeService;
use chrono::Utc;
use log::info;
use models::status::{EnrollmentStatus, classify};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    SqlErr, TransactionTrait,
};

/// The enrollment engine. All creates, grade assignments, and deletes for
/// every caller surface go through here; all writes to `courses.enrolled`
/// go through the capacity recalculator it triggers.
pub struct EnrollmentService;

impl EnrollmentService {
    /// Enrolls the student identified by `email` (the student-surface path:
    /// the student is inferred from the caller identity, never from the
    /// request body).
    pub async fn enroll_by_email(
        db: &DatabaseConnection,
        email: &str,
        course_id: i32,
    ) -> Result<enrollments::Model, RegistrationError> {
        let student = ScopeService::find_student_by_email(db, email)
            .await?
            .ok_or(RegistrationError::StudentNotFound)?;
        Self::enroll(db, student.id, course_id).await
    }

    /// Validates and creates an enrollment. Every precondition is hard:
    /// a failure aborts with no side effect (the transaction rolls back on
    /// drop). The unique (student_id, course_id) index is the backstop for
    /// two concurrent creates racing past the duplicate check.
    pub async fn enroll(
        db: &DatabaseConnection,
        student_id: i32,
        course_id: i32,
    ) -> Result<enrollments::Model, RegistrationError> {
        let txn = db.begin().await?;

        let student = students::Entity::find_by_id(student_id)
            .one(&txn)
            .await?
            .ok_or(RegistrationError::StudentNotFound)?;

        let existing = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(enrollments::Column::CourseId.eq(course_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(RegistrationError::DuplicateEnrollment);
        }

        let course = courses::Entity::find_by_id(course_id)
            .one(&txn)
            .await?
            .ok_or(RegistrationError::CourseNotFound)?;

        let ects_used = Self::committed_ects(&txn, student_id).await?;
        let available = student.ects_limit - ects_used;
        if available < course.ects {
            return Err(RegistrationError::InsufficientCredit {
                needed: course.ects,
                available,
            });
        }

        let enrolled = CapacityService::enrolled_count(&txn, course_id).await?;
        if enrolled >= course.quota.max(0) as u64 {
            return Err(RegistrationError::CourseFull {
                enrolled,
                quota: course.quota,
            });
        }

        let now = Utc::now().naive_utc();
        let row = enrollments::ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            status: Set(EnrollmentStatus::Enrolled),
            grade: Set(None),
            enrollment_date: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => RegistrationError::DuplicateEnrollment,
            _ => RegistrationError::Db(e),
        })?;

        txn.commit().await?;
        info!("student {student_id} enrolled in course {course_id} as enrollment {}", row.id);

        CapacityService::recompute(db, course_id)
            .await
            .map_err(|source| RegistrationError::InternalInconsistency { course_id, source })?;

        Ok(row)
    }

    /// Assigns or clears a grade. Only `None` clears: a grade of zero is a
    /// legitimate failing grade, not a clear. The status is always derived
    /// from the grade, never accepted from the caller.
    pub async fn assign_grade(
        db: &DatabaseConnection,
        enrollment_id: i32,
        grade: Option<f64>,
    ) -> Result<enrollments::Model, RegistrationError> {
        let enrollment = enrollments::Entity::find_by_id(enrollment_id)
            .one(db)
            .await?
            .ok_or(RegistrationError::EnrollmentNotFound)?;

        // Captured before the mutation; needed for the conditional recount.
        let course_id = enrollment.course_id;
        let old_status = enrollment.status;

        let (grade, status) = match grade {
            None => (None, EnrollmentStatus::Enrolled),
            Some(value) if !(0.0..=20.0).contains(&value) => {
                return Err(RegistrationError::InvalidGrade { value });
            }
            Some(value) => (Some(value), classify(value)),
        };

        let mut active: enrollments::ActiveModel = enrollment.into();
        active.grade = Set(grade);
        active.status = Set(status);
        active.updated_at = Set(Utc::now().naive_utc());
        let updated = active.update(db).await?;

        info!("enrollment {enrollment_id} graded: status {old_status} -> {status}");

        // The cached count only moves when ENROLLED-ness changed.
        let was_enrolled = old_status == EnrollmentStatus::Enrolled;
        let is_enrolled = status == EnrollmentStatus::Enrolled;
        if was_enrolled != is_enrolled {
            CapacityService::recompute(db, course_id)
                .await
                .map_err(|source| RegistrationError::InternalInconsistency { course_id, source })?;
        }

        Ok(updated)
    }

    /// Deletes an enrollment and recomputes the course's enrolled count
    /// unconditionally. The course id is captured first; it is unavailable
    /// after the delete.
    pub async fn remove(
        db: &DatabaseConnection,
        enrollment_id: i32,
    ) -> Result<(), RegistrationError> {
        let enrollment = enrollments::Entity::find_by_id(enrollment_id)
            .one(db)
            .await?
            .ok_or(RegistrationError::EnrollmentNotFound)?;
        let course_id = enrollment.course_id;

        enrollments::Entity::delete_by_id(enrollment_id).exec(db).await?;
        info!("enrollment {enrollment_id} deleted from course {course_id}");

        CapacityService::recompute(db, course_id)
            .await
            .map_err(|source| RegistrationError::InternalInconsistency { course_id, source })?;

        Ok(())
    }

    /// Removes every enrollment of a student (admin student deletion) and
    /// recomputes each affected course. Returns the affected course ids.
    pub async fn remove_all_for_student(
        db: &DatabaseConnection,
        student_id: i32,
    ) -> Result<Vec<i32>, RegistrationError> {
        let rows = ScopeService::student_enrollments(db, student_id).await?;
        // At most one enrollment per (student, course), so the ids are
        // already distinct.
        let course_ids: Vec<i32> = rows.iter().map(|e| e.course_id).collect();

        enrollments::Entity::delete_many()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .exec(db)
            .await?;

        CapacityService::recompute_many(db, course_ids.clone()).await?;
        Ok(course_ids)
    }

    /// Removes every enrollment of a course (admin course deletion). No
    /// recount: the course row itself is about to go away.
    pub async fn remove_all_for_course(
        db: &DatabaseConnection,
        course_id: i32,
    ) -> Result<(), RegistrationError> {
        enrollments::Entity::delete_many()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// ECTS the student has committed: the sum of course credit weights
    /// over enrollments whose status consumes budget (ENROLLED, COMPLETED,
    /// passing grades — not FAILED or DROPPED).
    async fn committed_ects<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
    ) -> Result<i32, RegistrationError> {
        let rows = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .find_also_related(courses::Entity)
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter(|(e, _)| e.status.counts_toward_load())
            .filter_map(|(_, course)| course.map(|c| c.ects))
            .sum())
    }
}
