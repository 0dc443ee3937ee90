use chrono::Utc;
use database::entities::{courses, enrollments, instructors, students};
use database::error::RegistrationError;
use database::services::{CapacityService, EnrollmentService, ScopeService};
use migration::{Migrator, MigratorTrait};
use models::status::EnrollmentStatus;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, SqlErr,
};

async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

async fn seed_student(db: &DatabaseConnection, email: &str, ects_limit: i32) -> students::Model {
    let now = Utc::now().naive_utc();
    students::ActiveModel {
        email: Set(email.to_string()),
        student_number: Set(format!("S-{email}")),
        first_name: Set("Test".to_string()),
        last_name: Set("Student".to_string()),
        ects_limit: Set(ects_limit),
        department_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

async fn seed_instructor(db: &DatabaseConnection, email: &str) -> instructors::Model {
    let now = Utc::now().naive_utc();
    instructors::ActiveModel {
        email: Set(email.to_string()),
        instructor_id: Set(format!("I-{email}")),
        first_name: Set("Test".to_string()),
        last_name: Set("Instructor".to_string()),
        department_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

async fn seed_course(
    db: &DatabaseConnection,
    code: &str,
    ects: i32,
    quota: i32,
    instructor_id: Option<i32>,
) -> courses::Model {
    let now = Utc::now().naive_utc();
    courses::ActiveModel {
        course_code: Set(code.to_string()),
        course_name: Set(format!("Course {code}")),
        ects: Set(ects),
        quota: Set(quota),
        enrolled: Set(0),
        is_active: Set(true),
        department_id: Set(None),
        instructor_id: Set(instructor_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

async fn reload_course(db: &DatabaseConnection, id: i32) -> courses::Model {
    courses::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
}

async fn enrolled_rows(db: &DatabaseConnection, course_id: i32) -> u64 {
    enrollments::Entity::find()
        .filter(enrollments::Column::CourseId.eq(course_id))
        .filter(enrollments::Column::Status.eq(EnrollmentStatus::Enrolled))
        .count(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn enrolling_consumes_budget_and_updates_count() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 60).await;
    let c = seed_course(&db, "C", 30, 1, None).await;

    let enrollment = EnrollmentService::enroll(&db, s.id, c.id).await.unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Enrolled);
    assert_eq!(enrollment.grade, None);
    assert_eq!(reload_course(&db, c.id).await.enrolled, 1);

    // 30 of 60 committed, the next 31-ECTS course does not fit
    let big = seed_course(&db, "BIG", 31, 10, None).await;
    let err = EnrollmentService::enroll(&db, s.id, big.id).await.unwrap_err();
    match err {
        RegistrationError::InsufficientCredit { needed, available } => {
            assert_eq!(needed, 31);
            assert_eq!(available, 30);
        }
        other => panic!("expected InsufficientCredit, got {other:?}"),
    }

    // A failed precondition leaves no row behind
    assert_eq!(enrolled_rows(&db, big.id).await, 0);
}

#[tokio::test]
async fn duplicate_enrollment_is_rejected() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 60).await;
    let c = seed_course(&db, "C", 30, 5, None).await;

    EnrollmentService::enroll(&db, s.id, c.id).await.unwrap();
    let err = EnrollmentService::enroll(&db, s.id, c.id).await.unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateEnrollment));
    assert_eq!(reload_course(&db, c.id).await.enrolled, 1);
}

#[tokio::test]
async fn full_course_rejects_enrollment() {
    let db = setup().await;
    let other = seed_student(&db, "other@uni.edu", 60).await;
    let s = seed_student(&db, "s@uni.edu", 60).await;
    let d = seed_course(&db, "D", 5, 1, None).await;

    EnrollmentService::enroll(&db, other.id, d.id).await.unwrap();

    let err = EnrollmentService::enroll(&db, s.id, d.id).await.unwrap_err();
    match err {
        RegistrationError::CourseFull { enrolled, quota } => {
            assert_eq!(enrolled, 1);
            assert_eq!(quota, 1);
        }
        other => panic!("expected CourseFull, got {other:?}"),
    }
    assert_eq!(reload_course(&db, d.id).await.enrolled, 1);
}

#[tokio::test]
async fn grading_out_of_enrolled_recomputes_count() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 60).await;
    let c = seed_course(&db, "C", 30, 1, None).await;
    let enrollment = EnrollmentService::enroll(&db, s.id, c.id).await.unwrap();
    assert_eq!(reload_course(&db, c.id).await.enrolled, 1);

    let graded = EnrollmentService::assign_grade(&db, enrollment.id, Some(17.0))
        .await
        .unwrap();
    assert_eq!(graded.status, EnrollmentStatus::VeryGood);
    assert_eq!(graded.grade, Some(17.0));
    // old status was ENROLLED, new one is not: count drops to zero
    assert_eq!(reload_course(&db, c.id).await.enrolled, 0);
}

#[tokio::test]
async fn deleting_graded_enrollment_still_recounts() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 60).await;
    let c = seed_course(&db, "C", 30, 1, None).await;
    let enrollment = EnrollmentService::enroll(&db, s.id, c.id).await.unwrap();
    EnrollmentService::assign_grade(&db, enrollment.id, Some(17.0))
        .await
        .unwrap();

    // Deleting a non-ENROLLED enrollment is fine; the recount still runs
    EnrollmentService::remove(&db, enrollment.id).await.unwrap();
    assert_eq!(reload_course(&db, c.id).await.enrolled, 0);
    assert_eq!(
        enrollments::Entity::find().count(&db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn unknown_instructor_sees_empty_scope() {
    let db = setup().await;
    let i = seed_instructor(&db, "prof@uni.edu").await;
    seed_course(&db, "C", 30, 10, Some(i.id)).await;

    // No matching instructor row: empty, not an error and not all courses
    let courses = ScopeService::instructor_courses(&db, "ghost@uni.edu")
        .await
        .unwrap();
    assert!(courses.is_empty());

    let enrollments = ScopeService::instructor_enrollments(&db, "ghost@uni.edu")
        .await
        .unwrap();
    assert!(enrollments.is_empty());

    // The known instructor sees exactly their own course, case-insensitively
    let own = ScopeService::instructor_courses(&db, " Prof@UNI.edu ")
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
}

#[tokio::test]
async fn recompute_is_idempotent() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 60).await;
    let c = seed_course(&db, "C", 10, 5, None).await;
    EnrollmentService::enroll(&db, s.id, c.id).await.unwrap();

    let first = CapacityService::recompute(&db, c.id).await.unwrap();
    let second = CapacityService::recompute(&db, c.id).await.unwrap();
    assert_eq!(first, 1);
    assert_eq!(first, second);
    assert_eq!(reload_course(&db, c.id).await.enrolled, 1);
}

#[tokio::test]
async fn unique_index_backstops_duplicate_race() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 60).await;
    let c = seed_course(&db, "C", 10, 5, None).await;
    EnrollmentService::enroll(&db, s.id, c.id).await.unwrap();

    // A write that slipped past the engine's read-then-check (as a racing
    // request would) is stopped by the storage layer itself
    let now = Utc::now().naive_utc();
    let err = enrollments::ActiveModel {
        student_id: Set(s.id),
        course_id: Set(c.id),
        status: Set(EnrollmentStatus::Enrolled),
        grade: Set(None),
        enrollment_date: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap_err();

    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));
}

#[tokio::test]
async fn clearing_a_grade_restores_enrolled_status() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 60).await;
    let c = seed_course(&db, "C", 10, 5, None).await;
    let enrollment = EnrollmentService::enroll(&db, s.id, c.id).await.unwrap();

    let graded = EnrollmentService::assign_grade(&db, enrollment.id, Some(15.0))
        .await
        .unwrap();
    assert_eq!(graded.status, EnrollmentStatus::Good);
    assert_eq!(reload_course(&db, c.id).await.enrolled, 0);

    let cleared = EnrollmentService::assign_grade(&db, enrollment.id, None)
        .await
        .unwrap();
    assert_eq!(cleared.status, EnrollmentStatus::Enrolled);
    assert_eq!(cleared.grade, None);
    assert_eq!(reload_course(&db, c.id).await.enrolled, 1);
}

#[tokio::test]
async fn grade_zero_is_a_failing_grade_not_a_clear() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 60).await;
    let c = seed_course(&db, "C", 10, 5, None).await;
    let enrollment = EnrollmentService::enroll(&db, s.id, c.id).await.unwrap();

    let graded = EnrollmentService::assign_grade(&db, enrollment.id, Some(0.0))
        .await
        .unwrap();
    assert_eq!(graded.status, EnrollmentStatus::Failed);
    assert_eq!(graded.grade, Some(0.0));
}

#[tokio::test]
async fn out_of_range_grades_are_rejected() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 60).await;
    let c = seed_course(&db, "C", 10, 5, None).await;
    let enrollment = EnrollmentService::enroll(&db, s.id, c.id).await.unwrap();

    for bad in [20.5, -0.5, f64::NAN] {
        let err = EnrollmentService::assign_grade(&db, enrollment.id, Some(bad))
            .await
            .unwrap_err();
        assert!(
            matches!(err, RegistrationError::InvalidGrade { .. }),
            "grade {bad} should be rejected"
        );
    }

    // The rejection left the enrollment untouched
    let row = enrollments::Entity::find_by_id(enrollment.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, EnrollmentStatus::Enrolled);
    assert_eq!(row.grade, None);
}

#[tokio::test]
async fn failed_courses_do_not_consume_budget() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 30).await;
    let first = seed_course(&db, "FIRST", 30, 5, None).await;
    let second = seed_course(&db, "SECOND", 30, 5, None).await;

    let enrollment = EnrollmentService::enroll(&db, s.id, first.id).await.unwrap();
    EnrollmentService::assign_grade(&db, enrollment.id, Some(5.0))
        .await
        .unwrap();

    // The failed 30 ECTS are freed, so another 30-ECTS course fits
    EnrollmentService::enroll(&db, s.id, second.id).await.unwrap();
}

#[tokio::test]
async fn passed_courses_still_consume_budget() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 30).await;
    let first = seed_course(&db, "FIRST", 30, 5, None).await;
    let second = seed_course(&db, "SECOND", 30, 5, None).await;

    let enrollment = EnrollmentService::enroll(&db, s.id, first.id).await.unwrap();
    EnrollmentService::assign_grade(&db, enrollment.id, Some(12.0))
        .await
        .unwrap();

    let err = EnrollmentService::enroll(&db, s.id, second.id).await.unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::InsufficientCredit { needed: 30, available: 0 }
    ));
}

#[tokio::test]
async fn available_courses_allow_retake_after_failure() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 90).await;
    let failed = seed_course(&db, "FAILED", 10, 5, None).await;
    let passed = seed_course(&db, "PASSED", 10, 5, None).await;
    let current = seed_course(&db, "CURRENT", 10, 5, None).await;
    let open = seed_course(&db, "OPEN", 10, 5, None).await;

    let now = Utc::now().naive_utc();
    let inactive = courses::ActiveModel {
        course_code: Set("CLOSED".to_string()),
        course_name: Set("Closed Course".to_string()),
        ects: Set(10),
        quota: Set(5),
        enrolled: Set(0),
        is_active: Set(false),
        department_id: Set(None),
        instructor_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let e1 = EnrollmentService::enroll(&db, s.id, failed.id).await.unwrap();
    EnrollmentService::assign_grade(&db, e1.id, Some(4.0)).await.unwrap();
    let e2 = EnrollmentService::enroll(&db, s.id, passed.id).await.unwrap();
    // Exactly 10 is PASSED and therefore not retakable
    EnrollmentService::assign_grade(&db, e2.id, Some(10.0)).await.unwrap();
    EnrollmentService::enroll(&db, s.id, current.id).await.unwrap();

    let available = ScopeService::available_courses(&db, s.id).await.unwrap();
    let ids: Vec<i32> = available.iter().map(|c| c.id).collect();

    assert!(ids.contains(&failed.id), "failed course must stay available");
    assert!(ids.contains(&open.id));
    assert!(!ids.contains(&passed.id), "passed course is not retakable");
    assert!(!ids.contains(&current.id), "currently enrolled course excluded");
    assert!(!ids.contains(&inactive.id), "inactive course excluded");
}

#[tokio::test]
async fn enroll_by_email_matches_case_insensitively() {
    let db = setup().await;
    // Stored un-normalized, as legacy rows might be
    seed_student(&db, "Alice@Uni.Edu", 60).await;
    let c = seed_course(&db, "C", 10, 5, None).await;

    let enrollment = EnrollmentService::enroll_by_email(&db, " alice@UNI.edu ", c.id)
        .await
        .unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Enrolled);

    let err = EnrollmentService::enroll_by_email(&db, "nobody@uni.edu", c.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::StudentNotFound));
}

#[tokio::test]
async fn deleting_a_student_recomputes_their_courses() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 60).await;
    let c1 = seed_course(&db, "C1", 10, 5, None).await;
    let c2 = seed_course(&db, "C2", 10, 5, None).await;
    EnrollmentService::enroll(&db, s.id, c1.id).await.unwrap();
    EnrollmentService::enroll(&db, s.id, c2.id).await.unwrap();
    assert_eq!(reload_course(&db, c1.id).await.enrolled, 1);

    let affected = EnrollmentService::remove_all_for_student(&db, s.id).await.unwrap();
    assert_eq!(affected.len(), 2);
    assert_eq!(reload_course(&db, c1.id).await.enrolled, 0);
    assert_eq!(reload_course(&db, c2.id).await.enrolled, 0);
}

#[tokio::test]
async fn enrolled_count_invariant_holds_after_mutation_sequence() {
    let db = setup().await;
    let a = seed_student(&db, "a@uni.edu", 90).await;
    let b = seed_student(&db, "b@uni.edu", 90).await;
    let c = seed_student(&db, "c@uni.edu", 90).await;
    let x = seed_course(&db, "X", 10, 10, None).await;
    let y = seed_course(&db, "Y", 10, 10, None).await;

    let ax = EnrollmentService::enroll(&db, a.id, x.id).await.unwrap();
    let bx = EnrollmentService::enroll(&db, b.id, x.id).await.unwrap();
    EnrollmentService::enroll(&db, c.id, x.id).await.unwrap();
    let ay = EnrollmentService::enroll(&db, a.id, y.id).await.unwrap();

    EnrollmentService::assign_grade(&db, ax.id, Some(16.0)).await.unwrap();
    EnrollmentService::assign_grade(&db, bx.id, Some(8.0)).await.unwrap();
    EnrollmentService::assign_grade(&db, bx.id, None).await.unwrap();
    EnrollmentService::remove(&db, ay.id).await.unwrap();

    for course_id in [x.id, y.id] {
        let cached = reload_course(&db, course_id).await.enrolled;
        let actual = enrolled_rows(&db, course_id).await;
        assert_eq!(cached as u64, actual, "course {course_id} count drifted");
    }

    // No two rows share a (student, course) pair
    let all = enrollments::Entity::find().all(&db).await.unwrap();
    let mut pairs: Vec<(i32, i32)> = all.iter().map(|e| (e.student_id, e.course_id)).collect();
    pairs.sort_unstable();
    let before = pairs.len();
    pairs.dedup();
    assert_eq!(before, pairs.len());
}

#[tokio::test]
async fn missing_course_is_not_found() {
    let db = setup().await;
    let s = seed_student(&db, "s@uni.edu", 60).await;

    let err = EnrollmentService::enroll(&db, s.id, 9999).await.unwrap_err();
    assert!(matches!(err, RegistrationError::CourseNotFound));

    let err = EnrollmentService::assign_grade(&db, 9999, Some(12.0)).await.unwrap_err();
    assert!(matches!(err, RegistrationError::EnrollmentNotFound));

    let err = EnrollmentService::remove(&db, 9999).await.unwrap_err();
    assert!(matches!(err, RegistrationError::EnrollmentNotFound));
}
