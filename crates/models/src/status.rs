use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Lifecycle status of an enrollment. Stored as the upper-case wire string.
///
/// A graded enrollment always carries the status derived from its grade by
/// [`classify`]; an ungraded enrollment is `Enrolled`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    #[sea_orm(string_value = "ENROLLED")]
    Enrolled,
    #[sea_orm(string_value = "EXCELLENT")]
    Excellent,
    #[sea_orm(string_value = "VERY_GOOD")]
    VeryGood,
    #[sea_orm(string_value = "GOOD")]
    Good,
    #[sea_orm(string_value = "SATISFACTORY")]
    Satisfactory,
    #[sea_orm(string_value = "PASSED")]
    Passed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "DROPPED")]
    Dropped,
}

impl EnrollmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enrolled => "ENROLLED",
            Self::Excellent => "EXCELLENT",
            Self::VeryGood => "VERY_GOOD",
            Self::Good => "GOOD",
            Self::Satisfactory => "SATISFACTORY",
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Completed => "COMPLETED",
            Self::Dropped => "DROPPED",
        }
    }

    /// A passing graded status (SATISFACTORY and above, or PASSED).
    pub fn is_passing_grade(self) -> bool {
        matches!(
            self,
            Self::Excellent | Self::VeryGood | Self::Good | Self::Satisfactory | Self::Passed
        )
    }

    /// Whether an enrollment with this status consumes the student's ECTS
    /// budget. ENROLLED, COMPLETED, and passing graded statuses count;
    /// FAILED and DROPPED do not, so a failed course can be retaken without
    /// being charged twice.
    pub fn counts_toward_load(self) -> bool {
        match self {
            Self::Enrolled | Self::Completed => true,
            Self::Failed | Self::Dropped => false,
            graded => graded.is_passing_grade(),
        }
    }
}

impl Display for EnrollmentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Maps a numeric grade to its status. Inclusive lower bounds at
/// 18, 16, 14, 12 and 10; anything below 10 fails.
///
/// A missing grade never reaches this function; the engine short-circuits
/// `grade = null` to `Enrolled`.
pub fn classify(grade: f64) -> EnrollmentStatus {
    if grade >= 18.0 {
        EnrollmentStatus::Excellent
    } else if grade >= 16.0 {
        EnrollmentStatus::VeryGood
    } else if grade >= 14.0 {
        EnrollmentStatus::Good
    } else if grade >= 12.0 {
        EnrollmentStatus::Satisfactory
    } else if grade >= 10.0 {
        EnrollmentStatus::Passed
    } else {
        EnrollmentStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_classify(grade: f64, expected: EnrollmentStatus) {
        let result = classify(grade);
        assert_eq!(result, expected, "grade {grade} classified as {result}");
    }

    #[test]
    fn test_exact_boundaries() {
        test_classify(20.0, EnrollmentStatus::Excellent);
        test_classify(18.0, EnrollmentStatus::Excellent);
        test_classify(16.0, EnrollmentStatus::VeryGood);
        test_classify(14.0, EnrollmentStatus::Good);
        test_classify(12.0, EnrollmentStatus::Satisfactory);
        test_classify(10.0, EnrollmentStatus::Passed);
        test_classify(0.0, EnrollmentStatus::Failed);
    }

    #[test]
    fn test_just_below_boundaries() {
        test_classify(17.999, EnrollmentStatus::VeryGood);
        test_classify(15.99, EnrollmentStatus::Good);
        test_classify(13.5, EnrollmentStatus::Satisfactory);
        test_classify(11.999, EnrollmentStatus::Passed);
        test_classify(9.99, EnrollmentStatus::Failed);
    }

    #[test]
    fn test_load_policy() {
        assert!(EnrollmentStatus::Enrolled.counts_toward_load());
        assert!(EnrollmentStatus::Completed.counts_toward_load());
        assert!(EnrollmentStatus::Excellent.counts_toward_load());
        assert!(EnrollmentStatus::VeryGood.counts_toward_load());
        assert!(EnrollmentStatus::Good.counts_toward_load());
        assert!(EnrollmentStatus::Satisfactory.counts_toward_load());
        assert!(EnrollmentStatus::Passed.counts_toward_load());
        assert!(!EnrollmentStatus::Failed.counts_toward_load());
        assert!(!EnrollmentStatus::Dropped.counts_toward_load());
    }

    #[test]
    fn test_wire_strings() {
        assert_eq!(EnrollmentStatus::VeryGood.as_str(), "VERY_GOOD");
        assert_eq!(EnrollmentStatus::Enrolled.to_string(), "ENROLLED");
    }
}
