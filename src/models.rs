use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub code: String,
    pub title: String,
    pub cfu: i32,
}

/// One study-plan entry for a student. `course` is `None` when the exam
/// references a course the catalog no longer carries; `grade` is `None`
/// while the exam has not been taken.
#[derive(Debug, Clone, Serialize)]
pub struct ExamRecord {
    pub student_id: Uuid,
    pub student_name: String,
    pub student_email: String,
    pub course: Option<Course>,
    pub grade: Option<i32>,
    pub taken_at: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub enrollment_year: Option<i32>,
}

/// Aggregate standing over the completed part of a study plan. The average
/// keeps full precision; callers format it at the display boundary.
#[derive(Debug, Clone, Serialize)]
pub struct AcademicStats {
    pub total_credits: i32,
    pub average_grade: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraduationProjection {
    pub final_score: i64,
    pub display_score: String,
    pub is_honors: bool,
}

/// Qualitative chance of landing on a target final average, given the
/// credits still to be earned. Ordered from out-of-reach to already-secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetOutlook {
    NotApplicable,
    Completed,
    Impossible,
    Hard,
    Likely,
    VeryLikely,
    GoalReached,
}

impl TargetOutlook {
    pub fn label(self) -> &'static str {
        match self {
            TargetOutlook::NotApplicable => "N/A",
            TargetOutlook::Completed => "Completed",
            TargetOutlook::Impossible => "Impossible",
            TargetOutlook::Hard => "Hard",
            TargetOutlook::Likely => "Likely",
            TargetOutlook::VeryLikely => "Very Likely",
            TargetOutlook::GoalReached => "Goal Reached",
        }
    }

    /// Style hint for UI consumers. Opaque to the computation.
    pub fn color(self) -> &'static str {
        match self {
            TargetOutlook::NotApplicable => "text-muted-foreground",
            TargetOutlook::Completed => "text-primary",
            TargetOutlook::Impossible => "text-red-500",
            TargetOutlook::Hard => "text-orange-500",
            TargetOutlook::Likely => "text-yellow-500",
            TargetOutlook::VeryLikely => "text-green-500",
            TargetOutlook::GoalReached => "text-primary",
        }
    }
}
