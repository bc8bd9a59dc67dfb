use chrono::{Datelike, Local, NaiveDate};

use crate::models::{AcademicStats, ExamRecord, GraduationProjection, TargetOutlook};

/// Credits required by the degree program. Bachelor's default; callers can
/// override it per institution.
pub const DEFAULT_TOTAL_CREDITS: i32 = 180;

/// Minimum weighted average required to qualify for honors, on top of a
/// rounded score of 110. Regulation constant, varies by institution.
pub const HONORS_AVERAGE_THRESHOLD: f64 = 28.5;

/// Maximum Italian graduation score.
pub const MAX_GRADUATION_SCORE: i64 = 110;

/// Month the academic year starts in.
pub const ACADEMIC_YEAR_START_MONTH: u32 = 9;

/// Aggregates total credits and the credit-weighted grade average over the
/// completed part of a study plan. A record counts only if it has a passing
/// grade (>= 18) and a resolvable course; anything else is skipped rather
/// than rejected, so this never fails.
pub fn calculate_stats(exams: &[ExamRecord]) -> AcademicStats {
    let completed: Vec<&ExamRecord> = exams
        .iter()
        .filter(|e| matches!(e.grade, Some(g) if g >= 18) && e.course.is_some())
        .collect();

    if completed.is_empty() {
        return AcademicStats {
            total_credits: 0,
            average_grade: 0.0,
        };
    }

    let mut total_credits = 0i32;
    let mut weighted_sum = 0.0f64;

    for exam in completed {
        let cfu = exam.course.as_ref().map_or(0, |c| c.cfu.max(0));
        total_credits += cfu;
        if let Some(grade) = exam.grade {
            weighted_sum += grade as f64 * cfu as f64;
        }
    }

    // All completed exams may carry zero-credit courses.
    let average_grade = if total_credits > 0 {
        weighted_sum / total_credits as f64
    } else {
        0.0
    };

    AcademicStats {
        total_credits,
        average_grade,
    }
}

impl AcademicStats {
    /// Two-decimal display string, round half away from zero. `"0.00"`
    /// when nothing has been completed.
    pub fn formatted_average(&self) -> String {
        format_grade(self.average_grade)
    }
}

pub fn format_grade(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

/// Projects the final degree score from a weighted exam average plus
/// discretionary bonus points. The 18-30 exam scale maps onto 66-110 via
/// the 11/3 factor. Bonus points are not range-checked here; callers clamp
/// them to [0, 10] before the call.
pub fn calculate_graduation_score(
    average_grade: Option<f64>,
    bonus_points: f64,
) -> GraduationProjection {
    let avg = match average_grade {
        Some(v) if v != 0.0 => v,
        _ => {
            return GraduationProjection {
                final_score: 0,
                display_score: "N/D".to_string(),
                is_honors: false,
            }
        }
    };

    let base_score = avg * 11.0 / 3.0;
    let rounded = (base_score + bonus_points).round() as i64;

    let is_honors = avg >= HONORS_AVERAGE_THRESHOLD && rounded >= MAX_GRADUATION_SCORE;

    if is_honors {
        GraduationProjection {
            final_score: MAX_GRADUATION_SCORE,
            display_score: "110 e Lode".to_string(),
            is_honors: true,
        }
    } else {
        let final_score = rounded.min(MAX_GRADUATION_SCORE);
        GraduationProjection {
            final_score,
            display_score: final_score.to_string(),
            is_honors: false,
        }
    }
}

/// Classifies how reachable a target final average is, from the average
/// the student would have to hold across every remaining credit.
pub fn target_outlook(
    current_average: f64,
    current_credits: i32,
    target_average: Option<f64>,
    total_credits: i32,
) -> TargetOutlook {
    let target = match target_average {
        Some(t) => t,
        None => return TargetOutlook::NotApplicable,
    };

    if current_credits >= total_credits {
        return TargetOutlook::NotApplicable;
    }

    let remaining = total_credits - current_credits;
    if remaining <= 0 {
        return TargetOutlook::Completed;
    }

    let required = (target * total_credits as f64 - current_average * current_credits as f64)
        / remaining as f64;

    if required > 30.0 {
        TargetOutlook::Impossible
    } else if required > 27.0 {
        TargetOutlook::Hard
    } else if required > 24.0 {
        TargetOutlook::Likely
    } else if required >= 18.0 {
        TargetOutlook::VeryLikely
    } else {
        TargetOutlook::GoalReached
    }
}

/// Academic year a date falls in; the year ticks over in September.
pub fn academic_year_for(date: NaiveDate) -> i32 {
    if date.month() >= ACADEMIC_YEAR_START_MONTH {
        date.year()
    } else {
        date.year() - 1
    }
}

pub fn current_academic_year() -> i32 {
    academic_year_for(Local::now().date_naive())
}

/// 1-indexed course year for a student enrolled in `enrollment_year`.
pub fn current_course_year(enrollment_year: Option<i32>) -> Option<i32> {
    enrollment_year.map(|year| current_academic_year() - year + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;
    use uuid::Uuid;

    fn exam(grade: Option<i32>, cfu: Option<i32>) -> ExamRecord {
        ExamRecord {
            student_id: Uuid::new_v4(),
            student_name: "Giulia Ferri".to_string(),
            student_email: "giulia@example.com".to_string(),
            course: cfu.map(|cfu| Course {
                code: "ING-001".to_string(),
                title: "Analisi Matematica I".to_string(),
                cfu,
            }),
            grade,
            taken_at: None,
        }
    }

    #[test]
    fn empty_plan_yields_zero_stats() {
        let stats = calculate_stats(&[]);
        assert_eq!(stats.total_credits, 0);
        assert_eq!(stats.formatted_average(), "0.00");
    }

    #[test]
    fn failing_and_pending_exams_are_excluded() {
        let exams = vec![exam(Some(17), Some(6)), exam(None, Some(9))];
        let stats = calculate_stats(&exams);
        assert_eq!(stats.total_credits, 0);
        assert_eq!(stats.formatted_average(), "0.00");
    }

    #[test]
    fn graded_exam_without_course_contributes_nothing() {
        let exams = vec![exam(Some(30), None), exam(Some(24), Some(9))];
        let stats = calculate_stats(&exams);
        assert_eq!(stats.total_credits, 9);
        assert_eq!(stats.formatted_average(), "24.00");
    }

    #[test]
    fn average_is_credit_weighted() {
        let exams = vec![exam(Some(30), Some(6)), exam(Some(24), Some(9))];
        let stats = calculate_stats(&exams);
        assert_eq!(stats.total_credits, 15);
        assert_eq!(stats.formatted_average(), "26.40");
    }

    #[test]
    fn zero_credit_completions_avoid_division_by_zero() {
        let exams = vec![exam(Some(28), Some(0))];
        let stats = calculate_stats(&exams);
        assert_eq!(stats.total_credits, 0);
        assert_eq!(stats.formatted_average(), "0.00");
    }

    #[test]
    fn missing_or_zero_average_projects_nd() {
        for avg in [None, Some(0.0)] {
            let projection = calculate_graduation_score(avg, 5.0);
            assert_eq!(projection.final_score, 0);
            assert_eq!(projection.display_score, "N/D");
            assert!(!projection.is_honors);
        }
    }

    #[test]
    fn perfect_average_with_bonus_earns_honors() {
        let projection = calculate_graduation_score(Some(30.0), 10.0);
        assert_eq!(projection.final_score, 110);
        assert_eq!(projection.display_score, "110 e Lode");
        assert!(projection.is_honors);
    }

    #[test]
    fn base_score_rounds_half_away_from_zero() {
        let projection = calculate_graduation_score(Some(28.0), 0.0);
        assert_eq!(projection.final_score, 103);
        assert_eq!(projection.display_score, "103");
        assert!(!projection.is_honors);
    }

    #[test]
    fn honors_needs_rounded_110_not_just_the_average() {
        // 28.5 * 11 / 3 + 4 = 108.5, rounds to 109
        let projection = calculate_graduation_score(Some(28.5), 4.0);
        assert_eq!(projection.final_score, 109);
        assert_eq!(projection.display_score, "109");
        assert!(!projection.is_honors);
    }

    #[test]
    fn high_average_without_honors_threshold_caps_at_110() {
        // 28.2 average misses the honors threshold but 28.2 * 11 / 3 + 10
        // rounds past 110.
        let projection = calculate_graduation_score(Some(28.2), 10.0);
        assert_eq!(projection.final_score, 110);
        assert_eq!(projection.display_score, "110");
        assert!(!projection.is_honors);
    }

    #[test]
    fn final_score_is_monotone_in_the_average() {
        let mut previous = 0i64;
        for tenths in 180..=300 {
            let avg = tenths as f64 / 10.0;
            let projection = calculate_graduation_score(Some(avg), 2.0);
            assert!(projection.final_score >= previous);
            previous = projection.final_score;
        }
    }

    #[test]
    fn outlook_without_target_is_not_applicable() {
        assert_eq!(
            target_outlook(27.0, 60, None, DEFAULT_TOTAL_CREDITS),
            TargetOutlook::NotApplicable
        );
    }

    #[test]
    fn outlook_at_full_credits_is_not_applicable() {
        assert_eq!(
            target_outlook(27.0, 180, Some(28.0), DEFAULT_TOTAL_CREDITS),
            TargetOutlook::NotApplicable
        );
        assert_eq!(
            target_outlook(27.0, 200, Some(28.0), DEFAULT_TOTAL_CREDITS),
            TargetOutlook::NotApplicable
        );
    }

    #[test]
    fn required_average_of_exactly_30_is_hard() {
        // 0 credits earned, target 30: must hold exactly 30 on everything.
        assert_eq!(
            target_outlook(0.0, 0, Some(30.0), DEFAULT_TOTAL_CREDITS),
            TargetOutlook::Hard
        );
    }

    #[test]
    fn required_average_of_exactly_18_is_very_likely() {
        assert_eq!(
            target_outlook(0.0, 0, Some(18.0), DEFAULT_TOTAL_CREDITS),
            TargetOutlook::VeryLikely
        );
    }

    #[test]
    fn outlook_ladder_matches_thresholds() {
        // 90 of 180 credits at average 24: required = 2 * target - 24.
        let cases = [
            (27.5, TargetOutlook::Impossible), // required 31
            (26.0, TargetOutlook::Hard),       // required 28
            (25.0, TargetOutlook::Likely),     // required 26
            (22.0, TargetOutlook::VeryLikely), // required 20
            (20.0, TargetOutlook::GoalReached), // required 16
        ];
        for (target, expected) in cases {
            assert_eq!(
                target_outlook(24.0, 90, Some(target), DEFAULT_TOTAL_CREDITS),
                expected,
                "target {target}"
            );
        }
    }

    #[test]
    fn secured_target_below_18_is_goal_reached() {
        // Even all-18s from here on keeps the average above the target.
        assert_eq!(
            target_outlook(29.0, 150, Some(25.0), DEFAULT_TOTAL_CREDITS),
            TargetOutlook::GoalReached
        );
    }

    #[test]
    fn academic_year_starts_in_september() {
        let august = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();
        let september = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert_eq!(academic_year_for(august), 2025);
        assert_eq!(academic_year_for(september), 2026);
    }

    #[test]
    fn course_year_is_one_indexed() {
        let this_year = current_academic_year();
        assert_eq!(current_course_year(Some(this_year)), Some(1));
        assert_eq!(current_course_year(Some(this_year - 2)), Some(3));
        assert_eq!(current_course_year(None), None);
    }

    #[test]
    fn outlook_labels_carry_style_hints() {
        assert_eq!(TargetOutlook::Impossible.label(), "Impossible");
        assert_eq!(TargetOutlook::Impossible.color(), "text-red-500");
        assert_eq!(TargetOutlook::VeryLikely.label(), "Very Likely");
        assert_eq!(TargetOutlook::GoalReached.color(), "text-primary");
    }

    #[test]
    fn grade_formatting_keeps_two_decimals() {
        assert_eq!(format_grade(26.4), "26.40");
        // 28.125 is exact in binary, so this exercises the half-way case.
        assert_eq!(format_grade(28.125), "28.13");
        assert_eq!(format_grade(0.0), "0.00");
        assert_eq!(format_grade(30.0), "30.00");
    }
}
