use std::fmt::Write;

use crate::models::{ExamRecord, StudentRecord};
use crate::stats;

pub fn build_report(
    student: &StudentRecord,
    exams: &[ExamRecord],
    target_average: Option<f64>,
    bonus_points: f64,
    total_credits: i32,
) -> String {
    let standing = stats::calculate_stats(exams);
    let average = if standing.total_credits > 0 {
        Some(standing.average_grade)
    } else {
        None
    };
    let projection = stats::calculate_graduation_score(average, bonus_points);
    let outlook = stats::target_outlook(
        standing.average_grade,
        standing.total_credits,
        target_average,
        total_credits,
    );

    let mut output = String::new();

    let _ = writeln!(output, "# Study Plan Report");
    let _ = writeln!(
        output,
        "{} ({}), academic year {}/{}",
        student.full_name,
        student.email,
        stats::current_academic_year(),
        stats::current_academic_year() + 1
    );
    match stats::current_course_year(student.enrollment_year) {
        Some(year) => {
            let _ = writeln!(output, "Course year: {year}");
        }
        None => {
            let _ = writeln!(output, "Course year: N/A");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Academic Standing");
    let _ = writeln!(
        output,
        "- Credits earned: {} / {}",
        standing.total_credits, total_credits
    );
    let _ = writeln!(
        output,
        "- Weighted average: {}",
        standing.formatted_average()
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Graduation Projection");
    let _ = writeln!(output, "- Projected score: {}", projection.display_score);
    let _ = writeln!(output, "- Bonus points applied: {bonus_points}");
    if projection.is_honors {
        let _ = writeln!(output, "- On track for honors.");
    }

    if let Some(target) = target_average {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Target Outlook");
        let _ = writeln!(
            output,
            "- Reaching a final average of {}: {}",
            stats::format_grade(target),
            outlook.label()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Completed Exams");

    let completed: Vec<_> = exams
        .iter()
        .filter_map(|e| match (&e.course, e.grade) {
            (Some(course), Some(grade)) if grade >= 18 => Some((course, grade, e.taken_at)),
            _ => None,
        })
        .collect();

    if completed.is_empty() {
        let _ = writeln!(output, "No exams passed yet.");
    } else {
        for (course, grade, taken_at) in completed {
            let date = taken_at
                .map(|d| d.to_string())
                .unwrap_or_else(|| "unknown date".to_string());
            let _ = writeln!(
                output,
                "- {} ({}, {} CFU): {} on {}",
                course.title, course.code, course.cfu, grade, date
            );
        }
    }

    let pending: Vec<&ExamRecord> = exams.iter().filter(|e| e.grade.is_none()).collect();

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pending Exams");

    if pending.is_empty() {
        let _ = writeln!(output, "Nothing left in the booked plan.");
    } else {
        for exam in pending {
            match exam.course.as_ref() {
                Some(course) => {
                    let _ = writeln!(
                        output,
                        "- {} ({}, {} CFU)",
                        course.title, course.code, course.cfu
                    );
                }
                None => {
                    let _ = writeln!(output, "- unlisted course");
                }
            }
        }
    }

    output
}
