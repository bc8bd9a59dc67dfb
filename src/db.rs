use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Course, ExamRecord, StudentRecord};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let students = vec![
        (
            Uuid::parse_str("7b1d22c4-55c1-4f4e-9a0e-6c04c0f3a9d1")?,
            "Giulia Ferri",
            "giulia.ferri@unilink.it",
            Some(2024),
        ),
        (
            Uuid::parse_str("f2c9a8e0-31b6-4d2a-bb5f-9f1d0a2e64c7")?,
            "Marco Esposito",
            "marco.esposito@unilink.it",
            Some(2023),
        ),
    ];

    for (id, name, email, enrollment_year) in students {
        sqlx::query(
            r#"
            INSERT INTO study_plan.students (id, full_name, email, enrollment_year)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                enrollment_year = EXCLUDED.enrollment_year
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(enrollment_year)
        .execute(pool)
        .await?;
    }

    let courses = vec![
        ("MAT-101", "Analisi Matematica I", 9, 1),
        ("MAT-102", "Algebra Lineare e Geometria", 6, 1),
        ("INF-101", "Fondamenti di Informatica", 12, 1),
        ("FIS-101", "Fisica Generale I", 9, 1),
        ("INF-201", "Algoritmi e Strutture Dati", 9, 2),
        ("INF-202", "Basi di Dati", 6, 2),
    ];

    for (code, title, cfu, course_year) in courses {
        sqlx::query(
            r#"
            INSERT INTO study_plan.courses (code, title, cfu, course_year)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (code) DO UPDATE
            SET title = EXCLUDED.title, cfu = EXCLUDED.cfu,
                course_year = EXCLUDED.course_year
            "#,
        )
        .bind(code)
        .bind(title)
        .bind(cfu)
        .bind(course_year)
        .execute(pool)
        .await?;
    }

    let exams = vec![
        (
            "giulia.ferri@unilink.it",
            "MAT-101",
            Some(28),
            NaiveDate::from_ymd_opt(2025, 1, 22).context("invalid date")?,
        ),
        (
            "giulia.ferri@unilink.it",
            "INF-101",
            Some(30),
            NaiveDate::from_ymd_opt(2025, 2, 10).context("invalid date")?,
        ),
        (
            "giulia.ferri@unilink.it",
            "MAT-102",
            None,
            NaiveDate::from_ymd_opt(2025, 6, 18).context("invalid date")?,
        ),
        (
            "marco.esposito@unilink.it",
            "MAT-101",
            Some(24),
            NaiveDate::from_ymd_opt(2024, 1, 25).context("invalid date")?,
        ),
        (
            "marco.esposito@unilink.it",
            "INF-201",
            Some(26),
            NaiveDate::from_ymd_opt(2025, 7, 3).context("invalid date")?,
        ),
    ];

    for (email, course_code, grade, taken_at) in exams {
        let student_id: Uuid =
            sqlx::query("SELECT id FROM study_plan.students WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?
                .get("id");

        sqlx::query(
            r#"
            INSERT INTO study_plan.exams (id, student_id, course_code, grade, taken_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (student_id, course_code) DO UPDATE
            SET grade = EXCLUDED.grade, taken_at = EXCLUDED.taken_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(course_code)
        .bind(grade)
        .bind(taken_at)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_student(pool: &PgPool, email: &str) -> anyhow::Result<StudentRecord> {
    let row = sqlx::query(
        "SELECT id, full_name, email, enrollment_year FROM study_plan.students WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("no student enrolled with email {email}"))?;

    Ok(StudentRecord {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        enrollment_year: row.get("enrollment_year"),
    })
}

pub async fn fetch_exams(pool: &PgPool, email: &str) -> anyhow::Result<Vec<ExamRecord>> {
    let rows = sqlx::query(
        "SELECT st.id AS student_id, st.full_name, st.email, \
         e.grade, e.taken_at, \
         c.code AS course_code, c.title AS course_title, c.cfu \
         FROM study_plan.exams e \
         JOIN study_plan.students st ON st.id = e.student_id \
         LEFT JOIN study_plan.courses c ON c.code = e.course_code \
         WHERE st.email = $1 \
         ORDER BY e.taken_at DESC NULLS LAST",
    )
    .bind(email)
    .fetch_all(pool)
    .await?;

    let mut exams = Vec::new();

    for row in rows {
        let course = match row.get::<Option<String>, _>("course_code") {
            Some(code) => Some(Course {
                code,
                title: row.get("course_title"),
                cfu: row.get("cfu"),
            }),
            None => None,
        };

        exams.push(ExamRecord {
            student_id: row.get("student_id"),
            student_name: row.get("full_name"),
            student_email: row.get("email"),
            course,
            grade: row.get("grade"),
            taken_at: row.get("taken_at"),
        });
    }

    Ok(exams)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        enrollment_year: Option<i32>,
        course_code: String,
        course_title: String,
        cfu: i32,
        grade: Option<i32>,
        taken_at: Option<NaiveDate>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;

        let student_id: Uuid = sqlx::query(
            r#"
            INSERT INTO study_plan.students (id, full_name, email, enrollment_year)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                enrollment_year = COALESCE(EXCLUDED.enrollment_year, study_plan.students.enrollment_year)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.full_name)
        .bind(&row.email)
        .bind(row.enrollment_year)
        .fetch_one(pool)
        .await?
        .get("id");

        sqlx::query(
            r#"
            INSERT INTO study_plan.courses (code, title, cfu)
            VALUES ($1, $2, $3)
            ON CONFLICT (code) DO UPDATE
            SET title = EXCLUDED.title, cfu = EXCLUDED.cfu
            "#,
        )
        .bind(&row.course_code)
        .bind(&row.course_title)
        .bind(row.cfu)
        .execute(pool)
        .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO study_plan.exams (id, student_id, course_code, grade, taken_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (student_id, course_code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(&row.course_code)
        .bind(row.grade)
        .bind(row.taken_at)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
