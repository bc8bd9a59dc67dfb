use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod db;
mod models;
mod report;
mod stats;

#[derive(Parser)]
#[command(name = "study-plan")]
#[command(about = "Study plan tracker and graduation score projector for Unilink", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import students, courses and exams from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show academic standing and graduation projection for a student
    Stats {
        #[arg(long)]
        email: String,
        #[arg(long)]
        target_avg: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        bonus: f64,
        #[arg(long, default_value_t = stats::DEFAULT_TOTAL_CREDITS)]
        total_credits: i32,
        #[arg(long)]
        json: bool,
    },
    /// Project a graduation score from a plain average, no database lookup
    Projection {
        #[arg(long)]
        average: String,
        #[arg(long, default_value_t = 0.0)]
        bonus: f64,
    },
    /// Generate a markdown study plan report
    Report {
        #[arg(long)]
        email: String,
        #[arg(long)]
        target_avg: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        bonus: f64,
        #[arg(long, default_value_t = stats::DEFAULT_TOTAL_CREDITS)]
        total_credits: i32,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

/// Discretionary bonus points are capped at [0, 10] by regulation; the
/// projection itself does not validate the range.
fn clamp_bonus(bonus: f64) -> f64 {
    bonus.clamp(0.0, 10.0)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} exams from {}.", csv.display());
        }
        Commands::Stats {
            email,
            target_avg,
            bonus,
            total_credits,
            json,
        } => {
            let exams = db::fetch_exams(&pool, &email).await?;
            let standing = stats::calculate_stats(&exams);
            let average = (standing.total_credits > 0).then_some(standing.average_grade);
            let projection = stats::calculate_graduation_score(average, clamp_bonus(bonus));
            let outlook = stats::target_outlook(
                standing.average_grade,
                standing.total_credits,
                target_avg,
                total_credits,
            );

            if json {
                let payload = serde_json::json!({
                    "stats": {
                        "total_credits": standing.total_credits,
                        "average_grade": standing.formatted_average(),
                    },
                    "projection": projection,
                    "outlook": {
                        "label": outlook.label(),
                        "color": outlook.color(),
                    },
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            println!(
                "Credits earned: {} / {}",
                standing.total_credits, total_credits
            );
            println!("Weighted average: {}", standing.formatted_average());
            println!("Projected graduation score: {}", projection.display_score);
            if target_avg.is_some() {
                println!("Target outlook: {}", outlook.label());
            }
        }
        Commands::Projection { average, bonus } => {
            let parsed = average.trim().parse::<f64>().ok();
            let projection = stats::calculate_graduation_score(parsed, clamp_bonus(bonus));
            println!("Projected graduation score: {}", projection.display_score);
        }
        Commands::Report {
            email,
            target_avg,
            bonus,
            total_credits,
            out,
        } => {
            let student = db::fetch_student(&pool, &email).await?;
            let exams = db::fetch_exams(&pool, &email).await?;
            let report = report::build_report(
                &student,
                &exams,
                target_avg,
                clamp_bonus(bonus),
                total_credits,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
