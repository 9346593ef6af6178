use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod analytics;
mod db;
mod models;
mod report;

#[derive(Parser)]
#[command(name = "dept-feedback")]
#[command(about = "Department satisfaction feedback analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load the department catalog and sample feedback
    Seed,
    /// Import feedback records from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// List departments a purse number has already rated
    Submissions {
        #[arg(long)]
        purse: String,
    },
    /// Print aggregate analytics for one department
    Analyze {
        #[arg(long)]
        dept: String,
    },
    /// Generate a markdown analytics report
    Report {
        #[arg(long)]
        dept: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
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
            println!("Inserted {inserted} feedback records from {}.", csv.display());
        }
        Commands::Submissions { purse } => {
            let submitted = db::submitted_departments(&pool, &purse).await?;
            if submitted.is_empty() {
                println!("No submissions recorded for purse {purse}.");
            } else {
                println!("Departments already rated by purse {purse}:");
                for dept in submitted {
                    println!("- {dept}");
                }
            }
        }
        Commands::Analyze { dept } => {
            let departments = db::fetch_departments(&pool).await?;
            let feedback = db::fetch_feedback(&pool, None).await?;
            let dept_name = department_name(&departments, &dept);

            match analytics::analyze_department(&feedback, &dept) {
                None => println!("No feedback data available for {dept_name}."),
                Some(analytics) => {
                    println!("Analytics for {dept_name}:");
                    println!(
                        "- {} responses ({:.1}% completion)",
                        analytics.total_responses, analytics.response_rate
                    );
                    println!(
                        "- average rating {:.1}/10 ({})",
                        analytics.average_rating,
                        report::rating_verdict(analytics.average_rating)
                    );
                    println!(
                        "- ratings split: {} good / {} average / {} poor",
                        analytics.rating_distribution.good,
                        analytics.rating_distribution.average,
                        analytics.rating_distribution.poor
                    );
                    if let Some(best) = &analytics.highest_rated_criteria {
                        println!(
                            "- top performer: {} at {:.1}/10",
                            best.full_criteria, best.rating
                        );
                    }
                    if let Some(worst) = &analytics.lowest_rated_criteria {
                        println!(
                            "- area for improvement: {} at {:.1}/10",
                            worst.full_criteria, worst.rating
                        );
                    }
                    println!(
                        "- {} written comments across {} days with feedback",
                        analytics.feedback_comments.len(),
                        analytics.time_series_data.len()
                    );
                }
            }
        }
        Commands::Report { dept, out } => {
            let departments = db::fetch_departments(&pool).await?;
            let feedback = db::fetch_feedback(&pool, None).await?;
            let dept_name = department_name(&departments, &dept);

            let analytics = analytics::analyze_department(&feedback, &dept);
            let report = report::build_report(&dept_name, analytics.as_ref());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn department_name(departments: &[models::DepartmentInfo], dept_key: &str) -> String {
    departments
        .iter()
        .find(|dept| dept.key == dept_key)
        .map(|dept| dept.name.clone())
        .unwrap_or_else(|| dept_key.to_string())
}
