use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use classroom_metrics::config::{Config, DEFAULT_MAX_CONNECTIONS};
use classroom_metrics::render;
use classroom_metrics::snapshot::Snapshot;
use classroom_metrics::store::load_snapshot;

#[derive(Parser)]
#[command(name = "classroom-metrics")]
#[command(about = "Gradebook, attendance and report metrics for a classroom", long_about = None)]
struct Cli {
    /// Postgres connection string
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[arg(long, global = true, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    max_connections: u32,

    /// Read the class from students.csv, assignments.csv, grades.csv and
    /// attendance.csv in this directory instead of Postgres
    #[arg(long, global = true)]
    csv_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a demo class
    Seed,
    /// Upsert a directory of class CSV files into Postgres
    Import {
        #[arg(long)]
        dir: PathBuf,
    },
    /// Student x assignment grade table
    Gradebook,
    /// Per-student averages and attendance
    Students,
    /// Per-assignment statistics
    Assignments,
    /// Students per grade band
    Distribution,
    /// Class-wide summary and recent grades
    Dashboard,
    /// Attendance per day
    Attendance {
        /// Only this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List grades and attendance records with missing references
    Audit,
    /// Write a markdown class report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text(value));
    }
    Ok(())
}

async fn snapshot(config: &Config) -> anyhow::Result<Snapshot> {
    let store = config.open_store().await?;
    load_snapshot(store.as_ref())
        .await
        .context("failed to load class data")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("classroom_metrics=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(cli.database_url, cli.csv_dir, cli.max_connections)?;
    let json = cli.json;

    match cli.command {
        Commands::InitDb => {
            config.open_postgres().await?.init_db().await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let counts = config.open_postgres().await?.seed().await?;
            println!("Seeded {counts}.");
        }
        Commands::Import { dir } => {
            let counts = config
                .open_postgres()
                .await?
                .import_csv_dir(&dir)
                .await?;
            println!("Imported {counts} from {}.", dir.display());
        }
        Commands::Gradebook => {
            let snapshot = snapshot(&config).await?;
            let matrix = snapshot.gradebook()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&matrix.view())?);
            } else {
                print!("{}", render::gradebook_text(&matrix));
            }
        }
        Commands::Students => {
            let reports = snapshot(&config).await?.student_reports()?;
            emit(json, &reports, |r| render::students_text(r))?;
        }
        Commands::Assignments => {
            let stats = snapshot(&config).await?.assignment_stats()?;
            emit(json, &stats, |s| render::assignments_text(s))?;
        }
        Commands::Distribution => {
            let distribution = snapshot(&config).await?.grade_distribution()?;
            emit(json, &distribution, render::distribution_text)?;
        }
        Commands::Dashboard => {
            let stats = snapshot(&config).await?.dashboard()?;
            emit(json, &stats, render::dashboard_text)?;
        }
        Commands::Attendance { date } => {
            let snapshot = snapshot(&config).await?;
            let days = match date {
                Some(date) => vec![snapshot.attendance_on(date)],
                None => snapshot.attendance_calendar(),
            };
            emit(json, &days, |d| render::attendance_text(d))?;
        }
        Commands::Audit => {
            let gaps = snapshot(&config).await?.referential_gaps();
            emit(json, &gaps, |g| render::gaps_text(g))?;
        }
        Commands::Report { out } => {
            let report = snapshot(&config).await?.class_report()?;
            if json {
                std::fs::write(&out, serde_json::to_string_pretty(&report)?)?;
            } else {
                std::fs::write(&out, render::class_report_markdown(&report))?;
            }
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
