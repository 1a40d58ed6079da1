use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod aggregate;
mod codec;
mod config;
mod db;
mod error;
mod models;
mod report;
mod samples;
mod service;
mod store;

use models::ReportKind;
use service::ReportService;
use store::{MemoryReportStore, ReportStore};

#[derive(Parser)]
#[command(name = "section-reports")]
#[command(about = "Enrollment, performance and progress reports for course sections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Generate one report of each kind from sample section data
    Seed {
        #[arg(long, default_value = "seed")]
        generated_by: String,
    },
    /// Generate a report from JSON input
    Generate {
        #[arg(long, value_enum)]
        kind: ReportKind,
        #[arg(long)]
        generated_by: String,
        /// Input file; reads stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// List every stored report
    List,
    /// Show one report
    Show {
        id: Uuid,
        /// Render as markdown instead of JSON
        #[arg(long)]
        markdown: bool,
    },
    /// Delete a report
    Delete { id: Uuid },
    /// Run the sample data through an in-memory store; no database needed
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo => run_demo().await,
        command => run(command).await,
    }
}

async fn run_demo() -> anyhow::Result<()> {
    let service = ReportService::new(MemoryReportStore::new());
    seed(&service, "demo").await?;
    print_json(&service.list_all().await?)?;
    tracing::info!(
        "demo stored {} reports in memory",
        service.store().insert_calls()
    );
    Ok(())
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let pool = connect().await?;
    let service = ReportService::new(db::PgReportStore::new(pool.clone()));

    match command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed { generated_by } => {
            seed(&service, &generated_by).await?;
            println!("Seed reports generated.");
        }
        Commands::Generate {
            kind,
            generated_by,
            input,
        } => {
            let raw = read_input(input.as_deref())?;
            let view = service.generate(kind, &generated_by, &raw).await?;
            print_json(&view)?;
        }
        Commands::List => {
            let views = service.list_all().await?;
            if views.is_empty() {
                tracing::info!("no reports stored");
            }
            print_json(&views)?;
        }
        Commands::Show { id, markdown } => {
            let view = service.get_by_id(id).await?;
            if markdown {
                print!("{}", report::render_markdown(&view));
            } else {
                print_json(&view)?;
            }
        }
        Commands::Delete { id } => {
            service.delete_by_id(id).await?;
            println!("Report {id} deleted.");
        }
        Commands::Demo => run_demo().await?,
    }

    Ok(())
}

async fn connect() -> anyhow::Result<PgPool> {
    let config = config::DbConfig::from_env()?;
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn seed<S: ReportStore>(
    service: &ReportService<S>,
    generated_by: &str,
) -> anyhow::Result<()> {
    service
        .generate_enrolled_students(generated_by, samples::ENROLLMENT)
        .await?;
    service
        .generate_section_performance(generated_by, samples::EVALUATIONS)
        .await?;
    service
        .generate_student_progress(generated_by, samples::EVALUATIONS)
        .await?;
    Ok(())
}

fn read_input(path: Option<&std::path::Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read input from stdin")?;
            Ok(raw)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
