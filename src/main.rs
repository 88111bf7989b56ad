use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::Settings;
use core_types::Operation;
use database::DbRepository;
use std::path::PathBuf;
use std::process::ExitCode;
use treatments::TreatmentService;
use web_server::Envelope;

mod logging;

/// The main entry point for the clinic treatments service.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match configuration::load_settings(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if cli.ephemeral {
        settings.database.url = "sqlite::memory:".to_string();
    }

    let _log_guard = match logging::init_tracing(&settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Serve(args) => handle_serve(args, settings).await,
        Commands::Invoke(args) => handle_invoke(args, &settings).await,
        Commands::Report => handle_report(&settings).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed.");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A demo service for doctors, patients and the treatments linking them.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. A missing file falls back to defaults.
    #[arg(long, global = true, default_value = configuration::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Use a throwaway in-memory store instead of the configured database.
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Run a single operation against the store and print its result.
    Invoke(InvokeArgs),
    /// Print doctors, patients and row counts as tables.
    Report,
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct InvokeArgs {
    /// One of: create, read, update, delete, verify.
    operation: Operation,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut settings: Settings) -> anyhow::Result<ExitCode> {
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    settings.validate()?;

    web_server::run_server(&settings).await?;
    Ok(ExitCode::SUCCESS)
}

async fn open_service(settings: &Settings) -> anyhow::Result<TreatmentService> {
    let pool = database::connect(&settings.database).await?;
    database::run_migrations(&pool).await?;
    Ok(TreatmentService::new(DbRepository::new(pool)))
}

/// Prints the same envelope the HTTP API would return, followed by the
/// operation's result on success.
async fn handle_invoke(args: InvokeArgs, settings: &Settings) -> anyhow::Result<ExitCode> {
    let service = open_service(settings).await?;

    match service.invoke(args.operation).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string(&Envelope::success())?);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(operation = %args.operation, kind = e.kind(), error = %e, "Operation failed.");
            println!("{}", serde_json::to_string(&Envelope::error())?);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn handle_report(settings: &Settings) -> anyhow::Result<ExitCode> {
    let service = open_service(settings).await?;
    let repo = service.repository();

    let mut doctors = Table::new();
    doctors.set_header(vec!["Doctor id", "Doctor", "Patients"]);
    for entry in repo.get_doctors_with_patients().await? {
        let names: Vec<&str> = entry.patients.iter().map(|p| p.name.as_str()).collect();
        doctors.add_row(vec![entry.doctor.id.to_string(), entry.doctor.name.clone(), names.join(", ")]);
    }

    let mut patients = Table::new();
    patients.set_header(vec!["Patient id", "Patient", "Doctors"]);
    for entry in repo.get_patients_with_doctors().await? {
        let names: Vec<&str> = entry.doctors.iter().map(|d| d.name.as_str()).collect();
        patients.add_row(vec![entry.patient.id.to_string(), entry.patient.name.clone(), names.join(", ")]);
    }

    let counts = repo.counts().await?;
    let mut totals = Table::new();
    totals.set_header(vec!["Doctors", "Patients", "Treatments"]);
    totals.add_row(vec![counts.doctors, counts.patients, counts.treatments]);

    println!("{doctors}\n\n{patients}\n\n{totals}");
    Ok(ExitCode::SUCCESS)
}
