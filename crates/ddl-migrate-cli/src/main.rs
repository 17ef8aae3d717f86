//! ddl-migrate CLI - dialect-aware schema migrations.

use clap::{Parser, Subcommand};
use ddl_migrate::{
    Config, ConnectionImpl, Dialect, DialectImpl, MigrateError, MigrationExecutor,
    MigrationPlan, MigrationReport, SchemaConnection, StepOutcome,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "ddl-migrate")]
#[command(about = "Dialect-aware schema migration and DDL generation")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the DDL of a plan without connecting to a database
    Generate {
        /// Path to the YAML migration plan
        #[arg(short, long)]
        plan: PathBuf,

        /// Target dialect (hsql, postgres, mysql); defaults to the configured database type
        #[arg(short, long)]
        dialect: Option<String>,
    },

    /// Apply a plan to the configured database
    Apply {
        /// Path to the YAML migration plan
        #[arg(short, long)]
        plan: PathBuf,
    },

    /// Test the database connection
    HealthCheck,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    match cli.command {
        Commands::Generate { plan, dialect } => {
            let dialect = match dialect {
                Some(name) => DialectImpl::from_db_type(&name)?,
                None => Config::load(&cli.config)?.dialect()?,
            };
            let plan = MigrationPlan::load(&plan)?;
            info!("Generating {} step(s) for {}", plan.steps.len(), dialect.name());

            let ddl = plan.render(&dialect)?;
            if cli.output_json {
                let out = serde_json::json!({ "dialect": dialect.name(), "ddl": ddl });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", ddl);
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Apply { plan } => {
            let config = Config::load(&cli.config)?;
            info!("Loaded configuration from {:?}", cli.config);
            let plan = MigrationPlan::load(&plan)?;
            let executor = MigrationExecutor::from_config(&config)?;

            // Build errors surface before a connection is opened
            executor.prepare(&plan.steps)?;

            let conn = ConnectionImpl::connect(&config.database).await?;
            let report = executor.run(conn, &plan.steps).await?;

            if cli.output_json {
                println!("{}", report.to_json()?);
            } else {
                print_report(&report);
            }

            if report.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }

        Commands::HealthCheck => {
            let config = Config::load(&cli.config)?;
            let start = Instant::now();
            let conn = ConnectionImpl::connect(&config.database).await?;
            let result = conn.ping().await;
            let latency_ms = start.elapsed().as_millis();
            conn.close().await;
            result?;

            if cli.output_json {
                let out = serde_json::json!({
                    "database": conn.db_type(),
                    "connected": true,
                    "latency_ms": latency_ms,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Health Check Results:");
                println!("  {}: OK ({}ms)", conn.db_type(), latency_ms);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_report(report: &MigrationReport) {
    println!("\nMigration run {} ({})", report.run_id, report.dialect);
    for step in &report.steps {
        let status = match &step.outcome {
            StepOutcome::Applied => format!("{:?}", step.state).to_lowercase(),
            StepOutcome::Skipped => "skipped".to_string(),
            StepOutcome::Failed { kind, reason } => {
                format!("FAILED ({:?}): {}", kind, reason)
            }
        };
        println!("  [{}] {}: {}", step.index, step.description, status);
    }
    println!(
        "\n  Applied: {}, Skipped: {}, Failed: {}",
        report.applied(),
        report.skipped(),
        report.failed()
    );
    if let Some(index) = report.halted_at {
        println!(
            "  Halted at step {}; {} step(s) not attempted",
            index,
            report.steps_total - report.steps.len()
        );
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so generated DDL on stdout stays clean
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
