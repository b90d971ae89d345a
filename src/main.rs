// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use audit_pipeline::generation::SUMMARY_UNAVAILABLE_NOTE;
use audit_pipeline::utils::logging::{
    format_error, format_info, format_step, format_success, format_warning,
};
use audit_pipeline::{
    BedrockGenerator, CheckReport, Config, ExtractionCoordinator, FsObjectStore, HealthCheck,
    HealthReport, LanguageModel, ObjectStore, OperationTimer, PipelineOrchestrator, PollSchedule,
    RequestStore, S3ObjectStore, StorageBackend, TextGenerator, TextractDetector, UploadStore,
    Validator,
};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "audit_pipeline")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Document compliance pipeline for audit requests", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Audit the request and uploads belong to
    #[arg(short, long, global = true, value_name = "ID", default_value = "audit-12")]
    audit: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit the document request for an audit (auditor side)
    Request {
        #[arg(long, value_name = "NAME")]
        name: String,

        #[arg(long, value_name = "TEXT")]
        description: String,

        #[arg(long)]
        no_summary: bool,
    },

    Show {
        #[arg(long)]
        summarize: bool,
    },

    /// Check uploaded files against the current request (auditee side)
    Check {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    Extract {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    Init,

    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    audit_pipeline::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Audit Document Compliance Pipeline");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Request {
            name,
            description,
            no_summary,
        } => {
            cmd_request(&config, &cli.audit, &name, &description, no_summary).await?;
        }
        Commands::Show { summarize } => {
            cmd_show(&config, &cli.audit, summarize).await?;
        }
        Commands::Check { files } => {
            cmd_check(&config, &cli.audit, files, cli.color).await?;
        }
        Commands::Extract { file } => {
            cmd_extract(&config, &cli.audit, file).await?;
        }
        Commands::Init => {
            cmd_init(&config).await?;
        }
        Commands::Status => {
            cmd_status(&config).await?;
        }
    }

    Ok(())
}

async fn build_object_store(config: &Config) -> Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.storage.backend {
        StorageBackend::S3 => {
            Validator::validate_bucket_name(&config.storage.bucket)?;
            Arc::new(S3ObjectStore::from_config(config).await)
        }
        StorageBackend::Local => {
            Arc::new(FsObjectStore::new(config.storage.local_path.clone()))
        }
    };

    info!(
        "Using {} storage at {}",
        config.storage.backend,
        store.location()
    );
    Ok(store)
}

async fn build_orchestrator(config: &Config, store: Arc<dyn ObjectStore>) -> PipelineOrchestrator {
    let detector = Arc::new(TextractDetector::from_config(config).await);
    let generator = Arc::new(BedrockGenerator::from_config(config).await);

    PipelineOrchestrator::new(
        RequestStore::new(store.clone()),
        UploadStore::new(store),
        ExtractionCoordinator::new(detector, PollSchedule::from_config(&config.extraction)),
        LanguageModel::new(generator, config.generation.retries),
        &config.pipeline,
    )
}

async fn cmd_request(
    config: &Config,
    audit_id: &str,
    name: &str,
    description: &str,
    no_summary: bool,
) -> Result<()> {
    info!("Submitting request for audit '{}'", audit_id);

    let store = build_object_store(config).await?;
    let orchestrator = build_orchestrator(config, store).await;

    let (request, summary) = orchestrator
        .submit_request(audit_id, name, description, !no_summary)
        .await
        .context("Failed to submit audit request")?;

    println!(
        "{}",
        format_success(&format!("Request recorded for audit '{}'", request.audit_id))
    );
    println!("  {}", request.display_line());

    if let Some(summary) = summary {
        print_summary("What the auditee will be told", &summary);
    }

    Ok(())
}

async fn cmd_show(config: &Config, audit_id: &str, summarize: bool) -> Result<()> {
    let store = build_object_store(config).await?;
    let orchestrator = build_orchestrator(config, store).await;

    let (request, summary) = orchestrator
        .review_request(audit_id, summarize)
        .await
        .context("Failed to retrieve audit request")?;

    println!(
        "{}",
        format_info(&format!("Current request for audit '{}'", audit_id))
    );
    println!("  Document:    {}", request.document_name);
    println!("  Description: {}", request.description);
    println!("  Submitted:   {}", format_timestamp(request.created_at));

    if let Some(summary) = summary {
        print_summary("In plain language", &summary);
    }

    Ok(())
}

async fn cmd_check(
    config: &Config,
    audit_id: &str,
    files: Vec<PathBuf>,
    colored: bool,
) -> Result<()> {
    info!("Starting compliance check for audit '{}'", audit_id);
    let timer = OperationTimer::new("compliance check");

    let store = build_object_store(config).await?;
    let orchestrator = build_orchestrator(config, store).await;

    let total = files.len();
    let (results, stats) = orchestrator
        .check_many(audit_id, files, colored)
        .await
        .context("Compliance check could not start")?;

    println!();
    for (idx, (path, outcome)) in results.iter().enumerate() {
        match outcome {
            Ok(report) => print_report(idx + 1, total, path, report),
            Err(e) => {
                let line = format_error(&format!("{}: {}", path.display(), e));
                println!("{}", format_step(idx + 1, total, &line));
            }
        }
    }

    if let Some((_, Ok(report))) = results.iter().find(|(_, outcome)| outcome.is_ok()) {
        print_summary("What the auditor asked for", &report.summary);
    }

    println!(
        "\n{} compliant, {} non-compliant, {} failed",
        stats.compliant, stats.non_compliant, stats.checks_failed
    );
    timer.finish_with_count(total);

    if stats.checks_failed > 0 {
        return Err(anyhow::anyhow!(
            "{} of {} checks did not complete",
            stats.checks_failed,
            total
        ));
    }

    Ok(())
}

fn print_report(step: usize, total: usize, path: &Path, report: &CheckReport) {
    let line = format!("{}: {}", path.display(), report.verdict.label());
    let styled = if report.verdict.compliant {
        format_success(&line)
    } else {
        format_error(&line)
    };

    println!("{}", format_step(step, total, &styled));
    println!("    {}", report.verdict.rationale);

    if let Some(example) = &report.verdict.corrective_example {
        println!("    Expected instead: {}", example);
    }
}

fn print_summary(heading: &str, summary: &str) {
    if summary.starts_with(SUMMARY_UNAVAILABLE_NOTE) {
        println!("\n{}", format_warning(summary));
    } else {
        println!("\n{}:\n{}", heading, summary);
    }
}

async fn cmd_extract(config: &Config, audit_id: &str, file: PathBuf) -> Result<()> {
    let timer = OperationTimer::new("text extraction");

    let store = build_object_store(config).await?;
    let orchestrator = build_orchestrator(config, store).await;

    let extraction = orchestrator
        .extract_file(audit_id, &file)
        .await
        .context("Text extraction failed")?;

    println!(
        "{}",
        format_success(&format!(
            "Extracted {} lines from {}",
            extraction.line_count(),
            file.display()
        ))
    );
    if let Some(pages) = extraction.pages {
        println!("Pages: {}", pages);
    }

    println!("{}", "=".repeat(80));
    for line in &extraction.lines {
        println!("{}", line);
    }
    println!("{}", "=".repeat(80));

    timer.finish();
    Ok(())
}

async fn cmd_init(config: &Config) -> Result<()> {
    let store = build_object_store(config).await?;

    store
        .ensure_ready()
        .await
        .context("Failed to prepare storage")?;

    println!(
        "{}",
        format_success(&format!("Storage ready at {}", store.location()))
    );
    Ok(())
}

async fn cmd_status(config: &Config) -> Result<()> {
    info!("Probing pipeline components");

    let store = build_object_store(config).await?;
    let mut checks = Vec::new();

    let started = Instant::now();
    match store.probe().await {
        Ok(()) => checks.push(HealthCheck::healthy("storage", started.elapsed())),
        Err(e) => checks.push(HealthCheck::unhealthy(
            "storage",
            e.to_string(),
            started.elapsed(),
        )),
    }

    let started = Instant::now();
    if store.stored_object("probe").is_some() {
        checks.push(HealthCheck::healthy("extraction", started.elapsed()));
    } else {
        checks.push(HealthCheck::degraded(
            "extraction",
            "multi-page jobs need the s3 backend; single images still work".to_string(),
            started.elapsed(),
        ));
    }

    let generator = BedrockGenerator::from_config(config).await;
    let started = Instant::now();
    match generator.generate("Reply with the word OK.").await {
        Ok(_) => checks.push(HealthCheck::healthy("generation", started.elapsed())),
        Err(e) => checks.push(HealthCheck::unhealthy(
            "generation",
            e.to_string(),
            started.elapsed(),
        )),
    }

    let report = HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string());
    println!("{}", report.format());

    Ok(())
}

fn format_timestamp(epoch_secs: u64) -> String {
    chrono::DateTime::from_timestamp(epoch_secs as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
