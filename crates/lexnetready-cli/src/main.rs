use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use lexnetready::config::{default_config_path, load_config_or_default};
use lexnetready::pipeline::{LogLevel, RunEvent};
use lexnetready::preflight::{self, PreflightError};
use lexnetready::{
    spawn_run, Batch, Config, DocumentOutcome, DocumentStage, Pipeline, PipelineConfig,
    RunSummary,
};

#[derive(Parser, Debug)]
#[command(
    name = "lexnetready",
    about = "Prepare documents for LexNET: PDF/A with OCR, PAdES signature and a signed index",
    long_about = "Converts a folder's documents to searchable PDF/A, signs them with AutoFirma,\n\
                  verifies each signature and writes everything to a LEXNET_READY folder next\n\
                  to the originals, optionally with a linked and signed document index.",
    version
)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show library diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process documents from a single folder
    Run {
        /// Documents to process, all from the same folder
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Convert and OCR this file but do not sign it (repeatable)
        #[arg(long = "unsigned", value_name = "FILE")]
        unsigned: Vec<PathBuf>,

        /// Do not generate the DOC 0 index
        #[arg(long)]
        no_index: bool,
    },

    /// Check that every external tool is installed
    Check,

    /// Print the effective configuration as JSON
    Config {
        /// Print the default config file location instead
        #[arg(long)]
        path: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<ExitCode> {
    let config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            files,
            unsigned,
            no_index,
        } => cmd_run(&config, &files, &unsigned, no_index),
        Commands::Check => Ok(cmd_check(&config)),
        Commands::Config { path } => cmd_config(&config, path),
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Bridge `log` records from the worker into tracing
    tracing_log::LogTracer::init()?;
    Ok(())
}

fn cmd_run(
    config: &Config,
    files: &[PathBuf],
    unsigned: &[PathBuf],
    no_index: bool,
) -> Result<ExitCode> {
    if let Err(e) = preflight::check_dependencies(&config.tools) {
        print_missing(&e);
        return Ok(ExitCode::FAILURE);
    }

    let mut batch = Batch::with_output_directory_name(&config.output_directory_name);
    let added = batch
        .add_documents(files)
        .context("Failed to add documents")?;
    debug!(
        "Added {} documents ({} duplicates ignored)",
        added.added, added.duplicates
    );

    for path in unsigned {
        if !batch.contains(path) {
            batch
                .add_documents([path])
                .with_context(|| format!("Failed to add {}", path.display()))?;
        }
        batch.set_sign_intent(path, false)?;
    }
    batch.set_generate_index(config.generate_index && !no_index);

    let pipeline = Pipeline::from_config(Arc::new(PipelineConfig::from_config(config)));
    let handle = spawn_run(pipeline, batch)?;

    let cancel = handle.cancel_flag();
    ctrlc::set_handler(move || {
        eprintln!("Cancelling after the current document...");
        cancel.store(true, std::sync::atomic::Ordering::SeqCst);
    })
    .context("Failed to install Ctrl-C handler")?;

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}%")?
            .progress_chars("█▓▒░  "),
    );

    for event in handle.events().iter() {
        match event {
            RunEvent::Log(line) => {
                let prefix = match line.level {
                    LogLevel::Info => "",
                    LogLevel::Warn => "warning: ",
                    LogLevel::Error => "error: ",
                };
                bar.println(format!(
                    "{} {}{}",
                    line.timestamp.format("%H:%M:%S"),
                    prefix,
                    line.message
                ));
            }
            RunEvent::Progress(percent) => bar.set_position(percent.round() as u64),
            RunEvent::Finished => break,
        }
    }
    bar.finish_and_clear();

    let output = handle.join()?;
    let summary = output.result?;
    print_report(&output.batch, &summary);

    if summary.cancelled {
        Ok(ExitCode::from(130))
    } else if summary.failures().next().is_some() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn cmd_check(config: &Config) -> ExitCode {
    match preflight::check_dependencies(&config.tools) {
        Ok(()) => {
            let tools = &config.tools;
            for program in [
                &tools.ocr.program,
                &tools.converter.program,
                &tools.signer.java,
                &tools.inspector.program,
            ] {
                let resolved = preflight::resolve_program(program)
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| program.clone());
                println!("ok  {}", resolved);
            }
            println!("ok  {}", tools.signer.jar);
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_missing(&e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_config(config: &Config, path: bool) -> Result<ExitCode> {
    if path {
        match default_config_path() {
            Some(p) => println!("{}", p.display()),
            None => anyhow::bail!("No user config directory on this platform"),
        }
    } else {
        println!("{}", serde_json::to_string_pretty(config)?);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_missing(err: &PreflightError) {
    eprintln!("The following dependencies are missing:");
    for missing in err.missing() {
        eprintln!("  - {}", missing);
    }
    eprintln!("Install them (or fix their paths in the configuration) and try again.");
}

fn print_report(batch: &Batch, summary: &RunSummary) {
    println!();
    for document in batch.documents() {
        println!(
            "{:<40} {}",
            document.file_name(),
            describe(document.stage(), document.outcome())
        );
    }
    if let Some(index) = &summary.index {
        let state = if index.signed { "signed" } else { "not signed" };
        println!("{:<40} index, {}", file_name(&index.path), state);
    }

    let failures = summary.failures().count();
    let warnings = summary.warnings().count();
    if failures > 0 || warnings > 0 {
        println!();
        println!("{} failures, {} warnings", failures, warnings);
    }
    println!("Output: {}", summary.output_directory.display());
}

fn describe(stage: DocumentStage, outcome: Option<DocumentOutcome>) -> &'static str {
    match outcome {
        Some(DocumentOutcome::Signed) => "signed",
        Some(DocumentOutcome::Unsigned) => "converted, not signed",
        Some(DocumentOutcome::SigningFailed) => "converted, signing failed",
        Some(DocumentOutcome::OcrFailed) => "OCR failed",
        Some(DocumentOutcome::ConversionFailed) => "conversion failed",
        None if stage == DocumentStage::Pending => "not started",
        None => "incomplete",
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
