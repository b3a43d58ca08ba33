// src/main.rs
mod extractors;
mod layout;
mod payslip;
mod storage;
mod utils;

use clap::Parser;
use extractors::{TabulaConfig, TabulaExtractor};
use futures::stream::{self, StreamExt};
use layout::LayoutConfig;
use payslip::PayslipAssembler;
use std::path::PathBuf;
use std::time::Duration;
use storage::{Importer, JsonStore, StoredPayslip};
use utils::debug_dump;
use utils::AppError;

/// Extracts validated payslip records from payslip PDFs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the layout config file
    #[arg(short, long, default_value = "./config/payslip.conf.json")]
    config_file: PathBuf,

    /// Path to the java binary
    #[arg(long, default_value = "/usr/bin/java")]
    java_path: PathBuf,

    /// Path to the tabula-java jar
    #[arg(long)]
    tabula_path: PathBuf,

    /// Output directory for extracted records
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Currency code stamped on every payslip
    #[arg(long, default_value = "USD")]
    currency: String,

    /// Always store a fresh record instead of replacing the one with the same document id
    #[arg(long)]
    no_overwrite: bool,

    /// Number of documents processed concurrently
    #[arg(short = 'j', long, default_value_t = 4)]
    concurrency: usize,

    /// Timeout in seconds for a single tabula invocation
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Retries for a tabula invocation that failed to run, exited non-zero or timed out
    #[arg(long, default_value_t = 1)]
    max_retries: u32,

    /// Delay before the first retry in milliseconds (doubles per retry)
    #[arg(long, default_value_t = 500)]
    retry_backoff_ms: u64,

    /// Debug mode - save raw section output and failure reports
    #[arg(short, long)]
    debug: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,

    /// Payslip PDF files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(if args.verbose { "debug" } else { "info" });
    tracing::info!("Starting processing for args: {:?}", args);

    if args.concurrency == 0 {
        return Err(AppError::Config("--concurrency must be at least 1".to_string()));
    }

    // 3. Load the layout once; every document shares it read-only
    let layout = LayoutConfig::load(&args.config_file)?;
    for section in layout.sections() {
        tracing::debug!(
            "Section {} on page {} ({}x{} reference): {:?}, adjust {:?}, heads {:?}",
            section.name,
            section.page,
            section.height,
            section.width,
            section.bounds,
            section.adjustment,
            section.columns
        );
    }

    // 4. Initialize extraction backend and storage
    let extractor = TabulaExtractor::new(TabulaConfig {
        java_path: args.java_path.clone(),
        tabula_path: args.tabula_path.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
        max_retries: args.max_retries,
        retry_backoff: Duration::from_millis(args.retry_backoff_ms),
    });
    let mut storage = JsonStore::new(&args.output_dir)?;
    tracing::info!("Records will be written to {}", storage.base_dir().display());

    let debug_dir = args.output_dir.join("debug");
    let mut assembler = PayslipAssembler::new(&layout, &extractor, args.currency.clone());
    if args.debug {
        assembler = assembler.with_debug_dir(&debug_dir);
    }
    let assembler = &assembler;

    // 5. Process documents with bounded concurrency; store results as they arrive
    let overwrite = !args.no_overwrite;
    let mut results = stream::iter(args.files.iter())
        .map(move |path| async move { (path, assembler.assemble(path).await) })
        .buffer_unordered(args.concurrency);

    let mut success_count = 0;
    let mut failure_count = 0;

    while let Some((path, result)) = results.next().await {
        match result {
            Ok(extracted) => {
                let document_id = extracted.payslip.document_id.clone();
                let record = StoredPayslip::new(extracted, path, layout.version());
                match storage.import(&record, overwrite, &document_id) {
                    Ok(_) => success_count += 1,
                    Err(e) => {
                        tracing::error!("Failed to save payslip {}: {}", document_id, e);
                        failure_count += 1;
                    }
                }
            }
            Err(e) => {
                tracing::error!("Failed to process {}: {}", path.display(), e);
                failure_count += 1;

                if args.debug {
                    // Save failure information for debugging
                    let dir = debug_dump::document_debug_dir(&debug_dir, path);
                    if let Err(io_err) = debug_dump::save_failure_report(&dir, path, &e) {
                        tracing::error!("Failed to save failure info: {}", io_err);
                    }
                }
            }
        }
    }

    storage.close()?;
    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "Failed to extract any payslips from {} documents",
            failure_count
        )));
    }

    Ok(())
}
