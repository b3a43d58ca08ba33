// src/extractors/tabula.rs
use crate::extractors::section::{SectionExtractor, SectionRequest};
use crate::layout::{Bounds, PageDims};
use crate::utils::error::ExtractError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const PROBE_SECTION: &str = "page probe";

/// How to invoke tabula-java and how patiently.
#[derive(Debug, Clone)]
pub struct TabulaConfig {
    pub java_path: PathBuf,
    pub tabula_path: PathBuf,
    /// Upper bound on a single tool invocation.
    pub timeout: Duration,
    /// Extra attempts after a spawn failure, non-zero exit or timeout.
    pub max_retries: u32,
    /// Delay before the first retry; doubles after each attempt.
    pub retry_backoff: Duration,
}

#[derive(Debug, Deserialize)]
struct PageAttrs {
    height: f64,
    width: f64,
}

/// Extracts tables from PDF files using the tabula-java CLI.
#[derive(Debug, Clone)]
pub struct TabulaExtractor {
    config: TabulaConfig,
}

impl TabulaExtractor {
    pub fn new(config: TabulaConfig) -> Self {
        Self { config }
    }

    fn java_args(&self) -> Vec<String> {
        vec!["-Djava.awt.headless=true".to_string()]
    }

    /// Arguments for tabula's debug entry point, which prints page attributes as JSON.
    fn probe_args(&self, document: &Path) -> Vec<String> {
        let mut args = self.java_args();
        args.extend([
            "-cp".to_string(),
            self.config.tabula_path.display().to_string(),
            "technology.tabula.debug.Debug".to_string(),
            "-n".to_string(),
            "-j".to_string(),
            document.display().to_string(),
        ]);
        args
    }

    fn extract_args(&self, page: u32, bounds: Bounds, document: &Path) -> Vec<String> {
        let mut args = self.java_args();
        args.extend([
            "-jar".to_string(),
            self.config.tabula_path.display().to_string(),
            "--no-spreadsheet".to_string(),
            "-i".to_string(),
            "-p".to_string(),
            page.to_string(),
            "-a".to_string(),
            // tabula wants top,left,bottom,right
            format!("{:.6},{:.6},{:.6},{:.6}", bounds.y1, bounds.x1, bounds.y2, bounds.x2),
            document.display().to_string(),
        ]);
        args
    }

    /// Runs java once, bounded by the configured timeout.
    async fn run_once(&self, label: &str, args: &[String]) -> Result<Vec<u8>, ExtractError> {
        tracing::debug!("Executing {} {:?}", self.config.java_path.display(), args);
        let child = Command::new(&self.config.java_path)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.config.timeout, child).await {
            Ok(result) => result.map_err(|e| ExtractError::Extraction {
                section: label.to_string(),
                reason: format!("failed to execute {}: {}", self.config.java_path.display(), e),
            })?,
            Err(_) => {
                return Err(ExtractError::Timeout {
                    section: label.to_string(),
                    after: self.config.timeout,
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Extraction {
                section: label.to_string(),
                reason: format!("tabula exited with {}: {}", output.status, stderr.trim()),
            });
        }
        Ok(output.stdout)
    }

    /// Runs java, retrying transient failures with exponential backoff.
    async fn run(&self, label: &str, args: &[String]) -> Result<Vec<u8>, ExtractError> {
        let mut delay = self.config.retry_backoff;
        let mut attempt = 0;
        loop {
            match self.run_once(label, args).await {
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "{} (attempt {}/{}), retrying in {:?}",
                        e,
                        attempt,
                        self.config.max_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                result => return result,
            }
        }
    }
}

/// Reads the first page's geometry out of tabula's debug JSON.
fn parse_page_probe(document: &Path, output: &[u8]) -> Result<PageDims, ExtractError> {
    let probe_error = |reason: String| ExtractError::PageProbe {
        document: document.to_path_buf(),
        reason,
    };
    let pages: Vec<PageAttrs> =
        serde_json::from_slice(output).map_err(|e| probe_error(format!("invalid probe output: {}", e)))?;
    let first = pages
        .first()
        .ok_or_else(|| probe_error("probe reported no pages".to_string()))?;
    Ok(PageDims::new(first.height, first.width))
}

#[async_trait]
impl SectionExtractor for TabulaExtractor {
    async fn probe_page(&self, document: &Path) -> Result<PageDims, ExtractError> {
        let output = self
            .run(PROBE_SECTION, &self.probe_args(document))
            .await
            .map_err(|e| ExtractError::PageProbe {
                document: document.to_path_buf(),
                reason: e.to_string(),
            })?;
        tracing::debug!("Detection output - {}", String::from_utf8_lossy(&output));
        parse_page_probe(document, &output)
    }

    async fn extract_region(&self, request: &SectionRequest<'_>) -> Result<Vec<u8>, ExtractError> {
        let args = self.extract_args(request.page, request.bounds, request.document);
        self.run(request.section, &args).await
    }
}
