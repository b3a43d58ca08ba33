// src/extractors/section.rs
use crate::layout::{calibrate, Bounds, CalibrationOffset, PageDims};
use crate::utils::error::ExtractError;
use async_trait::async_trait;
use std::path::Path;

/// One region of one page of one document, handed to the extraction backend.
#[derive(Debug, Clone, Copy)]
pub struct SectionRequest<'a> {
    pub section: &'a str,
    pub page: u32,
    pub bounds: Bounds,
    pub document: &'a Path,
}

/// Raw tabular bytes a backend returned for a section.
#[derive(Debug, Clone)]
pub struct ExtractedSection {
    pub section_name: String,
    pub bounds: Bounds,
    pub raw: Vec<u8>,
}

/// A table-extraction backend: probes page geometry and pulls tabular data out of a region.
///
/// Calibration and assembly only see this trait, so a different tool (or
/// different invocation flags) can be swapped in without touching them.
#[async_trait]
pub trait SectionExtractor: Send + Sync {
    /// Detected geometry of the document's first page.
    async fn probe_page(&self, document: &Path) -> Result<PageDims, ExtractError>;

    /// Raw delimiter-separated rows found inside `request.bounds`.
    async fn extract_region(&self, request: &SectionRequest<'_>) -> Result<Vec<u8>, ExtractError>;

    /// Drift of this document from the reference geometry `base`.
    async fn page_offset(&self, document: &Path, base: PageDims) -> Result<CalibrationOffset, ExtractError> {
        let detected = self.probe_page(document).await?;
        let offset = calibrate(detected, base);
        tracing::info!(
            "Detected page {}x{} for {} (offset {:.2}, {:.2})",
            detected.height,
            detected.width,
            document.display(),
            offset.height,
            offset.width
        );
        Ok(offset)
    }

    async fn extract_section(&self, request: &SectionRequest<'_>) -> Result<ExtractedSection, ExtractError> {
        tracing::info!(
            "Extracting section {} from {} (page {}, bounds {:?})",
            request.section,
            request.document.display(),
            request.page,
            request.bounds
        );
        let raw = self.extract_region(request).await?;
        Ok(ExtractedSection {
            section_name: request.section.to_string(),
            bounds: request.bounds,
            raw,
        })
    }
}
