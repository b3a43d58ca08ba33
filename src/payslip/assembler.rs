// src/payslip/assembler.rs
use crate::extractors::{parse_rows, Row, SectionExtractor, SectionRequest};
use crate::layout::{Bounds, CalibrationOffset, HeadColumns, LayoutConfig, SectionDefinition};
use crate::payslip::models::{ExtractedPayslip, PayPeriod, Payslip, PayslipHead, PayslipSummary, SkippedHead};
use crate::payslip::validator::validate;
use crate::utils::amount::to_amount;
use crate::utils::debug_dump;
use crate::utils::error::{DocumentError, FormatError, ParseError};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

// --- Section names, in extraction order ---
pub const PAY_PERIOD: &str = "pay_period";
pub const PAY_SUMMARY: &str = "pay_summary";
pub const EARNINGS: &str = "earnings";
pub const DEDUCTIONS: &str = "deductions";
pub const TAXES: &str = "taxes";

const DATE_FORMAT: &str = "%m/%d/%Y";
const DATE_FORMAT_HINT: &str = "MM/DD/YYYY";

/// A section definition with its bounds calibrated for the current document.
struct LocatedSection<'l> {
    definition: &'l SectionDefinition,
    bounds: Bounds,
}

/// Every section of the payslip, located before anything is extracted.
struct SectionPlan<'l> {
    period: LocatedSection<'l>,
    summary: LocatedSection<'l>,
    earnings: LocatedSection<'l>,
    deductions: LocatedSection<'l>,
    taxes: LocatedSection<'l>,
}

/// Which rows of a head section carry no heads.
#[derive(Debug, Clone, Copy)]
enum HeadRows {
    /// Header row only.
    SkipHeader,
    /// Header row and a totals trailer row.
    SkipHeaderAndTrailer,
}

/// Turns one payslip document into a validated [`ExtractedPayslip`].
///
/// Holds only shared, read-only state, so one assembler can serve many
/// documents concurrently.
pub struct PayslipAssembler<'a, E: SectionExtractor + ?Sized> {
    layout: &'a LayoutConfig,
    extractor: &'a E,
    currency: String,
    debug_dir: Option<PathBuf>,
}

impl<'a, E: SectionExtractor + ?Sized> PayslipAssembler<'a, E> {
    pub fn new(layout: &'a LayoutConfig, extractor: &'a E, currency: impl Into<String>) -> Self {
        Self {
            layout,
            extractor,
            currency: currency.into(),
            debug_dir: None,
        }
    }

    /// Save every section's raw tool output under `dir` for inspection.
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    #[tracing::instrument(name = "assemble", skip(self, document), fields(document = %document.display()))]
    pub async fn assemble(&self, document: &Path) -> Result<ExtractedPayslip, DocumentError> {
        let offset = self
            .extractor
            .page_offset(document, self.layout.base_dims())
            .await?;
        let plan = self.plan(offset)?;
        let mut warnings = Vec::new();

        let rows = self.section_rows(&plan.period, document).await?;
        let period = decode_period(&rows)?;

        let rows = self.section_rows(&plan.summary, document).await?;
        let summary = decode_summary(&rows)?;

        let rows = self.section_rows(&plan.earnings, document).await?;
        let income_heads = decode_heads(
            EARNINGS,
            &rows,
            plan.earnings.definition.columns,
            HeadRows::SkipHeaderAndTrailer,
            &mut warnings,
        );

        let rows = self.section_rows(&plan.deductions, document).await?;
        let deduction_heads = decode_heads(
            DEDUCTIONS,
            &rows,
            plan.deductions.definition.columns,
            HeadRows::SkipHeader,
            &mut warnings,
        );

        let rows = self.section_rows(&plan.taxes, document).await?;
        let tax_heads = decode_heads(
            TAXES,
            &rows,
            plan.taxes.definition.columns,
            HeadRows::SkipHeader,
            &mut warnings,
        );

        let payslip = Payslip {
            document_id: period.document_id,
            currency: self.currency.clone(),
            start_date: period.start_date,
            end_date: period.end_date,
            date: period.date,
            net_pay: period.net_pay,
            summary,
            income_heads,
            deduction_heads,
            tax_heads,
        };
        validate(&payslip)?;

        if !warnings.is_empty() {
            tracing::warn!("{} head rows skipped for {}", warnings.len(), payslip.document_id);
        }
        Ok(ExtractedPayslip { payslip, warnings })
    }

    /// Locates all sections up front so a missing one fails before any extraction runs.
    fn plan(&self, offset: CalibrationOffset) -> Result<SectionPlan<'a>, DocumentError> {
        let layout: &'a LayoutConfig = self.layout;
        let locate = |name: &str| -> Result<LocatedSection<'a>, DocumentError> {
            let (definition, bounds) = layout.locate(name, offset)?;
            Ok(LocatedSection { definition, bounds })
        };
        Ok(SectionPlan {
            period: locate(PAY_PERIOD)?,
            summary: locate(PAY_SUMMARY)?,
            earnings: locate(EARNINGS)?,
            deductions: locate(DEDUCTIONS)?,
            taxes: locate(TAXES)?,
        })
    }

    async fn section_rows(&self, located: &LocatedSection<'_>, document: &Path) -> Result<Vec<Row>, DocumentError> {
        let request = SectionRequest {
            section: &located.definition.name,
            page: located.definition.page,
            bounds: located.bounds,
            document,
        };
        let extracted = self.extractor.extract_section(&request).await?;
        tracing::debug!(
            "Section {} returned {} bytes from {:?}",
            extracted.section_name,
            extracted.raw.len(),
            extracted.bounds
        );

        if let Some(base) = &self.debug_dir {
            let dir = debug_dump::document_debug_dir(base, document);
            if let Err(e) = debug_dump::save_section_dump(&dir, &extracted.section_name, &extracted.raw) {
                tracing::warn!("Failed to save debug output for {}: {}", extracted.section_name, e);
            }
        }

        Ok(parse_rows(&extracted.section_name, &extracted.raw)?)
    }
}

fn cell<'r>(section: &str, rows: &'r [Row], row: usize, column: usize) -> Result<&'r str, ParseError> {
    rows.get(row)
        .and_then(|r| r.cell(column))
        .map(str::trim)
        .ok_or_else(|| ParseError::MissingCell {
            section: section.to_string(),
            row,
            column,
        })
}

fn format_error(section: &str) -> impl Fn(FormatError) -> DocumentError + '_ {
    move |source| DocumentError::Format {
        section: section.to_string(),
        source,
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| FormatError::InvalidDate {
        value: value.to_string(),
        format: DATE_FORMAT_HINT,
    })
}

/// Label/value rows: start, end and issue dates, document id, net pay.
fn decode_period(rows: &[Row]) -> Result<PayPeriod, DocumentError> {
    let to_doc_error = format_error(PAY_PERIOD);
    let date_at = |row: usize| -> Result<NaiveDate, DocumentError> {
        parse_date(cell(PAY_PERIOD, rows, row, 1)?).map_err(&to_doc_error)
    };

    let period = PayPeriod {
        start_date: date_at(0)?,
        end_date: date_at(1)?,
        date: date_at(2)?,
        document_id: cell(PAY_PERIOD, rows, 3, 1)?.to_string(),
        net_pay: to_amount(cell(PAY_PERIOD, rows, 4, 1)?).map_err(&to_doc_error)?,
    };
    tracing::debug!("Decoded pay period {:?}", period);
    Ok(period)
}

/// Header row, then one data row: label, gross, taxable, taxes, deductions, net.
fn decode_summary(rows: &[Row]) -> Result<PayslipSummary, DocumentError> {
    let to_doc_error = format_error(PAY_SUMMARY);
    let amount_at = |column: usize| -> Result<f64, DocumentError> {
        to_amount(cell(PAY_SUMMARY, rows, 1, column)?).map_err(&to_doc_error)
    };

    let summary = PayslipSummary {
        gross: amount_at(1)?,
        taxable: amount_at(2)?,
        taxes: amount_at(3)?,
        deductions: amount_at(4)?,
        net: amount_at(5)?,
    };
    tracing::debug!("Decoded pay summary {:?}", summary);
    Ok(summary)
}

/// Decodes the head rows of a section. Undecodable rows are skipped and recorded in `warnings`.
fn decode_heads(
    section: &str,
    rows: &[Row],
    columns: HeadColumns,
    layout: HeadRows,
    warnings: &mut Vec<SkippedHead>,
) -> Vec<PayslipHead> {
    let end = match layout {
        HeadRows::SkipHeader => rows.len(),
        HeadRows::SkipHeaderAndTrailer => rows.len().saturating_sub(1),
    };
    let body = rows.get(1..end).unwrap_or(&[]);

    let mut heads = Vec::with_capacity(body.len());
    for (i, row) in body.iter().enumerate() {
        match decode_head(row, columns) {
            Ok(head) => heads.push(head),
            Err(reason) => {
                tracing::warn!("Skipping {} row {}: {}", section, i + 1, reason);
                warnings.push(SkippedHead {
                    section: section.to_string(),
                    row: i + 1,
                    reason,
                });
            }
        }
    }
    tracing::debug!("Decoded {} {} heads", heads.len(), section);
    heads
}

fn decode_head(row: &Row, columns: HeadColumns) -> Result<PayslipHead, String> {
    let name = row.cell(0).map(str::trim).unwrap_or_default();
    let current = row
        .cell_at(columns.current)
        .map(str::trim)
        .ok_or_else(|| format!("no current column in {:?}", row.cells()))?;
    let ytd = row
        .cell_at(columns.ytd)
        .map(str::trim)
        .ok_or_else(|| format!("no YTD column in {:?}", row.cells()))?;

    if current.is_empty() && ytd.is_empty() {
        return Err(format!("no current or YTD amount for '{}'", name));
    }
    let current = to_amount(current).map_err(|e| format!("error parsing current {}: {}", name, e))?;
    let ytd = to_amount(ytd).map_err(|e| format!("error parsing YTD {}: {}", name, e))?;

    Ok(PayslipHead {
        name: name.to_string(),
        current,
        ytd,
    })
}
