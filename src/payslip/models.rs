// src/payslip/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One itemized line (an earning, deduction or tax) of a payslip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayslipHead {
    pub name: String,
    pub current: f64,
    pub ytd: f64,
}

/// Totals as printed on the payslip, extracted independently of the heads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PayslipSummary {
    pub gross: f64,
    pub taxable: f64,
    pub taxes: f64,
    pub deductions: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payslip {
    pub document_id: String,
    pub currency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub date: NaiveDate,
    pub net_pay: f64,
    pub summary: PayslipSummary,
    pub income_heads: Vec<PayslipHead>,
    pub deduction_heads: Vec<PayslipHead>,
    pub tax_heads: Vec<PayslipHead>,
}

/// Fields of the pay period section.
#[derive(Debug, Clone, PartialEq)]
pub struct PayPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub date: NaiveDate,
    pub document_id: String,
    pub net_pay: f64,
}

/// A head row that could not be decoded and was left out of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedHead {
    pub section: String,
    /// Row index within the section's tool output.
    pub row: usize,
    pub reason: String,
}

/// A validated payslip together with the audit trail of what was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPayslip {
    pub payslip: Payslip,
    pub warnings: Vec<SkippedHead>,
}

/// Sum of the current-period amounts of `heads`.
pub fn heads_total(heads: &[PayslipHead]) -> f64 {
    heads.iter().map(|head| head.current).sum()
}
