// src/payslip/validator.rs
use crate::payslip::models::{heads_total, Payslip};
use crate::utils::amount::amounts_equal;
use crate::utils::error::{Mismatch, ValidationError};

/// Recomputes the payslip's sums from its heads and checks them against the
/// extracted summary figures. Every broken invariant is reported, not just the first.
pub fn validate(payslip: &Payslip) -> Result<(), ValidationError> {
    let income = heads_total(&payslip.income_heads);
    let deductions = heads_total(&payslip.deduction_heads);
    let taxes = heads_total(&payslip.tax_heads);
    let net = income - deductions - taxes;

    let mut mismatches = Vec::new();
    if !amounts_equal(income, payslip.summary.gross) {
        mismatches.push(Mismatch::Gross {
            reported: payslip.summary.gross,
            computed: income,
        });
    }
    if !amounts_equal(deductions, payslip.summary.deductions) {
        mismatches.push(Mismatch::Deductions {
            reported: payslip.summary.deductions,
            computed: deductions,
        });
    }
    if !amounts_equal(taxes, payslip.summary.taxes) {
        mismatches.push(Mismatch::Taxes {
            reported: payslip.summary.taxes,
            computed: taxes,
        });
    }
    if !amounts_equal(net, payslip.net_pay) {
        mismatches.push(Mismatch::NetPay {
            reported: payslip.net_pay,
            computed: net,
        });
    }

    if !mismatches.is_empty() {
        return Err(ValidationError {
            document_id: payslip.document_id.clone(),
            mismatches,
        });
    }

    tracing::info!(
        "Validated {}: gross {:.2}, deductions {:.2}, taxes {:.2}, net {:.2}",
        payslip.document_id,
        income,
        deductions,
        taxes,
        net
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payslip::models::{PayslipHead, PayslipSummary};
    use chrono::NaiveDate;

    fn head(name: &str, current: f64) -> PayslipHead {
        PayslipHead { name: name.to_string(), current, ytd: current * 12.0 }
    }

    fn balanced_payslip() -> Payslip {
        let date = NaiveDate::from_ymd_opt(2016, 6, 30).unwrap();
        Payslip {
            document_id: "DOC-42".to_string(),
            currency: "USD".to_string(),
            start_date: NaiveDate::from_ymd_opt(2016, 6, 16).unwrap(),
            end_date: date,
            date,
            net_pay: 120.0,
            summary: PayslipSummary {
                gross: 150.0,
                taxable: 140.0,
                taxes: 10.0,
                deductions: 20.0,
                net: 120.0,
            },
            income_heads: vec![head("Regular", 100.0), head("Bonus", 50.0)],
            deduction_heads: vec![head("401k", 20.0)],
            tax_heads: vec![head("Federal", 10.0)],
        }
    }

    #[test]
    fn accepts_consistent_payslip() {
        assert!(validate(&balanced_payslip()).is_ok());
    }

    #[test]
    fn names_the_gross_mismatch() {
        let mut payslip = balanced_payslip();
        payslip.summary.gross = 150.01;
        let err = validate(&payslip).unwrap_err();
        assert_eq!(err.document_id, "DOC-42");
        assert_eq!(
            err.mismatches,
            vec![Mismatch::Gross { reported: 150.01, computed: 150.0 }]
        );
    }

    #[test]
    fn names_the_deductions_mismatch() {
        let mut payslip = balanced_payslip();
        payslip.summary.deductions = 19.0;
        let err = validate(&payslip).unwrap_err();
        assert_eq!(
            err.mismatches,
            vec![Mismatch::Deductions { reported: 19.0, computed: 20.0 }]
        );
    }

    #[test]
    fn names_the_taxes_mismatch() {
        let mut payslip = balanced_payslip();
        payslip.summary.taxes = 10.5;
        let err = validate(&payslip).unwrap_err();
        assert_eq!(err.mismatches, vec![Mismatch::Taxes { reported: 10.5, computed: 10.0 }]);
    }

    #[test]
    fn names_the_net_pay_mismatch() {
        let mut payslip = balanced_payslip();
        payslip.net_pay = 121.0;
        let err = validate(&payslip).unwrap_err();
        assert_eq!(err.mismatches, vec![Mismatch::NetPay { reported: 121.0, computed: 120.0 }]);
    }

    #[test]
    fn reports_every_mismatch_at_once() {
        let mut payslip = balanced_payslip();
        payslip.tax_heads.push(head("State", 5.0));
        let err = validate(&payslip).unwrap_err();
        // An extra tax head breaks both the taxes total and the net pay.
        assert_eq!(err.mismatches.len(), 2);
        assert!(matches!(err.mismatches[0], Mismatch::Taxes { .. }));
        assert!(matches!(err.mismatches[1], Mismatch::NetPay { .. }));
    }

    #[test]
    fn tolerates_float_noise_below_epsilon() {
        let mut payslip = balanced_payslip();
        payslip.income_heads = vec![head("A", 0.1), head("B", 0.2)];
        payslip.summary.gross = 0.3;
        payslip.net_pay = 0.3 - 30.0;
        assert!(validate(&payslip).is_ok());
    }
}
