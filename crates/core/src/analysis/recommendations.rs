use serde::{Deserialize, Serialize};

use crate::analysis::metrics::DealMetrics;
use crate::analysis::report::format_pct;

const MIN_CASH_ON_CASH: f64 = 0.05;
const MIN_DSCR: f64 = 1.25;
const FAVORABLE_RISK_SCORE: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
}

impl Recommendation {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Advisories for a finished analysis, in a fixed order. Every check runs.
pub fn recommend(metrics: &DealMetrics) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if metrics.cash_on_cash < MIN_CASH_ON_CASH {
        out.push(Recommendation::new(
            Severity::Warning,
            "Cash-on-cash return is below 5%. Consider renegotiating price or increasing down payment.",
        ));
    }

    if metrics.cap_rate < metrics.target_cap_rate {
        out.push(Recommendation::new(
            Severity::Info,
            format!(
                "Property cap rate ({}%) is below your target ({}%). This may not meet your return requirements.",
                format_pct(metrics.cap_rate),
                format_pct(metrics.target_cap_rate),
            ),
        ));
    }

    if metrics.dscr.is_some_and(|dscr| dscr < MIN_DSCR) {
        out.push(Recommendation::new(
            Severity::Warning,
            "DSCR is below 1.25. Consider a larger down payment or better financing terms.",
        ));
    }

    if metrics.risk_score >= FAVORABLE_RISK_SCORE {
        out.push(Recommendation::new(
            Severity::Success,
            "This property has a favorable risk profile. Consider moving forward with due diligence.",
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::metrics::{analyze, Assumptions, DealInput};

    fn deal(price: f64, down: f64, gross: f64, expenses: f64, target: f64) -> DealMetrics {
        let input = DealInput {
            purchase_price: price,
            down_payment: down,
            interest_rate: 0.07,
            loan_term_years: 30,
            renovation_costs: 0.0,
            gross_income: gross,
            expenses,
            target_cap_rate: target,
        };
        analyze(&input, &Assumptions::default()).unwrap()
    }

    fn severities(recs: &[Recommendation]) -> Vec<Severity> {
        recs.iter().map(|r| r.severity).collect()
    }

    #[test]
    fn office_building_gets_all_but_the_cap_rate_note() {
        let m = deal(2_500_000.0, 625_000.0, 18_750.0, 5_208.33, 0.06);
        let recs = recommend(&m);
        assert_eq!(
            severities(&recs),
            vec![Severity::Warning, Severity::Warning, Severity::Success]
        );
        assert!(recs[0].message.starts_with("Cash-on-cash"));
        assert!(recs[1].message.starts_with("DSCR"));
    }

    #[test]
    fn negative_cash_flow_warns_and_withholds_success() {
        // Thin income on a heavily financed deal.
        let m = deal(1_000_000.0, 100_000.0, 6_000.0, 2_500.0, 0.06);
        assert!(m.cash_on_cash < 0.0);
        assert!(m.risk_score < 70);

        let recs = recommend(&m);
        assert!(recs
            .iter()
            .any(|r| r.severity == Severity::Warning && r.message.starts_with("Cash-on-cash")));
        assert!(recs.iter().all(|r| r.severity != Severity::Success));
    }

    #[test]
    fn cap_rate_equal_to_target_is_not_flagged() {
        // NOI 60,000 on 1,000,000.
        let m = deal(1_000_000.0, 250_000.0, 10_000.0, 5_000.0, 0.06);
        assert_eq!(m.cap_rate, 0.06);
        assert!(recommend(&m).iter().all(|r| r.severity != Severity::Info));
    }

    #[test]
    fn cap_rate_below_target_interpolates_both_rates() {
        let m = deal(1_000_000.0, 250_000.0, 10_000.0, 5_000.0, 0.07);
        let info: Vec<_> = recommend(&m)
            .into_iter()
            .filter(|r| r.severity == Severity::Info)
            .collect();
        assert_eq!(info.len(), 1);
        assert_eq!(
            info[0].message,
            "Property cap rate (6.00%) is below your target (7.00%). This may not meet your return requirements."
        );
    }

    #[test]
    fn strong_unlevered_deal_only_gets_success() {
        let m = deal(1_000_000.0, 1_000_000.0, 12_000.0, 4_000.0, 0.06);
        assert_eq!(m.dscr, None);
        let recs = recommend(&m);
        assert_eq!(severities(&recs), vec![Severity::Success]);
    }

    #[test]
    fn serializes_severity_as_type() {
        let rec = Recommendation::new(Severity::Info, "x");
        assert_eq!(
            serde_json::to_value(&rec).unwrap(),
            serde_json::json!({"type": "info", "message": "x"})
        );
    }
}
