use serde::{Deserialize, Serialize};

use crate::analysis::metrics::DealMetrics;
use crate::analysis::risk::RiskLevel;

/// Fraction as a percentage with two decimals, e.g. `0.065` -> `"6.50"`.
pub fn format_pct(fraction: f64) -> String {
    format!("{:.2}", fraction * 100.0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub level: String,
    pub color: String,
    pub message: String,
}

impl From<RiskLevel> for RiskVerdict {
    fn from(level: RiskLevel) -> Self {
        Self {
            level: level.label().to_string(),
            color: level.color().to_string(),
            message: level.message().to_string(),
        }
    }
}

/// Presentation view of [`DealMetrics`]. Percentages and ratios are rounded here and nowhere
/// else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealReport {
    pub purchase_price: f64,
    pub down_payment: f64,
    pub loan_amount: f64,
    pub total_investment: f64,
    pub monthly_mortgage: f64,
    pub annual_gross_income: f64,
    pub annual_expenses: f64,
    pub noi: f64,
    pub annual_debt_service: f64,
    pub cash_flow: f64,
    pub monthly_cash_flow: f64,
    pub cap_rate: String,
    pub cash_on_cash: String,
    pub total_return: String,
    pub total_return_amount: f64,
    /// `None` for an all-cash purchase.
    pub dscr: Option<String>,
    pub risk_score: u8,
    pub risk_level: RiskVerdict,
    pub target_cap_rate: String,
    pub compared_to_target: String,
}

impl DealReport {
    pub fn from_metrics(m: &DealMetrics) -> Self {
        Self {
            purchase_price: m.purchase_price,
            down_payment: m.down_payment,
            loan_amount: m.loan_amount,
            total_investment: m.total_investment,
            monthly_mortgage: m.monthly_mortgage,
            annual_gross_income: m.annual_gross_income,
            annual_expenses: m.annual_expenses,
            noi: m.noi,
            annual_debt_service: m.annual_debt_service,
            cash_flow: m.cash_flow,
            monthly_cash_flow: m.monthly_cash_flow,
            cap_rate: format_pct(m.cap_rate),
            cash_on_cash: format_pct(m.cash_on_cash),
            total_return: format_pct(m.total_return_pct),
            total_return_amount: m.total_return_amount,
            dscr: m.dscr.map(|d| format!("{d:.2}")),
            risk_score: m.risk_score,
            risk_level: m.risk_level.into(),
            target_cap_rate: format_pct(m.target_cap_rate),
            compared_to_target: format_pct(m.compared_to_target),
        }
    }
}
