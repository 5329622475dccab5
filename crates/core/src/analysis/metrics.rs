use serde::{Deserialize, Serialize};

use crate::analysis::error::AnalysisError;
use crate::analysis::financing::monthly_payment;
use crate::analysis::risk::{self, RiskFactors, RiskLevel};

pub const DEFAULT_VACANCY_RATE: f64 = 0.05;
pub const DEFAULT_APPRECIATION_RATE: f64 = 0.03;

/// A fully resolved purchase proposal. Income and expense figures are monthly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealInput {
    pub purchase_price: f64,
    pub down_payment: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,
    pub renovation_costs: f64,
    pub gross_income: f64,
    pub expenses: f64,
    pub target_cap_rate: f64,
}

/// Market assumptions that are not part of a single deal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assumptions {
    pub vacancy_rate: f64,
    pub appreciation_rate: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            vacancy_rate: DEFAULT_VACANCY_RATE,
            appreciation_rate: DEFAULT_APPRECIATION_RATE,
        }
    }
}

/// Derived deal metrics. Rates and returns are fractions, currency amounts are annual unless
/// the field name says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealMetrics {
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
    pub cap_rate: f64,
    pub cash_on_cash: f64,
    /// Price appreciation over one year at the assumed rate.
    pub appreciation: f64,
    /// Cash flow plus appreciation, in currency.
    pub total_return_amount: f64,
    /// `total_return_amount` over total cash invested.
    pub total_return_pct: f64,
    /// `None` when there is no debt service to cover.
    pub dscr: Option<f64>,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub target_cap_rate: f64,
    /// Cap rate minus target, as a fraction.
    pub compared_to_target: f64,
}

pub fn analyze(input: &DealInput, assumptions: &Assumptions) -> Result<DealMetrics, AnalysisError> {
    validate(input, assumptions)?;

    let loan_amount = input.purchase_price - input.down_payment;
    let total_investment = input.down_payment + input.renovation_costs;
    if !(total_investment > 0.0) {
        return Err(AnalysisError::invalid(
            "totalInvestment",
            format!("must be positive (down payment + renovation = {total_investment})"),
        ));
    }

    let monthly_mortgage = monthly_payment(loan_amount, input.interest_rate, input.loan_term_years);

    let annual_gross_income = input.gross_income * 12.0;
    let annual_expenses = input.expenses * 12.0;
    let noi = annual_gross_income - annual_expenses;
    let annual_debt_service = monthly_mortgage * 12.0;
    let cash_flow = noi - annual_debt_service;

    let cap_rate = noi / input.purchase_price;
    let cash_on_cash = cash_flow / total_investment;
    let dscr = (annual_debt_service > 0.0).then(|| noi / annual_debt_service);

    let appreciation = input.purchase_price * assumptions.appreciation_rate;
    let total_return_amount = cash_flow + appreciation;
    let total_return_pct = total_return_amount / total_investment;

    let computed = [
        ("monthlyMortgage", monthly_mortgage),
        ("noi", noi),
        ("cashFlow", cash_flow),
        ("capRate", cap_rate),
        ("cashOnCash", cash_on_cash),
        ("totalReturn", total_return_pct),
    ];
    if let Some((field, value)) = computed.into_iter().find(|(_, v)| !v.is_finite()) {
        return Err(AnalysisError::invalid(
            field,
            format!("inputs are out of range (computed {value})"),
        ));
    }

    let risk_score = risk::score(&RiskFactors {
        dscr,
        cap_rate,
        cash_on_cash,
        vacancy_rate: assumptions.vacancy_rate,
    });

    Ok(DealMetrics {
        purchase_price: input.purchase_price,
        down_payment: input.down_payment,
        loan_amount,
        total_investment,
        monthly_mortgage,
        annual_gross_income,
        annual_expenses,
        noi,
        annual_debt_service,
        cash_flow,
        monthly_cash_flow: cash_flow / 12.0,
        cap_rate,
        cash_on_cash,
        appreciation,
        total_return_amount,
        total_return_pct,
        dscr,
        risk_score,
        risk_level: risk::classify(risk_score),
        target_cap_rate: input.target_cap_rate,
        compared_to_target: cap_rate - input.target_cap_rate,
    })
}

fn validate(input: &DealInput, assumptions: &Assumptions) -> Result<(), AnalysisError> {
    if !(input.purchase_price.is_finite() && input.purchase_price > 0.0) {
        return Err(AnalysisError::invalid(
            "purchasePrice",
            format!("must be a positive amount (got {})", input.purchase_price),
        ));
    }
    if input.loan_term_years == 0 {
        return Err(AnalysisError::invalid("loanTermYears", "must be at least 1 year"));
    }
    if !(input.interest_rate.is_finite() && input.interest_rate >= 0.0) {
        return Err(AnalysisError::invalid(
            "interestRate",
            format!("must be a non-negative rate (got {})", input.interest_rate),
        ));
    }

    let finite = [
        ("downPayment", input.down_payment),
        ("renovationCosts", input.renovation_costs),
        ("grossIncome", input.gross_income),
        ("expenses", input.expenses),
        ("targetCapRate", input.target_cap_rate),
        ("vacancyRate", assumptions.vacancy_rate),
        ("appreciationRate", assumptions.appreciation_rate),
    ];
    for (field, value) in finite {
        if !value.is_finite() {
            return Err(AnalysisError::invalid(field, format!("must be finite (got {value})")));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn office_building() -> DealInput {
        DealInput {
            purchase_price: 2_500_000.0,
            down_payment: 625_000.0,
            interest_rate: 0.07,
            loan_term_years: 30,
            renovation_costs: 0.0,
            gross_income: 18_750.0,
            expenses: 5_208.33,
            target_cap_rate: 0.06,
        }
    }

    #[test]
    fn office_building_metrics() {
        let m = analyze(&office_building(), &Assumptions::default()).unwrap();

        assert_eq!(m.loan_amount, 1_875_000.0);
        assert_eq!(m.total_investment, 625_000.0);
        assert_relative_eq!(m.annual_gross_income, 225_000.0);
        assert_relative_eq!(m.annual_expenses, 62_499.96, epsilon = 1e-6);
        assert_relative_eq!(m.noi, 162_500.0, epsilon = 0.1);
        assert_relative_eq!(m.cap_rate, 0.065, epsilon = 1e-6);
        assert_relative_eq!(m.monthly_mortgage, 12_474.42, epsilon = 0.01);
        assert_relative_eq!(m.annual_debt_service, m.monthly_mortgage * 12.0);

        let dscr = m.dscr.unwrap();
        assert!(dscr > 1.0 && dscr < 1.25, "dscr = {dscr}");
        assert_relative_eq!(dscr, 1.0856, epsilon = 1e-4);

        assert_relative_eq!(m.cash_on_cash, 0.02049, epsilon = 1e-4);
        assert_relative_eq!(m.monthly_cash_flow, m.cash_flow / 12.0);
        assert_relative_eq!(m.compared_to_target, 0.005, epsilon = 1e-6);

        // -20 for DSCR in [1.0, 1.25), -10 for cash-on-cash in [0, 5%).
        assert_eq!(m.risk_score, 70);
        assert_eq!(m.risk_level, RiskLevel::Moderate);
    }

    #[test]
    fn total_return_is_a_fraction_of_cash_invested() {
        // The legacy dashboard multiplied a dollar figure by 100 and labelled it a percentage.
        // Here total return is always (cash flow + appreciation) / total investment.
        let m = analyze(&office_building(), &Assumptions::default()).unwrap();
        assert_relative_eq!(m.appreciation, 75_000.0);
        assert_relative_eq!(m.total_return_amount, m.cash_flow + 75_000.0);
        assert_relative_eq!(m.total_return_pct, m.total_return_amount / 625_000.0);
        assert!(m.total_return_pct < 1.0);
    }

    #[test]
    fn appreciation_rate_is_configurable() {
        let assumptions = Assumptions {
            appreciation_rate: 0.0,
            ..Assumptions::default()
        };
        let m = analyze(&office_building(), &assumptions).unwrap();
        assert_eq!(m.appreciation, 0.0);
        assert_relative_eq!(m.total_return_pct, m.cash_on_cash);
    }

    #[test]
    fn renovation_adds_to_investment_not_loan() {
        let input = DealInput {
            renovation_costs: 75_000.0,
            ..office_building()
        };
        let m = analyze(&input, &Assumptions::default()).unwrap();
        assert_eq!(m.loan_amount, 1_875_000.0);
        assert_eq!(m.total_investment, 700_000.0);
    }

    #[test]
    fn repeated_analysis_is_bit_identical() {
        let a = analyze(&office_building(), &Assumptions::default()).unwrap();
        let b = analyze(&office_building(), &Assumptions::default()).unwrap();
        assert_eq!(a.monthly_mortgage.to_bits(), b.monthly_mortgage.to_bits());
        assert_eq!(a.cash_on_cash.to_bits(), b.cash_on_cash.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn all_cash_purchase_has_no_dscr() {
        let input = DealInput {
            down_payment: 2_500_000.0,
            ..office_building()
        };
        let m = analyze(&input, &Assumptions::default()).unwrap();
        assert_eq!(m.loan_amount, 0.0);
        assert_eq!(m.monthly_mortgage, 0.0);
        assert_eq!(m.dscr, None);
        assert_relative_eq!(m.cash_on_cash, m.cap_rate, epsilon = 1e-12);
    }

    #[test]
    fn zero_interest_rate_is_handled() {
        let input = DealInput {
            interest_rate: 0.0,
            ..office_building()
        };
        let m = analyze(&input, &Assumptions::default()).unwrap();
        assert_eq!(m.monthly_mortgage, 1_875_000.0 / 360.0);
        assert!(m.dscr.unwrap().is_finite());
    }

    #[test]
    fn extreme_interest_rate_stays_finite_and_risky() {
        let input = DealInput {
            interest_rate: 100.0,
            ..office_building()
        };
        let m = analyze(&input, &Assumptions::default()).unwrap();
        assert!(m.monthly_mortgage.is_finite());
        assert!(m.cash_flow.is_finite() && m.cash_flow < 0.0);
        assert!(m.cash_on_cash.is_finite());
        assert!(m.total_return_pct.is_finite());

        let dscr = m.dscr.unwrap();
        assert!(dscr < 1.0, "dscr = {dscr}");
        assert!(m.risk_score < 70);
        assert_ne!(m.risk_level, RiskLevel::Low);
    }

    #[test]
    fn overflowing_metrics_are_rejected() {
        let input = DealInput {
            gross_income: f64::MAX,
            ..office_building()
        };
        let err = analyze(&input, &Assumptions::default()).unwrap_err();
        assert_eq!(err.field(), "noi");
    }

    #[test]
    fn rejects_non_positive_price() {
        for price in [0.0, -1.0, f64::NAN] {
            let input = DealInput {
                purchase_price: price,
                ..office_building()
            };
            let err = analyze(&input, &Assumptions::default()).unwrap_err();
            assert_eq!(err.field(), "purchasePrice");
        }
    }

    #[test]
    fn rejects_zero_total_investment() {
        let input = DealInput {
            down_payment: 0.0,
            renovation_costs: 0.0,
            ..office_building()
        };
        let err = analyze(&input, &Assumptions::default()).unwrap_err();
        assert_eq!(err.field(), "totalInvestment");
    }

    #[test]
    fn rejects_zero_term_and_infinite_income() {
        let input = DealInput {
            loan_term_years: 0,
            ..office_building()
        };
        assert_eq!(
            analyze(&input, &Assumptions::default()).unwrap_err().field(),
            "loanTermYears"
        );

        let input = DealInput {
            gross_income: f64::INFINITY,
            ..office_building()
        };
        assert_eq!(
            analyze(&input, &Assumptions::default()).unwrap_err().field(),
            "grossIncome"
        );
    }
}
