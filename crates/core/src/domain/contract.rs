use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{AnalysisError, DealInput};
use crate::domain::property::Property;

pub const DEFAULT_DOWN_PAYMENT_RATIO: f64 = 0.25;
pub const DEFAULT_INTEREST_RATE: f64 = 0.07;
pub const DEFAULT_LOAN_TERM_YEARS: u32 = 30;
pub const DEFAULT_TARGET_CAP_RATE: f64 = 0.06;
/// Monthly gross income as a share of price, for listings without income data.
pub const DEFAULT_MONTHLY_INCOME_RATIO: f64 = 0.05;
/// Monthly expenses as a share of price, for listings without expense data.
pub const DEFAULT_MONTHLY_EXPENSE_RATIO: f64 = 0.035;

/// Deal-analysis request as posted by the dashboard. Every figure is optional and falls back
/// to the listing or a house default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub property_id: Option<Uuid>,
    pub purchase_price: Option<f64>,
    pub down_payment: Option<f64>,
    pub interest_rate: Option<f64>,
    pub loan_term: Option<u32>,
    pub renovation_costs: Option<f64>,
    pub target_cap_rate: Option<f64>,
}

impl AnalyzeRequest {
    pub fn validate_and_into_input(&self, property: &Property) -> Result<DealInput, AnalysisError> {
        for (field, value) in [
            ("purchasePrice", self.purchase_price),
            ("downPayment", self.down_payment),
            ("interestRate", self.interest_rate),
            ("renovationCosts", self.renovation_costs),
            ("targetCapRate", self.target_cap_rate),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(AnalysisError::invalid(field, format!("must be finite (got {v})")));
                }
            }
        }

        let purchase_price = self.purchase_price.unwrap_or(property.price);
        if purchase_price <= 0.0 {
            return Err(AnalysisError::invalid(
                "purchasePrice",
                format!("must be a positive amount (got {purchase_price})"),
            ));
        }

        let down_payment = self
            .down_payment
            .unwrap_or(property.price * DEFAULT_DOWN_PAYMENT_RATIO);

        if down_payment < 0.0 {
            return Err(AnalysisError::invalid("downPayment", "must not be negative"));
        }
        if down_payment > purchase_price {
            return Err(AnalysisError::invalid(
                "downPayment",
                format!("must not exceed the purchase price ({down_payment} > {purchase_price})"),
            ));
        }

        let loan_term_years = self.loan_term.unwrap_or(DEFAULT_LOAN_TERM_YEARS);
        if loan_term_years == 0 {
            return Err(AnalysisError::invalid("loanTerm", "must be at least 1 year"));
        }

        let renovation_costs = self.renovation_costs.unwrap_or(0.0);
        if renovation_costs < 0.0 {
            return Err(AnalysisError::invalid("renovationCosts", "must not be negative"));
        }

        // Listings carry annual figures; the engine works in monthly ones.
        let gross_income = property
            .gross_income
            .map(|annual| annual / 12.0)
            .unwrap_or(property.price * DEFAULT_MONTHLY_INCOME_RATIO);
        let expenses = property
            .expenses
            .map(|annual| annual / 12.0)
            .unwrap_or(property.price * DEFAULT_MONTHLY_EXPENSE_RATIO);

        Ok(DealInput {
            purchase_price,
            down_payment,
            interest_rate: self.interest_rate.unwrap_or(DEFAULT_INTEREST_RATE),
            loan_term_years,
            renovation_costs,
            gross_income,
            expenses,
            target_cap_rate: self.target_cap_rate.unwrap_or(DEFAULT_TARGET_CAP_RATE),
        })
    }
}
