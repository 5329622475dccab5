use std::fmt::Write;

use anyhow::{bail, Context};
use clap::Args;

use pulse_core::analysis::{DealAnalysis, DealInput, Severity};
use pulse_core::domain::contract::{
    AnalyzeRequest, DEFAULT_DOWN_PAYMENT_RATIO, DEFAULT_INTEREST_RATE, DEFAULT_LOAN_TERM_YEARS,
    DEFAULT_TARGET_CAP_RATE,
};
use pulse_core::domain::property::Property;
use pulse_core::storage::Repositories;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Case-insensitive substring of a sample listing's title.
    #[arg(long)]
    pub property: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub down_payment: Option<f64>,
    /// Annual rate as a fraction, e.g. 0.07.
    #[arg(long)]
    pub interest_rate: Option<f64>,
    /// Years.
    #[arg(long)]
    pub loan_term: Option<u32>,
    #[arg(long)]
    pub renovation: Option<f64>,
    #[arg(long)]
    pub target_cap_rate: Option<f64>,
    /// Monthly.
    #[arg(long)]
    pub gross_income: Option<f64>,
    /// Monthly.
    #[arg(long)]
    pub expenses: Option<f64>,
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeArgs {
    fn request(&self, property: Option<&Property>) -> AnalyzeRequest {
        AnalyzeRequest {
            property_id: property.map(|p| p.id),
            purchase_price: self.price,
            down_payment: self.down_payment,
            interest_rate: self.interest_rate,
            loan_term: self.loan_term,
            renovation_costs: self.renovation,
            target_cap_rate: self.target_cap_rate,
        }
    }
}

async fn find_listing(repos: &Repositories, needle: &str) -> anyhow::Result<Property> {
    let needle = needle.to_lowercase();
    let mut hits: Vec<Property> = repos
        .properties
        .list()
        .await?
        .into_iter()
        .filter(|p| p.title.to_lowercase().contains(&needle))
        .collect();

    match hits.len() {
        0 => bail!("no sample listing matches {needle:?}"),
        1 => Ok(hits.remove(0)),
        n => {
            let titles: Vec<&str> = hits.iter().map(|p| p.title.as_str()).collect();
            bail!("{n} listings match {needle:?}: {}", titles.join(", "))
        }
    }
}

/// Builds the engine input from a sample listing or from explicit figures. Explicit income and
/// expenses always win over the listing's.
pub async fn resolve_input(args: &AnalyzeArgs, repos: &Repositories) -> anyhow::Result<DealInput> {
    let mut input = match args.property.as_deref() {
        Some(needle) => {
            let listing = find_listing(repos, needle).await?;
            tracing::debug!(property_id = %listing.id, title = %listing.title, "resolved listing");
            args.request(Some(&listing)).validate_and_into_input(&listing)?
        }
        None => explicit_input(args)?,
    };

    if let Some(income) = args.gross_income {
        input.gross_income = income;
    }
    if let Some(expenses) = args.expenses {
        input.expenses = expenses;
    }
    Ok(input)
}

fn explicit_input(args: &AnalyzeArgs) -> anyhow::Result<DealInput> {
    let price = args
        .price
        .context("--price is required without --property")?;
    let gross_income = args
        .gross_income
        .context("--gross-income is required without --property")?;
    let expenses = args
        .expenses
        .context("--expenses is required without --property")?;

    let down_payment = args.down_payment.unwrap_or(price * DEFAULT_DOWN_PAYMENT_RATIO);
    if down_payment < 0.0 || down_payment > price {
        bail!("--down-payment must be between 0 and the purchase price");
    }
    if args.renovation.is_some_and(|r| r < 0.0) {
        bail!("--renovation must not be negative");
    }

    Ok(DealInput {
        purchase_price: price,
        down_payment,
        interest_rate: args.interest_rate.unwrap_or(DEFAULT_INTEREST_RATE),
        loan_term_years: args.loan_term.unwrap_or(DEFAULT_LOAN_TERM_YEARS),
        renovation_costs: args.renovation.unwrap_or(0.0),
        gross_income,
        expenses,
        target_cap_rate: args.target_cap_rate.unwrap_or(DEFAULT_TARGET_CAP_RATE),
    })
}

pub fn render(analysis: &DealAnalysis) -> String {
    let r = analysis.report();
    let mut out = String::new();

    let _ = writeln!(out, "Purchase price     {:>14.2}", r.purchase_price);
    let _ = writeln!(out, "Down payment       {:>14.2}", r.down_payment);
    let _ = writeln!(out, "Loan amount        {:>14.2}", r.loan_amount);
    let _ = writeln!(out, "Monthly mortgage   {:>14.2}", r.monthly_mortgage);
    let _ = writeln!(out, "NOI                {:>14.2}", r.noi);
    let _ = writeln!(out, "Annual cash flow   {:>14.2}", r.cash_flow);
    let _ = writeln!(out, "Cap rate           {:>13}%", r.cap_rate);
    let _ = writeln!(out, "Cash-on-cash       {:>13}%", r.cash_on_cash);
    let _ = writeln!(out, "Total return       {:>13}%", r.total_return);
    let _ = writeln!(
        out,
        "DSCR               {:>14}",
        r.dscr.as_deref().unwrap_or("n/a")
    );
    let _ = writeln!(
        out,
        "Risk               {:>14}  {}",
        format!("{} ({})", r.risk_level.level, r.risk_score),
        r.risk_level.message
    );

    if !analysis.recommendations.is_empty() {
        let _ = writeln!(out);
        for rec in &analysis.recommendations {
            let tag = match rec.severity {
                Severity::Warning => "WARN",
                Severity::Info => "INFO",
                Severity::Success => " OK ",
            };
            let _ = writeln!(out, "[{tag}] {}", rec.message);
        }
    }
    out
}
