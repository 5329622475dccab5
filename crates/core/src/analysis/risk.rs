use serde::{Deserialize, Serialize};

/// Metrics the risk ladder looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskFactors {
    /// `None` for an unlevered deal, which carries no coverage penalty.
    pub dscr: Option<f64>,
    pub cap_rate: f64,
    pub cash_on_cash: f64,
    pub vacancy_rate: f64,
}

/// Scores a deal on 0..=100 by subtracting independent penalties from 100.
///
/// Each metric falls into at most one bracket.
pub fn score(factors: &RiskFactors) -> u8 {
    let mut score: i32 = 100;

    if let Some(dscr) = factors.dscr {
        score -= dscr_penalty(dscr);
    }
    score -= cap_rate_penalty(factors.cap_rate);
    score -= cash_on_cash_penalty(factors.cash_on_cash);
    score -= vacancy_penalty(factors.vacancy_rate);

    score.clamp(0, 100) as u8
}

fn dscr_penalty(dscr: f64) -> i32 {
    if dscr < 1.0 {
        40
    } else if dscr < 1.25 {
        20
    } else if dscr < 1.5 {
        10
    } else {
        0
    }
}

fn cap_rate_penalty(cap_rate: f64) -> i32 {
    if cap_rate < 0.04 {
        30
    } else if cap_rate < 0.06 {
        15
    } else {
        0
    }
}

fn cash_on_cash_penalty(cash_on_cash: f64) -> i32 {
    if cash_on_cash < 0.0 {
        25
    } else if cash_on_cash < 0.05 {
        10
    } else {
        0
    }
}

fn vacancy_penalty(vacancy_rate: f64) -> i32 {
    if vacancy_rate > 0.10 {
        15
    } else if vacancy_rate > 0.05 {
        5
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn message(self) -> &'static str {
        match self {
            Self::Low => "Strong investment",
            Self::Moderate => "Acceptable with conditions",
            Self::High => "Proceed with caution",
            Self::VeryHigh => "Not recommended",
        }
    }

    /// Badge color used by the dashboard.
    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "green",
            Self::Moderate => "yellow",
            Self::High => "orange",
            Self::VeryHigh => "red",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::VeryHigh => "VERY_HIGH",
        }
    }
}

pub fn classify(score: u8) -> RiskLevel {
    match score {
        80.. => RiskLevel::Low,
        60..=79 => RiskLevel::Moderate,
        40..=59 => RiskLevel::High,
        _ => RiskLevel::VeryHigh,
    }
}
