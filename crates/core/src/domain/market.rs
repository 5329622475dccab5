use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::property::Property;

const MAX_COMPARABLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTrend {
    Appreciating,
    Stable,
}

/// Synthetic market statistics for a location. Growth and rate fields are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub location: String,
    pub median_price: u32,
    #[serde(rename = "priceChange1Year")]
    pub price_change_1_year: f64,
    #[serde(rename = "priceChange5Year")]
    pub price_change_5_year: f64,
    pub median_cap_rate: f64,
    pub vacancy_rate: f64,
    pub population_growth: f64,
    pub job_growth: f64,
    pub unemployment_rate: f64,
    pub median_rent: u32,
    pub rent_growth: f64,
    pub market_score: u8,
    pub market_trend: MarketTrend,
    pub last_updated: DateTime<Utc>,
}

/// Canonical key for a location: trimmed and upper-cased.
pub fn normalize_location(location: &str) -> String {
    location.trim().to_uppercase()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl MarketSnapshot {
    pub fn generate<R: Rng + ?Sized>(location: &str, rng: &mut R) -> Self {
        Self {
            location: normalize_location(location),
            median_price: rng.gen_range(200_000..700_000),
            price_change_1_year: round_to(rng.gen_range(-3.0..12.0), 1),
            price_change_5_year: round_to(rng.gen_range(10.0..50.0), 1),
            median_cap_rate: round_to(rng.gen_range(4.0..6.0), 2),
            vacancy_rate: round_to(rng.gen_range(3.0..8.0), 1),
            population_growth: round_to(rng.gen_range(0.5..3.5), 1),
            job_growth: round_to(rng.gen_range(1.0..5.0), 1),
            unemployment_rate: round_to(rng.gen_range(2.0..5.0), 1),
            median_rent: rng.gen_range(1_200..2_700),
            rent_growth: round_to(rng.gen_range(1.0..6.0), 1),
            market_score: rng.gen_range(70..100),
            market_trend: if rng.gen_bool(0.7) {
                MarketTrend::Appreciating
            } else {
                MarketTrend::Stable
            },
            last_updated: Utc::now(),
        }
    }
}

/// Market statistics plus nearby listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketReport {
    #[serde(flatten)]
    pub snapshot: MarketSnapshot,
    pub comparables: Vec<Property>,
}

/// Listings in the state named by `location` or whose city contains it, at most ten.
pub fn comparables(location: &str, properties: &[Property]) -> Vec<Property> {
    let key = normalize_location(location);
    properties
        .iter()
        .filter(|p| p.state.to_uppercase() == key || p.city.to_uppercase().contains(&key))
        .take(MAX_COMPARABLES)
        .cloned()
        .collect()
}
