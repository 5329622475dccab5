//! Deal analysis: financing, income metrics, risk scoring, and advisories.
//!
//! Everything here is a pure function of its inputs. Callers resolve property data and defaults
//! (see [`crate::domain::contract`]) before calling in.

pub mod error;
pub mod financing;
pub mod metrics;
pub mod recommendations;
pub mod report;
pub mod risk;

pub use error::AnalysisError;
pub use metrics::{analyze, Assumptions, DealInput, DealMetrics};
pub use recommendations::{recommend, Recommendation, Severity};
pub use report::DealReport;
pub use risk::RiskLevel;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealAnalysis {
    pub metrics: DealMetrics,
    pub recommendations: Vec<Recommendation>,
}

impl DealAnalysis {
    pub fn report(&self) -> DealReport {
        DealReport::from_metrics(&self.metrics)
    }
}

pub fn analyze_deal(input: &DealInput, assumptions: &Assumptions) -> Result<DealAnalysis, AnalysisError> {
    let metrics = analyze(input, assumptions)?;
    let recommendations = recommend(&metrics);
    tracing::debug!(
        risk_score = metrics.risk_score,
        cap_rate = metrics.cap_rate,
        recommendations = recommendations.len(),
        "deal analyzed"
    );
    Ok(DealAnalysis {
        metrics,
        recommendations,
    })
}
