use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::property::Property;

/// Kanban columns, in board order.
pub const STAGES: [(&str, &str); 6] = [
    ("lead", "Lead"),
    ("analyzing", "Analyzing"),
    ("offer", "Offer Made"),
    ("due_diligence", "Due Diligence"),
    ("closing", "Closing"),
    ("closed", "Closed"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("unknown pipeline stage: {0}")]
    UnknownStage(String),
    #[error("deal {deal_id} not found in stage {stage}")]
    DealNotFound { deal_id: String, stage: String },
    #[error("deal {0} is already on the board")]
    DuplicateDeal(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDeal {
    pub id: String,
    pub property_id: Uuid,
    pub title: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub property_type: String,
    pub stage: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PipelineDeal {
    pub fn for_property(property: &Property, stage: &str, notes: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            property_id: property.id,
            title: property.title.clone(),
            price: property.price,
            property_type: property.property_type.as_str().to_string(),
            stage: stage.to_string(),
            date: Utc::now().date_naive(),
            notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub deals: Vec<PipelineDeal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub user_id: String,
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            stages: STAGES
                .iter()
                .map(|(id, name)| Stage {
                    id: id.to_string(),
                    name: name.to_string(),
                    deals: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    fn stage_index(&self, id: &str) -> Result<usize, PipelineError> {
        self.stages
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| PipelineError::UnknownStage(id.to_string()))
    }

    pub fn contains_deal(&self, deal_id: &str) -> bool {
        self.stages
            .iter()
            .any(|s| s.deals.iter().any(|d| d.id == deal_id))
    }

    pub fn deal_count(&self) -> usize {
        self.stages.iter().map(|s| s.deals.len()).sum()
    }

    /// Appends `deal` to the stage named by `deal.stage`.
    pub fn add_deal(&mut self, deal: PipelineDeal) -> Result<(), PipelineError> {
        let idx = self.stage_index(&deal.stage)?;
        if self.contains_deal(&deal.id) {
            return Err(PipelineError::DuplicateDeal(deal.id));
        }
        self.stages[idx].deals.push(deal);
        Ok(())
    }

    /// Moves a deal to the end of `to`, stamping it with today's date. On error the board is
    /// left untouched.
    pub fn move_deal(&mut self, deal_id: &str, from: &str, to: &str) -> Result<(), PipelineError> {
        let from_idx = self.stage_index(from)?;
        let to_idx = self.stage_index(to)?;

        let pos = self.stages[from_idx]
            .deals
            .iter()
            .position(|d| d.id == deal_id)
            .ok_or_else(|| PipelineError::DealNotFound {
                deal_id: deal_id.to_string(),
                stage: from.to_string(),
            })?;

        let mut deal = self.stages[from_idx].deals.remove(pos);
        deal.stage = to.to_string();
        deal.date = Utc::now().date_naive();
        self.stages[to_idx].deals.push(deal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(id: &str, stage: &str) -> PipelineDeal {
        PipelineDeal {
            id: id.to_string(),
            property_id: Uuid::nil(),
            title: format!("Deal {id}"),
            price: 1_000_000.0,
            property_type: "commercial".to_string(),
            stage: stage.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn empty_pipeline_has_six_ordered_stages() {
        let p = Pipeline::empty("demo-user");
        let ids: Vec<_> = p.stages.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            ["lead", "analyzing", "offer", "due_diligence", "closing", "closed"]
        );
        assert_eq!(p.stage("offer").unwrap().name, "Offer Made");
        assert_eq!(p.deal_count(), 0);
    }

    #[test]
    fn add_then_move() {
        let mut p = Pipeline::empty("u");
        p.add_deal(deal("a", "lead")).unwrap();
        p.add_deal(deal("b", "lead")).unwrap();

        p.move_deal("a", "lead", "offer").unwrap();

        assert_eq!(p.stage("lead").unwrap().deals.len(), 1);
        let offer = &p.stage("offer").unwrap().deals;
        assert_eq!(offer.len(), 1);
        assert_eq!(offer[0].id, "a");
        assert_eq!(offer[0].stage, "offer");
        assert_eq!(offer[0].date, Utc::now().date_naive());
        assert_eq!(p.deal_count(), 2);
    }

    #[test]
    fn add_rejects_unknown_stage_and_duplicates() {
        let mut p = Pipeline::empty("u");
        assert_eq!(
            p.add_deal(deal("a", "nope")),
            Err(PipelineError::UnknownStage("nope".to_string()))
        );
        p.add_deal(deal("a", "lead")).unwrap();
        assert_eq!(
            p.add_deal(deal("a", "closing")),
            Err(PipelineError::DuplicateDeal("a".to_string()))
        );
    }

    #[test]
    fn failed_move_leaves_board_unchanged() {
        let mut p = Pipeline::empty("u");
        p.add_deal(deal("a", "lead")).unwrap();
        let before = p.clone();

        assert!(matches!(
            p.move_deal("a", "offer", "closing"),
            Err(PipelineError::DealNotFound { .. })
        ));
        assert!(matches!(
            p.move_deal("a", "lead", "archive"),
            Err(PipelineError::UnknownStage(_))
        ));
        assert_eq!(p, before);
    }

    #[test]
    fn serializes_in_camel_case() {
        let mut p = Pipeline::empty("demo-user");
        p.add_deal(deal("a", "lead")).unwrap();
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["userId"], "demo-user");
        assert_eq!(v["stages"][0]["deals"][0]["type"], "commercial");
        assert_eq!(v["stages"][0]["deals"][0]["propertyId"], Uuid::nil().to_string());
    }
}
