use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Commercial,
    Multifamily,
    Land,
    Residential,
}

impl PropertyType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commercial => "commercial",
            Self::Multifamily => "multifamily",
            Self::Land => "land",
            Self::Residential => "residential",
        }
    }
}

/// A listing. `gross_income` and `expenses` are annual figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub mls_number: String,
    pub title: String,
    #[serde(default)]
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default)]
    pub subtype: String,
    pub price: f64,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub price_per_sq_ft: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenants: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_spaces: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renovation_estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoning: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "Utc::now")]
    pub listed_date: DateTime<Utc>,
    #[serde(default)]
    pub days_on_market: u32,
    #[serde(default)]
    pub seller: String,
    #[serde(default)]
    pub agent: String,
}

impl Property {
    /// True when `location` names this property's state or appears in its city or zip.
    pub fn matches_location(&self, location: &str) -> bool {
        let needle = location.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.city.to_lowercase().contains(&needle)
            || self.state.to_lowercase().contains(&needle)
            || self.zip.contains(&needle)
    }
}

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyQuery {
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_size: Option<f64>,
    pub max_size: Option<f64>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPage {
    pub properties: Vec<Property>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl PropertyQuery {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn matches(&self, p: &Property) -> bool {
        if let Some(t) = self.property_type.as_deref() {
            if t != "all" && t != p.property_type.as_str() {
                return false;
            }
        }
        if let Some(loc) = self.location.as_deref() {
            if !p.matches_location(loc) {
                return false;
            }
        }
        self.min_price.map_or(true, |v| p.price >= v)
            && self.max_price.map_or(true, |v| p.price <= v)
            && self.min_size.map_or(true, |v| p.size >= v)
            && self.max_size.map_or(true, |v| p.size <= v)
    }

    /// Filters, orders newest listing first, and slices out the requested page.
    pub fn apply(&self, properties: Vec<Property>) -> PropertyPage {
        let mut matched: Vec<Property> = properties.into_iter().filter(|p| self.matches(p)).collect();
        matched.sort_by(|a, b| {
            b.listed_date
                .cmp(&a.listed_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = matched.len();
        let page = self.page();
        let limit = self.limit();
        let properties = matched
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        PropertyPage {
            properties,
            total,
            page,
            total_pages: total.div_ceil(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::seed::sample_properties;

    fn query() -> PropertyQuery {
        PropertyQuery::default()
    }

    #[test]
    fn all_type_matches_everything() {
        let props = sample_properties();
        let n = props.len();
        let page = PropertyQuery {
            property_type: Some("all".to_string()),
            ..query()
        }
        .apply(props);
        assert_eq!(page.total, n);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn filters_by_type_and_price() {
        let page = PropertyQuery {
            property_type: Some("commercial".to_string()),
            max_price: Some(2_500_000.0),
            ..query()
        }
        .apply(sample_properties());
        let titles: Vec<_> = page.properties.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(page.total, 2);
        assert!(titles.contains(&"Downtown Office Building"));
        assert!(titles.contains(&"Industrial Warehouse"));
    }

    #[test]
    fn location_matches_city_state_or_zip() {
        let by_city = PropertyQuery {
            location: Some("miami".to_string()),
            ..query()
        }
        .apply(sample_properties());
        assert_eq!(by_city.total, 1);

        let by_zip = PropertyQuery {
            location: Some("336".to_string()),
            ..query()
        }
        .apply(sample_properties());
        assert_eq!(by_zip.properties[0].city, "Tampa");

        let by_state = PropertyQuery {
            location: Some("FL".to_string()),
            ..query()
        }
        .apply(sample_properties());
        assert_eq!(by_state.total, 6);
    }

    #[test]
    fn paginates_newest_first() {
        let first = PropertyQuery {
            page: Some(1),
            limit: Some(4),
            ..query()
        }
        .apply(sample_properties());
        assert_eq!(first.properties.len(), 4);
        assert_eq!(first.total_pages, 2);
        assert!(first
            .properties
            .windows(2)
            .all(|w| w[0].listed_date >= w[1].listed_date));

        let second = PropertyQuery {
            page: Some(2),
            limit: Some(4),
            ..query()
        }
        .apply(sample_properties());
        assert_eq!(second.properties.len(), 2);

        let past_end = PropertyQuery {
            page: Some(9),
            limit: Some(4),
            ..query()
        }
        .apply(sample_properties());
        assert!(past_end.properties.is_empty());
        assert_eq!(past_end.total, 6);
    }

    #[test]
    fn page_and_limit_are_clamped() {
        let q = PropertyQuery {
            page: Some(0),
            limit: Some(10_000),
            ..query()
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_PAGE_SIZE);
    }
}
