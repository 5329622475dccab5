use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::domain::market::MarketSnapshot;
use crate::domain::property::{Property, PropertyType};
use crate::storage::repository::Repositories;

pub const SEEDED_MARKETS: [&str; 5] = ["FL", "MIAMI", "TAMPA", "ORLANDO", "JACKSONVILLE"];

fn mls_number(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|c| char::from(c).to_ascii_uppercase())
        .collect();
    format!("{prefix}-{suffix}")
}

struct Listing {
    mls_prefix: &'static str,
    title: &'static str,
    address: &'static str,
    city: &'static str,
    zip: &'static str,
    property_type: PropertyType,
    subtype: &'static str,
    price: f64,
    size: f64,
    price_per_sq_ft: f64,
    days_on_market: u32,
    description: &'static str,
    features: [&'static str; 4],
    image_url: &'static str,
    seller: &'static str,
    agent: &'static str,
}

impl Listing {
    fn into_property(self) -> Property {
        Property {
            id: Uuid::new_v4(),
            mls_number: mls_number(self.mls_prefix),
            title: self.title.to_string(),
            address: self.address.to_string(),
            city: self.city.to_string(),
            state: "FL".to_string(),
            zip: self.zip.to_string(),
            property_type: self.property_type,
            subtype: self.subtype.to_string(),
            price: self.price,
            size: self.size,
            price_per_sq_ft: self.price_per_sq_ft,
            cap_rate: None,
            noi: None,
            gross_income: None,
            expenses: None,
            year_built: None,
            occupancy: None,
            units: None,
            tenants: None,
            parking_spaces: None,
            arv: None,
            renovation_estimate: None,
            zoning: None,
            description: self.description.to_string(),
            features: self.features.iter().map(|f| f.to_string()).collect(),
            image_url: self.image_url.to_string(),
            listed_date: Utc::now() - Duration::days(i64::from(self.days_on_market)),
            days_on_market: self.days_on_market,
            seller: self.seller.to_string(),
            agent: self.agent.to_string(),
        }
    }
}

/// Income-producing listings carry annual gross income and expenses.
fn with_income(mut p: Property, gross_income: f64, expenses: f64) -> Property {
    let noi = gross_income - expenses;
    p.gross_income = Some(gross_income);
    p.expenses = Some(expenses);
    p.noi = Some(noi);
    p.cap_rate = Some((noi / p.price * 1000.0).round() / 10.0);
    p
}

/// The six demo listings around Florida.
pub fn sample_properties() -> Vec<Property> {
    let mut office = with_income(
        Listing {
            mls_prefix: "CREXI",
            title: "Downtown Office Building",
            address: "123 Main Street",
            city: "Miami",
            zip: "33101",
            property_type: PropertyType::Commercial,
            subtype: "office",
            price: 2_500_000.0,
            size: 15_000.0,
            price_per_sq_ft: 167.0,
            days_on_market: 30,
            description: "Class A office building in downtown Miami. Fully occupied with diverse tenant base.",
            features: ["Modern HVAC", "Elevator", "Security System", "Fiber Internet"],
            image_url: "https://images.unsplash.com/photo-1486406146926-c627a92ad1ab?w=800",
            seller: "Miami Commercial Properties LLC",
            agent: "John Smith - Commercial Realty",
        }
        .into_property(),
        225_000.0,
        62_500.0,
    );
    office.year_built = Some(2015);
    office.parking_spaces = Some(50);
    office.tenants = Some(8);
    office.occupancy = Some(92.0);

    let mut warehouse = with_income(
        Listing {
            mls_prefix: "CREXI",
            title: "Industrial Warehouse",
            address: "456 Industrial Blvd",
            city: "Tampa",
            zip: "33601",
            property_type: PropertyType::Commercial,
            subtype: "industrial",
            price: 1_800_000.0,
            size: 25_000.0,
            price_per_sq_ft: 72.0,
            days_on_market: 45,
            description: "Modern distribution warehouse with dock-high doors and ESFR sprinklers.",
            features: ["Dock Doors", "Sprinkler System", "Heavy Power", "Truck Courts"],
            image_url: "https://images.unsplash.com/photo-1586528116311-ad8dd3c8310d?w=800",
            seller: "Tampa Industrial Partners",
            agent: "Maria Garcia - Industrial CRE",
        }
        .into_property(),
        180_000.0,
        50_400.0,
    );
    warehouse.year_built = Some(2018);
    warehouse.parking_spaces = Some(30);

    let mut retail = with_income(
        Listing {
            mls_prefix: "LOOP",
            title: "Retail Strip Center",
            address: "789 Commerce Way",
            city: "Orlando",
            zip: "32801",
            property_type: PropertyType::Commercial,
            subtype: "retail",
            price: 3_200_000.0,
            size: 20_000.0,
            price_per_sq_ft: 160.0,
            days_on_market: 60,
            description: "Prime retail location with strong co-tenants and excellent visibility.",
            features: ["Pylon Sign", "Corner Lot", "High Traffic", "Full Renovation 2020"],
            image_url: "https://images.unsplash.com/photo-1441986300917-64674bd600d8?w=800",
            seller: "Orlando Retail Group",
            agent: "Bob Johnson - Retail Experts",
        }
        .into_property(),
        280_000.0,
        88_000.0,
    );
    retail.year_built = Some(2012);
    retail.parking_spaces = Some(80);
    retail.tenants = Some(12);
    retail.occupancy = Some(100.0);

    let mut apartments = with_income(
        Listing {
            mls_prefix: "MULTI",
            title: "24-Unit Apartment Complex",
            address: "321 Residential Ave",
            city: "Jacksonville",
            zip: "32201",
            property_type: PropertyType::Multifamily,
            subtype: "apartment",
            price: 4_500_000.0,
            size: 36_000.0,
            price_per_sq_ft: 125.0,
            days_on_market: 20,
            description: "Well-maintained apartment complex with upside potential in strong rental market.",
            features: ["Pool", "Laundry Facility", "Parking", "Recent Roof Update"],
            image_url: "https://images.unsplash.com/photo-1545324418-cc1a3fa10c00?w=800",
            seller: "Jacksonville Multi-Family LLC",
            agent: "Sarah Williams - Multi-Family Specialists",
        }
        .into_property(),
        390_000.0,
        129_000.0,
    );
    apartments.year_built = Some(2008);
    apartments.units = Some(24);
    apartments.occupancy = Some(95.0);

    let mut land = Listing {
        mls_prefix: "LAND",
        title: "15-Acre Development Site",
        address: "Highway 441",
        city: "Gainesville",
        zip: "32601",
        property_type: PropertyType::Land,
        subtype: "commercial",
        price: 750_000.0,
        size: 653_400.0,
        price_per_sq_ft: 1.15,
        days_on_market: 90,
        description: "Prime development site with all utilities available. Ready for vertical construction.",
        features: ["Utilities Available", "Highway Frontage", "Flat Terrain", "Wetlands Survey Complete"],
        image_url: "https://images.unsplash.com/photo-1500382017468-9049fed747ef?w=800",
        seller: "Gainesville Development Corp",
        agent: "Mike Brown - Land Pro",
    }
    .into_property();
    land.zoning = Some("Commercial General".to_string());

    let mut flip = Listing {
        mls_prefix: "RESI",
        title: "Single Family Home - Flip Opportunity",
        address: "555 Fixer Upper Lane",
        city: "Fort Lauderdale",
        zip: "33301",
        property_type: PropertyType::Residential,
        subtype: "single-family",
        price: 425_000.0,
        size: 2_200.0,
        price_per_sq_ft: 193.0,
        days_on_market: 10,
        description: "Solid bones, needs cosmetic updates. Great flip opportunity in appreciating neighborhood.",
        features: ["Pool", "Large Lot", "Good Schools", "Investor Friendly"],
        image_url: "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?w=800",
        seller: "Estate Sale - Johnson Family",
        agent: "Lisa Chen - Premier Realty",
    }
    .into_property();
    flip.year_built = Some(1975);
    flip.arv = Some(650_000.0);
    flip.renovation_estimate = Some(75_000.0);

    vec![office, warehouse, retail, apartments, land, flip]
}

/// Loads the demo listings and market snapshots. Returns the number of listings written.
pub async fn seed(repos: &Repositories) -> anyhow::Result<usize> {
    let properties = sample_properties();
    let count = properties.len();
    for p in properties {
        repos.properties.upsert(p).await?;
    }

    let snapshots: Vec<MarketSnapshot> = {
        let mut rng = rand::thread_rng();
        SEEDED_MARKETS
            .iter()
            .map(|loc| MarketSnapshot::generate(loc, &mut rng))
            .collect()
    };
    for snapshot in snapshots {
        repos.markets.upsert(snapshot).await?;
    }

    tracing::info!(
        properties = count,
        markets = SEEDED_MARKETS.len(),
        "sample data loaded"
    );
    Ok(count)
}
