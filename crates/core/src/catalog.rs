//! Reference data consulted before live search output.
//!
//! The seed tables make demos and tests deterministic: when a subject is
//! known here the agents never depend on what the search service returned.

pub trait ReferenceData: Send + Sync {
    /// Unit price in INR for a material, keyed case-insensitively.
    fn material_price(&self, material: &str) -> Option<f64>;

    /// Permits commonly required in a city.
    fn city_permits(&self, city: &str) -> Option<Vec<String>>;

    /// Permit schedule for a location and project type. `None` when the
    /// location is not covered at all.
    fn permit_schedule(&self, location: &str, project_type: &str) -> Option<Vec<String>>;

    /// Builder price quotes for a project type, narrowed to a region when
    /// one is given and covered.
    fn competitor_prices(&self, project_type: &str, region: Option<&str>) -> Option<Vec<String>>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SeedCatalog;

/// Catalog without entries; every lookup falls through to live extraction.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyCatalog;

const MATERIAL_PRICES: &[(&str, f64)] = &[("bricks", 8.0), ("cement", 400.0), ("steel", 60.0)];

const CITY_PERMITS: &[(&str, &[&str])] = &[
    ("mumbai", &["Building Permit", "NOC from Fire Department", "Municipal Approval"]),
    (
        "jaipur",
        &["Rajasthan Urban Development Approval", "Building Permit", "Environmental Clearance"],
    ),
];

struct PermitSchedule {
    city: &'static str,
    residential: &'static [&'static str],
    commercial: &'static [&'static str],
    industrial: &'static [&'static str],
}

const PERMIT_SCHEDULES: &[PermitSchedule] = &[
    PermitSchedule {
        city: "mumbai",
        residential: &["Building Permit", "Environmental Clearance", "Fire Safety NOC"],
        commercial: &[
            "Building Permit",
            "Trade License",
            "Environmental Clearance",
            "Fire Safety NOC",
        ],
        industrial: &[
            "Building Permit",
            "Industrial License",
            "Environmental Clearance",
            "Fire Safety NOC",
            "Pollution Control Board Approval",
        ],
    },
    PermitSchedule {
        city: "jaipur",
        residential: &["Building Permit", "Water Supply NOC", "Fire Safety NOC"],
        commercial: &["Building Permit", "Trade License", "Water Supply NOC", "Fire Safety NOC"],
        industrial: &[
            "Building Permit",
            "Industrial License",
            "Water Supply NOC",
            "Fire Safety NOC",
            "Pollution Control Board Approval",
        ],
    },
    PermitSchedule {
        city: "delhi",
        residential: &["Building Permit", "Sanitation NOC", "Fire Safety NOC"],
        commercial: &["Building Permit", "Trade License", "Sanitation NOC", "Fire Safety NOC"],
        industrial: &[
            "Building Permit",
            "Industrial License",
            "Sanitation NOC",
            "Fire Safety NOC",
            "Pollution Control Board Approval",
        ],
    },
];

const GENERAL_PERMIT: &str = "General Building Permit";

const NATIONAL_COMPETITOR_PRICES: &[(&str, &[&str])] = &[
    ("residential construction", &["₹2000 per sqft (Contractor A)", "₹2100 per sqft (Contractor B)"]),
    ("commercial construction", &["₹2500 per sqft (Contractor X)", "₹2600 per sqft (Contractor Y)"]),
];

const REGIONAL_COMPETITOR_PRICES: &[(&str, &str, &[&str])] = &[
    (
        "residential construction",
        "rajasthan",
        &[
            "₹2200 per sqft (ABC Builders, Jaipur)",
            "₹2250 per sqft (XYZ Construction, Jodhpur)",
            "₹2300 per sqft (PQR Developers, Udaipur)",
        ],
    ),
    (
        "residential construction",
        "delhi",
        &[
            "₹2400 per sqft (LMN Enterprises, New Delhi)",
            "₹2450 per sqft (RST Contractors, Gurgaon)",
            "₹2500 per sqft (JKL Builders, Noida)",
        ],
    ),
    (
        "commercial construction",
        "rajasthan",
        &[
            "₹2800 per sqft (MNO Contractors, Jaipur)",
            "₹2850 per sqft (STU Builders, Kota)",
            "₹2900 per sqft (VWX Developers, Jaisalmer)",
        ],
    ),
    (
        "commercial construction",
        "delhi",
        &[
            "₹3000 per sqft (PQR Enterprises, Delhi)",
            "₹3050 per sqft (XYZ Contractors, Faridabad)",
            "₹3100 per sqft (ABC Builders, Ghaziabad)",
        ],
    ),
];

// Regions recognized by any of their alias substrings.
const REGION_ALIASES: &[(&str, &[&str])] = &[
    ("rajasthan", &["rajasthan", "jaipur", "jodhpur", "udaipur", "kota", "jaisalmer"]),
    ("delhi", &["delhi", "gurgaon", "gurugram", "noida", "faridabad", "ghaziabad"]),
];

impl ReferenceData for SeedCatalog {
    fn material_price(&self, material: &str) -> Option<f64> {
        let key = material.trim().to_lowercase();
        MATERIAL_PRICES.iter().find(|(name, _)| *name == key).map(|(_, price)| *price)
    }

    fn city_permits(&self, city: &str) -> Option<Vec<String>> {
        let key = city.trim().to_lowercase();
        CITY_PERMITS.iter().find(|(name, _)| *name == key).map(|(_, permits)| owned(permits))
    }

    fn permit_schedule(&self, location: &str, project_type: &str) -> Option<Vec<String>> {
        let location = location.to_lowercase();
        let schedule = PERMIT_SCHEDULES.iter().find(|schedule| location.contains(schedule.city))?;

        let permits: &[&str] = match project_type.trim().to_lowercase().as_str() {
            "residential" => schedule.residential,
            "commercial" => schedule.commercial,
            "industrial" => schedule.industrial,
            _ => &[GENERAL_PERMIT],
        };
        Some(owned(permits))
    }

    fn competitor_prices(&self, project_type: &str, region: Option<&str>) -> Option<Vec<String>> {
        let project_type = construction_key(project_type);

        if let Some(region) = region.and_then(canonical_region) {
            let regional = REGIONAL_COMPETITOR_PRICES
                .iter()
                .find(|(kind, name, _)| *kind == project_type && *name == region);
            if let Some((_, _, prices)) = regional {
                return Some(owned(prices));
            }
        }

        NATIONAL_COMPETITOR_PRICES
            .iter()
            .find(|(kind, _)| *kind == project_type)
            .map(|(_, prices)| owned(prices))
    }
}

impl ReferenceData for EmptyCatalog {
    fn material_price(&self, _material: &str) -> Option<f64> {
        None
    }

    fn city_permits(&self, _city: &str) -> Option<Vec<String>> {
        None
    }

    fn permit_schedule(&self, _location: &str, _project_type: &str) -> Option<Vec<String>> {
        None
    }

    fn competitor_prices(
        &self,
        _project_type: &str,
        _region: Option<&str>,
    ) -> Option<Vec<String>> {
        None
    }
}

/// "Residential" and "residential construction" name the same table entry.
fn construction_key(project_type: &str) -> String {
    let key = project_type.trim().to_lowercase();
    if key.ends_with(" construction") {
        key
    } else {
        format!("{key} construction")
    }
}

fn canonical_region(region: &str) -> Option<&'static str> {
    let region = region.trim().to_lowercase();
    if region.is_empty() {
        return None;
    }
    REGION_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| region.contains(alias)))
        .map(|(name, _)| *name)
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}
