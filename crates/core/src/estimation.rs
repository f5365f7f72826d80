//! Deterministic construction cost arithmetic (2025 India estimates, INR).

use serde::{Deserialize, Serialize};

pub const DEFAULT_BUILDING_TYPE: &str = "Residential";
pub const DEFAULT_FLOORS: u32 = 1;
pub const DEFAULT_AREA_SQFT: f64 = 1000.0;
pub const DEFAULT_ALTERNATIVE_MATERIAL: &str = "Bricks";
pub const DEFAULT_LABOR_COST_PER_SQFT: f64 = 500.0;

const BASE_COST_PER_SQFT: &[(&str, f64)] =
    &[("residential", 2000.0), ("commercial", 2500.0), ("industrial", 3000.0)];
const FALLBACK_BASE_COST_PER_SQFT: f64 = 2000.0;

const MATERIAL_UNIT_PRICE: &[(&str, f64)] = &[("bricks", 0.08), ("cement", 0.04), ("steel", 0.06)];
const FALLBACK_MATERIAL_UNIT_PRICE: f64 = 1.0;

// Approximate build time per 1000 sqft per floor.
const MONTHS_PER_THOUSAND_SQFT_FLOOR: f64 = 1.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    pub building_type: String,
    pub floors: u32,
    pub area_sqft: f64,
    pub material: String,
    pub labor_cost: f64,
    pub alternative_material: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub total_cost: f64,
    pub estimated_time: f64,
    pub alternative_cost: Option<f64>,
}

pub fn base_cost_per_sqft(building_type: &str) -> f64 {
    lookup(BASE_COST_PER_SQFT, building_type).unwrap_or(FALLBACK_BASE_COST_PER_SQFT)
}

pub fn material_unit_price(material: &str) -> f64 {
    lookup(MATERIAL_UNIT_PRICE, material).unwrap_or(FALLBACK_MATERIAL_UNIT_PRICE)
}

/// Labor cost assumed when the request does not carry one.
pub fn default_labor_cost(area_sqft: f64) -> f64 {
    DEFAULT_LABOR_COST_PER_SQFT * area_sqft
}

pub fn estimate(inputs: &CostInputs) -> CostEstimate {
    let base_cost = base_cost_per_sqft(&inputs.building_type) * inputs.area_sqft;
    let total_for = |material: &str| {
        base_cost + material_unit_price(material) * inputs.area_sqft + inputs.labor_cost
    };

    let total_cost = total_for(&inputs.material);
    let alternative_cost = (!same_material(&inputs.material, &inputs.alternative_material))
        .then(|| total_for(&inputs.alternative_material));
    let estimated_time = f64::from(inputs.floors)
        * (inputs.area_sqft / 1000.0)
        * MONTHS_PER_THOUSAND_SQFT_FLOOR;

    CostEstimate { total_cost, estimated_time, alternative_cost }
}

fn same_material(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

fn lookup(table: &[(&str, f64)], key: &str) -> Option<f64> {
    let key = key.trim().to_lowercase();
    table.iter().find(|(name, _)| *name == key).map(|(_, value)| *value)
}

#[cfg(test)]
mod tests {
    use crate::estimation::{
        base_cost_per_sqft, default_labor_cost, estimate, material_unit_price, CostInputs,
    };

    fn inputs(material: &str, alternative_material: &str) -> CostInputs {
        CostInputs {
            building_type: "Commercial".to_owned(),
            floors: 2,
            area_sqft: 1000.0,
            material: material.to_owned(),
            labor_cost: 500_000.0,
            alternative_material: alternative_material.to_owned(),
        }
    }

    #[test]
    fn commercial_steel_reference_case() {
        let result = estimate(&inputs("Steel", "Steel"));

        assert!((result.total_cost - 3_000_060.0).abs() < 1e-6);
        assert!((result.estimated_time - 3.0).abs() < 1e-9);
        assert_eq!(result.alternative_cost, None);
    }

    #[test]
    fn alternative_cost_only_when_material_differs() {
        let result = estimate(&inputs("Steel", "Bricks"));
        let alternative = result.alternative_cost.unwrap_or_default();

        assert!((alternative - 3_000_080.0).abs() < 1e-6);

        let same_ignoring_case = estimate(&inputs("steel", " STEEL "));
        assert_eq!(same_ignoring_case.alternative_cost, None);
    }

    #[test]
    fn lookups_are_case_insensitive_with_defaults() {
        assert_eq!(base_cost_per_sqft("INDUSTRIAL"), 3000.0);
        assert_eq!(base_cost_per_sqft("residential"), 2000.0);
        assert_eq!(base_cost_per_sqft("Warehouse"), 2000.0);
        assert_eq!(material_unit_price("Cement"), 0.04);
        assert_eq!(material_unit_price("Granite"), 1.0);
        assert_eq!(default_labor_cost(1200.0), 600_000.0);
    }
}
