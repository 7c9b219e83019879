//! Trade-in value estimation
//!
//! A flat baseline depreciated geometrically by age, scaled by a brand
//! multiplier and corrected for mileage against the expected mileage for
//! the vehicle's age. The result is a [min, max] band.

use std::collections::HashMap;

use serde::Serialize;

use sales_agent_config::constants::trade_in::{
    MILEAGE_ADJUSTMENT_PER_100K, MILEAGE_MULTIPLIER_MAX, MILEAGE_MULTIPLIER_MIN, RANGE_HIGH,
    RANGE_LOW,
};
use sales_agent_config::TradeInConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn for_age(age: i32) -> Self {
        match age {
            a if a <= 5 => Confidence::High,
            a if a <= 10 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    /// Customer-facing label
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "alta",
            Confidence::Medium => "média",
            Confidence::Low => "baixa",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeInVehicle {
    pub brand: String,
    pub model: Option<String>,
    pub year: i32,
    pub mileage: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeInEstimate {
    pub min_value: u64,
    pub max_value: u64,
    pub confidence: Confidence,
}

impl TradeInEstimate {
    pub fn midpoint(&self) -> u64 {
        (self.min_value + self.max_value + 1) / 2
    }
}

#[derive(Debug, Clone)]
pub struct TradeInEstimator {
    base_value: f64,
    annual_depreciation: f64,
    expected_km_per_year: u32,
    brand_multipliers: HashMap<String, f64>,
}

impl TradeInEstimator {
    pub fn new(config: &TradeInConfig) -> Self {
        Self {
            base_value: config.base_value,
            annual_depreciation: config.annual_depreciation,
            expected_km_per_year: config.expected_km_per_year,
            brand_multipliers: config
                .brand_multipliers
                .iter()
                .map(|(brand, m)| (brand.to_lowercase(), *m))
                .collect(),
        }
    }

    pub fn brand_multiplier(&self, brand: &str) -> f64 {
        self.brand_multipliers
            .get(&brand.to_lowercase())
            .copied()
            .unwrap_or(1.0)
    }

    /// Multiplier for mileage deviation, clamped to [0.7, 1.1]
    pub fn mileage_multiplier(&self, age: i32, mileage: u32) -> f64 {
        let expected = age.max(0) as f64 * self.expected_km_per_year as f64;
        let deviation = mileage as f64 - expected;
        let adjustment = 1.0 - (deviation / 100_000.0) * MILEAGE_ADJUSTMENT_PER_100K;
        adjustment.clamp(MILEAGE_MULTIPLIER_MIN, MILEAGE_MULTIPLIER_MAX)
    }

    pub fn estimate(&self, vehicle: &TradeInVehicle, current_year: i32) -> TradeInEstimate {
        let age = (current_year - vehicle.year).max(0);

        let mut value = self.base_value * (1.0 - self.annual_depreciation).powi(age);
        value *= self.brand_multiplier(&vehicle.brand);
        if let Some(km) = vehicle.mileage.filter(|km| *km > 0) {
            value *= self.mileage_multiplier(age, km);
        }

        let estimate = TradeInEstimate {
            min_value: (value * RANGE_LOW).round() as u64,
            max_value: (value * RANGE_HIGH).round() as u64,
            confidence: Confidence::for_age(age),
        };

        tracing::debug!(
            brand = %vehicle.brand,
            year = vehicle.year,
            age,
            min = estimate.min_value,
            max = estimate.max_value,
            "Trade-in estimated"
        );

        estimate
    }
}

impl Default for TradeInEstimator {
    fn default() -> Self {
        Self::new(&TradeInConfig::default())
    }
}
