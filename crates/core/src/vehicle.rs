//! Inventory vehicles, search filters and recommendations

use serde::{Deserialize, Serialize};

use crate::profile::BodyType;

fn default_true() -> bool {
    true
}

fn default_condition() -> String {
    "used".to_string()
}

/// A vehicle record as held by the inventory store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: u64,
    #[serde(default)]
    pub mileage: u32,
    #[serde(default)]
    pub body_type: String,
    #[serde(default = "default_condition")]
    pub condition: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub seats: Option<u8>,
    #[serde(default = "default_true")]
    pub available: bool,
    /// Precomputed embedding of the vehicle document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl VehicleSummary {
    pub fn body(&self) -> Option<BodyType> {
        BodyType::from_label(&self.body_type)
    }

    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.make, self.model, self.year)
    }

    pub fn is_automatic(&self) -> bool {
        self.transmission
            .as_deref()
            .map(|t| {
                let t = t.to_lowercase();
                t.starts_with("autom") || t == "cvt"
            })
            .unwrap_or(false)
    }
}

/// Structural constraints applied before ranking. All bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleFilters {
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub make: Option<String>,
    pub body_type: Option<String>,
    pub condition: Option<String>,
    pub max_mileage: Option<u32>,
    pub min_seats: Option<u8>,
}

impl VehicleFilters {
    pub fn is_empty(&self) -> bool {
        *self == VehicleFilters::default()
    }

    pub fn matches(&self, vehicle: &VehicleSummary) -> bool {
        fn same_text(expected: &Option<String>, actual: &str) -> bool {
            expected
                .as_deref()
                .map(|e| e.eq_ignore_ascii_case(actual))
                .unwrap_or(true)
        }

        if self.price_min.is_some_and(|min| vehicle.price < min) {
            return false;
        }
        if self.price_max.is_some_and(|max| vehicle.price > max) {
            return false;
        }
        if self.year_min.is_some_and(|min| vehicle.year < min) {
            return false;
        }
        if self.year_max.is_some_and(|max| vehicle.year > max) {
            return false;
        }
        if self.max_mileage.is_some_and(|max| vehicle.mileage > max) {
            return false;
        }
        if let Some(min) = self.min_seats {
            // Vehicles without a seat count are not excluded
            if vehicle.seats.is_some_and(|s| s < min) {
                return false;
            }
        }
        if let Some(body) = &self.body_type {
            let wanted = BodyType::from_label(body);
            let matched = match (wanted, vehicle.body()) {
                (Some(w), Some(v)) => w == v,
                _ => body.eq_ignore_ascii_case(&vehicle.body_type),
            };
            if !matched {
                return false;
            }
        }
        same_text(&self.make, &vehicle.make) && same_text(&self.condition, &vehicle.condition)
    }
}

/// Denormalized vehicle data attached to a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleCard {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: u64,
    pub mileage: u32,
    pub body_type: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl From<&VehicleSummary> for VehicleCard {
    fn from(v: &VehicleSummary) -> Self {
        Self {
            id: v.id.clone(),
            make: v.make.clone(),
            model: v.model.clone(),
            year: v.year,
            price: v.price,
            mileage: v.mileage,
            body_type: v.body_type.clone(),
            features: v.features.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecommendation {
    pub vehicle_id: String,
    /// 0 to 100
    pub match_score: u8,
    pub reasoning: String,
    pub highlights: Vec<String>,
    pub concerns: Vec<String>,
    pub vehicle: VehicleCard,
}
