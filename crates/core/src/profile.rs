//! Customer profile accumulated across a conversation
//!
//! Fields are enriched monotonically: merging a [`ProfileUpdate`] only
//! overwrites a field when the update carries a concrete value. The only
//! destructive path is [`CustomerProfile::correct_name`].

use serde::{Deserialize, Serialize};

/// What the customer intends to use the vehicle for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageCategory {
    City,
    Trip,
    Work,
    Mixed,
    Rideshare,
}

impl UsageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageCategory::City => "city",
            UsageCategory::Trip => "trip",
            UsageCategory::Work => "work",
            UsageCategory::Mixed => "mixed",
            UsageCategory::Rideshare => "rideshare",
        }
    }

    /// Customer-facing label
    pub fn display_name(&self) -> &'static str {
        match self {
            UsageCategory::City => "cidade",
            UsageCategory::Trip => "viagem",
            UsageCategory::Work => "trabalho",
            UsageCategory::Mixed => "misto",
            UsageCategory::Rideshare => "aplicativo",
        }
    }
}

/// Vehicle body style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Sedan,
    Hatch,
    Suv,
    Pickup,
    Minivan,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Sedan => "sedan",
            BodyType::Hatch => "hatch",
            BodyType::Suv => "suv",
            BodyType::Pickup => "pickup",
            BodyType::Minivan => "minivan",
        }
    }

    /// Parse a free-form inventory label ("SUV", "Hatchback", "picape")
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "sedan" | "sedã" => Some(BodyType::Sedan),
            "hatch" | "hatchback" => Some(BodyType::Hatch),
            "suv" | "crossover" => Some(BodyType::Suv),
            "pickup" | "picape" => Some(BodyType::Pickup),
            "minivan" | "van" => Some(BodyType::Minivan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Automatic,
    Manual,
}

impl Transmission {
    pub fn display_name(&self) -> &'static str {
        match self {
            Transmission::Automatic => "automático",
            Transmission::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Flex,
    Diesel,
    Hybrid,
    Electric,
}

impl FuelType {
    pub fn display_name(&self) -> &'static str {
        match self {
            FuelType::Flex => "flex",
            FuelType::Diesel => "diesel",
            FuelType::Hybrid => "híbrido",
            FuelType::Electric => "elétrico",
        }
    }
}

/// How soon the customer intends to buy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Immediate,
    Soon,
    Flexible,
}

/// Vehicle the customer wants to hand in as part of the deal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeIn {
    pub has_trade_in: bool,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<u32>,
    pub estimated_value: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancingPreference {
    pub wants_financing: bool,
    pub down_payment: Option<u64>,
    pub term_months: Option<u32>,
}

/// Compact memory of a vehicle presented to the customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShownVehicle {
    pub vehicle_id: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerProfile {
    pub name: Option<String>,
    pub budget: Option<u64>,
    pub budget_min: Option<u64>,
    pub budget_max: Option<u64>,
    pub budget_flexible: bool,
    pub usage: Option<UsageCategory>,
    pub body_type: Option<BodyType>,
    pub transmission: Option<Transmission>,
    pub fuel: Option<FuelType>,
    pub min_year: Option<i32>,
    pub max_mileage: Option<u32>,
    pub people: Option<u8>,
    pub min_seats: Option<u8>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub priorities: Vec<String>,
    pub trade_in: TradeIn,
    pub financing: FinancingPreference,
    pub urgency: Option<Urgency>,
    /// Up to three vehicles from the latest search
    pub last_shown: Vec<ShownVehicle>,
    pub recommendation_shown: bool,
}

impl CustomerProfile {
    /// True once there is enough context to run a search
    pub fn can_recommend(&self) -> bool {
        self.budget.is_some()
            || self.body_type.is_some()
            || self.usage.is_some()
            || self.brand.is_some()
    }

    pub fn first_name(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.split_whitespace().next())
    }

    /// Replace the known name. Used only by explicit correction flows.
    pub fn correct_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn merge(&mut self, update: ProfileUpdate) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut self.name, update.name);
        set(&mut self.budget, update.budget);
        set(&mut self.budget_min, update.budget_min);
        set(&mut self.budget_max, update.budget_max);
        set(&mut self.usage, update.usage);
        set(&mut self.body_type, update.body_type);
        set(&mut self.transmission, update.transmission);
        set(&mut self.fuel, update.fuel);
        set(&mut self.min_year, update.min_year);
        set(&mut self.max_mileage, update.max_mileage);
        set(&mut self.people, update.people);
        set(&mut self.min_seats, update.min_seats);
        set(&mut self.brand, update.brand);
        set(&mut self.model, update.model);
        set(&mut self.urgency, update.urgency);

        if update.budget_flexible {
            self.budget_flexible = true;
        }
        if update.has_trade_in {
            self.trade_in.has_trade_in = true;
        }
        if update.wants_financing {
            self.financing.wants_financing = true;
        }
        for tag in update.priorities {
            if !self.priorities.contains(&tag) {
                self.priorities.push(tag);
            }
        }
    }
}

/// Partial profile produced from a single utterance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub budget: Option<u64>,
    pub budget_min: Option<u64>,
    pub budget_max: Option<u64>,
    pub budget_flexible: bool,
    pub usage: Option<UsageCategory>,
    pub body_type: Option<BodyType>,
    pub transmission: Option<Transmission>,
    pub fuel: Option<FuelType>,
    pub min_year: Option<i32>,
    pub max_mileage: Option<u32>,
    pub people: Option<u8>,
    pub min_seats: Option<u8>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub priorities: Vec<String>,
    pub has_trade_in: bool,
    pub wants_financing: bool,
    pub urgency: Option<Urgency>,
}

impl ProfileUpdate {
    /// True when the update carries any vehicle-related intent
    pub fn has_vehicle_intent(&self) -> bool {
        self.budget.is_some()
            || self.usage.is_some()
            || self.body_type.is_some()
            || self.min_year.is_some()
            || self.brand.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_recommend() {
        assert!(!CustomerProfile::default().can_recommend());

        let budget_only = CustomerProfile {
            budget: Some(50_000),
            ..Default::default()
        };
        assert!(budget_only.can_recommend());

        let sedan_only = CustomerProfile {
            body_type: Some(BodyType::Sedan),
            ..Default::default()
        };
        assert!(sedan_only.can_recommend());
    }

    #[test]
    fn test_merge_keeps_known_values() {
        let mut profile = CustomerProfile {
            budget: Some(80_000),
            body_type: Some(BodyType::Suv),
            ..Default::default()
        };
        profile.merge(ProfileUpdate {
            brand: Some("toyota".to_string()),
            ..Default::default()
        });

        assert_eq!(profile.budget, Some(80_000));
        assert_eq!(profile.body_type, Some(BodyType::Suv));
        assert_eq!(profile.brand.as_deref(), Some("toyota"));
    }

    #[test]
    fn test_trade_in_flag_is_sticky() {
        let mut profile = CustomerProfile::default();
        profile.merge(ProfileUpdate {
            has_trade_in: true,
            ..Default::default()
        });
        profile.merge(ProfileUpdate::default());
        assert!(profile.trade_in.has_trade_in);
    }

    #[test]
    fn test_priorities_accumulate_without_duplicates() {
        let mut profile = CustomerProfile::default();
        profile.merge(ProfileUpdate {
            priorities: vec!["economico".into(), "conforto".into()],
            ..Default::default()
        });
        profile.merge(ProfileUpdate {
            priorities: vec!["conforto".into(), "seguranca".into()],
            ..Default::default()
        });
        assert_eq!(profile.priorities, vec!["economico", "conforto", "seguranca"]);
    }

    #[test]
    fn test_body_type_labels() {
        assert_eq!(BodyType::from_label("SUV"), Some(BodyType::Suv));
        assert_eq!(BodyType::from_label("Hatchback"), Some(BodyType::Hatch));
        assert_eq!(BodyType::from_label("picape"), Some(BodyType::Pickup));
        assert_eq!(BodyType::from_label("coupe"), None);
    }

    #[test]
    fn test_first_name() {
        let profile = CustomerProfile {
            name: Some("Maria Clara".into()),
            ..Default::default()
        };
        assert_eq!(profile.first_name(), Some("Maria"));
    }
}
