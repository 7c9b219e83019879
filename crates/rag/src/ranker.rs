//! Profile-driven vehicle ranking
//!
//! A free-text query and structural filters are derived from the customer
//! profile, run through [`VectorSearch::hybrid_search`], and the best hits
//! are explained with a one-line reason, highlights and concerns.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;

use sales_agent_config::RankerConfig;
use sales_agent_core::format::{brl, km};
use sales_agent_core::{
    BodyType, CustomerProfile, Ranker, UsageCategory, VehicleCard, VehicleFilters,
    VehicleRecommendation, VehicleSummary,
};

use crate::search::{SearchHit, VectorSearch};

const LOW_MILEAGE_KM: u32 = 50_000;
const VERY_LOW_MILEAGE_KM: u32 = 30_000;
const HIGH_MILEAGE_KM: u32 = 100_000;
const RECENT_YEARS: i32 = 2;
const MAX_HIGHLIGHTS: usize = 3;

#[derive(Debug, Clone)]
pub struct RankerSettings {
    pub budget_flexibility: f64,
    pub max_recommendations: usize,
    pub candidate_limit: usize,
}

impl From<&RankerConfig> for RankerSettings {
    fn from(config: &RankerConfig) -> Self {
        Self {
            budget_flexibility: config.budget_flexibility,
            max_recommendations: config.max_recommendations,
            candidate_limit: config.candidate_limit,
        }
    }
}

impl Default for RankerSettings {
    fn default() -> Self {
        Self::from(&RankerConfig::default())
    }
}

pub struct VehicleRanker {
    search: Arc<VectorSearch>,
    settings: RankerSettings,
}

impl VehicleRanker {
    pub fn new(search: Arc<VectorSearch>, settings: RankerSettings) -> Self {
        Self { search, settings }
    }

    pub fn build_query(profile: &CustomerProfile) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(body) = profile.body_type {
            parts.push(body.as_str().to_string());
        }
        if let Some(brand) = &profile.brand {
            parts.push(brand.clone());
        }
        if let Some(model) = &profile.model {
            parts.push(model.clone());
        }
        if let Some(usage) = profile.usage {
            parts.push(usage_phrase(usage).to_string());
        }
        if let Some(budget) = profile.budget {
            parts.push(budget_tier(budget).to_string());
        }
        if is_large_family(profile) {
            parts.push("spacious family 7 seats".to_string());
        }
        parts.extend(profile.priorities.iter().cloned());

        if parts.is_empty() {
            "used vehicle".to_string()
        } else {
            parts.join(" ")
        }
    }

    pub fn build_filters(&self, profile: &CustomerProfile) -> VehicleFilters {
        VehicleFilters {
            price_max: profile
                .budget
                .map(|b| (b as f64 * self.settings.budget_flexibility).round() as u64),
            year_min: profile.min_year,
            body_type: profile.body_type.map(|b| b.as_str().to_string()),
            make: profile.brand.clone(),
            max_mileage: profile.max_mileage,
            min_seats: profile.min_seats,
            ..Default::default()
        }
    }

    fn explain(&self, hit: SearchHit, profile: &CustomerProfile, current_year: i32) -> VehicleRecommendation {
        let vehicle = &hit.vehicle;
        VehicleRecommendation {
            vehicle_id: vehicle.id.clone(),
            match_score: (hit.score * 100.0).round().clamp(0.0, 100.0) as u8,
            reasoning: reasoning(vehicle, profile),
            highlights: highlights(vehicle, profile, current_year),
            concerns: concerns(vehicle, profile),
            vehicle: VehicleCard::from(vehicle),
        }
    }
}

#[async_trait]
impl Ranker for VehicleRanker {
    async fn recommend(
        &self,
        profile: &CustomerProfile,
        limit: usize,
    ) -> sales_agent_core::Result<Vec<VehicleRecommendation>> {
        let query = Self::build_query(profile);
        let filters = self.build_filters(profile);
        tracing::debug!(query = %query, filters = ?filters, "Ranking vehicles");

        let hits = self
            .search
            .hybrid_search(&query, &filters, self.settings.candidate_limit)
            .await?;

        let current_year = chrono::Utc::now().year();
        let keep = limit.min(self.settings.max_recommendations);
        let recommendations: Vec<VehicleRecommendation> = hits
            .into_iter()
            .take(keep)
            .map(|hit| self.explain(hit, profile, current_year))
            .collect();

        tracing::info!(count = recommendations.len(), "Recommendations ranked");
        Ok(recommendations)
    }
}

fn usage_phrase(usage: UsageCategory) -> &'static str {
    match usage {
        UsageCategory::City => "compact economical city",
        UsageCategory::Trip => "comfortable spacious trip",
        UsageCategory::Work => "durable robust work",
        UsageCategory::Mixed => "versatile",
        UsageCategory::Rideshare => "economical comfortable sedan",
    }
}

fn budget_tier(budget: u64) -> &'static str {
    match budget {
        0..=60_000 => "affordable economical",
        60_001..=150_000 => "mid-range",
        _ => "premium",
    }
}

fn is_large_family(profile: &CustomerProfile) -> bool {
    profile.people.is_some_and(|p| p >= 5) || profile.min_seats.is_some_and(|s| s >= 7)
}

fn body_label(body: BodyType) -> &'static str {
    match body {
        BodyType::Sedan => "Sedan",
        BodyType::Hatch => "Hatch",
        BodyType::Suv => "SUV",
        BodyType::Pickup => "Picape",
        BodyType::Minivan => "Minivan",
    }
}

fn reasoning(vehicle: &VehicleSummary, profile: &CustomerProfile) -> String {
    if let Some(body) = profile.body_type.filter(|b| vehicle.body() == Some(*b)) {
        return format!("{} como você pediu", body_label(body));
    }
    if let Some(budget) = profile.budget.filter(|b| vehicle.price <= *b) {
        return format!("Dentro do seu orçamento de {}", brl(budget));
    }
    if profile.min_year.is_some_and(|y| vehicle.year >= y) {
        return format!("Ano {}, dentro do que você procura", vehicle.year);
    }
    if vehicle.mileage < LOW_MILEAGE_KM {
        return format!("Baixa quilometragem: {}", km(vehicle.mileage));
    }
    "Boa opção para o seu perfil".to_string()
}

fn highlights(vehicle: &VehicleSummary, profile: &CustomerProfile, current_year: i32) -> Vec<String> {
    let mut out = Vec::new();
    if vehicle.mileage < VERY_LOW_MILEAGE_KM {
        out.push(format!("Quilometragem muito baixa ({})", km(vehicle.mileage)));
    }
    if vehicle.year >= current_year - RECENT_YEARS {
        out.push(format!("Modelo recente ({})", vehicle.year));
    }
    if vehicle.is_automatic() {
        out.push("Câmbio automático".to_string());
    }
    if profile.usage == Some(UsageCategory::Rideshare) && vehicle.body() == Some(BodyType::Sedan) {
        out.push("Ideal para aplicativo".to_string());
    }
    out.truncate(MAX_HIGHLIGHTS);
    out
}

fn concerns(vehicle: &VehicleSummary, profile: &CustomerProfile) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(budget) = profile.budget.filter(|b| vehicle.price > *b) {
        out.push(format!("Acima do orçamento em {}", brl(vehicle.price - budget)));
    }
    if vehicle.mileage > HIGH_MILEAGE_KM {
        out.push(format!("Quilometragem alta ({})", km(vehicle.mileage)));
    }
    out
}
