//! Facts about the customer's current vehicle

use sales_agent_core::TradeIn;

use super::rules::{Keywords, Rules};
use super::{normalize_thousands, parse_amount, BRAND};

/// Model with the brand that makes it
static MODEL: Rules<(&'static str, &'static str)> = Rules::new(&[
    (r"\bcorolla\b", ("corolla", "toyota")),
    (r"\bcivic\b", ("civic", "honda")),
    (r"\bgol\b", ("gol", "volkswagen")),
    (r"\bpolo\b", ("polo", "volkswagen")),
    (r"\bonix\b", ("onix", "chevrolet")),
    (r"\bhb20\b", ("hb20", "hyundai")),
    (r"\bcreta\b", ("creta", "hyundai")),
    (r"\bcompass\b", ("compass", "jeep")),
    (r"\bkicks\b", ("kicks", "nissan")),
    (r"\brenegade\b", ("renegade", "jeep")),
    (r"\btracker\b", ("tracker", "chevrolet")),
    (r"\bt-?cross\b", ("t-cross", "volkswagen")),
    (r"\bnivus\b", ("nivus", "volkswagen")),
    (r"\bargo\b", ("argo", "fiat")),
    (r"\bcronos\b", ("cronos", "fiat")),
    (r"\bmobi\b", ("mobi", "fiat")),
    (r"\buno\b", ("uno", "fiat")),
    (r"\bpalio\b", ("palio", "fiat")),
    (r"\bsiena\b", ("siena", "fiat")),
    (r"\btoro\b", ("toro", "fiat")),
    (r"\bstrada\b", ("strada", "fiat")),
    (r"\bsaveiro\b", ("saveiro", "volkswagen")),
    (r"\bhilux\b", ("hilux", "toyota")),
    (r"\branger\b", ("ranger", "ford")),
    (r"\bs10\b", ("s10", "chevrolet")),
    (r"\bamarok\b", ("amarok", "volkswagen")),
    (r"\bfrontier\b", ("frontier", "nissan")),
]);

static YEAR: Keywords = Keywords::new(r"\b(20[0-2]\d)\b");
static MILEAGE: Keywords = Keywords::new(r"(\d{1,3}(?:\.\d{3})+|\d{2,3})[\s.]?(?:mil)?\s*km");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeInFacts {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<u32>,
}

impl TradeInFacts {
    /// Fold into the stored trade-in, keeping known values
    pub fn merge_into(self, trade_in: &mut TradeIn) {
        trade_in.has_trade_in = true;
        if self.brand.is_some() {
            trade_in.brand = self.brand;
        }
        if self.model.is_some() {
            trade_in.model = self.model;
        }
        if self.year.is_some() {
            trade_in.year = self.year;
        }
        if self.mileage.is_some() {
            trade_in.mileage = self.mileage;
        }
    }
}

pub(crate) fn find_model(lower: &str) -> Option<&'static str> {
    MODEL.first(lower).map(|(model, _)| model)
}

pub fn extract_trade_in(utterance: &str) -> TradeInFacts {
    let lower = utterance.to_lowercase();
    let model = MODEL.first(&lower);
    TradeInFacts {
        brand: BRAND
            .first(&lower)
            .or(model.map(|(_, brand)| brand))
            .map(str::to_string),
        model: model.map(|(model, _)| model.to_string()),
        year: YEAR.capture(&lower).and_then(|y| y.parse().ok()),
        mileage: MILEAGE
            .capture(&lower)
            .and_then(parse_amount)
            .and_then(|km| u32::try_from(normalize_thousands(km)).ok()),
    }
}
