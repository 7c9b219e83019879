//! Domain calculators used by the dialogue nodes
//!
//! - Vehicle financing simulation (fixed monthly rate amortization)
//! - Trade-in value estimation (depreciation, brand tier, mileage)

pub mod financing;
pub mod trade_in;

pub use financing::{monthly_payment, FinancingCalculator, FinancingSimulation};
pub use trade_in::{Confidence, TradeInEstimate, TradeInEstimator, TradeInVehicle};
