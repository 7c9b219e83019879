//! Vehicle financing simulation

use serde::Serialize;

use sales_agent_config::FinancingConfig;

/// Amortized monthly payment: P * r * (1+r)^n / [(1+r)^n - 1]
pub fn monthly_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 || principal <= 0.0 {
        return 0.0;
    }

    if monthly_rate <= 0.0 {
        return principal / months as f64;
    }

    let one_plus_r_n = (1.0 + monthly_rate).powi(months as i32);
    principal * monthly_rate * one_plus_r_n / (one_plus_r_n - 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancingSimulation {
    pub vehicle_price: u64,
    pub down_payment: u64,
    pub financed_amount: u64,
    pub term_months: u32,
    pub monthly_payment: u64,
    /// Sum of all installments plus the down payment
    pub total_amount: u64,
    /// Monthly rate compounded over twelve months, as a percentage
    pub annual_rate_percent: f64,
}

impl FinancingSimulation {
    pub fn down_payment_percent(&self) -> u64 {
        if self.vehicle_price == 0 {
            return 0;
        }
        ((self.down_payment as f64 / self.vehicle_price as f64) * 100.0).round() as u64
    }
}

#[derive(Debug, Clone)]
pub struct FinancingCalculator {
    monthly_rate: f64,
    default_down_payment_ratio: f64,
    default_term_months: u32,
    alternative_terms: Vec<u32>,
}

impl FinancingCalculator {
    pub fn new(config: &FinancingConfig) -> Self {
        Self {
            monthly_rate: config.monthly_rate,
            default_down_payment_ratio: config.default_down_payment_ratio,
            default_term_months: config.default_term_months,
            alternative_terms: config.alternative_terms.clone(),
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.monthly_rate
    }

    pub fn default_term_months(&self) -> u32 {
        self.default_term_months
    }

    pub fn alternative_terms(&self) -> &[u32] {
        &self.alternative_terms
    }

    pub fn default_down_payment(&self, vehicle_price: u64) -> u64 {
        (vehicle_price as f64 * self.default_down_payment_ratio).round() as u64
    }

    pub fn annual_rate_percent(&self) -> f64 {
        ((1.0 + self.monthly_rate).powi(12) - 1.0) * 100.0
    }

    /// Down payments above the price are capped at the price
    pub fn simulate(&self, vehicle_price: u64, down_payment: u64, months: u32) -> FinancingSimulation {
        let down_payment = down_payment.min(vehicle_price);
        let financed = vehicle_price - down_payment;
        let payment = monthly_payment(financed as f64, self.monthly_rate, months);
        let total = payment * months as f64 + down_payment as f64;

        FinancingSimulation {
            vehicle_price,
            down_payment,
            financed_amount: financed,
            term_months: months,
            monthly_payment: payment.round() as u64,
            total_amount: total.round() as u64,
            annual_rate_percent: self.annual_rate_percent(),
        }
    }

    /// Primary simulation followed by one per alternative term
    pub fn simulate_with_alternatives(
        &self,
        vehicle_price: u64,
        down_payment: u64,
        months: u32,
    ) -> (FinancingSimulation, Vec<FinancingSimulation>) {
        let primary = self.simulate(vehicle_price, down_payment, months);
        let alternatives = self
            .alternative_terms
            .iter()
            .map(|&term| self.simulate(vehicle_price, down_payment, term))
            .collect();
        (primary, alternatives)
    }
}

impl Default for FinancingCalculator {
    fn default() -> Self {
        Self::new(&FinancingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_simulation() {
        let calc = FinancingCalculator::default();
        let sim = calc.simulate(100_000, 20_000, 48);

        assert_eq!(sim.financed_amount, 80_000);
        assert_eq!(sim.monthly_payment, 2_498);
        assert_eq!(sim.total_amount, 139_902);
        assert_eq!(sim.down_payment_percent(), 20);
        assert!((sim.annual_rate_percent - 23.726).abs() < 0.01);
    }

    #[test]
    fn test_term_moves_payment_in_expected_direction() {
        let calc = FinancingCalculator::default();
        let base = calc.simulate(100_000, 20_000, 48);
        let half = calc.simulate(100_000, 20_000, 24);
        let double = calc.simulate(100_000, 20_000, 96);

        assert!(half.monthly_payment > base.monthly_payment);
        assert!(double.monthly_payment < base.monthly_payment);
        assert_eq!(half.financed_amount, double.financed_amount);
        assert!(double.total_amount > half.total_amount);
    }

    #[test]
    fn test_alternatives() {
        let calc = FinancingCalculator::default();
        let (primary, alternatives) = calc.simulate_with_alternatives(100_000, 20_000, 48);
        assert_eq!(primary.term_months, 48);
        let terms: Vec<u32> = alternatives.iter().map(|s| s.term_months).collect();
        assert_eq!(terms, vec![36, 60]);
        assert_eq!(alternatives[0].monthly_payment, 3_034);
        assert_eq!(alternatives[1].monthly_payment, 2_186);
    }

    #[test]
    fn test_default_down_payment() {
        assert_eq!(FinancingCalculator::default().default_down_payment(95_000), 19_000);
    }

    #[test]
    fn test_edge_cases() {
        assert_eq!(monthly_payment(80_000.0, 0.0179, 0), 0.0);
        assert_eq!(monthly_payment(0.0, 0.0179, 48), 0.0);
        assert_eq!(monthly_payment(12_000.0, 0.0, 12), 1_000.0);

        let sim = FinancingCalculator::default().simulate(50_000, 80_000, 48);
        assert_eq!(sim.down_payment, 50_000);
        assert_eq!(sim.monthly_payment, 0);
    }
}
