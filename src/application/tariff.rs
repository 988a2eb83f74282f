//! Tariff suggestion calculator
//!
//! Deterministic linear model over distance and duration:
//!
//! `suggested = round((base + km·per_km + min·per_min) · demand / max(1, occupancy))`
//!
//! The returned range is the ±tolerance band the trip-create validator
//! enforces against `price_per_seat` when a suggestion is attached.

use serde::Serialize;

use crate::config::TariffConfig;
use crate::domain::{DomainError, DomainResult};

/// Per-component decomposition of the suggestion
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TariffBreakdown {
    pub base_boarding: f64,
    pub distance_component: f64,
    pub duration_component: f64,
}

/// Accepted price band around the suggestion
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TariffRange {
    pub min: f64,
    pub max: f64,
}

/// Calculator output
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TariffSuggestion {
    pub suggested_tariff: f64,
    pub breakdown: TariffBreakdown,
    pub range: TariffRange,
}

impl TariffSuggestion {
    /// Whether a driver-chosen price falls inside the tolerance band
    pub fn accepts(&self, price_per_seat: f64) -> bool {
        price_per_seat >= self.range.min && price_per_seat <= self.range.max
    }
}

/// Pure tariff calculator parameterized by configuration
#[derive(Clone)]
pub struct TariffCalculator {
    config: TariffConfig,
}

impl TariffCalculator {
    pub fn new(config: TariffConfig) -> Self {
        Self { config }
    }

    /// Compute the suggestion. `demand_factor` defaults to 1 and must be
    /// ≥ 1; `occupancy` defaults to 1 and divides the fare per rider.
    pub fn suggest(
        &self,
        distance_km: f64,
        duration_minutes: f64,
        demand_factor: Option<f64>,
        occupancy: Option<u32>,
    ) -> DomainResult<TariffSuggestion> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(DomainError::TariffInvalidInput);
        }
        if !duration_minutes.is_finite() || duration_minutes < 0.0 {
            return Err(DomainError::TariffInvalidInput);
        }
        let demand = demand_factor.unwrap_or(1.0);
        if !demand.is_finite() || demand < 1.0 {
            return Err(DomainError::TariffInvalidInput);
        }
        let occupancy = occupancy.unwrap_or(1).max(1) as f64;

        let breakdown = TariffBreakdown {
            base_boarding: self.config.base_boarding,
            distance_component: distance_km * self.config.per_km,
            duration_component: duration_minutes * self.config.per_minute,
        };
        let subtotal =
            breakdown.base_boarding + breakdown.distance_component + breakdown.duration_component;
        let suggested = (subtotal * demand / occupancy).round();

        let tolerance = self.config.tolerance_pct / 100.0;
        let range = TariffRange {
            min: (suggested * (1.0 - tolerance)).round(),
            max: (suggested * (1.0 + tolerance)).round(),
        };

        Ok(TariffSuggestion {
            suggested_tariff: suggested,
            breakdown,
            range,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> TariffCalculator {
        TariffCalculator::new(TariffConfig {
            base_boarding: 1500.0,
            per_km: 450.0,
            per_minute: 60.0,
            tolerance_pct: 20.0,
        })
    }

    #[test]
    fn linear_model() {
        let s = calculator().suggest(10.0, 30.0, None, None).unwrap();
        // 1500 + 4500 + 1800 = 7800
        assert_eq!(s.breakdown.base_boarding, 1500.0);
        assert_eq!(s.breakdown.distance_component, 4500.0);
        assert_eq!(s.breakdown.duration_component, 1800.0);
        assert_eq!(s.suggested_tariff, 7800.0);
    }

    #[test]
    fn demand_scales_up() {
        let s = calculator().suggest(10.0, 30.0, Some(1.5), None).unwrap();
        assert_eq!(s.suggested_tariff, 11700.0);
    }

    #[test]
    fn occupancy_divides() {
        let s = calculator().suggest(10.0, 30.0, None, Some(3)).unwrap();
        assert_eq!(s.suggested_tariff, 2600.0);
    }

    #[test]
    fn tolerance_band() {
        let s = calculator().suggest(10.0, 30.0, None, None).unwrap();
        assert_eq!(s.range.min, 6240.0);
        assert_eq!(s.range.max, 9360.0);
        assert!(s.accepts(7800.0));
        assert!(s.accepts(6240.0));
        assert!(s.accepts(9360.0));
        assert!(!s.accepts(6239.0));
        assert!(!s.accepts(9361.0));
    }

    #[test]
    fn zero_inputs_are_valid() {
        let s = calculator().suggest(0.0, 0.0, None, None).unwrap();
        assert_eq!(s.suggested_tariff, 1500.0);
    }

    #[test]
    fn invalid_inputs_rejected() {
        let c = calculator();
        assert!(matches!(
            c.suggest(-1.0, 30.0, None, None),
            Err(DomainError::TariffInvalidInput)
        ));
        assert!(matches!(
            c.suggest(10.0, -0.1, None, None),
            Err(DomainError::TariffInvalidInput)
        ));
        assert!(matches!(
            c.suggest(10.0, 30.0, Some(0.9), None),
            Err(DomainError::TariffInvalidInput)
        ));
        assert!(matches!(
            c.suggest(f64::NAN, 30.0, None, None),
            Err(DomainError::TariffInvalidInput)
        ));
    }

    #[test]
    fn zero_occupancy_clamped_to_one() {
        let s = calculator().suggest(10.0, 30.0, None, Some(0)).unwrap();
        assert_eq!(s.suggested_tariff, 7800.0);
    }
}
