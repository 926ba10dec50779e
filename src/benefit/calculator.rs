//! Benefit aggregation: FAS, accrued benefit and its present value
//!
//! For a member with `yos` years of service at `age`:
//! - accrued benefit = yos * FAS * accrual rate
//! - PVAB = accrued benefit * deferral factor(age) * PVAB multiplier
//!
//! The next-year accrued benefit is `(yos + 1) * FAS * accrual rate` using
//! today's FAS, not the projected `fas_next_year`. The projected FAS is only
//! reported. This matches the plan's published calculator and is kept as is.

use log::debug;
use serde::{Deserialize, Serialize};

use super::fas::compute_fas;
use super::{BenefitInputs, BenefitResult};
use crate::assumptions::Assumptions;
use crate::error::Result;

/// Default fraction of FAS accrued per year of service
pub const DEFAULT_ACCRUAL_RATE: f64 = 0.0182;

/// Default annuity conversion factor from annual benefit to lump sum
pub const DEFAULT_PVAB_MULTIPLIER: f64 = 12.5;

/// Plan constants applied by the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenefitConfig {
    pub accrual_rate: f64,
    pub pvab_multiplier: f64,
}

impl Default for BenefitConfig {
    fn default() -> Self {
        Self {
            accrual_rate: DEFAULT_ACCRUAL_RATE,
            pvab_multiplier: DEFAULT_PVAB_MULTIPLIER,
        }
    }
}

/// Computes benefit figures against a fixed set of reference tables
#[derive(Debug, Clone)]
pub struct BenefitCalculator {
    assumptions: Assumptions,
    config: BenefitConfig,
}

impl BenefitCalculator {
    pub fn new(assumptions: Assumptions, config: BenefitConfig) -> Self {
        Self {
            assumptions,
            config,
        }
    }

    /// Calculator using the plan's default constants
    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self::new(assumptions, BenefitConfig::default())
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn config(&self) -> &BenefitConfig {
        &self.config
    }

    /// All seven benefit figures for one member
    pub fn compute_benefit(
        &self,
        years_of_service: u32,
        age: u32,
        compensation: f64,
    ) -> Result<BenefitResult> {
        let rates = &self.assumptions.increase_rates;
        let deferred = &self.assumptions.deferred_factors;
        let BenefitConfig {
            accrual_rate,
            pvab_multiplier,
        } = self.config;

        let fas = compute_fas(years_of_service, compensation, rates, 0)?;
        let fas_next_year = compute_fas(years_of_service, compensation, rates, 1)?;

        let accrued_benefit = years_of_service as f64 * fas * accrual_rate;
        let pvab = accrued_benefit * deferred.discount_factor(age) * pvab_multiplier;

        let accrued_benefit_next_year = (years_of_service + 1) as f64 * fas * accrual_rate;
        let pvab_next_year = accrued_benefit_next_year
            * deferred.discount_factor(age.saturating_add(1))
            * pvab_multiplier;

        let result = BenefitResult {
            fas,
            fas_next_year,
            accrued_benefit,
            pvab,
            accrued_benefit_next_year,
            pvab_next_year,
            pvab_increase: pvab_next_year - pvab,
        };
        debug!(
            "Benefit for yos={} age={} salary={:.2}: {:?}",
            years_of_service, age, compensation, result
        );
        Ok(result)
    }

    /// Same as [`compute_benefit`](Self::compute_benefit), taking collected inputs
    pub fn compute(&self, inputs: &BenefitInputs) -> Result<BenefitResult> {
        self.compute_benefit(inputs.years_of_service, inputs.age, inputs.salary)
    }
}
