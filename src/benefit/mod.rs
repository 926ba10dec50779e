//! Final average salary projection and benefit aggregation

mod calculator;
pub mod fas;
pub(crate) mod inputs;
mod result;

pub use calculator::{
    BenefitCalculator, BenefitConfig, DEFAULT_ACCRUAL_RATE, DEFAULT_PVAB_MULTIPLIER,
};
pub use fas::compute_fas;
pub use inputs::{BenefitInputs, Gender};
pub use result::{format_currency, BenefitResult, RESULT_KEYS};
