//! Pension Benefit - deferred pension benefit estimates for plan members
//!
//! This library provides:
//! - Reference table loading (deferral discount factors, salary increase rates)
//! - Final average salary projection with service-dependent averaging windows
//! - Accrued benefit and present value (PVAB) aggregation
//! - Survival probabilities from mortality and improvement tables
//! - Parallel batch runs over a file of members

pub mod assumptions;
pub mod batch;
pub mod benefit;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use assumptions::{Assumptions, DataPaths, DeferredFactorTable, SalaryIncreaseRates};
pub use batch::{BatchRunner, MemberRecord};
pub use benefit::{BenefitCalculator, BenefitConfig, BenefitInputs, BenefitResult, Gender};
pub use config::PlanConfig;
pub use error::{PensionError, Result};
