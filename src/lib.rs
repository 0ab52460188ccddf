//! costctl library
//!
//! Cost estimation for container apps billed per vCPU-second and
//! GiB-second: weekly schedules, pricing resolution, cost calculation,
//! persisted multi-app estimates and CSV/HTML export.

pub mod catalog;
pub mod config;
pub mod cost;
pub mod error;
pub mod exit_codes;
pub mod export;
pub mod pricing;
pub mod schedule;
pub mod state;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use cost::{calculate_costs, CostResult, EstimateTotals, FreeTierAllowance, UnitRates};
pub use error::{ConfigError, CostctlError, Result};
pub use pricing::{PricingCatalog, PricingConfig};
pub use schedule::{expand_steps, ScheduleStep, WeeklySchedule};
pub use state::{EstimateState, StateChange, StateStore};
