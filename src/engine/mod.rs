//! The hierarchy engine: recomputation, name search, sweeps, and
//! target-seeking searches over a [`crate::system::PowerSystem`].
//!
//! Every entry point is synchronous and deterministic; routines that mutate
//! shared `Variable` state restore it before returning, including on error
//! paths, so logically independent calls compose without interference.

pub mod breakdown;
pub mod lifetime;
pub mod search;
pub mod sweep;
pub mod tune;
pub mod update;

pub use breakdown::{power_breakdown, BreakdownEntry};
pub use lifetime::{lifetime, sweep_lifetime, sweep_lifetime_2d, LifetimeGrid, LifetimeSeries, TimeUnit};
pub use search::{hierarchy_total_power, search_name, variable_usage};
pub use sweep::{
    attr_hierarchy_sweep, model_based_sweep, variable_sweep, variable_sweep_2d, Levels,
    ModelSweep, Sweep2d, SweepSeries,
};
pub use tune::{exchange_variable, tune_variable, ExchangeResult, PowerTarget, TuneResult};
pub use update::{recompute, scope_inactive_power, scope_total_power, update_hierarchy, Scope};
