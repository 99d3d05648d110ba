//! Target-seeking searches: tune one variable to hit a power target, or
//! trade two variables off against each other at constant power.
//!
//! Both are nearest-grid-point searches over swept ranges — no interpolation
//! or bisection — so accuracy is bounded by the variables' step sizes, and a
//! monotonic power-vs-variable relationship is assumed, not verified.

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::sweep::variable_sweep;
use crate::engine::update::{recompute, scope_inactive_power, scope_total_power, Scope};
use crate::error::{ModelError, Result};
use crate::system::PowerSystem;
use crate::variable::VariableSet;

/// The power level a tune aims for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerTarget {
    /// An absolute level in watts.
    Absolute(f64),
    /// A multiple of the hierarchy's floor (inactive) power.
    RelativeToFloor(f64),
}

/// Outcome of a [`tune_variable`] call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TuneResult {
    /// The grid value the variable was left at.
    pub value: f64,
    /// Total power of the tuned scope at that value.
    pub scope_power: f64,
    /// Total power of the full hierarchy at that value.
    pub hierarchy_power: f64,
    /// The resolved target in watts.
    pub target_power: f64,
}

/// Index-aligned matches from an [`exchange_variable`] call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExchangeResult {
    pub variable1: Vec<f64>,
    pub variable2: Vec<f64>,
    /// Signed deviation from the target at each match.
    pub deviation: Vec<f64>,
}

/// Sweep `variable` over `scope` and set it to the grid value whose power
/// lands nearest the target, then recompute both the scope and the full
/// hierarchy at that value.
///
/// The scan is linear: the first grid point seeds the best match and only a
/// strictly smaller absolute deviation replaces it, so ties keep the
/// earliest point. The variable is deliberately left at the winning value.
///
/// A relative target multiplies the hierarchy scope's floor power as last
/// computed — callers are expected to have updated the hierarchy beforehand.
pub fn tune_variable(
    sys: &mut PowerSystem,
    hierarchy: Scope<'_>,
    scope: Scope<'_>,
    vars: &mut VariableSet,
    variable: &str,
    target: PowerTarget,
) -> Result<TuneResult> {
    let target_power = match target {
        PowerTarget::Absolute(power) => power,
        PowerTarget::RelativeToFloor(multiple) => multiple * scope_inactive_power(sys, hierarchy),
    };
    let series = variable_sweep(sys, scope, vars, variable)?;
    if series.powers.is_empty() {
        warn!(variable, "tune: sweep produced no grid points");
        return Err(ModelError::EmptySweep(variable.to_string()));
    }
    let best = series
        .powers
        .iter()
        .position_min_by_key(|&&power| OrderedFloat((power - target_power).abs()))
        .unwrap_or(0);
    let value = series.values[best];
    vars.set_value(variable, value)?;
    recompute(sys, scope, vars)?;
    let hierarchy_power = recompute(sys, hierarchy, vars)?;
    Ok(TuneResult {
        value,
        scope_power: scope_total_power(sys, scope),
        hierarchy_power,
        target_power,
    })
}

/// For every grid value of `variable1`, sweep `variable2` and keep the sweep
/// point nearest the target if it lands within `delta`; grid values with no
/// point inside the tolerance contribute no row. Both variables are restored
/// to their resting values on every return path.
///
/// Zero matches and exactly one match across the whole grid are reported as
/// informational outcomes, not errors.
pub fn exchange_variable(
    sys: &mut PowerSystem,
    scope: Scope<'_>,
    vars: &mut VariableSet,
    variable1: &str,
    variable2: &str,
    target_power: f64,
    delta: f64,
) -> Result<ExchangeResult> {
    let original1 = vars.require(variable1)?;
    let original2 = vars.require(variable2)?;
    let values1 = vars.regenerate_sweep(variable1)?;
    let mut result = ExchangeResult::default();
    let mut failure = None;
    for &value1 in &values1 {
        vars.set_value(variable1, value1)?;
        let series = match variable_sweep(sys, scope, vars, variable2) {
            Ok(series) => series,
            Err(err) => {
                failure = Some(err);
                break;
            }
        };
        let Some(best) = series
            .powers
            .iter()
            .position_min_by_key(|&&power| OrderedFloat((power - target_power).abs()))
        else {
            continue;
        };
        let deviation = series.powers[best] - target_power;
        if deviation.abs() <= delta {
            result.variable1.push(value1);
            result.variable2.push(series.values[best]);
            result.deviation.push(deviation);
        }
    }
    vars.set_value(variable1, original1)?;
    vars.set_value(variable2, original2)?;
    if let Some(err) = failure {
        return Err(err);
    }
    match result.variable1.len() {
        0 => warn!(
            target = target_power,
            delta, "exchange: target power not achievable on the swept grids"
        ),
        1 => info!(
            variable1 = result.variable1[0],
            variable2 = result.variable2[0],
            "exchange: target power achievable at a single point"
        ),
        _ => {}
    }
    Ok(result)
}
