//! Parameter sweeps over the hierarchy.
//!
//! Variable-based sweeps follow a strict save/restore discipline: the swept
//! variable's resting value is reinstated before returning, on error paths
//! included, so successive sweeps never interfere. The attribute sweep is
//! the documented exception — it leaves the targeted node at the last swept
//! value.

use serde::Serialize;
use tracing::warn;

use crate::engine::search::{hierarchy_total_power, search_name};
use crate::engine::update::{recompute, update_hierarchy, Scope};
use crate::error::{ModelError, Result};
use crate::model::Model;
use crate::node::Attribute;
use crate::system::{NodeId, PowerSystem};
use crate::variable::VariableSet;

/// How many hierarchy levels an attribute sweep reports per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Levels {
    /// The full path, target through queried root inclusive.
    All,
    /// The first `n` levels starting at the target.
    Count(usize),
}

/// Index-aligned result of a 1-D variable sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSeries {
    pub values: Vec<f64>,
    pub powers: Vec<f64>,
}

/// Result of a 2-D variable sweep; `powers[i2][i1]` pairs
/// `values2[i2]` with `values1[i1]`.
#[derive(Debug, Clone, Serialize)]
pub struct Sweep2d {
    pub values1: Vec<f64>,
    pub values2: Vec<f64>,
    pub powers: Vec<Vec<f64>>,
}

/// Result of a model-based sweep: the swept variable grid, the model output
/// at each point, and the per-level power rows from driving those outputs
/// through the hierarchy.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSweep {
    pub values: Vec<f64>,
    pub outputs: Vec<f64>,
    pub powers: Vec<Vec<f64>>,
}

/// Sweep a variable across its grid and record the scope's total power at
/// each point. The hierarchy is fully recomputed per point; the variable is
/// restored to its resting value before returning.
pub fn variable_sweep(
    sys: &mut PowerSystem,
    scope: Scope<'_>,
    vars: &mut VariableSet,
    variable: &str,
) -> Result<SweepSeries> {
    let original = vars.require(variable)?;
    let values = vars.regenerate_sweep(variable)?;
    let mut powers = Vec::with_capacity(values.len());
    let mut failure = None;
    for &value in &values {
        vars.set_value(variable, value)?;
        match recompute(sys, scope, vars) {
            Ok(power) => powers.push(power),
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    vars.set_value(variable, original)?;
    match failure {
        Some(err) => Err(err),
        None => Ok(SweepSeries { values, powers }),
    }
}

/// Nested 2-D sweep: outer loop over `variable2`, inner 1-D sweep over
/// `variable1`. Both variables are restored (the inner call restores
/// `variable1` on every outer iteration).
pub fn variable_sweep_2d(
    sys: &mut PowerSystem,
    scope: Scope<'_>,
    vars: &mut VariableSet,
    variable1: &str,
    variable2: &str,
) -> Result<Sweep2d> {
    let values1 = vars.regenerate_sweep(variable1)?;
    let original2 = vars.require(variable2)?;
    let values2 = vars.regenerate_sweep(variable2)?;
    let mut powers = Vec::with_capacity(values2.len());
    let mut failure = None;
    for &value2 in &values2 {
        vars.set_value(variable2, value2)?;
        match variable_sweep(sys, scope, vars, variable1) {
            Ok(series) => powers.push(series.powers),
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    vars.set_value(variable2, original2)?;
    match failure {
        Some(err) => Err(err),
        None => Ok(Sweep2d {
            values1,
            values2,
            powers,
        }),
    }
}

/// Sweep a named node's attribute across an explicit value sequence and
/// report per-level total powers (leaf → ancestor → root) for each point.
///
/// `levels` is validated against the located depth: the full reportable path
/// is target..=root inclusive, and asking for more fails fast. A value the
/// node rejects is reported and skipped — the row is still collected at the
/// prior state. The node is deliberately left at the last swept value
/// (unlike the variable sweeps, which restore).
pub fn attr_hierarchy_sweep(
    sys: &mut PowerSystem,
    root: NodeId,
    vars: &VariableSet,
    name: &str,
    attr: Attribute,
    values: &[f64],
    levels: Levels,
) -> Result<Vec<Vec<f64>>> {
    let (depth, target) = search_name(sys, root, name)
        .ok_or_else(|| ModelError::NodeNotFound(name.to_string()))?;
    let available = depth + 2;
    let keep = match levels {
        Levels::All => available,
        Levels::Count(n) if n > available => {
            return Err(ModelError::InvalidLevelCount {
                requested: n,
                available,
            })
        }
        Levels::Count(n) => n,
    };
    let mut rows = Vec::with_capacity(values.len());
    for &value in values {
        if let Err(err) = sys.node_mut(target).set_attr(attr, value) {
            warn!(node = name, %err, "attribute value rejected during sweep");
        }
        update_hierarchy(sys, root, vars)?;
        let mut row = hierarchy_total_power(sys, root, name)
            .ok_or_else(|| ModelError::NodeNotFound(name.to_string()))?;
        row.push(sys.node(root).total_power());
        row.truncate(keep);
        rows.push(row);
    }
    Ok(rows)
}

/// Sweep a variable through an equation-based model and drive the model's
/// outputs through the hierarchy: returns the variable grid, the model
/// output at each point, and the per-level power rows.
pub fn model_based_sweep(
    sys: &mut PowerSystem,
    root: NodeId,
    vars: &mut VariableSet,
    name: &str,
    model: &Model,
    variable: &str,
    levels: Levels,
) -> Result<ModelSweep> {
    let (values, outputs) = model.sweep_function(vars, variable)?;
    let powers = attr_hierarchy_sweep(sys, root, vars, name, model.target(), &outputs, levels)?;
    Ok(ModelSweep {
        values,
        outputs,
        powers,
    })
}
