//! Named scalar parameters with optional linear sweep ranges.
//!
//! A [`Variable`] is the unit of design-space exploration: a model parameter
//! with a resting value and, optionally, an arithmetic grid it can be swept
//! over. Variables are owned by the caller in a [`VariableSet`]; nodes and
//! models refer to them by name only, so the sweep driver alone decides when
//! values change and when they are restored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Arithmetic sweep range. The grid runs from `start` towards `stop` in
/// increments of `step` and includes `stop` when it lands on the step lattice
/// (to within one part in 1e9 of a step). A negative step descends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

/// A named scalar with an optional sweep range.
///
/// The materialized grid in `sweep_values` is only valid after an explicit
/// [`Variable::regenerate_sweep`] call; editing the range does not refresh it.
/// Sweep drivers regenerate before reading size or values.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    value: f64,
    range: Option<SweepRange>,
    unit: Option<String>,
    sweep_values: Vec<f64>,
}

impl Variable {
    /// A variable with a resting value and no sweep range.
    pub fn fixed(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            range: None,
            unit: None,
            sweep_values: Vec::new(),
        }
    }

    /// A variable with a resting value and a sweep range.
    pub fn swept(name: &str, value: f64, start: f64, stop: f64, step: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            range: Some(SweepRange { start, stop, step }),
            unit: None,
            sweep_values: Vec::new(),
        }
    }

    /// Attach a unit label (display only; no bearing on numeric state).
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn range(&self) -> Option<SweepRange> {
        self.range
    }

    pub fn set_range(&mut self, range: SweepRange) {
        self.range = Some(range);
    }

    /// Rebuild the materialized grid from the current range.
    pub fn regenerate_sweep(&mut self) -> Result<&[f64]> {
        let range = self
            .range
            .ok_or_else(|| ModelError::NoSweepRange(self.name.clone()))?;
        if range.step == 0.0 || !range.step.is_finite() {
            return Err(ModelError::InvalidSweepStep {
                variable: self.name.clone(),
                step: range.step,
            });
        }
        let tolerance = range.step.abs() * 1e-9;
        let mut values = Vec::new();
        let mut k = 0u64;
        loop {
            let v = range.start + k as f64 * range.step;
            let past_stop = if range.step > 0.0 {
                v > range.stop + tolerance
            } else {
                v < range.stop - tolerance
            };
            if past_stop {
                break;
            }
            values.push(v);
            k += 1;
        }
        self.sweep_values = values;
        Ok(&self.sweep_values)
    }

    /// The grid from the last [`Variable::regenerate_sweep`] call.
    pub fn sweep_values(&self) -> &[f64] {
        &self.sweep_values
    }

    pub fn sweep_len(&self) -> usize {
        self.sweep_values.len()
    }
}

/// Caller-owned store of [`Variable`]s keyed by unique name.
#[derive(Debug, Default)]
pub struct VariableSet {
    vars: HashMap<String, Variable>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, rejecting duplicate names.
    pub fn insert(&mut self, var: Variable) -> Result<()> {
        if self.vars.contains_key(var.name()) {
            return Err(ModelError::DuplicateVariable(var.name().to_string()));
        }
        self.vars.insert(var.name().to_string(), var);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.vars.get_mut(name)
    }

    /// Current value of a variable, if present.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.vars.get(name).map(Variable::value)
    }

    /// Current value of a variable that must exist.
    pub fn require(&self, name: &str) -> Result<f64> {
        self.value(name)
            .ok_or_else(|| ModelError::UnknownVariable(name.to_string()))
    }

    pub fn set_value(&mut self, name: &str, value: f64) -> Result<()> {
        self.vars
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownVariable(name.to_string()))?
            .set_value(value);
        Ok(())
    }

    /// Regenerate and return a variable's sweep grid.
    pub fn regenerate_sweep(&mut self, name: &str) -> Result<Vec<f64>> {
        let var = self
            .vars
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownVariable(name.to_string()))?;
        Ok(var.regenerate_sweep()?.to_vec())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }
}
