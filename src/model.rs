//! Equation-based models feeding node attributes.
//!
//! A [`Model`] wraps a user-supplied pure function over the [`VariableSet`]
//! and names the attribute of its owning node the result is written to. This
//! is how abstract design parameters (a sampling rate, a transmit interval)
//! become concrete duty cycles, currents, or powers during recomputation.

use std::fmt;

use crate::error::Result;
use crate::node::Attribute;
use crate::variable::VariableSet;

/// The function signature a model evaluates: a total map from the variable
/// set to one scalar.
pub type ModelFn = Box<dyn Fn(&VariableSet) -> f64 + Send + Sync>;

/// A named pure function over a set of variables, tagged with the attribute
/// of the owning node it feeds. Immutable after construction.
pub struct Model {
    name: String,
    inputs: Vec<String>,
    target: Attribute,
    function: ModelFn,
}

impl Model {
    pub fn new<F>(name: &str, inputs: &[&str], target: Attribute, function: F) -> Self
    where
        F: Fn(&VariableSet) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            target,
            function: Box::new(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Which attribute of the owning node the result is written to.
    pub fn target(&self) -> Attribute {
        self.target
    }

    /// Names of the variables this model reads.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Evaluate the model against the current variable values.
    pub fn evaluate(&self, vars: &VariableSet) -> f64 {
        (self.function)(vars)
    }

    /// Sweep one input variable across its grid and collect the model output
    /// at each point. The variable is restored to its resting value before
    /// returning.
    pub fn sweep_function(
        &self,
        vars: &mut VariableSet,
        variable: &str,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        let original = vars.require(variable)?;
        let values = vars.regenerate_sweep(variable)?;
        let mut outputs = Vec::with_capacity(values.len());
        for &value in &values {
            vars.set_value(variable, value)?;
            outputs.push(self.evaluate(vars));
        }
        vars.set_value(variable, original)?;
        Ok((values, outputs))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
