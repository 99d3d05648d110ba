//! Leaf components of the power hierarchy.
//!
//! A [`Component`] is defined either directly in power terms or in
//! current-plus-rail-voltage terms; the representation is a sum type so a
//! field the active representation never populates cannot be read. Average
//! power follows the duty-cycle law unless a selected [`Model`] takes over
//! the aggregate figure entirely.

use std::collections::HashMap;

use tracing::warn;

use crate::error::{ModelError, Result};
use crate::model::Model;
use crate::node::{Attribute, Kind};
use crate::variable::VariableSet;

/// The mutually exclusive demand representation of a leaf component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Demand {
    /// Defined directly in watts.
    Power { active: f64, inactive: f64 },
    /// Defined in amperes at a rated rail voltage.
    CurrentVoltage {
        active: f64,
        inactive: f64,
        rail_voltage: f64,
    },
}

/// A leaf device in the hierarchy.
///
/// Invariants: active ≥ inactive ≥ 0 for the demand figures, duty cycle in
/// [0, 1], rail voltage non-negative. Setters that would break an invariant
/// reject the value and leave the component unchanged.
pub struct Component {
    name: String,
    demand: Demand,
    duty_cycle: f64,
    total_power: f64,
    total_current: Option<f64>,
    models: HashMap<String, Model>,
    current_model: Option<String>,
}

impl Component {
    /// A component defined in power terms (watts).
    pub fn power(name: &str, active_power: f64, inactive_power: f64, duty_cycle: f64) -> Result<Self> {
        validate_levels(active_power, inactive_power)?;
        validate_duty_cycle(duty_cycle)?;
        let mut component = Self {
            name: name.to_string(),
            demand: Demand::Power {
                active: active_power,
                inactive: inactive_power,
            },
            duty_cycle,
            total_power: 0.0,
            total_current: None,
            models: HashMap::new(),
            current_model: None,
        };
        component.apply_duty_cycle_law();
        Ok(component)
    }

    /// A component defined in current terms (amperes) at a rated rail voltage.
    pub fn current_voltage(
        name: &str,
        active_current: f64,
        inactive_current: f64,
        rail_voltage: f64,
        duty_cycle: f64,
    ) -> Result<Self> {
        validate_levels(active_current, inactive_current)?;
        validate_duty_cycle(duty_cycle)?;
        if rail_voltage < 0.0 {
            return Err(ModelError::OutOfRange {
                what: "rail voltage",
                value: rail_voltage,
            });
        }
        let mut component = Self {
            name: name.to_string(),
            demand: Demand::CurrentVoltage {
                active: active_current,
                inactive: inactive_current,
                rail_voltage,
            },
            duty_cycle,
            total_power: 0.0,
            total_current: None,
            models: HashMap::new(),
            current_model: None,
        };
        component.apply_duty_cycle_law();
        Ok(component)
    }

    /// Attach a set of models at construction time.
    pub fn with_models(mut self, models: Vec<Model>) -> Self {
        for model in models {
            self.add_model(model);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        match self.demand {
            Demand::Power { .. } => Kind::Power,
            Demand::CurrentVoltage { .. } => Kind::CurrentVoltage,
        }
    }

    pub fn demand(&self) -> Demand {
        self.demand
    }

    pub fn duty_cycle(&self) -> f64 {
        self.duty_cycle
    }

    /// Average power at the current operating point.
    pub fn total_power(&self) -> f64 {
        self.total_power
    }

    /// Average current; populated only for the current-voltage representation.
    pub fn total_current(&self) -> Option<f64> {
        self.total_current
    }

    /// Power at duty cycle 1 (current-voltage components derive it from the
    /// active current and rail voltage).
    pub fn active_power(&self) -> f64 {
        match self.demand {
            Demand::Power { active, .. } => active,
            Demand::CurrentVoltage {
                active, rail_voltage, ..
            } => active * rail_voltage,
        }
    }

    /// Floor power at duty cycle 0.
    pub fn inactive_power(&self) -> f64 {
        match self.demand {
            Demand::Power { inactive, .. } => inactive,
            Demand::CurrentVoltage {
                inactive,
                rail_voltage,
                ..
            } => inactive * rail_voltage,
        }
    }

    pub fn active_current(&self) -> Option<f64> {
        match self.demand {
            Demand::Power { .. } => None,
            Demand::CurrentVoltage { active, .. } => Some(active),
        }
    }

    pub fn inactive_current(&self) -> Option<f64> {
        match self.demand {
            Demand::Power { .. } => None,
            Demand::CurrentVoltage { inactive, .. } => Some(inactive),
        }
    }

    pub fn rail_voltage(&self) -> Option<f64> {
        match self.demand {
            Demand::Power { .. } => None,
            Demand::CurrentVoltage { rail_voltage, .. } => Some(rail_voltage),
        }
    }

    pub fn set_duty_cycle(&mut self, value: f64) -> Result<()> {
        validate_duty_cycle(value)?;
        self.duty_cycle = value;
        Ok(())
    }

    pub fn set_active_power(&mut self, value: f64) -> Result<()> {
        let Demand::Power { inactive, .. } = self.demand else {
            return Err(self.unsupported(Attribute::ActivePower));
        };
        validate_levels(value, inactive)?;
        self.demand = Demand::Power {
            active: value,
            inactive,
        };
        Ok(())
    }

    pub fn set_inactive_power(&mut self, value: f64) -> Result<()> {
        let Demand::Power { active, .. } = self.demand else {
            return Err(self.unsupported(Attribute::InactivePower));
        };
        validate_levels(active, value)?;
        self.demand = Demand::Power {
            active,
            inactive: value,
        };
        Ok(())
    }

    pub fn set_active_current(&mut self, value: f64) -> Result<()> {
        let Demand::CurrentVoltage {
            inactive,
            rail_voltage,
            ..
        } = self.demand
        else {
            return Err(self.unsupported(Attribute::ActiveCurrent));
        };
        validate_levels(value, inactive)?;
        self.demand = Demand::CurrentVoltage {
            active: value,
            inactive,
            rail_voltage,
        };
        Ok(())
    }

    pub fn set_inactive_current(&mut self, value: f64) -> Result<()> {
        let Demand::CurrentVoltage {
            active,
            rail_voltage,
            ..
        } = self.demand
        else {
            return Err(self.unsupported(Attribute::InactiveCurrent));
        };
        validate_levels(active, value)?;
        self.demand = Demand::CurrentVoltage {
            active,
            inactive: value,
            rail_voltage,
        };
        Ok(())
    }

    pub fn set_rail_voltage(&mut self, value: f64) -> Result<()> {
        let Demand::CurrentVoltage {
            active, inactive, ..
        } = self.demand
        else {
            return Err(self.unsupported(Attribute::RailVoltage));
        };
        if value < 0.0 {
            return Err(ModelError::OutOfRange {
                what: "rail voltage",
                value,
            });
        }
        self.demand = Demand::CurrentVoltage {
            active,
            inactive,
            rail_voltage: value,
        };
        Ok(())
    }

    /// Write the representation's aggregate figure directly: total power in
    /// the power representation, total current (with power re-derived from
    /// the rail voltage) in the current-voltage representation.
    pub fn set_total(&mut self, value: f64) {
        match self.demand {
            Demand::Power { .. } => self.total_power = value,
            Demand::CurrentVoltage { rail_voltage, .. } => {
                self.total_current = Some(value);
                self.total_power = value * rail_voltage;
            }
        }
    }

    /// Targeted attribute mutation. Each representation recognizes its own
    /// closed subset; anything else is a recoverable error with no mutation.
    pub fn set_attr(&mut self, attr: Attribute, value: f64) -> Result<()> {
        match (self.kind(), attr) {
            (Kind::Power, Attribute::TotalPower)
            | (Kind::CurrentVoltage, Attribute::TotalCurrent) => {
                self.set_total(value);
                Ok(())
            }
            (Kind::Power, Attribute::ActivePower) => self.set_active_power(value),
            (Kind::Power, Attribute::InactivePower) => self.set_inactive_power(value),
            (Kind::CurrentVoltage, Attribute::ActiveCurrent) => self.set_active_current(value),
            (Kind::CurrentVoltage, Attribute::InactiveCurrent) => self.set_inactive_current(value),
            (Kind::CurrentVoltage, Attribute::RailVoltage) => self.set_rail_voltage(value),
            (_, Attribute::DutyCycle) => self.set_duty_cycle(value),
            (_, attr) => Err(self.unsupported(attr)),
        }
    }

    /// Targeted attribute read; only the aggregate figures are exposed.
    pub fn get_attr(&self, attr: Attribute) -> Result<f64> {
        match attr {
            Attribute::TotalPower => Ok(self.total_power),
            Attribute::TotalCurrent => self
                .total_current
                .ok_or_else(|| self.unsupported(Attribute::TotalCurrent)),
            attr => Err(self.unsupported(attr)),
        }
    }

    pub fn add_model(&mut self, model: Model) {
        self.models.insert(model.name().to_string(), model);
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// Remove a model; a matching selection is cleared with it.
    pub fn remove_model(&mut self, name: &str) -> Option<Model> {
        if self.current_model.as_deref() == Some(name) {
            self.current_model = None;
        }
        self.models.remove(name)
    }

    /// Select the named model to drive the next recomputation. Takes effect
    /// at the next update pass.
    pub fn select_model(&mut self, name: &str) -> Result<()> {
        if !self.models.contains_key(name) {
            return Err(ModelError::UnknownModel {
                component: self.name.clone(),
                model: name.to_string(),
            });
        }
        self.current_model = Some(name.to_string());
        Ok(())
    }

    pub fn clear_model_selection(&mut self) {
        self.current_model = None;
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.current_model.as_deref()
    }

    pub fn has_selected_model(&self) -> bool {
        self.current_model.is_some()
    }

    /// Evaluate the selected model and write its result to the model's
    /// target attribute. No selected model is a recoverable error. A rejected
    /// result is reported and the write skipped.
    pub fn run_model(&mut self, vars: &VariableSet) -> Result<f64> {
        let Some(name) = self.current_model.clone() else {
            return Err(ModelError::NoModelSelected(self.name.clone()));
        };
        let model = self
            .models
            .get(&name)
            .ok_or_else(|| ModelError::UnknownModel {
                component: self.name.clone(),
                model: name.clone(),
            })?;
        let target = model.target();
        let value = model.evaluate(vars);
        if let Err(err) = self.set_attr(target, value) {
            warn!(component = %self.name, model = %name, %err, "model output rejected");
        }
        Ok(value)
    }

    /// Single-node power update (not recursive).
    ///
    /// With a selected model the model runs first; the duty-cycle law is then
    /// reapplied unless the model targets the representation's aggregate
    /// figure, in which case the model fully determines the result.
    pub fn update_total_power(&mut self, vars: &VariableSet) {
        if self.current_model.is_some() {
            let aggregate = match self.kind() {
                Kind::Power => Attribute::TotalPower,
                Kind::CurrentVoltage => Attribute::TotalCurrent,
            };
            let target = self
                .current_model
                .as_ref()
                .and_then(|name| self.models.get(name))
                .map(Model::target);
            if self.run_model(vars).is_ok() && target == Some(aggregate) {
                return;
            }
        }
        self.apply_duty_cycle_law();
    }

    /// `total = inactive + (active − inactive) × duty_cycle`, in the current
    /// domain for the current-voltage representation.
    fn apply_duty_cycle_law(&mut self) {
        match self.demand {
            Demand::Power { active, inactive } => {
                self.total_power = inactive + (active - inactive) * self.duty_cycle;
            }
            Demand::CurrentVoltage {
                active,
                inactive,
                rail_voltage,
            } => {
                let total_current = inactive + (active - inactive) * self.duty_cycle;
                self.total_current = Some(total_current);
                self.total_power = rail_voltage * total_current;
            }
        }
    }

    fn unsupported(&self, attribute: Attribute) -> ModelError {
        ModelError::UnsupportedAttribute {
            node: self.name.clone(),
            attribute,
        }
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("demand", &self.demand)
            .field("duty_cycle", &self.duty_cycle)
            .field("total_power", &self.total_power)
            .field("current_model", &self.current_model)
            .finish_non_exhaustive()
    }
}

fn validate_levels(active: f64, inactive: f64) -> Result<()> {
    if inactive < 0.0 {
        return Err(ModelError::OutOfRange {
            what: "inactive level",
            value: inactive,
        });
    }
    if active < inactive {
        return Err(ModelError::ActiveBelowInactive { active, inactive });
    }
    Ok(())
}

fn validate_duty_cycle(value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ModelError::DutyCycleOutOfBounds(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_power_duty_cycle_law() {
        let comp = Component::power("radio", 10e-3, 2e-3, 0.5).unwrap();
        assert!((comp.total_power() - 6e-3).abs() < 1e-12);
        assert_eq!(comp.total_current(), None);
    }

    #[test]
    fn test_current_voltage_duty_cycle_law() {
        let comp = Component::current_voltage("afe", 10e-3, 1e-3, 1.2, 0.5).unwrap();
        // 1mA + 9mA * 0.5 = 5.5mA at 1.2V = 6.6mW
        assert!((comp.total_current().unwrap() - 5.5e-3).abs() < 1e-12);
        assert!((comp.total_power() - 6.6e-3).abs() < 1e-12);
        assert!((comp.inactive_power() - 1.2e-3).abs() < 1e-12);
    }

    #[test]
    fn test_rejected_setters_leave_state_unchanged() {
        let mut comp = Component::power("radio", 10e-3, 2e-3, 0.5).unwrap();
        assert!(comp.set_duty_cycle(1.5).is_err());
        assert_eq!(comp.duty_cycle(), 0.5);
        assert!(comp.set_active_power(1e-3).is_err()); // below inactive
        assert!((comp.active_power() - 10e-3).abs() < 1e-12);
        assert!(comp.set_inactive_power(-1.0).is_err());
        assert!((comp.inactive_power() - 2e-3).abs() < 1e-12);
    }

    #[test]
    fn test_attr_dispatch_per_representation() {
        let mut power = Component::power("p", 1.0, 0.1, 0.0).unwrap();
        assert!(power.set_attr(Attribute::ActivePower, 2.0).is_ok());
        assert!(matches!(
            power.set_attr(Attribute::ActiveCurrent, 1.0),
            Err(ModelError::UnsupportedAttribute { .. })
        ));

        let mut iv = Component::current_voltage("iv", 1.0, 0.1, 3.3, 0.0).unwrap();
        assert!(iv.set_attr(Attribute::ActiveCurrent, 2.0).is_ok());
        assert!(iv.set_attr(Attribute::ActivePower, 1.0).is_err());
    }

    #[test]
    fn test_set_total_derives_power_from_current() {
        let mut iv = Component::current_voltage("iv", 1.0, 0.1, 2.0, 0.0).unwrap();
        iv.set_attr(Attribute::TotalCurrent, 0.25).unwrap();
        assert_eq!(iv.total_current(), Some(0.25));
        assert!((iv.total_power() - 0.5).abs() < 1e-12);
        assert!((iv.get_attr(Attribute::TotalPower).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_model_targeting_duty_cycle_reapplies_law() {
        use crate::variable::{Variable, VariableSet};

        let mut vars = VariableSet::new();
        vars.insert(Variable::fixed("rate", 0.25)).unwrap();
        let model = Model::new("rate_to_duty", &["rate"], Attribute::DutyCycle, |vars| {
            vars.value("rate").unwrap_or(0.0)
        });
        let mut comp = Component::power("radio", 10e-3, 2e-3, 1.0)
            .unwrap()
            .with_models(vec![model]);
        comp.select_model("rate_to_duty").unwrap();
        comp.update_total_power(&vars);
        assert!((comp.duty_cycle() - 0.25).abs() < 1e-12);
        assert!((comp.total_power() - 4e-3).abs() < 1e-12);
    }

    #[test]
    fn test_model_targeting_aggregate_skips_law() {
        use crate::variable::{Variable, VariableSet};

        let mut vars = VariableSet::new();
        vars.insert(Variable::fixed("p", 42e-3)).unwrap();
        let model = Model::new("direct", &["p"], Attribute::TotalPower, |vars| {
            vars.value("p").unwrap_or(0.0)
        });
        // Duty law alone would give 2mW; the model overrides the aggregate.
        let mut comp = Component::power("radio", 10e-3, 2e-3, 0.0)
            .unwrap()
            .with_models(vec![model]);
        comp.select_model("direct").unwrap();
        comp.update_total_power(&vars);
        assert!((comp.total_power() - 42e-3).abs() < 1e-12);
    }

    #[test]
    fn test_run_model_without_selection() {
        let vars = VariableSet::new();
        let mut comp = Component::power("radio", 1.0, 0.0, 0.5).unwrap();
        assert!(matches!(
            comp.run_model(&vars),
            Err(ModelError::NoModelSelected(_))
        ));
    }

    #[test]
    fn test_remove_model_clears_selection() {
        let model = Model::new("m", &[], Attribute::DutyCycle, |_| 0.5);
        let mut comp = Component::power("c", 1.0, 0.0, 0.0)
            .unwrap()
            .with_models(vec![model]);
        comp.select_model("m").unwrap();
        comp.remove_model("m");
        assert!(!comp.has_selected_model());
    }

    proptest! {
        #[test]
        fn prop_duty_cycle_law_holds(
            inactive in 0.0f64..1.0,
            headroom in 0.0f64..1.0,
            duty in 0.0f64..=1.0,
        ) {
            let active = inactive + headroom;
            let comp = Component::power("c", active, inactive, duty).unwrap();
            let expected = inactive + (active - inactive) * duty;
            prop_assert!((comp.total_power() - expected).abs() < 1e-12);
        }
    }
}
