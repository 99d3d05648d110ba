//! Operating modes: named model selections applied as one step.
//!
//! A [`Mode`] bundles the per-component model choices that make up a system
//! operating point (for example "sensing" versus "transmitting"), so the
//! whole hierarchy can be moved between points with one call.

use tracing::info;

use crate::engine::update_hierarchy;
use crate::error::{ModelError, Result};
use crate::system::{Node, NodeId, PowerSystem};
use crate::variable::VariableSet;

/// One component's model choice inside a mode.
#[derive(Debug, Clone)]
pub struct ModelSelection {
    pub component: NodeId,
    pub model: String,
}

/// A named operating point: which model each participating component runs,
/// plus an optional duty factor for bookkeeping.
#[derive(Debug, Clone)]
pub struct Mode {
    name: String,
    selections: Vec<ModelSelection>,
    duty_factor: f64,
    total_power: f64,
}

impl Mode {
    pub fn new(name: &str, selections: Vec<ModelSelection>) -> Self {
        Self {
            name: name.to_string(),
            selections,
            duty_factor: 0.0,
            total_power: 0.0,
        }
    }

    pub fn with_duty_factor(mut self, duty_factor: f64) -> Self {
        self.duty_factor = duty_factor;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duty_factor(&self) -> f64 {
        self.duty_factor
    }

    /// System power recorded by the last [`Mode::apply`] call.
    pub fn total_power(&self) -> f64 {
        self.total_power
    }

    /// Move the system to this operating point: select each component's
    /// model, recompute the hierarchy, and record the resulting total power.
    pub fn apply(
        &mut self,
        sys: &mut PowerSystem,
        root: NodeId,
        vars: &VariableSet,
    ) -> Result<f64> {
        for selection in &self.selections {
            match sys.node_mut(selection.component) {
                Node::Component(c) => c.select_model(&selection.model)?,
                node => return Err(ModelError::NotAComponent(node.name().to_string())),
            }
        }
        update_hierarchy(sys, root, vars)?;
        self.total_power = sys.node(root).total_power();
        info!(
            mode = %self.name,
            system = sys.node(root).name(),
            power = self.total_power,
            "mode applied"
        );
        Ok(self.total_power)
    }
}

/// Apply each mode in turn and average the resulting system powers.
pub fn average_mode_power(
    modes: &mut [Mode],
    sys: &mut PowerSystem,
    root: NodeId,
    vars: &VariableSet,
) -> Result<f64> {
    if modes.is_empty() {
        return Err(ModelError::EmptyModeList);
    }
    let mut sum = 0.0;
    for mode in modes.iter_mut() {
        sum += mode.apply(sys, root, vars)?;
    }
    Ok(sum / modes.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::node::{Attribute, Component, ComponentGroup};
    use crate::variable::VariableSet;

    fn bimodal_component(name: &str) -> Component {
        let idle = Model::new("idle", &[], Attribute::DutyCycle, |_| 0.0);
        let busy = Model::new("busy", &[], Attribute::DutyCycle, |_| 1.0);
        Component::power(name, 10e-3, 0.0, 0.5)
            .unwrap()
            .with_models(vec![idle, busy])
    }

    fn build() -> (PowerSystem, NodeId, NodeId) {
        let mut sys = PowerSystem::new();
        let top = sys.add_group(ComponentGroup::power("top")).unwrap();
        let radio = sys.add_component(bimodal_component("radio")).unwrap();
        sys.attach(top, radio).unwrap();
        (sys, top, radio)
    }

    #[test]
    fn test_mode_applies_selections_and_records_power() {
        let (mut sys, top, radio) = build();
        let vars = VariableSet::new();
        let mut tx = Mode::new(
            "transmit",
            vec![ModelSelection {
                component: radio,
                model: "busy".to_string(),
            }],
        );
        let power = tx.apply(&mut sys, top, &vars).unwrap();
        assert!((power - 10e-3).abs() < 1e-12);
        assert_eq!(tx.total_power(), power);
        let comp = sys.node(radio).as_component().unwrap();
        assert_eq!(comp.selected_model(), Some("busy"));
    }

    #[test]
    fn test_unknown_model_in_mode() {
        let (mut sys, top, radio) = build();
        let vars = VariableSet::new();
        let mut mode = Mode::new(
            "broken",
            vec![ModelSelection {
                component: radio,
                model: "missing".to_string(),
            }],
        );
        assert!(matches!(
            mode.apply(&mut sys, top, &vars),
            Err(ModelError::UnknownModel { .. })
        ));
    }

    #[test]
    fn test_average_mode_power() {
        let (mut sys, top, radio) = build();
        let vars = VariableSet::new();
        let mut modes = vec![
            Mode::new(
                "sleep",
                vec![ModelSelection {
                    component: radio,
                    model: "idle".to_string(),
                }],
            ),
            Mode::new(
                "transmit",
                vec![ModelSelection {
                    component: radio,
                    model: "busy".to_string(),
                }],
            ),
        ];
        let average = average_mode_power(&mut modes, &mut sys, top, &vars).unwrap();
        assert!((average - 5e-3).abs() < 1e-12);
    }

    #[test]
    fn test_average_of_nothing_rejected() {
        let (mut sys, top, _) = build();
        let vars = VariableSet::new();
        assert!(matches!(
            average_mode_power(&mut [], &mut sys, top, &vars),
            Err(ModelError::EmptyModeList)
        ));
    }
}
