//! Cross-cutting, non-owning aggregation views.

use crate::system::{NodeId, PowerSystem};

/// A read-only collection of references to nodes that belong to the primary
/// ownership tree, grouped by association rather than hierarchy (for example
/// "everything that makes up the analog front end", spread across several
/// rails).
///
/// A logical group never mutates or recomputes its members and is never
/// visited by the hierarchy walk; it re-sums the members' already-computed
/// figures when asked.
#[derive(Debug, Clone)]
pub struct LogicalGroup {
    name: String,
    members: Vec<NodeId>,
}

impl LogicalGroup {
    pub fn new(name: &str, members: Vec<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn add_member(&mut self, member: NodeId) {
        self.members.push(member);
    }

    /// Sum of the members' current total power, as last computed.
    pub fn total_power(&self, sys: &PowerSystem) -> f64 {
        self.members.iter().map(|&id| sys.node(id).total_power()).sum()
    }

    /// Sum of the members' current floor power, as last computed.
    pub fn inactive_power(&self, sys: &PowerSystem) -> f64 {
        self.members
            .iter()
            .map(|&id| sys.node(id).inactive_power())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::update_hierarchy;
    use crate::node::Component;
    use crate::variable::VariableSet;

    #[test]
    fn test_logical_group_resums_without_recomputing() {
        let mut sys = PowerSystem::new();
        let a = sys
            .add_component(Component::power("a", 4e-3, 1e-3, 0.5).unwrap())
            .unwrap();
        let b = sys
            .add_component(Component::power("b", 2e-3, 0.0, 1.0).unwrap())
            .unwrap();
        let group = LogicalGroup::new("view", vec![a, b]);
        // 2.5mW + 2mW from construction-time figures.
        assert!((group.total_power(&sys) - 4.5e-3).abs() < 1e-12);
        assert!((group.inactive_power(&sys) - 1e-3).abs() < 1e-12);

        // Members change; the view reflects it only after *they* recompute.
        let vars = VariableSet::new();
        if let Some(comp) = sys.node_mut(a).as_component_mut() {
            comp.set_duty_cycle(1.0).unwrap();
        }
        update_hierarchy(&mut sys, a, &vars).unwrap();
        assert!((group.total_power(&sys) - 6e-3).abs() < 1e-12);
    }
}
