//! Bottom-up hierarchy recomputation.

use tracing::debug;

use crate::error::Result;
use crate::node::{ChildLoad, LogicalGroup};
use crate::system::{Node, NodeId, PowerSystem};
use crate::variable::VariableSet;

/// What a sweep or search operates over: a node of the ownership tree, or a
/// caller-owned logical view.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    Node(NodeId),
    Logical(&'a LogicalGroup),
}

impl From<NodeId> for Scope<'_> {
    fn from(id: NodeId) -> Self {
        Scope::Node(id)
    }
}

/// Recompute every descendant of `root` bottom-up.
///
/// For a composite: clear its traversal cache, update leaf children with
/// their single-node law, recurse into composite children first so their own
/// aggregation is current, then aggregate this node over the recorded
/// children (plain sum for groups, efficiency derating for regulators). A
/// rail-consistency violation found during aggregation halts the whole pass.
///
/// Idempotent: a second call with no intervening mutation reproduces the
/// same figures. Called on a leaf it degenerates to the leaf's own update.
pub fn update_hierarchy(sys: &mut PowerSystem, root: NodeId, vars: &VariableSet) -> Result<()> {
    if matches!(sys.node(root), Node::Component(_)) {
        if let Node::Component(c) = sys.node_mut(root) {
            c.update_total_power(vars);
        }
        return Ok(());
    }

    let children = sys.node(root).children().to_vec();
    if let Some(cache) = sys.node_mut(root).cache_mut() {
        cache.clear();
    }

    // Three category passes, mirroring the cache partition order.
    for &child in &children {
        if matches!(sys.node(child), Node::Component(_)) {
            if let Node::Component(c) = sys.node_mut(child) {
                c.update_total_power(vars);
            }
            if let Some(cache) = sys.node_mut(root).cache_mut() {
                cache.components.push(child);
            }
        }
    }
    for &child in &children {
        if matches!(sys.node(child), Node::Group(_)) {
            update_hierarchy(sys, child, vars)?;
            if let Some(cache) = sys.node_mut(root).cache_mut() {
                cache.groups.push(child);
            }
        }
    }
    for &child in &children {
        if matches!(sys.node(child), Node::Regulator(_)) {
            update_hierarchy(sys, child, vars)?;
            if let Some(cache) = sys.node_mut(root).cache_mut() {
                cache.regulators.push(child);
            }
        }
    }

    let loads = collect_loads(sys, root);
    debug!(node = sys.node(root).name(), children = loads.len(), "aggregating");
    match sys.node_mut(root) {
        Node::Group(g) => g.aggregate(&loads)?,
        Node::Regulator(r) => r.aggregate(&loads)?,
        Node::Component(_) => {}
    }
    Ok(())
}

fn collect_loads(sys: &PowerSystem, id: NodeId) -> Vec<ChildLoad> {
    let Some(cache) = sys.node(id).cache() else {
        return Vec::new();
    };
    cache
        .components
        .iter()
        .chain(&cache.groups)
        .chain(&cache.regulators)
        .map(|&child| {
            let node = sys.node(child);
            ChildLoad {
                name: node.name().to_string(),
                total_power: node.total_power(),
                inactive_power: node.inactive_power(),
                rail_voltage: node.upstream_rail(),
            }
        })
        .collect()
}

/// Refresh a scope and return its total power: a composite gets the full
/// bottom-up pass, a bare component its single-node update, and a logical
/// group a refresh of each member followed by the lazy re-sum (the view
/// itself is never aggregated by the tree walk).
pub fn recompute(sys: &mut PowerSystem, scope: Scope<'_>, vars: &VariableSet) -> Result<f64> {
    match scope {
        Scope::Node(id) => {
            update_hierarchy(sys, id, vars)?;
            Ok(sys.node(id).total_power())
        }
        Scope::Logical(group) => {
            for &member in group.members() {
                update_hierarchy(sys, member, vars)?;
            }
            Ok(group.total_power(sys))
        }
    }
}

/// Current total power of a scope, as last computed.
pub fn scope_total_power(sys: &PowerSystem, scope: Scope<'_>) -> f64 {
    match scope {
        Scope::Node(id) => sys.node(id).total_power(),
        Scope::Logical(group) => group.total_power(sys),
    }
}

/// Current floor (inactive) power of a scope, as last computed.
pub fn scope_inactive_power(sys: &PowerSystem, scope: Scope<'_>) -> f64 {
    match scope {
        Scope::Node(id) => sys.node(id).inactive_power(),
        Scope::Logical(group) => group.inactive_power(sys),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Component, ComponentGroup, VoltageRegulator};
    use proptest::prelude::*;

    fn build_nested(sys: &mut PowerSystem, duties: [f64; 3]) -> NodeId {
        let top = sys.add_group(ComponentGroup::power("top")).unwrap();
        let sub = sys.add_group(ComponentGroup::power("sub")).unwrap();
        let a = sys
            .add_component(Component::power("a", 10e-3, 1e-3, duties[0]).unwrap())
            .unwrap();
        let b = sys
            .add_component(Component::power("b", 4e-3, 0.0, duties[1]).unwrap())
            .unwrap();
        let c = sys
            .add_component(Component::power("c", 7e-3, 2e-3, duties[2]).unwrap())
            .unwrap();
        sys.attach_all(top, &[a, sub]).unwrap();
        sys.attach_all(sub, &[b, c]).unwrap();
        top
    }

    #[test]
    fn test_nested_group_sums() {
        let mut sys = PowerSystem::new();
        let top = build_nested(&mut sys, [0.5, 1.0, 0.0]);
        let vars = VariableSet::new();
        update_hierarchy(&mut sys, top, &vars).unwrap();
        // a: 1m + 9m*0.5 = 5.5m; b: 4m; c: 2m; sub: 6m; top: 11.5m
        assert!((sys.node(top).total_power() - 11.5e-3).abs() < 1e-12);
        assert!((sys.node(top).inactive_power() - 3e-3).abs() < 1e-12);
    }

    #[test]
    fn test_idempotent_recomputation() {
        let mut sys = PowerSystem::new();
        let top = build_nested(&mut sys, [0.3, 0.7, 0.9]);
        let vars = VariableSet::new();
        update_hierarchy(&mut sys, top, &vars).unwrap();
        let first = sys.node(top).total_power();
        update_hierarchy(&mut sys, top, &vars).unwrap();
        let second = sys.node(top).total_power();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_regulator_derates_inside_tree() {
        let mut sys = PowerSystem::new();
        let top = sys.add_group(ComponentGroup::power("top")).unwrap();
        let reg = sys
            .add_regulator(VoltageRegulator::power("reg", 0.5, 1e-3).unwrap())
            .unwrap();
        let load = sys
            .add_component(Component::power("load", 10e-3, 10e-3, 1.0).unwrap())
            .unwrap();
        sys.attach(top, reg).unwrap();
        sys.attach(reg, load).unwrap();
        let vars = VariableSet::new();
        update_hierarchy(&mut sys, top, &vars).unwrap();
        // 10mW load at 50% efficiency + 1mW quiescent = 21mW
        assert!((sys.node(reg).total_power() - 21e-3).abs() < 1e-12);
        assert!((sys.node(top).total_power() - 21e-3).abs() < 1e-12);
    }

    #[test]
    fn test_rail_mismatch_halts_pass() {
        let mut sys = PowerSystem::new();
        let top = sys.add_current_voltage_group("top", 1.2).unwrap();
        let bad = sys
            .add_component(Component::current_voltage("bad", 1e-3, 0.0, 3.3, 1.0).unwrap())
            .unwrap();
        sys.attach(top, bad).unwrap();
        let vars = VariableSet::new();
        assert!(update_hierarchy(&mut sys, top, &vars).is_err());
    }

    #[test]
    fn test_leaf_root_degenerates_to_single_node_update() {
        let mut sys = PowerSystem::new();
        let leaf = sys
            .add_component(Component::power("leaf", 8e-3, 2e-3, 0.25).unwrap())
            .unwrap();
        let vars = VariableSet::new();
        let power = recompute(&mut sys, Scope::Node(leaf), &vars).unwrap();
        assert!((power - 3.5e-3).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_group_total_is_sum_of_children(
            duties in proptest::array::uniform3(0.0f64..=1.0),
        ) {
            let mut sys = PowerSystem::new();
            let top = build_nested(&mut sys, duties);
            let vars = VariableSet::new();
            update_hierarchy(&mut sys, top, &vars).unwrap();
            let a = sys.lookup("a").unwrap();
            let sub = sys.lookup("sub").unwrap();
            let b = sys.lookup("b").unwrap();
            let c = sys.lookup("c").unwrap();
            let sub_sum = sys.node(b).total_power() + sys.node(c).total_power();
            prop_assert!((sys.node(sub).total_power() - sub_sum).abs() < 1e-12);
            let top_sum = sys.node(a).total_power() + sys.node(sub).total_power();
            prop_assert!((sys.node(top).total_power() - top_sum).abs() < 1e-12);
        }
    }
}
