//! Name-addressed search over the hierarchy.

use std::collections::HashMap;

use crate::system::{Node, NodeId, PowerSystem};

/// Depth-first search for a node by name below `root`.
///
/// Returns `(depth, node)` where depth counts the composite levels traversed
/// (0 = direct child of `root`), or `None` when absent. The three child
/// categories are visited in order: components, then groups (descended into
/// but not name-matched themselves), then regulators (name-matched before
/// descending, since both the regulator and something below it are valid
/// targets). Names are unique by construction, so the first hit is the only
/// one; on a hand-built tree with collisions the first DFS hit wins.
pub fn search_name(sys: &PowerSystem, root: NodeId, name: &str) -> Option<(usize, NodeId)> {
    let cache = sys.node(root).cache()?;
    for &id in &cache.components {
        if sys.node(id).name() == name {
            return Some((0, id));
        }
    }
    for &id in &cache.groups {
        if let Some((depth, hit)) = search_name(sys, id, name) {
            return Some((depth + 1, hit));
        }
    }
    for &id in &cache.regulators {
        if sys.node(id).name() == name {
            return Some((0, id));
        }
        if let Some((depth, hit)) = search_name(sys, id, name) {
            return Some((depth + 1, hit));
        }
    }
    None
}

/// Total power along the path from a named node up to (but not including)
/// the queried root, leaf-to-root order: `powers[0]` is the target's own
/// figure, each subsequent entry the next enclosing composite's. `None` when
/// the name is absent.
pub fn hierarchy_total_power(sys: &PowerSystem, root: NodeId, name: &str) -> Option<Vec<f64>> {
    let cache = sys.node(root).cache()?;
    for &id in &cache.components {
        if sys.node(id).name() == name {
            return Some(vec![sys.node(id).total_power()]);
        }
    }
    for &id in &cache.groups {
        if let Some(mut powers) = hierarchy_total_power(sys, id, name) {
            powers.push(sys.node(id).total_power());
            return Some(powers);
        }
    }
    for &id in &cache.regulators {
        if sys.node(id).name() == name {
            return Some(vec![sys.node(id).total_power()]);
        }
        if let Some(mut powers) = hierarchy_total_power(sys, id, name) {
            powers.push(sys.node(id).total_power());
            return Some(powers);
        }
    }
    None
}

/// Map each variable name to the components below `root` whose selected
/// model reads it, so sweep drivers can see what a variable touches without
/// re-walking the tree.
pub fn variable_usage(sys: &PowerSystem, root: NodeId) -> HashMap<String, Vec<NodeId>> {
    let mut usage = HashMap::new();
    collect_usage(sys, root, &mut usage);
    usage
}

fn collect_usage(sys: &PowerSystem, root: NodeId, usage: &mut HashMap<String, Vec<NodeId>>) {
    if let Node::Component(c) = sys.node(root) {
        if let Some(model) = c.selected_model().and_then(|name| c.model(name)) {
            for input in model.inputs() {
                usage.entry(input.clone()).or_default().push(root);
            }
        }
        return;
    }
    let Some(cache) = sys.node(root).cache() else {
        return;
    };
    for &id in cache
        .components
        .iter()
        .chain(&cache.groups)
        .chain(&cache.regulators)
    {
        collect_usage(sys, id, usage);
    }
}
