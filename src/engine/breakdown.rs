//! Tree flattening for plotting collaborators.
//!
//! Produces the (parent, child, value) edge list sunburst-style breakdowns
//! consume. This crate owns none of the rendering; the entries serialize
//! straight to JSON for whatever draws them.

use serde::Serialize;

use crate::system::{NodeId, PowerSystem};

/// One edge of the flattened hierarchy. The queried root appears once with
/// an empty parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub parent: String,
    pub child: String,
    pub power: f64,
}

/// Flatten a hierarchy into per-edge total powers, recursing through
/// composite children. Each regulator additionally contributes two synthetic
/// children — its conversion loss and its own quiescent draw — so the
/// breakdown accounts for where the derated power actually goes. Call after
/// an update pass so the figures are current.
pub fn power_breakdown(sys: &PowerSystem, root: NodeId) -> Vec<BreakdownEntry> {
    let mut entries = Vec::new();
    flatten(sys, root, &mut entries);
    entries.push(BreakdownEntry {
        parent: String::new(),
        child: sys.node(root).name().to_string(),
        power: sys.node(root).total_power(),
    });
    entries
}

fn flatten(sys: &PowerSystem, node: NodeId, entries: &mut Vec<BreakdownEntry>) {
    let Some(cache) = sys.node(node).cache() else {
        return;
    };
    let parent = sys.node(node).name().to_string();
    for &id in &cache.components {
        entries.push(BreakdownEntry {
            parent: parent.clone(),
            child: sys.node(id).name().to_string(),
            power: sys.node(id).total_power(),
        });
    }
    for &id in &cache.groups {
        entries.push(BreakdownEntry {
            parent: parent.clone(),
            child: sys.node(id).name().to_string(),
            power: sys.node(id).total_power(),
        });
        flatten(sys, id, entries);
    }
    for &id in &cache.regulators {
        let reg_name = sys.node(id).name().to_string();
        entries.push(BreakdownEntry {
            parent: parent.clone(),
            child: reg_name.clone(),
            power: sys.node(id).total_power(),
        });
        if let Some(reg) = sys.node(id).as_regulator() {
            entries.push(BreakdownEntry {
                parent: reg_name.clone(),
                child: format!("{reg_name} Efficiency Loss"),
                power: reg.efficiency_loss_power(),
            });
            entries.push(BreakdownEntry {
                parent: reg_name.clone(),
                child: format!("{reg_name} Regulator Power"),
                power: reg.regulator_power(),
            });
        }
        flatten(sys, id, entries);
    }
}
