//! The power-bearing node family.
//!
//! Four variants share the aggregation contract:
//!
//! - [`Component`]: leaf device, duty-cycle power law, optional models
//! - [`ComponentGroup`]: plain-summing composite with rail bookkeeping
//! - [`VoltageRegulator`]: efficiency-derating composite
//! - [`LogicalGroup`]: non-owning cross-cutting view
//!
//! The first three live in the ownership tree (see [`crate::system`]); a
//! logical group only references them.

pub mod attribute;
pub mod component;
pub mod group;
pub mod logical;
pub mod regulator;

pub use attribute::Attribute;
pub use component::{Component, Demand};
pub use group::ComponentGroup;
pub use logical::LogicalGroup;
pub use regulator::VoltageRegulator;

use serde::{Deserialize, Serialize};

use crate::system::NodeId;

/// Representation tag: defined in power terms, or in current terms at a
/// rated rail voltage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    Power,
    CurrentVoltage,
}

/// Snapshot of one direct child taken during aggregation: its figures as of
/// the bottom-up pass, plus the rail it expects from its parent (a
/// regulator child reports its rated input voltage).
#[derive(Debug, Clone)]
pub struct ChildLoad {
    pub name: String,
    pub total_power: f64,
    pub inactive_power: f64,
    pub rail_voltage: Option<f64>,
}

/// Derived, rebuildable partition of a composite's children into the three
/// child categories. Populated when children are attached and cleared plus
/// rebuilt on every hierarchy update; a traversal convenience, not an
/// independent source of truth.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    pub components: Vec<NodeId>,
    pub groups: Vec<NodeId>,
    pub regulators: Vec<NodeId>,
}

impl Hierarchy {
    pub fn clear(&mut self) {
        self.components.clear();
        self.groups.clear();
        self.regulators.clear();
    }

    pub fn len(&self) -> usize {
        self.components.len() + self.groups.len() + self.regulators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
