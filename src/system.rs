//! The node arena and ownership tree.
//!
//! All tree nodes live in one [`PowerSystem`] arena addressed by stable
//! [`NodeId`] indices; the hierarchy engine folds over it bottom-up rather
//! than maintaining an always-valid incremental cache. Ownership edges are
//! created with [`PowerSystem::attach`]: every node has at most one parent,
//! cycles are rejected, and names are unique across the whole system.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{ModelError, Result};
use crate::node::{
    Attribute, Component, ComponentGroup, Hierarchy, Kind, VoltageRegulator,
};

/// Stable index of a node in a [`PowerSystem`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

/// A tree node: one of the three owned variants of the node family.
#[derive(Debug)]
pub enum Node {
    Component(Component),
    Group(ComponentGroup),
    Regulator(VoltageRegulator),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Component(c) => c.name(),
            Node::Group(g) => g.name(),
            Node::Regulator(r) => r.name(),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Node::Component(c) => c.kind(),
            Node::Group(g) => g.kind(),
            Node::Regulator(r) => r.kind(),
        }
    }

    pub fn is_composite(&self) -> bool {
        !matches!(self, Node::Component(_))
    }

    pub fn total_power(&self) -> f64 {
        match self {
            Node::Component(c) => c.total_power(),
            Node::Group(g) => g.total_power(),
            Node::Regulator(r) => r.total_power(),
        }
    }

    pub fn inactive_power(&self) -> f64 {
        match self {
            Node::Component(c) => c.inactive_power(),
            Node::Group(g) => g.inactive_power(),
            Node::Regulator(r) => r.inactive_power(),
        }
    }

    /// The rail this node expects from its parent: a component's or group's
    /// rated rail voltage, a regulator's rated input voltage. `None` for the
    /// power-only representations.
    pub fn upstream_rail(&self) -> Option<f64> {
        match self {
            Node::Component(c) => c.rail_voltage(),
            Node::Group(g) => g.rail_voltage(),
            Node::Regulator(r) => r.input_voltage(),
        }
    }

    /// Targeted attribute mutation; groups have no settable attributes.
    pub fn set_attr(&mut self, attr: Attribute, value: f64) -> Result<()> {
        match self {
            Node::Component(c) => c.set_attr(attr, value),
            Node::Group(g) => Err(ModelError::UnsupportedAttribute {
                node: g.name().to_string(),
                attribute: attr,
            }),
            Node::Regulator(r) => r.set_attr(attr, value),
        }
    }

    /// Targeted attribute read; groups expose none.
    pub fn get_attr(&self, attr: Attribute) -> Result<f64> {
        match self {
            Node::Component(c) => c.get_attr(attr),
            Node::Group(g) => Err(ModelError::UnsupportedAttribute {
                node: g.name().to_string(),
                attribute: attr,
            }),
            Node::Regulator(r) => r.get_attr(attr),
        }
    }

    pub fn as_component(&self) -> Option<&Component> {
        match self {
            Node::Component(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_component_mut(&mut self) -> Option<&mut Component> {
        match self {
            Node::Component(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&ComponentGroup> {
        match self {
            Node::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_regulator(&self) -> Option<&VoltageRegulator> {
        match self {
            Node::Regulator(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_regulator_mut(&mut self) -> Option<&mut VoltageRegulator> {
        match self {
            Node::Regulator(r) => Some(r),
            _ => None,
        }
    }

    pub(crate) fn cache(&self) -> Option<&Hierarchy> {
        match self {
            Node::Component(_) => None,
            Node::Group(g) => Some(&g.cache),
            Node::Regulator(r) => Some(&r.cache),
        }
    }

    pub(crate) fn cache_mut(&mut self) -> Option<&mut Hierarchy> {
        match self {
            Node::Component(_) => None,
            Node::Group(g) => Some(&mut g.cache),
            Node::Regulator(r) => Some(&mut r.cache),
        }
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        match self {
            Node::Component(_) => &[],
            Node::Group(g) => &g.children,
            Node::Regulator(r) => &r.children,
        }
    }
}

/// Arena of tree nodes with name index and parent links.
#[derive(Debug, Default)]
pub struct PowerSystem {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    parents: Vec<Option<NodeId>>,
    cfg: EngineConfig,
}

impl PowerSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn add_component(&mut self, component: Component) -> Result<NodeId> {
        self.insert(Node::Component(component))
    }

    pub fn add_group(&mut self, group: ComponentGroup) -> Result<NodeId> {
        self.insert(Node::Group(group))
    }

    pub fn add_regulator(&mut self, regulator: VoltageRegulator) -> Result<NodeId> {
        self.insert(Node::Regulator(regulator))
    }

    /// Convenience group constructor honoring the system-wide rail-check
    /// default from [`EngineConfig`].
    pub fn add_current_voltage_group(&mut self, name: &str, rail_voltage: f64) -> Result<NodeId> {
        let group = ComponentGroup::current_voltage(name, rail_voltage, self.cfg.rail_check)?;
        self.add_group(group)
    }

    fn insert(&mut self, node: Node) -> Result<NodeId> {
        let name = node.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ModelError::DuplicateName(name));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.parents.push(None);
        self.index.insert(name, id);
        Ok(id)
    }

    /// Create an ownership edge. The parent must be a composite, the child
    /// must not already have a parent, and the edge must not close a cycle.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.node(parent).is_composite() {
            return Err(ModelError::NotComposite(self.node(parent).name().to_string()));
        }
        if self.parents[child.0].is_some() {
            return Err(ModelError::AlreadyOwned(self.node(child).name().to_string()));
        }
        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(ModelError::CycleDetected {
                    parent: self.node(parent).name().to_string(),
                    child: self.node(child).name().to_string(),
                });
            }
            ancestor = self.parents[id.0];
        }
        let slot = match self.node(child) {
            Node::Component(_) => Slot::Component,
            Node::Group(_) => Slot::Group,
            Node::Regulator(_) => Slot::Regulator,
        };
        match self.node_mut(parent) {
            Node::Group(g) => {
                g.children.push(child);
                slot.push(&mut g.cache, child);
            }
            Node::Regulator(r) => {
                r.children.push(child);
                slot.push(&mut r.cache, child);
            }
            Node::Component(_) => unreachable!("checked composite above"),
        }
        self.parents[child.0] = Some(parent);
        Ok(())
    }

    /// Attach several children in order.
    pub fn attach_all(&mut self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        for &child in children {
            self.attach(parent, child)?;
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Look a node up by its (unique) name.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }
}

enum Slot {
    Component,
    Group,
    Regulator,
}

impl Slot {
    fn push(&self, cache: &mut Hierarchy, id: NodeId) {
        match self {
            Slot::Component => cache.components.push(id),
            Slot::Group => cache.groups.push(id),
            Slot::Regulator => cache.regulators.push(id),
        }
    }
}
