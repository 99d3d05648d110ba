//! Component groups: plain-summing composites.

use crate::error::{ModelError, Result};
use crate::node::{ChildLoad, Hierarchy, Kind};
use crate::system::NodeId;

/// A composite that owns an ordered collection of child components, child
/// groups, and child regulators, and aggregates as the plain sum of their
/// totals.
///
/// In the current-voltage representation the group declares the rail voltage
/// its children run on and (unless `rail_check` is disabled) verifies each
/// direct child against it during aggregation; a mismatch is fatal.
#[derive(Debug)]
pub struct ComponentGroup {
    name: String,
    kind: Kind,
    rail_voltage: Option<f64>,
    rail_check: bool,
    total_power: f64,
    inactive_power: f64,
    total_current: Option<f64>,
    inactive_current: Option<f64>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) cache: Hierarchy,
}

impl ComponentGroup {
    /// A group defined purely in power terms (no rail bookkeeping).
    pub fn power(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: Kind::Power,
            rail_voltage: None,
            rail_check: false,
            total_power: 0.0,
            inactive_power: 0.0,
            total_current: None,
            inactive_current: None,
            children: Vec::new(),
            cache: Hierarchy::default(),
        }
    }

    /// A group on a declared rail voltage, with per-child consistency
    /// checking controllable via `rail_check`.
    pub fn current_voltage(name: &str, rail_voltage: f64, rail_check: bool) -> Result<Self> {
        if rail_voltage < 0.0 {
            return Err(ModelError::OutOfRange {
                what: "rail voltage",
                value: rail_voltage,
            });
        }
        Ok(Self {
            name: name.to_string(),
            kind: Kind::CurrentVoltage,
            rail_voltage: Some(rail_voltage),
            rail_check,
            total_power: 0.0,
            inactive_power: 0.0,
            total_current: None,
            inactive_current: None,
            children: Vec::new(),
            cache: Hierarchy::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn rail_voltage(&self) -> Option<f64> {
        self.rail_voltage
    }

    pub fn rail_check(&self) -> bool {
        self.rail_check
    }

    pub fn total_power(&self) -> f64 {
        self.total_power
    }

    pub fn inactive_power(&self) -> f64 {
        self.inactive_power
    }

    pub fn total_current(&self) -> Option<f64> {
        self.total_current
    }

    pub fn inactive_current(&self) -> Option<f64> {
        self.inactive_current
    }

    /// Recompute this group's figures from its (already current) direct
    /// children. Rail verification runs first so a mismatch halts before any
    /// figure is written.
    pub(crate) fn aggregate(&mut self, children: &[ChildLoad]) -> Result<()> {
        if self.kind == Kind::CurrentVoltage && self.rail_check {
            self.check_rails(children)?;
        }
        self.inactive_power = children.iter().map(|c| c.inactive_power).sum();
        self.total_power = children.iter().map(|c| c.total_power).sum();
        if let Some(rail) = self.rail_voltage {
            self.total_current = Some(self.total_power / rail);
            self.inactive_current = Some(self.inactive_power / rail);
        }
        Ok(())
    }

    fn check_rails(&self, children: &[ChildLoad]) -> Result<()> {
        let rail = self.rail_voltage.unwrap_or_default();
        for child in children {
            match child.rail_voltage {
                Some(child_rail) if child_rail == rail => {}
                Some(child_rail) => {
                    return Err(ModelError::RailMismatch {
                        parent: self.name.clone(),
                        child: child.name.clone(),
                        parent_rail: rail,
                        child_rail,
                    })
                }
                None => {
                    return Err(ModelError::UnratedChild {
                        parent: self.name.clone(),
                        child: child.name.clone(),
                        parent_rail: rail,
                    })
                }
            }
        }
        Ok(())
    }
}
