//! Voltage regulators: efficiency-derated composites.
//!
//! A regulator converts an upstream rail to a downstream rail for its
//! children. Its total consumption is its own quiescent power plus the load
//! power inflated by `1 / efficiency`; the difference between inflated and
//! raw load is tracked separately as conversion loss.

use crate::error::{ModelError, Result};
use crate::node::{Attribute, ChildLoad, Hierarchy, Kind};
use crate::system::NodeId;

/// A rail-converting composite.
///
/// `Kind::Power` regulators carry only an efficiency and a quiescent power.
/// `Kind::CurrentVoltage` regulators carry rated input/output voltages and a
/// quiescent current, derive their quiescent power from the input rail, and
/// verify each direct child against the output voltage during aggregation.
#[derive(Debug)]
pub struct VoltageRegulator {
    name: String,
    kind: Kind,
    efficiency: f64,
    input_voltage: Option<f64>,
    output_voltage: Option<f64>,
    regulator_current: Option<f64>,
    regulator_power: f64,
    load_power: f64,
    inactive_load_power: f64,
    load_current: Option<f64>,
    inactive_load_current: Option<f64>,
    efficiency_loss_power: f64,
    inactive_efficiency_loss_power: f64,
    efficiency_loss_current: Option<f64>,
    inactive_efficiency_loss_current: Option<f64>,
    total_power: f64,
    total_current: Option<f64>,
    inactive_power: f64,
    inactive_current: Option<f64>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) cache: Hierarchy,
}

impl VoltageRegulator {
    /// A regulator defined in power terms: conversion efficiency and
    /// quiescent power.
    pub fn power(name: &str, efficiency: f64, regulator_power: f64) -> Result<Self> {
        validate_efficiency(efficiency)?;
        if regulator_power < 0.0 {
            return Err(ModelError::OutOfRange {
                what: "regulator power",
                value: regulator_power,
            });
        }
        Ok(Self {
            name: name.to_string(),
            kind: Kind::Power,
            efficiency,
            input_voltage: None,
            output_voltage: None,
            regulator_current: None,
            regulator_power,
            ..Self::zeroed()
        })
    }

    /// A regulator defined in current-voltage terms: rated input/output
    /// voltages, conversion efficiency, and quiescent current.
    pub fn current_voltage(
        name: &str,
        input_voltage: f64,
        output_voltage: f64,
        efficiency: f64,
        regulator_current: f64,
    ) -> Result<Self> {
        validate_efficiency(efficiency)?;
        for (what, value) in [
            ("input voltage", input_voltage),
            ("output voltage", output_voltage),
            ("regulator current", regulator_current),
        ] {
            if value < 0.0 {
                return Err(ModelError::OutOfRange { what, value });
            }
        }
        Ok(Self {
            name: name.to_string(),
            kind: Kind::CurrentVoltage,
            efficiency,
            input_voltage: Some(input_voltage),
            output_voltage: Some(output_voltage),
            regulator_current: Some(regulator_current),
            regulator_power: input_voltage * regulator_current,
            ..Self::zeroed()
        })
    }

    fn zeroed() -> Self {
        Self {
            name: String::new(),
            kind: Kind::Power,
            efficiency: 1.0,
            input_voltage: None,
            output_voltage: None,
            regulator_current: None,
            regulator_power: 0.0,
            load_power: 0.0,
            inactive_load_power: 0.0,
            load_current: None,
            inactive_load_current: None,
            efficiency_loss_power: 0.0,
            inactive_efficiency_loss_power: 0.0,
            efficiency_loss_current: None,
            inactive_efficiency_loss_current: None,
            total_power: 0.0,
            total_current: None,
            inactive_power: 0.0,
            inactive_current: None,
            children: Vec::new(),
            cache: Hierarchy::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn input_voltage(&self) -> Option<f64> {
        self.input_voltage
    }

    pub fn output_voltage(&self) -> Option<f64> {
        self.output_voltage
    }

    pub fn regulator_power(&self) -> f64 {
        self.regulator_power
    }

    pub fn regulator_current(&self) -> Option<f64> {
        self.regulator_current
    }

    pub fn load_power(&self) -> f64 {
        self.load_power
    }

    pub fn inactive_load_power(&self) -> f64 {
        self.inactive_load_power
    }

    pub fn load_current(&self) -> Option<f64> {
        self.load_current
    }

    pub fn efficiency_loss_power(&self) -> f64 {
        self.efficiency_loss_power
    }

    pub fn inactive_efficiency_loss_power(&self) -> f64 {
        self.inactive_efficiency_loss_power
    }

    pub fn efficiency_loss_current(&self) -> Option<f64> {
        self.efficiency_loss_current
    }

    pub fn total_power(&self) -> f64 {
        self.total_power
    }

    pub fn total_current(&self) -> Option<f64> {
        self.total_current
    }

    pub fn inactive_power(&self) -> f64 {
        self.inactive_power
    }

    pub fn inactive_current(&self) -> Option<f64> {
        self.inactive_current
    }

    pub fn set_efficiency(&mut self, value: f64) -> Result<()> {
        validate_efficiency(value)?;
        self.efficiency = value;
        Ok(())
    }

    pub fn set_regulator_power(&mut self, value: f64) -> Result<()> {
        if self.kind != Kind::Power {
            return Err(self.unsupported(Attribute::RegulatorPower));
        }
        if value < 0.0 {
            return Err(ModelError::OutOfRange {
                what: "regulator power",
                value,
            });
        }
        self.regulator_power = value;
        Ok(())
    }

    pub fn set_regulator_current(&mut self, value: f64) -> Result<()> {
        if self.kind != Kind::CurrentVoltage {
            return Err(self.unsupported(Attribute::RegulatorCurrent));
        }
        if value < 0.0 {
            return Err(ModelError::OutOfRange {
                what: "regulator current",
                value,
            });
        }
        self.regulator_current = Some(value);
        Ok(())
    }

    /// Targeted attribute mutation; the sweepable regulator attributes.
    pub fn set_attr(&mut self, attr: Attribute, value: f64) -> Result<()> {
        match attr {
            Attribute::Efficiency => self.set_efficiency(value),
            Attribute::RegulatorPower => self.set_regulator_power(value),
            Attribute::RegulatorCurrent => self.set_regulator_current(value),
            attr => Err(self.unsupported(attr)),
        }
    }

    /// Targeted attribute read.
    pub fn get_attr(&self, attr: Attribute) -> Result<f64> {
        match attr {
            Attribute::TotalPower => Ok(self.total_power),
            Attribute::TotalCurrent => self
                .total_current
                .ok_or_else(|| self.unsupported(Attribute::TotalCurrent)),
            Attribute::LoadPower => Ok(self.load_power),
            Attribute::LoadCurrent => self
                .load_current
                .ok_or_else(|| self.unsupported(Attribute::LoadCurrent)),
            attr => Err(self.unsupported(attr)),
        }
    }

    /// Recompute all derived figures from the (already current) direct
    /// children. The rail check against the output voltage runs first.
    pub(crate) fn aggregate(&mut self, children: &[ChildLoad]) -> Result<()> {
        let load: f64 = children.iter().map(|c| c.total_power).sum();
        let inactive_load: f64 = children.iter().map(|c| c.inactive_power).sum();
        match self.kind {
            Kind::Power => {
                self.inactive_load_power = inactive_load;
                self.inactive_efficiency_loss_power =
                    inactive_load / self.efficiency - inactive_load;
                self.inactive_power = self.regulator_power + inactive_load / self.efficiency;

                self.load_power = load;
                self.efficiency_loss_power = load / self.efficiency - load;
                self.total_power = self.regulator_power + load / self.efficiency;
            }
            Kind::CurrentVoltage => {
                self.check_rails(children)?;
                let vin = self.input_voltage.unwrap_or_default();
                let vout = self.output_voltage.unwrap_or_default();
                let quiescent = self.regulator_current.unwrap_or_default();
                self.regulator_power = vin * quiescent;

                let inactive_current = inactive_load / vout;
                self.inactive_load_power = inactive_load;
                self.inactive_load_current = Some(inactive_current);
                self.inactive_efficiency_loss_current =
                    Some(inactive_current / self.efficiency - inactive_current);
                self.inactive_efficiency_loss_power =
                    inactive_load / self.efficiency - inactive_load;
                self.inactive_power = quiescent * vin + inactive_current * vout / self.efficiency;
                self.inactive_current = Some(self.inactive_power / vin);

                let load_current = load / vout;
                self.load_power = load;
                self.load_current = Some(load_current);
                self.efficiency_loss_current = Some(load_current / self.efficiency - load_current);
                self.efficiency_loss_power = load / self.efficiency - load;
                self.total_power = quiescent * vin + load_current * vout / self.efficiency;
                self.total_current = Some(self.total_power / vin);
            }
        }
        Ok(())
    }

    fn check_rails(&self, children: &[ChildLoad]) -> Result<()> {
        let vout = self.output_voltage.unwrap_or_default();
        for child in children {
            match child.rail_voltage {
                Some(child_rail) if child_rail == vout => {}
                Some(child_rail) => {
                    return Err(ModelError::RailMismatch {
                        parent: self.name.clone(),
                        child: child.name.clone(),
                        parent_rail: vout,
                        child_rail,
                    })
                }
                None => {
                    return Err(ModelError::UnratedChild {
                        parent: self.name.clone(),
                        child: child.name.clone(),
                        parent_rail: vout,
                    })
                }
            }
        }
        Ok(())
    }

    fn unsupported(&self, attribute: Attribute) -> ModelError {
        ModelError::UnsupportedAttribute {
            node: self.name.clone(),
            attribute,
        }
    }
}

fn validate_efficiency(value: f64) -> Result<()> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(ModelError::OutOfRange {
            what: "efficiency",
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn load(name: &str, total: f64, inactive: f64, rail: Option<f64>) -> ChildLoad {
        ChildLoad {
            name: name.to_string(),
            total_power: total,
            inactive_power: inactive,
            rail_voltage: rail,
        }
    }

    #[test]
    fn test_power_regulator_derates_load() {
        let mut reg = VoltageRegulator::power("buck", 0.9, 1e-3).unwrap();
        reg.aggregate(&[load("a", 9e-3, 1e-3, None)]).unwrap();
        assert!((reg.total_power() - (1e-3 + 9e-3 / 0.9)).abs() < 1e-12);
        assert!((reg.efficiency_loss_power() - (9e-3 / 0.9 - 9e-3)).abs() < 1e-12);
        assert!((reg.inactive_power() - (1e-3 + 1e-3 / 0.9)).abs() < 1e-12);
    }

    #[test]
    fn test_current_voltage_regulator_figures() {
        let mut reg = VoltageRegulator::current_voltage("ldo", 3.3, 1.2, 0.9, 0.0).unwrap();
        reg.aggregate(&[
            load("a", 6.6e-3, 1.2e-3, Some(1.2)),
            load("b", 6.6e-3, 1.2e-3, Some(1.2)),
            load("c", 6.6e-3, 1.2e-3, Some(1.2)),
        ])
        .unwrap();
        // 19.8mW load at 1.2V is 16.5mA; total 19.8mW / 0.9 = 22mW.
        assert!((reg.load_power() - 19.8e-3).abs() < 1e-12);
        assert!((reg.load_current().unwrap() - 16.5e-3).abs() < 1e-12);
        assert!((reg.total_power() - 0.022).abs() < 1e-9);
        assert!((reg.total_current().unwrap() - 0.022 / 3.3).abs() < 1e-9);
        assert_eq!(reg.regulator_power(), 0.0);
    }

    #[test]
    fn test_quiescent_current_contributes_at_input_rail() {
        let mut reg = VoltageRegulator::current_voltage("ldo", 3.3, 1.2, 1.0, 1e-3).unwrap();
        reg.aggregate(&[load("a", 1.2e-3, 0.0, Some(1.2))]).unwrap();
        assert!((reg.regulator_power() - 3.3e-3).abs() < 1e-12);
        assert!((reg.total_power() - (3.3e-3 + 1.2e-3)).abs() < 1e-12);
    }

    #[test]
    fn test_rail_check_against_output_voltage() {
        let mut reg = VoltageRegulator::current_voltage("ldo", 3.3, 1.2, 0.9, 0.0).unwrap();
        let err = reg.aggregate(&[load("a", 1e-3, 0.0, Some(3.3))]).unwrap_err();
        assert!(matches!(err, ModelError::RailMismatch { .. }));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.1)]
    #[case(1.1)]
    fn test_efficiency_bounds(#[case] efficiency: f64) {
        assert!(VoltageRegulator::power("r", efficiency, 0.0).is_err());
    }

    #[test]
    fn test_attr_dispatch() {
        let mut reg = VoltageRegulator::power("buck", 0.8, 0.0).unwrap();
        reg.set_attr(Attribute::Efficiency, 0.95).unwrap();
        assert!((reg.efficiency() - 0.95).abs() < 1e-12);
        assert!(reg.set_attr(Attribute::RegulatorCurrent, 1e-3).is_err());
        assert!(reg.set_attr(Attribute::DutyCycle, 0.5).is_err());
        assert!(reg.get_attr(Attribute::LoadCurrent).is_err());
    }
}
