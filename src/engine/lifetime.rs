//! Battery-lifetime estimation against an energy budget.

use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::engine::sweep::{variable_sweep, variable_sweep_2d};
use crate::engine::update::{recompute, Scope};
use crate::error::{ModelError, Result};
use crate::system::PowerSystem;
use crate::variable::VariableSet;

/// Reporting unit for lifetime figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Parse a unit name; an unrecognized unit is a recoverable error.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| ModelError::UnknownTimeUnit(name.to_string()))
    }

    pub fn seconds(&self) -> f64 {
        match self {
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
            TimeUnit::Hour => 3600.0,
            TimeUnit::Day => 3600.0 * 24.0,
            TimeUnit::Week => 3600.0 * 24.0 * 7.0,
            TimeUnit::Month => 3600.0 * 24.0 * 30.42,
            TimeUnit::Year => 3600.0 * 24.0 * 365.2425,
        }
    }
}

/// Index-aligned lifetimes from a swept variable.
#[derive(Debug, Clone, Serialize)]
pub struct LifetimeSeries {
    pub values: Vec<f64>,
    pub lifetimes: Vec<f64>,
}

/// Lifetimes over a 2-D sweep; `lifetimes[i2][i1]`.
#[derive(Debug, Clone, Serialize)]
pub struct LifetimeGrid {
    pub values1: Vec<f64>,
    pub values2: Vec<f64>,
    pub lifetimes: Vec<Vec<f64>>,
}

/// How long an energy budget (joules) lasts at the scope's recomputed
/// average power, in the requested unit.
pub fn lifetime(
    sys: &mut PowerSystem,
    scope: Scope<'_>,
    vars: &VariableSet,
    energy_joules: f64,
    unit: TimeUnit,
) -> Result<f64> {
    let power = recompute(sys, scope, vars)?;
    Ok(energy_joules / (unit.seconds() * power))
}

/// Lifetime at every point of a variable sweep.
pub fn sweep_lifetime(
    sys: &mut PowerSystem,
    scope: Scope<'_>,
    vars: &mut VariableSet,
    variable: &str,
    energy_joules: f64,
    unit: TimeUnit,
) -> Result<LifetimeSeries> {
    let series = variable_sweep(sys, scope, vars, variable)?;
    let lifetimes = series
        .powers
        .iter()
        .map(|&power| energy_joules / (unit.seconds() * power))
        .collect();
    Ok(LifetimeSeries {
        values: series.values,
        lifetimes,
    })
}

/// Lifetime at every point of a 2-D variable sweep.
pub fn sweep_lifetime_2d(
    sys: &mut PowerSystem,
    scope: Scope<'_>,
    vars: &mut VariableSet,
    variable1: &str,
    variable2: &str,
    energy_joules: f64,
    unit: TimeUnit,
) -> Result<LifetimeGrid> {
    let grid = variable_sweep_2d(sys, scope, vars, variable1, variable2)?;
    let lifetimes = grid
        .powers
        .iter()
        .map(|row| {
            row.iter()
                .map(|&power| energy_joules / (unit.seconds() * power))
                .collect()
        })
        .collect();
    Ok(LifetimeGrid {
        values1: grid.values1,
        values2: grid.values2,
        lifetimes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::node::{Attribute, Component};
    use crate::variable::Variable;
    use rstest::rstest;

    #[rstest]
    #[case("second", 1.0)]
    #[case("hour", 3600.0)]
    #[case("day", 86_400.0)]
    #[case("year", 3600.0 * 24.0 * 365.2425)]
    fn test_unit_parse_and_seconds(#[case] name: &str, #[case] seconds: f64) {
        let unit = TimeUnit::parse(name).unwrap();
        assert_eq!(unit.seconds(), seconds);
    }

    #[test]
    fn test_unrecognized_unit_rejected() {
        assert!(matches!(
            TimeUnit::parse("fortnight"),
            Err(ModelError::UnknownTimeUnit(_))
        ));
    }

    #[test]
    fn test_lifetime_of_constant_load() {
        let mut sys = PowerSystem::new();
        let comp = sys
            .add_component(Component::power("load", 1e-3, 1e-3, 1.0).unwrap())
            .unwrap();
        let vars = VariableSet::new();
        // 3.6 J at 1 mW lasts 3600 s = 1 hour.
        let hours = lifetime(&mut sys, Scope::Node(comp), &vars, 3.6, TimeUnit::Hour).unwrap();
        assert!((hours - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_lifetime_tracks_power() {
        let mut sys = PowerSystem::new();
        let model = Model::new("duty", &["dc"], Attribute::DutyCycle, |vars| {
            vars.value("dc").unwrap_or(0.0)
        });
        let mut comp = Component::power("load", 2e-3, 1e-3, 0.0)
            .unwrap()
            .with_models(vec![model]);
        comp.select_model("duty").unwrap();
        let comp = sys.add_component(comp).unwrap();
        let mut vars = VariableSet::new();
        vars.insert(Variable::swept("dc", 0.0, 0.0, 1.0, 1.0)).unwrap();

        let series = sweep_lifetime(
            &mut sys,
            Scope::Node(comp),
            &mut vars,
            "dc",
            3.6,
            TimeUnit::Hour,
        )
        .unwrap();
        // 1mW -> 1h, 2mW -> 0.5h.
        assert_eq!(series.values, vec![0.0, 1.0]);
        assert!((series.lifetimes[0] - 1.0).abs() < 1e-9);
        assert!((series.lifetimes[1] - 0.5).abs() < 1e-9);
        assert_eq!(vars.value("dc"), Some(0.0));
    }
}
