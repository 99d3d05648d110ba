//! # powertree
//!
//! Average-power modeling for electronic systems built from a hierarchy of
//! power-consuming elements: leaf devices, groupings of devices, and the
//! voltage regulators that feed them.
//!
//! ## Components
//!
//! - **Nodes** ([`node`]): the composite family — [`Component`] leaves with a
//!   duty-cycle power law, plain-summing [`ComponentGroup`]s,
//!   efficiency-derating [`VoltageRegulator`]s, and non-owning
//!   [`LogicalGroup`] views
//! - **Arena** ([`system`]): all tree nodes live in one [`PowerSystem`],
//!   addressed by stable [`NodeId`]s, with unique names and single ownership
//! - **Variables & models** ([`variable`], [`model`]): caller-owned design
//!   parameters and the equation-based models that map them onto node
//!   attributes
//! - **Engine** ([`engine`]): bottom-up recomputation, name search, variable
//!   and attribute sweeps, and nearest-grid-point target searches
//!
//! ## Usage
//!
//! ```rust
//! use powertree::engine::{variable_sweep, update_hierarchy, Scope};
//! use powertree::model::Model;
//! use powertree::node::{Attribute, Component, ComponentGroup};
//! use powertree::system::PowerSystem;
//! use powertree::variable::{Variable, VariableSet};
//!
//! # fn run() -> powertree::error::Result<()> {
//! let mut sys = PowerSystem::new();
//! let top = sys.add_group(ComponentGroup::power("system"))?;
//!
//! // A radio whose duty cycle follows a transmit-rate variable.
//! let duty = Model::new("duty", &["rate"], Attribute::DutyCycle, |vars| {
//!     vars.value("rate").unwrap_or(0.0) * 1e-3
//! });
//! let mut radio = Component::power("radio", 10e-3, 1e-3, 0.0)?.with_models(vec![duty]);
//! radio.select_model("duty")?;
//! let radio = sys.add_component(radio)?;
//! let mcu = sys.add_component(Component::power("mcu", 2e-3, 0.5e-3, 1.0)?)?;
//! sys.attach_all(top, &[radio, mcu])?;
//!
//! let mut vars = VariableSet::new();
//! vars.insert(Variable::swept("rate", 10.0, 0.0, 100.0, 10.0).with_unit("Hz"))?;
//!
//! // Recompute the tree, then explore power versus transmit rate.
//! update_hierarchy(&mut sys, top, &vars)?;
//! let series = variable_sweep(&mut sys, Scope::Node(top), &mut vars, "rate")?;
//! assert_eq!(series.values.len(), series.powers.len());
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod mode;
pub mod model;
pub mod node;
pub mod system;
pub mod telemetry;
pub mod units;
pub mod variable;

pub use config::Config;
pub use error::{ModelError, Result};
pub use mode::{average_mode_power, Mode, ModelSelection};
pub use model::Model;
pub use node::{
    Attribute, Component, ComponentGroup, Demand, Kind, LogicalGroup, VoltageRegulator,
};
pub use system::{Node, NodeId, PowerSystem};
pub use variable::{SweepRange, Variable, VariableSet};
