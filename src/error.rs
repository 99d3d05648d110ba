use thiserror::Error;

use crate::node::Attribute;

/// Errors produced by the modeling core.
///
/// Three classes, handled differently by callers:
/// - validation rejections (bad setter input, unknown names, invalid sweep
///   parameters) are recoverable; mutating paths skip the offending write and
///   the node keeps its prior state,
/// - rail-consistency violations (`RailMismatch`, `UnratedChild`) are fatal to
///   the running aggregation pass and propagate,
/// - unsatisfiable searches (`EmptySweep`) are informational.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{what} of {value} is out of range")]
    OutOfRange { what: &'static str, value: f64 },

    #[error("active level {active} is below inactive level {inactive}")]
    ActiveBelowInactive { active: f64, inactive: f64 },

    #[error("duty cycle {0} is outside [0, 1]")]
    DutyCycleOutOfBounds(f64),

    #[error("attribute {attribute} is not recognized by node {node}")]
    UnsupportedAttribute { node: String, attribute: Attribute },

    #[error("unknown attribute name: {0}")]
    UnknownAttribute(String),

    #[error("unknown time unit: {0}")]
    UnknownTimeUnit(String),

    #[error("rail mismatch under {parent}: {child} expects {child_rail} V on a {parent_rail} V rail")]
    RailMismatch {
        parent: String,
        child: String,
        parent_rail: f64,
        child_rail: f64,
    },

    #[error("rail mismatch under {parent}: {child} carries no rail rating on a {parent_rail} V rail")]
    UnratedChild {
        parent: String,
        child: String,
        parent_rail: f64,
    },

    #[error("duplicate node name: {0}")]
    DuplicateName(String),

    #[error("duplicate variable name: {0}")]
    DuplicateVariable(String),

    #[error("no node named {0} in the hierarchy")]
    NodeNotFound(String),

    #[error("node {0} is not a composite and cannot own children")]
    NotComposite(String),

    #[error("node {0} already has a parent")]
    AlreadyOwned(String),

    #[error("attaching {child} under {parent} would close a cycle")]
    CycleDetected { parent: String, child: String },

    #[error("node {0} is not a leaf component")]
    NotAComponent(String),

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("variable {0} has no sweep range")]
    NoSweepRange(String),

    #[error("variable {variable} has unusable sweep step {step}")]
    InvalidSweepStep { variable: String, step: f64 },

    #[error("component {component} has no model named {model}")]
    UnknownModel { component: String, model: String },

    #[error("no model selected on component {0}")]
    NoModelSelected(String),

    #[error("requested {requested} hierarchy levels but only {available} exist")]
    InvalidLevelCount { requested: usize, available: usize },

    #[error("sweep of variable {0} produced no grid points")]
    EmptySweep(String),

    #[error("no modes given to average")]
    EmptyModeList,
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;
