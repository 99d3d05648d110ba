//! The closed set of sweepable/readable node attributes.
//!
//! Sweeps and models target an attribute of a node without knowing its
//! concrete variant; each variant recognizes its own subset and rejects the
//! rest as a recoverable error.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{ModelError, Result};

/// Attribute identifiers for targeted get/set dispatch.
///
/// `TotalPower` and `TotalCurrent` name the representation's aggregate figure
/// (a component in the current-voltage representation aggregates current, not
/// power). Which identifiers a node recognizes depends on its variant; see
/// the per-node `set_attr`/`get_attr` implementations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum Attribute {
    TotalPower,
    ActivePower,
    InactivePower,
    DutyCycle,
    TotalCurrent,
    ActiveCurrent,
    InactiveCurrent,
    RailVoltage,
    Efficiency,
    RegulatorPower,
    RegulatorCurrent,
    LoadPower,
    LoadCurrent,
}

impl Attribute {
    /// Parse an attribute name; unrecognized names are a recoverable error.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| ModelError::UnknownAttribute(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        assert_eq!(Attribute::parse("TotalPower").unwrap(), Attribute::TotalPower);
        assert_eq!(Attribute::parse("DutyCycle").unwrap(), Attribute::DutyCycle);
        assert_eq!(Attribute::TotalCurrent.to_string(), "TotalCurrent");
    }

    #[test]
    fn test_parse_rejects_unknown_name() {
        assert!(matches!(
            Attribute::parse("PeakPower"),
            Err(ModelError::UnknownAttribute(_))
        ));
    }
}
