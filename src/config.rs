use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Enforce rail-voltage consistency during aggregation (seeds the
    /// per-group flag for groups built through the system).
    pub rail_check: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { rail_check: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Fractional digits for SI-formatted quantities.
    pub round_digits: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { round_digits: 3 }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("powertree.toml"))
            .merge(Env::prefixed("POWERTREE__").split("__"));
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert!(cfg.engine.rail_check);
        assert_eq!(cfg.display.round_digits, 3);
    }
}
