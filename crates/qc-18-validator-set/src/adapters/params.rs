//! Static parameter source with height-versioned upgrades.

use crate::domain::params::ValidatorParams;
use crate::ports::outbound::ParamSource;
use std::collections::BTreeMap;

/// Parameter schedule fixed at construction.
///
/// `validator_params(h)` returns the entry with the greatest activation
/// height `<= h`.
#[derive(Debug, Clone)]
pub struct StaticParamSource {
    schedule: BTreeMap<u64, ValidatorParams>,
}

impl StaticParamSource {
    pub fn new(params: ValidatorParams) -> Self {
        let mut schedule = BTreeMap::new();
        schedule.insert(0, params);
        Self { schedule }
    }

    /// Activate `params` from `height` onwards.
    pub fn with_upgrade(mut self, height: u64, params: ValidatorParams) -> Self {
        self.schedule.insert(height, params);
        self
    }
}

impl Default for StaticParamSource {
    fn default() -> Self {
        Self::new(ValidatorParams::default())
    }
}

impl ParamSource for StaticParamSource {
    fn validator_params(&self, height: u64) -> Result<ValidatorParams, String> {
        self.schedule
            .range(..=height)
            .next_back()
            .map(|(_, params)| params.clone())
            .ok_or_else(|| format!("no validator params at height {height}"))
    }
}
