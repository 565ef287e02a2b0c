use crate::{
    ConfigError, DEFAULT_FIXED_IP_WEIGHT, DEFAULT_RANDOM_FIXED_IPS_WEIGHT,
    DEFAULT_RANDOM_IP_WEIGHT,
};
use std::fmt;
use std::str::FromStr;

/// Relative selection frequency of each task a simulated user can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskWeights {
    pub fixed_ip: u32,
    pub random_fixed_ips: u32,
    pub random_ip: u32,
}

impl TaskWeights {
    pub fn new(fixed_ip: u32, random_fixed_ips: u32, random_ip: u32) -> Self {
        Self {
            fixed_ip,
            random_fixed_ips,
            random_ip,
        }
    }

    /// Weights must not all be zero, and their sum must fit in a `u32`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.total() {
            0 => Err(ConfigError::ZeroWeights),
            total if total > u32::MAX as u64 => Err(ConfigError::WeightsOverflow(total)),
            _ => Ok(()),
        }
    }

    pub fn total(&self) -> u64 {
        self.fixed_ip as u64 + self.random_fixed_ips as u64 + self.random_ip as u64
    }
}

impl Default for TaskWeights {
    fn default() -> Self {
        Self::new(
            DEFAULT_FIXED_IP_WEIGHT,
            DEFAULT_RANDOM_FIXED_IPS_WEIGHT,
            DEFAULT_RANDOM_IP_WEIGHT,
        )
    }
}

/// Parses `fixed_ip,random_fixed_ips,random_ip`, e.g. `4,3,1`.
impl FromStr for TaskWeights {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || ConfigError::WeightsSyntax(s.to_string());

        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<u32>().map_err(|_| syntax()))
            .collect::<Result<Vec<_>, _>>()?;

        match parts[..] {
            [fixed_ip, random_fixed_ips, random_ip] => {
                let weights = Self::new(fixed_ip, random_fixed_ips, random_ip);
                weights.validate()?;
                Ok(weights)
            }
            _ => Err(syntax()),
        }
    }
}

impl fmt::Display for TaskWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.fixed_ip, self.random_fixed_ips, self.random_ip
        )
    }
}
