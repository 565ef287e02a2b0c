//! Weighted task selection
use crate::selector;
use ipswarm_core::{
    ConfigError, TaskWeights, DEFAULT_FIXED_IP_WEIGHT, DEFAULT_RANDOM_FIXED_IPS_WEIGHT,
    DEFAULT_RANDOM_IP_WEIGHT,
};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::fmt;

/// The behaviours a simulated user picks from on every iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Policy {
    /// Request the three fixed addresses in order.
    FixedIp,
    /// Request one address drawn from the fixed pool.
    RandomFixedIps,
    /// Request one freshly generated address.
    RandomIp,
}

impl Policy {
    pub const ALL: [Policy; 3] = [Policy::FixedIp, Policy::RandomFixedIps, Policy::RandomIp];

    pub fn name(self) -> &'static str {
        match self {
            Policy::FixedIp => "fixed_ip",
            Policy::RandomFixedIps => "random_fixed_ips",
            Policy::RandomIp => "random_ip",
        }
    }

    pub fn default_weight(self) -> u32 {
        match self {
            Policy::FixedIp => DEFAULT_FIXED_IP_WEIGHT,
            Policy::RandomFixedIps => DEFAULT_RANDOM_FIXED_IPS_WEIGHT,
            Policy::RandomIp => DEFAULT_RANDOM_IP_WEIGHT,
        }
    }

    pub fn weight(self, weights: &TaskWeights) -> u32 {
        match self {
            Policy::FixedIp => weights.fixed_ip,
            Policy::RandomFixedIps => weights.random_fixed_ips,
            Policy::RandomIp => weights.random_ip,
        }
    }

    /// Addresses this policy requests for one iteration, in request order.
    pub fn targets<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<String> {
        match self {
            Policy::FixedIp => selector::fixed_ips().iter().map(|ip| ip.to_string()).collect(),
            Policy::RandomFixedIps => vec![selector::random_fixed_ip_with(rng).to_string()],
            Policy::RandomIp => vec![selector::random_ip_with(rng)],
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Picks a [`Policy`] per iteration according to the configured weights.
#[derive(Clone, Debug)]
pub struct TaskSet {
    index: WeightedIndex<u32>,
}

impl TaskSet {
    pub fn new(weights: &TaskWeights) -> Result<Self, ConfigError> {
        weights.validate()?;
        let index = WeightedIndex::new(Policy::ALL.iter().map(|policy| policy.weight(weights)))
            .map_err(|_| ConfigError::ZeroWeights)?;
        Ok(Self { index })
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Policy {
        Policy::ALL[self.index.sample(rng)]
    }
}
