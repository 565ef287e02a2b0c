use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("A scenario needs at least one user")]
    NoUsers,

    #[error("Task weights must not all be zero")]
    ZeroWeights,

    #[error("Task weights add up to {0}, more than {max}", max = u32::MAX)]
    WeightsOverflow(u64),

    #[error("Invalid task weights {0:?}, expected three comma separated integers")]
    WeightsSyntax(String),

    #[error("Wait time minimum {min:?} is larger than maximum {max:?}")]
    WaitTime { min: Duration, max: Duration },
}
