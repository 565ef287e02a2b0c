use crate::{ConfigError, DEFAULT_MAX_WAIT, DEFAULT_MIN_WAIT};
use rand::Rng;
use std::fmt;
use std::time::Duration;

/// Pause a simulated user takes between two iterations.
///
/// Sampled uniformly from the inclusive `[min, max]` range. A constant wait is a range with
/// equal bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitTime {
    min: Duration,
    max: Duration,
}

impl WaitTime {
    pub fn between(min: Duration, max: Duration) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::WaitTime { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn constant(wait: Duration) -> Self {
        Self {
            min: wait,
            max: wait,
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

impl Default for WaitTime {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_WAIT,
            max: DEFAULT_MAX_WAIT,
        }
    }
}

impl fmt::Display for WaitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", humantime::format_duration(self.min))
        } else {
            write!(
                f,
                "{}..{}",
                humantime::format_duration(self.min),
                humantime::format_duration(self.max)
            )
        }
    }
}
