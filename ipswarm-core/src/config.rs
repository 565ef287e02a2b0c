use crate::{ConfigError, TaskWeights, WaitTime};
use std::num::NonZeroU32;
use std::time::Duration;

/// Everything a Scenario run needs. Usually built through the `Scenario` builder methods.
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    pub name: String,
    pub host: String,
    pub users: usize,
    /// Users started per second. `None` starts every user at once.
    pub spawn_rate: Option<NonZeroU32>,
    pub duration: Option<Duration>,
    /// Iterations each user runs before it stops.
    pub iterations: Option<u64>,
    pub wait_time: WaitTime,
    pub weights: TaskWeights,
}

impl ScenarioConfig {
    pub fn new(name: &str, host: &str) -> Self {
        Self {
            name: name.to_string(),
            host: host.to_string(),
            users: 1,
            spawn_rate: None,
            duration: None,
            iterations: None,
            wait_time: WaitTime::default(),
            weights: TaskWeights::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.users == 0 {
            return Err(ConfigError::NoUsers);
        }
        self.weights.validate()
    }

    /// Whether the scenario stops on its own.
    pub fn is_bounded(&self) -> bool {
        self.duration.is_some() || self.iterations.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate() {
        let mut config = ScenarioConfig::new("test", "http://localhost:8080");
        assert_eq!(config.validate(), Ok(()));
        assert!(!config.is_bounded());

        config.iterations = Some(1);
        assert!(config.is_bounded());

        config.users = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoUsers));

        config.users = 2;
        config.weights = TaskWeights::new(0, 0, 0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroWeights));
    }
}
