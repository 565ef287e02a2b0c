use std::time::Duration;

/// Path prefix every generated request is issued under.
pub const REST_PREFIX: &str = "/rest/v1";

/// Lower bound of the default wait between two iterations of a user.
pub const DEFAULT_MIN_WAIT: Duration = Duration::from_secs(1);

/// Upper bound of the default wait between two iterations of a user.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(2);

pub const DEFAULT_FIXED_IP_WEIGHT: u32 = 4;
pub const DEFAULT_RANDOM_FIXED_IPS_WEIGHT: u32 = 3;
pub const DEFAULT_RANDOM_IP_WEIGHT: u32 = 1;
