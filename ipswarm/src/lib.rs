#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Lets `#[transaction]` expand to `::ipswarm::...` paths inside this crate too.
extern crate self as ipswarm;

mod error;
pub mod scenario;
pub mod selector;
pub mod task;
#[doc(hidden)]
pub mod transaction;
pub mod user;

pub use error::Error;
pub use ipswarm_core::{ConfigError, RunStatistics, TaskWeights, WaitTime};
pub use ipswarm_macros::transaction;
pub use scenario::Scenario;

pub mod prelude {
    pub use crate::scenario::{Scenario, StopSignal};
    pub use crate::task::Policy;
    pub use ipswarm_core::{RunStatistics, TaskWeights, WaitTime};
    pub use ipswarm_macros::transaction;
    pub use std::num::NonZeroU32;
}
