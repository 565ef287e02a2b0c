mod config;
mod constants;
mod error;
mod stats;
mod wait;
mod weights;

pub use config::*;
pub use constants::*;
pub use error::*;
pub use stats::*;
pub use wait::*;
pub use weights::*;
