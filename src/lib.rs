pub mod config;
pub mod error;
pub mod fetch;
pub mod handover;
pub mod output;
pub mod parser;
pub mod station;
pub mod summary;
pub mod zone;

pub use error::{Error, Result};
pub use station::{HandoverRange, StationRecord};
pub use zone::{BuildType, Zone};
