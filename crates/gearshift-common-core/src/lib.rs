//! Gearshift common core types and utilities.

pub mod error;
pub mod timestamp;
pub mod types;

pub use error::{Error, Result};
pub use timestamp::Timestamp;
pub use types::*;
