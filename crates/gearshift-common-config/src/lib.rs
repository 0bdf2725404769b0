//! Configuration for gearshift.
//!
//! Projects carry an optional `.gearshift/config.yaml`; every section falls
//! back to defaults when absent.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
