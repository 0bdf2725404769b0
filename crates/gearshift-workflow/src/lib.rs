//! Workflow state for the six-step gearshift pipeline.
//!
//! The state file is owned by one [`StateStore`] per project directory.
//! Every mutation is a load, mutate, validate, atomic-write cycle.

pub mod error;
pub mod state;
pub mod step;
pub mod store;
pub mod validate;

pub use error::{Result, StateError, ValidationError};
pub use state::{ProjectMetadata, Progress, StepDetails, WorkflowState, STATE_VERSION};
pub use step::WorkflowStep;
pub use store::StateStore;
pub use validate::validate_value;
