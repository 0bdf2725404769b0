//! The single coordinator for a project's state file.

use crate::error::{Result, StateError};
use crate::state::{Progress, StepDetails, WorkflowState};
use crate::step::WorkflowStep;
use crate::validate::validate_value;
use gearshift_common_config::GearshiftConfig;
use gearshift_common_core::{Route, Timestamp};
use gearshift_common_fs::nonblocking as fs;
use gearshift_common_log::spans::{instrument_future, step_span};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Owns the workflow state file for one project directory.
///
/// All mutation goes through [`StateStore::update`], which holds an
/// internal lock across the load, mutate and write. Separate processes
/// writing the same file are not coordinated: the last rename wins.
#[derive(Debug)]
pub struct StateStore {
    project_dir: PathBuf,
    path: PathBuf,
    max_bytes: u64,
    default_route: Option<Route>,
    lock: Mutex<()>,
}

impl StateStore {
    /// Store with default configuration.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(project_dir, &GearshiftConfig::default())
    }

    pub fn with_config(project_dir: impl Into<PathBuf>, config: &GearshiftConfig) -> Self {
        let project_dir = project_dir.into();
        let path = project_dir.join(&config.workflow.state_file);
        Self {
            project_dir,
            path,
            max_bytes: config.limits.max_state_file_bytes,
            default_route: config.workflow.default_route,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub async fn exists(&self) -> bool {
        fs::exists(&self.path).await
    }

    /// Create the state file, or return the existing one untouched.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn initialize(&self, route: Option<Route>) -> Result<WorkflowState> {
        let _guard = self.lock.lock().await;

        if self.exists().await {
            debug!("state file already present");
            return self.read().await;
        }

        let state = WorkflowState::new(&self.project_dir, route.or(self.default_route));
        self.write(&state).await?;
        info!(route = ?state.route, "workflow initialized");
        Ok(state)
    }

    /// Load and validate the state file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<WorkflowState> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Load, apply `mutate`, stamp `updated`, validate, write atomically.
    ///
    /// Nothing is written if `mutate` fails or the result is invalid.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn update<F>(&self, mutate: F) -> Result<WorkflowState>
    where
        F: FnOnce(&mut WorkflowState) -> Result<()>,
    {
        let _guard = self.lock.lock().await;

        let mut state = self.read().await?;
        mutate(&mut state)?;
        state.updated = Timestamp::now();
        self.write(&state).await?;
        Ok(state)
    }

    /// Mark `step` complete, merging `details` into its record.
    pub async fn complete_step(
        &self,
        step: WorkflowStep,
        details: Option<StepDetails>,
    ) -> Result<WorkflowState> {
        let fut = async {
            let state = self
                .update(|s| {
                    s.complete_step(step, details, Timestamp::now());
                    Ok(())
                })
                .await?;
            info!(next = ?state.current_step, "step completed");
            Ok::<_, StateError>(state)
        };
        instrument_future(fut, step_span(step.as_str())).await
    }

    /// Stamp the start time of `step`.
    pub async fn start_step(&self, step: WorkflowStep) -> Result<WorkflowState> {
        let fut = async {
            let state = self
                .update(|s| {
                    s.start_step(step, Timestamp::now());
                    Ok(())
                })
                .await?;
            info!("step started");
            Ok::<_, StateError>(state)
        };
        instrument_future(fut, step_span(step.as_str())).await
    }

    pub async fn set_route(&self, route: Route) -> Result<WorkflowState> {
        self.update(|s| {
            s.route = Some(route);
            Ok(())
        })
        .await
    }

    pub async fn progress(&self) -> Result<Progress> {
        Ok(self.load().await?.progress())
    }

    async fn read(&self) -> Result<WorkflowState> {
        let text = fs::read_to_string(&self.path, self.max_bytes).await?;
        let raw: Value = serde_json::from_str(&text)?;
        validate_value(&raw)?;
        Ok(serde_json::from_value(raw)?)
    }

    async fn write(&self, state: &WorkflowState) -> Result<()> {
        let raw = serde_json::to_value(state)?;
        validate_value(&raw)?;

        let mut text = serde_json::to_string_pretty(&raw)?;
        text.push('\n');
        fs::write_string_atomic(&self.path, &text).await?;
        debug!(bytes = text.len(), "state written");
        Ok(())
    }
}
