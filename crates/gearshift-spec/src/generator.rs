//! End-to-end generation: documents in, artifacts out.

use crate::constitution::{extract_constitution, ConstitutionData};
use crate::error::Result;
use crate::features::{extract_features_with, Feature, FeatureStatus};
use crate::plan::{generate_plans, ImplementationPlan};
use crate::render::ArtifactRenderer;
use crate::status::{HeuristicStatusDetector, StatusStrategy};
use gearshift_common_config::{GearshiftConfig, OutputConfig};
use gearshift_common_core::Route;
use gearshift_common_fs::{FsError, OutputPolicy};
use gearshift_common_log::spans::Timer;
use gearshift_markdown::Document;
use gearshift_template::{TemplateLimits, TemplateRegistry};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Documents a generation run reads.
#[derive(Debug, Clone)]
pub struct GeneratorInput {
    /// Analysis document holding both the constitution sections and the feature list.
    pub analysis_doc: Document,
    /// Optional technical-debt document used for status detection.
    pub debt_doc: Option<Document>,
    pub route: Route,
}

impl GeneratorInput {
    pub fn new(analysis_doc: Document, route: Route) -> Self {
        Self {
            analysis_doc,
            debt_doc: None,
            route,
        }
    }

    pub fn with_debt(mut self, debt_doc: Document) -> Self {
        self.debt_doc = Some(debt_doc);
        self
    }

    /// Read and parse the input documents from disk.
    pub async fn load(
        analysis_path: impl AsRef<Path>,
        debt_path: Option<&Path>,
        route: Route,
        max_bytes: u64,
    ) -> Result<Self> {
        let analysis_doc = Document::load_async(analysis_path, max_bytes).await?;
        let debt_doc = match debt_path {
            Some(path) => Some(Document::load_async(path, max_bytes).await?),
            None => None,
        };
        Ok(Self {
            analysis_doc,
            debt_doc,
            route,
        })
    }

    /// [`GeneratorInput::load`] with the read ceiling from `config`.
    pub async fn load_with_config(
        analysis_path: impl AsRef<Path>,
        debt_path: Option<&Path>,
        route: Route,
        config: &GearshiftConfig,
    ) -> Result<Self> {
        Self::load(analysis_path, debt_path, route, config.limits.max_read_file_bytes).await
    }
}

/// Everything derived from one [`GeneratorInput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSpecs {
    pub constitution: ConstitutionData,
    pub features: Vec<Feature>,
    pub plans: Vec<ImplementationPlan>,
}

impl GeneratedSpecs {
    pub fn count_by_status(&self, status: FeatureStatus) -> usize {
        self.features.iter().filter(|f| f.status == status).count()
    }
}

/// A rendered file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub path: PathBuf,
    pub contents: String,
}

/// Runs extraction, planning and rendering.
pub struct SpecGenerator {
    renderer: ArtifactRenderer,
    strategy: Box<dyn StatusStrategy>,
    policy: OutputPolicy,
    output_dir: PathBuf,
}

impl Default for SpecGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SpecGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecGenerator")
            .field("renderer", &self.renderer)
            .field("policy", &self.policy)
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

impl SpecGenerator {
    pub fn new() -> Self {
        Self {
            renderer: ArtifactRenderer::new(),
            strategy: Box::new(HeuristicStatusDetector),
            policy: OutputPolicy::default(),
            output_dir: PathBuf::from(OutputConfig::default().output_dir),
        }
    }

    /// Template limits, write policy and output directory taken from `config`.
    pub fn with_config(config: &GearshiftConfig) -> Self {
        let limits = TemplateLimits::from(&config.limits);
        Self::new()
            .with_renderer(ArtifactRenderer::with_registry(TemplateRegistry::with_limits(limits)))
            .with_policy(config.output.policy())
            .with_output_dir(&config.output.output_dir)
    }

    pub fn with_policy(mut self, policy: OutputPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Output directory, relative to the project directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn policy(&self) -> &OutputPolicy {
        &self.policy
    }

    pub fn with_strategy(mut self, strategy: Box<dyn StatusStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_renderer(mut self, renderer: ArtifactRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn renderer(&self) -> &ArtifactRenderer {
        &self.renderer
    }

    /// Extract the constitution and features, then plan unfinished features.
    #[instrument(skip_all, fields(route = input.route.as_str()))]
    pub fn generate(&self, input: &GeneratorInput) -> Result<GeneratedSpecs> {
        let timer = Timer::start("generate");
        let debt = input.debt_doc.as_ref();

        let constitution = extract_constitution(&input.analysis_doc, input.route)?;
        let features = extract_features_with(&input.analysis_doc, debt, self.strategy.as_ref())?;
        let plans = generate_plans(&features, debt)?;

        let specs = GeneratedSpecs {
            constitution,
            features,
            plans,
        };
        info!(
            features = specs.features.len(),
            complete = specs.count_by_status(FeatureStatus::Complete),
            partial = specs.count_by_status(FeatureStatus::Partial),
            missing = specs.count_by_status(FeatureStatus::Missing),
            plans = specs.plans.len(),
            elapsed_ms = timer.finish().as_millis() as u64,
            "specifications generated"
        );
        Ok(specs)
    }

    /// Render every artifact in output order: constitution, features, plans.
    pub fn render(&self, specs: &GeneratedSpecs) -> Result<Vec<RenderedArtifact>> {
        let mut artifacts = Vec::with_capacity(1 + specs.features.len() + specs.plans.len());
        artifacts.push(RenderedArtifact {
            path: ArtifactRenderer::constitution_path(),
            contents: self.renderer.render_constitution(&specs.constitution)?,
        });
        for feature in &specs.features {
            artifacts.push(RenderedArtifact {
                path: ArtifactRenderer::feature_path(feature),
                contents: self.renderer.render_feature(feature)?,
            });
        }
        for plan in &specs.plans {
            artifacts.push(RenderedArtifact {
                path: ArtifactRenderer::plan_path(plan),
                contents: self.renderer.render_plan(plan)?,
            });
        }
        Ok(artifacts)
    }

    /// Render and write every artifact under `out_dir` through `policy`.
    ///
    /// Every path is checked before anything is written. Returns the
    /// written paths.
    #[instrument(skip_all, fields(out_dir = %out_dir.as_ref().display()))]
    pub async fn write_outputs(
        &self,
        specs: &GeneratedSpecs,
        out_dir: impl AsRef<Path>,
        policy: &OutputPolicy,
    ) -> Result<Vec<PathBuf>> {
        let out_dir = out_dir.as_ref();
        if !out_dir.is_absolute() {
            return Err(FsError::not_allowed(out_dir, "output directory must be absolute").into());
        }

        let artifacts = self.render(specs)?;
        for artifact in &artifacts {
            policy.check(out_dir.join(&artifact.path))?;
        }

        let mut written = Vec::with_capacity(artifacts.len());
        for artifact in &artifacts {
            let path = policy
                .write_async(out_dir.join(&artifact.path), &artifact.contents)
                .await?;
            written.push(path);
        }
        info!(files = written.len(), "artifacts written");
        Ok(written)
    }

    /// Write every artifact under the configured output directory of
    /// `project_dir`, using the configured policy.
    pub async fn write_project(
        &self,
        specs: &GeneratedSpecs,
        project_dir: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        let out_dir = project_dir.as_ref().join(&self.output_dir);
        self.write_outputs(specs, out_dir, &self.policy).await
    }
}
