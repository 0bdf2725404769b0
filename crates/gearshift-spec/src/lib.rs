//! Specification generation from reverse-engineered documentation.
//!
//! Analysis documents are parsed with `gearshift-markdown`, mined for a
//! project constitution and a feature list, classified against an
//! optional technical-debt document, turned into implementation plans for
//! unfinished features and finally rendered through `gearshift-template`.

pub mod constitution;
pub mod error;
pub mod features;
pub mod generator;
pub mod plan;
pub mod render;
pub mod status;

pub use constitution::{
    extract_constitution, ConstitutionData, Governance, QualityMetric, Standard, TechnicalStack,
};
pub use error::{ErrorDetails, ExtractionError, ExtractionPhase, Result, SpecError};
pub use features::{
    extract_features, extract_features_with, AcceptanceCriterion, Feature, FeatureStatus,
    TechnicalRequirements, UserStory,
};
pub use generator::{GeneratedSpecs, GeneratorInput, RenderedArtifact, SpecGenerator};
pub use plan::{
    format_effort, generate_plan, generate_plans, ImplementationPlan, Risk, RiskLevel, Task,
    TaskCategory,
};
pub use render::ArtifactRenderer;
pub use status::{detect_status, HeuristicStatusDetector, StatusDecision, StatusSource, StatusStrategy};
