//! Template data for generated artifacts.

use crate::constitution::ConstitutionData;
use crate::error::Result;
use crate::features::Feature;
use crate::plan::ImplementationPlan;
use gearshift_template::{builtin, TemplateRegistry};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Renders records through a [`TemplateRegistry`].
///
/// Empty lists are truthy in templates, so every optional block gets an
/// explicit `has*` flag.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRenderer {
    registry: TemplateRegistry,
}

impl ArtifactRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: TemplateRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn constitution_data(constitution: &ConstitutionData) -> Value {
        json!({
            "route": constitution.route.as_str(),
            "purpose": constitution.purpose,
            "values": constitution.values,
            "technicalStack": constitution.technical_stack,
            "developmentStandards": constitution.development_standards,
            "qualityMetrics": constitution.quality_metrics,
            "governance": constitution.governance,
        })
    }

    pub fn feature_data(feature: &Feature) -> Value {
        let requirements: Vec<Value> = feature
            .technical_requirements
            .iter()
            .flat_map(|reqs| reqs.buckets())
            .flat_map(|(category, items)| {
                items
                    .iter()
                    .map(move |item| json!({"category": category, "item": item}))
            })
            .collect();

        json!({
            "id": feature.id,
            "name": feature.name,
            "slug": feature.slug,
            "status": feature.status.as_str(),
            "description": feature.description,
            "hasUserStories": !feature.user_stories.is_empty(),
            "userStories": feature.user_stories,
            "hasAcceptanceCriteria": !feature.acceptance_criteria.is_empty(),
            "acceptanceCriteria": feature.acceptance_criteria,
            "hasDependencies": !feature.dependencies.is_empty(),
            "dependencies": feature.dependencies,
            "hasTechnicalRequirements": !requirements.is_empty(),
            "technicalRequirements": requirements,
        })
    }

    pub fn plan_data(plan: &ImplementationPlan) -> Value {
        let tasks: Vec<Value> = plan
            .tasks
            .iter()
            .map(|t| {
                let depends_on = if t.dependencies.is_empty() {
                    Value::Null
                } else {
                    Value::String(t.dependencies.join(", "))
                };
                json!({
                    "id": t.id,
                    "category": t.category.to_string(),
                    "estimatedHours": t.estimated_hours,
                    "description": t.description,
                    "dependsOn": depends_on,
                })
            })
            .collect();

        let risks: Vec<Value> = plan
            .risks
            .iter()
            .map(|r| {
                json!({
                    "description": r.description,
                    "probability": r.probability.to_string(),
                    "impact": r.impact.to_string(),
                    "mitigation": r.mitigation,
                })
            })
            .collect();

        json!({
            "featureName": plan.feature_name,
            "featureId": plan.feature_id,
            "estimatedEffort": plan.estimated_effort,
            "currentState": plan.current_state,
            "targetState": plan.target_state,
            "technicalApproach": plan.technical_approach,
            "tasks": tasks,
            "risks": risks,
            "hasDependencies": !plan.dependencies.is_empty(),
            "dependencies": plan.dependencies,
        })
    }

    pub fn render_constitution(&self, constitution: &ConstitutionData) -> Result<String> {
        Ok(self
            .registry
            .render(builtin::CONSTITUTION, &Self::constitution_data(constitution))?)
    }

    pub fn render_feature(&self, feature: &Feature) -> Result<String> {
        Ok(self
            .registry
            .render(builtin::FEATURE_SPEC, &Self::feature_data(feature))?)
    }

    pub fn render_plan(&self, plan: &ImplementationPlan) -> Result<String> {
        Ok(self
            .registry
            .render(builtin::IMPLEMENTATION_PLAN, &Self::plan_data(plan))?)
    }

    pub fn constitution_path() -> PathBuf {
        PathBuf::from("constitution.md")
    }

    /// `features/{id}-{slug}.md`
    pub fn feature_path(feature: &Feature) -> PathBuf {
        PathBuf::from("features").join(format!("{}-{}.md", feature.id, feature.slug))
    }

    /// `plans/{id}-{slug}-plan.md`
    pub fn plan_path(plan: &ImplementationPlan) -> PathBuf {
        PathBuf::from("plans").join(format!("{}-{}-plan.md", plan.feature_id, plan.feature_slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constitution::extract_constitution;
    use crate::features::extract_features;
    use crate::plan::generate_plan;
    use gearshift_common_core::Route;
    use gearshift_markdown::Document;
    use gearshift_test_utils::fixtures::{LOGIN_FEATURE_DOC, SAMPLE_CONSTITUTION_DOC, SAMPLE_FEATURES_DOC};

    fn login() -> Feature {
        let doc = Document::parse("login.md", LOGIN_FEATURE_DOC).unwrap();
        extract_features(&doc, None).unwrap().remove(0)
    }

    #[test]
    fn test_feature_markdown() {
        let out = ArtifactRenderer::new().render_feature(&login()).unwrap();

        assert!(out.starts_with("# Feature 001: Login\n"));
        assert!(out.contains("**Status:** PARTIAL"));
        assert!(out.contains("## User Stories\n\n- As a user, I want to log in"));
        assert!(out.contains("- [x] Can submit credentials\n- [ ] Can recover password\n"));
        assert!(!out.contains("## Dependencies"));
        assert!(!out.contains("## Technical Requirements"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn test_technical_requirements_flattened() {
        let doc = Document::parse("features.md", SAMPLE_FEATURES_DOC).unwrap();
        let export = extract_features(&doc, None).unwrap().remove(1);
        let data = ArtifactRenderer::feature_data(&export);

        assert_eq!(data["technicalRequirements"].as_array().unwrap().len(), 6);
        assert_eq!(data["technicalRequirements"][1]["category"], "Endpoint");

        let out = ArtifactRenderer::new().render_feature(&export).unwrap();
        assert!(out.contains("- **Database:** Database: export_jobs table"));
    }

    #[test]
    fn test_plan_markdown() {
        let plan = generate_plan(&login(), None);
        let out = ArtifactRenderer::new().render_plan(&plan).unwrap();

        assert!(out.starts_with("# Implementation Plan: Login\n"));
        assert!(out.contains("**Estimated Effort:** 20 hours (~3 days)"));
        assert!(out.contains("- [ ] **T001-1** (Design, 4h): Design Login\n"));
        assert!(out.contains("(Testing, 6h): Write tests for Login (depends on T001-2)"));
        assert!(out.contains("(probability: Medium, impact: Medium)"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn test_constitution_markdown() {
        let doc = Document::parse("analysis.md", SAMPLE_CONSTITUTION_DOC).unwrap();
        let c = extract_constitution(&doc, Route::Brownfield).unwrap();
        let out = ArtifactRenderer::new().render_constitution(&c).unwrap();

        assert!(out.contains("**Route:** brownfield"));
        assert!(out.contains("- **Languages:** Rust, TypeScript"));
        assert!(out.contains("- **Build Tools:** Cargo, pnpm"));
        assert!(out.contains("- **Testing:** Unit tests accompany every module"));
        assert!(out.contains("- **Performance:** API p95 latency under 200ms"));

        let greenfield = extract_constitution(&doc, Route::Greenfield).unwrap();
        let out = ArtifactRenderer::new().render_constitution(&greenfield).unwrap();
        assert!(!out.contains("## Technical Stack"));
    }

    #[test]
    fn test_output_paths() {
        let f = login();
        assert_eq!(ArtifactRenderer::feature_path(&f), PathBuf::from("features/001-login.md"));
        let plan = generate_plan(&f, None);
        assert_eq!(ArtifactRenderer::plan_path(&plan), PathBuf::from("plans/001-login-plan.md"));
    }
}
