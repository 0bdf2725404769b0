//! Built-in artifact templates.

pub const CONSTITUTION: &str = "constitution";
pub const FEATURE_SPEC: &str = "feature-spec";
pub const IMPLEMENTATION_PLAN: &str = "implementation-plan";

pub(crate) const CONSTITUTION_TEMPLATE: &str = "\
# Project Constitution

**Route:** {{route}}

## Purpose

{{purpose}}

## Core Values

{{#each values}}- {{this}}
{{/each}}{{#if technicalStack}}
## Technical Stack

- **Languages:** {{technicalStack.languages}}
- **Frameworks:** {{technicalStack.frameworks}}
- **Databases:** {{technicalStack.databases}}
- **Infrastructure:** {{technicalStack.infrastructure}}
- **Build Tools:** {{technicalStack.buildTools}}
{{/if}}
## Development Standards

{{#each developmentStandards}}- **{{category}}:** {{rule}}
{{/each}}
## Quality Metrics

{{#each qualityMetrics}}- **{{category}}:** {{metric}}
{{/each}}
## Governance

- **Amendments:** {{governance.amendmentProcess}}
- **Versioning:** {{governance.versioning}}
- **Compliance Review:** {{governance.complianceReview}}
";

pub(crate) const FEATURE_SPEC_TEMPLATE: &str = "\
# Feature {{id}}: {{name}}

**Status:** {{status}}

## Description

{{description}}
{{#if hasUserStories}}
## User Stories

{{#each userStories}}- {{rawText}}
{{/each}}{{/if}}{{#if hasAcceptanceCriteria}}
## Acceptance Criteria

{{#each acceptanceCriteria}}- [{{#if checked}}x{{else}} {{/if}}] {{description}}
{{/each}}{{/if}}{{#if hasDependencies}}
## Dependencies

{{#each dependencies}}- {{this}}
{{/each}}{{/if}}{{#if hasTechnicalRequirements}}
## Technical Requirements

{{#each technicalRequirements}}- **{{category}}:** {{item}}
{{/each}}{{/if}}";

pub(crate) const IMPLEMENTATION_PLAN_TEMPLATE: &str = "\
# Implementation Plan: {{featureName}}

**Feature:** {{featureId}}
**Estimated Effort:** {{estimatedEffort}}

## Current State

{{currentState}}

## Target State

{{targetState}}

## Technical Approach

{{technicalApproach}}

## Tasks

{{#each tasks}}- [ ] **{{id}}** ({{category}}, {{estimatedHours}}h): {{description}}{{#if dependsOn}} (depends on {{dependsOn}}){{/if}}
{{/each}}
## Risks

{{#each risks}}- **{{description}}** (probability: {{probability}}, impact: {{impact}}). Mitigation: {{mitigation}}
{{/each}}{{#if hasDependencies}}
## Dependencies

{{#each dependencies}}- {{this}}
{{/each}}{{/if}}";

/// Name/source pairs registered by [`crate::TemplateRegistry::new`].
pub(crate) fn all() -> [(&'static str, &'static str); 3] {
    [
        (CONSTITUTION, CONSTITUTION_TEMPLATE),
        (FEATURE_SPEC, FEATURE_SPEC_TEMPLATE),
        (IMPLEMENTATION_PLAN, IMPLEMENTATION_PLAN_TEMPLATE),
    ]
}
