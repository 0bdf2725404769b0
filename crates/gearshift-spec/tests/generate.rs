//! Generation from files on disk through to written artifacts.

use gearshift_common_config::GearshiftConfig;
use gearshift_common_core::Route;
use gearshift_common_fs::{FsError, OutputPolicy};
use gearshift_spec::{GeneratorInput, SpecError, SpecGenerator};
use gearshift_test_utils::fixtures::{SAMPLE_CONSTITUTION_DOC, SAMPLE_DEBT_DOC, SAMPLE_FEATURES_DOC};
use gearshift_test_utils::{temp_dir, write_file};
use pretty_assertions::assert_eq;

fn analysis_text() -> String {
    format!("{SAMPLE_CONSTITUTION_DOC}\n{SAMPLE_FEATURES_DOC}")
}

#[tokio::test]
async fn documents_on_disk_become_specs_on_disk() {
    let dir = temp_dir();
    let analysis = write_file(dir.path(), "analysis.md", &analysis_text());
    let debt = write_file(dir.path(), "debt.md", SAMPLE_DEBT_DOC);
    let out = dir.path().join("specs");

    let input = GeneratorInput::load(&analysis, Some(debt.as_path()), Route::Brownfield, 1 << 20)
        .await
        .unwrap();
    let generator = SpecGenerator::new();
    let specs = generator.generate(&input).unwrap();
    let written = generator
        .write_outputs(&specs, &out, &OutputPolicy::default())
        .await
        .unwrap();

    assert_eq!(written.len(), 6);
    assert!(out.join("constitution.md").exists());
    assert!(out.join("features/002-data-export.md").exists());

    let plan = std::fs::read_to_string(out.join("plans/002-data-export-plan.md")).unwrap();
    assert!(plan.contains("# Implementation Plan: Data Export"));
    assert!(plan.contains("- CSV export of projects"));
    assert!(plan.contains("**Estimated Effort:** 21 hours (~3 days)"));

    let notifications = std::fs::read_to_string(out.join("plans/003-notifications-plan.md")).unwrap();
    assert!(notifications.contains("Depends on: Data Export, User Authentication"));
}

#[tokio::test]
async fn disallowed_extension_writes_nothing() {
    let dir = temp_dir();
    let out = dir.path().join("specs");
    let input = GeneratorInput::new(
        gearshift_markdown::Document::parse("analysis.md", analysis_text()).unwrap(),
        Route::Greenfield,
    );

    let generator = SpecGenerator::new();
    let specs = generator.generate(&input).unwrap();
    let policy = OutputPolicy::new(vec!["txt".into()], vec![]);

    let err = generator.write_outputs(&specs, &out, &policy).await.unwrap_err();
    assert!(matches!(err, SpecError::Fs(FsError::PathNotAllowed { .. })));
    assert!(!out.exists());
}

#[tokio::test]
async fn relative_output_dir_is_rejected() {
    let input = GeneratorInput::new(
        gearshift_markdown::Document::parse("analysis.md", analysis_text()).unwrap(),
        Route::Greenfield,
    );
    let generator = SpecGenerator::new();
    let specs = generator.generate(&input).unwrap();

    let err = generator
        .write_outputs(&specs, "specs", &OutputPolicy::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SpecError::Fs(FsError::PathNotAllowed { .. })));
}

#[tokio::test]
async fn unterminated_fence_reports_line() {
    let dir = temp_dir();
    let analysis = write_file(dir.path(), "analysis.md", "# Purpose\n\n```rust\nfn main() {}\n");

    let err = GeneratorInput::load(&analysis, None, Route::Greenfield, 1 << 20)
        .await
        .unwrap_err();
    match err {
        SpecError::Parse(e) => assert_eq!(e.line(), 3),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn oversized_input_is_rejected() {
    let dir = temp_dir();
    let analysis = write_file(dir.path(), "analysis.md", &analysis_text());

    let err = GeneratorInput::load(&analysis, None, Route::Greenfield, 16)
        .await
        .unwrap_err();
    assert!(matches!(err, SpecError::Fs(FsError::TooLarge { .. })));
}

#[tokio::test]
async fn configured_allowlist_and_output_dir_are_used() {
    let dir = temp_dir();
    let input = GeneratorInput::new(
        gearshift_markdown::Document::parse("analysis.md", analysis_text()).unwrap(),
        Route::Greenfield,
    );

    let mut config = GearshiftConfig::default();
    config.output.output_dir = "docs/generated".to_string();
    let generator = SpecGenerator::with_config(&config);
    let specs = generator.generate(&input).unwrap();
    let written = generator.write_project(&specs, dir.path()).await.unwrap();
    assert_eq!(written.len(), generator.render(&specs).unwrap().len());
    assert!(dir.path().join("docs/generated/constitution.md").exists());

    config.output.allowed_extensions = vec!["txt".to_string()];
    let generator = SpecGenerator::with_config(&config);
    let err = generator
        .write_project(&specs, dir.path().join("other"))
        .await
        .unwrap_err();
    assert!(matches!(err, SpecError::Fs(FsError::PathNotAllowed { .. })));
    assert!(!dir.path().join("other").exists());
}

#[tokio::test]
async fn configured_read_limit_is_used() {
    let dir = temp_dir();
    let analysis = write_file(dir.path(), "analysis.md", &analysis_text());

    let mut config = GearshiftConfig::default();
    config.limits.max_read_file_bytes = 32;
    let err = GeneratorInput::load_with_config(&analysis, None, Route::Greenfield, &config)
        .await
        .unwrap_err();
    assert!(matches!(err, SpecError::Fs(FsError::TooLarge { limit: 32, .. })));

    let input = GeneratorInput::load_with_config(&analysis, None, Route::Greenfield, &GearshiftConfig::default())
        .await
        .unwrap();
    assert_eq!(input.route, Route::Greenfield);
}
