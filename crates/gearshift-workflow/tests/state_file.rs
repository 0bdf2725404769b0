//! State store behaviour against real files on disk.

use gearshift_common_config::GearshiftConfig;
use gearshift_common_core::Route;
use gearshift_test_utils::{assert_err, temp_dir};
use gearshift_workflow::{StateError, StateStore, StepDetails, WorkflowStep};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn read_json(store: &StateStore) -> Value {
    serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap()
}

fn write_json(store: &StateStore, value: &Value) {
    std::fs::write(store.path(), serde_json::to_string(value).unwrap()).unwrap();
}

#[tokio::test]
async fn completing_analyze_twice_records_it_once() {
    let dir = temp_dir();
    let store = StateStore::new(dir.path());
    store.initialize(None).await.unwrap();

    store.complete_step(WorkflowStep::Analyze, None).await.unwrap();
    let state = store.complete_step(WorkflowStep::Analyze, None).await.unwrap();

    assert_eq!(state.completed_steps, vec![WorkflowStep::Analyze]);
    assert_eq!(state.current_step, Some(WorkflowStep::ReverseEngineer));

    let on_disk = read_json(&store);
    assert_eq!(on_disk["completedSteps"], json!(["analyze"]));
    assert_eq!(on_disk["currentStep"], json!("reverse-engineer"));
}

#[tokio::test]
async fn full_run_ends_with_null_current_step() {
    let dir = temp_dir();
    let store = StateStore::new(dir.path());
    store.initialize(Some(Route::Brownfield)).await.unwrap();

    for step in WorkflowStep::ALL {
        store.start_step(step).await.unwrap();
        store
            .complete_step(step, Some(StepDetails::with_outputs([format!("{step}.md")])))
            .await
            .unwrap();
    }

    let state = store.load().await.unwrap();
    assert!(state.is_finished());
    assert_eq!(read_json(&store)["currentStep"], Value::Null);

    let progress = store.progress().await.unwrap();
    assert_eq!((progress.completed, progress.total, progress.percent), (6, 6, 100));

    let details = state.details(WorkflowStep::GapAnalysis).unwrap();
    assert!(details.started.is_some());
    assert!(details.completed.is_some());
    assert_eq!(details.outputs, vec!["gap-analysis.md"]);
}

#[tokio::test]
async fn polluted_file_is_rejected() {
    let dir = temp_dir();
    let store = StateStore::new(dir.path());
    store.initialize(None).await.unwrap();

    let mut raw = read_json(&store);
    raw["constructor"] = json!({"prototype": {"admin": true}});
    write_json(&store, &raw);

    let err = assert_err!(store.load().await);
    assert!(matches!(err, StateError::PrototypePollution { ref key } if key == "constructor"));
}

#[tokio::test]
async fn hand_edited_ordering_is_rejected_not_repaired() {
    let dir = temp_dir();
    let store = StateStore::new(dir.path());
    store.initialize(None).await.unwrap();

    let mut raw = read_json(&store);
    raw["completedSteps"] = json!(["implement"]);
    write_json(&store, &raw);
    let before = std::fs::read_to_string(store.path()).unwrap();

    let err = assert_err!(store.complete_step(WorkflowStep::Analyze, None).await);
    match err {
        StateError::Validation(e) => {
            assert_eq!(e.violations.len(), 1);
            assert!(e.violations[0].contains("implement"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
}

#[tokio::test]
async fn malformed_json_is_an_error() {
    let dir = temp_dir();
    let store = StateStore::new(dir.path());
    std::fs::write(store.path(), "{ not json").unwrap();
    assert!(matches!(store.load().await, Err(StateError::Json(_))));
}

#[tokio::test]
async fn oversized_file_is_rejected_before_parsing() {
    let dir = temp_dir();
    let mut config = GearshiftConfig::default();
    config.limits.max_state_file_bytes = 64;
    let store = StateStore::with_config(dir.path(), &config);

    std::fs::write(store.path(), " ".repeat(65)).unwrap();
    let err = assert_err!(store.load().await);
    assert!(matches!(err, StateError::TooLarge { size: 65, limit: 64 }));
}

#[tokio::test]
async fn config_controls_file_name_and_default_route() {
    let dir = temp_dir();
    let mut config = GearshiftConfig::default();
    config.workflow.state_file = "workflow.json".into();
    config.workflow.default_route = Some(Route::Greenfield);
    let store = StateStore::with_config(dir.path(), &config);

    let state = store.initialize(None).await.unwrap();
    assert_eq!(state.route, Some(Route::Greenfield));
    assert!(dir.path().join("workflow.json").exists());
}

#[tokio::test]
async fn writes_leave_no_temp_files() {
    let dir = temp_dir();
    let store = StateStore::new(dir.path());
    store.initialize(None).await.unwrap();
    for step in &WorkflowStep::ALL[..3] {
        store.complete_step(*step, None).await.unwrap();
    }

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![".gearshift-state.json".to_string()]);
}

#[tokio::test]
async fn unknown_detail_keys_round_trip() {
    let dir = temp_dir();
    let store = StateStore::new(dir.path());
    store.initialize(None).await.unwrap();

    let mut raw = read_json(&store);
    raw["stepDetails"] = json!({"analyze": {"featureCount": 4}});
    write_json(&store, &raw);

    store.complete_step(WorkflowStep::Analyze, None).await.unwrap();
    assert_eq!(read_json(&store)["stepDetails"]["analyze"]["featureCount"], json!(4));
}
