// A panicking site processor must not leave the orchestrator stuck in Running.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{create_test_pool, policy, saved_reports, site_list, test_session, Scripted, ScriptedProcessor};
use library_versioning::{
    ActivityLog, BatchError, BatchOrchestrator, BatchOutcome, BatchState, SqliteReportStore,
};

const GOOD: &str = "https://contoso.sharepoint.com/sites/good";
const BROKEN: &str = "https://contoso.sharepoint.com/sites/broken";

#[tokio::test]
async fn test_processor_panic_fails_batch_and_resets_state() {
    let processor = Arc::new(ScriptedProcessor::new(&[(BROKEN, Scripted::Panic)]));
    let store = Arc::new(SqliteReportStore::new(create_test_pool().await));
    let activity = Arc::new(ActivityLog::default());
    let orchestrator =
        BatchOrchestrator::new(processor.clone(), store.clone(), activity.clone())
            .with_inter_site_delay(Duration::ZERO);
    let session = test_session("token");

    let err = orchestrator
        .run_batch(&site_list(&[GOOD, BROKEN, GOOD]), &policy(), Some(&session))
        .await
        .unwrap_err();

    match err {
        BatchError::ProcessorFault { site, message } => {
            assert_eq!(site, BROKEN);
            assert_eq!(message, "scripted processor fault");
        }
        other => panic!("expected a processor fault, got {other:?}"),
    }
    assert_eq!(orchestrator.state(), BatchState::Failed);
    assert!(!orchestrator.is_processing());
    assert!(orchestrator.affordances().start_enabled);
    assert!(!orchestrator.affordances().stop_enabled);
    assert_eq!(processor.visited().len(), 2, "the batch stops at the fault");
    assert!(saved_reports(store.as_ref()).await.is_empty());
    assert!(activity
        .entries()
        .iter()
        .any(|e| e.message.starts_with(&format!("Batch aborted on {BROKEN}"))));
}

#[tokio::test]
async fn test_new_batch_can_start_after_failure() {
    let processor = Arc::new(ScriptedProcessor::new(&[(BROKEN, Scripted::Panic)]));
    let store = Arc::new(SqliteReportStore::new(create_test_pool().await));
    let orchestrator = BatchOrchestrator::new(
        processor.clone(),
        store.clone(),
        Arc::new(ActivityLog::default()),
    )
    .with_inter_site_delay(Duration::ZERO);
    let session = test_session("token");

    assert!(orchestrator
        .run_batch(&site_list(&[BROKEN]), &policy(), Some(&session))
        .await
        .is_err());

    let outcome = orchestrator
        .run_batch(&site_list(&[GOOD]), &policy(), Some(&session))
        .await
        .expect("a failed batch does not block the next one");
    assert!(matches!(outcome, BatchOutcome::Completed(_)));
    assert_eq!(orchestrator.state(), BatchState::Completed);
    assert_eq!(saved_reports(store.as_ref()).await.len(), 1);
}
