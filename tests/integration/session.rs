//! Integration tests for session state: invalidation, busy guard and
//! resource release.

use pdfmerge::{MergeConfig, MergeError, MergeSession, ResourceRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{broken_input, input, page_labels, pdf_with_pages, write_fixture};

fn session_with(registry: &ResourceRegistry) -> MergeSession {
    MergeSession::with_registry(MergeConfig::default(), registry.clone()).unwrap()
}

#[tokio::test]
async fn test_adding_a_file_invalidates_the_result() {
    let registry = ResourceRegistry::new();
    let session = session_with(&registry);
    session.add_files([input("A", 1), input("B", 1)]);

    let download = session.merge().await.unwrap();
    assert!(registry.fetch(&download.url).is_some());

    session.add_files([input("C", 1)]);

    assert!(session.result().is_none());
    assert!(registry.fetch(&download.url).is_none());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_removing_a_file_invalidates_the_result() {
    let registry = ResourceRegistry::new();
    let session = session_with(&registry);
    session.add_files([input("A", 1), input("B", 1), input("C", 1)]);
    session.merge().await.unwrap();

    let removed = session.remove_file(1).unwrap();

    assert_eq!(removed.name(), "B.pdf");
    assert!(session.result().is_none());
    assert!(registry.is_empty());

    let download = session.merge().await.unwrap();
    assert_eq!(page_labels(&download.bytes), ["A-Page-1", "C-Page-1"]);
}

#[tokio::test]
async fn test_new_result_releases_the_previous_one() {
    let registry = ResourceRegistry::new();
    let session = session_with(&registry);
    session.add_files([input("A", 1), input("B", 1)]);

    let first = session.merge().await.unwrap();
    let second = session.merge().await.unwrap();

    assert_ne!(first.url, second.url);
    assert!(registry.fetch(&first.url).is_none());
    assert!(registry.fetch(&second.url).is_some());
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn test_dropping_the_session_releases_its_result() {
    let registry = ResourceRegistry::new();
    let session = session_with(&registry);
    session.add_files([input("A", 1), input("B", 1)]);
    let download = session.merge().await.unwrap();

    drop(session);

    assert!(registry.fetch(&download.url).is_none());
    assert!(registry.is_empty());
    // Bytes already handed out stay usable.
    assert_eq!(page_labels(&download.bytes), ["A-Page-1", "B-Page-1"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_merges_never_overlap() {
    let session = Arc::new(MergeSession::new(MergeConfig::default()).unwrap());
    session.add_files([input("A", 50), input("B", 50)]);

    let attempts = (0..4).map(|_| {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.merge().await })
    });
    let outcomes: Vec<_> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    // Whoever holds the guard finishes; everyone else is turned away.
    assert!(outcomes.iter().any(Result::is_ok));
    for outcome in &outcomes {
        assert!(matches!(outcome, Ok(_) | Err(MergeError::Busy)));
    }
    assert!(!session.is_busy());
    assert!(session.result().is_some());
    assert_eq!(session.registry().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_change_during_merge_never_leaves_a_stale_result() {
    let registry = ResourceRegistry::new();
    let session = Arc::new(session_with(&registry));
    session.add_files([input("A", 50), input("B", 50)]);

    let merge = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.merge().await })
    };
    let mutate = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.add_files([input("C", 1)]) })
    };
    let (merged, added) = tokio::join!(merge, mutate);
    let merged = merged.unwrap();

    assert_eq!(added.unwrap(), 1);
    assert_eq!(session.len(), 3);
    assert!(matches!(merged, Ok(_) | Err(MergeError::InputsChanged)));

    // A surviving result must cover the current list, and only it is
    // still published.
    match session.result() {
        Some(result) => {
            assert_eq!(result.statistics.files_merged, 3);
            assert_eq!(registry.len(), 1);
        }
        None => assert!(registry.is_empty()),
    }
}

#[tokio::test]
async fn test_failed_merge_can_be_retried() {
    let session = MergeSession::new(MergeConfig::default()).unwrap();
    session.add_files([input("A", 1), broken_input("broken.pdf")]);

    assert!(session.merge().await.is_err());
    assert!(!session.is_busy());
    assert_eq!(session.len(), 2);

    session.remove_file(1).unwrap();
    session.add_files([input("B", 1)]);

    let download = session.merge().await.unwrap();
    assert_eq!(page_labels(&download.bytes), ["A-Page-1", "B-Page-1"]);
}

#[tokio::test]
async fn test_add_paths_appends_in_argument_order() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = ["Z", "M", "A"]
        .iter()
        .map(|label| {
            write_fixture(
                dir.path(),
                &format!("{label}.pdf"),
                &pdf_with_pages(label, 1),
            )
        })
        .collect();

    let session = MergeSession::new(MergeConfig::default()).unwrap();
    assert_eq!(session.add_paths(&paths).await.unwrap(), 3);

    let download = session.merge().await.unwrap();
    assert_eq!(
        page_labels(&download.bytes),
        ["Z-Page-1", "M-Page-1", "A-Page-1"]
    );
}

#[tokio::test]
async fn test_unreadable_path_adds_nothing() {
    let dir = TempDir::new().unwrap();
    let good = write_fixture(dir.path(), "good.pdf", &pdf_with_pages("G", 1));

    let session = MergeSession::new(MergeConfig::default()).unwrap();
    let result = session
        .add_paths(&[good, dir.path().join("missing.pdf")])
        .await;

    assert!(matches!(result, Err(MergeError::ReadFailed { .. })));
    assert!(session.is_empty());
}

#[test]
fn test_session_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MergeSession>();
    assert_send_sync::<ResourceRegistry>();
}
