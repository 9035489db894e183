//! Concurrent job store tests
//!
//! Tests cover:
//! - Many jobs driven in parallel end up in the right terminal state
//! - A poller observes each job's statuses in lifecycle order, never a regression
//! - Snapshots are whole: `redirect`/report never appear without `complete`

use journallm_web::job_store::JobStore;
use journallm_web::models::{Job, JobStatus};
use std::time::Duration;

fn rank(job: &Job) -> u8 {
    match job.status {
        JobStatus::Starting => 0,
        JobStatus::Processing => 1,
        JobStatus::Complete { .. } | JobStatus::Error { .. } => 2,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_jobs_reach_expected_terminal_state() {
    let store = JobStore::new();
    let mut handles = Vec::new();

    for i in 0..50 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let id = store.create(format!("journal-{i}.json")).await.id;
            store.mark_processing(id).await.unwrap();
            tokio::task::yield_now().await;
            if i % 5 == 0 {
                store.fail(id, format!("failure {i}")).await.unwrap();
            } else {
                store.complete(id, format!("/report/{id}"), format!("report {i}")).await.unwrap();
            }
            (i, id)
        }));
    }

    for handle in handles {
        let (i, id) = handle.await.unwrap();
        let job = store.get(id).await.unwrap();
        assert_eq!(job.filename, format!("journal-{i}.json"));
        if i % 5 == 0 {
            assert_eq!(job.error_message(), Some(format!("failure {i}").as_str()));
        } else {
            assert_eq!(job.report.as_deref(), Some(format!("report {i}").as_str()));
        }
    }
    assert_eq!(store.len().await, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_poller_never_sees_regression_or_torn_snapshot() {
    let store = JobStore::new();
    let id = store.create("journal.zip").await.id;

    let poller = {
        let store = store.clone();
        tokio::spawn(async move {
            let mut seen = Vec::new();
            loop {
                let job = store.get(id).await.unwrap();
                // Report and completion change together
                assert_eq!(job.report.is_some(), job.result_location().is_some());
                seen.push(rank(&job));
                if job.is_terminal() {
                    return seen;
                }
                tokio::task::yield_now().await;
            }
        })
    };

    tokio::time::sleep(Duration::from_millis(5)).await;
    store.mark_processing(id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    store.complete(id, format!("/report/{id}"), "# done".to_string()).await.unwrap();

    let seen = poller.await.unwrap();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "status regressed: {seen:?}");
    assert_eq!(seen.last(), Some(&2));

    // Later writers cannot move a terminal job
    assert!(store.fail(id, "late").await.is_err());
    assert_eq!(store.get(id).await.unwrap().result_location(), Some(format!("/report/{id}").as_str()));
}

#[tokio::test]
async fn test_purge_keeps_recent_jobs() {
    let store = JobStore::new();
    let old = store.create("old.json").await.id;
    tokio::time::sleep(Duration::from_millis(300)).await;
    let recent = store.create("recent.json").await.id;

    assert_eq!(store.purge_expired(Duration::from_millis(150)).await, 1);
    assert!(store.get(old).await.is_none());
    assert!(store.get(recent).await.is_some());
}
