use super::*;
use crate::camera::CameraId;
use crate::fetcher::FetchReceipt;
use crate::media::{group_page, LogicalMediaItem};
use crate::testing::{jpeg, rw2};
use std::path::PathBuf;

fn id(name: &str) -> CameraId {
    CameraId {
        friendly_name: name.to_string(),
        location: format!("http://{}/ddd", name),
    }
}

fn receipt(name: &str) -> FetchReceipt {
    FetchReceipt::stub(vec![PathBuf::from(name)])
}

fn photo(object_id: &str, title: &str) -> LogicalMediaItem {
    LogicalMediaItem::single(jpeg(object_id, title))
}

#[test]
fn test_new_session_on_discovery() {
    let tracker = SessionTracker::new();
    let gx800 = id("GX800");

    let presence = tracker.reconcile(&[gx800.clone()]);

    assert_eq!(presence.appeared, vec![gx800.clone()]);
    assert!(presence.lost.is_empty());
    assert_eq!(tracker.state(&gx800), Some(SessionState::New));

    // Still present on the next pass: nothing changes
    assert_eq!(tracker.reconcile(&[gx800.clone()]), Presence::default());
}

#[test]
fn test_full_round() {
    let tracker = SessionTracker::new();
    let gx800 = id("GX800");
    tracker.reconcile(&[gx800.clone()]);

    tracker.begin_pass(&gx800);
    tracker.record_total(&gx800, 4);
    assert_eq!(tracker.classify(&gx800, &photo("1", "P1")), ItemStatus::Unseen);
    tracker.record_fetched(&gx800, &photo("1", "P1"), receipt("P1.JPG"));
    tracker.record_fetched(&gx800, &photo("2", "P2"), receipt("P2.JPG"));
    assert_eq!(tracker.state(&gx800), Some(SessionState::Active));

    // Later pages report a shrinking total; the round keeps the first one
    tracker.record_total(&gx800, 2);

    let event = tracker.end_pass(&gx800, FinishReason::Idle).unwrap();
    assert_eq!(
        event,
        FinishEvent {
            camera: "GX800".to_string(),
            fetched: 2,
            total: Some(4),
            reason: FinishReason::Idle,
        }
    );
    assert_eq!(tracker.state(&gx800), Some(SessionState::Finishing));

    tracker.mark_done(&gx800);
    assert_eq!(tracker.state(&gx800), Some(SessionState::Done));
}

#[test]
fn test_finish_fires_once_while_idle() {
    let tracker = SessionTracker::new();
    let gx800 = id("GX800");
    tracker.reconcile(&[gx800.clone()]);
    tracker.begin_pass(&gx800);
    tracker.record_fetched(&gx800, &photo("1", "P1"), receipt("P1.JPG"));
    assert!(tracker.end_pass(&gx800, FinishReason::Idle).is_some());
    tracker.mark_done(&gx800);

    for _ in 0..5 {
        tracker.reconcile(&[gx800.clone()]);
        tracker.begin_pass(&gx800);
        tracker.record_total(&gx800, 0);
        assert!(tracker.end_pass(&gx800, FinishReason::Idle).is_none());
    }
    assert_eq!(tracker.state(&gx800), Some(SessionState::Done));
}

#[test]
fn test_reconnect_after_done_goes_straight_to_done() {
    let tracker = SessionTracker::new();
    let gx800 = id("GX800");
    tracker.reconcile(&[gx800.clone()]);
    tracker.begin_pass(&gx800);
    tracker.record_fetched(&gx800, &photo("1", "P1"), receipt("P1.JPG"));
    tracker.end_pass(&gx800, FinishReason::Idle);
    tracker.mark_done(&gx800);

    let presence = tracker.reconcile(&[]);
    assert_eq!(presence.lost, vec![gx800.clone()]);
    assert_eq!(tracker.state(&gx800), Some(SessionState::New));

    for _ in 0..3 {
        tracker.reconcile(&[]);
        let presence = tracker.reconcile(&[gx800.clone()]);
        assert_eq!(presence.appeared, vec![gx800.clone()]);
        tracker.begin_pass(&gx800);
        assert!(tracker.end_pass(&gx800, FinishReason::Idle).is_none());
        assert_eq!(tracker.state(&gx800), Some(SessionState::Done));
    }
}

#[test]
fn test_new_media_after_done_starts_new_round() {
    let tracker = SessionTracker::new();
    let gx800 = id("GX800");
    tracker.reconcile(&[gx800.clone()]);
    tracker.begin_pass(&gx800);
    tracker.record_total(&gx800, 3);
    for n in 0..3 {
        tracker.record_fetched(&gx800, &photo(&n.to_string(), &format!("P{}", n)), receipt("x"));
    }
    tracker.end_pass(&gx800, FinishReason::Idle);
    tracker.mark_done(&gx800);

    tracker.begin_pass(&gx800);
    tracker.record_total(&gx800, 1);
    tracker.record_fetched(&gx800, &photo("9", "P9"), receipt("P9.JPG"));
    assert_eq!(tracker.state(&gx800), Some(SessionState::Active));

    let event = tracker.end_pass(&gx800, FinishReason::Idle).unwrap();
    assert_eq!(event.fetched, 1);
    assert_eq!(event.total, Some(1));
}

#[test]
fn test_camera_lost_mid_round_resumes_session() {
    let tracker = SessionTracker::new();
    let gx800 = id("GX800");
    tracker.reconcile(&[gx800.clone()]);
    tracker.begin_pass(&gx800);
    tracker.record_total(&gx800, 10);
    tracker.record_fetched(&gx800, &photo("1", "P1"), receipt("P1.JPG"));
    let session_id = tracker.get(&gx800).unwrap().session_id;

    tracker.reconcile(&[]);
    assert!(!tracker.get(&gx800).unwrap().present);
    tracker.reconcile(&[gx800.clone()]);

    let session = tracker.get(&gx800).unwrap();
    assert_eq!(session.session_id, session_id);
    assert_eq!(session.state, SessionState::Active);
    assert_eq!(session.fetched, 1);
    assert_eq!(session.total, Some(10));
    assert_eq!(tracker.len(), 1);
}

#[test]
fn test_enumeration_failure_on_new_camera_reports_unknown_total() {
    let tracker = SessionTracker::new();
    let g9 = id("G9");
    tracker.reconcile(&[g9.clone()]);
    tracker.begin_pass(&g9);

    let event = tracker.end_pass(&g9, FinishReason::EnumerationFailed).unwrap();
    assert_eq!(event.fetched, 0);
    assert_eq!(event.total, None);
    assert_eq!(event.reason, FinishReason::EnumerationFailed);
}

#[test]
fn test_item_classification() {
    let tracker = SessionTracker::new();
    let gx800 = id("GX800");
    tracker.reconcile(&[gx800.clone()]);
    tracker.begin_pass(&gx800);

    tracker.record_failed(&gx800, &photo("1", "P1"));
    assert_eq!(tracker.classify(&gx800, &photo("1", "P1")), ItemStatus::Failed);

    tracker.record_fetched(&gx800, &photo("1", "P1"), receipt("P1.JPG"));
    assert_eq!(
        tracker.classify(&gx800, &photo("1", "P1")),
        ItemStatus::Persisted(receipt("P1.JPG"))
    );

    // A persisted item is counted once however often it is reported
    tracker.record_fetched(&gx800, &photo("1", "P1"), receipt("P1.JPG"));
    assert_eq!(tracker.get(&gx800).unwrap().fetched, 1);

    assert_eq!(tracker.classify(&id("G9"), &photo("1", "P1")), ItemStatus::Unseen);
}

#[test]
fn test_deleted_objects_are_forgotten() {
    let tracker = SessionTracker::new();
    let gx800 = id("GX800");
    tracker.reconcile(&[gx800.clone()]);
    tracker.begin_pass(&gx800);

    tracker.record_fetched(&gx800, &photo("1", "P1"), receipt("P1.JPG"));
    assert_eq!(tracker.pending_deletes(&gx800), 1);
    tracker.record_deleted(&gx800, &["1".to_string()]);
    assert_eq!(tracker.pending_deletes(&gx800), 0);

    // The camera may hand the same id to a later shot
    assert_eq!(tracker.classify(&gx800, &photo("1", "P1")), ItemStatus::Unseen);
    tracker.record_fetched(&gx800, &photo("1", "P1"), receipt("P1_1.JPG"));
    assert_eq!(tracker.get(&gx800).unwrap().fetched, 2);
}

#[test]
fn test_leftover_pair_constituent_is_delete_only() {
    let tracker = SessionTracker::new();
    let gx800 = id("GX800");
    tracker.reconcile(&[gx800.clone()]);
    tracker.begin_pass(&gx800);

    let pair = group_page(vec![jpeg("1", "P1"), rw2("2", "P1")]).remove(0);
    assert_eq!(tracker.classify(&gx800, &pair), ItemStatus::Unseen);
    tracker.record_fetched(&gx800, &pair, receipt("P1.JPG"));
    tracker.record_deleted(&gx800, &["2".to_string()]);

    let leftover = photo("1", "P1");
    assert_eq!(
        tracker.classify(&gx800, &leftover),
        ItemStatus::Persisted(receipt("P1.JPG"))
    );
    tracker.record_fetched(&gx800, &leftover, receipt("P1.JPG"));
    assert_eq!(tracker.get(&gx800).unwrap().fetched, 1);

    // A constituent that failed marks the whole item as a retry
    tracker.record_failed(&gx800, &photo("7", "P7"));
    let retried = group_page(vec![jpeg("7", "P7"), rw2("8", "P7")]).remove(0);
    assert_eq!(tracker.classify(&gx800, &retried), ItemStatus::Failed);
}
