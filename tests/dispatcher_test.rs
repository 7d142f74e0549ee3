// tests/dispatcher_test.rs — Integration test: dispatcher with a scripted generator

mod common;

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use common::{png, tag, MockGenerator};
use pixshop::core::dispatcher::{Dispatcher, EditEvent};
use pixshop::core::snapshot::ImageData;
use pixshop::infra::errors::PixshopError;

fn history_tags(d: &Dispatcher) -> Vec<String> {
    d.with_history(|h| h.iter().map(tag).collect())
}

fn dispatcher(mock: MockGenerator) -> (Arc<Dispatcher>, Arc<MockGenerator>) {
    let mock = Arc::new(mock);
    let d = Arc::new(Dispatcher::new(mock.clone()));
    (d, mock)
}

#[tokio::test]
async fn test_success_commits_and_clears_error() {
    let (d, mock) = dispatcher(MockGenerator::new().then_image("B"));
    d.load(png("A")).unwrap();

    let snapshot = d.submit("make the sky pink").await.unwrap();

    assert_eq!(tag(&snapshot), "B");
    assert_eq!(history_tags(&d), vec!["A", "B"]);
    assert_eq!(tag(&d.current().unwrap()), "B");
    assert!(d.can_undo());
    assert!(!d.can_redo());
    assert!(d.error().is_none());
    assert!(!d.is_busy());
    assert_eq!(mock.calls(), 1);
    assert_eq!(mock.seen()[0].1, "make the sky pink");
}

#[tokio::test]
async fn test_failure_leaves_history_and_sets_message_then_success_clears_it() {
    let (d, _mock) = dispatcher(
        MockGenerator::new()
            .then_error("quota exhausted")
            .then_image("B"),
    );
    d.load(png("A")).unwrap();

    let err = d.submit("add a hat").await.unwrap_err();
    assert!(matches!(err, PixshopError::Generation { .. }));
    assert_eq!(history_tags(&d), vec!["A"]);
    assert_eq!(
        d.error().as_deref(),
        Some("Failed to generate the image. quota exhausted")
    );
    assert!(!d.is_busy());

    d.submit("add a hat").await.unwrap();
    assert_eq!(history_tags(&d), vec!["A", "B"]);
    assert!(d.error().is_none());
}

#[tokio::test]
async fn test_second_submission_while_in_flight_is_dropped() {
    let (d, mock) = dispatcher(MockGenerator::gated().then_image("B").then_image("C"));
    d.load(png("A")).unwrap();

    let first = tokio::spawn({
        let d = d.clone();
        async move { d.submit("first").await }
    });
    mock.wait_entered().await;
    assert!(d.is_busy());

    let second = d.submit("second").await;
    assert!(matches!(second, Err(PixshopError::AlreadyInProgress)));
    assert_eq!(mock.calls(), 1);
    assert_eq!(history_tags(&d), vec!["A"]);
    // A dropped submission does not touch the message slot.
    assert!(d.error().is_none());

    mock.release();
    let committed = first.await.unwrap().unwrap();
    assert_eq!(tag(&committed), "B");
    assert_eq!(history_tags(&d), vec!["A", "B"]);
    assert!(!d.is_busy());
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_empty_instruction_is_invalid_and_releases_flag() {
    let (d, mock) = dispatcher(MockGenerator::new().then_image("B"));
    d.load(png("A")).unwrap();

    let err = d.submit("   ").await.unwrap_err();
    assert!(matches!(err, PixshopError::InvalidInput(_)));
    assert_eq!(
        d.error().as_deref(),
        Some("Please enter a description for your edit.")
    );
    assert_eq!(mock.calls(), 0);
    assert!(!d.is_busy());

    // The flag was released: the next submission goes through.
    d.submit("brighter").await.unwrap();
    assert_eq!(history_tags(&d), vec!["A", "B"]);
}

#[tokio::test]
async fn test_submit_without_image_is_invalid() {
    let (d, mock) = dispatcher(MockGenerator::new());
    let err = d.submit("anything").await.unwrap_err();
    assert!(matches!(err, PixshopError::InvalidInput(_)));
    assert_eq!(d.error().as_deref(), Some("Please upload an image first."));
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_undecodable_result_is_a_failure() {
    let (d, _mock) = dispatcher(MockGenerator::new().then_raw("not a data url"));
    d.load(png("A")).unwrap();

    assert!(d.submit("edit").await.is_err());
    assert_eq!(history_tags(&d), vec!["A"]);
    assert_eq!(
        d.error().as_deref(),
        Some("Failed to generate the image. Invalid data URL")
    );
}

#[tokio::test]
async fn test_non_image_result_is_a_failure() {
    let (d, _mock) = dispatcher(MockGenerator::new().then_raw("data:text/plain;base64,aGVsbG8="));
    d.load(png("A")).unwrap();

    let err = d.submit("edit").await.unwrap_err();
    assert!(matches!(err, PixshopError::Generation { .. }));
    assert_eq!(history_tags(&d), vec!["A"]);
    assert_eq!(
        d.error().as_deref(),
        Some("Failed to generate the image. The model returned text/plain instead of an image.")
    );
}

#[tokio::test]
async fn test_commits_follow_submission_order() {
    let (d, mock) = dispatcher(
        MockGenerator::new()
            .then_image("B")
            .then_image("C")
            .then_image("D"),
    );
    let original = d.load(png("A")).unwrap();

    let mut last_seq = original.seq();
    for instruction in ["one", "two", "three"] {
        let s = d.submit(instruction).await.unwrap();
        assert!(s.seq() > last_seq);
        last_seq = s.seq();
    }
    assert_eq!(history_tags(&d), vec!["A", "B", "C", "D"]);

    // Each call was made against the version committed just before it.
    let bases: Vec<u64> = mock.seen().iter().map(|(seq, _)| *seq).collect();
    assert_eq!(bases.len(), 3);
    assert!(bases.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(bases[0], original.seq());
}

#[tokio::test]
async fn test_edit_after_undo_prunes_redo_branch() {
    let (d, mock) = dispatcher(
        MockGenerator::new()
            .then_image("B")
            .then_image("C")
            .then_image("D"),
    );
    let original = d.load(png("A")).unwrap();
    d.submit("b").await.unwrap();
    d.submit("c").await.unwrap();

    assert!(d.undo());
    assert!(d.undo());
    assert!(!d.undo());

    d.submit("d").await.unwrap();
    assert_eq!(history_tags(&d), vec!["A", "D"]);
    assert!(!d.can_redo());
    assert_eq!(mock.seen()[2].0, original.seq());
}

#[tokio::test]
async fn test_reset_and_clear() {
    let (d, _mock) = dispatcher(MockGenerator::new().then_image("B").then_image("C"));
    d.load(png("A")).unwrap();
    d.submit("b").await.unwrap();
    d.submit("c").await.unwrap();

    assert!(d.reset_to_original());
    assert_eq!(history_tags(&d), vec!["A"]);
    assert!(!d.reset_to_original());

    d.clear();
    assert!(d.current().is_none());
}

#[tokio::test]
async fn test_non_image_load_sets_message() {
    let (d, _mock) = dispatcher(MockGenerator::new());
    d.load(png("A")).unwrap();

    let err = d
        .load(ImageData::new("text/plain", b"hello".to_vec()))
        .unwrap_err();
    assert!(matches!(err, PixshopError::InvalidInput(_)));
    assert_eq!(d.error().as_deref(), Some("Please select a valid image file."));
    assert_eq!(history_tags(&d), vec!["A"]);

    d.dismiss_error();
    assert!(d.error().is_none());
}

#[tokio::test]
async fn test_progress_events() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let mock = Arc::new(MockGenerator::new().then_image("B").then_error("nope"));
    let d = Dispatcher::new(mock).with_progress(move |e| sink.lock().unwrap().push(e));
    let original = d.load(png("A")).unwrap();

    d.submit("first").await.unwrap();
    d.submit("second").await.unwrap_err();

    let events = events.lock().unwrap().clone();
    assert_eq!(events.len(), 4);
    assert_eq!(
        events[0],
        EditEvent::Started {
            base_seq: original.seq(),
            instruction: "first".into(),
        }
    );
    assert!(matches!(
        events[1],
        EditEvent::Committed {
            version: 2,
            versions: 2,
            ..
        }
    ));
    assert!(matches!(events[2], EditEvent::Started { .. }));
    assert_eq!(
        events[3],
        EditEvent::Failed {
            message: "Failed to generate the image. nope".into(),
        }
    );
}
