// End-to-end compression flow through FormSession with a recording transport
mod common;

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Notify;

use common::{binary, json, Harness, RecordingTransport, ENDPOINT};
use git_fit::compression::{FileSelection, NO_FILE_MESSAGE};
use git_fit::error::AppError;
use git_fit::session::{SELECTION_CHANGED_MESSAGE, SUBMIT_IN_PROGRESS_MESSAGE};
use git_fit::size_unit::{SizeInput, SizeUnit};

const SUCCESS_BODY: &str = r#"{
    "filename": "holiday_compressed.jpg",
    "size": 900000,
    "mime": "image/jpeg",
    "message": "Image compressed successfully",
    "download_url": "http://localhost:8080/download/holiday_compressed.jpg",
    "expires_in": 300
}"#;

fn two_megabyte_file() -> FileSelection {
    FileSelection::from_bytes("holiday.jpg", Bytes::from(vec![0u8; 2_000_000]), Some("image/jpeg"))
}

#[tokio::test]
async fn submit_without_file_is_rejected_before_any_request() {
    let harness = Harness::new(RecordingTransport::new());
    let session = harness.session();

    let err = session.submit().await.expect_err("validation error");

    assert!(matches!(err, AppError::Validation(ref m) if m == NO_FILE_MESSAGE));
    assert_eq!(harness.transport.post_count(), 0);
    assert_eq!(harness.transport.get_count(), 0);
    assert_eq!(session.state().error.as_deref(), Some(NO_FILE_MESSAGE));
}

#[tokio::test]
async fn service_error_message_is_surfaced_verbatim() {
    let transport = RecordingTransport::new();
    transport.push_post(json(400, r#"{"error":"too large"}"#));
    let harness = Harness::new(transport);
    let session = harness.session();
    session.select_file(two_megabyte_file()).expect("select file");

    let err = session.submit().await.expect_err("compression error");

    assert!(matches!(err, AppError::Compression(_)));
    let state = session.state();
    assert_eq!(state.error.as_deref(), Some("too large"));
    assert!(state.result.is_none());
    assert!(!state.is_submitting);
    assert_eq!(harness.transport.post_count(), 1);
}

#[tokio::test]
async fn success_derives_labelled_comparison() {
    let transport = RecordingTransport::new();
    transport.push_post(json(200, SUCCESS_BODY));
    let harness = Harness::new(transport);
    let session = harness.session();
    session.select_file(two_megabyte_file()).expect("select file");

    let result = session.submit().await.expect("compression result");
    assert_eq!(result.size_bytes, 900_000);

    let state = session.state();
    let comparison = state.comparison().expect("comparison");
    assert_eq!(comparison.before_label, "Original (1.91 MB)");
    assert_eq!(comparison.after_label, "Compressed (900 KB)");
    assert_eq!(comparison.after_url, result.download_url);
    assert!(!comparison.is_demo);
    assert!(harness.registry.resolve(&comparison.before_url).is_some());
    assert!(state.error.is_none());

    let posts = harness.transport.posts.lock().expect("lock");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, ENDPOINT);
    assert_eq!(posts[0].1.text_value("maxsize"), Some("1048576"));
    assert_eq!(posts[0].1.text_value("format"), Some("jpeg"));
    assert_eq!(posts[0].1.text_value("quality"), Some("85"));
}

#[tokio::test]
async fn size_input_drives_maxsize_field() {
    let transport = RecordingTransport::new();
    transport.push_post(json(200, SUCCESS_BODY));
    let harness = Harness::new(transport);
    let session = harness.session();
    session.select_file(two_megabyte_file()).expect("select file");
    session
        .apply_size_input(&SizeInput::new("500", SizeUnit::Kb))
        .expect("apply size");

    session.submit().await.expect("compression result");

    let posts = harness.transport.posts.lock().expect("lock");
    assert_eq!(posts[0].1.text_value("maxsize"), Some("512000"));
}

#[tokio::test]
async fn overlapping_submit_is_rejected_without_clearing_state() {
    let gate = Arc::new(Notify::new());
    let transport = RecordingTransport::with_gate(gate.clone());
    transport.push_post(json(200, SUCCESS_BODY));
    let harness = Harness::new(transport);
    let session = Arc::new(harness.session());
    session.select_file(two_megabyte_file()).expect("select file");

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit().await })
    };
    while harness.transport.post_count() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(session.state().is_submitting);

    let err = session.submit().await.expect_err("rejected");
    assert!(matches!(err, AppError::Validation(ref m) if m == SUBMIT_IN_PROGRESS_MESSAGE));
    assert!(session.state().is_submitting);
    assert!(session.state().error.is_none());

    gate.notify_one();
    first.await.expect("join").expect("first submit succeeds");
    assert_eq!(harness.transport.post_count(), 1);
    assert!(session.state().result.is_some());
}

#[tokio::test]
async fn result_arriving_after_file_removal_is_discarded() {
    let gate = Arc::new(Notify::new());
    let transport = RecordingTransport::with_gate(gate.clone());
    transport.push_post(json(200, SUCCESS_BODY));
    let harness = Harness::new(transport);
    let session = Arc::new(harness.session());
    session.select_file(two_megabyte_file()).expect("select file");

    let pending = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit().await })
    };
    while harness.transport.post_count() == 0 {
        tokio::task::yield_now().await;
    }
    session.remove_file().expect("remove file");

    gate.notify_one();
    let err = pending.await.expect("join").expect_err("stale result dropped");

    assert!(matches!(err, AppError::Validation(ref m) if m == SELECTION_CHANGED_MESSAGE));
    let state = session.state();
    assert!(state.file.is_none());
    assert!(state.result.is_none());
    assert!(state.comparison().is_none());
    assert!(state.error.is_none());
    assert!(!state.is_submitting);
    assert_eq!(harness.registry.live_count(), 0);
}

#[tokio::test]
async fn result_for_replaced_file_does_not_land_on_new_file() {
    let gate = Arc::new(Notify::new());
    let transport = RecordingTransport::with_gate(gate.clone());
    transport.push_post(json(200, SUCCESS_BODY));
    let harness = Harness::new(transport);
    let session = Arc::new(harness.session());
    session.select_file(two_megabyte_file()).expect("select file");

    let pending = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit().await })
    };
    while harness.transport.post_count() == 0 {
        tokio::task::yield_now().await;
    }
    session
        .select_file(FileSelection::from_bytes("b.png", Bytes::from_static(b"png"), Some("image/png")))
        .expect("select file");

    gate.notify_one();
    pending.await.expect("join").expect_err("stale result dropped");

    let state = session.state();
    assert_eq!(state.file.as_ref().map(|f| f.name.as_str()), Some("b.png"));
    assert!(state.result.is_none());
    assert!(!state.is_submitting);
    // only the new preview remains
    assert_eq!(harness.registry.live_count(), 1);
}

#[tokio::test]
async fn selecting_a_new_file_releases_old_handles() {
    let transport = RecordingTransport::new();
    transport.push_post(json(200, SUCCESS_BODY));
    let harness = Harness::new(transport);
    let session = harness.session();

    session.select_file(two_megabyte_file()).expect("select file");
    session.submit().await.expect("compression result");
    // preview + result "before" handle
    assert_eq!(harness.registry.live_count(), 2);

    session
        .select_file(FileSelection::from_bytes("b.png", Bytes::from_static(b"png"), Some("image/png")))
        .expect("select file");
    assert_eq!(harness.registry.live_count(), 1);
    assert!(session.state().result.is_none());

    session.remove_file().expect("remove file");
    assert_eq!(harness.registry.live_count(), 0);
    assert!(session.state().file.is_none());
}

#[tokio::test]
async fn dropping_the_session_releases_handles() {
    let harness = Harness::new(RecordingTransport::new());
    {
        let session = harness.session();
        session.select_file(two_megabyte_file()).expect("select file");
        assert_eq!(harness.registry.live_count(), 1);
    }
    assert_eq!(harness.registry.live_count(), 0);
}

#[tokio::test]
async fn download_failure_replaces_error() {
    let transport = RecordingTransport::new();
    transport.push_post(json(200, SUCCESS_BODY));
    transport.push_get(binary(410, b""));
    transport.push_get(binary(200, b"jpeg"));
    let harness = Harness::new(transport);
    let session = harness.session();
    session.select_file(two_megabyte_file()).expect("select file");
    session.submit().await.expect("compression result");

    let err = session.download_result().await.expect_err("download failure");
    assert!(matches!(err, AppError::Download(_)));
    assert_eq!(session.state().error.as_deref(), Some("Download failed: HTTP 410"));

    let bytes = session.download_result().await.expect("download");
    assert_eq!(bytes.as_ref(), b"jpeg");
}

#[tokio::test]
async fn network_failure_is_terminal_without_retry() {
    let harness = Harness::new(RecordingTransport::new());
    let session = harness.session();
    session.select_file(two_megabyte_file()).expect("select file");

    let err = session.submit().await.expect_err("network error");

    assert!(matches!(err, AppError::Network(_)));
    assert_eq!(harness.transport.post_count(), 1);
    assert!(session.state().error.is_some());
}

#[tokio::test]
async fn copy_result_url_writes_download_url() {
    let transport = RecordingTransport::new();
    transport.push_post(json(200, SUCCESS_BODY));
    let harness = Harness::new(transport);
    let session = harness.session();
    session.select_file(two_megabyte_file()).expect("select file");
    let result = session.submit().await.expect("compression result");

    session.copy_result_url().await;

    assert!(session.clipboard().is_copied());
    assert_eq!(*harness.clipboard.texts.lock().expect("lock"), vec![result.download_url]);
}
