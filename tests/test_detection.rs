extern crate blindspot;

use std::time::Duration;
use image::RgbImage;

use blindspot::common::DetectImage;
use blindspot::detection_runners::{DetectError, DetectionWorker};

mod support;
use support::FakeSsd;

#[test]
fn run_detection_rescales_to_image() {
    let mut detector = FakeSsd::new();
    let image = DetectImage::from(RgbImage::new(64, 32));

    let detections = blindspot::run_detection(&mut detector, &image).unwrap();

    assert_eq!(detections.len(), 2);
    let person = &detections[0];
    assert_eq!(person.class_id, 1);
    assert_eq!(person.class_name, "person");
    assert!((person.bbox.x - 12.8).abs() < 1e-4);
    assert!((person.bbox.y - 3.2).abs() < 1e-4);
    assert!((person.bbox.w - 25.6).abs() < 1e-4);
    assert!((person.bbox.h - 12.8).abs() < 1e-4);
    assert_eq!(detections[1].class_name, "car");
}

#[test]
fn request_threshold_overrides_default() {
    let mut detector = FakeSsd::new();
    let image = DetectImage::from(RgbImage::new(64, 32)).with_threshold(Some(0.5));

    let detections = blindspot::run_detection(&mut detector, &image).unwrap();

    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_name, "person");
}

#[tokio::test]
async fn worker_detects_and_renders() {
    let handle = DetectionWorker::spawn(FakeSsd::new(), 2).unwrap();

    let plain = handle.detect(DetectImage::from(RgbImage::new(64, 32)), false).await.unwrap();
    assert_eq!(plain.detections.len(), 2);
    assert!(plain.image_b64.is_none());

    let rendered = handle.detect(DetectImage::from(RgbImage::new(64, 32)), true).await.unwrap();
    let url = rendered.image_b64.unwrap();
    assert!(url.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn worker_survives_a_panicking_run() {
    let handle = DetectionWorker::spawn(FakeSsd::panicking_on_width(13), 1).unwrap();

    let failed = handle.detect(DetectImage::from(RgbImage::new(13, 8)), false).await;
    match failed {
        Err(DetectError::Failed(err)) => assert!(err.to_string().contains("corrupt input of width 13")),
        other => panic!("expected a failed detection, got {other:?}"),
    }

    let next = handle.detect(DetectImage::from(RgbImage::new(64, 32)), false).await.unwrap();
    assert_eq!(next.detections.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_reports_busy_when_queue_is_full() {
    let (started_tx, started_rx) = crossbeam_channel::unbounded();
    let (gate_tx, gate_rx) = crossbeam_channel::unbounded();
    let handle = DetectionWorker::spawn(FakeSsd::gated(started_tx, gate_rx), 1).unwrap();

    // occupies the worker
    let first = tokio::spawn({
        let handle = handle.clone();
        async move { handle.detect(DetectImage::from(RgbImage::new(8, 8)), false).await }
    });
    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    // fills the single queue slot
    let second = tokio::spawn({
        let handle = handle.clone();
        async move { handle.detect(DetectImage::from(RgbImage::new(8, 8)), false).await }
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    let third = handle.detect(DetectImage::from(RgbImage::new(8, 8)), false).await;
    assert!(matches!(third, Err(DetectError::Busy)));

    gate_tx.send(()).unwrap();
    gate_tx.send(()).unwrap();
    assert_eq!(first.await.unwrap().unwrap().detections.len(), 2);
    assert_eq!(second.await.unwrap().unwrap().detections.len(), 2);
}
