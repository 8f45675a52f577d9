//! Tests for Haar cascade face detection

use expression_recognition::{
    face_detection::{stage_cascade, to_grayscale, CascadeDetector, DetectorParams, FaceDetector},
    Result,
};
use opencv::core::{Mat, Scalar, CV_8UC1, CV_8UC4};
use opencv::prelude::*;
use std::path::Path;

const SYSTEM_CASCADE: &str = "/usr/share/opencv4/haarcascades/haarcascade_frontalface_alt.xml";

#[test]
fn test_inert_detector_never_detects() -> Result<()> {
    let mut detector = CascadeDetector::from_file("assets/missing_cascade.xml", DetectorParams::default());
    for (rows, cols) in [(1, 1), (48, 64), (480, 640), (1080, 720)] {
        let gray = Mat::new_rows_cols_with_default(rows, cols, CV_8UC1, Scalar::all(200.0))?;
        assert!(detector.detect(&gray)?.is_empty());
    }
    Ok(())
}

#[test]
#[ignore = "Requires OpenCV haarcascade data"]
fn test_uniform_image_has_no_faces() -> Result<()> {
    assert!(Path::new(SYSTEM_CASCADE).exists(), "Cascade not found");

    let mut detector = CascadeDetector::load(SYSTEM_CASCADE, DetectorParams::default())?;
    assert!(detector.is_loaded());

    let frame = Mat::new_rows_cols_with_default(480, 640, CV_8UC4, Scalar::new(128.0, 128.0, 128.0, 255.0))?;
    let gray = to_grayscale(&frame)?;
    assert!(detector.detect(&gray)?.is_empty());

    let black = Mat::new_rows_cols_with_default(640, 480, CV_8UC1, Scalar::all(0.0))?;
    assert!(detector.detect(&black)?.is_empty());
    Ok(())
}

#[test]
#[ignore = "Requires OpenCV haarcascade data"]
fn test_staged_cascade_loads() -> Result<()> {
    let xml = std::fs::read(SYSTEM_CASCADE)?;
    let dir = tempfile::tempdir()?;

    let staged = stage_cascade(&xml, dir.path())?;
    assert_eq!(std::fs::read(&staged)?, xml);

    let detector = CascadeDetector::from_bytes(&xml, dir.path(), DetectorParams::default());
    assert!(detector.is_loaded());
    Ok(())
}

#[test]
#[ignore = "Requires OpenCV haarcascade data"]
fn test_empty_image_is_not_an_error() -> Result<()> {
    let mut detector = CascadeDetector::load(SYSTEM_CASCADE, DetectorParams::default())?;
    assert!(detector.detect(&Mat::default())?.is_empty());
    Ok(())
}
