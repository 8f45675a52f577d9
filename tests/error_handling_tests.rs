//! Error handling tests for all modules

use expression_recognition::{
    classifier::{ClassifierOptions, EmotionClassifier},
    config::Config,
    face_detection::{to_grayscale, CascadeDetector, DetectorParams},
    preprocess::{normalize, prepare, NormalizedPatch},
    utils::safe_cast::{f64_to_i32, i32_to_usize},
    Error,
};
use ndarray::Array4;
use opencv::core::{Mat, Rect, Scalar, CV_32FC3, CV_8UC2, CV_8UC4};
use opencv::prelude::*;
use std::io::Write;

fn cpu_options() -> ClassifierOptions {
    ClassifierOptions {
        prefer_gpu: false,
        ..ClassifierOptions::default()
    }
}

#[test]
fn test_model_loading_errors() {
    // Empty blob
    assert!(matches!(
        EmotionClassifier::from_bytes(&[], &cpu_options()),
        Err(Error::ModelLoad(_))
    ));

    // Missing file
    assert!(matches!(
        EmotionClassifier::from_file("missing/emotion.onnx", &cpu_options()),
        Err(Error::ModelLoad(_))
    ));

    // Garbage bytes are rejected by the runtime
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]).unwrap();
    assert!(EmotionClassifier::from_file(file.path(), &cpu_options()).is_err());
}

#[test]
fn test_model_range_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"0123456789").unwrap();

    // Range past the end of the container
    assert!(matches!(
        EmotionClassifier::from_file_range(file.path(), 8, 16, &cpu_options()),
        Err(Error::ModelLoad(_))
    ));

    // Missing container
    assert!(EmotionClassifier::from_file_range("missing.pak", 0, 4, &cpu_options()).is_err());

    // Zero length range is an empty model
    assert!(matches!(
        EmotionClassifier::from_file_range(file.path(), 2, 0, &cpu_options()),
        Err(Error::ModelLoad(_))
    ));
}

#[test]
fn test_cascade_errors_are_recoverable() {
    assert!(CascadeDetector::load("missing.xml", DetectorParams::default()).is_err());

    let dir = tempfile::tempdir().unwrap();
    let detector = CascadeDetector::from_bytes(b"not xml at all", dir.path(), DetectorParams::default());
    assert!(!detector.is_loaded());

    let detector = CascadeDetector::from_bytes(&[], dir.path(), DetectorParams::default());
    assert!(!detector.is_loaded());
}

#[test]
fn test_preprocess_rejects_bad_inputs() {
    // Wrong patch shape
    let result = NormalizedPatch::from_array(Array4::zeros((1, 48, 48, 4)));
    assert!(matches!(result, Err(Error::ModelDataFormatError(_))));

    // Wrong size for normalization
    let small = Mat::new_rows_cols_with_default(10, 10, CV_8UC4, Scalar::all(0.0)).unwrap();
    assert!(normalize(&small).is_err());

    // Float images are not accepted
    let float = Mat::new_rows_cols_with_default(48, 48, CV_32FC3, Scalar::all(0.5)).unwrap();
    assert!(matches!(normalize(&float), Err(Error::InvalidInput(_))));

    // Two-channel frames have no color interpretation
    let two = Mat::new_rows_cols_with_default(60, 60, CV_8UC2, Scalar::all(0.0)).unwrap();
    assert!(prepare(&two, Rect::new(0, 0, 30, 30)).is_err());
    assert!(to_grayscale(&two).is_err());
}

#[test]
fn test_degenerate_regions_are_not_errors() {
    let frame = Mat::new_rows_cols_with_default(60, 60, CV_8UC4, Scalar::all(0.0)).unwrap();

    assert!(prepare(&frame, Rect::new(10, 10, 0, 20)).unwrap().is_none());
    assert!(prepare(&frame, Rect::new(100, 100, 20, 20)).unwrap().is_none());
    assert!(prepare(&frame, Rect::new(-40, -40, 20, 20)).unwrap().is_none());
}

#[test]
fn test_config_errors() {
    assert!(matches!(
        Config::from_file("missing/config.yaml"),
        Err(Error::IoError(_))
    ));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"classifier:\n  num_threads: many\n").unwrap();
    assert!(matches!(Config::from_file(file.path()), Err(Error::ConfigError(_))));
}

#[test]
fn test_safe_cast_errors() {
    assert!(i32_to_usize(-1).is_err());
    assert!(f64_to_i32(f64::NAN).is_err());
    assert!(f64_to_i32(1e12).is_err());
    assert_eq!(f64_to_i32(47.9).unwrap(), 47);
}

#[test]
fn test_error_display() {
    let error = Error::ModelLoad("missing".to_string());
    assert!(error.to_string().contains("missing"));

    let io: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(io, Error::Io(_)));
}
