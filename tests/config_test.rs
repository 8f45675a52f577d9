//! Configuration file tests

use expression_recognition::{
    config::{Config, EXAMPLE_CONFIG},
    Result,
};
use std::path::PathBuf;

#[test]
fn test_example_config_parses_and_validates() -> Result<()> {
    let config = Config::from_yaml(EXAMPLE_CONFIG)?;
    config.validate()?;
    assert_eq!(config.classifier.num_threads, 4);
    assert!(config.classifier.prefer_gpu);
    assert_eq!(config.annotation.text_offset, [10, 20]);
    Ok(())
}

#[test]
fn test_save_and_reload() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("expression.yaml");

    let mut config = Config::default();
    config.models.emotion_model = PathBuf::from("/opt/models/emotion.onnx");
    config.detection.min_neighbors = 4;
    config.detection.scale_factor = 1.25;
    config.annotation.font_scale = 2.0;
    config.to_file(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded, config);
    loaded.validate()?;
    Ok(())
}

#[test]
fn test_empty_file_uses_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("empty.yaml");
    std::fs::write(&path, "{}\n")?;

    assert_eq!(Config::from_file(&path)?, Config::default());
    Ok(())
}

#[test]
fn test_invalid_ranges_rejected() {
    let cases = [
        "detection:\n  scale_factor: 0.9\n",
        "detection:\n  min_face_ratio: -0.1\n",
        "detection:\n  min_neighbors: -3\n",
        "classifier:\n  num_threads: -1\n",
        "annotation:\n  box_thickness: 0\n",
        "annotation:\n  font_scale: -1.0\n",
    ];
    for yaml in cases {
        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.validate().is_err(), "accepted: {yaml}");
    }
}

#[test]
fn test_resource_check() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model = dir.path().join("model.onnx");
    std::fs::write(&model, b"onnx")?;

    let mut config = Config::default();
    config.models.emotion_model = model;
    config.models.cascade = dir.path().join("missing.xml");
    // A missing cascade only disables detection
    config.validate_resources()?;
    Ok(())
}
