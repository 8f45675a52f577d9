//! Configuration management for the expression recognition pipeline

use crate::annotate::AnnotationStyle;
use crate::classifier::ClassifierOptions;
use crate::constants::DEFAULT_CACHE_DIR_NAME;
use crate::face_detection::DetectorParams;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model and cascade resources
    pub models: ModelConfig,

    /// Cascade scan parameters
    pub detection: DetectorParams,

    /// Inference session options
    pub classifier: ClassifierOptions,

    /// Overlay appearance
    pub annotation: AnnotationStyle,
}

/// Resource locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the emotion ONNX model
    pub emotion_model: PathBuf,

    /// Path to the Haar cascade XML
    pub cascade: PathBuf,

    /// Directory the cascade is copied into before loading
    ///
    /// Defaults to a crate-private directory under the system temp dir.
    pub cascade_cache_dir: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            emotion_model: PathBuf::from("assets/emotion_model.onnx"),
            cascade: PathBuf::from("assets/haarcascade_frontalface_alt.xml"),
            cascade_cache_dir: None,
        }
    }
}

impl ModelConfig {
    /// Directory used for staging the cascade
    #[must_use]
    pub fn cascade_staging_dir(&self) -> PathBuf {
        self.cascade_cache_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_CACHE_DIR_NAME))
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate parameter ranges
    ///
    /// Resource files are not checked here; see [`Config::validate_resources`].
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found
    pub fn validate(&self) -> Result<()> {
        let detection = &self.detection;
        if !(detection.scale_factor > 1.0) {
            return Err(Error::ConfigError(
                "Detection scale factor must be greater than 1.0".to_string(),
            ));
        }
        if detection.min_neighbors < 0 {
            return Err(Error::ConfigError(
                "Detection min_neighbors must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&detection.min_face_ratio) {
            return Err(Error::ConfigError(
                "Minimum face ratio must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.classifier.num_threads < 0 {
            return Err(Error::ConfigError(
                "Classifier thread count must not be negative".to_string(),
            ));
        }

        let annotation = &self.annotation;
        if annotation.box_thickness == 0 || annotation.text_thickness <= 0 {
            return Err(Error::ConfigError(
                "Annotation thickness must be non-zero".to_string(),
            ));
        }
        if !(annotation.font_scale > 0.0) {
            return Err(Error::ConfigError("Font scale must be positive".to_string()));
        }

        Ok(())
    }

    /// Check that the emotion model exists
    ///
    /// A missing cascade is not an error: detection is simply disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file is missing
    pub fn validate_resources(&self) -> Result<()> {
        if !self.models.emotion_model.exists() {
            return Err(Error::ConfigError(format!(
                "Emotion model not found: {}",
                self.models.emotion_model.display()
            )));
        }
        if !self.models.cascade.exists() {
            log::warn!(
                "Cascade not found, face detection will be disabled: {}",
                self.models.cascade.display()
            );
        }
        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Expression Recognition Configuration

# Resource paths
models:
  emotion_model: "assets/emotion_model.onnx"
  cascade: "assets/haarcascade_frontalface_alt.xml"
  # cascade_cache_dir: "/tmp/expression-recognition"

# Cascade face detection
detection:
  scale_factor: 1.1
  min_neighbors: 2
  min_face_ratio: 0.1
  flags: 2

# Emotion classifier
classifier:
  prefer_gpu: true
  num_threads: 4

# Overlay appearance (RGBA)
annotation:
  box_color: [0.0, 255.0, 0.0, 255.0]
  box_thickness: 2
  text_color: [0.0, 0.0, 255.0, 150.0]
  font_face: 1
  font_scale: 1.5
  text_thickness: 2
  text_offset: [10, 20]
"#;
