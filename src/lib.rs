//! Facial expression recognition for live camera frames.
//!
//! This library annotates RGBA frames with the emotion shown on each face:
//! - `OpenCV` Haar cascades locate faces
//! - Each face is cropped and normalized to a 48×48 RGB tensor
//! - An ONNX Runtime model produces a single score per face
//! - The score is banded into one of seven labels and drawn next to the face
//!
//! Frames come from a sensor mounted sideways, so the pipeline rotates them
//! 90° clockwise for analysis and rotates them back before returning.
//!
//! # Examples
//!
//! ## Processing a Frame
//!
//! ```no_run
//! use expression_recognition::{config::Config, observer::LogObserver, pipeline::ExpressionPipeline};
//! use opencv::{imgcodecs, imgproc, core::Mat, prelude::*};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! expression_recognition::runtime::init();
//!
//! let config = Config::from_file("config.yaml")?;
//! let mut pipeline = ExpressionPipeline::from_config(&config, Box::new(LogObserver))?;
//!
//! let bgr = imgcodecs::imread("face.jpg", imgcodecs::IMREAD_COLOR)?;
//! let mut frame = Mat::default();
//! imgproc::cvt_color(&bgr, &mut frame, imgproc::COLOR_BGR2RGBA, 0)?;
//!
//! let report = pipeline.process(&mut frame)?;
//! for face in &report.faces {
//!     println!("{:?}: {}", face.bbox, face.caption);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Decoding Scores
//!
//! ```
//! use expression_recognition::emotion::{caption, decode, EmotionLabel};
//!
//! let label = decode(3.0);
//! assert_eq!(label, EmotionLabel::Neutral);
//! assert_eq!(caption(label, 3.0), "Neutral(3.0)");
//! ```
//!
//! ## Custom Components
//!
//! ```no_run
//! use expression_recognition::{
//!     annotate::AnnotationStyle,
//!     classifier::{ClassifierOptions, EmotionClassifier},
//!     face_detection::{CascadeDetector, DetectorParams},
//!     observer::NullObserver,
//!     pipeline::ExpressionPipeline,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ClassifierOptions { prefer_gpu: false, ..ClassifierOptions::default() };
//! let model = EmotionClassifier::from_file_range("assets.pak", 4096, 1_048_576, &options)?;
//! let detector = CascadeDetector::from_file("haarcascade_frontalface_alt.xml", DetectorParams::default());
//!
//! let pipeline = ExpressionPipeline::new(
//!     Box::new(detector),
//!     Box::new(model),
//!     AnnotationStyle::default(),
//!     Box::new(NullObserver),
//! );
//! assert!(pipeline.is_detection_active());
//! # Ok(())
//! # }
//! ```

/// Face box and caption drawing
pub mod annotate;

/// Emotion model inference
pub mod classifier;

/// Configuration management
pub mod config;

/// Constants used throughout the library
pub mod constants;

/// Emotion labels and score decoding
pub mod emotion;

/// Error types and result handling
pub mod error;

/// Face detection with Haar cascades
pub mod face_detection;

/// Pipeline events and observers
pub mod observer;

/// Frame-level orchestration
pub mod pipeline;

/// Face crop normalization
pub mod preprocess;

/// Process-wide inference runtime
pub mod runtime;

/// Utility functions for frame orientation and box geometry
pub mod utils;

/// Main application module
pub mod app;

pub use error::{Error, Result};
