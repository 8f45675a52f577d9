//! Frame-level orchestration: detect, classify and annotate every face.
//!
//! Frames arrive from a sensor mounted sideways, so each frame is rotated
//! 90° clockwise before detection and rotated back before returning. All
//! drawing happens in the rotated orientation; the caller gets back a frame
//! in its original orientation with the overlays applied.

use crate::annotate::{draw_caption, draw_face_box, AnnotationStyle};
use crate::classifier::{EmotionClassifier, EmotionModel};
use crate::config::{Config, ModelConfig};
use crate::emotion::{self, EmotionLabel};
use crate::face_detection::{stage_cascade, to_grayscale, CascadeDetector, DetectorParams, FaceDetector};
use crate::observer::{PipelineEvent, PipelineObserver};
use crate::preprocess::prepare;
use crate::utils::{clip_to_frame, corner_region, rotate_clockwise, rotate_counter_clockwise};
use crate::Result;
use opencv::core::{Mat, Rect};
use opencv::prelude::*;
use std::fs;
use std::path::PathBuf;

/// Outcome for one classified face
#[derive(Debug, Clone, PartialEq)]
pub struct FaceResult {
    /// Face box in rotated frame coordinates
    pub bbox: Rect,
    /// Raw model score
    pub score: f32,
    /// Decoded label
    pub label: EmotionLabel,
    /// Text drawn next to the face
    pub caption: String,
}

/// Outcome for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Boxes returned by the detector
    pub detected: usize,
    /// Faces that were classified and captioned
    pub faces: Vec<FaceResult>,
    /// Faces dropped because of a degenerate region or a failed inference
    pub skipped: usize,
}

/// Detection, classification and annotation pipeline
pub struct ExpressionPipeline {
    detector: Box<dyn FaceDetector>,
    model: Box<dyn EmotionModel>,
    style: AnnotationStyle,
    observer: Box<dyn PipelineObserver>,
}

impl ExpressionPipeline {
    /// Assemble a pipeline from ready-made parts
    pub fn new(
        detector: Box<dyn FaceDetector>,
        model: Box<dyn EmotionModel>,
        style: AnnotationStyle,
        observer: Box<dyn PipelineObserver>,
    ) -> Self {
        Self {
            detector,
            model,
            style,
            observer,
        }
    }

    /// Load the model and cascade named in `config`
    ///
    /// A cascade that cannot be loaded disables detection and is reported
    /// through the observer; frames then pass through unannotated.
    ///
    /// # Errors
    ///
    /// Returns an error if the emotion model cannot be loaded
    pub fn from_config(config: &Config, observer: Box<dyn PipelineObserver>) -> Result<Self> {
        let model = match EmotionClassifier::from_file(&config.models.emotion_model, &config.classifier) {
            Ok(model) => model,
            Err(e) => {
                observer.on_event(&PipelineEvent::ModelLoadFailed { reason: e.to_string() });
                return Err(e);
            }
        };
        observer.on_event(&PipelineEvent::ModelLoaded {
            bytes: model.model_bytes(),
        });

        let detector = match load_cascade(&config.models, config.detection) {
            Ok((detector, path)) => {
                observer.on_event(&PipelineEvent::CascadeLoaded { path });
                detector
            }
            Err(e) => {
                observer.on_event(&PipelineEvent::CascadeUnavailable { reason: e.to_string() });
                CascadeDetector::unavailable(config.detection)
            }
        };

        Ok(Self::new(
            Box::new(detector),
            Box::new(model),
            config.annotation,
            observer,
        ))
    }

    /// Whether faces can be detected at all
    #[must_use]
    pub fn is_detection_active(&self) -> bool {
        self.detector.is_active()
    }

    /// Overlay style in use
    #[must_use]
    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    /// Annotate every face in `frame` with its box and emotion caption
    ///
    /// The frame keeps its dimensions and orientation. It is rotated back
    /// even when processing fails part way. An empty frame is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if rotation, detection or drawing fails. A failed
    /// inference only skips that face.
    pub fn process(&mut self, frame: &mut Mat) -> Result<FrameReport> {
        if frame.empty() {
            return Ok(FrameReport::default());
        }

        rotate_clockwise(frame)?;
        let outcome = self.process_rotated(frame);
        let restored = rotate_counter_clockwise(frame);

        let report = outcome?;
        restored?;
        Ok(report)
    }

    fn process_rotated(&mut self, frame: &mut Mat) -> Result<FrameReport> {
        let faces = {
            let gray = to_grayscale(frame)?;
            self.detector.detect(&gray)?
        };
        self.observer.on_event(&PipelineEvent::FacesDetected { count: faces.len() });

        let mut report = FrameReport {
            detected: faces.len(),
            ..FrameReport::default()
        };
        for face in faces {
            match self.classify_face(frame, face)? {
                Some(result) => {
                    self.observer.on_event(&PipelineEvent::FaceClassified {
                        bbox: result.bbox,
                        score: result.score,
                        label: result.label,
                    });
                    report.faces.push(result);
                }
                None => report.skipped += 1,
            }
        }

        Ok(report)
    }

    /// Draw, crop, score and caption one face; `None` when it was skipped
    fn classify_face(&mut self, frame: &mut Mat, face: Rect) -> Result<Option<FaceResult>> {
        if clip_to_frame(corner_region(face), frame.cols(), frame.rows()).is_none() {
            self.skip(face, "degenerate face region".to_string());
            return Ok(None);
        }

        // The outline is part of the crop the model sees.
        draw_face_box(frame, face, &self.style)?;

        let Some(patch) = prepare(frame, face)? else {
            self.skip(face, "degenerate face region".to_string());
            return Ok(None);
        };

        let score = match self.model.infer(&patch) {
            Ok(score) => score,
            Err(e) => {
                self.skip(face, format!("inference failed: {e}"));
                return Ok(None);
            }
        };

        let label = emotion::decode(score);
        let caption = emotion::caption(label, score);
        draw_caption(frame, face, &caption, &self.style)?;

        Ok(Some(FaceResult {
            bbox: face,
            score,
            label,
            caption,
        }))
    }

    fn skip(&self, bbox: Rect, reason: String) {
        self.observer.on_event(&PipelineEvent::FaceSkipped { bbox, reason });
    }
}

/// Copy the configured cascade into its staging directory and return the copy
fn stage_for_loading(models: &ModelConfig) -> Result<PathBuf> {
    let xml = fs::read(&models.cascade)?;
    stage_cascade(&xml, models.cascade_staging_dir())
}

/// Load the cascade from its staged copy
fn load_cascade(models: &ModelConfig, params: DetectorParams) -> Result<(CascadeDetector, PathBuf)> {
    let path = stage_for_loading(models)?;
    let detector = CascadeDetector::load(&path, params)?;
    Ok((detector, path))
}
