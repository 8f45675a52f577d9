//! Observability port for the recognition pipeline.
//!
//! The pipeline never logs directly; it reports [`PipelineEvent`]s to an
//! injected [`PipelineObserver`]. [`LogObserver`] forwards them to the `log`
//! facade and is what hosts normally install.

use crate::emotion::EmotionLabel;
use opencv::core::Rect;
use std::path::PathBuf;
use std::sync::Arc;

/// Events emitted while loading resources and processing frames
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The emotion model was loaded
    ModelLoaded {
        /// Size of the model blob
        bytes: usize,
    },
    /// The emotion model could not be loaded
    ModelLoadFailed {
        /// Failure description
        reason: String,
    },
    /// The cascade definition was loaded
    CascadeLoaded {
        /// Cascade file in use
        path: PathBuf,
    },
    /// No cascade is available; frames pass through without detections
    CascadeUnavailable {
        /// Failure description
        reason: String,
    },
    /// Faces found in one frame
    FacesDetected {
        /// Number of boxes
        count: usize,
    },
    /// One face was scored and labeled
    FaceClassified {
        /// Face box in rotated frame coordinates
        bbox: Rect,
        /// Raw model score
        score: f32,
        /// Decoded label
        label: EmotionLabel,
    },
    /// One face was skipped; the remaining faces are still processed
    FaceSkipped {
        /// Face box in rotated frame coordinates
        bbox: Rect,
        /// Why it was skipped
        reason: String,
    },
}

/// Receiver for pipeline events
pub trait PipelineObserver {
    /// Called for every event, synchronously, on the processing thread
    fn on_event(&self, event: &PipelineEvent);
}

impl<T: PipelineObserver + ?Sized> PipelineObserver for Arc<T> {
    fn on_event(&self, event: &PipelineEvent) {
        (**self).on_event(event);
    }
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::ModelLoaded { bytes } => log::info!("Model is loaded ({bytes} bytes)"),
            PipelineEvent::ModelLoadFailed { reason } => log::warn!("Model failed to load: {reason}"),
            PipelineEvent::CascadeLoaded { path } => {
                log::info!("Classifier is loaded from {}", path.display());
            }
            PipelineEvent::CascadeUnavailable { reason } => {
                log::warn!("Face detection disabled: {reason}");
            }
            PipelineEvent::FacesDetected { count } => log::debug!("Detected {count} face(s)"),
            PipelineEvent::FaceClassified { bbox, score, label } => {
                log::debug!("Face at {bbox:?}: output {score} -> {label}");
            }
            PipelineEvent::FaceSkipped { bbox, reason } => {
                log::debug!("Skipped face at {bbox:?}: {reason}");
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {
    fn on_event(&self, _event: &PipelineEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observers_accept_every_event() {
        let events = vec![
            PipelineEvent::ModelLoaded { bytes: 10 },
            PipelineEvent::ModelLoadFailed { reason: "missing".into() },
            PipelineEvent::CascadeLoaded { path: PathBuf::from("cascade.xml") },
            PipelineEvent::CascadeUnavailable { reason: "missing".into() },
            PipelineEvent::FacesDetected { count: 2 },
            PipelineEvent::FaceClassified {
                bbox: Rect::new(1, 2, 3, 4),
                score: 3.0,
                label: EmotionLabel::Neutral,
            },
            PipelineEvent::FaceSkipped {
                bbox: Rect::new(1, 2, 0, 4),
                reason: "degenerate crop".into(),
            },
        ];

        for event in &events {
            LogObserver.on_event(event);
            NullObserver.on_event(event);
        }
    }
}
