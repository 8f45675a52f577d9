//! Helper functions and stand-in components for tests

#![allow(dead_code)]

use expression_recognition::{
    classifier::EmotionModel,
    face_detection::FaceDetector,
    observer::{PipelineEvent, PipelineObserver},
    preprocess::NormalizedPatch,
    Error, Result,
};
use opencv::{
    core::{Mat, Rect, Scalar, CV_8UC4},
    prelude::*,
};
use std::sync::{Arc, Mutex};

/// Create a uniformly colored RGBA frame
pub fn create_rgba_frame(height: i32, width: i32, rgba: [f64; 4]) -> Result<Mat> {
    Ok(Mat::new_rows_cols_with_default(
        height,
        width,
        CV_8UC4,
        Scalar::new(rgba[0], rgba[1], rgba[2], rgba[3]),
    )?)
}

/// Raw pixel bytes of a frame
pub fn frame_bytes(frame: &Mat) -> Result<Vec<u8>> {
    Ok(frame.data_bytes()?.to_vec())
}

/// Detector that returns the same boxes for every frame
pub struct StubDetector {
    pub boxes: Vec<Rect>,
}

impl StubDetector {
    pub fn new(boxes: Vec<Rect>) -> Self {
        Self { boxes }
    }
}

impl FaceDetector for StubDetector {
    fn detect(&mut self, _gray: &Mat) -> Result<Vec<Rect>> {
        Ok(self.boxes.clone())
    }
}

/// Model that returns a fixed score and counts its calls
pub struct StubModel {
    pub score: f32,
    pub calls: Arc<Mutex<usize>>,
}

impl StubModel {
    pub fn new(score: f32) -> Self {
        Self {
            score,
            calls: Arc::default(),
        }
    }
}

impl EmotionModel for StubModel {
    fn infer(&mut self, patch: &NormalizedPatch) -> Result<f32> {
        assert_eq!(patch.len(), 48 * 48 * 3);
        *self.calls.lock().unwrap() += 1;
        Ok(self.score)
    }
}

/// Model that fails on the listed call numbers (zero based) and scores otherwise
pub struct FlakyModel {
    pub score: f32,
    pub fail_on: Vec<usize>,
    calls: usize,
}

impl FlakyModel {
    pub fn new(score: f32, fail_on: Vec<usize>) -> Self {
        Self {
            score,
            fail_on,
            calls: 0,
        }
    }
}

impl EmotionModel for FlakyModel {
    fn infer(&mut self, _patch: &NormalizedPatch) -> Result<f32> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_on.contains(&call) {
            return Err(Error::ModelOutputError(format!("stub failure on call {call}")));
        }
        Ok(self.score)
    }
}

/// Observer that keeps every event
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
