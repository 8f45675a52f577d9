//! Haar cascade face detection.
//!
//! Detection runs on a grayscale view of the frame. The minimum face size
//! scales with the image height so sensitivity stays constant across camera
//! resolutions. A detector whose cascade could not be loaded is inert: it
//! reports no faces instead of failing the frame.

use crate::constants::{
    CASCADE_CACHE_SUBDIR, CASCADE_SCALE_IMAGE, DEFAULT_MIN_FACE_RATIO, DEFAULT_MIN_NEIGHBORS,
    DEFAULT_SCALE_FACTOR, STAGED_CASCADE_NAME,
};
use crate::utils::{clip_boxes, safe_cast::f64_to_i32};
use crate::{Error, Result};
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::imgproc;
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Locates faces in a grayscale image
pub trait FaceDetector {
    /// Return face boxes in image coordinates, in no particular order
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying detector fails on this image
    fn detect(&mut self, gray: &Mat) -> Result<Vec<Rect>>;

    /// Whether the detector can find anything at all
    fn is_active(&self) -> bool {
        true
    }
}

/// Multi-scale scan parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Image pyramid scale step
    pub scale_factor: f64,

    /// Overlapping candidates needed to keep a detection
    pub min_neighbors: i32,

    /// Minimum face side as a fraction of image height
    pub min_face_ratio: f64,

    /// `OpenCV` cascade flags
    pub flags: i32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_face_ratio: DEFAULT_MIN_FACE_RATIO,
            flags: CASCADE_SCALE_IMAGE,
        }
    }
}

impl DetectorParams {
    /// Minimum face side in pixels for an image of the given height
    ///
    /// Applied to both width and height of candidates. Derived from the
    /// height only, even for landscape frames.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not fit in an `i32`
    pub fn min_face_size(&self, image_height: i32) -> Result<i32> {
        f64_to_i32(f64::from(image_height) * self.min_face_ratio)
    }
}

/// Face detector backed by an `OpenCV` Haar cascade
pub struct CascadeDetector {
    classifier: Option<CascadeClassifier>,
    params: DetectorParams,
}

impl CascadeDetector {
    /// Load a cascade definition from an XML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist
    /// - `OpenCV` cannot parse it
    /// - The parsed classifier is empty
    pub fn load<P: AsRef<Path>>(cascade_path: P, params: DetectorParams) -> Result<Self> {
        let path = cascade_path.as_ref();
        if !path.is_file() {
            return Err(Error::ModelLoad(format!(
                "Cascade file not found: {}",
                path.display()
            )));
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| Error::InvalidInput(format!("Non UTF-8 cascade path: {}", path.display())))?;
        let classifier = CascadeClassifier::new(path_str)?;

        if classifier.empty()? {
            return Err(Error::ModelLoad(format!(
                "Cascade classifier is empty: {}",
                path.display()
            )));
        }

        log::debug!("Cascade classifier loaded from {}", path.display());
        Ok(Self {
            classifier: Some(classifier),
            params,
        })
    }

    /// Load a cascade from an XML file, degrading to an inert detector on failure
    pub fn from_file<P: AsRef<Path>>(cascade_path: P, params: DetectorParams) -> Self {
        Self::load(cascade_path, params).unwrap_or_else(|e| {
            log::warn!("Face detection disabled: {}", e);
            Self::unavailable(params)
        })
    }

    /// Stage cascade bytes under `cache_dir` and load them
    ///
    /// `OpenCV` cascades can only be read from a path, so the blob is written
    /// to a private file first.
    ///
    /// # Errors
    ///
    /// Returns an error if staging or loading fails
    pub fn load_bytes<P: AsRef<Path>>(cascade_xml: &[u8], cache_dir: P, params: DetectorParams) -> Result<Self> {
        let staged = stage_cascade(cascade_xml, cache_dir)?;
        Self::load(staged, params)
    }

    /// Stage and load cascade bytes, degrading to an inert detector on failure
    pub fn from_bytes<P: AsRef<Path>>(cascade_xml: &[u8], cache_dir: P, params: DetectorParams) -> Self {
        Self::load_bytes(cascade_xml, cache_dir, params).unwrap_or_else(|e| {
            log::warn!("Face detection disabled: {}", e);
            Self::unavailable(params)
        })
    }

    /// A detector that never reports faces
    #[must_use]
    pub fn unavailable(params: DetectorParams) -> Self {
        Self {
            classifier: None,
            params,
        }
    }

    /// Whether a cascade is loaded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    /// Scan parameters in use
    #[must_use]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }
}

impl FaceDetector for CascadeDetector {
    fn detect(&mut self, gray: &Mat) -> Result<Vec<Rect>> {
        let Some(classifier) = self.classifier.as_mut() else {
            return Ok(Vec::new());
        };
        if gray.empty() {
            return Ok(Vec::new());
        }

        let min_side = self.params.min_face_size(gray.rows())?;
        let mut faces = Vector::<Rect>::new();
        classifier.detect_multi_scale(
            gray,
            &mut faces,
            self.params.scale_factor,
            self.params.min_neighbors,
            self.params.flags,
            Size::new(min_side, min_side),
            Size::new(0, 0),
        )?;

        Ok(clip_boxes(&faces.to_vec(), gray.cols(), gray.rows()))
    }

    fn is_active(&self) -> bool {
        self.is_loaded()
    }
}

/// Write cascade XML into `<cache_dir>/cascade/` and return the file path
///
/// An existing staged file is overwritten. The file handle is closed before
/// this returns.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written
pub fn stage_cascade<P: AsRef<Path>>(cascade_xml: &[u8], cache_dir: P) -> Result<PathBuf> {
    if cascade_xml.is_empty() {
        return Err(Error::InvalidInput("Cascade resource is empty".to_string()));
    }

    let dir = cache_dir.as_ref().join(CASCADE_CACHE_SUBDIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(STAGED_CASCADE_NAME);
    fs::write(&path, cascade_xml)?;

    log::debug!("Staged {} cascade bytes at {}", cascade_xml.len(), path.display());
    Ok(path)
}

/// Single-channel view of a color frame for detection
///
/// Accepts RGBA, RGB or already-gray frames.
///
/// # Errors
///
/// Returns an error for other channel counts or if conversion fails
pub fn to_grayscale(frame: &Mat) -> Result<Mat> {
    let code = match frame.channels() {
        4 => imgproc::COLOR_RGBA2GRAY,
        3 => imgproc::COLOR_RGB2GRAY,
        1 => return Ok(frame.try_clone()?),
        n => {
            return Err(Error::InvalidInput(format!(
                "Unsupported channel count for grayscale conversion: {n}"
            )))
        }
    };

    let mut gray = Mat::default();
    imgproc::cvt_color(frame, &mut gray, code, 0)?;
    Ok(gray)
}
