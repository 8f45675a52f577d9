//! Face patch extraction and tensor serialization.

use crate::constants::{INPUT_SIZE, PATCH_CHANNELS, PATCH_ELEMENTS, PIXEL_SCALE};
use crate::utils::safe_cast::i32_to_usize;
use crate::utils::{clip_to_frame, corner_region};
use crate::{Error, Result};
use ndarray::{Array4, ArrayView4};
use opencv::core::{Mat, Rect, Size, CV_8U};
use opencv::imgproc;
use opencv::prelude::*;

/// A 1×48×48×3 RGB tensor with every element in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPatch(Array4<f32>);

impl NormalizedPatch {
    /// Wrap an existing tensor
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is not `(1, 48, 48, 3)`
    pub fn from_array(array: Array4<f32>) -> Result<Self> {
        let side = i32_to_usize(INPUT_SIZE)?;
        if array.shape() != [1, side, side, PATCH_CHANNELS] {
            return Err(Error::ModelDataFormatError(format!(
                "Expected patch shape [1, {side}, {side}, {PATCH_CHANNELS}], got {:?}",
                array.shape()
            )));
        }
        Ok(Self(array))
    }

    /// Tensor view in NHWC order
    #[must_use]
    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.0.view()
    }

    /// Consume the patch and return its tensor
    #[must_use]
    pub fn into_array(self) -> Array4<f32> {
        self.0
    }

    /// Number of `f32` elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed patch
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Size of the patch when laid out as raw `f32` bytes
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.0.len() * std::mem::size_of::<f32>()
    }
}

/// Crop a face from the color frame and turn it into a model-ready patch
///
/// Returns `Ok(None)` when the face region has no area inside the frame.
///
/// # Errors
///
/// Returns an error if the frame format is unsupported or an `OpenCV`
/// operation fails
pub fn prepare(frame: &Mat, face: Rect) -> Result<Option<NormalizedPatch>> {
    let Some(crop) = crop_face(frame, face)? else {
        return Ok(None);
    };

    let mut resized = Mat::default();
    imgproc::resize(
        &crop,
        &mut resized,
        Size::new(INPUT_SIZE, INPUT_SIZE),
        0.0,
        0.0,
        imgproc::INTER_NEAREST,
    )?;

    normalize(&resized).map(Some)
}

/// Copy the pixels spanned by a face box's corners
///
/// Returns `Ok(None)` for degenerate regions.
///
/// # Errors
///
/// Returns an error if the `OpenCV` ROI cannot be taken
pub fn crop_face(frame: &Mat, face: Rect) -> Result<Option<Mat>> {
    if frame.empty() {
        return Ok(None);
    }
    let Some(region) = clip_to_frame(corner_region(face), frame.cols(), frame.rows()) else {
        return Ok(None);
    };

    let roi = Mat::roi(frame, region)?;
    Ok(Some(roi.try_clone()?))
}

/// Serialize a 48×48 RGBA or RGB image into a normalized patch
///
/// Pixels are emitted row-major as R, G, B each divided by 255; alpha is
/// dropped.
///
/// # Errors
///
/// Returns an error if the image is not 48×48, not 8-bit, or has a channel
/// count other than 3 or 4
pub fn normalize(image: &Mat) -> Result<NormalizedPatch> {
    if image.rows() != INPUT_SIZE || image.cols() != INPUT_SIZE {
        return Err(Error::InvalidInput(format!(
            "Expected {INPUT_SIZE}x{INPUT_SIZE} image, got {}x{}",
            image.cols(),
            image.rows()
        )));
    }
    if image.depth() != CV_8U {
        return Err(Error::InvalidInput("Expected an 8-bit image".to_string()));
    }

    let channels = i32_to_usize(image.channels())?;
    if channels != 3 && channels != 4 {
        return Err(Error::InvalidInput(format!(
            "Expected RGB or RGBA image, got {channels} channels"
        )));
    }

    let continuous;
    let source = if image.is_continuous() {
        image
    } else {
        continuous = image.try_clone()?;
        &continuous
    };

    let mut data = Vec::with_capacity(PATCH_ELEMENTS);
    for pixel in source.data_bytes()?.chunks_exact(channels) {
        data.extend(pixel[..PATCH_CHANNELS].iter().map(|&v| f32::from(v) / PIXEL_SCALE));
    }

    let side = i32_to_usize(INPUT_SIZE)?;
    let array = Array4::from_shape_vec((1, side, side, PATCH_CHANNELS), data)
        .map_err(|e| Error::ModelDataFormatError(format!("Failed to create patch array: {e}")))?;
    NormalizedPatch::from_array(array)
}
