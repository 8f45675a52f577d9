//! Utility functions for frame orientation and box geometry.

pub mod safe_cast;

use crate::Result;
use opencv::core::{self, Mat, Rect};
use opencv::prelude::*;

/// Rotate a frame 90° clockwise in place
///
/// Compensates for the camera sensor being mounted sideways relative to the
/// displayed image.
///
/// # Errors
///
/// Returns an error if the `OpenCV` rotation fails
pub fn rotate_clockwise(frame: &mut Mat) -> Result<()> {
    let temp = frame.try_clone()?;
    core::rotate(&temp, frame, core::ROTATE_90_CLOCKWISE)?;
    Ok(())
}

/// Rotate a frame 90° counter-clockwise in place, undoing [`rotate_clockwise`]
///
/// # Errors
///
/// Returns an error if the `OpenCV` rotation fails
pub fn rotate_counter_clockwise(frame: &mut Mat) -> Result<()> {
    let temp = frame.try_clone()?;
    core::rotate(&temp, frame, core::ROTATE_90_COUNTERCLOCKWISE)?;
    Ok(())
}

/// Pixel rectangle spanned by a box's corners
///
/// Width and height are taken as `br - tl` rather than the stored size so the
/// crop matches the drawn outline exactly.
#[must_use]
pub fn corner_region(face: Rect) -> Rect {
    let tl = face.tl();
    let br = face.br();
    Rect::new(tl.x, tl.y, br.x - tl.x, br.y - tl.y)
}

/// Intersect a box with the frame bounds; `None` when nothing is left
#[must_use]
pub fn clip_to_frame(face: Rect, max_width: i32, max_height: i32) -> Option<Rect> {
    let x0 = face.x.clamp(0, max_width.max(0));
    let y0 = face.y.clamp(0, max_height.max(0));
    let x1 = face.x.saturating_add(face.width).clamp(0, max_width.max(0));
    let y1 = face.y.saturating_add(face.height).clamp(0, max_height.max(0));

    if x1 > x0 && y1 > y0 {
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    } else {
        None
    }
}

/// Clip detector output to the image, dropping boxes with no area left
#[must_use]
pub fn clip_boxes(boxes: &[Rect], max_width: i32, max_height: i32) -> Vec<Rect> {
    boxes
        .iter()
        .filter_map(|bbox| clip_to_frame(*bbox, max_width, max_height))
        .collect()
}
