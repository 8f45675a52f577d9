//! Drawing face boxes and captions onto frames.

use crate::constants::{CAPTION_OFFSET_X, CAPTION_OFFSET_Y};
use crate::Result;
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::imgproc::{self, FONT_HERSHEY_PLAIN, LINE_8};
use serde::{Deserialize, Serialize};

/// Colors and font settings for overlays
///
/// Colors are given in the frame's own channel order (RGBA by default).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    /// Face box color
    pub box_color: [f64; 4],

    /// Face box line thickness
    pub box_thickness: i32,

    /// Caption color
    pub text_color: [f64; 4],

    /// Hershey font face
    pub font_face: i32,

    /// Caption font scale
    pub font_scale: f64,

    /// Caption stroke thickness
    pub text_thickness: i32,

    /// Caption origin relative to the box's top-left corner
    pub text_offset: [i32; 2],
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            box_color: [0.0, 255.0, 0.0, 255.0],
            box_thickness: 2,
            text_color: [0.0, 0.0, 255.0, 150.0],
            font_face: FONT_HERSHEY_PLAIN,
            font_scale: 1.5,
            text_thickness: 2,
            text_offset: [CAPTION_OFFSET_X, CAPTION_OFFSET_Y],
        }
    }
}

impl AnnotationStyle {
    /// Where the caption baseline starts for a given face
    #[must_use]
    pub fn caption_origin(&self, face: Rect) -> Point {
        let tl = face.tl();
        Point::new(tl.x + self.text_offset[0], tl.y + self.text_offset[1])
    }
}

fn scalar(color: [f64; 4]) -> Scalar {
    Scalar::new(color[0], color[1], color[2], color[3])
}

/// Outline a face from its top-left to its bottom-right corner
///
/// # Errors
///
/// Returns an error if `OpenCV` drawing fails
pub fn draw_face_box(frame: &mut Mat, face: Rect, style: &AnnotationStyle) -> Result<()> {
    imgproc::rectangle_points(
        frame,
        face.tl(),
        face.br(),
        scalar(style.box_color),
        style.box_thickness,
        LINE_8,
        0,
    )?;
    Ok(())
}

/// Write a caption near a face's top-left corner
///
/// # Errors
///
/// Returns an error if `OpenCV` drawing fails
pub fn draw_caption(frame: &mut Mat, face: Rect, text: &str, style: &AnnotationStyle) -> Result<()> {
    imgproc::put_text(
        frame,
        text,
        style.caption_origin(face),
        style.font_face,
        style.font_scale,
        scalar(style.text_color),
        style.text_thickness,
        LINE_8,
        false,
    )?;
    Ok(())
}
