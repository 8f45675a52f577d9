//! Checked conversions between OpenCV's `i32` geometry and Rust indices

use crate::{Error, Result};

/// Convert a non-negative OpenCV dimension to usize
///
/// # Errors
///
/// Returns an error if the value is negative
pub fn i32_to_usize(value: i32) -> Result<usize> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Negative dimension {value}")))
}

/// Safely convert f64 to i32 with bounds checking, truncating toward zero
///
/// # Errors
///
/// Returns an error if the value is not finite or outside i32 range
#[allow(clippy::cast_possible_truncation)] // Truncation after bounds check is safe
pub fn f64_to_i32(value: f64) -> Result<i32> {
    if value.is_finite() && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        Ok(value as i32)
    } else {
        Err(Error::InvalidInput(format!(
            "Value {value} cannot be safely converted to i32"
        )))
    }
}
