//! Constants used throughout the pipeline

/// Side length of the square face patch fed to the emotion network
pub const INPUT_SIZE: i32 = 48;

/// Color channels in a normalized patch (R, G, B)
pub const PATCH_CHANNELS: usize = 3;

/// Number of `f32` elements in one normalized patch
pub const PATCH_ELEMENTS: usize = 48 * 48 * PATCH_CHANNELS;

/// Divisor mapping 8-bit channel values into [0, 1]
pub const PIXEL_SCALE: f32 = 255.0;

/// Cascade pyramid scale step
pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;

/// Overlapping detections required to keep a candidate
pub const DEFAULT_MIN_NEIGHBORS: i32 = 2;

/// Minimum face side as a fraction of the image height
pub const DEFAULT_MIN_FACE_RATIO: f64 = 0.1;

/// `CASCADE_SCALE_IMAGE` detection flag
pub const CASCADE_SCALE_IMAGE: i32 = 2;

/// Default number of intra-op inference threads
pub const DEFAULT_NUM_THREADS: i16 = 4;

/// Caption offset from the top-left corner of a face box
pub const CAPTION_OFFSET_X: i32 = 10;
pub const CAPTION_OFFSET_Y: i32 = 20;

/// File name used when staging cascade bytes to disk
pub const STAGED_CASCADE_NAME: &str = "haarcascade_frontalface_alt.xml";

/// Subdirectory of the cache directory that holds staged cascades
pub const CASCADE_CACHE_SUBDIR: &str = "cascade";

/// Cache directory name under the system temp dir when none is configured
pub const DEFAULT_CACHE_DIR_NAME: &str = "expression-recognition";
