//! Host application: feeds camera, video or still frames through the pipeline.

use crate::{
    config::Config,
    error::{Error, Result},
    observer::LogObserver,
    pipeline::{ExpressionPipeline, FrameReport},
};
use log::{debug, info, warn};
use opencv::{
    core::{Mat, Size, Vector},
    highgui::{self, WINDOW_NORMAL},
    imgcodecs,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter, CAP_PROP_BUFFERSIZE, CAP_PROP_FPS},
};
use std::path::{Path, PathBuf};
use std::time::Instant;

const WINDOW_NAME: &str = "Expression Recognition";
const ESC_KEY: i32 = 27;
const FALLBACK_FPS: f64 = 30.0;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where frames come from
    pub video_source: VideoSource,
    /// Where annotated frames are written, if anywhere
    pub output: Option<PathBuf>,
    /// Skip the preview window
    pub headless: bool,
    /// Pipeline settings
    pub pipeline: Config,
}

/// Frame source
#[derive(Debug, Clone, PartialEq)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
    /// Single still image
    Image(String),
}

/// Expression recognition host
pub struct ExpressionApp {
    config: AppConfig,
    pipeline: ExpressionPipeline,
}

impl ExpressionApp {
    /// Load models and prepare the preview window
    ///
    /// # Errors
    ///
    /// Returns an error if the emotion model cannot be loaded or the window
    /// cannot be created
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing Expression Recognition application");

        let pipeline = ExpressionPipeline::from_config(&config.pipeline, Box::new(LogObserver))?;
        if !pipeline.is_detection_active() {
            warn!("Running without face detection; frames will not be annotated");
        }

        if !config.headless {
            highgui::named_window(WINDOW_NAME, WINDOW_NORMAL)?;
        }

        Ok(Self { config, pipeline })
    }

    /// Process the configured source until it ends or the user quits
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened or a frame fails
    pub fn run(&mut self) -> Result<()> {
        match self.config.video_source.clone() {
            VideoSource::Image(path) => self.run_image(&path),
            VideoSource::Camera(index) => {
                info!("Opening camera {}", index);
                let mut capture = VideoCapture::new(index, videoio::CAP_ANY)?;
                capture.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                self.run_capture(capture, true)
            }
            VideoSource::File(path) => {
                info!("Opening video file: {}", path);
                let capture = VideoCapture::from_file(&path, videoio::CAP_ANY)?;
                self.run_capture(capture, false)
            }
        }
    }

    fn run_image(&mut self, path: &str) -> Result<()> {
        let image = imgcodecs::imread(path, imgcodecs::IMREAD_COLOR)?;
        if image.empty() {
            return Err(Error::InvalidInput(format!("Cannot read image: {path}")));
        }

        let (annotated, report) = self.process_bgr(&image)?;
        log_report(&report);

        if let Some(output) = &self.config.output {
            let output_str = path_str(output)?;
            if !imgcodecs::imwrite(output_str, &annotated, &Vector::new())? {
                return Err(Error::IoError(format!("Failed to write {output_str}")));
            }
            info!("Annotated image written to {}", output.display());
        }

        if !self.config.headless {
            highgui::imshow(WINDOW_NAME, &annotated)?;
            highgui::wait_key(0)?;
        }
        Ok(())
    }

    fn run_capture(&mut self, mut capture: VideoCapture, live: bool) -> Result<()> {
        if !capture.is_opened()? {
            return Err(Error::InvalidInput("Failed to open video source".to_string()));
        }

        let fps = match capture.get(CAP_PROP_FPS)? {
            fps if fps > 0.0 => fps,
            _ => FALLBACK_FPS,
        };
        let mut writer: Option<VideoWriter> = None;

        let start_time = Instant::now();
        let mut frame_count: u64 = 0;
        let mut face_count: usize = 0;

        info!("Entering main loop");
        loop {
            let mut frame = Mat::default();
            if !capture.read(&mut frame)? || frame.empty() {
                if live {
                    warn!("Failed to read frame, retrying...");
                    continue;
                }
                info!("End of video file reached");
                break;
            }

            let (annotated, report) = self.process_bgr(&frame)?;
            frame_count += 1;
            face_count += report.faces.len();
            log_report(&report);

            if let Some(output) = &self.config.output {
                if writer.is_none() {
                    writer = Some(open_writer(output, fps, annotated.size()?)?);
                }
                if let Some(writer) = writer.as_mut() {
                    writer.write(&annotated)?;
                }
            }

            if !self.config.headless {
                highgui::imshow(WINDOW_NAME, &annotated)?;
                if is_exit_key(highgui::wait_key(1)?) {
                    info!("Exit requested by user");
                    break;
                }
            }
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        #[allow(clippy::cast_precision_loss)]
        let average_fps = if elapsed > 0.0 { frame_count as f64 / elapsed } else { 0.0 };
        info!(
            "Processed {} frames ({} faces classified, {:.1} fps)",
            frame_count, face_count, average_fps
        );
        Ok(())
    }

    /// Run the pipeline on a BGR frame and return the annotated BGR result
    fn process_bgr(&mut self, bgr: &Mat) -> Result<(Mat, FrameReport)> {
        let mut rgba = bgr_to_rgba(bgr)?;
        let report = self.pipeline.process(&mut rgba)?;
        Ok((rgba_to_bgr(&rgba)?, report))
    }
}

fn log_report(report: &FrameReport) {
    for face in &report.faces {
        debug!("{:?} -> {}", face.bbox, face.caption);
    }
    if report.skipped > 0 {
        debug!("{} face(s) skipped", report.skipped);
    }
}

fn open_writer(path: &Path, fps: f64, size: Size) -> Result<VideoWriter> {
    let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
    let writer = VideoWriter::new(path_str(path)?, fourcc, fps, size, true)?;
    if !writer.is_opened()? {
        return Err(Error::IoError(format!("Failed to open video writer: {}", path.display())));
    }
    info!("Writing annotated video to {}", path.display());
    Ok(writer)
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::InvalidInput(format!("Non UTF-8 path: {}", path.display())))
}

/// Whether a `wait_key` result asks the app to quit (ESC or `q`)
#[must_use]
pub fn is_exit_key(key: i32) -> bool {
    key == ESC_KEY || key == i32::from(b'q')
}

/// Convert a capture frame (BGR or gray) to the RGBA layout the pipeline expects
///
/// # Errors
///
/// Returns an error for unsupported channel counts or if conversion fails
pub fn bgr_to_rgba(frame: &Mat) -> Result<Mat> {
    let code = match frame.channels() {
        3 => imgproc::COLOR_BGR2RGBA,
        4 => imgproc::COLOR_BGRA2RGBA,
        1 => imgproc::COLOR_GRAY2RGBA,
        n => {
            return Err(Error::InvalidInput(format!(
                "Unsupported channel count for capture frame: {n}"
            )))
        }
    };
    let mut rgba = Mat::default();
    imgproc::cvt_color(frame, &mut rgba, code, 0)?;
    Ok(rgba)
}

/// Convert an annotated RGBA frame back to BGR for display and encoding
///
/// # Errors
///
/// Returns an error if conversion fails
pub fn rgba_to_bgr(frame: &Mat) -> Result<Mat> {
    let mut bgr = Mat::default();
    imgproc::cvt_color(frame, &mut bgr, imgproc::COLOR_RGBA2BGR, 0)?;
    Ok(bgr)
}
