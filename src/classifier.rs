//! Emotion network inference using `ONNX` Runtime.

use crate::constants::{DEFAULT_NUM_THREADS, INPUT_SIZE, PATCH_CHANNELS};
use crate::preprocess::NormalizedPatch;
use crate::runtime;
use crate::utils::safe_cast::i32_to_usize;
use crate::{Error, Result};
use ndarray::CowArray;
use ort::{ExecutionProvider, GraphOptimizationLevel, Session, SessionBuilder, Value};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Produces one emotion score per face patch
///
/// Implementations serve a single in-flight inference at a time.
pub trait EmotionModel {
    /// Run the network on one patch and return its raw score
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails
    fn infer(&mut self, patch: &NormalizedPatch) -> Result<f32>;
}

/// Session construction options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierOptions {
    /// Request GPU execution ahead of the CPU provider
    pub prefer_gpu: bool,

    /// Intra-op thread count
    pub num_threads: i16,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            prefer_gpu: true,
            num_threads: DEFAULT_NUM_THREADS,
        }
    }
}

impl ClassifierOptions {
    fn execution_providers(&self) -> Vec<ExecutionProvider> {
        let mut providers = Vec::with_capacity(2);
        if self.prefer_gpu {
            #[cfg(feature = "cuda")]
            providers.push(ExecutionProvider::CUDA(Default::default()));
            #[cfg(not(feature = "cuda"))]
            log::warn!("GPU execution requested but CUDA support is not compiled in; using CPU");
        }
        providers.push(ExecutionProvider::CPU(Default::default()));
        providers
    }
}

/// Single-logit emotion classifier
///
/// Expects one `1×48×48×3` float input and one `1×1` float output.
pub struct EmotionClassifier {
    session: Session,
    model_bytes: usize,
}

impl EmotionClassifier {
    /// Load the network from an in-memory model
    ///
    /// The runtime reads models from disk, so the bytes are written to a
    /// private temporary file that is removed once the session is built.
    /// GPU acceleration is requested when `options.prefer_gpu` is set; the
    /// runtime falls back to CPU execution if it cannot be attached.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The bytes are empty or cannot be staged
    /// - The runtime environment is unavailable
    /// - The bytes are not a valid model
    /// - The model's input or output tensors do not match the expected shape
    pub fn from_bytes(model: &[u8], options: &ClassifierOptions) -> Result<Self> {
        if model.is_empty() {
            return Err(Error::ModelLoad("Model resource is empty".to_string()));
        }

        let mut staged = tempfile::Builder::new()
            .prefix("emotion_model_")
            .suffix(".onnx")
            .tempfile()?;
        staged.write_all(model)?;
        staged.flush()?;

        let session = build_session(staged.path(), options)?;
        log::debug!("Emotion model loaded from memory ({} bytes)", model.len());

        Ok(Self {
            session,
            model_bytes: model.len(),
        })
    }

    /// Load the network from a standalone model file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or the model is rejected
    pub fn from_file<P: AsRef<Path>>(model_path: P, options: &ClassifierOptions) -> Result<Self> {
        let path = model_path.as_ref();
        log::info!("Loading emotion model: {}", path.display());

        let metadata = std::fs::metadata(path)
            .map_err(|e| Error::ModelLoad(format!("Cannot read {}: {e}", path.display())))?;
        if metadata.len() == 0 {
            return Err(Error::ModelLoad(format!("Model file is empty: {}", path.display())));
        }
        let model_bytes = usize::try_from(metadata.len())
            .map_err(|_| Error::ModelLoad(format!("Model file too large: {}", path.display())))?;

        let session = build_session(path, options)?;
        Ok(Self { session, model_bytes })
    }

    /// Load the network from a byte range inside a larger container file
    ///
    /// The container handle is released before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the range lies outside the file or the model is
    /// rejected
    pub fn from_file_range<P: AsRef<Path>>(
        container: P,
        offset: u64,
        length: u64,
        options: &ClassifierOptions,
    ) -> Result<Self> {
        let bytes = read_range(container.as_ref(), offset, length)?;
        Self::from_bytes(&bytes, options)
    }

    /// Size of the model blob this classifier was built from
    #[must_use]
    pub fn model_bytes(&self) -> usize {
        self.model_bytes
    }

    /// Run forward pass through the model
    fn forward(&self, patch: &NormalizedPatch) -> Result<f32> {
        let cow_array = CowArray::from(patch.view().into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let score_output = outputs
            .into_iter()
            .next()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;

        let score_tensor = score_output.try_extract::<f32>()?;
        let score_view = score_tensor.view();
        let score = score_view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| Error::ModelOutputError("Model output is empty".to_string()))?;

        Ok(score)
    }
}

impl EmotionModel for EmotionClassifier {
    fn infer(&mut self, patch: &NormalizedPatch) -> Result<f32> {
        self.forward(patch)
    }
}

fn build_session(model_path: &Path, options: &ClassifierOptions) -> Result<Session> {
    let environment = runtime::environment()?;
    let session = SessionBuilder::new(&environment)?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(options.num_threads)?
        .with_execution_providers(options.execution_providers())?
        .with_model_from_file(model_path)?;

    validate_signature(&session)?;
    Ok(session)
}

fn read_range(path: &Path, offset: u64, length: u64) -> Result<Vec<u8>> {
    let mut file = File::open(path)
        .map_err(|e| Error::ModelLoad(format!("Cannot open {}: {e}", path.display())))?;

    let file_len = file.metadata()?.len();
    let fits = offset
        .checked_add(length)
        .is_some_and(|end| end <= file_len);
    if !fits {
        return Err(Error::ModelLoad(format!(
            "Model range {offset}+{length} exceeds {} ({file_len} bytes)",
            path.display()
        )));
    }

    file.seek(SeekFrom::Start(offset))?;
    let mut bytes = Vec::new();
    file.take(length).read_to_end(&mut bytes)?;

    if u64::try_from(bytes.len()).ok() != Some(length) {
        return Err(Error::ModelLoad(format!(
            "Model range {offset}+{length} truncated: read {} bytes from {}",
            bytes.len(),
            path.display()
        )));
    }
    Ok(bytes)
}

/// Check the model has one NHWC patch input and one scalar output
fn validate_signature(session: &Session) -> Result<()> {
    let input = match session.inputs.as_slice() {
        [input] => input,
        inputs => {
            return Err(Error::ModelInputError(format!(
                "Expected exactly one input, model has {}",
                inputs.len()
            )))
        }
    };

    let side = i32_to_usize(INPUT_SIZE)?;
    let expected_input = [1, side, side, PATCH_CHANNELS];
    let input_matches = input.dimensions.len() == expected_input.len()
        && input
            .dimensions
            .iter()
            .zip(expected_input)
            .skip(1)
            .all(|(dim, expected)| dim.map_or(true, |d| d as usize == expected));
    if !input_matches {
        return Err(Error::ModelInputError(format!(
            "Input '{}' has shape {:?}, expected {:?}",
            input.name, input.dimensions, expected_input
        )));
    }

    let output = match session.outputs.as_slice() {
        [output] => output,
        outputs => {
            return Err(Error::ModelOutputError(format!(
                "Expected exactly one output, model has {}",
                outputs.len()
            )))
        }
    };

    let output_matches = output.dimensions.len() == 2
        && output.dimensions[1].map_or(true, |d| d as usize == 1);
    if !output_matches {
        return Err(Error::ModelOutputError(format!(
            "Output '{}' has shape {:?}, expected [1, 1]",
            output.name, output.dimensions
        )));
    }

    Ok(())
}
