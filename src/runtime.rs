//! Process-wide inference runtime initialization.
//!
//! The ONNX Runtime environment is created once per process by [`init`] and
//! shared by every classifier. Initialization is idempotent; its outcome is
//! recorded and later calls only report it.

use crate::{Error, Result};
use ort::{Environment, LoggingLevel};
use std::sync::{Arc, OnceLock};

/// Name under which the runtime environment registers itself
const ENVIRONMENT_NAME: &str = "expression_recognition";

static ENVIRONMENT: OnceLock<std::result::Result<Arc<Environment>, String>> = OnceLock::new();

fn build_environment() -> std::result::Result<Arc<Environment>, String> {
    match Environment::builder()
        .with_name(ENVIRONMENT_NAME)
        .with_log_level(LoggingLevel::Warning)
        .build()
    {
        Ok(environment) => {
            log::info!("Inference runtime initialized");
            Ok(Arc::new(environment))
        }
        Err(e) => {
            log::error!("Inference runtime failed to initialize: {}", e);
            Err(e.to_string())
        }
    }
}

/// Initialize the runtime once; returns whether it is usable
///
/// Safe to call any number of times from any thread.
pub fn init() -> bool {
    ENVIRONMENT.get_or_init(build_environment).is_ok()
}

/// Whether [`init`] has run and succeeded
pub fn is_initialized() -> bool {
    matches!(ENVIRONMENT.get(), Some(Ok(_)))
}

/// Shared runtime environment, initializing it on first use
///
/// # Errors
///
/// Returns an error if the runtime could not be initialized
pub fn environment() -> Result<Arc<Environment>> {
    match ENVIRONMENT.get_or_init(build_environment) {
        Ok(environment) => Ok(Arc::clone(environment)),
        Err(reason) => Err(Error::ModelLoad(format!(
            "Inference runtime unavailable: {reason}"
        ))),
    }
}
