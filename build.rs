//! Build script for detecting system dependencies and providing installation guidance.
//!
//! This script checks for `OpenCV` and its bundled Haar cascade data and prints
//! helpful messages if they are missing.

use std::env;
use std::path::Path;
use std::process::Command;

const CASCADE_FILE: &str = "haarcascade_frontalface_alt.xml";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Check for OpenCV
    let prefix = check_opencv();

    // Check for the frontal face cascade shipped with OpenCV
    check_cascade_data(prefix.as_deref());

    // Print detected environment
    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
    println!("cargo:rustc-env=BUILD_HOST={}", env::var("HOST").unwrap_or_default());
}

/// Returns the `OpenCV` install prefix when pkg-config knows it
fn check_opencv() -> Option<String> {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    for package in ["opencv4", "opencv"] {
        let output = Command::new("pkg-config").args(["--modversion", package]).output();
        if let Ok(output) = output {
            if output.status.success() {
                let version = String::from_utf8_lossy(&output.stdout);
                println!("cargo:warning=Found OpenCV version: {}", version.trim());
                return pkg_config_variable(package, "prefix");
            }
        }
    }

    println!("cargo:warning=OpenCV not found via pkg-config. Make sure OpenCV is installed.");
    println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev");
    println!("cargo:warning=On macOS: brew install opencv");
    None
}

fn pkg_config_variable(package: &str, variable: &str) -> Option<String> {
    let output = Command::new("pkg-config")
        .arg(format!("--variable={variable}"))
        .arg(package)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn check_cascade_data(prefix: Option<&str>) {
    let mut candidates = vec![
        "/usr/share/opencv4/haarcascades".to_string(),
        "/usr/share/opencv/haarcascades".to_string(),
        "/usr/local/share/opencv4/haarcascades".to_string(),
    ];
    if let Some(prefix) = prefix {
        candidates.insert(0, format!("{prefix}/share/opencv4/haarcascades"));
    }

    match candidates
        .iter()
        .map(|dir| Path::new(dir).join(CASCADE_FILE))
        .find(|path| path.is_file())
    {
        Some(path) => println!("cargo:warning=Found face cascade: {}", path.display()),
        None => {
            println!("cargo:warning={CASCADE_FILE} not found. Face detection needs a cascade path in the config.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install opencv-data");
        }
    }
}
