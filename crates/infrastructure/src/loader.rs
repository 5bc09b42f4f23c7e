//! Suite file loading.
//!
//! Suites live in JSON or YAML files; the format is picked by extension.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use apiprobe_domain::Suite;

/// Errors from reading a suite file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read suite file {}", path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for a suite.
    #[error("failed to parse {} as a JSON suite", path.display())]
    Json {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The file is not valid YAML for a suite.
    #[error("failed to parse {} as a YAML suite", path.display())]
    Yaml {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The extension maps to no known suite format.
    #[error("unsupported suite format: {} (expected .json, .yaml, or .yml)", path.display())]
    UnsupportedFormat {
        /// The offending path.
        path: PathBuf,
    },
}

/// Loads a suite from a `.json`, `.yaml`, or `.yml` file.
///
/// # Errors
///
/// Returns `LoadError` when the file cannot be read, the extension is
/// unknown, or the document does not describe a suite.
pub fn load_suite(path: &Path) -> Result<Suite, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let Some(extension) = extension else {
        return Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    };

    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match extension.as_str() {
        "json" => serde_json::from_str(&text).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        }),
        "yaml" | "yml" => serde_yaml::from_str(&text).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
        _ => Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
