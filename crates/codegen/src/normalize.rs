//! Optional import normalization of written artifacts.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::GenerateError;

/// Rewrites the import block of an already written file in place.
pub trait ImportNormalizer {
    fn normalize(&self, path: &Path) -> Result<(), GenerateError>;
}

/// Runs `goimports -w <path>`.
#[derive(Debug, Clone)]
pub struct GoImports {
    binary: PathBuf,
}

impl GoImports {
    pub const DEFAULT_BINARY: &'static str = "goimports";

    pub fn new(binary: impl Into<PathBuf>) -> Self {
        GoImports {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for GoImports {
    fn default() -> Self {
        GoImports::new(Self::DEFAULT_BINARY)
    }
}

impl ImportNormalizer for GoImports {
    fn normalize(&self, path: &Path) -> Result<(), GenerateError> {
        debug!(binary = %self.binary.display(), path = %path.display(), "normalizing imports");
        let failed = |message: String| GenerateError::ImportNormalization {
            path: path.to_path_buf(),
            message,
        };
        let output = Command::new(&self.binary)
            .arg("-w")
            .arg(path)
            .output()
            .map_err(|e| failed(format!("cannot run {}: {}", self.binary.display(), e)))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        Err(failed(if stderr.is_empty() {
            format!("{} exited with {}", self.binary.display(), output.status)
        } else {
            stderr
        }))
    }
}
