use std::path::PathBuf;

use fm_core::LoadError;

/// Fatal failure of a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The directory could not be read or a source file failed to parse.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// An artifact could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The import normalizer failed on an already written artifact.
    #[error("import normalization failed for {}: {message}", path.display())]
    ImportNormalization { path: PathBuf, message: String },
}

impl GenerateError {
    /// Serialize to the machine-readable error shape used by `--output json`.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            GenerateError::Load(LoadError::Parse(e)) => e.to_json_value(),
            GenerateError::Load(LoadError::Io { path, .. }) => serde_json::json!({
                "kind":    "read",
                "path":    path.display().to_string(),
                "message": self.to_string(),
            }),
            GenerateError::Write { path, .. } => serde_json::json!({
                "kind":    "write",
                "path":    path.display().to_string(),
                "message": self.to_string(),
            }),
            GenerateError::ImportNormalization { path, .. } => serde_json::json!({
                "kind":    "import_normalization",
                "path":    path.display().to_string(),
                "message": self.to_string(),
            }),
        }
    }
}
