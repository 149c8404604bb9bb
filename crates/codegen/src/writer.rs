use std::path::Path;

use crate::error::GenerateError;

/// Persists rendered source text.
pub trait SourceWriter {
    fn write(&self, source: &str, path: &Path) -> Result<(), GenerateError>;
}

/// Writes artifacts to the filesystem, replacing existing files.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskWriter;

impl SourceWriter for DiskWriter {
    fn write(&self, source: &str, path: &Path) -> Result<(), GenerateError> {
        std::fs::write(path, source).map_err(|source| GenerateError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_overwrites() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("fm_test.go");
        DiskWriter.write("first", &path).unwrap();
        DiskWriter.write("second", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn missing_parent_is_a_write_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent").join("fm_test.go");
        let err = DiskWriter.write("x", &path).unwrap_err();
        assert!(matches!(err, GenerateError::Write { .. }));
    }
}
