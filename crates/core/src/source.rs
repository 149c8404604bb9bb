//! Where Go sources come from.
//!
//! The package loader only sees a [`SourceProvider`]: the CLI reads package
//! directories from disk, tests serve a fixed set of files from memory.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Directory listing and file reads for the package loader.
pub trait SourceProvider {
    /// Regular files directly inside `dir`; subdirectories are not entered.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn read_source(&self, path: &Path) -> io::Result<String>;
}

/// Reads package directories from disk.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    }

    fn read_source(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Serves a fixed set of files. A directory exists when at least one file
/// lives somewhere below it.
pub struct InMemoryProvider {
    files: HashMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new(files: HashMap<PathBuf, String>) -> Self {
        InMemoryProvider {
            files: files
                .into_iter()
                .map(|(path, src)| (lexical_path(&path), src))
                .collect(),
        }
    }

    /// `(path, source)` pairs, e.g. `[("/pkg/doer.go", "package pkg")]`.
    pub fn from_files(files: &[(&str, &str)]) -> Self {
        Self::new(
            files
                .iter()
                .map(|(path, src)| (PathBuf::from(path), (*src).to_owned()))
                .collect(),
        )
    }
}

impl SourceProvider for InMemoryProvider {
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let dir = lexical_path(dir);
        if !self.files.keys().any(|k| k.starts_with(&dir)) {
            return Err(not_found("directory", &dir));
        }
        Ok(self
            .files
            .keys()
            .filter(|p| p.parent() == Some(dir.as_path()))
            .cloned()
            .collect())
    }

    fn read_source(&self, path: &Path) -> io::Result<String> {
        let path = lexical_path(path);
        self.files
            .get(&path)
            .cloned()
            .ok_or_else(|| not_found("file", &path))
    }
}

fn not_found(what: &str, path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found in memory: {}", what, path.display()),
    )
}

/// `path` with `.` dropped and `..` applied, without touching the disk.
fn lexical_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.iter().collect()
}
