//! Directory loading: every non-test `.go` file of one directory, parsed
//! and grouped by package clause.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ast::{Decl, SourceFile};
use crate::error::LoadError;
use crate::parser;
use crate::source::{FileSystemProvider, SourceProvider};

/// One Go package found in a directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    /// Files in path order.
    pub files: Vec<ParsedFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub file: SourceFile,
}

impl Package {
    /// Declarations of every file, in file order.
    pub fn decls(&self) -> impl Iterator<Item = &Decl> {
        self.files.iter().flat_map(|f| f.file.decls.iter())
    }
}

/// Parses all source files of a directory.
pub trait PackageParser {
    /// Packages keyed by package name. Iteration order is the
    /// lexicographic order of package names.
    fn parse_dir(&self, dir: &Path) -> Result<BTreeMap<String, Package>, LoadError>;
}

/// Parses source files only: `_test.go` files and previously generated
/// artifacts are skipped.
pub struct SrcFileParser<P: SourceProvider = FileSystemProvider> {
    provider: P,
    exclude: Vec<String>,
}

impl SrcFileParser<FileSystemProvider> {
    pub fn new() -> Self {
        Self::with_provider(FileSystemProvider)
    }
}

impl Default for SrcFileParser<FileSystemProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SourceProvider> SrcFileParser<P> {
    pub fn with_provider(provider: P) -> Self {
        SrcFileParser {
            provider,
            exclude: Vec::new(),
        }
    }

    /// Skip files named `file_name`. Files named `<pkg>_<file_name>` are
    /// skipped only when they carry a `// Code generated ... DO NOT EDIT.`
    /// marker, so hand-written files that merely share the suffix survive.
    pub fn exclude(mut self, file_name: impl Into<String>) -> Self {
        self.exclude.push(file_name.into());
        self
    }

    fn wanted(&self, path: &Path) -> bool {
        is_src_file(path) && !file_name(path).is_some_and(|n| self.exclude.iter().any(|e| n == e))
    }

    fn is_prefixed_artifact(&self, path: &Path) -> bool {
        file_name(path).is_some_and(|n| {
            self.exclude.iter().any(|e| {
                n.strip_suffix(e.as_str())
                    .is_some_and(|pkg| pkg.len() > 1 && pkg.ends_with('_'))
            })
        })
    }
}

impl<P: SourceProvider> PackageParser for SrcFileParser<P> {
    fn parse_dir(&self, dir: &Path) -> Result<BTreeMap<String, Package>, LoadError> {
        let mut paths: Vec<PathBuf> = self
            .provider
            .list_files(dir)
            .map_err(|e| LoadError::io(dir, e))?
            .into_iter()
            .filter(|p| self.wanted(p))
            .collect();
        paths.sort();

        let mut packages: BTreeMap<String, Package> = BTreeMap::new();
        for path in paths {
            let src = self
                .provider
                .read_source(&path)
                .map_err(|e| LoadError::io(&path, e))?;
            if self.is_prefixed_artifact(&path) && is_generated(&src) {
                debug!(file = %path.display(), "skipping generated artifact");
                continue;
            }
            let file = parser::parse_source(&src, &path.display().to_string())?;
            debug!(
                file = %path.display(),
                package = %file.package,
                decls = file.decls.len(),
                "parsed source file"
            );
            packages
                .entry(file.package.clone())
                .or_insert_with(|| Package {
                    name: file.package.clone(),
                    files: Vec::new(),
                })
                .files
                .push(ParsedFile { path, file });
        }
        Ok(packages)
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Whether a line before the package clause is the standard
/// `// Code generated <anything> DO NOT EDIT.` marker.
fn is_generated(src: &str) -> bool {
    src.trim_start_matches('\u{feff}')
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .take_while(|line| !line.starts_with("package"))
        .any(|line| {
            line.strip_prefix("// Code generated ")
                .is_some_and(|rest| rest.ends_with(" DO NOT EDIT."))
        })
}

/// A non-test Go source file.
pub fn is_src_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go")
}
