//! Orchestration of one generation run over a directory.

use std::path::{Path, PathBuf};

use fm_core::PackageParser;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::GenerateError;
use crate::generator::{DeclGenerator, SkippedConstruct};
use crate::imports::{self, ImportScope};
use crate::normalize::ImportNormalizer;
use crate::render::render_file;
use crate::writer::SourceWriter;
use crate::DEFAULT_PACKAGE_SUFFIX;

/// One written file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    /// Source package the spies were generated for.
    pub package: String,
    pub path: PathBuf,
    pub spies: Vec<String>,
    pub skipped: Vec<SkippedConstruct>,
}

/// Summary of a run, in package order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub artifacts: Vec<Artifact>,
}

impl RunReport {
    pub fn spy_count(&self) -> usize {
        self.artifacts.iter().map(|a| a.spies.len()).sum()
    }
}

/// Parse, generate, render, write and optionally normalize, one artifact
/// per package.
pub struct Cmd {
    parser: Box<dyn PackageParser>,
    generator: Box<dyn DeclGenerator>,
    writer: Box<dyn SourceWriter>,
    normalizer: Option<Box<dyn ImportNormalizer>>,
    package_suffix: String,
}

impl Cmd {
    pub fn new(
        parser: Box<dyn PackageParser>,
        generator: Box<dyn DeclGenerator>,
        writer: Box<dyn SourceWriter>,
    ) -> Self {
        Cmd {
            parser,
            generator,
            writer,
            normalizer: None,
            package_suffix: DEFAULT_PACKAGE_SUFFIX.to_owned(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn ImportNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_package_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.package_suffix = suffix.into();
        self
    }

    /// Generate spies for every package in `dir`. With a single package the
    /// artifact is `dir/out`; with several, `dir/<package>_<out>`.
    ///
    /// Parse errors abort before anything is written. A write or
    /// normalization failure stops the run; artifacts already written for
    /// earlier packages stay on disk.
    pub fn run(&self, dir: &Path, out: &str) -> Result<RunReport, GenerateError> {
        let packages = self.parser.parse_dir(dir)?;
        debug!(dir = %dir.display(), packages = packages.len(), "loaded packages");
        let several = packages.len() > 1;

        let mut report = RunReport::default();
        for (name, package) in &packages {
            let generation = self.generator.generate(package);
            let resolved = imports::resolve(&ImportScope::of_package(package), generation.decls);
            let source = render_file(
                &format!("{}{}", name, self.package_suffix),
                &resolved.imports,
                &resolved.decls,
            );

            let path = if several {
                dir.join(format!("{}_{}", name, out))
            } else {
                dir.join(out)
            };
            self.writer.write(&source, &path)?;
            info!(
                package = %name,
                path = %path.display(),
                spies = generation.spies.len(),
                skipped = generation.skipped.len(),
                "wrote spies"
            );

            if let Some(normalizer) = &self.normalizer {
                normalizer.normalize(&path)?;
            }

            report.artifacts.push(Artifact {
                package: name.clone(),
                path,
                spies: generation.spies,
                skipped: generation.skipped,
            });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Generation, SpyGenerator};
    use fm_core::{parse_source, LoadError, Package, ParseError, ParsedFile};
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    /// Parser double serving fixed packages.
    struct StaticParser(Result<Vec<(&'static str, &'static str)>, ParseError>);

    impl PackageParser for StaticParser {
        fn parse_dir(&self, dir: &Path) -> Result<BTreeMap<String, Package>, LoadError> {
            let files = self.0.clone()?;
            let mut pkgs: BTreeMap<String, Package> = BTreeMap::new();
            for (file_name, src) in files {
                let path = dir.join(file_name);
                let file = parse_source(src, file_name)?;
                pkgs.entry(file.package.clone())
                    .or_insert_with(|| Package {
                        name: file.package.clone(),
                        files: Vec::new(),
                    })
                    .files
                    .push(ParsedFile { path, file });
            }
            Ok(pkgs)
        }
    }

    type Log = Rc<RefCell<Vec<String>>>;

    /// Writer double recording every call.
    struct RecordingWriter {
        log: Log,
        fail_on: Option<&'static str>,
    }

    impl SourceWriter for RecordingWriter {
        fn write(&self, source: &str, path: &Path) -> Result<(), GenerateError> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if self.fail_on == Some(name) {
                return Err(GenerateError::Write {
                    path: path.to_path_buf(),
                    source: std::io::Error::other("disk full"),
                });
            }
            let package = source
                .lines()
                .find(|l| l.starts_with("package "))
                .unwrap_or_default();
            self.log.borrow_mut().push(format!("write {} ({})", name, package));
            Ok(())
        }
    }

    struct RecordingNormalizer {
        log: Log,
        fail: bool,
    }

    impl ImportNormalizer for RecordingNormalizer {
        fn normalize(&self, path: &Path) -> Result<(), GenerateError> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            self.log.borrow_mut().push(format!("normalize {}", name));
            if self.fail {
                return Err(GenerateError::ImportNormalization {
                    path: path.to_path_buf(),
                    message: "goimports: syntax error".into(),
                });
            }
            Ok(())
        }
    }

    /// Generator double that only reports which packages it saw.
    struct NamingGenerator(Log);

    impl DeclGenerator for NamingGenerator {
        fn generate(&self, package: &Package) -> Generation {
            self.0.borrow_mut().push(format!("generate {}", package.name));
            Generation::default()
        }
    }

    const DOER: (&str, &str) = (
        "doer.go",
        "package example\ntype Doer interface { DoIt(task string) error }\n",
    );
    const SHAPES: (&str, &str) = (
        "shapes.go",
        "package shapes\ntype Area interface { Area() float64 }\ntype Marker interface{}\n",
    );

    fn cmd(files: Vec<(&'static str, &'static str)>, log: &Log) -> Cmd {
        Cmd::new(
            Box::new(StaticParser(Ok(files))),
            Box::new(SpyGenerator::default()),
            Box::new(RecordingWriter {
                log: log.clone(),
                fail_on: None,
            }),
        )
    }

    #[test]
    fn single_package_writes_out_in_dir() {
        let log = Log::default();
        let report = cmd(vec![DOER], &log).run(Path::new("/src"), "fm_test.go").unwrap();
        assert_eq!(report.artifacts.len(), 1);
        let a = &report.artifacts[0];
        assert_eq!(a.package, "example");
        assert_eq!(a.path, PathBuf::from("/src/fm_test.go"));
        assert_eq!(a.spies, vec!["FakeDoer"]);
        assert_eq!(log.borrow().len(), 1);
        assert!(log.borrow()[0].starts_with("write fm_test.go"));
    }

    #[test]
    fn several_packages_get_prefixed_artifacts_in_name_order() {
        let log = Log::default();
        let report = cmd(vec![SHAPES, DOER], &log)
            .run(Path::new("/src"), "fm_test.go")
            .unwrap();
        let paths: Vec<_> = report.artifacts.iter().map(|a| a.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/src/example_fm_test.go"),
                PathBuf::from("/src/shapes_fm_test.go"),
            ]
        );
        assert_eq!(report.spy_count(), 3);
    }

    #[test]
    fn packages_are_generated_in_lexicographic_order() {
        let log = Log::default();
        let cmd = Cmd::new(
            Box::new(StaticParser(Ok(vec![SHAPES, DOER]))),
            Box::new(NamingGenerator(log.clone())),
            Box::new(RecordingWriter {
                log: log.clone(),
                fail_on: None,
            }),
        );
        cmd.run(Path::new("/src"), "fm_test.go").unwrap();
        let entries: Vec<String> = log
            .borrow()
            .iter()
            .map(|e| e.split(" (").next().unwrap_or_default().to_owned())
            .collect();
        assert_eq!(
            entries,
            vec![
                "generate example",
                "write example_fm_test.go",
                "generate shapes",
                "write shapes_fm_test.go",
            ]
        );
    }

    #[test]
    fn parse_error_writes_nothing() {
        let log = Log::default();
        let cmd = Cmd::new(
            Box::new(StaticParser(Err(ParseError::new("bad.go", 2, "unexpected")))),
            Box::new(SpyGenerator::default()),
            Box::new(RecordingWriter {
                log: log.clone(),
                fail_on: None,
            }),
        );
        let err = cmd.run(Path::new("/src"), "fm_test.go").unwrap_err();
        assert!(matches!(err, GenerateError::Load(LoadError::Parse(_))));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn write_error_stops_later_packages() {
        let log = Log::default();
        let cmd = Cmd::new(
            Box::new(StaticParser(Ok(vec![SHAPES, DOER]))),
            Box::new(SpyGenerator::default()),
            Box::new(RecordingWriter {
                log: log.clone(),
                fail_on: Some("example_fm_test.go"),
            }),
        );
        let err = cmd.run(Path::new("/src"), "fm_test.go").unwrap_err();
        assert!(matches!(err, GenerateError::Write { .. }));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn normalizer_runs_after_write_and_its_failure_is_fatal() {
        let log = Log::default();
        let ok = cmd(vec![DOER], &log).with_normalizer(Box::new(RecordingNormalizer {
            log: log.clone(),
            fail: false,
        }));
        ok.run(Path::new("/src"), "fm_test.go").unwrap();
        assert!(log.borrow()[0].starts_with("write fm_test.go"));
        assert_eq!(log.borrow()[1], "normalize fm_test.go");

        let log = Log::default();
        let failing = cmd(vec![DOER], &log).with_normalizer(Box::new(RecordingNormalizer {
            log: log.clone(),
            fail: true,
        }));
        let err = failing.run(Path::new("/src"), "fm_test.go").unwrap_err();
        assert!(matches!(err, GenerateError::ImportNormalization { .. }));
        assert!(log.borrow()[0].starts_with("write fm_test.go"));
    }

    #[test]
    fn empty_directory_writes_nothing() {
        let log = Log::default();
        let report = cmd(vec![], &log).run(Path::new("/src"), "fm_test.go").unwrap();
        assert!(report.artifacts.is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn report_serializes_for_json_output() {
        let log = Log::default();
        let report = cmd(vec![DOER], &log)
            .with_package_suffix("_spies")
            .run(Path::new("/src"), "fm_test.go")
            .unwrap();
        assert_eq!(log.borrow()[0], "write fm_test.go (package example_spies)");
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["artifacts"][0]["package"], "example");
        assert_eq!(v["artifacts"][0]["spies"][0], "FakeDoer");
        assert_eq!(v["artifacts"][0]["path"], "/src/fm_test.go");
    }
}
