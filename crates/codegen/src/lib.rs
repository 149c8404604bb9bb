//! fm-codegen: spy synthesis for Go interface declarations.
//!
//! For every interface type declared in a package, synthesizes a recording
//! struct ("spy") plus one method per interface method, renders them as a
//! gofmt-style `_test` package file and writes it next to the sources.
//!
//! Pipeline: [`select`] picks contract declarations, [`record`] and
//! [`method`] build the spy declarations, [`generator`] ties them together
//! per package, [`render`] and [`imports`] print the artifact, [`writer`]
//! and [`normalize`] persist it, and [`cmd`] orchestrates one run.

pub mod cmd;
pub mod error;
pub mod flatten;
pub mod generator;
pub mod imports;
pub mod method;
pub mod normalize;
pub mod record;
pub mod render;
pub mod select;
pub mod writer;

pub use cmd::{Artifact, Cmd, RunReport};
pub use error::GenerateError;
pub use generator::{DeclGenerator, Generation, SkipReason, SkippedConstruct, SpyGenerator};
pub use normalize::{GoImports, ImportNormalizer};
pub use writer::{DiskWriter, SourceWriter};

/// Spy type name prefix: `Doer` becomes `FakeDoer`.
pub const DEFAULT_PREFIX: &str = "Fake";

/// Suffix appended to the package name of generated files.
pub const DEFAULT_PACKAGE_SUFFIX: &str = "_test";

/// Artifact file name.
pub const DEFAULT_OUTPUT: &str = "fm_test.go";

/// Preferred receiver name of generated methods.
pub const RECEIVER: &str = "f";

/// Name of the mutex field added in thread-safe mode.
pub const LOCK_FIELD: &str = "mu";

pub const CALLED_SUFFIX: &str = "_Called";
pub const INPUT_SUFFIX: &str = "_Input";
pub const OUTPUT_SUFFIX: &str = "_Output";
pub const ARG_PREFIX: &str = "Arg";
pub const RET_PREFIX: &str = "Ret";

/// Generator-wide spy settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpyOptions {
    pub prefix: String,
    /// Guard every generated method with a `sync.Mutex` held for the whole
    /// call.
    pub thread_safe: bool,
}

impl Default for SpyOptions {
    fn default() -> Self {
        SpyOptions {
            prefix: DEFAULT_PREFIX.to_owned(),
            thread_safe: false,
        }
    }
}

impl SpyOptions {
    pub fn spy_name(&self, contract: &str) -> String {
        format!("{}{}", self.prefix, contract)
    }
}
