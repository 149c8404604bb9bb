//! Generator configuration for `fm`.
//!
//! Settings come from three layers: explicit command-line flags win over
//! values from the TOML config file, which win over built-in defaults.
//!
//! # Example
//!
//! ```toml
//! [generate]
//! out = "fm_test.go"
//! prefix = "Fake"
//! package_suffix = "_test"
//! thread_safe = false
//! goimports = false
//! goimports_bin = "goimports"
//! ```

use std::path::{Path, PathBuf};

use fm_codegen::{GoImports, DEFAULT_OUTPUT, DEFAULT_PACKAGE_SUFFIX, DEFAULT_PREFIX};
use serde::{Deserialize, Serialize};

/// Looked up in the scanned directory when no `--config` is given.
pub const CONFIG_FILE: &str = "fm.toml";

// ── Types ─────────────────────────────────────────────────────────────────────

/// Top-level config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FmConfig {
    #[serde(default)]
    pub generate: GenerateSettings,
}

/// `[generate]` section. Absent keys fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateSettings {
    pub out: Option<String>,
    pub prefix: Option<String>,
    pub package_suffix: Option<String>,
    pub thread_safe: Option<bool>,
    pub goimports: Option<bool>,
    pub goimports_bin: Option<String>,
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub out: Option<String>,
    pub prefix: Option<String>,
    pub package_suffix: Option<String>,
    /// Flags can only switch these on.
    pub thread_safe: bool,
    pub goimports: bool,
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub out: String,
    pub prefix: String,
    pub package_suffix: String,
    pub thread_safe: bool,
    pub goimports: bool,
    pub goimports_bin: String,
}

impl Settings {
    pub fn resolve(flags: Overrides, file: GenerateSettings) -> Self {
        Settings {
            out: flags
                .out
                .or(file.out)
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_owned()),
            prefix: flags
                .prefix
                .or(file.prefix)
                .unwrap_or_else(|| DEFAULT_PREFIX.to_owned()),
            package_suffix: flags
                .package_suffix
                .or(file.package_suffix)
                .unwrap_or_else(|| DEFAULT_PACKAGE_SUFFIX.to_owned()),
            thread_safe: flags.thread_safe || file.thread_safe.unwrap_or(false),
            goimports: flags.goimports || file.goimports.unwrap_or(false),
            goimports_bin: file
                .goimports_bin
                .unwrap_or_else(|| GoImports::DEFAULT_BINARY.to_owned()),
        }
    }
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read and parse a config file from `path`.
pub fn read_config(path: &Path) -> Result<FmConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// The explicit config file if given (it must exist), else `dir/fm.toml`
/// when present, else an empty config.
pub fn load_config(
    explicit: Option<&Path>,
    dir: &Path,
) -> Result<(FmConfig, Option<PathBuf>), String> {
    if let Some(path) = explicit {
        return read_config(path).map(|c| (c, Some(path.to_path_buf())));
    }
    let implicit = dir.join(CONFIG_FILE);
    if implicit.is_file() {
        return read_config(&implicit).map(|c| (c, Some(implicit)));
    }
    Ok((FmConfig::default(), None))
}
