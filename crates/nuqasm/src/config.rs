//! Translator options.
//!
//! Options can come from a YAML file, from the environment
//! (`NUQASM2_INCLUDE_PATH`, appended to the include path) and from explicit
//! builder calls, which the command-line tool applies last.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NuqasmError, NuqasmResult};

/// Environment variable holding extra include directories.
pub const INCLUDE_PATH_ENV: &str = "NUQASM2_INCLUDE_PATH";

/// Everything the translator can be told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorOptions {
    /// Unit name, recorded in the metadata and used as circuit name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Unknown statements are an error instead of `unknown` elements.
    #[serde(default)]
    pub strict_unknown: bool,

    /// Keep every file's raw lines in the unit's source section.
    #[serde(default)]
    pub retain_program_source: bool,

    /// Keep each element's normalized statement text.
    #[serde(default)]
    pub retain_element_source: bool,

    /// Keep each gate definition's normalized text.
    #[serde(default)]
    pub retain_gate_source: bool,

    /// Record a placeholder element where a gate definition starts.
    #[serde(default)]
    pub show_gate_declarations: bool,

    /// Directories searched in order for included files.
    #[serde(default)]
    pub include_path: Vec<PathBuf>,
}

fn default_name() -> String {
    "main".to_string()
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            name: default_name(),
            strict_unknown: false,
            retain_program_source: false,
            retain_element_source: false,
            retain_gate_source: false,
            show_gate_declarations: false,
            include_path: Vec::new(),
        }
    }
}

impl TranslatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> NuqasmResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NuqasmError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&contents)
    }

    /// Parse options from YAML text.
    pub fn from_yaml(contents: &str) -> NuqasmResult<Self> {
        serde_yaml_ng::from_str(contents).map_err(|e| NuqasmError::Config(e.to_string()))
    }

    /// Append the directories listed in `NUQASM2_INCLUDE_PATH`.
    #[must_use]
    pub fn with_env_include_path(mut self) -> Self {
        if let Some(value) = std::env::var_os(INCLUDE_PATH_ENV) {
            self.include_path
                .extend(std::env::split_paths(&value).filter(|p| !p.as_os_str().is_empty()));
        }
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_strict_unknown(mut self, strict: bool) -> Self {
        self.strict_unknown = strict;
        self
    }

    #[must_use]
    pub fn with_retain_program_source(mut self, retain: bool) -> Self {
        self.retain_program_source = retain;
        self
    }

    #[must_use]
    pub fn with_retain_element_source(mut self, retain: bool) -> Self {
        self.retain_element_source = retain;
        self
    }

    #[must_use]
    pub fn with_retain_gate_source(mut self, retain: bool) -> Self {
        self.retain_gate_source = retain;
        self
    }

    #[must_use]
    pub fn with_show_gate_declarations(mut self, show: bool) -> Self {
        self.show_gate_declarations = show;
        self
    }

    /// Append one directory to the include path.
    #[must_use]
    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_path.push(dir.into());
        self
    }

    /// Replace the include path.
    #[must_use]
    pub fn with_include_path(mut self, path: Vec<PathBuf>) -> Self {
        self.include_path = path;
        self
    }
}
