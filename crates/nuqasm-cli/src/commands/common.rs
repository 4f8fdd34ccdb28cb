//! Shared helpers for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use nuqasm::TranslatorOptions;
use tracing::debug;

/// Where options and include files come from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Directory to search for included files (repeatable, searched first)
    #[arg(short = 'I', long = "include-dir", value_name = "DIR")]
    pub include_dirs: Vec<PathBuf>,

    /// YAML options file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl SourceArgs {
    /// Options from the config file (or defaults) and the environment,
    /// with command-line include directories ahead of both.
    pub fn options(&self) -> Result<TranslatorOptions> {
        let base = match &self.config {
            Some(path) => TranslatorOptions::from_file(path)?,
            None => TranslatorOptions::default(),
        }
        .with_env_include_path();

        let mut include_path = self.include_dirs.clone();
        include_path.extend(base.include_path.iter().cloned());
        debug!(?include_path, config = ?self.config, "resolved options");
        Ok(base.with_include_path(include_path))
    }
}

/// Unit name for `path`: its file stem.
pub fn unit_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "main".to_string(), |s| s.to_string_lossy().into_owned())
}

/// Write `content` to `output`, or to stdout.
pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write file: {}", path.display())),
        None => {
            print!("{content}");
            if !content.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}
