//! Reading source files.

use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

/// Where the translator gets file contents from.
pub trait SourceLoader {
    /// Whether `path` names an existing file.
    fn exists(&self, path: &Path) -> bool;

    /// The lines of the file at `path`.
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>>;

    /// One spelling per file, so the same file reached two ways shares an
    /// index.
    fn canonicalize(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }

    /// First `dir/name` over `search` that exists, canonicalized. Absolute
    /// names are checked as given.
    fn resolve(&self, name: &str, search: &[PathBuf]) -> Option<PathBuf> {
        let candidate = Path::new(name);
        let found = if candidate.is_absolute() {
            self.exists(candidate).then(|| candidate.to_path_buf())
        } else {
            search
                .iter()
                .map(|dir| dir.join(name))
                .find(|path| self.exists(path))
        };
        found.map(|path| self.canonicalize(&path))
    }
}

/// Reads from the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }

    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        Ok(std::fs::read_to_string(path)?
            .lines()
            .map(str::to_string)
            .collect())
    }
}

/// In-memory files keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: FxHashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        self.files
            .get(path)
            .map(|text| text.lines().map(str::to_string).collect())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}
