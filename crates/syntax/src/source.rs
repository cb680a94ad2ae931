use crate::error::Result;
use crate::language::Language;
use std::path::{Component, Path, PathBuf};

/// A source file identified by its normalized absolute path
///
/// Content is never held here; call [`SourceFile::load`] when it is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceFile {
    path: PathBuf,
    language: Language,
}

impl SourceFile {
    /// Create a source file, normalizing the path
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = normalize_path(path.as_ref());
        let language = Language::from_path(&path);
        Self { path, language }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Read the file content
    ///
    /// Invalid UTF-8 is replaced rather than rejected so that parsing stays best-effort.
    pub fn load(&self) -> Result<String> {
        let bytes = std::fs::read(&self.path)?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                log::debug!("{} is not valid UTF-8, decoding lossily", self.path.display());
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        })
    }
}

/// Normalize a path: canonicalize when it exists, otherwise make it absolute and
/// fold `.`/`..` components lexically.
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
