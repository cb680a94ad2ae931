//! Per-language import resolution
//!
//! Each strategy turns a file's captured import tokens into paths of project
//! files that exist on disk. Unresolvable and external imports are dropped.

mod java;
mod python;

pub use java::JavaResolver;
pub use python::PythonResolver;

use crate::error::{GraphError, Result};
use crate::types::ImportReference;
use context_syntax::{normalize_path, Language, SourceFile};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Resolution strategy for one language
pub enum LanguageResolver {
    Python(PythonResolver),
    Java(JavaResolver),
}

impl LanguageResolver {
    /// Strategy for a language, or `UnsupportedLanguage` if there is none
    pub fn for_language(language: Language) -> Result<Self> {
        match language {
            Language::Python => Ok(Self::Python(PythonResolver::new()?)),
            Language::Java => Ok(Self::Java(JavaResolver::new()?)),
            other => Err(GraphError::unsupported_language(other.as_str())),
        }
    }

    pub fn language(&self) -> Language {
        match self {
            Self::Python(_) => Language::Python,
            Self::Java(_) => Language::Java,
        }
    }

    /// Project files `file` depends on, in order of first discovery
    pub fn resolve(&self, file: &SourceFile, project_root: &Path) -> Result<Vec<PathBuf>> {
        if file.language() != self.language() {
            return Err(GraphError::unsupported_language(file.language().as_str()));
        }
        let content = file.load()?;
        let root = normalize_path(project_root);
        self.resolve_source(file.path(), &content, &root)
    }

    /// Same as [`LanguageResolver::resolve`] for content already in memory
    pub fn resolve_source(&self, path: &Path, content: &str, root: &Path) -> Result<Vec<PathBuf>> {
        let references = self.references(path, content)?;
        let resolved = match self {
            Self::Python(resolver) => resolver.resolve_references(&references, path, root),
            Self::Java(resolver) => resolver.resolve_references(&references, path, root),
        };
        log::debug!(
            "{}: {} reference(s) -> {} dependency(ies)",
            path.display(),
            references.len(),
            resolved.len()
        );
        Ok(resolved)
    }

    /// Raw import tokens captured from `content`
    pub fn references(&self, path: &Path, content: &str) -> Result<Vec<ImportReference>> {
        match self {
            Self::Python(resolver) => resolver.references(path, content),
            Self::Java(resolver) => resolver.references(path, content),
        }
    }
}

/// Ordered, deduplicated set of resolved dependency paths
#[derive(Debug)]
pub(crate) struct Resolved<'a> {
    file: &'a Path,
    root: &'a Path,
    seen: HashSet<PathBuf>,
    paths: Vec<PathBuf>,
}

impl<'a> Resolved<'a> {
    pub(crate) fn new(file: &'a Path, root: &'a Path) -> Self {
        Self {
            file,
            root,
            seen: HashSet::new(),
            paths: Vec::new(),
        }
    }

    /// Normalized candidate if it is an existing project file other than `file`
    pub(crate) fn check(&self, candidate: &Path) -> Option<PathBuf> {
        if !candidate.is_file() {
            return None;
        }
        let path = normalize_path(candidate);
        if !path.starts_with(self.root) || path == self.file {
            return None;
        }
        Some(path)
    }

    /// Record the first existing candidate; returns whether one was found
    pub(crate) fn push_first<I>(&mut self, candidates: I) -> bool
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for candidate in candidates {
            if candidate.is_file() {
                if let Some(path) = self.check(&candidate) {
                    if self.seen.insert(path.clone()) {
                        self.paths.push(path);
                    }
                }
                // an existing file that is the importer itself or outside the root
                // still terminates the lookup
                return true;
            }
        }
        false
    }

    pub(crate) fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategies_exist_for_python_and_java_only() {
        assert!(LanguageResolver::for_language(Language::Python).is_ok());
        assert!(LanguageResolver::for_language(Language::Java).is_ok());

        for language in [Language::Rust, Language::Go, Language::Unknown] {
            assert!(matches!(
                LanguageResolver::for_language(language),
                Err(GraphError::UnsupportedLanguage(_))
            ));
        }
    }

    #[test]
    fn rejects_file_of_other_language() {
        let resolver = LanguageResolver::for_language(Language::Python).unwrap();
        let file = SourceFile::new("/tmp/Main.java");
        assert!(matches!(
            resolver.resolve(&file, Path::new("/tmp")),
            Err(GraphError::UnsupportedLanguage(_))
        ));
    }
}
