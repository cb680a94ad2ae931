use context_syntax::Language;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Finds candidate source files under a project root
pub struct FileScanner {
    root: PathBuf,
    extensions: Option<Vec<String>>,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: None,
        }
    }

    /// Only keep files with these extensions (case-insensitive, without the dot)
    ///
    /// Without a filter every extension with a known language is kept.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = Some(
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        );
        self
    }

    /// Scan the root (.gitignore aware), returning sorted paths
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true);
        builder.filter_entry(move |entry| !Self::is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        continue;
                    }

                    let path = entry.path();
                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > MAX_FILE_SIZE_BYTES {
                            log::debug!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                MAX_FILE_SIZE_BYTES
                            );
                            continue;
                        }
                    }

                    if self.accepts(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::info!("Found {} source files under {}", files.len(), self.root.display());
        files
    }

    fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        let ext = ext.to_lowercase();
        match &self.extensions {
            Some(allowed) => allowed.iter().any(|candidate| candidate == &ext),
            None => Language::from_extension(&ext) != Language::Unknown,
        }
    }

    fn is_ignored_scope(path: &Path, root: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return false;
        };
        relative.components().any(|component| match component {
            std::path::Component::Normal(name) => {
                let lowered = name.to_string_lossy().to_lowercase();
                IGNORED_SCOPES.contains(&lowered.as_str())
            }
            _ => false,
        })
    }
}

const IGNORED_SCOPES: &[&str] = &[
    // VCS / tooling
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    ".gradle",
    // caches / builds
    ".cache",
    "node_modules",
    "build",
    "dist",
    "out",
    "target",
    ".venv",
    "venv",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    // vendored code
    "vendor",
    "third_party",
    "third-party",
];

const MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1 MB

#[cfg(test)]
mod tests {
    use super::FileScanner;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn keeps_known_languages_sorted() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("pkg")).unwrap();
        fs::write(temp.path().join("pkg/b.py"), b"x = 1").unwrap();
        fs::write(temp.path().join("a.py"), b"import pkg.b").unwrap();
        fs::write(temp.path().join("Main.java"), b"class Main {}").unwrap();
        fs::write(temp.path().join("README.md"), b"# readme").unwrap();

        let files = FileScanner::new(temp.path()).scan();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["Main.java", "a.py", "pkg/b.py"]);
    }

    #[test]
    fn extension_filter_and_ignored_scopes() {
        let temp = tempdir().unwrap();
        let venv = temp.path().join(".venv").join("lib");
        let cache = temp.path().join("__pycache__");
        fs::create_dir_all(&venv).unwrap();
        fs::create_dir_all(&cache).unwrap();
        fs::write(venv.join("site.py"), b"").unwrap();
        fs::write(cache.join("mod.py"), b"").unwrap();
        fs::write(temp.path().join("app.py"), b"").unwrap();
        fs::write(temp.path().join("App.java"), b"").unwrap();

        let files = FileScanner::new(temp.path()).with_extensions([".py"]).scan();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app.py"));
    }

    #[test]
    fn respects_gitignore() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("generated")).unwrap();
        fs::write(temp.path().join("generated/gen.py"), b"").unwrap();
        fs::write(temp.path().join("main.py"), b"").unwrap();
        fs::write(temp.path().join(".gitignore"), b"/generated").unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();

        let files = FileScanner::new(temp.path()).scan();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("main.py"));
    }
}
