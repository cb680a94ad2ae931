use super::Resolved;
use crate::error::Result;
use crate::types::{ImportKind, ImportReference};
use context_syntax::{Language, QuerySet, SyntaxIndex};
use std::cell::OnceCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const REFERENCE_QUERY: &str = r#"
(package_declaration (scoped_identifier) @package)
(package_declaration (identifier) @package)
(import_declaration) @import
(type_identifier) @type
(object_creation_expression type: (type_identifier) @new)
(object_creation_expression type: (generic_type (type_identifier) @new))
(method_invocation object: (identifier) @receiver)
(field_access object: (identifier) @receiver)
"#;

/// Package prefixes provided by the JDK
const STDLIB_PREFIXES: &[&str] = &[
    "java.",
    "javax.",
    "jdk.",
    "sun.",
    "com.sun.",
    "org.w3c.dom.",
    "org.xml.sax.",
    "org.ietf.",
    "org.omg.",
];

/// Source roots tried, in order, before walking the tree
const LAYOUT_ROOTS: &[&str] = &["", "src", "src/main", "src/main/java"];

/// Directories never searched for source roots
const SKIPPED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "target",
    "build",
    "out",
    "bin",
    "node_modules",
    ".gradle",
    ".idea",
];

const MAX_WALK_DEPTH: usize = 5;

/// Resolves Java imports, wildcard imports and same-package type usages
pub struct JavaResolver {
    index: SyntaxIndex,
    queries: QuerySet,
}

impl JavaResolver {
    pub fn new() -> Result<Self> {
        let index = SyntaxIndex::new(Language::Java)?;
        let queries = index.compile(REFERENCE_QUERY)?;
        Ok(Self { index, queries })
    }

    pub(crate) fn references(&self, path: &Path, content: &str) -> Result<Vec<ImportReference>> {
        let tree = self.index.parse(content)?;
        let mut found = Vec::new();

        for m in self.index.matches(&tree, &self.queries)? {
            for capture in &m.captures {
                let reference = match capture.label.as_str() {
                    "package" => Some((ImportKind::PackageDecl, compact(&capture.text))),
                    "import" => parse_import(&capture.text),
                    "type" => Some((ImportKind::TypeUsage, capture.text.clone())),
                    "new" => Some((ImportKind::Instantiation, capture.text.clone())),
                    "receiver" if starts_uppercase(&capture.text) => {
                        Some((ImportKind::TypeUsage, capture.text.clone()))
                    }
                    _ => None,
                };
                if let Some((kind, text)) = reference {
                    found.push((
                        capture.start_byte,
                        ImportReference::new(kind, text, path, capture.line),
                    ));
                }
            }
        }

        // a `new X()` type is captured both as a usage and as an instantiation
        found.sort_by_key(|(offset, reference)| (*offset, reference.kind));
        Ok(found.into_iter().map(|(_, reference)| reference).collect())
    }

    pub(crate) fn resolve_references(
        &self,
        references: &[ImportReference],
        file: &Path,
        root: &Path,
    ) -> Vec<PathBuf> {
        let mut resolved = Resolved::new(file, root);
        let locator = PackageLocator::new(root);

        let mut referenced: Vec<&str> = Vec::new();
        let mut referenced_set: HashSet<&str> = HashSet::new();
        for reference in references {
            if matches!(reference.kind, ImportKind::TypeUsage | ImportKind::Instantiation)
                && referenced_set.insert(reference.text.as_str())
            {
                referenced.push(reference.text.as_str());
            }
        }

        let mut package: Option<&str> = None;
        let mut imported_names: HashSet<&str> = HashSet::new();

        for reference in references {
            let name = reference.text.as_str();
            match reference.kind {
                ImportKind::PackageDecl => package = package.or(Some(name)),
                ImportKind::DirectImport | ImportKind::StaticImport => {
                    if let Some(simple) = name.rsplit('.').next() {
                        imported_names.insert(simple);
                    }
                    if is_stdlib(name) {
                        continue;
                    }
                    if !resolve_class(&locator, &mut resolved, name) {
                        log::trace!("{}: unresolved import `{name}`", file.display());
                    }
                }
                ImportKind::WildcardImport => {
                    if is_stdlib(name) {
                        continue;
                    }
                    let Some(dir) = locator.locate_dir(&package_path(name)) else {
                        log::trace!("{}: unresolved package `{name}.*`", file.display());
                        continue;
                    };
                    for class_file in java_files(&dir) {
                        let used = class_file
                            .file_stem()
                            .and_then(|stem| stem.to_str())
                            .is_some_and(|stem| referenced_set.contains(stem));
                        if used {
                            resolved.push_first([class_file]);
                        }
                    }
                }
                ImportKind::TypeUsage | ImportKind::Instantiation => {}
            }
        }

        if let Some(dir) = own_package_dir(&locator, file, package) {
            for name in referenced {
                if imported_names.contains(name) {
                    continue;
                }
                resolved.push_first([dir.join(format!("{name}.java"))]);
            }
        }

        resolved.into_paths()
    }
}

/// Locates package directories under a project root
///
/// Conventional layouts are tried first. Otherwise every directory up to
/// [`MAX_WALK_DEPTH`] below the root is tried as a source root; the walk runs
/// at most once per locator.
struct PackageLocator<'a> {
    root: &'a Path,
    source_roots: OnceCell<Vec<PathBuf>>,
}

impl<'a> PackageLocator<'a> {
    fn new(root: &'a Path) -> Self {
        Self {
            root,
            source_roots: OnceCell::new(),
        }
    }

    fn layout_roots(&self) -> impl Iterator<Item = PathBuf> + '_ {
        LAYOUT_ROOTS.iter().map(|layout| self.root.join(layout))
    }

    fn walked_roots(&self) -> &[PathBuf] {
        self.source_roots.get_or_init(|| {
            WalkDir::new(self.root)
                .max_depth(MAX_WALK_DEPTH)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    entry.depth() == 0 || !is_skipped_dir(entry.file_name().to_str())
                })
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_dir())
                .map(walkdir::DirEntry::into_path)
                .collect()
        })
    }

    /// File `package/class_file` under the first source root that has it
    fn locate_file(&self, package: &Path, class_file: &str) -> Option<PathBuf> {
        let lookup = |root: &Path| {
            let candidate = root.join(package).join(class_file);
            candidate.is_file().then_some(candidate)
        };
        if let Some(found) = self.layout_roots().find_map(|root| lookup(&root)) {
            return Some(found);
        }
        if package.as_os_str().is_empty() {
            return None;
        }
        self.walked_roots().iter().find_map(|root| lookup(root))
    }

    /// Directory of `package` under the first source root that has it
    fn locate_dir(&self, package: &Path) -> Option<PathBuf> {
        let lookup = |root: &Path| {
            let candidate = root.join(package);
            candidate.is_dir().then_some(candidate)
        };
        if let Some(found) = self.layout_roots().find_map(|root| lookup(&root)) {
            return Some(found);
        }
        if package.as_os_str().is_empty() {
            return None;
        }
        self.walked_roots().iter().find_map(|root| lookup(root))
    }
}

/// Resolve `a.b.C` (or nested `a.b.C.Inner`) to `a/b/C.java`
fn resolve_class(locator: &PackageLocator<'_>, resolved: &mut Resolved<'_>, fqn: &str) -> bool {
    let mut segments: Vec<&str> = fqn.split('.').filter(|s| !s.is_empty()).collect();

    while let Some((class, package)) = segments.split_last() {
        let package: PathBuf = package.iter().collect();
        if let Some(found) = locator.locate_file(&package, &format!("{class}.java")) {
            return resolved.push_first([found]);
        }

        let outer_is_class = segments.len() >= 2 && starts_uppercase(segments[segments.len() - 2]);
        if !outer_is_class {
            return false;
        }
        segments.pop();
    }
    false
}

fn own_package_dir(
    locator: &PackageLocator<'_>,
    file: &Path,
    package: Option<&str>,
) -> Option<PathBuf> {
    let parent = file.parent()?;
    let Some(package) = package else {
        return Some(parent.to_path_buf());
    };
    let package = package_path(package);
    if parent.ends_with(&package) {
        return Some(parent.to_path_buf());
    }
    locator.locate_dir(&package)
}

/// `.java` files directly inside `dir`, sorted by name
fn java_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "java"))
        .collect();
    files.sort();
    files
}

/// Kind and normalized name of an `import` declaration
///
/// Static imports are reduced to the class that declares the member:
/// `import static a.B.m;` and `import static a.B.*;` both name `a.B`.
fn parse_import(text: &str) -> Option<(ImportKind, String)> {
    let body = text.trim().strip_prefix("import")?;
    let body = body.trim().trim_end_matches(';').trim();

    let (is_static, body) = match body.strip_prefix("static") {
        Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest),
        _ => (false, body),
    };

    let name = compact(body);
    let (is_wildcard, name) = match name.strip_suffix(".*") {
        Some(stripped) => (true, stripped.to_string()),
        None => (false, name),
    };
    if name.is_empty() {
        return None;
    }

    if is_static {
        let class = if is_wildcard {
            name
        } else {
            name.rsplit_once('.')?.0.to_string()
        };
        Some((ImportKind::StaticImport, class))
    } else if is_wildcard {
        Some((ImportKind::WildcardImport, name))
    } else {
        Some((ImportKind::DirectImport, name))
    }
}

fn package_path(package: &str) -> PathBuf {
    package.split('.').filter(|s| !s.is_empty()).collect()
}

fn is_stdlib(name: &str) -> bool {
    STDLIB_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn is_skipped_dir(name: Option<&str>) -> bool {
    name.is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use context_syntax::normalize_path;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = normalize_path(temp.path());
        for (file, content) in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
        }
        (temp, root)
    }

    fn resolve(root: &Path, file: &str) -> Vec<PathBuf> {
        let resolver = JavaResolver::new().unwrap();
        let path = root.join(file);
        let source = fs::read_to_string(&path).unwrap();
        let references = resolver.references(&path, &source).unwrap();
        resolver.resolve_references(&references, &path, root)
    }

    #[test]
    fn parses_import_forms() {
        assert_eq!(
            parse_import("import a.b.C;"),
            Some((ImportKind::DirectImport, "a.b.C".to_string()))
        );
        assert_eq!(
            parse_import("import a.b.*;"),
            Some((ImportKind::WildcardImport, "a.b".to_string()))
        );
        assert_eq!(
            parse_import("import static a.B.max;"),
            Some((ImportKind::StaticImport, "a.B".to_string()))
        );
        assert_eq!(
            parse_import("import  static a . B.*;"),
            Some((ImportKind::StaticImport, "a.B".to_string()))
        );
        assert_eq!(
            parse_import("import staticutil.Tool;"),
            Some((ImportKind::DirectImport, "staticutil.Tool".to_string()))
        );
    }

    #[test]
    fn captures_references_in_document_order() {
        let resolver = JavaResolver::new().unwrap();
        let source = "package a.b;\nimport c.D;\nclass E { F f = new G(); void m() { H.run(); } }\n";
        let references = resolver.references(Path::new("/p/E.java"), source).unwrap();

        let kinds: Vec<(ImportKind, &str)> = references
            .iter()
            .map(|r| (r.kind, r.text.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ImportKind::PackageDecl, "a.b"),
                (ImportKind::DirectImport, "c.D"),
                (ImportKind::TypeUsage, "F"),
                (ImportKind::TypeUsage, "G"),
                (ImportKind::Instantiation, "G"),
                (ImportKind::TypeUsage, "H"),
            ]
        );
    }

    #[test]
    fn wildcard_only_includes_referenced_classes() {
        let (_temp, root) = project(&[
            ("com/acme/model/X.java", "package com.acme.model; public class X {}"),
            ("com/acme/model/Y.java", "package com.acme.model; public class Y {}"),
            (
                "com/acme/app/Main.java",
                "package com.acme.app;\nimport com.acme.model.*;\nclass Main { void f() { new X(); } }\n",
            ),
        ]);

        let deps = resolve(&root, "com/acme/app/Main.java");
        assert_eq!(deps, vec![root.join("com/acme/model/X.java")]);
    }

    #[test]
    fn direct_imports_try_conventional_layouts() {
        let (_temp, root) = project(&[
            ("src/main/java/com/acme/util/Strings.java", "package com.acme.util; public class Strings {}"),
            (
                "src/main/java/com/acme/App.java",
                "package com.acme;\nimport com.acme.util.Strings;\nimport java.util.List;\nclass App {}\n",
            ),
        ]);

        let deps = resolve(&root, "src/main/java/com/acme/App.java");
        assert_eq!(deps, vec![root.join("src/main/java/com/acme/util/Strings.java")]);
    }

    #[test]
    fn falls_back_to_bounded_walk() {
        let (_temp, root) = project(&[
            ("modules/core/src/org/demo/Engine.java", "package org.demo; public class Engine {}"),
            ("target/classes/org/demo/Ghost.java", "package org.demo; public class Ghost {}"),
            (
                "App.java",
                "import org.demo.Engine;\nimport org.demo.Ghost;\nclass App { Engine e; }\n",
            ),
        ]);

        let deps = resolve(&root, "App.java");
        assert_eq!(deps, vec![root.join("modules/core/src/org/demo/Engine.java")]);
    }

    #[test]
    fn bounded_walk_runs_when_root_is_named_like_build_output() {
        let temp = TempDir::new().unwrap();
        let root = normalize_path(temp.path()).join("build");
        for (file, content) in [
            ("modules/core/src/org/demo/Engine.java", "package org.demo; public class Engine {}"),
            ("App.java", "import org.demo.Engine;\nclass App { Engine e; }\n"),
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
        }

        let deps = resolve(&root, "App.java");
        assert_eq!(deps, vec![root.join("modules/core/src/org/demo/Engine.java")]);
    }

    #[test]
    fn static_and_nested_imports_resolve_to_declaring_file() {
        let (_temp, root) = project(&[
            ("a/Util.java", "package a; public class Util { public static int max() { return 1; } }"),
            ("a/Outer.java", "package a; public class Outer { public static class Inner {} }"),
            (
                "b/Main.java",
                "package b;\nimport static a.Util.max;\nimport a.Outer.Inner;\nclass Main {}\n",
            ),
        ]);

        let deps = resolve(&root, "b/Main.java");
        assert_eq!(deps, vec![root.join("a/Util.java"), root.join("a/Outer.java")]);
    }

    #[test]
    fn same_package_types_resolve_without_imports() {
        let (_temp, root) = project(&[
            ("p/Helper.java", "package p; class Helper {}"),
            ("p/Main.java", "package p;\nclass Main { Helper h; String s; Main self; }\n"),
        ]);

        let deps = resolve(&root, "p/Main.java");
        assert_eq!(deps, vec![root.join("p/Helper.java")]);
    }

    #[test]
    fn stdlib_imports_are_excluded() {
        let (_temp, root) = project(&[
            ("java/util/List.java", "package java.util; public interface List {}"),
            ("Main.java", "import java.util.List;\nimport javax.swing.*;\nclass Main { List l; }\n"),
        ]);

        assert!(resolve(&root, "Main.java").is_empty());
    }
}
