use super::Resolved;
use crate::error::Result;
use crate::types::{ImportKind, ImportReference};
use context_syntax::{Language, QuerySet, SyntaxIndex};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const IMPORT_QUERY: &str = r#"
(import_statement name: (dotted_name) @module)
(import_statement name: (aliased_import name: (dotted_name) @module))
(import_from_statement module_name: (_) @from_module)
(import_from_statement
  module_name: (_) @from_module
  name: (dotted_name) @member)
(import_from_statement
  module_name: (_) @from_module
  name: (aliased_import name: (dotted_name) @member))
(import_from_statement
  module_name: (_) @from_module
  (wildcard_import) @wildcard)
"#;

/// Resolves Python `import` / `from ... import` statements to module files
pub struct PythonResolver {
    index: SyntaxIndex,
    queries: QuerySet,
}

impl PythonResolver {
    pub fn new() -> Result<Self> {
        let index = SyntaxIndex::new(Language::Python)?;
        let queries = index.compile(IMPORT_QUERY)?;
        Ok(Self { index, queries })
    }

    pub(crate) fn references(&self, path: &Path, content: &str) -> Result<Vec<ImportReference>> {
        let tree = self.index.parse(content)?;
        // (byte offset, reference); matches come out grouped by pattern
        let mut found = Vec::new();

        for m in self.index.matches(&tree, &self.queries)? {
            if let Some(module) = m.get("module") {
                found.push((
                    module.start_byte,
                    ImportReference::new(
                        ImportKind::DirectImport,
                        module.text.as_str(),
                        path,
                        module.line,
                    ),
                ));
                continue;
            }

            let Some(from) = m.get("from_module") else {
                continue;
            };
            let module = compact(&from.text);
            let entry = if let Some(member) = m.get("member") {
                (
                    member.start_byte,
                    ImportReference::new(
                        ImportKind::DirectImport,
                        join_member(&module, &member.text),
                        path,
                        member.line,
                    ),
                )
            } else if let Some(wildcard) = m.get("wildcard") {
                (
                    wildcard.start_byte,
                    ImportReference::new(ImportKind::WildcardImport, module, path, from.line),
                )
            } else {
                (
                    from.start_byte,
                    ImportReference::new(ImportKind::DirectImport, module, path, from.line),
                )
            };
            found.push(entry);
        }

        found.sort_by_key(|(offset, _)| *offset);
        let references = found.into_iter().map(|(_, reference)| reference).collect();
        Ok(references)
    }

    pub(crate) fn resolve_references(
        &self,
        references: &[ImportReference],
        file: &Path,
        root: &Path,
    ) -> Vec<PathBuf> {
        let mut resolved = Resolved::new(file, root);

        for reference in references {
            let Some(candidates) = module_candidates(&reference.text, file, root) else {
                continue;
            };
            if !resolved.push_first(candidates) {
                log::trace!(
                    "{}:{}: `{}` is not a project module",
                    file.display(),
                    reference.line,
                    reference.text
                );
            }
        }

        resolved.into_paths()
    }
}

/// Candidate files for a dotted (possibly relative) module path
///
/// `None` when the module is external: standard library, or a relative import
/// climbing out of the project root.
fn module_candidates(module: &str, file: &Path, root: &Path) -> Option<Vec<PathBuf>> {
    let dots = module.chars().take_while(|c| *c == '.').count();
    let segments: Vec<&str> = module[dots..]
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect();

    let base = if dots == 0 {
        let first = segments.first()?;
        if is_stdlib_module(first) {
            log::trace!("{}: skipping standard library module `{module}`", file.display());
            return None;
        }
        root.to_path_buf()
    } else {
        let mut base = file.parent()?.to_path_buf();
        for _ in 1..dots {
            base = base.parent()?.to_path_buf();
        }
        if !base.starts_with(root) {
            return None;
        }
        base
    };

    if segments.is_empty() {
        return Some(vec![base.join("__init__.py")]);
    }

    let relative: PathBuf = segments.iter().collect();
    let module_file = base.join(&relative).with_extension("py");
    let package_init = base.join(&relative).join("__init__.py");
    Some(vec![module_file, package_init])
}

/// `from pkg import name` also tries `pkg.name` as a submodule
fn join_member(module: &str, member: &str) -> String {
    if module.ends_with('.') {
        format!("{module}{member}")
    } else {
        format!("{module}.{member}")
    }
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_stdlib_module(name: &str) -> bool {
    STDLIB_MODULES.contains(name)
}

static STDLIB_MODULES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "__future__", "_thread", "abc", "aifc", "argparse", "array", "ast", "asynchat",
        "asyncio", "asyncore", "atexit", "audioop", "base64", "bdb", "binascii", "bisect",
        "builtins", "bz2", "calendar", "cgi", "cgitb", "chunk", "cmath", "cmd", "code",
        "codecs", "codeop", "collections", "colorsys", "compileall", "concurrent",
        "configparser", "contextlib", "contextvars", "copy", "copyreg", "cProfile", "crypt",
        "csv", "ctypes", "curses", "dataclasses", "datetime", "dbm", "decimal", "difflib",
        "dis", "distutils", "doctest", "email", "encodings", "ensurepip", "enum", "errno",
        "faulthandler", "fcntl", "filecmp", "fileinput", "fnmatch", "fractions", "ftplib",
        "functools", "gc", "getopt", "getpass", "gettext", "glob", "graphlib", "grp", "gzip",
        "hashlib", "heapq", "hmac", "html", "http", "idlelib", "imaplib", "imghdr", "imp",
        "importlib", "inspect", "io", "ipaddress", "itertools", "json", "keyword", "lib2to3",
        "linecache", "locale", "logging", "lzma", "mailbox", "mailcap", "marshal", "math",
        "mimetypes", "mmap", "modulefinder", "msvcrt", "multiprocessing", "netrc", "nis",
        "nntplib", "numbers", "operator", "optparse", "os", "ossaudiodev", "pathlib", "pdb",
        "pickle", "pickletools", "pipes", "pkgutil", "platform", "plistlib", "poplib",
        "posix", "pprint", "profile", "pstats", "pty", "pwd", "py_compile", "pyclbr",
        "pydoc", "queue", "quopri", "random", "re", "readline", "reprlib", "resource",
        "rlcompleter", "runpy", "sched", "secrets", "select", "selectors", "shelve", "shlex",
        "shutil", "signal", "site", "smtpd", "smtplib", "sndhdr", "socket", "socketserver",
        "spwd", "sqlite3", "ssl", "stat", "statistics", "string", "stringprep", "struct",
        "subprocess", "sunau", "symtable", "sys", "sysconfig", "syslog", "tabnanny",
        "tarfile", "telnetlib", "tempfile", "termios", "textwrap", "threading", "time",
        "timeit", "tkinter", "token", "tokenize", "tomllib", "trace", "traceback",
        "tracemalloc", "tty", "turtle", "types", "typing", "unicodedata", "unittest",
        "urllib", "uu", "uuid", "venv", "warnings", "wave", "weakref", "webbrowser",
        "winreg", "winsound", "wsgiref", "xdrlib", "xml", "xmlrpc", "zipapp", "zipfile",
        "zipimport", "zlib", "zoneinfo",
    ]
    .into_iter()
    .collect()
});
