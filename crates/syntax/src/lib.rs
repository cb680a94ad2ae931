//! # Context Syntax
//!
//! Source loading, language detection and tree-sitter queries.
//!
//! ## Architecture
//!
//! ```text
//! Path
//!     │
//!     ├──> SourceFile (normalized path + language from extension)
//!     │      └─> load() → text
//!     │
//!     └──> SyntaxIndex (one per language)
//!            ├─> parse(text) → SyntaxTree
//!            ├─> compile(patterns) → QuerySet
//!            └─> matches/query(tree, set) → captures
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_syntax::{Language, SyntaxIndex};
//!
//! let index = SyntaxIndex::new(Language::Python).unwrap();
//! let tree = index.parse("import pkg.sub\n").unwrap();
//! let queries = index
//!     .compile("(import_statement name: (dotted_name) @module)")
//!     .unwrap();
//!
//! let captures = index.query(&tree, &queries).unwrap();
//! assert_eq!(captures[0].text, "pkg.sub");
//! ```

mod error;
mod index;
mod language;
mod source;

pub use error::{Result, SyntaxError};
pub use index::{Capture, QueryMatch, QuerySet, SyntaxIndex, SyntaxTree};
pub use language::Language;
pub use source::{normalize_path, SourceFile};
