use crate::error::{Result, SyntaxError};
use crate::language::Language;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Parser, Query, QueryCursor, Tree};

/// Parsed syntax tree for one file, together with the text it was parsed from
pub struct SyntaxTree {
    tree: Tree,
    source: String,
    language: Language,
}

impl SyntaxTree {
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether tree-sitter had to recover from syntax errors
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    pub fn root_kind(&self) -> &'static str {
        self.tree.root_node().kind()
    }
}

/// Compiled query patterns for one language
pub struct QuerySet {
    query: Query,
    language: Language,
}

impl QuerySet {
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn capture_names(&self) -> &[&str] {
        self.query.capture_names()
    }
}

/// One captured node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Capture label from the pattern, without the leading `@`
    pub label: String,
    /// Grammar node kind
    pub kind: String,
    /// Node text
    pub text: String,
    pub start_byte: usize,
    pub end_byte: usize,
    /// Start line (1-indexed)
    pub line: usize,
}

/// All captures of a single pattern match, in capture order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch {
    /// Index of the pattern (in source order) that produced this match
    pub pattern_index: usize,
    pub captures: Vec<Capture>,
}

impl QueryMatch {
    /// First capture with the given label
    pub fn get(&self, label: &str) -> Option<&Capture> {
        self.captures.iter().find(|capture| capture.label == label)
    }
}

/// Grammar-aware parser and query engine for a single language
///
/// Holds no parser state, so one index can be shared across threads; a fresh
/// parser is created per call.
#[derive(Debug, Clone)]
pub struct SyntaxIndex {
    language: Language,
    grammar: tree_sitter::Language,
}

impl SyntaxIndex {
    /// Create an index for a language with a registered grammar
    pub fn new(language: Language) -> Result<Self> {
        let grammar = language.grammar()?;
        Ok(Self { language, grammar })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Parse source text
    ///
    /// Malformed input still produces a tree; tree-sitter marks the broken regions
    /// with error nodes instead of failing.
    pub fn parse(&self, content: &str) -> Result<SyntaxTree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar)
            .map_err(|e| SyntaxError::tree_sitter(format!("Failed to set language: {e}")))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| SyntaxError::parse("Failed to parse source code"))?;

        if tree.root_node().has_error() {
            log::debug!("{} source parsed with recoverable errors", self.language);
        }

        Ok(SyntaxTree {
            tree,
            source: content.to_string(),
            language: self.language,
        })
    }

    /// Compile query patterns against this language's grammar
    pub fn compile(&self, patterns: &str) -> Result<QuerySet> {
        let query = Query::new(&self.grammar, patterns).map_err(|e| SyntaxError::Query {
            language: self.language.as_str().to_string(),
            message: e.to_string(),
        })?;
        Ok(QuerySet {
            query,
            language: self.language,
        })
    }

    /// Run compiled patterns over a tree, grouping captures by match
    pub fn matches(&self, tree: &SyntaxTree, queries: &QuerySet) -> Result<Vec<QueryMatch>> {
        if tree.language != queries.language || queries.language != self.language {
            return Err(SyntaxError::Query {
                language: self.language.as_str().to_string(),
                message: format!(
                    "query compiled for {} cannot run on a {} tree",
                    queries.language, tree.language
                ),
            });
        }

        let source = tree.source.as_bytes();
        let names = queries.query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut out = Vec::new();

        let mut matches = cursor.matches(&queries.query, tree.tree.root_node(), source);
        while let Some(m) = matches.next() {
            let captures = m
                .captures
                .iter()
                .map(|cap| {
                    let node = cap.node;
                    Capture {
                        label: names[cap.index as usize].to_string(),
                        kind: node.kind().to_string(),
                        text: node.utf8_text(source).unwrap_or_default().to_string(),
                        start_byte: node.start_byte(),
                        end_byte: node.end_byte(),
                        line: node.start_position().row + 1,
                    }
                })
                .collect();
            out.push(QueryMatch {
                pattern_index: m.pattern_index,
                captures,
            });
        }

        Ok(out)
    }

    /// Run compiled patterns and flatten all captures in document order
    pub fn query(&self, tree: &SyntaxTree, queries: &QuerySet) -> Result<Vec<Capture>> {
        let mut captures: Vec<Capture> = self
            .matches(tree, queries)?
            .into_iter()
            .flat_map(|m| m.captures)
            .collect();
        captures.sort_by_key(|capture| (capture.start_byte, capture.end_byte));
        captures.dedup();
        Ok(captures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_and_queries_python_imports() {
        let index = SyntaxIndex::new(Language::Python).unwrap();
        let tree = index.parse("import os\nimport pkg.sub as s\n").unwrap();
        let queries = index
            .compile(
                r#"
                (import_statement name: (dotted_name) @module)
                (import_statement name: (aliased_import name: (dotted_name) @module))
                "#,
            )
            .unwrap();

        let captures = index.query(&tree, &queries).unwrap();
        let texts: Vec<&str> = captures.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["os", "pkg.sub"]);
        assert_eq!(captures[1].line, 2);
        assert!(captures.iter().all(|c| c.label == "module"));
    }

    #[test]
    fn groups_captures_by_match() {
        let index = SyntaxIndex::new(Language::Java).unwrap();
        let tree = index
            .parse("class A { void f() { new B(); new C(); } }")
            .unwrap();
        let queries = index
            .compile("(object_creation_expression type: (type_identifier) @new)")
            .unwrap();

        let matches = index.matches(&tree, &queries).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].get("new").map(|c| c.text.as_str()), Some("B"));
        assert_eq!(matches[1].get("new").map(|c| c.text.as_str()), Some("C"));
    }

    #[test]
    fn malformed_source_yields_best_effort_tree() {
        let index = SyntaxIndex::new(Language::Python).unwrap();
        let tree = index.parse("import pkg.sub\ndef broken(:\n").unwrap();
        assert!(tree.has_errors());
        assert_eq!(tree.root_kind(), "module");

        let queries = index
            .compile("(import_statement name: (dotted_name) @module)")
            .unwrap();
        let captures = index.query(&tree, &queries).unwrap();
        assert!(captures.iter().any(|c| c.text == "pkg.sub"));
    }

    #[test]
    fn rejects_languages_without_grammar() {
        assert!(matches!(
            SyntaxIndex::new(Language::Go),
            Err(SyntaxError::UnsupportedLanguage(_))
        ));
        assert!(SyntaxIndex::new(Language::Unknown).is_err());
    }

    #[test]
    fn invalid_pattern_is_query_error() {
        let index = SyntaxIndex::new(Language::Python).unwrap();
        assert!(matches!(
            index.compile("(no_such_node) @x"),
            Err(SyntaxError::Query { .. })
        ));
    }

    #[test]
    fn query_for_other_language_is_rejected() {
        let python = SyntaxIndex::new(Language::Python).unwrap();
        let java = SyntaxIndex::new(Language::Java).unwrap();
        let tree = python.parse("import os").unwrap();
        let queries = java.compile("(type_identifier) @t").unwrap();
        assert!(python.matches(&tree, &queries).is_err());
    }
}
