use context_code_chunker::CodeChunk;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CHUNK_PROMPT: &str = "\
You are summarizing part of the source file `{path}`.

Summaries of files it depends on:
{context}

Code:
```
{chunk}
```

Summarize what this code does in a few sentences. Reply with the summary only.";

const DEFAULT_COMBINE_PROMPT: &str = "\
The source file `{path}` was summarized in consecutive parts:

{summaries}

Combine these into one concise summary of the whole file. Reply with the summary only.";

const DEFAULT_REVIEW_PROMPT: &str = "\
Source file `{path}`:
```
{code}
```

Proposed summary:
{summary}

Evaluate how accurately the summary describes this code. Reply with the evaluation only.";

const NO_CONTEXT: &str = "(none)";

/// Prompt templates for the completion steps
///
/// Placeholders: `{path}` in all of them, `{chunk}` and `{context}` in the
/// chunk prompt, `{summaries}` in the combine prompt, `{code}` and `{summary}`
/// in the review prompt. Unknown `{...}` sequences are left as they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplates {
    pub chunk: String,
    pub combine: String,
    pub review: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            chunk: DEFAULT_CHUNK_PROMPT.to_string(),
            combine: DEFAULT_COMBINE_PROMPT.to_string(),
            review: DEFAULT_REVIEW_PROMPT.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn chunk_prompt(&self, path: &Path, chunk: &str, context: &str) -> String {
        fill(
            &self.chunk,
            &[
                ("path", &path.display().to_string()),
                ("chunk", chunk),
                ("context", context),
            ],
        )
    }

    pub fn combine_prompt(&self, path: &Path, summaries: &str) -> String {
        fill(
            &self.combine,
            &[("path", &path.display().to_string()), ("summaries", summaries)],
        )
    }

    pub fn review_prompt(&self, path: &Path, code: &str, summary: &str) -> String {
        fill(
            &self.review,
            &[
                ("path", &path.display().to_string()),
                ("code", code),
                ("summary", summary),
            ],
        )
    }

    /// Every template must carry the inputs of its step
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("chunk", &self.chunk, "{chunk}"),
            ("chunk", &self.chunk, "{context}"),
            ("combine", &self.combine, "{summaries}"),
            ("review", &self.review, "{code}"),
            ("review", &self.review, "{summary}"),
        ];
        for (name, template, placeholder) in required {
            if !template.contains(placeholder) {
                return Err(format!("{name} prompt must contain {placeholder}"));
            }
        }
        Ok(())
    }
}

/// Dependency summaries as a prompt section, in the given order
pub fn format_context(dependencies: &[(PathBuf, String)]) -> String {
    if dependencies.is_empty() {
        return NO_CONTEXT.to_string();
    }
    dependencies
        .iter()
        .map(|(path, summary)| format!("- {}: {}", path.display(), summary.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Chunk summaries in chunk order
pub fn format_chunk_summaries(chunks: &[CodeChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "Part {} (lines {}-{}): {}",
                chunk.index,
                chunk.start_line,
                chunk.end_line,
                chunk.summary.as_deref().unwrap_or_default().trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single-pass substitution, so inserted text is never re-expanded
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });
        match replaced {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fills_known_placeholders_once() {
        let out = fill(
            "{a} and {b} but not {c} or {",
            &[("a", "{b}"), ("b", "B")],
        );
        assert_eq!(out, "{b} and B but not {c} or {");
    }

    #[test]
    fn default_templates_are_valid() {
        let prompts = PromptTemplates::default();
        assert!(prompts.validate().is_ok());

        let prompt = prompts.chunk_prompt(Path::new("src/a.py"), "x = 1", "- b.py: helpers");
        assert!(prompt.contains("`src/a.py`"));
        assert!(prompt.contains("x = 1"));
        assert!(prompt.contains("- b.py: helpers"));
    }

    #[test]
    fn rejects_templates_without_content_slot() {
        let prompts = PromptTemplates {
            chunk: "summarize {path}".to_string(),
            ..PromptTemplates::default()
        };
        assert!(prompts.validate().is_err());
    }

    #[test]
    fn chunk_template_must_keep_dependency_context() {
        let prompts = PromptTemplates {
            chunk: "summarize {path}: {chunk}".to_string(),
            ..PromptTemplates::default()
        };
        assert_eq!(
            prompts.validate(),
            Err("chunk prompt must contain {context}".to_string())
        );
    }

    #[test]
    fn review_prompt_carries_code_and_summary() {
        let prompts = PromptTemplates::default();
        let prompt = prompts.review_prompt(Path::new("a.py"), "x = 1", "Sets x.");
        assert!(prompt.contains("`a.py`"));
        assert!(prompt.contains("x = 1"));
        assert!(prompt.contains("Sets x."));

        let without_code = PromptTemplates {
            review: "Is {summary} right?".to_string(),
            ..PromptTemplates::default()
        };
        assert!(without_code.validate().is_err());
    }

    #[test]
    fn context_section_lists_dependencies_in_order() {
        assert_eq!(format_context(&[]), "(none)");
        let context = format_context(&[
            (PathBuf::from("b.py"), "B things\n".to_string()),
            (PathBuf::from("c.py"), "C things".to_string()),
        ]);
        assert_eq!(context, "- b.py: B things\n- c.py: C things");
    }
}
