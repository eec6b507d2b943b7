//! Snippet languages and their execution support.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether a language can actually be run, or is only screened and displayed.
///
/// Only JavaScript has an execution path. Every other language is validated
/// and sanitized but never handed to the interpreter; attempting to run one
/// yields a structured failure, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionSupport {
    /// The language runs inside the capability-restricted interpreter.
    Executable,
    /// The language is screened and rendered only.
    DisplayOnly,
}

/// Comment syntax used by the sanitizer when blinding a construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `/* ... */`
    Block,
    /// `# ...` (to end of line; the placeholder stays inline, so the rest of
    /// the line is swallowed by the comment)
    Hash,
    /// `<!-- ... -->`
    Markup,
    /// `-- ...`
    DoubleDash,
}

impl CommentStyle {
    /// Wrap `text` in this comment syntax.
    pub fn wrap(&self, text: &str) -> String {
        match self {
            CommentStyle::Block => format!("/* {text} */"),
            CommentStyle::Hash => format!("# {text}"),
            CommentStyle::Markup => format!("<!-- {text} -->"),
            CommentStyle::DoubleDash => format!("-- {text}"),
        }
    }
}

/// The fixed set of languages a snippet can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Html,
    Css,
    Json,
    Markdown,
    Shell,
    Sql,
}

impl Language {
    /// All declared languages, in a stable order.
    pub const ALL: [Language; 9] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Html,
        Language::Css,
        Language::Json,
        Language::Markdown,
        Language::Shell,
        Language::Sql,
    ];

    /// Whether snippets in this language can be executed.
    pub fn support(&self) -> ExecutionSupport {
        match self {
            Language::JavaScript => ExecutionSupport::Executable,
            _ => ExecutionSupport::DisplayOnly,
        }
    }

    /// Convenience check for [`ExecutionSupport::Executable`].
    pub fn is_executable(&self) -> bool {
        self.support() == ExecutionSupport::Executable
    }

    /// Comment syntax the sanitizer uses for placeholders in this language.
    pub fn comment_style(&self) -> CommentStyle {
        match self {
            Language::JavaScript | Language::TypeScript | Language::Css | Language::Json => {
                CommentStyle::Block
            }
            Language::Python | Language::Shell => CommentStyle::Hash,
            Language::Html | Language::Markdown => CommentStyle::Markup,
            Language::Sql => CommentStyle::DoubleDash,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Html => "html",
            Language::Css => "css",
            Language::Json => "json",
            Language::Markdown => "markdown",
            Language::Shell => "shell",
            Language::Sql => "sql",
        };
        f.write_str(name)
    }
}

impl FromStr for Language {
    type Err = crate::error::SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "javascript" | "js" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "python" | "py" => Ok(Language::Python),
            "html" => Ok(Language::Html),
            "css" => Ok(Language::Css),
            "json" => Ok(Language::Json),
            "markdown" | "md" => Ok(Language::Markdown),
            "shell" | "sh" | "bash" => Ok(Language::Shell),
            "sql" => Ok(Language::Sql),
            other => Err(crate::error::SandboxError::Config(format!(
                "unknown language: {other}"
            ))),
        }
    }
}
