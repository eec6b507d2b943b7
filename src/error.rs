//! Error types for the snippet sandbox.

use std::time::Duration;

use thiserror::Error;

use crate::sandbox::language::Language;

/// Errors that can occur inside the execution engine.
///
/// Public pipeline entry points never propagate these to the caller; they are
/// folded into [`ExecutionResult`](crate::sandbox::executor::ExecutionResult)
/// values at the boundary. The enum is exported so callers that work with the
/// lower-level sandbox internals can classify failures.
#[derive(Error, Debug)]
pub enum SandboxError {
    /// The execution exceeded the configured timeout.
    #[error("execution timed out after {0:?}")]
    Timeout(Duration),

    /// The execution exceeded the configured V8 heap limit.
    #[error("memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),

    /// Failed to initialize the V8 runtime or its worker thread.
    #[error("failed to initialize runtime: {0}")]
    RuntimeInit(#[source] anyhow::Error),

    /// The snippet threw a JavaScript error.
    #[error("script error: {message}")]
    ScriptError {
        /// The thrown message, with V8's `Uncaught ...:` prefix trimmed.
        message: String,
    },

    /// The execution failed for a reason other than the script itself
    /// (worker thread panicked, result channel dropped, and so on).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Execution was requested for a language that is display-only.
    #[error("execution is not supported for {0}")]
    UnsupportedLanguage(Language),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SandboxError {
    /// Check if this error represents a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SandboxError::Timeout(_))
    }

    /// Check if this error represents a memory limit exceeded.
    pub fn is_memory_limit(&self) -> bool {
        matches!(self, SandboxError::MemoryLimitExceeded(_))
    }

    /// Check if this error represents a JavaScript error thrown by the snippet.
    pub fn is_script_error(&self) -> bool {
        matches!(self, SandboxError::ScriptError { .. })
    }

    /// Check if this error represents an unsupported-language request.
    pub fn is_unsupported_language(&self) -> bool {
        matches!(self, SandboxError::UnsupportedLanguage(_))
    }
}

/// Result type alias for sandbox operations.
pub type Result<T> = std::result::Result<T, SandboxError>;

/// Strip V8's framing from a thrown error so only the message remains.
///
/// V8 reports uncaught exceptions as `Uncaught Error: boom` followed by a
/// stack trace; callers of the engine only want `boom`.
pub fn trim_js_error(raw: &str) -> String {
    let first_line = raw.lines().next().unwrap_or(raw).trim();

    let stripped = first_line.strip_prefix("Uncaught ").unwrap_or(first_line);

    // "TypeError: x is not a function" -> keep the message, drop the type
    // prefix only when it looks like a JS error class.
    if let Some(colon) = stripped.find(": ") {
        let head = &stripped[..colon];
        if looks_like_error_class(head) {
            return stripped[colon + 2..].trim().to_string();
        }
    }

    stripped.to_string()
}

/// Check if a string looks like a JavaScript error class name.
fn looks_like_error_class(head: &str) -> bool {
    if !head
        .chars()
        .next()
        .map(|c| c.is_ascii_uppercase())
        .unwrap_or(false)
    {
        return false;
    }
    head.chars().all(|c| c.is_ascii_alphanumeric()) && head.ends_with("Error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_uncaught_prefix_and_class() {
        assert_eq!(trim_js_error("Uncaught Error: boom"), "boom");
        assert_eq!(
            trim_js_error("Uncaught TypeError: x is not a function"),
            "x is not a function"
        );
    }

    #[test]
    fn keeps_plain_messages() {
        assert_eq!(trim_js_error("boom"), "boom");
        assert_eq!(
            trim_js_error("not an error: just text"),
            "not an error: just text"
        );
    }

    #[test]
    fn uses_first_line_only() {
        let raw = "Uncaught RangeError: too deep\n    at <anon>:1:1";
        assert_eq!(trim_js_error(raw), "too deep");
    }

    #[test]
    fn error_helpers() {
        let timeout = SandboxError::Timeout(Duration::from_secs(5));
        assert!(timeout.is_timeout());
        assert!(!timeout.is_memory_limit());
        assert!(!timeout.is_script_error());

        let memory = SandboxError::MemoryLimitExceeded("test".to_string());
        assert!(!memory.is_timeout());
        assert!(memory.is_memory_limit());

        let script = SandboxError::ScriptError {
            message: "boom".to_string(),
        };
        assert!(script.is_script_error());

        let unsupported = SandboxError::UnsupportedLanguage(Language::Markdown);
        assert!(unsupported.is_unsupported_language());
    }
}
