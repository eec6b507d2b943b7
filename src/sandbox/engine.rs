//! The engine facade consumed by request handlers.
//!
//! Bundles the validator, sanitizer and execution environment behind the
//! three entry points the surrounding application uses, plus the full
//! pipeline: validate, stop if invalid, sanitize, execute. Source that fails
//! validation never reaches the interpreter.

use std::sync::Arc;

use crate::error::SandboxError;
use crate::sandbox::config::SecurityConfig;
use crate::sandbox::executor::{ExecutionResult, ScriptSandbox};
use crate::sandbox::language::Language;
use crate::sandbox::sanitizer::Sanitizer;
use crate::sandbox::snippet::Snippet;
use crate::sandbox::validator::{ValidationVerdict, Validator};

/// The snippet-execution engine: one instance per process, shared freely.
pub struct SnippetEngine {
    validator: Validator,
    sanitizer: Sanitizer,
    executor: ScriptSandbox,
}

impl SnippetEngine {
    /// Build the engine over a security policy constructed at startup.
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        Self {
            validator: Validator::new(Arc::clone(&config)),
            sanitizer: Sanitizer::new(Arc::clone(&config)),
            executor: ScriptSandbox::new(config),
        }
    }

    /// Build the engine over the default security policy.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(SecurityConfig::default()))
    }

    /// Pre-flight screening. Non-executing, side-effect-free.
    pub fn validate(&self, code: &str, language: Language) -> ValidationVerdict {
        self.validator.validate(code, language)
    }

    /// Best-effort neutralizing rewrite. Never fails.
    pub fn sanitize(&self, code: &str, language: Language) -> String {
        self.sanitizer.sanitize(code, language)
    }

    /// Execute code in the given language.
    ///
    /// Display-only languages yield a structured failure rather than an
    /// error: the caller may reasonably attempt to run one.
    pub async fn execute(&self, code: &str, language: Language) -> ExecutionResult {
        if !language.is_executable() {
            tracing::debug!(%language, "execute: language is display-only");
            return unsupported(language);
        }
        self.executor.execute(code).await
    }

    /// The full pipeline for raw source: validate, then sanitize, then
    /// execute. Invalid code is rejected without any execution.
    pub async fn run_code(&self, code: &str, language: Language) -> PipelineOutcome {
        let verdict = self.validate(code, language);
        if !verdict.valid {
            return PipelineOutcome::Rejected(verdict);
        }
        let sanitized = self.sanitize(code, language);
        PipelineOutcome::Executed(self.execute(&sanitized, language).await)
    }

    /// The full pipeline for a stored snippet.
    pub async fn run(&self, snippet: &Snippet) -> PipelineOutcome {
        tracing::debug!(id = %snippet.id, language = %snippet.language, "running snippet");
        self.run_code(&snippet.code, snippet.language).await
    }
}

/// Result of the validate-sanitize-execute pipeline.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Validation failed; nothing was executed.
    Rejected(ValidationVerdict),
    /// Validation passed and the sanitized code was handed to the executor
    /// (which may still report failure in the result).
    Executed(ExecutionResult),
}

impl PipelineOutcome {
    /// The execution result, if the pipeline got that far.
    pub fn result(&self) -> Option<&ExecutionResult> {
        match self {
            PipelineOutcome::Executed(result) => Some(result),
            PipelineOutcome::Rejected(_) => None,
        }
    }

    /// The rejection verdict, if validation failed.
    pub fn rejection(&self) -> Option<&ValidationVerdict> {
        match self {
            PipelineOutcome::Rejected(verdict) => Some(verdict),
            PipelineOutcome::Executed(_) => None,
        }
    }
}

fn unsupported(language: Language) -> ExecutionResult {
    ExecutionResult {
        success: false,
        output: None,
        error: Some(SandboxError::UnsupportedLanguage(language).to_string()),
        warnings: Vec::new(),
        execution_time_ms: None,
        memory_used_bytes: None,
    }
}
