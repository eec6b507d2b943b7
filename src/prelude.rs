//! Prelude module for convenient imports.

pub use crate::error::{Result, SandboxError};
pub use crate::sandbox::{
    config::SecurityConfig,
    engine::{PipelineOutcome, SnippetEngine},
    executor::{ExecutionResult, ScriptSandbox},
    language::Language,
    sanitizer::Sanitizer,
    snippet::Snippet,
    validator::{ValidationVerdict, Validator},
};
