//! # Snippet Sandbox
//!
//! A sandboxed execution engine for untrusted code snippets.
//!
//! This crate is the one place in its surrounding application where user- or
//! author-supplied text becomes executable code. It screens snippets with a
//! non-executing [`Validator`], rewrites them with a blocklist-driven
//! [`Sanitizer`], and runs JavaScript inside a capability-restricted V8
//! isolate with hard resource limits:
//!
//! - **Memory limits**: V8 heap ceiling with termination before OOM
//! - **Timeout protection**: preemptive watchdog termination, covering
//!   synchronous infinite loops
//! - **Filesystem isolation**: no filesystem primitives in scope
//! - **Network isolation**: no network primitives in scope
//! - **Capability allow-list**: a frozen, buffering `console` is the only
//!   host-provided API
//!
//! ## Example
//!
//! ```rust,ignore
//! use snippet_sandbox::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = SnippetEngine::with_defaults();
//!
//!     match engine.run_code("console.log('a'); console.log('b');", Language::JavaScript).await {
//!         PipelineOutcome::Executed(result) => {
//!             assert!(result.success);
//!             assert_eq!(result.output.as_deref(), Some("a\nb"));
//!         }
//!         PipelineOutcome::Rejected(verdict) => {
//!             eprintln!("rejected: {:?}", verdict.errors);
//!         }
//!     }
//! }
//! ```
//!
//! ## Security Model
//!
//! Defense in depth, in pipeline order:
//!
//! 1. **Validation**: length ceiling, blocked-keyword scan and
//!    dynamic-execution detection reject code before anything runs
//! 2. **Sanitization**: blocked constructs are blinded with inert comment
//!    placeholders as a second line of defense
//! 3. **Isolation**: the actual safety boundary — a fresh V8 isolate per run
//!    with no ambient host access and preemptive resource enforcement
//!
//! The regex-based screening in steps 1 and 2 is knowingly evadable through
//! encoding tricks (string concatenation, unicode look-alikes, indirect
//! property access); it narrows the attack surface but is not relied on for
//! containment. Step 3 is.

pub mod error;
pub mod prelude;
pub mod sandbox;

// Re-export main types at crate root for convenience
pub use error::{Result, SandboxError};
pub use sandbox::config::{SecurityConfig, SecurityConfigBuilder};
pub use sandbox::engine::{PipelineOutcome, SnippetEngine};
pub use sandbox::executor::{ExecutionResult, ScriptSandbox, TIMEOUT_MESSAGE};
pub use sandbox::language::{ExecutionSupport, Language};
pub use sandbox::sanitizer::Sanitizer;
pub use sandbox::snippet::Snippet;
pub use sandbox::validator::{ValidationVerdict, Validator, MAX_CODE_LENGTH};
