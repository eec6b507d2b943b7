//! Security configuration with builder pattern.
//!
//! A [`SecurityConfig`] is built once at process start and shared (via `Arc`)
//! with the validator, sanitizer and executor. It is never mutated at request
//! time, and the network/filesystem/import capability flags cannot be enabled
//! at all: the fields are private, hard-wired to `false`, and the builder
//! exposes no setters for them.

use std::time::Duration;

/// Default wall-clock budget for a single execution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default V8 heap limit in bytes.
pub const DEFAULT_MAX_MEMORY: u64 = 64 * 1024 * 1024; // 64MB

/// Process-wide, read-only security policy.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Capability names exposed inside the restricted scope.
    pub allowed_functions: Vec<String>,
    /// Identifiers and keywords blinded by the sanitizer and rejected by the
    /// validator (whole-word, case-insensitive).
    pub blocked_keywords: Vec<String>,
    /// Maximum wall-clock execution time.
    pub max_execution_time: Duration,
    /// Maximum V8 heap size in bytes.
    pub max_memory_bytes: u64,
    allow_network_access: bool,
    allow_file_system: bool,
    allow_imports: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_functions: default_allowed_functions(),
            blocked_keywords: default_blocked_keywords(),
            max_execution_time: DEFAULT_TIMEOUT,
            max_memory_bytes: DEFAULT_MAX_MEMORY,
            allow_network_access: false,
            allow_file_system: false,
            allow_imports: false,
        }
    }
}

impl SecurityConfig {
    /// Create a new builder for `SecurityConfig`.
    pub fn builder() -> SecurityConfigBuilder {
        SecurityConfigBuilder::default()
    }

    /// Network access flag. Always `false` in this design.
    pub fn allow_network_access(&self) -> bool {
        self.allow_network_access
    }

    /// Filesystem access flag. Always `false` in this design.
    pub fn allow_file_system(&self) -> bool {
        self.allow_file_system
    }

    /// Dynamic-import flag. Always `false` in this design.
    pub fn allow_imports(&self) -> bool {
        self.allow_imports
    }

    /// Check whether a capability name is on the allow-list.
    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed_functions.iter().any(|f| f == name)
    }
}

fn default_allowed_functions() -> Vec<String> {
    [
        "console.log",
        "console.info",
        "console.debug",
        "console.warn",
        "console.error",
        "Math",
        "JSON",
        "String",
        "Number",
        "Boolean",
        "Array",
        "Object",
        "parseInt",
        "parseFloat",
        "isNaN",
        "isFinite",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_blocked_keywords() -> Vec<String> {
    [
        // dynamic evaluation ("new Function" rather than bare "Function":
        // the scan is case-insensitive, and bare "Function" would flag every
        // ordinary function declaration)
        "eval",
        "exec",
        "compile",
        "__import__",
        "new Function",
        // module/process access
        "require",
        "importScripts",
        "subprocess",
        "child_process",
        // network
        "fetch",
        "XMLHttpRequest",
        "WebSocket",
        "ActiveXObject",
        // storage
        "localStorage",
        "sessionStorage",
        "indexedDB",
        "document.cookie",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Builder for creating `SecurityConfig` instances.
///
/// There are deliberately no setters for the capability flags.
#[derive(Debug, Clone, Default)]
pub struct SecurityConfigBuilder {
    allowed_functions: Option<Vec<String>>,
    blocked_keywords: Option<Vec<String>>,
    extra_blocked: Vec<String>,
    max_execution_time: Option<Duration>,
    max_memory_bytes: Option<u64>,
}

impl SecurityConfigBuilder {
    /// Replace the capability allow-list.
    pub fn allowed_functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_functions = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the blocked-keyword list.
    pub fn blocked_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    /// Add a keyword to the blocklist on top of the current list.
    pub fn block_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.extra_blocked.push(keyword.into());
        self
    }

    /// Set the maximum wall-clock execution time.
    pub fn max_execution_time(mut self, timeout: Duration) -> Self {
        self.max_execution_time = Some(timeout);
        self
    }

    /// Set the maximum V8 heap size in bytes.
    pub fn max_memory_bytes(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Build the `SecurityConfig`.
    pub fn build(self) -> SecurityConfig {
        let default = SecurityConfig::default();
        let mut blocked = self.blocked_keywords.unwrap_or(default.blocked_keywords);
        for kw in self.extra_blocked {
            if !blocked.iter().any(|k| k.eq_ignore_ascii_case(&kw)) {
                blocked.push(kw);
            }
        }
        SecurityConfig {
            allowed_functions: self.allowed_functions.unwrap_or(default.allowed_functions),
            blocked_keywords: blocked,
            max_execution_time: self
                .max_execution_time
                .unwrap_or(default.max_execution_time),
            max_memory_bytes: self.max_memory_bytes.unwrap_or(default.max_memory_bytes),
            allow_network_access: false,
            allow_file_system: false,
            allow_imports: false,
        }
    }
}
