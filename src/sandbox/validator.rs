//! Non-executing pre-flight screening of snippet source.
//!
//! The validator is the primary gate in the pipeline: it runs before the
//! sanitizer, accumulates every problem it finds into a verdict, and a
//! snippet that fails here must never reach the execution environment.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::sandbox::config::SecurityConfig;
use crate::sandbox::language::Language;
use crate::sandbox::patterns::{compile_keywords, BlockedKeyword, JS_DYNAMIC_EXEC, PY_DYNAMIC_EXEC};

/// Maximum accepted snippet length in characters.
pub const MAX_CODE_LENGTH: usize = 10_000;

/// Outcome of a validation call. Produced fresh per call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationVerdict {
    /// `true` only if zero errors accumulated across all checks.
    pub valid: bool,
    /// Human-readable reasons for rejection, in check order.
    pub errors: Vec<String>,
}

impl ValidationVerdict {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Static screening of snippet source against the shared security policy.
///
/// Side-effect-free and non-executing. All checks after the empty-input
/// check accumulate rather than short-circuit, so the caller sees every
/// reason at once.
pub struct Validator {
    keywords: Vec<BlockedKeyword>,
}

impl Validator {
    /// Build a validator from the shared security policy, compiling the
    /// blocked-keyword matchers once.
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        Self {
            keywords: compile_keywords(&config.blocked_keywords),
        }
    }

    /// Screen `code` and return a pass/fail verdict with reasons.
    pub fn validate(&self, code: &str, language: Language) -> ValidationVerdict {
        if code.trim().is_empty() {
            return ValidationVerdict::from_errors(vec!["code must not be empty".to_string()]);
        }

        let mut errors = Vec::new();

        let length = code.chars().count();
        if length > MAX_CODE_LENGTH {
            errors.push(format!(
                "code exceeds the maximum length of {MAX_CODE_LENGTH} characters (got {length})"
            ));
        }

        let matched: Vec<&str> = self
            .keywords
            .iter()
            .filter(|kw| kw.regex.is_match(code))
            .map(|kw| kw.name.as_str())
            .collect();
        if !matched.is_empty() {
            errors.push(format!(
                "blocked keywords detected: {}",
                matched.join(", ")
            ));
        }

        match language {
            Language::JavaScript | Language::TypeScript => {
                if JS_DYNAMIC_EXEC.is_match(code) {
                    errors.push(
                        "dynamic code execution (eval, new Function, dynamic import) is not allowed"
                            .to_string(),
                    );
                }
            }
            Language::Python => {
                if PY_DYNAMIC_EXEC.is_match(code) {
                    errors.push(
                        "dynamic code execution (__import__, exec, eval, compile) is not allowed"
                            .to_string(),
                    );
                }
            }
            _ => {}
        }

        ValidationVerdict::from_errors(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::new(Arc::new(SecurityConfig::default()))
    }

    #[test]
    fn accepts_benign_code() {
        let verdict = validator().validate("console.log('a');", Language::JavaScript);
        assert!(verdict.valid, "errors: {:?}", verdict.errors);
        assert!(verdict.errors.is_empty());
    }

    #[test]
    fn rejects_empty_input_with_single_error() {
        let verdict = validator().validate("   \n\t", Language::JavaScript);
        assert!(!verdict.valid);
        assert_eq!(verdict.errors.len(), 1);
    }

    #[test]
    fn rejects_over_length_code_regardless_of_content() {
        let code = "a".repeat(MAX_CODE_LENGTH + 1);
        let verdict = validator().validate(&code, Language::JavaScript);
        assert!(!verdict.valid);
        assert!(verdict.errors[0].contains("maximum length"));
    }

    #[test]
    fn length_ceiling_is_inclusive() {
        let code = "a".repeat(MAX_CODE_LENGTH);
        let verdict = validator().validate(&code, Language::Markdown);
        assert!(verdict.valid, "errors: {:?}", verdict.errors);
    }

    #[test]
    fn rejects_blocked_keywords_and_names_them() {
        let verdict = validator().validate("eval('2+2')", Language::JavaScript);
        assert!(!verdict.valid);
        assert!(
            verdict.errors.iter().any(|e| e.contains("eval")),
            "errors: {:?}",
            verdict.errors
        );
    }

    #[test]
    fn keyword_scan_is_whole_word() {
        let verdict = validator().validate("const evaluation = 1;", Language::JavaScript);
        assert!(verdict.valid, "errors: {:?}", verdict.errors);
    }

    #[test]
    fn aggregates_all_keyword_matches_into_one_error() {
        let verdict = validator().validate("eval(x); fetch(y);", Language::Markdown);
        let keyword_errors: Vec<_> = verdict
            .errors
            .iter()
            .filter(|e| e.contains("blocked keywords"))
            .collect();
        assert_eq!(keyword_errors.len(), 1);
        assert!(keyword_errors[0].contains("eval"));
        assert!(keyword_errors[0].contains("fetch"));
    }

    #[test]
    fn flags_js_dynamic_execution_even_with_spacing() {
        // "eval (" evades a plain-keyword scan position but not the detector
        let verdict = validator().validate("window['ev'+'al']; eval ('x')", Language::TypeScript);
        assert!(!verdict.valid);
        assert!(verdict
            .errors
            .iter()
            .any(|e| e.contains("dynamic code execution")));
    }

    #[test]
    fn flags_python_dynamic_builtins() {
        let verdict = validator().validate("__import__('os').system('ls')", Language::Python);
        assert!(!verdict.valid);
        assert!(verdict
            .errors
            .iter()
            .any(|e| e.contains("dynamic code execution")));
    }

    #[test]
    fn errors_accumulate_rather_than_short_circuit() {
        let mut code = String::from("eval('x'); ");
        code.push_str(&"b".repeat(MAX_CODE_LENGTH));
        let verdict = validator().validate(&code, Language::JavaScript);
        assert!(!verdict.valid);
        // length + keyword + dynamic-execution
        assert_eq!(verdict.errors.len(), 3, "errors: {:?}", verdict.errors);
    }

    #[test]
    fn verdict_serializes() {
        let verdict = validator().validate("eval('x')", Language::JavaScript);
        let json = serde_json::to_string(&verdict).unwrap();
        assert!(json.contains("\"valid\":false"));
    }
}
