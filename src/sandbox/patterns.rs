//! Compiled pattern tables shared by the validator and the sanitizer.
//!
//! Both components consult the same blocked-keyword data from
//! [`SecurityConfig`](crate::sandbox::config::SecurityConfig); this module
//! turns that list into whole-word, case-insensitive regexes exactly once per
//! engine construction. Language-specific dynamic-execution detectors are
//! process-wide statics.

use std::sync::LazyLock;

use regex::Regex;

/// A blocked keyword with its compiled matcher and placeholder-safe name.
#[derive(Debug, Clone)]
pub(crate) struct BlockedKeyword {
    /// The keyword as configured.
    pub name: String,
    /// The keyword with non-identifier characters mangled to `_`, safe to
    /// embed in a placeholder without re-triggering the whole-word scan.
    pub mangled: String,
    /// Whole-word, case-insensitive matcher.
    pub regex: Regex,
}

/// Compile the blocked-keyword list into matchers.
///
/// Keywords that fail to compile (empty strings, for instance) are skipped;
/// the blocklist is best-effort by design and must never panic.
pub(crate) fn compile_keywords(keywords: &[String]) -> Vec<BlockedKeyword> {
    keywords
        .iter()
        .filter(|kw| !kw.trim().is_empty())
        .filter_map(|kw| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(kw));
            Regex::new(&pattern).ok().map(|regex| BlockedKeyword {
                name: kw.clone(),
                mangled: mangle(kw),
                regex,
            })
        })
        .collect()
}

/// Render a keyword as a single identifier-like token.
///
/// `document.cookie` becomes `document_cookie`: every character in the result
/// is a word character, so a `\b<keyword>\b` scan can never match inside it.
pub(crate) fn mangle(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Dynamic-execution constructs for JavaScript and TypeScript: `eval(...)`,
/// `new Function(...)` and dynamic `import(...)`.
pub(crate) static JS_DYNAMIC_EXEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\beval\s*\(|\bnew\s+Function\b|\bimport\s*\(").expect("js detector pattern")
});

/// Dynamic-execution built-ins for Python.
pub(crate) static PY_DYNAMIC_EXEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:__import__|exec|eval|compile)\s*\(").expect("python detector pattern")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_whole_word_matchers() {
        let keywords = vec!["eval".to_string(), "document.cookie".to_string()];
        let compiled = compile_keywords(&keywords);
        assert_eq!(compiled.len(), 2);

        assert!(compiled[0].regex.is_match("eval('x')"));
        assert!(compiled[0].regex.is_match("EVAL('x')"));
        assert!(!compiled[0].regex.is_match("evaluate('x')"));
        assert!(!compiled[0].regex.is_match("BLOCKED_eval"));

        assert!(compiled[1].regex.is_match("document.cookie = 'a'"));
        assert_eq!(compiled[1].mangled, "document_cookie");
    }

    #[test]
    fn skips_empty_keywords() {
        let keywords = vec!["".to_string(), "  ".to_string(), "exec".to_string()];
        assert_eq!(compile_keywords(&keywords).len(), 1);
    }

    #[test]
    fn js_detector_matches_variants() {
        assert!(JS_DYNAMIC_EXEC.is_match("eval('1+1')"));
        assert!(JS_DYNAMIC_EXEC.is_match("eval ('1+1')"));
        assert!(JS_DYNAMIC_EXEC.is_match("new Function('return 1')"));
        assert!(JS_DYNAMIC_EXEC.is_match("import('fs')"));
        assert!(!JS_DYNAMIC_EXEC.is_match("import x from 'y';"));
        assert!(!JS_DYNAMIC_EXEC.is_match("console.log('evaluation')"));
    }

    #[test]
    fn py_detector_matches_builtins() {
        assert!(PY_DYNAMIC_EXEC.is_match("__import__('os')"));
        assert!(PY_DYNAMIC_EXEC.is_match("exec('print(1)')"));
        assert!(PY_DYNAMIC_EXEC.is_match("compile(src, '<s>', 'exec')"));
        assert!(!PY_DYNAMIC_EXEC.is_match("executor(1)"));
    }
}
