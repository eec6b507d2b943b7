//! Best-effort source rewriting that neutralizes known-dangerous constructs.
//!
//! The sanitizer is a blunt, regex-based defense: it blinds blocked keywords
//! and language-specific dangerous patterns by replacing them with inert
//! comment placeholders, keeping the surrounding text parseable where
//! possible. It is explicitly not a parser and cannot catch every obfuscation
//! (string concatenation, unicode look-alikes, indirect property access); the
//! execution environment's isolation is the actual safety boundary, this pass
//! is defense in depth.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::sandbox::config::SecurityConfig;
use crate::sandbox::language::{CommentStyle, Language};
use crate::sandbox::patterns::{compile_keywords, BlockedKeyword};

/// Inline event-handler attribute names worth blinding. A bare `on\w+=` scan
/// would also hit identifiers like `one =`, so the names are enumerated.
const EVENT_HANDLER_NAMES: &str = "click|dblclick|load|unload|error|abort|submit|reset|change|input|select|focus|blur|scroll|resize|wheel|copy|cut|paste|mouse\\w+|key\\w+|drag\\w*|drop|touch\\w+|pointer\\w+|context\\w+|animation\\w+|transition\\w+";

static JS_SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|</?script\b[^>]*>").expect("script tag pattern")
});
static JS_URI_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:javascript|vbscript|data)\s*:").expect("uri pattern"));
static JS_EVAL_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\beval\s*\(").expect("eval pattern"));
static JS_NEW_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnew\s+Function\b").expect("new Function pattern"));
static JS_DYNAMIC_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bimport\s*\(").expect("dynamic import pattern"));
static JS_EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bon(?:{EVENT_HANDLER_NAMES})\s*=")).expect("handler pattern")
});

static PY_DYNAMIC_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:eval|exec|compile|__import__)\s*\(").expect("py eval pattern")
});
static PY_OS_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bos\.(?:system|popen|exec\w*|spawn\w*|remove|unlink|rmdir|kill|fork)\s*\(")
        .expect("os call pattern")
});
static PY_IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:import|from)[ \t]+(?:os|sys|subprocess|socket|shutil|ctypes|threading|multiprocessing|asyncio|pickle|urllib|http|requests)\b.*$",
    )
    .expect("import line pattern")
});

static HTML_SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|</?script\b[^>]*>")
        .expect("html script pattern")
});
static HTML_RISKY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*/?\s*(?:iframe|embed|object|applet|form)\b[^>]*>")
        .expect("risky tag pattern")
});
static HTML_EVENT_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)\son(?:{EVENT_HANDLER_NAMES})\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#
    ))
    .expect("event attr pattern")
});
static HTML_JS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:javascript|vbscript)\s*:").expect("js scheme pattern"));

static CSS_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bexpression\s*\(").expect("expression pattern"));
static CSS_BEHAVIOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbehavior\s*:").expect("behavior pattern"));
static CSS_JS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:javascript|vbscript)\s*:").expect("css scheme pattern"));

/// Rewrites snippet source to neutralize a fixed blocklist of dangerous
/// constructs. Pure function of its inputs; never fails.
pub struct Sanitizer {
    keywords: Vec<BlockedKeyword>,
}

impl Sanitizer {
    /// Build a sanitizer from the shared security policy, compiling the
    /// blocked-keyword matchers once.
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        Self {
            keywords: compile_keywords(&config.blocked_keywords),
        }
    }

    /// Rewrite `code`, blinding every blocked construct with an inert
    /// placeholder comment in the syntax of `language`.
    ///
    /// The rewritten text may be semantically broken; that is the point. It
    /// is never less safe than the input, and re-sanitizing the output is a
    /// no-op (placeholders do not re-trigger the blocklist).
    pub fn sanitize(&self, code: &str, language: Language) -> String {
        let style = language.comment_style();

        // Generic pass: the shared blocked-keyword list.
        let mut out = code.to_string();
        for kw in &self.keywords {
            if kw.regex.is_match(&out) {
                let placeholder = placeholder(style, &kw.mangled);
                out = kw.regex.replace_all(&out, placeholder.as_str()).into_owned();
            }
        }

        // Language-specific pass.
        match language {
            Language::JavaScript | Language::TypeScript => sanitize_script(&out),
            Language::Python => sanitize_python(&out),
            Language::Html => sanitize_html(&out),
            Language::Css => sanitize_css(&out),
            // Structured data, documentation markup, shell and query text get
            // the generic pass only.
            Language::Json | Language::Markdown | Language::Shell | Language::Sql => out,
        }
    }
}

/// An inert comment documenting what was removed. The mangled name contains
/// no word boundaries around blocked terms, so a second sanitization pass
/// leaves it untouched.
fn placeholder(style: CommentStyle, mangled: &str) -> String {
    style.wrap(&format!("BLOCKED_{mangled}"))
}

fn sanitize_script(code: &str) -> String {
    let out = JS_SCRIPT_TAG.replace_all(code, "/* BLOCKED_script */");
    let out = JS_URI_SCHEME.replace_all(&out, "/* BLOCKED_uri_scheme */");
    let out = JS_EVAL_CALL.replace_all(&out, "/* BLOCKED_eval */(");
    let out = JS_NEW_FUNCTION.replace_all(&out, "/* BLOCKED_new_Function */");
    let out = JS_DYNAMIC_IMPORT.replace_all(&out, "/* BLOCKED_dynamic_import */(");
    JS_EVENT_HANDLER
        .replace_all(&out, "/* BLOCKED_event_handler */")
        .into_owned()
}

fn sanitize_python(code: &str) -> String {
    let out = PY_DYNAMIC_CALL.replace_all(code, "# BLOCKED_dynamic_eval(");
    let out = PY_OS_CALL.replace_all(&out, "# BLOCKED_os_call(");
    PY_IMPORT_LINE
        .replace_all(&out, |caps: &regex::Captures<'_>| {
            format!("# BLOCKED_import {}", &caps[0])
        })
        .into_owned()
}

fn sanitize_html(code: &str) -> String {
    let out = HTML_SCRIPT_BLOCK.replace_all(code, "<!-- BLOCKED_script -->");
    let out = HTML_RISKY_TAG.replace_all(&out, "<!-- BLOCKED_tag -->");
    let out = HTML_EVENT_ATTR.replace_all(&out, "");
    HTML_JS_SCHEME.replace_all(&out, "blocked:").into_owned()
}

fn sanitize_css(code: &str) -> String {
    let out = CSS_EXPRESSION.replace_all(code, "/* BLOCKED_expression */(");
    let out = CSS_BEHAVIOR.replace_all(&out, "/* BLOCKED_behavior */:");
    CSS_JS_SCHEME
        .replace_all(&out, "/* BLOCKED_uri_scheme */")
        .into_owned()
}
