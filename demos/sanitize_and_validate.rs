//! Example of screening snippets in display-only languages.
//!
//! Run with: cargo run --example sanitize_and_validate

use snippet_sandbox::prelude::*;

fn main() {
    let engine = SnippetEngine::with_defaults();

    let samples = [
        (
            Language::Html,
            "<p>hello</p><script>alert(document.cookie)</script>",
        ),
        (
            Language::Python,
            "import os\nprint(os.system('id'))",
        ),
        (
            Language::Css,
            "div { width: expression(alert(1)); }",
        ),
        (
            Language::JavaScript,
            "const sum = [1, 2, 3].reduce((a, b) => a + b, 0);\nconsole.log(sum);",
        ),
    ];

    for (language, code) in samples {
        println!("=== {language} ===");
        println!("input:\n{code}\n");

        let verdict = engine.validate(code, language);
        if verdict.valid {
            println!("validation: passed");
        } else {
            println!("validation: rejected");
            for error in &verdict.errors {
                println!("  - {error}");
            }
        }

        let sanitized = engine.sanitize(code, language);
        if sanitized == code {
            println!("sanitizer: no changes\n");
        } else {
            println!("sanitized:\n{sanitized}\n");
        }
    }
}
