//! Basic example of running snippets through the full pipeline.
//!
//! Run with: cargo run --example basic_execution

use std::sync::Arc;
use std::time::Duration;

use snippet_sandbox::prelude::*;

#[tokio::main]
async fn main() {
    let config = SecurityConfig::builder()
        .max_execution_time(Duration::from_secs(2))
        .max_memory_bytes(32 * 1024 * 1024) // 32MB
        .build();
    let engine = SnippetEngine::new(Arc::new(config));

    println!("=== Test 1: Simple arithmetic ===");
    let result = engine
        .execute("console.log('answer:', 6 * 7);", Language::JavaScript)
        .await;
    print_result(&result);

    println!("\n=== Test 2: A thrown error keeps earlier output ===");
    let result = engine
        .execute(
            "console.log('before'); throw new Error('boom');",
            Language::JavaScript,
        )
        .await;
    print_result(&result);

    println!("\n=== Test 3: Full pipeline rejects hostile code ===");
    match engine
        .run_code("fetch('https://evil.example')", Language::JavaScript)
        .await
    {
        PipelineOutcome::Rejected(verdict) => {
            println!("rejected with {} error(s):", verdict.errors.len());
            for error in &verdict.errors {
                println!("  - {error}");
            }
        }
        PipelineOutcome::Executed(result) => print_result(&result),
    }

    println!("\n=== Test 4: Infinite loop is preempted ===");
    let result = engine.execute("while (true) {}", Language::JavaScript).await;
    print_result(&result);
}

fn print_result(result: &ExecutionResult) {
    println!("success: {}", result.success);
    if let Some(output) = &result.output {
        println!("output: {output}");
    }
    if let Some(error) = &result.error {
        println!("error: {error}");
    }
    if let Some(ms) = result.execution_time_ms {
        println!("duration: {ms}ms");
    }
    if let Some(bytes) = result.memory_used_bytes {
        println!("memory used: {bytes} bytes");
    }
}
