//! Capability-restricted JavaScript execution on fresh V8 isolates.
//!
//! Each `execute()` call gets a brand new isolate on a dedicated thread; no
//! state leaks between calls. The isolate's global scope is bootstrapped down
//! to the configured allow-list: a frozen `console` that appends to
//! per-invocation buffers, with `Deno`, `eval` and the `Function` constructor
//! chain removed. Bare `deno_core` exposes no filesystem, network, process or
//! timer primitives, so the snippet has no lexical path to the host.
//!
//! The timeout is preemptive, not cooperative: a watchdog thread terminates
//! V8 execution when the wall-clock budget elapses, so a synchronous
//! `while(true){}` is forcibly stopped. A near-heap-limit callback terminates
//! execution before V8 would abort the process, enforcing the configured
//! memory ceiling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use deno_core::{v8, JsRuntime, PollEventLoopOptions, RuntimeOptions};
use serde::{Deserialize, Serialize};

use crate::error::{trim_js_error, Result, SandboxError};
use crate::sandbox::config::SecurityConfig;

/// Fixed message reported when the wall-clock budget elapses, so callers can
/// distinguish "your code is wrong" from "your code didn't finish in time".
pub const TIMEOUT_MESSAGE: &str = "Execution timeout exceeded";

/// Result of a snippet execution. Produced fresh per call; the caller owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Whether the snippet ran to completion without throwing or timing out.
    pub success: bool,
    /// Newline-joined log output buffered during the run. Present for every
    /// run that reached the interpreter, including ones that threw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// The failure message. Populated exactly when `success` is `false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Messages sent to the warning/error console methods.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
    /// Wall-clock duration of the run in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// V8 used-heap size observed after the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_used_bytes: Option<u64>,
}

impl ExecutionResult {
    /// Check if the execution completed successfully.
    pub fn is_success(&self) -> bool {
        self.success
    }

    fn failure(message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(message.into()),
            warnings: Vec::new(),
            execution_time_ms: Some(elapsed_ms),
            memory_used_bytes: None,
        }
    }
}

/// What the isolate hands back when its buffers are drained.
#[derive(Debug, Deserialize)]
struct DrainedOutput {
    output: Vec<String>,
    warnings: Vec<String>,
    error: Option<String>,
}

/// Everything collected from a run that reached the interpreter.
struct Collected {
    output: Vec<String>,
    warnings: Vec<String>,
    error: Option<String>,
    memory_used_bytes: u64,
}

/// A sandboxed JavaScript execution environment.
///
/// Cheap to construct and `Send + Sync`; every call builds its own isolate,
/// so concurrent executions share nothing but the read-only config.
pub struct ScriptSandbox {
    config: Arc<SecurityConfig>,
}

impl ScriptSandbox {
    /// Create a new sandbox over the shared security policy.
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        Self { config }
    }

    /// Execute JavaScript in the sandbox.
    ///
    /// Never returns an error to the caller: every failure mode (throw,
    /// timeout, memory limit, infrastructure problem) is folded into the
    /// returned [`ExecutionResult`].
    pub async fn execute(&self, code: &str) -> ExecutionResult {
        tracing::debug!(code_len = code.len(), "execute: starting");
        let started = Instant::now();

        let outcome = self.execute_isolated(code.to_string()).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(collected) => {
                let success = collected.error.is_none();
                ExecutionResult {
                    success,
                    output: Some(collected.output.join("\n")),
                    error: collected.error,
                    warnings: collected.warnings,
                    execution_time_ms: Some(elapsed_ms),
                    memory_used_bytes: Some(collected.memory_used_bytes),
                }
            }
            Err(SandboxError::Timeout(_)) => ExecutionResult::failure(TIMEOUT_MESSAGE, elapsed_ms),
            Err(SandboxError::MemoryLimitExceeded(msg)) => ExecutionResult::failure(msg, elapsed_ms),
            Err(other) => ExecutionResult::failure(other.to_string(), elapsed_ms),
        };

        if result.success {
            tracing::debug!(elapsed_ms, "execute: complete");
        } else {
            tracing::warn!(elapsed_ms, error = ?result.error, "execute: failed");
        }
        result
    }

    /// Run the snippet on a dedicated thread. V8 isolates are `!Send`, so all
    /// runtime operations happen on that thread, with the result sent back
    /// over a oneshot channel.
    async fn execute_isolated(&self, code: String) -> Result<Collected> {
        let config = Arc::clone(&self.config);

        let (tx, rx) = tokio::sync::oneshot::channel();
        std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = tx.send(Err(SandboxError::RuntimeInit(e.into())));
                    return;
                }
            };
            let result = rt.block_on(run_in_isolate(&config, &code));
            if tx.send(result).is_err() {
                tracing::warn!("sandbox result receiver dropped before result was sent");
            }
        });

        rx.await
            .map_err(|_| SandboxError::ExecutionFailed("sandbox thread panicked".to_string()))?
    }
}

/// State shared with the V8 near-heap-limit callback.
struct HeapLimitState {
    handle: v8::IsolateHandle,
    triggered: AtomicBool,
}

/// V8 near-heap-limit callback. Terminates execution and grants 1MB of grace
/// so the termination exception can propagate instead of V8 aborting.
extern "C" fn near_heap_limit_callback(
    data: *mut std::ffi::c_void,
    current_heap_limit: usize,
    _initial_heap_limit: usize,
) -> usize {
    // SAFETY: `data` points to the `HeapLimitState` box owned by
    // `run_in_isolate`. The box outlives every script invocation on the
    // isolate, and V8 only fires this callback while a script is running.
    // `triggered` is atomic, so a shared reference suffices.
    let state = unsafe { &*(data as *const HeapLimitState) };
    if !state.triggered.swap(true, Ordering::SeqCst) {
        state.handle.terminate_execution();
    }
    current_heap_limit + 1024 * 1024
}

/// Create the isolate, bootstrap the restricted scope, run the snippet under
/// watchdog supervision, and drain the buffers. Must be called from the
/// dedicated sandbox thread.
async fn run_in_isolate(config: &SecurityConfig, code: &str) -> Result<Collected> {
    let create_params =
        v8::CreateParams::default().heap_limits(0, config.max_memory_bytes as usize);
    let mut runtime = JsRuntime::new(RuntimeOptions {
        create_params: Some(create_params),
        ..Default::default()
    });

    let heap_state = Box::new(HeapLimitState {
        handle: runtime.v8_isolate().thread_safe_handle(),
        triggered: AtomicBool::new(false),
    });
    runtime.v8_isolate().add_near_heap_limit_callback(
        near_heap_limit_callback,
        &*heap_state as *const HeapLimitState as *mut std::ffi::c_void,
    );

    runtime
        .execute_script("[snippet:bootstrap]", build_bootstrap(config).into())
        .map_err(|e| SandboxError::RuntimeInit(anyhow::anyhow!("bootstrap failed: {e}")))?;

    // Watchdog: preemptively terminate V8 when the budget elapses, covering
    // synchronous code that never yields.
    let timeout = config.max_execution_time;
    let watchdog_handle = runtime.v8_isolate().thread_safe_handle();
    let timed_out = Arc::new(AtomicBool::new(false));
    let watchdog_timed_out = Arc::clone(&timed_out);
    let (cancel_tx, cancel_rx) = std::sync::mpsc::channel::<()>();
    let watchdog = std::thread::spawn(move || {
        if let Err(std::sync::mpsc::RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(timeout) {
            watchdog_timed_out.store(true, Ordering::SeqCst);
            watchdog_handle.terminate_execution();
        }
    });

    let wrapped = wrap_snippet(code);
    let exec_error = match runtime.execute_script("[snippet:run]", wrapped.into()) {
        Ok(_) => {
            // Settle pending microtasks under the same budget.
            match tokio::time::timeout(
                timeout,
                runtime.run_event_loop(PollEventLoopOptions::default()),
            )
            .await
            {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(_) => {
                    timed_out.store(true, Ordering::SeqCst);
                    None
                }
            }
        }
        Err(e) => Some(e.to_string()),
    };

    // The watchdog must be gone before the isolate is dropped, or its handle
    // would dangle.
    let _ = cancel_tx.send(());
    let _ = watchdog.join();

    if heap_state.triggered.load(Ordering::SeqCst) {
        return Err(SandboxError::MemoryLimitExceeded(format!(
            "memory limit of {} bytes exceeded",
            config.max_memory_bytes
        )));
    }
    if timed_out.load(Ordering::SeqCst) {
        return Err(SandboxError::Timeout(timeout));
    }

    let drained = drain_buffers(&mut runtime)?;

    let mut stats = v8::HeapStatistics::default();
    runtime.v8_isolate().get_heap_statistics(&mut stats);

    // A throw inside the snippet is recorded by the wrapper's catch; a parse
    // failure or other uncatchable error surfaces from execute_script.
    let error = drained
        .error
        .or_else(|| exec_error.map(|e| trim_js_error(&e)));

    Ok(Collected {
        output: drained.output,
        warnings: drained.warnings,
        error,
        memory_used_bytes: stats.used_heap_size() as u64,
    })
}

/// Read the output buffers back out of the isolate.
fn drain_buffers(runtime: &mut JsRuntime) -> Result<DrainedOutput> {
    let value = runtime
        .execute_script("[snippet:drain]", "__snippet.drain()".to_string().into())
        .map_err(|e| SandboxError::ExecutionFailed(format!("failed to drain output: {e}")))?;

    let json = {
        let scope = &mut runtime.handle_scope();
        let local = v8::Local::new(scope, &value);
        local.to_rust_string_lossy(scope)
    };

    serde_json::from_str(&json)
        .map_err(|e| SandboxError::ExecutionFailed(format!("malformed drain envelope: {e}")))
}

/// The restricted-scope bootstrap, generated from the allow-list: console
/// methods are only defined when `console.<method>` is allowed, logging
/// methods buffer instead of reaching any host sink, and the escape hatches
/// (`Deno`, `eval`, the `Function` constructor chain) are removed.
fn build_bootstrap(config: &SecurityConfig) -> String {
    let mut methods = String::new();
    for (method, sink) in [
        ("log", "logs"),
        ("info", "logs"),
        ("debug", "logs"),
        ("warn", "warns"),
        ("error", "warns"),
    ] {
        if config.is_allowed(&format!("console.{method}")) {
            methods.push_str(&format!(
                "  consoleApi.{method} = (...a) => {{ {sink}.push(fmt(a)); }};\n"
            ));
        }
    }
    BOOTSTRAP_TEMPLATE.replace("__CONSOLE_METHODS__", &methods)
}

const BOOTSTRAP_TEMPLATE: &str = r#"
((globalThis) => {
  "use strict";
  const logs = [];
  const warns = [];
  const state = { error: null };
  const fmt = (args) => args.map((a) => {
    if (typeof a === "string") return a;
    try {
      const s = JSON.stringify(a);
      return s === undefined ? String(a) : s;
    } catch (_) {
      return String(a);
    }
  }).join(" ");

  const consoleApi = {};
__CONSOLE_METHODS__
  Object.defineProperty(globalThis, "console", {
    value: Object.freeze(consoleApi),
    writable: false,
    configurable: false,
    enumerable: true,
  });

  Object.defineProperty(globalThis, "__snippet", {
    value: Object.freeze({
      fail: (m) => { state.error = String(m); },
      drain: () => JSON.stringify({ output: logs, warnings: warns, error: state.error }),
    }),
    writable: false,
    configurable: false,
    enumerable: false,
  });

  delete globalThis.Deno;
  delete globalThis.eval;

  // Without this, Function is still reachable through the prototype chain of
  // any function value (e.g. console.log.constructor).
  const AsyncFunction = (async function () {}).constructor;
  const GeneratorFunction = (function* () {}).constructor;
  for (const ctor of [Function, AsyncFunction, GeneratorFunction]) {
    Object.defineProperty(ctor.prototype, "constructor", {
      value: undefined, configurable: false, writable: false,
    });
  }
})(globalThis);
"#;

/// Wrap the snippet in a strict-mode IIFE whose catch records the thrown
/// message, leaving already-buffered output intact.
fn wrap_snippet(code: &str) -> String {
    format!(
        "(() => {{ \"use strict\";\ntry {{\n{code}\n}} catch (e) {{\n  __snippet.fail(e instanceof Error ? e.message : String(e));\n}}\n}})();"
    )
}
