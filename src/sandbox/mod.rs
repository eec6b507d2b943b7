//! Sandbox module containing all screening and execution components.

pub mod config;
pub mod engine;
pub mod executor;
pub mod language;
pub mod sanitizer;
pub mod snippet;
pub mod validator;

pub(crate) mod patterns;
