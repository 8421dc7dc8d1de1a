// birdidq-core/src/lib.rs

#![allow(missing_docs)]
// Memory safety
#![deny(unsafe_code)]
// Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts for datasets and the text-generation endpoint.
pub mod ports;

// 2. Domain
// Rule grammar, suites, outcomes, profiling. Depends on nothing else.
pub mod domain;

// 3. Infrastructure (Adapters)
// DuckDB, PostgreSQL, Oracle, Ollama, JSON store, config files, templates.
pub mod infrastructure;

// 4. Application (Use Cases)
// Prompt -> Model -> Sanitizer -> Executor -> Reporter.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::BirdiError;
