// birdidq-core/src/application/mod.rs

pub mod assistant;
pub mod check;
pub mod checkpoint;
pub mod clean;
pub mod docs;
pub mod executor;
pub mod isolate;
pub mod model;
pub mod ports;
pub mod prompt;
pub mod quality;
pub mod reporter;
pub mod retry;
pub mod sanitizer;
pub mod validator;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI only needs:
// `use birdidq_core::application::{run_check, run_assistant, Reporter, ModelClient, ...};`

pub use assistant::{AssistantOutcome, run_assistant};
pub use check::{ApplyOutcome, CheckOutcome, apply_statements, run_check};
pub use checkpoint::run_checkpoint;
pub use clean::clean_project;
pub use docs::DataDocsBuilder;
pub use executor::{executable_statements, execute};
pub use model::{ModelClient, PingReport};
pub use prompt::build_prompt;
pub use reporter::{ReportStatus, Reporter};
pub use retry::RetryPolicy;
pub use sanitizer::{Sanitizer, SanitizerConfig};
pub use validator::Validator;
