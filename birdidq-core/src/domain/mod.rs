pub mod error;
pub mod metrics;
pub mod outcome;
pub mod ports;
pub mod profiling;
pub mod request;
pub mod rule;
pub mod run;
pub mod source;
pub mod suite;
pub mod table;

// Short paths for the types every layer uses
pub use error::DomainError;
