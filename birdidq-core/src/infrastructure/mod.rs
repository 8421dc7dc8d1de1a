// birdidq-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod error;
pub mod fs;
pub mod render;
pub mod sources;

pub use sources::{SourceKind, catalog, open_dataset};
