// birdidq-core/src/ports/mod.rs

// Contracts the application needs from the outside world, without knowing how they are met.

pub mod dataset;
pub mod generator;

pub use dataset::{DatasetCatalog, DatasetProvider};
pub use generator::{ModelError, TextGenerator};
