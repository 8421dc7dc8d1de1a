// src/domain/ports/mod.rs

pub mod store;

pub use store::SuiteStore;
