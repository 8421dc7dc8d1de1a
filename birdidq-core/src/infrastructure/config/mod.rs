pub mod settings;

pub use settings::{AppConfig, ConnectionsConfig, ModelConfig, RetryConfig, load_config};
