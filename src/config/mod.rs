/// Configuration module - Load and validate client configuration
pub mod loader;
pub mod schema;

pub use loader::{CONFIG_ENV, load_config, load_config_from};
pub use schema::ClientConfig;
