mod defaults;
mod error;
mod loader;
mod raw;

pub use error::ConfigError;
pub use loader::{initialize_configuration, load_configuration};
pub use raw::{Config, ConfigRaw};
