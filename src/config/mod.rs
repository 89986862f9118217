//! Settings for the change-gate and the stores, loaded from TOML.

mod loader;
mod types;

pub use loader::{ConfigError, CONFIG_ENV_VAR};
pub use types::{ExemptionConfig, MixinConfig, Settings, StoreSettings};
