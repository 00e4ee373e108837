//! Configuration loading.
//!
//! Settings live in a TOML file; every section is optional and falls back
//! to defaults.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{
    Config, NamedView, NavigationConfig, ServerConfig, UrlConfig, ViewStateConfig, ViewsConfig,
};
