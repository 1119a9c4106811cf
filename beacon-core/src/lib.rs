pub mod analytics;
pub mod config;
pub mod head;
pub mod inject;
pub mod metadata;
pub mod plugin;

// Re-export main types
pub use analytics::BaiduAnalytics;
pub use config::{Config, ConfigError};
pub use head::HeadTag;
pub use inject::{HeadInjector, InjectError, InjectReport};
pub use metadata::SiteMetadata;
pub use plugin::{Plugin, Plugins};
