use log::debug;

use crate::analytics::{BAIDU_ANALYTICS, BaiduAnalytics};
use crate::config::{Config, ConfigError};
use crate::head::{HeadTag, render_tags};
use crate::metadata::{SITE_METADATA, SiteMetadata};

/// An extension that contributes tags to every page's `<head>`.
///
/// The host calls `head_tags` once per build. Implementations hold only
/// configuration captured at construction, so repeated calls return the same
/// tags.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn head_tags(&self) -> Vec<HeadTag>;
}

/// Ordered set of plugins for one build.
#[derive(Default)]
pub struct Plugins {
    plugins: Vec<Box<dyn Plugin>>,
}

impl Plugins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct every plugin listed in the configuration, in order.
    ///
    /// Fails on the first plugin whose options are unusable, before any
    /// output is produced.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut plugins = Self::new();

        for entry in &config.plugins {
            let plugin: Box<dyn Plugin> = match entry.name.as_str() {
                BAIDU_ANALYTICS => Box::new(BaiduAnalytics::new(&entry.options)?),
                SITE_METADATA => Box::new(SiteMetadata::new(&config.site)),
                other => return Err(ConfigError::UnknownPlugin(other.to_string())),
            };
            debug!("Loaded plugin: {}", plugin.name());
            plugins.push(plugin);
        }

        Ok(plugins)
    }

    pub fn push(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Collect the tags of every plugin in registration order.
    pub fn head_tags(&self) -> Vec<HeadTag> {
        self.plugins.iter().flat_map(|p| p.head_tags()).collect()
    }

    pub fn render_head(&self) -> String {
        render_tags(&self.head_tags())
    }
}
