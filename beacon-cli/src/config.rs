use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "./beacon.toml";

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BeaconConfig {
    /// Build configuration
    pub build: BuildConfig,
    /// Site configuration (from beacon-core)
    #[serde(flatten)]
    pub site: beacon_core::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Generated site directory whose pages receive the head tags
    pub dir: String,
    /// Configuration file path
    pub config: String,
    /// Host for dev server
    pub host: String,
    /// Port for dev server
    pub port: u16,
    /// Open browser automatically
    pub open: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dir: "./build".to_string(),
            config: DEFAULT_CONFIG_FILE.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: false,
        }
    }
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            site: beacon_core::Config::default(),
        }
    }
}

/// Look up a string flag, tolerating commands that don't define it.
fn flag<'a>(args: &'a ArgMatches, id: &str) -> Option<&'a String> {
    args.try_get_one::<String>(id).unwrap_or(None)
}

impl BeaconConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (BEACON_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = flag(args, "config")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::with_name(&config_file));
        } else {
            log::debug!("No config file at {}, using defaults", config_file);
        }

        // 3. Add environment variables with BEACON_ prefix
        builder = builder.add_source(
            Environment::with_prefix("BEACON")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority)
        let mut cli_overrides = HashMap::new();

        if let Some(dir) = flag(args, "dir") {
            cli_overrides.insert("build.dir".to_string(), dir.clone());
        }
        cli_overrides.insert("build.config".to_string(), config_file);
        if let Some(host) = flag(args, "host") {
            cli_overrides.insert("build.host".to_string(), host.clone());
        }
        if let Some(port) = flag(args, "port") {
            let port_num: u16 = port
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid port: {}", port))?;
            cli_overrides.insert("build.port".to_string(), port_num.to_string());
        }
        if args.try_get_one::<bool>("open").unwrap_or(None) == Some(&true) {
            cli_overrides.insert("build.open".to_string(), "true".to_string());
        }

        for (key, value) in &cli_overrides {
            builder = builder.set_override(key.as_str(), value.as_str())?;
        }

        // Build and deserialize
        let config = builder.build()?;
        let beacon_config: BeaconConfig = config.try_deserialize()?;

        Ok(beacon_config)
    }

    /// Get just the site configuration for passing to beacon-core
    pub fn site_config(&self) -> &beacon_core::Config {
        &self.site
    }

    /// Get the build configuration
    pub fn build_config(&self) -> &BuildConfig {
        &self.build
    }
}

/// Load configuration specifically for build commands
pub fn load_build_config(args: &ArgMatches) -> Result<BeaconConfig> {
    BeaconConfig::load(args)
}

/// Load configuration specifically for serve commands
pub fn load_serve_config(args: &ArgMatches) -> Result<BeaconConfig> {
    BeaconConfig::load(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command};

    fn command() -> Command {
        Command::new("test")
            .arg(Arg::new("dir").long("dir").value_name("DIR"))
            .arg(Arg::new("config").long("config").value_name("FILE"))
            .arg(Arg::new("port").long("port").value_name("PORT"))
            .arg(Arg::new("open").long("open").action(ArgAction::SetTrue))
    }

    #[test]
    fn test_default_config() {
        let config = BeaconConfig::default();
        assert_eq!(config.build.dir, "./build");
        assert_eq!(config.build.config, "./beacon.toml");
        assert_eq!(config.build.port, 3000);
        assert!(config.site.plugins.is_empty());
    }

    #[test]
    fn test_cli_args_override() {
        let matches = command()
            .try_get_matches_from(vec![
                "test",
                "--dir",
                "/custom/build",
                "--config",
                "/custom/missing.toml",
                "--port",
                "4000",
                "--open",
            ])
            .unwrap();

        let config = BeaconConfig::load(&matches).unwrap();
        assert_eq!(config.build.dir, "/custom/build");
        assert_eq!(config.build.config, "/custom/missing.toml");
        assert_eq!(config.build.port, 4000);
        assert!(config.build.open);
        // Should still have defaults for non-overridden values
        assert_eq!(config.build.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_port() {
        let matches = command()
            .try_get_matches_from(vec!["test", "--config", "/custom/missing.toml", "--port", "http"])
            .unwrap();
        assert!(BeaconConfig::load(&matches).is_err());
    }

    #[test]
    fn test_config_file_supplies_site_and_plugins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beacon.toml");
        std::fs::write(
            &path,
            r#"
[build]
dir = "./public"

[site]
title = "Alova.JS"

[[plugins]]
name = "baidu-analytics"
options = { id = "5afa4c96fca09cb386951b736ee31e56" }
"#,
        )
        .unwrap();

        let matches = command()
            .try_get_matches_from(vec!["test", "--config", path.to_str().unwrap()])
            .unwrap();

        let config = BeaconConfig::load(&matches).unwrap();
        assert_eq!(config.build.dir, "./public");
        assert_eq!(config.build.port, 3000);
        assert_eq!(config.site_config().site.title, "Alova.JS");
        assert_eq!(config.site_config().plugins.len(), 1);
        assert_eq!(
            config.site_config().plugins[0].options.id.as_deref(),
            Some("5afa4c96fca09cb386951b736ee31e56")
        );
    }
}
