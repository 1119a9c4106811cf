use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parsing(#[from] toml::de::Error),
    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),
    #[error("Plugin '{plugin}' requires option '{option}'")]
    MissingOption {
        plugin: &'static str,
        option: &'static str,
    },
    #[error("Plugin '{plugin}' option '{option}' must not be empty")]
    EmptyOption {
        plugin: &'static str,
        option: &'static str,
    },
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub i18n: I18nConfig,
    pub plugins: Vec<PluginConfig>,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub tagline: String,
    pub base_url: String,
    pub favicon: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            tagline: String::new(),
            base_url: "/".to_string(),
            favicon: None,
        }
    }
}

impl SiteConfig {
    /// Resolve a site-relative asset path against `base_url`.
    ///
    /// Absolute URLs are returned as given.
    pub fn asset_url(&self, path: &str) -> String {
        if path.contains("://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct I18nConfig {
    pub default_locale: String,
    pub locales: Vec<String>,
    pub locale_configs: BTreeMap<String, LocaleConfig>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            locales: Vec::new(),
            locale_configs: BTreeMap::new(),
        }
    }
}

impl I18nConfig {
    /// Locale of a page, given its path relative to the site root.
    ///
    /// Non-default locales live under a directory named after the locale,
    /// everything else belongs to the default locale.
    pub fn locale_for(&self, relative: &Path) -> &str {
        let first = relative
            .components()
            .next()
            .and_then(|c| c.as_os_str().to_str());

        match first {
            Some(dir) if dir != self.default_locale => self
                .locales
                .iter()
                .find(|locale| locale.as_str() == dir)
                .map(String::as_str)
                .unwrap_or(self.default_locale.as_str()),
            _ => self.default_locale.as_str(),
        }
    }

    pub fn html_lang(&self, locale: &str) -> String {
        self.locale_configs
            .get(locale)
            .and_then(|c| c.html_lang.clone())
            .unwrap_or_else(|| locale.to_string())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LocaleConfig {
    pub html_lang: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PluginConfig {
    pub name: String,
    #[serde(default)]
    pub options: PluginOptions,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PluginOptions {
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const ALOVA: &str = r#"
[site]
title = "Alova.JS"
tagline = "Request strategies for fluent applications"
favicon = "img/favicon.ico"

[i18n]
default_locale = "en"
locales = ["en", "zh-CN"]

[i18n.locale_configs.en]
html_lang = "en-GB"

[[plugins]]
name = "baidu-analytics"
options = { id = "5afa4c96fca09cb386951b736ee31e56" }
"#;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(ALOVA).unwrap();
        assert_eq!(config.site.title, "Alova.JS");
        assert_eq!(config.site.base_url, "/");
        assert_eq!(config.i18n.locales, vec!["en", "zh-CN"]);
        assert_eq!(config.plugins.len(), 1);
        assert_eq!(config.plugins[0].name, "baidu-analytics");
        assert_eq!(
            config.plugins[0].options.id.as_deref(),
            Some("5afa4c96fca09cb386951b736ee31e56")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.site.base_url, "/");
        assert_eq!(config.i18n.default_locale, "en");
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn test_plugin_without_options() {
        let config: Config = toml::from_str("[[plugins]]\nname = \"baidu-analytics\"").unwrap();
        assert!(config.plugins[0].options.id.is_none());
    }

    #[test]
    fn test_read_missing_file() {
        let err = Config::read("/definitely/not/here/beacon.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_read_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beacon.toml");
        std::fs::write(&path, "[site\ntitle = ").unwrap();

        let err = Config::read(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parsing(_)));
    }

    #[test]
    fn test_locale_resolution() {
        let config: Config = toml::from_str(ALOVA).unwrap();
        let i18n = &config.i18n;

        assert_eq!(i18n.locale_for(&PathBuf::from("index.html")), "en");
        assert_eq!(i18n.locale_for(&PathBuf::from("zh-CN/index.html")), "zh-CN");
        assert_eq!(i18n.locale_for(&PathBuf::from("en/index.html")), "en");
        assert_eq!(i18n.locale_for(&PathBuf::from("fr/index.html")), "en");

        assert_eq!(i18n.html_lang("en"), "en-GB");
        assert_eq!(i18n.html_lang("zh-CN"), "zh-CN");
    }

    #[test]
    fn test_asset_url() {
        let mut site = SiteConfig::default();
        assert_eq!(site.asset_url("img/favicon.ico"), "/img/favicon.ico");

        site.base_url = "/docs/".to_string();
        assert_eq!(site.asset_url("/img/logo.png"), "/docs/img/logo.png");
    }

    #[test]
    fn test_asset_url_keeps_absolute_urls() {
        let site = SiteConfig {
            base_url: "/docs/".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(
            site.asset_url("https://cdn.example.com/favicon.ico"),
            "https://cdn.example.com/favicon.ico"
        );
    }
}
