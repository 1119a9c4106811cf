use crate::config::SiteConfig;
use crate::head::HeadTag;
use crate::plugin::Plugin;

pub const SITE_METADATA: &str = "site-metadata";

/// Head tags derived from the `[site]` section.
#[derive(Debug, Clone)]
pub struct SiteMetadata {
    site: SiteConfig,
}

impl SiteMetadata {
    pub fn new(site: &SiteConfig) -> Self {
        Self { site: site.clone() }
    }
}

impl Plugin for SiteMetadata {
    fn name(&self) -> &str {
        SITE_METADATA
    }

    fn head_tags(&self) -> Vec<HeadTag> {
        let mut tags = Vec::new();

        if !self.site.tagline.is_empty() {
            tags.push(
                HeadTag::new("meta")
                    .attr("name", "description")
                    .attr("content", &self.site.tagline),
            );
        }

        if !self.site.title.is_empty() {
            tags.push(
                HeadTag::new("meta")
                    .attr("property", "og:site_name")
                    .attr("content", &self.site.title),
            );
        }

        if let Some(favicon) = self.site.favicon.as_deref().filter(|f| !f.is_empty()) {
            tags.push(
                HeadTag::new("link")
                    .attr("rel", "icon")
                    .attr("href", self.site.asset_url(favicon)),
            );
        }

        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields() {
        let site = SiteConfig {
            title: "Alova.JS".to_string(),
            tagline: "Request strategies".to_string(),
            base_url: "/".to_string(),
            favicon: Some("img/favicon.ico".to_string()),
        };
        let html: Vec<String> = SiteMetadata::new(&site)
            .head_tags()
            .iter()
            .map(HeadTag::to_html)
            .collect();

        assert_eq!(
            html,
            vec![
                r#"<meta content="Request strategies" name="description">"#,
                r#"<meta content="Alova.JS" property="og:site_name">"#,
                r#"<link href="/img/favicon.ico" rel="icon">"#,
            ]
        );
    }

    #[test]
    fn test_absolute_favicon_url() {
        let site = SiteConfig {
            base_url: "/docs/".to_string(),
            favicon: Some("https://cdn.example.com/favicon.ico".to_string()),
            ..SiteConfig::default()
        };
        let tags = SiteMetadata::new(&site).head_tags();
        assert_eq!(
            tags[0].to_html(),
            r#"<link href="https://cdn.example.com/favicon.ico" rel="icon">"#
        );
    }

    #[test]
    fn test_empty_site_yields_nothing() {
        let plugin = SiteMetadata::new(&SiteConfig::default());
        assert!(plugin.head_tags().is_empty());
    }
}
