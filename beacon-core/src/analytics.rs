use crate::config::{ConfigError, PluginOptions};
use crate::head::HeadTag;
use crate::plugin::Plugin;

pub const BAIDU_ANALYTICS: &str = "baidu-analytics";

const LOADER_URL: &str = "https://hm.baidu.com/hm.js";

/// Baidu Tongji page-view tracking.
///
/// Emits the loader snippet Baidu hands out for a site id: it declares the
/// `_hmt` command queue and inserts an async script pointing at the loader.
#[derive(Debug, Clone)]
pub struct BaiduAnalytics {
    id: String,
}

impl BaiduAnalytics {
    pub fn new(options: &PluginOptions) -> Result<Self, ConfigError> {
        let id = options.id.as_deref().ok_or(ConfigError::MissingOption {
            plugin: BAIDU_ANALYTICS,
            option: "id",
        })?;

        if id.is_empty() {
            return Err(ConfigError::EmptyOption {
                plugin: BAIDU_ANALYTICS,
                option: "id",
            });
        }

        Ok(Self { id: id.to_string() })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn loader_snippet(&self) -> String {
        format!(
            r#"
var _hmt = _hmt || [];
(function() {{
  var hm = document.createElement("script");
  hm.src = "{}?{}";
  var s = document.getElementsByTagName("script")[0];
  s.parentNode.insertBefore(hm, s);
}})();
"#,
            LOADER_URL,
            js_string_escape(&self.id)
        )
    }
}

/// Escape text for a double-quoted JS string inside an inline `<script>`.
///
/// Only characters that would end the string, the line or the script element
/// are rewritten; everything else is copied unchanged.
fn js_string_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' | '<' | '\u{2028}' | '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", c as u32))
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

impl Plugin for BaiduAnalytics {
    fn name(&self) -> &str {
        BAIDU_ANALYTICS
    }

    fn head_tags(&self) -> Vec<HeadTag> {
        vec![HeadTag::new("script").inner_html(self.loader_snippet())]
    }
}
