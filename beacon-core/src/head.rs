use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Elements that never carry content or a closing tag.
const VOID_ELEMENTS: &[&str] = &["base", "link", "meta"];

/// Declarative description of an element to place in a document's `<head>`.
///
/// Attributes are kept sorted so serialization is stable. An attribute with
/// an empty value is written as a bare boolean attribute (`async`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadTag {
    pub tag_name: String,
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_html: Option<String>,
}

impl HeadTag {
    pub fn new<S: Into<String>>(tag_name: S) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: BTreeMap::new(),
            inner_html: None,
        }
    }

    pub fn attr<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn inner_html<S: Into<String>>(mut self, html: S) -> Self {
        self.inner_html = Some(html.into());
        self
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag_name.to_ascii_lowercase().as_str())
    }

    pub fn to_html(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HeadTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag_name)?;
        for (key, value) in &self.attributes {
            if value.is_empty() {
                write!(f, " {}", key)?;
            } else {
                write!(
                    f,
                    " {}=\"{}\"",
                    key,
                    html_escape::encode_double_quoted_attribute(value)
                )?;
            }
        }
        write!(f, ">")?;

        if self.is_void() {
            return Ok(());
        }

        // Trusted content, written verbatim
        if let Some(inner) = &self.inner_html {
            write!(f, "{}", inner)?;
        }
        write!(f, "</{}>", self.tag_name)
    }
}

/// Serialize tags one per line.
pub fn render_tags(tags: &[HeadTag]) -> String {
    tags.iter()
        .map(HeadTag::to_html)
        .collect::<Vec<_>>()
        .join("\n")
}
