use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::I18nConfig;
use crate::plugin::Plugins;

pub const BLOCK_START: &str = "<!-- beacon:head -->";
pub const BLOCK_END: &str = "<!-- /beacon:head -->";

#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error("Site directory does not exist: {}", .0.display())]
    MissingSiteDir(PathBuf),
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Outcome of one injection pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InjectReport {
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl InjectReport {
    pub fn total(&self) -> usize {
        self.updated + self.unchanged + self.skipped
    }
}

pub struct HeadInjector {
    head: String,
    i18n: I18nConfig,
}

impl HeadInjector {
    /// Invokes every plugin's head hook once; the result is reused for all pages.
    pub fn new(plugins: &Plugins, i18n: &I18nConfig) -> Self {
        Self {
            head: plugins.render_head(),
            i18n: i18n.clone(),
        }
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    pub fn run<P: AsRef<Path>>(&self, site_dir: P) -> Result<InjectReport, InjectError> {
        let site_dir = site_dir.as_ref();
        if !site_dir.is_dir() {
            return Err(InjectError::MissingSiteDir(site_dir.to_path_buf()));
        }

        info!("Injecting head tags into: {}", site_dir.display());

        let mut report = InjectReport::default();
        for path in html_files(site_dir)? {
            let relative = path.strip_prefix(site_dir).unwrap_or(&path);
            let lang = self.i18n.html_lang(self.i18n.locale_for(relative));

            let bytes = std::fs::read(&path).map_err(|source| InjectError::Io {
                path: path.clone(),
                source,
            })?;
            let Ok(html) = String::from_utf8(bytes) else {
                warn!("{} is not valid UTF-8, skipping", relative.display());
                report.skipped += 1;
                continue;
            };

            match inject_html(&html, &self.head, Some(lang.as_str())) {
                None => {
                    warn!("No </head> in {}, skipping", relative.display());
                    report.skipped += 1;
                }
                Some(out) if out == html => {
                    report.unchanged += 1;
                }
                Some(out) => {
                    std::fs::write(&path, out).map_err(|source| InjectError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    debug!("Updated {}", relative.display());
                    report.updated += 1;
                }
            }
        }

        Ok(report)
    }
}

fn html_files(dir: &Path) -> Result<Vec<PathBuf>, InjectError> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let is_html = entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("html"))
            .unwrap_or(false);
        if entry.file_type().is_file() && is_html {
            paths.push(entry.into_path());
        }
    }

    Ok(paths)
}

/// Place `head` inside the document's `<head>`, replacing any block left
/// by an earlier pass, and set `<html lang>` if the page has none.
///
/// Returns `None` when the document has no `</head>`.
pub fn inject_html(html: &str, head: &str, lang: Option<&str>) -> Option<String> {
    let stripped = strip_block(html);
    let close = find_ascii_ci(&stripped, "</head>")?;

    let mut out = String::with_capacity(stripped.len() + head.len() + 64);
    out.push_str(&stripped[..close]);
    if !head.is_empty() {
        out.push_str(BLOCK_START);
        out.push('\n');
        out.push_str(head);
        out.push('\n');
        out.push_str(BLOCK_END);
        out.push('\n');
    }
    out.push_str(&stripped[close..]);

    Some(match lang {
        Some(lang) => set_html_lang(&out, lang),
        None => out,
    })
}

/// Remove a previously injected block, including its trailing newline.
fn strip_block(html: &str) -> String {
    let Some(start) = html.find(BLOCK_START) else {
        return html.to_string();
    };
    let Some(end_rel) = html[start..].find(BLOCK_END) else {
        return html.to_string();
    };

    let mut end = start + end_rel + BLOCK_END.len();
    if html[end..].starts_with('\n') {
        end += 1;
    }

    let mut out = String::with_capacity(html.len());
    out.push_str(&html[..start]);
    out.push_str(&html[end..]);
    out
}

fn set_html_lang(html: &str, lang: &str) -> String {
    let Some(open) = find_html_start_tag(html) else {
        return html.to_string();
    };
    let Some(close_rel) = html[open..].find('>') else {
        return html.to_string();
    };
    let close = open + close_rel;

    let tag = html[open..close].to_ascii_lowercase();
    if tag
        .split_ascii_whitespace()
        .skip(1)
        .any(|attr| attr == "lang" || attr.starts_with("lang="))
    {
        return html.to_string();
    }

    // Keep a self-closing slash, if any, at the end
    let insert_at = if html[..close].ends_with('/') {
        close - 1
    } else {
        close
    };

    format!(
        "{} lang=\"{}\"{}",
        &html[..insert_at],
        html_escape::encode_double_quoted_attribute(lang),
        &html[insert_at..]
    )
}

fn find_html_start_tag(html: &str) -> Option<usize> {
    let lower = html.to_ascii_lowercase();
    let mut from = 0;
    while let Some(rel) = lower[from..].find("<html") {
        let pos = from + rel;
        match lower[pos + 5..].chars().next() {
            Some(c) if c == '>' || c == '/' || c.is_ascii_whitespace() => return Some(pos),
            _ => from = pos + 5,
        }
    }
    None
}

/// ASCII case-insensitive search. Lowercasing ASCII keeps byte offsets intact.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(needle)
}
