//! HTML skeleton with named, replaceable regions.
//!
//! A region is delimited in the skeleton source as
//!
//! ```text
//! <!-- region:hero.title -->Fallback Name<!-- /region -->
//! ```
//!
//! The markup between the markers is the fallback that is shown until a
//! projection replaces it. Markers never appear in rendered output.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use thiserror::Error;

use crate::page::target::{ModalHost, RenderTarget};

const REGION_OPEN: &str = "<!-- region:";
const REGION_OPEN_END: &str = "-->";
const REGION_CLOSE: &str = "<!-- /region -->";
const BODY_CLOSE: &str = "</body>";

#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to read skeleton {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("region marker at byte {offset} is not terminated")]
    Unterminated { offset: usize },

    #[error("region '{name}' opens inside region '{outer}'")]
    Nested { name: String, outer: String },

    #[error("closing region marker at byte {offset} has no opening marker")]
    UnexpectedClose { offset: usize },

    #[error("region '{0}' is declared more than once")]
    Duplicate(String),

    #[error("region marker at byte {offset} has an empty name")]
    EmptyName { offset: usize },
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Region { name: String, fallback: String },
}

#[derive(Debug, Clone)]
struct Overlay {
    id: String,
    html: String,
}

/// A parsed skeleton plus the current state of its regions and overlays.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    segments: Vec<Segment>,
    replaced: HashMap<String, String>,
    overlays: Vec<Overlay>,
}

impl HtmlPage {
    pub fn parse(source: &str) -> Result<Self, PageError> {
        let mut segments = Vec::new();
        let mut seen = HashSet::new();
        let mut pos = 0;

        while pos < source.len() {
            let rest = &source[pos..];
            let open = rest.find(REGION_OPEN);
            let close = rest.find(REGION_CLOSE);

            let open = match (open, close) {
                (None, None) => {
                    segments.push(Segment::Literal(rest.to_string()));
                    break;
                }
                (None, Some(c)) => return Err(PageError::UnexpectedClose { offset: pos + c }),
                (Some(o), Some(c)) if c < o => {
                    return Err(PageError::UnexpectedClose { offset: pos + c })
                }
                (Some(o), _) => o,
            };

            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }

            let marker_start = pos + open;
            let name_start = marker_start + REGION_OPEN.len();
            let name_len = source[name_start..]
                .find(REGION_OPEN_END)
                .ok_or(PageError::Unterminated {
                    offset: marker_start,
                })?;
            let name = source[name_start..name_start + name_len].trim().to_string();
            if name.is_empty() {
                return Err(PageError::EmptyName {
                    offset: marker_start,
                });
            }

            let body_start = name_start + name_len + REGION_OPEN_END.len();
            let body_len = source[body_start..]
                .find(REGION_CLOSE)
                .ok_or(PageError::Unterminated {
                    offset: marker_start,
                })?;
            let fallback = &source[body_start..body_start + body_len];

            if let Some(inner) = fallback.find(REGION_OPEN) {
                let inner_name = fallback[inner + REGION_OPEN.len()..]
                    .split(REGION_OPEN_END)
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                return Err(PageError::Nested {
                    name: inner_name,
                    outer: name,
                });
            }
            if !seen.insert(name.clone()) {
                return Err(PageError::Duplicate(name));
            }

            segments.push(Segment::Region {
                name,
                fallback: fallback.to_string(),
            });
            pos = body_start + body_len + REGION_CLOSE.len();
        }

        Ok(Self {
            segments,
            replaced: HashMap::new(),
            overlays: Vec::new(),
        })
    }

    pub async fn load(path: &Path) -> Result<Self, PageError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PageError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::parse(&source)
    }

    /// Names of all regions, in document order.
    pub fn region_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Region { name, .. } => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Current contents of a region: its replacement if one was projected, else its fallback.
    #[cfg(test)]
    pub fn region(&self, name: &str) -> Option<&str> {
        if let Some(html) = self.replaced.get(name) {
            return Some(html);
        }
        self.segments.iter().find_map(|s| match s {
            Segment::Region { name: n, fallback } if n == name => Some(fallback.as_str()),
            _ => None,
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Region { name, fallback } => {
                    out.push_str(self.replaced.get(name).unwrap_or(fallback));
                }
            }
        }

        if self.overlays.is_empty() {
            return out;
        }
        let overlays: String = self.overlays.iter().map(|o| o.html.as_str()).collect();
        match out.rfind(BODY_CLOSE) {
            Some(idx) => out.insert_str(idx, &overlays),
            None => out.push_str(&overlays),
        }
        out
    }
}

impl RenderTarget for HtmlPage {
    fn has_region(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Region { name: n, .. } if n == name))
    }

    fn replace_html(&mut self, name: &str, html: String) -> bool {
        if !self.has_region(name) {
            return false;
        }
        self.replaced.insert(name.to_string(), html);
        true
    }
}

impl ModalHost for HtmlPage {
    fn mount_overlay(&mut self, id: &str, html: String) {
        self.overlays.push(Overlay {
            id: id.to_string(),
            html,
        });
    }

    fn remove_overlay(&mut self, id: &str) -> bool {
        let before = self.overlays.len();
        self.overlays.retain(|o| o.id != id);
        before != self.overlays.len()
    }

    fn overlay_count(&self, id: &str) -> usize {
        self.overlays.iter().filter(|o| o.id == id).count()
    }
}
