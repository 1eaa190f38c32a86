//! Image location lookup for presentation layers
//!
//! The engine only deals in image identifiers. Hosts that draw the staff
//! turn an identifier plus clef into something they can render: a URL in
//! the browser, a file path in the terminal.

use std::path::PathBuf;

use crate::model::Clef;

pub trait ImageResolver {
    fn resolve(&self, clef: Clef, image_id: &str) -> String;
}

/// Resolves to `<base>/<clef>/<image_id>`, e.g. `/images/treble/A4.png`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlResolver {
    base: String,
}

impl UrlResolver {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for UrlResolver {
    fn default() -> Self {
        Self::new("/images")
    }
}

impl ImageResolver for UrlResolver {
    fn resolve(&self, clef: Clef, image_id: &str) -> String {
        format!("{}/{}/{}", self.base, clef.as_str(), image_id.trim_start_matches('/'))
    }
}

/// Resolves to a path under a local asset directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageResolver for DirectoryResolver {
    fn resolve(&self, clef: Clef, image_id: &str) -> String {
        self.root
            .join(clef.as_str())
            .join(image_id)
            .to_string_lossy()
            .into_owned()
    }
}
