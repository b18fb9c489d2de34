//! Side-File Readers
//!
//! Optional assets (layout, stylesheet, head snippet) referenced relative to
//! the notebook. A missing or unreadable asset is never an error: callers
//! get `None` and a log line.

use std::fmt;
use std::path::Path;

use crate::paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideFileKind {
    Layout,
    Css,
    HtmlHead,
}

impl fmt::Display for SideFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SideFileKind::Layout => "Layout",
            SideFileKind::Css => "CSS",
            SideFileKind::HtmlHead => "HTML head",
        };
        f.write_str(label)
    }
}

/// Contents of `relative_name` resolved against the notebook's directory
pub fn read_side_file(kind: SideFileKind, relative_name: &str, document_path: &Path) -> Option<String> {
    if relative_name.is_empty() || document_path.as_os_str().is_empty() {
        return None;
    }

    let path = paths::resolve_side_file(relative_name, document_path);
    if !path.exists() {
        log::error!("{} file {} does not exist", kind, relative_name);
        return None;
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            log::warn!(
                "Failed to open {} file {} for reading: {}",
                kind,
                path.display(),
                e
            );
            None
        }
    }
}
