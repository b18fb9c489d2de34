//! Notebook Serialization
//!
//! Dispatches between the native Python format and the markdown format
//! based on the target file's extension.

pub mod literal;
pub mod markdown;
pub mod native;

pub use native::GENERATED_WITH;

use std::io;
use std::path::Path;

use crate::document::Document;

/// On-disk representation, derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Native,
    Markdown,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("md") | Some("qmd") => Format::Markdown,
            _ => Format::Native,
        }
    }
}

/// Text to write at `target` for `document`
///
/// For native targets any header comments of the file currently at `target`
/// are carried over, so this must run before the file is overwritten.
pub fn serialize(document: &Document, target: &Path) -> String {
    match Format::from_path(target) {
        Format::Markdown => markdown::export(document, target),
        Format::Native => {
            let header = native::header_comments(target);
            native::generate(document, header.as_deref())
        }
    }
}

/// Native text for an in-memory document, without any header
pub fn to_text(document: &Document) -> String {
    native::generate(document, None)
}

/// Parse the notebook at `path`
///
/// `None` when the file is missing, unreadable, or not a notebook.
pub fn parse(path: &Path) -> Option<Document> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("Failed to read notebook {}: {}", path.display(), e);
            return None;
        }
    };

    let document = match Format::from_path(path) {
        Format::Native => native::parse(&content),
        Format::Markdown => markdown::parse(&content),
    };
    if document.is_none() {
        log::debug!("{} does not contain a notebook", path.display());
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{AppConfig, CellConfig};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("/a/nb.py")), Format::Native);
        assert_eq!(Format::from_path(Path::new("/a/nb.md")), Format::Markdown);
        assert_eq!(Format::from_path(Path::new("/a/nb.qmd")), Format::Markdown);
        assert_eq!(Format::from_path(Path::new("/a/nb")), Format::Native);
    }

    #[test]
    fn test_serialize_keeps_existing_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nb.py");
        fs::write(&path, "# SPDX-License-Identifier: MIT\n\nimport marimo\napp = marimo.App()\n").unwrap();

        let text = serialize(&Document::default(), &path);
        assert!(text.starts_with("# SPDX-License-Identifier: MIT\n\nimport marimo\n"));
        assert!(!to_text(&Document::default()).contains("SPDX"));
    }

    #[test]
    fn test_serialize_markdown_target() {
        let text = serialize(&Document::default(), Path::new("/nonexistent/nb.md"));
        assert!(text.starts_with("---\n"));
        assert!(text.contains("{.marimo}"));
    }

    #[test]
    fn test_parse_missing_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        assert!(parse(&dir.path().join("missing.py")).is_none());

        let script = dir.path().join("script.py");
        fs::write(&script, "print('hi')\n").unwrap();
        assert!(parse(&script).is_none());
    }

    #[test]
    fn test_parse_round_trip_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nb.py");
        let mut doc = Document::without_cells(AppConfig::default());
        doc.push_cell("x = 1", "__", CellConfig::default());
        fs::write(&path, serialize(&doc, &path)).unwrap();

        let parsed = parse(&path).expect("parses");
        assert_eq!(parsed.codes().collect::<Vec<_>>(), vec!["x = 1"]);
    }
}
