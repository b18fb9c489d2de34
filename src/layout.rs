//! Layout Store
//!
//! Layouts (grid, slides, ...) are saved as JSON next to the notebook under
//! `layouts/<stem>.<type>.json` and referenced from the app config by that
//! relative name.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::side_files::{read_side_file, SideFileKind};

/// Directory, relative to the notebook, holding layout files
pub const LAYOUTS_DIR: &str = "layouts";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(rename = "type")]
    pub layout_type: String,
    #[serde(default)]
    pub data: Value,
}

/// Relative layout filename for a notebook named `notebook_name`
pub fn layout_filename(notebook_name: &str, layout: &LayoutConfig) -> String {
    let stem = Path::new(notebook_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| notebook_name.to_string());
    format!("{}/{}.{}.json", LAYOUTS_DIR, stem, layout.layout_type)
}

/// Write `layout` under `directory` and return its relative filename
pub fn write_layout(directory: &Path, notebook_name: &str, layout: &LayoutConfig) -> io::Result<String> {
    let filename = layout_filename(notebook_name, layout);
    let path = directory.join(&filename);
    fs::create_dir_all(directory.join(LAYOUTS_DIR))?;

    let json = serde_json::to_string_pretty(layout)?;
    fs::write(&path, json)?;
    log::debug!("Saved layout to {}", path.display());
    Ok(filename)
}

/// Read the layout `filename` referenced by the notebook at `document_path`
///
/// Missing, unreadable, or malformed layouts yield `None`.
pub fn read_layout(filename: &str, document_path: &Path) -> Option<LayoutConfig> {
    let text = read_side_file(SideFileKind::Layout, filename, document_path)?;
    match serde_json::from_str(&text) {
        Ok(layout) => Some(layout),
        Err(e) => {
            log::warn!("Failed to parse layout file {}: {}", filename, e);
            None
        }
    }
}
