//! Notebook File Manager
//!
//! Owns one in-memory notebook and its on-disk location. All writes, renames
//! and config updates go through here so that a named notebook can never be
//! moved by a save, or overwrite another file by a rename.
//!
//! Naming lifecycle:
//! - unnamed --first save(p) / rename(p)--> named(p)
//! - named(p) --rename(q), q does not exist--> named(q)
//! - named(p) --save(p)--> named(p); save(q) with q != p is rejected
//!
//! There is no way back to unnamed.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::codegen::{self, Format};
use crate::document::{
    AppConfig, CellConfig, CellId, CellReconciler, Document, SimilarityReconciler, Width,
};
use crate::error::{FileManagerError, Result};
use crate::layout::{self, LayoutConfig};
use crate::paths;
use crate::side_files::{read_side_file, SideFileKind};

/// Everything needed to save a notebook
#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
    /// Ids for the cells; generated when absent
    pub cell_ids: Option<Vec<CellId>>,
    pub codes: Vec<String>,
    pub names: Vec<String>,
    pub configs: Vec<CellConfig>,
    /// Replaces the app config before saving when set
    pub app_config: Option<AppConfig>,
    /// Target filename; must match the current file for a named notebook
    pub filename: String,
    /// Layout to store alongside; `None` drops the layout reference
    pub layout: Option<LayoutConfig>,
    /// Write to disk, or only render the contents
    pub persist: bool,
}

pub struct FileManager {
    path: Option<PathBuf>,
    document: Document,
    default_width: Option<Width>,
    reconciler: Box<dyn CellReconciler>,
}

impl fmt::Debug for FileManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileManager")
            .field("path", &self.path)
            .field("document", &self.document)
            .field("default_width", &self.default_width)
            .finish_non_exhaustive()
    }
}

impl Default for FileManager {
    fn default() -> Self {
        Self::new(None)
    }
}

impl FileManager {
    /// An unnamed manager holding a single empty cell
    pub fn new(default_width: Option<Width>) -> Self {
        Self {
            path: None,
            document: empty_document(default_width),
            default_width,
            reconciler: Box::new(SimilarityReconciler),
        }
    }

    /// Open the notebook at `path`
    ///
    /// Falls back to an unnamed, empty notebook when there is no path or the
    /// file holds no parsable notebook.
    pub fn load(path: Option<&Path>, default_width: Option<Width>) -> Self {
        let Some(path) = path else {
            return Self::new(default_width);
        };
        let path = paths::absolutize(path);

        match codegen::parse(&path) {
            Some(mut document) => {
                document.ensure_one_cell();
                log::debug!("Loaded {} cells from {}", document.len(), path.display());
                Self {
                    path: Some(path),
                    document,
                    default_width,
                    reconciler: Box::new(SimilarityReconciler),
                }
            }
            None => {
                log::info!("No notebook at {}, starting a new one", path.display());
                Self::new(default_width)
            }
        }
    }

    /// Wrap an already built document; the result is unnamed
    pub fn from_document(mut document: Document) -> Self {
        document.ensure_one_cell();
        Self {
            path: None,
            document,
            default_width: None,
            reconciler: Box::new(SimilarityReconciler),
        }
    }

    /// Replace the strategy used to keep cell ids stable across reloads
    pub fn with_reconciler(mut self, reconciler: Box<dyn CellReconciler>) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Re-read the notebook from disk, keeping cell ids where possible
    pub fn reload(&mut self) {
        let mut document = self
            .path
            .as_deref()
            .and_then(codegen::parse)
            .unwrap_or_else(|| empty_document(self.default_width));
        document.ensure_one_cell();
        document.adopt_ids(&self.document, self.reconciler.as_ref());
        self.document = document;
    }

    pub fn filename(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_named(&self) -> bool {
        self.path.is_some()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Format of the current file; native for unnamed notebooks
    pub fn format(&self) -> Format {
        self.path
            .as_deref()
            .map(Format::from_path)
            .unwrap_or(Format::Native)
    }

    /// Save the notebook, returning the generated contents
    ///
    /// The first save of an unnamed notebook names it. On error the
    /// in-memory notebook is left as it was.
    pub fn save(&mut self, request: SaveRequest) -> Result<String> {
        let requested = canonical_filename(&request.filename)?;
        // A named notebook is always written back to its own file
        let filename = match &self.path {
            Some(current) if self.is_same_path(&requested) => current.clone(),
            Some(_) => return Err(FileManagerError::RenameNotPermitted),
            None => requested,
        };

        let snapshot = self.document.clone();
        let result = self.apply_and_save(request, &filename);
        if result.is_err() {
            self.document = snapshot;
        }
        result
    }

    fn apply_and_save(&mut self, request: SaveRequest, filename: &Path) -> Result<String> {
        self.document.with_data(
            request.cell_ids.as_deref(),
            &request.codes,
            &request.names,
            &request.configs,
        )?;
        if let Some(app_config) = request.app_config {
            self.document.config = app_config;
        }

        match &request.layout {
            Some(layout) => {
                let directory = paths::directory_of(filename);
                let notebook_name = filename
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let layout_file = layout::write_layout(&directory, &notebook_name, layout)
                    .map_err(|source| FileManagerError::Write {
                        path: directory.join(layout::layout_filename(&notebook_name, layout)),
                        source,
                    })?;
                self.document.config.layout_file = Some(layout_file);
            }
            // The old layout file stays on disk; only the reference goes
            None => self.document.config.layout_file = None,
        }

        self.save_file(filename, request.persist)
    }

    /// Move the notebook to `new_filename`
    ///
    /// Renaming onto the current path is a no-op; renaming onto any other
    /// existing file is rejected. When the format changes with the extension
    /// the file is rewritten in the new format.
    pub fn rename(&mut self, new_filename: &str) -> Result<()> {
        let new_path = canonical_filename(new_filename)?;
        if self.is_same_path(&new_path) {
            return Ok(());
        }
        if new_path.exists() {
            return Err(FileManagerError::AlreadyExists(new_path));
        }

        match self.path.clone() {
            Some(old_path) => {
                let format_changed = Format::from_path(&old_path) != Format::from_path(&new_path);
                rename_file(&old_path, &new_path)?;

                if format_changed {
                    let contents = codegen::serialize(&self.document, &new_path);
                    if let Err(e) = create_file(&new_path, &contents) {
                        if let Err(undo) = fs::rename(&new_path, &old_path) {
                            log::error!(
                                "Failed to move {} back to {}: {}",
                                new_path.display(),
                                old_path.display(),
                                undo
                            );
                        }
                        return Err(e);
                    }
                }
                log::info!("Renamed {} to {}", old_path.display(), new_path.display());
            }
            None => create_file(&new_path, "")?,
        }

        self.path = Some(new_path);
        Ok(())
    }

    /// Merge `partial` into the app config and save if the notebook is named
    ///
    /// Unnamed notebooks keep the merged config in memory and return an
    /// empty string.
    pub fn update_config(&mut self, partial: &Map<String, Value>) -> Result<String> {
        let previous = self.document.config.clone();
        self.document.update_config(partial)?;

        let Some(path) = self.path.clone() else {
            return Ok(String::new());
        };
        self.save_file(&path, true).inspect_err(|_| {
            self.document.config = previous;
        })
    }

    /// Copy `source` to `destination`, returning the destination's file name
    pub fn copy(&self, source: &Path, destination: &Path) -> Result<String> {
        fs::copy(source, destination).map_err(|source_err| FileManagerError::Copy {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: source_err,
        })?;
        Ok(destination
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default())
    }

    /// Current file contents, trimmed
    pub fn read_raw(&self) -> Result<String> {
        let path = self.path.as_deref().ok_or(FileManagerError::Unnamed)?;
        let contents = fs::read_to_string(path).map_err(|source| FileManagerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(contents.trim().to_string())
    }

    /// Native text of the in-memory notebook; touches nothing on disk
    pub fn to_text(&self) -> String {
        codegen::to_text(&self.document)
    }

    pub fn read_layout_config(&self) -> Option<LayoutConfig> {
        let layout_file = self.document.config.layout_file.as_deref()?;
        layout::read_layout(layout_file, self.path.as_deref()?)
    }

    pub fn read_css_file(&self) -> Option<String> {
        self.read_config_side_file(SideFileKind::Css, self.document.config.css_file.as_deref())
    }

    pub fn read_html_head_file(&self) -> Option<String> {
        self.read_config_side_file(
            SideFileKind::HtmlHead,
            self.document.config.html_head_file.as_deref(),
        )
    }

    fn read_config_side_file(&self, kind: SideFileKind, name: Option<&str>) -> Option<String> {
        read_side_file(kind, name?, self.path.as_deref()?)
    }

    fn is_same_path(&self, path: &Path) -> bool {
        self.path.as_deref().is_some_and(|current| {
            paths::same_location(&current.to_string_lossy(), &path.to_string_lossy())
        })
    }

    fn save_file(&mut self, filename: &Path, persist: bool) -> Result<String> {
        log::debug!("Saving notebook to {}", filename.display());
        let contents = codegen::serialize(&self.document, filename);

        if persist {
            create_file(filename, &contents)?;
        }
        if self.path.is_none() {
            self.path = Some(filename.to_path_buf());
        }
        Ok(contents)
    }
}

fn empty_document(default_width: Option<Width>) -> Document {
    Document::new(default_width.map(AppConfig::with_width).unwrap_or_default())
}

fn canonical_filename(raw: &str) -> Result<PathBuf> {
    if raw.trim().is_empty() {
        return Err(FileManagerError::EmptyFilename);
    }
    Ok(paths::canonicalize(raw))
}

/// Failures here surface later, from the write itself
fn create_parent_directories(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::debug!("Could not create {}: {}", parent.display(), e);
        }
    }
}

fn create_file(path: &Path, contents: &str) -> Result<()> {
    create_parent_directories(path);
    fs::write(path, contents).map_err(|source| FileManagerError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn rename_file(from: &Path, to: &Path) -> Result<()> {
    create_parent_directories(to);
    fs::rename(from, to).map_err(|source| FileManagerError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}
