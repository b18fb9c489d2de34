//! Notebook Files
//!
//! On-disk lifecycle of cell-based notebooks.
//!
//! This library provides:
//! - An in-memory document model with stable cell ids
//! - Native (Python) and markdown serialization
//! - A file manager enforcing naming, rename and save invariants
//! - Soft-failing readers for layout, CSS and HTML head side files

pub mod codegen;
pub mod config;
pub mod document;
pub mod error;
pub mod layout;
pub mod manager;
pub mod paths;
pub mod side_files;

// Re-exports for clean public API
pub use codegen::Format;
pub use config::Config;
pub use document::{AppConfig, Cell, CellConfig, CellId, Document, Width};
pub use error::{FileManagerError, Result, Status};
pub use layout::LayoutConfig;
pub use manager::{FileManager, SaveRequest};
