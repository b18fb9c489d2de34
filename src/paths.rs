//! Path Resolution
//!
//! Canonical notebook paths and side-file lookup relative to a notebook.

use std::path::{Component, Path, PathBuf};

/// Extensions accepted as notebook files; anything else gets `.py` appended
pub const NOTEBOOK_EXTENSIONS: &[&str] = &["py", "md", "qmd"];

/// Normalize a user-supplied filename
///
/// Expands a leading `~`, defaults the extension to `.py`, and makes the
/// result absolute with `.` and `..` removed. Idempotent.
pub fn canonicalize(raw: &str) -> PathBuf {
    let mut name = expand_home(raw);

    let has_notebook_ext = Path::new(&name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| NOTEBOOK_EXTENSIONS.contains(&ext));
    if !has_notebook_ext {
        name.push_str(".py");
    }

    absolutize(Path::new(&name))
}

/// Absolute, lexically normalized form of `path`
pub fn absolutize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    normalize(&absolute)
}

/// True when both filenames canonicalize to the same location
pub fn same_location(a: &str, b: &str) -> bool {
    canonicalize(a) == canonicalize(b)
}

/// Directory containing `path`; empty for a bare root
pub fn directory_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Resolve a side-file reference against the notebook's directory
pub fn resolve_side_file(relative_name: &str, document_path: &Path) -> PathBuf {
    directory_of(document_path).join(relative_name)
}

fn expand_home(raw: &str) -> String {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return raw.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => format!("{}{}", home.display(), rest),
        None => raw.to_string(),
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !matches!(out.components().next_back(), Some(Component::RootDir) | None) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
