//! Side files resolve next to the notebook and fail soft
use std::fs;

use notebook_files::side_files::{read_side_file, SideFileKind};
use notebook_files::FileManager;
use tempfile::TempDir;

const NOTEBOOK: &str = r#"import marimo

app = marimo.App(css_file="theme/custom.css", html_head_file="head.html", layout_file="layouts/nb.grid.json")


@app.cell
def __():
    x = 1
    return
"#;

#[test]
fn test_manager_reads_side_files_relative_to_notebook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nb.py");
    fs::write(&path, NOTEBOOK).unwrap();
    fs::create_dir_all(dir.path().join("theme")).unwrap();
    fs::write(dir.path().join("theme/custom.css"), ".cell { color: red }").unwrap();
    fs::write(dir.path().join("head.html"), "<meta name=\"x\">").unwrap();
    fs::create_dir_all(dir.path().join("layouts")).unwrap();
    fs::write(
        dir.path().join("layouts/nb.grid.json"),
        r#"{"type": "grid", "data": {"columns": 24}}"#,
    )
    .unwrap();

    let manager = FileManager::load(Some(path.as_path()), None);

    assert_eq!(manager.read_css_file().as_deref(), Some(".cell { color: red }"));
    assert_eq!(manager.read_html_head_file().as_deref(), Some("<meta name=\"x\">"));
    let layout = manager.read_layout_config().expect("layout");
    assert_eq!(layout.layout_type, "grid");
}

#[test]
fn test_missing_side_files_are_absent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nb.py");
    fs::write(&path, NOTEBOOK).unwrap();

    let manager = FileManager::load(Some(path.as_path()), None);

    assert!(manager.is_named());
    assert_eq!(manager.read_css_file(), None);
    assert_eq!(manager.read_html_head_file(), None);
    assert_eq!(manager.read_layout_config(), None);
}

#[test]
fn test_unnamed_manager_has_no_side_files() {
    let manager = FileManager::new(None);
    assert_eq!(manager.read_css_file(), None);
    assert_eq!(manager.read_html_head_file(), None);
    assert_eq!(manager.read_layout_config(), None);
}

#[test]
fn test_side_files_follow_the_notebook_on_rename() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nb.py");
    fs::write(&path, NOTEBOOK).unwrap();
    fs::create_dir_all(dir.path().join("elsewhere/theme")).unwrap();
    fs::write(dir.path().join("elsewhere/theme/custom.css"), "moved").unwrap();

    let mut manager = FileManager::load(Some(path.as_path()), None);
    assert_eq!(manager.read_css_file(), None);

    let target = dir.path().join("elsewhere/nb.py");
    manager.rename(target.to_str().unwrap()).unwrap();
    assert_eq!(manager.read_css_file().as_deref(), Some("moved"));
}

#[test]
fn test_read_side_file_never_fails() {
    let dir = TempDir::new().unwrap();
    let notebook = dir.path().join("nb.py");

    assert_eq!(read_side_file(SideFileKind::Css, "", &notebook), None);
    assert_eq!(read_side_file(SideFileKind::Css, "nope.css", &notebook), None);
    assert_eq!(read_side_file(SideFileKind::Layout, "../../../../nope.json", &notebook), None);
}
