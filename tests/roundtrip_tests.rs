//! Generated files parse back into the same cells
use std::fs;

use notebook_files::codegen::{self, native};
use notebook_files::{AppConfig, CellConfig, Document, Width};
use tempfile::TempDir;

fn notebooks() -> Vec<Document> {
    let mut simple = Document::without_cells(AppConfig::default());
    simple.push_cell("x = 1", "__", CellConfig::default());

    let mut configured = Document::without_cells(AppConfig {
        width: Width::Columns,
        app_title: Some("Quarterly \"numbers\"".to_string()),
        css_file: Some("custom.css".to_string()),
        auto_download: vec!["html".to_string(), "ipynb".to_string()],
        ..AppConfig::default()
    });
    configured.push_cell(
        "import marimo as mo",
        "imports",
        CellConfig {
            column: Some(0),
            ..CellConfig::default()
        },
    );
    configured.push_cell(
        "def helper(a):\n    return a * 2\n\n\nresult = helper(21)",
        "__",
        CellConfig {
            disabled: true,
            hide_code: true,
            column: Some(1),
        },
    );

    let mut strings = Document::without_cells(AppConfig::default());
    strings.push_cell(
        "text = \"\"\"\nunindented line\n  @app.cell inside a string\n\"\"\"",
        "__",
        CellConfig::default(),
    );
    strings.push_cell("", "__", CellConfig::default());
    strings.push_cell("# only a comment", "_private", CellConfig::default());

    vec![simple, configured, strings]
}

#[test]
fn test_native_round_trip() {
    for doc in notebooks() {
        let parsed = native::parse(&native::generate(&doc, None)).expect("parses");

        assert_eq!(parsed.codes().collect::<Vec<_>>(), doc.codes().collect::<Vec<_>>());
        assert_eq!(parsed.names().collect::<Vec<_>>(), doc.names().collect::<Vec<_>>());
        assert_eq!(parsed.configs().collect::<Vec<_>>(), doc.configs().collect::<Vec<_>>());
        assert_eq!(parsed.config, doc.config);
    }
}

#[test]
fn test_round_trip_through_disk_in_both_formats() {
    let dir = TempDir::new().unwrap();
    for (i, doc) in notebooks().into_iter().enumerate() {
        for ext in ["py", "md"] {
            let path = dir.path().join(format!("nb{}.{}", i, ext));
            fs::write(&path, codegen::serialize(&doc, &path)).unwrap();

            let parsed = codegen::parse(&path).expect("parses");
            assert_eq!(parsed.codes().collect::<Vec<_>>(), doc.codes().collect::<Vec<_>>(), "{}", path.display());
            assert_eq!(parsed.names().collect::<Vec<_>>(), doc.names().collect::<Vec<_>>());
            assert_eq!(parsed.configs().collect::<Vec<_>>(), doc.configs().collect::<Vec<_>>());
        }
    }
}

#[test]
fn test_generation_is_stable() {
    for doc in notebooks() {
        let once = native::generate(&doc, None);
        let twice = native::generate(&native::parse(&once).expect("parses"), None);
        assert_eq!(once, twice);
    }
}
