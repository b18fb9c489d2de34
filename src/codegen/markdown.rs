//! Markdown Notebook Format
//!
//! Prose-oriented export: a front-matter block with app metadata followed by
//! one fenced `{.marimo}` code block per cell.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::native::GENERATED_WITH;
use crate::document::{AppConfig, CellConfig, Document, Width, DEFAULT_CELL_NAME};

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(`{3,})python\s*\{\.marimo(.*)\}\s*$").expect("valid regex"));
static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z_][A-Za-z0-9_]*)="((?:[^"\\]|\\.)*)""#).expect("valid regex"));

/// Export `document` as markdown; `path` supplies the fallback title
pub fn export(document: &Document, path: &Path) -> String {
    let config = &document.config;
    let title = config.app_title.clone().unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string())
    });

    let mut out = String::from("---\n");
    push_field(&mut out, "title", &title);
    push_field(&mut out, "marimo-version", GENERATED_WITH);
    if config.width != Width::default() {
        push_field(&mut out, "width", config.width.as_str());
    }
    for (key, value) in [
        ("layout_file", &config.layout_file),
        ("css_file", &config.css_file),
        ("html_head_file", &config.html_head_file),
    ] {
        if let Some(value) = value {
            push_field(&mut out, key, value);
        }
    }
    if !config.auto_download.is_empty() {
        let list = serde_json::to_string(&config.auto_download).unwrap_or_else(|_| "[]".to_string());
        out.push_str(&format!("auto_download: {}\n", list));
    }
    out.push_str("---\n");

    for cell in document.cells() {
        let fence = fence_for(&cell.code);
        let mut attrs = String::new();
        if cell.name != DEFAULT_CELL_NAME {
            attrs.push_str(&format!(" name=\"{}\"", escape_attr(&cell.name)));
        }
        if let Some(column) = cell.config.column {
            attrs.push_str(&format!(" column=\"{}\"", column));
        }
        if cell.config.disabled {
            attrs.push_str(" disabled=\"true\"");
        }
        if cell.config.hide_code {
            attrs.push_str(" hide_code=\"true\"");
        }

        out.push_str(&format!("\n{}python {{.marimo{}}}\n", fence, attrs));
        let code = cell.code.trim_end();
        if !code.is_empty() {
            out.push_str(code);
            out.push('\n');
        }
        out.push_str(&fence);
        out.push('\n');
    }

    out
}

/// Parse markdown contents; `None` when there is neither front matter nor
/// any `{.marimo}` block
pub fn parse(content: &str) -> Option<Document> {
    let lines: Vec<&str> = content.lines().collect();
    let mut config = AppConfig::default();
    let mut i = 0;
    let mut has_front_matter = false;

    if lines.first().map(|l| l.trim()) == Some("---") {
        if let Some(end) = lines[1..].iter().position(|l| l.trim() == "---") {
            has_front_matter = true;
            for line in &lines[1..=end] {
                if let Some((key, value)) = line.split_once(':') {
                    apply_field(&mut config, key.trim(), value.trim());
                }
            }
            i = end + 2;
        }
    }

    let mut document = Document::without_cells(config);
    while i < lines.len() {
        let Some(captures) = FENCE_RE.captures(lines[i]) else {
            i += 1;
            continue;
        };
        let fence = captures[1].to_string();
        let (name, cell_config) = parse_attrs(&captures[2]);

        i += 1;
        let start = i;
        while i < lines.len() && lines[i].trim_end() != fence {
            i += 1;
        }
        document.push_cell(lines[start..i].join("\n"), name, cell_config);
        i += 1;
    }

    if !has_front_matter && document.is_empty() {
        return None;
    }
    Some(document)
}

fn push_field(out: &mut String, key: &str, value: &str) {
    let needs_quotes = value.contains(':') || value.starts_with(['"', '[', '\'']) || value.trim() != value;
    if needs_quotes {
        let quoted = serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value));
        out.push_str(&format!("{}: {}\n", key, quoted));
    } else {
        out.push_str(&format!("{}: {}\n", key, value));
    }
}

fn field_value(raw: &str) -> String {
    if raw.starts_with('"') {
        if let Ok(value) = serde_json::from_str::<String>(raw) {
            return value;
        }
    }
    raw.to_string()
}

fn apply_field(config: &mut AppConfig, key: &str, raw: &str) {
    match key {
        "title" => config.app_title = Some(field_value(raw)),
        "width" => match raw.parse::<Width>() {
            Ok(width) => config.width = width,
            Err(e) => log::warn!("Ignoring front matter width: {}", e),
        },
        "layout_file" => config.layout_file = Some(field_value(raw)),
        "css_file" => config.css_file = Some(field_value(raw)),
        "html_head_file" => config.html_head_file = Some(field_value(raw)),
        "auto_download" => match serde_json::from_str::<Vec<String>>(raw) {
            Ok(formats) => config.auto_download = formats,
            Err(e) => log::warn!("Ignoring front matter auto_download: {}", e),
        },
        _ => {}
    }
}

fn parse_attrs(attrs: &str) -> (String, CellConfig) {
    let mut name = DEFAULT_CELL_NAME.to_string();
    let mut config = CellConfig::default();
    for captures in ATTR_RE.captures_iter(attrs) {
        let value = &captures[2];
        match &captures[1] {
            "name" => name = unescape_attr(value),
            "disabled" => config.disabled = value == "true",
            "hide_code" => config.hide_code = value == "true",
            "column" => config.column = value.parse().ok(),
            _ => {}
        }
    }
    (name, config)
}

/// Backslash-escape quotes, backslashes and newlines inside an attribute
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }
    out
}

fn fence_for(code: &str) -> String {
    let longest_run = code
        .lines()
        .map(|line| line.trim_start().chars().take_while(|&c| c == '`').count())
        .max()
        .unwrap_or(0);
    "`".repeat(longest_run.max(2) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::without_cells(AppConfig::with_width(Width::Full));
        doc.push_cell("import marimo as mo", "__", CellConfig::default());
        doc.push_cell(
            "x = 1",
            "setup",
            CellConfig {
                hide_code: true,
                column: Some(1),
                ..CellConfig::default()
            },
        );
        doc
    }

    #[test]
    fn test_export_front_matter_and_fences() {
        let text = export(&sample(), Path::new("/tmp/My Notebook.md"));
        assert!(text.starts_with("---\ntitle: My Notebook\nmarimo-version: "));
        assert!(text.contains("width: full\n---\n"));
        assert!(text.contains("\n```python {.marimo}\nimport marimo as mo\n```\n"));
        assert!(text.contains("```python {.marimo name=\"setup\" column=\"1\" hide_code=\"true\"}\nx = 1\n```\n"));
        assert!(!text.contains("app = marimo.App"));
    }

    #[test]
    fn test_parse_exported_markdown() {
        let doc = sample();
        let parsed = parse(&export(&doc, Path::new("nb.md"))).expect("parses");

        assert_eq!(parsed.codes().collect::<Vec<_>>(), doc.codes().collect::<Vec<_>>());
        assert_eq!(parsed.names().collect::<Vec<_>>(), doc.names().collect::<Vec<_>>());
        assert_eq!(parsed.cells()[1].config, doc.cells()[1].config);
        assert_eq!(parsed.config.width, Width::Full);
        assert_eq!(parsed.config.app_title.as_deref(), Some("nb"));
    }

    #[test]
    fn test_code_containing_fences_gets_longer_fence() {
        let mut doc = Document::without_cells(AppConfig::default());
        doc.push_cell("s = \"\"\"\n```\n\"\"\"", "__", CellConfig::default());
        let text = export(&doc, Path::new("nb.md"));
        assert!(text.contains("````python {.marimo}"));

        let parsed = parse(&text).expect("parses");
        assert_eq!(parsed.cells()[0].code, "s = \"\"\"\n```\n\"\"\"");
    }

    #[test]
    fn test_quoted_front_matter_values() {
        let mut doc = Document::without_cells(AppConfig::default());
        doc.config.app_title = Some("Notes: draft".to_string());
        doc.push_cell("", "__", CellConfig::default());

        let parsed = parse(&export(&doc, Path::new("nb.md"))).expect("parses");
        assert_eq!(parsed.config.app_title.as_deref(), Some("Notes: draft"));
    }

    #[test]
    fn test_names_with_quotes_survive() {
        let mut doc = Document::without_cells(AppConfig::default());
        doc.push_cell("x = 1", "say \"hi\" \\ {now}", CellConfig::default());
        doc.push_cell(
            "y = 2",
            "plain",
            CellConfig {
                disabled: true,
                ..CellConfig::default()
            },
        );

        let text = export(&doc, Path::new("nb.md"));
        assert!(text.contains(r#"{.marimo name="say \"hi\" \\ {now}"}"#));

        let parsed = parse(&text).expect("parses");
        assert_eq!(
            parsed.names().collect::<Vec<_>>(),
            vec!["say \"hi\" \\ {now}", "plain"]
        );
        assert!(parsed.cells()[1].config.disabled);
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let parsed = parse("---\ntitle: nb\n---\n\n```python {.marimo}\nx = 1\ny = 2\n").expect("parses");
        assert_eq!(parsed.codes().collect::<Vec<_>>(), vec!["x = 1\ny = 2"]);
    }

    #[test]
    fn test_unclosed_front_matter_is_ignored() {
        let parsed = parse("---\ntitle: nb\n\n```python {.marimo}\nx = 1\n```\n").expect("parses");
        assert_eq!(parsed.config.app_title, None);
        assert_eq!(parsed.codes().collect::<Vec<_>>(), vec!["x = 1"]);

        assert!(parse("---\ntitle: nb\n").is_none());
        assert!(parse("---").is_none());
    }

    #[test]
    fn test_plain_markdown_is_not_a_notebook() {
        assert!(parse("# Just a heading\n\nSome prose.\n").is_none());
    }
}
