//! Native Notebook Format
//!
//! Notebooks are stored as Python modules: an `app = marimo.App(...)`
//! line followed by one decorated function per cell.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::literal::{format_kwargs, parse_kwargs, Literal};
use crate::document::{AppConfig, CellConfig, Document, Width, DEFAULT_CELL_NAME};

/// Version stamped into `__generated_with`
pub const GENERATED_WITH: &str = env!("CARGO_PKG_VERSION");

const INDENT: &str = "    ";

static APP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^app\s*=\s*marimo\.App\((.*)\)\s*$").expect("valid regex"));
static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@app\.cell(?:\((.*)\))?\s*$").expect("valid regex"));
static DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^def\s+([^\W\d]\w*)\s*\(").expect("valid regex"));
static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\W\d]\w*$").expect("valid regex"));
static GUARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^if\s+__name__\s*==\s*["']__main__["']"#).expect("valid regex"));

/// Generate file contents for `document`, prefixed by `header` if given
pub fn generate(document: &Document, header: Option<&str>) -> String {
    let mut out = String::new();

    if let Some(header) = header.map(str::trim_end).filter(|h| !h.trim().is_empty()) {
        out.push_str(header);
        out.push_str("\n\n");
    }

    out.push_str("import marimo\n\n");
    out.push_str(&format!("__generated_with = \"{}\"\n", GENERATED_WITH));
    out.push_str(&format!(
        "app = marimo.App({})\n",
        format_kwargs(&app_kwargs(&document.config))
    ));

    for cell in document.cells() {
        out.push_str("\n\n");
        let kwargs = cell_kwargs(&cell.config);
        if kwargs.is_empty() {
            out.push_str("@app.cell\n");
        } else {
            out.push_str(&format!("@app.cell({})\n", format_kwargs(&kwargs)));
        }
        out.push_str(&format!("def {}():\n", function_name(&cell.name)));
        out.push_str(&indent_body(&cell.code));
        out.push('\n');
    }

    out.push_str("\n\nif __name__ == \"__main__\":\n    app.run()\n");
    out
}

/// Parse native file contents; `None` if this is not a notebook
pub fn parse(content: &str) -> Option<Document> {
    let lines: Vec<&str> = content.lines().collect();

    let (app_idx, app_args) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| APP_RE.captures(line).map(|c| (i, c[1].to_string())))?;

    let mut document = Document::without_cells(parse_app_config(&app_args));

    let mut i = app_idx + 1;
    while i < lines.len() {
        let Some(captures) = CELL_RE.captures(lines[i]) else {
            i += 1;
            continue;
        };
        let config = captures
            .get(1)
            .map(|args| parse_cell_config(args.as_str()))
            .unwrap_or_default();

        // Decorator must be followed by the function definition
        i += 1;
        let Some(name) = lines.get(i).and_then(|l| DEF_RE.captures(l)).map(|c| c[1].to_string()) else {
            log::warn!("Skipping @app.cell decorator without a function on line {}", i);
            continue;
        };
        // Signatures may span lines; the body starts after the closing `:`
        while i < lines.len() && !lines[i].trim_end().ends_with(':') {
            i += 1;
        }
        if i >= lines.len() {
            log::warn!("Unterminated signature for cell '{}', ignoring the rest of the file", name);
            break;
        }
        i += 1;

        let start = i;
        while i < lines.len() && !is_top_level_boundary(lines[i]) {
            i += 1;
        }

        document.push_cell(dedent_body(&lines[start..i]), name, config);
    }

    Some(document)
}

/// Leading comment/docstring block of the file at `path`, if any
///
/// Read before the file is overwritten so license and shebang lines survive
/// re-saves.
pub fn header_comments(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    header_from_source(&content)
}

/// Everything before `import marimo`, provided it is only comments,
/// blank lines, or docstrings
pub fn header_from_source(content: &str) -> Option<String> {
    let mut header = Vec::new();
    let mut in_docstring = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if !in_docstring && trimmed.starts_with("import marimo") {
            let text = header.join("\n");
            return if text.trim().is_empty() { None } else { Some(text) };
        }

        let quotes = trimmed.matches("\"\"\"").count() + trimmed.matches("'''").count();
        let opens_docstring = trimmed.starts_with("\"\"\"") || trimmed.starts_with("'''");
        if !(in_docstring || opens_docstring || trimmed.is_empty() || trimmed.starts_with('#')) {
            return None;
        }
        if quotes % 2 == 1 {
            in_docstring = !in_docstring;
        }
        header.push(line);
    }

    None
}

fn app_kwargs(config: &AppConfig) -> Vec<(&'static str, Literal)> {
    let mut kwargs = Vec::new();
    if config.width != Width::default() {
        kwargs.push(("width", Literal::Str(config.width.to_string())));
    }
    let optional = [
        ("app_title", &config.app_title),
        ("layout_file", &config.layout_file),
        ("css_file", &config.css_file),
        ("html_head_file", &config.html_head_file),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            kwargs.push((key, Literal::Str(value.clone())));
        }
    }
    if !config.auto_download.is_empty() {
        kwargs.push((
            "auto_download",
            Literal::List(config.auto_download.iter().cloned().map(Literal::Str).collect()),
        ));
    }
    kwargs
}

fn cell_kwargs(config: &CellConfig) -> Vec<(&'static str, Literal)> {
    let mut kwargs = Vec::new();
    if let Some(column) = config.column {
        kwargs.push(("column", Literal::Int(column.into())));
    }
    if config.disabled {
        kwargs.push(("disabled", Literal::Bool(true)));
    }
    if config.hide_code {
        kwargs.push(("hide_code", Literal::Bool(true)));
    }
    kwargs
}

fn parse_app_config(args: &str) -> AppConfig {
    let Some(kwargs) = parse_kwargs(args) else {
        log::warn!("Could not parse app config arguments: {}", args);
        return AppConfig::default();
    };

    let mut config = AppConfig::default();
    for (key, value) in kwargs {
        let text = value.as_str().map(str::to_string);
        match key.as_str() {
            "width" => match text.as_deref().map(str::parse::<Width>) {
                Some(Ok(width)) => config.width = width,
                _ => log::warn!("Ignoring invalid width {}", value),
            },
            "app_title" => config.app_title = text,
            "layout_file" => config.layout_file = text,
            "css_file" => config.css_file = text,
            "html_head_file" => config.html_head_file = text,
            "auto_download" => {
                if let Literal::List(items) = value {
                    config.auto_download = items
                        .iter()
                        .filter_map(|i| i.as_str().map(str::to_string))
                        .collect();
                }
            }
            other => log::debug!("Ignoring unknown app option '{}'", other),
        }
    }
    config
}

fn parse_cell_config(args: &str) -> CellConfig {
    let mut config = CellConfig::default();
    for (key, value) in parse_kwargs(args).unwrap_or_default() {
        match key.as_str() {
            "disabled" => config.disabled = value.as_bool().unwrap_or(false),
            "hide_code" => config.hide_code = value.as_bool().unwrap_or(false),
            "column" => config.column = value.as_int().and_then(|n| u32::try_from(n).ok()),
            _ => {}
        }
    }
    config
}

fn function_name(name: &str) -> &str {
    if IDENT_RE.is_match(name) {
        return name;
    }
    log::warn!("Cell name '{}' is not an identifier, writing it as {}", name, DEFAULT_CELL_NAME);
    DEFAULT_CELL_NAME
}

fn indent_body(code: &str) -> String {
    let code = code.trim_end();
    let mut body = String::new();
    for line in code.lines() {
        if !line.is_empty() {
            body.push_str(INDENT);
            body.push_str(line);
        }
        body.push('\n');
    }
    body.push_str(INDENT);
    body.push_str("return");
    body
}

fn is_top_level_boundary(line: &str) -> bool {
    CELL_RE.is_match(line) || GUARD_RE.is_match(line)
}

fn dedent_body(lines: &[&str]) -> String {
    let mut body: Vec<&str> = lines
        .iter()
        .map(|&line| line.strip_prefix(INDENT).unwrap_or(line))
        .collect();

    trim_trailing_blank(&mut body);
    if body
        .last()
        .is_some_and(|l| l.trim() == "return" || l.starts_with("return "))
    {
        body.pop();
        trim_trailing_blank(&mut body);
    }
    body.join("\n")
}

fn trim_trailing_blank(lines: &mut Vec<&str>) {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
}
