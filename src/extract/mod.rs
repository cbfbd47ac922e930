//! Text extraction from uploaded documents.
//!
//! The file extension picks an extractor. Only text-based formats are
//! handled; anything else is reported as unsupported so that callers can
//! fall back to a placeholder text via [`extract_or_fallback`].

mod html;

use std::fmt;
use std::path::Path;

use serde_json::Value;

/// Document kinds recognised by file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    PlainText,
    Markdown,
    Json,
    /// Comma or tab separated values. The byte is the delimiter.
    Csv(u8),
    Html,
    /// Extension without a text extractor (lowercased, may be empty).
    Unsupported(String),
}

impl FileKind {
    /// Maps a path's extension to a kind.
    pub fn from_path(path: &Path) -> Self {
        let ext = extension_of(path);
        match ext.as_str() {
            "txt" | "text" | "log" | "rst" | "org" | "ini" | "conf" | "cfg" | "toml" | "yaml"
            | "yml" | "xml" => FileKind::PlainText,
            "md" | "markdown" => FileKind::Markdown,
            "json" => FileKind::Json,
            "csv" => FileKind::Csv(b','),
            "tsv" => FileKind::Csv(b'\t'),
            "html" | "htm" | "xhtml" => FileKind::Html,
            _ => FileKind::Unsupported(ext),
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::PlainText => write!(f, "text"),
            FileKind::Markdown => write!(f, "markdown"),
            FileKind::Json => write!(f, "json"),
            FileKind::Csv(b'\t') => write!(f, "tsv"),
            FileKind::Csv(_) => write!(f, "csv"),
            FileKind::Html => write!(f, "html"),
            FileKind::Unsupported(ext) if ext.is_empty() => write!(f, "unknown"),
            FileKind::Unsupported(ext) => write!(f, "{ext}"),
        }
    }
}

/// Lowercased extension of a path, empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Result of extracting text from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub kind: FileKind,
    pub text: String,
    /// False when `text` is a fallback placeholder rather than document content.
    pub succeeded: bool,
}

/// Errors that can occur while extracting text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// No extractor exists for this file type.
    #[error("unsupported file type '{0}'")]
    Unsupported(String),

    /// The file could not be read.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The file was read but its contents could not be parsed.
    #[error("failed to parse {kind}: {message}")]
    Parse { kind: String, message: String },
}

/// Extracts text from `path`, dispatching on its extension.
pub fn extract_text(path: &Path) -> Result<Extracted, ExtractError> {
    extract_as(path, FileKind::from_path(path))
}

/// Extracts text from `path` with the extractor for `kind`.
pub fn extract_as(path: &Path, kind: FileKind) -> Result<Extracted, ExtractError> {
    let text = match &kind {
        FileKind::Unsupported(ext) => {
            let label = if ext.is_empty() { "unknown" } else { ext.as_str() };
            return Err(ExtractError::Unsupported(label.to_string()));
        }
        FileKind::PlainText | FileKind::Markdown => read_lossy(path)?,
        FileKind::Json => json_text(&read_lossy(path)?)?,
        FileKind::Csv(delimiter) => csv_text(&std::fs::read(path)?, *delimiter)?,
        FileKind::Html => html::to_text(&read_lossy(path)?),
    };

    Ok(Extracted {
        kind,
        text: normalize(&text),
        succeeded: true,
    })
}

/// Extracts text from `path`, replacing any failure with a placeholder.
///
/// The extractor is chosen from `display_name`, so uploads can be staged
/// under any temporary name. The name is also used in the placeholder so
/// that temporary paths never leak into stored records.
pub fn extract_or_fallback(path: &Path, display_name: &str) -> Extracted {
    let kind = FileKind::from_path(Path::new(display_name));
    match extract_as(path, kind.clone()) {
        Ok(extracted) => extracted,
        Err(e) => {
            tracing::warn!("Extraction failed for {}: {}", display_name, e);
            Extracted {
                kind,
                text: fallback_text(display_name, &e),
                succeeded: false,
            }
        }
    }
}

/// Placeholder text used when extraction fails.
pub fn fallback_text(display_name: &str, err: &ExtractError) -> String {
    format!("Unable to extract text from {display_name}: {err}")
}

fn read_lossy(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

/// Flattens a JSON document into one scalar per line, depth first.
fn json_text(raw: &str) -> Result<String, ExtractError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| ExtractError::Parse {
        kind: "json".to_string(),
        message: e.to_string(),
    })?;

    let mut lines = Vec::new();
    collect_json_scalars(&value, &mut lines);
    Ok(lines.join("\n"))
}

fn collect_json_scalars(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push(b.to_string()),
        Value::Number(n) => out.push(n.to_string()),
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() {
                out.push(s.to_string());
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_json_scalars(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_json_scalars(v, out)),
    }
}

fn csv_text(bytes: &[u8], delimiter: u8) -> Result<String, ExtractError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut lines = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| ExtractError::Parse {
            kind: if delimiter == b'\t' { "tsv" } else { "csv" }.to_string(),
            message: e.to_string(),
        })?;
        let cells: Vec<String> = record
            .iter()
            .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
            .filter(|cell| !cell.is_empty())
            .collect();
        if !cells.is_empty() {
            lines.push(cells.join(" "));
        }
    }
    Ok(lines.join("\n"))
}

/// CRLF to LF, trailing whitespace removed from every line and the whole text.
fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
