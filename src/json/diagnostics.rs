//! JSON error diagnostics for backup imports

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::error::Category;
use thiserror::Error;

/// Malformed import file, with the failing location
#[derive(Debug, Error, Diagnostic)]
#[error("cannot import {filename}: {message}")]
#[diagnostic(code(labdesk::import::parse))]
pub struct ImportParseError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    filename: String,

    /// The underlying error message
    message: String,
}

impl ImportParseError {
    /// Create a parse error from a serde_json error
    pub fn from_serde_error(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        let offset = line_col_to_offset(source, err.line(), err.column());
        let len = usize::from(offset < source.len());

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset + len),
            help: generate_help(err),
            filename: filename.to_string(),
            message: err.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert line/column to byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut current_line = 1;
    let mut line_start = 0;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            break;
        }
        if ch == '\n' {
            current_line += 1;
            line_start = i + 1;
        }
    }

    if current_line < line {
        return source.len();
    }

    let line_len = source[line_start..]
        .find('\n')
        .unwrap_or(source.len() - line_start);
    let col = column.saturating_sub(1).min(line_len);
    line_start + col
}

fn generate_help(err: &serde_json::Error) -> Option<String> {
    match err.classify() {
        Category::Eof => Some("The file ends too early; it may have been truncated.".to_string()),
        Category::Syntax => {
            let msg = err.to_string().to_lowercase();
            if msg.contains("trailing comma") {
                Some("Remove the comma after the last item of the list or object.".to_string())
            } else if msg.contains("expected") {
                Some("Check for a missing comma, quote or closing bracket.".to_string())
            } else {
                None
            }
        }
        Category::Data => Some(
            "The file is valid JSON but not a labdesk backup; top-level keys must be collections like \"orders\" or \"doctors\"."
                .to_string(),
        ),
        Category::Io => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
        assert_eq!(line_col_to_offset(source, 9, 1), source.len());
    }

    #[test]
    fn test_error_points_into_source() {
        let source = "{\n  \"orders\": [\n}";
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let diag = ImportParseError::from_serde_error(&err, source, "backup.json");
        assert!(diag.to_string().starts_with("cannot import backup.json"));
        assert!(diag.help.is_some());
    }

    #[test]
    fn test_wrong_shape_gets_data_help() {
        let source = "{\"orders\": 5}";
        let err = serde_json::from_str::<std::collections::HashMap<String, Vec<u8>>>(source)
            .unwrap_err();
        let diag = ImportParseError::from_serde_error(&err, source, "backup.json");
        assert!(diag.help.unwrap().contains("not a labdesk backup"));
    }
}
