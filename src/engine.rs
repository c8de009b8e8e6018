//! File-level services the CLI orchestrates: reading, discovery, and the
//! parse → validate → render pipeline. No terminal output happens here.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::ast::Document;
use crate::errors::{DocError, DocumentContext, ErrorReporting, SourceContext};
use crate::render::render;
use crate::syntax::parse;
use crate::validation::{validate_located, ValidatorOptions};

/// Extension of branchtext document files.
pub const DOCUMENT_EXTENSION: &str = "btx";

/// Output formats for AST dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    Json,
    Yaml,
}

// ============================================================================
// PIPELINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub options: ValidatorOptions,
}

impl Pipeline {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    /// Reads a file into a source context named after its path.
    pub fn read_file(path: &Path) -> Result<SourceContext, DocError> {
        let name = path.display().to_string();
        std::fs::read_to_string(path)
            .map(|content| SourceContext::from_file(name.clone(), content))
            .map_err(|error| {
                DocumentContext::new(SourceContext::from_file(name.clone(), ""))
                    .io_error(&name, &error)
            })
    }

    /// Parses without validating.
    pub fn parse_source(&self, source: &SourceContext) -> Result<Document, DocError> {
        parse(&source.content).map_err(|err| DocumentContext::new(source.clone()).parse_error(err))
    }

    /// Parses and validates.
    pub fn check_source(&self, source: &SourceContext) -> Result<Document, DocError> {
        let document = self.parse_source(source)?;
        validate_located(&document, &self.options).map_err(|err| {
            DocumentContext::new(source.clone()).validation_error(
                &document,
                self.options.name_matching,
                err,
            )
        })?;
        Ok(document)
    }

    /// Re-renders a document in canonical form.
    pub fn format_source(&self, source: &SourceContext) -> Result<String, DocError> {
        self.parse_source(source).map(|document| render(&document))
    }

    /// Serializes the parsed document.
    pub fn dump_source(&self, source: &SourceContext, format: DumpFormat) -> Result<String, DocError> {
        let document = self.parse_source(source)?;
        let context = DocumentContext::new(source.clone());
        match format {
            DumpFormat::Json => serde_json::to_string_pretty(&document)
                .map_err(|err| context.output_error("json", err)),
            DumpFormat::Yaml => {
                serde_yaml::to_string(&document).map_err(|err| context.output_error("yaml", err))
            }
        }
    }
}

// ============================================================================
// DISCOVERY
// ============================================================================

/// Expands the given paths into document files. Files are taken as given;
/// directories are searched recursively for `.btx` files, in sorted order.
pub fn discover_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>, DocError> {
    let mut files = Vec::new();
    for root in paths {
        let root = root.as_ref();
        if root.is_file() {
            files.push(root.to_path_buf());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| {
                let name = root.display().to_string();
                let error = std::io::Error::other(e.to_string());
                DocumentContext::new(SourceContext::from_file(name.clone(), "")).io_error(&name, &error)
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !is_document_file(path) {
                continue;
            }

            found.push(path.to_path_buf());
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn is_document_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(DOCUMENT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorCategory, ErrorKind};

    fn source(text: &str) -> SourceContext {
        SourceContext::from_file("story.btx", text)
    }

    #[test]
    fn test_check_source_runs_both_phases() {
        let pipeline = Pipeline::default();
        assert!(pipeline
            .check_source(&source(":: [ ] Done\n"))
            .is_ok());

        let err = pipeline
            .check_source(&source(":: [ ] Go GO TO Nowhere\n"))
            .unwrap_err();
        assert_eq!(err.kind.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_dump_json_tags_blocks() {
        let json = Pipeline::default()
            .dump_source(&source(":: Hi\n%% Clap\n"), DumpFormat::Json)
            .unwrap();
        assert!(json.contains("\"kind\": \"text\""));
        assert!(json.contains("\"kind\": \"instruction\""));
    }

    #[test]
    fn test_read_missing_file() {
        let err = Pipeline::read_file(Path::new("does/not/exist.btx")).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Io { .. }));
    }

    #[test]
    fn test_document_extension() {
        assert!(is_document_file(Path::new("a/b/story.btx")));
        assert!(!is_document_file(Path::new("a/b/story.txt")));
        assert!(!is_document_file(Path::new("btx")));
    }
}
