use crate::check_references::ReferencePath;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`XMLGeneratorError`]
pub type Result<T> = std::result::Result<T, XMLGeneratorError>;

/// XML generator error
///
/// Enum which manages errors in the XMLGenerator crate. Everything listed here is
/// fatal; anomalies inside an otherwise valid schema (dangling references, unknown
/// type names, malformed facets) never surface as errors and degrade to fallback
/// values instead.
#[derive(Debug, Error)]
pub enum XMLGeneratorError {
    /// The schema path does not exist
    #[error("schema file not found: {}", .0.display())]
    SchemaNotFound(PathBuf),

    /// Error parsing the input XSD file contents
    #[error("XML Error: {0}")]
    XSDParserError(String),

    /// The document is not a usable XML schema
    #[error("invalid schema structure: {0}")]
    SchemaStructureError(String),

    /// A definition reaches itself through its own content model
    #[error("circular reference detected: {0}")]
    CircularReferenceError(ReferencePath),

    /// No element can be used as the document root
    #[error("{}", no_root_message(.0))]
    NoRootElement(Option<String>),

    /// The depth guard tripped on a schema that passed the circular reference check
    #[error("internal error: recursion limit of {depth} exceeded while generating '{element}'")]
    RecursionLimitExceeded {
        /// Element being generated when the limit was hit
        element: String,
        /// Configured depth limit
        depth: usize,
    },

    /// Error generating the output XML structure
    #[error("XML generation error: {0}")]
    XMLBuilderError(String),

    /// Error reading the schema or writing the output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn no_root_message(name: &Option<String>) -> String {
    match name {
        Some(name) => format!("root element '{name}' not found in schema"),
        None => "No suitable root element found in schema".to_string(),
    }
}

impl From<roxmltree::Error> for XMLGeneratorError {
    fn from(err: roxmltree::Error) -> Self {
        XMLGeneratorError::XSDParserError(err.to_string())
    }
}
