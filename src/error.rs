//! Error taxonomy for a generation run.
//!
//! Every variant is fatal: the first one raised aborts the whole run and no
//! output is written.
use thiserror::Error;

pub type Result<T, E = GeneratorError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A `$ref` whose target is not present in `components.schemas`.
    #[error("{owner}: unresolvable reference `{reference}`")]
    UnresolvableReference { owner: String, reference: String },

    /// A property (or array item, or parameter) that matches none of the
    /// recognized resolution branches.
    #[error("{owner}: unhandled property shape at `{property}`: {detail}")]
    UnhandledPropertyShape {
        owner: String,
        property: String,
        detail: String,
    },

    /// The response-type fallback chain found nothing usable.
    #[error("{operation}: unhandled response type in {fragment}")]
    UnhandledResponseType { operation: String, fragment: String },

    #[error("{operation}: unhandled HTTP verb `{verb}`")]
    UnhandledVerb { operation: String, verb: String },

    /// A resource-operations marker pointing at a path/verb that `paths` lacks.
    #[error("{service}: marker `{method}` points at missing operation {verb} {path}")]
    MissingOperation {
        service: String,
        method: String,
        verb: String,
        path: String,
    },

    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("jq filter failed: {0}")]
    Filter(String),

    #[error("failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GeneratorError {
    pub(crate) fn shape(
        owner: impl Into<String>,
        property: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::UnhandledPropertyShape {
            owner: owner.into(),
            property: property.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn unresolvable(owner: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::UnresolvableReference {
            owner: owner.into(),
            reference: reference.into(),
        }
    }
}
