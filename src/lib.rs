//! Schema-driven source generation: an OpenAPI-style JSON document in, Rust
//! type declarations and per-resource service definitions out.
//!
//! The two pipelines are independent. Each one lowers the document into a
//! resolved model ([`ir`]) and renders that model as text ([`codegen`]); the
//! first failure aborts the run.
pub mod codegen;
pub mod config;
pub mod document;
pub mod enums;
pub mod error;
pub mod ir;
pub mod jq_exec;
pub mod lower;
pub mod naming;
pub mod path_de;
pub mod property;

use tracing::info;

pub use config::{GeneratorConfig, OptionalityRule};
pub use document::SchemaDocument;
pub use error::{GeneratorError, Result};

/// Output of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSources {
    pub types: String,
    pub services: String,
}

/// Run both pipelines. Nothing is returned unless both succeed.
pub fn generate(doc: &SchemaDocument, config: &GeneratorConfig) -> Result<GeneratedSources> {
    let model = lower::lower_document(doc, config)?;
    let sources = GeneratedSources {
        types: codegen::types::render(&model.types, config),
        services: codegen::services::render(&model.services, config),
    };
    info!(
        types_bytes = sources.types.len(),
        services_bytes = sources.services.len(),
        "rendered sources"
    );
    Ok(sources)
}

pub fn generate_types(doc: &SchemaDocument, config: &GeneratorConfig) -> Result<String> {
    let types = lower::lower_types(doc, config)?;
    Ok(codegen::types::render(&types, config))
}

pub fn generate_services(doc: &SchemaDocument, config: &GeneratorConfig) -> Result<String> {
    let services = lower::lower_services(doc, config)?;
    Ok(codegen::services::render(&services, config))
}

/// [`generate`] over raw document text.
pub fn generate_from_str(src: &str, config: &GeneratorConfig) -> Result<GeneratedSources> {
    generate(&SchemaDocument::from_json_str(src)?, config)
}
