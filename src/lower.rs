//! Lowering: raw document → resolved declaration lists.
//!
//! Both builders walk the document in order and stop at the first error.
pub mod services;
pub mod types;

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::config::GeneratorConfig;
use crate::document::SchemaDocument;
use crate::error::{GeneratorError, Result};
use crate::ir::{NamedType, ServiceGroup};
use crate::naming;

/// Normalized type names, claimed up front for every schema entry so a
/// synthesized name never takes one a later schema needs.
#[derive(Debug, Clone, Default)]
pub struct TypeNames {
    by_schema: IndexMap<String, String>,
    claimed: HashSet<String>,
}

impl TypeNames {
    pub fn for_document(doc: &SchemaDocument) -> Self {
        let mut names = Self::default();
        for raw in doc.schemas.keys() {
            let name = names.claim(naming::type_name(raw), "");
            names.by_schema.insert(raw.clone(), name);
        }
        names
    }

    /// Name of a schema entry; `None` when the document has no such entry.
    pub fn schema(&self, raw: &str) -> Option<&str> {
        self.by_schema.get(raw).map(String::as_str)
    }

    /// Resolve a `$ref` target, failing with `UnresolvableReference`.
    pub fn resolve(&self, owner: &str, target: &str) -> Result<&str> {
        self.schema(target)
            .ok_or_else(|| GeneratorError::unresolvable(owner, target))
    }

    /// Claim `wanted`, or the first free of `{wanted}{suffix}`,
    /// `{wanted}{suffix}2`, `{wanted}{suffix}3`, ...
    pub fn claim(&mut self, wanted: String, suffix: &str) -> String {
        if self.claimed.insert(wanted.clone()) {
            return wanted;
        }
        let base = format!("{wanted}{suffix}");
        if !suffix.is_empty() && self.claimed.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}{n}");
            if self.claimed.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    pub types: Vec<NamedType>,
    pub services: Vec<ServiceGroup>,
}

pub fn lower_types(doc: &SchemaDocument, config: &GeneratorConfig) -> Result<Vec<NamedType>> {
    let mut names = TypeNames::for_document(doc);
    types::TypeModelBuilder::new(doc, config, &mut names).build()
}

pub fn lower_services(doc: &SchemaDocument, config: &GeneratorConfig) -> Result<Vec<ServiceGroup>> {
    let names = TypeNames::for_document(doc);
    services::ServiceModelBuilder::new(doc, config, &names).build()
}

pub fn lower_document(doc: &SchemaDocument, config: &GeneratorConfig) -> Result<Model> {
    let mut names = TypeNames::for_document(doc);
    let types = types::TypeModelBuilder::new(doc, config, &mut names).build()?;
    let services = services::ServiceModelBuilder::new(doc, config, &names).build()?;
    Ok(Model { types, services })
}
