//! Resource-operation markers + paths → per-resource service groups.
use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::document::SchemaDocument;
use crate::error::{GeneratorError, Result};
use crate::ir::{
    HttpVerb, Invocation, Operation, ParamLocation, ParamType, Parameter, ResponseType, ServiceGroup,
};
use crate::lower::TypeNames;
use crate::naming::{self, Case};
use crate::property::{self, TypeTag};

const SERVICE_TARGET: &str = "service";
const FORM_PROPERTIES: &str = "/requestBody/content/application~1x-www-form-urlencoded/schema/properties";
const JSON_RESPONSE: &str = "/responses/200/content/application~1json/schema";

/// One entry of a schema's resource-operations marker array.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationMarker {
    pub method_name: String,
    pub method_on: String,
    pub operation: String,
    pub path: String,
}

pub struct ServiceModelBuilder<'a> {
    doc: &'a SchemaDocument,
    config: &'a GeneratorConfig,
    names: &'a TypeNames,
}

impl<'a> ServiceModelBuilder<'a> {
    pub fn new(doc: &'a SchemaDocument, config: &'a GeneratorConfig, names: &'a TypeNames) -> Self {
        Self { doc, config, names }
    }

    pub fn build(&self) -> Result<Vec<ServiceGroup>> {
        let mut groups = Vec::new();
        for (raw, node) in &self.doc.schemas {
            let Some(markers) = node.get(&self.config.operations_marker).and_then(Value::as_array) else {
                continue;
            };
            let resource = self
                .names
                .schema(raw)
                .map(str::to_string)
                .unwrap_or_else(|| naming::type_name(raw));
            let service = format!("{resource}Service");

            let mut operations: Vec<Operation> = Vec::new();
            let mut method_names: HashSet<String> = HashSet::new();
            for marker in markers {
                let marker: OperationMarker =
                    serde_json::from_value(marker.clone()).map_err(|e| {
                        GeneratorError::InvalidDocument(format!(
                            "{raw}: malformed `{}` entry: {e}",
                            self.config.operations_marker
                        ))
                    })?;
                if marker.method_on != SERVICE_TARGET {
                    continue;
                }
                let mut operation = self.operation(&service, &resource, &marker)?;
                let base = operation.method_name.clone();
                let mut n = 2;
                while !method_names.insert(operation.method_name.clone()) {
                    operation.method_name = format!("{base}{n}");
                    n += 1;
                }
                operations.push(operation);
            }

            if operations.is_empty() {
                debug!(schema = %raw, "no service operations");
                continue;
            }
            debug!(%service, operations = operations.len(), "service resolved");
            groups.push(ServiceGroup {
                name: service,
                resource,
                operations,
            });
        }
        info!(services = groups.len(), "service model built");
        Ok(groups)
    }

    fn operation(&self, service: &str, resource: &str, marker: &OperationMarker) -> Result<Operation> {
        let node = self
            .doc
            .operation(&marker.path, &marker.operation)
            .ok_or_else(|| GeneratorError::MissingOperation {
                service: service.to_string(),
                method: marker.method_name.clone(),
                verb: marker.operation.clone(),
                path: marker.path.clone(),
            })?;

        let method_name = method_name(resource, &marker.method_name, &marker.path);
        let label = format!(
            "{service}.{method_name} ({} {})",
            marker.operation.to_uppercase(),
            marker.path
        );

        let parameters = self.parameters(&label, node)?;
        let has_form = has_form_parameters(node);
        let response = self.response_type(&label, node)?;
        let verb = HttpVerb::parse(&marker.operation).ok_or_else(|| GeneratorError::UnhandledVerb {
            operation: label.clone(),
            verb: marker.operation.clone(),
        })?;

        Ok(Operation {
            method_name,
            verb,
            path: marker.path.clone(),
            description: node.get("description").and_then(Value::as_str).map(str::to_string),
            parameters,
            invocation: Invocation::select(verb, has_form),
            response,
        })
    }

    fn parameters(&self, label: &str, node: &Value) -> Result<Vec<Parameter>> {
        let mut parameters = Vec::new();
        for raw in node.get("parameters").and_then(Value::as_array).into_iter().flatten() {
            let wire_name = raw
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| GeneratorError::InvalidDocument(format!("{label}: parameter without a name")))?;
            let location = match raw.get("in").and_then(Value::as_str) {
                Some("path") => ParamLocation::Path,
                None | Some("query") => ParamLocation::Query,
                Some(other) => {
                    debug!(operation = %label, parameter = %wire_name, location = %other, "skipping parameter");
                    continue;
                }
            };
            // path segments cannot be left out
            let required = location == ParamLocation::Path
                || raw.get("required").and_then(Value::as_bool).unwrap_or(false);
            let ty = param_type(raw.get("schema").unwrap_or(&Value::Null))
                .ok_or_else(|| GeneratorError::shape(label, wire_name, "parameter schema without a usable type"))?;

            parameters.push(Parameter {
                wire_name: wire_name.to_string(),
                name: naming::escape_identifier(wire_name, Case::Snake).ident,
                required,
                ty,
                location,
            });
        }
        // stable: source order survives inside each partition
        parameters.sort_by_key(|p| !p.required);
        Ok(parameters)
    }

    fn response_type(&self, label: &str, node: &Value) -> Result<ResponseType> {
        let unhandled = |fragment: &str| GeneratorError::UnhandledResponseType {
            operation: label.to_string(),
            fragment: fragment.to_string(),
        };
        let schema = node
            .pointer(JSON_RESPONSE)
            .ok_or_else(|| unhandled("responses.200.content[application/json].schema (absent)"))?;
        let desc = property::extract(schema);

        if let Some(target) = &desc.ref_target {
            return Ok(ResponseType::Single(self.names.resolve(label, target)?.to_string()));
        }
        let first_alternative = desc
            .alternatives
            .as_ref()
            .and_then(|alternatives| alternatives.first())
            .and_then(|first| first.ref_target.as_ref());
        if let Some(target) = first_alternative {
            return Ok(ResponseType::Single(self.names.resolve(label, target)?.to_string()));
        }
        let list_item = desc
            .properties
            .as_ref()
            .and_then(|props| props.get("data"))
            .and_then(|data| data.items.as_ref())
            .and_then(|items| items.ref_target.as_ref());
        if let Some(target) = list_item {
            return Ok(ResponseType::List(self.names.resolve(label, target)?.to_string()));
        }
        Err(unhandled("responses.200 schema (no $ref, anyOf[0].$ref or data.items.$ref)"))
    }
}

/// `method` when the resource owns the path root, `{method}For{Root}` when the
/// path belongs to another resource.
pub fn method_name(resource: &str, method: &str, path: &str) -> String {
    let base = naming::to_upper_camel(method);
    let root = path_root(path);
    if root.is_empty() || resource.starts_with(&root) {
        base
    } else {
        format!("{base}For{root}")
    }
}

/// First segment after the version (`/v1/charges/{charge}` → `Charge`),
/// normalized and singularized.
pub fn path_root(path: &str) -> String {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let first = segments.next().unwrap_or_default();
    let is_version = first.len() > 1
        && first.starts_with('v')
        && first[1..].chars().all(|c| c.is_ascii_digit());
    let segment = if is_version {
        segments.next().unwrap_or_default()
    } else {
        first
    };
    if segment.is_empty() || segment.starts_with('{') {
        return String::new();
    }
    let mut root = naming::type_name(segment);
    if root.ends_with('s') && !root.ends_with("ss") {
        root.pop();
    }
    root
}

fn has_form_parameters(node: &Value) -> bool {
    node.pointer(FORM_PROPERTIES)
        .and_then(Value::as_object)
        .is_some_and(|props| !props.is_empty())
}

/// The schema's own type if it has one, else the first non-object `anyOf` type.
fn param_type(schema: &Value) -> Option<ParamType> {
    let desc = property::extract(schema);
    let from_tag = |tag: TypeTag| match tag {
        TypeTag::Array => Some(ParamType::List),
        TypeTag::Object => None,
        scalar => scalar.scalar().map(ParamType::Scalar),
    };
    desc.type_tag.and_then(from_tag).or_else(|| {
        desc.alternatives
            .iter()
            .flatten()
            .filter_map(|alternative| alternative.type_tag)
            .find(|tag| *tag != TypeTag::Object)
            .and_then(from_tag)
    })
}
