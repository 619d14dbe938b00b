//! Canonical view of one raw schema node.
//!
//! Extraction is total: any JSON value yields a descriptor, unknown or
//! malformed keys simply fall back to the defaults.
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::enums;
use crate::ir::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl TypeTag {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(TypeTag::String),
            "integer" => Some(TypeTag::Integer),
            "number" => Some(TypeTag::Number),
            "boolean" => Some(TypeTag::Boolean),
            "array" => Some(TypeTag::Array),
            "object" => Some(TypeTag::Object),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Integer => "integer",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }

    pub fn scalar(self) -> Option<Scalar> {
        match self {
            TypeTag::String => Some(Scalar::String),
            TypeTag::Integer => Some(Scalar::Integer),
            TypeTag::Number => Some(Scalar::Number),
            TypeTag::Boolean => Some(Scalar::Boolean),
            TypeTag::Array | TypeTag::Object => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDescriptor {
    pub type_tag: Option<TypeTag>,
    pub nullable: bool,
    pub description: Option<String>,
    pub enum_literals: Option<Vec<String>>,
    pub alternatives: Option<Vec<PropertyDescriptor>>,
    pub items: Option<Box<PropertyDescriptor>>,
    /// schema name the `$ref` points at (last path segment)
    pub ref_target: Option<String>,
    pub properties: Option<IndexMap<String, PropertyDescriptor>>,
    pub required: IndexSet<String>,
}

/// The one key that decides how a node is resolved, in precedence order.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'a> {
    ExplicitEnum(&'a [String]),
    DescribedEnum(Vec<String>),
    Alternatives(&'a [PropertyDescriptor]),
    Array(Option<&'a PropertyDescriptor>),
    StringMap,
    Reference(&'a str),
    /// scalar whose description reads like an enumeration the strict pattern
    /// could not parse; such properties are skipped
    EnumLikeScalar,
    Scalar(Scalar),
    Unresolved,
}

impl PropertyDescriptor {
    pub fn shape(&self) -> Shape<'_> {
        if let Some(literals) = enums::from_explicit(self) {
            return Shape::ExplicitEnum(literals);
        }
        let description = self.description.as_deref();
        if let Some(literals) = description.and_then(enums::from_description) {
            return Shape::DescribedEnum(literals);
        }
        if let Some(alternatives) = &self.alternatives {
            return Shape::Alternatives(alternatives);
        }
        match self.type_tag {
            Some(TypeTag::Array) => return Shape::Array(self.items.as_deref()),
            Some(TypeTag::Object) if self.is_bare_object() => return Shape::StringMap,
            _ => {}
        }
        if let Some(target) = &self.ref_target {
            return Shape::Reference(target);
        }
        match self.type_tag.and_then(TypeTag::scalar) {
            Some(_) if description.is_some_and(enums::looks_enumerated) => Shape::EnumLikeScalar,
            Some(scalar) => Shape::Scalar(scalar),
            None => Shape::Unresolved,
        }
    }

    fn is_bare_object(&self) -> bool {
        self.ref_target.is_none() && self.properties.as_ref().is_none_or(IndexMap::is_empty)
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.contains(property)
    }
}

pub fn extract(node: &Value) -> PropertyDescriptor {
    let Some(map) = node.as_object() else {
        return PropertyDescriptor::default();
    };

    let (type_tag, null_in_type) = match map.get("type") {
        Some(Value::String(tag)) => (TypeTag::parse(tag), false),
        // OpenAPI 3.1 style: `["string", "null"]`
        Some(Value::Array(tags)) => {
            let tags: Vec<&str> = tags.iter().filter_map(Value::as_str).collect();
            let tag = tags.iter().copied().filter(|t| *t != "null").find_map(TypeTag::parse);
            (tag, tags.contains(&"null"))
        }
        _ => (None, false),
    };

    let nullable = null_in_type || map.get("nullable").and_then(Value::as_bool).unwrap_or(false);

    let description = map
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    let enum_literals = map.get("enum").and_then(Value::as_array).map(|xs| {
        xs.iter()
            .filter_map(|x| match x {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect::<Vec<_>>()
    });

    let alternatives = map
        .get("anyOf")
        .or_else(|| map.get("oneOf"))
        .and_then(Value::as_array)
        .map(|xs| xs.iter().map(extract).collect::<Vec<_>>());

    let items = map
        .get("items")
        .filter(|v| v.is_object())
        .map(|v| Box::new(extract(v)));

    let ref_target = map
        .get("$ref")
        .and_then(Value::as_str)
        .map(|r| r.rsplit('/').next().unwrap_or(r).to_string());

    let properties = map.get("properties").and_then(Value::as_object).map(|props| {
        props
            .iter()
            .map(|(k, v)| (k.clone(), extract(v)))
            .collect::<IndexMap<_, _>>()
    });

    let required = map
        .get("required")
        .and_then(Value::as_array)
        .map(|xs| {
            xs.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<IndexSet<_>>()
        })
        .unwrap_or_default();

    PropertyDescriptor {
        type_tag,
        nullable,
        description,
        enum_literals,
        alternatives,
        items,
        ref_target,
        properties,
        required,
    }
}
