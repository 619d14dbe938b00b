// Resolved models for codegen. No serde_json::Value here; everything is named
// and ordered by the time it lands in these types.

// ————————————————————————————————————————————————————————————————————————————
// TYPE DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    String,
    Integer,
    Number,
    Boolean,
}

/// How a field, variant or list item refers to its type. Named types are
/// referenced by normalized name only; declarations may appear in any order.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Scalar(Scalar),
    Named(String),
    List(Box<TypeRef>),
    /// string-keyed string map (`type: object` without structure)
    StringMap,
    /// synthetic catch-all for records without resolvable properties
    PropertyBag,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// UpperCamel normalized name (`Amount`).
    pub name: String,
    pub ty: TypeRef,
    pub optional: bool,
    /// original property name, kept when it differs from `name`
    pub wire_name: Option<String>,
    pub description: Option<String>,
}

impl Field {
    pub fn wire(&self) -> &str {
        self.wire_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: String,
    /// wire tag: the scalar type literal (`"string"`) or the referenced type name
    pub tag: String,
    pub payload: TypeRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub literals: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Record,
    Union,
    Enum,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NamedType {
    Record(RecordType),
    Union(UnionType),
    Enum(EnumType),
}

impl NamedType {
    pub fn name(&self) -> &str {
        match self {
            NamedType::Record(r) => &r.name,
            NamedType::Union(u) => &u.name,
            NamedType::Enum(e) => &e.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            NamedType::Record(r) => r.description.as_deref(),
            NamedType::Union(u) => u.description.as_deref(),
            NamedType::Enum(e) => e.description.as_deref(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            NamedType::Record(_) => TypeKind::Record,
            NamedType::Union(_) => TypeKind::Union,
            NamedType::Enum(_) => TypeKind::Enum,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SERVICES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Delete,
}

impl HttpVerb {
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.to_ascii_lowercase().as_str() {
            "get" => Some(HttpVerb::Get),
            "post" => Some(HttpVerb::Post),
            "delete" => Some(HttpVerb::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Delete => "DELETE",
        }
    }
}

/// The runtime client call a generated operation ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Get,
    GetWithParameters,
    PostWithoutBody,
    PostWithBody,
    Delete,
}

impl Invocation {
    pub fn select(verb: HttpVerb, has_form_parameters: bool) -> Self {
        match (verb, has_form_parameters) {
            (HttpVerb::Get, true) => Invocation::GetWithParameters,
            (HttpVerb::Get, false) => Invocation::Get,
            (HttpVerb::Post, false) => Invocation::PostWithoutBody,
            (HttpVerb::Post, true) => Invocation::PostWithBody,
            (HttpVerb::Delete, _) => Invocation::Delete,
        }
    }

    pub fn takes_body(self) -> bool {
        matches!(self, Invocation::GetWithParameters | Invocation::PostWithBody)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Scalar(Scalar),
    /// array parameter; sent as a comma-joined string list
    List,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub wire_name: String,
    /// escaped snake_case identifier (`r#type`)
    pub name: String,
    pub required: bool,
    pub ty: ParamType,
    pub location: ParamLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseType {
    Single(String),
    /// list envelope whose `data` items are the named type
    List(String),
}

impl ResponseType {
    pub fn type_name(&self) -> &str {
        match self {
            ResponseType::Single(name) | ResponseType::List(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// UpperCamel generated name (`Create`, `ListForAccount`)
    pub method_name: String,
    pub verb: HttpVerb,
    pub path: String,
    pub description: Option<String>,
    /// required first, then optional; source order within each group
    pub parameters: Vec<Parameter>,
    pub invocation: Invocation,
    pub response: ResponseType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceGroup {
    /// `ChargeService`
    pub name: String,
    /// normalized name of the owning schema (`Charge`)
    pub resource: String,
    pub operations: Vec<Operation>,
}
