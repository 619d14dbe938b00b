//! Named types → one Rust module of serde declarations.
use std::collections::HashSet;

use crate::codegen::{Codegen, GENERATED_MARKER, GroupPosition, TypeTable, quoted};
use crate::config::GeneratorConfig;
use crate::ir::{EnumType, Field, NamedType, RecordType, Scalar, TypeRef, UnionType};
use crate::naming::{self, Case};

const DEFAULT_MODULE_DOC: &str = "API data types.";

pub fn render(types: &[NamedType], config: &GeneratorConfig) -> String {
    let table = TypeTable::new(types);
    let mut cg = Codegen::new();
    for (index, ty) in types.iter().enumerate() {
        match GroupPosition::of(index) {
            GroupPosition::Opening => prelude(&mut cg, types, config),
            GroupPosition::Continuation => cg.blank(),
        }
        if let Some(description) = ty.description() {
            cg.doc_comment(0, description);
        }
        match ty {
            NamedType::Record(r) => record(&mut cg, r, &table),
            NamedType::Union(u) => union(&mut cg, u, &table),
            NamedType::Enum(e) => enumeration(&mut cg, e),
        }
    }
    cg.into_string()
}

fn prelude(cg: &mut Codegen, types: &[NamedType], config: &GeneratorConfig) {
    cg.line(0, GENERATED_MARKER);
    cg.module_doc(config.types_module_doc.as_deref().unwrap_or(DEFAULT_MODULE_DOC));
    cg.blank();
    if types.iter().any(uses_map) {
        cg.line(0, "use std::collections::HashMap;");
        cg.blank();
    }
    cg.line(0, "use serde::{Deserialize, Serialize};");
    cg.blank();
}

fn uses_map(ty: &NamedType) -> bool {
    fn in_ref(ty: &TypeRef) -> bool {
        match ty {
            TypeRef::StringMap | TypeRef::PropertyBag => true,
            TypeRef::List(inner) => in_ref(inner),
            TypeRef::Scalar(_) | TypeRef::Named(_) => false,
        }
    }
    match ty {
        NamedType::Record(r) => r.fields.iter().any(|f| in_ref(&f.ty)),
        NamedType::Union(u) => u.variants.iter().any(|v| in_ref(&v.payload)),
        NamedType::Enum(_) => false,
    }
}

pub fn scalar_type(scalar: Scalar) -> &'static str {
    match scalar {
        Scalar::String => "String",
        Scalar::Integer => "i64",
        Scalar::Number => "f64",
        Scalar::Boolean => "bool",
    }
}

/// `direct` is false inside containers, which already provide indirection.
pub fn rust_type(ty: &TypeRef, table: &TypeTable<'_>, direct: bool) -> String {
    match ty {
        TypeRef::Scalar(scalar) => scalar_type(*scalar).to_string(),
        TypeRef::Named(name) if direct && table.needs_box(name) => format!("Box<{name}>"),
        TypeRef::Named(name) => name.clone(),
        TypeRef::List(inner) => format!("Vec<{}>", rust_type(inner, table, false)),
        TypeRef::StringMap => "HashMap<String, String>".to_string(),
        TypeRef::PropertyBag => "HashMap<String, serde_json::Value>".to_string(),
    }
}

fn record(cg: &mut Codegen, record: &RecordType, table: &TypeTable<'_>) {
    cg.line(0, "#[derive(Debug, Clone, Serialize, Deserialize)]");
    cg.line(0, format!("pub struct {} {{", record.name));
    let mut members: HashSet<String> = HashSet::new();
    for field in &record.fields {
        record_field(cg, field, table, &mut members);
    }
    cg.line(0, "}");
}

fn record_field(cg: &mut Codegen, field: &Field, table: &TypeTable<'_>, members: &mut HashSet<String>) {
    if let Some(description) = &field.description {
        cg.doc_comment(1, description);
    }
    if field.ty == TypeRef::PropertyBag {
        cg.line(1, "#[serde(flatten)]");
        cg.line(1, format!("pub properties: {},", rust_type(&field.ty, table, true)));
        return;
    }

    let member = naming::escape_identifier(&field.name, Case::Snake);
    // distinct camel names can share a snake rendering (`UrlPath`, `URLPath`)
    let mut ident = member.ident.clone();
    let mut n = 2;
    while !members.insert(ident.clone()) {
        ident = format!("{}{n}", member.bare());
        n += 1;
    }
    let mut attrs: Vec<String> = Vec::new();
    if ident.trim_start_matches("r#") != field.wire() {
        attrs.push(format!("rename = {}", quoted(field.wire())));
    }
    let mut ty = rust_type(&field.ty, table, true);
    if field.optional {
        attrs.push("default".to_string());
        attrs.push("skip_serializing_if = \"Option::is_none\"".to_string());
        ty = format!("Option<{ty}>");
    }
    if !attrs.is_empty() {
        cg.line(1, format!("#[serde({})]", attrs.join(", ")));
    }
    cg.line(1, format!("pub {ident}: {ty},"));
}

fn union(cg: &mut Codegen, union: &UnionType, table: &TypeTable<'_>) {
    cg.line(0, "#[derive(Debug, Clone, Serialize, Deserialize)]");
    cg.line(0, "#[serde(untagged)]");
    cg.line(0, format!("pub enum {} {{", union.name));
    for variant in &union.variants {
        cg.line(1, format!("{}({}),", variant.name, rust_type(&variant.payload, table, true)));
    }
    cg.line(0, "}");
    cg.blank();
    cg.line(0, format!("impl {} {{", union.name));
    cg.line(1, "/// Wire tag of the active variant.");
    cg.line(1, "pub fn tag(&self) -> &'static str {");
    cg.line(2, "match self {");
    for variant in &union.variants {
        cg.line(3, format!("Self::{}(_) => {},", variant.name, quoted(&variant.tag)));
    }
    cg.line(2, "}");
    cg.line(1, "}");
    cg.line(0, "}");
}

fn enumeration(cg: &mut Codegen, enumeration: &EnumType) {
    cg.line(0, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]");
    cg.line(0, format!("pub enum {} {{", enumeration.name));
    let mut seen: HashSet<String> = HashSet::new();
    for literal in &enumeration.literals {
        let name = naming::escape_identifier(literal, Case::UpperCamel);
        let mut ident = name.ident.clone();
        let mut n = 2;
        while !seen.insert(ident.clone()) {
            ident = format!("{}{n}", name.bare());
            n += 1;
        }
        if ident.trim_start_matches("r#") != literal {
            cg.line(1, format!("#[serde(rename = {})]", quoted(literal)));
        }
        cg.line(1, format!("{ident},"));
    }
    cg.line(0, "}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Variant;

    fn charge() -> NamedType {
        NamedType::Record(RecordType {
            name: "Charge".into(),
            description: Some("A charge.\nSecond line.".into()),
            fields: vec![
                Field {
                    name: "Amount".into(),
                    ty: TypeRef::Scalar(Scalar::Integer),
                    optional: false,
                    wire_name: Some("amount".into()),
                    description: Some("Amount in cents.".into()),
                },
                Field {
                    name: "Currency".into(),
                    ty: TypeRef::Scalar(Scalar::String),
                    optional: true,
                    wire_name: Some("currency".into()),
                    description: None,
                },
                Field {
                    name: "Type".into(),
                    ty: TypeRef::Named("ChargeType".into()),
                    optional: false,
                    wire_name: Some("type".into()),
                    description: None,
                },
                Field {
                    name: "Num3dSecure".into(),
                    ty: TypeRef::Named("Card".into()),
                    optional: true,
                    wire_name: Some("3d_secure".into()),
                    description: None,
                },
            ],
        })
    }

    fn card() -> NamedType {
        NamedType::Record(RecordType {
            name: "Card".into(),
            description: None,
            fields: vec![Field {
                name: "Properties".into(),
                ty: TypeRef::PropertyBag,
                optional: false,
                wire_name: None,
                description: None,
            }],
        })
    }

    fn charge_type() -> NamedType {
        NamedType::Enum(EnumType {
            name: "ChargeType".into(),
            description: None,
            literals: vec!["charge".into(), "en-US".into(), "".into()],
        })
    }

    #[test]
    fn renders_one_group_with_a_single_prelude() {
        let text = render(&[charge(), charge_type(), card()], &GeneratorConfig::default());
        assert!(text.starts_with(GENERATED_MARKER));
        assert_eq!(text.matches("use serde::{Deserialize, Serialize};").count(), 1);
        assert_eq!(text.matches("use std::collections::HashMap;").count(), 1);
        let charge_at = text.find("pub struct Charge {").unwrap();
        let enum_at = text.find("pub enum ChargeType {").unwrap();
        let card_at = text.find("pub struct Card {").unwrap();
        assert!(charge_at < enum_at && enum_at < card_at);
    }

    #[test]
    fn record_fields_render_with_serde_attributes() {
        let text = render(&[charge(), charge_type(), card()], &GeneratorConfig::default());
        let expected = "\
/// A charge.
/// Second line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    /// Amount in cents.
    pub amount: i64,
    #[serde(default, skip_serializing_if = \"Option::is_none\")]
    pub currency: Option<String>,
    pub r#type: ChargeType,
    #[serde(rename = \"3d_secure\", default, skip_serializing_if = \"Option::is_none\")]
    pub num3d_secure: Option<Box<Card>>,
}
";
        assert!(text.contains(expected), "{text}");
        assert!(text.contains("    #[serde(flatten)]\n    pub properties: HashMap<String, serde_json::Value>,\n"));
    }

    #[test]
    fn enum_literals_are_preserved() {
        let text = render(&[charge_type()], &GeneratorConfig::default());
        let expected = "\
pub enum ChargeType {
    #[serde(rename = \"charge\")]
    Charge,
    #[serde(rename = \"en-US\")]
    EnUS,
    #[serde(rename = \"\")]
    Empty,
}
";
        assert!(text.contains(expected), "{text}");
        assert!(!text.contains("HashMap"));
    }

    #[test]
    fn unions_are_untagged_and_expose_their_tags() {
        let union = NamedType::Union(UnionType {
            name: "ChargeCustomerDU".into(),
            description: None,
            variants: vec![
                Variant {
                    name: "String".into(),
                    tag: "string".into(),
                    payload: TypeRef::Scalar(Scalar::String),
                },
                Variant {
                    name: "Card".into(),
                    tag: "Card".into(),
                    payload: TypeRef::Named("Card".into()),
                },
            ],
        });
        let text = render(&[union, card()], &GeneratorConfig::default());
        let expected = "\
#[serde(untagged)]
pub enum ChargeCustomerDU {
    String(String),
    Card(Box<Card>),
}

impl ChargeCustomerDU {
    /// Wire tag of the active variant.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::String(_) => \"string\",
            Self::Card(_) => \"Card\",
        }
    }
}
";
        assert!(text.contains(expected), "{text}");
    }

    #[test]
    fn lists_of_records_are_not_boxed() {
        let types = [card()];
        let table = TypeTable::new(&types);
        let list = TypeRef::List(Box::new(TypeRef::Named("Card".into())));
        assert_eq!(rust_type(&list, &table, true), "Vec<Card>");
        assert_eq!(rust_type(&TypeRef::Named("ChargeType".into()), &table, true), "ChargeType");
    }

    #[test]
    fn nothing_to_render_is_empty_text() {
        assert_eq!(render(&[], &GeneratorConfig::default()), "");
    }
}
