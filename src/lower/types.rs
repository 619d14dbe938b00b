//! Schema entries → named record / union / enum declarations.
use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::document::SchemaDocument;
use crate::enums;
use crate::error::{GeneratorError, Result};
use crate::ir::{EnumType, Field, NamedType, RecordType, TypeRef, UnionType, Variant};
use crate::lower::TypeNames;
use crate::naming::{self, Case};
use crate::property::{self, PropertyDescriptor, Shape, TypeTag};

/// Name of the synthetic field standing in for an empty property bag.
const PROPERTY_BAG_FIELD: &str = "Properties";

pub struct TypeModelBuilder<'a> {
    doc: &'a SchemaDocument,
    config: &'a GeneratorConfig,
    names: &'a mut TypeNames,
    out: Vec<NamedType>,
}

/// Where a property sits, for naming nested types and for error messages.
struct Site<'s> {
    /// normalized owner type name
    owner: &'s str,
    /// raw schema key, reported in errors
    schema: &'s str,
    /// raw property name
    property: &'s str,
    /// UpperCamel property name, used for nested type names
    field: &'s str,
}

impl Site<'_> {
    fn label(&self) -> String {
        format!("{}.{}", self.schema, self.property)
    }
}

impl<'a> TypeModelBuilder<'a> {
    pub fn new(doc: &'a SchemaDocument, config: &'a GeneratorConfig, names: &'a mut TypeNames) -> Self {
        Self {
            doc,
            config,
            names,
            out: Vec::new(),
        }
    }

    pub fn build(mut self) -> Result<Vec<NamedType>> {
        let doc = self.doc;
        for (raw, node) in &doc.schemas {
            let name = self
                .names
                .schema(raw)
                .map(str::to_string)
                .unwrap_or_else(|| naming::type_name(raw));
            debug!(schema = %raw, %name, "resolving schema");
            let desc = property::extract(node);
            self.schema_entry(raw, name, &desc)?;
        }
        info!(declarations = self.out.len(), "type model built");
        Ok(self.out)
    }

    fn schema_entry(&mut self, raw: &str, name: String, desc: &PropertyDescriptor) -> Result<()> {
        if let Some(literals) = &desc.enum_literals {
            self.out.push(NamedType::Enum(EnumType {
                name,
                description: desc.description.clone(),
                literals: literals.clone(),
            }));
            return Ok(());
        }
        if let Some(alternatives) = &desc.alternatives {
            let variants = self.variants(raw, raw, alternatives)?;
            self.out.push(NamedType::Union(UnionType {
                name,
                description: desc.description.clone(),
                variants,
            }));
            return Ok(());
        }
        let mut nested = Vec::new();
        let record = self.record(raw, name, desc, &mut nested)?;
        self.out.push(NamedType::Record(record));
        self.out.extend(nested);
        Ok(())
    }

    fn record(
        &mut self,
        raw: &str,
        name: String,
        desc: &PropertyDescriptor,
        nested: &mut Vec<NamedType>,
    ) -> Result<RecordType> {
        let mut fields: Vec<Field> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (property, prop) in desc.properties.iter().flatten() {
            let escaped = naming::escape_identifier(property, Case::UpperCamel);
            let site = Site {
                owner: &name,
                schema: raw,
                property,
                field: escaped.bare(),
            };
            let Some(ty) = self.field_type(&site, prop, nested)? else {
                continue;
            };

            let mut field_name = escaped.bare().to_string();
            let mut n = 2;
            while !seen.insert(field_name.clone()) {
                field_name = format!("{}{n}", escaped.bare());
                n += 1;
            }

            let optional = self
                .config
                .optionality
                .is_optional(prop.nullable, desc.is_required(property));
            fields.push(Field {
                wire_name: (field_name != *property).then(|| property.clone()),
                name: field_name,
                ty,
                optional,
                description: prop.description.clone(),
            });
        }

        if fields.is_empty() {
            fields.push(Field {
                name: PROPERTY_BAG_FIELD.to_string(),
                ty: TypeRef::PropertyBag,
                optional: false,
                wire_name: None,
                description: None,
            });
        }

        Ok(RecordType {
            name,
            description: desc.description.clone(),
            fields,
        })
    }

    /// `Ok(None)` means the property is deliberately left out.
    fn field_type(
        &mut self,
        site: &Site<'_>,
        prop: &PropertyDescriptor,
        nested: &mut Vec<NamedType>,
    ) -> Result<Option<TypeRef>> {
        let ty = match prop.shape() {
            Shape::ExplicitEnum(literals) => self.nested_enum(site, prop, literals.to_vec(), nested),
            Shape::DescribedEnum(literals) => self.nested_enum(site, prop, literals, nested),
            Shape::Alternatives(alternatives) => {
                self.nested_union(site, prop.description.clone(), alternatives, nested)?
            }
            Shape::Array(item) => TypeRef::List(Box::new(self.list_item(site, item, nested)?)),
            Shape::StringMap => TypeRef::StringMap,
            Shape::Reference(target) => TypeRef::Named(self.names.resolve(&site.label(), target)?.to_string()),
            Shape::EnumLikeScalar => {
                debug!(property = %site.label(), "skipping scalar with unparsed enumeration");
                return Ok(None);
            }
            Shape::Scalar(scalar) => TypeRef::Scalar(scalar),
            Shape::Unresolved => {
                warn!(property = %site.label(), "omitting property without a resolvable shape");
                return Ok(None);
            }
        };
        Ok(Some(ty))
    }

    fn list_item(
        &mut self,
        site: &Site<'_>,
        item: Option<&PropertyDescriptor>,
        nested: &mut Vec<NamedType>,
    ) -> Result<TypeRef> {
        let Some(item) = item else {
            return Err(GeneratorError::shape(site.schema, site.property, "array without `items`"));
        };
        if let Some(target) = &item.ref_target {
            return Ok(TypeRef::Named(self.names.resolve(&site.label(), target)?.to_string()));
        }
        if let Some(literals) = enums::resolve(item) {
            return Ok(self.nested_enum(site, item, literals, nested));
        }
        if let Some(scalar) = item.type_tag.and_then(TypeTag::scalar) {
            return Ok(TypeRef::Scalar(scalar));
        }
        if let Some(alternatives) = &item.alternatives {
            return self.nested_union(site, item.description.clone(), alternatives, nested);
        }
        let found = item.type_tag.map(TypeTag::as_str).unwrap_or("untyped");
        Err(GeneratorError::shape(
            site.schema,
            site.property,
            format!("unsupported array item shape ({found})"),
        ))
    }

    fn nested_enum(
        &mut self,
        site: &Site<'_>,
        prop: &PropertyDescriptor,
        literals: Vec<String>,
        nested: &mut Vec<NamedType>,
    ) -> TypeRef {
        let name = self.names.claim(format!("{}{}", site.owner, site.field), "Enum");
        nested.push(NamedType::Enum(EnumType {
            name: name.clone(),
            description: prop.description.clone(),
            literals,
        }));
        TypeRef::Named(name)
    }

    fn nested_union(
        &mut self,
        site: &Site<'_>,
        description: Option<String>,
        alternatives: &[PropertyDescriptor],
        nested: &mut Vec<NamedType>,
    ) -> Result<TypeRef> {
        let variants = self.variants(&site.label(), site.schema, alternatives)?;
        let wanted = format!("{}{}{}", site.owner, site.field, self.config.union_suffix);
        let name = self.names.claim(wanted, "");
        nested.push(NamedType::Union(UnionType {
            name: name.clone(),
            description,
            variants,
        }));
        Ok(TypeRef::Named(name))
    }

    fn variants(
        &self,
        label: &str,
        schema: &str,
        alternatives: &[PropertyDescriptor],
    ) -> Result<Vec<Variant>> {
        let mut variants: Vec<Variant> = Vec::new();
        for alternative in alternatives {
            let scalar = alternative.type_tag.and_then(TypeTag::scalar);
            let variant = match (scalar, alternative.type_tag, &alternative.ref_target) {
                (Some(scalar), Some(tag), _) => Some(Variant {
                    name: naming::type_name(tag.as_str()),
                    tag: tag.as_str().to_string(),
                    payload: TypeRef::Scalar(scalar),
                }),
                (None, Some(TypeTag::Array), None) => {
                    return Err(GeneratorError::shape(schema, label, "array alternative in anyOf"));
                }
                (_, _, Some(target)) => {
                    let name = self.names.resolve(label, target)?.to_string();
                    Some(Variant {
                        name: name.clone(),
                        tag: name.clone(),
                        payload: TypeRef::Named(name),
                    })
                }
                _ => None,
            };
            match variant {
                Some(v) if variants.iter().all(|known| known.name != v.name) => variants.push(v),
                Some(v) => debug!(owner = %label, variant = %v.name, "dropping duplicate variant"),
                None => debug!(owner = %label, "skipping alternative without type or reference"),
            }
        }
        if variants.is_empty() {
            return Err(GeneratorError::shape(schema, label, "anyOf without resolvable alternatives"));
        }
        Ok(variants)
    }
}
