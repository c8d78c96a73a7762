use std::{ops::Range, sync::Arc};

use rustc_hash::FxHashMap;
use structdoc_error::{CodecError, CodecResult, SchemaError};
use tracing::debug;

use super::ScalarMapping;
use crate::value::Value;

/// How a nested composite is stored inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedStorage {
    /// Flattened into the parent's selectables.
    Inline,
    /// Kept as one opaque slot (its own document object).
    Aggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationSide {
    /// Holds the foreign key.
    Owning,
    /// Mapped by the other side; stores nothing.
    Target,
}

#[derive(Debug, Clone)]
pub enum AssociationKey {
    Scalar(ScalarMapping),
    Composite(Arc<SchemaDescriptor>),
}

/// Element type of a plural attribute.
#[derive(Debug, Clone)]
pub enum ElementKind {
    Scalar(ScalarMapping),
    Composite(Arc<SchemaDescriptor>),
}

#[derive(Debug, Clone)]
pub enum AttributeKind {
    Scalar(ScalarMapping),
    Nested {
        schema: Arc<SchemaDescriptor>,
        storage: NestedStorage,
    },
    ToOne {
        entity: String,
        side: AssociationSide,
        key: AssociationKey,
    },
    Plural(ElementKind),
}

#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    pub name: String,
    pub kind: AttributeKind,
}

/// Discriminator column of a polymorphic composite and its subtype table.
#[derive(Debug, Clone)]
pub struct Discriminator {
    pub column: String,
    pub mapping: ScalarMapping,
    subtypes: Vec<(Value, String)>,
}

impl Discriminator {
    pub fn subtypes(&self) -> &[(Value, String)] {
        &self.subtypes
    }
}

/// What a single flat slot holds.
#[derive(Debug, Clone)]
pub enum StorageKind {
    Scalar(ScalarMapping),
    Aggregate(Arc<SchemaDescriptor>),
    Array(ElementKind),
}

/// One addressable slot of a schema's flat view. Documents address slots
/// by `name`; rows address them by `index`.
#[derive(Debug, Clone)]
pub struct Selectable {
    pub name: String,
    pub index: usize,
    pub storage: StorageKind,
}

/// Immutable description of a composite type.
///
/// Built once through [`SchemaDescriptor::builder`] and shared behind an
/// `Arc` by every encode and decode call.
#[derive(Debug)]
pub struct SchemaDescriptor {
    name: String,
    attributes: Vec<AttributeDescriptor>,
    discriminator: Option<Discriminator>,
    selectables: Vec<Selectable>,
    by_name: FxHashMap<String, usize>,
    attribute_slots: Vec<Range<usize>>,
}

impl SchemaDescriptor {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            attributes: Vec::new(),
            discriminator: None,
            subtypes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    pub fn selectables(&self) -> &[Selectable] {
        &self.selectables
    }

    /// Number of slots in a flat row, discriminator included.
    pub fn flat_count(&self) -> usize {
        self.selectables.len()
    }

    /// Flat slots covered by the attribute at `attribute`.
    pub fn attribute_slots(
        &self,
        attribute: usize,
    ) -> Range<usize> {
        self.attribute_slots[attribute].clone()
    }

    /// Resolves a document key or tag name to its slot.
    pub fn resolve(
        &self,
        name: &str,
    ) -> CodecResult<&Selectable> {
        match self.by_name.get(name) {
            Some(&i) => Ok(&self.selectables[i]),
            None => {
                debug!(schema = %self.name, name, "unknown selectable");
                Err(CodecError::unknown_attribute(&self.name, name))
            }
        }
    }

    pub fn discriminator(&self) -> Option<&Discriminator> {
        self.discriminator.as_ref()
    }

    pub fn is_polymorphic(&self) -> bool {
        self.discriminator.is_some()
    }

    /// Subtype name registered for a discriminator value.
    pub fn subtype_for(
        &self,
        value: &Value,
    ) -> Option<&str> {
        self.discriminator
            .as_ref()?
            .subtypes
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, name)| name.as_str())
    }

    /// Discriminator value registered for a concrete subtype.
    pub fn discriminator_for(
        &self,
        type_name: &str,
    ) -> Option<&Value> {
        self.discriminator
            .as_ref()?
            .subtypes
            .iter()
            .find(|(_, name)| name == type_name)
            .map(|(v, _)| v)
    }
}

pub struct SchemaBuilder {
    name: String,
    attributes: Vec<AttributeDescriptor>,
    discriminator: Option<(String, ScalarMapping)>,
    subtypes: Vec<(Value, String)>,
}

impl SchemaBuilder {
    fn attribute(
        mut self,
        name: impl Into<String>,
        kind: AttributeKind,
    ) -> Self {
        self.attributes.push(AttributeDescriptor {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn scalar(
        self,
        name: impl Into<String>,
        mapping: ScalarMapping,
    ) -> Self {
        self.attribute(name, AttributeKind::Scalar(mapping))
    }

    pub fn nested(
        self,
        name: impl Into<String>,
        schema: Arc<SchemaDescriptor>,
        storage: NestedStorage,
    ) -> Self {
        self.attribute(name, AttributeKind::Nested { schema, storage })
    }

    pub fn to_one(
        self,
        name: impl Into<String>,
        entity: impl Into<String>,
        side: AssociationSide,
        key: AssociationKey,
    ) -> Self {
        self.attribute(
            name,
            AttributeKind::ToOne {
                entity: entity.into(),
                side,
                key,
            },
        )
    }

    pub fn plural(
        self,
        name: impl Into<String>,
        element: ElementKind,
    ) -> Self {
        self.attribute(name, AttributeKind::Plural(element))
    }

    pub fn discriminator(
        mut self,
        column: impl Into<String>,
        mapping: ScalarMapping,
    ) -> Self {
        self.discriminator = Some((column.into(), mapping));
        self
    }

    pub fn subtype(
        mut self,
        value: impl Into<Value>,
        type_name: impl Into<String>,
    ) -> Self {
        self.subtypes.push((value.into(), type_name.into()));
        self
    }

    pub fn build(self) -> Result<Arc<SchemaDescriptor>, SchemaError> {
        let mut selectables: Vec<Selectable> = Vec::new();
        let mut attribute_slots = Vec::with_capacity(self.attributes.len());

        for attr in &self.attributes {
            let start = selectables.len();
            match &attr.kind {
                AttributeKind::Scalar(m) => push(
                    &mut selectables,
                    attr.name.clone(),
                    StorageKind::Scalar(m.clone()),
                ),
                AttributeKind::Nested {
                    schema,
                    storage: NestedStorage::Inline,
                } => {
                    for s in schema.selectables() {
                        push(&mut selectables, s.name.clone(), s.storage.clone());
                    }
                }
                AttributeKind::Nested {
                    schema,
                    storage: NestedStorage::Aggregate,
                } => push(
                    &mut selectables,
                    attr.name.clone(),
                    StorageKind::Aggregate(schema.clone()),
                ),
                AttributeKind::ToOne {
                    side: AssociationSide::Owning,
                    key,
                    ..
                } => match key {
                    AssociationKey::Scalar(m) => push(
                        &mut selectables,
                        format!("{}_id", attr.name),
                        StorageKind::Scalar(m.clone()),
                    ),
                    AssociationKey::Composite(key_schema) => {
                        if key_schema.is_polymorphic() {
                            return Err(SchemaError::PolymorphicKey(key_schema.name.clone()));
                        }
                        for s in key_schema.selectables() {
                            push(
                                &mut selectables,
                                format!("{}_{}", attr.name, s.name),
                                s.storage.clone(),
                            );
                        }
                    }
                },
                AttributeKind::ToOne {
                    side: AssociationSide::Target,
                    ..
                } => {}
                AttributeKind::Plural(element) => push(
                    &mut selectables,
                    attr.name.clone(),
                    StorageKind::Array(element.clone()),
                ),
            }
            attribute_slots.push(start..selectables.len());
        }

        let discriminator = match (self.discriminator, self.subtypes.is_empty()) {
            (None, true) => None,
            (None, false) => {
                return Err(SchemaError::Invalid(format!(
                    "`{}` registers subtypes without a discriminator",
                    self.name
                )))
            }
            (Some(_), true) => {
                return Err(SchemaError::Invalid(format!(
                    "`{}` has a discriminator but no subtypes",
                    self.name
                )))
            }
            (Some((column, mapping)), false) => {
                for (i, (value, type_name)) in self.subtypes.iter().enumerate() {
                    if !mapping.value_type.accepts(value) || value.is_null() {
                        return Err(SchemaError::Invalid(format!(
                            "discriminator value {value} of `{type_name}` does not fit {:?}",
                            mapping.value_type
                        )));
                    }
                    let earlier = &self.subtypes[..i];
                    if earlier.iter().any(|(v, t)| v == value || t == type_name) {
                        return Err(SchemaError::DuplicateDiscriminator {
                            schema: self.name.clone(),
                            value: value.to_string(),
                        });
                    }
                }
                push(
                    &mut selectables,
                    column.clone(),
                    StorageKind::Scalar(mapping.clone()),
                );
                Some(Discriminator {
                    column,
                    mapping,
                    subtypes: self.subtypes,
                })
            }
        };

        let mut by_name = FxHashMap::default();
        for s in &selectables {
            if by_name.insert(s.name.clone(), s.index).is_some() {
                return Err(SchemaError::DuplicateSelectable(s.name.clone()));
            }
        }

        Ok(Arc::new(SchemaDescriptor {
            name: self.name,
            attributes: self.attributes,
            discriminator,
            selectables,
            by_name,
            attribute_slots,
        }))
    }
}

fn push(
    selectables: &mut Vec<Selectable>,
    name: String,
    storage: StorageKind,
) {
    let index = selectables.len();
    selectables.push(Selectable {
        name,
        index,
        storage,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SqlTypeCode;

    fn point() -> Arc<SchemaDescriptor> {
        SchemaDescriptor::builder("Point")
            .scalar("x", ScalarMapping::of(SqlTypeCode::Integer))
            .scalar("y", ScalarMapping::of(SqlTypeCode::Integer))
            .build()
            .unwrap()
    }

    /// Slot counts per attribute kind follow the flat layout.
    #[test]
    fn test_flat_layout() {
        let key = SchemaDescriptor::builder("OrderKey")
            .scalar("region", ScalarMapping::of(SqlTypeCode::VarChar))
            .scalar("number", ScalarMapping::of(SqlTypeCode::BigInt))
            .build()
            .unwrap();
        let schema = SchemaDescriptor::builder("Line")
            .scalar("qty", ScalarMapping::of(SqlTypeCode::Integer))
            .nested("at", point(), NestedStorage::Inline)
            .nested("box", point(), NestedStorage::Aggregate)
            .to_one(
                "order",
                "Order",
                AssociationSide::Owning,
                AssociationKey::Composite(key),
            )
            .to_one(
                "invoice",
                "Invoice",
                AssociationSide::Target,
                AssociationKey::Scalar(ScalarMapping::of(SqlTypeCode::BigInt)),
            )
            .plural(
                "tags",
                ElementKind::Scalar(ScalarMapping::of(SqlTypeCode::VarChar)),
            )
            .build()
            .unwrap();

        let names: Vec<_> = schema.selectables().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["qty", "x", "y", "box", "order_region", "order_number", "tags"]
        );
        assert_eq!(schema.attribute_slots(1), 1..3);
        assert_eq!(schema.attribute_slots(4), 6..6);
        assert_eq!(schema.attribute_slots(5), 6..7);
        assert_eq!(schema.resolve("box").unwrap().index, 3);
    }

    #[test]
    fn test_unknown_name() {
        let err = point().resolve("z").unwrap_err();
        assert_eq!(err, CodecError::unknown_attribute("Point", "z"));
    }

    #[test]
    fn test_duplicate_selectable_from_inline() {
        let err = SchemaDescriptor::builder("Bad")
            .scalar("x", ScalarMapping::of(SqlTypeCode::Integer))
            .nested("p", point(), NestedStorage::Inline)
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateSelectable("x".into()));
    }

    #[test]
    fn test_discriminator_table() {
        let shape = SchemaDescriptor::builder("Shape")
            .scalar("size", ScalarMapping::of(SqlTypeCode::Integer))
            .discriminator("kind", ScalarMapping::of(SqlTypeCode::VarChar))
            .subtype("C", "Circle")
            .subtype("S", "Square")
            .build()
            .unwrap();
        assert!(shape.is_polymorphic());
        assert_eq!(shape.flat_count(), 2);
        assert_eq!(shape.subtype_for(&Value::from("S")), Some("Square"));
        assert_eq!(shape.discriminator_for("Circle"), Some(&Value::from("C")));
        assert!(shape.subtype_for(&Value::from("T")).is_none());
    }

    #[test]
    fn test_discriminator_validation() {
        let dup = SchemaDescriptor::builder("Shape")
            .discriminator("kind", ScalarMapping::of(SqlTypeCode::VarChar))
            .subtype("C", "Circle")
            .subtype("C", "Cube")
            .build()
            .unwrap_err();
        assert!(matches!(dup, SchemaError::DuplicateDiscriminator { .. }));

        let wrong_type = SchemaDescriptor::builder("Shape")
            .discriminator("kind", ScalarMapping::of(SqlTypeCode::Integer))
            .subtype("C", "Circle")
            .build()
            .unwrap_err();
        assert!(matches!(wrong_type, SchemaError::Invalid(_)));

        let empty = SchemaDescriptor::builder("Shape")
            .discriminator("kind", ScalarMapping::of(SqlTypeCode::VarChar))
            .build()
            .unwrap_err();
        assert!(matches!(empty, SchemaError::Invalid(_)));
    }

    #[test]
    fn test_polymorphic_key_rejected() {
        let shape = SchemaDescriptor::builder("Shape")
            .discriminator("kind", ScalarMapping::of(SqlTypeCode::VarChar))
            .subtype("C", "Circle")
            .build()
            .unwrap();
        let err = SchemaDescriptor::builder("Holder")
            .to_one(
                "shape",
                "ShapeEntity",
                AssociationSide::Owning,
                AssociationKey::Composite(shape),
            )
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::PolymorphicKey("Shape".into()));
    }
}
