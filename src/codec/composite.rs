use std::sync::Arc;

use structdoc_error::{CodecError, CodecResult};
use tracing::debug;

use super::{CodecContext, LobBinding};
use crate::{
    schema::{
        AssociationKey, AssociationSide, AttributeKind, ElementKind, NestedStorage, ScalarMapping,
        SchemaDescriptor,
    },
    value::{Composite, Reference, Value},
};

/// Moves composite values between their domain form and flat raw rows.
///
/// Rows are laid out in the order of [`SchemaDescriptor::selectables`].
pub struct CompositeCodec<'a> {
    ctx: &'a CodecContext,
}

impl<'a> CompositeCodec<'a> {
    pub fn new(ctx: &'a CodecContext) -> Self {
        Self { ctx }
    }

    /// Relational scalar to its raw slot value.
    ///
    /// BLOB, CLOB and NCLOB columns are always bound natively; other
    /// columns follow the configured [`LobBinding`].
    pub fn bind(
        &self,
        mapping: &ScalarMapping,
        relational: Value,
    ) -> CodecResult<Value> {
        let binding = if mapping.code.is_lob() {
            LobBinding::Native
        } else {
            self.ctx.options().lob_binding
        };
        self.ctx.scalars().to_raw(mapping, relational, binding)
    }

    /// Flattens `value` into a raw row of `schema.flat_count()` slots.
    ///
    /// `Null` yields an all-null row; a `Row` of the right width is taken
    /// as already flattened.
    pub fn decompose(
        &self,
        schema: &SchemaDescriptor,
        value: &Value,
    ) -> CodecResult<Vec<Value>> {
        match value {
            Value::Null => Ok(vec![Value::Null; schema.flat_count()]),
            Value::Composite(c) => self.decompose_composite(schema, c),
            Value::Row(row) if row.len() == schema.flat_count() => Ok(row.clone()),
            other => Err(CodecError::mismatch(format!(
                "cannot decompose a {} value as `{}`",
                other.kind_name(),
                schema.name()
            ))),
        }
    }

    fn decompose_composite(
        &self,
        schema: &SchemaDescriptor,
        composite: &Composite,
    ) -> CodecResult<Vec<Value>> {
        let attributes = schema.attributes();
        if composite.values.len() != attributes.len() {
            return Err(CodecError::mismatch(format!(
                "`{}` has {} attributes, value `{}` carries {}",
                schema.name(),
                attributes.len(),
                composite.type_name,
                composite.values.len()
            )));
        }

        let mut row = Vec::with_capacity(schema.flat_count());
        for (attr, value) in attributes.iter().zip(&composite.values) {
            match &attr.kind {
                AttributeKind::Scalar(mapping) => {
                    let relational = mapping.to_relational(value)?;
                    row.push(self.bind(mapping, relational)?);
                }
                AttributeKind::Nested {
                    schema: nested,
                    storage: NestedStorage::Inline,
                } => row.extend(self.decompose(nested, value)?),
                AttributeKind::Nested {
                    storage: NestedStorage::Aggregate,
                    ..
                } => match value {
                    Value::Null | Value::Composite(_) | Value::Row(_) => row.push(value.clone()),
                    other => {
                        return Err(CodecError::mismatch(format!(
                            "`{}` expects a composite, got {}",
                            attr.name,
                            other.kind_name()
                        )))
                    }
                },
                AttributeKind::ToOne {
                    side: AssociationSide::Owning,
                    key,
                    ..
                } => self.decompose_key(&attr.name, key, value, &mut row)?,
                AttributeKind::ToOne {
                    side: AssociationSide::Target,
                    ..
                } => {}
                AttributeKind::Plural(element) => {
                    row.push(self.array_to_relational(element, value)?)
                }
            }
        }

        if let Some(discriminator) = schema.discriminator() {
            let Some(tag) = schema.discriminator_for(&composite.type_name) else {
                debug!(schema = schema.name(), subtype = %composite.type_name, "no discriminator value");
                return Err(CodecError::unresolved(
                    schema.name(),
                    format!("`{}` is not a registered subtype", composite.type_name),
                ));
            };
            row.push(self.bind(&discriminator.mapping, tag.clone())?);
        }
        Ok(row)
    }

    fn decompose_key(
        &self,
        attr: &str,
        key: &AssociationKey,
        value: &Value,
        row: &mut Vec<Value>,
    ) -> CodecResult<()> {
        let id = match value {
            Value::Null => {
                let width = match key {
                    AssociationKey::Scalar(_) => 1,
                    AssociationKey::Composite(key_schema) => key_schema.flat_count(),
                };
                row.extend(std::iter::repeat(Value::Null).take(width));
                return Ok(());
            }
            Value::Reference(r) => r.id.as_ref(),
            other => {
                return Err(CodecError::mismatch(format!(
                    "`{attr}` expects a reference, got {}",
                    other.kind_name()
                )))
            }
        };
        match key {
            AssociationKey::Scalar(mapping) => {
                let relational = mapping.to_relational(id)?;
                row.push(self.bind(mapping, relational)?);
            }
            AssociationKey::Composite(key_schema) => row.extend(self.decompose(key_schema, id)?),
        }
        Ok(())
    }

    /// Converts the domain elements of a plural value to relational form.
    /// Composite elements are kept as they are.
    pub fn array_to_relational(
        &self,
        element: &ElementKind,
        value: &Value,
    ) -> CodecResult<Value> {
        let items = match value {
            Value::Null => return Ok(Value::Null),
            Value::Array(items) => items,
            other => {
                return Err(CodecError::mismatch(format!(
                    "plural attribute expects an array, got {}",
                    other.kind_name()
                )))
            }
        };
        let converted = items
            .iter()
            .map(|item| match element {
                ElementKind::Scalar(mapping) => {
                    let relational = mapping.to_relational(item)?;
                    if mapping.value_type.accepts(&relational) {
                        Ok(relational)
                    } else {
                        Err(CodecError::mismatch(format!(
                            "array element of {:?} cannot be {}",
                            mapping.value_type,
                            relational.kind_name()
                        )))
                    }
                }
                ElementKind::Composite(_) => match item {
                    Value::Null | Value::Composite(_) | Value::Row(_) => Ok(item.clone()),
                    other => Err(CodecError::mismatch(format!(
                        "array element expects a composite, got {}",
                        other.kind_name()
                    ))),
                },
            })
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Value::Array(converted))
    }

    /// Inverse of [`decompose`](Self::decompose): the domain value of every
    /// attribute, plus the discriminator for polymorphic schemas.
    pub fn attribute_values(
        &self,
        schema: &SchemaDescriptor,
        row: &[Value],
    ) -> CodecResult<Vec<Value>> {
        if row.len() != schema.flat_count() {
            return Err(CodecError::mismatch(format!(
                "row has {} slots, `{}` expects {}",
                row.len(),
                schema.name(),
                schema.flat_count()
            )));
        }

        let scalars = self.ctx.scalars();
        let mut values = Vec::with_capacity(schema.attributes().len() + 1);
        for (i, attr) in schema.attributes().iter().enumerate() {
            let slots = &row[schema.attribute_slots(i)];
            let value = match &attr.kind {
                AttributeKind::Scalar(mapping) => {
                    mapping.to_domain(scalars.from_raw(mapping, slots[0].clone())?)?
                }
                AttributeKind::Nested {
                    schema: nested,
                    storage: NestedStorage::Inline,
                } => {
                    if all_null(slots) {
                        Value::Null
                    } else {
                        self.compose(nested, slots)?
                    }
                }
                AttributeKind::Nested {
                    schema: nested,
                    storage: NestedStorage::Aggregate,
                } => self.restore_composite(nested, &slots[0])?,
                AttributeKind::ToOne {
                    entity,
                    side: AssociationSide::Owning,
                    key,
                } => {
                    if all_null(slots) {
                        Value::Null
                    } else {
                        let id = match key {
                            AssociationKey::Scalar(mapping) => {
                                mapping.to_domain(scalars.from_raw(mapping, slots[0].clone())?)?
                            }
                            AssociationKey::Composite(key_schema) => self.compose(key_schema, slots)?,
                        };
                        Value::Reference(Reference::new(entity.as_str(), id))
                    }
                }
                AttributeKind::ToOne {
                    side: AssociationSide::Target,
                    ..
                } => Value::Null,
                AttributeKind::Plural(element) => self.array_to_domain(element, &slots[0])?,
            };
            values.push(value);
        }

        if let Some(discriminator) = schema.discriminator() {
            let raw = row[row.len() - 1].clone();
            values.push(scalars.from_raw(&discriminator.mapping, raw)?);
        }
        Ok(values)
    }

    fn restore_composite(
        &self,
        schema: &Arc<SchemaDescriptor>,
        value: &Value,
    ) -> CodecResult<Value> {
        match value {
            Value::Null | Value::Composite(_) => Ok(value.clone()),
            Value::Row(row) => self.compose(schema, row),
            other => Err(CodecError::mismatch(format!(
                "`{}` slot holds a {} value",
                schema.name(),
                other.kind_name()
            ))),
        }
    }

    /// Inverse of [`array_to_relational`](Self::array_to_relational);
    /// `Row` elements are composed.
    pub fn array_to_domain(
        &self,
        element: &ElementKind,
        value: &Value,
    ) -> CodecResult<Value> {
        let items = match value {
            Value::Null => return Ok(Value::Null),
            Value::Array(items) => items,
            other => {
                return Err(CodecError::mismatch(format!(
                    "array slot holds a {} value",
                    other.kind_name()
                )))
            }
        };
        let converted = items
            .iter()
            .map(|item| match element {
                ElementKind::Scalar(mapping) => mapping.to_domain(item.clone()),
                ElementKind::Composite(schema) => self.restore_composite(schema, item),
            })
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Value::Array(converted))
    }

    /// Builds the composite for a full attribute vector.
    ///
    /// Polymorphic schemas consume the trailing discriminator to pick the
    /// concrete subtype.
    pub fn instantiate(
        &self,
        schema: &SchemaDescriptor,
        mut values: Vec<Value>,
    ) -> CodecResult<Value> {
        let expected = schema.attributes().len() + usize::from(schema.is_polymorphic());
        if values.len() != expected {
            return Err(CodecError::mismatch(format!(
                "`{}` needs {expected} attribute values, got {}",
                schema.name(),
                values.len()
            )));
        }
        let type_name = if schema.is_polymorphic() {
            let tag = values.pop().unwrap_or(Value::Null);
            match schema.subtype_for(&tag) {
                Some(name) => name.to_string(),
                None => {
                    debug!(schema = schema.name(), %tag, "unresolved subtype");
                    return Err(CodecError::unresolved(
                        schema.name(),
                        format!("no subtype registered for discriminator {tag}"),
                    ));
                }
            }
        } else {
            schema.name().to_string()
        };
        Ok(Value::Composite(Composite::new(type_name, values)))
    }

    pub fn compose(
        &self,
        schema: &SchemaDescriptor,
        row: &[Value],
    ) -> CodecResult<Value> {
        let values = self.attribute_values(schema, row)?;
        self.instantiate(schema, values)
    }

    /// Attribute values of `composite`, discriminator included.
    pub fn values_of(
        &self,
        schema: &SchemaDescriptor,
        composite: &Composite,
    ) -> CodecResult<Vec<Value>> {
        let mut values = composite.values.clone();
        if schema.is_polymorphic() {
            let tag = schema.discriminator_for(&composite.type_name).ok_or_else(|| {
                CodecError::unresolved(
                    schema.name(),
                    format!("`{}` is not a registered subtype", composite.type_name),
                )
            })?;
            values.push(tag.clone());
        }
        Ok(values)
    }
}

fn all_null(slots: &[Value]) -> bool {
    slots.iter().all(Value::is_null)
}
