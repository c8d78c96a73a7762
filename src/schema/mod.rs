//! Schema descriptors: the ordered attributes of a composite and the flat
//! slot layout derived from them.

pub mod descriptor;
pub mod mapping;
pub mod sql_type;

pub use descriptor::{
    AssociationKey, AssociationSide, AttributeDescriptor, AttributeKind, Discriminator,
    ElementKind, NestedStorage, SchemaBuilder, SchemaDescriptor, Selectable, StorageKind,
};
pub use mapping::{ScalarMapping, ValueConverter, ValueType};
pub use sql_type::SqlTypeCode;
