use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Represents a value moving through the codec.
///
/// The same type carries three representations of an attribute:
/// the domain value held by a composite, the relational value produced by
/// an attribute's converter, and the raw storage value bound to a column.
/// Most variants are shared by all three; `Lob` only appears in raw rows and
/// `Row` only where a nested composite is kept uninstantiated.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absence of a value at any level.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Str(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    /// Timestamp carrying its UTC offset.
    TimestampTz(DateTime<FixedOffset>),
    /// Elements of a plural attribute; positional nulls are kept.
    Array(Vec<Value>),
    /// An instantiated composite.
    Composite(Composite),
    /// A to-one reference to another entity.
    Reference(Reference),
    /// Flat raw values of a nested composite that was not instantiated.
    Row(Vec<Value>),
    /// Native large-object wrapper.
    Lob(Lob),
}

/// Instantiated composite: concrete type name plus attribute values in
/// declared order.
#[derive(Clone, Debug, PartialEq)]
pub struct Composite {
    pub type_name: String,
    pub values: Vec<Value>,
}

/// To-one reference: target entity name and its identifier.
///
/// The identifier is a scalar for simple keys and a [`Composite`] for
/// composite keys.
#[derive(Clone, Debug, PartialEq)]
pub struct Reference {
    pub entity: String,
    pub id: Box<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Lob {
    Blob(Vec<u8>),
    Clob(String),
    NClob(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::TimestampTz(_) => "timestamp with offset",
            Value::Array(_) => "array",
            Value::Composite(_) => "composite",
            Value::Reference(_) => "reference",
            Value::Row(_) => "row",
            Value::Lob(_) => "lob",
        }
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Value::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl Composite {
    pub fn new(
        type_name: impl Into<String>,
        values: Vec<Value>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            values,
        }
    }

    /// Attribute value at the declared position.
    pub fn get(
        &self,
        index: usize,
    ) -> Option<&Value> {
        self.values.get(index)
    }
}

impl Reference {
    pub fn new(
        entity: impl Into<String>,
        id: Value,
    ) -> Self {
        Self {
            entity: entity.into(),
            id: Box::new(id),
        }
    }
}

impl From<Composite> for Value {
    fn from(c: Composite) -> Self {
        Value::Composite(c)
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Value::Reference(r)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::Timestamp(ts) => write!(f, "{ts}"),
            Value::TimestampTz(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Array(items) | Value::Row(items) => write_items(f, items),
            Value::Composite(c) => {
                write!(f, "{}", c.type_name)?;
                write_items(f, &c.values)
            }
            Value::Reference(r) => write!(f, "{}#{}", r.entity, r.id),
            Value::Lob(Lob::Blob(b)) => write!(f, "<blob {} bytes>", b.len()),
            Value::Lob(Lob::Clob(s) | Lob::NClob(s)) => write!(f, "<clob {} chars>", s.len()),
        }
    }
}

fn write_items(
    f: &mut fmt::Formatter<'_>,
    items: &[Value],
) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}
