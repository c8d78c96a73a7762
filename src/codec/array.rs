use crate::value::Value;

/// Accumulates decoded array elements.
///
/// Capacity is tracked explicitly so growth follows a fixed 1.5x policy
/// with a floor of ten slots, independent of `Vec`'s own strategy.
#[derive(Debug, Default)]
pub struct GrowableArray {
    items: Vec<Value>,
    capacity: usize,
}

impl GrowableArray {
    const MIN_CAPACITY: usize = 10;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Makes room for at least `min` elements.
    pub fn ensure_capacity(
        &mut self,
        min: usize,
    ) {
        if min <= self.capacity {
            return;
        }
        let grown = self.capacity + (self.capacity >> 1);
        let new_capacity = grown.max(min).max(Self::MIN_CAPACITY);
        self.items.reserve_exact(new_capacity - self.items.len());
        self.capacity = new_capacity;
    }

    pub fn push(
        &mut self,
        value: Value,
    ) {
        self.ensure_capacity(self.items.len() + 1);
        self.items.push(value);
    }

    /// Copies exactly the accumulated elements, nulls included.
    pub fn into_value(self) -> Value {
        Value::Array(self.items)
    }
}
