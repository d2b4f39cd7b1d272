// SPDX-License-Identifier: Apache-2.0

//! The tagged value stored in lists, maps and returned by the parser.

use crate::array::Array;
use crate::dict::Dict;
use crate::parse_error::AccessError;

/// An opaque caller-supplied handle. The library stores and returns it but
/// never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opaque(pub usize);

/// One node of a parsed or hand-built document.
#[derive(Debug, Default)]
pub enum Value {
    Dict(Dict),
    List(List),
    Text(String),
    /// Only produced by the construction API; parsed numbers are always
    /// [`Value::Float`].
    Integer(i32),
    Float(f64),
    Boolean(bool),
    Null,
    Pointer(Opaque),
    /// The zero value, before anything was stored.
    #[default]
    Unknown,
}

/// The variant tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Unknown,
    Dict,
    List,
    Text,
    Pointer,
    Integer,
    Float,
    Boolean,
    Null,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Dict(_) => ValueKind::Dict,
            Value::List(_) => ValueKind::List,
            Value::Text(_) => ValueKind::Text,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Null => ValueKind::Null,
            Value::Pointer(_) => ValueKind::Pointer,
            Value::Unknown => ValueKind::Unknown,
        }
    }

    /// Looks up `key` when this value is a dict. Any other variant has no
    /// keys and yields `None`.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Dict(dict) => dict.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view; integers widen losslessly.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(f64::from(*i)),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<Opaque> {
        match self {
            Value::Pointer(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Opaque> for Value {
    fn from(p: Opaque) -> Self {
        Value::Pointer(p)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}

impl From<List> for Value {
    fn from(l: List) -> Self {
        Value::List(l)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

/// An ordered JSON array.
#[derive(Default)]
pub struct List {
    items: Array<Value>,
}

impl List {
    pub const fn new() -> Self {
        Self {
            items: Array::new(),
        }
    }

    /// Appends at the end. Always succeeds.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.items.push(value.into());
    }

    pub fn get(&self, index: usize) -> Result<&Value, AccessError> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Value> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = core::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: Into<Value>> FromIterator<V> for List {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut list = List::new();
        for value in iter {
            list.push(value);
        }
        list
    }
}

// Only the length is shown; nested lists could be arbitrarily deep.
impl core::fmt::Debug for List {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("List").field("len", &self.len()).finish()
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = Array::new();
        self.pair_items_into(other, &mut pending) && values_equal(pending)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = Array::new();
        pending.push((self, other));
        values_equal(pending)
    }
}

impl List {
    /// Queues element pairs for comparison; `false` when the lengths differ.
    fn pair_items_into<'a>(
        &'a self,
        other: &'a List,
        pending: &mut Array<(&'a Value, &'a Value)>,
    ) -> bool {
        if self.len() != other.len() {
            return false;
        }
        for pair in self.iter().zip(other.iter()) {
            pending.push(pair);
        }
        true
    }
}

/// Compares queued value pairs, descending into containers through the
/// work stack instead of the call stack.
pub(crate) fn values_equal<'a>(mut pending: Array<(&'a Value, &'a Value)>) -> bool {
    while !pending.is_empty() {
        let Ok(pair) = pending.pop() else { break };
        let same = match pair {
            (Value::Dict(a), Value::Dict(b)) => a.pair_values_into(b, &mut pending),
            (Value::List(a), Value::List(b)) => a.pair_items_into(b, &mut pending),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Pointer(a), Value::Pointer(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Unknown, Value::Unknown) => true,
            _ => false,
        };
        if !same {
            return false;
        }
    }
    true
}

impl Drop for List {
    fn drop(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let mut pending: Array<Value> = self.items.drain().collect();
        release(&mut pending);
    }
}

/// Tears down a forest of values without recursing into nested containers.
///
/// Each popped container has its children moved onto `pending` first, so by
/// the time it is dropped it is empty and its own `Drop` returns at once.
pub(crate) fn release(pending: &mut Array<Value>) {
    while !pending.is_empty() {
        let Ok(value) = pending.pop() else { break };
        match value {
            Value::List(mut list) => {
                for child in list.items.drain() {
                    pending.push(child);
                }
            }
            Value::Dict(mut dict) => dict.drain_values_into(pending),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Value::default().kind(), ValueKind::Unknown);
        assert_eq!(Value::from("a").kind(), ValueKind::Text);
        assert_eq!(Value::from(1.5).kind(), ValueKind::Float);
        assert_eq!(Value::from(7).kind(), ValueKind::Integer);
        assert_eq!(Value::from(true).kind(), ValueKind::Boolean);
        assert_eq!(Value::from(()).kind(), ValueKind::Null);
        assert_eq!(Value::from(Opaque(3)).kind(), ValueKind::Pointer);
        assert_eq!(Value::from(List::new()).kind(), ValueKind::List);
        assert_eq!(
            Value::from(Dict::with_key(crate::HashKey::from_bytes([0; 16]))).kind(),
            ValueKind::Dict
        );
    }

    #[test]
    fn test_accessors_reject_other_variants() {
        let text = Value::from("x");
        assert_eq!(text.as_str(), Some("x"));
        assert_eq!(text.as_f64(), None);
        assert_eq!(text.as_bool(), None);
        assert!(text.lookup("x").is_none());
        assert_eq!(Value::Integer(4).as_f64(), Some(4.0));
        assert_eq!(Value::Float(4.0).as_i32(), None);
        assert_eq!(Value::Pointer(Opaque(9)).as_pointer(), Some(Opaque(9)));
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_list_append_and_index() {
        let mut list = List::new();
        list.push(1.0);
        list.push("two");
        list.push(false);
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(1), Ok(&Value::from("two")));
        assert_eq!(
            list.get(3),
            Err(AccessError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_equality_walks_nested_containers() {
        let build = |leaf: f64| {
            let mut inner = List::new();
            inner.push(leaf);
            inner.push("x");
            let mut dict = Dict::with_key(crate::HashKey::from_bytes([1; 16]));
            dict.add("inner", inner).unwrap();
            let mut outer = List::new();
            outer.push(dict);
            outer.push(());
            Value::List(outer)
        };
        assert_eq!(build(1.0), build(1.0));
        assert_ne!(build(1.0), build(2.0));
        assert_ne!(Value::Integer(1), Value::Float(1.0));
        assert_ne!(Value::from(List::new()), Value::Null);
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn test_debug_is_shallow() {
        let mut list = List::new();
        list.push(List::new());
        list.push(1.0);
        assert_eq!(format!("{:?}", Value::List(list)), "List(List { len: 2 })");
    }

    #[test]
    fn test_deep_list_drops_without_overflow() {
        let mut value = Value::List(List::new());
        for _ in 0..200_000 {
            let mut outer = List::new();
            outer.push(value);
            value = Value::List(outer);
        }
        drop(value);
    }
}
