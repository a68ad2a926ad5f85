use crate::{
    runtime::{RuntimeError, RuntimeError::EmptyList, Value},
    syntax::tree::ListOp,
};
use im::Vector;
use std::iter::FromIterator;

/// Runtime list value. Operations never mutate the receiver; they return a
/// new list sharing structure with the old one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct List(Vector<Value>);

impl List {
    pub fn new() -> List {
        List(Vector::new())
    }

    pub fn unit(value: Value) -> List {
        List(Vector::unit(value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter()
    }

    pub fn head(&self) -> Result<Value, RuntimeError> {
        self.0.front().cloned().ok_or(EmptyList(ListOp::Head.name()))
    }

    /// Everything but the first element.
    pub fn tail(&self) -> Result<List, RuntimeError> {
        self.without_head(ListOp::Tail)
    }

    pub fn push_head(&self, value: Value) -> List {
        let mut items = self.0.clone();
        items.push_front(value);
        List(items)
    }

    pub fn push_last(&self, value: Value) -> List {
        let mut items = self.0.clone();
        items.push_back(value);
        List(items)
    }

    /// The element a `pop_front` would remove.
    pub fn pop_head(&self) -> Result<Value, RuntimeError> {
        self.0.front().cloned().ok_or(EmptyList(ListOp::PopHead.name()))
    }

    /// The element a `pop_back` would remove.
    pub fn pop_last(&self) -> Result<Value, RuntimeError> {
        self.0.back().cloned().ok_or(EmptyList(ListOp::PopLast.name()))
    }

    pub fn drop_head(&self) -> Result<List, RuntimeError> {
        self.without_head(ListOp::DropHead)
    }

    pub fn drop_last(&self) -> Result<List, RuntimeError> {
        let mut items = self.0.clone();
        match items.pop_back() {
            Some(_) => Ok(List(items)),
            None => Err(EmptyList(ListOp::DropLast.name())),
        }
    }

    pub fn concat(&self, other: &List) -> List {
        let mut items = self.0.clone();
        items.append(other.0.clone());
        List(items)
    }

    fn without_head(&self, op: ListOp) -> Result<List, RuntimeError> {
        let mut items = self.0.clone();
        match items.pop_front() {
            Some(_) => Ok(List(items)),
            None => Err(EmptyList(op.name())),
        }
    }
}

impl From<Vec<Value>> for List {
    fn from(items: Vec<Value>) -> Self {
        List(Vector::from(items))
    }
}

impl FromIterator<Value> for List {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        List(iter.into_iter().collect())
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = im::vector::ConsumingIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
