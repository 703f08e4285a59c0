//! Array value type: a growable double-ended sequence

use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Arrays are shared by reference between every value that holds them
pub type ArrayRef = Rc<RefCell<Array>>;

#[derive(Debug, Clone, Default)]
pub struct Array {
    items: VecDeque<Value>,
}

/// Resolve a signed index against a length; negative indices count from the end
pub fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: i64) -> InterpResult<Value> {
        resolve_index(index, self.items.len())
            .map(|i| self.items[i].clone())
            .ok_or_else(|| RuntimeError::index_out_of_range("Array", index, self.items.len()))
    }

    pub fn set(&mut self, index: i64, value: Value) -> InterpResult<()> {
        let len = self.items.len();
        let slot = resolve_index(index, len)
            .ok_or_else(|| RuntimeError::index_out_of_range("Array", index, len))?;
        self.items[slot] = value;
        Ok(())
    }

    /// Returns the new size
    pub fn push_back(&mut self, value: Value) -> usize {
        self.items.push_back(value);
        self.items.len()
    }

    /// Returns the new size
    pub fn push_front(&mut self, value: Value) -> usize {
        self.items.push_front(value);
        self.items.len()
    }

    /// Null when empty
    pub fn pop_back(&mut self) -> Value {
        self.items.pop_back().unwrap_or(Value::Null)
    }

    /// Null when empty
    pub fn pop_front(&mut self) -> Value {
        self.items.pop_front().unwrap_or(Value::Null)
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Array {
            items: items.into(),
        }
    }
}
