// SPDX-License-Identifier: Apache-2.0

//! Growable array used for list storage and for the parser's stacks.
//!
//! The array grows by a fixed number of slots each time it runs out of room
//! and never gives memory back while it is alive. Only the tail can be
//! removed, so it doubles as a stack.

use log::debug;

use crate::parse_error::AccessError;

/// Number of slots added every time an [`Array`] runs out of capacity.
pub const GROWTH_INCREMENT: usize = 8;

/// A resizable, ordered sequence with stack-style tail removal.
///
/// ```
/// use ison::Array;
///
/// let mut stack = Array::new();
/// stack.push(1);
/// stack.push(2);
/// assert_eq!(stack.pop(), Ok(2));
/// assert_eq!(stack.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Array<T> {
    items: Vec<T>,
    /// Slots reserved so far, always a multiple of [`GROWTH_INCREMENT`].
    capacity: usize,
}

impl<T> Array<T> {
    /// Creates an empty array with no backing storage.
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            capacity: 0,
        }
    }

    /// Appends `value` at the tail, growing the capacity by
    /// [`GROWTH_INCREMENT`] slots when full.
    ///
    /// Running out of memory aborts the process.
    pub fn push(&mut self, value: T) {
        if self.items.len() == self.capacity {
            // Logical capacity only; the vector amortizes underneath.
            self.items.reserve(GROWTH_INCREMENT);
            self.capacity += GROWTH_INCREMENT;
        }
        self.items.push(value);
    }

    /// Returns the element at `index`.
    pub fn get(&self, index: usize) -> Result<&T, AccessError> {
        let len = self.items.len();
        self.items.get(index).ok_or_else(|| {
            debug!("Index {} out of bounds (size: {})", index, len);
            AccessError::IndexOutOfRange { index, len }
        })
    }

    /// Returns the element at `index` mutably.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, AccessError> {
        let len = self.items.len();
        self.items.get_mut(index).ok_or_else(|| {
            debug!("Index {} out of bounds (size: {})", index, len);
            AccessError::IndexOutOfRange { index, len }
        })
    }

    /// Removes and returns the tail element.
    pub fn pop(&mut self) -> Result<T, AccessError> {
        self.items.pop().ok_or_else(|| {
            debug!("Attempted to remove from empty array");
            AccessError::EmptyContainer
        })
    }

    /// Peeks at the tail element.
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Logical capacity: the number of slots granted so far in steps of
    /// [`GROWTH_INCREMENT`]. The backing storage is allowed to reserve more
    /// memory than this, so it is not a measure of memory held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Removes every element, keeping the reserved capacity.
    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.items.drain(..)
    }
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Array::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}
