//! A growable array with a fixed, observable growth policy.

use std::ops::Index;

/// Capacity given to a buffer on its first growth.
pub const MIN_CAPACITY: usize = 8;

/// Compute the capacity a buffer grows to when it runs out of room.
pub fn grow_capacity(old: usize) -> usize {
    if old < MIN_CAPACITY {
        MIN_CAPACITY
    } else {
        old * 2
    }
}

/// Buffer backs every variable-length structure in a chunk.
///
/// Unlike a bare `Vec`, whose growth strategy is an implementation detail of
/// the standard library, a buffer starts with no capacity, grows to
/// [`MIN_CAPACITY`] on the first push and doubles afterwards. The capacity is
/// tracked by the buffer itself so the policy stays observable.
///
/// # Examples
///
/// ```
/// use loxcalc::Buffer;
///
/// let mut buf = Buffer::default();
/// assert_eq!(buf.capacity(), 0);
/// for i in 0..9 {
///     buf.push(i);
/// }
/// assert_eq!(buf.capacity(), 16);
/// ```
#[derive(Debug, Clone)]
pub struct Buffer<T> {
    data: Vec<T>,
    capacity: usize,
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            capacity: 0,
        }
    }
}

impl<T> Buffer<T> {
    /// Append an element, growing the buffer if it is full.
    pub fn push(&mut self, elem: T) {
        if self.data.len() == self.capacity {
            self.capacity = grow_capacity(self.capacity);
            self.data.reserve_exact(self.capacity - self.data.len());
        }
        self.data.push(elem);
    }

    /// Remove the last element. The capacity is never shrunk.
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Return true if nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of elements the buffer can hold before its next growth.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the element at the index.
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.data.get(idx)
    }

    /// Get the last element.
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.data.last_mut()
    }

    /// View the elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<usize> for Buffer<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.data[idx]
    }
}

impl<'a, T> IntoIterator for &'a Buffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
