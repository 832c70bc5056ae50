// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Zero-copy vector access.

use std::fmt;
use std::marker::PhantomData;

use super::encoding::read_scalar_at;
use super::header::SIZE_UOFFSET;
use super::table::Follow;

/// A length-prefixed vector inside a buffer.
///
/// `T` is the element marker: a scalar type, [`Str`](super::Str), or
/// [`TableRef`](super::TableRef).
pub struct Vector<'a, T> {
    buf: &'a [u8],
    /// Position of the first element (just past the length prefix).
    start: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Follow<'a>> Vector<'a, T> {
    /// Vector whose length prefix is at `loc`. `None` if the elements don't fit.
    pub(crate) fn at(buf: &'a [u8], loc: usize) -> Option<Self> {
        let len = read_scalar_at::<u32>(buf, loc)? as usize;
        let start = loc.checked_add(SIZE_UOFFSET)?;
        let end = len.checked_mul(T::INLINE_SIZE)?.checked_add(start)?;
        (end <= buf.len()).then_some(Self {
            buf,
            start,
            len,
            _marker: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<T::Inner> {
        if index >= self.len {
            return None;
        }
        T::follow(self.buf, self.start + index * T::INLINE_SIZE)
    }

    pub fn iter(&self) -> VectorIter<'a, T> {
        VectorIter {
            vector: *self,
            index: 0,
        }
    }

    /// Absolute position of element 0.
    pub fn position(&self) -> usize {
        self.start
    }
}

impl<'a> Vector<'a, u8> {
    /// The elements as a byte slice.
    pub fn bytes(&self) -> &'a [u8] {
        &self.buf[self.start..self.start + self.len]
    }
}

impl<T> Clone for Vector<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Vector<'_, T> {}

impl<'a, T: Follow<'a>> fmt::Debug for Vector<'a, T>
where
    T::Inner: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct VectorIter<'a, T> {
    vector: Vector<'a, T>,
    index: usize,
}

impl<'a, T: Follow<'a>> Iterator for VectorIter<'a, T> {
    type Item = T::Inner;

    fn next(&mut self) -> Option<T::Inner> {
        // Elements that fail to decode end the iteration early.
        let item = self.vector.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.vector.len - self.index.min(self.vector.len)))
    }
}

impl<'a, T: Follow<'a>> IntoIterator for Vector<'a, T> {
    type Item = T::Inner;
    type IntoIter = VectorIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::{Str, TableRef};

    #[test]
    fn test_scalar_vector() {
        let buf = [3, 0, 0, 0, 10, 20, 30];
        let v = Vector::<u8>::at(&buf, 0).unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v.get(2), Some(30));
        assert_eq!(v.get(3), None);
        assert_eq!(v.bytes(), &[10, 20, 30]);
    }

    #[test]
    fn test_too_long_vector_rejected() {
        let buf = [4, 0, 0, 0, 10, 20, 30];
        assert!(Vector::<u8>::at(&buf, 0).is_none());
        let huge = [0xff, 0xff, 0xff, 0xff];
        assert!(Vector::<u64>::at(&huge, 0).is_none());
    }

    #[test]
    fn test_string_vector() {
        // [len=2][off->"a"][off->"bc"] "a" "bc"
        let mut buf = vec![2, 0, 0, 0, 8, 0, 0, 0, 12, 0, 0, 0];
        buf.extend_from_slice(&[1, 0, 0, 0, b'a', 0, 0, 0]);
        buf.extend_from_slice(&[2, 0, 0, 0, b'b', b'c', 0]);
        let v = Vector::<Str>::at(&buf, 0).unwrap();
        assert_eq!(v.iter().collect::<Vec<_>>(), vec!["a", "bc"]);
        assert!(Vector::<TableRef>::at(&buf[..8], 0).is_none());
    }
}
