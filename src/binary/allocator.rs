// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Backing memory for the builder.
//!
//! The builder writes from the back of its allocation toward the front, so
//! growing has to keep the written bytes at the *end*: double the size, move
//! the old contents into the upper half, zero the lower half.

use std::fmt;
use std::ops::DerefMut;

use super::header::MAX_BUFFER_SIZE;

/// Host-provided storage for a buffer under construction.
///
/// Implementors hand out a contiguous byte slice through `DerefMut` and know
/// how to enlarge it while keeping existing bytes at the end.
pub trait Allocator: DerefMut<Target = [u8]> {
    /// Enlarge the allocation. Bytes that were at `[0, old_len)` must end up
    /// at `[new_len - old_len, new_len)`.
    fn grow_downwards(&mut self) -> Result<(), AllocError>;

    /// Current allocation size.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The allocator refused to grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    /// Size the allocator was asked to reach.
    pub requested: usize,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot grow buffer to {} bytes", self.requested)
    }
}

impl std::error::Error for AllocError {}

/// `Vec<u8>`-backed allocator used unless the host supplies its own.
#[derive(Debug, Default, Clone)]
pub struct DefaultAllocator(Vec<u8>);

impl DefaultAllocator {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(vec![0; capacity])
    }

    /// Give back the whole allocation (including unused front space).
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl std::ops::Deref for DefaultAllocator {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl DerefMut for DefaultAllocator {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl Allocator for DefaultAllocator {
    fn grow_downwards(&mut self) -> Result<(), AllocError> {
        let old_len = self.0.len();
        let new_len = old_len.saturating_mul(2).max(1);
        if new_len > MAX_BUFFER_SIZE.saturating_add(1) {
            return Err(AllocError { requested: new_len });
        }
        self.0
            .try_reserve_exact(new_len - old_len)
            .map_err(|_| AllocError { requested: new_len })?;
        self.0.resize(new_len, 0);

        let middle = new_len / 2;
        self.0.copy_within(0..old_len, middle);
        self.0[..middle].fill(0);
        Ok(())
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}
