//! Runtime contracts for the buffer layout.
//!
//! Debug-mode assertions that the builder and the mutable accessor check
//! their own output against. They:
//!
//! 1. Are **zero-cost in release builds** (use `debug_assert!`)
//! 2. Catch layout bugs at the point they are introduced, not when a reader
//!    trips over the bytes later
//!
//! Untrusted input never reaches these: it goes through the verifier, which
//! reports errors instead of panicking.
//!
//! | Contract Function            | Property                                         |
//! |------------------------------|--------------------------------------------------|
//! | `check_offset_placed`        | a uoffset points at an already-written object    |
//! | `check_vtable_well_formed`   | vtable sizes are consistent, slots land inline   |
//! | `check_write_in_bounds`      | an in-place write stays inside the buffer        |

use crate::binary::{SIZE_UOFFSET, SIZE_VOFFSET, VTABLE_HEADER_SIZE};

// ============================================================================
// COMPILE-TIME ASSERTIONS (evaluated at build time)
// ============================================================================

const _: () = {
    // uoffsets and soffsets share a slot size; tables start 4-aligned.
    assert!(crate::binary::SIZE_UOFFSET == crate::binary::SIZE_SOFFSET);
    // The vtable header is exactly two voffsets.
    assert!(VTABLE_HEADER_SIZE == 2 * SIZE_VOFFSET);
    // Field 0 lives right after the vtable header.
    assert!(crate::binary::field_index_to_voffset(0) == VTABLE_HEADER_SIZE);
    // The largest vtable still has a 16-bit size.
    assert!(
        crate::binary::field_index_to_voffset(crate::binary::MAX_FIELD_COUNT)
            <= u16::MAX as usize
    );
    // Signed 32-bit soffsets must reach any position in a buffer.
    assert!(crate::binary::MAX_BUFFER_SIZE <= i32::MAX as usize);
};

// ============================================================================
// BUILDER CONTRACTS
// ============================================================================

/// Check that a uoffset being written refers to something behind it.
///
/// `target_rev` and `used` are distances from the end of the buffer; `used`
/// already includes the 4 bytes of the offset itself.
///
/// # Panics (debug builds only)
/// Panics if the target is zero or not yet written.
#[inline]
pub fn check_offset_placed(target_rev: u32, used: usize) {
    debug_assert!(
        target_rev > 0,
        "Contract violation: uoffset to rev position 0 (nothing is placed there)"
    );
    debug_assert!(
        target_rev as usize + SIZE_UOFFSET <= used,
        "Contract violation: uoffset target rev {} not behind holder (used {})",
        target_rev,
        used
    );
}

/// Check a vtable before it's written.
///
/// # Panics (debug builds only)
/// Panics if the declared vtable size doesn't match its entry count, the table
/// is smaller than its soffset, or a slot points outside the table.
#[inline]
pub fn check_vtable_well_formed(vtable: &[u16]) {
    debug_assert!(
        vtable.len() >= 2,
        "Contract violation: vtable has {} entries, needs at least 2",
        vtable.len()
    );
    if vtable.len() < 2 {
        return;
    }

    let vtable_size = vtable[0] as usize;
    let table_size = vtable[1] as usize;
    debug_assert_eq!(
        vtable_size,
        vtable.len() * SIZE_VOFFSET,
        "Contract violation: vtable size {} != {} entries * 2",
        vtable_size,
        vtable.len()
    );
    debug_assert!(
        table_size >= SIZE_UOFFSET,
        "Contract violation: table size {} smaller than its soffset",
        table_size
    );

    for (i, &slot) in vtable[2..].iter().enumerate() {
        debug_assert!(
            slot == 0 || (slot as usize >= SIZE_UOFFSET && (slot as usize) < table_size),
            "Contract violation: slot {} voffset {} outside table of {} bytes",
            i,
            slot,
            table_size
        );
    }
}

// ============================================================================
// MUTATION CONTRACTS
// ============================================================================

/// Check that an in-place write of `width` bytes at `pos` fits in `len`.
///
/// # Panics (debug builds only)
/// Panics if the write would run past the buffer.
#[inline]
pub fn check_write_in_bounds(pos: usize, width: usize, len: usize) {
    debug_assert!(
        pos.checked_add(width).is_some_and(|end| end <= len),
        "Contract violation: write of {} bytes at {} past buffer end {}",
        width,
        pos,
        len
    );
}
