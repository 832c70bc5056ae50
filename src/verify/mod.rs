// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The verification layer: untrusted bytes in, typed views out.
//!
//! Two complementary pieces:
//!
//! 1. **The verifier** walks a buffer against its schema and rejects anything
//!    that would make a later read go out of bounds, misaligned, or in
//!    circles. It reports *why* through [`VerifyError`].
//!
//! 2. **Verified wrappers** ([`VerifiedBuffer`], [`VerifiedBufferMut`]) that
//!    only the verifier can construct. Accessors hang off them, so reading an
//!    unverified buffer doesn't compile rather than failing at runtime.
//!
//! Mutation doesn't re-verify. [`VerifiedBufferMut::is_mutated`] says whether
//! the bytes changed; [`VerifiedBufferMut::reverify`] runs the walk again when
//! the caller wants it.

mod types;
mod verifier;

pub use types::{RootHandle, VerifiedBuffer, VerifiedBufferMut, VerifierOptions, VerifyError};
pub use verifier::{verify, Verifier};
