// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # classpool
//!
//! Reference-counted constant pool bookkeeping for tools that rewrite compiled JVM classes,
//! such as obfuscators and shrinkers.
//!
//! Every field, method, attribute and instruction of a class refers to its constant pool by
//! index. When a rewriting pass renames symbols, entries are added, redirected or left unused,
//! and the pool has to stay consistent with what the rest of the class actually references.
//! `classpool` keeps the indices stable, interns new text without duplicating it, and reclaims
//! text entries that lost all their references.
//!
//! ## Features
//!
//! - **Stable indices** - Slots are never moved or removed; unused text is blanked in place
//! - **Interning** - New text reuses an equal entry, then a blanked slot, before the pool grows
//! - **Mark and sweep** - Reference counts are recomputed from the owning class on demand
//! - **Batch isolation** - Many classes are reconciled in parallel, one failure never stops the rest
//!
//! ## Quick Start
//!
//! ```rust
//! use classpool::prelude::*;
//!
//! struct Method {
//!     name: usize,
//!     descriptor: usize,
//! }
//!
//! impl PoolOwner for Method {
//!     fn mark_utf8_refs(&self, marker: &mut RefMarker<'_>) -> Result<()> {
//!         marker.mark_all([self.name, self.descriptor])
//!     }
//!
//!     fn mark_name_type_refs(&self, _marker: &mut RefMarker<'_>) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let mut pool = ConstantPool::new(vec![
//!     None,
//!     Some(CpEntry::utf8("computeTotal").with_ref_count(1)),
//!     Some(CpEntry::utf8("()I").with_ref_count(1)),
//! ]);
//! let mut method = Method { name: 1, descriptor: 2 };
//!
//! // Rename the method; the single-use name slot is rewritten in place
//! method.name = pool.remap_utf8_to("a", method.name)?;
//! pool.update_ref_count(&method)?;
//!
//! assert_eq!(pool.get_utf8(method.name)?, "a");
//! assert_eq!(pool.len(), 3);
//! # Ok::<(), classpool::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`constpool`] - The [`ConstantPool`], its entries, configuration and owner callbacks
//! - [`batch`] - Parallel, failure-isolating processing of many classes
//! - [`prelude`] - Convenient re-exports
//! - [`Error`] and [`Result`] - Error handling
//!
//! Reading and writing the class-file byte stream is left to the caller: a pool is built from
//! already parsed slots and handed back with [`ConstantPool::into_entries`].
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result). Errors are fatal for the class
//! that produced them:
//!
//! ```rust
//! use classpool::{ConstantPool, CpEntry, Error};
//!
//! let mut pool = ConstantPool::new(vec![Some(CpEntry::utf8("unused"))]);
//! match pool.dec_ref_count(0) {
//!     Err(Error::Consistency { message, .. }) => println!("Bookkeeping mismatch: {}", message),
//!     Err(e) => println!("Other error: {}", e),
//!     Ok(()) => unreachable!(),
//! }
//! ```
//!
//! ## Logging
//!
//! Diagnostics are emitted through [`tracing`]; install a subscriber in the application to
//! see reconciliation summaries (`debug`) and per-class batch failures (`warn`).
//!
//! ## Development and Testing
//!
//! ### Fuzzing
//!
//! ```bash
//! cargo +nightly fuzz run refcount --release
//! ```
//!
//! ### Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use classpool::prelude::*;
///
/// let pool = ConstantPool::new(vec![None, Some(CpEntry::utf8("java/lang/Object"))]);
/// assert_eq!(pool.len(), 2);
/// ```
pub mod prelude;

pub mod batch;
pub mod constpool;

/// `classpool` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `classpool` Error type
///
/// The single error type returned by every fallible operation of this crate.
pub use error::Error;

/// The constant pool and its building blocks.
pub use constpool::{
    ConstantPool, CpEntry, CpTag, OpaqueInfo, PoolConfig, PoolOwner, PoolStats,
    ReconcileSummary, RefKind, RefMarker, Utf8Info,
};
