//! The seam between a constant pool and the class structures that reference it.
//!
//! During reconciliation ([`crate::ConstantPool::update_ref_count`]) the pool resets every
//! reference count and then asks its owner to walk its fields, methods, attributes and code,
//! marking each pool index it finds. The owner only ever sees a [`RefMarker`], which can count
//! references but cannot add or redirect entries while the sweep is in progress.

use strum::Display;

use crate::{ConstantPool, Result};

/// The kind of reference being marked during a remark pass
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
pub enum RefKind {
    /// Direct references to `Utf8` entries (names, descriptors, attribute names, ...)
    Utf8,
    /// References to `NameAndType` entries (from field, method and dynamic references)
    NameAndType,
}

/// The structures of a class that hold constant pool indices.
///
/// Implemented by the in-memory class model. Both methods must report every live use of an
/// index of the respective kind, once per use; the pool derives its reference counts from
/// nothing else.
///
/// # Examples
///
/// ```rust
/// use classpool::{ConstantPool, CpEntry, PoolOwner, RefMarker, Result};
///
/// struct Member {
///     name: usize,
///     descriptor: usize,
/// }
///
/// impl PoolOwner for Member {
///     fn mark_utf8_refs(&self, marker: &mut RefMarker<'_>) -> Result<()> {
///         marker.mark(self.name)?;
///         marker.mark(self.descriptor)
///     }
///
///     fn mark_name_type_refs(&self, _marker: &mut RefMarker<'_>) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// let mut pool = ConstantPool::new(vec![
///     None,
///     Some(CpEntry::utf8("run")),
///     Some(CpEntry::utf8("()V")),
///     Some(CpEntry::utf8("unused")),
/// ]);
/// let member = Member { name: 1, descriptor: 2 };
///
/// let summary = pool.update_ref_count(&member)?;
/// assert_eq!(summary.blanked, 1);
/// assert_eq!(pool.get_utf8(3)?, "");
/// # Ok::<(), classpool::Error>(())
/// ```
pub trait PoolOwner {
    /// Mark every index used as a `Utf8` reference
    ///
    /// # Errors
    /// Propagates errors from [`RefMarker::mark`], or reports a failure of the owner's own
    /// traversal.
    fn mark_utf8_refs(&self, marker: &mut RefMarker<'_>) -> Result<()>;

    /// Mark every index used as a `NameAndType` reference
    ///
    /// # Errors
    /// Propagates errors from [`RefMarker::mark`], or reports a failure of the owner's own
    /// traversal.
    fn mark_name_type_refs(&self, marker: &mut RefMarker<'_>) -> Result<()>;
}

/// Restricted view of a [`ConstantPool`] handed to a [`PoolOwner`] during the remark phase.
pub struct RefMarker<'a> {
    pool: &'a mut ConstantPool,
    kind: RefKind,
    marked: usize,
}

impl<'a> RefMarker<'a> {
    pub(crate) fn new(pool: &'a mut ConstantPool, kind: RefKind) -> Self {
        RefMarker {
            pool,
            kind,
            marked: 0,
        }
    }

    /// The kind of reference this marker is collecting
    pub fn kind(&self) -> RefKind {
        self.kind
    }

    /// Count one use of the entry at `index`
    ///
    /// # Errors
    /// Same as [`ConstantPool::inc_ref_count`]
    pub fn mark(&mut self, index: usize) -> Result<()> {
        self.pool.inc_ref_count(index)?;
        self.marked += 1;
        Ok(())
    }

    /// Count one use for each index in `indices`
    ///
    /// # Errors
    /// Stops at the first index rejected by [`ConstantPool::inc_ref_count`]
    pub fn mark_all<I>(&mut self, indices: I) -> Result<()>
    where
        I: IntoIterator<Item = usize>,
    {
        indices.into_iter().try_for_each(|index| self.mark(index))
    }

    /// Number of successful marks so far
    pub fn marked(&self) -> usize {
        self.marked
    }
}
