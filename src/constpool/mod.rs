//! Reference-counted constant pool of a compiled class.
//!
//! This module provides [`ConstantPool`], the table of symbolic constants that the fields,
//! methods, attributes and code of a class refer to by index. A class rewriting pass (renaming
//! classes, members or descriptors) changes which entries are in use; the pool keeps every index
//! stable while doing so, interns new text, and reclaims text entries that are no longer used.
//!
//! # Key Components
//!
//! - [`ConstantPool`] - Ordered slot table with co-located reference counts
//! - [`CpEntry`] - Occupied slot, either a `Utf8` text entry or an opaque constant
//! - [`PoolOwner`] / [`RefMarker`] - Callbacks through which the owning class re-marks references
//! - [`PoolConfig`] - Strictness and recycling options
//!
//! # Index Management
//!
//! Slot positions are pool indices. The pool never reorders or removes slots; the caller is
//! responsible for the index convention of the binary format (e.g. the reserved slot 0 and the
//! unused slot following each `Long`/`Double`, which are passed in as `None`).
//!
//! Text entries that lose all their references are *blanked*: their payload is cleared but the
//! slot stays allocated, as finalized structures may still hold the index numerically. Blanked
//! slots are reused by [`ConstantPool::add_utf8_entry`] before the pool grows.
//!
//! # Usage Examples
//!
//! ```rust
//! use classpool::{ConstantPool, CpEntry, CpTag};
//!
//! let mut pool = ConstantPool::new(vec![
//!     None,
//!     Some(CpEntry::utf8("com/example/Foo").with_ref_count(1)),
//!     Some(CpEntry::opaque(CpTag::Class, vec![0x00, 0x01]).with_ref_count(1)),
//! ]);
//!
//! // Redirect the class name; the old entry loses its single reference
//! let index = pool.remap_utf8_to("a/a", 1)?;
//! assert_eq!(index, 1);
//! assert_eq!(pool.get_utf8(index)?, "a/a");
//! # Ok::<(), classpool::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! A [`ConstantPool`] is owned by exactly one class and mutated through `&mut` only. Pools of
//! different classes are independent and can be processed in parallel, see [`crate::batch`].

mod config;
mod entry;
mod owner;
mod reconcile;

pub use config::{PoolConfig, CLASSFILE_MAX_ENTRIES};
pub use entry::{CpEntry, CpTag, OpaqueInfo, Utf8Info};
pub use owner::{PoolOwner, RefKind, RefMarker};
pub use reconcile::ReconcileSummary;

use crate::{Error, Result};

/// Slot counts of a [`ConstantPool`] at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total number of slots, occupied or not
    pub slots: usize,
    /// Slots holding no entry
    pub empty: usize,
    /// `Utf8` entries with at least one reference
    pub live_utf8: usize,
    /// `Utf8` entries without references
    pub blank_utf8: usize,
    /// All other entries
    pub opaque: usize,
}

/// The constant pool of a single class
///
/// See the [module documentation](self) for the index conventions.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    pool: Vec<Option<CpEntry>>,
    config: PoolConfig,
}

impl ConstantPool {
    /// Create a pool from an ordered list of parsed slots, using the default [`PoolConfig`]
    ///
    /// ## Arguments
    /// * 'entries' - The slots in pool order; `None` marks a reserved or unused slot
    pub fn new(entries: Vec<Option<CpEntry>>) -> Self {
        Self::with_config(entries, PoolConfig::default())
    }

    /// Create a pool from an ordered list of parsed slots with an explicit [`PoolConfig`]
    pub fn with_config(entries: Vec<Option<CpEntry>>, config: PoolConfig) -> Self {
        ConstantPool {
            pool: entries,
            config,
        }
    }

    /// The configuration this pool was created with
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Return the number of slots
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Returns true if the pool has no slots at all
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Return the entry at `index`, or `None` if the slot is unoccupied
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index >= self.len()`
    pub fn get(&self, index: usize) -> Result<Option<&CpEntry>> {
        match self.pool.get(index) {
            Some(slot) => Ok(slot.as_ref()),
            None => Err(self.out_of_range(index)),
        }
    }

    /// Return the payload of the `Utf8` entry at `index`
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] for an invalid index, or [`Error::NotUtf8`] if the
    /// slot is empty or holds another constant kind
    pub fn get_utf8(&self, index: usize) -> Result<&str> {
        match self.get(index)? {
            Some(CpEntry::Utf8(info)) => Ok(info.text()),
            _ => Err(Error::NotUtf8(index)),
        }
    }

    /// Return the reference count of the entry at `index`; empty slots report zero
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index >= self.len()`
    pub fn ref_count(&self, index: usize) -> Result<u32> {
        Ok(self.get(index)?.map_or(0, CpEntry::ref_count))
    }

    /// Find the first `Utf8` entry whose payload equals `text`, without touching its count
    pub fn find_utf8(&self, text: &str) -> Option<usize> {
        self.pool.iter().position(|slot| match slot {
            Some(CpEntry::Utf8(info)) => info.text() == text,
            _ => false,
        })
    }

    /// Iterate over all slots in pool order
    pub fn iter(&self) -> std::slice::Iter<'_, Option<CpEntry>> {
        self.pool.iter()
    }

    /// Iterate over the occupied slots together with their index
    pub fn entries(&self) -> impl Iterator<Item = (usize, &CpEntry)> {
        self.pool
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|entry| (index, entry)))
    }

    /// Increment the reference count of the entry at `index`
    ///
    /// Empty slots are ignored unless [`PoolConfig::reject_empty_slots`] is set.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] for an invalid index, or [`Error::EmptySlot`] for an
    /// empty slot under a strict configuration
    pub fn inc_ref_count(&mut self, index: usize) -> Result<()> {
        if let Some(entry) = self.slot_mut(index)? {
            entry.inc_ref_count();
        }
        Ok(())
    }

    /// Decrement the reference count of the entry at `index`
    ///
    /// Empty slots are ignored unless [`PoolConfig::reject_empty_slots`] is set.
    ///
    /// # Errors
    /// Returns [`Error::Consistency`] if the count is already zero, in addition to the errors
    /// of [`ConstantPool::inc_ref_count`]
    pub fn dec_ref_count(&mut self, index: usize) -> Result<()> {
        match self.slot_mut(index)? {
            Some(entry) => entry.dec_ref_count(index),
            None => Ok(()),
        }
    }

    /// Append `entry` to the end of the pool and return its index
    ///
    /// Never reuses existing slots; see [`ConstantPool::add_utf8_entry`] for text.
    ///
    /// # Errors
    /// Returns [`Error::CapacityExceeded`] if the pool already holds
    /// [`PoolConfig::max_entries`] slots
    pub fn add_entry(&mut self, entry: CpEntry) -> Result<usize> {
        if self.pool.len() >= self.config.max_entries {
            return Err(Error::CapacityExceeded(self.config.max_entries));
        }

        let index = self.pool.len();
        self.pool.push(Some(entry));
        Ok(index)
    }

    /// Intern `text` and return the index of a `Utf8` entry holding it
    ///
    /// 1. An existing entry with the same payload gains one reference.
    /// 2. Otherwise the first blanked entry is overwritten and given one reference.
    /// 3. Otherwise a new entry with one reference is appended.
    ///
    /// # Errors
    /// Returns [`Error::CapacityExceeded`] if a new entry is needed but the pool is full
    pub fn add_utf8_entry(&mut self, text: &str) -> Result<usize> {
        if let Some(index) = self.find_utf8(text) {
            if let Some(entry) = self.pool[index].as_mut() {
                entry.inc_ref_count();
            }
            return Ok(index);
        }

        if self.config.recycle_blanked_utf8 {
            let blank = self.pool.iter_mut().enumerate().find_map(|(index, slot)| match slot {
                Some(CpEntry::Utf8(info)) if info.is_blank() => Some((index, info)),
                _ => None,
            });

            if let Some((index, info)) = blank {
                tracing::trace!(index, text, "recycling blanked utf8 slot");
                info.revive(text);
                return Ok(index);
            }
        }

        let index = self.add_entry(CpEntry::utf8(text).with_ref_count(1))?;
        tracing::trace!(index, text, "appended utf8 entry");
        Ok(index)
    }

    /// Point a consumer of the `Utf8` entry at `old_index` at `new_text` instead
    ///
    /// Drops one reference from `old_index`, then interns `new_text`. If `old_index` loses its
    /// last reference it becomes the first candidate for recycling, so renaming a symbol that
    /// is used once typically rewrites that slot in place.
    ///
    /// # Errors
    /// Any error from [`ConstantPool::dec_ref_count`] or [`ConstantPool::add_utf8_entry`]
    pub fn remap_utf8_to(&mut self, new_text: &str, old_index: usize) -> Result<usize> {
        self.dec_ref_count(old_index)?;
        self.add_utf8_entry(new_text)
    }

    /// Count slots by state
    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats {
            slots: self.pool.len(),
            ..PoolStats::default()
        };

        for slot in &self.pool {
            match slot {
                None => stats.empty += 1,
                Some(CpEntry::Utf8(info)) if info.is_blank() => stats.blank_utf8 += 1,
                Some(CpEntry::Utf8(_)) => stats.live_utf8 += 1,
                Some(CpEntry::Opaque(_)) => stats.opaque += 1,
            }
        }

        stats
    }

    /// Consume the pool and return its slots, e.g. for serialization
    pub fn into_entries(self) -> Vec<Option<CpEntry>> {
        self.pool
    }

    fn slot_mut(&mut self, index: usize) -> Result<Option<&mut CpEntry>> {
        let length = self.pool.len();
        let reject_empty = self.config.reject_empty_slots;

        match self.pool.get_mut(index) {
            Some(Some(entry)) => Ok(Some(entry)),
            Some(None) if reject_empty => Err(Error::EmptySlot(index)),
            Some(None) => {
                tracing::trace!(index, "ignoring reference count change on empty slot");
                Ok(None)
            }
            None => Err(Error::IndexOutOfRange { index, length }),
        }
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::IndexOutOfRange {
            index,
            length: self.pool.len(),
        }
    }
}

impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a Option<CpEntry>;
    type IntoIter = std::slice::Iter<'a, Option<CpEntry>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{sample_pool, utf8_at};

    #[test]
    fn get_bounds() {
        let pool = sample_pool();

        assert!(pool.get(0).unwrap().is_none());
        assert_eq!(pool.get(1).unwrap().unwrap().tag(), CpTag::Utf8);

        for index in [pool.len(), pool.len() + 1, usize::MAX] {
            match pool.get(index) {
                Err(Error::IndexOutOfRange { index: got, length }) => {
                    assert_eq!(got, index);
                    assert_eq!(length, pool.len());
                }
                other => panic!("unexpected result for {index}: {other:?}"),
            }
        }
    }

    #[test]
    fn get_utf8_kinds() {
        let pool = sample_pool();
        assert_eq!(pool.get_utf8(1).unwrap(), "com/example/Widget");
        assert!(matches!(pool.get_utf8(0), Err(Error::NotUtf8(0))));
        assert!(matches!(pool.get_utf8(2), Err(Error::NotUtf8(2))));
    }

    #[test]
    fn inc_dec() {
        let mut pool = sample_pool();
        let before = pool.ref_count(1).unwrap();

        pool.inc_ref_count(1).unwrap();
        assert_eq!(pool.ref_count(1).unwrap(), before + 1);

        pool.dec_ref_count(1).unwrap();
        pool.dec_ref_count(1).unwrap();
        assert_eq!(pool.ref_count(1).unwrap(), before - 1);
    }

    #[test]
    fn dec_below_zero() {
        let mut pool = ConstantPool::new(vec![Some(CpEntry::utf8("x").with_ref_count(1))]);
        pool.dec_ref_count(0).unwrap();
        assert!(matches!(
            pool.dec_ref_count(0),
            Err(Error::Consistency { .. })
        ));
        assert_eq!(pool.ref_count(0).unwrap(), 0);
    }

    #[test]
    fn empty_slot_permissive() {
        let mut pool = sample_pool();
        pool.inc_ref_count(0).unwrap();
        pool.dec_ref_count(0).unwrap();
        pool.dec_ref_count(0).unwrap();
        assert_eq!(pool.ref_count(0).unwrap(), 0);
    }

    #[test]
    fn empty_slot_strict() {
        let mut pool =
            ConstantPool::with_config(sample_pool().into_entries(), PoolConfig::strict());
        assert!(matches!(pool.inc_ref_count(0), Err(Error::EmptySlot(0))));
        assert!(matches!(pool.dec_ref_count(0), Err(Error::EmptySlot(0))));
    }

    #[test]
    fn inc_out_of_range() {
        let mut pool = sample_pool();
        let length = pool.len();
        assert!(matches!(
            pool.inc_ref_count(length),
            Err(Error::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            pool.dec_ref_count(length + 3),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn add_entry_appends() {
        let mut pool = sample_pool();
        let length = pool.len();

        let index = pool
            .add_entry(CpEntry::opaque(CpTag::Integer, vec![0, 0, 0, 1]))
            .unwrap();
        assert_eq!(index, length);
        assert_eq!(pool.len(), length + 1);
        assert_eq!(pool.get(index).unwrap().unwrap().tag(), CpTag::Integer);
    }

    #[test]
    fn add_entry_capacity() {
        let config = PoolConfig {
            max_entries: 2,
            ..PoolConfig::default()
        };
        let mut pool = ConstantPool::with_config(vec![None], config);

        assert_eq!(pool.add_entry(CpEntry::utf8("a")).unwrap(), 1);
        assert!(matches!(
            pool.add_entry(CpEntry::utf8("b")),
            Err(Error::CapacityExceeded(2))
        ));
        assert!(matches!(
            pool.add_utf8_entry("c"),
            Err(Error::CapacityExceeded(2))
        ));
    }

    #[test]
    fn add_utf8_recycles_unswept_match() {
        // Unreferenced but not yet swept: the payload still matches
        let mut pool = ConstantPool::new(vec![Some(CpEntry::utf8("foo"))]);

        assert_eq!(pool.add_utf8_entry("foo").unwrap(), 0);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.ref_count(0).unwrap(), 1);
        assert_eq!(pool.get_utf8(0).unwrap(), "foo");
    }

    #[test]
    fn add_utf8_dedup() {
        let mut pool = ConstantPool::new(vec![Some(CpEntry::utf8("foo").with_ref_count(1))]);

        assert_eq!(pool.add_utf8_entry("foo").unwrap(), 0);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.ref_count(0).unwrap(), 2);
    }

    #[test]
    fn add_utf8_idempotent() {
        let mut pool = sample_pool();
        let before = pool.ref_count(3).unwrap();

        let first = pool.add_utf8_entry("render").unwrap();
        let second = pool.add_utf8_entry("render").unwrap();
        assert_eq!(first, 3);
        assert_eq!(second, 3);
        assert_eq!(pool.ref_count(3).unwrap(), before + 2);
    }

    #[test]
    fn add_utf8_recycles_blank() {
        let mut pool = ConstantPool::new(vec![
            None,
            Some(CpEntry::utf8("keep").with_ref_count(1)),
            Some(CpEntry::utf8("")),
            Some(CpEntry::utf8("")),
        ]);

        assert_eq!(pool.add_utf8_entry("fresh").unwrap(), 2);
        assert_eq!(utf8_at(&pool, 2), ("fresh", 1));
        assert_eq!(pool.add_utf8_entry("other").unwrap(), 3);
        assert_eq!(utf8_at(&pool, 3), ("other", 1));
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn add_utf8_grows() {
        let mut pool = sample_pool();
        let length = pool.len();

        // Consume the only blanked slot first
        assert_eq!(pool.add_utf8_entry("filler").unwrap(), 4);

        let index = pool.add_utf8_entry("brand/New").unwrap();
        assert_eq!(index, length);
        assert_eq!(utf8_at(&pool, index), ("brand/New", 1));
    }

    #[test]
    fn add_utf8_append_only() {
        let mut pool = ConstantPool::with_config(
            vec![Some(CpEntry::utf8("")), Some(CpEntry::utf8("x").with_ref_count(1))],
            PoolConfig::append_only(),
        );

        assert_eq!(pool.add_utf8_entry("y").unwrap(), 2);
        assert_eq!(utf8_at(&pool, 0), ("", 0));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn remap() {
        let mut pool = sample_pool();
        let before = pool.ref_count(3).unwrap();

        let index = pool.remap_utf8_to("draw", 3).unwrap();
        assert_eq!(pool.get_utf8(index).unwrap(), "draw");
        assert_eq!(pool.ref_count(3).unwrap(), before - 1);
        assert_ne!(index, 3);
    }

    #[test]
    fn remap_single_use_reuses_slot() {
        let mut pool = ConstantPool::new(vec![
            None,
            Some(CpEntry::utf8("old/Name").with_ref_count(1)),
        ]);

        let index = pool.remap_utf8_to("a", 1).unwrap();
        assert_eq!(index, 1);
        assert_eq!(utf8_at(&pool, 1), ("a", 1));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn remap_same_text() {
        let mut pool = ConstantPool::new(vec![Some(CpEntry::utf8("same").with_ref_count(1))]);
        assert_eq!(pool.remap_utf8_to("same", 0).unwrap(), 0);
        assert_eq!(utf8_at(&pool, 0), ("same", 1));
    }

    #[test]
    fn remap_underflow() {
        let mut pool = ConstantPool::new(vec![Some(CpEntry::utf8("zero"))]);
        assert!(matches!(
            pool.remap_utf8_to("new", 0),
            Err(Error::Consistency { .. })
        ));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn iteration() {
        let pool = sample_pool();
        assert_eq!(pool.iter().count(), pool.len());
        assert_eq!((&pool).into_iter().filter(|slot| slot.is_none()).count(), 2);

        let indices: Vec<usize> = pool.entries().map(|(index, _)| index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 6]);
    }

    #[test]
    fn stats() {
        let pool = sample_pool();
        let stats = pool.stats();
        assert_eq!(
            stats,
            PoolStats {
                slots: 7,
                empty: 2,
                live_utf8: 2,
                blank_utf8: 1,
                opaque: 2,
            }
        );
    }
}
