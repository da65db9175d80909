//! Mark and sweep reconciliation of constant pool reference counts.
//!
//! A rewriting pass is free to add, drop and redirect references in the class structures
//! without telling the pool. Before the class is written, [`ConstantPool::update_ref_count`]
//! recomputes every count from scratch:
//!
//! 1. **Reset** - every entry's count is set to zero
//! 2. **Remark** - the owner marks each index it uses as `Utf8`, then each `NameAndType` index
//! 3. **Sweep** - `Utf8` entries still at zero are blanked, keeping their slot
//!
//! Each call is a full recomputation; no state carries over between calls.

use crate::{
    constpool::{CpEntry, PoolOwner, RefKind, RefMarker},
    ConstantPool, Result,
};

/// Outcome of a single [`ConstantPool::update_ref_count`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Number of `Utf8` references marked by the owner
    pub utf8_marks: usize,
    /// Number of `NameAndType` references marked by the owner
    pub name_type_marks: usize,
    /// `Utf8` entries left without references and blanked by the sweep
    pub blanked: usize,
}

impl ConstantPool {
    /// Recompute all reference counts from the structures of `owner` and blank unused text
    ///
    /// After a successful run every index the owner marked has a count equal to the number of
    /// times it was marked, and every `Utf8` entry with a count of zero has an empty payload.
    ///
    /// # Errors
    /// Propagates the first error raised while the owner marks its references. The counts are
    /// left partially rebuilt in that case and the pool must not be serialized.
    pub fn update_ref_count<O>(&mut self, owner: &O) -> Result<ReconcileSummary>
    where
        O: PoolOwner + ?Sized,
    {
        for entry in self.pool.iter_mut().flatten() {
            entry.reset_ref_count();
        }

        let utf8_marks = {
            let mut marker = RefMarker::new(self, RefKind::Utf8);
            owner.mark_utf8_refs(&mut marker)?;
            marker.marked()
        };

        let name_type_marks = {
            let mut marker = RefMarker::new(self, RefKind::NameAndType);
            owner.mark_name_type_refs(&mut marker)?;
            marker.marked()
        };

        let mut blanked = 0;
        for entry in self.pool.iter_mut().flatten() {
            match entry {
                CpEntry::Utf8(info) if info.is_blank() => {
                    info.clear_text();
                    blanked += 1;
                }
                CpEntry::Utf8(_) | CpEntry::Opaque(_) => {}
            }
        }

        let summary = ReconcileSummary {
            utf8_marks,
            name_type_marks,
            blanked,
        };
        tracing::debug!(
            slots = self.pool.len(),
            utf8_marks,
            name_type_marks,
            blanked,
            "reconciled constant pool"
        );

        Ok(summary)
    }
}
