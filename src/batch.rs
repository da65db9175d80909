//! Failure isolation for pipelines that process many classes.
//!
//! Every class owns its own [`ConstantPool`], so pools of different classes never share state
//! and can be reconciled in parallel. An error in one class (an out of range index, a count
//! underflow, a failing owner traversal) means that class cannot be written, but it must not
//! abort the remaining classes of the batch. The helpers here run a per-class pass on a rayon
//! thread pool and collect one outcome per class.
//!
//! # Usage Examples
//!
//! ```rust
//! use classpool::batch::{reconcile_all, PooledClass};
//! use classpool::{ConstantPool, CpEntry, PoolOwner, RefMarker, Result};
//!
//! struct Body {
//!     name: usize,
//! }
//!
//! impl PoolOwner for Body {
//!     fn mark_utf8_refs(&self, marker: &mut RefMarker<'_>) -> Result<()> {
//!         marker.mark(self.name)
//!     }
//!
//!     fn mark_name_type_refs(&self, _marker: &mut RefMarker<'_>) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! struct Class {
//!     pool: ConstantPool,
//!     body: Body,
//! }
//!
//! impl PooledClass for Class {
//!     type Owner = Body;
//!
//!     fn pool_and_owner(&mut self) -> (&mut ConstantPool, &Body) {
//!         (&mut self.pool, &self.body)
//!     }
//! }
//!
//! let mut classes = vec![
//!     Class { pool: ConstantPool::new(vec![None, Some(CpEntry::utf8("A"))]), body: Body { name: 1 } },
//!     Class { pool: ConstantPool::new(vec![None]), body: Body { name: 7 } },
//! ];
//!
//! let report = reconcile_all(&mut classes);
//! assert_eq!(report.succeeded(), 1);
//! assert_eq!(report.failed_indices(), vec![1]);
//! ```

use rayon::prelude::*;

use crate::{ConstantPool, Error, PoolOwner, ReconcileSummary, Result};

/// A class that owns a [`ConstantPool`] alongside the structures referencing it.
///
/// The two are returned as disjoint borrows so the pool can be mutated while the owner is read.
pub trait PooledClass {
    /// The part of the class that marks pool references
    type Owner: PoolOwner + ?Sized;

    /// Split the class into its pool and the structures that reference it
    fn pool_and_owner(&mut self) -> (&mut ConstantPool, &Self::Owner);
}

/// Per-class outcomes of a batch run, in input order
#[derive(Debug)]
pub struct BatchReport<T> {
    /// One result per input item
    pub outcomes: Vec<Result<T>>,
}

impl<T> BatchReport<T> {
    /// Number of items that were processed successfully
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_ok()).count()
    }

    /// Number of items that failed
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Input positions of the items that failed
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures().map(|(index, _)| index).collect()
    }

    /// Input positions and errors of the items that failed
    pub fn failures(&self) -> impl Iterator<Item = (usize, &Error)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, outcome)| outcome.as_ref().err().map(|err| (index, err)))
    }

    /// Returns true if every item succeeded
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.is_ok())
    }
}

/// Apply `pass` to every item in parallel, isolating failures per item
///
/// Failed items are logged and reported in the returned [`BatchReport`]; they never stop the
/// processing of other items.
pub fn process_isolated<C, T, F>(items: &mut [C], pass: F) -> BatchReport<T>
where
    C: Send,
    T: Send,
    F: Fn(&mut C) -> Result<T> + Sync,
{
    let span = tracing::info_span!("batch", items = items.len());
    let _enter = span.enter();

    let outcomes: Vec<Result<T>> = items
        .par_iter_mut()
        .enumerate()
        .map(|(index, item)| {
            let outcome = pass(item);
            if let Err(err) = &outcome {
                tracing::warn!(index, error = %err, "skipping class");
            }
            outcome
        })
        .collect();

    let report = BatchReport { outcomes };
    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "batch complete"
    );
    report
}

/// Reconcile the constant pool of every class, see [`ConstantPool::update_ref_count`]
pub fn reconcile_all<C>(classes: &mut [C]) -> BatchReport<ReconcileSummary>
where
    C: PooledClass + Send,
{
    process_isolated(classes, |class| {
        let (pool, owner) = class.pool_and_owner();
        pool.update_ref_count(owner)
    })
}
