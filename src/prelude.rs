//! # classpool Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the classpool library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all classpool operations
pub use crate::Error;

/// The result type used throughout classpool
pub use crate::Result;

/// Strictness and recycling options of a pool
pub use crate::PoolConfig;

// ================================================================================================
// Constant Pool
// ================================================================================================

/// The pool itself and its slot statistics
pub use crate::{ConstantPool, PoolStats, ReconcileSummary};

/// Pool entries
pub use crate::{CpEntry, CpTag, OpaqueInfo, Utf8Info};

/// Owner callbacks used during reconciliation
pub use crate::{PoolOwner, RefKind, RefMarker};

// ================================================================================================
// Batch Processing
// ================================================================================================

/// Failure-isolating batch helpers
pub use crate::batch::{process_isolated, reconcile_all, BatchReport, PooledClass};
