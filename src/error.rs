use thiserror::Error;

macro_rules! consistency_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Consistency {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Consistency {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant is fatal for the class whose pool produced it: a constant pool that failed one
/// of these checks cannot be serialized into a valid class file, so the driving pipeline should
/// skip that class instead of attempting a partial repair. See [`crate::batch`] for a helper that
/// isolates such failures across a batch of classes.
///
/// # Error Categories
///
/// ## Indexing Errors
/// - [`Error::IndexOutOfRange`] - Pool access past the last slot
/// - [`Error::EmptySlot`] - Access to an unoccupied slot while running with a strict config
/// - [`Error::NotUtf8`] - A text payload was requested from a non-text slot
///
/// ## Bookkeeping Errors
/// - [`Error::Consistency`] - A reference count would have become negative
/// - [`Error::CapacityExceeded`] - The pool cannot grow any further
///
/// ## Owner Errors
/// - [`Error::Error`] - Failure reported by an owner while walking its structures
#[derive(Error, Debug)]
pub enum Error {
    /// A pool index at or past the end of the pool was accessed.
    ///
    /// # Fields
    ///
    /// * `index` - The requested index
    /// * `length` - The number of slots in the pool at the time of access
    #[error("Constant pool index out of range - {index} (length {length})")]
    IndexOutOfRange {
        /// The index that was requested
        index: usize,
        /// The length of the pool
        length: usize,
    },

    /// The pool bookkeeping no longer matches the references held by its owner.
    ///
    /// Raised when a decrement would drive a reference count below zero, which indicates a
    /// defect in the owner's traversal or a malformed input class. The error includes the
    /// source location where the mismatch was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the mismatch
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Consistency - {file}:{line}: {message}")]
    Consistency {
        /// The message to be printed for the Consistency error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A reference count was adjusted on a slot that holds no entry.
    ///
    /// Only produced when [`crate::PoolConfig::reject_empty_slots`] is set; the default
    /// configuration tolerates such accesses, since older compilers emit references into
    /// the unused half of `Long`/`Double` constants.
    #[error("Constant pool slot {0} is empty")]
    EmptySlot(usize),

    /// The slot at the given index does not hold a `Utf8` entry.
    #[error("Constant pool entry {0} is not a Utf8 entry")]
    NotUtf8(usize),

    /// No further entries can be appended to the pool.
    ///
    /// The associated value is the configured maximum number of slots.
    #[error("Constant pool is full - maximum of {0} entries")]
    CapacityExceeded(usize),

    /// Generic error for miscellaneous failures.
    ///
    /// Used by [`crate::PoolOwner`] implementations to report problems found while walking
    /// their own structures.
    #[error("{0}")]
    Error(String),
}
