//! Pool configuration
//!
//! Controls how permissive a [`crate::ConstantPool`] is towards malformed input and whether
//! blanked text slots are reused.

/// Maximum number of slots a class-file constant pool can address (`constant_pool_count` is a u16)
pub const CLASSFILE_MAX_ENTRIES: usize = 0xFFFF;

/// Configuration for a [`crate::ConstantPool`]
///
/// The defaults mirror the behaviour existing class rewriting tools rely on: reference count
/// adjustments on empty slots are silently ignored, and blanked text entries are recycled
/// before the pool grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Report reference count adjustments on empty slots as [`crate::Error::EmptySlot`]
    /// instead of ignoring them. JDK 1.2 era compilers reference the unused second slot of
    /// `Long`/`Double` constants, so this is off by default.
    pub reject_empty_slots: bool,

    /// Reuse `Utf8` slots whose reference count dropped to zero when interning new text
    pub recycle_blanked_utf8: bool,

    /// Upper bound on the number of slots, including reserved and empty ones (default: 65535)
    pub max_entries: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            reject_empty_slots: false,
            recycle_blanked_utf8: true,
            max_entries: CLASSFILE_MAX_ENTRIES,
        }
    }
}

impl PoolConfig {
    /// Creates the legacy-compatible configuration, identical to [`PoolConfig::default`]
    #[must_use]
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Creates a configuration which treats every access to an empty slot as an error
    ///
    /// Useful when the input is known to come from a modern compiler, where such an access
    /// can only mean a defect in the owner's traversal.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            reject_empty_slots: true,
            ..Self::default()
        }
    }

    /// Creates a configuration which never reuses blanked text slots
    ///
    /// Newly interned text is always appended, keeping the index of every blanked entry stable
    /// until a later compaction pass.
    #[must_use]
    pub fn append_only() -> Self {
        Self {
            recycle_blanked_utf8: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_presets() {
        let permissive = PoolConfig::permissive();
        assert!(!permissive.reject_empty_slots);
        assert!(permissive.recycle_blanked_utf8);
        assert_eq!(permissive.max_entries, CLASSFILE_MAX_ENTRIES);

        let strict = PoolConfig::strict();
        assert!(strict.reject_empty_slots);
        assert!(strict.recycle_blanked_utf8);

        let append_only = PoolConfig::append_only();
        assert!(!append_only.reject_empty_slots);
        assert!(!append_only.recycle_blanked_utf8);
    }

    #[test]
    fn test_default_config() {
        assert_eq!(PoolConfig::default(), PoolConfig::permissive());
    }
}
