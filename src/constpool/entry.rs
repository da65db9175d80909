//! Constant pool entries and their tags.
//!
//! Every occupied slot of a [`crate::ConstantPool`] holds a [`CpEntry`]. Only `Utf8` entries are
//! interpreted by this crate, since they are the ones that get deduplicated, recycled and blanked.
//! All other constant kinds are carried as [`OpaqueInfo`] with their raw payload untouched; their
//! layout belongs to whoever reads and writes the class-file byte stream.
//!
//! Each entry carries its own reference counter, so counting, deduplication and slot recycling
//! all stay local to the pool.
//!
//! # Reference
//! * [JVMS §4.4](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4) - The Constant Pool

use strum::{Display, EnumCount, EnumIter, FromRepr};

use crate::Result;

/// Tags of the constant kinds that can appear in a class-file constant pool.
///
/// The numeric values correspond to the tag byte that precedes each entry in the binary format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumIter, EnumCount, FromRepr)]
#[repr(u8)]
pub enum CpTag {
    /// `CONSTANT_Utf8` (1) - Modified UTF-8 text used for names, descriptors and literals
    Utf8 = 1,
    /// `CONSTANT_Integer` (3) - 4-byte integer literal
    Integer = 3,
    /// `CONSTANT_Float` (4) - 4-byte floating point literal
    Float = 4,
    /// `CONSTANT_Long` (5) - 8-byte integer literal, occupies two slots
    Long = 5,
    /// `CONSTANT_Double` (6) - 8-byte floating point literal, occupies two slots
    Double = 6,
    /// `CONSTANT_Class` (7) - Reference to a `Utf8` holding a binary class name
    Class = 7,
    /// `CONSTANT_String` (8) - Reference to a `Utf8` holding a string literal
    String = 8,
    /// `CONSTANT_Fieldref` (9) - Class and `NameAndType` of a field
    Fieldref = 9,
    /// `CONSTANT_Methodref` (10) - Class and `NameAndType` of a method
    Methodref = 10,
    /// `CONSTANT_InterfaceMethodref` (11) - Interface and `NameAndType` of a method
    InterfaceMethodref = 11,
    /// `CONSTANT_NameAndType` (12) - Pair of `Utf8` indices for a member name and descriptor
    NameAndType = 12,
    /// `CONSTANT_MethodHandle` (15) - Reference kind plus a member reference
    MethodHandle = 15,
    /// `CONSTANT_MethodType` (16) - Reference to a `Utf8` method descriptor
    MethodType = 16,
    /// `CONSTANT_Dynamic` (17) - Bootstrap method index plus a `NameAndType`
    Dynamic = 17,
    /// `CONSTANT_InvokeDynamic` (18) - Bootstrap method index plus a `NameAndType`
    InvokeDynamic = 18,
    /// `CONSTANT_Module` (19) - Reference to a `Utf8` module name
    Module = 19,
    /// `CONSTANT_Package` (20) - Reference to a `Utf8` package name
    Package = 20,
}

impl CpTag {
    /// Returns true for constants that occupy two consecutive pool slots.
    #[must_use]
    pub fn is_wide(self) -> bool {
        matches!(self, CpTag::Long | CpTag::Double)
    }
}

/// A `Utf8` constant together with its reference count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utf8Info {
    text: String,
    ref_count: u32,
}

impl Utf8Info {
    /// Create a new text entry with a reference count of zero
    pub fn new(text: impl Into<String>) -> Self {
        Utf8Info {
            text: text.into(),
            ref_count: 0,
        }
    }

    /// The current payload. Empty once the entry has been blanked.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of references currently counted against this entry
    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    /// Returns true if no reference is counted against this entry and it may be recycled
    pub fn is_blank(&self) -> bool {
        self.ref_count == 0
    }

    /// Overwrite a blanked entry with new text and a single reference
    pub(crate) fn revive(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.ref_count = 1;
    }

    pub(crate) fn clear_text(&mut self) {
        self.text.clear();
    }
}

/// Any non-`Utf8` constant. The payload is stored exactly as read and is never interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpaqueInfo {
    tag: CpTag,
    data: Vec<u8>,
    ref_count: u32,
}

impl OpaqueInfo {
    /// Create a new opaque entry with a reference count of zero
    ///
    /// ## Arguments
    /// * 'tag'  - The constant kind
    /// * 'data' - The raw entry body following the tag byte
    pub fn new(tag: CpTag, data: Vec<u8>) -> Self {
        OpaqueInfo {
            tag,
            data,
            ref_count: 0,
        }
    }

    /// The constant kind of this entry
    pub fn tag(&self) -> CpTag {
        self.tag
    }

    /// The raw entry body
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of references currently counted against this entry
    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }
}

/// An occupied constant pool slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CpEntry {
    /// Text entry, subject to interning and blanking
    Utf8(Utf8Info),
    /// Every other constant kind
    Opaque(OpaqueInfo),
}

impl CpEntry {
    /// Shorthand for a fresh `Utf8` entry with no references
    pub fn utf8(text: impl Into<String>) -> Self {
        CpEntry::Utf8(Utf8Info::new(text))
    }

    /// Shorthand for a fresh opaque entry with no references
    pub fn opaque(tag: CpTag, data: Vec<u8>) -> Self {
        CpEntry::Opaque(OpaqueInfo::new(tag, data))
    }

    /// The constant kind of this entry
    pub fn tag(&self) -> CpTag {
        match self {
            CpEntry::Utf8(_) => CpTag::Utf8,
            CpEntry::Opaque(info) => info.tag,
        }
    }

    /// Number of references currently counted against this entry
    pub fn ref_count(&self) -> u32 {
        *self.counter()
    }

    /// Returns the text entry, if this is one
    pub fn as_utf8(&self) -> Option<&Utf8Info> {
        match self {
            CpEntry::Utf8(info) => Some(info),
            CpEntry::Opaque(_) => None,
        }
    }

    /// Replace the reference count. Used when constructing pools whose counts are already known.
    #[must_use]
    pub fn with_ref_count(mut self, ref_count: u32) -> Self {
        *self.counter_mut() = ref_count;
        self
    }

    pub(crate) fn inc_ref_count(&mut self) {
        let counter = self.counter_mut();
        *counter = counter.saturating_add(1);
    }

    /// # Errors
    /// Returns [`crate::Error::Consistency`] if the count is already zero
    pub(crate) fn dec_ref_count(&mut self, index: usize) -> Result<()> {
        let tag = self.tag();
        let counter = self.counter_mut();
        match counter.checked_sub(1) {
            Some(value) => {
                *counter = value;
                Ok(())
            }
            None => Err(consistency_error!(
                "Reference count of {} entry at index {} would drop below zero",
                tag,
                index
            )),
        }
    }

    pub(crate) fn reset_ref_count(&mut self) {
        *self.counter_mut() = 0;
    }

    fn counter(&self) -> &u32 {
        match self {
            CpEntry::Utf8(info) => &info.ref_count,
            CpEntry::Opaque(info) => &info.ref_count,
        }
    }

    fn counter_mut(&mut self) -> &mut u32 {
        match self {
            CpEntry::Utf8(info) => &mut info.ref_count,
            CpEntry::Opaque(info) => &mut info.ref_count,
        }
    }
}
