
pub use fixtures::*;

use crate::{ConstantPool, CpEntry, CpTag};

// Helper function to create a small pool covering every slot state
//
//  0: <empty>
//  1: Utf8 "com/example/Widget"  refs 1
//  2: Class -> 1                 refs 1
//  3: Utf8 "render"              refs 2
//  4: Utf8 ""                    refs 0 (blanked)
//  5: <empty>
//  6: NameAndType 3:3            refs 1
pub fn sample_pool() -> ConstantPool {
    ConstantPool::new(vec![
        None,
        Some(CpEntry::utf8("com/example/Widget").with_ref_count(1)),
        Some(CpEntry::opaque(CpTag::Class, vec![0x00, 0x01]).with_ref_count(1)),
        Some(CpEntry::utf8("render").with_ref_count(2)),
        Some(CpEntry::utf8("")),
        None,
        Some(CpEntry::opaque(CpTag::NameAndType, vec![0x00, 0x03, 0x00, 0x03]).with_ref_count(1)),
    ])
}

// Helper function to read a text slot as (payload, refs)
pub fn utf8_at(pool: &ConstantPool, index: usize) -> (&str, u32) {
    let info = pool
        .get(index)
        .unwrap()
        .and_then(CpEntry::as_utf8)
        .unwrap_or_else(|| panic!("slot {index} is not a Utf8 entry"));
    (info.text(), info.ref_count())
}
