#![no_main]

use classpool::{ConstantPool, CpEntry, CpTag, Error, PoolOwner, RefMarker, Result};
use libfuzzer_sys::fuzz_target;

const WORDS: [&str; 4] = ["", "a", "Main", "()V"];

struct Marks<'a>(&'a [u8]);

impl PoolOwner for Marks<'_> {
    fn mark_utf8_refs(&self, marker: &mut RefMarker<'_>) -> Result<()> {
        marker.mark_all(self.0.iter().map(|byte| usize::from(*byte)))
    }

    fn mark_name_type_refs(&self, _marker: &mut RefMarker<'_>) -> Result<()> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let mut pool = ConstantPool::new(vec![
        None,
        Some(CpEntry::utf8("a")),
        Some(CpEntry::opaque(CpTag::Long, vec![0; 8])),
        None,
    ]);

    for chunk in data.chunks(2) {
        let (op, arg) = (chunk[0], chunk.get(1).copied().unwrap_or(0));
        let index = usize::from(arg) % (pool.len() + 1);

        let result = match op % 5 {
            0 => pool.inc_ref_count(index),
            1 => pool.dec_ref_count(index),
            2 => pool
                .add_utf8_entry(WORDS[usize::from(arg) % WORDS.len()])
                .map(|_| ()),
            3 => pool
                .remap_utf8_to(WORDS[usize::from(op) % WORDS.len()], index)
                .map(|_| ()),
            _ => pool.update_ref_count(&Marks(&data[..usize::from(arg) % data.len()])).map(|_| ()),
        };

        let swept = op % 5 == 4 && result.is_ok();
        match result {
            Ok(()) | Err(Error::Consistency { .. }) | Err(Error::IndexOutOfRange { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }

        if swept {
            for (_, entry) in pool.entries() {
                if let Some(info) = entry.as_utf8() {
                    assert!(info.ref_count() > 0 || info.text().is_empty());
                }
            }
        }
    }
});
