//! Resolution of the kernel thunk table into named import symbols.
//!
//! The thunk table lists kernel symbols to be imported into the XBE process.
//! Each entry is either an import by ordinal (high bit set) or a plain address.
//! The loader replaces every ordinal entry by the address of the kernel export
//! just before the XBE is launched, so after loading, each table slot holds a
//! pointer to the named export. The table ends with a zero entry.

use crate::config::{Limits, LoadConfig};
use crate::image::{Symbol, SymbolKind};
use crate::kernel_symbols::KernelExports;
use crate::utils::{read_u32_at, SliceExt};
use crate::{Error, Xbe};

const ORDINAL_FLAG: u32 = 0x8000_0000;

/// A decoded, non-terminating thunk table entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ThunkEntry {
    /// Import of the kernel export with this ordinal.
    Ordinal(u32),
    /// A raw address, there is nothing to name here.
    Address(u32),
}

impl ThunkEntry {
    /// Decodes a table entry. Returns `None` for the terminating zero entry.
    pub fn from_raw(raw: u32) -> Option<Self> {
        if raw == 0 {
            None
        } else if raw & ORDINAL_FLAG != 0 {
            Some(ThunkEntry::Ordinal(raw & !ORDINAL_FLAG))
        } else {
            Some(ThunkEntry::Address(raw))
        }
    }
}

/// Resolves the kernel thunk table of `xbe` into imported-data symbols, one
/// per ordinal entry, placed at the entry's slot address.
///
/// Returns no symbols if the image doesn't import anything from the kernel.
pub fn resolve_kernel_thunks(xbe: &Xbe, config: &LoadConfig) -> Result<Vec<Symbol>, Error> {
    let table_addr = xbe.kernel_thunk_addr();
    if table_addr == 0 {
        info!("image has no kernel thunk table");
        return Ok(Vec::new());
    }

    let not_mapped =
        || Error::Malformed(format!("kernel thunk virt. address {:#08X} not mapped", table_addr));
    let section = xbe.find_section_containing(table_addr).ok_or_else(not_mapped)?;
    let table_offset = section.translate(table_addr).ok_or_else(not_mapped)?;

    // the table may not run past the data its section maps
    let backing = xbe.raw_data().try_get(0..section.file_backed_end())?;

    scan_thunk_table(
        backing,
        table_offset,
        table_addr,
        &config.limits,
        config.kernel_exports,
    )
}

/// Scans the thunk table at file offset `table_offset` (mapped at virtual
/// address `table_addr`) until the terminating zero entry.
///
/// `data` has to end where the table's section data ends. Fails if the table
/// runs off the end of `data` or has more than
/// `limits.max_thunk_entries` entries before the terminator.
pub fn scan_thunk_table(
    data: &[u8],
    table_offset: u32,
    table_addr: u32,
    limits: &Limits,
    exports: &KernelExports,
) -> Result<Vec<Symbol>, Error> {
    let mut symbols = Vec::new();
    let mut index = 0u32;
    loop {
        let slot = index
            .checked_mul(4)
            .and_then(|rel| Some((table_offset.checked_add(rel)?, table_addr.checked_add(rel)?)));
        let (offset, addr) = slot.ok_or_else(|| Error::addr_overflow(table_addr, index))?;

        let raw = read_u32_at(data, offset).map_err(|_| {
            Error::Malformed(format!(
                "kernel thunk table at {:#08X} runs past its section's data at slot {:#08X}",
                table_addr, addr
            ))
        })?;
        let entry = match ThunkEntry::from_raw(raw) {
            Some(entry) => entry,
            None => break,
        };

        if index == limits.max_thunk_entries {
            return Err(Error::Malformed(format!(
                "kernel thunk table at {:#08X} is not terminated within {} entries",
                table_addr, limits.max_thunk_entries
            )));
        }

        match entry {
            ThunkEntry::Ordinal(ordinal) => {
                let name = match exports.lookup(ordinal) {
                    Some(name) => name.to_string(),
                    None => {
                        warn!("unknown kernel import ordinal {} in thunk slot {:#08X}", ordinal, addr);
                        exports.name_or_placeholder(ordinal).into_owned()
                    }
                };
                debug!("thunk slot {:#08X}: ordinal {} -> {}", addr, ordinal, name);
                symbols.push(Symbol {
                    addr,
                    name,
                    kind: SymbolKind::ImportedData,
                });
            }
            ThunkEntry::Address(target) => {
                debug!("thunk slot {:#08X}: raw address {:#08X}, skipped", addr, target);
            }
        }

        index += 1;
    }

    info!("{} kernel imports in thunk table at {:#08X}", symbols.len(), table_addr);
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel_symbols::XBOXKRNL;

    fn table(entries: &[u32]) -> Vec<u8> {
        entries.iter().flat_map(|e| e.to_le_bytes().to_vec()).collect()
    }

    fn scan(data: &[u8], max: u32) -> Result<Vec<Symbol>, Error> {
        let limits = Limits {
            max_thunk_entries: max,
            ..Limits::default()
        };
        scan_thunk_table(data, 0, 0x20000, &limits, &XBOXKRNL)
    }

    #[test]
    fn entry_decoding() {
        assert_eq!(ThunkEntry::from_raw(0), None);
        assert_eq!(ThunkEntry::from_raw(0x8000_0008), Some(ThunkEntry::Ordinal(8)));
        assert_eq!(ThunkEntry::from_raw(0x0001_2345), Some(ThunkEntry::Address(0x12345)));
        assert_eq!(ThunkEntry::from_raw(0x8000_0000), Some(ThunkEntry::Ordinal(0)));
    }

    #[test]
    fn resolves_ordinals_at_slot_addresses() {
        let data = table(&[0x8000_0008, 0x8000_0BAD, 0x0001_2345, 0x8000_005F, 0]);
        let symbols = scan(&data, 16).unwrap();
        let found = symbols
            .iter()
            .map(|s| (s.addr, s.name.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            found,
            vec![
                (0x20000, "DbgPrint"),
                (0x20004, "kernel_ordinal_2989"),
                (0x2000C, "KeBugCheck"),
            ]
        );
        assert!(symbols.iter().all(|s| s.kind == SymbolKind::ImportedData));
    }

    #[test]
    fn leading_terminator_means_no_imports() {
        assert!(scan(&table(&[0, 0x8000_0008]), 16).unwrap().is_empty());
    }

    #[test]
    fn bound_counts_entries_before_terminator() {
        let data = table(&[0x8000_0001, 0x8000_0002, 0x8000_0003, 0]);
        assert_eq!(scan(&data, 3).unwrap().len(), 3);
        match scan(&data, 2) {
            Err(Error::Malformed(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn table_running_off_the_image_is_malformed() {
        let data = table(&[0x8000_0001, 0x8000_0002]);
        match scan(&data, 16) {
            Err(Error::Malformed(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
