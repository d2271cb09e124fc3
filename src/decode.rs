//! Decoding of the XBE header and section table.
//!
//! Most of the information in here is derived from
//! [http://www.caustik.com/cxbx/download/xbe.htm][website].
//!
//! [website]: http://www.caustik.com/cxbx/download/xbe.htm

use crate::config::Limits;
use crate::raw;
use crate::utils::{read_cstr, SliceExt};
use crate::Error;

use std::ops::Range;
use std::u32;

const ENTRY_XOR_DEBUG: u32 = 0x94859D4B;
const ENTRY_XOR_RETAIL: u32 = 0xA8FC57AB;
const THUNK_XOR_DEBUG: u32 = 0xEFB1F152;
const THUNK_XOR_RETAIL: u32 = 0x5B6D40B6;

/// Describes whether an XBE is for debug or retail models of the Xbox.
///
/// This isn't stored anywhere in the image. It only shows in the way the entry
/// point and kernel thunk address are XORed with different keys, so it has to
/// be guessed when the image is loaded (see [`FileHeader::probe_image_kind`]).
///
/// [`FileHeader::probe_image_kind`]: struct.FileHeader.html#method.probe_image_kind
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageKind {
    /// An XBE for retail Xboxes.
    Retail,
    /// An XBE for debug Xboxes / devkits.
    Debug,
}

impl ImageKind {
    /// The XOR key applied to the entry point of this kind of image.
    pub fn entry_key(self) -> u32 {
        match self {
            ImageKind::Retail => ENTRY_XOR_RETAIL,
            ImageKind::Debug => ENTRY_XOR_DEBUG,
        }
    }

    /// The XOR key applied to the kernel thunk address of this kind of image.
    pub fn thunk_key(self) -> u32 {
        match self {
            ImageKind::Retail => THUNK_XOR_RETAIL,
            ImageKind::Debug => THUNK_XOR_DEBUG,
        }
    }

    /// Decodes a stored entry point, assuming it was encoded for this kind.
    pub fn decode_entry_point(self, raw: u32) -> u32 {
        raw ^ self.entry_key()
    }

    /// Decodes a stored kernel thunk address, assuming it was encoded for this
    /// kind.
    pub fn decode_kernel_thunk_addr(self, raw: u32) -> u32 {
        raw ^ self.thunk_key()
    }
}

/// The subset of the XBE image header needed to map the image.
#[derive(Debug, Clone)]
pub struct FileHeader {
    /// Address at which the XBE image should be loaded.
    pub base_addr: u32,
    /// Size of all the headers, starting at the beginning of the file.
    pub header_size: u32,
    /// Size of the whole image once loaded, starting at `base_addr`.
    pub image_size: u32,
    /// Virtual address of the section header array.
    pub section_headers_addr: u32,
    pub num_sections: u32,
    /// Start address of execution, XOR encoded.
    pub entry_point_raw: u32,
    /// Address of the kernel thunk table, XOR encoded.
    pub kernel_thunk_addr_raw: u32,
}

impl FileHeader {
    /// Translates an address inside a header to an offset into the file.
    ///
    /// Addresses inside the XBE headers refer to the headers after they've been
    /// mapped to the base address.
    pub fn rel_addr(&self, addr: u32) -> Result<u32, Error> {
        addr.checked_sub(self.base_addr).ok_or_else(|| {
            Error::Malformed(format!(
                "address {:#08X} lies below the base address {:#08X}",
                addr, self.base_addr
            ))
        })
    }

    /// The virtual address range occupied by the loaded image (inclusive).
    pub fn image_span(&self) -> std::ops::RangeInclusive<u32> {
        self.base_addr..=self.base_addr.saturating_add(self.image_size)
    }

    /// Determines whether the image was built for a retail or debug Xbox.
    ///
    /// The kind is decided by the entry point: a key fits if the entry point
    /// decoded with it lies within the image span. Retail is tried first. If
    /// neither key fits this returns `Error::Malformed`.
    ///
    /// If both keys fit, the kernel thunk address breaks the tie: it has to
    /// decode to zero or to an address inside the span. If that still leaves
    /// both kinds (or neither), this returns `Error::AmbiguousImageKind`.
    pub fn probe_image_kind(&self) -> Result<ImageKind, Error> {
        let span = self.image_span();
        let entry_fits = |kind: ImageKind| {
            let entry = kind.decode_entry_point(self.entry_point_raw);
            let fits = span.contains(&entry);
            info!(
                "{:?} entry point {:#08X}: {}",
                kind,
                entry,
                if fits { "inside image" } else { "outside image" }
            );
            fits
        };
        let thunk_fits = |kind: ImageKind| {
            let thunk = kind.decode_kernel_thunk_addr(self.kernel_thunk_addr_raw);
            thunk == 0 || span.contains(&thunk)
        };
        let retail_entry = ImageKind::Retail.decode_entry_point(self.entry_point_raw);
        let debug_entry = ImageKind::Debug.decode_entry_point(self.entry_point_raw);

        match (entry_fits(ImageKind::Retail), entry_fits(ImageKind::Debug)) {
            (true, false) => Ok(ImageKind::Retail),
            (false, true) => Ok(ImageKind::Debug),
            (true, true) => match (thunk_fits(ImageKind::Retail), thunk_fits(ImageKind::Debug)) {
                (true, false) => Ok(ImageKind::Retail),
                (false, true) => Ok(ImageKind::Debug),
                _ => Err(Error::AmbiguousImageKind {
                    retail_entry,
                    debug_entry,
                }),
            },
            (false, false) => Err(Error::Malformed(format!(
                "entry point decodes to {:#08X} (retail key) and {:#08X} (debug key), both outside of the image span {:#08X}..={:#08X}",
                retail_entry,
                debug_entry,
                span.start(),
                span.end()
            ))),
        }
    }
}

/// Parses the image header at the start of `data`.
///
/// The magic number is checked before anything else.
pub fn parse_header(data: &[u8], limits: &Limits) -> Result<FileHeader, Error> {
    match data.get(..raw::MAGIC.len()) {
        Some(magic) if magic == &raw::MAGIC[..] => {}
        _ => {
            let found = data.iter().take(raw::MAGIC.len()).copied().collect();
            return Err(Error::InvalidMagic(found));
        }
    }

    if data.len() >= u32::MAX as usize {
        return Err(Error::Malformed(format!("image too large ({} Bytes)", data.len())));
    }

    let raw = raw::Header::parse(&mut data.try_get(raw::HEADER_FIELDS_OFFSET..)?)?;

    if raw.num_sections > limits.max_sections {
        return Err(Error::Malformed(format!(
            "image claims {} sections, at most {} are supported",
            raw.num_sections, limits.max_sections
        )));
    }

    raw.base_addr
        .checked_add(raw.image_size)
        .ok_or_else(|| Error::addr_overflow(raw.base_addr, raw.image_size))?;

    debug!(
        "base address {:#08X}, image size {:#X}, {} sections at {:#08X}",
        raw.base_addr, raw.image_size, raw.num_sections, raw.section_headers_addr
    );

    Ok(FileHeader {
        base_addr: raw.base_addr,
        header_size: raw.header_size,
        image_size: raw.image_size,
        section_headers_addr: raw.section_headers_addr,
        num_sections: raw.num_sections,
        entry_point_raw: raw.entry_point,
        kernel_thunk_addr_raw: raw.kernel_thunk_addr,
    })
}

bitflags! {
    /// Flags used for the `section_flags` field of a section header.
    ///
    /// Specifies properties that affect the way the virtual memory map is
    /// created or other properties of the section.
    pub struct SectionFlags: u32 {
        /// The section should be mapped as writeable.
        const WRITABLE            = 0x00000001;
        /// Speculation: Hints to the kernel that this section should be
        /// preloaded from disk instead of demand-paged into memory on first
        /// use.
        const PRELOAD             = 0x00000002;
        /// The section should be mapped as executable.
        ///
        /// Not to be trusted for `.data` and `.rdata`, see
        /// `image::correct_known_flag_defects`.
        const EXECUTABLE          = 0x00000004;
        const INSERTED_FILE       = 0x00000008;
        /// Speculation: Makes the first 4K page in the section read only to
        /// make it act like a guard page.
        const HEAD_PAGE_READ_ONLY = 0x00000010;
        /// Speculation: Makes the last 4K page in the section read only to
        /// make it act like a guard page.
        const TAIL_PAGE_READ_ONLY = 0x00000020;
    }
}

/// A validated section header.
///
/// All sections specified by the section headers are mapped into the process'
/// virtual memory by the loader. The section header specifies where and how
/// that mapping happens.
#[derive(Debug, Clone)]
pub struct SectionDescriptor<'a> {
    pub flags: SectionFlags,
    /// Virtual address range the section is mapped to.
    pub virt_range: Range<u32>,
    /// File offset range holding the section's data. Always inside the image.
    pub raw_range: Range<u32>,
    /// Name bytes, without the terminator. Borrowed from the image.
    pub name: &'a [u8],
    pub name_refcount: u32,
}

impl<'a> SectionDescriptor<'a> {
    fn from_raw(
        header: &FileHeader,
        raw: &raw::SectionHeader,
        data: &'a [u8],
        limits: &Limits,
    ) -> Result<Self, Error> {
        Ok(Self {
            flags: {
                let flags = SectionFlags::from_bits_truncate(raw.section_flags);
                if flags.bits() != raw.section_flags {
                    warn!("unknown section flags: known flags: {:#X}, raw flags: {:#X}", flags.bits(), raw.section_flags);
                }
                flags
            },
            virt_range: {
                let end = raw.virt_addr.checked_add(raw.virt_size)
                    .ok_or_else(|| Error::addr_overflow(raw.virt_addr, raw.virt_size))?;
                if end > limits.max_virt_addr {
                    return Err(Error::Malformed(format!(
                        "section at {:#08X} (size {:#X}) extends past {:#08X}",
                        raw.virt_addr, raw.virt_size, limits.max_virt_addr
                    )));
                }

                raw.virt_addr..end
            },
            raw_range: {
                let end = raw.raw_addr.checked_add(raw.raw_size)
                    .ok_or_else(|| Error::addr_overflow(raw.raw_addr, raw.raw_size))?;

                let range = raw.raw_addr..end;
                data.try_get(range.clone())?;   // check if in-bounds
                range
            },
            name: if raw.section_name_addr == 0 {
                &[]
            } else {
                let name_addr = header.rel_addr(raw.section_name_addr)?;
                read_cstr(data, name_addr, limits.max_section_name_len)?
            },
            name_refcount: raw.section_name_refcount,
        })
    }

    /// Returns the section's name, with invalid UTF-8 replaced.
    pub fn name_lossy(&self) -> std::borrow::Cow<'a, str> {
        String::from_utf8_lossy(self.name)
    }

    /// Whether `virt_addr` is inside the section's virtual range.
    pub fn contains(&self, virt_addr: u32) -> bool {
        self.virt_range.contains(&virt_addr)
    }

    /// Translates a virtual address inside this section to a file offset.
    ///
    /// Returns `None` if the address is outside the section or falls into the
    /// part of the virtual range that isn't backed by file data.
    pub fn translate(&self, virt_addr: u32) -> Option<u32> {
        if !self.contains(virt_addr) {
            return None;
        }
        let raw_pos = self.raw_range.start.checked_add(virt_addr - self.virt_range.start)?;
        if raw_pos < self.file_backed_end() {
            Some(raw_pos)
        } else {
            None    // section backing data smaller than virt. range
        }
    }

    /// End of the file data that is actually mapped into the virtual range.
    ///
    /// Raw data past the section's virtual size is never loaded.
    pub fn file_backed_end(&self) -> u32 {
        let raw_len = self.raw_range.end - self.raw_range.start;
        let virt_len = self.virt_range.end - self.virt_range.start;
        self.raw_range.start + raw_len.min(virt_len)
    }
}

/// Parses and validates `header.num_sections` section headers.
pub fn parse_sections<'a>(
    data: &'a [u8],
    header: &FileHeader,
    limits: &Limits,
) -> Result<Vec<SectionDescriptor<'a>>, Error> {
    let table_offset = header.rel_addr(header.section_headers_addr)?;
    let mut table = data.try_get(table_offset..)?;

    let mut sections = Vec::with_capacity(header.num_sections as usize);
    for index in 0..header.num_sections {
        let raw_sh = raw::SectionHeader::parse(&mut table)?;
        let section = SectionDescriptor::from_raw(header, &raw_sh, data, limits)?;
        debug!(
            "section #{} '{}': virt {:#08X}..{:#08X}, raw {:#X}..{:#X}, flags {:?}",
            index,
            section.name_lossy(),
            section.virt_range.start,
            section.virt_range.end,
            section.raw_range.start,
            section.raw_range.end,
            section.flags
        );
        sections.push(section);
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(base: u32, size: u32, entry: u32, thunk: u32) -> FileHeader {
        FileHeader {
            base_addr: base,
            header_size: 0x1000,
            image_size: size,
            section_headers_addr: base + 0x178,
            num_sections: 0,
            entry_point_raw: entry,
            kernel_thunk_addr_raw: thunk,
        }
    }

    #[test]
    fn keys_roundtrip() {
        for &kind in &[ImageKind::Retail, ImageKind::Debug] {
            assert_eq!(kind.decode_entry_point(0x12345 ^ kind.entry_key()), 0x12345);
            assert_eq!(kind.decode_kernel_thunk_addr(0x23456 ^ kind.thunk_key()), 0x23456);
        }
    }

    #[test]
    fn probe_prefers_the_plausible_kind() {
        let retail = header(0x10000, 0x8000, 0x11000 ^ ENTRY_XOR_RETAIL, 0x12000 ^ THUNK_XOR_RETAIL);
        assert_eq!(retail.probe_image_kind().unwrap(), ImageKind::Retail);

        let debug = header(0x10000, 0x8000, 0x11000 ^ ENTRY_XOR_DEBUG, 0x12000 ^ THUNK_XOR_DEBUG);
        assert_eq!(debug.probe_image_kind().unwrap(), ImageKind::Debug);
    }

    #[test]
    fn probe_span_is_inclusive() {
        let h = header(0x10000, 0x8000, 0x18000 ^ ENTRY_XOR_RETAIL, THUNK_XOR_RETAIL);
        assert_eq!(h.probe_image_kind().unwrap(), ImageKind::Retail);
        let h = header(0x10000, 0x8000, 0x18001 ^ ENTRY_XOR_RETAIL, THUNK_XOR_RETAIL);
        assert!(h.probe_image_kind().is_err());
    }

    #[test]
    fn probe_decides_by_entry_point() {
        // thunk table outside of the span doesn't matter
        let h = header(0x10000, 0x8000, 0x11000 ^ ENTRY_XOR_RETAIL, 0x30000 ^ THUNK_XOR_RETAIL);
        assert_eq!(h.probe_image_kind().unwrap(), ImageKind::Retail);

        let h = header(0x10000, 0x8000, 0x30000 ^ ENTRY_XOR_RETAIL, 0x12000 ^ THUNK_XOR_RETAIL);
        match h.probe_image_kind() {
            Err(Error::Malformed(msg)) => assert!(msg.contains("0x030000")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn probe_breaks_ties_with_thunk_addr() {
        // both entry points fit, only the retail thunk address does
        let debug_thunk = 0x1000;
        let raw_thunk = debug_thunk ^ THUNK_XOR_DEBUG;
        assert!(raw_thunk ^ THUNK_XOR_RETAIL >= 0x10000);
        let h = header(0x10000, u32::MAX - 0x10000, 0x11000 ^ ENTRY_XOR_RETAIL, raw_thunk);
        assert_eq!(h.probe_image_kind().unwrap(), ImageKind::Retail);
    }

    #[test]
    fn probe_reports_ambiguity() {
        let h = header(0x10000, u32::MAX - 0x10000, 0x11000 ^ ENTRY_XOR_RETAIL, THUNK_XOR_RETAIL);
        match h.probe_image_kind() {
            Err(Error::AmbiguousImageKind { retail_entry, debug_entry }) => {
                assert_eq!(retail_entry, 0x11000);
                assert_eq!(debug_entry, 0x11000 ^ ENTRY_XOR_RETAIL ^ ENTRY_XOR_DEBUG);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn translate_stays_within_raw_backing() {
        let section = SectionDescriptor {
            flags: SectionFlags::empty(),
            virt_range: 0x11000..0x11200,
            raw_range: 0x1000..0x1100,
            name: b".bss",
            name_refcount: 0,
        };
        assert_eq!(section.translate(0x11000), Some(0x1000));
        assert_eq!(section.translate(0x110FF), Some(0x10FF));
        assert_eq!(section.translate(0x11100), None);
        assert_eq!(section.translate(0x11200), None);
        assert_eq!(section.translate(0x10FFF), None);

        // raw data beyond the virtual size isn't mapped
        let section = SectionDescriptor {
            virt_range: 0x11000..0x11010,
            raw_range: 0x1000..0x1100,
            ..section
        };
        assert_eq!(section.file_backed_end(), 0x1010);
        assert_eq!(section.translate(0x1100F), Some(0x100F));
        assert_eq!(section.translate(0x11010), None);
    }

    #[test]
    fn short_buffers_have_invalid_magic() {
        match parse_header(b"XB", &Limits::default()) {
            Err(Error::InvalidMagic(found)) => assert_eq!(found, b"XB"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn truncated_header_is_malformed() {
        let mut data = b"XBEH".to_vec();
        data.resize(0x120, 0);
        match parse_header(&data, &Limits::default()) {
            Err(Error::Malformed(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
