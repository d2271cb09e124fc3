//! Builds small synthetic XBE images for the integration tests.

#![allow(dead_code)]

use xbe_image::{ImageKind, SectionFlags};

pub const BASE: u32 = 0x10000;

pub const HEADER_END: u32 = 0x178;
pub const SECTION_HEADER_SIZE: u32 = 56;

// Header field offsets
pub const OFF_BASE_ADDR: usize = 0x104;
pub const OFF_HEADER_SIZE: usize = 0x108;
pub const OFF_IMAGE_SIZE: usize = 0x10C;
pub const OFF_NUM_SECTIONS: usize = 0x11C;
pub const OFF_SECTION_HEADERS_ADDR: usize = 0x120;
pub const OFF_ENTRY_POINT: usize = 0x128;
pub const OFF_KERNEL_THUNK: usize = 0x158;

// Section header field offsets
pub const SH_FLAGS: usize = 0;
pub const SH_VIRT_ADDR: usize = 4;
pub const SH_VIRT_SIZE: usize = 8;
pub const SH_RAW_ADDR: usize = 12;
pub const SH_RAW_SIZE: usize = 16;
pub const SH_NAME_ADDR: usize = 20;

pub struct SectionLayout {
    pub name: &'static [u8],
    pub flags: SectionFlags,
    pub virt_addr: u32,
    pub virt_size: u32,
    pub data: Vec<u8>,
}

pub struct XbeBuilder {
    kind: ImageKind,
    entry: u32,
    thunk_addr: u32,
    image_size: Option<u32>,
    sections: Vec<SectionLayout>,
}

impl XbeBuilder {
    pub fn new() -> Self {
        Self {
            kind: ImageKind::Retail,
            entry: BASE,
            thunk_addr: 0,
            image_size: None,
            sections: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: ImageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn entry(mut self, entry: u32) -> Self {
        self.entry = entry;
        self
    }

    pub fn thunk_addr(mut self, addr: u32) -> Self {
        self.thunk_addr = addr;
        self
    }

    pub fn image_size(mut self, size: u32) -> Self {
        self.image_size = Some(size);
        self
    }

    pub fn section(
        mut self,
        name: &'static [u8],
        flags: SectionFlags,
        virt_addr: u32,
        virt_size: u32,
        data: Vec<u8>,
    ) -> Self {
        self.sections.push(SectionLayout {
            name,
            flags,
            virt_addr,
            virt_size,
            data,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let num_sections = self.sections.len() as u32;
        let names_start = HEADER_END + num_sections * SECTION_HEADER_SIZE;

        let mut names = Vec::new();
        let mut name_offsets = Vec::new();
        for section in &self.sections {
            name_offsets.push(names_start + names.len() as u32);
            names.extend_from_slice(section.name);
            names.push(0);
        }
        let header_size = align(names_start + names.len() as u32, 0x10);

        // the file ends right after the last section's data
        let mut raw_addrs = Vec::new();
        let mut raw_end = align(header_size, 0x100);
        for section in &self.sections {
            let raw_addr = align(raw_end, 0x10);
            raw_addrs.push(raw_addr);
            raw_end = raw_addr + section.data.len() as u32;
        }

        let virt_end = self
            .sections
            .iter()
            .map(|s| s.virt_addr + s.virt_size)
            .max()
            .unwrap_or(0)
            .max(BASE + header_size);
        let image_size = self.image_size.unwrap_or(virt_end - BASE);

        let mut out = vec![0; raw_end as usize];
        out[0..4].copy_from_slice(b"XBEH");
        put(&mut out, OFF_BASE_ADDR, BASE);
        put(&mut out, OFF_HEADER_SIZE, header_size);
        put(&mut out, OFF_IMAGE_SIZE, image_size);
        put(&mut out, OFF_NUM_SECTIONS, num_sections);
        put(&mut out, OFF_SECTION_HEADERS_ADDR, BASE + HEADER_END);
        put(&mut out, OFF_ENTRY_POINT, self.entry ^ self.kind.entry_key());
        put(&mut out, OFF_KERNEL_THUNK, self.thunk_addr ^ self.kind.thunk_key());

        for (i, section) in self.sections.iter().enumerate() {
            let sh = section_header_offset(i);
            put(&mut out, sh + SH_FLAGS, section.flags.bits());
            put(&mut out, sh + SH_VIRT_ADDR, section.virt_addr);
            put(&mut out, sh + SH_VIRT_SIZE, section.virt_size);
            put(&mut out, sh + SH_RAW_ADDR, raw_addrs[i]);
            put(&mut out, sh + SH_RAW_SIZE, section.data.len() as u32);
            put(&mut out, sh + SH_NAME_ADDR, BASE + name_offsets[i]);

            let raw = raw_addrs[i] as usize;
            out[raw..raw + section.data.len()].copy_from_slice(&section.data);
        }

        let names_start = names_start as usize;
        out[names_start..names_start + names.len()].copy_from_slice(&names);

        out
    }
}

/// File offset of the `index`th section header.
pub fn section_header_offset(index: usize) -> usize {
    HEADER_END as usize + index * SECTION_HEADER_SIZE as usize
}

/// Reads the little endian `u32` at `offset`.
pub fn get(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

/// Overwrites the little endian `u32` at `offset`.
pub fn put(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Encodes kernel thunk table entries, padded with zeros to `len` Bytes.
pub fn thunk_table(entries: &[u32], len: usize) -> Vec<u8> {
    let mut data = entries
        .iter()
        .flat_map(|e| e.to_le_bytes().to_vec())
        .collect::<Vec<_>>();
    data.resize(len.max(data.len()), 0);
    data
}

fn align(value: u32, to: u32) -> u32 {
    (value + to - 1) / to * to
}

pub const TEXT: u32 = 0x11000;
pub const RDATA: u32 = 0x12000;
pub const DATA: u32 = 0x13000;
pub const XPP: u32 = 0x14000;
pub const ENTRY: u32 = TEXT + 0x10;

/// An image shaped like a typical game:
///
/// * `.text`, executable
/// * `.rdata`, wrongly flagged executable, starting with the thunk table
///   (NtClose, DbgPrint, an unknown ordinal and a raw address)
/// * `.data`, writable and wrongly flagged executable, half of it zero-filled
/// * `XPP`, an executable library section
pub fn typical() -> XbeBuilder {
    XbeBuilder::new()
        .entry(ENTRY)
        .thunk_addr(RDATA)
        .section(
            b".text",
            SectionFlags::EXECUTABLE | SectionFlags::PRELOAD,
            TEXT,
            0x200,
            vec![0xC3; 0x200],
        )
        .section(
            b".rdata",
            SectionFlags::EXECUTABLE | SectionFlags::PRELOAD,
            RDATA,
            0x100,
            thunk_table(&[0x8000_00BB, 0x8000_0008, 0x8000_0FFF, 0x0001_2345, 0], 0x100),
        )
        .section(
            b".data",
            SectionFlags::WRITABLE | SectionFlags::EXECUTABLE,
            DATA,
            0x400,
            vec![0x55; 0x200],
        )
        .section(b"XPP", SectionFlags::EXECUTABLE, XPP, 0x80, vec![0x90; 0x80])
}
