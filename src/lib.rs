//! Loader for the `XBE` file format used by Xbox executables.
//!
//! Turns the raw bytes of an XBE into a description of the image as it
//! appears in memory: the mapped segments and their permissions, classified
//! sections, the entry point, and the kernel imports as named symbols. The
//! result is meant to seed static analysis tools; no code is analyzed here.
//!
//! Most of the format information is derived from
//! [http://www.caustik.com/cxbx/download/xbe.htm][website].
//!
//! The simplest way in is [`load`]. To look at the decoded headers first, use
//! [`Xbe::parse`] and then [`Image::from_xbe`].
//!
//! [website]: http://www.caustik.com/cxbx/download/xbe.htm
//! [`load`]: fn.load.html
//! [`Xbe::parse`]: struct.Xbe.html#method.parse
//! [`Image::from_xbe`]: image/struct.Image.html#method.from_xbe

#![doc(html_root_url = "https://docs.rs/xbe-image/0.1.0")]
#![warn(missing_debug_implementations)]
#![forbid(unsafe_code)]

// Deny unchecked slice indexing when using clippy. This can almost always
// result in a panic with a malformed XBE.
#![cfg_attr(feature = "cargo-clippy", deny(indexing_slicing))]
#![cfg_attr(feature = "cargo-clippy", allow(unreadable_literal, large_digit_groups))]

#[macro_use] extern crate bitflags;
#[macro_use] extern crate log;
#[macro_use] extern crate serde_derive;
extern crate bincode;
extern crate byteorder;

pub mod config;
pub mod decode;
mod error;
pub mod image;
pub mod kernel_symbols;
mod raw;
pub mod thunk;
mod utils;

pub use crate::config::{Architecture, Limits, LoadConfig, Platform};
pub use crate::decode::{FileHeader, ImageKind, SectionDescriptor, SectionFlags};
pub use crate::error::Error;
pub use crate::image::{Image, Permissions, Section, SectionSemantics, Segment, Symbol, SymbolKind};
use crate::utils::NoDebug;

/// Parses `data` as an XBE and produces its in-memory image.
///
/// `data` is only borrowed for the duration of the call, the returned `Image`
/// owns everything it describes.
pub fn load(data: &[u8], config: &LoadConfig) -> Result<Image, Error> {
    let xbe = Xbe::parse_with_limits(data, &config.limits)?;
    Image::from_xbe(&xbe, config)
}

/// A decoded Xbox executable (XBE).
///
/// Holds the validated header and section table and borrows the raw image
/// data.
#[derive(Debug)]
pub struct Xbe<'a> {
    header: FileHeader,
    image_kind: ImageKind,
    sections: Vec<SectionDescriptor<'a>>,
    /// The raw XBE image data.
    data: NoDebug<&'a [u8]>,
}

impl<'a> Xbe<'a> {
    /// Tries to parse an XBE file from raw data, using the default `Limits`.
    pub fn parse(data: &'a [u8]) -> Result<Self, Error> {
        Self::parse_with_limits(data, &Limits::default())
    }

    /// Tries to parse an XBE file from raw data.
    pub fn parse_with_limits(data: &'a [u8], limits: &Limits) -> Result<Self, Error> {
        let header = decode::parse_header(data, limits)?;
        let sections = decode::parse_sections(data, &header, limits)?;
        let image_kind = header.probe_image_kind()?;
        info!("image kind is {:?}", image_kind);

        Ok(Self {
            header,
            image_kind,
            sections,
            data: NoDebug::from(data),
        })
    }

    /// Returns the decoded image header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Whether this image was built for retail or debug Xboxes.
    ///
    /// This is guessed from the encoded entry point and kernel thunk address,
    /// see [`FileHeader::probe_image_kind`].
    ///
    /// [`FileHeader::probe_image_kind`]: decode/struct.FileHeader.html#method.probe_image_kind
    pub fn image_kind(&self) -> ImageKind {
        self.image_kind
    }

    /// Returns the entry point of the XBE (virtual address).
    pub fn entry_point(&self) -> u32 {
        self.image_kind.decode_entry_point(self.header.entry_point_raw)
    }

    /// Returns the virtual address of the kernel thunk table, or 0 if the
    /// image doesn't import anything from the kernel.
    ///
    /// Most likely, it points directly at the beginning of the `.rdata`
    /// section.
    pub fn kernel_thunk_addr(&self) -> u32 {
        self.image_kind.decode_kernel_thunk_addr(self.header.kernel_thunk_addr_raw)
    }

    /// Returns the validated section headers, in the order they appear in the
    /// image.
    pub fn sections(&self) -> &[SectionDescriptor<'a>] {
        &self.sections
    }

    /// Scans the section headers to find a section that contains the given
    /// virtual address.
    pub fn find_section_containing(&self, virt_addr: u32) -> Option<&SectionDescriptor<'a>> {
        self.sections.iter().find(|section| section.contains(virt_addr))
    }

    /// Translates a virtual address to an offset into the XBE image.
    ///
    /// Returns `None` if the virtual address isn't inside any section of this
    /// XBE, or if it's in the part of a section not backed by file data.
    pub fn translate_virt_addr(&self, virt_addr: u32) -> Option<u32> {
        self.find_section_containing(virt_addr)?.translate(virt_addr)
    }

    /// Returns the XBE's base address.
    ///
    /// The XBE should be loaded into the virtual memory space of the program
    /// so that its first byte is at this virtual address.
    pub fn base_address(&self) -> u32 {
        self.header.base_addr
    }

    /// Size of all the headers, starting at the beginning of the file.
    ///
    /// The headers should be mapped into the XBE's address space at the
    /// specified [`base_address`](#method.base_address).
    pub fn header_size(&self) -> u32 {
        self.header.header_size
    }

    /// Returns the raw image data this XBE was decoded from.
    pub fn raw_data(&self) -> &'a [u8] {
        *self.data
    }
}
