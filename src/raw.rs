//! Raw structures that can be deserialized from binary data.
//!
//! These mirror the on-disk layout and don't try to verify their values. That
//! is left to the `decode` module, which turns them into validated
//! descriptors.
//!
//! All struct fields are parsed in-order and are deserialized using `bincode`
//! (no padding is used anywhere). Everything is Little Endian.

use crate::Error;

/// The magic number every XBE starts with.
pub const MAGIC: [u8; 4] = *b"XBEH";

/// Size of the signature blob that follows the magic number.
pub const SIGNATURE_LEN: u32 = 256;

/// Image offset of the first field of `Header`.
pub const HEADER_FIELDS_OFFSET: u32 = 4 + SIGNATURE_LEN;

// All addresses refer to the address *after* loading the XBE into memory

/// The image header, starting right after the signature.
///
/// The magic number and the signature are not part of this struct, the magic
/// is checked before anything else is parsed and the signature is ignored.
///
/// Only a few of the fields are needed to map the image, the rest are kept to
/// document the layout.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct Header {
    /// Address at which the whole XBE image should be loaded.
    pub base_addr: u32,
    pub header_size: u32,
    pub image_size: u32,
    pub image_header_size: u32,
    pub time_date: u32,
    pub cert_addr: u32,
    pub num_sections: u32,
    /// Address of an array of `SectionHeader` structs.
    pub section_headers_addr: u32,
    pub init_flags: u32,
    /// Start address of execution, XOR encoded.
    pub entry_point: u32,
    pub tls_addr: u32,
    pub pe_stack_commit: u32,
    pub pe_heap_reserve: u32,
    pub pe_heap_commit: u32,
    pub pe_base_addr: u32,
    pub pe_size: u32,
    pub pe_checksum: u32,
    pub pe_time_date: u32,
    pub debug_pathname_addr: u32,
    pub debug_filename_addr: u32,
    pub debug_unicode_filename_addr: u32,
    /// Address of the kernel thunk table, XOR encoded.
    ///
    /// The kernel thunk is an array of 32-bit IDs that identify a kernel symbol
    /// to import. The last ID is 0 and signals the end of the thunk array.
    pub kernel_thunk_addr: u32,
    pub non_kernel_import_dir_addr: u32,
    pub num_library_versions: u32,
    pub library_versions_addr: u32,
    pub kernel_library_version_addr: u32,
    pub xapi_library_version_addr: u32,
    pub logo_bitmap_addr: u32,
    pub logo_bitmap_size: u32,
}

impl Header {
    pub fn parse(data: &mut &[u8]) -> Result<Self, Error> {
        ::bincode::deserialize_from(data)
            .map_err(|e| Error::Malformed(format!("truncated image header: {}", e)))
    }
}

/// A 56-Byte entry of the section header array.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct SectionHeader {
    /// See `SectionFlags`.
    pub section_flags: u32,
    /// Virtual address where this section should be mapped to.
    pub virt_addr: u32,
    pub virt_size: u32,
    /// Offset of the section content inside the XBE file.
    pub raw_addr: u32,
    pub raw_size: u32,
    /// Address of the section's name string. The string is zero terminated and
    /// probably ASCII.
    pub section_name_addr: u32,
    pub section_name_refcount: u32,
    pub head_shared_page_refcount_addr: u32,
    pub tail_shared_page_refcount_addr: u32,
    pub section_digest: [u8; 20],
}

impl SectionHeader {
    pub fn parse(data: &mut &[u8]) -> Result<Self, Error> {
        ::bincode::deserialize_from(data)
            .map_err(|e| Error::Malformed(format!("truncated section header: {}", e)))
    }
}
