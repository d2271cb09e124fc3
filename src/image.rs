//! The loaded image model handed to analysis tools.
//!
//! An [`Image`] is derived once from a parsed [`Xbe`] and owns all of its
//! data, so it can outlive the buffer the XBE was read from.
//!
//! [`Image`]: struct.Image.html
//! [`Xbe`]: ../struct.Xbe.html

use crate::config::{Architecture, LoadConfig, Platform};
use crate::decode::{ImageKind, SectionDescriptor, SectionFlags};
use crate::thunk::resolve_kernel_thunks;
use crate::{Error, Xbe};

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Name of the symbol placed at the entry point.
pub const ENTRY_SYMBOL_NAME: &str = "_start";

bitflags! {
    /// Memory protection of a mapped segment.
    pub struct Permissions: u8 {
        const READ    = 0b001;
        const WRITE   = 0b010;
        const EXECUTE = 0b100;
    }
}

impl Permissions {
    /// Derives the protection requested by a section's flags.
    ///
    /// Sections are always readable.
    pub fn from_section_flags(flags: SectionFlags) -> Self {
        let mut permissions = Permissions::READ;
        permissions.set(Permissions::WRITE, flags.contains(SectionFlags::WRITABLE));
        permissions.set(Permissions::EXECUTE, flags.contains(SectionFlags::EXECUTABLE));
        permissions
    }
}

/// Removes permissions that XBE images are known to request wrongly.
///
/// The XBE toolchain marks `.data` and `.rdata` as executable. Taking that at
/// face value makes analysis tools treat constants and variables as code, so
/// both sections are always mapped non-executable, whatever their flags say.
pub fn correct_known_flag_defects(name: &[u8], permissions: Permissions) -> Permissions {
    match name {
        b".data" | b".rdata" if permissions.contains(Permissions::EXECUTE) => {
            debug!("clearing bogus executable flag of '{}'", String::from_utf8_lossy(name));
            permissions - Permissions::EXECUTE
        }
        _ => permissions,
    }
}

/// What kind of content a section holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SectionSemantics {
    Code,
    ReadOnlyData,
    ReadWriteData,
}

impl SectionSemantics {
    /// Classifies a section by its (corrected) permissions and name.
    ///
    /// Executable sections are code. Of the rest, only `.rdata` is known to be
    /// read-only. Everything else is treated as read-write data.
    pub fn classify(name: &[u8], permissions: Permissions) -> Self {
        if permissions.contains(Permissions::EXECUTE) {
            SectionSemantics::Code
        } else if name == b".rdata" {
            SectionSemantics::ReadOnlyData
        } else {
            SectionSemantics::ReadWriteData
        }
    }
}

/// A region of the file mapped into the image's address space.
///
/// If `virt_size` exceeds `raw_size`, the rest of the region is zero-filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub virt_addr: u32,
    pub virt_size: u32,
    /// Offset of the backing data in the file.
    pub raw_offset: u32,
    pub raw_size: u32,
    pub permissions: Permissions,
}

impl Segment {
    pub fn contains(&self, virt_addr: u32) -> bool {
        virt_addr >= self.virt_addr && virt_addr - self.virt_addr < self.virt_size
    }
}

/// A named, classified region of the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Name as stored in the image, not necessarily valid UTF-8.
    pub name: Vec<u8>,
    pub virt_addr: u32,
    pub virt_size: u32,
    pub semantics: SectionSemantics,
}

impl Section {
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn contains(&self, virt_addr: u32) -> bool {
        virt_addr >= self.virt_addr && virt_addr - self.virt_addr < self.virt_size
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// Start of a routine.
    Function,
    /// A pointer-sized slot the loader fills in with an imported address.
    ImportedData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub addr: u32,
    pub name: String,
    pub kind: SymbolKind,
}

/// Maps a section to its segment and section records.
///
/// The steps run in a fixed order: raw permissions from the flags, then the
/// known-defect correction, then classification on the corrected
/// permissions.
fn materialize_section(descriptor: &SectionDescriptor) -> (Segment, Section) {
    let requested = Permissions::from_section_flags(descriptor.flags);
    let permissions = correct_known_flag_defects(descriptor.name, requested);
    let semantics = SectionSemantics::classify(descriptor.name, permissions);

    let virt_size = descriptor.virt_range.end - descriptor.virt_range.start;
    let raw_size = descriptor.raw_range.end - descriptor.raw_range.start;

    (
        Segment {
            virt_addr: descriptor.virt_range.start,
            virt_size,
            raw_offset: descriptor.raw_range.start,
            raw_size,
            permissions,
        },
        Section {
            name: descriptor.name.to_vec(),
            virt_addr: descriptor.virt_range.start,
            virt_size,
            semantics,
        },
    )
}

/// An XBE image as it appears in memory after loading.
///
/// Obtained via [`load`](../fn.load.html) or [`Image::from_xbe`].
///
/// [`Image::from_xbe`]: #method.from_xbe
#[derive(Debug, Clone)]
pub struct Image {
    architecture: Architecture,
    platform: Platform,
    image_kind: ImageKind,
    /// In section header order, which is the order in which overlapping
    /// sections have to be mapped.
    segments: Vec<Segment>,
    sections: Vec<Section>,
    entry_point: u32,
    symbols: BTreeMap<u32, Symbol>,
}

impl Image {
    /// Maps all sections of `xbe` and resolves its kernel imports.
    pub fn from_xbe(xbe: &Xbe, config: &LoadConfig) -> Result<Self, Error> {
        let (segments, sections): (Vec<_>, Vec<_>) = xbe.sections().iter().map(materialize_section).unzip();

        let entry_point = xbe.entry_point();
        let mut symbols = BTreeMap::new();
        symbols.insert(entry_point, Symbol {
            addr: entry_point,
            name: ENTRY_SYMBOL_NAME.to_string(),
            kind: SymbolKind::Function,
        });

        for import in resolve_kernel_thunks(xbe, config)? {
            if let Some(existing) = symbols.get(&import.addr) {
                warn!(
                    "import '{}' collides with symbol '{}' at {:#08X}, keeping '{}'",
                    import.name, existing.name, import.addr, existing.name
                );
                continue;
            }
            symbols.insert(import.addr, import);
        }

        Ok(Self {
            architecture: config.architecture,
            platform: config.platform,
            image_kind: xbe.image_kind(),
            segments,
            sections,
            entry_point,
            symbols,
        })
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Whether the image was (apparently) built for retail or debug Xboxes.
    pub fn image_kind(&self) -> ImageKind {
        self.image_kind
    }

    /// The memory regions to map, in section header order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The image's sections, in section header order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The virtual address execution starts at.
    pub fn entry_point(&self) -> u32 {
        self.entry_point
    }

    /// All symbols, keyed by address.
    pub fn symbols(&self) -> &BTreeMap<u32, Symbol> {
        &self.symbols
    }

    pub fn symbol_at(&self, virt_addr: u32) -> Option<&Symbol> {
        self.symbols.get(&virt_addr)
    }

    /// Iterates over the kernel import slots, in address order.
    pub fn imports(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values().filter(|s| s.kind == SymbolKind::ImportedData)
    }

    /// Returns the first segment (in header order) containing `virt_addr`.
    pub fn segment_containing(&self, virt_addr: u32) -> Option<&Segment> {
        self.segments.iter().find(|s| s.contains(virt_addr))
    }

    /// Returns the first section (in header order) containing `virt_addr`.
    pub fn section_containing(&self, virt_addr: u32) -> Option<&Section> {
        self.sections.iter().find(|s| s.contains(virt_addr))
    }
}
