//! Load-time configuration.

use crate::kernel_symbols::{KernelExports, XBOXKRNL};

/// Instruction set the loaded image is analyzed as.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Architecture {
    /// 32-bit x86 (the Xbox runs a Pentium III derivative).
    X86,
}

/// Calling convention / ABI environment of the image.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Platform {
    /// The Xbox kernel, a trimmed down NT kernel using the Windows x86 ABI.
    XboxKernel,
}

/// Upper bounds that keep loading a corrupt image cheap and panic-free.
#[derive(Debug, Copy, Clone)]
pub struct Limits {
    /// Maximum number of section headers accepted.
    pub max_sections: u32,
    /// Maximum length of a section name, not counting the terminator.
    pub max_section_name_len: u32,
    /// Maximum number of non-zero kernel thunk table entries.
    pub max_thunk_entries: u32,
    /// Exclusive upper bound for the end of any section's virtual range.
    ///
    /// Defaults to the start of kernel space.
    pub max_virt_addr: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_sections: 1024,
            max_section_name_len: 256,
            max_thunk_entries: 512,
            max_virt_addr: 0x8000_0000,
        }
    }
}

/// Everything `load` needs besides the image data.
#[derive(Debug, Copy, Clone)]
pub struct LoadConfig {
    pub architecture: Architecture,
    pub platform: Platform,
    pub limits: Limits,
    /// Ordinal to name table used to name kernel imports.
    pub kernel_exports: &'static KernelExports,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            architecture: Architecture::X86,
            platform: Platform::XboxKernel,
            limits: Limits::default(),
            kernel_exports: &XBOXKRNL,
        }
    }
}
