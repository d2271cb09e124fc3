use std::{error, fmt};

/// The error type returned when an XBE image can not be loaded.
///
/// Loading is all-or-nothing: any of these aborts the load and no partial
/// image is produced.
#[derive(Debug)]
pub enum Error {
    /// The file does not start with `XBEH`. Contains the bytes that were found
    /// instead (fewer than 4 if the buffer is that short).
    InvalidMagic(Vec<u8>),
    /// A structure is truncated, points outside the image, or exceeds one of
    /// the configured limits.
    Malformed(String),
    /// The entry point and kernel thunk address decode to plausible values
    /// with both the retail and the debug XOR keys.
    AmbiguousImageKind {
        retail_entry: u32,
        debug_entry: u32,
    },
}

impl Error {
    /// Creates an `Error` denoting that an address computation would have lead
    /// to an overflow.
    pub(crate) fn addr_overflow(base: u32, offset: u32) -> Self {
        Error::Malformed(format!(
            "invalid address or length: address computation overflow ({:#08X}+{:#08X})",
            base, offset
        ))
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidMagic(found) => {
                write!(f, "invalid magic number (expected \"XBEH\", got {:02X?})", found)
            }
            Error::Malformed(s) => write!(f, "malformed data: {}", s),
            Error::AmbiguousImageKind { retail_entry, debug_entry } => write!(
                f,
                "can't tell retail from debug image: both entry point candidates \
                 ({:#08X} retail, {:#08X} debug) are plausible",
                retail_entry, debug_entry
            ),
        }
    }
}
