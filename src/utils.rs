use crate::error::Error;

use byteorder::{ByteOrder, LE};
use std::fmt;
use std::ops::{Deref, Range, RangeFrom};

/// Slice extension methods.
pub trait SliceExt<T> {
    /// Tries to obtain a subslice of `self`, returning an appropriate error if
    /// the range is out of bounds.
    fn try_get<R>(&self, range: R) -> Result<&[T], Error>
    where
        R: SliceIndex<T>;
}

impl<T> SliceExt<T> for [T] {
    fn try_get<R>(&self, range: R) -> Result<&[T], Error>
    where
        R: SliceIndex<T>,
    {
        range.get(self)
    }
}

/// A `u32`-based range that can be used to index a slice.
///
/// XBE images use 32-bit addresses for everything, so only `u32` ranges are
/// supported. Care must be taken when calculating the bounds as that might
/// overflow.
pub trait SliceIndex<T> {
    /// Get the subslice of `slice` at the position indicated by `self`.
    fn get(self, slice: &[T]) -> Result<&[T], Error>;
}

impl<T> SliceIndex<T> for Range<u32> {
    fn get(self, slice: &[T]) -> Result<&[T], Error> {
        slice
            .get(self.start as usize..self.end as usize)
            .ok_or_else(|| {
                Error::Malformed(format!(
                    "pointer points outside XBE image (range {:#X}..{:#X} out of bounds of slice with length {:#X})",
                    self.start, self.end, slice.len()
                ))
            })
    }
}

impl<T> SliceIndex<T> for RangeFrom<u32> {
    fn get(self, slice: &[T]) -> Result<&[T], Error> {
        slice.get(self.start as usize..).ok_or_else(|| {
            Error::Malformed(format!(
                "pointer points outside XBE image (range {:#X}.. out of bounds of slice with length {:#X})",
                self.start, slice.len()
            ))
        })
    }
}

/// Reads a little endian `u32` at `offset`.
pub fn read_u32_at(data: &[u8], offset: u32) -> Result<u32, Error> {
    let end = offset
        .checked_add(4)
        .ok_or_else(|| Error::addr_overflow(offset, 4))?;
    Ok(LE::read_u32(data.try_get(offset..end)?))
}

/// Returns the bytes of the NUL terminated string starting at `offset`
/// (without the terminator).
///
/// Fails if no terminator is found within `max_len` bytes or before the end of
/// `data`.
pub fn read_cstr(data: &[u8], offset: u32, max_len: u32) -> Result<&[u8], Error> {
    let tail = data.try_get(offset..)?;
    let window = (max_len as usize).saturating_add(1);
    match tail.iter().take(window).position(|b| *b == 0) {
        // `data` is smaller than 4 GiB, so this can't overflow
        Some(len) => data.try_get(offset..offset + len as u32),
        None => Err(Error::Malformed(format!(
            "string at offset {:#X} is not terminated within {} Bytes",
            offset, max_len
        ))),
    }
}

/// Wraps any value and suppresses its debug output when printed with `{:?}`.
pub struct NoDebug<T>(pub T);

impl<T> fmt::Debug for NoDebug<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("(debug output omitted)")
    }
}

impl<T> Deref for NoDebug<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for NoDebug<T> {
    fn from(t: T) -> Self {
        NoDebug(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cstr_stops_at_nul() {
        let data = b"xx.text\0.data\0";
        assert_eq!(read_cstr(data, 2, 16).unwrap(), b".text");
        assert_eq!(read_cstr(data, 8, 16).unwrap(), b".data");
        assert_eq!(read_cstr(data, 7, 16).unwrap(), b"");
    }

    #[test]
    fn cstr_needs_terminator_within_bound() {
        let data = b"abcdefgh\0";
        assert_eq!(read_cstr(data, 0, 8).unwrap(), b"abcdefgh");
        assert!(read_cstr(data, 0, 7).is_err());
    }

    #[test]
    fn cstr_unterminated_at_end_of_data() {
        assert!(read_cstr(b"abc", 0, 64).is_err());
        assert!(read_cstr(b"abc", 4, 64).is_err());
    }

    #[test]
    fn u32_reads_are_bounds_checked() {
        let data = [0x78, 0x56, 0x34, 0x12, 0xFF];
        assert_eq!(read_u32_at(&data, 0).unwrap(), 0x12345678);
        assert!(read_u32_at(&data, 2).is_err());
        assert!(read_u32_at(&data, u32::MAX - 1).is_err());
    }
}
