// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::error::HprofError;

/// Width of the identifiers (object, class, loader, string ids) used by a
/// heap dump stream, declared once in the stream header.
///
/// Identifiers are always reported to the visitor as unsigned 64-bit values;
/// 4-byte identifiers are zero-extended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdSize {
    /// 4-byte identifiers (32-bit VM heaps).
    U4,
    /// 8-byte identifiers (64-bit VM heaps).
    U8,
}

impl IdSize {
    /// Number of bytes one identifier occupies on the wire.
    pub const fn size(self) -> usize {
        return match self {
            IdSize::U4 => 4,
            IdSize::U8 => 8,
        };
    }

    /// Interprets the header's declared identifier size. Sizes other than
    /// 4 or 8 are a format error.
    pub fn from_header(size: u32) -> Result<IdSize, HprofError> {
        return match size {
            4 => Ok(IdSize::U4),
            8 => Ok(IdSize::U8),
            _ => Err(HprofError::BadIdSize { size }),
        };
    }
}

/// Helper for reading multi-byte values from heap dump data that may be in
/// big-endian or little-endian byte order.
///
/// The JVM writes heap dumps in big-endian order, so [`HprofByteReader::BIG_ENDIAN`]
/// is the default everywhere a reader is constructed from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HprofByteReader {
    source_big_endian: bool,
}

impl HprofByteReader {
    /// A reader for big-endian data, the JVM default.
    pub const BIG_ENDIAN: Self = Self::new(true);

    /// A reader for little-endian data.
    pub const LITTLE_ENDIAN: Self = Self::new(false);

    /// Create a new reader that will interpret source bytes as indicated by
    /// the `source_big_endian` parameter.
    pub const fn new(source_big_endian: bool) -> Self {
        return Self { source_big_endian };
    }

    /// Returns true if the source bytes are being interpreted as big-endian.
    pub const fn source_big_endian(self) -> bool {
        return self.source_big_endian;
    }

    /// Reads an i16 from the start of the given slice.
    /// PRECONDITION: source.len() >= 2
    pub fn read_i16(self, source: &[u8]) -> i16 {
        let source_array = source[..2].try_into().unwrap();
        return if self.source_big_endian {
            i16::from_be_bytes(source_array)
        } else {
            i16::from_le_bytes(source_array)
        };
    }

    /// Reads a u16 from the start of the given slice.
    /// PRECONDITION: source.len() >= 2
    pub fn read_u16(self, source: &[u8]) -> u16 {
        let source_array = source[..2].try_into().unwrap();
        return if self.source_big_endian {
            u16::from_be_bytes(source_array)
        } else {
            u16::from_le_bytes(source_array)
        };
    }

    /// Reads an i32 from the start of the given slice.
    /// PRECONDITION: source.len() >= 4
    pub fn read_i32(self, source: &[u8]) -> i32 {
        let source_array = source[..4].try_into().unwrap();
        return if self.source_big_endian {
            i32::from_be_bytes(source_array)
        } else {
            i32::from_le_bytes(source_array)
        };
    }

    /// Reads a u32 from the start of the given slice.
    /// PRECONDITION: source.len() >= 4
    pub fn read_u32(self, source: &[u8]) -> u32 {
        let source_array = source[..4].try_into().unwrap();
        return if self.source_big_endian {
            u32::from_be_bytes(source_array)
        } else {
            u32::from_le_bytes(source_array)
        };
    }

    /// Reads an i64 from the start of the given slice.
    /// PRECONDITION: source.len() >= 8
    pub fn read_i64(self, source: &[u8]) -> i64 {
        let source_array = source[..8].try_into().unwrap();
        return if self.source_big_endian {
            i64::from_be_bytes(source_array)
        } else {
            i64::from_le_bytes(source_array)
        };
    }

    /// Reads a u64 from the start of the given slice.
    /// PRECONDITION: source.len() >= 8
    pub fn read_u64(self, source: &[u8]) -> u64 {
        let source_array = source[..8].try_into().unwrap();
        return if self.source_big_endian {
            u64::from_be_bytes(source_array)
        } else {
            u64::from_le_bytes(source_array)
        };
    }

    /// Reads an f32 from the start of the given slice.
    /// PRECONDITION: source.len() >= 4
    pub fn read_f32(self, source: &[u8]) -> f32 {
        let source_array = source[..4].try_into().unwrap();
        return if self.source_big_endian {
            f32::from_be_bytes(source_array)
        } else {
            f32::from_le_bytes(source_array)
        };
    }

    /// Reads an f64 from the start of the given slice.
    /// PRECONDITION: source.len() >= 8
    pub fn read_f64(self, source: &[u8]) -> f64 {
        let source_array = source[..8].try_into().unwrap();
        return if self.source_big_endian {
            f64::from_be_bytes(source_array)
        } else {
            f64::from_le_bytes(source_array)
        };
    }

    /// Reads one identifier of the given width from the start of the slice,
    /// zero-extending 4-byte identifiers to u64.
    /// PRECONDITION: source.len() >= id_size.size()
    pub fn read_id(self, id_size: IdSize, source: &[u8]) -> u64 {
        return match id_size {
            IdSize::U4 => u64::from(self.read_u32(source)),
            IdSize::U8 => self.read_u64(source),
        };
    }
}
