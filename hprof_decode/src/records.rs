// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use num_enum::TryFromPrimitive;

use crate::byte_reader::IdSize;
use crate::error::HprofError;

/// Tag byte of a top-level record. Every record in the stream after the
/// header starts with one of these, followed by a u32 time delta and a u32
/// payload length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub(crate) enum RecordTag {
    String = 0x01,
    LoadClass = 0x02,
    StackFrame = 0x04,
    StackTrace = 0x05,
    HeapDump = 0x1c,
    HeapDumpEnd = 0x2c,
}

impl RecordTag {
    /// Unknown tag bytes are a format error; the stream cannot be resumed
    /// past a record of unknown length.
    pub(crate) fn from_byte(tag: u8) -> Result<RecordTag, HprofError> {
        return RecordTag::try_from(tag).map_err(|_| HprofError::UnknownRecordTag { tag });
    }
}

/// Tag byte of a sub-record inside a heap dump segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub(crate) enum HeapTag {
    RootUnknown = 0xff,
    RootJniGlobal = 0x01,
    RootJniLocal = 0x02,
    RootJavaFrame = 0x03,
    RootNativeStack = 0x04,
    RootStickyClass = 0x05,
    RootThreadBlock = 0x06,
    RootMonitorUsed = 0x07,
    RootThreadObject = 0x08,
    ClassDump = 0x20,
    InstanceDump = 0x21,
    ObjectArrayDump = 0x22,
    PrimitiveArrayDump = 0x23,
}

impl HeapTag {
    pub(crate) fn from_byte(tag: u8) -> Result<HeapTag, HprofError> {
        return HeapTag::try_from(tag).map_err(|_| HprofError::UnknownHeapTag { tag });
    }
}

/// Element type byte used by class dump constants, statics, instance field
/// declarations, and primitive arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub(crate) enum BasicType {
    Object = 2,
    Boolean = 4,
    Char = 5,
    Float = 6,
    Double = 7,
    Byte = 8,
    Short = 9,
    Int = 10,
    Long = 11,
}

impl BasicType {
    pub(crate) fn from_byte(value: u8) -> Result<BasicType, HprofError> {
        return BasicType::try_from(value).map_err(|_| HprofError::UnknownBasicType { value });
    }

    /// Wire size of one value of this type. `Object` values are identifiers
    /// and take the stream's identifier width.
    pub(crate) const fn size(self, id_size: IdSize) -> usize {
        return match self {
            BasicType::Object => id_size.size(),
            BasicType::Boolean | BasicType::Byte => 1,
            BasicType::Char | BasicType::Short => 2,
            BasicType::Float | BasicType::Int => 4,
            BasicType::Double | BasicType::Long => 8,
        };
    }
}
