// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::error::Error;
use std::io;

use thiserror::Error;

/// Failure raised while decoding a heap dump stream.
///
/// Every variant is fatal to the decoding session: the outer record loop is
/// aborted and no further visitor callback is made. The channel is left
/// untouched (the decoder never closes a caller-supplied channel) and the
/// decoder's internal buffers remain valid, so the same decoder instance may
/// be pointed at a fresh stream afterwards.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HprofError {
    /// The backing channel failed.
    #[error("i/o failure on the heap dump channel")]
    Io(#[from] io::Error),

    /// An outer record carried a tag byte this decoder does not know.
    #[error("unrecognized record tag 0x{tag:02x}")]
    UnknownRecordTag {
        /// The offending tag byte.
        tag: u8,
    },

    /// A heap dump sub-record carried a tag byte this decoder does not know.
    #[error("unrecognized heap record tag 0x{tag:02x}")]
    UnknownHeapTag {
        /// The offending tag byte.
        tag: u8,
    },

    /// A constant, static, field, or array element carried an unknown basic
    /// type byte.
    #[error("unrecognized basic type 0x{value:02x}")]
    UnknownBasicType {
        /// The offending basic type byte.
        value: u8,
    },

    /// The stream header declared an identifier size other than 4 or 8.
    #[error("unrecognized id size in the heap dump header: {size}")]
    BadIdSize {
        /// The declared identifier size.
        size: u32,
    },

    /// A primitive array declared `Object` as its element type.
    #[error("object typed element in a primitive array")]
    ObjectPrimitiveArray,

    /// The channel ended in the middle of a structurally mandatory field.
    #[error("truncated record: {required} bytes required, {available} available")]
    Truncated {
        /// Bytes the current record still needed.
        required: usize,
        /// Bytes that were actually available.
        available: usize,
    },

    /// A record needed a scratch buffer larger than its configured maximum.
    #[error("exceeded max {name} buffer capacity of {max}: {name} buffer of {requested} bytes requested")]
    BufferOverflow {
        /// Which named buffer overflowed.
        name: &'static str,
        /// The configured ceiling in bytes.
        max: usize,
        /// The size the offending record asked for.
        requested: usize,
    },

    /// The visitor rejected a record; the underlying error is carried
    /// unchanged as the source.
    #[error("visitor rejected a heap dump record")]
    Visitor(#[source] Box<dyn Error + Send + Sync>),
}

impl HprofError {
    /// Wraps a visitor-side failure so it can propagate out of
    /// [`HprofDecoder::read`](crate::HprofDecoder::read).
    pub fn visitor(err: impl Into<Box<dyn Error + Send + Sync>>) -> HprofError {
        return HprofError::Visitor(err.into());
    }
}
