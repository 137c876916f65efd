// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::cmp;
use std::io::Read;

use crate::byte_reader::IdSize;
use crate::channels::FrameReader;
use crate::error::HprofError;
use crate::scratch::Scratch;

/// Pull reader over a framed channel, used for the heap dump segment.
///
/// Heap dump sub-records are not length-prefixed, so the inner decoder pulls
/// typed values one at a time. The stream keeps a small buffer ahead of the
/// cursor and refills it by compaction whenever a read wants more bytes than
/// remain buffered. A refill keeps reading until the requested width is
/// buffered or the frame ends, so short reads from the channel are harmless.
///
/// `ensure` assumes the requested width fits the buffer; that holds because
/// the widest single value is an 8-byte primitive, far below the pooled
/// buffer capacity.
#[derive(Debug)]
pub(crate) struct DataStream<'a, R> {
    input: FrameReader<'a, R>,
    buf: Scratch,
}

impl<'a, R: Read> DataStream<'a, R> {
    pub(crate) fn new(input: FrameReader<'a, R>, mut buf: Scratch) -> DataStream<'a, R> {
        buf.reset_empty();
        return DataStream { input, buf };
    }

    /// Gives the buffer back for release into the pool.
    pub(crate) fn into_buf(self) -> Scratch {
        return self.buf;
    }

    /// Bytes obtainable without running past the frame: buffered plus
    /// still-framed. Used to refuse absurd array pre-allocations.
    pub(crate) fn available(&self) -> usize {
        return self.buf.remaining() + self.input.remaining() as usize;
    }

    /// True iff at least one more byte can be read.
    pub(crate) fn has_remaining(&mut self) -> Result<bool, HprofError> {
        if self.buf.has_remaining() {
            return Ok(true);
        }
        self.buf.compact();
        let read = self.input.read(self.buf.unfilled_mut())?;
        self.buf.add_filled(read);
        return Ok(read > 0);
    }

    /// Buffers at least `n` unread bytes, refilling by compaction.
    fn ensure(&mut self, n: usize) -> Result<(), HprofError> {
        if self.buf.remaining() >= n {
            return Ok(());
        }
        self.buf.compact();
        while self.buf.remaining() < n {
            let read = self.input.read(self.buf.unfilled_mut())?;
            if read == 0 {
                return Err(HprofError::Truncated {
                    required: n,
                    available: self.buf.remaining(),
                });
            }
            self.buf.add_filled(read);
        }
        return Ok(());
    }

    pub(crate) fn get_u8(&mut self) -> Result<u8, HprofError> {
        self.ensure(1)?;
        return Ok(self.buf.get_u8());
    }

    pub(crate) fn get_i8(&mut self) -> Result<i8, HprofError> {
        self.ensure(1)?;
        return Ok(self.buf.get_i8());
    }

    /// One byte; any nonzero value is true.
    pub(crate) fn get_bool(&mut self) -> Result<bool, HprofError> {
        self.ensure(1)?;
        return Ok(self.buf.get_bool());
    }

    pub(crate) fn get_u16(&mut self) -> Result<u16, HprofError> {
        self.ensure(2)?;
        return Ok(self.buf.get_u16());
    }

    pub(crate) fn get_i16(&mut self) -> Result<i16, HprofError> {
        self.ensure(2)?;
        return Ok(self.buf.get_i16());
    }

    /// A UTF-16 code unit.
    pub(crate) fn get_char(&mut self) -> Result<u16, HprofError> {
        self.ensure(2)?;
        return Ok(self.buf.get_char());
    }

    pub(crate) fn get_u32(&mut self) -> Result<u32, HprofError> {
        self.ensure(4)?;
        return Ok(self.buf.get_u32());
    }

    pub(crate) fn get_i32(&mut self) -> Result<i32, HprofError> {
        self.ensure(4)?;
        return Ok(self.buf.get_i32());
    }

    pub(crate) fn get_u64(&mut self) -> Result<u64, HprofError> {
        self.ensure(8)?;
        return Ok(self.buf.get_u64());
    }

    pub(crate) fn get_i64(&mut self) -> Result<i64, HprofError> {
        self.ensure(8)?;
        return Ok(self.buf.get_i64());
    }

    pub(crate) fn get_f32(&mut self) -> Result<f32, HprofError> {
        self.ensure(4)?;
        return Ok(self.buf.get_f32());
    }

    pub(crate) fn get_f64(&mut self) -> Result<f64, HprofError> {
        self.ensure(8)?;
        return Ok(self.buf.get_f64());
    }

    /// One identifier, zero-extended to u64.
    pub(crate) fn get_id(&mut self, id_size: IdSize) -> Result<u64, HprofError> {
        self.ensure(id_size.size())?;
        return Ok(self.buf.get_id(id_size));
    }

    /// Fills `dst` completely, draining buffered bytes first. End of frame
    /// before `dst` is full is a truncation error.
    pub(crate) fn read_exact_into(&mut self, dst: &mut [u8]) -> Result<(), HprofError> {
        let buffered = cmp::min(self.buf.remaining(), dst.len());
        dst[..buffered].copy_from_slice(&self.buf.remaining_bytes()[..buffered]);
        self.buf.advance(buffered);

        let mut filled = buffered;
        while filled < dst.len() {
            let read = self.input.read(&mut dst[filled..])?;
            if read == 0 {
                return Err(HprofError::Truncated {
                    required: dst.len(),
                    available: filled,
                });
            }
            filled += read;
        }
        return Ok(());
    }
}
