// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::cmp;
use std::io;
use std::io::Read;

/// Pairs a byte channel with an already-filled buffer by prepending the
/// buffer's unread bytes in front of the channel.
///
/// The decoder uses this to re-inject the initial header read back in front
/// of the raw stream, so the record loop sees one seamless source. Once the
/// prepended bytes are drained the buffer keeps serving as the transfer
/// buffer for subsequent reads.
#[derive(Debug)]
pub struct PrependReader<R> {
    buf: Box<[u8]>,
    pos: usize,
    limit: usize,
    backend: R,
}

impl<R: Read> PrependReader<R> {
    /// Prepends `buf[pos..limit]` in front of `backend`.
    ///
    /// # Panics
    ///
    /// Panics if `pos > limit` or `limit > buf.len()`.
    pub fn new(buf: Box<[u8]>, pos: usize, limit: usize, backend: R) -> PrependReader<R> {
        assert!(pos <= limit && limit <= buf.len());
        return PrependReader {
            buf,
            pos,
            limit,
            backend,
        };
    }
}

impl<R: Read> Read for PrependReader<R> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let mut delivered = 0;
        while delivered < dst.len() {
            if self.pos == self.limit {
                self.pos = 0;
                self.limit = self.backend.read(&mut self.buf)?;
                if self.limit == 0 {
                    // End of stream; report what was already transferred.
                    return Ok(delivered);
                }
            }
            let take = cmp::min(self.limit - self.pos, dst.len() - delivered);
            dst[delivered..delivered + take].copy_from_slice(&self.buf[self.pos..self.pos + take]);
            self.pos += take;
            delivered += take;
        }
        return Ok(delivered);
    }
}

/// Caps the number of bytes readable from a backing channel.
///
/// The decoder wraps the channel in a frame for the duration of a heap dump
/// segment, whose payload length is declared by its record header. The frame
/// holds an exclusive borrow of the channel, so the channel cannot be touched
/// until the frame is dropped.
#[derive(Debug)]
pub struct FrameReader<'a, R> {
    backend: &'a mut R,
    remaining: u64,
}

impl<'a, R: Read> FrameReader<'a, R> {
    /// Caps `backend` at `len` bytes.
    pub fn new(backend: &'a mut R, len: u64) -> FrameReader<'a, R> {
        return FrameReader {
            backend,
            remaining: len,
        };
    }

    /// Bytes still readable from this frame.
    pub fn remaining(&self) -> u64 {
        return self.remaining;
    }
}

impl<R: Read> Read for FrameReader<'_, R> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let want = cmp::min(self.remaining, dst.len() as u64) as usize;
        let read = self.backend.read(&mut dst[..want])?;
        self.remaining -= read as u64;
        return Ok(read);
    }
}

/// Reads until `dst` is full or the channel ends; returns the bytes filled.
/// Short reads from the channel are retried, so the only way to come back
/// with less than `dst.len()` is a genuine end of stream.
pub(crate) fn read_full<R: Read>(channel: &mut R, dst: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < dst.len() {
        let n = channel.read(&mut dst[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    return Ok(filled);
}
