// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::byte_reader::{HprofByteReader, IdSize};
use crate::error::HprofError;

/// Capacity of the pooled general-purpose buffers.
pub(crate) const POOL_BUFFER_CAPACITY: usize = 4096;

/// A reusable byte region with a read cursor, bound to a byte order.
///
/// Valid bytes live in `data[pos..limit]`. Fill code writes into
/// [`Scratch::unfilled_mut`] and commits with [`Scratch::add_filled`]; the
/// typed getters then consume from the front.
///
/// The getters assume the requested bytes are present. Callers uphold that
/// either by filling an exact-sized region up front (the fixed-layout outer
/// records) or by calling `DataStream::ensure` first (the heap dump stream).
#[derive(Debug)]
pub(crate) struct Scratch {
    data: Box<[u8]>,
    pos: usize,
    limit: usize,
    reader: HprofByteReader,
}

impl Scratch {
    pub(crate) fn with_capacity(capacity: usize, reader: HprofByteReader) -> Scratch {
        return Scratch {
            data: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
            limit: 0,
            reader,
        };
    }

    pub(crate) fn capacity(&self) -> usize {
        return self.data.len();
    }

    pub(crate) fn remaining(&self) -> usize {
        return self.limit - self.pos;
    }

    pub(crate) fn has_remaining(&self) -> bool {
        return self.pos < self.limit;
    }

    /// Rewinds the cursor and declares `len` bytes as the fill target.
    /// PRECONDITION: len <= capacity()
    pub(crate) fn reset(&mut self, len: usize) {
        debug_assert!(len <= self.data.len());
        self.pos = 0;
        self.limit = len;
    }

    /// Rewinds the cursor with no valid bytes.
    pub(crate) fn reset_empty(&mut self) {
        self.pos = 0;
        self.limit = 0;
    }

    /// Moves the unread tail to the front so the region behind it can be
    /// refilled.
    pub(crate) fn compact(&mut self) {
        self.data.copy_within(self.pos..self.limit, 0);
        self.limit -= self.pos;
        self.pos = 0;
    }

    /// The writable region past the valid bytes.
    pub(crate) fn unfilled_mut(&mut self) -> &mut [u8] {
        return &mut self.data[self.limit..];
    }

    /// Commits `n` bytes written into [`Scratch::unfilled_mut`].
    pub(crate) fn add_filled(&mut self, n: usize) {
        self.limit += n;
        debug_assert!(self.limit <= self.data.len());
    }

    /// The full fill target declared by [`Scratch::reset`], for exact reads.
    pub(crate) fn fill_mut(&mut self) -> &mut [u8] {
        return &mut self.data[..self.limit];
    }

    /// The unread bytes.
    pub(crate) fn remaining_bytes(&self) -> &[u8] {
        return &self.data[self.pos..self.limit];
    }

    /// Skips `n` unread bytes.
    /// PRECONDITION: n <= remaining()
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.pos += n;
    }

    pub(crate) fn get_u8(&mut self) -> u8 {
        let v = self.data[self.pos];
        self.pos += 1;
        return v;
    }

    pub(crate) fn get_i8(&mut self) -> i8 {
        return self.get_u8() as i8;
    }

    /// One byte; any nonzero value is true.
    pub(crate) fn get_bool(&mut self) -> bool {
        return self.get_u8() != 0;
    }

    pub(crate) fn get_u16(&mut self) -> u16 {
        let v = self.reader.read_u16(&self.data[self.pos..]);
        self.pos += 2;
        return v;
    }

    pub(crate) fn get_i16(&mut self) -> i16 {
        let v = self.reader.read_i16(&self.data[self.pos..]);
        self.pos += 2;
        return v;
    }

    /// A UTF-16 code unit.
    pub(crate) fn get_char(&mut self) -> u16 {
        return self.get_u16();
    }

    pub(crate) fn get_u32(&mut self) -> u32 {
        let v = self.reader.read_u32(&self.data[self.pos..]);
        self.pos += 4;
        return v;
    }

    pub(crate) fn get_i32(&mut self) -> i32 {
        let v = self.reader.read_i32(&self.data[self.pos..]);
        self.pos += 4;
        return v;
    }

    pub(crate) fn get_u64(&mut self) -> u64 {
        let v = self.reader.read_u64(&self.data[self.pos..]);
        self.pos += 8;
        return v;
    }

    pub(crate) fn get_i64(&mut self) -> i64 {
        let v = self.reader.read_i64(&self.data[self.pos..]);
        self.pos += 8;
        return v;
    }

    pub(crate) fn get_f32(&mut self) -> f32 {
        let v = self.reader.read_f32(&self.data[self.pos..]);
        self.pos += 4;
        return v;
    }

    pub(crate) fn get_f64(&mut self) -> f64 {
        let v = self.reader.read_f64(&self.data[self.pos..]);
        self.pos += 8;
        return v;
    }

    /// One identifier, zero-extended to u64.
    pub(crate) fn get_id(&mut self, id_size: IdSize) -> u64 {
        let v = self.reader.read_id(id_size, &self.data[self.pos..]);
        self.pos += id_size.size();
        return v;
    }
}

/// A named scratch buffer that grows on demand up to a hard ceiling.
///
/// Growth is monotonic and power-of-two; the buffer is never shrunk. A
/// request above the ceiling is a configuration error, reported with the
/// buffer's name so the caller knows which `max_*_buffer_capacity` option to
/// raise.
#[derive(Debug)]
pub(crate) struct BoundedScratch {
    scratch: Scratch,
    max_capacity: usize,
    name: &'static str,
}

impl BoundedScratch {
    pub(crate) fn new(
        initial_capacity: usize,
        max_capacity: usize,
        name: &'static str,
        reader: HprofByteReader,
    ) -> BoundedScratch {
        return BoundedScratch {
            scratch: Scratch::with_capacity(initial_capacity.min(max_capacity), reader),
            max_capacity,
            name,
        };
    }

    /// Hands out the buffer sized for `size` bytes, cursor rewound.
    pub(crate) fn request(&mut self, size: usize) -> Result<&mut Scratch, HprofError> {
        if size > self.max_capacity {
            return Err(HprofError::BufferOverflow {
                name: self.name,
                max: self.max_capacity,
                requested: size,
            });
        }
        if size > self.scratch.capacity() {
            let grown = size.next_power_of_two().min(self.max_capacity);
            self.scratch = Scratch::with_capacity(grown, self.scratch.reader);
        }
        self.scratch.reset(size);
        return Ok(&mut self.scratch);
    }
}

/// Free list of small general-purpose buffers backing the record headers and
/// fixed-layout record reads. Buffers are borrowed and released by move.
#[derive(Debug)]
pub(crate) struct BufferPool {
    free: Vec<Scratch>,
    reader: HprofByteReader,
}

impl BufferPool {
    pub(crate) fn new(reader: HprofByteReader) -> BufferPool {
        return BufferPool {
            free: Vec::new(),
            reader,
        };
    }

    pub(crate) fn borrow(&mut self) -> Scratch {
        return match self.free.pop() {
            Some(mut scratch) => {
                scratch.reset_empty();
                scratch
            }
            None => Scratch::with_capacity(POOL_BUFFER_CAPACITY, self.reader),
        };
    }

    pub(crate) fn release(&mut self, scratch: Scratch) {
        self.free.push(scratch);
    }
}
