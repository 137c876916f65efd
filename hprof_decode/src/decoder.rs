// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::io::Read;

use log::debug;

use crate::byte_reader::{HprofByteReader, IdSize};
use crate::channels::{read_full, FrameReader, PrependReader};
use crate::data_stream::DataStream;
use crate::error::HprofError;
use crate::records::{BasicType, HeapTag, RecordTag};
use crate::scratch::{BoundedScratch, BufferPool, Scratch, POOL_BUFFER_CAPACITY};
use crate::visitor::HprofVisitor;

const DEFAULT_MAX_BUFFER_CAPACITY: usize = 65536;
const INITIAL_BUFFER_CAPACITY: usize = 16384;

/// Fixed outer record header: tag byte, u32 time delta, u32 payload length.
const RECORD_HEADER_LEN: usize = 9;

/// Collects decoder options; obtained from [`HprofDecoder::builder`].
#[derive(Clone, Debug)]
pub struct HprofDecoderBuilder {
    byte_order: HprofByteReader,
    max_stack_buffer_capacity: usize,
    max_string_buffer_capacity: usize,
    max_instance_buffer_capacity: usize,
}

impl HprofDecoderBuilder {
    fn new() -> HprofDecoderBuilder {
        return HprofDecoderBuilder {
            byte_order: HprofByteReader::BIG_ENDIAN,
            max_stack_buffer_capacity: DEFAULT_MAX_BUFFER_CAPACITY,
            max_string_buffer_capacity: DEFAULT_MAX_BUFFER_CAPACITY,
            max_instance_buffer_capacity: DEFAULT_MAX_BUFFER_CAPACITY,
        };
    }

    /// Byte order of the heap dump data. The JVM writes big-endian, the
    /// default.
    pub fn byte_order(mut self, byte_order: HprofByteReader) -> HprofDecoderBuilder {
        self.byte_order = byte_order;
        return self;
    }

    /// Ceiling of the stack buffer in bytes. The stack buffer collects the
    /// frame ids of one stack trace and only needs raising for heaps with
    /// unusually deep traces.
    pub fn max_stack_buffer_capacity(mut self, capacity: usize) -> HprofDecoderBuilder {
        self.max_stack_buffer_capacity = capacity;
        return self;
    }

    /// Ceiling of the string buffer in bytes; bounds the longest string pool
    /// entry.
    pub fn max_string_buffer_capacity(mut self, capacity: usize) -> HprofDecoderBuilder {
        self.max_string_buffer_capacity = capacity;
        return self;
    }

    /// Ceiling of the instance buffer in bytes; bounds the packed field
    /// bytes of the largest object instance.
    pub fn max_instance_buffer_capacity(mut self, capacity: usize) -> HprofDecoderBuilder {
        self.max_instance_buffer_capacity = capacity;
        return self;
    }

    /// Builds the decoder with its named buffers pre-allocated.
    pub fn build(self) -> HprofDecoder {
        return HprofDecoder {
            byte_order: self.byte_order,
            stack_buffer: BoundedScratch::new(
                INITIAL_BUFFER_CAPACITY,
                self.max_stack_buffer_capacity,
                "stack",
                self.byte_order,
            ),
            string_buffer: BoundedScratch::new(
                INITIAL_BUFFER_CAPACITY,
                self.max_string_buffer_capacity,
                "string",
                self.byte_order,
            ),
            instance_buffer: BoundedScratch::new(
                INITIAL_BUFFER_CAPACITY,
                self.max_instance_buffer_capacity,
                "instance",
                self.byte_order,
            ),
            pool: BufferPool::new(self.byte_order),
        };
    }
}

/// Fail-fast event-based binary heap dump decoder.
///
/// The decoder makes a single pass over the stream and invokes one
/// [`HprofVisitor`] callback per decoded record; it never materialises the
/// heap. It owns a small set of reusable scratch buffers, so one instance
/// decodes one stream at a time; distinct instances are independent.
#[derive(Debug)]
pub struct HprofDecoder {
    byte_order: HprofByteReader,
    stack_buffer: BoundedScratch,
    string_buffer: BoundedScratch,
    instance_buffer: BoundedScratch,
    pool: BufferPool,
}

impl HprofDecoder {
    /// Starts collecting decoder options.
    pub fn builder() -> HprofDecoderBuilder {
        return HprofDecoderBuilder::new();
    }

    /// Decodes one heap dump stream from `channel`, reporting every record
    /// to `visitor`.
    ///
    /// Decoding runs until `HeapDumpEnd`, a clean end of stream at a record
    /// boundary, or the first error. Errors leave the channel untouched; the
    /// decoder's buffers remain valid for a fresh call.
    pub fn read<R: Read, V: HprofVisitor>(
        &mut self,
        mut channel: R,
        visitor: &mut V,
    ) -> Result<(), HprofError> {
        let mut head = vec![0u8; POOL_BUFFER_CAPACITY].into_boxed_slice();
        let filled = read_full(&mut channel, &mut head)?;

        let banner_len = match head[..filled].iter().position(|&b| b == 0) {
            Some(nul) => nul,
            None => {
                return Err(HprofError::Truncated {
                    required: filled + 1,
                    available: filled,
                })
            }
        };
        let mut pos = banner_len + 1;
        if filled - pos < 12 {
            return Err(HprofError::Truncated {
                required: pos + 12,
                available: filled,
            });
        }
        let banner = String::from_utf8_lossy(&head[..banner_len]).into_owned();
        let declared_id_size = self.byte_order.read_u32(&head[pos..]);
        let id_size = IdSize::from_header(declared_id_size)?;
        pos += 4;
        let timestamp = self.byte_order.read_u64(&head[pos..]);
        pos += 8;

        debug!(
            "decoding {:?}: id size {}, timestamp {}",
            banner, declared_id_size, timestamp
        );
        visitor.visit_header(&banner, declared_id_size, timestamp)?;

        // Re-inject the rest of the header read in front of the raw channel.
        let mut channel = PrependReader::new(head, pos, filled, channel);
        return self.read_records(id_size, &mut channel, visitor);
    }

    fn read_records<R: Read, V: HprofVisitor>(
        &mut self,
        id_size: IdSize,
        channel: &mut R,
        visitor: &mut V,
    ) -> Result<(), HprofError> {
        loop {
            let mut header = self.pool.borrow();
            header.reset(RECORD_HEADER_LEN);
            let filled = read_full(channel, header.fill_mut())?;
            if filled < RECORD_HEADER_LEN {
                // End of stream at a record boundary.
                self.pool.release(header);
                return Ok(());
            }
            let tag = header.get_u8();
            // Millisecond offset from the header timestamp; not forwarded.
            let _time_delta = header.get_u32();
            let length = header.get_u32();
            self.pool.release(header);

            match RecordTag::from_byte(tag)? {
                RecordTag::String => self.read_string(id_size, channel, visitor, length as usize)?,
                RecordTag::LoadClass => self.read_load_class(id_size, channel, visitor)?,
                RecordTag::StackFrame => self.read_stack_frame(id_size, channel, visitor)?,
                RecordTag::StackTrace => self.read_stack_trace(id_size, channel, visitor)?,
                RecordTag::HeapDump => self.read_heap_dump(id_size, channel, visitor, length)?,
                RecordTag::HeapDumpEnd => return Ok(()),
            }
        }
    }

    fn read_string<R: Read, V: HprofVisitor>(
        &mut self,
        id_size: IdSize,
        channel: &mut R,
        visitor: &mut V,
        length: usize,
    ) -> Result<(), HprofError> {
        if length < id_size.size() {
            return Err(HprofError::Truncated {
                required: id_size.size(),
                available: length,
            });
        }
        let buf = self.string_buffer.request(length)?;
        fill_exact(channel, buf)?;
        let sid = buf.get_id(id_size);
        let text = String::from_utf8_lossy(buf.remaining_bytes());
        return visitor.visit_string(sid, &text);
    }

    fn read_load_class<R: Read, V: HprofVisitor>(
        &mut self,
        id_size: IdSize,
        channel: &mut R,
        visitor: &mut V,
    ) -> Result<(), HprofError> {
        let mut buf = self.pool.borrow();
        buf.reset(2 * id_size.size() + 8);
        fill_exact(channel, &mut buf)?;
        let class_serial = buf.get_u32();
        let class_oid = buf.get_id(id_size);
        let stack_serial = buf.get_u32();
        let name_sid = buf.get_id(id_size);
        self.pool.release(buf);
        return visitor.visit_load_class(class_serial, class_oid, stack_serial, name_sid);
    }

    fn read_stack_frame<R: Read, V: HprofVisitor>(
        &mut self,
        id_size: IdSize,
        channel: &mut R,
        visitor: &mut V,
    ) -> Result<(), HprofError> {
        let mut buf = self.pool.borrow();
        buf.reset(4 * id_size.size() + 8);
        fill_exact(channel, &mut buf)?;
        let frame_id = buf.get_id(id_size);
        let method_name_sid = buf.get_id(id_size);
        let method_sig_sid = buf.get_id(id_size);
        let source_sid = buf.get_id(id_size);
        let class_serial = buf.get_u32();
        let line_no = buf.get_i32();
        self.pool.release(buf);
        return visitor.visit_stack_frame(
            frame_id,
            method_name_sid,
            method_sig_sid,
            source_sid,
            class_serial,
            line_no,
        );
    }

    fn read_stack_trace<R: Read, V: HprofVisitor>(
        &mut self,
        id_size: IdSize,
        channel: &mut R,
        visitor: &mut V,
    ) -> Result<(), HprofError> {
        let mut buf = self.pool.borrow();
        buf.reset(12);
        fill_exact(channel, &mut buf)?;
        let stack_serial = buf.get_u32();
        let thread_serial = buf.get_u32();
        let frame_count = buf.get_u32() as usize;
        self.pool.release(buf);

        let stack = self.stack_buffer.request(frame_count * id_size.size())?;
        fill_exact(channel, stack)?;
        let mut frames = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            frames.push(stack.get_id(id_size));
        }
        return visitor.visit_stack_trace(stack_serial, thread_serial, &frames);
    }

    fn read_heap_dump<R: Read, V: HprofVisitor>(
        &mut self,
        id_size: IdSize,
        channel: &mut R,
        visitor: &mut V,
        length: u32,
    ) -> Result<(), HprofError> {
        debug!("heap dump segment of {} bytes", length);
        let frame = FrameReader::new(channel, u64::from(length));
        let buf = self.pool.borrow();
        let mut stream = DataStream::new(frame, buf);
        let result = self.read_heap_records(id_size, &mut stream, visitor);
        self.pool.release(stream.into_buf());
        return result;
    }

    fn read_heap_records<R: Read, V: HprofVisitor>(
        &mut self,
        id_size: IdSize,
        stream: &mut DataStream<'_, R>,
        visitor: &mut V,
    ) -> Result<(), HprofError> {
        while stream.has_remaining()? {
            match HeapTag::from_byte(stream.get_u8()?)? {
                HeapTag::RootUnknown => {
                    let oid = stream.get_id(id_size)?;
                    visitor.visit_root_unknown(oid)?;
                }
                HeapTag::RootJniGlobal => {
                    let oid = stream.get_id(id_size)?;
                    let jni_global_ref = stream.get_id(id_size)?;
                    visitor.visit_root_jni_global(oid, jni_global_ref)?;
                }
                HeapTag::RootJniLocal => {
                    let oid = stream.get_id(id_size)?;
                    let thread_serial = stream.get_u32()?;
                    let frame_no = stream.get_u32()?;
                    visitor.visit_root_jni_local(oid, thread_serial, frame_no)?;
                }
                HeapTag::RootJavaFrame => {
                    let oid = stream.get_id(id_size)?;
                    let thread_serial = stream.get_u32()?;
                    let frame_no = stream.get_u32()?;
                    visitor.visit_root_java_frame(oid, thread_serial, frame_no)?;
                }
                HeapTag::RootNativeStack => {
                    let oid = stream.get_id(id_size)?;
                    let thread_serial = stream.get_u32()?;
                    visitor.visit_root_native_stack(oid, thread_serial)?;
                }
                HeapTag::RootStickyClass => {
                    let oid = stream.get_id(id_size)?;
                    visitor.visit_root_sticky_class(oid)?;
                }
                HeapTag::RootThreadBlock => {
                    let oid = stream.get_id(id_size)?;
                    let thread_serial = stream.get_u32()?;
                    visitor.visit_root_thread_block(oid, thread_serial)?;
                }
                HeapTag::RootMonitorUsed => {
                    let oid = stream.get_id(id_size)?;
                    visitor.visit_root_monitor_used(oid)?;
                }
                HeapTag::RootThreadObject => {
                    let oid = stream.get_id(id_size)?;
                    let thread_serial = stream.get_u32()?;
                    let stack_serial = stream.get_u32()?;
                    visitor.visit_root_thread_object(oid, thread_serial, stack_serial)?;
                }
                HeapTag::ClassDump => read_class_dump(id_size, stream, visitor)?,
                HeapTag::InstanceDump => self.read_instance_dump(id_size, stream, visitor)?,
                HeapTag::ObjectArrayDump => read_object_array(id_size, stream, visitor)?,
                HeapTag::PrimitiveArrayDump => read_primitive_array(id_size, stream, visitor)?,
            }
        }
        return Ok(());
    }

    fn read_instance_dump<R: Read, V: HprofVisitor>(
        &mut self,
        id_size: IdSize,
        stream: &mut DataStream<'_, R>,
        visitor: &mut V,
    ) -> Result<(), HprofError> {
        let oid = stream.get_id(id_size)?;
        let stack_serial = stream.get_u32()?;
        let class_oid = stream.get_id(id_size)?;
        let size = stream.get_u32()? as usize;
        let available = stream.available();
        if size > available {
            return Err(HprofError::Truncated {
                required: size,
                available,
            });
        }
        let buf = self.instance_buffer.request(size)?;
        stream.read_exact_into(buf.fill_mut())?;
        // The slice aliases the instance buffer; it is valid only until the
        // callback returns.
        return visitor.visit_instance(oid, stack_serial, class_oid, buf.remaining_bytes());
    }
}

fn read_class_dump<R: Read, V: HprofVisitor>(
    id_size: IdSize,
    stream: &mut DataStream<'_, R>,
    visitor: &mut V,
) -> Result<(), HprofError> {
    let class_oid = stream.get_id(id_size)?;
    let stack_serial = stream.get_u32()?;
    let super_oid = stream.get_id(id_size)?;
    let loader_oid = stream.get_id(id_size)?;
    let signer_oid = stream.get_id(id_size)?;
    let domain_oid = stream.get_id(id_size)?;
    // Two reserved identifiers, read and discarded.
    stream.get_id(id_size)?;
    stream.get_id(id_size)?;
    let instance_size = stream.get_u32()?;
    visitor.visit_class_header(
        class_oid,
        stack_serial,
        super_oid,
        loader_oid,
        signer_oid,
        domain_oid,
        instance_size,
    )?;

    let constants = stream.get_u16()?;
    for _ in 0..constants {
        let index = stream.get_u16()?;
        match BasicType::from_byte(stream.get_u8()?)? {
            BasicType::Object => {
                let oid = stream.get_id(id_size)?;
                visitor.visit_class_constant_object(class_oid, index, oid)?;
            }
            BasicType::Boolean => {
                visitor.visit_class_constant_boolean(class_oid, index, stream.get_bool()?)?;
            }
            BasicType::Char => {
                visitor.visit_class_constant_char(class_oid, index, stream.get_char()?)?;
            }
            BasicType::Float => {
                visitor.visit_class_constant_float(class_oid, index, stream.get_f32()?)?;
            }
            BasicType::Double => {
                visitor.visit_class_constant_double(class_oid, index, stream.get_f64()?)?;
            }
            BasicType::Byte => {
                visitor.visit_class_constant_byte(class_oid, index, stream.get_i8()?)?;
            }
            BasicType::Short => {
                visitor.visit_class_constant_short(class_oid, index, stream.get_i16()?)?;
            }
            BasicType::Int => {
                visitor.visit_class_constant_int(class_oid, index, stream.get_i32()?)?;
            }
            BasicType::Long => {
                visitor.visit_class_constant_long(class_oid, index, stream.get_i64()?)?;
            }
        }
    }

    let statics = stream.get_u16()?;
    for _ in 0..statics {
        let name_sid = stream.get_id(id_size)?;
        match BasicType::from_byte(stream.get_u8()?)? {
            BasicType::Object => {
                let oid = stream.get_id(id_size)?;
                visitor.visit_class_static_object(class_oid, name_sid, oid)?;
            }
            BasicType::Boolean => {
                visitor.visit_class_static_boolean(class_oid, name_sid, stream.get_bool()?)?;
            }
            BasicType::Char => {
                visitor.visit_class_static_char(class_oid, name_sid, stream.get_char()?)?;
            }
            BasicType::Float => {
                visitor.visit_class_static_float(class_oid, name_sid, stream.get_f32()?)?;
            }
            BasicType::Double => {
                visitor.visit_class_static_double(class_oid, name_sid, stream.get_f64()?)?;
            }
            BasicType::Byte => {
                visitor.visit_class_static_byte(class_oid, name_sid, stream.get_i8()?)?;
            }
            BasicType::Short => {
                visitor.visit_class_static_short(class_oid, name_sid, stream.get_i16()?)?;
            }
            BasicType::Int => {
                visitor.visit_class_static_int(class_oid, name_sid, stream.get_i32()?)?;
            }
            BasicType::Long => {
                visitor.visit_class_static_long(class_oid, name_sid, stream.get_i64()?)?;
            }
        }
    }

    let fields = stream.get_u16()?;
    for _ in 0..fields {
        let name_sid = stream.get_id(id_size)?;
        match BasicType::from_byte(stream.get_u8()?)? {
            BasicType::Object => visitor.visit_class_field_object(class_oid, name_sid)?,
            BasicType::Boolean => visitor.visit_class_field_boolean(class_oid, name_sid)?,
            BasicType::Char => visitor.visit_class_field_char(class_oid, name_sid)?,
            BasicType::Float => visitor.visit_class_field_float(class_oid, name_sid)?,
            BasicType::Double => visitor.visit_class_field_double(class_oid, name_sid)?,
            BasicType::Byte => visitor.visit_class_field_byte(class_oid, name_sid)?,
            BasicType::Short => visitor.visit_class_field_short(class_oid, name_sid)?,
            BasicType::Int => visitor.visit_class_field_int(class_oid, name_sid)?,
            BasicType::Long => visitor.visit_class_field_long(class_oid, name_sid)?,
        }
    }
    return Ok(());
}

fn read_object_array<R: Read, V: HprofVisitor>(
    id_size: IdSize,
    stream: &mut DataStream<'_, R>,
    visitor: &mut V,
) -> Result<(), HprofError> {
    let oid = stream.get_id(id_size)?;
    let stack_serial = stream.get_u32()?;
    let length = stream.get_u32()? as usize;
    let class_oid = stream.get_id(id_size)?;

    // Refuse to pre-allocate more elements than the frame can still supply.
    let needed = (length as u64) * (id_size.size() as u64);
    let available = stream.available();
    if needed > available as u64 {
        return Err(HprofError::Truncated {
            required: usize::try_from(needed).unwrap_or(usize::MAX),
            available,
        });
    }
    let mut elements = Vec::with_capacity(length);
    for _ in 0..length {
        elements.push(stream.get_id(id_size)?);
    }
    return visitor.visit_object_array(oid, stack_serial, class_oid, &elements);
}

fn read_primitive_array<R: Read, V: HprofVisitor>(
    id_size: IdSize,
    stream: &mut DataStream<'_, R>,
    visitor: &mut V,
) -> Result<(), HprofError> {
    let oid = stream.get_id(id_size)?;
    let stack_serial = stream.get_u32()?;
    let length = stream.get_u32()? as usize;
    let elem_type = BasicType::from_byte(stream.get_u8()?)?;
    if elem_type == BasicType::Object {
        return Err(HprofError::ObjectPrimitiveArray);
    }

    // Refuse to pre-allocate more elements than the frame can still supply.
    let needed = (length as u64) * (elem_type.size(id_size) as u64);
    let available = stream.available();
    if needed > available as u64 {
        return Err(HprofError::Truncated {
            required: usize::try_from(needed).unwrap_or(usize::MAX),
            available,
        });
    }

    match elem_type {
        // Ruled out above.
        BasicType::Object => {}
        BasicType::Boolean => {
            let mut elements = Vec::with_capacity(length);
            for _ in 0..length {
                elements.push(stream.get_bool()?);
            }
            visitor.visit_boolean_array(oid, stack_serial, &elements)?;
        }
        BasicType::Char => {
            let mut elements = Vec::with_capacity(length);
            for _ in 0..length {
                elements.push(stream.get_char()?);
            }
            visitor.visit_char_array(oid, stack_serial, &elements)?;
        }
        BasicType::Float => {
            let mut elements = Vec::with_capacity(length);
            for _ in 0..length {
                elements.push(stream.get_f32()?);
            }
            visitor.visit_float_array(oid, stack_serial, &elements)?;
        }
        BasicType::Double => {
            let mut elements = Vec::with_capacity(length);
            for _ in 0..length {
                elements.push(stream.get_f64()?);
            }
            visitor.visit_double_array(oid, stack_serial, &elements)?;
        }
        BasicType::Byte => {
            let mut elements = Vec::with_capacity(length);
            for _ in 0..length {
                elements.push(stream.get_i8()?);
            }
            visitor.visit_byte_array(oid, stack_serial, &elements)?;
        }
        BasicType::Short => {
            let mut elements = Vec::with_capacity(length);
            for _ in 0..length {
                elements.push(stream.get_i16()?);
            }
            visitor.visit_short_array(oid, stack_serial, &elements)?;
        }
        BasicType::Int => {
            let mut elements = Vec::with_capacity(length);
            for _ in 0..length {
                elements.push(stream.get_i32()?);
            }
            visitor.visit_int_array(oid, stack_serial, &elements)?;
        }
        BasicType::Long => {
            let mut elements = Vec::with_capacity(length);
            for _ in 0..length {
                elements.push(stream.get_i64()?);
            }
            visitor.visit_long_array(oid, stack_serial, &elements)?;
        }
    }
    return Ok(());
}

/// Fills the scratch's declared region completely; anything less is a
/// truncation error.
fn fill_exact<R: Read>(channel: &mut R, scratch: &mut Scratch) -> Result<(), HprofError> {
    let want = scratch.fill_mut().len();
    let filled = read_full(channel, scratch.fill_mut())?;
    if filled < want {
        return Err(HprofError::Truncated {
            required: want,
            available: filled,
        });
    }
    return Ok(());
}
