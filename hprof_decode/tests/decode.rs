use std::io::Cursor;

use hprof_decode::{HprofByteReader, HprofDecoder, HprofError, HprofVisitor};

/// One recorded visitor callback, field for field.
#[derive(Clone, Debug, PartialEq)]
enum Event {
    Header(String, u32, u64),
    Utf(u64, String),
    LoadClass(u32, u64, u32, u64),
    StackFrame(u64, u64, u64, u64, u32, i32),
    StackTrace(u32, u32, Vec<u64>),
    RootUnknown(u64),
    RootJniGlobal(u64, u64),
    RootJniLocal(u64, u32, u32),
    RootJavaFrame(u64, u32, u32),
    RootNativeStack(u64, u32),
    RootStickyClass(u64),
    RootThreadBlock(u64, u32),
    RootMonitorUsed(u64),
    RootThreadObject(u64, u32, u32),
    ClassHeader(u64, u32, u64, u64, u64, u64, u32),
    ConstObject(u64, u16, u64),
    ConstBoolean(u64, u16, bool),
    ConstChar(u64, u16, u16),
    ConstFloat(u64, u16, f32),
    ConstDouble(u64, u16, f64),
    ConstByte(u64, u16, i8),
    ConstShort(u64, u16, i16),
    ConstInt(u64, u16, i32),
    ConstLong(u64, u16, i64),
    StaticObject(u64, u64, u64),
    StaticBoolean(u64, u64, bool),
    StaticChar(u64, u64, u16),
    StaticFloat(u64, u64, f32),
    StaticDouble(u64, u64, f64),
    StaticByte(u64, u64, i8),
    StaticShort(u64, u64, i16),
    StaticInt(u64, u64, i32),
    StaticLong(u64, u64, i64),
    FieldObject(u64, u64),
    FieldBoolean(u64, u64),
    FieldChar(u64, u64),
    FieldFloat(u64, u64),
    FieldDouble(u64, u64),
    FieldByte(u64, u64),
    FieldShort(u64, u64),
    FieldInt(u64, u64),
    FieldLong(u64, u64),
    Instance(u64, u32, u64, Vec<u8>),
    ObjectArray(u64, u32, u64, Vec<u64>),
    BooleanArray(u64, u32, Vec<bool>),
    CharArray(u64, u32, Vec<u16>),
    FloatArray(u64, u32, Vec<f32>),
    DoubleArray(u64, u32, Vec<f64>),
    ByteArray(u64, u32, Vec<i8>),
    ShortArray(u64, u32, Vec<i16>),
    IntArray(u64, u32, Vec<i32>),
    LongArray(u64, u32, Vec<i64>),
}

/// Records every callback in order; the instance bytes are copied out
/// because the slice is only valid during the call.
#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl HprofVisitor for Recorder {
    fn visit_header(&mut self, header: &str, id_size: u32, ts: u64) -> Result<(), HprofError> {
        self.events.push(Event::Header(header.to_owned(), id_size, ts));
        Ok(())
    }
    fn visit_string(&mut self, sid: u64, text: &str) -> Result<(), HprofError> {
        self.events.push(Event::Utf(sid, text.to_owned()));
        Ok(())
    }
    fn visit_load_class(
        &mut self,
        class_serial: u32,
        class_oid: u64,
        stack_serial: u32,
        name_sid: u64,
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::LoadClass(class_serial, class_oid, stack_serial, name_sid));
        Ok(())
    }
    fn visit_stack_frame(
        &mut self,
        frame_id: u64,
        method_name_sid: u64,
        method_sig_sid: u64,
        source_sid: u64,
        class_serial: u32,
        line_no: i32,
    ) -> Result<(), HprofError> {
        self.events.push(Event::StackFrame(
            frame_id,
            method_name_sid,
            method_sig_sid,
            source_sid,
            class_serial,
            line_no,
        ));
        Ok(())
    }
    fn visit_stack_trace(
        &mut self,
        stack_serial: u32,
        thread_serial: u32,
        frames: &[u64],
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::StackTrace(stack_serial, thread_serial, frames.to_vec()));
        Ok(())
    }
    fn visit_root_unknown(&mut self, oid: u64) -> Result<(), HprofError> {
        self.events.push(Event::RootUnknown(oid));
        Ok(())
    }
    fn visit_root_jni_global(&mut self, oid: u64, jni_global_ref: u64) -> Result<(), HprofError> {
        self.events.push(Event::RootJniGlobal(oid, jni_global_ref));
        Ok(())
    }
    fn visit_root_jni_local(
        &mut self,
        oid: u64,
        thread_serial: u32,
        frame_no: u32,
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::RootJniLocal(oid, thread_serial, frame_no));
        Ok(())
    }
    fn visit_root_java_frame(
        &mut self,
        oid: u64,
        thread_serial: u32,
        frame_no: u32,
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::RootJavaFrame(oid, thread_serial, frame_no));
        Ok(())
    }
    fn visit_root_native_stack(&mut self, oid: u64, thread_serial: u32) -> Result<(), HprofError> {
        self.events.push(Event::RootNativeStack(oid, thread_serial));
        Ok(())
    }
    fn visit_root_sticky_class(&mut self, oid: u64) -> Result<(), HprofError> {
        self.events.push(Event::RootStickyClass(oid));
        Ok(())
    }
    fn visit_root_thread_block(&mut self, oid: u64, thread_serial: u32) -> Result<(), HprofError> {
        self.events.push(Event::RootThreadBlock(oid, thread_serial));
        Ok(())
    }
    fn visit_root_monitor_used(&mut self, oid: u64) -> Result<(), HprofError> {
        self.events.push(Event::RootMonitorUsed(oid));
        Ok(())
    }
    fn visit_root_thread_object(
        &mut self,
        oid: u64,
        thread_serial: u32,
        stack_serial: u32,
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::RootThreadObject(oid, thread_serial, stack_serial));
        Ok(())
    }
    fn visit_class_header(
        &mut self,
        class_oid: u64,
        stack_serial: u32,
        super_oid: u64,
        loader_oid: u64,
        signer_oid: u64,
        domain_oid: u64,
        instance_size: u32,
    ) -> Result<(), HprofError> {
        self.events.push(Event::ClassHeader(
            class_oid,
            stack_serial,
            super_oid,
            loader_oid,
            signer_oid,
            domain_oid,
            instance_size,
        ));
        Ok(())
    }
    fn visit_class_constant_object(
        &mut self,
        class_oid: u64,
        index: u16,
        oid: u64,
    ) -> Result<(), HprofError> {
        self.events.push(Event::ConstObject(class_oid, index, oid));
        Ok(())
    }
    fn visit_class_constant_boolean(
        &mut self,
        class_oid: u64,
        index: u16,
        value: bool,
    ) -> Result<(), HprofError> {
        self.events.push(Event::ConstBoolean(class_oid, index, value));
        Ok(())
    }
    fn visit_class_constant_char(
        &mut self,
        class_oid: u64,
        index: u16,
        value: u16,
    ) -> Result<(), HprofError> {
        self.events.push(Event::ConstChar(class_oid, index, value));
        Ok(())
    }
    fn visit_class_constant_float(
        &mut self,
        class_oid: u64,
        index: u16,
        value: f32,
    ) -> Result<(), HprofError> {
        self.events.push(Event::ConstFloat(class_oid, index, value));
        Ok(())
    }
    fn visit_class_constant_double(
        &mut self,
        class_oid: u64,
        index: u16,
        value: f64,
    ) -> Result<(), HprofError> {
        self.events.push(Event::ConstDouble(class_oid, index, value));
        Ok(())
    }
    fn visit_class_constant_byte(
        &mut self,
        class_oid: u64,
        index: u16,
        value: i8,
    ) -> Result<(), HprofError> {
        self.events.push(Event::ConstByte(class_oid, index, value));
        Ok(())
    }
    fn visit_class_constant_short(
        &mut self,
        class_oid: u64,
        index: u16,
        value: i16,
    ) -> Result<(), HprofError> {
        self.events.push(Event::ConstShort(class_oid, index, value));
        Ok(())
    }
    fn visit_class_constant_int(
        &mut self,
        class_oid: u64,
        index: u16,
        value: i32,
    ) -> Result<(), HprofError> {
        self.events.push(Event::ConstInt(class_oid, index, value));
        Ok(())
    }
    fn visit_class_constant_long(
        &mut self,
        class_oid: u64,
        index: u16,
        value: i64,
    ) -> Result<(), HprofError> {
        self.events.push(Event::ConstLong(class_oid, index, value));
        Ok(())
    }
    fn visit_class_static_object(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        oid: u64,
    ) -> Result<(), HprofError> {
        self.events.push(Event::StaticObject(class_oid, name_sid, oid));
        Ok(())
    }
    fn visit_class_static_boolean(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: bool,
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::StaticBoolean(class_oid, name_sid, value));
        Ok(())
    }
    fn visit_class_static_char(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: u16,
    ) -> Result<(), HprofError> {
        self.events.push(Event::StaticChar(class_oid, name_sid, value));
        Ok(())
    }
    fn visit_class_static_float(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: f32,
    ) -> Result<(), HprofError> {
        self.events.push(Event::StaticFloat(class_oid, name_sid, value));
        Ok(())
    }
    fn visit_class_static_double(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: f64,
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::StaticDouble(class_oid, name_sid, value));
        Ok(())
    }
    fn visit_class_static_byte(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: i8,
    ) -> Result<(), HprofError> {
        self.events.push(Event::StaticByte(class_oid, name_sid, value));
        Ok(())
    }
    fn visit_class_static_short(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: i16,
    ) -> Result<(), HprofError> {
        self.events.push(Event::StaticShort(class_oid, name_sid, value));
        Ok(())
    }
    fn visit_class_static_int(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: i32,
    ) -> Result<(), HprofError> {
        self.events.push(Event::StaticInt(class_oid, name_sid, value));
        Ok(())
    }
    fn visit_class_static_long(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: i64,
    ) -> Result<(), HprofError> {
        self.events.push(Event::StaticLong(class_oid, name_sid, value));
        Ok(())
    }
    fn visit_class_field_object(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        self.events.push(Event::FieldObject(class_oid, name_sid));
        Ok(())
    }
    fn visit_class_field_boolean(
        &mut self,
        class_oid: u64,
        name_sid: u64,
    ) -> Result<(), HprofError> {
        self.events.push(Event::FieldBoolean(class_oid, name_sid));
        Ok(())
    }
    fn visit_class_field_char(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        self.events.push(Event::FieldChar(class_oid, name_sid));
        Ok(())
    }
    fn visit_class_field_float(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        self.events.push(Event::FieldFloat(class_oid, name_sid));
        Ok(())
    }
    fn visit_class_field_double(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        self.events.push(Event::FieldDouble(class_oid, name_sid));
        Ok(())
    }
    fn visit_class_field_byte(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        self.events.push(Event::FieldByte(class_oid, name_sid));
        Ok(())
    }
    fn visit_class_field_short(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        self.events.push(Event::FieldShort(class_oid, name_sid));
        Ok(())
    }
    fn visit_class_field_int(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        self.events.push(Event::FieldInt(class_oid, name_sid));
        Ok(())
    }
    fn visit_class_field_long(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        self.events.push(Event::FieldLong(class_oid, name_sid));
        Ok(())
    }
    fn visit_instance(
        &mut self,
        oid: u64,
        stack_serial: u32,
        class_oid: u64,
        fields: &[u8],
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::Instance(oid, stack_serial, class_oid, fields.to_vec()));
        Ok(())
    }
    fn visit_object_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        class_oid: u64,
        elements: &[u64],
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::ObjectArray(oid, stack_serial, class_oid, elements.to_vec()));
        Ok(())
    }
    fn visit_boolean_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[bool],
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::BooleanArray(oid, stack_serial, elements.to_vec()));
        Ok(())
    }
    fn visit_char_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[u16],
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::CharArray(oid, stack_serial, elements.to_vec()));
        Ok(())
    }
    fn visit_float_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[f32],
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::FloatArray(oid, stack_serial, elements.to_vec()));
        Ok(())
    }
    fn visit_double_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[f64],
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::DoubleArray(oid, stack_serial, elements.to_vec()));
        Ok(())
    }
    fn visit_byte_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[i8],
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::ByteArray(oid, stack_serial, elements.to_vec()));
        Ok(())
    }
    fn visit_short_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[i16],
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::ShortArray(oid, stack_serial, elements.to_vec()));
        Ok(())
    }
    fn visit_int_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[i32],
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::IntArray(oid, stack_serial, elements.to_vec()));
        Ok(())
    }
    fn visit_long_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[i64],
    ) -> Result<(), HprofError> {
        self.events
            .push(Event::LongArray(oid, stack_serial, elements.to_vec()));
        Ok(())
    }
}

/// Byte-level dump builder for composing test streams in either byte order
/// and identifier width.
#[derive(Clone)]
struct Wire {
    big: bool,
    id4: bool,
    bytes: Vec<u8>,
}

impl Wire {
    fn new(big: bool, id4: bool) -> Wire {
        Wire {
            big,
            id4,
            bytes: Vec::new(),
        }
    }

    /// Starts a stream: banner, declared id size, timestamp.
    fn header(big: bool, id_size: u32, ts: u64) -> Wire {
        let mut w = Wire::new(big, id_size == 4);
        w.bytes.extend_from_slice(b"JAVA PROFILE 1.0.2\0");
        w.u32(id_size);
        w.u64(ts);
        w
    }

    fn raw(&mut self, bytes: &[u8]) -> &mut Wire {
        self.bytes.extend_from_slice(bytes);
        self
    }

    fn u8(&mut self, v: u8) -> &mut Wire {
        self.bytes.push(v);
        self
    }

    fn u16(&mut self, v: u16) -> &mut Wire {
        let b = if self.big { v.to_be_bytes() } else { v.to_le_bytes() };
        self.raw(&b)
    }

    fn u32(&mut self, v: u32) -> &mut Wire {
        let b = if self.big { v.to_be_bytes() } else { v.to_le_bytes() };
        self.raw(&b)
    }

    fn i32(&mut self, v: i32) -> &mut Wire {
        let b = if self.big { v.to_be_bytes() } else { v.to_le_bytes() };
        self.raw(&b)
    }

    fn u64(&mut self, v: u64) -> &mut Wire {
        let b = if self.big { v.to_be_bytes() } else { v.to_le_bytes() };
        self.raw(&b)
    }

    fn f64(&mut self, v: f64) -> &mut Wire {
        let b = if self.big { v.to_be_bytes() } else { v.to_le_bytes() };
        self.raw(&b)
    }

    fn id(&mut self, v: u64) -> &mut Wire {
        if self.id4 {
            self.u32(v as u32)
        } else {
            self.u64(v)
        }
    }

    /// One outer record: tag, zero time delta, payload length, payload.
    fn record(&mut self, tag: u8, payload: &Wire) -> &mut Wire {
        self.u8(tag);
        self.u32(0);
        self.u32(payload.bytes.len() as u32);
        self.raw(&payload.bytes)
    }

    /// A payload builder sharing this stream's byte order and id width.
    fn payload(&self) -> Wire {
        Wire::new(self.big, self.id4)
    }

    fn channel(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes.clone())
    }
}

fn decode(wire: &Wire) -> Result<Vec<Event>, HprofError> {
    let order = if wire.big {
        HprofByteReader::BIG_ENDIAN
    } else {
        HprofByteReader::LITTLE_ENDIAN
    };
    let mut decoder = HprofDecoder::builder().byte_order(order).build();
    let mut recorder = Recorder::default();
    let result = decoder.read(wire.channel(), &mut recorder);
    return result.map(|_| recorder.events);
}

fn decode_err(wire: &Wire) -> (Vec<Event>, HprofError) {
    let order = if wire.big {
        HprofByteReader::BIG_ENDIAN
    } else {
        HprofByteReader::LITTLE_ENDIAN
    };
    let mut decoder = HprofDecoder::builder().byte_order(order).build();
    let mut recorder = Recorder::default();
    let err = decoder.read(wire.channel(), &mut recorder).unwrap_err();
    return (recorder.events, err);
}

fn expect_header(id_size: u32, ts: u64) -> Event {
    Event::Header("JAVA PROFILE 1.0.2".to_owned(), id_size, ts)
}

#[test]
fn empty_dump_happy_path() {
    let wire = Wire::header(true, 4, 0);
    assert_eq!(vec![expect_header(4, 0)], decode(&wire).unwrap());
}

#[test]
fn one_string() {
    let mut wire = Wire::header(true, 4, 0x0102);
    let mut payload = wire.payload();
    payload.id(0x2a).raw(b"ABC");
    wire.record(0x01, &payload);
    assert_eq!(
        vec![expect_header(4, 0x0102), Event::Utf(0x2a, "ABC".to_owned())],
        decode(&wire).unwrap()
    );
}

#[test]
fn load_class_with_wide_ids() {
    let mut wire = Wire::header(true, 8, 0);
    let mut payload = wire.payload();
    payload.u32(1).id(0x10).u32(2).id(0x20);
    wire.record(0x02, &payload);
    assert_eq!(
        vec![expect_header(8, 0), Event::LoadClass(1, 0x10, 2, 0x20)],
        decode(&wire).unwrap()
    );
}

#[test]
fn stack_frame_with_unknown_line() {
    let mut wire = Wire::header(true, 4, 0);
    let mut payload = wire.payload();
    payload.id(0x1000).id(0x11).id(0x12).id(0x13).u32(9).i32(-1);
    wire.record(0x04, &payload);
    assert_eq!(
        vec![
            expect_header(4, 0),
            Event::StackFrame(0x1000, 0x11, 0x12, 0x13, 9, -1),
        ],
        decode(&wire).unwrap()
    );
}

#[test]
fn stack_trace_with_two_frames() {
    let mut wire = Wire::header(true, 4, 0);
    let mut payload = wire.payload();
    payload.u32(7).u32(3).u32(2).id(0xaa).id(0xbb);
    wire.record(0x05, &payload);
    assert_eq!(
        vec![
            expect_header(4, 0),
            Event::StackTrace(7, 3, vec![0xaa, 0xbb]),
        ],
        decode(&wire).unwrap()
    );
}

#[test]
fn int_array_inside_heap_dump() {
    let mut wire = Wire::header(true, 4, 0);
    let mut inner = wire.payload();
    inner.u8(0x23).id(0x05).u32(0).u32(2).u8(10).i32(1).i32(2);
    wire.record(0x1c, &inner);
    wire.record(0x2c, &wire.payload());
    assert_eq!(
        vec![expect_header(4, 0), Event::IntArray(0x05, 0, vec![1, 2])],
        decode(&wire).unwrap()
    );
}

#[test]
fn rejects_illegal_id_size() {
    let wire = Wire::header(true, 2, 0);
    let (events, err) = decode_err(&wire);
    // The header is rejected before any callback.
    assert!(events.is_empty());
    assert!(matches!(err, HprofError::BadIdSize { size: 2 }));
}

#[test]
fn little_endian_matches_big_endian() {
    let compose = |big: bool| {
        let mut wire = Wire::header(big, 4, 0xbeef);
        let mut payload = wire.payload();
        payload.id(0x2a).raw(b"swap");
        wire.record(0x01, &payload);
        let mut inner = wire.payload();
        inner.u8(0x23).id(0x06).u32(1).u32(2).u8(5).u16(0x263a).u16(0x263b);
        inner.u8(0x23).id(0x07).u32(1).u32(1).u8(7).f64(2.5);
        wire.record(0x1c, &inner);
        wire.record(0x2c, &wire.payload());
        wire
    };
    let big = decode(&compose(true)).unwrap();
    let little = decode(&compose(false)).unwrap();
    assert_eq!(big, little);
    assert_eq!(
        vec![
            expect_header(4, 0xbeef),
            Event::Utf(0x2a, "swap".to_owned()),
            Event::CharArray(0x06, 1, vec![0x263a, 0x263b]),
            Event::DoubleArray(0x07, 1, vec![2.5]),
        ],
        big
    );
}

#[test]
fn narrow_ids_zero_extend() {
    let mut wire = Wire::header(true, 4, 0);
    let mut payload = wire.payload();
    payload.id(0xffff_fffe).raw(b"x");
    wire.record(0x01, &payload);
    let events = decode(&wire).unwrap();
    // Not sign-extended to 0xffff_ffff_ffff_fffe.
    assert_eq!(Event::Utf(0x0000_0000_ffff_fffe, "x".to_owned()), events[1]);
}

#[test]
fn class_dump_sections_in_order() {
    let mut wire = Wire::header(true, 4, 0);
    let mut inner = wire.payload();
    inner.u8(0x20);
    inner.id(0x100).u32(1).id(0x50).id(0x60).id(0x70).id(0x80);
    inner.id(0).id(0); // reserved
    inner.u32(24);
    // One constant pool entry, an int at index 3.
    inner.u16(1);
    inner.u16(3).u8(10).i32(-7);
    // Two statics: an object reference and a boolean.
    inner.u16(2);
    inner.id(0x200).u8(2).id(0x300);
    inner.id(0x201).u8(4).u8(2);
    // Three instance field declarations.
    inner.u16(3);
    inner.id(0x202).u8(11);
    inner.id(0x203).u8(5);
    inner.id(0x204).u8(2);
    wire.record(0x1c, &inner);
    wire.record(0x2c, &wire.payload());
    assert_eq!(
        vec![
            expect_header(4, 0),
            Event::ClassHeader(0x100, 1, 0x50, 0x60, 0x70, 0x80, 24),
            Event::ConstInt(0x100, 3, -7),
            Event::StaticObject(0x100, 0x200, 0x300),
            // Nonzero byte decodes as true.
            Event::StaticBoolean(0x100, 0x201, true),
            Event::FieldLong(0x100, 0x202),
            Event::FieldChar(0x100, 0x203),
            Event::FieldObject(0x100, 0x204),
        ],
        decode(&wire).unwrap()
    );
}

#[test]
fn instance_bytes_are_copied_out() {
    let mut wire = Wire::header(true, 8, 0);
    let mut inner = wire.payload();
    inner.u8(0x21).id(0x42).u32(5).id(0x100).u32(6).raw(&[1, 2, 3, 4, 5, 6]);
    inner.u8(0x21).id(0x43).u32(5).id(0x100).u32(2).raw(&[9, 9]);
    wire.record(0x1c, &inner);
    wire.record(0x2c, &wire.payload());
    assert_eq!(
        vec![
            expect_header(8, 0),
            Event::Instance(0x42, 5, 0x100, vec![1, 2, 3, 4, 5, 6]),
            // The second instance reuses the buffer; the first copy must
            // be unaffected.
            Event::Instance(0x43, 5, 0x100, vec![9, 9]),
        ],
        decode(&wire).unwrap()
    );
}

#[test]
fn object_array_and_roots() {
    let mut wire = Wire::header(true, 4, 0);
    let mut inner = wire.payload();
    inner.u8(0xff).id(1);
    inner.u8(0x01).id(2).id(0x900);
    inner.u8(0x02).id(3).u32(10).u32(0);
    inner.u8(0x03).id(4).u32(10).u32(1);
    inner.u8(0x04).id(5).u32(10);
    inner.u8(0x05).id(6);
    inner.u8(0x06).id(7).u32(10);
    inner.u8(0x07).id(8);
    inner.u8(0x08).id(9).u32(10).u32(77);
    inner.u8(0x22).id(0x600).u32(2).u32(3).id(0x601);
    inner.id(0xa).id(0xb).id(0xc);
    wire.record(0x1c, &inner);
    wire.record(0x2c, &wire.payload());
    assert_eq!(
        vec![
            expect_header(4, 0),
            Event::RootUnknown(1),
            Event::RootJniGlobal(2, 0x900),
            Event::RootJniLocal(3, 10, 0),
            Event::RootJavaFrame(4, 10, 1),
            Event::RootNativeStack(5, 10),
            Event::RootStickyClass(6),
            Event::RootThreadBlock(7, 10),
            Event::RootMonitorUsed(8),
            Event::RootThreadObject(9, 10, 77),
            Event::ObjectArray(0x600, 2, 0x601, vec![0xa, 0xb, 0xc]),
        ],
        decode(&wire).unwrap()
    );
}

#[test]
fn remaining_primitive_array_kinds() {
    let mut wire = Wire::header(true, 4, 0);
    let mut inner = wire.payload();
    inner.u8(0x23).id(1).u32(0).u32(3).u8(4).raw(&[0, 1, 2]);
    inner.u8(0x23).id(2).u32(0).u32(2).u8(8).raw(&[0x7f, 0x80]);
    inner.u8(0x23).id(3).u32(0).u32(2).u8(9).u16(0x0102).u16(0xfffe);
    inner.u8(0x23).id(4).u32(0).u32(1).u8(11).u64(0xffff_ffff_ffff_fff6);
    inner.u8(0x23).id(5).u32(0).u32(1).u8(6).u32(0x3f80_0000);
    wire.record(0x1c, &inner);
    wire.record(0x2c, &wire.payload());
    assert_eq!(
        vec![
            expect_header(4, 0),
            // Zero is false, any nonzero byte is true.
            Event::BooleanArray(1, 0, vec![false, true, true]),
            Event::ByteArray(2, 0, vec![127, -128]),
            Event::ShortArray(3, 0, vec![0x0102, -2]),
            Event::LongArray(4, 0, vec![-10]),
            Event::FloatArray(5, 0, vec![1.0]),
        ],
        decode(&wire).unwrap()
    );
}

#[test]
fn stops_at_heap_dump_end() {
    let mut wire = Wire::header(true, 4, 0);
    wire.record(0x2c, &wire.payload());
    // A record after the terminator is never decoded, even a valid one.
    let mut payload = wire.payload();
    payload.id(0x2a).raw(b"ghost");
    wire.record(0x01, &payload);
    assert_eq!(vec![expect_header(4, 0)], decode(&wire).unwrap());
}

#[test]
fn partial_record_header_is_clean_eof() {
    let mut wire = Wire::header(true, 4, 0);
    wire.raw(&[0x01, 0x00, 0x00]); // 3 of the 9 header bytes
    assert_eq!(vec![expect_header(4, 0)], decode(&wire).unwrap());
}

#[test]
fn unknown_outer_tag_is_an_error() {
    let mut wire = Wire::header(true, 4, 0);
    wire.record(0x31, &wire.payload());
    let (events, err) = decode_err(&wire);
    assert_eq!(vec![expect_header(4, 0)], events);
    assert!(matches!(err, HprofError::UnknownRecordTag { tag: 0x31 }));
}

#[test]
fn unknown_heap_tag_is_an_error() {
    let mut wire = Wire::header(true, 4, 0);
    let mut inner = wire.payload();
    inner.u8(0x30).id(1);
    wire.record(0x1c, &inner);
    let (events, err) = decode_err(&wire);
    assert_eq!(vec![expect_header(4, 0)], events);
    assert!(matches!(err, HprofError::UnknownHeapTag { tag: 0x30 }));
}

#[test]
fn object_type_in_primitive_array_is_an_error() {
    let mut wire = Wire::header(true, 4, 0);
    let mut inner = wire.payload();
    inner.u8(0x23).id(1).u32(0).u32(1).u8(2).id(0x99);
    wire.record(0x1c, &inner);
    let (_, err) = decode_err(&wire);
    assert!(matches!(err, HprofError::ObjectPrimitiveArray));
}

#[test]
fn unknown_basic_type_is_an_error() {
    let mut wire = Wire::header(true, 4, 0);
    let mut inner = wire.payload();
    inner.u8(0x23).id(1).u32(0).u32(1).u8(3);
    wire.record(0x1c, &inner);
    let (_, err) = decode_err(&wire);
    assert!(matches!(err, HprofError::UnknownBasicType { value: 3 }));
}

#[test]
fn string_above_buffer_ceiling() {
    let mut wire = Wire::header(true, 4, 0);
    let mut payload = wire.payload();
    payload.id(0x2a).raw(&[b'a'; 100]);
    wire.record(0x01, &payload);
    let mut decoder = HprofDecoder::builder()
        .max_string_buffer_capacity(64)
        .build();
    let mut recorder = Recorder::default();
    let err = decoder.read(wire.channel(), &mut recorder).unwrap_err();
    assert_eq!(vec![expect_header(4, 0)], recorder.events);
    assert!(matches!(
        err,
        HprofError::BufferOverflow {
            name: "string",
            max: 64,
            requested: 104,
        }
    ));
}

#[test]
fn stack_trace_above_buffer_ceiling() {
    let mut wire = Wire::header(true, 4, 0);
    let mut payload = wire.payload();
    payload.u32(1).u32(1).u32(100);
    for frame in 0..100u64 {
        payload.id(frame);
    }
    wire.record(0x05, &payload);
    let mut decoder = HprofDecoder::builder()
        .max_stack_buffer_capacity(128)
        .build();
    let mut recorder = Recorder::default();
    let err = decoder.read(wire.channel(), &mut recorder).unwrap_err();
    assert!(matches!(
        err,
        HprofError::BufferOverflow {
            name: "stack",
            max: 128,
            requested: 400,
        }
    ));
}

#[test]
fn refuses_absurd_array_preallocation() {
    let mut wire = Wire::header(true, 4, 0);
    let mut inner = wire.payload();
    // Declares a billion ints but the frame holds no element bytes at all.
    inner.u8(0x23).id(1).u32(0).u32(1_000_000_000).u8(10);
    wire.record(0x1c, &inner);
    let (_, err) = decode_err(&wire);
    assert!(matches!(
        err,
        HprofError::Truncated {
            required: 4_000_000_000,
            available: 0,
        }
    ));
}

#[test]
fn truncated_string_record() {
    let mut wire = Wire::header(true, 4, 0);
    // The record header promises ten payload bytes; only four arrive.
    wire.u8(0x01).u32(0).u32(10);
    wire.raw(&[0, 0, 0, 0x2a]);
    let (events, err) = decode_err(&wire);
    assert_eq!(vec![expect_header(4, 0)], events);
    assert!(matches!(
        err,
        HprofError::Truncated {
            required: 10,
            available: 4,
        }
    ));
}

#[test]
fn truncated_heap_sub_record() {
    let mut wire = Wire::header(true, 4, 0);
    let mut inner = wire.payload();
    // An instance dump cut off inside its fixed fields.
    inner.u8(0x21).id(0x42).u32(0);
    wire.record(0x1c, &inner);
    let (_, err) = decode_err(&wire);
    assert!(matches!(err, HprofError::Truncated { .. }));
}

#[test]
fn visitor_rejection_stops_decoding() {
    struct RejectStrings {
        seen_after: bool,
    }
    impl HprofVisitor for RejectStrings {
        fn visit_string(&mut self, _sid: u64, _text: &str) -> Result<(), HprofError> {
            return Err(HprofError::visitor("string pool entry rejected"));
        }
        fn visit_load_class(
            &mut self,
            _class_serial: u32,
            _class_oid: u64,
            _stack_serial: u32,
            _name_sid: u64,
        ) -> Result<(), HprofError> {
            self.seen_after = true;
            return Ok(());
        }
    }

    let mut wire = Wire::header(true, 4, 0);
    let mut payload = wire.payload();
    payload.id(0x2a).raw(b"no");
    wire.record(0x01, &payload);
    let mut payload = wire.payload();
    payload.u32(1).id(0x10).u32(2).id(0x20);
    wire.record(0x02, &payload);

    let mut decoder = HprofDecoder::builder().build();
    let mut visitor = RejectStrings { seen_after: false };
    let err = decoder.read(wire.channel(), &mut visitor).unwrap_err();
    assert!(matches!(err, HprofError::Visitor(_)));
    // Nothing is visited after the rejection.
    assert!(!visitor.seen_after);
}

#[test]
fn decoder_is_reusable_after_a_stream() {
    let mut wire = Wire::header(true, 4, 7);
    let mut payload = wire.payload();
    payload.id(1).raw(b"again");
    wire.record(0x01, &payload);

    let mut decoder = HprofDecoder::builder().build();
    for _ in 0..2 {
        let mut recorder = Recorder::default();
        decoder.read(wire.channel(), &mut recorder).unwrap();
        assert_eq!(
            vec![expect_header(4, 7), Event::Utf(1, "again".to_owned())],
            recorder.events
        );
    }
}

#[test]
fn record_after_heap_dump_frame() {
    // The frame must hand the channel back exactly drained so the outer
    // loop can keep going.
    let mut wire = Wire::header(true, 4, 0);
    let mut inner = wire.payload();
    inner.u8(0xff).id(0x31);
    wire.record(0x1c, &inner);
    let mut payload = wire.payload();
    payload.id(0x2a).raw(b"after");
    wire.record(0x01, &payload);
    assert_eq!(
        vec![
            expect_header(4, 0),
            Event::RootUnknown(0x31),
            Event::Utf(0x2a, "after".to_owned()),
        ],
        decode(&wire).unwrap()
    );
}
