// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::error::HprofError;

/// Receives one callback per binary record or section in a heap dump stream.
///
/// The decoder calls these strictly in order of record occurrence: within a
/// class dump, constants precede statics which precede instance field
/// declarations; array elements arrive whole and in index order. Exactly one
/// callback is made per logical record, and none after an error.
///
/// Every method has a no-op default, so a visitor implements only the events
/// it cares about. Any method may reject the stream by returning an error
/// (use [`HprofError::visitor`] to wrap an application error); the rejection
/// aborts decoding and propagates out of
/// [`HprofDecoder::read`](crate::HprofDecoder::read) unchanged.
///
/// Borrowing: every slice handed to a callback (`&str` string text, `&[u64]`
/// frame and element ids, typed primitive element slices, and the `&[u8]`
/// packed instance bytes) is only valid for the duration of the call. The
/// instance bytes in particular alias a buffer the decoder reuses for the
/// next instance; copy out anything that must be kept.
#[allow(unused_variables)]
pub trait HprofVisitor {
    /// The stream header.
    ///
    /// `header` is the format banner (e.g. `"JAVA PROFILE 1.0.2"`),
    /// `id_size` the declared identifier width in bytes (4 or 8), and
    /// `timestamp` the dump's wall-clock milliseconds.
    fn visit_header(&mut self, header: &str, id_size: u32, timestamp: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// An entry of the string pool. `sid` is referenced by later records'
    /// `*_sid` fields.
    fn visit_string(&mut self, sid: u64, text: &str) -> Result<(), HprofError> {
        return Ok(());
    }

    /// A class load. `name_sid` refers to the string pool.
    fn visit_load_class(
        &mut self,
        class_serial: u32,
        class_oid: u64,
        stack_serial: u32,
        name_sid: u64,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// A stack frame referred to from stack traces. A `line_no` of −1 means
    /// the line is unknown.
    fn visit_stack_frame(
        &mut self,
        frame_id: u64,
        method_name_sid: u64,
        method_sig_sid: u64,
        source_sid: u64,
        class_serial: u32,
        line_no: i32,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// A stack trace; `frames` holds the frame ids in call order.
    fn visit_stack_trace(
        &mut self,
        stack_serial: u32,
        thread_serial: u32,
        frames: &[u64],
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Object pinned to GC roots for an unknown reason.
    fn visit_root_unknown(&mut self, oid: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Object pinned to GC roots as a JNI global.
    fn visit_root_jni_global(&mut self, oid: u64, jni_global_ref: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Object pinned to GC roots as a JNI local.
    fn visit_root_jni_local(
        &mut self,
        oid: u64,
        thread_serial: u32,
        frame_no: u32,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Object pinned to GC roots in a Java stack frame.
    fn visit_root_java_frame(
        &mut self,
        oid: u64,
        thread_serial: u32,
        frame_no: u32,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Object pinned to GC roots from a native stack frame.
    fn visit_root_native_stack(&mut self, oid: u64, thread_serial: u32) -> Result<(), HprofError> {
        return Ok(());
    }

    /// System class pinned to GC roots.
    fn visit_root_sticky_class(&mut self, oid: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Object pinned to GC roots by a thread block.
    fn visit_root_thread_block(&mut self, oid: u64, thread_serial: u32) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Object used as a monitor for synchronization, pinned to GC roots.
    fn visit_root_monitor_used(&mut self, oid: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// A running thread object itself, pinned to GC roots.
    fn visit_root_thread_object(
        &mut self,
        oid: u64,
        thread_serial: u32,
        stack_serial: u32,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Fixed-layout head of a class dump. The constant, static, and instance
    /// field sections follow as separate callbacks against the same
    /// `class_oid`.
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
        return Ok(());
    }

    /// Constant pool entry holding an object reference.
    fn visit_class_constant_object(
        &mut self,
        class_oid: u64,
        index: u16,
        oid: u64,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Constant pool entry holding a boolean.
    fn visit_class_constant_boolean(
        &mut self,
        class_oid: u64,
        index: u16,
        value: bool,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Constant pool entry holding a UTF-16 code unit.
    fn visit_class_constant_char(
        &mut self,
        class_oid: u64,
        index: u16,
        value: u16,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Constant pool entry holding a float.
    fn visit_class_constant_float(
        &mut self,
        class_oid: u64,
        index: u16,
        value: f32,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Constant pool entry holding a double.
    fn visit_class_constant_double(
        &mut self,
        class_oid: u64,
        index: u16,
        value: f64,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Constant pool entry holding a byte.
    fn visit_class_constant_byte(
        &mut self,
        class_oid: u64,
        index: u16,
        value: i8,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Constant pool entry holding a short.
    fn visit_class_constant_short(
        &mut self,
        class_oid: u64,
        index: u16,
        value: i16,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Constant pool entry holding an int.
    fn visit_class_constant_int(
        &mut self,
        class_oid: u64,
        index: u16,
        value: i32,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Constant pool entry holding a long.
    fn visit_class_constant_long(
        &mut self,
        class_oid: u64,
        index: u16,
        value: i64,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Static field holding an object reference; `name_sid` refers to the
    /// string pool.
    fn visit_class_static_object(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        oid: u64,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Static field holding a boolean.
    fn visit_class_static_boolean(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: bool,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Static field holding a UTF-16 code unit.
    fn visit_class_static_char(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: u16,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Static field holding a float.
    fn visit_class_static_float(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: f32,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Static field holding a double.
    fn visit_class_static_double(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: f64,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Static field holding a byte.
    fn visit_class_static_byte(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: i8,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Static field holding a short.
    fn visit_class_static_short(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: i16,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Static field holding an int.
    fn visit_class_static_int(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: i32,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Static field holding a long.
    fn visit_class_static_long(
        &mut self,
        class_oid: u64,
        name_sid: u64,
        value: i64,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Declaration of an object-typed instance field. Values are packed into
    /// the instance bytes of [`HprofVisitor::visit_instance`].
    fn visit_class_field_object(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Declaration of a boolean instance field.
    fn visit_class_field_boolean(
        &mut self,
        class_oid: u64,
        name_sid: u64,
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Declaration of a char instance field.
    fn visit_class_field_char(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Declaration of a float instance field.
    fn visit_class_field_float(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Declaration of a double instance field.
    fn visit_class_field_double(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Declaration of a byte instance field.
    fn visit_class_field_byte(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Declaration of a short instance field.
    fn visit_class_field_short(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Declaration of an int instance field.
    fn visit_class_field_int(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// Declaration of a long instance field.
    fn visit_class_field_long(&mut self, class_oid: u64, name_sid: u64) -> Result<(), HprofError> {
        return Ok(());
    }

    /// An object instance. `fields` holds the packed instance field bytes;
    /// the slice aliases a decoder-owned buffer and is invalidated when the
    /// callback returns.
    fn visit_instance(
        &mut self,
        oid: u64,
        stack_serial: u32,
        class_oid: u64,
        fields: &[u8],
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// An array of object references.
    fn visit_object_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        class_oid: u64,
        elements: &[u64],
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// A boolean array.
    fn visit_boolean_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[bool],
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// A char array of UTF-16 code units.
    fn visit_char_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[u16],
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// A float array.
    fn visit_float_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[f32],
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// A double array.
    fn visit_double_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[f64],
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// A byte array.
    fn visit_byte_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[i8],
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// A short array.
    fn visit_short_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[i16],
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// An int array.
    fn visit_int_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[i32],
    ) -> Result<(), HprofError> {
        return Ok(());
    }

    /// A long array.
    fn visit_long_array(
        &mut self,
        oid: u64,
        stack_serial: u32,
        elements: &[i64],
    ) -> Result<(), HprofError> {
        return Ok(());
    }
}
