// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Demonstrates how to use [`HprofDecoder`] to stream the records of a heap
//! dump file.
//!
//! The decoder pushes one callback per record; this sample prints the string
//! pool and class loads as they stream past and tallies everything else, so
//! even multi-gigabyte dumps run in flat memory.

use std::env;
use std::fs;
use std::process;

use hprof_decode::{HprofDecoder, HprofError, HprofVisitor};

fn main() -> process::ExitCode {
    let mut result = process::ExitCode::SUCCESS;

    let mut filenames = Vec::new();
    for arg in env::args().skip(1) {
        if arg.starts_with('-') {
            eprintln!("Unknown option: {}", arg);
            return usage();
        } else {
            filenames.push(arg);
        }
    }

    if filenames.is_empty() {
        eprintln!("No input files specified.");
        return usage();
    }

    let mut decoder = HprofDecoder::builder().build();
    for filename in &filenames {
        println!("Processing: {}", filename);
        match fs::File::open(filename) {
            Err(e) => {
                eprintln!("Error {} opening {}", e, filename);
                result = process::ExitCode::FAILURE;
            }
            Ok(file) => {
                let mut summary = Summary::default();
                if let Err(e) = decoder.read(file, &mut summary) {
                    eprintln!("Error decoding {}: {}", filename, e);
                    result = process::ExitCode::FAILURE;
                }
                summary.print();
            }
        }
    }

    result
}

fn usage() -> process::ExitCode {
    eprintln!("Usage: dump_events <filename1.hprof> [<filename2.hprof> ...]");
    process::ExitCode::FAILURE
}

#[derive(Default)]
struct Summary {
    strings: u64,
    classes: u64,
    traces: u64,
    roots: u64,
    instances: u64,
    instance_bytes: u64,
    arrays: u64,
}

impl Summary {
    fn print(&self) {
        println!(
            "  {} strings, {} classes, {} stack traces, {} roots, {} instances ({} field bytes), {} arrays",
            self.strings,
            self.classes,
            self.traces,
            self.roots,
            self.instances,
            self.instance_bytes,
            self.arrays,
        );
    }
}

impl HprofVisitor for Summary {
    fn visit_header(&mut self, header: &str, id_size: u32, ts: u64) -> Result<(), HprofError> {
        println!("- {} (id size {}, timestamp {})", header, id_size, ts);
        Ok(())
    }

    fn visit_string(&mut self, sid: u64, text: &str) -> Result<(), HprofError> {
        println!("  string {:#x} = {:?}", sid, text);
        self.strings += 1;
        Ok(())
    }

    fn visit_load_class(
        &mut self,
        _class_serial: u32,
        class_oid: u64,
        _stack_serial: u32,
        name_sid: u64,
    ) -> Result<(), HprofError> {
        println!("  class {:#x} (name string {:#x})", class_oid, name_sid);
        self.classes += 1;
        Ok(())
    }

    fn visit_stack_trace(
        &mut self,
        _stack_serial: u32,
        _thread_serial: u32,
        _frames: &[u64],
    ) -> Result<(), HprofError> {
        self.traces += 1;
        Ok(())
    }

    fn visit_root_unknown(&mut self, _oid: u64) -> Result<(), HprofError> {
        self.roots += 1;
        Ok(())
    }

    fn visit_root_jni_global(&mut self, _oid: u64, _jni_global_ref: u64) -> Result<(), HprofError> {
        self.roots += 1;
        Ok(())
    }

    fn visit_root_jni_local(
        &mut self,
        _oid: u64,
        _thread_serial: u32,
        _frame_no: u32,
    ) -> Result<(), HprofError> {
        self.roots += 1;
        Ok(())
    }

    fn visit_root_java_frame(
        &mut self,
        _oid: u64,
        _thread_serial: u32,
        _frame_no: u32,
    ) -> Result<(), HprofError> {
        self.roots += 1;
        Ok(())
    }

    fn visit_root_native_stack(&mut self, _oid: u64, _thread_serial: u32) -> Result<(), HprofError> {
        self.roots += 1;
        Ok(())
    }

    fn visit_root_sticky_class(&mut self, _oid: u64) -> Result<(), HprofError> {
        self.roots += 1;
        Ok(())
    }

    fn visit_root_thread_block(&mut self, _oid: u64, _thread_serial: u32) -> Result<(), HprofError> {
        self.roots += 1;
        Ok(())
    }

    fn visit_root_monitor_used(&mut self, _oid: u64) -> Result<(), HprofError> {
        self.roots += 1;
        Ok(())
    }

    fn visit_root_thread_object(
        &mut self,
        _oid: u64,
        _thread_serial: u32,
        _stack_serial: u32,
    ) -> Result<(), HprofError> {
        self.roots += 1;
        Ok(())
    }

    fn visit_instance(
        &mut self,
        _oid: u64,
        _stack_serial: u32,
        _class_oid: u64,
        fields: &[u8],
    ) -> Result<(), HprofError> {
        self.instances += 1;
        self.instance_bytes += fields.len() as u64;
        Ok(())
    }

    fn visit_object_array(
        &mut self,
        _oid: u64,
        _stack_serial: u32,
        _class_oid: u64,
        _elements: &[u64],
    ) -> Result<(), HprofError> {
        self.arrays += 1;
        Ok(())
    }

    fn visit_boolean_array(
        &mut self,
        _oid: u64,
        _stack_serial: u32,
        _elements: &[bool],
    ) -> Result<(), HprofError> {
        self.arrays += 1;
        Ok(())
    }

    fn visit_char_array(
        &mut self,
        _oid: u64,
        _stack_serial: u32,
        _elements: &[u16],
    ) -> Result<(), HprofError> {
        self.arrays += 1;
        Ok(())
    }

    fn visit_float_array(
        &mut self,
        _oid: u64,
        _stack_serial: u32,
        _elements: &[f32],
    ) -> Result<(), HprofError> {
        self.arrays += 1;
        Ok(())
    }

    fn visit_double_array(
        &mut self,
        _oid: u64,
        _stack_serial: u32,
        _elements: &[f64],
    ) -> Result<(), HprofError> {
        self.arrays += 1;
        Ok(())
    }

    fn visit_byte_array(
        &mut self,
        _oid: u64,
        _stack_serial: u32,
        _elements: &[i8],
    ) -> Result<(), HprofError> {
        self.arrays += 1;
        Ok(())
    }

    fn visit_short_array(
        &mut self,
        _oid: u64,
        _stack_serial: u32,
        _elements: &[i16],
    ) -> Result<(), HprofError> {
        self.arrays += 1;
        Ok(())
    }

    fn visit_int_array(
        &mut self,
        _oid: u64,
        _stack_serial: u32,
        _elements: &[i32],
    ) -> Result<(), HprofError> {
        self.arrays += 1;
        Ok(())
    }

    fn visit_long_array(
        &mut self,
        _oid: u64,
        _stack_serial: u32,
        _elements: &[i64],
    ) -> Result<(), HprofError> {
        self.arrays += 1;
        Ok(())
    }
}
