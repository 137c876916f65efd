// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![warn(missing_docs)]
#![allow(clippy::needless_return)]

//! Streaming decoder for JVM binary heap dump (hprof) streams.
//!
//! The decoder makes one pass over a byte channel containing a `"JAVA
//! PROFILE 1.0.x"` heap dump and invokes an [`HprofVisitor`] callback per
//! decoded record: string pool entries, class loads, stack frames and
//! traces, GC roots, class dumps, object instances, and arrays. The heap is
//! never materialised; internal buffers are reused and bounded by
//! configurable ceilings, so memory stays flat regardless of dump size.
//!
//! Decoding is fail-fast: the first malformed byte, truncation, buffer
//! overrun, or visitor rejection aborts the session with an [`HprofError`].
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use hprof_decode::{HprofDecoder, HprofError, HprofVisitor};
//!
//! struct CountStrings(u64);
//!
//! impl HprofVisitor for CountStrings {
//!     fn visit_string(&mut self, _sid: u64, _text: &str) -> Result<(), HprofError> {
//!         self.0 += 1;
//!         return Ok(());
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("heap.hprof")?;
//! let mut visitor = CountStrings(0);
//! HprofDecoder::builder().build().read(file, &mut visitor)?;
//! println!("{} string pool entries", visitor.0);
//! # Ok(())
//! # }
//! ```

pub use byte_reader::HprofByteReader;
pub use byte_reader::IdSize;
pub use channels::FrameReader;
pub use channels::PrependReader;
pub use decoder::HprofDecoder;
pub use decoder::HprofDecoderBuilder;
pub use error::HprofError;
pub use visitor::HprofVisitor;

pub mod changelog;

mod byte_reader;
mod channels;
mod data_stream;
mod decoder;
mod error;
mod records;
mod scratch;
mod visitor;
