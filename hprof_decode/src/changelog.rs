// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Release history

#[allow(unused_imports)]
use crate::*; // For docs

/// # v0.1.0 (TBD)
/// - Create hprof_decode crate: streaming visitor-based decoder for JVM
///   binary heap dumps with bounded buffer reuse.
pub mod v0_1_0 {}
