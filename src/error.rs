// Copyright 2016-2025 Andrew D. Straw.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use thiserror::Error;

/// Programming errors detected by the checked entry points.
///
/// Per the crate's error taxonomy, geometric rejection and numerical
/// degeneracy are both expected outcomes and are reported through
/// [`crate::TriangulationResult::accepted`], not through this type. A
/// `TriangulateError` means the *caller* violated a precondition (mismatched
/// slice lengths, too few views), not that the scene geometry was bad.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TriangulateError {
    #[error("need at least 2 views, got {0}")]
    NotEnoughViews(usize),
    #[error("mismatched input lengths: {a_name} has {a_len}, {b_name} has {b_len}")]
    LengthMismatch {
        a_name: &'static str,
        a_len: usize,
        b_name: &'static str,
        b_len: usize,
    },
}

pub type Result<T> = std::result::Result<T, TriangulateError>;
