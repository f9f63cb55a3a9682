// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Data structures and functions for error handling

/// An error
///
/// Sleeping itself never fails, every outcome is a
/// [`WakeReason`](crate::WakeReason). Errors can only arise when describing
/// the hardware.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// A quantum table has no entries
    EmptyTable,

    /// A quantum table contains a zero-length quantum
    ZeroQuantum,

    /// A quantum table is not strictly descending
    NotDescending {
        /// Position of the first entry not smaller than its predecessor
        index: usize,
    },
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::EmptyTable => write!(f, "quantum table is empty"),
            Self::ZeroQuantum => write!(f, "quantum table contains a zero quantum"),
            Self::NotDescending { index } => {
                write!(f, "quantum table is not strictly descending at index {index}")
            }
        }
    }
}
