// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Hardware sleep quanta and decomposition of durations into quanta

use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use core::iter::FusedIterator;

use crate::Error;

/// Timeouts supported by the AVR watchdog timer, in milliseconds
const WATCHDOG_STEPS: &[u32] = &[8000, 4000, 2000, 1000, 500, 250, 120, 60, 30, 15];

/// A single hardware sleep cycle
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Quantum {
    /// Sleep for the given number of milliseconds
    Timed(u32),

    /// Sleep until an interrupt, with no deadline
    Indefinite,
}

impl Display for Quantum {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match *self {
            Self::Timed(ms) => write!(f, "{ms}ms"),
            Self::Indefinite => write!(f, "indefinitely"),
        }
    }
}

/// A table of sleep durations supported by the hardware
///
/// Durations are in milliseconds, strictly descending and non-zero. The
/// table is fixed for a given hardware and never changes at runtime.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QuantumTable {
    /// Supported durations, largest first
    steps: &'static [u32],
}

impl QuantumTable {
    /// The timeouts of the AVR watchdog timer, from 8 s down to 15 ms
    pub const WATCHDOG: Self = Self {
        steps: WATCHDOG_STEPS,
    };

    /// Create a new table from a list of durations in milliseconds
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, contains a zero or is not
    /// strictly descending.
    pub fn new(steps: &'static [u32]) -> Result<Self, Error> {
        if steps.is_empty() {
            return Err(Error::EmptyTable);
        }

        if steps.contains(&0) {
            return Err(Error::ZeroQuantum);
        }

        if let Some(index) = steps
            .windows(2)
            .position(|pair| matches!(*pair, [previous, next] if next >= previous))
        {
            return Err(Error::NotDescending { index: index + 1 });
        }

        Ok(Self { steps })
    }

    /// Return the supported durations, largest first
    #[must_use]
    pub fn steps(&self) -> &'static [u32] {
        self.steps
    }

    /// Return the longest supported duration
    #[must_use]
    pub fn largest(&self) -> u32 {
        self.steps.first().copied().unwrap_or_default()
    }

    /// Return the shortest supported duration
    #[must_use]
    pub fn smallest(&self) -> u32 {
        self.steps.last().copied().unwrap_or_default()
    }

    /// Split a duration in milliseconds into supported quanta
    ///
    /// Quanta are picked greedily, largest first, and a duration can be
    /// picked again as long as the remainder still covers it. A remainder
    /// shorter than [`smallest()`](Self::smallest) is dropped.
    #[must_use]
    pub fn decompose(&self, ms: u32) -> Decomposition {
        Decomposition {
            steps: self.steps,
            remainder: ms,
        }
    }
}

impl Default for QuantumTable {
    fn default() -> Self {
        Self::WATCHDOG
    }
}

/// An iterator over the quanta covering a duration
///
/// Created by [`QuantumTable::decompose()`].
#[derive(Clone, Debug)]
pub struct Decomposition {
    /// Durations not yet excluded, largest first
    steps: &'static [u32],

    /// Milliseconds not yet covered
    remainder: u32,
}

impl Decomposition {
    /// Return the milliseconds not covered by the quanta yielded so far
    #[must_use]
    pub fn remainder(&self) -> u32 {
        self.remainder
    }
}

impl Iterator for Decomposition {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((&step, rest)) = self.steps.split_first() {
            if self.remainder >= step {
                self.remainder -= step;
                return Some(step);
            }
            self.steps = rest;
        }
        None
    }
}

impl FusedIterator for Decomposition {}
