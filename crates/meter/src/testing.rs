use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::PathBuf;

use jetpower_platform::{PowerSource, ReadError};

/// Power source replaying a fixed script of readings.
pub(crate) struct ScriptedSource {
    script: RefCell<VecDeque<f64>>,
    then: Option<f64>,
    reads: Cell<usize>,
}

impl ScriptedSource {
    pub(crate) fn constant(power_mw: f64) -> Self {
        Self {
            script: RefCell::new(VecDeque::new()),
            then: Some(power_mw),
            reads: Cell::new(0),
        }
    }

    /// Replays `readings`, then fails every later read.
    pub(crate) fn sequence(readings: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script: RefCell::new(readings.into_iter().collect()),
            then: None,
            reads: Cell::new(0),
        }
    }

    /// Replays `readings`, then returns `then_mw` forever.
    pub(crate) fn sequence_then(readings: impl IntoIterator<Item = f64>, then_mw: f64) -> Self {
        Self {
            then: Some(then_mw),
            ..Self::sequence(readings)
        }
    }

    /// Returns `power_mw` for `ok_reads` reads, then fails.
    pub(crate) fn failing_after(power_mw: f64, ok_reads: usize) -> Self {
        Self::sequence(std::iter::repeat(power_mw).take(ok_reads))
    }

    /// Read attempts so far, including failed ones.
    pub(crate) fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl PowerSource for ScriptedSource {
    fn instant_power_mw(&self) -> Result<f64, ReadError> {
        self.reads.set(self.reads.get() + 1);
        match self.script.borrow_mut().pop_front().or(self.then) {
            Some(power_mw) => Ok(power_mw),
            None => Err(ReadError::Empty {
                path: PathBuf::from("scripted/in_power0_input"),
            }),
        }
    }

    fn channel_count(&self) -> usize {
        1
    }
}
