//! Metrics derived from several counters.
//!
//! None of these check their inputs: a zero denominator gives `inf` or `NaN`,
//! and a missing counter contributes [`NOT_FOUND`] to the arithmetic.
//!
//! [`NOT_FOUND`]: crate::NOT_FOUND

use crate::{device::Device, PerfEvent};

/// Instructions retired per cycle.
pub fn ipc(instructions: f64, cycles: f64) -> f64 {
    instructions / cycles
}

/// Average number of CPUs busy over the window.
///
/// `task_clock_ns` is the task clock in nanoseconds, `seconds` the wall-clock
/// duration.
pub fn cpus(task_clock_ns: f64, seconds: f64) -> f64 {
    task_clock_ns / (seconds * 1e9)
}

/// Effective clock rate in GHz: cycles per nanosecond of task clock.
pub fn ghz(cycles: f64, task_clock_ns: f64) -> f64 {
    cycles / task_clock_ns
}

impl<D: Device> PerfEvent<D> {
    /// `instr / cycle`.
    pub fn ipc(&self) -> f64 {
        ipc(self.get_counter("instr"), self.get_counter("cycle"))
    }

    /// `task / (duration * 1e9)`.
    pub fn cpus(&self) -> f64 {
        cpus(self.get_counter("task"), self.duration())
    }

    /// `cycle / task`.
    pub fn ghz(&self) -> f64 {
        ghz(self.get_counter("cycle"), self.get_counter("task"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipc() {
        assert_eq!(ipc(1000.0, 500.0), 2.0);
        assert!(ipc(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_ghz() {
        assert_eq!(ghz(3_000_000_000.0, 1_000_000_000.0), 3.0);
    }

    #[test]
    fn test_cpus() {
        // Four CPUs busy for half a second
        assert_eq!(cpus(2e9, 0.5), 4.0);
        assert_eq!(cpus(1.0, 0.0), f64::INFINITY);
    }
}
