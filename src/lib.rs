#![warn(missing_docs)]

//! `perf-block` measures a region of code with the CPU's hardware
//! performance counters on [`Linux`].
//!
//! A [`PerfEvent`] opens a small set of named counters (cycles, kernel
//! cycles, instructions, L1/LLC misses, branch misses and the task clock by
//! default) through `perf_event_open(2)`, then brackets any number of
//! measurement windows with [`start`] and [`stop`]. After a window, each
//! counter's value is available by name, along with the derived IPC, average
//! CPUs used and effective GHz.
//!
//! When the kernel has more counters enabled than the PMU has slots, it
//! time-shares them. Every value is scaled by the ratio of the time the
//! counter was enabled to the time it actually ran, estimating the count as if
//! it had run for the whole window.
//!
//! ```no_run
//! use perf_block::{PerfEvent, PerfEventBlock};
//!
//! let mut perf = PerfEvent::new();
//! let n = 10_000;
//!
//! perf.set_param("name", "sum");
//! {
//!     let _block = PerfEventBlock::new(&mut perf, n);
//!     let s: u64 = (0..n).sum();
//!     assert!(s > 0);
//! } // prints the report row for the block
//! ```
//!
//! Opening counters usually requires `perf_event_paranoid` to be at most 2, or
//! the `CAP_PERFMON` capability. If any counter cannot be opened none are kept,
//! and every operation becomes a no-op. Diagnostics go through the [`log`]
//! crate.
//!
//! [`Linux`]: https://man7.org/linux/man-pages/man2/perf_event_open.2.html
//! [`start`]: PerfEvent::start
//! [`stop`]: PerfEvent::stop
//! [`log`]: https://docs.rs/log

pub mod error;

mod event;
pub use self::event::{default_counters, Event, EventKind};

mod counter;
pub use self::counter::{corrected_delta, Counter, Snapshot};

mod device;
pub use self::device::{Device, Target};

#[cfg(target_os = "linux")]
mod sys;
#[cfg(target_os = "linux")]
pub use self::sys::PerfDevice;

mod stubs;
pub use self::stubs::UnsupportedDevice;

/// The counter device of the host platform.
#[cfg(not(target_os = "linux"))]
pub type PerfDevice = UnsupportedDevice;

mod perf_event;
pub use self::perf_event::{PerfEvent, NOT_FOUND};

pub mod metrics;

mod config;
pub use self::config::CounterConfig;

mod report;
pub use self::report::{Cell, Report};

mod block;
pub use self::block::PerfEventBlock;
