use std::io::{self, Write};

use log::warn;

use crate::{device::Device, report::Report, PerfDevice, PerfEvent};

/// Measures the lexical scope it lives in.
///
/// Counters start when the block is created. Dropping the block (or calling
/// [`stop`]) stops them and prints one report row: the parameters, the
/// wall-clock `time` in seconds and `time_us` in microseconds, then every
/// counter divided by `scale` and the derived metrics. The header row is only
/// printed by the first block of each [`PerfEvent`].
///
/// ```no_run
/// use perf_block::{PerfEvent, PerfEventBlock};
///
/// let mut perf = PerfEvent::new();
/// let n = 1_000_000;
///
/// for threads in [1, 2].iter() {
///     perf.set_param("threads", threads);
///     let _block = PerfEventBlock::new(&mut perf, n);
///     // ... run n operations ...
/// }
/// ```
///
/// [`stop`]: PerfEventBlock::stop
#[must_use = "counters stop as soon as the block is dropped"]
pub struct PerfEventBlock<'a, D: Device = PerfDevice, W: Write = io::Stdout> {
    perf: &'a mut PerfEvent<D>,
    scale: u64,
    out: W,
}

impl<'a, D: Device> PerfEventBlock<'a, D, io::Stdout> {
    /// Start `perf` and report to stdout when dropped.
    pub fn new(perf: &'a mut PerfEvent<D>, scale: u64) -> Self {
        Self::with_writer(perf, scale, io::stdout())
    }
}

impl<'a, D: Device, W: Write> PerfEventBlock<'a, D, W> {
    /// Start `perf` and report to `out` when dropped.
    pub fn with_writer(perf: &'a mut PerfEvent<D>, scale: u64, out: W) -> Self {
        perf.start();
        PerfEventBlock { perf, scale, out }
    }

    /// The divisor applied to every counter in the report.
    pub fn scale(&self) -> u64 {
        self.scale
    }

    /// Stop the counters and print the report.
    pub fn stop(self) {
        drop(self)
    }

    fn print(&mut self) -> io::Result<()> {
        let mut report = Report::default();
        self.perf.report_params(&mut report);
        report.push("time", &self.perf.duration());
        report.push("time_us", &self.perf.duration_micros());
        self.perf.report_into(&mut report, self.scale);

        if self.perf.print_header {
            writeln!(self.out, "{}", report.header())?;
            self.perf.print_header = false;
        }
        writeln!(self.out, "{}", report.data())?;
        self.out.flush()
    }
}

impl<'a, D: Device, W: Write> Drop for PerfEventBlock<'a, D, W> {
    fn drop(&mut self) {
        self.perf.stop();
        if let Err(e) = self.print() {
            warn!("error writing counter report: {}", e);
        }
    }
}
