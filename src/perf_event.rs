use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::{
    counter::Counter,
    device::{Device, Target},
    error::Error,
    Event, PerfDevice,
};

/// Returned by [`PerfEvent::get_counter`] for an unknown counter name.
pub const NOT_FOUND: f64 = -1.0;

/// A set of named counters measured together over one window.
///
/// Counters are opened once, then bracket any number of windows with
/// [`start`] and [`stop`]. If any counter fails to open, every counter is
/// released and the `PerfEvent` is left empty: all operations keep working
/// but report nothing, rather than silently reporting a subset.
///
/// ```no_run
/// use perf_block::PerfEvent;
///
/// let mut perf = PerfEvent::new();
///
/// perf.start();
/// let sum: u64 = (0..1_000_000u64).sum();
/// perf.stop();
///
/// println!("sum={} ipc={:.2} time={:.6}s", sum, perf.ipc(), perf.duration());
/// ```
///
/// All counters are released when the `PerfEvent` is dropped.
///
/// [`start`]: PerfEvent::start
/// [`stop`]: PerfEvent::stop
pub struct PerfEvent<D: Device = PerfDevice> {
    device: D,
    target: Target,
    counters: Vec<Counter<D::Handle>>,
    start_time: Option<Instant>,
    stop_time: Option<Instant>,
    pub(crate) params: BTreeMap<String, String>,
    pub(crate) print_header: bool,
}

impl PerfEvent<PerfDevice> {
    /// Open the [default counters] for the calling process.
    ///
    /// Failure to open is logged and yields an empty `PerfEvent`; use
    /// [`CounterConfig::allocate`] to receive the error instead.
    ///
    /// [default counters]: crate::default_counters
    /// [`CounterConfig::allocate`]: crate::CounterConfig::allocate
    pub fn new() -> Self {
        Self::with_device(PerfDevice::default(), Target::default(), crate::default_counters())
    }
}

impl Default for PerfEvent<PerfDevice> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Device> PerfEvent<D> {
    /// A `PerfEvent` with no counters registered.
    pub fn empty(device: D, target: Target) -> Self {
        PerfEvent {
            device,
            target,
            counters: Vec::new(),
            start_time: None,
            stop_time: None,
            params: BTreeMap::new(),
            print_header: true,
        }
    }

    /// Register every `(name, event)` in `counters` and open them on `device`.
    ///
    /// An open failure is logged and leaves the `PerfEvent` empty.
    pub fn with_device<N: AsRef<str>>(device: D, target: Target, counters: &[(N, Event)]) -> Self {
        let mut perf = Self::empty(device, target);
        for (name, event) in counters {
            perf.register(name.as_ref(), *event);
        }

        // open() has already logged the failing counter
        let _ = perf.open();
        perf
    }

    /// Append a counter.
    ///
    /// Names are not checked for uniqueness; lookups return the first match.
    /// The counter is not opened until the next call to [`open`].
    ///
    /// [`open`]: PerfEvent::open
    pub fn register(&mut self, name: impl Into<String>, event: Event) {
        self.counters.push(Counter::new(name.into(), event));
    }

    /// Open every registered counter that does not hold a handle yet.
    ///
    /// Counters are opened disabled. If any counter fails to open, all
    /// counters (and their names) are released and the error is returned.
    pub fn open(&mut self) -> Result<(), Error> {
        let mut failed = None;

        for counter in &mut self.counters {
            if counter.handle.is_some() {
                continue;
            }

            match self.device.open(counter.name(), counter.event(), &self.target) {
                Ok(handle) => counter.handle = Some(handle),
                Err(e) => {
                    error!("error opening counter {}: {}", counter.name(), e);
                    failed = Some(e);
                    break;
                }
            }
        }

        match failed {
            Some(e) => {
                self.close_all();
                Err(e)
            }
            None => Ok(()),
        }
    }

    /// Start a measurement window.
    ///
    /// Each counter is reset, enabled and read as the window baseline, then
    /// the wall clock is sampled. Failures are logged and the window carries
    /// on; a short read leaves that counter's value undefined for the window.
    pub fn start(&mut self) {
        for counter in &mut self.counters {
            let handle = match counter.handle {
                Some(ref h) => h,
                None => continue,
            };

            if let Err(e) = self.device.reset(handle) {
                warn!("error resetting counter {}: {}", counter.name(), e);
            }
            if let Err(e) = self.device.enable(handle) {
                warn!("error enabling counter {}: {}", counter.name(), e);
            }
            if let Err(e) = self.device.read(handle, &mut counter.baseline) {
                error!("error reading counter {}: {}", counter.name(), e);
            }
        }

        self.start_time = Some(Instant::now());
        debug!("started {} counters", self.counters.len());
    }

    /// End the measurement window.
    ///
    /// The wall clock is sampled first, then each counter is read and
    /// disabled.
    pub fn stop(&mut self) {
        self.stop_time = Some(Instant::now());

        for counter in &mut self.counters {
            let handle = match counter.handle {
                Some(ref h) => h,
                None => continue,
            };

            if let Err(e) = self.device.read(handle, &mut counter.last) {
                error!("error reading counter {}: {}", counter.name(), e);
            }
            if let Err(e) = self.device.disable(handle) {
                warn!("error disabling counter {}: {}", counter.name(), e);
            }
        }
        debug!("stopped {} counters", self.counters.len());
    }

    /// The corrected value of the first counter called `name`.
    pub fn counter(&self, name: &str) -> Option<f64> {
        self.counters
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.value())
    }

    /// Like [`counter`], but returns [`NOT_FOUND`] for an unknown name.
    ///
    /// [`counter`]: PerfEvent::counter
    pub fn get_counter(&self, name: &str) -> f64 {
        self.counter(name).unwrap_or(NOT_FOUND)
    }

    /// `(name, corrected value)` for every counter, in registration order.
    pub fn values(&self) -> Vec<(&str, f64)> {
        self.counters.iter().map(|c| (c.name(), c.value())).collect()
    }

    /// The registered counters, in registration order.
    pub fn counters(&self) -> &[Counter<D::Handle>] {
        &self.counters
    }

    /// Number of registered counters.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// `true` when no counters are registered, including after an open
    /// failure.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Where counters are attached.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The underlying counter device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Wall-clock time between the last [`start`] and [`stop`].
    ///
    /// Zero until a window has been started and stopped.
    ///
    /// [`start`]: PerfEvent::start
    /// [`stop`]: PerfEvent::stop
    pub fn elapsed(&self) -> Duration {
        match (self.start_time, self.stop_time) {
            (Some(start), Some(stop)) => stop.saturating_duration_since(start),
            _ => Duration::from_secs(0),
        }
    }

    /// [`elapsed`](PerfEvent::elapsed) in seconds.
    pub fn duration(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// [`elapsed`](PerfEvent::elapsed) in whole microseconds.
    pub fn duration_micros(&self) -> u128 {
        self.elapsed().as_micros()
    }

    fn close_all(&mut self) {
        for counter in self.counters.drain(..) {
            if let Some(handle) = counter.handle {
                self.device.close(handle);
            }
        }
    }
}

impl<D: Device> Drop for PerfEvent<D> {
    fn drop(&mut self) {
        self.close_all();
    }
}

impl<D: Device> std::fmt::Debug for PerfEvent<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfEvent")
            .field("target", &self.target)
            .field("counters", &self.values())
            .field("elapsed", &self.elapsed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnsupportedDevice;

    #[test]
    fn test_open_failure_is_logged() {
        testing_logger::setup();

        let perf = PerfEvent::with_device(
            UnsupportedDevice,
            Target::default(),
            crate::default_counters(),
        );
        assert!(perf.is_empty());
        assert_eq!(perf.elapsed(), Duration::from_secs(0));

        testing_logger::validate(|logs| {
            assert_eq!(logs.len(), 1);
            assert_eq!(logs[0].level, log::Level::Error);
            assert_eq!(
                logs[0].body,
                "error opening counter cycle: performance counters unsupported"
            );
        });
    }
}
