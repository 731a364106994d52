use std::convert::TryInto;
use std::mem;

use crate::Event;

/// Size in bytes of one kernel counter read.
pub(crate) const SNAPSHOT_SIZE: usize = 3 * mem::size_of::<u64>();

/// A single counter read: the raw value and the time the counter was enabled
/// and actually running on a hardware slot, in nanoseconds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Raw counter value.
    pub value: u64,
    /// Nanoseconds the counter has been enabled.
    pub time_enabled: u64,
    /// Nanoseconds the counter has been scheduled on the PMU.
    pub time_running: u64,
}

impl Snapshot {
    /// A snapshot from its three fields.
    pub fn new(value: u64, time_enabled: u64, time_running: u64) -> Self {
        Snapshot {
            value,
            time_enabled,
            time_running,
        }
    }

    /// Decode the native-endian words in `buf` over this snapshot.
    ///
    /// Fields past the end of a short buffer keep their previous values.
    pub(crate) fn fill_from(&mut self, buf: &[u8]) {
        let mut fields = [
            &mut self.value,
            &mut self.time_enabled,
            &mut self.time_running,
        ];
        for (field, word) in fields.iter_mut().zip(buf.chunks_exact(8)) {
            // chunks_exact always yields 8 bytes
            **field = u64::from_ne_bytes(word.try_into().unwrap_or([0; 8]));
        }
    }
}

/// Scale the change between two snapshots by `enabled / running`.
///
/// When the kernel multiplexes more counters than the PMU has slots, a
/// counter only runs for part of the window it is enabled for; the scaled
/// delta estimates the count over the whole window. Without multiplexing the
/// factor is exactly 1.
///
/// A zero running delta divides by zero and yields `inf` or `NaN`.
pub fn corrected_delta(baseline: &Snapshot, last: &Snapshot) -> f64 {
    let enabled = last.time_enabled.wrapping_sub(baseline.time_enabled);
    let running = last.time_running.wrapping_sub(baseline.time_running);
    let correction = enabled as f64 / running as f64;

    last.value.wrapping_sub(baseline.value) as f64 * correction
}

/// A registered counter and the snapshots bracketing the last window.
#[derive(Debug)]
pub struct Counter<H> {
    name: String,
    event: Event,
    pub(crate) handle: Option<H>,
    pub(crate) baseline: Snapshot,
    pub(crate) last: Snapshot,
}

impl<H> Counter<H> {
    pub(crate) fn new(name: String, event: Event) -> Self {
        Counter {
            name,
            event,
            handle: None,
            baseline: Snapshot::default(),
            last: Snapshot::default(),
        }
    }

    /// The name the counter was registered with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event being counted.
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Whether the counter holds an open kernel handle.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// The snapshot taken when the last window started.
    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    /// The snapshot taken when the last window stopped.
    pub fn last(&self) -> &Snapshot {
        &self.last
    }

    /// The multiplexing-corrected count for the last window.
    ///
    /// Computed on every call; see [`corrected_delta`].
    pub fn value(&self) -> f64 {
        corrected_delta(&self.baseline, &self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_multiplexing_is_raw_delta() {
        let baseline = Snapshot::new(100, 1_000, 1_000);
        let last = Snapshot::new(1_100, 9_000, 9_000);
        assert_eq!(corrected_delta(&baseline, &last), 1_000.0);
    }

    #[test]
    fn test_multiplexed_delta_is_scaled() {
        // Running for a quarter of the enabled window
        let baseline = Snapshot::new(0, 0, 0);
        let last = Snapshot::new(250, 4_000, 1_000);
        assert_eq!(corrected_delta(&baseline, &last), 1_000.0);

        let baseline = Snapshot::new(10, 100, 50);
        let last = Snapshot::new(310, 400, 250);
        assert_eq!(corrected_delta(&baseline, &last), 300.0 * (300.0 / 200.0));
    }

    #[test]
    fn test_zero_running_time() {
        let s = Snapshot::new(5, 10, 10);
        assert!(corrected_delta(&s, &s).is_nan());

        let last = Snapshot::new(5, 20, 10);
        let v = corrected_delta(&s, &last);
        assert!(v.is_nan(), "0 * inf is NaN, got {}", v);

        let last = Snapshot::new(6, 20, 10);
        assert_eq!(corrected_delta(&s, &last), f64::INFINITY);
    }

    #[test]
    fn test_fill_from_full() {
        let mut buf = Vec::new();
        for w in &[7u64, 8, 9] {
            buf.extend_from_slice(&w.to_ne_bytes());
        }

        let mut s = Snapshot::default();
        s.fill_from(&buf);
        assert_eq!(s, Snapshot::new(7, 8, 9));
    }

    #[test]
    fn test_fill_from_short_keeps_stale_fields() {
        let mut s = Snapshot::new(1, 2, 3);
        let mut buf = 42u64.to_ne_bytes().to_vec();
        buf.extend_from_slice(&[0xff; 4]);

        s.fill_from(&buf);
        assert_eq!(s, Snapshot::new(42, 2, 3));
    }

    #[test]
    fn test_unopened_counter_value() {
        let c: Counter<()> = Counter::new("cycle".to_string(), Event::hardware(0));
        assert!(!c.is_open());
        assert!(c.value().is_nan());
    }
}
