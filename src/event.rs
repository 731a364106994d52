#[cfg(target_os = "linux")]
use perf_event_open_sys::bindings as abi;

#[cfg(not(target_os = "linux"))]
use crate::stubs::abi;

use lazy_static::lazy_static;

/// `EventKind` selects the kernel event domain a counter's code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Generic hardware events (cycles, instructions, ...) the kernel maps to
    /// whatever the CPU provides.
    Hardware,

    /// CPU-specific raw event codes, passed through to the PMU unchanged.
    Raw,

    /// Cache events encoded as `cache | op << 8 | result << 16`.
    ///
    /// See [`Event::cache`].
    HardwareCache,

    /// Kernel software events such as the task clock.
    Software,
}

impl EventKind {
    /// The `perf_event_attr.type` value for this domain.
    pub(crate) fn type_id(self) -> u32 {
        match self {
            EventKind::Hardware => abi::PERF_TYPE_HARDWARE as u32,
            EventKind::Raw => abi::PERF_TYPE_RAW as u32,
            EventKind::HardwareCache => abi::PERF_TYPE_HW_CACHE as u32,
            EventKind::Software => abi::PERF_TYPE_SOFTWARE as u32,
        }
    }
}

/// Describes which event a counter measures.
///
/// ```
/// use perf_block::{Event, EventKind};
///
/// let kcycles = Event::hardware(0).exclude_user();
/// assert_eq!(kcycles.kind(), EventKind::Hardware);
/// assert!(kcycles.excludes_user());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    kind: EventKind,
    config: u64,
    exclude_user: bool,
}

impl Event {
    /// An event of `kind` with the domain-specific `config` code.
    pub const fn new(kind: EventKind, config: u64) -> Self {
        Event {
            kind,
            config,
            exclude_user: false,
        }
    }

    /// A generic hardware event, e.g. `PERF_COUNT_HW_CPU_CYCLES`.
    pub const fn hardware(config: u64) -> Self {
        Self::new(EventKind::Hardware, config)
    }

    /// A CPU-specific raw event code.
    pub const fn raw(config: u64) -> Self {
        Self::new(EventKind::Raw, config)
    }

    /// A kernel software event, e.g. `PERF_COUNT_SW_TASK_CLOCK`.
    pub const fn software(config: u64) -> Self {
        Self::new(EventKind::Software, config)
    }

    /// A hardware-cache event for the given cache, operation and result ids.
    pub const fn cache(cache: u64, op: u64, result: u64) -> Self {
        Self::new(EventKind::HardwareCache, cache | (op << 8) | (result << 16))
    }

    /// Only count events while the CPU is not in user mode.
    ///
    /// Kernel and hypervisor samples are always included.
    pub const fn exclude_user(self) -> Self {
        Event {
            exclude_user: true,
            ..self
        }
    }

    /// The event domain.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The domain-specific event code.
    pub fn config(&self) -> u64 {
        self.config
    }

    /// Whether user-mode events are left out of the count.
    pub fn excludes_user(&self) -> bool {
        self.exclude_user
    }
}

lazy_static! {
    static ref DEFAULT_COUNTERS: Vec<(&'static str, Event)> = vec![
        ("cycle", Event::hardware(abi::PERF_COUNT_HW_CPU_CYCLES as u64)),
        (
            "kcycle",
            Event::hardware(abi::PERF_COUNT_HW_CPU_CYCLES as u64).exclude_user()
        ),
        ("scycle", Event::raw(0x43FFAE)),
        ("instr", Event::hardware(abi::PERF_COUNT_HW_INSTRUCTIONS as u64)),
        (
            "L1-miss",
            Event::cache(
                abi::PERF_COUNT_HW_CACHE_L1D as u64,
                abi::PERF_COUNT_HW_CACHE_OP_READ as u64,
                abi::PERF_COUNT_HW_CACHE_RESULT_MISS as u64,
            )
        ),
        ("LLC-miss", Event::hardware(abi::PERF_COUNT_HW_CACHE_MISSES as u64)),
        ("br-miss", Event::hardware(abi::PERF_COUNT_HW_BRANCH_MISSES as u64)),
        ("task", Event::software(abi::PERF_COUNT_SW_TASK_CLOCK as u64)),
    ];
}

/// The counter set every [`PerfEvent`] registers unless configured otherwise.
///
/// `task` is the software task clock, reported in nanoseconds, and is the
/// denominator for [`PerfEvent::cpus`] and [`PerfEvent::ghz`].
///
/// [`PerfEvent`]: crate::PerfEvent
/// [`PerfEvent::cpus`]: crate::PerfEvent::cpus
/// [`PerfEvent::ghz`]: crate::PerfEvent::ghz
pub fn default_counters() -> &'static [(&'static str, Event)] {
    &DEFAULT_COUNTERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_encoding() {
        let e = Event::cache(0, 0, 1);
        assert_eq!(e.config(), 0x10000);
        assert_eq!(e.kind(), EventKind::HardwareCache);

        let e = Event::cache(3, 1, 1);
        assert_eq!(e.config(), 0x10103);
    }

    #[test]
    fn test_default_counter_names() {
        let names: Vec<_> = default_counters().iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            ["cycle", "kcycle", "scycle", "instr", "L1-miss", "LLC-miss", "br-miss", "task"]
        );
    }

    #[test]
    fn test_only_kcycle_excludes_user() {
        for (name, event) in default_counters() {
            assert_eq!(event.excludes_user(), *name == "kcycle", "{}", name);
        }
    }

    #[test]
    fn test_kcycle_matches_cycle_event() {
        let table = default_counters();
        assert_eq!(table[0].1.config(), table[1].1.config());
        assert_eq!(table[0].1.kind(), table[1].1.kind());
        assert_eq!(table[2].1, Event::raw(0x43FFAE));
    }
}
