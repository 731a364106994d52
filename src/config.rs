use crate::{
    device::{Device, Target},
    error::Error,
    Event, PerfDevice, PerfEvent,
};

/// Configure the counter set and measurement target.
///
/// Unless specified, the [default counters] are opened for the calling
/// process on any CPU, inherited by threads and children it spawns.
///
/// ```no_run
/// use perf_block::{CounterConfig, Event};
///
/// let mut perf = CounterConfig::empty()
///     .counter("cycle", Event::hardware(0))
///     .counter("instr", Event::hardware(1))
///     .inherit(false)
///     .allocate()?;
///
/// perf.start();
/// perf.stop();
/// println!("IPC: {:.2}", perf.ipc());
/// #
/// # Ok::<(), perf_block::error::Error>(())
/// ```
///
/// [default counters]: crate::default_counters
#[derive(Debug, Clone)]
pub struct CounterConfig {
    counters: Vec<(String, Event)>,
    target: Target,
}

impl Default for CounterConfig {
    fn default() -> Self {
        CounterConfig {
            counters: crate::default_counters()
                .iter()
                .map(|(name, event)| (name.to_string(), *event))
                .collect(),
            target: Target::default(),
        }
    }
}

impl CounterConfig {
    /// A configuration with no counters.
    pub fn empty() -> Self {
        CounterConfig {
            counters: Vec::new(),
            target: Target::default(),
        }
    }

    /// Replace the counter table.
    pub fn counters<N: Into<String>>(self, counters: impl IntoIterator<Item = (N, Event)>) -> Self {
        Self {
            counters: counters
                .into_iter()
                .map(|(name, event)| (name.into(), event))
                .collect(),
            ..self
        }
    }

    /// Append a counter to the table.
    pub fn counter(mut self, name: impl Into<String>, event: Event) -> Self {
        self.counters.push((name.into(), event));
        self
    }

    /// Measure the process `pid`.
    ///
    /// # PID 0
    ///
    /// PID 0 measures the calling process, and is the default.
    pub fn attach_to(self, pid: i32) -> Self {
        Self {
            target: Target { pid, ..self.target },
            ..self
        }
    }

    /// Only count events on `cpu`.
    ///
    /// Defaults to any CPU (`-1`).
    pub fn set_cpu(self, cpu: i32) -> Self {
        Self {
            target: Target { cpu, ..self.target },
            ..self
        }
    }

    /// Whether counts include threads and child processes spawned after the
    /// counters are opened. Defaults to `true`.
    pub fn inherit(self, inherit: bool) -> Self {
        Self {
            target: Target {
                inherit,
                ..self.target
            },
            ..self
        }
    }

    /// Where counters are attached.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The configured counter names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.counters.iter().map(|(name, _)| name.as_str())
    }

    /// Open the configured counters with the host's counter device.
    pub fn allocate(&self) -> Result<PerfEvent<PerfDevice>, Error> {
        self.allocate_with(PerfDevice::default())
    }

    /// Open the configured counters on `device`.
    ///
    /// Either every counter is opened, or none is and the first open error is
    /// returned.
    pub fn allocate_with<D: Device>(&self, device: D) -> Result<PerfEvent<D>, Error> {
        let mut perf = PerfEvent::empty(device, self.target);
        for (name, event) in &self.counters {
            perf.register(name.as_str(), *event);
        }
        perf.open()?;
        Ok(perf)
    }
}
