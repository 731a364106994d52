use crate::{counter::Snapshot, error::Error, Event};

/// Which task and CPU a counter is attached to when it is opened.
///
/// The default measures the calling process on any CPU and follows it into
/// threads and children spawned after the counters were opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// Process to measure; `0` is the calling process.
    pub pid: i32,

    /// CPU to measure on; `-1` is any CPU.
    pub cpu: i32,

    /// Whether the counter is inherited by children of `pid`.
    pub inherit: bool,
}

impl Default for Target {
    fn default() -> Self {
        Target {
            pid: 0,
            cpu: -1,
            inherit: true,
        }
    }
}

/// The performance-counter device a [`PerfEvent`] drives.
///
/// [`PerfDevice`] is the kernel implementation. Other implementations let the
/// lifecycle be driven without counter hardware.
///
/// Handles returned by [`open`] are owned by the caller and must be given back
/// to [`close`] exactly once.
///
/// [`PerfEvent`]: crate::PerfEvent
/// [`PerfDevice`]: crate::PerfDevice
/// [`open`]: Device::open
/// [`close`]: Device::close
pub trait Device {
    /// An opened counter.
    type Handle;

    /// Open a disabled counter for `event`.
    ///
    /// `name` is only used for diagnostics.
    fn open(&mut self, name: &str, event: &Event, target: &Target) -> Result<Self::Handle, Error>;

    /// Zero the counter value.
    fn reset(&mut self, handle: &Self::Handle) -> Result<(), Error>;

    /// Start counting.
    fn enable(&mut self, handle: &Self::Handle) -> Result<(), Error>;

    /// Stop counting.
    fn disable(&mut self, handle: &Self::Handle) -> Result<(), Error>;

    /// Read `(value, time_enabled, time_running)` into `snapshot`.
    ///
    /// On a short read the fields that were delivered are still written and
    /// [`ErrorKind::ShortRead`] is returned.
    ///
    /// [`ErrorKind::ShortRead`]: crate::error::ErrorKind::ShortRead
    fn read(&mut self, handle: &Self::Handle, snapshot: &mut Snapshot) -> Result<(), Error>;

    /// Release the counter.
    fn close(&mut self, handle: Self::Handle);
}
