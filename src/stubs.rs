use crate::{
    counter::Snapshot,
    device::{Device, Target},
    error::{new_error, Error, ErrorKind},
    Event,
};

/// A device for hosts without a performance-counter facility.
///
/// Every open fails with [`ErrorKind::Unsupported`], so a [`PerfEvent`] built
/// on it holds no counters and all of its operations are no-ops.
///
/// [`PerfEvent`]: crate::PerfEvent
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedDevice;

impl Device for UnsupportedDevice {
    type Handle = ();

    fn open(&mut self, _name: &str, _event: &Event, _target: &Target) -> Result<(), Error> {
        Err(new_error(ErrorKind::Unsupported))
    }

    fn reset(&mut self, _handle: &()) -> Result<(), Error> {
        Ok(())
    }

    fn enable(&mut self, _handle: &()) -> Result<(), Error> {
        Ok(())
    }

    fn disable(&mut self, _handle: &()) -> Result<(), Error> {
        Ok(())
    }

    fn read(&mut self, _handle: &(), _snapshot: &mut Snapshot) -> Result<(), Error> {
        Ok(())
    }

    fn close(&mut self, _handle: ()) {}
}

/// Event codes from `linux/perf_event.h`, so the default counter table can be
/// described on every platform.
#[cfg(not(target_os = "linux"))]
#[allow(non_upper_case_globals, dead_code)]
pub(crate) mod abi {
    pub const PERF_TYPE_HARDWARE: u32 = 0;
    pub const PERF_TYPE_SOFTWARE: u32 = 1;
    pub const PERF_TYPE_HW_CACHE: u32 = 3;
    pub const PERF_TYPE_RAW: u32 = 4;

    pub const PERF_COUNT_HW_CPU_CYCLES: u32 = 0;
    pub const PERF_COUNT_HW_INSTRUCTIONS: u32 = 1;
    pub const PERF_COUNT_HW_CACHE_MISSES: u32 = 3;
    pub const PERF_COUNT_HW_BRANCH_MISSES: u32 = 5;

    pub const PERF_COUNT_HW_CACHE_L1D: u32 = 0;
    pub const PERF_COUNT_HW_CACHE_OP_READ: u32 = 0;
    pub const PERF_COUNT_HW_CACHE_RESULT_MISS: u32 = 1;

    pub const PERF_COUNT_SW_TASK_CLOCK: u32 = 1;
}
