use std::fs::File;
use std::io::{self, Read};
use std::mem;
use std::os::unix::io::{AsRawFd, FromRawFd};

use log::debug;
use perf_event_open_sys::{bindings as abi, ioctls, perf_event_open};

use crate::{
    counter::{Snapshot, SNAPSHOT_SIZE},
    device::{Device, Target},
    error::{new_error, Error, ErrorKind},
    Event,
};

/// The Linux `perf_event_open(2)` counter device.
///
/// Each handle is the counter's file descriptor wrapped in a [`File`], so it
/// is closed when the handle is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerfDevice;

impl PerfDevice {
    fn attr(event: &Event, target: &Target) -> abi::perf_event_attr {
        let mut attr = abi::perf_event_attr {
            size: mem::size_of::<abi::perf_event_attr>() as u32,
            type_: event.kind().type_id(),
            config: event.config(),
            read_format: (abi::PERF_FORMAT_TOTAL_TIME_ENABLED
                | abi::PERF_FORMAT_TOTAL_TIME_RUNNING) as u64,
            ..abi::perf_event_attr::default()
        };

        attr.set_disabled(1);
        attr.set_inherit(target.inherit as u64);
        attr.set_inherit_stat(0);
        attr.set_exclude_user(event.excludes_user() as u64);
        attr.set_exclude_kernel(0);
        attr.set_exclude_hv(0);
        attr
    }
}

fn ioctl(handle: &File, f: unsafe fn(libc::c_int, libc::c_uint) -> libc::c_int) -> Result<(), Error> {
    if unsafe { f(handle.as_raw_fd(), 0) } < 0 {
        return Err(io::Error::last_os_error().into());
    }
    Ok(())
}

impl Device for PerfDevice {
    type Handle = File;

    fn open(&mut self, name: &str, event: &Event, target: &Target) -> Result<File, Error> {
        let mut attr = Self::attr(event, target);

        let fd = unsafe {
            perf_event_open(
                &mut attr,
                target.pid,
                target.cpu,
                -1,
                abi::PERF_FLAG_FD_CLOEXEC as _,
            )
        };
        if fd < 0 {
            return Err(io::Error::last_os_error().into());
        }

        debug!("opened counter {} as fd {}", name, fd);
        Ok(unsafe { File::from_raw_fd(fd) })
    }

    fn reset(&mut self, handle: &File) -> Result<(), Error> {
        ioctl(handle, ioctls::RESET)
    }

    fn enable(&mut self, handle: &File) -> Result<(), Error> {
        ioctl(handle, ioctls::ENABLE)
    }

    fn disable(&mut self, handle: &File) -> Result<(), Error> {
        ioctl(handle, ioctls::DISABLE)
    }

    fn read(&mut self, mut handle: &File, snapshot: &mut Snapshot) -> Result<(), Error> {
        let mut buf = [0u8; SNAPSHOT_SIZE];
        let n = handle.read(&mut buf)?;

        snapshot.fill_from(&buf[..n]);
        if n != SNAPSHOT_SIZE {
            return Err(new_error(ErrorKind::ShortRead {
                expected: SNAPSHOT_SIZE,
                actual: n,
            }));
        }
        Ok(())
    }

    fn close(&mut self, handle: File) {
        drop(handle)
    }
}
