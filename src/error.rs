#![allow(missing_docs)]

use std::{error, fmt, io};

#[derive(Debug)]
pub struct Error {
	kind: ErrorKind,
	cause: Option<Box<dyn error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
	/// An unknown error
	Unknown,

	/// The host has no performance-counter device, or this platform is not
	/// supported at all.
	Unsupported,

	/// The caller does not have the appropriate permissions.
	///
	/// On Linux this is usually governed by
	/// `/proc/sys/kernel/perf_event_paranoid` or the `CAP_PERFMON` capability.
	Forbidden,

	/// The requested event is not recognised by the kernel or the CPU.
	InvalidEvent,

	/// The kernel ran out of counter slots or file descriptors.
	Exhausted,

	/// The kernel returned fewer bytes than a full counter snapshot.
	ShortRead { expected: usize, actual: usize },

	/// A counter control operation (reset, enable, disable) failed.
	Io,
}

impl ErrorKind {
	fn as_str(&self) -> &'static str {
		match self {
			ErrorKind::Unsupported => "performance counters unsupported",
			ErrorKind::Forbidden => "forbidden",
			ErrorKind::InvalidEvent => "invalid event",
			ErrorKind::Exhausted => "counter resources exhausted",
			ErrorKind::ShortRead { .. } => "short counter read",
			ErrorKind::Io => "counter i/o error",
			ErrorKind::Unknown => "unknown error",
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self.cause {
			None => None,
			Some(ref b) => Some(b.as_ref() as &(dyn error::Error + 'static)),
		}
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.kind {
			ErrorKind::ShortRead { expected, actual } => {
				write!(f, "{}: got {} of {} bytes", self.kind.as_str(), actual, expected)
			}
			_ => match self.cause {
				Some(ref cause) => write!(f, "{}: {}", self.kind.as_str(), cause),
				None => write!(f, "{}", self.kind.as_str()),
			},
		}
	}
}

#[doc(hidden)]
impl PartialEq for Error {
	fn eq(&self, other: &Error) -> bool {
		self.kind == other.kind
	}
}

impl Error {
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

impl From<io::Error> for Error {
	/// Classify an OS error returned by the performance-counter device.
	fn from(err: io::Error) -> Self {
		let kind = match err.raw_os_error() {
			Some(libc::EACCES) | Some(libc::EPERM) => ErrorKind::Forbidden,
			Some(libc::ENOENT) | Some(libc::EINVAL) | Some(libc::EOPNOTSUPP) => {
				ErrorKind::InvalidEvent
			}
			Some(libc::EMFILE) | Some(libc::ENOSPC) | Some(libc::EBUSY) => {
				ErrorKind::Exhausted
			}
			Some(libc::ENODEV) | Some(libc::ENOSYS) => ErrorKind::Unsupported,
			Some(_) => ErrorKind::Io,
			None => ErrorKind::Unknown,
		};
		Error {
			kind,
			cause: Some(Box::new(err)),
		}
	}
}

pub(crate) fn new_error(kind: ErrorKind) -> Error {
	Error { kind, cause: None }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_classify_permission_denied() {
		let err = Error::from(io::Error::from_raw_os_error(13));
		assert_eq!(err.kind(), &ErrorKind::Forbidden);
		assert!(err.to_string().starts_with("forbidden: "));
	}

	#[test]
	fn test_classify_unknown_event() {
		let err = Error::from(io::Error::from_raw_os_error(2));
		assert_eq!(err.kind(), &ErrorKind::InvalidEvent);
	}

	#[test]
	fn test_short_read_display() {
		let err = new_error(ErrorKind::ShortRead {
			expected: 24,
			actual: 8,
		});
		assert_eq!(err.to_string(), "short counter read: got 8 of 24 bytes");
		assert!(error::Error::source(&err).is_none());
	}
}
