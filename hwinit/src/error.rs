//! Driver error types.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, DriverError>;

/// Errors surfaced by leafdrv drivers.
///
/// Deliberately shallow: hosts only distinguish "ok" from a handful of
/// errno-style failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Bus or transaction failure, malformed request.
    #[error("I/O error")]
    Io,
    /// Expected hardware is absent or unusable.
    #[error("no such device")]
    NoDevice,
    /// Caller-provided memory is too small for the device layout.
    #[error("out of memory")]
    NoMemory,
}

impl DriverError {
    /// Negative POSIX errno, for hosts with C-style callback tables.
    pub const fn errno(self) -> i32 {
        match self {
            Self::Io => -5,
            Self::NoDevice => -19,
            Self::NoMemory => -12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_values() {
        assert_eq!(DriverError::Io.errno(), -5);
        assert_eq!(DriverError::NoDevice.errno(), -19);
        assert_eq!(DriverError::NoMemory.errno(), -12);
    }

    #[test]
    fn test_display() {
        assert_eq!(DriverError::Io.to_string(), "I/O error");
        assert_eq!(DriverError::NoDevice.to_string(), "no such device");
    }
}
