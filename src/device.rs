//! Tape device contract.

use std::error::Error;
use std::fmt;
use std::io;

/// Tape device error.
#[derive(Debug)]
pub enum TapeError {
    /// Backing file could not be opened or accessed.
    Io(io::Error),
    /// The tape header declares no cells.
    InvalidFormat,
    /// Head movement or seek target outside the tape.
    OutOfRange { target: i64, size: usize },
    /// Operation attempted on a device that has not been initialized.
    Uninitialized,
}

impl Error for TapeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TapeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for TapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapeError::Io(err) => write!(f, "tape I/O failed: {}", err),
            TapeError::InvalidFormat => write!(f, "tape length is zero"),
            TapeError::OutOfRange { target, size } => write!(f, "{} out of tape range {}", target, size),
            TapeError::Uninitialized => write!(f, "tape device is not initialized"),
        }
    }
}

impl From<io::Error> for TapeError {
    fn from(err: io::Error) -> Self {
        TapeError::Io(err)
    }
}

/// Sequential-access storage device with a single movable head.
///
/// A tape holds a fixed number of 32-bit signed integer cells. The head
/// addresses exactly one cell at a time; reading and writing never move it,
/// only [`shift_forward`](TapeDevice::shift_forward),
/// [`shift_backward`](TapeDevice::shift_backward) and
/// [`set_position`](TapeDevice::set_position) do, and every position change
/// is charged by the device's cost model.
///
/// This is the only interface the sorting algorithm uses.
pub trait TapeDevice {
    /// Returns the number of cells on the tape.
    fn size(&self) -> Result<usize, TapeError>;

    /// Returns the current head position.
    fn position(&self) -> Result<usize, TapeError>;

    /// Moves the head to `target`, charging cost proportional to the distance.
    fn set_position(&mut self, target: usize) -> Result<(), TapeError>;

    /// Moves the head one cell forward.
    fn shift_forward(&mut self) -> Result<(), TapeError>;

    /// Moves the head one cell backward.
    fn shift_backward(&mut self) -> Result<(), TapeError>;

    /// Returns the value of the cell under the head. The head does not move.
    fn read(&mut self) -> Result<i32, TapeError>;

    /// Overwrites the cell under the head. The head does not move.
    fn write(&mut self, value: i32) -> Result<(), TapeError>;
}
