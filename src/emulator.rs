//! File-backed tape emulator.
//!
//! The emulator persists a tape as a flat binary file: a 4-byte little-endian
//! `i32` cell count followed by one 4-byte little-endian `i32` per cell, in
//! tape order. Every head movement is charged by a configurable cost model
//! approximating a mechanical tape drive, where seek latency grows linearly
//! with the distance travelled.

use std::fs;
use std::io::{self, prelude::*, SeekFrom};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::device::{TapeDevice, TapeError};

const HEADER_BYTES: u64 = 4;
const CELL_BYTES: u64 = 4;

/// Latency emulation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emulation {
    /// No delay, no cost accumulation.
    #[default]
    Disabled,
    /// Cost accumulates per operation, but the program is not slowed down.
    StatsOnly,
    /// The calling thread blocks for the configured duration and cost accumulates.
    Full,
}

/// Per-operation latency parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timing {
    pub read: Duration,
    pub write: Duration,
    pub shift: Duration,
}

impl Timing {
    /// Builds a timing set from millisecond values.
    pub fn from_millis(read: u64, write: u64, shift: u64) -> Self {
        Timing {
            read: Duration::from_millis(read),
            write: Duration::from_millis(write),
            shift: Duration::from_millis(shift),
        }
    }
}

struct Inner {
    file: fs::File,
    path: PathBuf,
    size: usize,
    head: usize,
    mode: Emulation,
    timing: Timing,
    elapsed: Duration,
}

impl Inner {
    fn charge(&mut self, cost: Duration) {
        match self.mode {
            Emulation::Disabled => {}
            Emulation::StatsOnly => self.elapsed += cost,
            Emulation::Full => {
                thread::sleep(cost);
                self.elapsed += cost;
            }
        }
    }

    fn seek_to_cell(&mut self) -> Result<(), TapeError> {
        self.file
            .seek(SeekFrom::Start(HEADER_BYTES + CELL_BYTES * self.head as u64))?;
        Ok(())
    }
}

/// File-backed [`TapeDevice`] with a configurable cost model.
///
/// The head position is the single source of truth for cell addressing: the
/// backing file is repositioned from `head` before every cell access, so a
/// read or write can never leave the device pointing past the cell it just
/// touched.
#[derive(Default)]
pub struct TapeEmulator {
    inner: Option<Inner>,
}

impl TapeEmulator {
    /// Creates an uninitialized emulator. Every operation fails with
    /// [`TapeError::Uninitialized`] until [`initialize`](Self::initialize)
    /// succeeds.
    pub fn new() -> Self {
        TapeEmulator { inner: None }
    }

    /// Opens `path` read+write and binds the emulator to it.
    ///
    /// Reads the cell-count header and fails with [`TapeError::InvalidFormat`]
    /// if it declares no cells. The head is placed on the first cell and the
    /// cost counter is zeroed. Re-initializing an already-open emulator
    /// releases the previous backing file and resets all state.
    pub fn initialize(&mut self, mode: Emulation, path: &Path, timing: Timing) -> Result<(), TapeError> {
        self.inner = None;

        let mut file = fs::OpenOptions::new().read(true).write(true).open(path)?;

        let mut header = [0u8; HEADER_BYTES as usize];
        file.read_exact(&mut header)?;
        let declared = i32::from_le_bytes(header);
        if declared <= 0 {
            return Err(TapeError::InvalidFormat);
        }

        log::debug!("tape {} initialized: {} cells", path.display(), declared);

        self.inner = Some(Inner {
            file,
            path: path.to_path_buf(),
            size: declared as usize,
            head: 0,
            mode,
            timing,
            elapsed: Duration::ZERO,
        });

        Ok(())
    }

    /// One-shot constructor: [`new`](Self::new) followed by
    /// [`initialize`](Self::initialize).
    pub fn open(mode: Emulation, path: &Path, timing: Timing) -> Result<Self, TapeError> {
        let mut emulator = TapeEmulator::new();
        emulator.initialize(mode, path, timing)?;
        Ok(emulator)
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    /// Returns the accumulated emulated latency.
    pub fn elapsed(&self) -> Result<Duration, TapeError> {
        Ok(self.inner()?.elapsed)
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> Result<&Path, TapeError> {
        Ok(&self.inner()?.path)
    }

    fn inner(&self) -> Result<&Inner, TapeError> {
        self.inner.as_ref().ok_or(TapeError::Uninitialized)
    }

    fn inner_mut(&mut self) -> Result<&mut Inner, TapeError> {
        self.inner.as_mut().ok_or(TapeError::Uninitialized)
    }

    /// Writes `values` to `path` in tape file format, truncating any previous
    /// content. Exact inverse of [`read_file`](Self::read_file).
    pub fn create_file(path: &Path, values: &[i32]) -> Result<(), TapeError> {
        let length = i32::try_from(values.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "tape length exceeds header capacity"))?;

        let mut file = fs::File::create(path)?;
        file.write_all(&length.to_le_bytes())?;
        for value in values {
            file.write_all(&value.to_le_bytes())?;
        }

        Ok(())
    }

    /// Parses a tape file back into its cell sequence. Unlike
    /// [`initialize`](Self::initialize), a zero-length tape is accepted.
    pub fn read_file(path: &Path) -> Result<Vec<i32>, TapeError> {
        let mut file = fs::File::open(path)?;

        let mut header = [0u8; HEADER_BYTES as usize];
        file.read_exact(&mut header)?;
        let length = i32::from_le_bytes(header);
        if length < 0 {
            return Err(TapeError::InvalidFormat);
        }

        let mut values = Vec::with_capacity(length as usize);
        let mut cell = [0u8; CELL_BYTES as usize];
        for _ in 0..length {
            file.read_exact(&mut cell)?;
            values.push(i32::from_le_bytes(cell));
        }

        Ok(values)
    }
}

impl TapeDevice for TapeEmulator {
    fn size(&self) -> Result<usize, TapeError> {
        Ok(self.inner()?.size)
    }

    fn position(&self) -> Result<usize, TapeError> {
        Ok(self.inner()?.head)
    }

    fn set_position(&mut self, target: usize) -> Result<(), TapeError> {
        let inner = self.inner_mut()?;

        if target >= inner.size {
            return Err(TapeError::OutOfRange {
                target: target as i64,
                size: inner.size,
            });
        }

        // seek cost is linear in mechanical distance
        let distance = inner.head.abs_diff(target);
        inner.charge(inner.timing.shift.saturating_mul(distance as u32));
        inner.head = target;

        Ok(())
    }

    fn shift_forward(&mut self) -> Result<(), TapeError> {
        let inner = self.inner_mut()?;

        if inner.head + 1 >= inner.size {
            return Err(TapeError::OutOfRange {
                target: inner.head as i64 + 1,
                size: inner.size,
            });
        }

        inner.charge(inner.timing.shift);
        inner.head += 1;

        Ok(())
    }

    fn shift_backward(&mut self) -> Result<(), TapeError> {
        let inner = self.inner_mut()?;

        if inner.head == 0 {
            return Err(TapeError::OutOfRange {
                target: -1,
                size: inner.size,
            });
        }

        inner.charge(inner.timing.shift);
        inner.head -= 1;

        Ok(())
    }

    fn read(&mut self) -> Result<i32, TapeError> {
        let inner = self.inner_mut()?;

        inner.charge(inner.timing.read);
        inner.seek_to_cell()?;
        let mut cell = [0u8; CELL_BYTES as usize];
        inner.file.read_exact(&mut cell)?;

        Ok(i32::from_le_bytes(cell))
    }

    fn write(&mut self, value: i32) -> Result<(), TapeError> {
        let inner = self.inner_mut()?;

        inner.charge(inner.timing.write);
        inner.seek_to_cell()?;
        inner.file.write_all(&value.to_le_bytes())?;

        Ok(())
    }
}
