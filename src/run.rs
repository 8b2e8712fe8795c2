//! Sorted scratch runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::device::{TapeDevice, TapeError};
use crate::emulator::{Emulation, TapeEmulator, Timing};

/// A sorted subsequence of the input written to its own scratch tape.
///
/// A run is produced during partitioning from an in-memory buffer and consumed
/// sequentially during merging. It is owned exclusively by the sorter and
/// carries the same cost model as every other tape in the session.
pub struct Run {
    path: PathBuf,
    tape: TapeEmulator,
}

impl Run {
    /// Dumps `values` to a new scratch tape under `dir` and opens a device
    /// over it. `values` must already be sorted; the run does not check.
    pub fn build(
        dir: &Path,
        index: usize,
        values: &[i32],
        mode: Emulation,
        timing: Timing,
    ) -> Result<Self, TapeError> {
        let path = dir.join(format!("run-{}.tape", index));

        TapeEmulator::create_file(&path, values)?;
        let tape = TapeEmulator::open(mode, &path, timing)?;

        log::debug!("run {} written: {} cells", path.display(), values.len());

        Ok(Run { path, tape })
    }

    /// Path of the backing scratch file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accumulated emulated latency of this run's tape.
    pub fn elapsed(&self) -> Result<Duration, TapeError> {
        self.tape.elapsed()
    }
}

impl TapeDevice for Run {
    fn size(&self) -> Result<usize, TapeError> {
        self.tape.size()
    }

    fn position(&self) -> Result<usize, TapeError> {
        self.tape.position()
    }

    fn set_position(&mut self, target: usize) -> Result<(), TapeError> {
        self.tape.set_position(target)
    }

    fn shift_forward(&mut self) -> Result<(), TapeError> {
        self.tape.shift_forward()
    }

    fn shift_backward(&mut self) -> Result<(), TapeError> {
        self.tape.shift_backward()
    }

    fn read(&mut self) -> Result<i32, TapeError> {
        self.tape.read()
    }

    fn write(&mut self, value: i32) -> Result<(), TapeError> {
        self.tape.write(value)
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::Run;
    use crate::device::TapeDevice;
    use crate::emulator::{Emulation, TapeEmulator, Timing};

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[rstest]
    fn test_run_build(tmp_dir: tempfile::TempDir) {
        let values = vec![1, 3, 5, 7];
        let mut run = Run::build(tmp_dir.path(), 0, &values, Emulation::Disabled, Timing::default()).unwrap();

        assert_eq!(run.size().unwrap(), 4);
        assert_eq!(run.position().unwrap(), 0);
        assert_eq!(run.read().unwrap(), 1);

        // the scratch file is a regular tape file
        assert_eq!(TapeEmulator::read_file(run.path()).unwrap(), values);
    }
}
