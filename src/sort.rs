//! External sorter.

use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;
use std::time::Duration;

use crate::device::{TapeDevice, TapeError};
use crate::emulator::{Emulation, TapeEmulator, Timing};
use crate::merger::RunMerger;
use crate::run::Run;

/// Default in-memory budget, in tape cells, for a single run.
pub const DEFAULT_MEMORY_BUDGET: usize = 1 << 20;

/// Sorting error.
#[derive(Debug)]
pub enum SortError {
    /// Temporary directory or file creation error.
    TempDir(io::Error),
    /// Tape device error.
    Tape(TapeError),
    /// Common I/O error.
    IO(io::Error),
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(match &self {
            SortError::TempDir(err) => err,
            SortError::Tape(err) => err,
            SortError::IO(err) => err,
        })
    }
}

impl Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            SortError::TempDir(err) => write!(f, "temporary directory or file not created: {}", err),
            SortError::Tape(err) => write!(f, "tape operation failed: {}", err),
            SortError::IO(err) => write!(f, "I/O operation failed: {}", err),
        }
    }
}

impl From<TapeError> for SortError {
    fn from(err: TapeError) -> Self {
        SortError::Tape(err)
    }
}

/// Sort session statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortStats {
    /// Number of runs the input was partitioned into.
    pub runs: usize,
    /// Summed emulated latency of the runs at the moment each was retired.
    /// The input and output tapes' own latency is not included.
    pub retired_cost: Duration,
}

/// External sorter builder. Provides methods for [`ExternalSorter`] initialization.
#[derive(Debug, Clone, Default)]
pub struct ExternalSorterBuilder {
    /// Directory to be used to store scratch runs.
    tmp_dir: Option<Box<Path>>,
    /// In-memory budget, in cells, for a single run.
    memory_budget: Option<usize>,
    /// Latency parameters passed to every tape the sorter opens.
    timing: Timing,
    /// Emulation mode passed to every tape the sorter opens.
    mode: Emulation,
}

impl ExternalSorterBuilder {
    /// Creates an instance of a builder with default parameters.
    pub fn new() -> Self {
        ExternalSorterBuilder::default()
    }

    /// Builds an [`ExternalSorter`] instance using provided configuration.
    pub fn build(self) -> Result<ExternalSorter, SortError> {
        ExternalSorter::new(
            self.tmp_dir.as_deref(),
            self.memory_budget,
            self.timing,
            self.mode,
        )
    }

    /// Sets directory to be used to store scratch runs.
    pub fn with_tmp_dir(mut self, path: &Path) -> ExternalSorterBuilder {
        self.tmp_dir = Some(path.into());
        self
    }

    /// Sets the per-run memory budget, in cells.
    pub fn with_memory_budget(mut self, budget: usize) -> ExternalSorterBuilder {
        self.memory_budget = Some(budget);
        self
    }

    /// Sets latency parameters for every tape the sorter opens.
    pub fn with_timing(mut self, timing: Timing) -> ExternalSorterBuilder {
        self.timing = timing;
        self
    }

    /// Sets the emulation mode for every tape the sorter opens.
    pub fn with_mode(mut self, mode: Emulation) -> ExternalSorterBuilder {
        self.mode = mode;
        self
    }
}

/// External sorter.
///
/// Partitions the input tape into bounded sorted runs and k-way-merges them
/// into the output tape, touching the data exclusively through [`TapeDevice`]
/// operations. Scratch runs live in a temporary directory owned by the sorter
/// and are cleaned up when the sorter is dropped.
pub struct ExternalSorter {
    /// Directory holding scratch runs.
    tmp_dir: tempfile::TempDir,
    /// In-memory budget, in cells, for a single run.
    memory_budget: usize,
    /// Latency parameters passed to every tape.
    timing: Timing,
    /// Emulation mode passed to every tape.
    mode: Emulation,
}

impl ExternalSorter {
    /// Creates a new external sorter instance.
    ///
    /// # Arguments
    /// * `tmp_path` - Directory to be used to store scratch runs. If the parameter is [`None`]
    ///   the default OS temporary directory will be used.
    /// * `memory_budget` - Maximum number of cells a single run may hold. Defaults to
    ///   [`DEFAULT_MEMORY_BUDGET`].
    /// * `timing` - Latency parameters passed to every tape the sorter opens.
    /// * `mode` - Emulation mode passed to every tape the sorter opens.
    pub fn new(
        tmp_path: Option<&Path>,
        memory_budget: Option<usize>,
        timing: Timing,
        mode: Emulation,
    ) -> Result<Self, SortError> {
        Ok(ExternalSorter {
            tmp_dir: Self::init_tmp_directory(tmp_path)?,
            memory_budget: memory_budget.unwrap_or(DEFAULT_MEMORY_BUDGET).max(1),
            timing,
            mode,
        })
    }

    fn init_tmp_directory(tmp_path: Option<&Path>) -> Result<tempfile::TempDir, SortError> {
        let tmp_dir = if let Some(tmp_path) = tmp_path {
            tempfile::tempdir_in(tmp_path)
        } else {
            tempfile::tempdir()
        }
        .map_err(SortError::TempDir)?;

        log::info!("using {} as a temporary directory", tmp_dir.path().display());

        Ok(tmp_dir)
    }

    /// Sorts the tape at `input_path` into a new tape at `output_path`.
    ///
    /// The output file is created (or truncated) with a header claiming the
    /// input's size; any failure to open the input, output, or a scratch run
    /// is fatal to the whole sort.
    pub fn sort(&self, input_path: &Path, output_path: &Path) -> Result<SortStats, SortError> {
        let mut input = TapeEmulator::open(self.mode, input_path, self.timing)?;
        let size = input.size()?;

        Self::write_output_header(output_path, size)?;
        let mut output = TapeEmulator::open(self.mode, output_path, self.timing)?;

        let runs = self.partition(&mut input, size)?;
        let run_count = runs.len();

        let retired_cost = RunMerger::new(runs).merge_into(&mut output)?;

        if self.mode != Emulation::Disabled {
            log::info!("emulated tape time over retired runs: {:?}", retired_cost);
        }

        Ok(SortStats {
            runs: run_count,
            retired_cost,
        })
    }

    /// Reads the input sequentially into bounded buffers, sorting each buffer
    /// and dumping it to its own scratch run.
    fn partition(&self, input: &mut TapeEmulator, size: usize) -> Result<Vec<Run>, SortError> {
        let run_count = size.div_ceil(self.memory_budget);
        log::debug!(
            "partitioning {} cells into {} runs (budget: {} cells)",
            size,
            run_count,
            self.memory_budget
        );

        let mut runs = Vec::with_capacity(run_count);
        for index in 0..run_count {
            let low = index * self.memory_budget;
            let high = size.min(low + self.memory_budget);

            let mut buffer = Vec::with_capacity(high - low);
            for cell in low..high {
                buffer.push(input.read()?);
                // the last cell of the whole tape has nothing further to shift to
                if cell + 1 < size {
                    input.shift_forward()?;
                }
            }

            buffer.sort();

            runs.push(Run::build(self.tmp_dir.path(), index, &buffer, self.mode, self.timing)?);
        }

        Ok(runs)
    }

    fn write_output_header(path: &Path, size: usize) -> Result<(), SortError> {
        let mut file = fs::File::create(path).map_err(SortError::IO)?;
        file.write_all(&(size as i32).to_le_bytes()).map_err(SortError::IO)?;

        Ok(())
    }
}
