//! Run merger.

use std::time::Duration;

use crate::device::{TapeDevice, TapeError};
use crate::run::Run;

/// Merges sorted runs into an output tape.
///
/// Each round re-reads the cell under every open run's head (each read is a
/// charged tape operation) and selects the run holding the minimum value.
/// Ties always go to the lowest-indexed run in the current open set, so
/// output ordering and cost accounting stay reproducible when duplicate
/// values span multiple runs.
///
/// A run is retired only after its final value has been consumed into the
/// output; retiring moves the handle out of the open set and adds the run's
/// accumulated latency to the statistics total.
pub struct RunMerger {
    runs: Vec<Run>,
    retired_cost: Duration,
}

impl RunMerger {
    /// Creates a merger over `runs`. The runs' combined length must equal the
    /// output tape's size, and each run must be sorted in ascending order,
    /// otherwise the result is undefined.
    pub fn new(runs: Vec<Run>) -> Self {
        RunMerger {
            runs,
            retired_cost: Duration::ZERO,
        }
    }

    /// Drains every run into `output` in ascending order.
    /// Returns the summed latency of the runs at the moment each was retired.
    pub fn merge_into(mut self, output: &mut dyn TapeDevice) -> Result<Duration, TapeError> {
        let total = output.size()?;
        log::debug!("merging {} runs into {} cells", self.runs.len(), total);

        for slot in 0..total {
            let mut best_index = 0;
            let mut best_value = i32::MAX;
            let mut first = true;

            for (index, run) in self.runs.iter_mut().enumerate() {
                let value = run.read()?;
                // strict comparison keeps the first run holding the minimum
                if first || value < best_value {
                    best_index = index;
                    best_value = value;
                    first = false;
                }
            }

            output.write(best_value)?;
            if slot + 1 < total {
                output.shift_forward()?;
            }

            let run = &mut self.runs[best_index];
            if run.position()? + 1 < run.size()? {
                run.shift_forward()?;
            } else {
                let retired = self.runs.remove(best_index);
                self.retired_cost += retired.elapsed()?;
                log::debug!("run {} exhausted, {} still open", retired.path().display(), self.runs.len());
            }
        }

        Ok(self.retired_cost)
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;
    use std::time::Duration;

    use rstest::*;

    use super::RunMerger;
    use crate::emulator::{Emulation, TapeEmulator, Timing};
    use crate::run::Run;

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn output_tape(dir: &tempfile::TempDir, size: usize, mode: Emulation, timing: Timing) -> (PathBuf, TapeEmulator) {
        let path = dir.path().join("out.tape");
        TapeEmulator::create_file(&path, &vec![0; size]).unwrap();
        let tape = TapeEmulator::open(mode, &path, timing).unwrap();
        (path, tape)
    }

    fn build_runs(dir: &tempfile::TempDir, runs: &[Vec<i32>], mode: Emulation, timing: Timing) -> Vec<Run> {
        runs.iter()
            .enumerate()
            .map(|(index, values)| Run::build(dir.path(), index, values, mode, timing).unwrap())
            .collect()
    }

    #[rstest]
    #[case(
        vec![vec![4, 5, 7], vec![1, 6], vec![3]],
        vec![1, 3, 4, 5, 6, 7],
    )]
    #[case(
        vec![vec![2, 2], vec![1, 2], vec![2, 3]],
        vec![1, 2, 2, 2, 2, 3],
    )]
    fn test_merge(tmp_dir: tempfile::TempDir, #[case] runs: Vec<Vec<i32>>, #[case] expected: Vec<i32>) {
        let runs = build_runs(&tmp_dir, &runs, Emulation::Disabled, Timing::default());
        let (path, mut output) = output_tape(&tmp_dir, expected.len(), Emulation::Disabled, Timing::default());

        RunMerger::new(runs).merge_into(&mut output).unwrap();

        assert_eq!(TapeEmulator::read_file(&path).unwrap(), expected);
    }

    #[rstest]
    fn test_single_run_is_a_straight_copy(tmp_dir: tempfile::TempDir) {
        let runs = build_runs(&tmp_dir, &[vec![1, 2, 3, 4]], Emulation::Disabled, Timing::default());
        let (path, mut output) = output_tape(&tmp_dir, 4, Emulation::Disabled, Timing::default());

        RunMerger::new(runs).merge_into(&mut output).unwrap();

        assert_eq!(TapeEmulator::read_file(&path).unwrap(), vec![1, 2, 3, 4]);
    }

    /// With runs `[5, 9]` and `[5]` the first round is a tie on 5. Taking the
    /// lowest-indexed run leaves the second run open for one more round, so it
    /// retires after two charged reads rather than one; the retired-cost total
    /// therefore pins the tie-break policy.
    #[rstest]
    fn test_tie_break_takes_lowest_indexed_run(tmp_dir: tempfile::TempDir) {
        let timing = Timing::from_millis(1, 0, 0);
        let runs = build_runs(&tmp_dir, &[vec![5, 9], vec![5]], Emulation::StatsOnly, timing);
        let (path, mut output) = output_tape(&tmp_dir, 3, Emulation::Disabled, Timing::default());

        let retired = RunMerger::new(runs).merge_into(&mut output).unwrap();

        assert_eq!(TapeEmulator::read_file(&path).unwrap(), vec![5, 5, 9]);
        // run 1: read in rounds 1 and 2 -> 2ms; run 0: read in all 3 rounds -> 3ms
        assert_eq!(retired, Duration::from_millis(5));
    }
}
