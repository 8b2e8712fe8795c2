//! `tape-sort` is an external merge sort over an emulated sequential-access tape device.
//!
//! All data access goes through a simulated tape whose read, write and shift operations carry
//! configurable latency, modeling external sorting on hardware where random access is expensive
//! and only a small working set fits in fast memory. Sorting is achieved in two passes: the input
//! tape is first partitioned into bounded runs that each fit in memory, sorted and written to
//! scratch tapes; the runs are then k-way-merged into the output tape. For more information see
//! [External Sorting](https://en.wikipedia.org/wiki/External_sorting).
//!
//! # Overview
//!
//! `tape-sort` supports the following features:
//!
//! * **Tape cost model:**
//!   every head movement is charged latency proportional to the distance travelled, the way a
//!   mechanical tape drive behaves; emulation can be disabled, statistics-only, or full
//!   (the calling thread actually blocks for the configured duration).
//! * **Memory limit support:**
//!   the number of runs is derived from a configurable per-run cell budget, so the algorithm
//!   scales to inputs of any size.
//! * **Deterministic merging:**
//!   when duplicate values span multiple runs the merge always takes the lowest-indexed run,
//!   making output ordering and cost accounting reproducible.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use tape_sort::{Emulation, ExternalSorterBuilder, TapeEmulator, Timing};
//!
//! fn main() {
//!     env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();
//!
//!     let sorter = ExternalSorterBuilder::new()
//!         .with_memory_budget(1024)
//!         .with_timing(Timing::from_millis(1, 1, 1))
//!         .with_mode(Emulation::StatsOnly)
//!         .build()
//!         .unwrap();
//!
//!     let stats = sorter
//!         .sort(Path::new("input.tape"), Path::new("output.tape"))
//!         .unwrap();
//!
//!     println!("sorted in {} runs, emulated time {:?}", stats.runs, stats.retired_cost);
//!     println!("{:?}", TapeEmulator::read_file(Path::new("output.tape")).unwrap());
//! }
//! ```

pub mod config;
pub mod device;
pub mod emulator;
pub mod gen;
pub mod merger;
pub mod run;
pub mod sort;

pub use config::Config;
pub use device::{TapeDevice, TapeError};
pub use emulator::{Emulation, TapeEmulator, Timing};
pub use merger::RunMerger;
pub use run::Run;
pub use sort::{ExternalSorter, ExternalSorterBuilder, SortError, SortStats};
