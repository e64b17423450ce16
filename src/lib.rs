// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cpubench is a CPU micro-benchmark tool built around a concurrent,
//! buffered, size-rotated logging core.
//!
//! # Overview
//!
//! The crate has two halves. [`logging`] is a self-contained logging
//! subsystem: records pass a severity threshold, are mirrored to the
//! console, held in a bounded buffer, flushed to a log file by a background
//! worker, and the file is rotated aside once it outgrows its size limit.
//! [`bench`], [`config`], [`report`] and [`system`] make up the benchmark
//! tool itself: workload selection, timing, scoring, and CSV reporting.
//!
//! # Examples
//!
//! ```no_run
//! use cpubench::bench::Harness;
//! use cpubench::bench::workloads;
//! use cpubench::logging::Logger;
//! use cpubench::report::CsvReport;
//!
//! # fn main() -> anyhow::Result<()> {
//! let logger = Logger::builder("cpubench.log").build()?;
//! let mut report = CsvReport::create("benchmark_report.csv")?;
//!
//! let mut harness = Harness::new(4);
//! for workload in workloads::all(1_000_000) {
//!     harness.add(workload);
//! }
//! harness.run_all(&logger, &mut report)?;
//!
//! report.finish()?;
//! logger.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod bench;
pub mod config;
pub mod logging;
pub mod report;
pub mod system;

pub use logging::Level;
pub use logging::Logger;
