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

//! CPU workloads and the harness that times them.
//!
//! A [`Workload`] is a unit of repeatable compute. The [`Harness`] runs each
//! registered workload, single-threaded or across worker threads, times the
//! whole run, and turns it into a score: iterations completed per
//! millisecond of wall time.

pub mod workloads;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use anyhow::Result;

use crate::logging::Logger;
use crate::report::CsvReport;

/// How many iterations a benchmark runs unless configured otherwise.
pub const DEFAULT_ITERATION_COUNT: u64 = 10_000_000;
/// How many worker threads run a benchmark unless configured otherwise.
pub const DEFAULT_THREAD_COUNT: usize = 4;

/// A repeatable unit of CPU work.
pub trait Workload: Send + Sync {
    /// The display name used in logs and the CSV report.
    fn name(&self) -> &str;

    /// How many iterations one full run performs.
    fn iterations(&self) -> u64;

    /// Runs the whole workload on the calling thread, checking its own
    /// results; a detected miscomputation is an error.
    fn run(&self) -> Result<()>;

    /// Runs the single iteration identified by `index`.
    fn run_iteration(&self, index: u64);

    /// Runs all iterations across `threads` worker threads.
    ///
    /// Workers claim iteration indexes from a shared counter, so every
    /// index in `0..iterations()` is executed exactly once no matter how
    /// unevenly the workers progress.
    fn run_parallel(&self, threads: usize) {
        let total = self.iterations();
        let next = AtomicU64::new(0);
        thread::scope(|scope| {
            for _ in 0..threads.max(1) {
                scope.spawn(|| {
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        if index >= total {
                            break;
                        }
                        self.run_iteration(index);
                    }
                });
            }
        });
    }
}

/// The outcome of one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchResult {
    pub name: String,
    pub score: f64,
    pub duration: Duration,
}

/// Runs registered workloads in order and reports their scores.
pub struct Harness {
    threads: usize,
    workloads: Vec<Box<dyn Workload>>,
}

impl Harness {
    pub fn new(threads: usize) -> Harness {
        Harness {
            threads,
            workloads: Vec::new(),
        }
    }

    pub fn add(&mut self, workload: Box<dyn Workload>) {
        self.workloads.push(workload);
    }

    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }

    /// Runs every registered workload, appending a row per success to the
    /// report.
    ///
    /// A workload that reports a failure is logged and skipped; the
    /// remaining workloads still run. Only logging or report IO aborts the
    /// whole pass.
    pub fn run_all(&self, logger: &Logger, report: &mut CsvReport) -> Result<Vec<BenchResult>> {
        let mut results = Vec::new();
        for workload in &self.workloads {
            let name = workload.name();
            logger.info(format!("Running benchmark: {name}"))?;

            let started = Instant::now();
            let outcome = if self.threads <= 1 {
                workload.run()
            } else {
                workload.run_parallel(self.threads);
                Ok(())
            };
            let duration = started.elapsed();

            if let Err(err) = outcome {
                logger.fatal(format!("Benchmark {name} failed: {err}"))?;
                continue;
            }

            let score = score(workload.iterations(), duration);
            logger.info(format!(
                "Benchmark {name} completed in {} ms with score {score:.2}",
                duration.as_millis()
            ))?;
            report.record(name, score, duration)?;
            results.push(BenchResult {
                name: name.to_string(),
                score,
                duration,
            });
        }
        Ok(results)
    }
}

/// Iterations completed per millisecond of wall time.
fn score(iterations: u64, duration: Duration) -> f64 {
    let millis = duration.as_secs_f64() * 1_000.0;
    if millis > 0.0 {
        iterations as f64 / millis
    } else {
        iterations as f64
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use anyhow::bail;
    use tempfile::TempDir;

    use super::*;
    use crate::logging::Level;

    struct Counting {
        iterations: u64,
        executed: AtomicU64,
    }

    impl Counting {
        fn new(iterations: u64) -> Counting {
            Counting {
                iterations,
                executed: AtomicU64::new(0),
            }
        }
    }

    impl Workload for Counting {
        fn name(&self) -> &str {
            "Counting Test"
        }

        fn iterations(&self) -> u64 {
            self.iterations
        }

        fn run(&self) -> Result<()> {
            for index in 0..self.iterations {
                self.run_iteration(index);
            }
            Ok(())
        }

        fn run_iteration(&self, _index: u64) {
            self.executed.fetch_add(1, Ordering::Relaxed);
        }
    }

    struct Failing;

    impl Workload for Failing {
        fn name(&self) -> &str {
            "Failing Test"
        }

        fn iterations(&self) -> u64 {
            1
        }

        fn run(&self) -> Result<()> {
            bail!("unexpected zero result")
        }

        fn run_iteration(&self, _index: u64) {}
    }

    fn quiet_logger(dir: &TempDir) -> (Logger, std::path::PathBuf) {
        let path = dir.path().join("bench.log");
        let logger = Logger::builder(&path)
            .level(Level::Debug)
            .flush_interval(Duration::from_secs(3600))
            .console(io::sink())
            .build()
            .unwrap();
        (logger, path)
    }

    #[test]
    fn test_run_parallel_executes_every_iteration_exactly_once() {
        let workload = Counting::new(10_000);
        workload.run_parallel(4);
        assert_eq!(workload.executed.load(Ordering::Relaxed), 10_000);
    }

    #[test]
    fn test_run_parallel_with_one_thread() {
        let workload = Counting::new(1_000);
        workload.run_parallel(1);
        assert_eq!(workload.executed.load(Ordering::Relaxed), 1_000);
    }

    #[test]
    fn test_score_is_iterations_per_millisecond() {
        let value = score(10_000, Duration::from_millis(10));
        assert!((value - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_harness_continues_after_a_failed_benchmark() {
        let dir = TempDir::new().unwrap();
        let (logger, log_path) = quiet_logger(&dir);
        let report_path = dir.path().join("report.csv");
        let mut report = CsvReport::create(&report_path).unwrap();

        let mut harness = Harness::new(1);
        harness.add(Box::new(Failing));
        harness.add(Box::new(Counting::new(100)));

        let results = harness.run_all(&logger, &mut report).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Counting Test");
        assert!(results[0].score > 0.0);

        report.finish().unwrap();
        logger.shutdown().unwrap();

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("Benchmark Failing Test failed: unexpected zero result"));
        assert!(log.contains("Running benchmark: Counting Test"));

        // Header plus the one successful row.
        let csv = std::fs::read_to_string(&report_path).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.lines().nth(1).unwrap().starts_with("Counting Test,"));
    }

    #[test]
    fn test_harness_multi_threaded_run_records_results() {
        let dir = TempDir::new().unwrap();
        let (logger, _log_path) = quiet_logger(&dir);
        let report_path = dir.path().join("report.csv");
        let mut report = CsvReport::create(&report_path).unwrap();

        let mut harness = Harness::new(4);
        harness.add(Box::new(Counting::new(5_000)));

        let results = harness.run_all(&logger, &mut report).unwrap();
        assert_eq!(results.len(), 1);
        logger.shutdown().unwrap();
    }
}
