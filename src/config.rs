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

//! Runtime configuration, merged from the command line, an optional JSON
//! config file, and built-in defaults, in that order of precedence.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use anyhow::ensure;
use clap::Parser;
use serde::Deserialize;

use crate::bench::DEFAULT_ITERATION_COUNT;
use crate::bench::DEFAULT_THREAD_COUNT;
use crate::logging::DEFAULT_FLUSH_INTERVAL;
use crate::logging::DEFAULT_MAX_BUFFER_SIZE;
use crate::logging::DEFAULT_MAX_FILE_SIZE;
use crate::logging::Level;

/// Where the config file is looked for unless `--config` says otherwise.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";
/// The default log file path.
pub const DEFAULT_OUTPUT_FILE: &str = "cpubench.log";
/// The default CSV report path.
pub const DEFAULT_REPORT_FILE: &str = "benchmark_report.csv";

/// Command line options.
///
/// Every option here has a config-file counterpart; the command line wins
/// when both are given.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Lower the log threshold to DEBUG
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of worker threads per benchmark
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Iterations per benchmark
    #[arg(short, long)]
    pub iterations: Option<u64>,

    /// Log file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log threshold: DEBUG, INFO, WARNING or FATAL
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// CSV report path
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}

/// The JSON configuration file. Every field is optional; a missing file is
/// treated as an empty one.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub verbose: Option<bool>,
    pub threads: Option<usize>,
    pub iterations: Option<u64>,
    pub output_file: Option<PathBuf>,
    pub report_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub max_file_size: Option<u64>,
    pub max_buffer_size: Option<usize>,
    pub flush_interval_secs: Option<u64>,
    /// An absent key selects every workload; a present key selects exactly
    /// its enabled entries, which may be none.
    pub benchmarks: Option<Vec<BenchmarkEntry>>,
}

/// One benchmark selection entry in the configuration file.
#[derive(Debug, Deserialize)]
pub struct BenchmarkEntry {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
}

impl ConfigFile {
    /// Loads the config file at `path`, or the defaults if there is none.
    ///
    /// A file that exists but cannot be read or parsed is an error; silently
    /// running with defaults in that case would hide a broken config.
    pub fn load(path: &Path) -> Result<ConfigFile> {
        if !path.exists() {
            return Ok(ConfigFile::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub threads: usize,
    pub iterations: u64,
    pub output_file: PathBuf,
    pub report_file: PathBuf,
    pub level: Level,
    pub max_file_size: u64,
    pub max_buffer_size: usize,
    pub flush_interval: Duration,
    /// Benchmark names enabled in the config file. `None` means the file
    /// made no selection and every workload runs; an empty list means it
    /// disabled them all.
    pub benchmarks: Option<Vec<String>>,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: &ConfigFile) -> Result<Settings> {
        let threads = cli.threads.or(file.threads).unwrap_or(DEFAULT_THREAD_COUNT);
        ensure!(
            threads > 0,
            "invalid 'threads' value: must be a positive integer"
        );

        let iterations = cli
            .iterations
            .or(file.iterations)
            .unwrap_or(DEFAULT_ITERATION_COUNT);
        ensure!(
            iterations > 0,
            "invalid 'iterations' value: must be a positive integer"
        );

        // An explicit level takes precedence over the --verbose shorthand.
        let verbose = cli.verbose || file.verbose.unwrap_or(false);
        let level = match cli.log_level.as_deref().or(file.log_level.as_deref()) {
            Some(name) => Level::parse(name),
            None if verbose => Level::Debug,
            None => Level::Info,
        };

        let output_file = cli
            .output
            .clone()
            .or_else(|| file.output_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
        let report_file = cli
            .report
            .clone()
            .or_else(|| file.report_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_FILE));

        let benchmarks = file.benchmarks.as_ref().map(|entries| {
            entries
                .iter()
                .filter(|entry| entry.enabled)
                .map(|entry| entry.name.clone())
                .collect()
        });

        Ok(Settings {
            threads,
            iterations,
            output_file,
            report_file,
            level,
            max_file_size: file.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE),
            max_buffer_size: file.max_buffer_size.unwrap_or(DEFAULT_MAX_BUFFER_SIZE),
            flush_interval: file
                .flush_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_FLUSH_INTERVAL),
            benchmarks,
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn bare_cli() -> Cli {
        Cli::parse_from(["cpubench"])
    }

    #[test]
    fn test_defaults_without_file_or_flags() {
        let settings = Settings::resolve(&bare_cli(), &ConfigFile::default()).unwrap();
        assert_eq!(settings.threads, DEFAULT_THREAD_COUNT);
        assert_eq!(settings.iterations, DEFAULT_ITERATION_COUNT);
        assert_eq!(settings.level, Level::Info);
        assert_eq!(settings.output_file, PathBuf::from(DEFAULT_OUTPUT_FILE));
        assert_eq!(settings.report_file, PathBuf::from(DEFAULT_REPORT_FILE));
        assert_eq!(settings.flush_interval, DEFAULT_FLUSH_INTERVAL);
        assert!(settings.benchmarks.is_none());
    }

    #[test]
    fn test_command_line_overrides_config_file() {
        let cli = Cli::parse_from(["cpubench", "--threads", "8", "--output", "cli.log"]);
        let file: ConfigFile = serde_json::from_str(
            r#"{
                "threads": 2,
                "output_file": "file.log",
                "report_file": "file.csv"
            }"#,
        )
        .unwrap();

        let settings = Settings::resolve(&cli, &file).unwrap();
        assert_eq!(settings.threads, 8);
        assert_eq!(settings.output_file, PathBuf::from("cli.log"));
        // Untouched options still come from the file.
        assert_eq!(settings.report_file, PathBuf::from("file.csv"));
    }

    #[test]
    fn test_verbose_lowers_the_level() {
        let cli = Cli::parse_from(["cpubench", "--verbose"]);
        let settings = Settings::resolve(&cli, &ConfigFile::default()).unwrap();
        assert_eq!(settings.level, Level::Debug);
    }

    #[test]
    fn test_explicit_level_beats_verbose() {
        let cli = Cli::parse_from(["cpubench", "--verbose", "--log-level", "WARNING"]);
        let settings = Settings::resolve(&cli, &ConfigFile::default()).unwrap();
        assert_eq!(settings.level, Level::Warning);
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let file: ConfigFile = serde_json::from_str(r#"{"log_level": "NOISY"}"#).unwrap();
        let settings = Settings::resolve(&bare_cli(), &file).unwrap();
        assert_eq!(settings.level, Level::Info);
    }

    #[test]
    fn test_zero_threads_is_rejected() {
        let cli = Cli::parse_from(["cpubench", "--threads", "0"]);
        let err = Settings::resolve(&cli, &ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("threads"));
    }

    #[test]
    fn test_zero_iterations_is_rejected() {
        let file: ConfigFile = serde_json::from_str(r#"{"iterations": 0}"#).unwrap();
        let err = Settings::resolve(&bare_cli(), &file).unwrap_err();
        assert!(err.to_string().contains("iterations"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile::load(&dir.path().join("absent.json")).unwrap();
        assert!(file.threads.is_none());
        assert!(file.benchmarks.is_none());
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = ConfigFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_enabled_benchmarks_are_selected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "threads": 4,
                "benchmarks": [
                    { "name": "integer", "enabled": true },
                    { "name": "float", "enabled": false },
                    { "name": "prime", "enabled": true }
                ]
            }"#,
        )
        .unwrap();

        let file = ConfigFile::load(&path).unwrap();
        let settings = Settings::resolve(&bare_cli(), &file).unwrap();
        assert_eq!(
            settings.benchmarks,
            Some(vec!["integer".to_string(), "prime".to_string()])
        );
    }

    #[test]
    fn test_disabling_every_benchmark_selects_none() {
        let file: ConfigFile = serde_json::from_str(
            r#"{
                "benchmarks": [
                    { "name": "integer", "enabled": false },
                    { "name": "float", "enabled": false },
                    { "name": "prime", "enabled": false },
                    { "name": "matrix", "enabled": false }
                ]
            }"#,
        )
        .unwrap();

        let settings = Settings::resolve(&bare_cli(), &file).unwrap();
        // An explicit all-disabled selection is not the same as making no
        // selection at all.
        assert_eq!(settings.benchmarks, Some(Vec::new()));
    }
}
