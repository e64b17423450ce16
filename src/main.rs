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

use anyhow::Result;
use clap::Parser;

use cpubench::bench::Harness;
use cpubench::bench::workloads;
use cpubench::config::Cli;
use cpubench::config::ConfigFile;
use cpubench::config::Settings;
use cpubench::logging::Logger;
use cpubench::report::CsvReport;
use cpubench::system::SystemInfo;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let file = ConfigFile::load(&cli.config)?;
    let settings = Settings::resolve(&cli, &file)?;

    let logger = Logger::builder(&settings.output_file)
        .level(settings.level)
        .max_file_size(settings.max_file_size)
        .max_buffer_size(settings.max_buffer_size)
        .flush_interval(settings.flush_interval)
        .fatal_label("ERROR")
        .build()?;

    // Failures past this point land in the log before the process exits.
    if let Err(err) = run(&logger, &settings) {
        logger.fatal(format!("{err:#}"))?;
        logger.shutdown()?;
        return Err(err);
    }

    logger.shutdown()?;
    Ok(())
}

fn run(logger: &Logger, settings: &Settings) -> Result<()> {
    logger.info("CPU Benchmark tool started")?;

    let system = SystemInfo::detect();
    logger.info(format!("Operating system: {}", system.os))?;
    logger.info(format!("CPU model: {}", system.cpu_model))?;
    logger.info(format!("CPU cores: {}", system.cpu_cores))?;
    logger.info(format!("Total memory: {} MiB", system.total_memory_mib()))?;
    logger.debug(format!(
        "Using {} thread(s) and {} iteration(s) per benchmark",
        settings.threads, settings.iterations
    ))?;

    let mut harness = Harness::new(settings.threads);
    match &settings.benchmarks {
        None => {
            for workload in workloads::all(settings.iterations) {
                harness.add(workload);
            }
        }
        Some(names) => {
            for name in names {
                match workloads::find(name, settings.iterations) {
                    Some(workload) => harness.add(workload),
                    None => logger.warning(format!("Unknown benchmark in config: {name}"))?,
                }
            }
        }
    }

    if harness.is_empty() {
        logger.warning("No benchmarks selected; nothing to run")?;
        return Ok(());
    }

    let mut report = CsvReport::create(&settings.report_file)?;
    let results = harness.run_all(logger, &mut report)?;
    report.finish()?;

    logger.info(format!(
        "Completed {} of {} benchmark(s); report written to {}",
        results.len(),
        harness.len(),
        settings.report_file.display()
    ))?;
    logger.info("CPU Benchmark tool finished successfully")?;
    Ok(())
}
