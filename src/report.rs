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

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;

/// The column header row of the CSV report.
pub const CSV_HEADER: &str = "Test Name,Score,Duration (ms)";

/// Writes benchmark outcomes to a CSV file, one row per benchmark.
pub struct CsvReport {
    file: File,
}

impl CsvReport {
    /// Creates (or truncates) the report file and writes the header row.
    pub fn create(path: impl AsRef<Path>) -> Result<CsvReport> {
        let path = path.as_ref();
        let mut file = File::create(path)
            .with_context(|| format!("failed to create report file {}", path.display()))?;
        writeln!(file, "{CSV_HEADER}")?;
        Ok(CsvReport { file })
    }

    /// Appends one result row.
    pub fn record(&mut self, name: &str, score: f64, duration: Duration) -> Result<()> {
        writeln!(self.file, "{name},{score:.2},{}", duration.as_millis())?;
        Ok(())
    }

    /// Syncs the report to disk.
    pub fn finish(self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
