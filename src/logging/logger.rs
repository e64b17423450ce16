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

use std::borrow::Cow;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::logging::Error;
use crate::logging::Level;
use crate::logging::TextLayout;
use crate::logging::rotation::RotationPolicy;
use crate::logging::rotation::open_append;
use crate::logging::scheduler::FlushScheduler;
use crate::logging::sink::BufferedSink;

/// The default size limit of the active log file before it rotates.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
/// The default bound on buffered records before they write through.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 256;
/// The default delay between background flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// A concurrent, buffered, size-rotated file logger.
///
/// Records are kept in a bounded in-memory buffer, mirrored to the console
/// as they arrive, and written to the log file by a background flusher or
/// when the buffer runs over. The logger is an ordinary value: share it by
/// reference (it is `Sync`), pass it where it is needed, and shut it down
/// when you are done. Dropping it without [`Logger::shutdown`] still flushes,
/// but reports any failure to stderr instead of returning it.
///
/// # Examples
///
/// ```no_run
/// use cpubench::logging::Level;
/// use cpubench::logging::Logger;
///
/// # fn main() -> Result<(), cpubench::logging::Error> {
/// let logger = Logger::builder("cpubench.log")
///     .level(Level::Debug)
///     .build()?;
/// logger.info("starting up")?;
/// logger.shutdown()?;
/// # Ok(())
/// # }
/// ```
pub struct Logger {
    sink: Arc<BufferedSink>,
    scheduler: Option<FlushScheduler>,
}

impl Logger {
    /// Creates a builder for a logger writing to `path`.
    pub fn builder(path: impl Into<PathBuf>) -> LoggerBuilder {
        LoggerBuilder {
            path: path.into(),
            level: Level::Info,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            layout: TextLayout::default(),
            console: None,
        }
    }

    /// Appends a record at `level`.
    ///
    /// Returns an error only if the record forced buffered lines to write
    /// through to the file and that write failed; filtered records and
    /// plain buffered appends always succeed.
    pub fn log(&self, level: Level, message: impl AsRef<str>) -> Result<(), Error> {
        self.sink.append(level, message.as_ref())
    }

    /// Appends a [`Level::Debug`] record.
    pub fn debug(&self, message: impl AsRef<str>) -> Result<(), Error> {
        self.log(Level::Debug, message)
    }

    /// Appends a [`Level::Info`] record.
    pub fn info(&self, message: impl AsRef<str>) -> Result<(), Error> {
        self.log(Level::Info, message)
    }

    /// Appends a [`Level::Warning`] record.
    pub fn warning(&self, message: impl AsRef<str>) -> Result<(), Error> {
        self.log(Level::Warning, message)
    }

    /// Appends a [`Level::Fatal`] record.
    pub fn fatal(&self, message: impl AsRef<str>) -> Result<(), Error> {
        self.log(Level::Fatal, message)
    }

    /// Changes the severity threshold for records appended from now on.
    /// Records already buffered are unaffected.
    pub fn set_level(&self, level: Level) {
        self.sink.set_threshold(level);
    }

    /// Changes the delay between background flushes.
    ///
    /// The background flusher is woken to re-arm its timer, so the new
    /// interval applies at once rather than after the old one elapses.
    pub fn set_flush_interval(&self, interval: Duration) {
        self.sink.set_flush_interval(interval);
        if let Some(scheduler) = &self.scheduler {
            scheduler.nudge();
        }
    }

    /// Flushes all buffered records to the file and makes them durable,
    /// then rotates the file if it has grown past its size limit.
    pub fn flush(&self) -> Result<(), Error> {
        self.sink.flush_all()
    }

    /// Stops the background flusher and performs one final flush.
    ///
    /// Any records still buffered when this returns successfully are on
    /// disk. Prefer this over dropping so flush failures are reported to
    /// the caller.
    pub fn shutdown(mut self) -> Result<(), Error> {
        self.shutdown_inner()
    }

    fn shutdown_inner(&mut self) -> Result<(), Error> {
        match self.scheduler.take() {
            Some(scheduler) => {
                // Join the flusher first so the final flush cannot race it.
                scheduler.stop();
                self.sink.flush_all()
            }
            None => Ok(()),
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown_inner() {
            eprintln!("failed to flush log buffer on shutdown: {err}");
        }
    }
}

/// A builder for [`Logger`].
#[must_use = "call `build` to construct the logger"]
pub struct LoggerBuilder {
    path: PathBuf,
    level: Level,
    max_file_size: u64,
    max_buffer_size: usize,
    flush_interval: Duration,
    layout: TextLayout,
    console: Option<Box<dyn Write + Send>>,
}

impl LoggerBuilder {
    /// Sets the severity threshold. Defaults to [`Level::Info`].
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the size, in bytes, past which the active file rotates.
    #[must_use]
    pub fn max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Sets the record count past which the buffer writes through.
    #[must_use]
    pub fn max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = max_buffer_size;
        self
    }

    /// Sets the delay between background flushes.
    #[must_use]
    pub fn flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    /// Relabels [`Level::Fatal`] records, e.g. as `ERROR`.
    #[must_use]
    pub fn fatal_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.layout = self.layout.fatal_label(label);
        self
    }

    /// Replaces the console mirror stream. Defaults to stdout.
    #[must_use]
    pub fn console(mut self, console: impl Write + Send + 'static) -> Self {
        self.console = Some(Box::new(console));
        self
    }

    /// Opens the log file and starts the background flusher.
    ///
    /// The file is opened in append mode and created, along with its parent
    /// directories, if missing. Failure to open it or to spawn the flusher
    /// thread is returned to the caller.
    pub fn build(self) -> Result<Logger, Error> {
        let LoggerBuilder {
            path,
            level,
            max_file_size,
            max_buffer_size,
            flush_interval,
            layout,
            console,
        } = self;

        let file = open_append(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        let console = console.unwrap_or_else(|| Box::new(io::stdout()));
        let rotation = RotationPolicy::new(path, max_file_size);

        let sink = Arc::new(BufferedSink::new(
            file,
            console,
            layout,
            rotation,
            level,
            flush_interval,
            max_buffer_size,
        ));
        let scheduler = FlushScheduler::spawn(sink.clone())?;
        Ok(Logger {
            sink,
            scheduler: Some(scheduler),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn quiet_logger(dir: &TempDir) -> (Logger, PathBuf) {
        let path = dir.path().join("app.log");
        let logger = Logger::builder(&path)
            .level(Level::Debug)
            .flush_interval(Duration::from_secs(3600))
            .console(io::sink())
            .build()
            .unwrap();
        (logger, path)
    }

    #[test]
    fn test_build_creates_the_log_file() {
        let dir = TempDir::new().unwrap();
        let (logger, path) = quiet_logger(&dir);
        assert!(path.exists());
        logger.shutdown().unwrap();
    }

    #[test]
    fn test_build_reports_unopenable_path() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened as an append-mode file.
        let result = Logger::builder(dir.path()).console(io::sink()).build();
        assert!(matches!(result, Err(Error::Open { .. })));
    }

    #[test]
    fn test_shutdown_makes_records_durable() {
        let dir = TempDir::new().unwrap();
        let (logger, path) = quiet_logger(&dir);

        logger.info("kept until shutdown").unwrap();
        logger.shutdown().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[INFO] kept until shutdown"));
    }

    #[test]
    fn test_drop_flushes_pending_records() {
        let dir = TempDir::new().unwrap();
        let path = {
            let (logger, path) = quiet_logger(&dir);
            logger.info("pending at drop").unwrap();
            path
        };

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[INFO] pending at drop"));
    }

    #[test]
    fn test_set_level_applies_to_later_records() {
        let dir = TempDir::new().unwrap();
        let (logger, path) = quiet_logger(&dir);

        logger.set_level(Level::Warning);
        logger.info("filtered").unwrap();
        logger.warning("kept").unwrap();
        logger.shutdown().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("filtered"));
        assert!(content.contains("[WARNING] kept"));
    }

    #[test]
    fn test_fatal_label_flows_through_the_builder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let logger = Logger::builder(&path)
            .fatal_label("ERROR")
            .console(io::sink())
            .build()
            .unwrap();

        logger.fatal("wrong answer").unwrap();
        logger.shutdown().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[ERROR] wrong answer"));
    }
}
