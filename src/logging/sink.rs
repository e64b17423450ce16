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

use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use crate::logging::Error;
use crate::logging::Level;
use crate::logging::TextLayout;
use crate::logging::clock::Clock;
use crate::logging::layout::Record;
use crate::logging::rotation::RotationPolicy;

/// The shared write side of the logger: a bounded in-memory buffer in front
/// of the active log file, mirrored to a console stream.
///
/// A single mutex guards the file handle, the buffer, and the console
/// together; every operation runs entirely inside one critical section, so
/// records from concurrent producers interleave as whole lines and never
/// tear or duplicate.
pub(crate) struct BufferedSink {
    inner: Mutex<SinkInner>,
}

struct SinkInner {
    file: File,
    console: Box<dyn Write + Send>,
    buffer: VecDeque<String>,
    layout: TextLayout,
    rotation: RotationPolicy,
    clock: Clock,
    threshold: Level,
    flush_interval: Duration,
    max_buffer_size: usize,
}

impl BufferedSink {
    pub(crate) fn new(
        file: File,
        console: Box<dyn Write + Send>,
        layout: TextLayout,
        rotation: RotationPolicy,
        threshold: Level,
        flush_interval: Duration,
        max_buffer_size: usize,
    ) -> BufferedSink {
        BufferedSink {
            inner: Mutex::new(SinkInner {
                file,
                console,
                buffer: VecDeque::new(),
                layout,
                rotation,
                clock: Clock::System,
                threshold,
                flush_interval,
                max_buffer_size,
            }),
        }
    }

    /// Formats and enqueues one record, mirroring it to the console.
    ///
    /// Records below the threshold are dropped before any formatting. When
    /// the buffer would grow past its bound, the oldest lines are written
    /// through to the file (without syncing) until the bound holds again;
    /// a failed write-through surfaces to the calling producer.
    pub(crate) fn append(&self, level: Level, message: &str) -> Result<(), Error> {
        self.lock().append(level, message)
    }

    /// Drains the buffer to the file, makes the writes durable, and then
    /// gives the rotation policy a chance to run.
    ///
    /// A flush with an empty buffer writes and syncs nothing, but still
    /// performs the rotation check so a deferred rotation is retried.
    pub(crate) fn flush_all(&self) -> Result<(), Error> {
        self.lock().flush_all()
    }

    pub(crate) fn set_threshold(&self, threshold: Level) {
        self.lock().threshold = threshold;
    }

    pub(crate) fn set_flush_interval(&self, interval: Duration) {
        self.lock().flush_interval = interval;
    }

    pub(crate) fn flush_interval(&self) -> Duration {
        self.lock().flush_interval
    }

    #[cfg(test)]
    pub(crate) fn set_clock(&self, clock: Clock) {
        self.lock().clock = clock;
    }

    fn lock(&self) -> MutexGuard<'_, SinkInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SinkInner {
    fn append(&mut self, level: Level, message: &str) -> Result<(), Error> {
        if level < self.threshold {
            return Ok(());
        }

        let record = Record {
            time: self.clock.now(),
            level,
            message,
        };
        let line = self.layout.format(&record);

        // The console mirror is best effort; its errors never fail an append.
        let _ = writeln!(self.console, "{line}");

        self.buffer.push_back(line);
        while self.buffer.len() > self.max_buffer_size {
            self.write_through_front()?;
        }
        Ok(())
    }

    fn flush_all(&mut self) -> Result<(), Error> {
        if !self.buffer.is_empty() {
            while !self.buffer.is_empty() {
                self.write_through_front()?;
            }
            self.file.sync_all()?;
        }

        let now = self.clock.now();
        self.rotation.rotate_if_needed(&mut self.file, &now)?;
        Ok(())
    }

    /// Writes the oldest buffered line to the file and removes it.
    ///
    /// The line stays buffered if the write fails, so nothing is lost to a
    /// transient error.
    fn write_through_front(&mut self) -> Result<(), Error> {
        if let Some(line) = self.buffer.front() {
            writeln!(self.file, "{line}")?;
            self.buffer.pop_front();
        }
        Ok(())
    }
}
