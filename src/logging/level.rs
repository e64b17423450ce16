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

use std::fmt;

/// Severity of a log record, ordered from least to most severe.
///
/// A record is emitted only if its level is at least the sink's threshold;
/// comparisons use the derived ordering, so `Level::Debug < Level::Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Detailed diagnostics, normally filtered out.
    Debug,
    /// Routine progress messages.
    Info,
    /// Something unexpected that the program can recover from.
    Warning,
    /// An unrecoverable failure.
    Fatal,
}

impl Level {
    /// The canonical uppercase name of this level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Fatal => "FATAL",
        }
    }

    /// Parses a level name, ignoring case and surrounding whitespace.
    ///
    /// `"ERROR"` is accepted as an alias for [`Level::Fatal`]. Unrecognized
    /// names fall back to [`Level::Info`] rather than failing, so a typo in a
    /// config file degrades to the default threshold instead of aborting.
    pub fn parse(name: &str) -> Level {
        let name = name.trim();
        if name.eq_ignore_ascii_case("DEBUG") {
            Level::Debug
        } else if name.eq_ignore_ascii_case("INFO") {
            Level::Info
        } else if name.eq_ignore_ascii_case("WARNING") {
            Level::Warning
        } else if name.eq_ignore_ascii_case("FATAL") || name.eq_ignore_ascii_case("ERROR") {
            Level::Fatal
        } else {
            Level::Info
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
