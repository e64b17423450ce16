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

use jiff::Zoned;

use crate::logging::Level;

/// The strftime format of record timestamps, in local time.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single log event, captured before it is rendered to text.
#[derive(Debug)]
pub struct Record<'a> {
    /// When the record was appended.
    pub time: Zoned,
    /// The record's severity.
    pub level: Level,
    /// The message text, without a trailing newline.
    pub message: &'a str,
}

/// Renders records as `<timestamp> [<LEVEL>] <message>` lines.
///
/// The most severe tier prints as `FATAL` by default; deployments that
/// prefer the traditional name can relabel it:
///
/// ```
/// use cpubench::logging::TextLayout;
///
/// let layout = TextLayout::default().fatal_label("ERROR");
/// ```
#[derive(Debug, Clone)]
pub struct TextLayout {
    fatal_label: Cow<'static, str>,
}

impl Default for TextLayout {
    fn default() -> Self {
        TextLayout {
            fatal_label: Cow::Borrowed(Level::Fatal.as_str()),
        }
    }
}

impl TextLayout {
    /// Overrides the label used for [`Level::Fatal`] records.
    ///
    /// Only the rendered text changes; filtering still orders the tier
    /// above [`Level::Warning`].
    #[must_use]
    pub fn fatal_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.fatal_label = label.into();
        self
    }

    /// Formats a record as a single line, without a trailing newline.
    pub fn format(&self, record: &Record<'_>) -> String {
        let time = record.time.strftime(TIMESTAMP_FORMAT);
        let level = match record.level {
            Level::Fatal => self.fatal_label.as_ref(),
            other => other.as_str(),
        };
        format!("{time} [{level}] {}", record.message)
    }
}
