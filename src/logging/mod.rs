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

//! A concurrent, buffered logging subsystem with size-based file rotation.
//!
//! Producers append records through a [`Logger`]; records pass a severity
//! threshold, are rendered once as text, mirrored to the console, and held
//! in a bounded buffer. A background flusher periodically drains the buffer
//! to the log file and syncs it; when the active file outgrows its size
//! limit it is renamed aside with a timestamp suffix and restarted.
//!
//! There is no global logger. Construct one with [`Logger::builder`] and
//! hand out references; call [`Logger::shutdown`] to stop the flusher and
//! make everything durable.

mod clock;
mod error;
mod layout;
mod level;
mod logger;
mod rotation;
mod scheduler;
mod sink;

pub use error::Error;
pub use layout::Record;
pub use layout::TextLayout;
pub use level::Level;
pub use logger::DEFAULT_FLUSH_INTERVAL;
pub use logger::DEFAULT_MAX_BUFFER_SIZE;
pub use logger::DEFAULT_MAX_FILE_SIZE;
pub use logger::Logger;
pub use logger::LoggerBuilder;
