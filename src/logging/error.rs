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

use std::io;
use std::path::PathBuf;

/// Errors that can occur when constructing or driving a [`Logger`].
///
/// [`Logger`]: crate::logging::Logger
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backing log file could not be opened for appending.
    #[error("failed to open log file {}: {source}", .path.display())]
    Open {
        /// The path that failed to open.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },
    /// An error occurred while performing an IO action.
    #[error("failed to perform IO action: {0}")]
    Io(#[from] io::Error),
}
