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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use jiff::Zoned;

use crate::logging::Error;

/// The strftime format of archive-name timestamps, in local time.
///
/// Seconds granularity; two rotations inside the same second would map to
/// the same archive name, which is why rotation defers on collision.
const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Opens `path` for appending, creating it and its parent directories if
/// they do not exist yet.
pub(crate) fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().append(true).create(true).open(path)
}

/// Decides when the active log file is renamed aside and reopened.
///
/// The archive keeps the active file's full name and gains a local-time
/// suffix, e.g. `cpubench.log.2026-01-05-10-30-00`.
#[derive(Debug)]
pub(crate) struct RotationPolicy {
    path: PathBuf,
    max_file_size: u64,
}

impl RotationPolicy {
    pub(crate) fn new(path: PathBuf, max_file_size: u64) -> RotationPolicy {
        RotationPolicy {
            path,
            max_file_size,
        }
    }

    /// Rotates the active file if it has reached the size limit.
    ///
    /// Returns whether a rotation happened. If the archive name for the
    /// current second already exists, the rotation is deferred to a later
    /// check rather than overwriting the existing archive.
    ///
    /// On success `file` is replaced with a fresh handle to an empty active
    /// file. If reopening fails after the rename, the old handle is kept so
    /// that subsequent writes still land in the archived file; the next
    /// check then finds nothing at the active path, skips the rename, and
    /// retries the reopen.
    pub(crate) fn rotate_if_needed(&self, file: &mut File, now: &Zoned) -> Result<bool, Error> {
        let size = file.metadata()?.len();
        if size < self.max_file_size {
            return Ok(false);
        }

        // Nothing at the active path means an earlier rotation renamed it
        // aside but could not reopen; go straight to the reopen.
        if self.path.exists() {
            let archive = self.archive_path(now);
            if archive.exists() {
                return Ok(false);
            }
            fs::rename(&self.path, &archive)?;
        }
        *file = open_append(&self.path)?;
        Ok(true)
    }

    fn archive_path(&self, now: &Zoned) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{}", now.strftime(ARCHIVE_TIMESTAMP_FORMAT)));
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;

    fn fixed_time(text: &str) -> Zoned {
        text.parse().unwrap()
    }

    #[test]
    fn test_archive_name_keeps_full_filename() {
        let policy = RotationPolicy::new(PathBuf::from("/tmp/app.log"), 64);
        let archive = policy.archive_path(&fixed_time("2026-01-05T10:30:00[UTC]"));
        assert_eq!(
            archive,
            PathBuf::from("/tmp/app.log.2026-01-05-10-30-00")
        );
    }

    #[test]
    fn test_no_rotation_below_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut file = open_append(&path).unwrap();
        file.write_all(b"short\n").unwrap();

        let policy = RotationPolicy::new(path.clone(), 1024);
        let now = fixed_time("2026-01-05T10:30:00[UTC]");
        assert!(!policy.rotate_if_needed(&mut file, &now).unwrap());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_rotation_at_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut file = open_append(&path).unwrap();
        file.write_all(&[b'x'; 64]).unwrap();

        let policy = RotationPolicy::new(path.clone(), 64);
        let now = fixed_time("2026-01-05T10:30:00[UTC]");
        assert!(policy.rotate_if_needed(&mut file, &now).unwrap());

        let archive = dir.path().join("app.log.2026-01-05-10-30-00");
        assert_eq!(fs::read(&archive).unwrap().len(), 64);
        assert_eq!(fs::read(&path).unwrap().len(), 0);

        // The swapped-in handle must write to the new active file.
        file.write_all(b"fresh\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"fresh\n");
    }

    #[test]
    fn test_rotation_defers_on_archive_collision() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut file = open_append(&path).unwrap();
        file.write_all(&[b'x'; 64]).unwrap();

        let archive = dir.path().join("app.log.2026-01-05-10-30-00");
        fs::write(&archive, b"already archived").unwrap();

        let policy = RotationPolicy::new(path.clone(), 64);
        let now = fixed_time("2026-01-05T10:30:00[UTC]");
        assert!(!policy.rotate_if_needed(&mut file, &now).unwrap());

        // Neither file was touched.
        assert_eq!(fs::read(&archive).unwrap(), b"already archived");
        assert_eq!(fs::read(&path).unwrap().len(), 64);
    }

    #[test]
    fn test_reopen_is_retried_after_an_interrupted_rotation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut file = open_append(&path).unwrap();
        file.write_all(&[b'x'; 64]).unwrap();

        // A rotation that renamed the active file aside but could not
        // reopen it leaves the old handle in place and nothing at the
        // active path.
        let archive = dir.path().join("app.log.2026-01-05-10-30-00");
        fs::rename(&path, &archive).unwrap();

        let policy = RotationPolicy::new(path.clone(), 64);
        let now = fixed_time("2026-01-05T10:30:01[UTC]");
        assert!(policy.rotate_if_needed(&mut file, &now).unwrap());

        // The active file is back, empty, and owns subsequent writes; the
        // archive kept everything written through the stale handle, and no
        // second archive was made for data that is already archived.
        assert_eq!(fs::read(&path).unwrap().len(), 0);
        file.write_all(b"recovered\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"recovered\n");
        assert_eq!(fs::read(&archive).unwrap().len(), 64);
        assert!(!dir.path().join("app.log.2026-01-05-10-30-01").exists());
    }

    #[test]
    fn test_deferred_rotation_retries_next_second() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut file = open_append(&path).unwrap();
        file.write_all(&[b'x'; 64]).unwrap();

        let archive = dir.path().join("app.log.2026-01-05-10-30-00");
        fs::write(&archive, b"already archived").unwrap();

        let policy = RotationPolicy::new(path.clone(), 64);
        let collided = fixed_time("2026-01-05T10:30:00[UTC]");
        assert!(!policy.rotate_if_needed(&mut file, &collided).unwrap());

        let next_second = fixed_time("2026-01-05T10:30:01[UTC]");
        assert!(policy.rotate_if_needed(&mut file, &next_second).unwrap());
        assert!(dir.path().join("app.log.2026-01-05-10-30-01").exists());
        assert_eq!(fs::read(&path).unwrap().len(), 0);
    }
}
