//! Utility functions for file operations and path manipulation

use crate::error::{ArchiveError, Error, Result};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Maximum number of numbered names tried after the timestamped one
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Candidate destination names, in the order they are tried
///
/// The desired path comes first, then `{stem}_{stamp}{.ext}`, then
/// `{stem}_{stamp}_{n}{.ext}` for n = 1..=9999. The stamp is normally the local
/// time as `HHMMSS`, so names stay ordered by archive time.
///
/// # Examples
///
/// ```
/// use review_orchestrator::utils::destination_candidates;
/// use std::path::Path;
///
/// let names: Vec<_> = destination_candidates(Path::new("/bin/export.csv"), "061500")
///     .unwrap()
///     .take(3)
///     .collect();
/// assert_eq!(names[0], Path::new("/bin/export.csv"));
/// assert_eq!(names[1], Path::new("/bin/export_061500.csv"));
/// assert_eq!(names[2], Path::new("/bin/export_061500_1.csv"));
/// ```
pub fn destination_candidates(
    path: &Path,
    stamp: &str,
) -> Result<impl Iterator<Item = PathBuf> + use<>> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            Error::Archive(ArchiveError::InvalidPath {
                path: path.to_path_buf(),
                reason: "Cannot extract file stem".to_string(),
            })
        })?
        .to_string();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let parent = path
        .parent()
        .ok_or_else(|| {
            Error::Archive(ArchiveError::InvalidPath {
                path: path.to_path_buf(),
                reason: "Cannot extract parent directory".to_string(),
            })
        })?
        .to_path_buf();

    let first = path.to_path_buf();
    let stamp = stamp.to_string();
    let stamped = parent.join(format!("{stem}_{stamp}{extension}"));
    let numbered = (1..=MAX_RENAME_ATTEMPTS)
        .map(move |n| parent.join(format!("{stem}_{stamp}_{n}{extension}")));

    Ok(std::iter::once(first)
        .chain(std::iter::once(stamped))
        .chain(numbered))
}

/// Move `source` to `destination` without ever replacing an existing file
///
/// Each candidate name from [`destination_candidates`] is first reserved with an
/// exclusive create, so a concurrent writer cannot claim it between the check and
/// the move. The source is then renamed over the reservation. When the rename
/// crosses filesystems the file is copied and the source removed afterwards. On
/// failure the reservation is removed and the source is left where it was.
///
/// Returns the path the file ended up at.
pub fn move_without_overwrite(source: &Path, destination: &Path, stamp: &str) -> Result<PathBuf> {
    let move_failed = |dest: &Path, reason: String| {
        Error::Archive(ArchiveError::MoveFailed {
            source_path: source.to_path_buf(),
            dest_path: dest.to_path_buf(),
            reason,
        })
    };

    let metadata = fs::metadata(source)
        .map_err(|e| move_failed(destination, format!("source unavailable: {e}")))?;
    if !metadata.is_file() {
        return Err(move_failed(destination, "source is not a file".to_string()));
    }

    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| move_failed(destination, format!("cannot create directory: {e}")))?;
    }

    for candidate in destination_candidates(destination, stamp)? {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!(?candidate, "destination taken, trying next name");
                continue;
            }
            Err(e) => return Err(move_failed(&candidate, format!("cannot reserve name: {e}"))),
        }

        return match fs::rename(source, &candidate) {
            Ok(()) => Ok(candidate),
            Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                copy_then_remove(source, &candidate).map_err(|reason| {
                    move_failed(&candidate, with_release_note(reason, &candidate))
                })?;
                Ok(candidate)
            }
            Err(e) => Err(move_failed(
                &candidate,
                with_release_note(e.to_string(), &candidate),
            )),
        };
    }

    Err(Error::Archive(ArchiveError::FileCollision {
        path: destination.to_path_buf(),
        reason: format!("Could not find unique filename after {MAX_RENAME_ATTEMPTS} attempts"),
    }))
}

/// Delete a reserved name after a failed move, appending a note to `reason` if
/// the placeholder could not be removed
fn with_release_note(reason: String, candidate: &Path) -> String {
    match fs::remove_file(candidate) {
        Ok(()) => reason,
        Err(e) => {
            tracing::warn!(?candidate, error = %e, "could not remove reserved destination");
            format!("{reason}; empty placeholder left at {}", candidate.display())
        }
    }
}

fn copy_then_remove(source: &Path, destination: &Path) -> std::result::Result<(), String> {
    fs::copy(source, destination).map_err(|e| format!("cross-device copy failed: {e}"))?;
    if let Err(e) = fs::remove_file(source) {
        // The copy is complete; a leftover source is a duplicate, not a loss.
        tracing::warn!(?source, ?destination, error = %e, "copied file but could not remove source");
    }
    Ok(())
}
