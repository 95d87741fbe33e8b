use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

use super::codec::{DirEntryKind, DirEntryRecord};
use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};

/// Consecutive read failures tolerated before a cursor gives up its handle
pub const DEFAULT_MAX_READ_FAILURES: u32 = 3;

/// An open directory handle that yields entries one at a time
///
/// A cursor is the unit of enumeration: exactly one owner, advanced by one
/// in-flight operation at a time (enforced by `&mut`). `close` is the
/// normative release; dropping an open cursor releases the handle too, but
/// only as a leak guard.
///
/// The underlying iterator has no replayable position token, so the cursor
/// carries a single-entry push-back slot instead: the batch reader stashes
/// the one entry it peeked but could not fit, and that entry is the first
/// one returned on the next call.
#[derive(Debug)]
pub struct DirectoryCursor {
    path: PathBuf,
    iter: Option<ReadDir>,
    lookahead: Option<DirEntryRecord>,
    deferred: Option<ScanError>,
    read_failures: u32,
    max_read_failures: u32,
}

impl DirectoryCursor {
    /// Opens a cursor over `path` with the default failure cap
    pub fn open(path: impl AsRef<Path>) -> ScanResult<Self> {
        Self::open_with_limit(path, DEFAULT_MAX_READ_FAILURES)
    }

    /// Opens a cursor with the failure cap taken from `config`
    pub fn open_with(path: impl AsRef<Path>, config: &ScanConfig) -> ScanResult<Self> {
        Self::open_with_limit(path, config.max_read_failures)
    }

    fn open_with_limit(path: impl AsRef<Path>, max_read_failures: u32) -> ScanResult<Self> {
        let path = path.as_ref().to_path_buf();
        let iter = fs::read_dir(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ScanError::not_found(&path),
            io::ErrorKind::PermissionDenied => ScanError::permission_denied(&path),
            io::ErrorKind::NotADirectory => ScanError::not_a_directory(&path),
            _ => ScanError::Io(e),
        })?;
        trace!("Opened directory cursor: {}", path.display());

        Ok(Self {
            path,
            iter: Some(iter),
            lookahead: None,
            deferred: None,
            read_failures: 0,
            max_read_failures,
        })
    }

    /// The directory this cursor enumerates
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the cursor still holds its directory handle
    pub fn is_open(&self) -> bool {
        self.iter.is_some()
    }

    /// Releases the directory handle; safe to call any number of times
    pub fn close(&mut self) {
        if self.iter.take().is_some() {
            trace!("Closed directory cursor: {}", self.path.display());
        }
        self.lookahead = None;
        self.deferred = None;
    }

    /// Advances the cursor by one entry
    ///
    /// `Ok(None)` means the directory is exhausted. `"."` and `".."` never
    /// appear in the stream. Delivery order is the pushed-back entry first,
    /// then any error deferred by a previous partial batch, then the OS
    /// stream.
    pub fn next_entry(&mut self) -> ScanResult<Option<DirEntryRecord>> {
        if let Some(record) = self.lookahead.take() {
            return Ok(Some(record));
        }
        if let Some(err) = self.deferred.take() {
            return Err(err);
        }
        let iter = self.iter.as_mut().ok_or(ScanError::AlreadyClosed)?;

        loop {
            match iter.next() {
                None => return Ok(None),
                Some(Ok(entry)) => {
                    let name = entry.file_name().into_encoded_bytes();
                    if matches!(name.as_slice(), b"." | b"..") {
                        continue;
                    }
                    // An unreadable type hint degrades to Unknown; the
                    // caller stats if it needs certainty
                    let kind = entry
                        .file_type()
                        .map(DirEntryKind::from_file_type)
                        .unwrap_or(DirEntryKind::Unknown);
                    self.read_failures = 0;
                    return Ok(Some(DirEntryRecord { kind, name }));
                }
                Some(Err(e)) => {
                    self.note_read_failure();
                    return Err(ScanError::TransientIo(e));
                }
            }
        }
    }

    /// Pushes one entry back; it becomes the next entry returned
    ///
    /// At most one entry may be pending at a time.
    pub(crate) fn unread(&mut self, record: DirEntryRecord) {
        debug_assert!(
            self.lookahead.is_none(),
            "only one entry may be pushed back"
        );
        self.lookahead = Some(record);
    }

    /// Parks an error to be surfaced by the next `next_entry` call
    pub(crate) fn defer(&mut self, err: ScanError) {
        debug_assert!(self.deferred.is_none(), "only one error may be deferred");
        self.deferred = Some(err);
    }

    fn note_read_failure(&mut self) {
        self.read_failures += 1;
        if self.read_failures >= self.max_read_failures {
            warn!(
                "Giving up on {} after {} consecutive read failures",
                self.path.display(),
                self.read_failures
            );
            self.iter = None;
        }
    }
}

impl Drop for DirectoryCursor {
    fn drop(&mut self) {
        if self.iter.is_some() {
            trace!(
                "Directory cursor dropped while open: {}",
                self.path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_directory() {
        let dir = tempdir().unwrap();
        let err = DirectoryCursor::open(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, ScanError::NotFound(_)));
    }

    #[test]
    fn test_open_file_is_not_a_directory() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("plain.txt");
        File::create(&file_path).unwrap();

        let err = DirectoryCursor::open(&file_path).unwrap_err();
        assert!(matches!(
            err,
            ScanError::NotADirectory(_) | ScanError::Io(_)
        ));
    }

    #[test]
    fn test_enumerates_without_dot_entries() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.txt")).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let mut cursor = DirectoryCursor::open(dir.path()).unwrap();
        let mut seen = Vec::new();
        while let Some(record) = cursor.next_entry().unwrap() {
            assert_ne!(record.name, b".");
            assert_ne!(record.name, b"..");
            seen.push((record.name_lossy().into_owned(), record.kind));
        }
        seen.sort();

        assert_eq!(
            seen,
            vec![
                ("a.txt".to_string(), DirEntryKind::RegularFile),
                ("sub".to_string(), DirEntryKind::Directory),
            ]
        );
    }

    #[test]
    fn test_exhausted_cursor_stays_exhausted() {
        let dir = tempdir().unwrap();
        let mut cursor = DirectoryCursor::open(dir.path()).unwrap();
        assert!(cursor.next_entry().unwrap().is_none());
        assert!(cursor.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut cursor = DirectoryCursor::open(dir.path()).unwrap();
        assert!(cursor.is_open());

        cursor.close();
        assert!(!cursor.is_open());
        cursor.close();
        assert!(!cursor.is_open());
    }

    #[test]
    fn test_use_after_close() {
        let dir = tempdir().unwrap();
        let mut cursor = DirectoryCursor::open(dir.path()).unwrap();
        cursor.close();

        let err = cursor.next_entry().unwrap_err();
        assert!(matches!(err, ScanError::AlreadyClosed));
    }

    #[test]
    fn test_unread_is_returned_first() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("first")).unwrap();

        let mut cursor = DirectoryCursor::open(dir.path()).unwrap();
        let record = cursor.next_entry().unwrap().unwrap();
        cursor.unread(record.clone());

        let again = cursor.next_entry().unwrap().unwrap();
        assert_eq!(again, record);
        assert!(cursor.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_deferred_error_surfaces_once() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("only")).unwrap();

        let mut cursor = DirectoryCursor::open(dir.path()).unwrap();
        cursor.defer(ScanError::TransientIo(io::Error::other("stale handle")));

        let err = cursor.next_entry().unwrap_err();
        assert!(matches!(err, ScanError::TransientIo(_)));

        // The stream resumes after the deferred error is consumed
        let record = cursor.next_entry().unwrap().unwrap();
        assert_eq!(record.name, b"only");
    }

    #[test]
    fn test_unread_precedes_deferred_error() {
        let dir = tempdir().unwrap();
        let mut cursor = DirectoryCursor::open(dir.path()).unwrap();
        cursor.unread(DirEntryRecord::new(DirEntryKind::RegularFile, &b"kept"[..]));
        cursor.defer(ScanError::TransientIo(io::Error::other("later")));

        assert_eq!(cursor.next_entry().unwrap().unwrap().name, b"kept");
        assert!(cursor.next_entry().is_err());
    }

    #[test]
    fn test_read_failure_cap_poisons_cursor() {
        let dir = tempdir().unwrap();
        let mut cursor = DirectoryCursor::open(dir.path()).unwrap();

        for _ in 0..DEFAULT_MAX_READ_FAILURES {
            cursor.note_read_failure();
        }
        assert!(!cursor.is_open());
        assert!(matches!(
            cursor.next_entry().unwrap_err(),
            ScanError::AlreadyClosed
        ));
    }
}
