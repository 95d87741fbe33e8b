use std::borrow::Cow;
use std::fs::FileType;

use crate::errors::{ScanError, ScanResult};

/// Fixed header size: one kind tag byte plus a little-endian u16 name length
pub const HEADER_LEN: usize = 3;

/// Smallest record a filled batch can contain: header plus a one-byte name
pub const MIN_RECORD_LEN: usize = 4;

/// Longest name the u16 length field can carry
pub const MAX_NAME_LEN: usize = u16::MAX as usize;

/// Type hint reported by the OS for a directory entry
///
/// The hint is advisory: `Unknown` means the caller must stat the entry to
/// learn its type, and even the other values reflect what the OS reported at
/// enumeration time, not a guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum DirEntryKind {
    Unknown = 0,
    RegularFile = 1,
    Directory = 2,
    Symlink = 3,
    Other = 4,
}

impl DirEntryKind {
    /// The wire tag for this kind
    pub fn as_tag(self) -> u8 {
        self as u8
    }

    /// Parses a wire tag back into a kind
    pub fn from_tag(tag: u8) -> ScanResult<Self> {
        match tag {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::RegularFile),
            2 => Ok(Self::Directory),
            3 => Ok(Self::Symlink),
            4 => Ok(Self::Other),
            other => Err(ScanError::InvalidKindTag(other)),
        }
    }

    pub(crate) fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_file() {
            Self::RegularFile
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }
}

/// One directory entry as produced by a cursor
///
/// Names are raw bytes as reported by the OS, never `"."` or `".."`, and are
/// not validated as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryRecord {
    pub kind: DirEntryKind,
    pub name: Vec<u8>,
}

impl DirEntryRecord {
    pub fn new(kind: DirEntryKind, name: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Bytes this record occupies on the wire
    pub fn encoded_len(&self) -> usize {
        encoded_len(&self.name)
    }

    /// Name for display purposes; lossy on non-UTF-8 names
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

/// Bytes needed to encode an entry with the given name
pub fn encoded_len(name: &[u8]) -> usize {
    HEADER_LEN + name.len()
}

/// Encodes one record at the start of `buf`, returning the bytes written
///
/// The caller must reserve `encoded_len(name)` bytes. Names longer than
/// `MAX_NAME_LEN` are rejected before anything is written.
pub fn encode(kind: DirEntryKind, name: &[u8], buf: &mut [u8]) -> ScanResult<usize> {
    if name.len() > MAX_NAME_LEN {
        return Err(ScanError::name_too_long(name.len()));
    }
    let len = HEADER_LEN + name.len();
    assert!(
        buf.len() >= len,
        "encode requires encoded_len() bytes of room"
    );

    buf[0] = kind.as_tag();
    buf[1..HEADER_LEN].copy_from_slice(&(name.len() as u16).to_le_bytes());
    buf[HEADER_LEN..len].copy_from_slice(name);
    Ok(len)
}

/// Decodes one record from the start of `buf`
///
/// Returns the kind, the name borrowed out of `buf`, and the bytes consumed.
pub fn decode(buf: &[u8]) -> ScanResult<(DirEntryKind, &[u8], usize)> {
    if buf.len() < HEADER_LEN {
        return Err(ScanError::truncated_record(HEADER_LEN, buf.len()));
    }
    let kind = DirEntryKind::from_tag(buf[0])?;
    let name_len = u16::from_le_bytes([buf[1], buf[2]]) as usize;
    let len = HEADER_LEN + name_len;
    if buf.len() < len {
        return Err(ScanError::truncated_record(len, buf.len()));
    }
    Ok((kind, &buf[HEADER_LEN..len], len))
}

/// Iterator over the records of a filled batch
///
/// Walks a region previously produced by `BatchReader::fill`; a malformed
/// record yields one error and ends iteration.
pub struct BatchEntries<'a> {
    buf: &'a [u8],
}

impl<'a> Iterator for BatchEntries<'a> {
    type Item = ScanResult<(DirEntryKind, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.is_empty() {
            return None;
        }
        match decode(self.buf) {
            Ok((kind, name, used)) => {
                self.buf = &self.buf[used..];
                Some(Ok((kind, name)))
            }
            Err(e) => {
                self.buf = &[];
                Some(Err(e))
            }
        }
    }
}

/// Returns an iterator over the records in `batch`
pub fn entries(batch: &[u8]) -> BatchEntries<'_> {
    BatchEntries { buf: batch }
}
