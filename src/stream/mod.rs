//! Batched directory enumeration over a compact binary record stream.
//!
//! Listing a large tree one entry at a time pays the crossing cost (syscall,
//! FFI hop, channel send) per entry. This module amortizes it: a
//! [`DirectoryCursor`] owns the open handle, and a [`BatchReader`] packs as
//! many whole entries as fit into a caller-owned buffer per call, with no
//! allocation on the hot path.
//!
//! Each record on the wire is:
//!
//! ```text
//! byte 0      : kind tag (0=Unknown, 1=RegularFile, 2=Directory, 3=Symlink, 4=Other)
//! bytes 1..2  : name length N, u16 little-endian
//! bytes 3..3+N: name bytes, no terminator, not validated as text
//! ```
//!
//! A batch is a sequence of whole records; `fill` never splits one across a
//! buffer boundary. An entry that does not fit is pushed back into the
//! cursor and leads the next batch. A 0-byte batch means the directory is
//! exhausted, nothing else.

pub mod codec;
pub mod cursor;
pub mod reader;

pub use codec::{
    decode, encode, encoded_len, entries, BatchEntries, DirEntryKind, DirEntryRecord, HEADER_LEN,
    MAX_NAME_LEN, MIN_RECORD_LEN,
};
pub use cursor::{DirectoryCursor, DEFAULT_MAX_READ_FAILURES};
pub use reader::BatchReader;
