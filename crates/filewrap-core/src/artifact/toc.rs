//! Table of contents: the ordered list of embedded files.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// One embedded input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Base name of the input as raw bytes, used verbatim as the lookup key
    pub original_name: Vec<u8>,
    /// Identifier of the data constant holding the bytes
    pub identifier: String,
    /// Number of bytes read from the input
    pub byte_length: u64,
}

impl FileRecord {
    /// Creates a new record
    pub fn new(original_name: impl Into<Vec<u8>>, identifier: impl Into<String>, byte_length: u64) -> Self {
        Self {
            original_name: original_name.into(),
            identifier: identifier.into(),
            byte_length,
        }
    }

    /// The lookup key for display, with invalid UTF-8 replaced
    pub fn name_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.original_name)
    }
}

/// A row of the emitted table: a record or the terminating sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocRow<'a> {
    /// An embedded file
    Entry(&'a FileRecord),
    /// `{nullptr, nullptr, 0, {}}`
    Sentinel,
}

impl TocRow<'_> {
    /// Lookup key, `None` for the sentinel
    pub fn name(&self) -> Option<&[u8]> {
        match self {
            TocRow::Entry(r) => Some(r.original_name.as_slice()),
            TocRow::Sentinel => None,
        }
    }

    /// Data identifier, `None` for the sentinel
    pub fn data(&self) -> Option<&str> {
        match self {
            TocRow::Entry(r) => Some(&r.identifier),
            TocRow::Sentinel => None,
        }
    }

    /// Size in bytes, 0 for the sentinel
    pub fn size(&self) -> u64 {
        match self {
            TocRow::Entry(r) => r.byte_length,
            TocRow::Sentinel => 0,
        }
    }

    /// Returns true for the terminating row
    pub fn is_sentinel(&self) -> bool {
        matches!(self, TocRow::Sentinel)
    }
}

/// Append-only table of embedded files in command-line order.
///
/// The sentinel is never stored; [`Toc::rows`] appends it, so it is always
/// last and appears exactly once.
#[derive(Debug, Default)]
pub struct Toc {
    records: Vec<FileRecord>,
    by_identifier: HashMap<String, usize>,
    reject_collisions: bool,
}

impl Toc {
    /// Creates an empty table that accepts duplicate identifiers
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table that rejects duplicate identifiers
    pub fn rejecting_collisions() -> Self {
        Self {
            reject_collisions: true,
            ..Self::default()
        }
    }

    /// Fails if `identifier` is already taken and collisions are rejected.
    ///
    /// Lets the driver fail before any bytes of the colliding file are written.
    pub fn check_identifier(&self, original_name: &[u8], identifier: &str) -> Result<()> {
        if !self.reject_collisions {
            return Ok(());
        }
        match self.by_identifier.get(identifier) {
            Some(&index) => Err(Error::identifier_collision(
                identifier,
                self.records[index].name_lossy(),
                String::from_utf8_lossy(original_name),
            )),
            None => Ok(()),
        }
    }

    /// Appends a completed record
    pub fn push(&mut self, record: FileRecord) -> Result<()> {
        self.check_identifier(&record.original_name, &record.identifier)?;
        self.by_identifier
            .entry(record.identifier.clone())
            .or_insert(self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Number of real entries, excluding the sentinel
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no file has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The recorded files in insertion order
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// All table rows, sentinel included
    pub fn rows(&self) -> impl Iterator<Item = TocRow<'_>> + '_ {
        self.records
            .iter()
            .map(TocRow::Entry)
            .chain(std::iter::once(TocRow::Sentinel))
    }

    /// First record with the given lookup key
    pub fn find(&self, name: impl AsRef<[u8]>) -> Option<&FileRecord> {
        let name = name.as_ref();
        self.records.iter().find(|r| r.original_name == name)
    }

    /// Sum of all recorded byte lengths
    pub fn total_bytes(&self) -> u64 {
        self.records.iter().map(|r| r.byte_length).sum()
    }
}
