//! FASTA payloads returned by allele endpoints.

use std::fmt;
use std::io::Cursor;

use seq_io::fasta::{Reader, Record};
use serde::Serialize;

use crate::error::{BigsdbError, Result};

/// One FASTA record with its sequence lines joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FastaRecord {
    pub id: String,
    pub description: Option<String>,
    pub sequence: String,
}

impl fmt::Display for FastaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(desc) => writeln!(f, ">{} {}", self.id, desc)?,
            None => writeln!(f, ">{}", self.id)?,
        }
        write!(f, "{}", self.sequence)
    }
}

/// Lazy iterator over the records of a fetched FASTA payload.
///
/// Records are parsed one at a time as the iterator is advanced. The iterator
/// is finite and cannot be restarted; it yields `None` after the last record
/// or after the first parse error.
pub struct AlleleFasta {
    reader: Reader<Cursor<Vec<u8>>>,
    done: bool,
}

impl AlleleFasta {
    pub fn from_text(text: String) -> Self {
        Self {
            reader: Reader::new(Cursor::new(text.into_bytes())),
            done: false,
        }
    }

    /// Drain the iterator, failing on the first malformed record.
    pub fn collect_records(self) -> Result<Vec<FastaRecord>> {
        self.collect()
    }
}

impl fmt::Debug for AlleleFasta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlleleFasta")
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Iterator for AlleleFasta {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let record = match self.reader.next() {
            None => {
                self.done = true;
                return None;
            }
            Some(Err(e)) => {
                self.done = true;
                return Some(Err(e.into()));
            }
            Some(Ok(record)) => record,
        };

        let id = match record.id() {
            Ok(id) => id.to_string(),
            Err(e) => {
                self.done = true;
                return Some(Err(BigsdbError::shape("FastaRecord", e)));
            }
        };
        let description = match record.desc() {
            Some(Ok(desc)) => Some(desc.to_string()),
            Some(Err(e)) => {
                self.done = true;
                return Some(Err(BigsdbError::shape("FastaRecord", e)));
            }
            None => None,
        };

        let mut sequence = String::new();
        for line in record.seq_lines() {
            sequence.extend(
                line.iter()
                    .filter(|b| !b.is_ascii_whitespace())
                    .map(|&b| b as char),
            );
        }

        Some(Ok(FastaRecord {
            id,
            description,
            sequence,
        }))
    }
}

/// Turn the contents of a sequence file into a query payload.
///
/// FASTA input is checked and sent as-is so each contig keeps its header;
/// anything else is taken as one raw sequence with whitespace removed.
pub fn sequence_from_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if !trimmed.starts_with('>') {
        return Ok(trimmed.split_whitespace().collect());
    }
    AlleleFasta::from_text(trimmed.to_string()).try_for_each(|record| record.map(|_| ()))?;
    Ok(trimmed.to_string())
}
