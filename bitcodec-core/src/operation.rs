//! Top-level operation guard.
//!
//! File codecs return `Result<Outcome<Summary>>`. The string entry points
//! wrap them with [`run_reported`], which turns every exit path into the
//! report string shown to the user:
//!
//! | Result | Report |
//! |---|---|
//! | `Ok(Completed(summary))` | `summary.to_string()` |
//! | `Ok(Cancelled)` | empty string |
//! | `Err(EmptyInput)` | `"Encoding failed. Cannot encode an empty file"` |
//! | any other `Err` | error text dumped to a file, generic failure message |

use crate::error::{BitCodecError, Result};
use crate::progress::Outcome;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether an operation produces or consumes encoded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Produces encoded output.
    Encode,
    /// Consumes encoded input.
    Decode,
}

impl Direction {
    fn gerund(self) -> &'static str {
        match self {
            Direction::Encode => "Encoding",
            Direction::Decode => "Decoding",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Direction::Encode => "encode",
            Direction::Decode => "decode",
        }
    }
}

/// Identity of a reported operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationKind {
    /// Short name used for the dump file, e.g. `"hamming-decoder"`.
    pub name: &'static str,
    /// Encode or decode wording.
    pub direction: Direction,
    /// `(gerund, verb)` replacing the direction's wording in failure reports.
    pub wording: Option<(&'static str, &'static str)>,
}

impl OperationKind {
    /// Prefix-code compression.
    pub const COMPRESS: Self = Self::new("encoder", Direction::Encode);
    /// Prefix-code decompression.
    pub const DECOMPRESS: Self = Self::new("decoder", Direction::Decode);
    /// Hamming encoding.
    pub const HAMMING_ENCODE: Self = Self::new("hamming-encoder", Direction::Encode);
    /// Hamming decoding.
    pub const HAMMING_DECODE: Self = Self::new("hamming-decoder", Direction::Decode);
    /// CRC encoding.
    pub const CRC_ENCODE: Self = Self::new("crc-encoder", Direction::Encode);
    /// CRC decoding.
    pub const CRC_DECODE: Self = Self::new("crc-decoder", Direction::Decode);
    /// Error infusion.
    pub const INFUSE: Self = Self::new("error-infuser", Direction::Encode)
        .with_wording("Infusing errors", "infuse errors into");

    /// Describe an operation.
    pub const fn new(name: &'static str, direction: Direction) -> Self {
        Self {
            name,
            direction,
            wording: None,
        }
    }

    /// Use `gerund` ("Infusing errors") and `verb` ("infuse errors into")
    /// in failure reports instead of the encode/decode wording.
    pub const fn with_wording(mut self, gerund: &'static str, verb: &'static str) -> Self {
        self.wording = Some((gerund, verb));
        self
    }

    fn gerund(&self) -> &'static str {
        self.wording.map_or(self.direction.gerund(), |(gerund, _)| gerund)
    }

    fn verb(&self) -> &'static str {
        self.wording.map_or(self.direction.verb(), |(_, verb)| verb)
    }

    /// Report for an empty source file.
    pub fn empty_input_message(&self) -> String {
        format!("{} failed. Cannot {} an empty file", self.gerund(), self.verb())
    }

    /// Report for any other failure.
    pub fn failure_message(&self) -> String {
        format!(
            "{} failed. Details are in the {} error dump file",
            self.gerund(),
            self.name.replace('-', " ")
        )
    }
}

/// Side channel receiving the verbatim text of unexpected errors.
#[derive(Debug, Clone)]
pub struct DiagnosticDump {
    path: PathBuf,
}

impl DiagnosticDump {
    /// Dump file for `kind` inside `dir`.
    pub fn new(dir: impl AsRef<Path>, kind: &OperationKind) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}-error-dump.txt", kind.name)),
        }
    }

    /// Location of the dump file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the dump file with `error`'s text.
    pub fn write(&self, error: &dyn fmt::Display) -> Result<()> {
        fs::write(&self.path, error.to_string())?;
        Ok(())
    }
}

/// Final path component of `path`, used to name files in report strings.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run `op` and convert every outcome into a report string.
pub fn run_reported<T, F>(kind: OperationKind, dump_dir: &Path, op: F) -> String
where
    T: fmt::Display,
    F: FnOnce() -> Result<Outcome<T>>,
{
    match op() {
        Ok(Outcome::Completed(summary)) => {
            let report = summary.to_string();
            log::info!("{} finished: {}", kind.name, report.replace('\n', " "));
            report
        }
        Ok(Outcome::Cancelled) => {
            log::info!("{} cancelled", kind.name);
            String::new()
        }
        Err(BitCodecError::EmptyInput) => {
            log::warn!("{} rejected an empty input file", kind.name);
            kind.empty_input_message()
        }
        Err(err) => {
            log::error!("{} failed: {}", kind.name, err);
            let dump = DiagnosticDump::new(dump_dir, &kind);
            if let Err(dump_err) = dump.write(&err) {
                log::warn!(
                    "could not write dump file {}: {}",
                    dump.path().display(),
                    dump_err
                );
            }
            kind.failure_message()
        }
    }
}
