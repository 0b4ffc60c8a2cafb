//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::hash::HashKey;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent warpper for [`std::str::Utf8Error`]
    #[error(transparent)]
    Utf8Error(#[from] std::str::Utf8Error),

    /// The leading marker matched neither byte order
    #[error("invalid magic {0:#010X}")]
    #[diagnostic(help("expected 0x52494646 (\"RIFF\") in either byte order"))]
    InvalidMagic(u32),

    /// A record carried a discriminator with no registered decoder
    #[error("unknown record type {0}")]
    UnknownRecordType(HashKey),

    /// A string table record named a locale outside the known set
    #[error("unknown locale code {0}")]
    #[diagnostic(help("locale codes run from 0 (enUS) to 5 (frFR)"))]
    UnknownLocale(u32),

    /// A read went past the end of the buffer
    #[error("out of data at offset {offset:#X}: wanted {wanted} bytes but {available} remain")]
    OutOfData {
        /// Absolute offset the read started at
        offset: usize,
        /// Number of bytes requested
        wanted: usize,
        /// Number of bytes left in the buffer
        available: usize,
    },

    /// A declared count or size disagrees with the data that follows it
    #[error("inconsistent {context}: declared {declared} but found {actual}")]
    InconsistentCount {
        /// What was being counted
        context: &'static str,
        /// Value stored in the file
        declared: usize,
        /// Value observed while decoding
        actual: usize,
    },

    /// A fixed header word did not hold its known constant
    #[error("unexpected {field}: expected {expected:#X}, found {actual:#X}")]
    UnexpectedValue {
        /// Name of the validated field
        field: &'static str,
        /// The known constant
        expected: u64,
        /// The value read from the file
        actual: u64,
    },

    /// A chunk was not where the index said it would be, or had the wrong tag
    #[error("invalid chunk at offset {offset:#X}: {reason}")]
    InvalidChunk {
        /// Absolute offset of the chunk
        offset: usize,
        /// What was wrong with it
        reason: String,
    },

    /// A name does not fit into its fixed-size field
    #[error("name of {length} bytes does not fit into a {capacity} byte field")]
    NameTooLong {
        /// Length of the rejected name
        length: usize,
        /// Size of the field including the terminator
        capacity: usize,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
