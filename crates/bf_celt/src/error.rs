//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// The leading marker matched neither byte order
    #[error("invalid magic {0:#010X}")]
    #[diagnostic(help("expected 0x42464144 (\"BFAD\") in either byte order"))]
    InvalidMagic(u32),

    /// The file ended before a block was complete
    #[error("out of data at offset {offset:#X}: wanted {wanted} bytes but {available} remain")]
    OutOfData {
        /// Absolute offset the read started at
        offset: usize,
        /// Number of bytes requested
        wanted: usize,
        /// Number of bytes left in the file
        available: usize,
    },

    /// A block does not have the padded length its header declares
    #[error("inconsistent {context}: declared {declared} bytes but found {actual}")]
    InconsistentCount {
        /// Which block
        context: &'static str,
        /// Padded size derived from the header
        declared: usize,
        /// Length of the block
        actual: usize,
    },

    /// A block is too long for the 32-bit sizes and offsets in the header
    #[error("{context} of {length} bytes does not fit a 32-bit container")]
    BlockTooLarge {
        /// Which block
        context: &'static str,
        /// Unpadded length of the block
        length: usize,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
