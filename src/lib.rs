//! A from-scratch gzip/DEFLATE decompressor core (RFC 1951 + RFC 1952),
//! structured the way `streaming-libdeflate-rs` structures its own
//! decode path: a bit reader, a canonical Huffman table, three block
//! variants, a block-loop engine, and a gzip container wrapper around all
//! of it. Unlike the teacher crate this one decodes into a single
//! caller-provided buffer rather than a chunked stream -- see
//! `decompress_gzip` below.

pub mod bitstream;
pub mod decode_blocks;
pub mod decompress_deflate;
pub mod decompress_gzip;
mod decompress_utils;
mod deflate_constants;
mod gzip_constants;
pub mod unchecked;

use std::fmt;

pub use decompress_gzip::{decompress_gzip, decompress_gzip_ffi, inspect_gzip, DecompressResult, GzipInfo};

/// The three error kinds a core decode can produce, per the external
/// interface's legacy integer taxonomy (`OK`/`DATA_ERROR`/`BUF_ERROR`/
/// `FILE_ERROR`). `FileError` is never constructed by this crate -- it
/// exists so the `bin/gzipd` CLI collaborator can report open/read/write
/// failures through the same `From<&GzipError> for i32` mapping.
#[derive(Debug)]
pub enum GzipError {
    /// The compressed stream itself is malformed: bad magic/method,
    /// reserved flag bits, a bad Huffman code-length vector, a reserved
    /// block type or symbol, a back-reference past the produced output,
    /// or a trailer (CRC-32/ISIZE) mismatch.
    DataError(&'static str),
    /// The destination buffer is too small to hold the decompressed
    /// output.
    BufError,
    /// Reserved for CLI-level I/O failures; the core never returns this.
    FileError(String),
}

impl GzipError {
    pub const OK: i32 = 0;
    pub const DATA_ERROR: i32 = -3;
    pub const BUF_ERROR: i32 = -5;
    pub const FILE_ERROR: i32 = -7;
}

impl fmt::Display for GzipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GzipError::DataError(reason) => write!(f, "gzip data error: {reason}"),
            GzipError::BufError => write!(f, "destination buffer too small"),
            GzipError::FileError(msg) => write!(f, "file error: {msg}"),
        }
    }
}

impl std::error::Error for GzipError {}

impl From<&GzipError> for i32 {
    fn from(e: &GzipError) -> i32 {
        match e {
            GzipError::DataError(_) => GzipError::DATA_ERROR,
            GzipError::BufError => GzipError::BUF_ERROR,
            GzipError::FileError(_) => GzipError::FILE_ERROR,
        }
    }
}

/// Generalizes the teacher's `safety_check!` (which only ever bailed out
/// with a unit `BadData` variant) to attach a reason string to the
/// `DataError` it raises.
#[macro_export]
macro_rules! safety_check {
    ($cond:expr, $reason:expr) => {
        if !($cond) {
            return Err($crate::GzipError::DataError($reason));
        }
    };
}
