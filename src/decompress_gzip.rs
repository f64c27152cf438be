/*
 * gzip container framing (RFC 1952): magic/flags/method validation,
 * the optional FEXTRA/FNAME/FCOMMENT/FHCRC fields, and the trailing
 * CRC-32 + ISIZE check around the DEFLATE payload decoded by
 * `decompress_deflate::inflate`.
 *
 * Mirrors the shape of the teacher's `libdeflate_gzip_decompress`, but
 * operates over a plain in-memory `&[u8]` source and `&mut [u8]`
 * destination rather than the teacher's chunked streaming I/O traits,
 * per this crate's "whole buffer in, whole buffer out" scope.
 */

use crate::bitstream::BitReader;
use crate::decompress_deflate::{inflate, OutputCursor};
use crate::gzip_constants::*;
use crate::safety_check;
use crate::GzipError;
use crc32fast::Hasher;
use log::{debug, warn};

/// Header fields extracted by `parse_header`, plus `dist`: the byte
/// offset in the source at which the DEFLATE payload begins.
struct GzipHeader {
    dist: usize,
    mtime: u32,
    original_filename: Option<String>,
}

/// Everything `inspect_gzip` hands back to a caller: header metadata and
/// the trailer's recorded size/checksum, without running the inflater.
#[derive(Debug, Clone)]
pub struct GzipInfo {
    pub mtime: u32,
    pub original_filename: Option<String>,
    pub uncompressed_size: u32,
    pub crc32: u32,
}

/// The external-interface-compatible shape of `decompress_gzip`'s result:
/// bytes written so far (even on failure -- see scenario 6 of the
/// testable-properties section) paired with the legacy integer error
/// code.
pub struct DecompressResult {
    pub bytes_written: usize,
    pub error_code: i32,
}

fn parse_header(src: &[u8]) -> Result<GzipHeader, GzipError> {
    if src.len() < GZIP_MIN_OVERHEAD {
        return Err(GzipError::DataError("input too small to be gzip"));
    }
    if src[0] != GZIP_ID1 || src[1] != GZIP_ID2 {
        return Err(GzipError::DataError("bad gzip magic"));
    }
    if src[2] != GZIP_CM_DEFLATE {
        return Err(GzipError::DataError("unsupported compression method"));
    }
    let flg = src[3];
    if flg & GZIP_FRESERVED != 0 {
        return Err(GzipError::DataError("reserved gzip flag bits set"));
    }
    let mtime = u32::from_le_bytes([src[4], src[5], src[6], src[7]]);
    /* src[8] = XFL, src[9] = OS: both ignored. */

    let mut pos = GZIP_MIN_HEADER_SIZE;

    if flg & GZIP_FEXTRA != 0 {
        safety_check!(pos + 2 <= src.len(), "truncated FEXTRA length");
        let xlen = u16::from_le_bytes([src[pos], src[pos + 1]]) as usize;
        pos += 2;
        safety_check!(
            xlen <= src.len().saturating_sub(12),
            "FEXTRA length overruns source"
        );
        safety_check!(pos + xlen <= src.len(), "FEXTRA field overruns source");
        pos += xlen;
    }

    let mut original_filename = None;
    if flg & GZIP_FNAME != 0 {
        let start = pos;
        while pos < src.len() && src[pos] != 0 {
            pos += 1;
        }
        safety_check!(pos < src.len(), "unterminated FNAME field");
        original_filename = Some(String::from_utf8_lossy(&src[start..pos]).into_owned());
        pos += 1;
    }

    if flg & GZIP_FCOMMENT != 0 {
        while pos < src.len() && src[pos] != 0 {
            pos += 1;
        }
        safety_check!(pos < src.len(), "unterminated FCOMMENT field");
        pos += 1;
    }

    if flg & GZIP_FHCRC != 0 {
        safety_check!(pos + 2 <= src.len(), "truncated FHCRC field");
        let stored = u16::from_le_bytes([src[pos], src[pos + 1]]);
        let mut hasher = Hasher::new();
        hasher.update(&src[0..pos]);
        let computed = (hasher.finalize() & 0xFFFF) as u16;
        if stored != computed {
            return Err(GzipError::DataError("gzip header CRC-16 mismatch"));
        }
        pos += 2;
    }

    safety_check!(
        pos <= src.len() - GZIP_FOOTER_SIZE,
        "gzip header runs past the trailer"
    );

    Ok(GzipHeader {
        dist: pos,
        mtime,
        original_filename,
    })
}

/// Decodes the DEFLATE payload and checks the trailer, returning the
/// number of bytes written to `dest` regardless of whether the final
/// result is `Ok` or `Err` -- callers that need the external-interface
/// shape (bytes_written always populated) should use
/// [`decompress_gzip_ffi`]; idiomatic callers should use
/// [`decompress_gzip`].
fn decompress_gzip_inner(compressed: &[u8], dest: &mut [u8]) -> (usize, Result<(), GzipError>) {
    let header = match parse_header(compressed) {
        Ok(h) => h,
        Err(e) => return (0, Err(e)),
    };

    let payload_end = compressed.len() - GZIP_FOOTER_SIZE;
    if header.dist > payload_end {
        return (0, Err(GzipError::DataError("gzip header runs past the trailer")));
    }

    let mut br = BitReader::new(compressed, header.dist, payload_end);
    let mut out = OutputCursor::new(dest);

    if let Err(e) = inflate(&mut br, &mut out) {
        warn!("inflate failed after {} bytes: {e}", out.written());
        return (out.written(), Err(e));
    }

    let written = out.written();
    let trailer = &compressed[payload_end..payload_end + GZIP_FOOTER_SIZE];
    let crc_expected = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let isize_expected = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

    let mut hasher = Hasher::new();
    hasher.update(&dest[0..written]);
    let crc_actual = hasher.finalize();

    if crc_actual != crc_expected {
        warn!("CRC-32 mismatch: expected {crc_expected:#010x}, got {crc_actual:#010x}");
        return (written, Err(GzipError::DataError("CRC-32 mismatch")));
    }
    if written as u32 != isize_expected {
        warn!("ISIZE mismatch: expected {isize_expected}, wrote {written}");
        return (written, Err(GzipError::DataError("ISIZE mismatch")));
    }

    debug!("decompressed {written} bytes, CRC and ISIZE verified");
    (written, Ok(()))
}

/// Decompress a single gzip member held entirely in `compressed` into
/// `dest`, verifying the header, inflating the DEFLATE payload, and
/// checking the trailing CRC-32 and ISIZE. Returns the number of bytes
/// written on success.
pub fn decompress_gzip(compressed: &[u8], dest: &mut [u8]) -> Result<usize, GzipError> {
    let (written, result) = decompress_gzip_inner(compressed, dest);
    result.map(|()| written)
}

/// External-interface-compatible entry point: always reports
/// `bytes_written`, even when `error_code != OK`, matching the reference
/// signature `decompress_gzip(compressed_bytes, dest_buffer) ->
/// {bytes_written, error_code}`.
pub fn decompress_gzip_ffi(compressed: &[u8], dest: &mut [u8]) -> DecompressResult {
    let (bytes_written, result) = decompress_gzip_inner(compressed, dest);
    let error_code = match &result {
        Ok(()) => GzipError::OK,
        Err(e) => i32::from(e),
    };
    DecompressResult {
        bytes_written,
        error_code,
    }
}

/// Reads only the gzip header and trailer -- mtime, original filename,
/// uncompressed size and CRC-32 -- without running the inflater.
pub fn inspect_gzip(compressed: &[u8]) -> Result<GzipInfo, GzipError> {
    let header = parse_header(compressed)?;
    let trailer = &compressed[compressed.len() - GZIP_FOOTER_SIZE..];
    let crc32 = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let uncompressed_size = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

    Ok(GzipInfo {
        mtime: header.mtime,
        original_filename: header.original_filename,
        uncompressed_size,
        crc32,
    })
}
