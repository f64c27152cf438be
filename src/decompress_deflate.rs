/*
 * The DEFLATE block loop (RFC 1951 S3.2.3) and the length/distance
 * mini-language used by compressed blocks (S3.2.5).
 *
 * Loosely follows the structure of decompress_template.h: a top-level loop
 * reads BFINAL/BTYPE and dispatches to the right block variant; fixed and
 * dynamic blocks then share one symbol-at-a-time decode loop.
 */

use crate::bitstream::BitReader;
use crate::decode_blocks::{decode_dynamic_tables, decode_stored_block, load_fixed_tables};
use crate::decompress_utils::HuffmanTable;
use crate::deflate_constants::*;
use crate::GzipError;
use log::{debug, trace};
use nightly_quirks::branch_pred::unlikely;

/* Length (257-285) base values and extra-bit counts, RFC 1951 S3.2.5. Index
 * 29 (symbol 286) is reserved/illegal and never looked up. */
const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];
const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/* Distance (0-29) base values and extra-bit counts. Symbols 30-31 are
 * reserved and rejected before ever indexing these tables. */
const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];
const DIST_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Bounds-checked write cursor into the caller's destination buffer. Also
/// doubles as the sliding-window history: back-references read from the
/// already-written prefix of the same buffer.
pub struct OutputCursor<'o> {
    buf: &'o mut [u8],
    pos: usize,
}

impl<'o> OutputCursor<'o> {
    pub fn new(buf: &'o mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn written(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline(always)]
    pub fn push_literal(&mut self, byte: u8) -> Result<(), GzipError> {
        if unlikely(self.pos >= self.buf.len()) {
            return Err(GzipError::BufError);
        }
        self.buf[self.pos] = byte;
        self.pos += 1;
        Ok(())
    }

    pub fn push_slice(&mut self, data: &[u8]) -> Result<(), GzipError> {
        if data.len() > self.remaining() {
            return Err(GzipError::BufError);
        }
        self.buf[self.pos..self.pos + data.len()].copy_from_slice(data);
        self.pos += data.len();
        Ok(())
    }

    /// Copy `length` bytes from `dist` bytes behind the cursor. This MUST
    /// stay byte-at-a-time: a bulk `copy_from_slice`/`memcpy` assumes
    /// non-overlapping source and destination, which breaks the common
    /// `dist < length` RLE-style back-reference (e.g. dist=1 repeats the
    /// last byte `length` times).
    pub fn copy_match(&mut self, dist: usize, length: usize) -> Result<(), GzipError> {
        if dist == 0 || dist > self.pos {
            return Err(GzipError::DataError("match distance exceeds produced output"));
        }
        if length > self.remaining() {
            return Err(GzipError::BufError);
        }
        let mut src = self.pos - dist;
        let mut dst = self.pos;
        for _ in 0..length {
            self.buf[dst] = self.buf[src];
            src += 1;
            dst += 1;
        }
        self.pos += length;
        Ok(())
    }
}

/// Decode one compressed (fixed- or dynamic-Huffman) block's symbol stream
/// into `out`, stopping at the end-of-block symbol.
fn decode_compressed_block(
    br: &mut BitReader,
    lt: &HuffmanTable<288>,
    dt: &HuffmanTable<32>,
    out: &mut OutputCursor,
) -> Result<(), GzipError> {
    loop {
        let sym = lt.decode_symbol(br)?;
        if unlikely(br.overflow) {
            return Err(GzipError::DataError("bitstream overflow"));
        }

        if sym < 256 {
            out.push_literal(sym as u8)?;
            continue;
        }

        if sym == DEFLATE_END_OF_BLOCK {
            return Ok(());
        }

        let s = (sym - 257) as usize;
        if sym as i32 > lt.max_sym || s >= LENGTH_BASE.len() || dt.is_empty() {
            return Err(GzipError::DataError("invalid or reserved length symbol"));
        }

        let length =
            br.getbits_base(LENGTH_EXTRA_BITS[s] as u32, LENGTH_BASE[s] as u32) as usize;

        let dsym = dt.decode_symbol(br)?;
        if dsym as i32 > dt.max_sym || dsym > 29 {
            return Err(GzipError::DataError("invalid or reserved distance symbol"));
        }
        let dist = br.getbits_base(DIST_EXTRA_BITS[dsym as usize] as u32, DIST_BASE[dsym as usize] as u32)
            as usize;

        out.copy_match(dist, length)?;
    }
}

/// The top-level DEFLATE block loop: read BFINAL/BTYPE, dispatch, repeat
/// until the final block is consumed.
pub fn inflate(br: &mut BitReader, out: &mut OutputCursor) -> Result<(), GzipError> {
    let mut lt: HuffmanTable<288> = HuffmanTable::default();
    let mut dt: HuffmanTable<32> = HuffmanTable::default();
    let mut fixed_loaded = false;

    loop {
        let bfinal = br.getbits(1) != 0;
        let btype = br.getbits(2);

        match btype {
            DEFLATE_BLOCKTYPE_UNCOMPRESSED => {
                trace!("stored block");
                decode_stored_block(br, out)?;
            }
            DEFLATE_BLOCKTYPE_STATIC_HUFFMAN => {
                trace!("static Huffman block");
                if !fixed_loaded {
                    load_fixed_tables(&mut lt, &mut dt);
                    fixed_loaded = true;
                }
                decode_compressed_block(br, &lt, &dt, out)?;
            }
            DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN => {
                trace!("dynamic Huffman block");
                decode_dynamic_tables(br, &mut lt, &mut dt)?;
                decode_compressed_block(br, &lt, &dt, out)?;
            }
            _ => {
                debug!("reserved block type 3");
                return Err(GzipError::DataError("reserved block type"));
            }
        }

        if br.overflow {
            return Err(GzipError::DataError("bitstream overflow"));
        }

        if bfinal {
            return Ok(());
        }
    }
}
