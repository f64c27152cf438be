//! Hand-rolled gzip/DEFLATE stream construction for the end-to-end
//! scenarios in the testable-properties section. This crate has no
//! encoder (compression is an explicit Non-goal), so these helpers build
//! just enough of a conforming bit stream to exercise the decoder paths
//! the unit tests can't reach on their own (fixed-Huffman literals and
//! LZ77 back-references).

use crc32fast::Hasher;

/// A DEFLATE bit writer: the mirror image of `BitReader`. Bits are
/// buffered LSB-first and flushed a byte at a time, matching the
/// decoder's `refill`/`getbits` convention exactly.
pub struct BitWriter {
    bytes: Vec<u8>,
    cur: u32,
    nbits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            cur: 0,
            nbits: 0,
        }
    }

    /// Push the low `n` bits of `val`, first-pushed-bit-becomes-LSB-of-
    /// the-decoded-value -- the convention every plain integer field
    /// (BFINAL, BTYPE, HLIT, extra bits, ...) uses.
    pub fn put_bits(&mut self, val: u32, n: u32) {
        debug_assert!(n <= 24);
        self.cur |= val << self.nbits;
        self.nbits += n;
        while self.nbits >= 8 {
            self.bytes.push((self.cur & 0xFF) as u8);
            self.cur >>= 8;
            self.nbits -= 8;
        }
    }

    /// Push a canonical Huffman codeword, most-significant-bit first --
    /// `decode_symbol`'s `base`/`offs` walk consumes the first bit it
    /// reads as the top of the codeword.
    pub fn put_huffman(&mut self, code: u32, len: u32) {
        for i in (0..len).rev() {
            self.put_bits((code >> i) & 1, 1);
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.bytes.push((self.cur & 0xFF) as u8);
        }
        self.bytes
    }
}

/// Fixed-Huffman code for a literal/length symbol, per RFC 1951 S3.2.6.
/// Returns (code, length).
pub fn fixed_litlen_code(sym: u32) -> (u32, u32) {
    match sym {
        0..=143 => (0b00110000 + sym, 8),
        144..=255 => (0b110010000 + (sym - 144), 9),
        256..=279 => (sym - 256, 7),
        280..=287 => (0b11000000 + (sym - 280), 8),
        _ => panic!("symbol out of range"),
    }
}

/// Fixed-Huffman distance code: all 32 symbols have length 5, codes
/// assigned in increasing symbol order.
pub fn fixed_dist_code(sym: u32) -> (u32, u32) {
    (sym, 5)
}

const LENGTH_BASE: [(u32, u32, u32); 29] = [
    // (symbol_index, base, extra_bits)
    (0, 3, 0), (1, 4, 0), (2, 5, 0), (3, 6, 0), (4, 7, 0), (5, 8, 0), (6, 9, 0), (7, 10, 0),
    (8, 11, 1), (9, 13, 1), (10, 15, 1), (11, 17, 1), (12, 19, 2), (13, 23, 2), (14, 27, 2),
    (15, 31, 2), (16, 35, 3), (17, 43, 3), (18, 51, 3), (19, 59, 3), (20, 67, 4), (21, 83, 4),
    (22, 99, 4), (23, 115, 4), (24, 131, 5), (25, 163, 5), (26, 195, 5), (27, 227, 5), (28, 258, 0),
];

/// Finds the (symbol, base, extra_bits, extra_value) tuple for an exact
/// length match with zero extra-bit value -- enough for the lengths these
/// tests need (99, 258-style round numbers aren't required here).
fn length_symbol_for(length: u32) -> (u32, u32) {
    for &(idx, base, extra) in LENGTH_BASE.iter() {
        let max = base + if extra > 0 { (1 << extra) - 1 } else { 0 };
        if length >= base && length <= max {
            return (257 + idx, length - base);
        }
    }
    panic!("no length symbol covers {length}");
}

/// Emit a single fixed-Huffman block holding one literal byte followed by
/// a back-reference copy of it `length - 1` times (dist=1), then the
/// end-of-block symbol. `length` is the total run length including the
/// initial literal.
pub fn fixed_block_literal_then_rle(byte: u8, total_length: u32) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.put_bits(1, 1); // BFINAL
    w.put_bits(1, 2); // BTYPE = fixed Huffman

    let (lit_code, lit_len) = fixed_litlen_code(byte as u32);
    w.put_huffman(lit_code, lit_len);

    let (len_sym, len_extra_val) = length_symbol_for(total_length - 1);
    let (_, _, len_extra_bits) = LENGTH_BASE[(len_sym - 257) as usize];
    let (len_code, len_code_len) = fixed_litlen_code(len_sym);
    w.put_huffman(len_code, len_code_len);
    w.put_bits(len_extra_val, len_extra_bits);

    let (dist_code, dist_code_len) = fixed_dist_code(0); // symbol 0 => dist base 1, no extra bits
    w.put_huffman(dist_code, dist_code_len);

    let (eob_code, eob_len) = fixed_litlen_code(256);
    w.put_huffman(eob_code, eob_len);

    w.finish()
}

/// Emit a single fixed-Huffman block holding exactly one literal byte
/// followed by the end-of-block symbol.
pub fn fixed_block_single_literal(byte: u8) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.put_bits(1, 1); // BFINAL
    w.put_bits(1, 2); // BTYPE = fixed Huffman

    let (lit_code, lit_len) = fixed_litlen_code(byte as u32);
    w.put_huffman(lit_code, lit_len);

    let (eob_code, eob_len) = fixed_litlen_code(256);
    w.put_huffman(eob_code, eob_len);

    w.finish()
}

/// Emit a single stored (BTYPE=00) block holding `payload` verbatim,
/// marked final.
pub fn stored_block(payload: &[u8]) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.put_bits(1, 1); // BFINAL
    w.put_bits(0, 2); // BTYPE = stored
    let bytes = w.finish();

    let len = payload.len() as u16;
    let mut out = bytes;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Wrap a raw DEFLATE payload in a minimal gzip container (no optional
/// fields) with a correct CRC-32/ISIZE trailer computed from
/// `uncompressed`.
pub fn wrap_gzip(deflate_payload: &[u8], uncompressed: &[u8]) -> Vec<u8> {
    let mut out = vec![0x1f, 0x8b, 0x08, 0x00, 0, 0, 0, 0, 0, 0x03];
    out.extend_from_slice(deflate_payload);

    let mut hasher = Hasher::new();
    hasher.update(uncompressed);
    let crc = hasher.finalize();
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&(uncompressed.len() as u32).to_le_bytes());
    out
}
