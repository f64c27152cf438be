//! RFC 1951 constants shared across the block decoder and Huffman builder.

pub const DEFLATE_BLOCKTYPE_UNCOMPRESSED: u32 = 0;
pub const DEFLATE_BLOCKTYPE_STATIC_HUFFMAN: u32 = 1;
pub const DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN: u32 = 2;
pub const DEFLATE_BLOCKTYPE_RESERVED: u32 = 3;

pub const DEFLATE_NUM_PRECODE_SYMS: usize = 19;
pub const DEFLATE_NUM_LITLEN_SYMS: usize = 288;
pub const DEFLATE_NUM_OFFSET_SYMS: usize = 32;

pub const DEFLATE_END_OF_BLOCK: u16 = 256;
pub const DEFLATE_MAX_MATCH_LEN: usize = 258;
pub const DEFLATE_MAX_MATCH_DIST: usize = 32768;

/* The order in which the 19 code-length-alphabet lengths are stored in a
 * dynamic Huffman block header. */
pub const DEFLATE_PRECODE_LENS_PERMUTATION: [u8; DEFLATE_NUM_PRECODE_SYMS] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];
