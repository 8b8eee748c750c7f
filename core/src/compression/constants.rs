//! compression/constants.rs
//! Stable codec tags, native library names and per-codec defaults.

/// Stable codec tags (u8) as carried by archive tables.
pub mod codec_ids {
    pub const NONE: u8      = 0;
    pub const OODLE: u8     = 1;
    pub const BROTLI: u8    = 2;
    pub const ZLIB: u8      = 3;
    pub const DEFLATE: u8   = 4;
    pub const GZIP: u8      = 5;
    pub const LZ4: u8       = 6;
    pub const LZ4HC: u8     = 7;
    pub const LZO1: u8      = 8;
    pub const LZO2: u8      = 9;
    pub const LZX: u8       = 10;
    pub const LZMA: u8      = 11;
    pub const SAFE_LZMA: u8 = 12;
    pub const RAW_LZMA: u8  = 13;
    pub const ZSTD: u8      = 14;
    pub const DENSITY: u8   = 15;
}

/// File stems of the optional native libraries, without prefix or extension.
pub mod library_names {
    pub const LZX: &str     = "chm";
    pub const LZO: &str     = "lzo2";
    pub const OODLE: &str   = "oo2core";
    pub const DENSITY: &str = "density";
}

/// Window size (log2) used for LZX streams unless the caller picks another.
pub const DEFAULT_LZX_WINDOW_BITS: i32 = 17;

/// LZMA property header: lc/lp/pb byte followed by the LE dictionary size.
pub const LZMA_PROPERTIES_LEN: usize = 5;
/// Size word that follows the properties in the `.lzma` container.
pub const LZMA_SIZE_FIELD_LEN: usize = 8;
/// Extra header bytes skipped by the `LZMA` variant.
pub const LZMA_HEADER_SKIP: usize = 16;
/// Extra header bytes skipped by the `SafeLZMA` variant.
pub const SAFE_LZMA_HEADER_SKIP: usize = 8;
/// Marker for "decoded size not recorded".
pub const LZMA_UNKNOWN_SIZE: u64 = u64::MAX;

/// Container prefix skipped in front of a `Gzip` member.
pub const GZIP_PREFIX_LEN: usize = 2;

/// Read buffer handed to the brotli decoder.
pub const BROTLI_BUFFER_SIZE: usize = 4096;

/// Default compression levels (balanced).
pub const DEFAULT_LEVEL_ZSTD: i32 = 6;
