//! codecs/oodle.rs
//! Oodle (oo2core) decode and encode through the runtime-loaded library.
//!
//! Design notes:
//! - The library is resolved once per process; a miss makes every call
//!   fail with `Unsupported`.
//! - Decoding always runs the unthreaded phase with caller-provided decoder
//!   memory, so one call is one synchronous native invocation.
//! - `OodleCompressOptions` mirrors the native struct; the reserved words
//!   are zeroed before every native call.
use std::ffi::{c_char, c_void, CStr};
use std::ptr;

use bytemuck::Zeroable;
use libloading::Library;
use num_enum::TryFromPrimitive;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::compression::codecs::rent_scratch;
use crate::compression::constants::library_names;
use crate::compression::native;
use crate::compression::types::{CodecKind, CompressionError, Compressor, Decompressor};

const KIND: CodecKind = CodecKind::Oodle;

/// Native compressor ids as reported in chunk headers.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
pub enum OodleCompressor {
    Invalid   = -1,
    Lzh       = 0,
    Lzhlw     = 1,
    Lznib     = 2,
    None      = 3,
    Lzb16     = 4,
    Lzblw     = 5,
    Lza       = 6,
    Lzna      = 7,
    Kraken    = 8,
    Mermaid   = 9,
    BitKnit   = 10,
    Selkie    = 11,
    Hydra     = 12,
    Leviathan = 13,
}

/// Native compression levels; negative values are the HyperFast family.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
pub enum OodleLevel {
    HyperFast4 = -4,
    HyperFast3 = -3,
    HyperFast2 = -2,
    HyperFast1 = -1,
    None       = 0,
    SuperFast  = 1,
    VeryFast   = 2,
    Fast       = 3,
    Normal     = 4,
    Optimal1   = 5,
    Optimal2   = 6,
    Optimal3   = 7,
    Optimal4   = 8,
    Optimal5   = 9,
}

impl OodleLevel {
    pub const HYPER_FAST: OodleLevel = OodleLevel::HyperFast1;
    pub const OPTIMAL: OodleLevel = OodleLevel::Optimal2;
    pub const MAX: OodleLevel = OodleLevel::Optimal5;
    pub const MIN: OodleLevel = OodleLevel::HyperFast4;
}

mod raw {
    pub const FUZZ_SAFE_YES: i32 = 1;
    pub const CHECK_CRC_NO: i32 = 0;
    pub const VERBOSITY_MINIMAL: i32 = 1;
    pub const THREAD_PHASE_UNTHREADED: i32 = 3;
}

/// Tunables for `OodleLZ_Compress`, laid out as the native struct.
/// Native booleans are 32-bit ints.
#[repr(C)]
#[derive(Copy, Clone, Debug, Zeroable)]
pub struct OodleCompressOptions {
    unused_was_verbosity: i32,
    pub min_match_len: i32,
    pub seek_chunk_reset: i32,
    pub seek_chunk_len: i32,
    pub profile: i32,
    pub dictionary_size: i32,
    pub space_speed_tradeoff_bytes: i32,
    unused_was_max_huffmans_per_chunk: i32,
    pub send_quantum_crcs: i32,
    pub max_local_dictionary_size: i32,
    pub make_long_range_matcher: i32,
    pub match_table_size_log2: i32,
    pub jobify: i32,
    pub jobify_user_ptr: *mut c_void,
    pub far_match_min_len: i32,
    pub far_match_offset_log2: i32,
    reserved: [u32; 4],
}

// SAFETY: `jobify_user_ptr` is an opaque tag handed back to job callbacks;
// this crate never dereferences it.
unsafe impl Send for OodleCompressOptions {}
unsafe impl Sync for OodleCompressOptions {}

impl OodleCompressOptions {
    fn clear_reserved(&mut self) {
        self.unused_was_verbosity = 0;
        self.unused_was_max_huffmans_per_chunk = 0;
        self.reserved = [0; 4];
    }
}

/// Decoded form of the 32-bit version word used by `Oodle_CheckVersion`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OodleVersion {
    pub check: u32,
    pub provider: u32,
    pub major: u32,
    pub minor: u32,
    pub seek_table_size: u32,
}

impl OodleVersion {
    pub const DEFAULT_SEEK_TABLE_SIZE: u32 = 48;

    pub fn parse(value: u32) -> Self {
        Self {
            check: value >> 28,
            provider: (value >> 24) & 0xF,
            major: (value >> 16) & 0xFF,
            minor: (value >> 8) & 0xFF,
            seek_table_size: value & 0xFF,
        }
    }

    /// Header version word the library is asked to be compatible with.
    pub fn encode(major: u8, minor: u8, seek_table_size: u8) -> u32 {
        (46u32 << 24) | (u32::from(major) << 16) | (u32::from(minor) << 8) | u32::from(seek_table_size)
    }
}

impl std::fmt::Display for OodleVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{} (provider: {:X}, seek: {})",
            self.check, self.major, self.minor, self.provider, self.seek_table_size
        )
    }
}

type DecompressFn = unsafe extern "C" fn(
    *const u8, isize, *mut u8, isize, i32, i32, i32,
    *mut u8, isize, *const c_void, *mut c_void, *mut u8, isize, i32,
) -> isize;
type CompressFn = unsafe extern "C" fn(
    i32, *const u8, isize, *mut u8, i32,
    *const OodleCompressOptions, *const u8, *const c_void, *mut u8, isize,
) -> isize;
type MemorySizeNeededFn = unsafe extern "C" fn(i32, isize) -> i32;
type CompressedBufferSizeFn = unsafe extern "C" fn(i32, isize) -> isize;
type DecodeBufferSizeFn = unsafe extern "C" fn(i32, isize, i32) -> isize;
type ScratchBoundFn = unsafe extern "C" fn(i32, i32, isize, *const OodleCompressOptions) -> isize;
type DefaultOptionsFn = unsafe extern "C" fn(i32, i32) -> *const OodleCompressOptions;
type FirstChunkCompressorFn = unsafe extern "C" fn(*const u8, isize, *mut i32) -> i32;
type CompressorNameFn = unsafe extern "C" fn(i32) -> *const c_char;
type CheckVersionFn = unsafe extern "C" fn(u32, *mut u32) -> i32;

struct OodleLibrary {
    decompress: DecompressFn,
    compress: CompressFn,
    compressed_buffer_size: CompressedBufferSizeFn,
    decode_buffer_size: DecodeBufferSizeFn,
    scratch_bound: ScratchBoundFn,
    default_options: DefaultOptionsFn,
    first_chunk_compressor: FirstChunkCompressorFn,
    compressor_name: CompressorNameFn,
    /// Decoder memory for any compressor and size, queried once at load.
    decoder_memory_size: usize,
    _library: Library,
}

static LIBRARY: OnceCell<Option<OodleLibrary>> = OnceCell::new();

impl OodleLibrary {
    fn load() -> Result<Self, CompressionError> {
        let library = native::resolve(library_names::OODLE)?;

        // SAFETY: symbol types match the oo2core 2.9 exports.
        let this = unsafe {
            let memory_size_needed: MemorySizeNeededFn =
                native::symbol(&library, b"OodleLZDecoder_MemorySizeNeeded\0")?;
            let decoder_memory_size = memory_size_needed(OodleCompressor::Invalid as i32, -1);

            log_version(&library);

            OodleLibrary {
                decompress: native::symbol(&library, b"OodleLZ_Decompress\0")?,
                compress: native::symbol(&library, b"OodleLZ_Compress\0")?,
                compressed_buffer_size: native::symbol(&library, b"OodleLZ_GetCompressedBufferSizeNeeded\0")?,
                decode_buffer_size: native::symbol(&library, b"OodleLZ_GetDecodeBufferSize\0")?,
                scratch_bound: native::symbol(&library, b"OodleLZ_GetCompressScratchMemBound\0")?,
                default_options: native::symbol(&library, b"OodleLZ_CompressOptions_GetDefault\0")?,
                first_chunk_compressor: native::symbol(&library, b"OodleLZ_GetFirstChunkCompressor\0")?,
                compressor_name: native::symbol(&library, b"OodleLZ_Compressor_GetName\0")?,
                decoder_memory_size: usize::try_from(decoder_memory_size).unwrap_or(0),
                _library: library,
            }
        };
        Ok(this)
    }
}

/// Log the loaded version when the library exports the check.
///
/// # Safety
/// `library` must be an oo2core build.
unsafe fn log_version(library: &Library) {
    let Ok(check_version) = native::symbol::<CheckVersionFn>(library, b"Oodle_CheckVersion\0") else {
        return;
    };
    let expected = OodleVersion::encode(9, 0, OodleVersion::DEFAULT_SEEK_TABLE_SIZE as u8);
    let mut actual = 0u32;
    if check_version(expected, &mut actual) == 1 {
        log::debug!("oodle: loaded version {}", OodleVersion::parse(actual));
    } else {
        log::warn!(
            "oodle: expected a version compatible with {} ({expected:08X}), got {} ({actual:08X})",
            OodleVersion::parse(expected),
            OodleVersion::parse(actual),
        );
    }
}

fn library() -> Result<&'static OodleLibrary, CompressionError> {
    LIBRARY
        .get_or_init(|| match OodleLibrary::load() {
            Ok(library) => Some(library),
            Err(e) => {
                log::debug!("oodle: {e}");
                None
            }
        })
        .as_ref()
        .ok_or_else(|| CompressionError::unavailable(KIND))
}

/// Decoder memory size rented for every decode call.
pub fn decoder_memory_size() -> Result<usize, CompressionError> {
    Ok(library()?.decoder_memory_size)
}

/// Compressor recorded in the first chunk header of `input`.
///
/// # Errors
/// - `Corrupt` when the header names no known compressor.
pub fn first_chunk_compressor(input: &[u8]) -> Result<OodleCompressor, CompressionError> {
    let lib = library()?;
    let mut independent = 0i32;
    // SAFETY: reads at most `input.len()` bytes from `input`.
    let raw = unsafe { (lib.first_chunk_compressor)(input.as_ptr(), input.len() as isize, &mut independent) };
    match OodleCompressor::try_from_primitive(raw) {
        Ok(OodleCompressor::Invalid) | Err(_) => {
            Err(CompressionError::corrupt(KIND, format!("no compressor in chunk header (id {raw})")))
        }
        Ok(compressor) => Ok(compressor),
    }
}

/// Display name the library uses for `compressor`.
pub fn compressor_name(compressor: OodleCompressor) -> Result<String, CompressionError> {
    let lib = library()?;
    // SAFETY: the library returns a static NUL-terminated string or null.
    let name = unsafe { (lib.compressor_name)(compressor as i32) };
    if name.is_null() {
        return Ok(format!("{compressor:?}"));
    }
    Ok(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
}

/// Output capacity the library asks for when decoding `input`.
pub fn get_decode_buffer_size(input: &[u8], corruption_possible: bool) -> Result<usize, CompressionError> {
    let lib = library()?;
    let compressor = first_chunk_compressor(input)?;
    // SAFETY: pure size query.
    let size = unsafe {
        (lib.decode_buffer_size)(compressor as i32, input.len() as isize, i32::from(corruption_possible))
    };
    usize::try_from(size).map_err(|_| CompressionError::corrupt(KIND, format!("decode buffer size query returned {size}")))
}

/// Output capacity needed to compress `len` bytes with `compressor`.
pub fn get_compressed_buffer_size(compressor: OodleCompressor, len: usize) -> Result<usize, CompressionError> {
    let lib = library()?;
    // SAFETY: pure size query.
    let size = unsafe { (lib.compressed_buffer_size)(compressor as i32, len as isize) };
    usize::try_from(size).map_err(|_| CompressionError::resource(KIND, format!("buffer size for {len} bytes")))
}

/// Library defaults for `compressor` at `level`, reserved words zeroed.
pub fn default_options(compressor: OodleCompressor, level: OodleLevel) -> Result<OodleCompressOptions, CompressionError> {
    let lib = library()?;
    // SAFETY: the library returns a pointer to a static options struct.
    let defaults = unsafe { (lib.default_options)(compressor as i32, level as i32) };
    let mut options = if defaults.is_null() {
        OodleCompressOptions::zeroed()
    } else {
        unsafe { defaults.read() }
    };
    options.clear_reserved();
    Ok(options)
}

pub struct OodleCodec;

impl Decompressor for OodleCodec {
    fn kind(&self) -> CodecKind {
        KIND
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        let lib = library()?;
        if lib.decoder_memory_size == 0 {
            return Err(CompressionError::resource(KIND, "decoder memory size"));
        }
        let mut decoder_memory = rent_scratch(KIND, lib.decoder_memory_size)?;

        // SAFETY: every pointer/length pair describes a live slice for the
        // whole call; no callback or shared dictionary is passed.
        let written = unsafe {
            (lib.decompress)(
                input.as_ptr(),
                input.len() as isize,
                output.as_mut_ptr(),
                output.len() as isize,
                raw::FUZZ_SAFE_YES,
                raw::CHECK_CRC_NO,
                raw::VERBOSITY_MINIMAL,
                ptr::null_mut(),
                0,
                ptr::null(),
                ptr::null_mut(),
                decoder_memory.as_mut_ptr(),
                decoder_memory.len() as isize,
                raw::THREAD_PHASE_UNTHREADED,
            )
        };

        decode_result(written, output.len())
    }
}

/// `OodleLZ_Decompress` returns the decoded length, or `0` on failure.
fn decode_result(written: isize, capacity: usize) -> Result<usize, CompressionError> {
    match usize::try_from(written) {
        Ok(0) if capacity > 0 => Err(CompressionError::corrupt(KIND, "OodleLZ_Decompress returned 0")),
        Ok(len) => Ok(len),
        Err(_) => Err(CompressionError::corrupt(KIND, format!("OodleLZ_Decompress returned {written}"))),
    }
}

/// Encoder bound to one compressor, level and optional dictionary.
pub struct OodleEncoder<'d> {
    compressor: OodleCompressor,
    level: OodleLevel,
    options: Option<OodleCompressOptions>,
    dictionary: &'d [u8],
}

impl<'d> OodleEncoder<'d> {
    pub fn new(compressor: OodleCompressor, level: OodleLevel) -> Self {
        Self { compressor, level, options: None, dictionary: &[] }
    }

    /// Replace the library defaults; reserved words are cleared on use.
    pub fn with_options(mut self, options: OodleCompressOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Preceding data the encoder may reference; borrowed for the encoder's life.
    pub fn with_dictionary(mut self, dictionary: &'d [u8]) -> Self {
        self.dictionary = dictionary;
        self
    }
}

impl Compressor for OodleEncoder<'_> {
    fn compress_bound(&self, input_len: usize) -> Result<usize, CompressionError> {
        get_compressed_buffer_size(self.compressor, input_len)
    }

    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        let lib = library()?;

        let needed = self.compress_bound(input.len())?;
        if output.len() < needed {
            return Err(CompressionError::resource(
                KIND,
                format!("{needed}-byte output buffer (got {})", output.len()),
            ));
        }

        let mut options = match self.options {
            Some(options) => options,
            None => default_options(self.compressor, self.level)?,
        };
        options.clear_reserved();

        // SAFETY: pure size query over a live options struct.
        let bound = unsafe {
            (lib.scratch_bound)(
                self.compressor as i32,
                self.level as i32,
                (input.len() + options.dictionary_size.max(0) as usize) as isize,
                &options,
            )
        };
        let scratch_len = if bound == -1 {
            lib.decoder_memory_size
        } else {
            usize::try_from(bound).map_err(|_| CompressionError::resource(KIND, "scratch bound"))?
        };
        let mut scratch = rent_scratch(KIND, scratch_len)?;

        options.dictionary_size = i32::try_from(self.dictionary.len())
            .map_err(|_| CompressionError::resource(KIND, "dictionary larger than 2 GiB"))?;
        options.clear_reserved();

        let dictionary_base = if self.dictionary.is_empty() { ptr::null() } else { self.dictionary.as_ptr() };

        // SAFETY: `output` holds at least the library's own bound; input,
        // dictionary and scratch stay borrowed for the whole call.
        let written = unsafe {
            (lib.compress)(
                self.compressor as i32,
                input.as_ptr(),
                input.len() as isize,
                output.as_mut_ptr(),
                self.level as i32,
                &options,
                dictionary_base,
                ptr::null(),
                scratch.as_mut_ptr(),
                scratch.len() as isize,
            )
        };

        if written <= 0 && !input.is_empty() {
            return Err(CompressionError::DecodeError {
                codec: KIND,
                msg: format!("OodleLZ_Compress returned {written}"),
                source: None,
            });
        }
        Ok(written.max(0) as usize)
    }
}
