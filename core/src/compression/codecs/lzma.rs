//! codecs/lzma.rs
//! LZMA1 streams in three header layouts.
//!
//! Every variant starts with the 5 property bytes (lc/lp/pb and the LE
//! dictionary size). `Lzma` then skips 16 header bytes, `SafeLzma` skips 8,
//! `Raw` none. The first 8 skipped bytes hold the LE decoded size, or
//! `u64::MAX` when the writer did not record it.
//!
//! Decoding goes through liblzma's `.lzma` decoder fed a synthesized header
//! carrying the output capacity as the decoded size, so the decoder stops
//! exactly at the end of the caller's buffer.
use byteorder::{ByteOrder, LittleEndian};
use xz2::stream::{Action, Error as XzError, Status, Stream};

use crate::compression::constants::{
    LZMA_HEADER_SKIP, LZMA_PROPERTIES_LEN, LZMA_SIZE_FIELD_LEN, LZMA_UNKNOWN_SIZE,
    SAFE_LZMA_HEADER_SKIP,
};
use crate::compression::types::{CodecKind, CompressionError, Decompressor};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LzmaVariant {
    Lzma,
    Safe,
    Raw,
}

impl LzmaVariant {
    pub fn header_skip(self) -> usize {
        match self {
            LzmaVariant::Lzma => LZMA_HEADER_SKIP,
            LzmaVariant::Safe => SAFE_LZMA_HEADER_SKIP,
            LzmaVariant::Raw => 0,
        }
    }

    pub fn kind(self) -> CodecKind {
        match self {
            LzmaVariant::Lzma => CodecKind::Lzma,
            LzmaVariant::Safe => CodecKind::SafeLzma,
            LzmaVariant::Raw => CodecKind::RawLzma,
        }
    }
}

pub struct LzmaCodec {
    variant: LzmaVariant,
}

impl LzmaCodec {
    pub const fn new(variant: LzmaVariant) -> Self {
        Self { variant }
    }
}

impl Decompressor for LzmaCodec {
    fn kind(&self) -> CodecKind {
        self.variant.kind()
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, CompressionError> {
        let kind = self.kind();
        let skip = self.variant.header_skip();
        if input.len() < LZMA_PROPERTIES_LEN + skip {
            return Err(CompressionError::corrupt(kind, "input shorter than lzma header"));
        }

        let (properties, rest) = input.split_at(LZMA_PROPERTIES_LEN);
        if skip > 0 {
            check_declared_size(kind, LittleEndian::read_u64(&rest[..LZMA_SIZE_FIELD_LEN]), output.len())?;
        }
        let payload = &rest[skip..];

        let mut stream = Stream::new_lzma_decoder(u64::MAX)
            .map_err(|e| CompressionError::resource(kind, format!("lzma decoder ({e})")))?;

        let mut header = [0u8; LZMA_PROPERTIES_LEN + LZMA_SIZE_FIELD_LEN];
        header[..LZMA_PROPERTIES_LEN].copy_from_slice(properties);
        LittleEndian::write_u64(&mut header[LZMA_PROPERTIES_LEN..], output.len() as u64);

        let mut status = feed(kind, &mut stream, &header, output)?;
        if !matches!(status, Status::StreamEnd) {
            status = feed(kind, &mut stream, payload, output)?;
        }

        let written = stream.total_out() as usize;
        if !matches!(status, Status::StreamEnd) && written < output.len() {
            return Err(CompressionError::Truncated { codec: kind, expected: output.len(), actual: written });
        }
        Ok(written)
    }
}

fn check_declared_size(kind: CodecKind, declared: u64, capacity: usize) -> Result<(), CompressionError> {
    if declared == LZMA_UNKNOWN_SIZE || declared == capacity as u64 {
        return Ok(());
    }
    if declared < capacity as u64 {
        return Err(CompressionError::Truncated {
            codec: kind,
            expected: capacity,
            actual: declared as usize,
        });
    }
    Err(CompressionError::corrupt(
        kind,
        format!("header declares {declared} bytes, output holds {capacity}"),
    ))
}

/// Push `input` through the decoder until it is consumed, the stream ends,
/// or no further progress is possible.
fn feed(
    kind: CodecKind,
    stream: &mut Stream,
    mut input: &[u8],
    output: &mut [u8],
) -> Result<Status, CompressionError> {
    loop {
        let written = stream.total_out() as usize;
        let consumed_before = stream.total_in();

        let status = stream
            .process(input, &mut output[written..], Action::Run)
            .map_err(|e| classify(kind, e, stream.total_out() as usize, output.len()))?;

        let consumed = (stream.total_in() - consumed_before) as usize;
        input = &input[consumed..];
        let progressed = consumed > 0 || stream.total_out() as usize > written;

        if matches!(status, Status::StreamEnd) || !progressed {
            return Ok(status);
        }
    }
}

/// Map a liblzma failure onto the taxonomy.
///
/// The synthesized header pins the decoded size to the output capacity, so
/// a data error is how liblzma reports a size disagreement: at capacity the
/// stream wanted to go on, below it the stream ended early.
fn classify(kind: CodecKind, err: XzError, written: usize, capacity: usize) -> CompressionError {
    match err {
        XzError::Mem | XzError::MemLimit => CompressionError::resource(kind, format!("lzma memory ({err})")),
        XzError::Data if written >= capacity => CompressionError::corrupt(
            kind,
            format!("decoded stream exceeds output capacity of {capacity} bytes"),
        ),
        XzError::Data => CompressionError::Truncated { codec: kind, expected: capacity, actual: written },
        other => CompressionError::decode(kind, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_error_at_capacity_is_corrupt() {
        let err = classify(CodecKind::RawLzma, XzError::Data, 64, 64);
        assert!(matches!(err, CompressionError::Corrupt { codec: CodecKind::RawLzma, .. }));
    }

    #[test]
    fn data_error_below_capacity_is_truncated() {
        let err = classify(CodecKind::SafeLzma, XzError::Data, 63, 64);
        assert!(matches!(err, CompressionError::Truncated { expected: 64, actual: 63, .. }));
    }

    #[test]
    fn memory_and_other_errors() {
        assert!(matches!(
            classify(CodecKind::Lzma, XzError::Mem, 0, 64),
            CompressionError::ResourceError { .. }
        ));
        assert!(matches!(
            classify(CodecKind::Lzma, XzError::Options, 0, 64),
            CompressionError::DecodeError { .. }
        ));
    }
}
